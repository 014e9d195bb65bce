pub mod compositor;
pub mod cpu;
pub mod recording;
pub mod surface;
