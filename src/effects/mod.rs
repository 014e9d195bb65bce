pub mod kind;
pub mod params;
pub mod registry;
