pub mod cache_key;
pub mod jobs;
pub mod sequence;
