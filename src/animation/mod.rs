pub mod combine;
pub mod config;
pub mod instance;
pub mod reconcile;
pub mod scheduler;
pub mod ticker;
