pub mod assistant;
pub mod components;
pub mod config;
pub mod console;
pub mod error;
pub mod shutdown;
pub mod startup;
pub mod utils;
