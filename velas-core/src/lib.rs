pub mod config;
pub mod confluence;
pub mod consolidator;
pub mod digits;
pub mod error;
pub mod input;
pub mod models;
pub mod scheduler;
pub mod score;
pub mod session;

pub use chrono;
