pub mod config;
pub mod error;
pub mod message;
pub mod turn;
