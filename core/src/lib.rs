pub mod action;
pub mod config;
pub mod harness;
pub mod style;
pub mod testing;

pub use crate::config::Config;
