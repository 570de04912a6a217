pub mod cmd;
pub mod config;
pub mod logger;

mod util;
