pub mod lang;
pub mod outcome;
pub mod testcase;

pub use lang::*;
pub use outcome::*;
pub use testcase::*;
