pub mod result;
pub mod testset;
pub mod verify;

pub use result::*;
pub use testset::*;
pub use verify::*;
