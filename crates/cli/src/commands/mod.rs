pub mod catalog;
pub mod rip;
pub mod tools;
pub mod verify;

pub use catalog::*;
pub use rip::*;
pub use tools::*;
pub use verify::*;
