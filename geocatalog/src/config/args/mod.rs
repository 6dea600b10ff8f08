mod root;
pub use root::*;

mod catalog;
pub use catalog::*;
