pub mod args;

mod env;
pub use env::{Env, FauxEnv, OsEnv};

pub mod file;
