mod error;
pub use error::*;

mod main;
pub use main::*;

mod services;
pub use services::*;

mod themes;
pub use themes::*;

mod unrecognized;
pub use unrecognized::*;
