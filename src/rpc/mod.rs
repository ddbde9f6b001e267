pub mod constants;
pub mod error;
pub mod request;
pub mod response;

pub use constants::*;
pub use error::*;
pub use request::*;
pub use response::*;
