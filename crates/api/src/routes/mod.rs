pub mod climate;
mod error;
pub mod home;

pub use climate::*;
pub use error::*;
pub use home::*;
