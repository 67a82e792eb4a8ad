mod diagnostic;
mod error;

pub use diagnostic::*;
pub use error::*;
