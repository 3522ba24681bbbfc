pub mod error;
pub mod value;

pub use error::{EavError, Result, ValidationReport};
pub use value::Value;
