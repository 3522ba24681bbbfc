//! Built-in attribute datatypes.
//!
//! One codec per file, registered into the datatype catalog by
//! `Registry::with_builtins`.

pub mod boolean;
pub mod date;
pub mod datetime;
pub mod float;
pub mod integer;
pub mod string;
pub mod text;

pub use boolean::BooleanCodec;
pub use date::DateCodec;
pub use datetime::DateTimeCodec;
pub use float::FloatCodec;
pub use integer::IntegerCodec;
pub use string::StringCodec;
pub use text::TextCodec;
