mod namespace;

pub use namespace::*;
