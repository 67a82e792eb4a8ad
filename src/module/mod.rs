mod manifest;
mod module;
mod specifiers;

pub use manifest::*;
pub use module::*;
pub use specifiers::*;


#[cfg(test)]
mod module_test;
