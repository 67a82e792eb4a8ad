mod export_mode;
mod helpers;
mod print;
mod reexport;

pub use export_mode::*;
pub use helpers::*;
pub use print::*;
pub use reexport::*;

#[cfg(test)]
mod codegen_test;
