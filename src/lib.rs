pub mod check;
pub mod cmd;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod module;
pub mod namespace;
pub mod resolve;
pub mod util;
