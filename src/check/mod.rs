mod checker;

pub use checker::*;
