mod driver;

pub use driver::*;

#[cfg(test)]
mod tests;
