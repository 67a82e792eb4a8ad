mod io;

pub use io::*;

#[cfg(test)]
pub mod testing;
