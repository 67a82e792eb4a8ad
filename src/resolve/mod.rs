mod depgraph;
mod resolver;
mod table;

pub use depgraph::Components;
pub use resolver::*;
pub use table::*;


#[cfg(test)]
mod depgraph_test;
