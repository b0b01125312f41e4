pub mod builder;
pub mod decoder;
pub mod tables;

pub use builder::build_table;
pub use decoder::{read_prefix_code, read_symbol, HuffmanTreeGroup};
