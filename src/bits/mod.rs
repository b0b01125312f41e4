pub mod reader;
#[cfg(test)]
pub(crate) mod writer;

pub use reader::BitReader;
#[cfg(test)]
pub(crate) use writer::BitWriter;
