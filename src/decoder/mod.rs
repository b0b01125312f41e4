pub mod block;
pub mod context;
pub mod header;
pub mod state;
pub mod tables;

pub use state::{Decoder, Step};
