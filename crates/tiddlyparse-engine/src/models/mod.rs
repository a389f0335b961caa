pub mod tiddler;

pub use tiddler::{Fields, RESERVED_PREFIX, Tiddler};
