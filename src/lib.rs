pub mod config;
pub mod error;
pub mod index;
pub mod render;
pub mod slice;
pub mod source;

pub use config::{Config, IndexConfig, RenderConfig};
pub use error::{DocError, Result};
pub use index::{DocIndex, Example};
pub use render::{ExampleHandle, ExampleRenderer};
pub use source::{FileWalker, Parser, SourceUnit};
