pub mod writer;

pub use writer::{ArtifactKey, ArtifactWriter};
