//! In-memory batches and the sources that produce them.

pub mod batch;
pub mod error;
pub mod hub;
pub mod idx_dir;
pub mod rescale;
pub mod source;

pub use batch::{BatchError, ImageBatch, LabelBatch, Split};
pub use error::DatasetError;
pub use hub::HubSource;
pub use idx_dir::IdxDirSource;
pub use rescale::{rescale, PixelData, SourceFormat};
pub use source::{DataSource, Dataset, DatasetKind, DatasetSource, DatasetSplit, InMemorySource, SourceConfig};
