//! Writing datasets and example images to disk.

pub mod config;
pub mod error;
pub mod save;

pub use config::ExportConfig;
pub use error::ExportError;
pub use save::{save_dataset, save_example_image, save_examples};
