use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::DatasetError;
use crate::idx::IdxError;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Dataset error: {0}")]
    DatasetError(#[from] DatasetError),

    #[error("Write error: {0}")]
    IdxError(#[from] IdxError),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid export configuration: {0}")]
    InvalidConfig(String),

    #[error("No image labeled {0} in the dataset")]
    ClassNotFound(u8),

    #[error("Could not build example image '{0}'")]
    ImageBuffer(PathBuf),
}
