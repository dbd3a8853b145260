use std::path::PathBuf;

use thiserror::Error;

use super::batch::BatchError;
use super::source::DatasetSplit;

#[derive(Error, Debug)]
pub enum DatasetError {
    // IO and download errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Hub API error: {0}")]
    ApiError(#[from] hf_hub::api::sync::ApiError),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Failed to build decoder thread pool: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    #[error("Dataset file not found: {0}")]
    FileNotFound(PathBuf),

    // Content errors
    #[error("Batch error: {0}")]
    BatchError(#[from] BatchError),

    #[error("Record {row} has no image bytes or no label")]
    MalformedRecord { row: usize },

    #[error("Label value {0} is not a valid class id")]
    LabelOutOfRange(i64),

    #[error("Image {index} is {found:?}, expected {expected:?} like the first image")]
    InconsistentDimensions {
        index: usize,
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("Unexpected {split} split shape {found:?}, expected {expected:?}")]
    UnexpectedShape {
        split: DatasetSplit,
        expected: (usize, u32, u32),
        found: (usize, u32, u32),
    },

    // IDX distribution files
    #[error("Invalid IDX magic number {0:#010x}")]
    BadMagic(u32),

    #[error("Unsupported IDX data type code {0:#04x}")]
    UnsupportedTypeCode(u8),

    #[error("IDX file has rank {found}, expected {expected}")]
    UnexpectedRank { expected: u8, found: u8 },

    #[error("IDX dimensions {0:?} give a payload that is not addressable")]
    PayloadTooLarge(Vec<u32>),
}
