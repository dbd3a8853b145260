use thiserror::Error;

use crate::dataset::batch::BatchError;

#[derive(Error, Debug)]
pub enum IdxError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Batch error: {0}")]
    BatchError(#[from] BatchError),

    #[error("Refusing to write an empty batch")]
    EmptyBatch,

    #[error("Batch has {images} images but {labels} labels")]
    LengthMismatch { images: usize, labels: usize },

    #[error("Batch of {0} records does not fit a 32-bit header field")]
    TooManyRecords(usize),

    #[error("Unexpected format tag {found}, expected {expected}")]
    BadTag { found: u32, expected: u32 },

    #[error("Image payload of {count}x{height}x{width} bytes is not addressable")]
    PayloadTooLarge { count: u32, height: u32, width: u32 },

    #[error("Label value {0} does not fit in one byte")]
    LabelOutOfRange(u32),
}
