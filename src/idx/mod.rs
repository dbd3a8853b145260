//! IDX-like binary serialization of image and label batches.

pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

pub use error::IdxError;
pub use header::{HeaderLayout, IdxFormat, ImageHeader, LabelHeader, LabelWidth, IMAGE_TAG, LABEL_TAG};
pub use reader::{read_images, read_labels, read_split};
pub use writer::{write_split, write_to};
