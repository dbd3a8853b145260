use std::slice::ChunksExact;

use thiserror::Error;

use super::rescale::{rescale, PixelData};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError {
    #[error("Image dimensions must be non-zero, got {height}x{width}")]
    ZeroDimension { height: u32, width: u32 },

    #[error("Image data of {len} bytes is not {count} images of {height}x{width}")]
    ShapeMismatch {
        len: usize,
        count: usize,
        height: u32,
        width: u32,
    },

    #[error("Split has {images} images but {labels} labels")]
    LengthMismatch { images: usize, labels: usize },
}

/// `count` grayscale images of `height` x `width` bytes, stored back to back
/// in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBatch {
    image_data: Box<[u8]>,
    count: usize,
    height: u32,
    width: u32,
}

impl ImageBatch {
    pub fn new(data: Vec<u8>, count: usize, height: u32, width: u32) -> Result<ImageBatch, BatchError> {
        if height == 0 || width == 0 {
            return Err(BatchError::ZeroDimension { height, width });
        }
        let bytes_per_image = height as usize * width as usize;
        if count.checked_mul(bytes_per_image) != Some(data.len()) {
            return Err(BatchError::ShapeMismatch {
                len: data.len(),
                count,
                height,
                width,
            });
        }

        Ok(ImageBatch {
            image_data: data.into_boxed_slice(),
            count,
            height,
            width,
        })
    }

    /// Rescales source pixels to u8 before building the batch.
    pub fn from_pixels(pixels: PixelData, count: usize, height: u32, width: u32) -> Result<ImageBatch, BatchError> {
        ImageBatch::new(rescale(pixels), count, height, width)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn bytes_per_image(&self) -> usize {
        self.height as usize * self.width as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.image_data
    }

    pub fn image(&self, index: usize) -> Option<&[u8]> {
        if index >= self.count {
            return None;
        }
        let start = index * self.bytes_per_image();
        Some(&self.image_data[start..start + self.bytes_per_image()])
    }

    pub fn iter(&self) -> ChunksExact<'_, u8> {
        self.image_data.chunks_exact(self.bytes_per_image())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelBatch(Vec<u8>);

impl LabelBatch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u8> {
        self.0.iter()
    }

    pub fn first_index_of(&self, class: u8) -> Option<usize> {
        self.0.iter().position(|&label| label == class)
    }
}

impl From<Vec<u8>> for LabelBatch {
    fn from(labels: Vec<u8>) -> Self {
        LabelBatch(labels)
    }
}

/// Images and their labels, `labels[i]` belonging to image `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    images: ImageBatch,
    labels: LabelBatch,
}

impl Split {
    pub fn new(images: ImageBatch, labels: LabelBatch) -> Result<Split, BatchError> {
        if images.count() != labels.len() {
            return Err(BatchError::LengthMismatch {
                images: images.count(),
                labels: labels.len(),
            });
        }
        Ok(Split { images, labels })
    }

    pub fn images(&self) -> &ImageBatch {
        &self.images
    }

    pub fn labels(&self) -> &LabelBatch {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// First image labeled `class`, if any.
    pub fn find_example(&self, class: u8) -> Option<&[u8]> {
        self.labels
            .first_index_of(class)
            .and_then(|index| self.images.image(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_checked() {
        let err = ImageBatch::new(vec![0; 7], 2, 2, 2).unwrap_err();
        assert_eq!(
            err,
            BatchError::ShapeMismatch {
                len: 7,
                count: 2,
                height: 2,
                width: 2
            }
        );
        assert!(matches!(
            ImageBatch::new(Vec::new(), 0, 0, 28),
            Err(BatchError::ZeroDimension { .. })
        ));
    }

    #[test]
    fn test_image_access() {
        let batch = ImageBatch::new(vec![1, 2, 3, 4, 5, 6], 3, 1, 2).unwrap();
        assert_eq!(batch.image(1), Some(&[3u8, 4][..]));
        assert_eq!(batch.image(3), None);
        assert_eq!(batch.iter().count(), 3);
    }

    #[test]
    fn test_split_length_checked() {
        let images = ImageBatch::new(vec![0; 4], 1, 2, 2).unwrap();
        let err = Split::new(images, LabelBatch::from(vec![1, 2])).unwrap_err();
        assert_eq!(err, BatchError::LengthMismatch { images: 1, labels: 2 });
    }

    #[test]
    fn test_find_example_returns_first_match() {
        let images = ImageBatch::new(vec![10, 20, 30], 3, 1, 1).unwrap();
        let split = Split::new(images, LabelBatch::from(vec![4, 2, 2])).unwrap();
        assert_eq!(split.find_example(2), Some(&[20u8][..]));
        assert_eq!(split.find_example(9), None);
    }
}
