use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};

use crate::dataset::batch::{ImageBatch, LabelBatch, Split};

use super::error::IdxError;
use super::header::{HeaderLayout, IdxFormat, ImageHeader, LabelHeader, LabelWidth};

pub fn read_images<P: AsRef<Path>>(path: P, layout: HeaderLayout) -> Result<ImageBatch, IdxError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_images_from(&mut reader, layout)
}

pub fn read_labels<P: AsRef<Path>>(path: P, format: IdxFormat) -> Result<LabelBatch, IdxError> {
    let mut reader = BufReader::new(File::open(path)?);
    read_labels_from(&mut reader, format)
}

/// Reads back a file pair produced by [`super::write_split`].
pub fn read_split<P: AsRef<Path>, Q: AsRef<Path>>(
    image_path: P,
    label_path: Q,
    format: IdxFormat,
) -> Result<Split, IdxError> {
    let images = read_images(image_path, format.header)?;
    let labels = read_labels(label_path, format)?;
    Ok(Split::new(images, labels)?)
}

pub fn read_images_from<R: Read>(reader: &mut R, layout: HeaderLayout) -> Result<ImageBatch, IdxError> {
    let header = ImageHeader::read_from(reader, layout)?;
    let len = header.payload_len().ok_or(IdxError::PayloadTooLarge {
        count: header.count,
        height: header.height,
        width: header.width,
    })?;
    let data = read_payload(reader, len)?;
    Ok(ImageBatch::new(
        data,
        header.count as usize,
        header.height,
        header.width,
    )?)
}

pub fn read_labels_from<R: Read>(reader: &mut R, format: IdxFormat) -> Result<LabelBatch, IdxError> {
    let header = LabelHeader::read_from(reader, format.header)?;
    let count = header.count as usize;
    let len = count
        .checked_mul(format.labels.record_size())
        .ok_or(IdxError::TooManyRecords(count))?;
    let data = read_payload(reader, len)?;

    let labels = match format.labels {
        LabelWidth::Byte => data,
        LabelWidth::Word => data
            .chunks_exact(4)
            .map(BigEndian::read_u32)
            .map(|word| u8::try_from(word).map_err(|_| IdxError::LabelOutOfRange(word)))
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(LabelBatch::from(labels))
}

/// Reads exactly `len` bytes. The buffer grows with the bytes actually read,
/// so a header announcing more data than the file holds fails with
/// `UnexpectedEof` instead of allocating the announced size.
pub(crate) fn read_payload<R: Read>(reader: &mut R, len: usize) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut data)?;
    if data.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} payload bytes, found {}", len, data.len()),
        ));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_payload_is_io_error() {
        // header says 2 images of 2x2 but only 5 bytes follow
        let bytes = [0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 2, 1, 2, 3, 4, 5];
        let err = read_images_from(&mut &bytes[..], HeaderLayout::Untagged).unwrap_err();
        assert!(matches!(err, IdxError::IoError(_)));
    }

    #[test]
    fn test_word_label_out_of_range() {
        let bytes = [0, 0, 0, 1, 0, 0, 1, 0];
        let format = IdxFormat {
            header: HeaderLayout::Untagged,
            labels: LabelWidth::Word,
        };
        let err = read_labels_from(&mut &bytes[..], format).unwrap_err();
        assert!(matches!(err, IdxError::LabelOutOfRange(256)));
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let err = read_images_from(&mut &[0xFF; 12][..], HeaderLayout::Untagged).unwrap_err();
        assert!(matches!(
            err,
            IdxError::PayloadTooLarge {
                count: u32::MAX,
                height: u32::MAX,
                width: u32::MAX
            }
        ));
    }

    #[test]
    fn test_oversized_count_is_io_error() {
        // 4G one-pixel images announced, three bytes present
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 1, 0, 0, 0, 1, 1, 2, 3];
        let err = read_images_from(&mut &bytes[..], HeaderLayout::Untagged).unwrap_err();
        assert!(matches!(err, IdxError::IoError(_)));

        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 7];
        let format = IdxFormat {
            header: HeaderLayout::Untagged,
            labels: LabelWidth::Word,
        };
        let err = read_labels_from(&mut &bytes[..], format).unwrap_err();
        assert!(matches!(err, IdxError::IoError(_)));
    }

    #[test]
    fn test_read_payload_stops_at_len() {
        let bytes = [1, 2, 3, 4, 5];
        let mut reader = &bytes[..];
        assert_eq!(read_payload(&mut reader, 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(reader, &[4, 5]);
    }

    #[test]
    fn test_read_byte_labels() {
        let bytes = [0, 0, 0, 3, 9, 0, 4];
        let labels = read_labels_from(&mut &bytes[..], IdxFormat::default()).unwrap();
        assert_eq!(labels.as_slice(), &[9, 0, 4]);
    }
}
