use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, WriteBytesExt};
use log::debug;

use crate::dataset::batch::{ImageBatch, LabelBatch};

use super::error::IdxError;
use super::header::{IdxFormat, ImageHeader, LabelHeader, LabelWidth};

/// Writes `images` and `labels` to a new image file and label file.
///
/// Existing files are truncated. The write is not atomic: if it fails halfway
/// both files are left partially written and are not cleaned up.
pub fn write_split<P: AsRef<Path>, Q: AsRef<Path>>(
    images: &ImageBatch,
    labels: &LabelBatch,
    image_path: P,
    label_path: Q,
    format: IdxFormat,
) -> Result<(), IdxError> {
    check_batches(images, labels)?;

    let image_path = image_path.as_ref();
    let label_path = label_path.as_ref();
    let mut image_file = BufWriter::new(File::create(image_path)?);
    let mut label_file = BufWriter::new(File::create(label_path)?);

    write_to(images, labels, &mut image_file, &mut label_file, format)?;

    image_file.flush()?;
    label_file.flush()?;

    debug!(
        "wrote {} records to '{}' and '{}'",
        images.count(),
        image_path.display(),
        label_path.display()
    );
    Ok(())
}

/// Same as [`write_split`] but over arbitrary writers. Does not flush.
pub fn write_to<I: Write, L: Write>(
    images: &ImageBatch,
    labels: &LabelBatch,
    image_out: &mut I,
    label_out: &mut L,
    format: IdxFormat,
) -> Result<(), IdxError> {
    let count = check_batches(images, labels)?;

    ImageHeader {
        count,
        height: images.height(),
        width: images.width(),
    }
    .write_to(image_out, format.header)?;
    LabelHeader { count }.write_to(label_out, format.header)?;

    for (image, &label) in images.iter().zip(labels.iter()) {
        image_out.write_all(image)?;
        match format.labels {
            LabelWidth::Byte => label_out.write_u8(label)?,
            LabelWidth::Word => label_out.write_u32::<BigEndian>(label as u32)?,
        }
    }

    Ok(())
}

fn check_batches(images: &ImageBatch, labels: &LabelBatch) -> Result<u32, IdxError> {
    if images.count() != labels.len() {
        return Err(IdxError::LengthMismatch {
            images: images.count(),
            labels: labels.len(),
        });
    }
    if images.is_empty() {
        return Err(IdxError::EmptyBatch);
    }
    u32::try_from(images.count()).map_err(|_| IdxError::TooManyRecords(images.count()))
}
