//! Fixed-size headers of the image and label files.
//!
//! Every header field is a big-endian `u32`. Two layouts are supported:
//!
//! - `Untagged`: image file starts with `N, H, W`, label file with `N`.
//! - `Tagged`: the same fields preceded by a format tag (`2051` for images,
//!   `2049` for labels), as in the classic MNIST distribution.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use super::error::IdxError;

pub const IMAGE_TAG: u32 = 2051;
pub const LABEL_TAG: u32 = 2049;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderLayout {
    Tagged,
    #[default]
    Untagged,
}

impl HeaderLayout {
    pub fn image_header_len(&self) -> usize {
        match self {
            HeaderLayout::Tagged => 16,
            HeaderLayout::Untagged => 12,
        }
    }

    pub fn label_header_len(&self) -> usize {
        match self {
            HeaderLayout::Tagged => 8,
            HeaderLayout::Untagged => 4,
        }
    }
}

/// Size of one label record in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelWidth {
    /// One raw byte per label
    #[default]
    Byte,
    /// Big-endian u32 per label
    Word,
}

impl LabelWidth {
    pub fn record_size(&self) -> usize {
        match self {
            LabelWidth::Byte => 1,
            LabelWidth::Word => 4,
        }
    }
}

/// Full description of an on-disk file pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdxFormat {
    pub header: HeaderLayout,
    pub labels: LabelWidth,
}

impl IdxFormat {
    pub fn image_file_len(&self, count: usize, height: u32, width: u32) -> usize {
        self.header.image_header_len() + count * height as usize * width as usize
    }

    pub fn label_file_len(&self, count: usize) -> usize {
        self.header.label_header_len() + count * self.labels.record_size()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub count: u32,
    pub height: u32,
    pub width: u32,
}

impl ImageHeader {
    pub fn write_to<W: Write>(&self, writer: &mut W, layout: HeaderLayout) -> std::io::Result<()> {
        if layout == HeaderLayout::Tagged {
            writer.write_u32::<BigEndian>(IMAGE_TAG)?;
        }
        writer.write_u32::<BigEndian>(self.count)?;
        writer.write_u32::<BigEndian>(self.height)?;
        writer.write_u32::<BigEndian>(self.width)?;
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R, layout: HeaderLayout) -> Result<Self, IdxError> {
        if layout == HeaderLayout::Tagged {
            check_tag(reader, IMAGE_TAG)?;
        }
        Ok(ImageHeader {
            count: reader.read_u32::<BigEndian>()?,
            height: reader.read_u32::<BigEndian>()?,
            width: reader.read_u32::<BigEndian>()?,
        })
    }

    /// Payload size in bytes, or `None` when the dimensions overflow `usize`.
    pub fn payload_len(&self) -> Option<usize> {
        (self.count as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.width as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelHeader {
    pub count: u32,
}

impl LabelHeader {
    pub fn write_to<W: Write>(&self, writer: &mut W, layout: HeaderLayout) -> std::io::Result<()> {
        if layout == HeaderLayout::Tagged {
            writer.write_u32::<BigEndian>(LABEL_TAG)?;
        }
        writer.write_u32::<BigEndian>(self.count)
    }

    pub fn read_from<R: Read>(reader: &mut R, layout: HeaderLayout) -> Result<Self, IdxError> {
        if layout == HeaderLayout::Tagged {
            check_tag(reader, LABEL_TAG)?;
        }
        Ok(LabelHeader {
            count: reader.read_u32::<BigEndian>()?,
        })
    }
}

fn check_tag<R: Read>(reader: &mut R, expected: u32) -> Result<(), IdxError> {
    let found = reader.read_u32::<BigEndian>()?;
    if found != expected {
        return Err(IdxError::BadTag { found, expected });
    }
    Ok(())
}
