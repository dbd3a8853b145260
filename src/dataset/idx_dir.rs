//! Reads the canonical IDX distribution files from a local directory.
//!
//! Expected names are `train-images-idx3-ubyte`, `train-labels-idx1-ubyte`,
//! `t10k-images-idx3-ubyte` and `t10k-labels-idx1-ubyte`, each optionally
//! gzipped with a `.gz` suffix.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use flate2::read::GzDecoder;
use log::{debug, info};

use crate::idx::reader::read_payload;

use super::batch::{ImageBatch, LabelBatch, Split};
use super::error::DatasetError;
use super::rescale::{PixelData, SourceFormat};
use super::source::{Dataset, DatasetKind, DatasetSource, DatasetSplit};

pub struct IdxDirSource {
    kind: DatasetKind,
    dir: PathBuf,
}

impl IdxDirSource {
    pub fn new(kind: DatasetKind, dir: PathBuf) -> Self {
        IdxDirSource { kind, dir }
    }

    fn load_split(&self, split: DatasetSplit) -> Result<Split, DatasetError> {
        let prefix = match split {
            DatasetSplit::Train => "train",
            DatasetSplit::Test => "t10k",
        };

        let mut images = open(&self.dir, &format!("{prefix}-images-idx3-ubyte"))?;
        let images = read_images(&mut images)?;
        let mut labels = open(&self.dir, &format!("{prefix}-labels-idx1-ubyte"))?;
        let labels = read_labels(&mut labels)?;

        Ok(Split::new(images, labels)?)
    }
}

impl DatasetSource for IdxDirSource {
    fn kind(&self) -> DatasetKind {
        self.kind
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        info!("reading {} from '{}'", self.kind.name(), self.dir.display());
        let dataset = Dataset {
            train: self.load_split(DatasetSplit::Train)?,
            test: self.load_split(DatasetSplit::Test)?,
        };
        dataset.check_shape(self.kind)?;
        Ok(dataset)
    }
}

fn open(dir: &Path, name: &str) -> Result<Box<dyn Read>, DatasetError> {
    let plain = dir.join(name);
    if plain.is_file() {
        debug!("opening '{}'", plain.display());
        return Ok(Box::new(BufReader::new(File::open(plain)?)));
    }

    let gzipped = dir.join(format!("{name}.gz"));
    if gzipped.is_file() {
        debug!("opening '{}'", gzipped.display());
        return Ok(Box::new(GzDecoder::new(BufReader::new(File::open(gzipped)?))));
    }

    Err(DatasetError::FileNotFound(plain))
}

/// Parses `0x00 0x00 <type> <rank>`, then `rank` big-endian dimensions.
fn read_idx_header<R: Read>(reader: &mut R, rank: u8) -> Result<(SourceFormat, Vec<u32>), DatasetError> {
    let magic = reader.read_u32::<BigEndian>()?;
    let [zero_a, zero_b, code, found_rank] = magic.to_be_bytes();
    if zero_a != 0 || zero_b != 0 {
        return Err(DatasetError::BadMagic(magic));
    }
    let format = SourceFormat::from_idx_code(code).ok_or(DatasetError::UnsupportedTypeCode(code))?;
    if found_rank != rank {
        return Err(DatasetError::UnexpectedRank {
            expected: rank,
            found: found_rank,
        });
    }

    let dims = (0..rank)
        .map(|_| reader.read_u32::<BigEndian>())
        .collect::<Result<Vec<_>, _>>()?;
    Ok((format, dims))
}

fn decode_pixels(format: SourceFormat, bytes: Vec<u8>) -> PixelData {
    let len = bytes.len() / format.bytes_per_element();
    match format {
        SourceFormat::U8 => PixelData::U8(bytes),
        SourceFormat::F32 => {
            let mut data = vec![0f32; len];
            BigEndian::read_f32_into(&bytes, &mut data);
            PixelData::F32(data)
        }
        SourceFormat::F64 => {
            let mut data = vec![0f64; len];
            BigEndian::read_f64_into(&bytes, &mut data);
            PixelData::F64(data)
        }
    }
}

fn read_images<R: Read>(reader: &mut R) -> Result<ImageBatch, DatasetError> {
    let (format, dims) = read_idx_header(reader, 3)?;
    let byte_len = dims
        .iter()
        .try_fold(format.bytes_per_element(), |len, &dim| len.checked_mul(dim as usize))
        .ok_or_else(|| DatasetError::PayloadTooLarge(dims.clone()))?;

    let pixels = decode_pixels(format, read_payload(reader, byte_len)?);
    let (count, height, width) = (dims[0] as usize, dims[1], dims[2]);
    Ok(ImageBatch::from_pixels(pixels, count, height, width)?)
}

fn read_labels<R: Read>(reader: &mut R) -> Result<LabelBatch, DatasetError> {
    let (format, dims) = read_idx_header(reader, 1)?;
    if format != SourceFormat::U8 {
        return Err(DatasetError::UnsupportedTypeCode(format.idx_code()));
    }
    let labels = read_payload(reader, dims[0] as usize)?;
    Ok(LabelBatch::from(labels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn idx_images(code: u8, count: u32, height: u32, width: u32, payload: &[u8]) -> Vec<u8> {
        let mut buf = vec![0, 0, code, 3];
        for dim in [count, height, width] {
            buf.write_u32::<BigEndian>(dim).unwrap();
        }
        buf.extend_from_slice(payload);
        buf
    }

    #[test]
    fn test_read_u8_images() {
        let bytes = idx_images(0x08, 2, 1, 2, &[1, 2, 3, 4]);
        let batch = read_images(&mut bytes.as_slice()).unwrap();
        assert_eq!(batch.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!((batch.count(), batch.height(), batch.width()), (2, 1, 2));
    }

    #[test]
    fn test_read_f32_images_are_rescaled() {
        let mut payload = Vec::new();
        for value in [0.0f32, 255.0, 128.2, 300.0] {
            payload.write_f32::<BigEndian>(value).unwrap();
        }
        let bytes = idx_images(0x0D, 1, 2, 2, &payload);
        let batch = read_images(&mut bytes.as_slice()).unwrap();
        assert_eq!(batch.as_bytes(), &[0, 255, 128, 255]);
    }

    #[test]
    fn test_bad_magic_and_rank() {
        let bytes = [0x01, 0x00, 0x08, 0x03];
        assert!(matches!(
            read_images(&mut &bytes[..]),
            Err(DatasetError::BadMagic(0x0100_0803))
        ));

        let bytes = [0x00, 0x00, 0x08, 0x01, 0, 0, 0, 0];
        assert!(matches!(
            read_images(&mut &bytes[..]),
            Err(DatasetError::UnexpectedRank { expected: 3, found: 1 })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        let mut bytes = vec![0x00, 0x00, 0x08, 0x03];
        bytes.extend_from_slice(&[0xFF; 12]);
        assert!(matches!(
            read_images(&mut bytes.as_slice()),
            Err(DatasetError::PayloadTooLarge(dims)) if dims == [u32::MAX; 3]
        ));
    }

    #[test]
    fn test_truncated_payload_is_io_error() {
        let bytes = idx_images(0x0E, u32::MAX, 1, 1, &[0; 8]);
        assert!(matches!(
            read_images(&mut bytes.as_slice()),
            Err(DatasetError::IoError(_))
        ));

        let labels = [0x00, 0x00, 0x08, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 3];
        assert!(matches!(
            read_labels(&mut &labels[..]),
            Err(DatasetError::IoError(_))
        ));
    }

    #[test]
    fn test_unsupported_type_code() {
        let bytes = idx_images(0x0B, 0, 1, 1, &[]);
        assert!(matches!(
            read_images(&mut bytes.as_slice()),
            Err(DatasetError::UnsupportedTypeCode(0x0B))
        ));
    }

    #[test]
    fn test_open_prefers_plain_then_gz() {
        let dir = std::env::temp_dir().join(format!("mnist-idx-open-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let labels = [0x00, 0x00, 0x08, 0x01, 0, 0, 0, 2, 5, 6];
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&labels).unwrap();
        std::fs::write(dir.join("l-idx1-ubyte.gz"), encoder.finish().unwrap()).unwrap();

        let mut reader = open(&dir, "l-idx1-ubyte").unwrap();
        assert_eq!(read_labels(&mut reader).unwrap().as_slice(), &[5, 6]);

        assert!(matches!(
            open(&dir, "missing-idx1-ubyte"),
            Err(DatasetError::FileNotFound(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
