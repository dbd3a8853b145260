//! Downloads MNIST-style datasets from the parquet conversion published on the
//! Hugging Face hub. Each row holds a PNG-encoded image and an integer label.

use std::fs::File;
use std::path::PathBuf;

use hf_hub::api::sync::{Api, ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use log::{debug, info};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use super::batch::{ImageBatch, LabelBatch, Split};
use super::error::DatasetError;
use super::rescale::PixelData;
use super::source::{Dataset, DatasetKind, DatasetSource, DatasetSplit};

const PARQUET_REVISION: &str = "refs/convert/parquet";

pub struct HubSource {
    kind: DatasetKind,
    cache_dir: Option<PathBuf>,
    threads: usize,
}

impl HubSource {
    pub fn new(kind: DatasetKind, cache_dir: Option<PathBuf>, threads: usize) -> Self {
        HubSource {
            kind,
            cache_dir,
            threads: threads.max(1),
        }
    }

    fn api(&self) -> Result<Api, DatasetError> {
        let mut builder = ApiBuilder::new().with_progress(true);
        if let Some(dir) = &self.cache_dir {
            builder = builder.with_cache_dir(dir.clone());
        }
        Ok(builder.build()?)
    }

    fn fetch_split(
        &self,
        repo: &ApiRepo,
        pool: &rayon::ThreadPool,
        split: DatasetSplit,
    ) -> Result<Split, DatasetError> {
        let (_, config) = self.kind.hub_repo();
        let filename = format!("{config}/{split}/0000.parquet");
        let local = repo.get(&filename)?;
        debug!("reading {} from '{}'", filename, local.display());

        let reader = SerializedFileReader::new(File::open(local)?)?;
        let (encoded, labels) = read_records(reader)?;

        let decoded = pool.install(|| {
            encoded
                .par_iter()
                .map(|bytes| decode_luma(bytes))
                .collect::<Result<Vec<_>, DatasetError>>()
        })?;

        let images = concat_images(decoded)?;
        Ok(Split::new(images, LabelBatch::from(labels))?)
    }
}

impl DatasetSource for HubSource {
    fn kind(&self) -> DatasetKind {
        self.kind
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        let (dataset_id, _) = self.kind.hub_repo();
        info!("fetching {} from '{}'", self.kind.name(), dataset_id);

        let api = self.api()?;
        let repo = api.repo(Repo::with_revision(
            dataset_id.to_string(),
            RepoType::Dataset,
            PARQUET_REVISION.to_string(),
        ));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;

        let dataset = Dataset {
            train: self.fetch_split(&repo, &pool, DatasetSplit::Train)?,
            test: self.fetch_split(&repo, &pool, DatasetSplit::Test)?,
        };
        dataset.check_shape(self.kind)?;

        info!(
            "loaded {} train and {} test images",
            dataset.train.len(),
            dataset.test.len()
        );
        Ok(dataset)
    }
}

fn read_records(reader: SerializedFileReader<File>) -> Result<(Vec<Vec<u8>>, Vec<u8>), DatasetError> {
    let rows = reader.metadata().file_metadata().num_rows() as usize;
    let mut encoded = Vec::with_capacity(rows);
    let mut labels = Vec::with_capacity(rows);

    for (index, row) in reader.into_iter().enumerate() {
        let row = row?;
        let mut image = None;
        let mut label = None;

        for (_name, field) in row.get_column_iter() {
            match field {
                Field::Group(group) => {
                    for (_name, inner) in group.get_column_iter() {
                        if let Field::Bytes(bytes) = inner {
                            image = Some(bytes.data().to_vec());
                        }
                    }
                }
                Field::Long(value) => label = Some(*value),
                Field::Int(value) => label = Some(*value as i64),
                _ => {}
            }
        }

        let (Some(image), Some(label)) = (image, label) else {
            return Err(DatasetError::MalformedRecord { row: index });
        };
        encoded.push(image);
        labels.push(u8::try_from(label).map_err(|_| DatasetError::LabelOutOfRange(label))?);
    }

    Ok((encoded, labels))
}

fn decode_luma(bytes: &[u8]) -> Result<(u32, u32, Vec<u8>), DatasetError> {
    let image = image::load_from_memory(bytes)?.to_luma8();
    Ok((image.height(), image.width(), image.into_raw()))
}

fn concat_images(decoded: Vec<(u32, u32, Vec<u8>)>) -> Result<ImageBatch, DatasetError> {
    let count = decoded.len();
    let (height, width) = decoded.first().map(|(h, w, _)| (*h, *w)).unwrap_or((28, 28));

    let mut data = Vec::with_capacity(count * height as usize * width as usize);
    for (index, (h, w, pixels)) in decoded.into_iter().enumerate() {
        if (h, w) != (height, width) {
            return Err(DatasetError::InconsistentDimensions {
                index,
                expected: (height, width),
                found: (h, w),
            });
        }
        data.extend_from_slice(&pixels);
    }

    Ok(ImageBatch::from_pixels(PixelData::U8(data), count, height, width)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma};
    use parquet::data_type::{ByteArray, ByteArrayType, Int64Type};
    use parquet::file::properties::WriterProperties;
    use parquet::file::writer::SerializedFileWriter;
    use parquet::schema::parser::parse_message_type;
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Arc;

    // Same layout as the hub parquet conversion
    const SCHEMA: &str = "
        message schema {
            required group image {
                optional binary bytes;
                optional binary path (UTF8);
            }
            required int64 label;
        }
    ";

    fn png(width: u32, height: u32, value: u8) -> Vec<u8> {
        let image = GrayImage::from_pixel(width, height, Luma([value]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Writes one row group of `(image bytes, label)` rows. Paths are all null.
    fn write_records(path: &Path, rows: &[(Option<Vec<u8>>, i64)]) {
        let schema = Arc::new(parse_message_type(SCHEMA).unwrap());
        let props = Arc::new(WriterProperties::builder().build());
        let mut writer = SerializedFileWriter::new(File::create(path).unwrap(), schema, props).unwrap();

        let bytes: Vec<ByteArray> = rows
            .iter()
            .filter_map(|(image, _)| image.clone().map(ByteArray::from))
            .collect();
        let bytes_def: Vec<i16> = rows.iter().map(|(image, _)| image.is_some() as i16).collect();
        let paths_def = vec![0i16; rows.len()];
        let labels: Vec<i64> = rows.iter().map(|(_, label)| *label).collect();

        let mut row_group = writer.next_row_group().unwrap();
        let mut index = 0;
        while let Some(mut column) = row_group.next_column().unwrap() {
            match index {
                0 => {
                    column
                        .typed::<ByteArrayType>()
                        .write_batch(&bytes, Some(&bytes_def), None)
                        .unwrap();
                }
                1 => {
                    column
                        .typed::<ByteArrayType>()
                        .write_batch(&[], Some(&paths_def), None)
                        .unwrap();
                }
                _ => {
                    column.typed::<Int64Type>().write_batch(&labels, None, None).unwrap();
                }
            }
            column.close().unwrap();
            index += 1;
        }
        row_group.close().unwrap();
        writer.close().unwrap();
    }

    fn read_back(name: &str, rows: &[(Option<Vec<u8>>, i64)]) -> Result<(Vec<Vec<u8>>, Vec<u8>), DatasetError> {
        let dir = std::env::temp_dir().join(format!("mnist-idx-hub-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("0000.parquet");
        write_records(&path, rows);

        let result = read_records(SerializedFileReader::new(File::open(&path).unwrap()).unwrap());
        std::fs::remove_dir_all(&dir).unwrap();
        result
    }

    #[test]
    fn test_read_records_in_order() {
        let (first, second, third) = (png(2, 2, 7), png(2, 2, 9), png(2, 2, 1));
        let (encoded, labels) = read_back(
            "order",
            &[
                (Some(first.clone()), 3),
                (Some(second.clone()), 8),
                (Some(third.clone()), 0),
            ],
        )
        .unwrap();

        assert_eq!(encoded, vec![first, second, third]);
        assert_eq!(labels, vec![3, 8, 0]);
    }

    #[test]
    fn test_record_without_bytes_is_malformed() {
        let err = read_back("nobytes", &[(Some(png(2, 2, 7)), 1), (None, 2)]).unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRecord { row: 1 }));
    }

    #[test]
    fn test_record_label_out_of_range() {
        let err = read_back("label", &[(Some(png(2, 2, 7)), 300)]).unwrap_err();
        assert!(matches!(err, DatasetError::LabelOutOfRange(300)));
    }

    #[test]
    fn test_decode_and_concat() {
        let decoded = vec![
            decode_luma(&png(3, 2, 7)).unwrap(),
            decode_luma(&png(3, 2, 9)).unwrap(),
        ];
        let batch = concat_images(decoded).unwrap();
        assert_eq!((batch.count(), batch.height(), batch.width()), (2, 2, 3));
        assert_eq!(batch.image(0), Some(&[7u8; 6][..]));
        assert_eq!(batch.image(1), Some(&[9u8; 6][..]));
    }

    #[test]
    fn test_concat_rejects_mixed_sizes() {
        let decoded = vec![(2, 2, vec![0; 4]), (3, 3, vec![0; 9])];
        let err = concat_images(decoded).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InconsistentDimensions {
                index: 1,
                expected: (2, 2),
                found: (3, 3)
            }
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_luma(b"not a png"),
            Err(DatasetError::ImageError(_))
        ));
    }
}
