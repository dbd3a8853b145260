use std::collections::HashSet;
use std::path::PathBuf;

use crate::dataset::source::DatasetSplit;
use crate::idx::IdxFormat;

use super::error::ExportError;

pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub train_images: String,
    pub train_labels: String,
    pub test_images: String,
    pub test_labels: String,
    pub examples_dir: PathBuf,
    pub format: IdxFormat,
}

impl ExportConfig {
    pub fn build(self) -> Result<Self, ExportError> {
        check_file_names(&[
            &self.train_images,
            &self.train_labels,
            &self.test_images,
            &self.test_labels,
        ])?;

        Ok(self)
    }

    /// Image and label file paths for `split`.
    pub fn paths_for(&self, split: DatasetSplit) -> (PathBuf, PathBuf) {
        let (images, labels) = match split {
            DatasetSplit::Train => (&self.train_images, &self.train_labels),
            DatasetSplit::Test => (&self.test_images, &self.test_labels),
        };
        (self.output_dir.join(images), self.output_dir.join(labels))
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            train_images: "train-images.bin".to_string(),
            train_labels: "train-labels.bin".to_string(),
            test_images: "test-images.bin".to_string(),
            test_labels: "test-labels.bin".to_string(),
            examples_dir: PathBuf::from("images"),
            format: IdxFormat::default(),
        }
    }
}

fn check_file_names(names: &[&String]) -> Result<(), ExportError> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ExportError::InvalidConfig(format!(
                "output file name '{name}' must be a plain, non-empty file name"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(ExportError::InvalidConfig(format!(
                "output file name '{name}' is used twice"
            )));
        }
    }
    Ok(())
}
