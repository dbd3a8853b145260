use std::fs;
use std::path::PathBuf;

use image::GrayImage;
use log::{info, warn};

use crate::dataset::batch::Split;
use crate::dataset::source::{Dataset, DatasetKind, DatasetSplit};
use crate::idx;

use super::config::ExportConfig;
use super::error::ExportError;

/// Writes the train and test file pairs into `config.output_dir`, creating it
/// if needed.
pub fn save_dataset(dataset: &Dataset, config: &ExportConfig) -> Result<(), ExportError> {
    fs::create_dir_all(&config.output_dir)?;

    for split in DatasetSplit::ALL {
        let data = dataset.split(split);
        let (image_path, label_path) = config.paths_for(split);
        idx::write_split(data.images(), data.labels(), &image_path, &label_path, config.format)?;
        info!(
            "saved {} {} images to '{}' and labels to '{}'",
            data.len(),
            split,
            image_path.display(),
            label_path.display()
        );
    }

    Ok(())
}

/// Saves the first image labeled `class` as `<prefix>_<class>.png`.
///
/// Nothing is written when no image carries that label.
pub fn save_example_image(
    kind: DatasetKind,
    class: u8,
    split: &Split,
    config: &ExportConfig,
) -> Result<PathBuf, ExportError> {
    let pixels = split.find_example(class).ok_or(ExportError::ClassNotFound(class))?;

    fs::create_dir_all(&config.examples_dir)?;
    let path = config
        .examples_dir
        .join(format!("{}_{}.png", kind.example_prefix(), class));

    let images = split.images();
    let image = GrayImage::from_raw(images.width(), images.height(), pixels.to_vec())
        .ok_or_else(|| ExportError::ImageBuffer(path.clone()))?;
    image.save(&path)?;

    info!(
        "saved example image of class {} ({}) as '{}'",
        class,
        kind.class_name(class).unwrap_or("unknown"),
        path.display()
    );
    Ok(path)
}

/// Saves one example image per class. Classes without any image are logged
/// and skipped.
pub fn save_examples(kind: DatasetKind, split: &Split, config: &ExportConfig) -> Result<Vec<PathBuf>, ExportError> {
    let mut saved = Vec::with_capacity(kind.num_classes() as usize);

    for class in 0..kind.num_classes() {
        match save_example_image(kind, class, split, config) {
            Ok(path) => saved.push(path),
            Err(ExportError::ClassNotFound(class)) => {
                warn!("no image labeled {class}, skipping its example");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(saved)
}
