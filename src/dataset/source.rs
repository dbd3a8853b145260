use std::fmt;
use std::path::PathBuf;

use log::info;

use super::batch::Split;
use super::error::DatasetError;
use super::hub::HubSource;
use super::idx_dir::IdxDirSource;

const MNIST_CLASSES: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const FASHION_CLASSES: [&str; 10] = [
    "T-shirt/top",
    "Trouser",
    "Pullover",
    "Dress",
    "Coat",
    "Sandal",
    "Shirt",
    "Sneaker",
    "Bag",
    "Ankle boot",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetKind {
    Mnist,
    FashionMnist,
}

impl DatasetKind {
    pub fn name(&self) -> &'static str {
        match self {
            DatasetKind::Mnist => "MNIST",
            DatasetKind::FashionMnist => "Fashion-MNIST",
        }
    }

    /// Hub repository id and the parquet config directory inside it.
    pub fn hub_repo(&self) -> (&'static str, &'static str) {
        match self {
            DatasetKind::Mnist => ("ylecun/mnist", "mnist"),
            DatasetKind::FashionMnist => ("zalando-datasets/fashion_mnist", "fashion_mnist"),
        }
    }

    /// File name prefix for dumped example images.
    pub fn example_prefix(&self) -> &'static str {
        match self {
            DatasetKind::Mnist => "mnist",
            DatasetKind::FashionMnist => "fashion",
        }
    }

    pub fn class_names(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::Mnist => &MNIST_CLASSES,
            DatasetKind::FashionMnist => &FASHION_CLASSES,
        }
    }

    pub fn num_classes(&self) -> u8 {
        self.class_names().len() as u8
    }

    pub fn class_name(&self, class: u8) -> Option<&'static str> {
        self.class_names().get(class as usize).copied()
    }

    /// Expected (count, height, width) of a split as published.
    pub fn expected_shape(&self, split: DatasetSplit) -> (usize, u32, u32) {
        // Both datasets share the same layout
        match split {
            DatasetSplit::Train => (60_000, 28, 28),
            DatasetSplit::Test => (10_000, 28, 28),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DatasetSplit {
    Train,
    Test,
}

impl DatasetSplit {
    pub const ALL: [DatasetSplit; 2] = [DatasetSplit::Train, DatasetSplit::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Test => "test",
        }
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub train: Split,
    pub test: Split,
}

impl Dataset {
    pub fn split(&self, split: DatasetSplit) -> &Split {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Test => &self.test,
        }
    }

    /// Checks both splits against the published shape of `kind`.
    pub fn check_shape(&self, kind: DatasetKind) -> Result<(), DatasetError> {
        for split in DatasetSplit::ALL {
            let images = self.split(split).images();
            let found = (images.count(), images.height(), images.width());
            let expected = kind.expected_shape(split);
            if found != expected {
                return Err(DatasetError::UnexpectedShape {
                    split,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}

/// Anything that can hand over the train and test splits of a dataset.
pub trait DatasetSource {
    fn kind(&self) -> DatasetKind;
    fn load(&self) -> Result<Dataset, DatasetError>;
}

/// Source over batches already in memory. No shape checks.
pub struct InMemorySource {
    kind: DatasetKind,
    dataset: Dataset,
}

impl InMemorySource {
    pub fn new(kind: DatasetKind, dataset: Dataset) -> Self {
        InMemorySource { kind, dataset }
    }
}

impl DatasetSource for InMemorySource {
    fn kind(&self) -> DatasetKind {
        self.kind
    }

    fn load(&self) -> Result<Dataset, DatasetError> {
        Ok(self.dataset.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Hub { cache_dir: Option<PathBuf> },
    IdxDirectory { path: PathBuf },
}

pub struct SourceConfig {
    pub kind: DatasetKind,
    pub source: DataSource,
    pub threads: usize,
}

impl SourceConfig {
    pub fn open(&self) -> Box<dyn DatasetSource> {
        match &self.source {
            DataSource::Hub { cache_dir } => {
                info!("using {} from the hub", self.kind.name());
                Box::new(HubSource::new(self.kind, cache_dir.clone(), self.threads))
            }
            DataSource::IdxDirectory { path } => {
                info!("using {} from '{}'", self.kind.name(), path.display());
                Box::new(IdxDirSource::new(self.kind, path.clone()))
            }
        }
    }
}
