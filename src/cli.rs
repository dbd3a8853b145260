//! Command-line surface: `save`, `example <n>` and `examples`.
//!
//! Malformed input never reaches the dataset or the writer. It is turned into
//! a [`Usage`] message that the binary prints before exiting normally.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};

use crate::dataset::source::{DataSource, DatasetKind, DatasetSource, SourceConfig};
use crate::export::{save_dataset, save_example_image, save_examples, ExportConfig, ExportError};
use crate::idx::{HeaderLayout, IdxFormat, LabelWidth};

#[derive(Parser, Debug)]
#[command(name = "mnist-idx", version, about = "Export MNIST-style datasets to IDX-like binary files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Dataset to fetch
    #[arg(long, value_enum, default_value_t = DatasetArg::Mnist, global = true)]
    pub dataset: DatasetArg,

    /// Where the dataset comes from
    #[arg(long, value_enum, default_value_t = SourceArg::Hub, global = true)]
    pub source: SourceArg,

    /// Directory holding the IDX distribution files (with `--source idx-dir`)
    #[arg(long, default_value = "raw", global = true)]
    pub idx_dir: PathBuf,

    /// Hub download cache directory
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Threads used to decode downloaded images
    #[arg(long, default_value_t = num_cpus::get(), global = true)]
    pub threads: usize,

    #[arg(long, default_value = "data", global = true)]
    pub output_dir: PathBuf,

    #[arg(long, default_value = "images", global = true)]
    pub examples_dir: PathBuf,

    /// Header layout of the written files
    #[arg(long, value_enum, default_value_t = HeaderArg::Untagged, global = true)]
    pub header: HeaderArg,

    /// Size of each label record
    #[arg(long, value_enum, default_value_t = LabelsArg::Byte, global = true)]
    pub labels: LabelsArg,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save the train and test splits as binary files
    Save,
    /// Save an image labeled as <CLASS>
    Example {
        #[arg(allow_hyphen_values = true, allow_negative_numbers = true)]
        class: String,
    },
    /// Save an example image of each class
    Examples,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DatasetArg {
    Mnist,
    Fashion,
}

impl From<DatasetArg> for DatasetKind {
    fn from(arg: DatasetArg) -> Self {
        match arg {
            DatasetArg::Mnist => DatasetKind::Mnist,
            DatasetArg::Fashion => DatasetKind::FashionMnist,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Hub,
    IdxDir,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HeaderArg {
    Tagged,
    Untagged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LabelsArg {
    Byte,
    Word,
}

impl Cli {
    pub fn source_config(&self) -> SourceConfig {
        let source = match self.source {
            SourceArg::Hub => DataSource::Hub {
                cache_dir: self.cache_dir.clone(),
            },
            SourceArg::IdxDir => DataSource::IdxDirectory {
                path: self.idx_dir.clone(),
            },
        };
        SourceConfig {
            kind: self.dataset.into(),
            source,
            threads: self.threads,
        }
    }

    pub fn export_config(&self) -> Result<ExportConfig, ExportError> {
        let header = match self.header {
            HeaderArg::Tagged => HeaderLayout::Tagged,
            HeaderArg::Untagged => HeaderLayout::Untagged,
        };
        let labels = match self.labels {
            LabelsArg::Byte => LabelWidth::Byte,
            LabelsArg::Word => LabelWidth::Word,
        };
        ExportConfig {
            output_dir: self.output_dir.clone(),
            examples_dir: self.examples_dir.clone(),
            format: IdxFormat { header, labels },
            ..Default::default()
        }
        .build()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Save,
    Example(u8),
    Examples,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Usage {
    Command,
    Label { num_classes: u8 },
}

impl Usage {
    pub fn message(&self) -> String {
        match self {
            Usage::Command => ">>> INVALID COMMAND LINE: Usage:\n\
                 \x20      save: saves the dataset\n\
                 \x20      example [n]: saves an image labeled as n (integer)\n\
                 \x20      examples: saves an example of each class"
                .to_string(),
            Usage::Label { num_classes } => format!(
                ">>> INVALID INPUT: The label must be an integer between 0 and {}",
                num_classes.saturating_sub(1)
            ),
        }
    }
}

#[derive(Debug)]
pub enum Parsed {
    Run(Box<Cli>, Action),
    Usage(Usage),
    /// Help or version output requested by the user
    Info(clap::Error),
}

pub fn parse<I, T>(args: I) -> Parsed
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => {
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => Parsed::Info(e),
                _ => Parsed::Usage(Usage::Command),
            }
        }
    };

    let num_classes = DatasetKind::from(cli.dataset).num_classes();
    let action = match &cli.command {
        Command::Save => Action::Save,
        Command::Examples => Action::Examples,
        Command::Example { class } => match parse_class(class, num_classes) {
            Some(class) => Action::Example(class),
            None => return Parsed::Usage(Usage::Label { num_classes }),
        },
    };

    Parsed::Run(Box::new(cli), action)
}

fn parse_class(raw: &str, num_classes: u8) -> Option<u8> {
    let class = raw.trim().parse::<i64>().ok()?;
    if (0..num_classes as i64).contains(&class) {
        Some(class as u8)
    } else {
        None
    }
}

pub fn run(cli: &Cli, action: Action) -> Result<(), ExportError> {
    let config = cli.export_config()?;
    let source = cli.source_config().open();
    run_with(source.as_ref(), &config, action)
}

/// Executes `action` against any source. Only the train split is used for
/// example images.
pub fn run_with(source: &dyn DatasetSource, config: &ExportConfig, action: Action) -> Result<(), ExportError> {
    let kind = source.kind();
    match action {
        Action::Save => {
            info!("saving the {} dataset", kind.name());
            let dataset = source.load()?;
            save_dataset(&dataset, config)
        }
        Action::Example(class) => {
            let dataset = source.load()?;
            match save_example_image(kind, class, &dataset.train, config) {
                Err(ExportError::ClassNotFound(class)) => {
                    warn!("no image labeled {class}, nothing saved");
                    Ok(())
                }
                result => result.map(|_| ()),
            }
        }
        Action::Examples => {
            let dataset = source.load()?;
            let saved = save_examples(kind, &dataset.train, config)?;
            info!("saved {} example images", saved.len());
            Ok(())
        }
    }
}
