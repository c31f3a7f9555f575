//! Example catalog and the loader that swaps examples into the session
//!
//! A catalog is a TOML file listing example scripts:
//!
//! ```toml
//! [[example]]
//! title = "Ring network"
//! url = "network_ring.py"
//! description = "Four cells connected with delayed synapses."
//! files = [{ path = "ring.swc", url = "ring.swc" }]
//! enabled = true
//! ```
//!
//! Relative URLs resolve against the catalog file's directory.

pub mod buffer;
pub mod fs;

pub use buffer::{Editor, SourceBuffer};
pub use fs::{DirFs, Fetch, FilePayload, LocalFetcher, VirtualFs};

use crate::exec::{ExecutionDriver, RunError};
use crate::output::OutputSink;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Failures while reading the catalog or staging an example
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported url `{0}` (only local paths can be fetched)")]
    UnsupportedUrl(String),

    #[error("{url} is not valid UTF-8 text")]
    NotText { url: String },

    #[error("path `{0}` escapes the workspace")]
    OutsideWorkspace(PathBuf),

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no example named `{0}`")]
    UnknownExample(String),

    #[error(transparent)]
    Run(#[from] RunError),
}

/// Auxiliary file an example expects in its working directory
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AuxFile {
    pub path: String,
    pub url: String,
    #[serde(default)]
    pub binary: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Example {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<AuxFile>,
    /// Run automatically after loading
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Example {
    /// Lookup key: the file stem of the script url
    pub fn slug(&self) -> String {
        Path::new(&self.url)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.title.to_lowercase().replace(' ', "_"))
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "example")]
    examples: Vec<Example>,
}

/// Loaded catalog with a slug index
#[derive(Debug, Default)]
pub struct Catalog {
    examples: Vec<Example>,
    by_slug: FxHashMap<String, usize>,
    base_dir: PathBuf,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&text, base_dir).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str, base_dir: PathBuf) -> Result<Self, toml::de::Error> {
        let file: CatalogFile = toml::from_str(text)?;
        Ok(Self::from_examples(file.examples, base_dir))
    }

    pub fn from_examples(examples: Vec<Example>, base_dir: PathBuf) -> Self {
        let mut by_slug = FxHashMap::default();
        for (idx, example) in examples.iter().enumerate() {
            by_slug.entry(example.slug()).or_insert(idx);
        }
        Catalog {
            examples,
            by_slug,
            base_dir,
        }
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn get(&self, idx: usize) -> Option<&Example> {
        self.examples.get(idx)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Index of the example with this slug
    pub fn position(&self, slug: &str) -> Option<usize> {
        self.by_slug.get(slug).copied()
    }

    /// Directory relative urls resolve against
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// What a load ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Buffer replaced and a run started
    Started,
    /// Buffer replaced, example is not run automatically
    Loaded,
}

/// Fetches example sources and files and stages them for a run
pub struct ExampleLoader {
    fetcher: Box<dyn Fetch>,
    fs: Box<dyn VirtualFs>,
    home: PathBuf,
}

impl ExampleLoader {
    pub fn new(fetcher: Box<dyn Fetch>, fs: Box<dyn VirtualFs>) -> Self {
        ExampleLoader {
            fetcher,
            fs,
            home: PathBuf::from("."),
        }
    }

    /// Directory auxiliary files are written into, relative to the workspace root
    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }

    pub fn load(
        &mut self,
        example: &Example,
        editor: &mut dyn Editor,
        driver: &mut ExecutionDriver,
        sink: &mut OutputSink,
    ) -> Result<LoadOutcome, LoadError> {
        if driver.is_running() {
            return Err(RunError::Busy.into());
        }
        info!(title = %example.title, "loading example");

        sink.clear();
        let source = self.fetcher.fetch_text(&example.url)?;
        editor.set_value(source);

        if !example.files.is_empty() {
            self.fs.chdir(&self.home)?;
            for file in &example.files {
                let payload = if file.binary {
                    FilePayload::Binary(self.fetcher.fetch(&file.url)?)
                } else {
                    FilePayload::Text(self.fetcher.fetch_text(&file.url)?)
                };
                self.fs.write_file(Path::new(&file.path), payload)?;
                sink.write_ok(format!("Created file \"{}\"", file.path));
            }
        }

        if example.enabled {
            driver.run(None, editor, sink)?;
            Ok(LoadOutcome::Started)
        } else {
            sink.write_ok("Note: script not automatically executed");
            Ok(LoadOutcome::Loaded)
        }
    }
}
