//! Configuration loaded from `scriptpad.toml`
//!
//! Every field has a default, so a missing file or a partial file is fine.
//!
//! ```toml
//! [interpreter]
//! program = "python3"
//! preload = "import json, math"
//!
//! [layout]
//! column_share = 0.55
//!
//! [catalog]
//! path = "demos/catalog.toml"
//!
//! [log]
//! file = "scriptpad.log"
//! filter = "scriptpad=debug"
//! ```

use crate::exec::{PythonConfig, DEFAULT_ENTRY_POINT};
use crate::layout::{FractionBounds, PaneLayout, DEFAULT_MAX_FRACTION, DEFAULT_MIN_FRACTION, DEFAULT_TOTAL};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "scriptpad.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub layout: LayoutConfig,
    pub catalog: CatalogConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Virtual filename user code is compiled under
    pub entry_point: String,
    /// Module exposing `render_html` to scripts
    pub module_name: String,
    /// Interpreter working directory, where example files are staged
    pub workdir: PathBuf,
    /// Source run once at startup to warm the import cache
    pub preload: Option<String>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            program: "python3".to_string(),
            args: vec!["-u".to_string()],
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
            module_name: "playground".to_string(),
            workdir: PathBuf::from(".scriptpad"),
            preload: None,
        }
    }
}

impl InterpreterConfig {
    pub fn python(&self) -> PythonConfig {
        PythonConfig {
            program: self.program.clone(),
            args: self.args.clone(),
            entry_point: self.entry_point.clone(),
            module_name: self.module_name.clone(),
            workdir: self.workdir.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub min_fraction: f64,
    pub max_fraction: f64,
    pub total: u16,
    /// Initial width share of the source pane
    pub column_share: f64,
    /// Initial height share of the console within the output column
    pub row_share: f64,
    pub gutter: u16,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            min_fraction: DEFAULT_MIN_FRACTION,
            max_fraction: DEFAULT_MAX_FRACTION,
            total: DEFAULT_TOTAL,
            column_share: 0.5,
            row_share: 0.7,
            gutter: 1,
        }
    }
}

impl LayoutConfig {
    pub fn pane_layout(&self) -> PaneLayout {
        let bounds = FractionBounds::new(self.min_fraction, self.max_fraction, self.total);
        PaneLayout::new(bounds, self.column_share, self.row_share, self.gutter.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: Option<PathBuf>,
    /// Load the first example at startup
    pub autoload: bool,
    /// Directory example files are written into, relative to the workdir
    pub home: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            path: None,
            autoload: true,
            home: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file used while the TUI owns the terminal
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive used when `SCRIPTPAD_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            file: None,
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path`, or `scriptpad.toml` if present, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path),
            Err(e) if !required && e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::parse(
            "[interpreter]\npreload = \"import math\"\n[layout]\ncolumn_share = 0.3\n",
            Path::new("test.toml"),
        )
        .unwrap();
        assert_eq!(config.interpreter.program, "python3");
        assert_eq!(config.interpreter.preload.as_deref(), Some("import math"));
        assert_eq!(config.layout.column_share, 0.3);
        assert_eq!(config.layout.total, 1000);
        assert!(config.catalog.autoload);
    }

    #[test]
    fn unknown_value_type_is_an_error() {
        assert!(Config::parse("[layout]\ntotal = \"wide\"\n", Path::new("x.toml")).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/scriptpad.toml"))).is_err());
    }
}
