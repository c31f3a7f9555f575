//! The source buffer the run trigger executes

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Editor collaborator: holds the program text
pub trait Editor {
    fn get_value(&self) -> String;
    fn set_value(&mut self, value: String);
}

/// In-memory buffer, optionally backed by a file the user edits externally
#[derive(Debug, Clone, Default)]
pub struct SourceBuffer {
    text: String,
    path: Option<PathBuf>,
}

impl SourceBuffer {
    pub fn new(text: impl Into<String>) -> Self {
        SourceBuffer {
            text: text.into(),
            path: None,
        }
    }

    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(SourceBuffer {
            text: fs::read_to_string(path)?,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the backing file; returns false when there is none
    pub fn reload(&mut self) -> io::Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };
        self.text = fs::read_to_string(path)?;
        Ok(true)
    }
}

impl Editor for SourceBuffer {
    fn get_value(&self) -> String {
        self.text.clone()
    }

    /// Replaces the text and detaches the buffer from its file
    fn set_value(&mut self, value: String) {
        self.text = value;
        self.path = None;
    }
}
