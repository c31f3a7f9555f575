//! Fetching example resources and staging files for the interpreter

use super::LoadError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resource fetch collaborator
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError>;

    fn fetch_text(&self, url: &str) -> Result<String, LoadError> {
        String::from_utf8(self.fetch(url)?).map_err(|_| LoadError::NotText {
            url: url.to_string(),
        })
    }
}

/// Reads urls as paths relative to a base directory
#[derive(Debug, Clone)]
pub struct LocalFetcher {
    base: PathBuf,
}

impl LocalFetcher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LocalFetcher { base: base.into() }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, LoadError> {
        if url.contains("://") {
            let local = url.strip_prefix("file://").ok_or_else(|| LoadError::UnsupportedUrl(url.to_string()))?;
            return Ok(PathBuf::from(local));
        }
        Ok(self.base.join(url))
    }
}

impl Fetch for LocalFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, LoadError> {
        let path = self.resolve(url)?;
        debug!(path = %path.display(), "fetching");
        fs::read(&path).map_err(|source| LoadError::Read { path, source })
    }
}

/// File contents to stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilePayload {
    Text(String),
    Binary(Vec<u8>),
}

impl FilePayload {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FilePayload::Text(text) => text.as_bytes(),
            FilePayload::Binary(bytes) => bytes,
        }
    }
}

/// Filesystem the interpreter sees
pub trait VirtualFs {
    fn chdir(&mut self, dir: &Path) -> Result<(), LoadError>;
    fn write_file(&mut self, path: &Path, payload: FilePayload) -> Result<(), LoadError>;
}

/// A real directory acting as the interpreter's filesystem root
#[derive(Debug, Clone)]
pub struct DirFs {
    root: PathBuf,
    cwd: PathBuf,
}

impl DirFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirFs {
            root: root.into(),
            cwd: PathBuf::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Current directory relative to the root
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Join `path` onto the cwd lexically, refusing to climb above the root
    fn confine(&self, path: &Path) -> Result<PathBuf, LoadError> {
        let mut out = if path.is_absolute() { PathBuf::new() } else { self.cwd.clone() };
        for component in path.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
                Component::ParentDir => {
                    if !out.pop() {
                        return Err(LoadError::OutsideWorkspace(path.to_path_buf()));
                    }
                }
            }
        }
        Ok(out)
    }
}

impl VirtualFs for DirFs {
    fn chdir(&mut self, dir: &Path) -> Result<(), LoadError> {
        let relative = self.confine(dir)?;
        let full = self.root.join(&relative);
        fs::create_dir_all(&full).map_err(|source| LoadError::Write { path: full, source })?;
        self.cwd = relative;
        Ok(())
    }

    fn write_file(&mut self, path: &Path, payload: FilePayload) -> Result<(), LoadError> {
        let full = self.root.join(self.confine(path)?);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|source| LoadError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&full, payload.as_bytes()).map_err(|source| LoadError::Write { path: full.clone(), source })?;
        debug!(path = %full.display(), "staged file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confine_rejects_escape() {
        let fs = DirFs::new("/tmp/root");
        assert!(fs.confine(Path::new("../etc/passwd")).is_err());
        assert_eq!(fs.confine(Path::new("a/../b.txt")).unwrap(), PathBuf::from("b.txt"));
        assert_eq!(fs.confine(Path::new("/home/x.csv")).unwrap(), PathBuf::from("home/x.csv"));
    }

    #[test]
    fn remote_urls_are_refused() {
        let fetcher = LocalFetcher::new("/tmp");
        assert!(matches!(
            fetcher.fetch("https://example.org/a.py"),
            Err(LoadError::UnsupportedUrl(_))
        ));
    }
}
