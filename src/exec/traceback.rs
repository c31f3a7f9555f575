//! Traceback trimming
//!
//! A failure report starts with the interpreter's own bootstrap frames. Only
//! the frames from the point execution entered the user's script are shown.

use super::interpreter::RawFailure;

/// First line of every filtered report
pub const FAILURE_HEADER: &str = "PythonError: Traceback (most recent call last)";

/// Virtual filename user source is compiled under
pub const DEFAULT_ENTRY_POINT: &str = "main.py";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracebackFilter {
    marker: String,
}

impl TracebackFilter {
    /// `marker` is the entry-point name; the first line containing it opens
    /// the user-visible part of the report
    pub fn new(marker: impl Into<String>) -> Self {
        TracebackFilter {
            marker: marker.into(),
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Drop the title line and everything before the first marker line.
    ///
    /// If the marker never shows up only the header remains.
    pub fn filter<'a, I>(&self, frames: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut filtered = vec![FAILURE_HEADER.to_string()];
        let mut skip = true;
        for line in frames.into_iter().skip(1) {
            if skip && line.contains(self.marker.as_str()) {
                skip = false;
            }
            if !skip {
                filtered.push(line.to_string());
            }
        }
        filtered
    }

    /// Filtered report as a single block of text
    pub fn report(&self, failure: &RawFailure) -> String {
        self.filter(failure.frames()).join("\n")
    }
}

impl Default for TracebackFilter {
    fn default() -> Self {
        TracebackFilter::new(DEFAULT_ENTRY_POINT)
    }
}
