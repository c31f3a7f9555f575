//! Console output sink
//!
//! Collects the textual log written by a run (stdout as ok entries, stderr
//! and failure reports as error entries) and the rich output region that
//! scripts fill through `render_html`.

use std::fmt::Write as _;

/// Style of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Ok,
    Error,
}

/// One write to the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    pub kind: OutputKind,
    pub text: String,
}

impl OutputEntry {
    /// Lines of this entry as shown in the console pane
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Append-only log of entries since the last clear
#[derive(Debug, Clone, Default)]
pub struct OutputLog {
    entries: Vec<OutputEntry>,
}

impl OutputLog {
    pub fn push(&mut self, kind: OutputKind, text: String) {
        self.entries.push(OutputEntry { kind, text });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[OutputEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of display lines
    pub fn line_count(&self) -> usize {
        self.entries.iter().map(|e| e.lines().count()).sum()
    }
}

/// Markup rendered by a script, with a plain-text view for the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichContent {
    pub markup: String,
    pub text_lines: Vec<String>,
}

impl RichContent {
    pub fn new(markup: String) -> Self {
        let text_lines = markup_to_text(&markup);
        RichContent { markup, text_lines }
    }
}

/// Region holding at most one piece of rich content
#[derive(Debug, Default)]
pub struct RichRegion {
    content: Option<RichContent>,
    generation: u64,
}

impl RichRegion {
    /// Swap in new content. The previous content is detached and dropped
    /// before the new content is attached.
    pub fn replace(&mut self, markup: String) {
        drop(self.content.take());
        self.generation += 1;
        if !markup.is_empty() {
            self.content = Some(RichContent::new(markup));
        }
    }

    pub fn clear(&mut self) {
        self.replace(String::new());
    }

    pub fn content(&self) -> Option<&RichContent> {
        self.content.as_ref()
    }

    /// Bumped on every replace, including clears
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The console: textual log, rich region and the scroll position of the log
#[derive(Debug, Default)]
pub struct OutputSink {
    log: OutputLog,
    rich: RichRegion,
    /// Scroll offset of the console pane; `usize::MAX` pins it to the bottom
    pub scroll: usize,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_ok(&mut self, text: impl Into<String>) {
        self.log.push(OutputKind::Ok, text.into());
        self.scroll_to_bottom();
    }

    pub fn write_error(&mut self, text: impl Into<String>) {
        self.log.push(OutputKind::Error, text.into());
        self.scroll_to_bottom();
    }

    /// Empty both the log and the rich output region
    pub fn clear(&mut self) {
        self.log.clear();
        self.rich.clear();
        self.scroll = 0;
    }

    pub fn render_rich(&mut self, markup: impl Into<String>) {
        self.rich.replace(markup.into());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = usize::MAX;
    }

    pub fn follows_tail(&self) -> bool {
        self.scroll == usize::MAX
    }

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    pub fn entries(&self) -> &[OutputEntry] {
        self.log.entries()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn rich(&self) -> &RichRegion {
        &self.rich
    }

    /// The log as escaped markup, error entries wrapped in an `error` span
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for entry in self.log.entries() {
            match entry.kind {
                OutputKind::Ok => {
                    let _ = writeln!(out, "{}", escape_html(&entry.text));
                }
                OutputKind::Error => {
                    let _ = writeln!(out, "<span class=\"error\">{}</span>", escape_html(&entry.text));
                }
            }
        }
        out
    }

    /// The log as plain text, one entry per line
    pub fn to_plain(&self) -> String {
        let mut out = String::new();
        for entry in self.log.entries() {
            out.push_str(&entry.text);
            out.push('\n');
        }
        out
    }
}

/// Escape text for inclusion in markup.
///
/// All of `& < > " '` are escaped; the apostrophe is written as `&#039;`.
pub fn escape_html(text: &str) -> String {
    // An escaped `&` never leaves a literal `&#x27;` behind, so the rewrite
    // only touches apostrophes
    html_escape::encode_quoted_attribute(text).replace("&#x27;", "&#039;")
}

/// Tags whose body is not text, with the lowercase start of their closing tag
const RAW_TEXT_TAGS: &[(&str, &str)] = &[("script", "</script"), ("style", "</style")];

/// Tags that start a new line in the text view
const BLOCK_TAGS: &[&str] = &["br", "p", "div", "tr", "li", "h1", "h2", "h3", "pre"];

/// `tag` is `name`, optionally followed by attributes
fn tag_named(tag: &str, name: &str) -> bool {
    tag.strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Strip tags and scripts from markup, keeping readable text lines
fn markup_to_text(markup: &str) -> Vec<String> {
    let mut text = String::new();
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tail.find('>') else {
            rest = "";
            break;
        };
        let tag = tail[1..end].trim().to_ascii_lowercase();
        let mut after = &tail[end + 1..];

        // Script and style bodies are not text
        if let Some(close) = RAW_TEXT_TAGS
            .iter()
            .find(|(name, _)| tag_named(&tag, name))
            .map(|(_, close)| *close)
        {
            after = match after.to_ascii_lowercase().find(close) {
                Some(pos) => {
                    let closing = &after[pos..];
                    closing.find('>').map_or("", |gt| &closing[gt + 1..])
                }
                None => "",
            };
        }

        let name = tag.trim_start_matches('/');
        if name == "br/" || BLOCK_TAGS.iter().any(|block| tag_named(name, block)) {
            text.push('\n');
        } else if !tag.starts_with('/') && (tag_named(name, "td") || tag_named(name, "th")) {
            text.push(' ');
        }
        rest = after;
    }
    text.push_str(rest);

    let decoded = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    decoded
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_scripts() {
        let lines = markup_to_text("<div><b>Voltage</b> trace</div><script>var x = 1;</script><p>t &amp; v</p>");
        assert_eq!(lines, vec!["Voltage trace", "t & v"]);
    }

    #[test]
    fn unterminated_tag_is_dropped() {
        assert_eq!(markup_to_text("plot <div"), vec!["plot"]);
    }

    #[test]
    fn tags_with_attributes_are_recognised() {
        let lines = markup_to_text(
            "<style type=\"text/css\">td { color: red }</style><table><tr><td>a</td><td class=\"n\">1</td></tr><tr><th>b</th></tr></table>",
        );
        assert_eq!(lines, vec![" a 1", " b"]);
    }

    #[test]
    fn prefix_of_block_name_is_not_a_block() {
        // <pre> breaks the line, <param> does not
        assert_eq!(markup_to_text("x<param>y<pre>z"), vec!["xy", "z"]);
    }
}
