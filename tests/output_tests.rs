// Integration tests for the console sink

mod common;

use common::texts;
use scriptpad::output::{escape_html, OutputKind, OutputSink};

#[test]
fn test_writes_append_in_order() {
    let mut sink = OutputSink::new();
    for i in 0..5 {
        sink.write_ok(format!("line {}", i));
    }
    sink.write_error("boom");
    assert_eq!(sink.len(), 6);
    assert_eq!(sink.entries()[0].text, "line 0");
    assert_eq!(sink.entries()[5].kind, OutputKind::Error);
    assert_eq!(texts(&sink, OutputKind::Error), vec!["boom"]);
}

#[test]
fn test_clear_empties_log_and_rich_region() {
    let mut sink = OutputSink::new();
    sink.write_ok("a");
    sink.render_rich("<p>plot</p>");
    assert!(sink.rich().content().is_some());

    sink.clear();
    assert!(sink.is_empty());
    assert!(sink.rich().content().is_none());
    assert_eq!(sink.to_markup(), "");
}

#[test]
fn test_markup_is_escaped() {
    let mut sink = OutputSink::new();
    sink.write_ok("<script>alert(\"x\") & 'y'</script>");
    assert_eq!(
        sink.to_markup(),
        "&lt;script&gt;alert(&quot;x&quot;) &amp; &#039;y&#039;&lt;/script&gt;\n"
    );
}

#[test]
fn test_error_entries_are_wrapped() {
    let mut sink = OutputSink::new();
    sink.write_error("a < b");
    assert_eq!(sink.to_markup(), "<span class=\"error\">a &lt; b</span>\n");
    assert_eq!(sink.to_plain(), "a < b\n");
}

#[test]
fn test_escape_leaves_plain_text_alone() {
    assert_eq!(escape_html("plain text 123"), "plain text 123");
    assert_eq!(escape_html("&amp;"), "&amp;amp;");
}

#[test]
fn test_rich_region_replaces_content() {
    let mut sink = OutputSink::new();
    sink.render_rich("<h1>First</h1>");
    let first = sink.rich().generation();
    sink.render_rich("<h1>Second</h1><p>body</p>");

    assert!(sink.rich().generation() > first);
    let content = sink.rich().content().unwrap();
    assert_eq!(content.markup, "<h1>Second</h1><p>body</p>");
    assert!(content.text_lines.iter().any(|l| l.contains("Second")));
    assert!(!content.text_lines.iter().any(|l| l.contains("First")));
}

#[test]
fn test_empty_rich_markup_leaves_region_empty() {
    let mut sink = OutputSink::new();
    sink.render_rich("<p>x</p>");
    sink.render_rich("");
    assert!(sink.rich().content().is_none());
}

#[test]
fn test_writes_pin_scroll_to_bottom() {
    let mut sink = OutputSink::new();
    sink.scroll = 3;
    sink.write_ok("x");
    assert!(sink.follows_tail());
}

#[test]
fn test_multiline_entry_counts_lines() {
    let mut sink = OutputSink::new();
    sink.write_error("a\nb\nc");
    sink.write_ok("d");
    assert_eq!(sink.log().line_count(), 4);
}
