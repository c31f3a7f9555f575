// Integration tests for traceback trimming

use scriptpad::exec::{RawFailure, TracebackFilter, FAILURE_HEADER};

#[test]
fn test_frames_before_marker_are_dropped() {
    let filter = TracebackFilter::new("MARKER");
    let frames = ["header", "A", "B", "in MARKER here", "C", "D"];
    assert_eq!(
        filter.filter(frames),
        vec![FAILURE_HEADER, "in MARKER here", "C", "D"]
    );
}

#[test]
fn test_missing_marker_leaves_only_header() {
    let filter = TracebackFilter::new("main.py");
    assert_eq!(filter.filter(["header", "A", "B"]), vec![FAILURE_HEADER]);
}

#[test]
fn test_marker_on_first_line_is_ignored() {
    let filter = TracebackFilter::new("main.py");
    let frames = ["main.py title", "bootstrap", "File \"main.py\", line 2", "ValueError"];
    assert_eq!(
        filter.filter(frames),
        vec![FAILURE_HEADER, "File \"main.py\", line 2", "ValueError"]
    );
}

#[test]
fn test_later_marker_lines_are_kept() {
    let filter = TracebackFilter::default();
    let failure = RawFailure::new(
        "Traceback (most recent call last):\n  File \"<exec>\", line 9\n  File \"main.py\", line 4, in <module>\n  File \"main.py\", line 2, in f\nZeroDivisionError: division by zero",
    );
    let report = filter.report(&failure);
    assert_eq!(
        report,
        "PythonError: Traceback (most recent call last)\n  File \"main.py\", line 4, in <module>\n  File \"main.py\", line 2, in f\nZeroDivisionError: division by zero"
    );
}

#[test]
fn test_empty_failure_gives_header() {
    let filter = TracebackFilter::default();
    assert_eq!(filter.report(&RawFailure::new("")), FAILURE_HEADER);
}
