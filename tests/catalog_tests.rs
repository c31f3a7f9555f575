// Integration tests for the example catalog and loader

mod common;

use common::{scripted_driver, texts};
use scriptpad::catalog::{
    Catalog, DirFs, Editor, ExampleLoader, LoadError, LoadOutcome, LocalFetcher, SourceBuffer,
};
use scriptpad::exec::RunError;
use scriptpad::output::{OutputKind, OutputSink};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

const CATALOG: &str = r#"
[[example]]
title = "Hello"
url = "hello.py"
description = "Prints a number."

[[example]]
title = "Data"
url = "scripts/data.py"
enabled = false
files = [
    { path = "data/points.csv", url = "points.csv" },
    { path = "blob.bin", url = "blob.bin", binary = true },
]
"#;

fn setup() -> (tempfile::TempDir, Catalog) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("catalog.toml"), CATALOG).unwrap();
    fs::write(dir.path().join("hello.py"), "print(1+1)\n").unwrap();
    fs::create_dir_all(dir.path().join("scripts")).unwrap();
    fs::write(dir.path().join("scripts/data.py"), "print(open('data/points.csv').read())\n").unwrap();
    fs::write(dir.path().join("points.csv"), "x,y\n1,2\n").unwrap();
    fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();
    let catalog = Catalog::load(&dir.path().join("catalog.toml")).unwrap();
    (dir, catalog)
}

fn loader(dir: &Path) -> ExampleLoader {
    ExampleLoader::new(
        Box::new(LocalFetcher::new(dir)),
        Box::new(DirFs::new(dir.join("work"))),
    )
    .with_home("home/user")
}

#[test]
fn test_catalog_parses_examples() {
    let (dir, catalog) = setup();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.base_dir(), dir.path());

    let hello = catalog.get(0).unwrap();
    assert_eq!(hello.title, "Hello");
    assert!(hello.enabled);
    assert!(hello.files.is_empty());

    let data = catalog.get(1).unwrap();
    assert!(!data.enabled);
    assert_eq!(data.files.len(), 2);
    assert!(data.files[1].binary);
    assert_eq!(data.slug(), "data");
    assert_eq!(catalog.position("data"), Some(1));
    assert_eq!(catalog.position("missing"), None);
}

#[test]
fn test_malformed_catalog_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.toml");
    fs::write(&path, "[[example]]\ntitle = 3\n").unwrap();
    assert!(matches!(Catalog::load(&path), Err(LoadError::Parse { .. })));
    assert!(matches!(
        Catalog::load(&dir.path().join("nope.toml")),
        Err(LoadError::Read { .. })
    ));
}

#[test]
fn test_load_enabled_example_runs_it() {
    let (dir, catalog) = setup();
    let (mut driver, interpreter) = scripted_driver();
    let mut buffer = SourceBuffer::new("old");
    let mut sink = OutputSink::new();
    sink.write_ok("previous run");

    let outcome = loader(dir.path())
        .load(catalog.get(0).unwrap(), &mut buffer, &mut driver, &mut sink)
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Started);
    assert_eq!(buffer.get_value(), "print(1+1)\n");

    while driver.pump(&mut sink).is_none() {
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(interpreter.seen(), vec!["print(1+1)\n"]);
    let ok = texts(&sink, OutputKind::Ok);
    assert!(ok[0].starts_with("Console output"));
    assert_eq!(ok[1], "2");
}

#[test]
fn test_load_disabled_example_stages_files() {
    let (dir, catalog) = setup();
    let (mut driver, interpreter) = scripted_driver();
    let mut buffer = SourceBuffer::default();
    let mut sink = OutputSink::new();
    sink.write_ok("previous run");

    let outcome = loader(dir.path())
        .load(catalog.get(1).unwrap(), &mut buffer, &mut driver, &mut sink)
        .unwrap();

    assert_eq!(outcome, LoadOutcome::Loaded);
    assert!(!driver.is_running());
    assert!(interpreter.seen().is_empty());
    assert_eq!(
        texts(&sink, OutputKind::Ok),
        vec![
            "Created file \"data/points.csv\"",
            "Created file \"blob.bin\"",
            "Note: script not automatically executed",
        ]
    );

    let home = dir.path().join("work/home/user");
    assert_eq!(fs::read_to_string(home.join("data/points.csv")).unwrap(), "x,y\n1,2\n");
    assert_eq!(fs::read(home.join("blob.bin")).unwrap(), vec![0u8, 159, 146, 150]);
}

#[test]
fn test_missing_source_is_reported() {
    let (dir, catalog) = setup();
    fs::remove_file(dir.path().join("hello.py")).unwrap();
    let (mut driver, _) = scripted_driver();
    let mut buffer = SourceBuffer::new("kept");
    let mut sink = OutputSink::new();

    let err = loader(dir.path())
        .load(catalog.get(0).unwrap(), &mut buffer, &mut driver, &mut sink)
        .unwrap_err();
    assert!(matches!(err, LoadError::Read { .. }));
    assert_eq!(buffer.get_value(), "kept");
    assert!(!driver.is_running());
}

#[test]
fn test_binary_source_is_not_text() {
    let (dir, catalog) = setup();
    fs::write(dir.path().join("hello.py"), [0xffu8, 0xfe]).unwrap();
    let (mut driver, _) = scripted_driver();
    let mut sink = OutputSink::new();

    let err = loader(dir.path())
        .load(catalog.get(0).unwrap(), &mut SourceBuffer::default(), &mut driver, &mut sink)
        .unwrap_err();
    assert!(matches!(err, LoadError::NotText { .. }));
}

#[test]
fn test_escaping_file_path_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.py"), "pass").unwrap();
    fs::write(dir.path().join("x.txt"), "x").unwrap();
    let catalog = Catalog::parse(
        "[[example]]\ntitle = \"A\"\nurl = \"a.py\"\nfiles = [{ path = \"../../x.txt\", url = \"x.txt\" }]\n",
        dir.path().to_path_buf(),
    )
    .unwrap();
    let (mut driver, _) = scripted_driver();
    let mut sink = OutputSink::new();

    let err = ExampleLoader::new(
        Box::new(LocalFetcher::new(dir.path())),
        Box::new(DirFs::new(dir.path().join("work"))),
    )
    .load(catalog.get(0).unwrap(), &mut SourceBuffer::default(), &mut driver, &mut sink)
    .unwrap_err();
    assert!(matches!(err, LoadError::OutsideWorkspace(_)));
}

#[test]
fn test_load_while_busy_is_rejected() {
    let (dir, catalog) = setup();
    let (mut driver, interpreter) = scripted_driver();
    let mut buffer = SourceBuffer::new("block");
    let mut sink = OutputSink::new();
    driver.run(None, &buffer, &mut sink).unwrap();

    let err = loader(dir.path())
        .load(catalog.get(0).unwrap(), &mut buffer, &mut driver, &mut sink)
        .unwrap_err();
    assert!(matches!(err, LoadError::Run(RunError::Busy)));
    assert_eq!(buffer.get_value(), "block");

    interpreter.release();
    while driver.pump(&mut sink).is_none() {
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_set_value_detaches_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.py");
    fs::write(&path, "a = 1\n").unwrap();

    let mut buffer = SourceBuffer::open(&path).unwrap();
    fs::write(&path, "a = 2\n").unwrap();
    assert!(buffer.reload().unwrap());
    assert_eq!(buffer.text(), "a = 2\n");

    buffer.set_value("b = 3".to_string());
    assert!(buffer.path().is_none());
    assert!(!buffer.reload().unwrap());
}
