// Integration tests for the console session

mod common;

use common::{scripted_driver, texts};
use scriptpad::catalog::{Catalog, DirFs, ExampleLoader, LoadOutcome, LocalFetcher, SourceBuffer};
use scriptpad::exec::RunError;
use scriptpad::layout::{DragAxis, PaneLayout, PointerEvent, PointerTarget};
use scriptpad::output::OutputKind;
use scriptpad::session::{Modal, Phase, Session};
use ratatui::layout::Rect;
use std::fs;
use std::thread;
use std::time::Duration;

fn session(dir: &tempfile::TempDir) -> (Session, common::ScriptedInterpreter) {
    fs::write(dir.path().join("hello.py"), "print(1+1)").unwrap();
    fs::write(dir.path().join("quiet.py"), "x = 1").unwrap();
    let catalog = Catalog::parse(
        "[[example]]\ntitle = \"Hello\"\nurl = \"hello.py\"\n\n[[example]]\ntitle = \"Quiet\"\nurl = \"quiet.py\"\nenabled = false\n",
        dir.path().to_path_buf(),
    )
    .unwrap();
    let loader = ExampleLoader::new(
        Box::new(LocalFetcher::new(dir.path())),
        Box::new(DirFs::new(dir.path().join("work"))),
    );
    let (driver, interpreter) = scripted_driver();
    (
        Session::new(PaneLayout::default(), driver, catalog, loader),
        interpreter,
    )
}

fn settle(session: &mut Session) {
    while session.is_busy() {
        session.tick();
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_startup_without_preload() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, interpreter) = session(&dir);

    session.start();

    assert_eq!(session.phase(), Phase::Ready);
    assert_eq!(
        texts(&session.sink, OutputKind::Ok),
        vec!["Loading...", "Registered html render module `playground`", "Ready!"]
    );
    assert_eq!(session.modal, Modal::Welcome);
    assert!(interpreter.seen().is_empty());
}

#[test]
fn test_startup_with_preload_then_initial_example() {
    let dir = tempfile::tempdir().unwrap();
    let (session, interpreter) = session(&dir);
    let mut session = session
        .with_preload(Some("import math".to_string()))
        .with_initial_example(Some(0));

    session.start();
    assert_eq!(session.phase(), Phase::Preloading);
    assert!(session.driver.trigger().is_enabled());

    // Preload finishes, then the first example starts
    while session.phase() != Phase::Ready {
        session.tick();
        thread::sleep(Duration::from_millis(1));
    }
    settle(&mut session);

    assert_eq!(interpreter.seen(), vec!["import math", "print(1+1)"]);
    let ok = texts(&session.sink, OutputKind::Ok);
    // Loading the example cleared the startup messages
    assert!(ok[0].starts_with("Console output"));
    assert_eq!(ok[1], "2");
    assert_eq!(session.modal, Modal::Welcome);
}

#[test]
fn test_run_buffer_reports_busy() {
    let dir = tempfile::tempdir().unwrap();
    let (session, interpreter) = session(&dir);
    let mut session = session.with_buffer(SourceBuffer::new("block"));

    session.run_buffer().unwrap();
    assert_eq!(session.run_buffer(), Err(RunError::Busy));
    assert!(session.preload("import os").is_err());

    interpreter.release();
    settle(&mut session);
    assert!(session.status.starts_with("Finished in"));
    assert_eq!(interpreter.seen(), vec!["block"]);
}

#[test]
fn test_load_disabled_example_does_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, interpreter) = session(&dir);

    assert_eq!(session.load_slug("quiet").unwrap(), LoadOutcome::Loaded);
    assert_eq!(session.buffer.text(), "x = 1");
    assert!(!session.is_busy());
    assert!(interpreter.seen().is_empty());
    assert!(session.load_slug("nope").is_err());
}

#[test]
fn test_failed_load_is_written_to_console() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session(&dir);
    fs::remove_file(dir.path().join("hello.py")).unwrap();

    assert!(session.load_example(0).is_err());
    let errors = texts(&session.sink, OutputKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("hello.py"));
}

#[test]
fn test_catalog_modal_selection() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session(&dir);

    session.show_modal(Modal::Catalog { selected: 0 });
    session.catalog_move(5);
    assert_eq!(session.modal, Modal::Catalog { selected: 1 });
    session.catalog_move(-3);
    assert_eq!(session.modal, Modal::Catalog { selected: 0 });
    session.catalog_move(1);

    session.catalog_confirm();
    assert_eq!(session.modal, Modal::Hidden);
    assert_eq!(session.buffer.text(), "x = 1");
}

#[test]
fn test_pointer_gestures_resize_layout() {
    let dir = tempfile::tempdir().unwrap();
    let (mut session, _) = session(&dir);
    let container = Rect::new(0, 0, 101, 40);

    assert!(session
        .pointer_down(&PointerEvent::mouse(PointerTarget::HorizontalGutter, 50.0, 3.0))
        .is_consumed());
    session.pointer_move(&PointerEvent::mouse(PointerTarget::Other, 25.0, 3.0), container);
    session.pointer_up();

    assert_eq!(session.layout.active_axis(), DragAxis::None);
    assert_eq!(session.layout.columns().first_fraction(), 250);
}

#[test]
fn test_preload_after_ready_keeps_run_status_honest() {
    let dir = tempfile::tempdir().unwrap();
    let (session, interpreter) = session(&dir);
    let mut session = session.with_buffer(SourceBuffer::new("print(1+1)"));
    session.start();

    session.run_buffer().unwrap();
    settle(&mut session);
    assert!(session.status.starts_with("Finished in"));
    let checkpoint = session.driver.last_checkpoint();

    session.preload("import math").unwrap();
    assert_eq!(session.status, "Preloading...");
    settle(&mut session);

    assert_eq!(session.status, "Preload finished");
    assert_eq!(session.driver.last_checkpoint(), checkpoint);
    assert_eq!(interpreter.seen(), vec!["print(1+1)", "import math"]);
}
