//! The console session: one object owning layout, console, driver and buffer
//!
//! UI handlers are thin adapters that translate terminal events into calls on
//! [`Session`]; all state changes happen here.

use crate::catalog::{
    Catalog, DirFs, ExampleLoader, LoadError, LoadOutcome, LocalFetcher, SourceBuffer,
};
use crate::config::Config;
use crate::exec::{
    ExecutionDriver, ExecutionResult, PythonInterpreter, RunError, TracebackFilter,
};
use crate::layout::{Disposition, PaneLayout, PointerEvent};
use crate::output::OutputSink;
use ratatui::layout::Rect;
use std::path::Path;
use tracing::{info, warn};

/// Overlay currently shown on top of the panes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modal {
    #[default]
    Hidden,
    Welcome,
    Catalog {
        selected: usize,
    },
}

/// Startup progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    /// Waiting for the preload run to finish
    Preloading,
    Ready,
}

pub struct Session {
    pub layout: PaneLayout,
    pub sink: OutputSink,
    pub driver: ExecutionDriver,
    pub buffer: SourceBuffer,
    pub catalog: Catalog,
    pub modal: Modal,
    pub status: String,
    loader: ExampleLoader,
    module_name: String,
    preload: Option<String>,
    initial_example: Option<usize>,
    phase: Phase,
}

impl Session {
    pub fn new(
        layout: PaneLayout,
        driver: ExecutionDriver,
        catalog: Catalog,
        loader: ExampleLoader,
    ) -> Self {
        Session {
            layout,
            sink: OutputSink::new(),
            driver,
            buffer: SourceBuffer::default(),
            catalog,
            modal: Modal::Hidden,
            status: String::from("Starting..."),
            loader,
            module_name: String::from("playground"),
            preload: None,
            initial_example: None,
            phase: Phase::Starting,
        }
    }

    /// Build a session around a python child process as described by `config`
    pub fn from_config(config: &Config, catalog_path: Option<&Path>) -> Result<Self, LoadError> {
        let catalog = match catalog_path.or(config.catalog.path.as_deref()) {
            Some(path) => Catalog::load(path)?,
            None => Catalog::default(),
        };

        let interpreter = PythonInterpreter::new(config.interpreter.python());
        let filter = TracebackFilter::new(config.interpreter.entry_point.clone());
        let driver = ExecutionDriver::new(Box::new(interpreter), filter);

        let loader = ExampleLoader::new(
            Box::new(LocalFetcher::new(catalog.base_dir())),
            Box::new(DirFs::new(config.interpreter.workdir.clone())),
        )
        .with_home(config.catalog.home.clone());

        let mut session = Session::new(config.layout.pane_layout(), driver, catalog, loader);
        session.module_name = config.interpreter.module_name.clone();
        session.preload = config.interpreter.preload.clone();
        session.initial_example = config.catalog.autoload.then_some(0);
        Ok(session)
    }

    pub fn with_buffer(mut self, buffer: SourceBuffer) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_preload(mut self, preload: Option<String>) -> Self {
        self.preload = preload;
        self
    }

    /// Example loaded once startup is done
    pub fn with_initial_example(mut self, idx: Option<usize>) -> Self {
        self.initial_example = idx;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.driver.is_running()
    }

    /// Kick off the startup sequence; it completes over later [`tick`]s
    ///
    /// [`tick`]: Session::tick
    pub fn start(&mut self) {
        self.sink.write_ok("Loading...");
        self.sink.write_ok(format!(
            "Registered html render module `{}`",
            self.module_name
        ));

        match self.preload.clone() {
            Some(source) => match self.driver.run(Some(source), &self.buffer, &mut self.sink) {
                Ok(()) => {
                    self.phase = Phase::Preloading;
                    self.status = String::from("Caching imports...");
                }
                Err(e) => {
                    warn!(error = %e, "preload not started");
                    self.ready();
                }
            },
            None => self.ready(),
        }
    }

    fn ready(&mut self) {
        self.phase = Phase::Ready;
        self.sink.write_ok("Ready!");
        self.status = String::from("Ready!");

        if let Some(idx) = self.initial_example.take() {
            if idx < self.catalog.len() {
                let _ = self.load_example(idx);
            }
        }
        self.modal = Modal::Welcome;
    }

    /// Pump the driver; call once per UI loop iteration
    pub fn tick(&mut self) -> Option<ExecutionResult> {
        let previous = self.driver.last_checkpoint();
        let result = self.driver.pump(&mut self.sink)?;
        let checkpoint = self.driver.last_checkpoint();

        if self.phase == Phase::Preloading {
            if result.is_ok() {
                self.sink.write_ok("Cached imports");
            }
            self.ready();
        } else if checkpoint == previous {
            // Preload runs leave the checkpoint alone
            self.status = if result.is_ok() {
                String::from("Preload finished")
            } else {
                String::from("Preload failed")
            };
        } else if let Some(checkpoint) = checkpoint {
            self.status = match &result {
                ExecutionResult::Ok => format!("Finished in {} ms", checkpoint.elapsed.as_millis()),
                ExecutionResult::Failed { .. } => {
                    format!("Failed after {} ms", checkpoint.elapsed.as_millis())
                }
            };
        }
        Some(result)
    }

    /// Run the current buffer (the "Run" trigger)
    pub fn run_buffer(&mut self) -> Result<(), RunError> {
        if !self.driver.trigger().is_enabled() {
            self.status = String::from("A run is already in progress");
            return Err(RunError::Busy);
        }
        match self.driver.run(None, &self.buffer, &mut self.sink) {
            Ok(()) => {
                self.status = String::from("Running...");
                Ok(())
            }
            Err(e) => {
                self.status = e.to_string();
                Err(e)
            }
        }
    }

    /// Run `source` without touching the console or the trigger
    pub fn preload(&mut self, source: impl Into<String>) -> Result<(), RunError> {
        self.driver.run(Some(source.into()), &self.buffer, &mut self.sink)?;
        self.status = String::from("Preloading...");
        Ok(())
    }

    pub fn load_example(&mut self, idx: usize) -> Result<LoadOutcome, LoadError> {
        let Some(example) = self.catalog.get(idx) else {
            return Err(LoadError::UnknownExample(idx.to_string()));
        };
        let title = example.title.clone();
        let result = self
            .loader
            .load(example, &mut self.buffer, &mut self.driver, &mut self.sink);

        match &result {
            Ok(LoadOutcome::Started) => self.status = format!("Running {}", title),
            Ok(LoadOutcome::Loaded) => self.status = format!("Loaded {}", title),
            Err(LoadError::Run(e)) => self.status = e.to_string(),
            Err(e) => {
                warn!(error = %e, "example load failed");
                self.sink.write_error(e.to_string());
                self.status = format!("Could not load {}", title);
            }
        }
        result
    }

    pub fn load_slug(&mut self, slug: &str) -> Result<LoadOutcome, LoadError> {
        let idx = self
            .catalog
            .position(slug)
            .ok_or_else(|| LoadError::UnknownExample(slug.to_string()))?;
        self.load_example(idx)
    }

    /// Re-read the buffer's backing file
    pub fn reload_buffer(&mut self) {
        self.status = match self.buffer.reload() {
            Ok(true) => String::from("Reloaded from disk"),
            Ok(false) => String::from("Buffer has no backing file"),
            Err(e) => format!("Reload failed: {}", e),
        };
    }

    pub fn restart_interpreter(&mut self) {
        self.status = match self.driver.restart() {
            Ok(()) => String::from("Interpreter restarted"),
            Err(e) => e.to_string(),
        };
    }

    pub fn pointer_down(&mut self, event: &PointerEvent) -> Disposition {
        self.layout.begin_drag(event)
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, container: Rect) -> Disposition {
        self.layout.update_drag(event, container)
    }

    pub fn pointer_up(&mut self) {
        self.layout.end_drag();
    }

    pub fn show_modal(&mut self, modal: Modal) {
        self.modal = modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::Hidden;
    }

    pub fn catalog_move(&mut self, delta: isize) {
        if let Modal::Catalog { selected } = &mut self.modal {
            let last = self.catalog.len().saturating_sub(1);
            *selected = selected.saturating_add_signed(delta).min(last);
        }
    }

    /// Load the highlighted catalog entry and close the overlay
    pub fn catalog_confirm(&mut self) {
        if let Modal::Catalog { selected } = self.modal {
            if self.load_example(selected).is_ok() {
                info!(selected, "example chosen from catalog");
            }
            self.close_modal();
        }
    }
}
