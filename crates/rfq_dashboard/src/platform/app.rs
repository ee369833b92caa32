use std::io::{self, BufRead};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use rfq_core::{update, AppState, Msg};
use rfq_engine::{ApiError, FetchRequest, FetchResult};
use rfq_logging::{rfq_info, rfq_warn};

use super::commands::{parse_command, Command, HELP};
use super::effects::EffectRunner;
use super::logging::{self, LogDestination};
use super::settings::{load_settings, settings_path};
use super::ui::{self, render};

/// Everything the main loop reacts to.
#[derive(Debug, PartialEq)]
pub enum Input {
    Msg(Msg),
    Line(String),
    Fetched {
        request: FetchRequest,
        result: Result<FetchResult, ApiError>,
    },
    InputClosed,
}

pub fn run_app() -> anyhow::Result<()> {
    let env = |key: &str| std::env::var(key).ok();
    let settings_file = settings_path(env);
    let loaded = load_settings(&settings_file);
    let settings = loaded.as_ref().ok().cloned().unwrap_or_default();

    let destination = if settings.log_to_terminal {
        LogDestination::Both
    } else {
        LogDestination::File
    };
    logging::initialize(destination, settings.log_level(env));
    if let Err(err) = &loaded {
        rfq_warn!("{:#}; using defaults", err);
    }

    let config = settings
        .client_config(env)
        .context("invalid connection settings")?;
    rfq_info!(
        "API at {}, sockets at {} (enabled: {})",
        config.api_base_url,
        config.ws_base_url,
        config.websocket_enabled
    );

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(config, input_tx.clone())?;
    spawn_stdin_reader(input_tx.clone());

    // Background tick to coalesce status output.
    thread::spawn(move || {
        let interval = Duration::from_millis(250);
        while input_tx.send(Input::Msg(Msg::Tick)).is_ok() {
            thread::sleep(interval);
        }
    });

    ui::print_lines(&["RFQ dashboard - type `help` for commands"]);
    let mut shell = Shell::new(runner, settings.download_dir());
    shell.dispatch(Msg::AppStarted);

    while let Ok(input) = input_rx.recv() {
        if shell.handle(input).is_break() {
            break;
        }
    }
    rfq_info!("Dashboard exiting");
    Ok(())
}

fn spawn_stdin_reader(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::InputClosed);
    });
}

struct Shell {
    state: AppState,
    runner: EffectRunner,
    download_dir: PathBuf,
    pending_render: bool,
    last_status: String,
}

impl Shell {
    fn new(runner: EffectRunner, download_dir: PathBuf) -> Self {
        Self {
            state: AppState::new(Utc::now()),
            runner,
            download_dir,
            pending_render: false,
            last_status: String::new(),
        }
    }

    fn handle(&mut self, input: Input) -> ControlFlow<()> {
        match input {
            Input::Msg(Msg::Tick) => {
                self.dispatch(Msg::Tick);
                self.render_if_dirty();
            }
            Input::Msg(msg) => self.dispatch(msg),
            Input::Fetched { request, result } => {
                ui::print_lines(&render::render_fetch(&request, &result));
            }
            Input::Line(line) if line.trim().is_empty() => {}
            Input::Line(line) => return self.run_command(&line),
            Input::InputClosed => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn run_command(&mut self, line: &str) -> ControlFlow<()> {
        match parse_command(line, Utc::now(), &self.download_dir) {
            Ok(Command::Msgs(msgs)) => {
                for msg in msgs {
                    self.dispatch(msg);
                }
                let view = self.state.view();
                if view.wizard.is_open {
                    ui::print_lines(&render::render_wizard(&view.wizard));
                }
            }
            Ok(Command::Fetch(request)) => self.runner.fetch(request),
            Ok(Command::Status) => ui::print_lines(&render::render_status(&self.state.view())),
            Ok(Command::Help) => ui::print_lines(&[HELP]),
            Ok(Command::Quit) => return ControlFlow::Break(()),
            Err(err) => ui::print_lines(&[format!("{err:#}")]),
        }
        ControlFlow::Continue(())
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::replace(&mut self.state, AppState::new(Utc::now()));
        let (mut state, effects) = update(state, msg);
        self.pending_render |= state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
    }

    fn render_if_dirty(&mut self) {
        if !std::mem::take(&mut self.pending_render) {
            return;
        }
        let line = render::status_line(&self.state.view());
        if line != self.last_status {
            ui::print_lines(&[line.as_str()]);
            self.last_status = line;
        }
    }
}
