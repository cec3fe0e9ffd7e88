//! Application State and Logic
//!
//! This module defines the application state for the vizlab TUI. It manages:
//!
//! - The active tab (blockchain or LLM pipeline)
//! - The block ledger and the highlight of the newest block
//! - The LLM pipeline sequencer
//! - Key handling and the blunt full reset
//!
//! The `App` struct is the central state container, and `run_app` is the
//! main event loop that processes user input and redraws the UI.

use crate::config::Config;
use crate::ledger::{HighlightTimer, IdentifierSource, Ledger, RandomIdentifiers};
use crate::pipeline::{Clock, Sequencer, SequencerState};
use anyhow::Result;
use clap::ValueEnum;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub type AppResult<T> = Result<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Blockchain,
    Llm,
}

impl Tab {
    pub fn all() -> Vec<Tab> {
        vec![Tab::Blockchain, Tab::Llm]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Blockchain => "Blockchain Visualizer",
            Tab::Llm => "LLM Visualizer",
        }
    }
}

pub struct App {
    pub config: Config,
    pub current_tab: Tab,
    pub running: bool,

    // Blockchain tab
    pub ledger: Ledger,
    pub highlight: HighlightTimer,
    ids: Box<dyn IdentifierSource>,

    // LLM tab
    pub sequencer: Sequencer,
    clock: Arc<dyn Clock>,
    new_ids: fn() -> Box<dyn IdentifierSource>,
}

fn random_identifiers() -> Box<dyn IdentifierSource> {
    Box::new(RandomIdentifiers::new())
}

impl App {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self::with_identifiers(config, clock, random_identifiers)
    }

    /// Build an app whose ledgers draw identifiers from sources made by `new_ids`.
    pub fn with_identifiers(
        config: Config,
        clock: Arc<dyn Clock>,
        new_ids: fn() -> Box<dyn IdentifierSource>,
    ) -> Self {
        let mut ids = new_ids();
        let ledger = Ledger::initialize(ids.as_mut());
        Self {
            current_tab: config.ui.start_tab,
            config,
            running: true,
            ledger,
            highlight: HighlightTimer::default(),
            ids,
            sequencer: Sequencer::new(Arc::clone(&clock)),
            clock,
            new_ids,
        }
    }

    /// Discard every piece of state and start over, as if the program had just launched.
    pub fn reload(&mut self) {
        info!("Reloading application state");
        *self = Self::with_identifiers(self.config.clone(), Arc::clone(&self.clock), self.new_ids);
    }

    pub fn add_block(&mut self, now: Instant) {
        let block = self.ledger.append_block(self.ids.as_mut());
        self.highlight.mark(&block.identifier, now);
    }

    pub fn play(&mut self) -> bool {
        self.sequencer.start()
    }

    pub fn pipeline_state(&self) -> SequencerState {
        self.sequencer.snapshot()
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.highlight.expire(now);
    }

    /// Navigate to next tab.
    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let idx = tabs
            .iter()
            .position(|t| *t == self.current_tab)
            .unwrap_or(0);
        self.current_tab = tabs[(idx + 1) % tabs.len()];
    }

    /// Navigate to previous tab.
    pub fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let idx = tabs
            .iter()
            .position(|t| *t == self.current_tab)
            .unwrap_or(0);
        self.current_tab = tabs[(idx + tabs.len() - 1) % tabs.len()];
    }

    /// Jump directly to a tab by index.
    pub fn goto_tab(&mut self, index: usize) {
        let tabs = Tab::all();
        if index < tabs.len() {
            self.current_tab = tabs[index];
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.running = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Tab | KeyCode::Right => self.next_tab(),
            KeyCode::BackTab | KeyCode::Left => self.prev_tab(),
            KeyCode::Char('1') => self.goto_tab(0),
            KeyCode::Char('2') => self.goto_tab(1),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('a') | KeyCode::Enter | KeyCode::Char(' ')
                if self.current_tab == Tab::Blockchain =>
            {
                self.add_block(now);
            }
            KeyCode::Char('p') | KeyCode::Enter | KeyCode::Char(' ')
                if self.current_tab == Tab::Llm =>
            {
                if !self.play() {
                    tracing::debug!("Play ignored while the pipeline is running");
                }
            }
            _ => {}
        }
    }
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> AppResult<()> {
    loop {
        app.on_tick(Instant::now());
        terminal.draw(|f| super::views::draw(f, &mut app))?;

        if event::poll(app.config.tick_rate())? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key, Instant::now());
            }
        }

        if !app.running {
            return Ok(());
        }
    }
}
