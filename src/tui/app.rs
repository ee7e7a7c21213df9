use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::Dispatch;

use crate::io::source::TaskSource;
use crate::model::TaskStore;
use crate::ops::compare::Pair;

use super::effects::EffectRunner;
use super::input;
use super::render;
use super::theme::Theme;
use super::undo::DecisionHistory;
use super::update::{Event, LoadState};

/// A one-line message for the status row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        StatusMessage {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Main application state
pub struct App {
    /// Every task from the last snapshot, with local parent edges
    pub tasks: TaskStore,
    /// The two tasks on screen, by ID
    pub pair: Option<Pair>,
    /// Recent choices, for undo
    pub history: DecisionHistory,
    pub load_state: LoadState,
    pub rng: StdRng,
    pub theme: Theme,
    pub should_quit: bool,
    /// Help overlay visible
    pub show_help: bool,
    /// First visible row of the content area
    pub scroll: usize,
    pub status: Option<StatusMessage>,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self::with_rng(theme, StdRng::from_entropy())
    }

    /// Deterministic pair selection, for tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Theme::default(), StdRng::seed_from_u64(seed))
    }

    fn with_rng(theme: Theme, rng: StdRng) -> Self {
        App {
            tasks: TaskStore::new(),
            pair: None,
            history: DecisionHistory::new(),
            load_state: LoadState::default(),
            rng,
            theme,
            should_quit: false,
            show_help: false,
            scroll: 0,
            status: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Loaded
    }
}

/// Everything the TUI needs from startup
pub struct RunOptions {
    pub theme: Theme,
    pub source: Arc<dyn TaskSource>,
    pub state_dir: PathBuf,
    pub refresh_interval: Duration,
    /// Handed to worker threads so their events reach the same log
    pub dispatch: Dispatch,
}

/// Run the TUI application
pub fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let RunOptions {
        theme,
        source,
        state_dir,
        refresh_interval,
        dispatch,
    } = options;

    tracing::info!(
        state_dir = %state_dir.display(),
        refresh_secs = refresh_interval.as_secs(),
        "starting sift"
    );
    let mut app = App::new(theme);
    let runner = EffectRunner::start(source, state_dir, dispatch)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &runner, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("exiting");
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    runner: &EffectRunner,
    refresh_interval: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    runner.run_all(app.start());
    let mut last_refresh = Instant::now();

    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))?
            && let TermEvent::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(event) = input::handle_key(app, key)
        {
            runner.run_all(app.update(event));
        }

        for event in runner.poll() {
            runner.run_all(app.update(event));
        }

        if last_refresh.elapsed() >= refresh_interval {
            last_refresh = Instant::now();
            runner.run_all(app.update(Event::RefreshTick));
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
