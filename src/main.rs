mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs,
    io::{self, stdin},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use typeclock::{
    app_dirs::AppDirs,
    config::{ConfigStore, FileConfigStore},
    language::Lexicon,
    runtime::{dispatch, AppEvent, CrosstermEventSource, FixedTicker, Runner},
    Feedback, Input, Mode, SessionConfig, SessionController, TcResult,
};

const DURATION_PRESETS: [u32; 4] = [15, 30, 60, 120];

/// countdown typing test with live wpm and a results chart
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A countdown typing test for the terminal. Type the words shown; the clock starts with your first key and the results screen charts wpm, raw wpm and accuracy over time."
)]
pub struct Cli {
    /// test mode
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// number of seconds on the countdown
    #[clap(short = 'd', long)]
    duration: Option<u32>,

    /// number of words to type in words mode
    #[clap(short = 'w', long = "words")]
    word_count: Option<usize>,

    /// disable backspace for the whole test
    #[clap(long)]
    no_backspace: bool,

    /// read settings from this file instead of the default config location
    #[clap(long)]
    config: Option<PathBuf>,

    /// write logs to a file (default location when no path is given); filter with TYPECLOCK_LOG
    #[clap(long, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,
}

impl Cli {
    fn load_config(&self) -> SessionConfig {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path).load(),
            None => FileConfigStore::new().load(),
        }
    }

    /// Config file values overridden by whatever flags were given
    fn to_session_config(&self, base: &SessionConfig) -> SessionConfig {
        let mut cfg = base.clone();
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(duration) = self.duration {
            cfg.duration_secs = duration;
        }
        if let Some(words) = self.word_count {
            cfg.word_count = words;
        }
        if self.no_backspace {
            cfg.allow_backspace = false;
        }
        cfg
    }

    fn log_path(&self) -> Option<PathBuf> {
        match &self.log_file {
            Some(Some(path)) => Some(path.clone()),
            Some(None) => AppDirs::log_path(),
            None => None,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub session: SessionController,
    /// Last rejected configuration change, cleared on the next reset
    pub notice: Option<String>,
}

impl App {
    pub fn new(config: SessionConfig) -> TcResult<Self> {
        Ok(Self {
            session: SessionController::new(config, Lexicon::english()?)?,
            notice: None,
        })
    }

    pub fn apply(&mut self, feedback: Vec<Feedback>) {
        for fb in feedback {
            match fb {
                Feedback::ConfigRejected(reason) => self.notice = Some(reason),
                Feedback::Reset => self.notice = None,
                other => debug!(feedback = ?other),
            }
        }
    }

    /// Arrow keys reconfigure between tests
    pub fn navigation(&self, key: &KeyEvent) -> Option<Input> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let current = self.session.config();
        let mut next = current.clone();
        match key.code {
            KeyCode::Left => next.duration_secs = step_preset(current.duration_secs, false),
            KeyCode::Right => next.duration_secs = step_preset(current.duration_secs, true),
            KeyCode::Up => next.mode = current.mode.prev(),
            KeyCode::Down => next.mode = current.mode.next(),
            _ => return None,
        }
        Some(Input::ConfigChange(next))
    }

    pub fn handle(&mut self, input: Input) {
        let feedback = self.session.handle(input);
        self.apply(feedback);
    }
}

fn step_preset(current: u32, forward: bool) -> u32 {
    let idx = DURATION_PRESETS
        .iter()
        .position(|&d| d == current)
        .unwrap_or(1);
    let len = DURATION_PRESETS.len();
    let next = if forward {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    DURATION_PRESETS[next]
}

fn init_logging(path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter =
        EnvFilter::try_from_env("TYPECLOCK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.log_path().as_deref())?;

    let config = cli.to_session_config(&cli.load_config());
    let mut app = match App::new(config) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };
    info!(config = ?app.session.config(), "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        if let AppEvent::Key(key) = &event {
            if is_quit(key) {
                break;
            }
            if let Some(input) = app.navigation(key) {
                app.handle(input);
                continue;
            }
        }
        let feedback = dispatch(&mut app.session, &event);
        app.apply(feedback);
    }

    Ok(())
}
