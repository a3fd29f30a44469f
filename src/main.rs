mod ui;

use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Instant,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use tracing::{error, info, trace};

use shipwrecked::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controls::{self, Command, Flow, KeyContext},
    game::{GameSession, SessionOptions},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, GameEventSource, Runner, Ticker},
    script::Script,
};

/// type the words on the drifting bottles before they float away
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Shipwrecked on an island, you read the messages in passing bottles by typing each word before it drifts out of sight. Levels get denser and faster as your speed improves."
)]
pub struct Cli {
    /// play the levels in this script file instead of the bundled one
    #[clap(short = 's', long)]
    script: Option<PathBuf>,

    /// seed for the script variants and bottle lanes
    #[clap(long)]
    seed: Option<u64>,

    /// seconds on the level clock
    #[clap(short = 't', long)]
    time_limit: Option<u64>,

    /// frame interval in milliseconds
    #[clap(long)]
    tick_rate: Option<u64>,

    /// longest text that can be typed, in columns
    #[clap(long)]
    max_input_width: Option<usize>,

    /// write the log here instead of the state directory
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// read settings from this file instead of the default config
    #[clap(long)]
    config: Option<PathBuf>,

    /// start with sound cues off (tab toggles them in game)
    #[clap(long)]
    mute: bool,

    /// store the merged settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over stored settings.
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(script) = &self.script {
            config.script = Some(script.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(secs) = self.time_limit {
            config.level_time_limit_secs = secs;
        }
        if let Some(ms) = self.tick_rate {
            config.tick_rate_ms = ms;
        }
        if let Some(width) = self.max_input_width {
            config.max_input_width = width;
        }
        if self.mute {
            config.muted = true;
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Title,
    Playing,
}

#[derive(Debug)]
pub struct App {
    pub state: AppState,
    script: Script,
    options: SessionOptions,
    rng: Option<StdRng>,
    session: Option<GameSession>,
}

impl App {
    pub fn new(script: Script, options: SessionOptions, rng: StdRng) -> Self {
        Self {
            state: AppState::Title,
            script,
            options,
            rng: Some(rng),
            session: None,
        }
    }

    fn start(&mut self, now: Instant) {
        if self.session.is_some() {
            return;
        }
        let rng = self.rng.take().unwrap_or_else(StdRng::from_entropy);
        self.session = Some(GameSession::new(self.script.clone(), self.options, rng, now));
        self.state = AppState::Playing;
    }

    /// Drops the running game and goes back to the title screen. The next
    /// start draws the script's variants again.
    fn restart(&mut self) {
        if let Some(session) = self.session.take() {
            info!("restarting");
            let (script, options, rng) = session.into_replay();
            self.script = script;
            self.options = options;
            self.rng = Some(rng);
        }
        self.state = AppState::Title;
    }

    fn key_context(&self) -> KeyContext {
        match &self.session {
            Some(session) => KeyContext::of(session),
            None => KeyContext::Title,
        }
    }

    /// Feeds one event through the game. Returns `false` once the player quits.
    pub fn handle(&mut self, event: GameEvent, now: Instant) -> bool {
        let flow = match event {
            GameEvent::Tick => {
                if let Some(session) = &mut self.session {
                    session.update(now);
                    for cue in session.drain_cues() {
                        trace!(%cue, "cue");
                    }
                }
                Flow::Continue
            }
            GameEvent::Resize => Flow::Continue,
            GameEvent::Key(key) => match controls::map_key(key, self.key_context()) {
                Some(Command::Start) => {
                    self.start(now);
                    Flow::Continue
                }
                Some(Command::Quit) => Flow::Quit,
                Some(command) => match &mut self.session {
                    Some(session) => controls::apply(session, command, now),
                    None => {
                        if command == Command::ToggleMute {
                            self.options.muted = !self.options.muted;
                        }
                        Flow::Continue
                    }
                },
                None => Flow::Continue,
            },
        };

        match flow {
            Flow::Continue => true,
            Flow::Restart => {
                self.restart();
                true
            }
            Flow::Quit => false,
        }
    }

    pub fn draw(&self, f: &mut Frame, now: Instant) {
        let area = f.area();
        match &self.session {
            Some(session) => ui::render_game(session, now, area, f.buffer_mut()),
            None => ui::render_title(
                self.script.len(),
                self.options.muted,
                area,
                f.buffer_mut(),
            ),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let mut cmd = Cli::command();

    let log_path = cli
        .log_file
        .clone()
        .or_else(AppDirs::log_path)
        .unwrap_or_else(|| PathBuf::from("shipwrecked.log"));
    if let Err(e) = logging::init(&log_path) {
        cmd.error(ErrorKind::Io, e.to_string()).exit();
    }

    let store = cli.config_store();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let script = match Script::resolve(config.script.as_deref(), &mut rng) {
        Ok(script) => script,
        Err(e) => {
            error!(error = %e, "startup failed");
            cmd.error(ErrorKind::Io, e.to_string()).exit();
        }
    };

    if !stdin().is_tty() {
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(script, config.session_options(), rng);
    let mut runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_rate()),
    );
    info!(tick_ms = config.tick_rate_ms, "starting");
    let result = start_tui(&mut terminal, &mut app, &mut runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: GameEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &mut Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        let now = Instant::now();
        terminal.draw(|f| app.draw(f, now))?;

        let event = runner.step();
        if !app.handle(event, Instant::now()) {
            info!("quitting");
            return Ok(());
        }
    }
}
