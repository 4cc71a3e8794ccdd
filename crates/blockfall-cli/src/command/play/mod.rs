use std::path::PathBuf;

use anyhow::Context as _;
use blockfall_engine::{EngineConfig, GameController, GameSeed};

use crate::{store::JsonFileStore, util};

use self::app::PlayApp;

mod app;

pub(crate) const DEFAULT_HIGH_SCORE_FILE: &str = "./data/high_score.json";

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Engine configuration file (JSON format); built-in defaults when omitted
    #[clap(long)]
    config: Option<PathBuf>,
    /// Level preselected in the start menu
    #[clap(long, default_value_t = 1)]
    start_level: u8,
    /// Number of pre-filled lines preselected in the start menu
    #[clap(long, default_value_t = 0)]
    start_lines: usize,
    /// Seed for a reproducible piece sequence (32 hex digits)
    #[clap(long)]
    seed: Option<GameSeed>,
    /// File the high score is stored in
    #[clap(long, default_value = DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            config: None,
            start_level: 1,
            start_lines: 0,
            seed: None,
            high_score_file: PathBuf::from(DEFAULT_HIGH_SCORE_FILE),
        }
    }
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        config,
        start_level,
        start_lines,
        seed,
        high_score_file,
    } = arg;

    let config: EngineConfig = match config {
        Some(path) => util::read_json_file("engine config", path)?,
        None => EngineConfig::default(),
    };
    let store = JsonFileStore::open(high_score_file)?;
    let mut game = match seed {
        Some(seed) => GameController::with_seed(config, *seed, store),
        None => GameController::new(config, store),
    }
    .context("Invalid engine configuration")?;
    game.configure_menu(*start_level, *start_lines);

    let mut app = PlayApp::new(game);
    ratatui::run(|terminal| app.run(terminal))?;

    let summary = app.summary();
    let game = app.into_game();
    if let Some(score) = summary.last_score {
        println!("Last score: {score}");
    }
    if let Some(score) = summary.new_high_score {
        println!("New high score: {score}");
    } else {
        println!("High score: {}", game.high_score());
    }

    game.into_store()
        .finish()
        .context("Failed to save high score")?;
    Ok(())
}
