use std::path::PathBuf;

use blockfall_engine::{HIGH_SCORE_KEY, HighScoreStore as _};

use crate::store::JsonFileStore;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct HighScoreArg {
    /// File the high score is stored in
    #[clap(long, default_value = super::play::DEFAULT_HIGH_SCORE_FILE)]
    high_score_file: PathBuf,
    /// Forget the stored high score
    #[clap(long)]
    reset: bool,
}

pub(crate) fn run(arg: &HighScoreArg) -> anyhow::Result<()> {
    let HighScoreArg {
        high_score_file,
        reset,
    } = arg;

    let mut store = JsonFileStore::open(high_score_file)?;
    if *reset {
        store.remove(HIGH_SCORE_KEY)?;
        println!("High score reset: {}", store.path().display());
        return Ok(());
    }

    let high_score = store.get(HIGH_SCORE_KEY).unwrap_or(0);
    println!("High score: {high_score}");
    Ok(())
}
