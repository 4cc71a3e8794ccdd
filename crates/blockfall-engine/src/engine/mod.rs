//! Game rules on top of the core grid types.
//!
//! - [`GameController`] - State machine owning the session, timers and high score
//! - [`ScoreLevelTracker`] - Score, level and line statistics of one session
//! - [`DropScheduler`] - Fall, repeat and lock-delay intervals
//! - [`TaskScheduler`] - Virtual-clock scheduler of named tasks
//! - [`Randomizer`] / [`GameSeed`] - Seedable shape and start-line generation
//! - [`EngineConfig`] - Board size, spawn anchor, level pacing and timing
//! - [`HighScoreStore`] - Storage the high score is read from and written to
//!
//! # Game Flow
//!
//! 1. The controller starts in the menu, where the start level and number of
//!    pre-filled rows are chosen
//! 2. `Start` builds a session and schedules auto-fall
//! 3. Commands and elapsed time move the active piece; a piece that can no
//!    longer descend is locked, full rows are cleared and the next piece spawns
//! 4. A lock that leaves a filled cell in the top row ends the game and commits
//!    the high score
//!
//! The host drives everything: it forwards commands, calls
//! [`GameController::advance`] with elapsed time and renders
//! [`GameController::snapshot`].

pub use self::{
    command::*, config::*, controller::*, event::*, generator::*, scheduler::*, score::*,
    snapshot::*, store::*, timing::*,
};

mod command;
mod config;
mod controller;
mod event;
mod generator;
mod scheduler;
mod score;
mod snapshot;
mod store;
mod timing;
