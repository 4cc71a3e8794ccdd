use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Cell, Shape, ShapeKind};

/// Seed for deterministic games.
///
/// A 128-bit seed for the generator behind both the piece sequence and the
/// random start lines. Two controllers built from the same seed and fed the same
/// commands and time steps go through identical games.
///
/// Serialized (and parsed with [`FromStr`]) as a 32-character hex string.
///
/// # Example
///
/// ```
/// use blockfall_engine::GameSeed;
///
/// let seed: GameSeed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// assert_eq!(seed.to_string(), "0123456789abcdeffedcba9876543210");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSeed([u8; 16]);

impl GameSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

/// Error returned when a [`GameSeed`] cannot be parsed from hex.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SeedParseError {
    #[display("invalid hex: expected 32 characters, got {_0}")]
    Length(#[error(not(source))] usize),
    #[display("invalid hex: {_0}")]
    Digit(#[error(not(source))] String),
}

impl fmt::Display for GameSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for GameSeed {
    type Err = SeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(SeedParseError::Length(s.len()));
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| SeedParseError::Digit(s.to_owned()))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for GameSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GameSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `GameSeed` values with `rng.random()`.
impl Distribution<GameSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        GameSeed(seed)
    }
}

/// Random source of a controller: shapes and start-line rows.
#[derive(Debug, Clone)]
pub struct Randomizer {
    rng: Pcg32,
}

impl Default for Randomizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Randomizer {
    /// Creates a randomizer seeded from the thread-local generator.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: GameSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Draws a catalog shape uniformly at random.
    pub fn next_shape(&mut self) -> Shape {
        self.rng.random::<ShapeKind>().shape()
    }

    /// Generates one pre-filled start row.
    ///
    /// Each cell is filled with probability ½. A row that comes out empty gets
    /// one random cell filled, and a full row gets one random cell emptied, so
    /// the result is never empty and never clearable.
    pub fn start_row(&mut self, width: usize) -> Vec<Cell> {
        let mut cells: Vec<Cell> = (0..width)
            .map(|_| {
                if self.rng.random_bool(0.5) {
                    Cell::Filled
                } else {
                    Cell::Empty
                }
            })
            .collect();
        if width == 0 {
            return cells;
        }
        if cells.iter().all(|c| c.is_empty()) {
            cells[self.rng.random_range(0..width)] = Cell::Filled;
        } else if cells.iter().all(|c| c.is_filled()) {
            cells[self.rng.random_range(0..width)] = Cell::Empty;
        }
        cells
    }
}
