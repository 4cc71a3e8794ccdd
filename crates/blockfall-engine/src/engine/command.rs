use serde::{Deserialize, Serialize};

/// Abstract input accepted by [`GameController`](super::GameController).
///
/// Mapping raw key codes to commands is left to the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display)]
pub enum Command {
    #[display("move left")]
    MoveLeft,
    #[display("move right")]
    MoveRight,
    #[display("rotate")]
    RotateClockwise,
    #[display("soft drop")]
    SoftDrop,
    #[display("hard drop")]
    HardDrop,
    /// Starts a session from the menu, or restarts after game over.
    #[display("start")]
    Start,
    #[display("pause")]
    PauseToggle,
    /// Abandons the session and returns to the menu.
    #[display("end")]
    End,
    #[display("start level +1")]
    StartLevelUp,
    #[display("start level -1")]
    StartLevelDown,
    #[display("start lines +1")]
    StartLinesUp,
    #[display("start lines -1")]
    StartLinesDown,
}

/// Commands that repeat while their key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RepeatKey {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
}

impl RepeatKey {
    #[must_use]
    pub const fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::MoveLeft => Some(RepeatKey::MoveLeft),
            Command::MoveRight => Some(RepeatKey::MoveRight),
            Command::RotateClockwise => Some(RepeatKey::Rotate),
            Command::SoftDrop => Some(RepeatKey::SoftDrop),
            _ => None,
        }
    }

    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            RepeatKey::MoveLeft => Command::MoveLeft,
            RepeatKey::MoveRight => Command::MoveRight,
            RepeatKey::Rotate => Command::RotateClockwise,
            RepeatKey::SoftDrop => Command::SoftDrop,
        }
    }
}
