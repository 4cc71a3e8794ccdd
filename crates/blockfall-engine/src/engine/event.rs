use serde::Serialize;

/// Notable things that happened inside the controller.
///
/// Events are queued in the order they occur and handed out by
/// [`GameController::drain_events`](super::GameController::drain_events).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(tag = "type")]
pub enum GameEvent {
    #[display("session started")]
    Started,
    #[display("piece locked, {cleared_lines} line(s) cleared")]
    Locked { cleared_lines: usize },
    #[display("level up to {level}")]
    LevelUp { level: u8 },
    #[display("game over with score {score}")]
    GameOver { score: u64 },
    #[display("new high score {score}")]
    HighScore { score: u64 },
    #[display("session ended")]
    Ended,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(
            GameEvent::Locked { cleared_lines: 2 }.to_string(),
            "piece locked, 2 line(s) cleared"
        );
        assert_eq!(GameEvent::LevelUp { level: 3 }.to_string(), "level up to 3");
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&GameEvent::GameOver { score: 120 }).unwrap();
        assert_eq!(json, r#"{"type":"GameOver","score":120}"#);
        let json = serde_json::to_string(&GameEvent::Started).unwrap();
        assert_eq!(json, r#"{"type":"Started"}"#);
    }
}
