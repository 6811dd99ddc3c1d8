use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::games::GameId;

const SCORES_FILE: &str = "retrocade_scores.json";

/// Persisted payload: best score per game id.
#[derive(Serialize, Deserialize, Default)]
struct ScoreFile {
    best: BTreeMap<String, u32>,
}

/// Best-score store. Read once at startup, written whenever a session
/// ends with a new record. A missing or malformed file yields an empty
/// store; persistence failures are logged and otherwise ignored.
pub struct HighScores {
    file: ScoreFile,
    path: PathBuf,
    /// Which games already submitted the current session's score, so a
    /// game sitting on its gameOver screen is not re-submitted every tick.
    submitted: BTreeMap<GameId, bool>,
}

impl HighScores {
    pub fn load() -> Self {
        let path = Self::scores_path();
        let file = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<ScoreFile>(&json) {
                Ok(file) => file,
                Err(err) => {
                    warn!("ignoring malformed score file {}: {err}", path.display());
                    ScoreFile::default()
                }
            },
            Err(_) => ScoreFile::default(),
        };
        HighScores {
            file,
            path,
            submitted: BTreeMap::new(),
        }
    }

    fn scores_path() -> PathBuf {
        // Store next to the executable
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join(SCORES_FILE);
            }
        }
        PathBuf::from(SCORES_FILE)
    }

    pub fn best(&self, game: GameId) -> u32 {
        self.file.best.get(game.id()).copied().unwrap_or(0)
    }

    /// Submit a final score. Returns true (and persists) only when it
    /// beats the stored best.
    pub fn submit(&mut self, game: GameId, score: u32) -> bool {
        if score == 0 || score <= self.best(game) {
            return false;
        }
        self.file.best.insert(game.id().to_string(), score);
        self.write_file();
        true
    }

    fn write_file(&self) {
        match serde_json::to_string_pretty(&self.file) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    warn!("failed to write {}: {err}", self.path.display());
                } else {
                    info!("high scores saved to {}", self.path.display());
                }
            }
            Err(err) => warn!("failed to encode scores: {err}"),
        }
    }

    pub fn was_submitted(&self, game: GameId) -> bool {
        self.submitted.get(&game).copied().unwrap_or(false)
    }

    pub fn mark_submitted(&mut self, game: GameId) {
        self.submitted.insert(game, true);
    }

    /// Called when a session leaves gameOver, so its next run can submit.
    pub fn clear_submitted(&mut self, game: GameId) {
        self.submitted.insert(game, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_store() -> HighScores {
        HighScores {
            file: ScoreFile::default(),
            path: PathBuf::from("/dev/null"),
            submitted: BTreeMap::new(),
        }
    }

    #[test]
    fn submit_only_records_improvements() {
        let mut hs = empty_store();
        assert_eq!(hs.best(GameId::Snake), 0);
        assert!(hs.submit(GameId::Snake, 120));
        assert!(!hs.submit(GameId::Snake, 120));
        assert!(!hs.submit(GameId::Snake, 90));
        assert!(hs.submit(GameId::Snake, 130));
        assert_eq!(hs.best(GameId::Snake), 130);
    }

    #[test]
    fn zero_score_is_never_a_record() {
        let mut hs = empty_store();
        assert!(!hs.submit(GameId::Pong, 0));
    }

    #[test]
    fn submitted_flags_are_per_game() {
        let mut hs = empty_store();
        hs.mark_submitted(GameId::Tetris);
        assert!(hs.was_submitted(GameId::Tetris));
        assert!(!hs.was_submitted(GameId::Breakout));
        hs.clear_submitted(GameId::Tetris);
        assert!(!hs.was_submitted(GameId::Tetris));
    }

    #[test]
    fn score_file_round_trips() {
        let mut file = ScoreFile::default();
        file.best.insert("snake".into(), 420);
        file.best.insert("pacman".into(), 1310);
        let json = serde_json::to_string(&file).unwrap();
        let back: ScoreFile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.best.get("snake"), Some(&420));
        assert_eq!(back.best.get("pacman"), Some(&1310));
    }
}
