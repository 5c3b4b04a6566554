//! Fastest-clear leaderboard
//!
//! One entry per distinct name, kept sorted by ascending time. Persisted as a
//! plain `name:seconds` line file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    /// Seconds taken to clear the round (lower is better)
    pub secs: u64,
}

/// Result of submitting a name from the victory prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Stored; 1-indexed rank after insertion
    Saved { rank: usize },
    /// Another run already owns this name
    NameTaken,
}

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    path: Option<PathBuf>,
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Leaderboard that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file starts an empty board that will be created on first save
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LeaderboardError> {
        let path = path.into();
        let mut board = Self {
            path: Some(path.clone()),
            entries: Vec::new(),
        };
        if !path.exists() {
            log::info!("No leaderboard at {}, starting fresh", path.display());
            return Ok(board);
        }

        let text = fs::read_to_string(&path)?;
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(line) {
                Some((name, secs)) => insert(&mut board.entries, name, secs),
                None => log::warn!("Skipping malformed leaderboard line {}: {:?}", line_no + 1, line),
            }
        }
        log::info!("Loaded {} leaderboard entries", board.entries.len());
        Ok(board)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_name_taken(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Record a time; a better (lower) time replaces a name's stored one
    ///
    /// Returns true if the board changed. Writes through to disk when file-backed.
    pub fn add_score(&mut self, name: &str, secs: u64) -> Result<bool, LeaderboardError> {
        validate_name(name)?;
        let before = self.entries.iter().find(|e| e.name == name).map(|e| e.secs);
        if before.is_some_and(|best| best <= secs) {
            return Ok(false);
        }
        // Commit only after the file write succeeds so a failed save can be retried
        let mut entries = self.entries.clone();
        insert(&mut entries, name.to_string(), secs);
        self.save(&entries)?;
        self.entries = entries;
        Ok(true)
    }

    /// Victory-prompt submission: taken names are refused instead of merged
    pub fn submit(&mut self, name: &str, secs: u64) -> Result<SubmitOutcome, LeaderboardError> {
        if self.is_name_taken(name) {
            return Ok(SubmitOutcome::NameTaken);
        }
        self.add_score(name, secs)?;
        let rank = self.rank(name).unwrap_or(self.entries.len());
        log::info!("{} cleared in {}s (rank {})", name, secs, rank);
        Ok(SubmitOutcome::Saved { rank })
    }

    /// Entries sorted ascending by time
    pub fn top_scores(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// 1-indexed position of a name
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name).map(|i| i + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<(), LeaderboardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut out = String::new();
        for entry in entries {
            out.push_str(&entry.name);
            out.push(':');
            out.push_str(&entry.secs.to_string());
            out.push('\n');
        }
        fs::write(path, out)?;
        Ok(())
    }
}

fn insert(entries: &mut Vec<ScoreEntry>, name: String, secs: u64) {
    if let Some(i) = entries.iter().position(|e| e.name == name) {
        if entries[i].secs <= secs {
            return;
        }
        entries.remove(i);
    }
    // Ties keep name order so the listing is stable
    let pos = entries
        .iter()
        .position(|e| (secs, name.as_str()) < (e.secs, e.name.as_str()))
        .unwrap_or(entries.len());
    entries.insert(pos, ScoreEntry { name, secs });
}

fn parse_line(line: &str) -> Option<(String, u64)> {
    let (name, secs) = line.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    let secs = secs.trim().parse().ok()?;
    Some((name.to_string(), secs))
}

fn validate_name(name: &str) -> Result<(), LeaderboardError> {
    if name.trim().is_empty() || name.contains([':', '\n', '\r']) {
        return Err(LeaderboardError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(board: &Leaderboard) -> Vec<&str> {
        board.top_scores().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_sorted_ascending() {
        let mut board = Leaderboard::in_memory();
        board.add_score("SLOW", 90).unwrap();
        board.add_score("FAST", 12).unwrap();
        board.add_score("MID", 40).unwrap();
        assert_eq!(names(&board), vec!["FAST", "MID", "SLOW"]);
        assert!(board.top_scores().windows(2).all(|w| w[0].secs <= w[1].secs));
    }

    #[test]
    fn test_better_time_replaces_worse_is_ignored() {
        let mut board = Leaderboard::in_memory();
        board.add_score("ANA", 50).unwrap();
        assert!(board.add_score("ANA", 30).unwrap());
        assert_eq!(board.top_scores()[0].secs, 30);

        assert!(!board.add_score("ANA", 45).unwrap());
        assert_eq!(board.top_scores().len(), 1);
        assert_eq!(board.top_scores()[0].secs, 30);
    }

    #[test]
    fn test_submit_refuses_taken_name() {
        let mut board = Leaderboard::in_memory();
        assert_eq!(board.submit("BO", 20).unwrap(), SubmitOutcome::Saved { rank: 1 });
        assert_eq!(board.submit("BO", 5).unwrap(), SubmitOutcome::NameTaken);
        assert_eq!(board.top_scores()[0].secs, 20);
        assert_eq!(board.submit("CY", 10).unwrap(), SubmitOutcome::Saved { rank: 1 });
        assert_eq!(board.rank("BO"), Some(2));
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut board = Leaderboard::in_memory();
        assert!(matches!(board.add_score("  ", 1), Err(LeaderboardError::InvalidName(_))));
        assert!(matches!(board.add_score("a:b", 1), Err(LeaderboardError::InvalidName(_))));
        assert!(board.is_empty());
    }

    #[test]
    fn test_file_round_trip_and_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leaderboard.dat");
        fs::write(&path, "ANA:30\ngarbage\nBO:abc\n:12\nCY:15\nANA:45\n").unwrap();

        let mut board = Leaderboard::open(&path).unwrap();
        assert_eq!(names(&board), vec!["CY", "ANA"]);

        board.add_score("DEE", 20).unwrap();
        let reloaded = Leaderboard::open(&path).unwrap();
        assert_eq!(names(&reloaded), vec!["CY", "DEE", "ANA"]);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "CY:15\nDEE:20\nANA:30\n");
    }

    #[test]
    fn test_failed_save_leaves_board_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // The path is a directory, so every write fails
        let mut board = Leaderboard {
            path: Some(dir.path().to_path_buf()),
            entries: Vec::new(),
        };
        assert!(matches!(board.submit("ANA", 30), Err(LeaderboardError::Io(_))));
        assert!(board.is_empty());
        assert!(!board.is_name_taken("ANA"));
        assert!(matches!(board.submit("ANA", 30), Err(LeaderboardError::Io(_))));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let board = Leaderboard::open(dir.path().join("none.dat")).unwrap();
        assert!(board.is_empty());
        assert!(board.path().is_some());
    }
}
