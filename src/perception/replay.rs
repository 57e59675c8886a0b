//! Recorded landmark frames, one JSON object per line

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{LandmarkFrame, PerceptionOracle};

/// Replays a JSON-lines recording frame by frame
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    frames: VecDeque<LandmarkFrame>,
}

impl ReplaySource {
    /// Load a recording from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;

        let mut source = Self::from_jsonl(&content);
        debug!(path = %path.display(), frames = source.remaining(), "Loaded replay");
        source.path = path;
        Ok(source)
    }

    /// Parse an in-memory recording. Malformed lines are skipped.
    pub fn from_jsonl(content: &str) -> Self {
        let mut frames = VecDeque::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_line(line) {
                Ok(frame) => frames.push_back(frame),
                Err(e) => warn!(line = line_no + 1, error = %e, "Skipping malformed replay frame"),
            }
        }

        Self {
            path: PathBuf::new(),
            frames,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Frames not yet handed out
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

fn parse_line(line: &str) -> Result<LandmarkFrame, SourceError> {
    Ok(serde_json::from_str(line)?)
}

impl PerceptionOracle for ReplaySource {
    fn next_frame(&mut self) -> Option<LandmarkFrame> {
        self.frames.pop_front()
    }
}

/// Perception source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse frame: {0}")]
    Parse(#[from] serde_json::Error),
}
