use serde::Deserialize;
use thiserror::Error;

const EMBEDDED: &str = include_str!("../assets/lyrics.yaml");

#[derive(Debug, Error)]
pub enum LyricsError {
    #[error("failed to parse lyrics: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("lyric table is empty")]
    Empty,
    #[error("lyric {index} starts at {start_ms}ms, before its predecessor")]
    Unsorted { index: usize, start_ms: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Lyric {
    pub text: String,
    pub start_ms: u64,
}

/// Lyric lines ordered by start time. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LyricTable {
    lines: Vec<Lyric>,
}

impl LyricTable {
    pub fn new(lines: Vec<Lyric>) -> Result<Self, LyricsError> {
        if lines.is_empty() {
            return Err(LyricsError::Empty);
        }
        if let Some(index) = (1..lines.len()).find(|&i| lines[i].start_ms < lines[i - 1].start_ms) {
            return Err(LyricsError::Unsorted {
                index,
                start_ms: lines[index].start_ms,
            });
        }
        Ok(Self { lines })
    }

    pub fn from_yaml(text: &str) -> Result<Self, LyricsError> {
        Self::new(serde_yaml::from_str(text)?)
    }

    /// The song text compiled into the binary.
    pub fn embedded() -> Result<Self, LyricsError> {
        Self::from_yaml(EMBEDDED)
    }

    /// A single empty line, for when no song text is available.
    pub fn blank() -> Self {
        Self {
            lines: vec![Lyric {
                text: String::new(),
                start_ms: 0,
            }],
        }
    }

    pub fn lines(&self) -> &[Lyric] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn get(&self, index: usize) -> Option<&Lyric> {
        self.lines.get(index)
    }

    /// Index of the last line starting at or before `elapsed_ms`. Before the
    /// first line starts this is still the first line.
    pub fn active_index(&self, elapsed_ms: u64) -> usize {
        self.lines
            .partition_point(|line| line.start_ms <= elapsed_ms)
            .saturating_sub(1)
    }

    pub fn active(&self, elapsed_ms: u64) -> &Lyric {
        &self.lines[self.active_index(elapsed_ms)]
    }

    /// The page of `group_size` consecutive lines containing `index`.
    pub fn group(&self, index: usize, group_size: usize) -> &[Lyric] {
        let group_size = group_size.max(1);
        let start = (index / group_size) * group_size;
        let start = start.min(self.lines.len() - 1);
        let end = (start + group_size).min(self.lines.len());
        &self.lines[start..end]
    }

    pub fn last_start_ms(&self) -> u64 {
        self.lines.last().map_or(0, |line| line.start_ms)
    }
}
