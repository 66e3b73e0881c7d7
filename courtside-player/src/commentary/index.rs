//! Commentary cue resolution
//!
//! Holds the parsed cue list for a session and answers "most recent cue at
//! or before position T". The list is replaced wholesale when a new payload
//! loads, never mutated in place.

use crate::commentary::parser::{parse_commentary, CommentaryCue};

/// Position-indexed view over a session's commentary cues
///
/// The cue list keeps source order, which is not necessarily sorted by
/// timestamp, so lookup is a linear scan. Cue counts are at most a few
/// hundred per session.
#[derive(Debug, Clone, Default)]
pub struct CommentaryIndex {
    cues: Vec<CommentaryCue>,
}

impl CommentaryIndex {
    /// Create an index over an already-parsed cue list
    pub fn new(cues: Vec<CommentaryCue>) -> Self {
        Self { cues }
    }

    /// Parse commentary text and index the result
    pub fn from_text(text: &str) -> Self {
        Self::new(parse_commentary(text))
    }

    /// Resolve the active cue: largest timestamp not exceeding `position_secs`
    ///
    /// Ties go to the first occurrence in source order. Returns `None` when
    /// no cue has started yet or the index is empty.
    pub fn active(&self, position_secs: f64) -> Option<usize> {
        let mut best: Option<usize> = None;

        for (i, cue) in self.cues.iter().enumerate() {
            if cue.timestamp_secs > position_secs {
                continue;
            }
            match best {
                Some(b) if self.cues[b].timestamp_secs >= cue.timestamp_secs => {}
                _ => best = Some(i),
            }
        }

        best
    }

    /// Resolve the active cue and return it directly
    pub fn active_cue(&self, position_secs: f64) -> Option<&CommentaryCue> {
        self.active(position_secs).map(|i| &self.cues[i])
    }

    /// Get a cue by index
    pub fn get(&self, index: usize) -> Option<&CommentaryCue> {
        self.cues.get(index)
    }

    /// All cues in source order
    pub fn cues(&self) -> &[CommentaryCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }
}
