//! Commentary timeline: parsing and position-indexed lookup

pub mod index;
pub mod parser;

pub use index::CommentaryIndex;
pub use parser::{parse_commentary, CommentaryCue, CueCategory};
