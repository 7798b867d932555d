//! Error types for asciiweb core

use crate::font::FontName;
use thiserror::Error;

/// Result type for asciiweb core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input text was empty, or only carriage returns
    #[error("input text is empty")]
    EmptyInput,

    /// Input contains a character the font has no glyph for
    #[error("unsupported character {ch:?} at position {index}")]
    UnsupportedCharacter { ch: char, index: usize },

    /// Font name is not one of the known fonts
    #[error("unsupported font name: {0:?}")]
    UnsupportedFontName(String),

    /// Font resource is missing, empty or unreadable
    #[error("font resource for {font} is unavailable: {reason}")]
    ResourceUnavailable { font: FontName, reason: String },

    /// Strict mode: fewer glyph blocks than the printable ASCII range
    #[error("font {font} is truncated: {glyphs} glyphs")]
    FontTruncated { font: FontName, glyphs: usize },

    /// Strict mode: more glyph blocks than the printable ASCII range
    #[error("font {font} is extended: {glyphs} glyphs")]
    FontExtended { font: FontName, glyphs: usize },

    /// The loader produced no glyphs for the requested font
    #[error("font {0} is unavailable")]
    FontUnavailable(FontName),
}

impl CoreError {
    /// Whether the caller (rather than the server) is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyInput
                | CoreError::UnsupportedCharacter { .. }
                | CoreError::UnsupportedFontName(_)
        )
    }
}
