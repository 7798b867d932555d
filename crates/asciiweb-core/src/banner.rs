//! # Banner rendering
//!
//! Turns text into a block of ASCII art by laying glyphs side by side:
//!
//! ```text
//!  _    _   _
//! | |  | | (_)
//! | |__| |  _
//! |  __  | | |
//! | |  | | | |
//! |_|  |_| |_|
//! ```
//!
//! Every `\n` in the input starts a new banner block of [`ROW_HEIGHT`] rows
//! below the previous one. Carriage returns are dropped before anything else
//! happens, so form submissions from any platform render the same.

use crate::cache::GlyphCache;
use crate::font::{FontLoader, FontName, GlyphTable, ROW_HEIGHT};
use crate::{CoreError, Result};
use std::sync::Arc;

/// Markers written before and after every output row
///
/// The renderer never interprets them; a typical prefix is the ANSI reset
/// sequence `\x1b[0m` for terminal output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoration {
    pub prefix: String,
    pub suffix: String,
}

impl Decoration {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }
}

/// Strip carriage returns, rejecting text that ends up empty
pub fn normalize(text: &str) -> Result<String> {
    let text: String = text.chars().filter(|&c| c != '\r').collect();
    if text.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    Ok(text)
}

/// Check that every character is a line break or has a glyph
pub fn validate(table: &GlyphTable, text: &str) -> Result<()> {
    match text
        .chars()
        .enumerate()
        .find(|&(_, ch)| ch != '\n' && !table.contains(ch))
    {
        Some((index, ch)) => Err(CoreError::UnsupportedCharacter { ch, index }),
        None => Ok(()),
    }
}

/// Render text against an already loaded table
pub fn compose(table: &GlyphTable, text: &str, decoration: &Decoration) -> Result<String> {
    let text = normalize(text)?;
    validate(table, &text)?;
    Ok(compose_validated(table, &text, decoration))
}

fn compose_validated(table: &GlyphTable, text: &str, decoration: &Decoration) -> String {
    let mut out = String::new();

    for line in text.split('\n') {
        let glyphs: Vec<_> = line.chars().filter_map(|ch| table.get(ch)).collect();

        for row in 0..ROW_HEIGHT {
            out.push_str(&decoration.prefix);
            for glyph in &glyphs {
                out.push_str(glyph.row(row));
            }
            out.push_str(&decoration.suffix);
            out.push('\n');
        }
    }

    out
}

/// Renders banners, loading fonts through a [`FontLoader`]
#[derive(Debug)]
pub struct BannerRenderer {
    loader: FontLoader,
    decoration: Decoration,
    cache: Option<GlyphCache>,
}

impl BannerRenderer {
    /// Create a renderer that loads the font on every call
    pub fn new(loader: FontLoader) -> Self {
        Self {
            loader,
            decoration: Decoration::default(),
            cache: None,
        }
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;
        self
    }

    /// Share parsed fonts between calls
    pub fn with_cache(mut self, cache: GlyphCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn loader(&self) -> &FontLoader {
        &self.loader
    }

    /// Render `text` with the font called `font_name`
    pub fn render(&self, text: &str, font_name: &str) -> Result<String> {
        let text = normalize(text)?;
        let font = font_name.parse::<FontName>()?;
        self.render_normalized(&text, font)
    }

    /// Render `text` with a known font
    pub fn render_font(&self, text: &str, font: FontName) -> Result<String> {
        let text = normalize(text)?;
        self.render_normalized(&text, font)
    }

    fn render_normalized(&self, text: &str, font: FontName) -> Result<String> {
        let table = self.glyphs(font)?;
        validate(&table, text)?;

        let art = compose_validated(&table, text, &self.decoration);
        tracing::debug!(
            "Rendered {} line(s) of text with font {}",
            text.split('\n').count(),
            font
        );
        Ok(art)
    }

    /// Glyph table for a font, failing if it has no glyphs
    fn glyphs(&self, font: FontName) -> Result<Arc<GlyphTable>> {
        let table = match &self.cache {
            Some(cache) => cache
                .get_or_load(font, || {
                    let table = self.loader.try_load(font)?;
                    if table.is_empty() {
                        return Err(CoreError::FontUnavailable(font));
                    }
                    Ok(table)
                })
                .unwrap_or_else(|e| {
                    tracing::error!("Failed to load font: {}", e);
                    Arc::new(GlyphTable::new())
                }),
            None => Arc::new(self.loader.load(font)),
        };

        if table.is_empty() {
            return Err(CoreError::FontUnavailable(font));
        }
        Ok(table)
    }
}
