//! # asciiweb Core
//!
//! The banner engine behind asciiweb.
//!
//! This crate provides:
//! - Font loading from fixed-layout text files
//! - Banner rendering with typed errors
//! - An optional shared cache of parsed fonts
//!
//! ```text
//!   __ _  ___  ___(_|_)
//!  / _` |/ __|/ __| | |
//! | (_| |\__ \ (__| | |
//!  \__,_||___/\___|_|_|
//! ```

pub mod banner;
pub mod cache;
pub mod error;
pub mod font;

pub use banner::{compose, normalize, validate, BannerRenderer, Decoration};
pub use cache::GlyphCache;
pub use error::{CoreError, Result};
pub use font::{
    FontLoader, FontName, FontResource, FontSource, Glyph, GlyphTable, LineEnding, Strictness,
    FIRST_GLYPH, PRINTABLE_GLYPHS, ROW_HEIGHT,
};

/// Core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the core engine
pub fn init() -> Result<()> {
    tracing::info!("Initializing asciiweb core v{}", VERSION);
    Ok(())
}
