//! Shared glyph tables
//!
//! Each font is parsed at most once: concurrent callers asking for the same
//! font wait on a single load. Failed loads are not stored, so the next call
//! tries again. Published tables are never mutated.

use crate::font::{FontName, GlyphTable};
use crate::Result;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

type Slot = Arc<OnceCell<Arc<GlyphTable>>>;

/// Per-font cache of parsed glyph tables
#[derive(Debug, Default)]
pub struct GlyphCache {
    slots: Mutex<HashMap<FontName, Slot>>,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table for `font`, running `load` if there is none yet
    pub fn get_or_load<F>(&self, font: FontName, load: F) -> Result<Arc<GlyphTable>>
    where
        F: FnOnce() -> Result<GlyphTable>,
    {
        // Hold the map lock only long enough to find the slot
        let slot = Arc::clone(self.slots.lock().entry(font).or_default());

        if let Some(table) = slot.get() {
            tracing::debug!("Glyph cache hit for {}", font);
            return Ok(Arc::clone(table));
        }

        slot.get_or_try_init(|| load().map(Arc::new)).map(Arc::clone)
    }

    /// Whether a table for `font` has been published
    pub fn contains(&self, font: FontName) -> bool {
        self.slots
            .lock()
            .get(&font)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Drop all cached tables
    pub fn clear(&self) {
        self.slots.lock().clear();
    }
}
