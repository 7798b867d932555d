//! # Banner fonts
//!
//! Fonts are plain text files. The first line is a header and is ignored;
//! after it every character of the font takes one block of [`ROW_HEIGHT`]
//! lines followed by a blank separator line. Blocks are assigned to
//! consecutive codepoints starting at space:
//!
//! ```text
//! <header>
//! <row 0 of ' '>
//! ...
//! <row 7 of ' '>
//! <separator>
//! <row 0 of '!'>
//! ...
//! ```
//!
//! A complete font covers `' '..='~'`, which makes 1 + 95 × 9 = 856 lines.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Number of text rows in every glyph
pub const ROW_HEIGHT: usize = 8;

/// Character mapped to the first glyph block
pub const FIRST_GLYPH: char = ' ';

/// Number of glyphs in a font covering exactly `' '..='~'`
pub const PRINTABLE_GLYPHS: usize = 95;

/// The fonts the service knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontName {
    Standard,
    Shadow,
    Thinkertoy,
}

impl FontName {
    /// Get all fonts
    pub fn all() -> &'static [FontName] {
        &[FontName::Standard, FontName::Shadow, FontName::Thinkertoy]
    }

    /// Name as used in forms and configuration
    pub fn name(&self) -> &'static str {
        match self {
            FontName::Standard => "standard",
            FontName::Shadow => "shadow",
            FontName::Thinkertoy => "thinkertoy",
        }
    }

    /// Line ending the shipped font file uses
    pub fn default_line_ending(&self) -> LineEnding {
        match self {
            FontName::Thinkertoy => LineEnding::CrLf,
            FontName::Standard | FontName::Shadow => LineEnding::Lf,
        }
    }
}

impl fmt::Display for FontName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for FontName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        FontName::all()
            .iter()
            .copied()
            .find(|font| font.name() == s)
            .ok_or_else(|| CoreError::UnsupportedFontName(s.to_string()))
    }
}

/// Line separator convention of a font resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    CrLf,
    /// `\r\n` if the resource contains one, `\n` otherwise
    Auto,
}

impl LineEnding {
    /// Split resource content into lines
    pub fn split<'a>(&self, content: &'a str) -> Vec<&'a str> {
        match self.resolve(content) {
            LineEnding::CrLf => content.split("\r\n").collect(),
            _ => content.split('\n').collect(),
        }
    }

    /// Settle `Auto` against actual content
    pub fn resolve(&self, content: &str) -> LineEnding {
        match self {
            LineEnding::Auto if content.contains("\r\n") => LineEnding::CrLf,
            LineEnding::Auto => LineEnding::Lf,
            other => *other,
        }
    }
}

/// Where the bytes of a font come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A file on disk
    File(PathBuf),
    /// Content held in memory
    Memory(Arc<str>),
}

impl FontSource {
    /// Read the full resource
    pub fn read(&self) -> std::io::Result<String> {
        match self {
            FontSource::File(path) => std::fs::read_to_string(path),
            FontSource::Memory(content) => Ok(content.to_string()),
        }
    }
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::File(path) => write!(f, "{}", path.display()),
            FontSource::Memory(content) => write!(f, "<memory, {} bytes>", content.len()),
        }
    }
}

/// A font source together with its line ending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontResource {
    pub source: FontSource,
    pub line_ending: LineEnding,
}

impl FontResource {
    /// Font stored in a file
    pub fn file(path: impl Into<PathBuf>, line_ending: LineEnding) -> Self {
        Self {
            source: FontSource::File(path.into()),
            line_ending,
        }
    }

    /// Font held in memory
    pub fn memory(content: impl Into<Arc<str>>, line_ending: LineEnding) -> Self {
        Self {
            source: FontSource::Memory(content.into()),
            line_ending,
        }
    }
}

/// How much structure the loader demands of a font
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Accept any number of whole glyph blocks
    #[default]
    Lenient,
    /// Require exactly the printable ASCII range
    Strict,
}

/// One character's rows, top to bottom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glyph {
    rows: [String; ROW_HEIGHT],
}

impl Glyph {
    pub fn new(rows: [String; ROW_HEIGHT]) -> Self {
        Self { rows }
    }

    /// Build from the first `ROW_HEIGHT` lines of a block
    fn from_lines(lines: &[&str]) -> Self {
        Self {
            rows: std::array::from_fn(|i| lines[i].to_string()),
        }
    }

    /// A glyph with every row empty
    pub fn blank() -> Self {
        Self {
            rows: Default::default(),
        }
    }

    pub fn rows(&self) -> &[String; ROW_HEIGHT] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> &str {
        &self.rows[index]
    }
}

/// Glyphs of one font, indexed by `codepoint - 0x20`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphTable {
    glyphs: Vec<Glyph>,
}

/// Result of splitting a resource into blocks
struct Parsed<'a> {
    table: GlyphTable,
    trailing: &'a [&'a str],
}

impl GlyphTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from glyphs for consecutive characters starting at space
    pub fn from_glyphs(glyphs: Vec<Glyph>) -> Self {
        Self { glyphs }
    }

    /// Parse font content. Trailing partial blocks are ignored.
    pub fn parse(content: &str, line_ending: LineEnding) -> Self {
        let lines = line_ending.split(content);
        Self::parse_lines(&lines).table
    }

    fn parse_lines<'a>(lines: &'a [&'a str]) -> Parsed<'a> {
        let body = lines.get(1..).unwrap_or_default();
        let mut glyphs = Vec::with_capacity(body.len() / (ROW_HEIGHT + 1));
        let mut trailing: &[&str] = &[];

        for block in body.chunks(ROW_HEIGHT + 1) {
            if block.len() < ROW_HEIGHT {
                trailing = block;
                break;
            }
            glyphs.push(Glyph::from_lines(block));
        }

        Parsed {
            table: Self { glyphs },
            trailing,
        }
    }

    /// Look up the glyph for a character
    pub fn get(&self, ch: char) -> Option<&Glyph> {
        let index = (ch as u32).checked_sub(FIRST_GLYPH as u32)?;
        self.glyphs.get(index as usize)
    }

    pub fn contains(&self, ch: char) -> bool {
        self.get(ch).is_some()
    }

    /// Number of glyphs
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Last character with a glyph
    pub fn last_char(&self) -> Option<char> {
        let count = u32::try_from(self.glyphs.len()).ok()?.checked_sub(1)?;
        char::from_u32(FIRST_GLYPH as u32 + count)
    }

    /// Iterate over `(character, glyph)` pairs in codepoint order
    pub fn iter(&self) -> impl Iterator<Item = (char, &Glyph)> {
        self.glyphs.iter().enumerate().filter_map(|(i, glyph)| {
            let ch = char::from_u32(FIRST_GLYPH as u32 + i as u32)?;
            Some((ch, glyph))
        })
    }
}

/// Loads glyph tables from configured font resources
#[derive(Debug, Clone, Default)]
pub struct FontLoader {
    resources: HashMap<FontName, FontResource>,
    strictness: Strictness,
}

impl FontLoader {
    /// Create a loader over an explicit font map
    pub fn new(resources: HashMap<FontName, FontResource>) -> Self {
        Self {
            resources,
            strictness: Strictness::Lenient,
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    pub fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Resource configured for a font
    pub fn resource(&self, font: FontName) -> Option<&FontResource> {
        self.resources.get(&font)
    }

    /// Load a font, reporting why it could not be used
    pub fn try_load(&self, font: FontName) -> Result<GlyphTable> {
        let resource = self
            .resources
            .get(&font)
            .ok_or_else(|| CoreError::ResourceUnavailable {
                font,
                reason: "no resource configured".to_string(),
            })?;

        let content = resource
            .source
            .read()
            .map_err(|e| CoreError::ResourceUnavailable {
                font,
                reason: format!("{}: {}", resource.source, e),
            })?;

        if content.is_empty() {
            return Err(CoreError::ResourceUnavailable {
                font,
                reason: format!("{} is empty", resource.source),
            });
        }

        let lines = resource.line_ending.split(&content);
        let Parsed { table, trailing } = GlyphTable::parse_lines(&lines);

        if self.strictness == Strictness::Strict {
            let glyphs = table.len();
            if glyphs < PRINTABLE_GLYPHS {
                return Err(CoreError::FontTruncated { font, glyphs });
            }
            if glyphs > PRINTABLE_GLYPHS || trailing.iter().any(|line| !line.is_empty()) {
                return Err(CoreError::FontExtended { font, glyphs });
            }
        }

        tracing::debug!("Loaded font {} from {} ({} glyphs)", font, resource.source, table.len());
        Ok(table)
    }

    /// Load a font; any failure is logged and yields an empty table
    pub fn load(&self, font: FontName) -> GlyphTable {
        self.try_load(font).unwrap_or_else(|e| {
            tracing::error!("Failed to load font: {}", e);
            GlyphTable::new()
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    /// Font content where every glyph row reads `<char><row>`
    pub(crate) fn sample_font(last: char, newline: &str) -> String {
        let mut content = String::from("header");
        content.push_str(newline);
        for ch in ' '..=last {
            for row in 0..ROW_HEIGHT {
                content.push_str(&format!("{ch}{row}"));
                content.push_str(newline);
            }
            content.push_str(newline);
        }
        content
    }

    fn memory_loader(font: FontName, content: &str, line_ending: LineEnding) -> FontLoader {
        let mut resources = HashMap::new();
        resources.insert(font, FontResource::memory(content, line_ending));
        FontLoader::new(resources)
    }

    #[test]
    fn test_font_names() {
        assert_eq!("standard".parse::<FontName>().unwrap(), FontName::Standard);
        assert_eq!("thinkertoy".parse::<FontName>().unwrap(), FontName::Thinkertoy);
        assert!(matches!(
            "Standard".parse::<FontName>(),
            Err(CoreError::UnsupportedFontName(name)) if name == "Standard"
        ));
        assert_eq!(FontName::Shadow.to_string(), "shadow");
        assert_eq!(FontName::Thinkertoy.default_line_ending(), LineEnding::CrLf);
    }

    #[test]
    fn test_parse_full_font() {
        let table = GlyphTable::parse(&sample_font('~', "\n"), LineEnding::Lf);
        assert_eq!(table.len(), PRINTABLE_GLYPHS);
        assert_eq!(table.last_char(), Some('~'));
        assert!(table.contains(' '));
        assert!(!table.contains('\u{7f}'));
        assert!(!table.contains('\n'));

        let glyph = table.get('A').unwrap();
        let expected: Vec<String> = (0..ROW_HEIGHT).map(|row| format!("A{row}")).collect();
        assert_eq!(glyph.rows().to_vec(), expected);
    }

    #[test]
    fn test_domain_is_contiguous_from_space() {
        let table = GlyphTable::parse(&sample_font('/', "\n"), LineEnding::Lf);
        let chars: Vec<char> = table.iter().map(|(ch, _)| ch).collect();
        assert_eq!(chars, (' '..='/').collect::<Vec<_>>());
    }

    #[test]
    fn test_crlf_font_matches_lf_twin() {
        let lf = GlyphTable::parse(&sample_font('~', "\n"), LineEnding::Lf);
        let crlf = GlyphTable::parse(&sample_font('~', "\r\n"), LineEnding::CrLf);
        assert_eq!(lf, crlf);
    }

    #[test]
    fn test_auto_line_ending() {
        assert_eq!(LineEnding::Auto.resolve("a\r\nb"), LineEnding::CrLf);
        assert_eq!(LineEnding::Auto.resolve("a\nb"), LineEnding::Lf);
        let table = GlyphTable::parse(&sample_font('~', "\r\n"), LineEnding::Auto);
        assert_eq!(table.get('~').unwrap().row(7), "~7");
    }

    #[test]
    fn test_crlf_font_read_as_lf_keeps_carriage_returns() {
        let table = GlyphTable::parse(&sample_font('!', "\r\n"), LineEnding::Lf);
        assert_eq!(table.get(' ').unwrap().row(0), " 0\r");
    }

    #[test]
    fn test_trailing_partial_block_ignored() {
        let mut content = sample_font('#', "\n");
        content.push_str("$0\n$1\n$2\n");
        let table = GlyphTable::parse(&content, LineEnding::Lf);
        assert_eq!(table.len(), 4);
        assert_eq!(table.last_char(), Some('#'));
    }

    #[test]
    fn test_block_without_separator_is_whole() {
        let mut content = sample_font('!', "\n");
        content.push_str("\"0\n\"1\n\"2\n\"3\n\"4\n\"5\n\"6\n\"7");
        let table = GlyphTable::parse(&content, LineEnding::Lf);
        assert_eq!(table.last_char(), Some('"'));
    }

    #[test]
    fn test_header_only() {
        let table = GlyphTable::parse("header\n", LineEnding::Lf);
        assert!(table.is_empty());
        assert_eq!(table.last_char(), None);
    }

    #[test]
    fn test_load_from_memory() {
        let loader = memory_loader(FontName::Standard, &sample_font('~', "\n"), LineEnding::Lf);
        let table = loader.load(FontName::Standard);
        assert_eq!(table.len(), PRINTABLE_GLYPHS);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(sample_font('~', "\r\n").as_bytes()).unwrap();

        let mut resources = HashMap::new();
        resources.insert(
            FontName::Thinkertoy,
            FontResource::file(file.path(), LineEnding::CrLf),
        );
        let loader = FontLoader::new(resources);
        assert_eq!(loader.load(FontName::Thinkertoy).len(), PRINTABLE_GLYPHS);
    }

    #[test]
    fn test_empty_resource_yields_empty_table() {
        let loader = memory_loader(FontName::Shadow, "", LineEnding::Lf);
        assert!(matches!(
            loader.try_load(FontName::Shadow),
            Err(CoreError::ResourceUnavailable { font: FontName::Shadow, .. })
        ));
        assert!(loader.load(FontName::Shadow).is_empty());
    }

    #[test]
    fn test_missing_file_yields_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut resources = HashMap::new();
        resources.insert(
            FontName::Standard,
            FontResource::file(dir.path().join("missing.txt"), LineEnding::Lf),
        );
        let loader = FontLoader::new(resources);
        assert!(loader.try_load(FontName::Standard).is_err());
        assert!(loader.load(FontName::Standard).is_empty());
    }

    #[test]
    fn test_unconfigured_font_yields_empty_table() {
        let loader = FontLoader::default();
        assert!(loader.load(FontName::Thinkertoy).is_empty());
    }

    #[test]
    fn test_strict_accepts_complete_font() {
        let loader = memory_loader(FontName::Standard, &sample_font('~', "\n"), LineEnding::Lf)
            .with_strictness(Strictness::Strict);
        assert_eq!(loader.try_load(FontName::Standard).unwrap().len(), PRINTABLE_GLYPHS);
    }

    #[test]
    fn test_strict_rejects_truncated_font() {
        let loader = memory_loader(FontName::Standard, &sample_font('Z', "\n"), LineEnding::Lf)
            .with_strictness(Strictness::Strict);
        assert!(matches!(
            loader.try_load(FontName::Standard),
            Err(CoreError::FontTruncated { glyphs: 59, .. })
        ));
        assert!(loader.load(FontName::Standard).is_empty());
    }

    #[test]
    fn test_strict_rejects_extended_font() {
        let loader = memory_loader(
            FontName::Standard,
            &sample_font('\u{7f}', "\n"),
            LineEnding::Lf,
        )
        .with_strictness(Strictness::Strict);
        assert!(matches!(
            loader.try_load(FontName::Standard),
            Err(CoreError::FontExtended { glyphs: 96, .. })
        ));

        let mut content = sample_font('~', "\n");
        content.push_str("stray\n");
        let loader = memory_loader(FontName::Standard, &content, LineEnding::Lf)
            .with_strictness(Strictness::Strict);
        assert!(matches!(
            loader.try_load(FontName::Standard),
            Err(CoreError::FontExtended { glyphs: 95, .. })
        ));
    }

    #[test]
    fn test_lenient_accepts_extended_font() {
        let loader = memory_loader(
            FontName::Standard,
            &sample_font('\u{7f}', "\n"),
            LineEnding::Lf,
        );
        let table = loader.load(FontName::Standard);
        assert_eq!(table.last_char(), Some('\u{7f}'));
    }

    #[test]
    fn test_shipped_fonts_are_complete() {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fonts");
        let resources = FontName::all()
            .iter()
            .map(|&font| {
                let path = dir.join(format!("{}.txt", font.name()));
                (font, FontResource::file(path, font.default_line_ending()))
            })
            .collect();
        let loader = FontLoader::new(resources).with_strictness(Strictness::Strict);

        for &font in FontName::all() {
            let table = loader.try_load(font).unwrap();
            assert_eq!(table.len(), PRINTABLE_GLYPHS, "font {font}");
            assert!(table.iter().all(|(_, glyph)| glyph.rows().iter().all(|r| !r.contains('\r'))));
        }
    }
}
