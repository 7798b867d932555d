//! # asciiweb Configuration
//!
//! Configuration sources (in priority order):
//! 1. Environment variables (`ASCIIWEB_SERVER__LISTEN=0.0.0.0:8080`)
//! 2. Config file (`--config`, else ~/.config/asciiweb/config.toml)
//! 3. Built-in defaults
//!
//! ```toml
//! [server]
//! listen = "127.0.0.1:8080"
//!
//! [fonts]
//! dir = "fonts"
//!
//! [fonts.entries.thinkertoy]
//! file = "thinkertoy.txt"
//! line_ending = "crlf"
//! ```

use asciiweb_core::{
    BannerRenderer, Decoration, FontLoader, FontName, FontResource, GlyphCache, LineEnding,
    Strictness,
};
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ASCIIWEB_";

/// Get the configuration directory
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "asciiweb", "asciiweb")
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config/asciiweb"))
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP front end
    pub server: ServerConfig,
    /// Font files
    pub fonts: FontsConfig,
    /// Banner output
    pub render: RenderConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub listen: SocketAddr,
    /// Page template with an `{{ art }}` placeholder
    pub template: PathBuf,
    /// Directory served under `/static/`
    pub static_dir: PathBuf,
    /// Largest request (head and body) accepted
    pub max_request_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 8080)),
            template: PathBuf::from("templates/index.html"),
            static_dir: PathBuf::from("static"),
            max_request_bytes: 64 * 1024,
        }
    }
}

/// Where fonts live and how they are read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontsConfig {
    /// Directory relative font files are resolved against
    pub dir: PathBuf,
    /// Require fonts to cover exactly `' '..='~'`
    pub strict: bool,
    /// Per-font file and line ending
    pub entries: BTreeMap<FontName, FontEntry>,
}

impl Default for FontsConfig {
    fn default() -> Self {
        let entries = FontName::all()
            .iter()
            .map(|&font| {
                let entry = FontEntry {
                    file: PathBuf::from(format!("{}.txt", font.name())),
                    line_ending: font.default_line_ending(),
                };
                (font, entry)
            })
            .collect();

        Self {
            dir: PathBuf::from("fonts"),
            strict: false,
            entries,
        }
    }
}

/// A single font file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontEntry {
    /// File name, relative to `fonts.dir` unless absolute
    pub file: PathBuf,
    #[serde(default)]
    pub line_ending: LineEnding,
}

impl FontsConfig {
    /// Full path of a font's file
    pub fn path_of(&self, font: FontName) -> Option<PathBuf> {
        self.entries.get(&font).map(|entry| self.dir.join(&entry.file))
    }

    /// Build a loader over the configured files
    pub fn loader(&self) -> FontLoader {
        let resources = self
            .entries
            .iter()
            .map(|(&font, entry)| {
                (
                    font,
                    FontResource::file(self.dir.join(&entry.file), entry.line_ending),
                )
            })
            .collect();

        let strictness = if self.strict {
            Strictness::Strict
        } else {
            Strictness::Lenient
        };
        FontLoader::new(resources).with_strictness(strictness)
    }
}

/// Banner output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Written before every banner row
    pub prefix: String,
    /// Written after every banner row
    pub suffix: String,
    /// Parse each font once and share it between requests
    pub cache_fonts: bool,
}

impl RenderConfig {
    pub fn decoration(&self) -> Decoration {
        Decoration::new(self.prefix.clone(), self.suffix.clone())
    }
}

impl Config {
    /// Load configuration from defaults, a TOML file and the environment
    ///
    /// Without an explicit path the default location is used; a missing file
    /// is not an error.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        tracing::debug!("Loading configuration from {}", path.display());
        Ok(Self::figment(&path).extract()?)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Renderer wired up from this configuration
    pub fn renderer(&self) -> BannerRenderer {
        let renderer = BannerRenderer::new(self.fonts.loader())
            .with_decoration(self.render.decoration());

        if self.render.cache_fonts {
            renderer.with_cache(GlyphCache::new())
        } else {
            renderer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shipped_fonts_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../fonts")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen.to_string(), "127.0.0.1:8080");
        assert_eq!(config.fonts.entries.len(), 3);
        assert_eq!(
            config.fonts.entries[&FontName::Thinkertoy].line_ending,
            LineEnding::CrLf
        );
        assert_eq!(
            config.fonts.path_of(FontName::Shadow),
            Some(PathBuf::from("fonts/shadow.txt"))
        );
        assert!(!config.render.cache_fonts);
    }

    #[test]
    fn test_config_serialization() {
        let toml = Config::default().to_toml().unwrap();
        assert!(toml.contains("[server]"));
        assert!(toml.contains("[fonts.entries.standard]"));
        assert!(toml.contains("line_ending = \"crlf\""));
    }

    // Tests that read the environment run inside a figment Jail, which
    // serializes them with the one that sets variables.
    #[test]
    fn test_load_file_merges_with_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "asciiweb.toml",
                r#"
[server]
listen = "0.0.0.0:9000"

[fonts.entries.shadow]
file = "/opt/fonts/shadow-win.txt"
line_ending = "auto"

[render]
prefix = "\u001b[0m"
cache_fonts = true
"#,
            )?;

            let config =
                Config::load(Some(Path::new("asciiweb.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.server.listen.port(), 9000);
            assert_eq!(config.server.template, PathBuf::from("templates/index.html"));
            assert_eq!(config.fonts.entries.len(), 3);
            assert_eq!(
                config.fonts.path_of(FontName::Shadow),
                Some(PathBuf::from("/opt/fonts/shadow-win.txt"))
            );
            assert_eq!(
                config.fonts.entries[&FontName::Shadow].line_ending,
                LineEnding::Auto
            );
            assert_eq!(config.render.prefix, "\x1b[0m");
            assert!(config.render.cache_fonts);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        figment::Jail::expect_with(|_| {
            let config = Config::load(Some(Path::new("absent.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
[server]
listen = "0.0.0.0:9000"
"#,
            )?;
            jail.set_env("ASCIIWEB_SERVER__LISTEN", "127.0.0.1:7000");
            jail.set_env("ASCIIWEB_FONTS__STRICT", "true");

            let config = Config::load(Some(Path::new("config.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(config.server.listen.port(), 7000);
            assert!(config.fonts.strict);
            Ok(())
        });
    }

    #[test]
    fn test_renderer_uses_shipped_fonts() {
        let mut config = Config::default();
        config.fonts.dir = shipped_fonts_dir();
        config.fonts.strict = true;
        let renderer = config.renderer();

        for &font in FontName::all() {
            let art = renderer.render_font("Hello\nWorld!", font).unwrap();
            assert_eq!(art.lines().count(), 16, "font {font}");
        }
    }

    #[test]
    fn test_decoration_from_config() {
        let mut config = Config::default();
        config.fonts.dir = shipped_fonts_dir();
        config.render.prefix = "<".to_string();
        config.render.suffix = ">".to_string();
        config.render.cache_fonts = true;

        let art = config.renderer().render("a", "standard").unwrap();
        assert!(art.lines().all(|line| line.starts_with('<') && line.ends_with('>')));
    }
}
