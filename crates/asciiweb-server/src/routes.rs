//! Request routing
//!
//! | Path          | Handler                                  |
//! |---------------|------------------------------------------|
//! | `/`           | index page (GET/HEAD only)               |
//! | `/ascii-art`  | render `text` with `artFile`, any method |
//! | `/static/...` | files from the static directory          |
//! | anything else | 404                                      |

use crate::form::Form;
use crate::http::{Request, Response};
use crate::template::PageTemplate;
use asciiweb_config::Config;
use asciiweb_core::{BannerRenderer, CoreError};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Form field holding the text to render
pub const TEXT_FIELD: &str = "text";

/// Form field holding the font name
pub const FONT_FIELD: &str = "artFile";

/// Everything a request handler needs
#[derive(Debug)]
pub struct App {
    renderer: BannerRenderer,
    template: PageTemplate,
    static_dir: PathBuf,
}

impl App {
    pub fn new(
        renderer: BannerRenderer,
        template: PageTemplate,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            template,
            static_dir: static_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.renderer(),
            PageTemplate::new(&config.server.template),
            &config.server.static_dir,
        )
    }

    pub fn renderer(&self) -> &BannerRenderer {
        &self.renderer
    }

    /// Route a request to its handler
    pub async fn handle(self: Arc<Self>, request: Request) -> Response {
        match request.path.as_str() {
            "/" => self.index(&request).await,
            "/ascii-art" => self.generate(&request).await,
            path if path.starts_with("/static/") => self.static_file(path).await,
            _ => Response::error(404),
        }
    }

    async fn index(&self, request: &Request) -> Response {
        if !request.method.is_read() {
            tracing::warn!("Rejected {} on index page", request.method);
            return Response::error(400);
        }
        self.page("").await
    }

    async fn generate(self: Arc<Self>, request: &Request) -> Response {
        let body = if request.has_form_body() {
            String::from_utf8_lossy(&request.body).into_owned()
        } else {
            String::new()
        };
        let form = Form::from_parts(&request.query, &body);
        let text = form.get(TEXT_FIELD).unwrap_or_default().to_string();
        let font = form.get(FONT_FIELD).unwrap_or_default().to_string();

        // Font loading reads files; keep it off the async workers
        let app = Arc::clone(&self);
        let rendered =
            tokio::task::spawn_blocking(move || app.renderer.render(&text, &font)).await;

        match rendered {
            Ok(Ok(art)) => self.page(&art).await,
            Ok(Err(e)) => error_response(&e),
            Err(e) => {
                tracing::error!("Render task failed: {}", e);
                Response::error(500)
            }
        }
    }

    async fn page(&self, art: &str) -> Response {
        match self.template.render(art).await {
            Ok(page) => Response::html(page),
            Err(e) => {
                tracing::error!(
                    "Failed to read template {}: {}",
                    self.template.path().display(),
                    e
                );
                Response::error(500)
            }
        }
    }

    async fn static_file(&self, path: &str) -> Response {
        let Some(relative) = safe_relative(path.trim_start_matches("/static/")) else {
            tracing::warn!("Rejected static path {:?}", path);
            return Response::error(400);
        };

        match tokio::fs::read(self.static_dir.join(&relative)).await {
            Ok(bytes) => Response::new(200, content_type(&relative), bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Response::error(404),
            Err(e) => {
                tracing::error!("Failed to read static file {}: {}", relative.display(), e);
                Response::error(500)
            }
        }
    }
}

/// Map a render failure to a status; server-side causes stay out of the body
fn error_response(error: &CoreError) -> Response {
    if error.is_client_error() {
        tracing::warn!("Bad render request: {}", error);
        Response::error(400)
    } else {
        tracing::error!("Render failed: {}", error);
        Response::error(500)
    }
}

/// Relative path made only of normal components
fn safe_relative(path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    let mut components = path.components().peekable();
    components.peek()?;
    components
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| path.to_path_buf())
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("css") => "text/css; charset=utf-8",
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
