//! asciiweb - ASCII-art banners over HTTP
//!
//! ```text
//!  _    _      _ _
//! | |  | |    | | |
//! | |__| | ___| | | ___
//! |  __  |/ _ \ | |/ _ \
//! | |  | |  __/ | | (_) |
//! |_|  |_|\___|_|_|\___/
//! ```

use asciiweb_config::Config;
use asciiweb_core::FontName;
use asciiweb_server::Server;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// asciiweb - ASCII-art banner server
#[derive(Parser, Debug)]
#[command(name = "asciiweb")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to listen on, overrides the config file
        #[arg(short = 'l', long)]
        listen: Option<SocketAddr>,
    },
    /// Print a banner to stdout
    Render {
        /// Text to render; `\n` starts a new banner line
        text: String,

        /// Font to render with
        #[arg(short = 'f', long, default_value = "standard")]
        font: String,
    },
    /// List configured fonts
    Fonts,
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("asciiweb={}", log_level)),
        ))
        .init();

    tracing::debug!("Starting asciiweb v{}", env!("CARGO_PKG_VERSION"));

    asciiweb_core::init()?;
    let mut config = Config::load(args.config.as_deref())?;

    match args.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                config.server.listen = listen;
            }
            serve(config)
        }
        Command::Render { text, font } => {
            // Shell arguments carry `\n` literally
            let text = text.replace("\\n", "\n");
            match config.renderer().render(&text, &font) {
                Ok(art) => {
                    print!("{}", art);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::Fonts => {
            let loader = config.fonts.loader();
            for &font in FontName::all() {
                let source = loader
                    .resource(font)
                    .map(|resource| resource.source.to_string())
                    .unwrap_or_else(|| "(not configured)".to_string());
                match loader.try_load(font) {
                    Ok(table) => println!("{:<12} {:>3} glyphs  {}", font, table.len(), source),
                    Err(e) => println!("{:<12} unusable    {} ({})", font, source, e),
                }
            }
            Ok(())
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn serve(config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = Server::bind(&config).await?;
        server
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
            })
            .await?;
        Ok::<_, anyhow::Error>(())
    })
}
