//! `devtools`: command-line front end for the DevTools client.
//!
//! # Usage
//!
//! ```text
//! devtools [OPTIONS] <COMMAND>
//!
//! Commands:
//!   targets                       List every discovered target
//!   call <METHOD> [PARAMS_JSON]   Send one raw command to the focused target
//!   screenshot --url <URL> --out <FILE>
//!                                 Navigate the focused page and save a PNG
//!
//! Options:
//!   --discovery-url <URL>   Target list endpoint [default: http://localhost:9222/json]
//!   --focus <TITLE>         Focus the first page whose title contains TITLE
//!   --strict-focus          Fail instead of falling back when --focus misses
//!   --call-timeout <SECS>   Give up on a reply after SECS seconds
//!   --config <FILE>         TOML config file (see `ClientConfig`)
//! ```
//!
//! # Environment variable overrides
//!
//! CLI args take precedence over environment variables, which take
//! precedence over the config file.
//!
//! | Variable                 | Option            |
//! |--------------------------|-------------------|
//! | `DEVTOOLS_DISCOVERY_URL` | `--discovery-url` |
//! | `DEVTOOLS_FOCUS`         | `--focus`         |
//! | `DEVTOOLS_CALL_TIMEOUT`  | `--call-timeout`  |
//! | `DEVTOOLS_CONFIG`        | `--config`        |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use base64::Engine as _;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use devtools_client::{CallArgs, ClientConfig, Domains, Session};

/// Talk to a browser over the DevTools protocol.
#[derive(Debug, Parser)]
#[command(
    name = "devtools",
    about = "Discover browser targets and send DevTools protocol commands",
    version
)]
struct Cli {
    /// URL of the endpoint listing debuggable targets.
    #[arg(long, global = true, env = "DEVTOOLS_DISCOVERY_URL")]
    discovery_url: Option<String>,

    /// Title substring of the page to focus.
    #[arg(long, global = true, env = "DEVTOOLS_FOCUS")]
    focus: Option<String>,

    /// Fail when `--focus` matches no page instead of using the first target.
    #[arg(long, global = true)]
    strict_focus: bool,

    /// Seconds to wait for each reply before giving up.
    #[arg(long, global = true, env = "DEVTOOLS_CALL_TIMEOUT")]
    call_timeout: Option<f64>,

    /// TOML config file with the same settings.
    #[arg(long, global = true, env = "DEVTOOLS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every discovered target.
    Targets,

    /// Send one command to the focused target and print its result.
    Call {
        /// Qualified method name, e.g. `Page.navigate`.
        method: String,
        /// Parameters as a JSON object.
        #[arg(default_value = "{}")]
        params: String,
    },

    /// Navigate the focused page and save a screenshot.
    Screenshot {
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "screenshot.png")]
        out: PathBuf,
    },
}

impl Cli {
    /// Layers defaults, then the config file, then CLI/env values.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or
    /// `--call-timeout` is not a positive number.
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ClientConfig::default(),
        };

        if let Some(url) = &self.discovery_url {
            config.discovery_url = url.clone();
        }
        if let Some(query) = &self.focus {
            config.initial_focus = Some(query.clone());
        }
        if self.strict_focus {
            config.strict_focus = true;
        }
        if let Some(secs) = self.call_timeout {
            match Duration::try_from_secs_f64(secs) {
                Ok(after) if !after.is_zero() => config.call_timeout = Some(after),
                _ => bail!("--call-timeout must be a positive number of seconds, got {secs}"),
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;

    info!("discovering targets at {}", config.discovery_url);
    let session = Session::connect(config).await?;

    match cli.command {
        Command::Targets => print_targets(&session),
        Command::Call { method, params } => {
            let value: serde_json::Value =
                serde_json::from_str(&params).context("PARAMS_JSON is not valid JSON")?;
            let Some(args) = CallArgs::from_json(value) else {
                bail!("PARAMS_JSON must be a JSON object");
            };
            let result = session.call(&method, args).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Screenshot { url, out } => {
            let page = session.page();
            page.navigate(&url, None, None, None).await?;
            let shot = page.capture_screenshot(None, None, None, None).await?;
            let Some(data) = shot["data"].as_str() else {
                bail!("Page.captureScreenshot returned no image data");
            };
            let png = base64::engine::general_purpose::STANDARD
                .decode(data)
                .context("decoding screenshot data")?;
            std::fs::write(&out, &png).with_context(|| format!("writing {}", out.display()))?;
            info!("saved {} bytes to {}", png.len(), out.display());
        }
    }
    Ok(())
}

fn print_targets(session: &Session) {
    for (index, target) in session.targets().iter().enumerate() {
        let marker = if index == session.focused_index() { "*" } else { " " };
        println!("{marker}Tab {index}");
        println!("    type: {}", target.kind);
        println!("    title: {}", target.title);
        println!("    url: {}", target.url);
        println!("    id: {}", target.id);
        if !session.is_reachable(index) {
            println!("    (unreachable)");
        }
    }
}
