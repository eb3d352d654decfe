//! CLI commands for rosterbot using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, Settings};
use crate::discord::DiscordConnector;
use crate::roster::service::new_board;
use crate::roster::{names::split_names, render, BoardHeader, BoardMode, RenderedBoard, Surface};
use crate::supervisor::{Supervisor, SupervisorOptions};
use crate::web::{run_server, AppState, WebServerConfig};

/// rosterbot - Discord attendance boards with a supervised connection.
#[derive(Parser)]
#[command(name = "rosterbot")]
#[command(version)]
#[command(about = "Discord attendance roster bot", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to ~/.rosterbot/settings.json)
    #[arg(long, global = true, env = "ROSTERBOT_SETTINGS")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Connect to Discord and serve the monitoring dashboard
    Run {
        /// Dashboard port
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not start the dashboard
        #[arg(long)]
        no_web: bool,
    },

    /// Render a board for a comma-separated name list without connecting
    Preview {
        /// Names, e.g. "Anna, Ben"
        names: String,

        /// Legacy flat layout without tier headers
        #[arg(long)]
        flat: bool,

        /// Plain-text board instead of an embed
        #[arg(long)]
        text: bool,

        /// Print the raw message payload as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective settings with secrets redacted
    Config,
}

impl Commands {
    /// Load settings from `--settings` or the default location.
    pub fn load_settings(&self) -> crate::error::Result<Settings> {
        match &self.settings {
            Some(path) => config::load_settings_at(path),
            None => config::load_settings(),
        }
    }

    /// Run the command.
    pub async fn run(&self, settings: Settings, log_dir: Option<PathBuf>) -> Result<()> {
        match &self.command {
            Command::Run { port, no_web } => cmd_run(settings, log_dir, *port, *no_web).await,
            Command::Preview {
                names,
                flat,
                text,
                json,
            } => cmd_preview(&settings, names, *flat, *text, *json),
            Command::Config => cmd_config(&settings),
        }
    }
}

async fn cmd_run(
    settings: Settings,
    log_dir: Option<PathBuf>,
    port: Option<u16>,
    no_web: bool,
) -> Result<()> {
    tracing::info!("Starting rosterbot {}", env!("CARGO_PKG_VERSION"));

    let options = SupervisorOptions::from_config(&settings.supervisor)?;
    let connector = Arc::new(DiscordConnector::new(settings.clone())?);
    let supervisor = Supervisor::new(connector, options);
    supervisor.start().await?;

    let web = if no_web {
        None
    } else {
        let config = WebServerConfig {
            host: settings.web.host.clone(),
            port: port.unwrap_or(settings.web.port),
        };
        let state = AppState {
            supervisor: supervisor.clone(),
            log_dir,
        };
        Some(tokio::spawn(run_server(config, state)))
    };

    let web_exit = async {
        match web {
            Some(handle) => handle.await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, stopping...");
        }
        result = web_exit => {
            match result {
                Ok(Ok(())) => tracing::warn!("Web server exited"),
                Ok(Err(e)) => tracing::error!("Web server error: {}", e),
                Err(e) => tracing::error!("Web server task failed: {}", e),
            }
        }
    }

    supervisor.stop().await;
    tracing::info!("rosterbot stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

fn cmd_preview(settings: &Settings, names: &str, flat: bool, text: bool, json: bool) -> Result<()> {
    let names = split_names(names);
    if names.is_empty() {
        anyhow::bail!("No usable names given");
    }

    let tiers = settings.roster.category_tiers();
    let header = BoardHeader {
        title: Some(settings.roster.title.clone()),
        description: Some(settings.roster.description.clone()),
        color: Some(settings.roster.color),
    };
    let mut board = new_board(&names, &[], &tiers, header);
    if flat {
        board.mode = BoardMode::Flat;
    }
    if text {
        board.surface = Surface::Text;
    }

    let rendered = render(&board, &tiers);
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!("{}", format_preview(&rendered));
    }
    Ok(())
}

/// Human-readable rendering of a board payload.
fn format_preview(rendered: &RenderedBoard) -> String {
    let Some(embed) = &rendered.embed else {
        return rendered.content.clone();
    };

    let mut lines = Vec::new();
    if let Some(title) = &embed.title {
        lines.push(title.clone());
    }
    if let Some(description) = &embed.description {
        lines.push(description.clone());
    }
    for field in &embed.fields {
        if field.inline {
            lines.push(format!("  {}", field.name));
        } else {
            lines.push(field.name.clone());
        }
    }
    lines.join("\n")
}

fn cmd_config(settings: &Settings) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::{BoardEmbed, EmbedField, PLACEHOLDER};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Commands::command().debug_assert();
    }

    #[test]
    fn parses_preview_flags() {
        let cli =
            Commands::try_parse_from(["rosterbot", "preview", "Anna, Ben", "--flat"]).unwrap();
        match cli.command {
            Command::Preview {
                names, flat, text, ..
            } => {
                assert_eq!(names, "Anna, Ben");
                assert!(flat);
                assert!(!text);
            }
            _ => panic!("expected preview"),
        }
    }

    #[test]
    fn parses_run_with_port() {
        let cli = Commands::try_parse_from(["rosterbot", "run", "--port", "8080"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Run {
                port: Some(8080),
                no_web: false
            }
        ));
    }

    #[test]
    fn preview_indents_rows() {
        let rendered = RenderedBoard::embed(BoardEmbed {
            title: Some("Dienstübersicht".to_string()),
            description: None,
            color: None,
            fields: vec![
                EmbedField::new("__**Arzt**__", PLACEHOLDER, false),
                EmbedField::new("Anna ❌", PLACEHOLDER, true),
            ],
        });
        assert_eq!(
            format_preview(&rendered),
            "Dienstübersicht\n__**Arzt**__\n  Anna ❌"
        );
        assert_eq!(format_preview(&RenderedBoard::text("Anna ❌")), "Anna ❌");
    }
}
