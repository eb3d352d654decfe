//! Configuration loading for rosterbot.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Error;
use crate::roster::CategoryTiers;
use crate::supervisor::schedule::DailySchedule;

pub type Result<T> = std::result::Result<T, Error>;

/// Environment variable holding the Discord bot token.
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Environment variable overriding the dashboard port.
pub const PORT_ENV: &str = "ROSTERBOT_PORT";

/// Get the rosterbot home directory (~/.rosterbot).
pub fn get_home_dir() -> Result<PathBuf> {
    let home = directories::UserDirs::new()
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

    Ok(home.home_dir().join(".rosterbot"))
}

/// Get the settings file path.
pub fn get_settings_path() -> Result<PathBuf> {
    Ok(get_home_dir()?.join("settings.json"))
}

/// Load settings from ~/.rosterbot/settings.json, falling back to defaults,
/// then apply environment overrides.
pub fn load_settings() -> Result<Settings> {
    load_settings_at(&get_settings_path()?)
}

/// Load settings from `path`, then apply environment overrides and validate.
pub fn load_settings_at(path: &std::path::Path) -> Result<Settings> {
    let mut settings = load_settings_from(path)?;
    settings.apply_env(|key| std::env::var(key).ok());
    validate_settings(&settings)?;
    Ok(settings)
}

/// Load settings from an explicit path without environment overrides.
pub fn load_settings_from(path: &std::path::Path) -> Result<Settings> {
    if !path.exists() {
        tracing::warn!(
            "Settings file not found at {}, using defaults",
            path.display()
        );
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

pub fn validate_settings(settings: &Settings) -> Result<()> {
    let roster = &settings.roster;
    if roster.tiers.is_empty() {
        return Err(Error::Config("roster.tiers must not be empty".to_string()));
    }
    for (i, tier) in roster.tiers.iter().enumerate() {
        if tier.trim().is_empty() {
            return Err(Error::Config("roster.tiers contains an empty label".to_string()));
        }
        if roster.tiers[..i].contains(tier) {
            return Err(Error::Config(format!("roster.tiers lists '{}' twice", tier)));
        }
    }
    if roster.tiers.contains(&roster.catch_all) {
        return Err(Error::Config(format!(
            "roster.catch_all '{}' must not also be a tier",
            roster.catch_all
        )));
    }
    if settings.supervisor.heartbeat_interval_secs == 0 {
        return Err(Error::Config(
            "supervisor.heartbeat_interval_secs must be positive".to_string(),
        ));
    }
    DailySchedule::parse(&settings.supervisor.daily_restart)?;
    Ok(())
}

/// Discord connection and command configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DiscordConfig {
    pub bot_token: Option<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default = "default_command_name")]
    pub command_name: String,
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_command_name() -> String {
    "liste".to_string()
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            command_prefix: default_command_prefix(),
            command_name: default_command_name(),
        }
    }
}

impl DiscordConfig {
    /// Full roster command, e.g. `!liste`.
    pub fn roster_command(&self) -> String {
        format!("{}{}", self.command_prefix, self.command_name)
    }
}

/// Roster board appearance and categorisation.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RosterConfig {
    #[serde(default = "default_tiers")]
    pub tiers: Vec<String>,
    #[serde(default = "default_catch_all")]
    pub catch_all: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: u32,
}

fn default_tiers() -> Vec<String> {
    ["Chefarzt", "Praxisleitung", "Arzt", "Ausbildung", "Praktikant"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_catch_all() -> String {
    "Andere".to_string()
}

fn default_title() -> String {
    "Dienstübersicht".to_string()
}

fn default_description() -> String {
    "Reagiere mit ✅ oder ❌ um deinen Status zu ändern".to_string()
}

fn default_color() -> u32 {
    0x3498db
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
            catch_all: default_catch_all(),
            title: default_title(),
            description: default_description(),
            color: default_color(),
        }
    }
}

impl RosterConfig {
    pub fn category_tiers(&self) -> CategoryTiers {
        CategoryTiers::new(self.tiers.clone(), self.catch_all.clone())
    }
}

/// Connection supervisor timing.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SupervisorConfig {
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
    /// Local wall-clock time of the daily restart, `HH:MM`.
    #[serde(default = "default_daily_restart")]
    pub daily_restart: String,
    #[serde(default = "default_join_timeout")]
    pub join_timeout_secs: u64,
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_daily_restart() -> String {
    "06:00".to_string()
}

fn default_join_timeout() -> u64 {
    5
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: default_heartbeat_interval(),
            daily_restart: default_daily_restart(),
            join_timeout_secs: default_join_timeout(),
        }
    }
}

/// Dashboard server configuration.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

/// rosterbot settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Settings {
    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub roster: RosterConfig,

    #[serde(default)]
    pub supervisor: SupervisorConfig,

    #[serde(default)]
    pub web: WebConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Settings {
    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            tracing::info!("Discord token configured from environment");
            self.discord.bot_token = Some(token.trim().to_string());
        }
        if let Some(port) = lookup(PORT_ENV) {
            match port.trim().parse::<u16>() {
                Ok(port) => self.web.port = port,
                Err(_) => tracing::warn!("Ignoring invalid {}={}", PORT_ENV, port),
            }
        }
    }

    /// Bot token, required to connect.
    pub fn require_token(&self) -> Result<&str> {
        self.discord
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "No Discord token configured. Set {} or discord.bot_token in {}",
                    TOKEN_ENV,
                    get_settings_path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|_| "settings.json".to_string())
                ))
            })
    }

    /// Copy of the settings safe to print.
    pub fn redacted(&self) -> Settings {
        let mut copy = self.clone();
        if copy.discord.bot_token.is_some() {
            copy.discord.bot_token = Some("***".to_string());
        }
        copy
    }
}
