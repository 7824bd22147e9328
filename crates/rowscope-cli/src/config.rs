// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rowscope_app::{
    ControllerSettings, DEFAULT_BUFFER, Field, ReplyPolicy, UNIVERSE_SIZE, Viewport,
};
use rowscope_index::MATCH_CAP;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use time::Date;
use time::macros::format_description;

pub const APP_NAME: &str = "rowscope";
const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "ROWSCOPE_CONFIG_PATH";
const DEFAULT_DEBOUNCE: &str = "250ms";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub data: Data,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub viewport: ViewportSection,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data: Data::default(),
            search: Search::default(),
            viewport: ViewportSection::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    pub universe_size: Option<u32>,
    /// Calendar day that plays "today" for generated timestamps.
    pub anchor_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    pub match_cap: Option<usize>,
    pub debounce: Option<String>,
    pub fields: Option<Vec<String>>,
    pub drop_stale_replies: Option<bool>,
}

impl Default for Search {
    fn default() -> Self {
        Self {
            match_cap: Some(MATCH_CAP),
            debounce: Some(DEFAULT_DEBOUNCE.to_owned()),
            fields: Some(
                Field::DEFAULT_SEARCH
                    .iter()
                    .map(|field| field.as_str().to_owned())
                    .collect(),
            ),
            drop_stale_replies: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewportSection {
    pub row_height: Option<u32>,
    pub buffer: Option<u32>,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            row_height: Some(1),
            buffer: Some(DEFAULT_BUFFER),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            path: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [data], [search], [viewport], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.universe_size() == 0 {
            bail!(
                "data.universe_size in {} must be positive, got 0",
                path.display()
            );
        }

        self.anchor_date()
            .with_context(|| format!("invalid data.anchor_date in {}", path.display()))?;

        if self.match_cap() == 0 {
            bail!(
                "search.match_cap in {} must be positive, got 0",
                path.display()
            );
        }

        self.debounce()
            .with_context(|| format!("invalid search.debounce in {}", path.display()))?;
        self.search_fields()
            .with_context(|| format!("invalid search.fields in {}", path.display()))?;

        if self.row_height() == 0 {
            bail!(
                "viewport.row_height in {} must be positive, got 0",
                path.display()
            );
        }

        let level = self.log_level();
        if level.parse::<tracing::Level>().is_err() {
            bail!(
                "logging.level in {} must be one of trace, debug, info, warn, error; got {level:?}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn universe_size(&self) -> u32 {
        self.data.universe_size.unwrap_or(UNIVERSE_SIZE)
    }

    pub fn anchor_date(&self) -> Result<Option<Date>> {
        self.data.anchor_date.as_deref().map(parse_date).transpose()
    }

    pub fn match_cap(&self) -> usize {
        self.search.match_cap.unwrap_or(MATCH_CAP)
    }

    pub fn debounce(&self) -> Result<Duration> {
        parse_duration(self.search.debounce.as_deref().unwrap_or(DEFAULT_DEBOUNCE))
    }

    pub fn search_fields(&self) -> Result<Vec<Field>> {
        let Some(names) = &self.search.fields else {
            return Ok(Field::DEFAULT_SEARCH.to_vec());
        };
        if names.is_empty() {
            bail!("search.fields must name at least one field");
        }
        names
            .iter()
            .map(|name| {
                Field::parse(name).ok_or_else(|| {
                    anyhow!(
                        "unknown search field {name:?}; expected one of id, name, phone, email, score, lastMessageAt, addedBy"
                    )
                })
            })
            .collect()
    }

    pub fn reply_policy(&self) -> ReplyPolicy {
        if self.search.drop_stale_replies.unwrap_or(true) {
            ReplyPolicy::LatestOnly
        } else {
            ReplyPolicy::AcceptAll
        }
    }

    pub fn row_height(&self) -> u32 {
        self.viewport.row_height.unwrap_or(1)
    }

    pub fn buffer(&self) -> u32 {
        self.viewport.buffer.unwrap_or(DEFAULT_BUFFER)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.logging.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [logging].path in the config")
        })?;
        Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
    }

    pub fn controller_settings(&self) -> Result<ControllerSettings> {
        Ok(ControllerSettings {
            universe_size: self.universe_size(),
            debounce: self.debounce()?,
            search_fields: self.search_fields()?,
            reply_policy: self.reply_policy(),
        })
    }

    pub fn viewport(&self) -> Result<Viewport> {
        Viewport::new(self.row_height(), 0, self.buffer())
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rowscope config\n# Place this file at: {}\n\nversion = 1\n\n[data]\nuniverse_size = {}\n# Optional. Defaults to today's UTC date.\n# anchor_date = \"2026-03-15\"\n\n[search]\nmatch_cap = {}\ndebounce = \"{}\"\nfields = [\"name\", \"email\", \"phone\"]\ndrop_stale_replies = true\n\n[viewport]\nrow_height = 1\nbuffer = {}\n\n[logging]\nlevel = \"{}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/rowscope/rowscope.log)\n# path = \"/absolute/path/to/rowscope.log\"\n",
            path.display(),
            UNIVERSE_SIZE,
            MATCH_CAP,
            DEFAULT_DEBOUNCE,
            DEFAULT_BUFFER,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_date(raw: &str) -> Result<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("invalid date {raw:?}; use YYYY-MM-DD (for example 2026-03-15)"))
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid duration {raw:?}; {mins} minutes is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 250ms or 1s)")
}
