// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "ROWSCOPE_LOG";

/// Where log lines go. The interactive UI owns the terminal, so it logs to
/// a file; headless mode keeps stdout for replies and logs to stderr.
#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
}

pub fn init(target: LogTarget<'_>, default_level: &str) -> Result<()> {
    let filter = env_filter(env::var(LOG_ENV).ok().as_deref(), default_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create log directory {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| {
                    format!(
                        "open log file {}; set [logging].path to a writable location",
                        path.display()
                    )
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        LogTarget::Stderr => builder.with_writer(io::stderr).try_init(),
    };
    installed.map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn env_filter(from_env: Option<&str>, default_level: &str) -> Result<EnvFilter> {
    match from_env.map(str::trim) {
        Some(directives) if !directives.is_empty() => EnvFilter::try_new(directives)
            .with_context(|| {
                format!("parse {LOG_ENV}={directives:?}; use a level such as debug or a directive such as rowscope_index=debug")
            }),
        _ => EnvFilter::try_new(default_level)
            .with_context(|| format!("parse log level {default_level:?}")),
    }
}
