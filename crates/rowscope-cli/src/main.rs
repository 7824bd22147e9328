// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod headless;
mod logging;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use logging::LogTarget;
use rowscope_app::{AppCommand, AppState, Generator};
use rowscope_index::IndexEngine;
use runtime::WorkerRuntime;
use std::env;
use std::io;
use std::path::PathBuf;
use time::OffsetDateTime;
use tracing::{info, warn};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `rowscope --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    let mut settings = config.controller_settings()?;
    if let Some(rows) = options.rows {
        settings.universe_size = rows;
    }
    let viewport = config.viewport()?;
    let anchor = match config.anchor_date()? {
        Some(date) => date,
        None => OffsetDateTime::now_utc().date(),
    };
    if options.check_only {
        return Ok(());
    }

    let generator = Generator::new(anchor);
    let engine =
        IndexEngine::new(generator, settings.universe_size).with_match_cap(config.match_cap());

    if options.headless {
        logging::init(LogTarget::Stderr, config.log_level())?;
        let stdin = io::stdin();
        headless::serve(&engine, stdin.lock(), io::stdout().lock(), io::stderr().lock())?;
        return Ok(());
    }

    let log_path = config.log_path()?;
    logging::init(LogTarget::File(&log_path), config.log_level())?;
    info!(
        config = %options.config_path.display(),
        universe_size = settings.universe_size,
        anchor = %anchor,
        "starting rowscope"
    );

    let mut state = AppState::new(settings, viewport);
    let mut runtime = match WorkerRuntime::spawn(engine) {
        Ok(runtime) => runtime,
        Err(error) => {
            let reason = format!("{error:#}");
            warn!(%reason, "index worker failed to start");
            state.dispatch(AppCommand::EngineUnavailable(reason));
            WorkerRuntime::disabled()
        }
    };
    info!(engine_running = runtime.is_running(), "index runtime ready");
    rowscope_tui::run_app(&mut state, &generator, &mut runtime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    headless: bool,
    rows: Option<u32>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        headless: false,
        rows: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--headless" => {
                options.headless = true;
            }
            "--rows" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--rows requires a row count"))?;
                let rows = value
                    .as_ref()
                    .parse::<u32>()
                    .ok()
                    .filter(|rows| *rows > 0)
                    .ok_or_else(|| {
                        anyhow!(
                            "--rows expects a positive row count up to {}, got {:?}",
                            u32::MAX,
                            value.as_ref()
                        )
                    })?;
                options.rows = Some(rows);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("rowscope: browse a million generated customer rows");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and exit");
    println!("  --headless               Answer JSON-line index requests on stdin/stdout");
    println!("  --rows <n>               Override [data].universe_size");
    println!("  --help                   Show this help");
}
