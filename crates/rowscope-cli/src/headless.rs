// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! JSON-lines front end for the index engine: one request per input line,
//! one reply per output line. Lines that cannot be decoded are reported on
//! the error stream and skipped.

use anyhow::{Context, Result};
use rowscope_app::{IndexError, IndexReply, IndexRequest, RequestSeq};
use rowscope_index::IndexEngine;
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub replied: usize,
    pub skipped: usize,
}

enum Decoded {
    Request(IndexRequest),
    Unknown { seq: RequestSeq, request_type: String },
}

pub fn serve<R, W, E>(engine: &IndexEngine, input: R, mut output: W, mut errors: E) -> Result<Summary>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    info!(
        universe_size = engine.universe_size(),
        match_cap = engine.match_cap(),
        "headless session started"
    );

    let mut summary = Summary::default();
    for (number, line) in input.lines().enumerate() {
        let line = line.context("read request line")?;
        if line.trim().is_empty() {
            continue;
        }

        let reply = match decode(&line) {
            Ok(Decoded::Request(request)) => engine.handle(&request),
            Ok(Decoded::Unknown { seq, request_type }) => IndexReply::Error {
                seq,
                error: IndexError::UnknownRequest { request_type },
            },
            Err(error) => {
                let line_number = number + 1;
                warn!(line = line_number, error = %format!("{error:#}"), "skipping request line");
                writeln!(errors, "rowscope: line {line_number}: {error:#}")
                    .context("write to error stream")?;
                summary.skipped += 1;
                continue;
            }
        };

        serde_json::to_writer(&mut output, &reply).context("encode reply")?;
        writeln!(output).context("write reply")?;
        output.flush().context("flush reply")?;
        summary.replied += 1;
    }

    info!(
        replied = summary.replied,
        skipped = summary.skipped,
        "headless session finished"
    );
    Ok(summary)
}

fn decode(line: &str) -> Result<Decoded> {
    let value: Value = serde_json::from_str(line).context("parse JSON request")?;
    match value.get("type").and_then(Value::as_str) {
        Some("search" | "sort") | None => {
            let request = serde_json::from_value(value).context("decode request")?;
            Ok(Decoded::Request(request))
        }
        Some(other) => Ok(Decoded::Unknown {
            seq: value
                .get("seq")
                .and_then(Value::as_u64)
                .map(RequestSeq::new)
                .unwrap_or_default(),
            request_type: other.to_owned(),
        }),
    }
}
