// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rowscope_app::{Field, Generator, IndexError, IndexReply, IndexRequest};
use std::time::Instant;
use tracing::{debug, info};

use crate::{MATCH_CAP, search, sort};

/// Stateless request handler. Holds only the generator and its limits, so
/// one engine can serve any number of requests in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEngine {
    generator: Generator,
    universe_size: u32,
    match_cap: usize,
}

impl IndexEngine {
    pub const fn new(generator: Generator, universe_size: u32) -> Self {
        Self {
            generator,
            universe_size,
            match_cap: MATCH_CAP,
        }
    }

    pub const fn with_match_cap(self, match_cap: usize) -> Self {
        Self { match_cap, ..self }
    }

    pub const fn generator(&self) -> &Generator {
        &self.generator
    }

    pub const fn universe_size(&self) -> u32 {
        self.universe_size
    }

    pub const fn match_cap(&self) -> usize {
        self.match_cap
    }

    pub fn handle(&self, request: &IndexRequest) -> IndexReply {
        let started = Instant::now();
        let seq = request.seq();
        debug!(%seq, kind = request.kind(), "handling index request");

        let reply = match request {
            IndexRequest::Search {
                total,
                query,
                fields,
                ..
            } => match resolve_fields(fields) {
                Ok(fields) => IndexReply::Result {
                    seq,
                    indices: search(
                        &self.generator,
                        self.clamp_total(*total),
                        query,
                        &fields,
                        self.match_cap,
                    ),
                },
                Err(error) => IndexReply::Error { seq, error },
            },
            IndexRequest::Sort {
                total,
                sort_field,
                sort_dir,
                ..
            } => match resolve_field(sort_field) {
                Ok(field) => IndexReply::Sorted {
                    seq,
                    indices: sort(&self.generator, self.clamp_total(*total), field, *sort_dir),
                },
                Err(error) => IndexReply::Error { seq, error },
            },
        };

        let rows = match &reply {
            IndexReply::Result { indices, .. } => indices.as_ref().map(Vec::len),
            IndexReply::Sorted { indices, .. } => Some(indices.len()),
            IndexReply::Error { .. } => None,
        };
        info!(
            %seq,
            kind = request.kind(),
            rows = ?rows,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index request finished"
        );
        reply
    }

    fn clamp_total(&self, total: u32) -> u32 {
        total.min(self.universe_size)
    }
}

fn resolve_field(name: &str) -> Result<Field, IndexError> {
    Field::parse(name).ok_or_else(|| IndexError::InvalidField {
        field: name.to_owned(),
    })
}

fn resolve_fields(names: &[String]) -> Result<Vec<Field>, IndexError> {
    names.iter().map(|name| resolve_field(name)).collect()
}
