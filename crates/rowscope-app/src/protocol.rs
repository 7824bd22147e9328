// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Messages exchanged between the controller and the index engine.
//!
//! Field names travel as strings so the engine can reject unknown ones with
//! [`IndexError::InvalidField`] instead of trusting the caller. Every message
//! carries the [`RequestSeq`] it answers; a missing `seq` reads as zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DataIndex, Field, RequestSeq, SortDirection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum IndexRequest {
    Search {
        #[serde(default)]
        seq: RequestSeq,
        total: u32,
        query: String,
        fields: Vec<String>,
    },
    Sort {
        #[serde(default)]
        seq: RequestSeq,
        total: u32,
        sort_field: String,
        sort_dir: SortDirection,
    },
}

impl IndexRequest {
    pub fn search(seq: RequestSeq, total: u32, query: &str, fields: &[Field]) -> Self {
        Self::Search {
            seq,
            total,
            query: query.to_owned(),
            fields: fields.iter().map(|field| field.as_str().to_owned()).collect(),
        }
    }

    pub fn sort(seq: RequestSeq, total: u32, field: Field, direction: SortDirection) -> Self {
        Self::Sort {
            seq,
            total,
            sort_field: field.as_str().to_owned(),
            sort_dir: direction,
        }
    }

    pub const fn seq(&self) -> RequestSeq {
        match self {
            Self::Search { seq, .. } | Self::Sort { seq, .. } => *seq,
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::Sort { .. } => "sort",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum IndexReply {
    Result {
        #[serde(default)]
        seq: RequestSeq,
        indices: Option<Vec<DataIndex>>,
    },
    Sorted {
        #[serde(default)]
        seq: RequestSeq,
        indices: Vec<DataIndex>,
    },
    Error {
        #[serde(default)]
        seq: RequestSeq,
        error: IndexError,
    },
}

impl IndexReply {
    pub const fn seq(&self) -> RequestSeq {
        match self {
            Self::Result { seq, .. } | Self::Sorted { seq, .. } | Self::Error { seq, .. } => *seq,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IndexError {
    InvalidField {
        field: String,
    },
    #[serde(rename_all = "camelCase")]
    UnknownRequest {
        request_type: String,
    },
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidField { field } => write!(
                f,
                "invalid field {field:?}; expected one of id, name, phone, email, score, lastMessageAt, addedBy"
            ),
            Self::UnknownRequest { request_type } => write!(
                f,
                "unknown request type {request_type:?}; expected search or sort"
            ),
        }
    }
}

impl std::error::Error for IndexError {}
