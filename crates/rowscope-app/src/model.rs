// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use time::Date;

pub const AVATAR_URL_PREFIX: &str = "https://avatar.iran.liara.run/public/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub score: u8,
    pub last_message_at: Date,
    pub added_by: &'static str,
    pub avatar: AvatarSlot,
}

impl Record {
    pub fn value(&self, field: Field) -> FieldValue {
        match field {
            Field::Id => FieldValue::Number(self.id),
            Field::Name => FieldValue::Text(self.name.clone()),
            Field::Phone => FieldValue::Text(self.phone.clone()),
            Field::Email => FieldValue::Text(self.email.clone()),
            Field::Score => FieldValue::Number(u64::from(self.score)),
            Field::LastMessageAt => FieldValue::Date(self.last_message_at),
            Field::AddedBy => FieldValue::Text(self.added_by.to_owned()),
        }
    }

    /// Lowercased string form of `field`, the haystack for substring search.
    pub fn search_text(&self, field: Field) -> String {
        match field {
            Field::Id => self.id.to_string(),
            Field::Name => self.name.to_lowercase(),
            Field::Phone => self.phone.clone(),
            Field::Email => self.email.to_lowercase(),
            Field::Score => self.score.to_string(),
            Field::LastMessageAt => self.last_message_at.to_string(),
            Field::AddedBy => self.added_by.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AvatarSlot(u8);

impl AvatarSlot {
    pub const fn for_id(id: u64) -> Self {
        Self((id % 100) as u8 + 1)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub fn url(self) -> String {
        format!("{AVATAR_URL_PREFIX}{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Id,
    Name,
    Phone,
    Email,
    Score,
    LastMessageAt,
    AddedBy,
}

impl Field {
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Name,
        Self::Phone,
        Self::Email,
        Self::Score,
        Self::LastMessageAt,
        Self::AddedBy,
    ];

    pub const DEFAULT_SEARCH: [Self; 3] = [Self::Name, Self::Email, Self::Phone];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Score => "score",
            Self::LastMessageAt => "lastMessageAt",
            Self::AddedBy => "addedBy",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "id" => Some(Self::Id),
            "name" => Some(Self::Name),
            "phone" => Some(Self::Phone),
            "email" => Some(Self::Email),
            "score" => Some(Self::Score),
            "lastMessageAt" => Some(Self::LastMessageAt),
            "addedBy" => Some(Self::AddedBy),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Id => "#",
            Self::Name => "Customer",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Score => "Score",
            Self::LastMessageAt => "Last message sent at",
            Self::AddedBy => "Added by",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: Field,
    pub direction: SortDirection,
}

/// Sort key of one record field. Values of the same field always share a
/// variant, so the derived ordering only ever compares like with like.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldValue {
    Number(u64),
    Text(String),
    Date(Date),
}
