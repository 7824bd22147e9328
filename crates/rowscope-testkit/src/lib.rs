// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Shared fixtures for rowscope tests.
//!
//! The golden records pin the generator's output for a fixed anchor date.
//! Any thread or process that claims to reproduce the universe must agree
//! with them field for field.

use anyhow::Result;
use rowscope_app::{DataIndex, Field, FieldValue, Generator, Record};
use std::path::PathBuf;
use time::macros::date;
use time::{Date, Month};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldenRecord {
    pub index: u32,
    pub name: &'static str,
    pub phone: &'static str,
    pub email: &'static str,
    pub score: u8,
    pub last_message_at: (i32, Month, u8),
}

pub const GOLDEN_RECORDS: [GoldenRecord; 13] = [
    golden(0, "Ava Smith", "+91 9000000000", "ava.smith1@example.com", 57, (2026, Month::March, 15)),
    golden(1, "Liam Smith", "+91 9000000001", "liam.smith2@example.com", 58, (2026, Month::March, 14)),
    golden(2, "Noah Smith", "+91 9000000002", "noah.smith3@example.com", 70, (2026, Month::March, 13)),
    golden(19, "Jack Smith", "+91 9000000019", "jack.smith20@example.com", 21, (2026, Month::February, 24)),
    golden(20, "Ava Johnson", "+91 9000000020", "ava.johnson21@example.com", 36, (2026, Month::February, 23)),
    golden(41, "Liam Williams", "+91 9000000041", "liam.williams42@example.com", 56, (2026, Month::February, 2)),
    golden(299, "Jack Anderson", "+91 9000000299", "jack.anderson0@example.com", 89, (2025, Month::May, 20)),
    golden(300, "Ava Smith", "+91 9000000300", "ava.smith1@example.com", 88, (2025, Month::May, 19)),
    golden(364, "Olivia Brown", "+91 9000000364", "olivia.brown65@example.com", 27, (2025, Month::March, 16)),
    golden(365, "Mason Brown", "+91 9000000365", "mason.brown66@example.com", 38, (2026, Month::March, 15)),
    golden(4_096, "Elijah Martinez", "+91 9000004096", "elijah.martinez97@example.com", 9, (2025, Month::December, 24)),
    golden(123_456, "Elijah Davis", "+91 9000123456", "elijah.davis57@example.com", 46, (2025, Month::December, 19)),
    golden(999_999, "Jack Jones", "+91 9000999999", "jack.jones0@example.com", 58, (2025, Month::June, 24)),
];

const fn golden(
    index: u32,
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    score: u8,
    last_message_at: (i32, Month, u8),
) -> GoldenRecord {
    GoldenRecord {
        index,
        name,
        phone,
        email,
        score,
        last_message_at,
    }
}

impl GoldenRecord {
    pub fn date(&self) -> Result<Date> {
        let (year, month, day) = self.last_message_at;
        Ok(Date::from_calendar_date(year, month, day)?)
    }

    /// Field-by-field comparison; returns the first mismatching field name.
    pub fn mismatch(&self, record: &Record) -> Result<Option<&'static str>> {
        let mismatch = if record.id != u64::from(self.index) + 1 {
            Some("id")
        } else if record.name != self.name {
            Some("name")
        } else if record.phone != self.phone {
            Some("phone")
        } else if record.email != self.email {
            Some("email")
        } else if record.score != self.score {
            Some("score")
        } else if record.last_message_at != self.date()? {
            Some("lastMessageAt")
        } else {
            None
        };
        Ok(mismatch)
    }
}

pub const fn fixture_anchor() -> Date {
    date!(2026 - 03 - 15)
}

pub fn fixture_generator() -> Generator {
    Generator::new(fixture_anchor())
}

/// Uncapped brute-force search used as the reference for the engine.
pub fn naive_search(
    generator: &Generator,
    total: u32,
    query: &str,
    fields: &[Field],
) -> Vec<DataIndex> {
    let needle = query.trim().to_lowercase();
    (0..total)
        .map(DataIndex::new)
        .filter(|index| {
            let record = generator.generate(*index);
            fields.iter().any(|field| {
                let haystack = match record.value(*field) {
                    FieldValue::Number(value) => value.to_string(),
                    FieldValue::Text(value) => value.to_lowercase(),
                    FieldValue::Date(value) => value.to_string(),
                };
                haystack.contains(&needle)
            })
        })
        .collect()
}

pub fn field_values(generator: &Generator, indices: &[DataIndex], field: Field) -> Vec<FieldValue> {
    indices
        .iter()
        .map(|index| generator.generate(*index).value(field))
        .collect()
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.toml");
    Ok((dir, path))
}
