// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Deterministic synthetic customers.
//!
//! Every record is a pure function of its index and the generator's anchor
//! date. The interactive thread and the index worker hold copies of the same
//! [`Generator`], so both see bit-identical records without sharing state.

use time::{Date, Duration};

use crate::{AvatarSlot, DataIndex, Record};

pub const UNIVERSE_SIZE: u32 = 1_000_000;
pub const ADDED_BY: &str = "Kartikey Mishra";

const DAYS_PER_YEAR: u32 = 365;
const PHONE_BASE: u64 = 9_000_000_000;
const PHONE_SPAN: u64 = 1_000_000_000;
const PHONE_DIGITS: u64 = 10_000_000_000;

pub const FIRST_NAMES: [&str; 20] = [
    "Ava",
    "Liam",
    "Noah",
    "Emma",
    "Olivia",
    "Mason",
    "Sophia",
    "Isabella",
    "Lucas",
    "Mia",
    "Ethan",
    "Amelia",
    "Harper",
    "James",
    "Benjamin",
    "Charlotte",
    "Elijah",
    "Evelyn",
    "Logan",
    "Jack",
];

pub const LAST_NAMES: [&str; 15] = [
    "Smith",
    "Johnson",
    "Williams",
    "Brown",
    "Jones",
    "Garcia",
    "Miller",
    "Davis",
    "Rodriguez",
    "Martinez",
    "Hernandez",
    "Lopez",
    "Gonzalez",
    "Wilson",
    "Anderson",
];

/// Stable pseudo-random fraction in `[0, 1)` for `index`.
///
/// Golden-ratio offset followed by a murmur-style xorshift-multiply
/// avalanche. Not cryptographic; only stability and spread matter.
pub fn fraction(index: u32) -> f64 {
    let mut x = index.wrapping_add(0x9E37_79B9);
    x ^= x >> 16;
    x = x.wrapping_mul(0x85EB_CA6B);
    x ^= x >> 13;
    x = x.wrapping_mul(0xC2B2_AE35);
    x ^= x >> 16;
    f64::from(x) / 4_294_967_296.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    anchor: Date,
}

impl Generator {
    pub const fn new(anchor: Date) -> Self {
        Self { anchor }
    }

    pub const fn anchor(&self) -> Date {
        self.anchor
    }

    pub fn generate(&self, index: DataIndex) -> Record {
        let i = index.get();
        let id = u64::from(i) + 1;
        let first = FIRST_NAMES[i as usize % FIRST_NAMES.len()];
        let last = LAST_NAMES[(i as usize / FIRST_NAMES.len()) % LAST_NAMES.len()];

        let phone_number = (PHONE_BASE + u64::from(i) % PHONE_SPAN) % PHONE_DIGITS;
        let days_ago = i % DAYS_PER_YEAR;

        Record {
            id,
            name: format!("{first} {last}"),
            phone: format!("+91 {phone_number:010}"),
            email: format!(
                "{}.{}{}@example.com",
                first.to_lowercase(),
                last.to_lowercase(),
                id % 100
            ),
            score: score_for(i),
            last_message_at: self
                .anchor
                .saturating_sub(Duration::days(i64::from(days_ago))),
            added_by: ADDED_BY,
            avatar: AvatarSlot::for_id(id),
        }
    }
}

pub fn score_for(index: u32) -> u8 {
    // fraction < 1.0, so the product stays below 100.
    (fraction(index) * 100.0) as u8
}
