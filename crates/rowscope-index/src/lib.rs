// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod engine;
pub mod search;
pub mod sort;
pub mod worker;

pub use engine::*;
pub use search::*;
pub use sort::*;
pub use worker::*;
