// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Viewport windowing: which logical rows must exist for a scroll offset.
//!
//! Heights and offsets are in abstract units (pixels in a browser, terminal
//! lines here). Only rows inside [`VisibleRange`] are ever materialized.

use anyhow::{Result, bail};
use std::ops::Range;

use crate::{Generator, Record, ResultOrdering};

pub const DEFAULT_BUFFER: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    row_height: u32,
    viewport_height: u32,
    buffer: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub const fn len(self) -> usize {
        self.end - self.start
    }

    pub const fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub const fn as_range(self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub position: usize,
    pub record: Record,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            row_height: 1,
            viewport_height: 0,
            buffer: DEFAULT_BUFFER,
        }
    }
}

impl Viewport {
    pub fn new(row_height: u32, viewport_height: u32, buffer: u32) -> Result<Self> {
        if row_height == 0 {
            bail!("row height must be positive");
        }
        Ok(Self {
            row_height,
            viewport_height,
            buffer,
        })
    }

    pub const fn row_height(&self) -> u32 {
        self.row_height
    }

    pub const fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub const fn buffer(&self) -> u32 {
        self.buffer
    }

    pub fn with_viewport_height(self, viewport_height: u32) -> Self {
        Self {
            viewport_height,
            ..self
        }
    }

    /// Rows needed to fill the viewport, rounding a partial row up.
    pub const fn rows_per_viewport(&self) -> u64 {
        (self.viewport_height as u64).div_ceil(self.row_height as u64)
    }

    pub const fn first_visible_row(&self, scroll_offset: u64) -> u64 {
        scroll_offset / self.row_height as u64
    }

    pub const fn content_height(&self, logical_len: usize) -> u64 {
        (logical_len as u64).saturating_mul(self.row_height as u64)
    }

    pub const fn max_scroll_offset(&self, logical_len: usize) -> u64 {
        self.content_height(logical_len)
            .saturating_sub(self.viewport_height as u64)
    }

    pub fn clamp_scroll_offset(&self, scroll_offset: u64, logical_len: usize) -> u64 {
        scroll_offset.min(self.max_scroll_offset(logical_len))
    }

    pub fn visible_range(&self, scroll_offset: u64, logical_len: usize) -> VisibleRange {
        let buffer = u64::from(self.buffer);
        let len = logical_len as u64;

        let start = self
            .first_visible_row(scroll_offset)
            .saturating_sub(buffer)
            .min(len);
        let count = self.rows_per_viewport() + 2 * buffer;
        let end = start.saturating_add(count).min(len);

        VisibleRange {
            start: start as usize,
            end: end as usize,
        }
    }
}

/// Generates the records for `range` and nothing else.
pub fn materialize(
    generator: &Generator,
    ordering: &ResultOrdering,
    universe_size: u32,
    range: VisibleRange,
) -> Vec<VisibleRow> {
    range
        .as_range()
        .filter_map(|position| {
            ordering
                .resolve(position, universe_size)
                .map(|index| VisibleRow {
                    position,
                    record: generator.generate(index),
                })
        })
        .collect()
}
