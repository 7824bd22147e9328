// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;

use crate::DataIndex;

/// The sequence of data indices currently on display.
///
/// `Identity` walks the whole universe in index order. `Explicit` holds a
/// filter result or a sort permutation and is swapped out wholesale when a
/// newer one arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultOrdering {
    #[default]
    Identity,
    Explicit(Arc<[DataIndex]>),
}

impl ResultOrdering {
    pub fn explicit(indices: Vec<DataIndex>) -> Self {
        Self::Explicit(indices.into())
    }

    pub fn from_reply(indices: Option<Vec<DataIndex>>) -> Self {
        match indices {
            Some(indices) => Self::explicit(indices),
            None => Self::Identity,
        }
    }

    pub const fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Logical length of the displayed sequence.
    pub fn len(&self, universe_size: u32) -> usize {
        match self {
            Self::Identity => universe_size as usize,
            Self::Explicit(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self, universe_size: u32) -> bool {
        self.len(universe_size) == 0
    }

    /// Maps a logical position to the data index shown there.
    pub fn resolve(&self, position: usize, universe_size: u32) -> Option<DataIndex> {
        match self {
            Self::Identity => u32::try_from(position)
                .ok()
                .filter(|index| *index < universe_size)
                .map(DataIndex::new),
            Self::Explicit(indices) => indices.get(position).copied(),
        }
    }
}
