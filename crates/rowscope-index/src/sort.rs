// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rowscope_app::{DataIndex, Field, FieldValue, Generator, SortDirection};

/// Full permutation of `0..total` ordered by `field`.
///
/// Each key is generated once up front. The sort is stable, so equal keys
/// keep ascending index order in both directions.
pub fn sort(
    generator: &Generator,
    total: u32,
    field: Field,
    direction: SortDirection,
) -> Vec<DataIndex> {
    let mut keyed = (0..total)
        .map(|raw| {
            let index = DataIndex::new(raw);
            (generator.generate(index).value(field), index)
        })
        .collect::<Vec<(FieldValue, DataIndex)>>();

    keyed.sort_by(|(left, _), (right, _)| direction.apply(left.cmp(right)));
    keyed.into_iter().map(|(_, index)| index).collect()
}
