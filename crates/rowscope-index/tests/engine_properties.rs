// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use proptest::prelude::*;
use rowscope_app::{DataIndex, Field, IndexReply, IndexRequest, RequestSeq, SortDirection};
use rowscope_index::{IndexEngine, IndexWorker, MATCH_CAP, search, sort};
use rowscope_testkit::{GOLDEN_RECORDS, field_values, fixture_generator, naive_search};
use std::collections::HashMap;

fn field_strategy() -> impl Strategy<Value = Field> {
    prop::sample::select(Field::ALL.to_vec())
}

fn query_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "a", "ava", "SMITH", " mia ", "9000", "example", "son", "0@", "zzz", "42",
    ])
    .prop_map(str::to_owned)
}

#[test]
fn worker_thread_reproduces_golden_records() -> Result<()> {
    let worker = IndexWorker::spawn(IndexEngine::new(fixture_generator(), 1_000_000))?;
    for golden in GOLDEN_RECORDS {
        worker.submit(IndexRequest::search(
            RequestSeq::new(u64::from(golden.index)),
            golden.index + 1,
            golden.email,
            &[Field::Email],
        ))?;
        let IndexReply::Result {
            indices: Some(indices),
            ..
        } = worker.recv()?
        else {
            panic!("expected search result for {}", golden.email);
        };
        assert!(
            indices.contains(&DataIndex::new(golden.index)),
            "worker did not reproduce {}",
            golden.email
        );
    }
    Ok(())
}

#[test]
fn ava_matches_index_zero_in_ten_rows() {
    let found = search(&fixture_generator(), 10, "ava", &[Field::Name], MATCH_CAP);
    assert!(found.is_some_and(|indices| indices.contains(&DataIndex::new(0))));
}

#[test]
fn broad_query_over_full_universe_stops_at_cap() {
    let found = search(
        &fixture_generator(),
        1_000_000,
        "example.com",
        &[Field::Email],
        MATCH_CAP,
    );
    let Some(found) = found else {
        panic!("non-empty query must return indices");
    };
    assert_eq!(found.len(), MATCH_CAP);
    assert_eq!(found.last(), Some(&DataIndex::new(MATCH_CAP as u32 - 1)));
}

#[test]
fn score_toggle_flips_monotonic_direction() {
    let generator = fixture_generator();
    let asc = sort(&generator, 2_000, Field::Score, SortDirection::Asc);
    let desc = sort(&generator, 2_000, Field::Score, SortDirection::Desc);

    let asc_scores = field_values(&generator, &asc, Field::Score);
    let desc_scores = field_values(&generator, &desc, Field::Score);
    assert!(asc_scores.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(desc_scores.windows(2).all(|pair| pair[0] >= pair[1]));

    let mut reversed = desc_scores.clone();
    reversed.reverse();
    assert_eq!(asc_scores, reversed);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn search_matches_reference_and_respects_cap(
        total in 0u32..=2_000,
        query in query_strategy(),
        fields in prop::collection::vec(field_strategy(), 1..=3),
        cap in 1usize..=500,
    ) {
        let generator = fixture_generator();
        let found = search(&generator, total, &query, &fields, cap);
        let reference = naive_search(&generator, total, &query, &fields);

        let Some(found) = found else {
            return Err(TestCaseError::fail("non-blank query returned null"));
        };
        prop_assert!(found.len() <= cap);
        prop_assert_eq!(&found[..], &reference[..found.len()]);
        if found.len() < cap {
            prop_assert_eq!(found.len(), reference.len());
        }
    }

    #[test]
    fn repeated_search_is_identical(
        total in 0u32..=2_000,
        query in query_strategy(),
    ) {
        let engine = IndexEngine::new(fixture_generator(), 2_000);
        let request = IndexRequest::search(RequestSeq::new(1), total, &query, &Field::DEFAULT_SEARCH);
        prop_assert_eq!(engine.handle(&request), engine.handle(&request));
    }

    #[test]
    fn blank_search_is_null(total in 0u32..=1_000_000, spaces in 0usize..4) {
        let query = " ".repeat(spaces);
        prop_assert_eq!(
            search(&fixture_generator(), total, &query, &Field::ALL, MATCH_CAP),
            None
        );
    }

    #[test]
    fn sort_is_permutation_with_reversed_distinct_pairs(
        total in 0u32..=600,
        field in field_strategy(),
    ) {
        let generator = fixture_generator();
        let asc = sort(&generator, total, field, SortDirection::Asc);
        let desc = sort(&generator, total, field, SortDirection::Desc);

        let mut seen = asc.clone();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..total).map(DataIndex::new).collect::<Vec<_>>());

        let asc_pos: HashMap<DataIndex, usize> =
            asc.iter().enumerate().map(|(pos, index)| (*index, pos)).collect();
        let desc_pos: HashMap<DataIndex, usize> =
            desc.iter().enumerate().map(|(pos, index)| (*index, pos)).collect();
        let values = field_values(&generator, &asc, field);

        for pair in asc.windows(2).zip(values.windows(2)) {
            let (indices, keys) = pair;
            if keys[0] != keys[1] {
                prop_assert!(desc_pos[&indices[0]] > desc_pos[&indices[1]]);
                prop_assert!(asc_pos[&indices[0]] < asc_pos[&indices[1]]);
            }
        }
    }
}
