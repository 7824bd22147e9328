// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rowscope_app::{DataIndex, Field, Generator};

pub const MATCH_CAP: usize = 200_000;

/// Case-insensitive substring scan over `0..total` in index order.
///
/// Returns `None` for a blank query, meaning "show the whole universe".
/// Stops once `cap` matches are collected, so a broad query silently omits
/// later matches.
pub fn search(
    generator: &Generator,
    total: u32,
    query: &str,
    fields: &[Field],
    cap: usize,
) -> Option<Vec<DataIndex>> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    let mut matches = Vec::new();
    for raw in 0..total {
        if matches.len() >= cap {
            break;
        }
        let index = DataIndex::new(raw);
        let record = generator.generate(index);
        if fields
            .iter()
            .any(|field| record.search_text(*field).contains(&needle))
        {
            matches.push(index);
        }
    }
    Some(matches)
}

#[cfg(test)]
mod tests {
    use super::search;
    use rowscope_app::{DataIndex, Field, Generator};

    fn generator() -> Generator {
        rowscope_testkit::fixture_generator()
    }

    #[test]
    fn blank_query_means_no_filter() {
        assert_eq!(search(&generator(), 100, "", &[Field::Name], 10), None);
        assert_eq!(search(&generator(), 100, "   ", &[Field::Name], 10), None);
    }

    #[test]
    fn query_is_trimmed_and_case_insensitive() {
        let matches = search(&generator(), 10, "  AVA ", &[Field::Name], 100);
        assert_eq!(matches, Some(vec![DataIndex::new(0)]));
    }

    #[test]
    fn any_listed_field_can_match() {
        let by_name = search(&generator(), 40, "johnson", &[Field::Name], 100);
        let by_email = search(&generator(), 40, "johnson", &[Field::Email], 100);
        assert_eq!(by_name, by_email);
        assert_eq!(by_name.map(|found| found.len()), Some(20));

        let by_phone = search(&generator(), 40, "9000000033", &Field::DEFAULT_SEARCH, 100);
        assert_eq!(by_phone, Some(vec![DataIndex::new(33)]));
    }

    #[test]
    fn unlisted_fields_are_ignored() {
        assert_eq!(
            search(&generator(), 40, "ava", &[Field::Phone], 100),
            Some(Vec::new())
        );
    }

    #[test]
    fn cap_truncates_in_index_order() {
        let matches = search(&generator(), 1_000, "example.com", &[Field::Email], 5);
        assert_eq!(
            matches,
            Some((0..5).map(DataIndex::new).collect::<Vec<_>>())
        );
    }
}
