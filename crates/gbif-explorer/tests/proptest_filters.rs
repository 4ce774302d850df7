//! Property-based tests for filtering and display pagination.

use gbif_explorer::filters::{CoordinateFilter, OccurrenceFilter, Page};
use gbif_explorer::models::OccurrenceRecord;
use proptest::prelude::*;

/// Generate an arbitrary record with a unique id.
fn arb_record() -> impl Strategy<Value = OccurrenceRecord> {
    (
        proptest::option::of(1900i32..2030),    // year
        proptest::option::of(-90.0f64..90.0),   // latitude
        proptest::option::of(-180.0f64..180.0), // longitude
        proptest::option::of(prop_oneof![Just("Peru"), Just("Chile"), Just("peru")]),
        proptest::option::of(prop_oneof![Just("Jane Doe"), Just("J. DOE"), Just("Ann")]),
    )
        .prop_map(|(year, lat, lon, country, recorded_by)| OccurrenceRecord {
            year,
            decimal_latitude: lat,
            decimal_longitude: lon,
            country: country.map(str::to_string),
            recorded_by: recorded_by.map(str::to_string),
            ..Default::default()
        })
}

fn arb_records() -> impl Strategy<Value = Vec<OccurrenceRecord>> {
    proptest::collection::vec(arb_record(), 0..60).prop_map(|records| {
        records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.gbif_id = i.to_string();
                r
            })
            .collect()
    })
}

fn ids(records: &[OccurrenceRecord]) -> Vec<usize> {
    records.iter().map(|r| r.gbif_id.parse().unwrap()).collect()
}

proptest! {
    /// Every kept record satisfies the year bounds and coordinate constraint.
    #[test]
    fn filtered_records_satisfy_constraints(
        records in arb_records(),
        year_min in 1900i32..2030,
        span in 0i32..50,
    ) {
        let filter = OccurrenceFilter {
            year_min: Some(year_min),
            year_max: Some(year_min + span),
            has_coordinates: CoordinateFilter::Yes,
            ..Default::default()
        };

        for r in filter.apply(records) {
            let year = r.year.unwrap();
            prop_assert!(year >= year_min && year <= year_min + span);
            prop_assert!(r.decimal_latitude.is_some() && r.decimal_longitude.is_some());
        }
    }

    /// Filtering never reorders: kept ids are a strictly increasing subsequence.
    #[test]
    fn filtering_preserves_order(records in arb_records()) {
        let filter = OccurrenceFilter {
            country: Some("PERU".to_string()),
            ..Default::default()
        };

        let kept = ids(&filter.apply(records));
        prop_assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }

    /// Coordinate filters partition the record set.
    #[test]
    fn coordinate_filters_partition(records in arb_records()) {
        let with = OccurrenceFilter { has_coordinates: CoordinateFilter::Yes, ..Default::default() };
        let without = OccurrenceFilter { has_coordinates: CoordinateFilter::No, ..Default::default() };

        let total = records.len();
        let yes = with.apply(records.clone()).len();
        let no = without.apply(records).len();
        prop_assert_eq!(yes + no, total);
    }

    /// An empty filter keeps everything.
    #[test]
    fn empty_filter_is_identity(records in arb_records()) {
        let expected = ids(&records);
        prop_assert_eq!(ids(&OccurrenceFilter::default().apply(records)), expected);
    }

    /// Concatenating every page reproduces the input.
    #[test]
    fn pages_cover_all_items(items in proptest::collection::vec(any::<u32>(), 0..200), per_page in 1usize..40) {
        let first = Page::paginate(items.clone(), 1, per_page);
        let pages = first.pages();

        let mut rebuilt = Vec::new();
        for n in 1..=pages {
            let page = Page::paginate(items.clone(), n, per_page);
            prop_assert!(page.items.len() <= per_page);
            rebuilt.extend(page.items);
        }

        prop_assert_eq!(rebuilt, items.clone());
        prop_assert!(Page::paginate(items, pages + 1, per_page).items.is_empty());
    }
}
