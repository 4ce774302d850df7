//! Record filtering, display pagination and facet extraction.
//!
//! Query parameters arrive from HTML forms, so every field is lenient:
//! empty or unparseable values mean "unset" rather than a 400.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::OccurrenceRecord;

/// Tri-state filter on coordinate presence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinateFilter {
    /// No constraint.
    #[default]
    Any,
    /// Both latitude and longitude present.
    Yes,
    /// Latitude or longitude missing.
    No,
}

impl CoordinateFilter {
    /// Query string value; empty for [`CoordinateFilter::Any`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "",
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    #[must_use]
    pub const fn matches(self, record: &OccurrenceRecord) -> bool {
        match self {
            Self::Any => true,
            Self::Yes => record.has_coordinates(),
            Self::No => !record.has_coordinates(),
        }
    }
}

impl<'de> Deserialize<'de> for CoordinateFilter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes") => Self::Yes,
            Some(v) if v.eq_ignore_ascii_case("no") => Self::No,
            _ => Self::Any,
        })
    }
}

/// Filter parameters shared by the results page, the JSON API and CSV export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceFilter {
    /// Case-insensitive substring of `recorded_by`.
    #[serde(default, deserialize_with = "non_empty")]
    pub recorded_by: Option<String>,

    /// Case-insensitive substring of `identified_by`.
    #[serde(default, deserialize_with = "non_empty")]
    pub identified_by: Option<String>,

    /// Case-insensitive substring of `country`.
    #[serde(default, deserialize_with = "non_empty")]
    pub country: Option<String>,

    /// Case-insensitive substring of `family`.
    #[serde(default, deserialize_with = "non_empty")]
    pub family: Option<String>,

    /// Inclusive lower year bound.
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_min: Option<i32>,

    /// Inclusive upper year bound.
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_max: Option<i32>,

    #[serde(default)]
    pub has_coordinates: CoordinateFilter,
}

impl OccurrenceFilter {
    /// True if no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Does `record` pass every set constraint?
    ///
    /// A record without a year fails any set year bound.
    #[must_use]
    pub fn matches(&self, record: &OccurrenceRecord) -> bool {
        contains_ci(record.recorded_by.as_deref(), self.recorded_by.as_deref())
            && contains_ci(record.identified_by.as_deref(), self.identified_by.as_deref())
            && contains_ci(record.country.as_deref(), self.country.as_deref())
            && contains_ci(record.family.as_deref(), self.family.as_deref())
            && self.year_min.is_none_or(|min| record.year.is_some_and(|y| y >= min))
            && self.year_max.is_none_or(|max| record.year.is_some_and(|y| y <= max))
            && self.has_coordinates.matches(record)
    }

    /// Keep matching items, preserving order.
    #[must_use]
    pub fn apply<T: AsRef<OccurrenceRecord>>(&self, items: Vec<T>) -> Vec<T> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches((*item).as_ref())).collect()
    }

    /// Query string pairs for the set constraints, for building links.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let text = [
            ("recorded_by", &self.recorded_by),
            ("identified_by", &self.identified_by),
            ("country", &self.country),
            ("family", &self.family),
        ];
        for (name, value) in text {
            if let Some(v) = value {
                pairs.push((name, v.clone()));
            }
        }
        if let Some(y) = self.year_min {
            pairs.push(("year_min", y.to_string()));
        }
        if let Some(y) = self.year_max {
            pairs.push(("year_max", y.to_string()));
        }
        if self.has_coordinates != CoordinateFilter::Any {
            pairs.push(("has_coordinates", self.has_coordinates.as_str().to_string()));
        }
        pairs
    }
}

fn contains_ci(field: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => {
            field.is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase()))
        }
    }
}

/// Page selector for display pagination.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "lenient_number")]
    pub page: Option<usize>,
}

/// One page of a larger result set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    /// Items across all pages.
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice out page `page` (1-based) of `items`.
    ///
    /// Page numbers below 1 are treated as 1. A page past the end is empty.
    #[must_use]
    pub fn paginate(items: Vec<T>, page: usize, per_page: usize) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = items.len();
        let start = (page - 1).saturating_mul(per_page);

        let items = if start >= total {
            Vec::new()
        } else {
            items.into_iter().skip(start).take(per_page).collect()
        };

        Self { items, page, per_page, total }
    }

    /// Number of pages; zero for an empty set.
    #[must_use]
    pub const fn pages(&self) -> usize {
        self.total.div_ceil(self.per_page)
    }

    #[must_use]
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    /// Transform the items while keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// Values offered in the filter form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facets {
    /// Distinct countries, sorted.
    pub countries: Vec<String>,
    /// Distinct families, sorted.
    pub families: Vec<String>,
    pub min_year: i32,
    pub max_year: i32,
}

impl Facets {
    /// Lower year bound shown when no record has a year.
    pub const DEFAULT_MIN_YEAR: i32 = 1700;

    /// Collect facets over an unfiltered record set.
    #[must_use]
    pub fn from_records<T: AsRef<OccurrenceRecord>>(items: &[T]) -> Self {
        let mut countries = std::collections::BTreeSet::new();
        let mut families = std::collections::BTreeSet::new();
        let mut years: Option<(i32, i32)> = None;

        for item in items {
            let record: &OccurrenceRecord = item.as_ref();
            if let Some(c) = &record.country {
                countries.insert(c.clone());
            }
            if let Some(f) = &record.family {
                families.insert(f.clone());
            }
            if let Some(y) = record.year {
                years = Some(years.map_or((y, y), |(lo, hi)| (lo.min(y), hi.max(y))));
            }
        }

        let (min_year, max_year) = years.unwrap_or_else(|| {
            use chrono::Datelike;
            (Self::DEFAULT_MIN_YEAR, chrono::Utc::now().year())
        });

        Self {
            countries: countries.into_iter().collect(),
            families: families.into_iter().collect(),
            min_year,
            max_year,
        }
    }
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

fn lenient_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, year: Option<i32>, coords: bool) -> OccurrenceRecord {
        OccurrenceRecord {
            gbif_id: id.to_string(),
            year,
            decimal_latitude: coords.then_some(10.0),
            decimal_longitude: coords.then_some(20.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_year_and_coordinate_filter() {
        let records = vec![
            record("1", Some(1950), true),
            record("2", Some(1955), false),
            record("3", Some(1960), true),
            record("4", Some(1961), true),
            record("5", None, true),
            record("6", Some(1949), true),
        ];
        let filter = OccurrenceFilter {
            year_min: Some(1950),
            year_max: Some(1960),
            has_coordinates: CoordinateFilter::Yes,
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(records).into_iter().map(|r| r.gbif_id).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_missing_coordinates_filter() {
        let mut half = record("1", None, true);
        half.decimal_longitude = None;
        let filter = OccurrenceFilter { has_coordinates: CoordinateFilter::No, ..Default::default() };
        assert!(filter.matches(&half));
        assert!(!filter.matches(&record("2", None, true)));
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let r = OccurrenceRecord {
            recorded_by: Some("Jane DOE | J. Smith".to_string()),
            country: Some("South Africa".to_string()),
            ..Default::default()
        };
        let filter = OccurrenceFilter {
            recorded_by: Some("jane doe".to_string()),
            country: Some("africa".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&r));

        let filter = OccurrenceFilter { family: Some("Rosaceae".to_string()), ..Default::default() };
        assert!(!filter.matches(&r));
    }

    #[test]
    fn test_paginate_bounds() {
        let page = Page::paginate((1..=120).collect::<Vec<_>>(), 3, 50);
        assert_eq!(page.items, (101..=120).collect::<Vec<_>>());
        assert_eq!(page.pages(), 3);
        assert!(page.has_prev());
        assert!(!page.has_next());

        let page = Page::paginate((1..=10).collect::<Vec<_>>(), 0, 50);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 10);

        let page = Page::paginate((1..=10).collect::<Vec<_>>(), 9, 5);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 10);

        let page = Page::paginate(Vec::<i32>::new(), 1, 50);
        assert_eq!(page.pages(), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_facets() {
        let records = vec![
            OccurrenceRecord { country: Some("Kenya".into()), year: Some(1990), ..Default::default() },
            OccurrenceRecord { country: Some("Chile".into()), family: Some("Poaceae".into()), year: Some(1970), ..Default::default() },
            OccurrenceRecord { country: Some("Kenya".into()), ..Default::default() },
        ];
        let facets = Facets::from_records(&records);
        assert_eq!(facets.countries, vec!["Chile", "Kenya"]);
        assert_eq!(facets.families, vec!["Poaceae"]);
        assert_eq!((facets.min_year, facets.max_year), (1970, 1990));

        let empty = Facets::from_records::<OccurrenceRecord>(&[]);
        assert_eq!(empty.min_year, Facets::DEFAULT_MIN_YEAR);
    }

    #[test]
    fn test_query_pairs_skip_unset() {
        let filter = OccurrenceFilter {
            country: Some("Chile".to_string()),
            year_max: Some(2000),
            has_coordinates: CoordinateFilter::Yes,
            ..Default::default()
        };
        assert_eq!(
            filter.to_query_pairs(),
            vec![
                ("country", "Chile".to_string()),
                ("year_max", "2000".to_string()),
                ("has_coordinates", "yes".to_string())
            ]
        );
        assert!(OccurrenceFilter::default().to_query_pairs().is_empty());
    }
}
