//! # Derived Views
//!
//! Pure filters and sorts over a slice of entries. Each returns a fresh
//! vector; the input is never modified.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::api::CatalogEntry;

/// National dex id range per generation, inclusive
pub const GENERATION_RANGES: [(u8, u32, u32); 9] = [
    (1, 1, 151),
    (2, 152, 251),
    (3, 252, 386),
    (4, 387, 493),
    (5, 494, 649),
    (6, 650, 721),
    (7, 722, 809),
    (8, 810, 905),
    (9, 906, 1010),
];

/// Id range for a generation given as `"1"`..`"9"`
pub fn generation_range(generation: &str) -> Option<(u32, u32)> {
    let generation: u8 = generation.trim().parse().ok()?;
    GENERATION_RANGES
        .iter()
        .find(|(g, _, _)| *g == generation)
        .map(|(_, min, max)| (*min, *max))
}

/// Entries having `type_name` among their types; no filter → everything
pub fn filter_by_type(entries: &[CatalogEntry], type_name: Option<&str>) -> Vec<CatalogEntry> {
    match type_name.map(str::trim).filter(|t| !t.is_empty()) {
        None => entries.to_vec(),
        Some(type_name) => entries
            .iter()
            .filter(|entry| entry.has_type(type_name))
            .cloned()
            .collect(),
    }
}

/// Entries inside the generation's id range; an unknown generation matches nothing
pub fn filter_by_generation(
    entries: &[CatalogEntry],
    generation: Option<&str>,
) -> Vec<CatalogEntry> {
    let Some(generation) = generation.filter(|g| !g.trim().is_empty()) else {
        return entries.to_vec();
    };

    let Some((min, max)) = generation_range(generation) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| (min..=max).contains(&entry.id))
        .cloned()
        .collect()
}

/// Sort orders offered to the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Name,
    NameDesc,
    Id,
    IdDesc,
    Type,
    /// Keep list order
    #[default]
    Unsorted,
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    /// Unknown keys fall back to `Unsorted`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "name" => SortKey::Name,
            "name-desc" => SortKey::NameDesc,
            "id" => SortKey::Id,
            "id-desc" => SortKey::IdDesc,
            "type" => SortKey::Type,
            _ => SortKey::Unsorted,
        })
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Sorted copy of `entries`; ties keep their list order
pub fn sort_entries(entries: &[CatalogEntry], key: SortKey) -> Vec<CatalogEntry> {
    let mut sorted = entries.to_vec();

    match key {
        SortKey::Name => sorted.sort_by(|a, b| compare_text(&a.name, &b.name)),
        SortKey::NameDesc => sorted.sort_by(|a, b| compare_text(&b.name, &a.name)),
        SortKey::Id => sorted.sort_by_key(|entry| entry.id),
        SortKey::IdDesc => sorted.sort_by(|a, b| b.id.cmp(&a.id)),
        SortKey::Type => sorted.sort_by(|a, b| compare_text(a.primary_type(), b.primary_type())),
        SortKey::Unsorted => {}
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, name: &str, types: &[&str]) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
            types: types.iter().map(|t| t.to_string()).collect(),
            artwork: None,
            raw: serde_json::Value::Null,
        }
    }

    fn ids(entries: &[CatalogEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.id).collect()
    }

    fn sample() -> Vec<CatalogEntry> {
        vec![
            entry(152, "chikorita", &["grass"]),
            entry(1, "bulbasaur", &["grass", "poison"]),
            entry(151, "mew", &["psychic"]),
            entry(150, "mewtwo", &["psychic"]),
        ]
    }

    #[test]
    fn test_filter_by_generation_one() {
        let list = vec![
            entry(1, "bulbasaur", &[]),
            entry(150, "mewtwo", &[]),
            entry(151, "mew", &[]),
            entry(152, "chikorita", &[]),
        ];
        assert_eq!(ids(&filter_by_generation(&list, Some("1"))), vec![1, 150, 151]);
        assert_eq!(ids(&filter_by_generation(&list, Some("2"))), vec![152]);
    }

    #[test]
    fn test_filter_by_generation_edge_inputs() {
        let list = sample();
        assert_eq!(filter_by_generation(&list, None).len(), 4);
        assert_eq!(filter_by_generation(&list, Some("")).len(), 4);
        assert!(filter_by_generation(&list, Some("10")).is_empty());
        assert!(filter_by_generation(&list, Some("kanto")).is_empty());
    }

    #[test]
    fn test_generation_table_is_contiguous() {
        for pair in GENERATION_RANGES.windows(2) {
            assert_eq!(pair[0].2 + 1, pair[1].1);
        }
        assert_eq!(generation_range("9"), Some((906, 1010)));
    }

    #[test]
    fn test_filter_by_type() {
        let list = sample();
        assert_eq!(ids(&filter_by_type(&list, Some("grass"))), vec![152, 1]);
        assert_eq!(ids(&filter_by_type(&list, Some("poison"))), vec![1]);
        assert!(filter_by_type(&list, Some("dragon")).is_empty());
        assert_eq!(filter_by_type(&list, None).len(), 4);
    }

    #[test]
    fn test_sort_orders() {
        let list = sample();
        assert_eq!(ids(&sort_entries(&list, SortKey::Name)), vec![1, 152, 151, 150]);
        assert_eq!(ids(&sort_entries(&list, SortKey::NameDesc)), vec![150, 151, 152, 1]);
        assert_eq!(ids(&sort_entries(&list, SortKey::Id)), vec![1, 150, 151, 152]);
        assert_eq!(ids(&sort_entries(&list, SortKey::IdDesc)), vec![152, 151, 150, 1]);
        assert_eq!(ids(&sort_entries(&list, SortKey::Type)), vec![152, 1, 151, 150]);
        assert_eq!(ids(&sort_entries(&list, SortKey::Unsorted)), ids(&list));
    }

    #[test]
    fn test_sort_key_parsing() {
        assert_eq!("name-desc".parse::<SortKey>().unwrap(), SortKey::NameDesc);
        assert_eq!("id".parse::<SortKey>().unwrap(), SortKey::Id);
        assert_eq!("popularity".parse::<SortKey>().unwrap(), SortKey::Unsorted);
    }
}
