//! Built-in architectures.

use std::collections::{BTreeMap, BTreeSet};

use crate::arch::{ArchDescription, ArchSpec, Bus, Word};
use crate::error::ArchResult;

/// Spacing between neighbouring sites, in micrometres.
const SITE_PITCH: f64 = 10.0;
/// Gap between the two halves of a CZ pair.
const PAIR_GAP: f64 = 2.0;
/// Spacing between words.
const WORD_PITCH: f64 = 20.0;

/// A grid of `num_words` words with `2 * columns` sites each.
///
/// Site `i` and `i + columns` form a CZ pair. Site bus `k` shifts every
/// left-hand site `i` to the right-hand site `columns + (i + k) % columns`.
/// Right-hand sites ride the word buses, and word bus `k` connects word
/// `w` to word `w + k + 1`. All words share one zone and may run any bus
/// together.
pub fn grid(num_words: u32, columns: u32) -> ArchResult<ArchSpec> {
    let words = (0..num_words)
        .map(|w| {
            let y = f64::from(w) * WORD_PITCH;
            let left = (0..columns).map(move |i| (f64::from(i) * SITE_PITCH, y));
            let right = (0..columns).map(move |i| (f64::from(i) * SITE_PITCH + PAIR_GAP, y));
            Word::new(left.chain(right)).with_cz_pairs((0..columns).map(|i| (i, i + columns)))
        })
        .collect();

    let site_buses = (0..columns)
        .map(|k| Bus::new(0..columns, (0..columns).map(|i| columns + (i + k) % columns)))
        .collect();

    let word_buses = (1..num_words)
        .map(|k| Bus::new(0..num_words - k, k..num_words))
        .collect();

    let all_words: BTreeSet<u32> = (0..num_words).collect();
    let compatibility: BTreeMap<u32, BTreeSet<u32>> = (0..num_words)
        .map(|w| (w, all_words.clone()))
        .collect();

    ArchSpec::new(ArchDescription {
        words,
        zones: vec![all_words.iter().copied().collect()],
        has_site_buses: all_words,
        has_word_buses: (columns..2 * columns).collect(),
        site_buses,
        word_buses,
        site_bus_compatibility: compatibility.clone(),
        word_bus_compatibility: compatibility,
    })
}

/// The two-word logical architecture: 2 words of 10 sites.
pub fn logical() -> ArchResult<ArchSpec> {
    grid(2, 5)
}

/// Look up a preset by name.
pub fn by_name(name: &str) -> Option<ArchResult<ArchSpec>> {
    match name {
        "logical" => Some(logical()),
        "grid4" => Some(grid(4, 5)),
        "grid8" => Some(grid(8, 8)),
        _ => None,
    }
}

/// Names accepted by [`by_name`].
pub const PRESET_NAMES: &[&str] = &["logical", "grid4", "grid8"];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::LocationAddress;

    #[test]
    fn test_logical_shape() {
        let arch = logical().unwrap();
        assert_eq!(arch.num_words(), 2);
        assert!(arch.words().iter().all(|w| w.num_sites() == 10));
        assert_eq!(arch.site_buses().len(), 5);
        assert_eq!(arch.word_buses().len(), 1);
        assert_eq!(arch.zones().len(), 1);
        assert!(arch.has_word_buses(5));
        assert!(!arch.has_word_buses(4));
    }

    #[test]
    fn test_grid_word_buses() {
        let arch = grid(4, 3).unwrap();
        assert_eq!(arch.word_buses().len(), 3);
        assert_eq!(arch.word_buses()[2].pairs().collect::<Vec<_>>(), vec![(0, 3)]);
        assert_eq!(
            arch.get_blockaded_location(LocationAddress::new(3, 4)),
            Some(LocationAddress::new(3, 1))
        );
    }

    #[test]
    fn test_by_name() {
        for name in PRESET_NAMES {
            assert!(by_name(name).unwrap().is_ok());
        }
        assert!(by_name("bogus").is_none());
    }
}
