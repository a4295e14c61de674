//! The immutable architecture description.
//!
//! An [`ArchSpec`] is built once per target device from an
//! [`ArchDescription`] (the serde-facing form) and never mutated
//! afterwards. Construction checks every cross reference and infers the
//! address encoding, so all later queries can assume a well-formed model.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::address::{
    Direction, LaneAddress, LaneKind, LocationAddress, SiteLaneAddress, WordLaneAddress,
    ZoneAddress,
};
use crate::encoding::EncodingType;
use crate::error::{AddressError, ArchError, ArchResult};

/// One parallelism group of lanes.
///
/// For site buses `src`/`dst` are site indices within a word; for word
/// buses they are word indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    /// Source-side ids.
    pub src: Vec<u32>,
    /// Destination-side ids, aligned with `src`.
    pub dst: Vec<u32>,
}

impl Bus {
    /// Create a new bus.
    pub fn new(src: impl IntoIterator<Item = u32>, dst: impl IntoIterator<Item = u32>) -> Self {
        Self {
            src: src.into_iter().collect(),
            dst: dst.into_iter().collect(),
        }
    }

    /// Number of lanes in the bus.
    pub fn len(&self) -> usize {
        self.src.len()
    }

    /// Check if the bus has no lanes.
    pub fn is_empty(&self) -> bool {
        self.src.is_empty()
    }

    /// Destination paired with a source id.
    pub fn dst_of(&self, src: u32) -> Option<u32> {
        self.src
            .iter()
            .position(|&s| s == src)
            .and_then(|i| self.dst.get(i).copied())
    }

    /// Iterate over `(src, dst)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.src.iter().copied().zip(self.dst.iter().copied())
    }
}

/// One row of the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Physical `(x, y)` position of every site.
    pub sites: Vec<(f64, f64)>,
    /// Fixed CZ partner per site. Sites without an entry are unblockaded.
    #[serde(default)]
    pub cz_pair: BTreeMap<u32, u32>,
}

impl Word {
    /// Create a word without CZ pairings.
    pub fn new(sites: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            sites: sites.into_iter().collect(),
            cz_pair: BTreeMap::new(),
        }
    }

    /// Add symmetric CZ pairings.
    #[must_use]
    pub fn with_cz_pairs(mut self, pairs: impl IntoIterator<Item = (u32, u32)>) -> Self {
        for (a, b) in pairs {
            self.cz_pair.insert(a, b);
            self.cz_pair.insert(b, a);
        }
        self
    }

    /// Number of sites.
    #[inline]
    pub fn num_sites(&self) -> usize {
        self.sites.len()
    }

    /// Check whether `site_id` is a site of this word.
    #[inline]
    pub fn has_site(&self, site_id: u32) -> bool {
        (site_id as usize) < self.sites.len()
    }

    /// CZ partner of a site.
    #[inline]
    pub fn partner(&self, site_id: u32) -> Option<u32> {
        self.cz_pair.get(&site_id).copied()
    }
}

/// Serializable form of an architecture.
///
/// Converted into an [`ArchSpec`] with [`ArchSpec::new`], which validates
/// all references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchDescription {
    /// All words of the device.
    pub words: Vec<Word>,
    /// Word ids per zone.
    pub zones: Vec<Vec<u32>>,
    /// Words able to run site buses.
    pub has_site_buses: BTreeSet<u32>,
    /// Sites able to ride word buses.
    pub has_word_buses: BTreeSet<u32>,
    /// Intra-word buses.
    pub site_buses: Vec<Bus>,
    /// Inter-word buses.
    pub word_buses: Vec<Bus>,
    /// Words whose site buses may run in the same step, keyed by word id.
    #[serde(default)]
    pub site_bus_compatibility: BTreeMap<u32, BTreeSet<u32>>,
    /// Words whose word buses may run in the same step, keyed by word id.
    #[serde(default)]
    pub word_bus_compatibility: BTreeMap<u32, BTreeSet<u32>>,
}

/// Immutable description of a neutral-atom device.
///
/// # Example
///
/// ```
/// use lanes_arch::{LocationAddress, presets};
///
/// let arch = presets::logical().unwrap();
/// assert_eq!(arch.num_words(), 2);
/// assert_eq!(
///     arch.get_blockaded_location(LocationAddress::new(0, 0)),
///     Some(LocationAddress::new(0, 5))
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArchDescription", into = "ArchDescription")]
pub struct ArchSpec {
    words: Vec<Word>,
    zones: Vec<Vec<u32>>,
    has_site_buses: BTreeSet<u32>,
    has_word_buses: BTreeSet<u32>,
    site_buses: Vec<Bus>,
    word_buses: Vec<Bus>,
    site_bus_compatibility: BTreeMap<u32, BTreeSet<u32>>,
    word_bus_compatibility: BTreeMap<u32, BTreeSet<u32>>,
    encoding: EncodingType,
}

impl ArchSpec {
    /// Build an architecture, checking every reference.
    pub fn new(description: ArchDescription) -> ArchResult<Self> {
        let ArchDescription {
            words,
            zones,
            has_site_buses,
            has_word_buses,
            site_buses,
            word_buses,
            site_bus_compatibility,
            word_bus_compatibility,
        } = description;

        if words.is_empty() {
            return Err(ArchError::EmptyArchitecture);
        }

        let num_words = words.len();
        let max_sites = words.iter().map(Word::num_sites).max().unwrap_or(0);
        let word_in_range = |id: u32| (id as usize) < num_words;
        let site_in_range = |id: u32| (id as usize) < max_sites;

        for (word_id, word) in (0u32..).zip(&words) {
            for (&site_id, &partner) in &word.cz_pair {
                let symmetric = word.partner(partner) == Some(site_id);
                if !word.has_site(site_id)
                    || !word.has_site(partner)
                    || site_id == partner
                    || !symmetric
                {
                    return Err(ArchError::InvalidPairing {
                        word_id,
                        site_id,
                        partner,
                    });
                }
            }
        }

        for (zone_id, zone) in (0u32..).zip(&zones) {
            if let Some(&word_id) = zone.iter().find(|&&w| !word_in_range(w)) {
                return Err(ArchError::ZoneOutOfRange { zone_id, word_id });
            }
        }

        check_buses(LaneKind::Site, &site_buses, site_in_range)?;
        check_buses(LaneKind::Word, &word_buses, word_in_range)?;
        check_ids("has_site_buses", has_site_buses.iter().copied(), word_in_range)?;
        check_ids("has_word_buses", has_word_buses.iter().copied(), site_in_range)?;

        let site_bus_compatibility =
            symmetrize("site_bus_compatibility", site_bus_compatibility, word_in_range)?;
        let word_bus_compatibility =
            symmetrize("word_bus_compatibility", word_bus_compatibility, word_in_range)?;

        let max_id = [
            num_words,
            max_sites,
            site_buses.len(),
            word_buses.len(),
            zones.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(1)
        .saturating_sub(1);
        let encoding = EncodingType::infer(max_id as u64)?;

        Ok(Self {
            words,
            zones,
            has_site_buses,
            has_word_buses,
            site_buses,
            word_buses,
            site_bus_compatibility,
            word_bus_compatibility,
            encoding,
        })
    }

    /// The address encoding inferred for this architecture.
    #[inline]
    pub fn encoding(&self) -> EncodingType {
        self.encoding
    }

    /// All words.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// A single word.
    pub fn word(&self, word_id: u32) -> Option<&Word> {
        self.words.get(word_id as usize)
    }

    /// Number of words.
    #[inline]
    pub fn num_words(&self) -> usize {
        self.words.len()
    }

    /// All zones as word-id lists.
    pub fn zones(&self) -> &[Vec<u32>] {
        &self.zones
    }

    /// Iterate over all zone addresses.
    pub fn zone_addresses(&self) -> impl Iterator<Item = ZoneAddress> + '_ {
        (0u32..).zip(&self.zones).map(|(id, _)| ZoneAddress::new(id))
    }

    /// Words of a zone.
    pub fn zone_words(&self, zone: ZoneAddress) -> Option<&[u32]> {
        self.zones.get(zone.zone_id as usize).map(Vec::as_slice)
    }

    /// Intra-word buses.
    pub fn site_buses(&self) -> &[Bus] {
        &self.site_buses
    }

    /// Inter-word buses.
    pub fn word_buses(&self) -> &[Bus] {
        &self.word_buses
    }

    /// Check whether a word can run site buses.
    #[inline]
    pub fn has_site_buses(&self, word_id: u32) -> bool {
        self.has_site_buses.contains(&word_id)
    }

    /// Check whether a site can ride word buses.
    #[inline]
    pub fn has_word_buses(&self, site_id: u32) -> bool {
        self.has_word_buses.contains(&site_id)
    }

    /// Words with site buses, ascending.
    pub fn site_bus_words(&self) -> impl Iterator<Item = u32> + '_ {
        self.has_site_buses.iter().copied()
    }

    /// Sites with word buses, ascending.
    pub fn word_bus_sites(&self) -> impl Iterator<Item = u32> + '_ {
        self.has_word_buses.iter().copied()
    }

    /// Iterate over every site of every word.
    pub fn locations(&self) -> impl Iterator<Item = LocationAddress> + '_ {
        (0u32..).zip(&self.words).flat_map(|(word_id, word)| {
            (0u32..)
                .take(word.num_sites())
                .map(move |site_id| LocationAddress::new(word_id, site_id))
        })
    }

    /// Check whether two lanes may execute in the same hardware step.
    ///
    /// Both lanes must be of the same kind, travel the same direction on the
    /// same bus, start from different sites, and live in words that are
    /// equal or cross-listed in the kind's compatibility table.
    pub fn compatible_lanes(&self, first: &LaneAddress, second: &LaneAddress) -> bool {
        if first.signature() != second.signature() {
            return false;
        }
        if (first.word_id(), first.site_id()) == (second.word_id(), second.site_id()) {
            return false;
        }
        let table = match first.kind() {
            LaneKind::Site => &self.site_bus_compatibility,
            LaneKind::Word => &self.word_bus_compatibility,
        };
        first.word_id() == second.word_id()
            || table
                .get(&first.word_id())
                .is_some_and(|words| words.contains(&second.word_id()))
    }

    /// Check that a location exists.
    pub fn validate_location(&self, location: LocationAddress) -> Result<(), AddressError> {
        let word = self
            .word(location.word_id)
            .ok_or(AddressError::UnknownWord(location.word_id))?;
        if !word.has_site(location.site_id) {
            return Err(AddressError::UnknownSite {
                word_id: location.word_id,
                site_id: location.site_id,
            });
        }
        Ok(())
    }

    /// Check that a lane exists.
    pub fn validate_lane(&self, lane: &LaneAddress) -> Result<(), AddressError> {
        self.lane_endpoints(lane).map(|_| ())
    }

    /// Check that a zone exists.
    pub fn validate_zone(&self, zone: ZoneAddress) -> Result<(), AddressError> {
        if (zone.zone_id as usize) < self.zones.len() {
            Ok(())
        } else {
            Err(AddressError::UnknownZone(zone.zone_id))
        }
    }

    /// Start and end location of a lane, honouring its direction.
    pub fn lane_endpoints(
        &self,
        lane: &LaneAddress,
    ) -> Result<(LocationAddress, LocationAddress), AddressError> {
        let (src, dst) = match lane {
            LaneAddress::Site(site_lane) => {
                let bus = self
                    .site_buses
                    .get(site_lane.bus_id as usize)
                    .ok_or(AddressError::UnknownBus {
                        kind: LaneKind::Site,
                        bus_id: site_lane.bus_id,
                    })?;
                if !self.has_site_buses(site_lane.word_id) {
                    self.validate_location(LocationAddress::new(site_lane.word_id, 0))?;
                    return Err(AddressError::NoSiteBuses(site_lane.word_id));
                }
                let dst_site = bus
                    .dst_of(site_lane.site_id)
                    .ok_or(AddressError::LaneNotInBus(*lane))?;
                (
                    LocationAddress::new(site_lane.word_id, site_lane.site_id),
                    LocationAddress::new(site_lane.word_id, dst_site),
                )
            }
            LaneAddress::Word(word_lane) => {
                let bus = self
                    .word_buses
                    .get(word_lane.bus_id as usize)
                    .ok_or(AddressError::UnknownBus {
                        kind: LaneKind::Word,
                        bus_id: word_lane.bus_id,
                    })?;
                if !self.has_word_buses(word_lane.site_id) {
                    return Err(AddressError::NoWordBuses(word_lane.site_id));
                }
                let dst_word = bus
                    .dst_of(word_lane.word_id)
                    .ok_or(AddressError::LaneNotInBus(*lane))?;
                (
                    LocationAddress::new(word_lane.word_id, word_lane.site_id),
                    LocationAddress::new(dst_word, word_lane.site_id),
                )
            }
        };
        self.validate_location(src)?;
        self.validate_location(dst)?;

        match lane.direction() {
            Direction::Forward => Ok((src, dst)),
            Direction::Backward => Ok((dst, src)),
        }
    }

    /// The site lane moving an atom from `src_site` to `dst_site` in one step.
    ///
    /// Buses are searched in index order; the first match wins.
    pub fn site_lane_between(
        &self,
        word_id: u32,
        src_site: u32,
        dst_site: u32,
    ) -> Option<SiteLaneAddress> {
        if !self.has_site_buses(word_id) {
            return None;
        }
        (0u32..).zip(&self.site_buses).find_map(|(bus_id, bus)| {
            bus.pairs().find_map(|(s, d)| {
                if (s, d) == (src_site, dst_site) {
                    Some(SiteLaneAddress::new(word_id, s, bus_id, Direction::Forward))
                } else if (d, s) == (src_site, dst_site) {
                    Some(SiteLaneAddress::new(word_id, s, bus_id, Direction::Backward))
                } else {
                    None
                }
            })
        })
    }

    /// The word lane carrying `site_id` from `src_word` to `dst_word` in one step.
    pub fn word_lane_between(
        &self,
        site_id: u32,
        src_word: u32,
        dst_word: u32,
    ) -> Option<WordLaneAddress> {
        if !self.has_word_buses(site_id) {
            return None;
        }
        (0u32..).zip(&self.word_buses).find_map(|(bus_id, bus)| {
            bus.pairs().find_map(|(s, d)| {
                if (s, d) == (src_word, dst_word) {
                    Some(WordLaneAddress::new(s, site_id, bus_id, Direction::Forward))
                } else if (d, s) == (src_word, dst_word) {
                    Some(WordLaneAddress::new(s, site_id, bus_id, Direction::Backward))
                } else {
                    None
                }
            })
        })
    }

    /// The site hard-wired to interact with `location` under a CZ.
    pub fn get_blockaded_location(&self, location: LocationAddress) -> Option<LocationAddress> {
        self.word(location.word_id)?
            .partner(location.site_id)
            .map(|partner| LocationAddress::new(location.word_id, partner))
    }

    /// The first zone containing the location's word.
    pub fn zone_of(&self, location: LocationAddress) -> Option<ZoneAddress> {
        (0u32..)
            .zip(&self.zones)
            .find(|(_, words)| words.contains(&location.word_id))
            .map(|(zone_id, _)| ZoneAddress::new(zone_id))
    }

    /// All sites of a zone, word-major then site-minor.
    pub fn zone_locations(&self, zone: ZoneAddress) -> Option<Vec<LocationAddress>> {
        let words = self.zone_words(zone)?;
        Some(
            words
                .iter()
                .filter_map(|&word_id| self.word(word_id).map(|word| (word_id, word)))
                .flat_map(|(word_id, word)| {
                    (0u32..)
                        .take(word.num_sites())
                        .map(move |site_id| LocationAddress::new(word_id, site_id))
                })
                .collect(),
        )
    }

    /// Position of a location within [`zone_locations`](Self::zone_locations).
    pub fn zone_index(&self, zone: ZoneAddress, location: LocationAddress) -> Option<usize> {
        self.zone_locations(zone)?
            .iter()
            .position(|&loc| loc == location)
    }
}

impl TryFrom<ArchDescription> for ArchSpec {
    type Error = ArchError;

    fn try_from(description: ArchDescription) -> ArchResult<Self> {
        ArchSpec::new(description)
    }
}

impl From<ArchSpec> for ArchDescription {
    fn from(arch: ArchSpec) -> Self {
        Self {
            words: arch.words,
            zones: arch.zones,
            has_site_buses: arch.has_site_buses,
            has_word_buses: arch.has_word_buses,
            site_buses: arch.site_buses,
            word_buses: arch.word_buses,
            site_bus_compatibility: arch.site_bus_compatibility,
            word_bus_compatibility: arch.word_bus_compatibility,
        }
    }
}

fn check_buses(kind: LaneKind, buses: &[Bus], in_range: impl Fn(u32) -> bool) -> ArchResult<()> {
    for (bus_id, bus) in (0u32..).zip(buses) {
        if bus.src.len() != bus.dst.len() {
            return Err(ArchError::BusLengthMismatch {
                kind,
                bus_id,
                src: bus.src.len(),
                dst: bus.dst.len(),
            });
        }
        if let Some(&id) = bus.src.iter().chain(&bus.dst).find(|&&id| !in_range(id)) {
            return Err(ArchError::BusOutOfRange { kind, bus_id, id });
        }
    }
    Ok(())
}

fn check_ids(
    table: &'static str,
    mut ids: impl Iterator<Item = u32>,
    in_range: impl Fn(u32) -> bool,
) -> ArchResult<()> {
    match ids.find(|&id| !in_range(id)) {
        Some(id) => Err(ArchError::UnknownReference { table, id }),
        None => Ok(()),
    }
}

/// Make a compatibility table symmetric, so a listing on either side suffices.
fn symmetrize(
    table: &'static str,
    compatibility: BTreeMap<u32, BTreeSet<u32>>,
    in_range: impl Fn(u32) -> bool,
) -> ArchResult<BTreeMap<u32, BTreeSet<u32>>> {
    let mut result: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    for (word, others) in compatibility {
        check_ids(table, std::iter::once(word).chain(others.iter().copied()), &in_range)?;
        for other in others {
            if other == word {
                continue;
            }
            result.entry(word).or_default().insert(other);
            result.entry(other).or_default().insert(word);
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    fn logical() -> ArchSpec {
        presets::logical().unwrap()
    }

    fn site(word: u32, site: u32, bus: u32, dir: Direction) -> LaneAddress {
        SiteLaneAddress::new(word, site, bus, dir).into()
    }

    fn word(word: u32, site: u32, bus: u32, dir: Direction) -> LaneAddress {
        WordLaneAddress::new(word, site, bus, dir).into()
    }

    #[test]
    fn test_lane_endpoints_follow_direction() {
        let arch = logical();
        let lane = site(0, 1, 2, Direction::Forward);
        assert_eq!(
            arch.lane_endpoints(&lane).unwrap(),
            (LocationAddress::new(0, 1), LocationAddress::new(0, 8))
        );
        assert_eq!(
            arch.lane_endpoints(&lane.reverse()).unwrap(),
            (LocationAddress::new(0, 8), LocationAddress::new(0, 1))
        );

        let lane = word(0, 6, 0, Direction::Forward);
        assert_eq!(
            arch.lane_endpoints(&lane).unwrap(),
            (LocationAddress::new(0, 6), LocationAddress::new(1, 6))
        );
    }

    #[test]
    fn test_compatible_lanes() {
        let arch = logical();
        let a = site(0, 0, 0, Direction::Forward);
        let b = site(0, 1, 0, Direction::Forward);
        let c = site(1, 0, 0, Direction::Forward);

        assert!(arch.compatible_lanes(&a, &b));
        assert!(arch.compatible_lanes(&a, &c));
        assert!(!arch.compatible_lanes(&a, &a));
        assert!(!arch.compatible_lanes(&a, &site(0, 1, 1, Direction::Forward)));
        assert!(!arch.compatible_lanes(&a, &b.reverse()));
        assert!(!arch.compatible_lanes(&a, &word(0, 0, 0, Direction::Forward)));
    }

    #[test]
    fn test_incompatible_words_without_listing() {
        let mut description = ArchDescription::from(logical());
        description.site_bus_compatibility.clear();
        let arch = ArchSpec::new(description).unwrap();

        let a = site(0, 0, 0, Direction::Forward);
        let c = site(1, 0, 0, Direction::Forward);
        assert!(!arch.compatible_lanes(&a, &c));
    }

    #[test]
    fn test_validate_lane_errors() {
        let arch = logical();
        assert!(arch.validate_lane(&site(0, 0, 0, Direction::Forward)).is_ok());
        assert_eq!(
            arch.validate_lane(&site(0, 0, 99, Direction::Forward)),
            Err(AddressError::UnknownBus {
                kind: LaneKind::Site,
                bus_id: 99
            })
        );
        assert!(matches!(
            arch.validate_lane(&site(0, 7, 0, Direction::Forward)),
            Err(AddressError::LaneNotInBus(_))
        ));
        assert_eq!(
            arch.validate_lane(&word(0, 0, 0, Direction::Forward)),
            Err(AddressError::NoWordBuses(0))
        );
        assert_eq!(
            arch.validate_lane(&site(5, 0, 0, Direction::Forward)),
            Err(AddressError::UnknownWord(5))
        );
    }

    #[test]
    fn test_validate_location() {
        let arch = logical();
        assert!(arch.validate_location(LocationAddress::new(1, 9)).is_ok());
        assert_eq!(
            arch.validate_location(LocationAddress::new(1, 10)),
            Err(AddressError::UnknownSite {
                word_id: 1,
                site_id: 10
            })
        );
        assert_eq!(
            arch.validate_location(LocationAddress::new(2, 0)),
            Err(AddressError::UnknownWord(2))
        );
    }

    #[test]
    fn test_lane_lookup() {
        let arch = logical();
        assert_eq!(
            arch.site_lane_between(0, 0, 5),
            Some(SiteLaneAddress::new(0, 0, 0, Direction::Forward))
        );
        assert_eq!(
            arch.site_lane_between(1, 7, 0),
            Some(SiteLaneAddress::new(1, 0, 2, Direction::Backward))
        );
        assert_eq!(arch.site_lane_between(0, 0, 1), None);
        assert_eq!(
            arch.word_lane_between(5, 1, 0),
            Some(WordLaneAddress::new(0, 5, 0, Direction::Backward))
        );
        assert_eq!(arch.word_lane_between(0, 0, 1), None);
    }

    #[test]
    fn test_blockade_and_zones() {
        let arch = logical();
        let zone = ZoneAddress::new(0);
        assert_eq!(
            arch.get_blockaded_location(LocationAddress::new(1, 7)),
            Some(LocationAddress::new(1, 2))
        );
        assert_eq!(arch.zone_of(LocationAddress::new(1, 7)), Some(zone));
        assert_eq!(arch.zone_locations(zone).unwrap().len(), 20);
        assert_eq!(arch.zone_index(zone, LocationAddress::new(1, 0)), Some(10));
        assert!(arch.validate_zone(ZoneAddress::new(1)).is_err());
    }

    #[test]
    fn test_unpaired_site_is_unblockaded() {
        let mut description = ArchDescription::from(logical());
        description.words[0].cz_pair.remove(&0);
        description.words[0].cz_pair.remove(&5);
        let arch = ArchSpec::new(description).unwrap();
        assert_eq!(arch.get_blockaded_location(LocationAddress::new(0, 0)), None);
        assert_eq!(arch.get_blockaded_location(LocationAddress::new(0, 5)), None);
    }

    #[test]
    fn test_construction_errors() {
        let mut description = ArchDescription::from(logical());
        description.site_buses[0].dst.pop();
        assert!(matches!(
            ArchSpec::new(description),
            Err(ArchError::BusLengthMismatch { .. })
        ));

        let mut description = ArchDescription::from(logical());
        description.zones.push(vec![7]);
        assert!(matches!(
            ArchSpec::new(description),
            Err(ArchError::ZoneOutOfRange { zone_id: 1, word_id: 7 })
        ));

        let mut description = ArchDescription::from(logical());
        description.words[0].cz_pair.insert(0, 6);
        assert!(matches!(
            ArchSpec::new(description),
            Err(ArchError::InvalidPairing { .. })
        ));

        let mut description = ArchDescription::from(logical());
        description.has_word_buses.insert(40);
        assert!(matches!(
            ArchSpec::new(description),
            Err(ArchError::UnknownReference { .. })
        ));
    }

    #[test]
    fn test_encoding_grows_with_ids() {
        assert_eq!(logical().encoding(), EncodingType::Bit32);

        let word = Word::new((0..1100u32).map(|i| (f64::from(i), 0.0)));
        let description = ArchDescription {
            words: vec![word],
            zones: vec![vec![0]],
            has_site_buses: BTreeSet::new(),
            has_word_buses: BTreeSet::new(),
            site_buses: vec![],
            word_buses: vec![],
            site_bus_compatibility: BTreeMap::new(),
            word_bus_compatibility: BTreeMap::new(),
        };
        assert_eq!(
            ArchSpec::new(description).unwrap().encoding(),
            EncodingType::Bit64
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let arch = logical();
        let yaml = serde_yaml_ng::to_string(&arch).unwrap();
        let back: ArchSpec = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, arch);
    }
}
