//! Site, lane and zone addresses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{BitReader, BitWriter, Encode, EncodingType};
use crate::error::EncodingError;

/// Direction of travel along a bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// From the bus source list to the destination list.
    Forward,
    /// From the bus destination list back to the source list.
    Backward,
}

impl Direction {
    /// The opposite direction.
    #[inline]
    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }

    fn bit(self) -> u64 {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }

    fn from_bit(bit: u64) -> Self {
        if bit == 0 {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "fwd"),
            Direction::Backward => write!(f, "bwd"),
        }
    }
}

/// A physical site, addressed by word and site index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationAddress {
    /// The word (row) holding the site.
    pub word_id: u32,
    /// The site index within the word.
    pub site_id: u32,
}

impl LocationAddress {
    /// Create a new location address.
    #[inline]
    pub const fn new(word_id: u32, site_id: u32) -> Self {
        Self { word_id, site_id }
    }
}

impl fmt::Display for LocationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.word_id, self.site_id)
    }
}

impl From<(u32, u32)> for LocationAddress {
    fn from((word_id, site_id): (u32, u32)) -> Self {
        Self::new(word_id, site_id)
    }
}

impl Encode for LocationAddress {
    fn get_address(&self, encoding: EncodingType) -> Result<u64, EncodingError> {
        Ok(BitWriter::new(encoding)
            .id("site_id", self.site_id)?
            .id("word_id", self.word_id)?
            .finish())
    }

    fn decode(address: u64, encoding: EncodingType) -> Result<Self, EncodingError> {
        let mut reader = BitReader::new(address, encoding)?;
        let site_id = reader.id();
        let word_id = reader.id();
        reader.finish()?;
        Ok(Self { word_id, site_id })
    }
}

/// The two families of transport primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LaneKind {
    /// Moves an atom between sites of one word.
    Site,
    /// Moves an atom between words, keeping its site index.
    Word,
}

impl LaneKind {
    fn tag(self) -> u64 {
        match self {
            LaneKind::Site => 0,
            LaneKind::Word => 1,
        }
    }

    fn from_tag(tag: u64) -> Self {
        if tag == 0 {
            LaneKind::Site
        } else {
            LaneKind::Word
        }
    }
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Site => write!(f, "site"),
            LaneKind::Word => write!(f, "word"),
        }
    }
}

/// An intra-word transport step.
///
/// `site_id` is the site on the source side of the bus; the direction
/// decides which end of the lane the atom starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteLaneAddress {
    /// Word the lane lives in.
    pub word_id: u32,
    /// Bus-source-side site.
    pub site_id: u32,
    /// Index into the architecture's site buses.
    pub bus_id: u32,
    /// Direction of travel.
    pub direction: Direction,
}

impl SiteLaneAddress {
    /// Create a new site lane address.
    pub const fn new(word_id: u32, site_id: u32, bus_id: u32, direction: Direction) -> Self {
        Self {
            word_id,
            site_id,
            bus_id,
            direction,
        }
    }

    /// The same lane travelled the other way.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            direction: self.direction.reverse(),
            ..*self
        }
    }
}

/// An inter-word transport step.
///
/// `word_id` is the word on the source side of the bus and `site_id` the
/// site index being carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WordLaneAddress {
    /// Bus-source-side word.
    pub word_id: u32,
    /// Site carried between the words.
    pub site_id: u32,
    /// Index into the architecture's word buses.
    pub bus_id: u32,
    /// Direction of travel.
    pub direction: Direction,
}

impl WordLaneAddress {
    /// Create a new word lane address.
    pub const fn new(word_id: u32, site_id: u32, bus_id: u32, direction: Direction) -> Self {
        Self {
            word_id,
            site_id,
            bus_id,
            direction,
        }
    }

    /// The same lane travelled the other way.
    #[must_use]
    pub fn reverse(&self) -> Self {
        Self {
            direction: self.direction.reverse(),
            ..*self
        }
    }
}

/// Any transport step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaneAddress {
    /// An intra-word lane.
    Site(SiteLaneAddress),
    /// An inter-word lane.
    Word(WordLaneAddress),
}

impl LaneAddress {
    /// The same lane travelled the other way.
    #[must_use]
    pub fn reverse(&self) -> Self {
        match self {
            LaneAddress::Site(lane) => LaneAddress::Site(lane.reverse()),
            LaneAddress::Word(lane) => LaneAddress::Word(lane.reverse()),
        }
    }

    /// Which family this lane belongs to.
    #[inline]
    pub fn kind(&self) -> LaneKind {
        match self {
            LaneAddress::Site(_) => LaneKind::Site,
            LaneAddress::Word(_) => LaneKind::Word,
        }
    }

    /// Word of a site lane, or the bus-source-side word of a word lane.
    #[inline]
    pub fn word_id(&self) -> u32 {
        match self {
            LaneAddress::Site(lane) => lane.word_id,
            LaneAddress::Word(lane) => lane.word_id,
        }
    }

    /// Bus-source-side site of a site lane, or the carried site of a word lane.
    #[inline]
    pub fn site_id(&self) -> u32 {
        match self {
            LaneAddress::Site(lane) => lane.site_id,
            LaneAddress::Word(lane) => lane.site_id,
        }
    }

    /// Bus carrying the lane.
    #[inline]
    pub fn bus_id(&self) -> u32 {
        match self {
            LaneAddress::Site(lane) => lane.bus_id,
            LaneAddress::Word(lane) => lane.bus_id,
        }
    }

    /// Direction of travel along the bus.
    #[inline]
    pub fn direction(&self) -> Direction {
        match self {
            LaneAddress::Site(lane) => lane.direction,
            LaneAddress::Word(lane) => lane.direction,
        }
    }

    /// Key shared by lanes that could run in the same step.
    #[inline]
    pub fn signature(&self) -> (LaneKind, u32, Direction) {
        (self.kind(), self.bus_id(), self.direction())
    }
}

impl From<SiteLaneAddress> for LaneAddress {
    fn from(lane: SiteLaneAddress) -> Self {
        LaneAddress::Site(lane)
    }
}

impl From<WordLaneAddress> for LaneAddress {
    fn from(lane: WordLaneAddress) -> Self {
        LaneAddress::Word(lane)
    }
}

impl fmt::Display for LaneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[w{} s{} bus{} {}]",
            self.kind(),
            self.word_id(),
            self.site_id(),
            self.bus_id(),
            self.direction()
        )
    }
}

fn encode_lane(
    kind: LaneKind,
    word_id: u32,
    site_id: u32,
    bus_id: u32,
    direction: Direction,
    encoding: EncodingType,
) -> Result<u64, EncodingError> {
    Ok(BitWriter::new(encoding)
        .bits("direction", direction.bit(), 1)?
        .bits("tag", kind.tag(), 1)?
        .id("bus_id", bus_id)?
        .id("site_id", site_id)?
        .id("word_id", word_id)?
        .finish())
}

fn decode_lane(address: u64, encoding: EncodingType) -> Result<LaneAddress, EncodingError> {
    let mut reader = BitReader::new(address, encoding)?;
    let direction = Direction::from_bit(reader.bits(1));
    let kind = LaneKind::from_tag(reader.bits(1));
    let bus_id = reader.id();
    let site_id = reader.id();
    let word_id = reader.id();
    reader.finish()?;
    Ok(match kind {
        LaneKind::Site => SiteLaneAddress::new(word_id, site_id, bus_id, direction).into(),
        LaneKind::Word => WordLaneAddress::new(word_id, site_id, bus_id, direction).into(),
    })
}

impl Encode for LaneAddress {
    fn get_address(&self, encoding: EncodingType) -> Result<u64, EncodingError> {
        encode_lane(
            self.kind(),
            self.word_id(),
            self.site_id(),
            self.bus_id(),
            self.direction(),
            encoding,
        )
    }

    fn decode(address: u64, encoding: EncodingType) -> Result<Self, EncodingError> {
        decode_lane(address, encoding)
    }
}

impl Encode for SiteLaneAddress {
    fn get_address(&self, encoding: EncodingType) -> Result<u64, EncodingError> {
        LaneAddress::Site(*self).get_address(encoding)
    }

    fn decode(address: u64, encoding: EncodingType) -> Result<Self, EncodingError> {
        match decode_lane(address, encoding)? {
            LaneAddress::Site(lane) => Ok(lane),
            LaneAddress::Word(_) => Err(EncodingError::LaneKindMismatch {
                address,
                expected: LaneKind::Site,
                found: LaneKind::Word,
            }),
        }
    }
}

impl Encode for WordLaneAddress {
    fn get_address(&self, encoding: EncodingType) -> Result<u64, EncodingError> {
        LaneAddress::Word(*self).get_address(encoding)
    }

    fn decode(address: u64, encoding: EncodingType) -> Result<Self, EncodingError> {
        match decode_lane(address, encoding)? {
            LaneAddress::Word(lane) => Ok(lane),
            LaneAddress::Site(_) => Err(EncodingError::LaneKindMismatch {
                address,
                expected: LaneKind::Word,
                found: LaneKind::Site,
            }),
        }
    }
}

/// A group of words sharing a fixed CZ pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneAddress {
    /// Index into the architecture's zones.
    pub zone_id: u32,
}

impl ZoneAddress {
    /// Create a new zone address.
    #[inline]
    pub const fn new(zone_id: u32) -> Self {
        Self { zone_id }
    }
}

impl fmt::Display for ZoneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zone{}", self.zone_id)
    }
}

impl Encode for ZoneAddress {
    fn get_address(&self, encoding: EncodingType) -> Result<u64, EncodingError> {
        Ok(BitWriter::new(encoding).id("zone_id", self.zone_id)?.finish())
    }

    fn decode(address: u64, encoding: EncodingType) -> Result<Self, EncodingError> {
        let mut reader = BitReader::new(address, encoding)?;
        let zone_id = reader.id();
        reader.finish()?;
        Ok(Self { zone_id })
    }
}
