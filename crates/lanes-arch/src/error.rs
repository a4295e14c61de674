//! Error types for the architecture crate.

use thiserror::Error;

use crate::address::{LaneAddress, LaneKind};
use crate::encoding::EncodingType;

/// Errors raised while packing or unpacking integer addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodingError {
    /// A field does not fit in the bit width of the chosen encoding.
    #[error("Field '{field}' value {value} does not fit in {bits} bits")]
    FieldOverflow {
        /// Name of the offending field.
        field: &'static str,
        /// The value that was being encoded.
        value: u64,
        /// Width available for the field.
        bits: u32,
    },

    /// The address is wider than the encoding allows.
    #[error("Address {address:#x} is out of range for {encoding} encoding")]
    AddressOutOfRange {
        /// The raw address.
        address: u64,
        /// The encoding used for decoding.
        encoding: EncodingType,
    },

    /// Bits beyond the packed fields are set.
    #[error("Address {address:#x} has stray bits beyond its fields")]
    TrailingBits {
        /// The raw address.
        address: u64,
    },

    /// The lane tag does not match the requested lane kind.
    #[error("Address {address:#x} encodes a {found} lane, expected a {expected} lane")]
    LaneKindMismatch {
        /// The raw address.
        address: u64,
        /// Kind requested by the caller.
        expected: LaneKind,
        /// Kind stored in the tag bit.
        found: LaneKind,
    },

    /// An id is too large for every supported encoding.
    #[error("Id {max_id} exceeds the largest encodable id {limit}")]
    IdTooLarge {
        /// Largest id that had to be represented.
        max_id: u64,
        /// Largest id the widest encoding supports.
        limit: u64,
    },
}

/// Errors raised while building an [`ArchSpec`](crate::ArchSpec).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ArchError {
    /// The architecture has no words.
    #[error("Architecture has no words")]
    EmptyArchitecture,

    /// Encoding inference failed.
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// A bus has mismatched source/destination lists.
    #[error("{kind} bus {bus_id} has {src} sources but {dst} destinations")]
    BusLengthMismatch {
        /// Kind of the bus.
        kind: LaneKind,
        /// Index of the bus.
        bus_id: u32,
        /// Number of source entries.
        src: usize,
        /// Number of destination entries.
        dst: usize,
    },

    /// A bus references an id outside the architecture.
    #[error("{kind} bus {bus_id} references unknown id {id}")]
    BusOutOfRange {
        /// Kind of the bus.
        kind: LaneKind,
        /// Index of the bus.
        bus_id: u32,
        /// The offending site or word id.
        id: u32,
    },

    /// A zone references a word that does not exist.
    #[error("Zone {zone_id} references unknown word {word_id}")]
    ZoneOutOfRange {
        /// The zone index.
        zone_id: u32,
        /// The unknown word.
        word_id: u32,
    },

    /// A CZ pairing is out of range or not symmetric.
    #[error("Word {word_id}: invalid CZ pairing {site_id} <-> {partner}")]
    InvalidPairing {
        /// The word holding the pairing.
        word_id: u32,
        /// The site being paired.
        site_id: u32,
        /// The configured partner.
        partner: u32,
    },

    /// A bus-eligibility set or compatibility table references an unknown id.
    #[error("{table} references unknown id {id}")]
    UnknownReference {
        /// Which table holds the reference.
        table: &'static str,
        /// The offending id.
        id: u32,
    },
}

/// A structured address diagnostic.
///
/// Returned by the `validate_*` methods of [`ArchSpec`](crate::ArchSpec)
/// and collected by validation passes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AddressError {
    /// The word does not exist.
    #[error("Unknown word {0}")]
    UnknownWord(u32),

    /// The site does not exist in the word.
    #[error("Unknown site {site_id} in word {word_id}")]
    UnknownSite {
        /// The word id.
        word_id: u32,
        /// The site id.
        site_id: u32,
    },

    /// The bus does not exist.
    #[error("Unknown {kind} bus {bus_id}")]
    UnknownBus {
        /// Kind of bus.
        kind: LaneKind,
        /// Bus index.
        bus_id: u32,
    },

    /// The word cannot run site buses.
    #[error("Word {0} has no site buses")]
    NoSiteBuses(u32),

    /// The site cannot be carried by word buses.
    #[error("Site {0} has no word buses")]
    NoWordBuses(u32),

    /// The lane's source is not a source of its bus.
    #[error("Lane {0} is not part of its bus")]
    LaneNotInBus(LaneAddress),

    /// The zone does not exist.
    #[error("Unknown zone {0}")]
    UnknownZone(u32),

    /// Two lanes of one move cannot run in the same step.
    #[error("Lanes {first} and {second} cannot execute in parallel")]
    IncompatibleLanes {
        /// First lane of the pair.
        first: LaneAddress,
        /// Second lane of the pair.
        second: LaneAddress,
    },
}

/// Result type for architecture construction.
pub type ArchResult<T> = Result<T, ArchError>;
