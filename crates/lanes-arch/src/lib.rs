//! Lanes Architecture Model
//!
//! This crate describes a neutral-atom processor as the lanes compiler sees
//! it: a set of *words* (rows of trap sites) connected by *site buses*
//! (moves within a word) and *word buses* (moves between words).
//!
//! # Core Components
//!
//! - **Addresses**: [`LocationAddress`], [`LaneAddress`] and [`ZoneAddress`]
//!   with a bit-packed integer form through the [`Encode`] trait
//! - **Architecture**: [`ArchSpec`], validated once from an
//!   [`ArchDescription`], answering lane, blockade and zone queries
//! - **Presets**: ready-made grid architectures in [`presets`]
//! - **Path finding**: [`PathFinder`] enumerates shortest lane paths and
//!   picks one with a pluggable [`PathHeuristic`]
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeSet;
//! use std::sync::Arc;
//!
//! use lanes_arch::{LocationAddress, PathFinder, ZeroHeuristic, presets};
//!
//! let arch = Arc::new(presets::logical().unwrap());
//! let finder = PathFinder::new(arch);
//!
//! let path = finder
//!     .find_path(
//!         LocationAddress::new(0, 0),
//!         LocationAddress::new(1, 0),
//!         &BTreeSet::new(),
//!         &ZeroHeuristic,
//!     )
//!     .unwrap();
//! assert_eq!(path.len(), 3);
//! ```

pub mod address;
pub mod arch;
pub mod encoding;
pub mod error;
pub mod path;
pub mod presets;

pub use address::{
    Direction, LaneAddress, LaneKind, LocationAddress, SiteLaneAddress, WordLaneAddress,
    ZoneAddress,
};
pub use arch::{ArchDescription, ArchSpec, Bus, Word};
pub use encoding::{Encode, EncodingType};
pub use error::{AddressError, ArchError, ArchResult, EncodingError};
pub use path::{BusReuseHeuristic, Path, PathFinder, PathHeuristic, PathSegment, ZeroHeuristic};
