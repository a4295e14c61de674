//! Bit-packed integer encoding for addresses.
//!
//! Every addressable value can be packed into an integer whose layout is
//! fixed by an [`EncodingType`]. Fields are packed from the least
//! significant bit upwards; each id field has the same width, which is
//! 10 bits for [`EncodingType::Bit32`] and 20 bits for
//! [`EncodingType::Bit64`].
//!
//! ```text
//! location: | word | site |
//! lane:     | word | site | bus | tag | dir |
//! zone:     | zone |
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EncodingError;

/// Width of the integer an architecture's addresses are packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EncodingType {
    /// Addresses fit in 32 bits (ids below 1024).
    Bit32,
    /// Addresses fit in 64 bits (ids below 2^20).
    Bit64,
}

impl EncodingType {
    /// Width of a single id field.
    #[inline]
    pub const fn field_bits(self) -> u32 {
        match self {
            EncodingType::Bit32 => 10,
            EncodingType::Bit64 => 20,
        }
    }

    /// Total width of the packed integer.
    #[inline]
    pub const fn total_bits(self) -> u32 {
        match self {
            EncodingType::Bit32 => 32,
            EncodingType::Bit64 => 64,
        }
    }

    /// Largest id a field can hold.
    #[inline]
    pub const fn max_id(self) -> u64 {
        (1 << self.field_bits()) - 1
    }

    /// Largest raw address of this encoding.
    #[inline]
    pub const fn max_address(self) -> u64 {
        match self {
            EncodingType::Bit32 => u32::MAX as u64,
            EncodingType::Bit64 => u64::MAX,
        }
    }

    /// Pick the smallest encoding able to represent `max_id`.
    pub fn infer(max_id: u64) -> Result<Self, EncodingError> {
        if max_id <= EncodingType::Bit32.max_id() {
            Ok(EncodingType::Bit32)
        } else if max_id <= EncodingType::Bit64.max_id() {
            Ok(EncodingType::Bit64)
        } else {
            Err(EncodingError::IdTooLarge {
                max_id,
                limit: EncodingType::Bit64.max_id(),
            })
        }
    }
}

impl fmt::Display for EncodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingType::Bit32 => write!(f, "32-bit"),
            EncodingType::Bit64 => write!(f, "64-bit"),
        }
    }
}

/// Values that map bijectively to an integer address.
pub trait Encode: Sized {
    /// Pack this value with the given encoding.
    ///
    /// Fails if any field is wider than the encoding allows.
    fn get_address(&self, encoding: EncodingType) -> Result<u64, EncodingError>;

    /// Unpack a value previously produced by [`get_address`](Self::get_address).
    fn decode(address: u64, encoding: EncodingType) -> Result<Self, EncodingError>;
}

/// Packs fields from the least significant bit upwards.
pub(crate) struct BitWriter {
    value: u64,
    offset: u32,
    encoding: EncodingType,
}

impl BitWriter {
    pub(crate) fn new(encoding: EncodingType) -> Self {
        Self {
            value: 0,
            offset: 0,
            encoding,
        }
    }

    /// Append an id field of the encoding's field width.
    pub(crate) fn id(self, field: &'static str, value: u32) -> Result<Self, EncodingError> {
        let bits = self.encoding.field_bits();
        self.bits(field, u64::from(value), bits)
    }

    /// Append a field of an explicit width.
    pub(crate) fn bits(
        mut self,
        field: &'static str,
        value: u64,
        bits: u32,
    ) -> Result<Self, EncodingError> {
        if value >> bits != 0 {
            return Err(EncodingError::FieldOverflow { field, value, bits });
        }
        self.value |= value << self.offset;
        self.offset += bits;
        Ok(self)
    }

    pub(crate) fn finish(self) -> u64 {
        debug_assert!(self.offset <= self.encoding.total_bits());
        self.value
    }
}

/// Unpacks fields written by [`BitWriter`] in the same order.
pub(crate) struct BitReader {
    address: u64,
    rest: u64,
    encoding: EncodingType,
}

impl BitReader {
    pub(crate) fn new(address: u64, encoding: EncodingType) -> Result<Self, EncodingError> {
        if address > encoding.max_address() {
            return Err(EncodingError::AddressOutOfRange { address, encoding });
        }
        Ok(Self {
            address,
            rest: address,
            encoding,
        })
    }

    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn id(&mut self) -> u32 {
        // Field width is at most 20 bits, so the value always fits in u32.
        self.bits(self.encoding.field_bits()) as u32
    }

    pub(crate) fn bits(&mut self, bits: u32) -> u64 {
        let value = self.rest & ((1 << bits) - 1);
        self.rest >>= bits;
        value
    }

    pub(crate) fn finish(self) -> Result<(), EncodingError> {
        if self.rest != 0 {
            return Err(EncodingError::TrailingBits {
                address: self.address,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_smallest_encoding() {
        assert_eq!(EncodingType::infer(0).unwrap(), EncodingType::Bit32);
        assert_eq!(EncodingType::infer(1023).unwrap(), EncodingType::Bit32);
        assert_eq!(EncodingType::infer(1024).unwrap(), EncodingType::Bit64);
        assert_eq!(
            EncodingType::infer((1 << 20) - 1).unwrap(),
            EncodingType::Bit64
        );
        assert!(matches!(
            EncodingType::infer(1 << 20),
            Err(EncodingError::IdTooLarge { .. })
        ));
    }

    #[test]
    fn test_writer_rejects_wide_fields() {
        let result = BitWriter::new(EncodingType::Bit32).id("word_id", 1024);
        assert!(matches!(
            result,
            Err(EncodingError::FieldOverflow {
                field: "word_id",
                bits: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_reader_round_trip() {
        let value = BitWriter::new(EncodingType::Bit64)
            .bits("flag", 1, 1)
            .unwrap()
            .id("a", 77)
            .unwrap()
            .id("b", 5000)
            .unwrap()
            .finish();

        let mut reader = BitReader::new(value, EncodingType::Bit64).unwrap();
        assert_eq!(reader.bits(1), 1);
        assert_eq!(reader.id(), 77);
        assert_eq!(reader.id(), 5000);
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn test_reader_rejects_out_of_range() {
        assert!(matches!(
            BitReader::new(u64::from(u32::MAX) + 1, EncodingType::Bit32),
            Err(EncodingError::AddressOutOfRange { .. })
        ));
    }
}
