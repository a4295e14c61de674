//! Property tests for address encoding.

use lanes_arch::{
    Direction, Encode, EncodingError, EncodingType, LaneAddress, LocationAddress,
    SiteLaneAddress, WordLaneAddress, ZoneAddress,
};
use proptest::prelude::*;

fn encoding() -> impl Strategy<Value = EncodingType> {
    prop_oneof![Just(EncodingType::Bit32), Just(EncodingType::Bit64)]
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Forward), Just(Direction::Backward)]
}

proptest! {
    #[test]
    fn location_round_trip(enc in encoding(), word in 0u32..1024, site in 0u32..1024) {
        let loc = LocationAddress::new(word, site);
        let address = loc.get_address(enc).unwrap();
        prop_assert_eq!(LocationAddress::decode(address, enc).unwrap(), loc);
    }

    #[test]
    fn lane_round_trip(
        enc in encoding(),
        word in 0u32..1024,
        site in 0u32..1024,
        bus in 0u32..1024,
        dir in direction(),
        is_word in any::<bool>(),
    ) {
        let lane: LaneAddress = if is_word {
            WordLaneAddress::new(word, site, bus, dir).into()
        } else {
            SiteLaneAddress::new(word, site, bus, dir).into()
        };
        let address = lane.get_address(enc).unwrap();
        prop_assert_eq!(LaneAddress::decode(address, enc).unwrap(), lane);
    }

    #[test]
    fn wide_round_trip(word in 0u32..(1 << 20), site in 0u32..(1 << 20)) {
        let loc = LocationAddress::new(word, site);
        let address = loc.get_address(EncodingType::Bit64).unwrap();
        prop_assert_eq!(LocationAddress::decode(address, EncodingType::Bit64).unwrap(), loc);
    }

    #[test]
    fn overflow_fails(enc in encoding(), extra in 0u32..1000) {
        let too_wide = u32::try_from(enc.max_id()).unwrap() + 1 + extra;
        let zone = ZoneAddress::new(too_wide);
        let is_overflow = matches!(
            zone.get_address(enc),
            Err(EncodingError::FieldOverflow { .. })
        );
        prop_assert!(is_overflow);
    }
}
