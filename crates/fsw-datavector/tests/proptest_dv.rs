use fsw_datavector::{DataVector, DvConfig, ElementConfig, ElementId, RegionConfig, RegionId, TypedValue};
use proptest::prelude::*;

fn single_u32_config(initial: u32) -> DvConfig {
    DvConfig::new(vec![RegionConfig::new(
        RegionId(0),
        vec![ElementConfig::new(ElementId(0), TypedValue::U32(initial))],
    )])
}

proptest! {
    /// P1: total buffer size equals the sum of region sizes, and every
    /// element's offset + width stays within the buffer.
    #[test]
    fn p1_offsets_within_buffer(a in any::<u8>(), b in any::<u16>(), c in any::<u32>()) {
        let cfg = DvConfig::new(vec![RegionConfig::new(
            RegionId(0),
            vec![
                ElementConfig::new(ElementId(0), TypedValue::U8(a)),
                ElementConfig::new(ElementId(1), TypedValue::U16(b)),
                ElementConfig::new(ElementId(2), TypedValue::U32(c)),
            ],
        )]);
        let dv = DataVector::create(cfg).unwrap();
        prop_assert_eq!(dv.size_bytes(), 1 + 2 + 4);
        prop_assert_eq!(dv.region_size_bytes(RegionId(0)).unwrap(), dv.size_bytes());
    }

    /// P2: write-then-read round-trips for any value of the element's type.
    #[test]
    fn p2_write_read_round_trip(initial in any::<u32>(), next in any::<u32>()) {
        let dv = DataVector::create(single_u32_config(initial)).unwrap();
        dv.write::<u32>(ElementId(0), next).unwrap();
        prop_assert_eq!(dv.read::<u32>(ElementId(0)).unwrap(), next);
    }

    /// P3: a type-mismatched read/write is refused and leaves the buffer
    /// unchanged.
    #[test]
    fn p3_type_mismatch_refused(initial in any::<u32>(), bogus in any::<u8>()) {
        let dv = DataVector::create(single_u32_config(initial)).unwrap();
        prop_assert!(dv.write::<u8>(ElementId(0), bogus).is_err());
        prop_assert!(dv.read::<u8>(ElementId(0)).is_err());
        prop_assert_eq!(dv.read::<u32>(ElementId(0)).unwrap(), initial);
    }

    /// P4: region round-trip is idempotent.
    #[test]
    fn p4_region_round_trip(initial in any::<u32>()) {
        let dv = DataVector::create(single_u32_config(initial)).unwrap();
        let mut a = vec![0u8; 4];
        dv.read_region(RegionId(0), &mut a).unwrap();
        dv.write_region(RegionId(0), &a).unwrap();
        let mut b = vec![0u8; 4];
        dv.read_region(RegionId(0), &mut b).unwrap();
        prop_assert_eq!(a, b);
    }

    /// P10: incrementing an element already at its type's maximum leaves it
    /// unchanged and returns `AlreadyMax`.
    #[test]
    fn p10_increment_at_max_is_noop(_unused in any::<u8>()) {
        let dv = DataVector::create(single_u32_config(u32::MAX)).unwrap();
        let err = dv.increment(ElementId(0)).unwrap_err();
        prop_assert_eq!(err, fsw_errors::Error::AlreadyMax);
        prop_assert_eq!(dv.read::<u32>(ElementId(0)).unwrap(), u32::MAX);
    }
}
