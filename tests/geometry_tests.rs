use keysolve::geometry::{
    derive_key_info, key_distance, Geometry, Hand, KeyPos, COLS, FINGER_ROWS, KEY_COUNT,
    THUMB_KEYS, THUMB_ROW,
};
use proptest::prelude::*;
use rstest::rstest;
use strum::IntoEnumIterator;

const EPS: f64 = 1e-9;

fn pos(row: u8, col: u8) -> KeyPos {
    KeyPos::new(row, col)
}

#[rstest]
#[case(1, 0, Hand::Left, 0)]
#[case(1, 1, Hand::Left, 0)]
#[case(1, 2, Hand::Left, 1)]
#[case(1, 3, Hand::Left, 2)]
#[case(0, 4, Hand::Left, 3)]
#[case(2, 5, Hand::Left, 3)]
#[case(1, 6, Hand::Right, 6)]
#[case(1, 8, Hand::Right, 7)]
#[case(1, 9, Hand::Right, 8)]
#[case(0, 11, Hand::Right, 9)]
#[case(3, 0, Hand::Left, 4)]
#[case(3, 5, Hand::Right, 5)]
fn test_finger_assignment(
    #[case] row: u8,
    #[case] col: u8,
    #[case] hand: Hand,
    #[case] finger: u8,
) {
    assert_eq!(derive_key_info(row, col), (hand, finger));
}

#[rstest]
#[case(Geometry::Ortho, pos(1, 1), pos(1, 1), 0.0)]
#[case(Geometry::Ortho, pos(0, 1), pos(2, 1), 2.0)]
#[case(Geometry::Ortho, pos(0, 1), pos(1, 2), std::f64::consts::SQRT_2)]
#[case(Geometry::Ortho, pos(0, 0), pos(2, 2), 2.0 * std::f64::consts::SQRT_2)]
#[case(Geometry::Ortho, pos(0, 3), pos(0, 8), 0.0)] // different hands
#[case(Geometry::RowStag, pos(0, 1), pos(1, 1), (0.25f64 * 0.25 + 1.0).sqrt())]
#[case(Geometry::RowStag, pos(1, 2), pos(2, 2), (0.5f64 * 0.5 + 1.0).sqrt())]
#[case(Geometry::ColStag, pos(1, 2), pos(1, 3), (1.0f64 + 0.1 * 0.1).sqrt())]
#[case(Geometry::ColStag, pos(0, 3), pos(2, 3), 2.0)]
#[case(Geometry::RowStag, pos(3, 0), pos(3, 2), 2.0)] // thumbs use column difference
#[case(Geometry::ColStag, pos(3, 1), pos(1, 1), 0.0)] // thumb to finger row
fn test_key_distance(
    #[case] geometry: Geometry,
    #[case] a: KeyPos,
    #[case] b: KeyPos,
    #[case] expected: f64,
) {
    let d = key_distance(geometry, a, b);
    assert!((d - expected).abs() < EPS, "{:?} {:?}->{:?}: {} != {}", geometry, a, b, d, expected);
}

#[test]
fn test_geometry_names_parse() {
    for g in Geometry::iter() {
        let parsed: Geometry = g.to_string().to_uppercase().parse().unwrap();
        assert_eq!(parsed, g);
    }
    assert!("hexagonal".parse::<Geometry>().is_err());
}

#[test]
fn test_slot_layout_counts() {
    let thumbs = (0..KEY_COUNT)
        .filter(|&s| KeyPos::from_slot(s).row == THUMB_ROW)
        .count();
    assert_eq!(thumbs, THUMB_KEYS);
    assert_eq!(KEY_COUNT - thumbs, FINGER_ROWS * COLS);
}

fn arb_pos() -> impl Strategy<Value = KeyPos> {
    (0..KEY_COUNT).prop_map(KeyPos::from_slot)
}

fn arb_geometry() -> impl Strategy<Value = Geometry> {
    prop_oneof![
        Just(Geometry::Ortho),
        Just(Geometry::RowStag),
        Just(Geometry::ColStag)
    ]
}

proptest! {
    #[test]
    fn prop_distance_symmetric(g in arb_geometry(), a in arb_pos(), b in arb_pos()) {
        let ab = key_distance(g, a, b);
        let ba = key_distance(g, b, a);
        prop_assert!((ab - ba).abs() < EPS);
        prop_assert!(ab >= 0.0 && ab.is_finite());
    }

    #[test]
    fn prop_distance_zero_to_self(g in arb_geometry(), a in arb_pos()) {
        prop_assert_eq!(key_distance(g, a, a), 0.0);
    }

    #[test]
    fn prop_cross_hand_is_zero(g in arb_geometry(), a in arb_pos(), b in arb_pos()) {
        let (ha, _) = derive_key_info(a.row, a.col);
        let (hb, _) = derive_key_info(b.row, b.col);
        prop_assume!(ha != hb);
        prop_assert_eq!(key_distance(g, a, b), 0.0);
    }
}
