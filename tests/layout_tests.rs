use keysolve::error::KeySolveError;
use keysolve::geometry::{Geometry, KeyPos, THUMB_ROW};
use keysolve::layout::{load_layout_dir, Layout};
use keysolve::layouts::{get_all_layouts, KnownLayout};
use rstest::rstest;
use std::fs;
use strum::IntoEnumIterator;

const GRAPHITE_SPLIT: &str = "\
# graphite on a split board
~ b l d w z  ' f o u j ~
~ n r t s g  y h a e i ,
~ q x m c v  k p . - / ~
~ ~ _  ~ ~ ~
";

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let layout = Layout::parse("graphite", GRAPHITE_SPLIT, Geometry::ColStag).unwrap();
    let path = dir.path().join("graphite.kb");
    layout.save_to_file(&path).unwrap();

    let loaded = Layout::load_from_file(&path, Geometry::ColStag).unwrap();
    assert_eq!(loaded.name, "graphite");
    assert_eq!(loaded.keys(), layout.keys());
    for c in layout.chars() {
        assert_eq!(loaded.key_info(c), layout.key_info(c), "{}", c);
    }
}

#[test]
fn test_builtin_layouts_are_complete() {
    for known in KnownLayout::iter() {
        let layout = known.to_layout(Geometry::Ortho).unwrap();
        assert_eq!(layout.chars().count(), 31, "{}", known);
        assert_eq!(layout.key_info(' ').unwrap().pos, KeyPos::new(THUMB_ROW, 2));
    }
    assert_eq!(get_all_layouts(Geometry::Ortho).unwrap().len(), KnownLayout::iter().count());
}

#[test]
fn test_hash_key_in_first_column() {
    let content = "\
# comment line, not a row
# b l d w z  ' f o u j ~
~ n r t s g  y h a e i ,
~ q x m c v  k p . - / ~
~ ~ _  ~ ~ ~
";
    let layout = Layout::parse("hashed", content, Geometry::RowStag).unwrap();
    assert_eq!(layout.key_info('#').unwrap().pos, KeyPos::new(0, 0));

    let reparsed = Layout::parse("hashed", &layout.to_layout_string(), Geometry::RowStag).unwrap();
    assert_eq!(reparsed.keys(), layout.keys());
}

#[rstest]
#[case::too_few_rows("a b c d e f g h i j k l\n")]
#[case::short_row("~ a s d f g  h j k l ; ~\n~ ~\n~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~ ~ ~ ~\n")]
#[case::long_token("~ ab s d f g  h j k l ; ~\n~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~ ~ ~ ~\n")]
#[case::duplicate("~ a s d f g  h j k l ; ~\n~ a ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~ ~ ~ ~\n")]
#[case::thumb_count("~ a s d f g  h j k l ; ~\n~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~ ~\n~ ~ ~\n")]
fn test_malformed_layouts(#[case] content: &str) {
    let err = Layout::parse("bad", content, Geometry::RowStag).unwrap_err();
    assert!(matches!(err, KeySolveError::Format(_)), "{:?}", err);
}

#[test]
fn test_directory_load_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b_graphite.kb"), GRAPHITE_SPLIT).unwrap();
    KnownLayout::Dvorak
        .to_layout(Geometry::RowStag)
        .unwrap()
        .save_to_file(dir.path().join("a_dvorak.kb"))
        .unwrap();
    fs::write(dir.path().join("c_broken.kb"), "nope\n").unwrap();
    fs::write(dir.path().join("readme.md"), GRAPHITE_SPLIT).unwrap();

    let layouts = load_layout_dir(dir.path(), Geometry::RowStag).unwrap();
    let names: Vec<&str> = layouts.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["a_dvorak", "b_graphite"]);
}

#[test]
fn test_pins_and_swaps() {
    let mut layout = Layout::parse("graphite", GRAPHITE_SPLIT, Geometry::RowStag).unwrap();
    layout.pin_row(THUMB_ROW);
    layout.pin_chars("et?");
    assert_eq!(layout.pinned_count(), 6 + 2);
    assert!(layout.is_char_pinned(' '));
    assert!(layout.is_char_pinned('e'));
    assert!(!layout.is_char_pinned('a'));

    let a = layout.key_info('a').unwrap().pos;
    let b = layout.key_info('b').unwrap().pos;
    assert!(layout.swap_chars('a', 'b'));
    assert_eq!(layout.key_info('a').unwrap().pos, b);
    assert_eq!(layout.key_info('b').unwrap().pos, a);
    assert_eq!(layout.char_at(a.slot()), Some('b'));
    assert!(!layout.swap_chars('a', '?'));

    let copy = layout.clone();
    assert_eq!(copy.pinned_count(), layout.pinned_count());
}

#[test]
fn test_char_distance_uses_geometry() {
    let layout = Layout::parse("graphite", GRAPHITE_SPLIT, Geometry::Ortho).unwrap();
    // b (0,1) and n (1,1) share a column
    assert_eq!(layout.char_distance('b', 'n'), Some(1.0));
    assert_eq!(layout.char_distance('b', 'f'), Some(0.0));
    assert_eq!(layout.char_distance('b', '?'), None);
    assert!(layout.cached_distances() >= 2);
}
