mod common;

use common::{center_of, cp, qwerty, LayoutBuilder};
use keyglide::consts::{
    MAX_KEY_COUNT, MAX_PROXIMITY_CHARS_SIZE, MAX_VALUE_FOR_WEIGHTING, NOT_A_CODE_POINT,
    NOT_A_COORDINATE,
};
use keyglide::layout::{KeyDef, KnownLayout, LayoutDescriptor};
use keyglide::{DecoderError, ProximityInfo};
use rstest::rstest;
use strum::IntoEnumIterator;

#[test]
fn test_wrong_table_length_is_rejected() {
    let mut layout = LayoutDescriptor::from_known(KnownLayout::Qwerty, 100, 150);
    layout.proximity_chars.pop();
    let err = ProximityInfo::new(&layout).unwrap_err();
    match err {
        DecoderError::ProximityTableSize { expected, actual } => {
            assert_eq!(expected, 32 * 16 * MAX_PROXIMITY_CHARS_SIZE);
            assert_eq!(actual, expected - 1);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_too_many_keys_is_rejected() {
    let mut layout = LayoutDescriptor::from_known(KnownLayout::Qwerty, 100, 150);
    layout.keys = (0..=MAX_KEY_COUNT as i32)
        .map(|i| KeyDef::new(0x100 + i, (i % 10) * 100, (i / 10) * 100, 100, 100))
        .collect();
    assert!(matches!(
        ProximityInfo::new(&layout),
        Err(DecoderError::TooManyKeys { count: 65, .. })
    ));
}

#[test]
fn test_oversized_grid_is_rejected() {
    let mut layout = LayoutDescriptor::from_known(KnownLayout::Qwerty, 100, 150);
    layout.grid_width = 100_000;
    layout.grid_height = 100_000;
    layout.proximity_chars.clear();
    let err = ProximityInfo::new(&layout).unwrap_err();
    assert!(matches!(err, DecoderError::Validation(_)), "{}", err);
}

#[test]
fn test_far_keys_do_not_overflow_table_computation() {
    // Squared distances between these keys exceed i32.
    let info = LayoutBuilder::new(200_000, 200_000)
        .common_key(10_000, 10_000)
        .rect('a', 0, 0, 100, 100)
        .rect('b', 199_900, 199_900, 100, 100)
        .build();
    let a = info.key_index_of(cp('a')).unwrap();
    let b = info.key_index_of(cp('b')).unwrap();
    assert_eq!(info.key_key_distance(a, b), 282_701);
    let near_a = info.proximity_list_at(10, 10).unwrap();
    assert!(near_a.contains(&cp('a')));
    assert!(!near_a.contains(&cp('b')));
}

#[test]
fn test_all_known_layouts_build() {
    for known in KnownLayout::iter() {
        let layout = LayoutDescriptor::from_known(known, 100, 150);
        let info = ProximityInfo::new(&layout).unwrap();
        // 26 letters plus space at least; no code is placed twice.
        assert!(info.key_count() >= 27, "{}", known);
        let mut codes: Vec<_> = (0..info.key_count()).map(|k| info.code_point_of(k)).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), info.key_count(), "{}", known);
        for k in 0..info.key_count() {
            let (x, _, w, _) = info.key_rect(k).unwrap();
            assert!(x >= 0 && x + w <= info.keyboard_width(), "{} key {}", known, k);
        }
    }
}

#[test]
fn test_space_proximity_follows_table() {
    let info = qwerty();
    let (sx, sy) = center_of(&info, ' ');
    assert!(info.has_space_proximity(sx, sy));
    let (qx, qy) = center_of(&info, 'q');
    assert!(!info.has_space_proximity(qx, qy));
    // Off the keyboard.
    assert!(!info.has_space_proximity(-1, 10));
    assert!(!info.has_space_proximity(10_000, 10));
}

#[test]
fn test_space_proximity_matches_cell_contents() {
    let info = qwerty();
    for gy in 0..info.grid_height() {
        for gx in 0..info.grid_width() {
            let x = gx * info.cell_width();
            let y = gy * info.cell_height();
            let Some(cell) = info.proximity_list_at(x, y) else {
                continue;
            };
            assert_eq!(info.has_space_proximity(x, y), cell.contains(&cp(' ')));
        }
    }
}

#[rstest]
#[case('a')]
#[case('q')]
#[case('m')]
fn test_key_index_is_case_insensitive(#[case] c: char) {
    let info = qwerty();
    let lower = info.key_index_of(cp(c));
    assert!(lower.is_some());
    assert_eq!(info.key_index_of(cp(c.to_ascii_uppercase())), lower);
}

#[test]
fn test_invalid_lookups_return_sentinels() {
    let info = qwerty();
    assert_eq!(info.key_index_of(cp('€')), None);
    assert_eq!(info.key_index_of(NOT_A_CODE_POINT), None);
    assert_eq!(info.code_point_of(999), NOT_A_CODE_POINT);
    assert_eq!(info.key_key_distance(0, 999), MAX_VALUE_FOR_WEIGHTING);
    assert_eq!(info.key_rect(999), None);
}

#[test]
fn test_uppercase_keys_keep_original_code() {
    let info = LayoutBuilder::new(300, 100)
        .key('A', 50, 50)
        .key('b', 150, 50)
        .build();
    let key = info.key_index_of(cp('a')).unwrap();
    assert_eq!(info.code_point_of(key), cp('a'));
    assert_eq!(info.original_code_point_of(key), cp('A'));
}

#[test]
fn test_wide_key_center_slides_toward_touch() {
    let info = qwerty();
    let space = info.key_index_of(cp(' ')).unwrap();
    // 500 wide, centered at 500: the center may slide 200 either way.
    assert_eq!(info.key_center_x(space, NOT_A_COORDINATE, true), 500);
    assert_eq!(info.key_center_x(space, 100, true), 300);
    assert_eq!(info.key_center_x(space, 450, true), 450);
    assert_eq!(info.key_center_x(space, 950, true), 700);
    let q = info.key_index_of(cp('q')).unwrap();
    assert_eq!(info.key_center_x(q, 0, true), 50);
}

#[test]
fn test_bottom_row_extends_downward() {
    let info = LayoutBuilder::new(200, 200)
        .key('a', 50, 50)
        .key('b', 50, 150)
        .build();
    let b = info.key_index_of(cp('b')).unwrap();
    assert_eq!(info.key_center_y(b, NOT_A_COORDINATE, true), 150);
    assert_eq!(info.key_center_y(b, 190, true), 190);
    assert_eq!(info.key_center_y(b, 120, true), 150);
    let a = info.key_index_of(cp('a')).unwrap();
    assert_eq!(info.key_center_y(a, 95, true), 50);
}

#[test]
fn test_key_distances_are_symmetric() {
    let info = qwerty();
    let n = info.key_count();
    for i in 0..n {
        assert_eq!(info.key_key_distance(i, i), 0);
        for j in 0..n {
            assert_eq!(info.key_key_distance(i, j), info.key_key_distance(j, i));
        }
    }
    let q = info.key_index_of(cp('q')).unwrap();
    let w = info.key_index_of(cp('w')).unwrap();
    assert_eq!(info.key_key_distance(q, w), 100);
}

#[test]
fn test_sweet_spots_move_centers() {
    let info = LayoutBuilder::new(300, 200)
        .key('a', 50, 50)
        .key('b', 150, 50)
        .sweet_spots(10.0, 20.0)
        .build();
    assert!(info.has_touch_position_correction_data());
    let a = info.key_index_of(cp('a')).unwrap();
    assert!(info.has_sweet_spot_data(a));
    assert_eq!(info.key_center_x(a, NOT_A_COORDINATE, false), 60);
    assert_eq!(info.key_center_y(a, NOT_A_COORDINATE, false), 70);
    // Gesture input only goes half way toward the calibrated center.
    assert_eq!(info.key_center_y(a, NOT_A_COORDINATE, true), 60);
}

#[test]
fn test_partial_sweet_spots_are_ignored() {
    let mut layout = LayoutBuilder::new(300, 200)
        .key('a', 50, 50)
        .key('b', 150, 50)
        .sweet_spots(10.0, 20.0)
        .descriptor();
    layout.keys[1].sweet_spot = None;
    let info = ProximityInfo::new(&layout).unwrap();
    assert!(!info.has_touch_position_correction_data());
    let a = info.key_index_of(cp('a')).unwrap();
    assert_eq!(info.key_center_x(a, NOT_A_COORDINATE, false), 50);
}

#[test]
fn test_normalized_distance_in_key_widths() {
    let info = LayoutBuilder::new(400, 100).key('a', 50, 50).build();
    let a = info.key_index_of(cp('a')).unwrap();
    assert_eq!(info.normalized_squared_distance_from_center(a, 50, 50, true), 0.0);
    let d = info.normalized_squared_distance_from_center(a, 250, 50, true);
    assert!((d - 4.0).abs() < 1e-6);
}

#[rstest]
#[case(100, 10_000)]
#[case(60_000, 3_600_000_000)]
fn test_common_key_width_square(#[case] width: i32, #[case] expected: i64) {
    let info = LayoutBuilder::new(400, 100)
        .common_key(width, 100)
        .rect('a', 0, 0, 100, 100)
        .build();
    assert_eq!(info.most_common_key_width_square(), expected);
}

#[test]
fn test_descriptor_survives_json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let layout = LayoutDescriptor::from_known(KnownLayout::Colemak, 80, 120);
    layout.save_to_file(&path).unwrap();

    let loaded = LayoutDescriptor::load_from_file(&path).unwrap();
    assert_eq!(loaded.keys, layout.keys);
    assert_eq!(loaded.proximity_chars, layout.proximity_chars);
}

#[test]
fn test_descriptor_without_table_gets_one() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.json");
    std::fs::write(
        &path,
        r#"{
            "keyboard_width": 200,
            "keyboard_height": 100,
            "most_common_key_width": 100,
            "most_common_key_height": 100,
            "keys": [
                {"code": 97, "x": 0, "y": 0, "width": 100, "height": 100},
                {"code": 98, "x": 100, "y": 0, "width": 100, "height": 100}
            ]
        }"#,
    )
    .unwrap();
    let layout = LayoutDescriptor::load_from_file(&path).unwrap();
    assert_eq!(layout.grid_width, 32);
    assert_eq!(
        layout.proximity_chars.len(),
        32 * 16 * MAX_PROXIMITY_CHARS_SIZE
    );
    let info = ProximityInfo::new(&layout).unwrap();
    assert_eq!(info.proximity_list_at(10, 10).unwrap()[0], cp('a'));
}
