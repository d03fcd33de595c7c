//! Tests for LAT...LON polygon parsing

use crate::app::services::awips_parser::latlon::parse_latlon;
use crate::Error;

#[test]
fn test_coordinate_decoding() {
    // "4812"/"9345" decodes to lat 48.12, lon -93.45
    let polygon = parse_latlon("LAT...LON 4812 9345 4810 9340")
        .unwrap()
        .unwrap();

    assert_eq!(polygon.len(), 2);
    assert_eq!(polygon.points[0], (-93.45, 48.12));
    assert_eq!(polygon.points[1], (-93.40, 48.10));
}

#[test]
fn test_block_wraps_onto_continuation_lines() {
    let text = "\
LAT...LON 3378 8445 3390 8430
      3381 8410 3370 8428

$$";
    let polygon = parse_latlon(text).unwrap().unwrap();
    assert_eq!(polygon.len(), 4);
    assert_eq!(polygon.points[2], (-84.10, 33.81));
}

#[test]
fn test_antimeridian_normalization() {
    // Longitudes at or below -180 wrap by adding 360
    let polygon = parse_latlon("LAT...LON 5230 18000 5230 18250")
        .unwrap()
        .unwrap();

    assert_eq!(polygon.points[0].0, 180.0);
    assert_eq!(polygon.points[1].0, 177.5);
}

#[test]
fn test_ring_closure_not_enforced() {
    let polygon = parse_latlon("LAT...LON 3378 8445 3390 8430 3381 8410")
        .unwrap()
        .unwrap();
    assert_ne!(polygon.points.first(), polygon.points.last());
}

#[test]
fn test_odd_coordinate_count_rejected() {
    let result = parse_latlon("LAT...LON 3378 8445 3390");
    assert!(matches!(result, Err(Error::PolygonMalformed { .. })));
}

#[test]
fn test_label_without_coordinates_rejected() {
    let result = parse_latlon("LAT...LON\nno numbers follow");
    assert!(matches!(result, Err(Error::PolygonMalformed { .. })));
}

#[test]
fn test_absent_block_is_not_an_error() {
    assert!(parse_latlon("no polygon here").unwrap().is_none());
}
