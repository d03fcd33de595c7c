//! Tests for UGC zone block parsing

use crate::app::services::awips_parser::ugc::parse_ugc;
use crate::Error;

#[test]
fn test_parse_county_list() {
    let ugc = parse_ugc("GAC121-135-287-011645-\nrest of segment")
        .unwrap()
        .unwrap();

    assert_eq!(ugc.zones.len(), 3);
    assert!(ugc.zones.contains("GAC121"));
    assert!(ugc.zones.contains("GAC135"));
    assert!(ugc.zones.contains("GAC287"));
    assert_eq!(ugc.day, 1);
    assert_eq!(ugc.hour, 16);
    assert_eq!(ugc.minute, 45);
}

#[test]
fn test_parse_zone_ranges() {
    let ugc = parse_ugc("ILZ027>031-037-151200-\n").unwrap().unwrap();

    assert_eq!(ugc.zones.len(), 6);
    for zone in ["ILZ027", "ILZ028", "ILZ029", "ILZ030", "ILZ031", "ILZ037"] {
        assert!(ugc.zones.contains(zone), "missing {zone}");
    }
    assert_eq!(ugc.day, 15);
}

#[test]
fn test_parse_multiple_prefixes() {
    let ugc = parse_ugc("PAC001-003-NJC005-011200-\n").unwrap().unwrap();

    assert!(ugc.zones.contains("PAC001"));
    assert!(ugc.zones.contains("PAC003"));
    assert!(ugc.zones.contains("NJC005"));
}

#[test]
fn test_block_wraps_onto_continuation_lines() {
    let ugc = parse_ugc("GAC121-135-287-293-\n121-227-011645-\nnarrative text")
        .unwrap()
        .unwrap();

    // 121 repeats across lines and collapses
    assert_eq!(ugc.zones.len(), 5);
    assert!(ugc.zones.contains("GAC227"));
}

#[test]
fn test_absent_block_is_not_an_error() {
    assert!(parse_ugc("narrative text with no zone block").unwrap().is_none());
}

#[test]
fn test_malformed_expiry_rejected() {
    // Day 40 does not exist
    let result = parse_ugc("GAC121-401200-\n");
    assert!(matches!(result, Err(Error::UgcMalformed { .. })));
}

#[test]
fn test_backwards_range_rejected() {
    let result = parse_ugc("ILZ031>027-151200-\n");
    assert!(matches!(result, Err(Error::UgcMalformed { .. })));
}
