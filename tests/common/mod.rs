//! Shared fixtures for integration tests.

#![allow(dead_code)]

use msdemux::{NanoTime, RecordTemplate, encode};

pub fn at(year: u16, day: u16, hour: u8, minute: u8, second: u8) -> NanoTime {
    NanoTime {
        year,
        day,
        hour,
        minute,
        second,
        nanosecond: 0,
    }
}

/// A 512-byte v2 record whose payload is `fill` repeated, so records are
/// distinguishable in output files.
pub fn v2_record(station: &str, network: &str, location: &str, channel: &str, start: NanoTime, fill: u8) -> Vec<u8> {
    encode(
        &RecordTemplate::new()
            .with_nslc(network, station, location, channel)
            .with_start_time(start)
            .with_payload(vec![fill; 64]),
    )
    .unwrap()
}

pub fn v3_record(station: &str, network: &str, location: &str, channel: &str, start: NanoTime, fill: u8) -> Vec<u8> {
    encode(
        &RecordTemplate::new_v3()
            .with_nslc(network, station, location, channel)
            .with_start_time(start)
            .with_payload(vec![fill; 64]),
    )
    .unwrap()
}

/// Three ANMO records at 10:30 and one at 10:31 on 2024-045.
pub fn anmo_scenario() -> Vec<Vec<u8>> {
    vec![
        v2_record("ANMO", "IU", "", "BHZ", at(2024, 45, 10, 30, 0), 1),
        v2_record("ANMO", "IU", "", "BHZ", at(2024, 45, 10, 30, 10), 2),
        v2_record("ANMO", "IU", "", "BHZ", at(2024, 45, 10, 30, 20), 3),
        v2_record("ANMO", "IU", "", "BHZ", at(2024, 45, 10, 31, 0), 4),
    ]
}

/// Sorted names of the files in `dir`.
pub fn file_names(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
