//! Property tests for routing arbitrary interleavings of records.

mod common;

use std::collections::{BTreeMap, BTreeSet};

use msdemux::{MemoryOpener, RecordReader, Router, RunOutcome};
use proptest::prelude::*;

use common::{at, v2_record, v3_record};

#[derive(Debug, Clone)]
struct Shape {
    station: &'static str,
    location: &'static str,
    minute: u8,
    second: u8,
    v3: bool,
}

fn shape() -> impl Strategy<Value = Shape> {
    (
        prop::sample::select(vec!["ANMO", "DAV", "anmo"]),
        prop::sample::select(vec!["", "00"]),
        0u8..3,
        0u8..60,
        any::<bool>(),
    )
        .prop_map(|(station, location, minute, second, v3)| Shape {
            station,
            location,
            minute,
            second,
            v3,
        })
}

fn build(shape: &Shape, fill: u8) -> Vec<u8> {
    let start = at(2024, 45, 10, shape.minute, shape.second);
    if shape.v3 {
        v3_record(shape.station, "IU", shape.location, "BHZ", start, fill)
    } else {
        v2_record(shape.station, "IU", shape.location, "BHZ", start, fill)
    }
}

fn expected_name(shape: &Shape) -> String {
    format!(
        "{}.IU.{}.BHZ.D.2024.045.10{:02}",
        shape.station, shape.location, shape.minute
    )
}

proptest! {
    #[test]
    fn outputs_match_distinct_stream_minutes(shapes in prop::collection::vec(shape(), 0..40)) {
        let records: Vec<Vec<u8>> = shapes
            .iter()
            .enumerate()
            .map(|(i, s)| build(s, i as u8))
            .collect();

        let opener = MemoryOpener::new();
        let input = records.concat();
        let summary = Router::new(opener.clone())
            .process(RecordReader::new(&input[..]), &mut std::io::sink())
            .unwrap();

        prop_assert_eq!(summary.outcome, RunOutcome::Completed);
        prop_assert_eq!(summary.records as usize, shapes.len());

        // One output per distinct (stream, minute)
        let expected: BTreeSet<String> = shapes.iter().map(expected_name).collect();
        let produced: BTreeSet<String> = opener.names().into_iter().collect();
        prop_assert_eq!(&produced, &expected);
        prop_assert_eq!(summary.outputs.len(), expected.len());

        // Each output holds its records in arrival order
        let mut contents: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        for (s, bytes) in shapes.iter().zip(&records) {
            contents.entry(expected_name(s)).or_default().extend_from_slice(bytes);
        }
        for (name, bytes) in contents {
            prop_assert_eq!(opener.contents(&name).unwrap(), bytes);
        }
    }

    #[test]
    fn truncation_keeps_complete_prefix(
        shapes in prop::collection::vec(shape(), 1..10),
        cut in 1usize..500,
    ) {
        let records: Vec<Vec<u8>> = shapes
            .iter()
            .enumerate()
            .map(|(i, s)| build(s, i as u8))
            .collect();

        let mut input = records.concat();
        let last_len = records.last().unwrap().len();
        input.truncate(input.len() - last_len + cut.min(last_len - 1));

        let opener = MemoryOpener::new();
        let summary = Router::new(opener.clone())
            .process(RecordReader::new(&input[..]), &mut std::io::sink())
            .unwrap();

        prop_assert_eq!(summary.outcome, RunOutcome::Truncated);
        prop_assert_eq!(summary.records as usize, shapes.len() - 1);

        let expected: BTreeSet<String> =
            shapes[..shapes.len() - 1].iter().map(expected_name).collect();
        let produced: BTreeSet<String> = opener.names().into_iter().collect();
        prop_assert_eq!(produced, expected);
    }
}
