//! Integration tests for osmnodes
//!
//! These tests drive the full pipeline from an entity source to a node table
//! on disk and read the table back.

use osmnodes::model::{AcceptedNode, EntityRecord};
use osmnodes::pipeline::{ExtractionMode, NodeExtractor, PipelineConfig};
use osmnodes::progress::Phase;
use osmnodes::reader::{load_sorted_keys, KeyColumn, NodeCsvReader, NodeSummary};
use osmnodes::source::{from_entities, IterEntitySource, SourceError};
use std::fs;
use std::num::NonZeroU64;
use tempfile::tempdir;

/// Entities resembling a regional extract: ascending ids, some unlocated
fn florida_like(n: i64) -> Vec<EntityRecord> {
    (0..n)
        .map(|i| {
            let id = 1_000_000 + i * 3;
            if i % 10 == 9 {
                EntityRecord::unlocated(id)
            } else {
                let lon = -87.6 + (i as f64) * 0.000_123_456_789;
                let lat = 24.5 + (i as f64) * 0.000_098_765_432_1;
                EntityRecord::located(id, lon, lat)
            }
        })
        .collect()
}

/// Test the complete extract-read cycle
#[test]
fn test_extract_read_cycle() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("florida_nodes.csv");
    let entities = florida_like(1_000);

    let stats = NodeExtractor::new()
        .extract(from_entities(entities.clone()), &path)
        .unwrap();
    assert_eq!(stats.nodes_accepted, 900);
    assert_eq!(stats.rows_written, 900);

    let mut reader = NodeCsvReader::open(&path).unwrap();
    let nodes = reader.read_nodes(None).unwrap();
    assert_eq!(reader.skipped_rows(), 0);

    let expected: Vec<AcceptedNode> = entities
        .iter()
        .filter(|e| e.coordinate_valid)
        .map(|e| AcceptedNode::new(e.id, e.lon.unwrap(), e.lat.unwrap()))
        .collect();
    assert_eq!(nodes.len(), expected.len());
    for (read, original) in nodes.iter().zip(expected.iter()) {
        assert_eq!(read.id, original.id);
        assert_eq!(read.lon.to_bits(), original.lon.to_bits());
        assert_eq!(read.lat.to_bits(), original.lat.to_bits());
    }
}

#[test]
fn test_scenario_file_contents() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nodes.csv");
    let entities = vec![
        EntityRecord::located(1, 10.0, 20.0),
        EntityRecord::unlocated(2),
        EntityRecord::located(3, -5.5, 40.2),
    ];

    let stats = NodeExtractor::new()
        .extract(from_entities(entities), &path)
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "id,lon,lat\n1,10.0,20.0\n3,-5.5,40.2\n"
    );
    assert_eq!(stats.accumulate_checkpoints, 0);
    assert_eq!(stats.write_checkpoints, 0);
}

#[test]
fn test_header_only_outputs() {
    let dir = tempdir().unwrap();

    let empty = dir.path().join("empty.csv");
    NodeExtractor::new().extract(from_entities(Vec::new()), &empty).unwrap();
    assert_eq!(fs::read_to_string(&empty).unwrap(), "id,lon,lat\n");

    let unlocated = dir.path().join("unlocated.csv");
    let entities = (0..100).map(EntityRecord::unlocated).collect();
    NodeExtractor::new().extract(from_entities(entities), &unlocated).unwrap();
    assert_eq!(fs::read_to_string(&unlocated).unwrap(), "id,lon,lat\n");
}

#[test]
fn test_streaming_and_buffered_files_identical() {
    let dir = tempdir().unwrap();
    let streaming = dir.path().join("streaming.csv");
    let buffered = dir.path().join("buffered.csv");

    NodeExtractor::with_config(PipelineConfig::low_memory())
        .with_batch_size(3)
        .extract(from_entities(florida_like(2_000)), &streaming)
        .unwrap();
    NodeExtractor::with_config(PipelineConfig::buffered())
        .extract(from_entities(florida_like(2_000)), &buffered)
        .unwrap();

    assert_eq!(fs::read(&streaming).unwrap(), fs::read(&buffered).unwrap());
}

#[test]
fn test_failed_run_does_not_clobber_previous_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nodes.csv");

    NodeExtractor::new()
        .extract(from_entities(florida_like(50)), &path)
        .unwrap();
    let good = fs::read(&path).unwrap();

    let mut items: Vec<Result<EntityRecord, SourceError>> =
        florida_like(50).into_iter().map(Ok).collect();
    items.push(Err(SourceError::Corrupt("unexpected end of blob".to_string())));

    let err = NodeExtractor::new()
        .with_batch_size(1)
        .extract(IterEntitySource::new(items.into_iter()), &path)
        .unwrap_err();

    assert_eq!(err.phase(), Some(Phase::Decode));
    assert_eq!(fs::read(&path).unwrap(), good);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_checkpoints_at_small_interval() {
    let config = PipelineConfig {
        progress_interval: NonZeroU64::new(100).unwrap(),
        ..PipelineConfig::default()
    };
    for mode in [ExtractionMode::Streaming, ExtractionMode::Buffered] {
        let (_, stats) = NodeExtractor::with_config(config.clone())
            .with_mode(mode)
            .extract_to_writer(from_entities(florida_like(1_234)), Vec::new())
            .unwrap();
        // 1,234 entities, every 10th unlocated -> 1,111 accepted
        assert_eq!(stats.nodes_accepted, 1_111);
        assert_eq!(stats.accumulate_checkpoints, 11);
        assert_eq!(stats.write_checkpoints, 11);
    }
}

#[test]
fn test_sorted_keys_and_summary_from_extracted_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nodes.csv");
    NodeExtractor::new()
        .extract(from_entities(florida_like(300)), &path)
        .unwrap();

    let keys = load_sorted_keys(&path, KeyColumn::Lat, Some(100)).unwrap();
    assert_eq!(keys.len(), 100);
    assert!(keys.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(keys.iter().enumerate().all(|(i, (_, pos))| *pos == i));

    let mut reader = NodeCsvReader::open(&path).unwrap();
    let summary = NodeSummary::from_reader(&mut reader, None).unwrap();
    assert_eq!(summary.rows, 270);
    assert!(summary.ids_ascending);
    assert_eq!(summary.duplicate_ids, 0);
    assert_eq!(summary.min_id, Some(1_000_000));
    let bounds = summary.bounds.unwrap();
    assert_eq!(bounds.min_lon, -87.6);
    assert_eq!(bounds.min_lat, 24.5);
}

/// Extract a small PBF extract holding plain nodes, dense nodes and a way
#[cfg(feature = "pbf")]
#[test]
fn test_extract_pbf_fixture() {
    let input = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/nodes.osm.pbf");
    let dir = tempdir().unwrap();
    let path = dir.path().join("nodes.csv");

    let stats = NodeExtractor::new().extract_file(input, &path).unwrap();
    assert_eq!(stats.entities_seen, 6);
    assert_eq!(stats.nodes_accepted, 4);
    assert_eq!(stats.entities_rejected, 2);

    let mut reader = NodeCsvReader::open(&path).unwrap();
    let ids: Vec<i64> = reader.read_nodes(None).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 3, 10, 11]);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn entity_strategy() -> impl Strategy<Value = EntityRecord> {
        (
            any::<i64>(),
            any::<bool>(),
            -180.0f64..=180.0,
            -90.0f64..=90.0,
        )
            .prop_map(|(id, valid, lon, lat)| {
                if valid {
                    EntityRecord::located(id, lon, lat)
                } else {
                    EntityRecord::unlocated(id)
                }
            })
    }

    proptest! {
        /// Accepted rows are exactly the located entities, in input order,
        /// with coordinates that parse back bit-for-bit
        #[test]
        fn test_output_is_located_subsequence(
            entities in prop::collection::vec(entity_strategy(), 0..200),
            batch_size in 1usize..50,
        ) {
            let (bytes, stats) = NodeExtractor::new()
                .with_batch_size(batch_size)
                .extract_to_writer(from_entities(entities.clone()), Vec::new())
                .unwrap();

            let expected: Vec<AcceptedNode> = entities
                .iter()
                .filter(|e| e.coordinate_valid)
                .map(|e| AcceptedNode::new(e.id, e.lon.unwrap(), e.lat.unwrap()))
                .collect();
            prop_assert_eq!(stats.nodes_accepted, expected.len() as u64);

            let mut reader = NodeCsvReader::from_reader(std::io::Cursor::new(bytes)).unwrap();
            let nodes = reader.read_nodes(None).unwrap();
            prop_assert_eq!(nodes.len(), expected.len());
            for (read, original) in nodes.iter().zip(expected.iter()) {
                prop_assert_eq!(read.id, original.id);
                prop_assert_eq!(read.lon.to_bits(), original.lon.to_bits());
                prop_assert_eq!(read.lat.to_bits(), original.lat.to_bits());
            }
        }

        /// Checkpoints per phase equal floor(accepted / interval)
        #[test]
        fn test_checkpoint_count(
            valid_flags in prop::collection::vec(any::<bool>(), 0..300),
            interval in 1u64..40,
        ) {
            let entities: Vec<EntityRecord> = valid_flags
                .iter()
                .enumerate()
                .map(|(i, &valid)| {
                    if valid {
                        EntityRecord::located(i as i64, 0.5, 0.25)
                    } else {
                        EntityRecord::unlocated(i as i64)
                    }
                })
                .collect();
            let accepted = valid_flags.iter().filter(|&&v| v).count() as u64;

            let config = PipelineConfig {
                progress_interval: NonZeroU64::new(interval).unwrap(),
                ..PipelineConfig::default()
            };
            let (_, stats) = NodeExtractor::with_config(config)
                .extract_to_writer(from_entities(entities), Vec::new())
                .unwrap();

            prop_assert_eq!(stats.accumulate_checkpoints, accepted / interval);
            prop_assert_eq!(stats.write_checkpoints, accepted / interval);
        }
    }
}
