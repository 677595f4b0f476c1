//! Every strategy must merge the same record multiset and fail the same way

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use zipmerge::archive::{ArchiveName, discover_archives};
use zipmerge::fixtures::{self, FixtureSpec};
use zipmerge::parallel::{ExecutionStrategy, StrategyKind};
use zipmerge::record::{Record, RecordParser, XmlRecordParser};
use zipmerge::tables::TableWriter;
use zipmerge::{Pipeline, PipelineError, RecordParseError};

const CONCURRENT: [StrategyKind; 3] = [StrategyKind::Pool, StrategyKind::Pipes, StrategyKind::Queue];

fn write_zip(path: &Path, entries: &[(&str, String)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, body) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

fn xml(id: &str, level: &str, objects: &[&str]) -> String {
    let objects: String = objects
        .iter()
        .map(|name| format!(r#"<object name="{name}"/>"#))
        .collect();
    format!(
        r#"<root><var name="id" value="{id}"/><var name="level" value="{level}"/><objects>{objects}</objects></root>"#
    )
}

fn generated_set(archives: usize, records: usize) -> (TempDir, Vec<ArchiveName>) {
    let dir = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(2024);
    fixtures::generate(&mut rng, dir.path(), FixtureSpec { archives, records_per_archive: records }).unwrap();
    let names = discover_archives(dir.path(), "zip").unwrap();
    (dir, names)
}

fn pipeline<P: RecordParser>(kind: StrategyKind, workers: usize, parser: P) -> Pipeline<P> {
    Pipeline::new(ExecutionStrategy::new(kind, workers, None), parser)
}

#[test]
fn test_all_strategies_agree_on_generated_set() {
    let (_dir, archives) = generated_set(13, 25);
    let baseline = pipeline(StrategyKind::Sequential, 1, XmlRecordParser::new())
        .run(&archives)
        .unwrap();
    assert_eq!(baseline.len(), 13 * 25);

    for workers in [1, 2, 4, 7, 32] {
        for kind in CONCURRENT {
            let merged = pipeline(kind, workers, XmlRecordParser::new()).run(&archives).unwrap();
            assert_eq!(merged.canonical(), baseline.canonical(), "{kind} with {workers} workers");
        }
    }
}

#[test]
fn test_explicit_chunk_size_keeps_content() {
    let (_dir, archives) = generated_set(9, 4);
    let expected = pipeline(StrategyKind::Sequential, 1, XmlRecordParser::new())
        .run(&archives)
        .unwrap()
        .canonical();

    for chunk_size in [1, 2, 5, 9, 100] {
        for kind in CONCURRENT {
            let strategy = ExecutionStrategy::new(kind, 3, Some(chunk_size));
            let merged = Pipeline::new(strategy, XmlRecordParser::new()).run(&archives).unwrap();

            assert_eq!(merged.canonical(), expected, "{kind} chunk size {chunk_size}");
            assert_eq!(merged.arrivals().len(), archives.len().div_ceil(chunk_size));
        }
    }
}

#[test]
fn test_two_archive_scenario_tables() {
    let dir = TempDir::new().unwrap();
    write_zip(&dir.path().join("a.zip"), &[("k1.xml", xml("x1", "5", &["o1", "o2"]))]);
    write_zip(&dir.path().join("b.zip"), &[("k2.xml", xml("x2", "9", &[]))]);
    let archives = discover_archives(dir.path(), "zip").unwrap();

    for kind in StrategyKind::ALL {
        let out = TempDir::new().unwrap();
        let writer = TableWriter::new(out.path().join("level.csv"), out.path().join("object.csv"));

        let report = pipeline(kind, 2, XmlRecordParser::new())
            .run_to_tables(&archives, &writer)
            .unwrap();
        assert_eq!(report.records, 2);
        assert_eq!(report.tables.level_rows, 2);
        assert_eq!(report.tables.object_rows, 2);

        let mut level: Vec<String> = fs::read_to_string(writer.level_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        level.sort();
        assert_eq!(level, vec!["x1,5", "x2,9"], "{kind}");

        let mut object: Vec<String> = fs::read_to_string(writer.object_path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        object.sort();
        assert_eq!(object, vec!["x1,o1", "x1,o2"], "{kind}");
    }
}

#[test]
fn test_empty_archive_contributes_nothing() {
    let dir = TempDir::new().unwrap();
    write_zip(&dir.path().join("a.zip"), &[("k1.xml", xml("x1", "1", &["o"]))]);
    write_zip(&dir.path().join("b.zip"), &[]);
    let archives = discover_archives(dir.path(), "zip").unwrap();

    for kind in StrategyKind::ALL {
        let merged = pipeline(kind, 2, XmlRecordParser::new()).run(&archives).unwrap();
        assert_eq!(merged.records(), &[Record::new("x1", "1", vec!["o".to_string()])]);
    }
}

#[test]
fn test_no_archives_yields_empty_result() {
    for kind in StrategyKind::ALL {
        let merged = pipeline(kind, 4, XmlRecordParser::new()).run(&[]).unwrap();
        assert!(merged.is_empty(), "{kind}");
        assert!(merged.arrivals().is_empty(), "{kind}");
    }
}

#[test]
fn test_corrupt_archive_fails_every_strategy() {
    let (dir, _) = generated_set(6, 3);
    fs::write(dir.path().join("3.zip"), b"garbage").unwrap();
    let archives = discover_archives(dir.path(), "zip").unwrap();

    for kind in StrategyKind::ALL {
        let out = TempDir::new().unwrap();
        let writer = TableWriter::new(out.path().join("level.csv"), out.path().join("object.csv"));

        let err = pipeline(kind, 3, XmlRecordParser::new())
            .run_to_tables(&archives, &writer)
            .unwrap_err();

        assert_eq!(err.kind(), "archive-open", "{kind}");
        assert!(err.archive().unwrap().to_string().ends_with("3.zip"), "{kind}");
        assert!(!writer.level_path().exists(), "{kind}");
        assert!(!writer.object_path().exists(), "{kind}");
    }
}

#[test]
fn test_parser_failure_names_archive_and_entry() {
    let dir = TempDir::new().unwrap();
    write_zip(&dir.path().join("a.zip"), &[("good.xml", xml("x1", "1", &[]))]);
    write_zip(&dir.path().join("b.zip"), &[("bad.xml", xml("poison", "2", &[]))]);
    write_zip(&dir.path().join("c.zip"), &[("good2.xml", xml("x3", "3", &[]))]);
    let archives = discover_archives(dir.path(), "zip").unwrap();

    let parser = |bytes: &[u8]| -> Result<Record, RecordParseError> {
        let record = XmlRecordParser::new().parse(bytes)?;
        if record.id == "poison" {
            return Err(RecordParseError::MissingField("level"));
        }
        Ok(record)
    };

    for kind in StrategyKind::ALL {
        let err = pipeline(kind, 3, parser).run(&archives).unwrap_err();
        match err.root() {
            PipelineError::RecordParse { archive, entry, .. } => {
                assert!(archive.to_string().ends_with("b.zip"), "{kind}");
                assert_eq!(entry, "bad.xml", "{kind}");
            }
            other => panic!("{kind}: unexpected error {other}"),
        }
        if kind != StrategyKind::Sequential {
            assert!(matches!(err, PipelineError::Worker { .. }), "{kind}");
        }
    }
}

#[test]
fn test_panicking_parser_is_reported_not_hung() {
    let (_dir, archives) = generated_set(4, 2);
    let parser = |_: &[u8]| -> Result<Record, RecordParseError> { panic!("parser blew up") };

    for kind in StrategyKind::ALL {
        let err = pipeline(kind, 2, parser).run(&archives).unwrap_err();
        assert_eq!(err.kind(), "worker-lost", "{kind}");
    }
}

#[test]
fn test_deterministic_strategies_keep_chunk_order() {
    let (_dir, archives) = generated_set(10, 3);

    for kind in [StrategyKind::Sequential, StrategyKind::Pipes] {
        let first = pipeline(kind, 3, XmlRecordParser::new()).run(&archives).unwrap();
        let second = pipeline(kind, 3, XmlRecordParser::new()).run(&archives).unwrap();

        let arrivals = first.arrivals().to_vec();
        let mut sorted = arrivals.clone();
        sorted.sort();
        assert_eq!(arrivals, sorted, "{kind}");
        assert_eq!(first.records(), second.records(), "{kind}");
    }
}

fn sorted_lines(path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

#[test]
fn test_rerun_overwrites_tables_identically() {
    let (dir, archives) = generated_set(7, 10);

    for kind in StrategyKind::ALL {
        let writer = TableWriter::new(
            dir.path().join(format!("level-{}.csv", kind.suffix())),
            dir.path().join(format!("object-{}.csv", kind.suffix())),
        );
        let runner = pipeline(kind, 3, XmlRecordParser::new());

        runner.run_to_tables(&archives, &writer).unwrap();
        let first_level = fs::read(writer.level_path()).unwrap();
        let first_object = fs::read(writer.object_path()).unwrap();
        let first_sorted = (sorted_lines(writer.level_path()), sorted_lines(writer.object_path()));

        runner.run_to_tables(&archives, &writer).unwrap();

        if kind.is_order_deterministic() {
            assert_eq!(fs::read(writer.level_path()).unwrap(), first_level, "{kind}");
            assert_eq!(fs::read(writer.object_path()).unwrap(), first_object, "{kind}");
        } else {
            let second_sorted = (sorted_lines(writer.level_path()), sorted_lines(writer.object_path()));
            assert_eq!(second_sorted, first_sorted, "{kind}");
        }
    }
}
