use std::io::{Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use protein_window_features::*;

fn write_fasta(dir: &Path, records: usize) -> std::path::PathBuf {
    let path = dir.join("family.fasta");
    let mut f = std::fs::File::create(&path).unwrap();
    for i in 0..records {
        writeln!(f, ">prot{i} some description").unwrap();
        writeln!(f, "MKVLAAGICWHRDEQNSTPG").unwrap();
    }
    path
}

fn read_shard(path: &Path) -> String {
    let bytes = std::fs::read(path).unwrap();
    if path.extension().is_some_and(|e| e == "gz") {
        let mut s = String::new();
        GzDecoder::new(bytes.as_slice()).read_to_string(&mut s).unwrap();
        s
    } else {
        String::from_utf8(bytes).unwrap()
    }
}

#[test]
fn test_rotation_and_headers() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fasta(dir.path(), 7);
    let prefix = dir.path().join("out_").to_string_lossy().into_owned();
    let features = FeatureConfig::new(10, 5, 1, false);

    let summary = run_fasta(
        &input,
        &prefix,
        features.clone(),
        RunConfig::default()
            .records_per_file(3)
            .compression(Compression::None)
            .block_size(2),
    )
    .unwrap();

    assert_eq!(summary.records, 7);
    // 20 residues, w=10, s=5 -> 3 windows each
    assert_eq!(summary.windows, 21);
    let names: Vec<_> = summary
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["out_001.txt", "out_002.txt", "out_003.txt"]);

    let header = io::header_line(&WindowFeatureExtractor::new(features).unwrap().header());
    let mut rows = Vec::new();
    for (i, path) in summary.files.iter().enumerate() {
        let text = read_shard(path);
        assert!(text.starts_with(&header));
        let lines: Vec<_> = text[header.len()..].lines().map(str::to_owned).collect();
        let expected_records = if i < 2 { 3 } else { 1 };
        assert_eq!(lines.len(), expected_records * 3);
        rows.extend(lines);
    }

    // input order is preserved across blocks and shards
    let ids: Vec<_> = rows.iter().map(|l| l.split('\t').next().unwrap().to_owned()).collect();
    let expected: Vec<String> = (0..7).flat_map(|i| vec![format!("prot{i}"); 3]).collect();
    assert_eq!(ids, expected);

    let first: Vec<_> = rows[0].split('\t').collect();
    assert_eq!(first[1], "1");
    assert_eq!(first[2], "MKVLAAGICW");
    assert_eq!(first.len(), 3 + 21);
    let second: Vec<_> = rows[1].split('\t').collect();
    assert_eq!(second[1], "6");
}

#[test]
fn test_gzip_matches_plain() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fasta(dir.path(), 4);
    let features = FeatureConfig::new(8, 4, 2, true);

    let plain_prefix = dir.path().join("plain_").to_string_lossy().into_owned();
    let gz_prefix = dir.path().join("gz_").to_string_lossy().into_owned();
    let plain = run_fasta(
        &input,
        &plain_prefix,
        features.clone(),
        RunConfig::default().compression(Compression::None),
    )
    .unwrap();
    let gz = run_fasta(&input, &gz_prefix, features, RunConfig::default()).unwrap();

    assert_eq!(plain.files.len(), 1);
    assert_eq!(gz.files.len(), 1);
    assert!(gz.files[0].to_string_lossy().ends_with("gz_001.txt.gz"));
    assert_eq!(read_shard(&plain.files[0]), read_shard(&gz.files[0]));
}

#[test]
fn test_exact_multiple_leaves_no_empty_shard() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fasta(dir.path(), 4);
    let prefix = dir.path().join("x_").to_string_lossy().into_owned();
    let summary = run_fasta(
        &input,
        &prefix,
        FeatureConfig::new(20, 1, 1, false),
        RunConfig::default().records_per_file(2),
    )
    .unwrap();
    assert_eq!(summary.files.len(), 2);
    assert_eq!(summary.windows, 4);
}

#[test]
fn test_strict_mode_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.fasta");
    std::fs::write(&input, ">ok\nACDEF\n>bad\nACDXF\n").unwrap();
    let prefix = dir.path().join("s_").to_string_lossy().into_owned();
    let err = run_fasta(
        &input,
        &prefix,
        FeatureConfig::new(2, 1, 1, false).alphabet_policy(AlphabetPolicy::Strict),
        RunConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FeatureError::Alphabet { residue: 'X', position: 3 }));
}

#[test]
fn test_gzip_input_with_default_prefix() {
    use flate2::write::GzEncoder;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("family.fasta.gz");
    let mut gz = GzEncoder::new(
        std::fs::File::create(&input).unwrap(),
        flate2::Compression::default(),
    );
    for i in 0..3 {
        writeln!(gz, ">prot{i}").unwrap();
        writeln!(gz, "MKVLAAGICWHRDEQNSTPG").unwrap();
    }
    gz.finish().unwrap();

    let features = FeatureConfig::new(10, 5, 2, true);
    let prefix = io::default_output_prefix(&input, &features);
    let summary = run_fasta(&input, &prefix, features.clone(), RunConfig::default()).unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(summary.windows, 9);
    assert_eq!(
        summary.files,
        vec![dir.path().join("family_window_10_step_5_ngram_2_001.txt.gz")]
    );

    // same rows as the uncompressed input
    let plain = write_fasta(dir.path(), 3);
    let plain_prefix = dir.path().join("plain_").to_string_lossy().into_owned();
    let expected = run_fasta(
        &plain,
        &plain_prefix,
        features,
        RunConfig::default().compression(Compression::None),
    )
    .unwrap();
    assert_eq!(read_shard(&summary.files[0]), read_shard(&expected.files[0]));
}

#[test]
fn test_empty_input_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.fasta");
    std::fs::write(&input, "").unwrap();
    let prefix = dir.path().join("e_").to_string_lossy().into_owned();
    let summary = run_fasta(
        &input,
        &prefix,
        FeatureConfig::new(5, 1, 1, false),
        RunConfig::default(),
    )
    .unwrap();
    assert_eq!(summary, RunSummary::default());
}
