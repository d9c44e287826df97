//! FASTA input: `(identifier, sequence)` records.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use needletail::FastxReader;

use crate::error::{FeatureError, Result};

/// One input record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    /// First whitespace-delimited token of the header line.
    pub id: String,
    /// Residues, line breaks removed, case preserved.
    pub seq: Vec<u8>,
}

impl SequenceRecord {
    pub fn new(id: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            seq: seq.into(),
        }
    }
}

/// Streaming FASTA (or FASTQ) reader; gzip, bzip2 and xz inputs are detected.
pub struct FastaRecords {
    inner: Option<Box<dyn FastxReader>>,
}

impl FastaRecords {
    /// Open `path`. An empty file yields no records.
    pub fn from_path(path: &Path) -> Result<Self> {
        if std::fs::metadata(path)?.len() == 0 {
            log::warn!("{} is empty", path.display());
            return Ok(Self { inner: None });
        }
        let inner =
            needletail::parse_fastx_file(path).map_err(|e| FeatureError::Parse(e.to_string()))?;
        Ok(Self { inner: Some(inner) })
    }

    /// Parse from any reader. Empty input yields no records, as with
    /// [`from_path`](Self::from_path).
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Result<Self> {
        let mut reader = BufReader::new(reader);
        if reader.fill_buf()?.is_empty() {
            return Ok(Self { inner: None });
        }
        let inner =
            needletail::parse_fastx_reader(reader).map_err(|e| FeatureError::Parse(e.to_string()))?;
        Ok(Self { inner: Some(inner) })
    }
}

impl Iterator for FastaRecords {
    type Item = Result<SequenceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let rec = match self.inner.as_mut()?.next()? {
            Ok(rec) => rec,
            Err(e) => return Some(Err(FeatureError::Parse(e.to_string()))),
        };
        Some(record_id(rec.id()).map(|id| SequenceRecord {
            id,
            seq: rec.seq().into_owned(),
        }))
    }
}

fn record_id(header: &[u8]) -> Result<String> {
    let header = std::str::from_utf8(header).map_err(|e| FeatureError::Parse(e.to_string()))?;
    Ok(header
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string())
}
