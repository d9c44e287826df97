//! Tab-separated output: row formatting and record-count sharded files.
//!
//! Layout
//! - Every shard starts with the header line.
//! - One line per window: `id \t position \t window \t features...`.
//! - Floats use the shortest round-trip form with a trailing `.0` on whole
//!   values (`0.0`, `1.0`, `0.3333333333333333`).
//! - Shards are named `<prefix><NNN>.txt[.gz]`, `NNN` 1-based and zero-padded.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::write::GzEncoder;

use crate::error::{FeatureError, Result};
use crate::extract::{FeatureConfig, FeatureRow};

/// Records per shard unless configured otherwise.
pub const DEFAULT_RECORDS_PER_FILE: usize = 200;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    /// Plain `.txt` shards.
    None,
    /// Gzip-compressed `.txt.gz` shards.
    #[default]
    Gzip,
}

impl Compression {
    /// File extension of a shard, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Compression::None => "txt",
            Compression::Gzip => "txt.gz",
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" | "txt" => Ok(Compression::None),
            "gzip" | "gz" => Ok(Compression::Gzip),
            other => Err(format!("unknown compression {other:?} (expected none|gzip)")),
        }
    }
}

/// Tab-joined header line, newline terminated.
pub fn header_line(columns: &[String]) -> String {
    let mut line = columns.join("\t");
    line.push('\n');
    line
}

/// Append one formatted row (newline terminated) to `out`.
pub fn format_row<W: Write>(out: &mut W, row: &FeatureRow<'_>) -> std::io::Result<()> {
    write!(out, "{}\t{}\t", row.protein_id, row.window.position())?;
    out.write_all(row.window.sequence)?;
    for v in &row.window.features {
        write!(out, "\t{v:?}")?;
    }
    out.write_all(b"\n")
}

/// `<input dir>/<input stem>_window_<w>_step_<s>_ngram_<n>_`.
pub fn default_output_prefix(input: &Path, cfg: &FeatureConfig) -> String {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    // strip compression suffix first: "x.fasta.gz" -> "x"
    let mut stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    if input.extension().is_some_and(|e| e == "gz" || e == "bz2" || e == "xz")
        && let Some(inner) = Path::new(&stem).file_stem()
    {
        stem = inner.to_string_lossy().into_owned();
    }
    let name = format!(
        "{}_window_{}_step_{}_ngram_{}_",
        stem,
        cfg.window_size(),
        cfg.step_size(),
        cfg.max_ngram_length()
    );
    parent.join(name).to_string_lossy().into_owned()
}

enum Sink {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Sink {
    fn create(path: &Path, compression: Compression) -> std::io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        Ok(match compression {
            Compression::None => Sink::Plain(file),
            Compression::Gzip => Sink::Gzip(GzEncoder::new(file, flate2::Compression::default())),
        })
    }

    fn write_all(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self {
            Sink::Plain(w) => w.write_all(bytes),
            Sink::Gzip(w) => w.write_all(bytes),
        }
    }

    fn finish(self) -> std::io::Result<()> {
        match self {
            Sink::Plain(mut w) => w.flush(),
            Sink::Gzip(w) => w.finish()?.flush(),
        }
    }
}

/// Writes per-record row blocks, starting a new shard every `records_per_file` records.
///
/// Shards are opened lazily, so no empty trailing shard is produced.
pub struct ShardedWriter {
    prefix: String,
    header: String,
    records_per_file: usize,
    compression: Compression,
    sink: Option<Sink>,
    records_in_shard: usize,
    paths: Vec<PathBuf>,
}

impl ShardedWriter {
    pub fn new(
        prefix: impl Into<String>,
        header: &[String],
        records_per_file: usize,
        compression: Compression,
    ) -> Result<Self> {
        if records_per_file == 0 {
            return Err(FeatureError::config("records_per_file must be >= 1"));
        }
        Ok(Self {
            prefix: prefix.into(),
            header: header_line(header),
            records_per_file,
            compression,
            sink: None,
            records_in_shard: 0,
            paths: Vec::new(),
        })
    }

    /// Path of shard `index` (1-based).
    pub fn shard_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!(
            "{}{:03}.{}",
            self.prefix,
            index,
            self.compression.extension()
        ))
    }

    /// Write the rows of one record. `rows` may be empty; the record still counts.
    pub fn write_record(&mut self, rows: &[u8]) -> Result<()> {
        if self.sink.is_none() {
            self.open_shard()?;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.write_all(rows)?;
        }
        self.records_in_shard += 1;

        if self.records_in_shard == self.records_per_file {
            self.close_shard()?;
        }
        Ok(())
    }

    fn open_shard(&mut self) -> Result<()> {
        let path = self.shard_path(self.paths.len() + 1);
        log::debug!("opening shard {}", path.display());
        let mut sink = Sink::create(&path, self.compression)?;
        sink.write_all(self.header.as_bytes())?;
        self.paths.push(path);
        self.sink = Some(sink);
        Ok(())
    }

    fn close_shard(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.take() {
            sink.finish()?;
        }
        self.records_in_shard = 0;
        Ok(())
    }

    /// Flush the open shard and return every shard path in order.
    pub fn finish(mut self) -> Result<Vec<PathBuf>> {
        self.close_shard()?;
        Ok(std::mem::take(&mut self.paths))
    }
}
