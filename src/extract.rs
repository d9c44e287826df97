//! Sliding-window n-gram composition and entropy features.
//!
//! For each window and each n in `1..=max_ngram_length` the feature vector
//! holds, in order: the amino acid n-gram probabilities, their entropy, and
//! (exchange mode only) the exchange-group n-gram probabilities and their
//! entropy. [`WindowFeatureExtractor::header`] lists the matching column
//! names.

use std::sync::OnceLock;

use crate::alphabet::{self, Alphabet};
use crate::entropy::shannon_entropy;
use crate::error::{FeatureError, Result};
use crate::ngram::{CountPolicy, NgramTable, ngram_count};

/// Leading, non-feature columns of every row.
pub const ROW_PREFIX_COLUMNS: [&str; 3] = ["ProteinName", "StartPosition", "Sequence"];

/// Upper bound on feature values per window (2^24). Covers `max_ngram_length`
/// up to 5 with or without exchange groups.
pub const MAX_FEATURE_COLUMNS: usize = 1 << 24;

/// What to do with residues outside the 20 standard amino acids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphabetPolicy {
    /// Keep them: they match no amino acid n-gram and are not reduced.
    #[default]
    PassThrough,
    /// Reject the whole sequence before any window is produced.
    Strict,
}

/// Extraction configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureConfig {
    window_size: usize,
    step_size: usize,
    max_ngram_length: usize,
    include_exchange: bool,
    counting: CountPolicy,
    alphabet_policy: AlphabetPolicy,
}

impl FeatureConfig {
    /// Required parameters. Validated by [`FeatureConfig::validate`].
    pub fn new(
        window_size: usize,
        step_size: usize,
        max_ngram_length: usize,
        include_exchange: bool,
    ) -> Self {
        Self {
            window_size,
            step_size,
            max_ngram_length,
            include_exchange,
            counting: CountPolicy::default(),
            alphabet_policy: AlphabetPolicy::default(),
        }
    }
    /// N-gram counting policy (default: overlapping).
    pub fn counting(mut self, policy: CountPolicy) -> Self {
        self.counting = policy;
        self
    }
    /// Residue policy (default: pass through).
    pub fn alphabet_policy(mut self, policy: AlphabetPolicy) -> Self {
        self.alphabet_policy = policy;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
    pub fn step_size(&self) -> usize {
        self.step_size
    }
    pub fn max_ngram_length(&self) -> usize {
        self.max_ngram_length
    }
    pub fn include_exchange(&self) -> bool {
        self.include_exchange
    }
    pub(crate) fn counting_policy(&self) -> CountPolicy {
        self.counting
    }
    pub(crate) fn residue_policy(&self) -> AlphabetPolicy {
        self.alphabet_policy
    }

    /// Check sizes: all positive, n-grams no longer than the window, at most
    /// [`MAX_FEATURE_COLUMNS`] feature values.
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(FeatureError::config("window_size must be >= 1"));
        }
        if self.step_size == 0 {
            return Err(FeatureError::config("step_size must be >= 1"));
        }
        if self.max_ngram_length == 0 {
            return Err(FeatureError::config("max_ngram_length must be >= 1"));
        }
        if self.max_ngram_length > self.window_size {
            return Err(FeatureError::config(format!(
                "max_ngram_length ({}) exceeds window_size ({})",
                self.max_ngram_length, self.window_size
            )));
        }
        match self.column_count() {
            Some(columns) if columns <= MAX_FEATURE_COLUMNS => Ok(()),
            _ => Err(FeatureError::config(format!(
                "max_ngram_length {} needs more than {} feature columns",
                self.max_ngram_length, MAX_FEATURE_COLUMNS
            ))),
        }
    }

    /// Feature values per window, `None` on overflow.
    fn column_count(&self) -> Option<usize> {
        (1..=self.max_ngram_length).try_fold(0usize, |total, n| {
            let mut block = ngram_count(Alphabet::AminoAcid.size(), n)?.checked_add(1)?;
            if self.include_exchange {
                block = block.checked_add(ngram_count(Alphabet::Exchange.size(), n)? + 1)?;
            }
            total.checked_add(block)
        })
    }

    /// Number of windows for a sequence of `len` residues.
    pub fn window_count(&self, len: usize) -> usize {
        if len < self.window_size || self.step_size == 0 {
            0
        } else {
            (len - self.window_size) / self.step_size + 1
        }
    }
}

/// One window and its feature vector.
#[derive(Clone, Debug, PartialEq)]
pub struct Window<'a> {
    /// 0-based offset of the window in the sequence.
    pub start: usize,
    /// The window's residues.
    pub sequence: &'a [u8],
    /// Feature values in header order.
    pub features: Vec<f64>,
}

impl Window<'_> {
    /// 1-based start position, as written to the output.
    #[inline]
    pub fn position(&self) -> usize {
        self.start + 1
    }
}

/// A window tagged with its record identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureRow<'a> {
    /// Identifier of the source record.
    pub protein_id: &'a str,
    /// The window and its features.
    pub window: Window<'a>,
}

/// Per-configuration extractor holding the cached n-gram tables.
///
/// Tables are built on first use and read-only afterwards, so one extractor
/// can be shared by reference across threads.
pub struct WindowFeatureExtractor {
    config: FeatureConfig,
    amino_tables: Vec<OnceLock<NgramTable>>,
    exchange_tables: Vec<OnceLock<NgramTable>>,
}

impl WindowFeatureExtractor {
    /// Validate `config` and prepare empty table caches.
    pub fn new(config: FeatureConfig) -> Result<Self> {
        config.validate()?;
        let max = config.max_ngram_length;
        let exchange = if config.include_exchange { max } else { 0 };
        Ok(Self {
            amino_tables: (0..max).map(|_| OnceLock::new()).collect(),
            exchange_tables: (0..exchange).map(|_| OnceLock::new()).collect(),
            config,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// N-gram table for `(alphabet, n)`, built on first access.
    ///
    /// Only called for pairs yielded by `blocks`.
    fn table(&self, alphabet: Alphabet, n: usize) -> &NgramTable {
        let slot = match alphabet {
            Alphabet::AminoAcid => &self.amino_tables[n - 1],
            Alphabet::Exchange => &self.exchange_tables[n - 1],
        };
        // sizes were checked by FeatureConfig::validate
        slot.get_or_init(|| NgramTable::build(alphabet, n))
    }

    /// `(alphabet, n)` blocks in column order.
    fn blocks(&self) -> impl Iterator<Item = (Alphabet, usize)> + '_ {
        (1..=self.config.max_ngram_length).flat_map(move |n| {
            let exchange = self.config.include_exchange.then_some((Alphabet::Exchange, n));
            std::iter::once((Alphabet::AminoAcid, n)).chain(exchange)
        })
    }

    /// Number of feature values per window.
    pub fn feature_len(&self) -> usize {
        // validated: cannot overflow
        self.config.column_count().unwrap_or(0)
    }

    /// Full column header: row prefix columns followed by feature names.
    pub fn header(&self) -> Vec<String> {
        let mut cols: Vec<String> = ROW_PREFIX_COLUMNS.iter().map(|s| s.to_string()).collect();
        cols.reserve(self.feature_len());
        for (alphabet, n) in self.blocks() {
            let table = self.table(alphabet, n);
            cols.extend(table.ngrams().iter().cloned());
            cols.push(table.alphabet().entropy_label(table.n()));
        }
        cols
    }

    /// Lazily slide over `sequence`.
    ///
    /// Under [`AlphabetPolicy::Strict`] the whole sequence is checked first
    /// and nothing is produced on failure.
    pub fn windows<'s>(&'s self, sequence: &'s [u8]) -> Result<Windows<'s>> {
        if self.config.alphabet_policy == AlphabetPolicy::Strict {
            alphabet::validate_residues(sequence)?;
        }
        Ok(Windows {
            extractor: self,
            sequence,
            next_start: 0,
            counts: Vec::new(),
            reduced: Vec::new(),
        })
    }

    /// Like [`windows`](Self::windows), tagging each window with `protein_id`.
    pub fn rows<'s>(
        &'s self,
        protein_id: &'s str,
        sequence: &'s [u8],
    ) -> Result<impl Iterator<Item = FeatureRow<'s>> + 's> {
        Ok(self
            .windows(sequence)?
            .map(move |window| FeatureRow { protein_id, window }))
    }

    /// Feature vector of a single window.
    pub fn features(&self, window: &[u8]) -> Vec<f64> {
        let mut counts = Vec::new();
        let mut reduced = Vec::new();
        self.features_with(window, &mut counts, &mut reduced)
    }

    fn features_with(
        &self,
        window: &[u8],
        counts: &mut Vec<u32>,
        reduced: &mut Vec<u8>,
    ) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.feature_len());
        if self.config.include_exchange {
            alphabet::reduce_into(window, reduced);
        }
        for (alphabet, n) in self.blocks() {
            let residues = match alphabet {
                Alphabet::AminoAcid => window,
                Alphabet::Exchange => reduced.as_slice(),
            };
            let start = out.len();
            self.table(alphabet, n)
                .frequencies_into(residues, self.config.counting, counts, &mut out);
            let h = shannon_entropy(&out[start..]);
            out.push(h);
        }
        out
    }
}

/// Iterator over the windows of one sequence. Single pass.
pub struct Windows<'s> {
    extractor: &'s WindowFeatureExtractor,
    sequence: &'s [u8],
    next_start: usize,
    counts: Vec<u32>,
    reduced: Vec<u8>,
}

impl<'s> Iterator for Windows<'s> {
    type Item = Window<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let w = self.extractor.config.window_size;
        let start = self.next_start;
        let end = start.checked_add(w)?;
        if end > self.sequence.len() {
            return None;
        }
        self.next_start = start.saturating_add(self.extractor.config.step_size);
        let sequence = &self.sequence[start..end];
        let features = self
            .extractor
            .features_with(sequence, &mut self.counts, &mut self.reduced);
        Some(Window {
            start,
            sequence,
            features,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let cfg = &self.extractor.config;
        let rest = self.sequence.len().saturating_sub(self.next_start);
        let n = cfg.window_count(rest);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Windows<'_> {}

/// One-shot extraction: `(start_offset, feature_vector)` for every window.
///
/// Builds a fresh extractor; reuse a [`WindowFeatureExtractor`] across
/// sequences to keep its n-gram tables.
pub fn extract(sequence: &[u8], config: &FeatureConfig) -> Result<Vec<(usize, Vec<f64>)>> {
    let extractor = WindowFeatureExtractor::new(config.clone())?;
    Ok(extractor
        .windows(sequence)?
        .map(|w| (w.start, w.features))
        .collect())
}
