//! N-gram enumeration and per-window counting.
//!
//! The position of an n-gram in [`enumerate`]'s output equals its mixed-radix
//! code over the alphabet ranks (first symbol most significant). Counting
//! therefore scans a window once with a rolling code and indexes the count
//! vector directly, instead of searching for each n-gram separately.

use crate::alphabet::Alphabet;
use crate::error::{FeatureError, Result};

/// How repeated occurrences of an n-gram inside one window are counted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CountPolicy {
    /// Every start position counts: `"AA"` occurs twice in `"AAA"`.
    #[default]
    Overlapping,
    /// Leftmost non-overlapping matches only: `"AA"` occurs once in `"AAA"`.
    NonOverlapping,
}

/// All strings of length `n` over `symbols`, in enumeration order.
///
/// Starts from the symbols themselves and repeatedly appends every symbol to
/// every string of the previous round. `n == 0` yields an empty list.
pub fn enumerate(symbols: &[u8], n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let mut grams: Vec<String> = symbols.iter().map(|&s| (s as char).to_string()).collect();
    for _ in 1..n {
        let mut next = Vec::with_capacity(grams.len() * symbols.len());
        for g in &grams {
            for &s in symbols {
                let mut t = String::with_capacity(g.len() + 1);
                t.push_str(g);
                t.push(s as char);
                next.push(t);
            }
        }
        grams = next;
    }
    grams
}

/// Largest table [`NgramTable::new`] will enumerate (2^24 n-grams).
pub const MAX_TABLE_LEN: usize = 1 << 24;

/// `alphabet_size^n`, `None` on overflow.
#[inline]
pub fn ngram_count(alphabet_size: usize, n: usize) -> Option<usize> {
    alphabet_size.checked_pow(u32::try_from(n).ok()?)
}

/// Cached n-gram list for one `(alphabet, n)` pair.
#[derive(Clone, Debug)]
pub struct NgramTable {
    alphabet: Alphabet,
    n: usize,
    ngrams: Vec<String>,
}

impl NgramTable {
    /// Enumerate the table. Fails if `n == 0` or `|alphabet|^n` exceeds [`MAX_TABLE_LEN`].
    pub fn new(alphabet: Alphabet, n: usize) -> Result<Self> {
        if n == 0 {
            return Err(FeatureError::config("n-gram length must be >= 1"));
        }
        if !ngram_count(alphabet.size(), n).is_some_and(|len| len <= MAX_TABLE_LEN) {
            return Err(FeatureError::config(format!(
                "{}^{} n-grams exceed the table limit of {}",
                alphabet.size(),
                n,
                MAX_TABLE_LEN
            )));
        }
        Ok(Self::build(alphabet, n))
    }

    /// Unchecked constructor; callers guarantee `1 <= n` and no overflow.
    pub(crate) fn build(alphabet: Alphabet, n: usize) -> Self {
        log::debug!("enumerating {alphabet:?} n-grams for n={n}");
        Self {
            alphabet,
            n,
            ngrams: enumerate(alphabet.symbols(), n),
        }
    }

    #[inline]
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of n-grams (`|alphabet|^n`).
    #[inline]
    pub fn len(&self) -> usize {
        self.ngrams.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ngrams.is_empty()
    }

    /// N-gram strings in column order.
    #[inline]
    pub fn ngrams(&self) -> &[String] {
        &self.ngrams
    }

    /// Column index of `gram`, `None` if it has the wrong length or a foreign symbol.
    pub fn index_of(&self, gram: &[u8]) -> Option<usize> {
        if gram.len() != self.n {
            return None;
        }
        let k = self.alphabet.size();
        gram.iter()
            .try_fold(0usize, |code, &b| Some(code * k + self.alphabet.rank(b)?))
    }

    /// Count occurrences of every n-gram in `window` into `counts` (resized to `len()`).
    ///
    /// Positions covering a byte outside the alphabet match nothing.
    pub fn count_into(&self, window: &[u8], policy: CountPolicy, counts: &mut Vec<u32>) {
        counts.clear();
        counts.resize(self.len(), 0);
        let n = self.n;
        if window.len() < n {
            return;
        }

        let k = self.alphabet.size();
        // k^(n-1): dropping the leading digit keeps the code below k^n
        let lead = self.len() / k;
        // first position at which each n-gram may match again
        let mut next_free: Vec<usize> = match policy {
            CountPolicy::Overlapping => Vec::new(),
            CountPolicy::NonOverlapping => vec![0; self.len()],
        };

        let mut code = 0usize;
        let mut run = 0usize;
        for (i, &b) in window.iter().enumerate() {
            let Some(r) = self.alphabet.rank(b) else {
                code = 0;
                run = 0;
                continue;
            };
            code = (code % lead) * k + r;
            run += 1;
            if run < n {
                continue;
            }
            let start = i + 1 - n;
            match policy {
                CountPolicy::Overlapping => counts[code] += 1,
                CountPolicy::NonOverlapping => {
                    if start >= next_free[code] {
                        counts[code] += 1;
                        next_free[code] = start + n;
                    }
                }
            }
        }
    }

    /// Append the probability of every n-gram in `window` to `out`, in column order.
    ///
    /// Probability is `count / (window.len() - n + 1)`, the number of n-gram
    /// start positions in the window. `counts` is scratch space.
    pub fn frequencies_into(
        &self,
        window: &[u8],
        policy: CountPolicy,
        counts: &mut Vec<u32>,
        out: &mut Vec<f64>,
    ) {
        self.count_into(window, policy, counts);
        let positions = (window.len().saturating_sub(self.n) + 1) as f64;
        out.extend(counts.iter().map(|&c| c as f64 / positions));
    }
}
