//! Sliding-window composition features for protein sequences.
//!
//! Each window of a sequence is described by its n-gram frequencies
//! (n = 1..max) and their Shannon entropy, over two alphabets:
//! - the 20 standard amino acids,
//! - optionally, the 6 exchange groups (PAM substitution classes) obtained
//!   with [`alphabet::reduce`].
//!
//! The core ([`WindowFeatureExtractor`]) is pure and deterministic. The
//! [`reader`], [`io`] and [`builder`] modules wrap it into a FASTA → sharded
//! TSV(.gz) pipeline driven by rayon.
//!
//! ```
//! use protein_window_features::{FeatureConfig, WindowFeatureExtractor};
//!
//! let ex = WindowFeatureExtractor::new(FeatureConfig::new(3, 1, 1, false)).unwrap();
//! let windows: Vec<_> = ex.windows(b"AAAAA").unwrap().collect();
//! assert_eq!(windows.len(), 3);
//! assert_eq!(windows[0].features[0], 1.0); // P("A")
//! assert_eq!(windows[0].features[20], 0.0); // Entropy_1
//! ```

pub mod alphabet;
pub mod builder;
pub mod entropy;
mod error;
pub mod extract;
pub mod io;
pub mod ngram;
pub mod reader;

pub use alphabet::{Alphabet, reduce, reduce_str};
pub use builder::{RunConfig, RunSummary, run_fasta, run_records};
pub use entropy::shannon_entropy;
pub use error::{FeatureError, Result};
pub use extract::{
    AlphabetPolicy, FeatureConfig, FeatureRow, Window, WindowFeatureExtractor, Windows, extract,
};
pub use io::{Compression, ShardedWriter};
pub use ngram::{CountPolicy, NgramTable, enumerate};
pub use reader::{FastaRecords, SequenceRecord};
