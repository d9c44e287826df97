use anyhow::Context;
use clap::Parser;
use protein_window_features::io::{DEFAULT_RECORDS_PER_FILE, default_output_prefix};
use protein_window_features::*;
use std::path::PathBuf;

/// Write sliding-window n-gram/entropy features of FASTA proteins as sharded TSV.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input FASTA(.gz) path
    #[arg(short, long)]
    input: PathBuf,

    /// Output prefix; shards are `<prefix>NNN.txt[.gz]`.
    /// Default: `<input stem>_window_<w>_step_<s>_ngram_<n>_` next to the input
    #[arg(short, long)]
    output_prefix: Option<String>,

    /// Window length in residues
    #[arg(short, long, default_value_t = 50)]
    window_size: usize,

    /// Offset between consecutive windows
    #[arg(short, long, default_value_t = 10)]
    step_size: usize,

    /// Longest n-gram (features are computed for 1..=n)
    #[arg(short = 'n', long, default_value_t = 2)]
    max_ngram: usize,

    /// Add exchange-group n-grams and entropies
    #[arg(long, default_value_t = false)]
    exchange: bool,

    /// Count only non-overlapping n-gram occurrences
    #[arg(long, default_value_t = false)]
    non_overlapping: bool,

    /// Fail on residues outside the 20 standard amino acids
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Records per output file
    #[arg(long, default_value_t = DEFAULT_RECORDS_PER_FILE)]
    records_per_file: usize,

    /// Compression: none|gzip
    #[arg(long, default_value = "gzip")]
    compression: Compression,

    /// Threads (rayon)
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let counting = if args.non_overlapping {
        CountPolicy::NonOverlapping
    } else {
        CountPolicy::Overlapping
    };
    let policy = if args.strict {
        AlphabetPolicy::Strict
    } else {
        AlphabetPolicy::PassThrough
    };
    let features = FeatureConfig::new(
        args.window_size,
        args.step_size,
        args.max_ngram,
        args.exchange,
    )
    .counting(counting)
    .alphabet_policy(policy);

    let prefix = args
        .output_prefix
        .clone()
        .unwrap_or_else(|| default_output_prefix(&args.input, &features));

    let cfg = RunConfig::default()
        .records_per_file(args.records_per_file)
        .compression(args.compression);
    let cfg = match args.threads {
        Some(n) => cfg.threads(n),
        None => cfg,
    };

    let summary = run_fasta(&args.input, &prefix, features, cfg)
        .with_context(|| format!("extracting features from {}", args.input.display()))?;

    for path in &summary.files {
        log::info!("wrote {}", path.display());
    }
    Ok(())
}
