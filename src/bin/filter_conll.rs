//! Tool to filter and reformat a CoNLL-X treebank.
//!
//! This tool reads a CoNLL-X corpus, optionally deletes words by tag, limits
//! sentence length, samples or shuffles sentences and caps their count, then
//! prints the result as CoNLL-X. It can also write the Universal Linguistic
//! Knowledge files (`words_*`, `poses_*`, `deps_*`) for the same sentences.

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use treebank_tools::corpus::read_corpus_file;
use treebank_tools::error::FilterError;
use treebank_tools::filter::{apply, write_filtered, FilterOptions};
use treebank_tools::logging::init_logging;
use treebank_tools::ulk::UlkWriter;

#[derive(Parser)]
#[command(
    name = "filter_conll",
    about = "Read a CoNLL-X corpus, output filtered CoNLL-X and create files for Universal Linguistic Knowledge",
    long_about = "Reads a CoNLL-X corpus and writes a filtered copy to stdout.\n\
                  Tags are killed first (their children are reattached and the\n\
                  sentence renumbered), then sentence length is limited, then\n\
                  sentences are sampled or shuffled and cut to the requested count."
)]
struct Args {
    /// The suffix to add to Universal Knowledge files, then the CoNLL input file to process
    #[arg(value_name = "[CORPUS-SUFFIX] FILE", num_args = 1..=2, required = true)]
    positional: Vec<String>,

    /// Only output this many sentences
    #[arg(short = 'c', long = "max-sentence-count")]
    max_sentence_count: Option<usize>,

    /// Only output sentences strictly shorter than this
    #[arg(short = 'm', long = "max-sentence-length")]
    max_sentence_length: Option<usize>,

    /// Delete lexemes with this tag from the sentences (repeatable)
    #[arg(short = 'k', long = "kill-tags", value_name = "TAG-TO-KILL")]
    kill_tags: Vec<String>,

    /// Shuffle the data randomly
    #[arg(short = 'r', long = "random-order")]
    random_order: bool,

    /// Draw an output-sized sample with replacement from the data
    #[arg(short = 's', long = "sample")]
    sample: bool,

    /// A directory to put the Universal Knowledge files to (default: not generated)
    #[arg(short = 'u', long = "universal-knowledge", value_name = "DIR")]
    universal_knowledge: Option<PathBuf>,

    /// Seed for shuffling and sampling (default: from the OS)
    #[arg(long)]
    seed: Option<u64>,

    /// Print extra messages (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Split the positionals into the optional corpus suffix and the input file.
    fn suffix_and_file(&self) -> anyhow::Result<(Option<&str>, PathBuf)> {
        match self.positional.as_slice() {
            [file] => Ok((None, PathBuf::from(file))),
            [suffix, file] => Ok((Some(suffix.as_str()), PathBuf::from(file))),
            other => anyhow::bail!("expected [CORPUS-SUFFIX] FILE, got {} arguments", other.len()),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let (corpus_suffix, file) = args.suffix_and_file()?;

    let options = FilterOptions {
        max_sentence_count: args.max_sentence_count,
        max_sentence_length: args.max_sentence_length,
        kill_tags: args.kill_tags.clone(),
        random_order: args.random_order,
        sample: args.sample,
    };
    for line in options.describe() {
        log::info!("{}", line);
    }
    match &args.universal_knowledge {
        Some(dir) => log::info!("Universal Knowledge files saved to {:?}", dir),
        None => log::info!("Universal Knowledge files not generated"),
    }

    // Open the ULK files before the corpus is read so a bad path fails fast.
    let mut ulk = match &args.universal_knowledge {
        Some(dir) => {
            let suffix = corpus_suffix.ok_or(FilterError::MissingCorpusSuffix)?;
            Some(UlkWriter::create(dir, suffix)?)
        }
        None => None,
    };

    let corpus = read_corpus_file(&file)
        .with_context(|| format!("Failed to read corpus: {:?}", file))?;
    log::info!("Loaded {} sentences", corpus.len());

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let sentences = apply(corpus, &options, &mut rng);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = write_filtered(&sentences, &mut out, ulk.as_mut())
        .context("Failed to write filtered corpus")?;

    if let Some(writer) = ulk {
        writer
            .finish()
            .context("Failed to write Universal Knowledge files")?;
    }

    log::info!("Wrote {} sentences.", written);
    Ok(())
}
