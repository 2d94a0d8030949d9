//! Tool to score predicted dependency trees against gold trees.
//!
//! This tool reads a gold and a predicted CoNLL-X file line by line in
//! lockstep and prints the ordered (strict) and unordered (reorder-tolerant)
//! attachment accuracy as `ORDERED&UNORDERED`.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use treebank_tools::compare::{compare_files, ComparisonReport};
use treebank_tools::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "compare_conll",
    about = "Compare predicted CoNLL-X trees against gold trees",
    long_about = "Reads two CoNLL-X files describing the same tokens in the same order,\n\
                  compares the parent of every token and prints the ordered and\n\
                  unordered accuracy as ORDERED&UNORDERED. A mismatch whose gold arc\n\
                  was only reversed by the prediction counts towards the unordered\n\
                  accuracy."
)]
struct Args {
    /// Gold-standard CoNLL-X file
    gold: PathBuf,

    /// Predicted CoNLL-X file
    predicted: PathBuf,

    /// Print the counts and both accuracies as JSON instead
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    log::info!("comparing {:?} against gold {:?}", args.predicted, args.gold);
    let tally = compare_files(&args.gold, &args.predicted).with_context(|| {
        format!(
            "Failed to compare {:?} against {:?}",
            args.predicted, args.gold
        )
    })?;
    log::info!(
        "total: {}, correct: {}, reordered: {}, incorrect: {}",
        tally.total,
        tally.correct,
        tally.reordered,
        tally.incorrect
    );

    if args.json {
        let report = ComparisonReport::new(tally)?;
        let json = serde_json::to_string_pretty(&report)
            .context("Failed to serialize comparison report")?;
        println!("{}", json);
    } else {
        println!("{}", tally.accuracy()?);
    }

    Ok(())
}
