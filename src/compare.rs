//! Reorder-aware attachment scoring of predicted trees against gold trees.
//!
//! Tokens whose predicted parent differs from the gold parent are not
//! judged immediately. They are parked in two per-sentence tables (gold
//! parents and predicted parents) and classified once the sentence ends: a
//! predicted arc `a -> p` is *reordered* when the gold tree holds the
//! reverse arc `p -> a` among its own mismatches, and *incorrect* otherwise.

use std::collections::HashMap;
use std::fmt;
use std::io::BufRead;
use std::path::Path;

use serde::Serialize;

use crate::error::{CompareError, SyncReason};
use crate::input;
use crate::record::{is_sentence_boundary, parse_arc_record, ArcRecord};

/// Running counters of a comparison.
///
/// `correct + reordered + incorrect == total` once every sentence has been
/// finished.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArcTally {
    pub total: usize,
    pub correct: usize,
    pub reordered: usize,
    pub incorrect: usize,
}

impl ArcTally {
    pub fn accuracy(&self) -> Result<Accuracy, CompareError> {
        if self.total == 0 {
            return Err(CompareError::DivisionUndefined);
        }
        let total = self.total as f64;
        Ok(Accuracy {
            ordered: self.correct as f64 / total,
            unordered: (self.correct + self.reordered) as f64 / total,
        })
    }
}

/// Strict and reorder-tolerant attachment accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accuracy {
    pub ordered: f64,
    pub unordered: f64,
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}&{:.6}", self.ordered, self.unordered)
    }
}

/// Counts plus accuracies, as printed by `compare_conll --json`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ComparisonReport {
    #[serde(flatten)]
    pub tally: ArcTally,
    pub ordered_accuracy: f64,
    pub unordered_accuracy: f64,
}

impl ComparisonReport {
    pub fn new(tally: ArcTally) -> Result<Self, CompareError> {
        let accuracy = tally.accuracy()?;
        Ok(Self {
            tally,
            ordered_accuracy: accuracy.ordered,
            unordered_accuracy: accuracy.unordered,
        })
    }
}

/// Scores paired gold/predicted tokens one sentence at a time.
#[derive(Debug, Default)]
pub struct SentenceArcComparator {
    tally: ArcTally,
    /// Gold parent of every mismatched token in the current sentence.
    derivations: HashMap<usize, usize>,
    /// Predicted parent of every mismatched token in the current sentence.
    proposals: HashMap<usize, usize>,
    /// Address of the previous token in the current sentence, 0 at its start.
    last_address: usize,
}

impl SentenceArcComparator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score one token pair. Mismatches are deferred until
    /// [`finish_sentence`](Self::finish_sentence).
    pub fn score_pair(
        &mut self,
        gold: &ArcRecord<'_>,
        predicted: &ArcRecord<'_>,
    ) -> Result<(), SyncReason> {
        if gold.address != predicted.address {
            return Err(SyncReason::Address);
        }
        if gold.form != predicted.form {
            return Err(SyncReason::Form);
        }
        // Addresses strictly increase within a sentence.
        if gold.address <= self.last_address {
            return Err(SyncReason::AddressOrder);
        }
        self.last_address = gold.address;

        self.tally.total += 1;
        if gold.parent == predicted.parent {
            self.tally.correct += 1;
        } else {
            self.derivations.insert(gold.address, gold.parent);
            self.proposals.insert(predicted.address, predicted.parent);
        }
        Ok(())
    }

    /// Classify the deferred mismatches of the current sentence and clear
    /// the tables.
    pub fn finish_sentence(&mut self) {
        debug_assert_eq!(self.derivations.len(), self.proposals.len());

        for (&address, &proposed_parent) in &self.proposals {
            if self.derivations.get(&proposed_parent) == Some(&address) {
                self.tally.reordered += 1;
            } else {
                self.tally.incorrect += 1;
            }
        }

        log::trace!(
            "sentence finished with {} mismatched tokens, running tally {:?}",
            self.proposals.len(),
            self.tally
        );
        self.derivations.clear();
        self.proposals.clear();
        self.last_address = 0;
    }

    /// Counters so far. Mismatches of an unfinished sentence are counted in
    /// `total` but not yet classified.
    pub fn tally(&self) -> ArcTally {
        self.tally
    }

    /// Finish any pending sentence and return the final counters.
    pub fn finish(mut self) -> ArcTally {
        self.finish_sentence();
        self.tally
    }
}

/// Compare two synchronized token streams.
///
/// The streams are consumed in lockstep, one line from each per step. The
/// names are only used in diagnostics.
pub fn compare_streams<G, P>(
    gold: G,
    gold_name: &str,
    predicted: P,
    predicted_name: &str,
) -> Result<ArcTally, CompareError>
where
    G: BufRead,
    P: BufRead,
{
    let mut gold_lines = gold.lines();
    let mut predicted_lines = predicted.lines();
    let mut comparator = SentenceArcComparator::new();
    let mut line_number = 0;

    loop {
        line_number += 1;
        let gold_line = gold_lines.next().transpose()?;
        let predicted_line = predicted_lines.next().transpose()?;

        let (gold_line, predicted_line) = match (gold_line, predicted_line) {
            (None, None) => break,
            (Some(gold_line), Some(predicted_line)) => (gold_line, predicted_line),
            // Trailing blank lines in the longer stream are harmless.
            (Some(line), None) | (None, Some(line)) if is_sentence_boundary(&line) => continue,
            (gold_line, predicted_line) => {
                return Err(CompareError::Sync {
                    reason: SyncReason::StreamLength,
                    line_number,
                    gold: gold_line.unwrap_or_else(|| "<end of file>".to_string()),
                    predicted: predicted_line.unwrap_or_else(|| "<end of file>".to_string()),
                });
            }
        };

        match (
            is_sentence_boundary(&gold_line),
            is_sentence_boundary(&predicted_line),
        ) {
            (true, true) => comparator.finish_sentence(),
            (false, false) => {
                let gold_record =
                    parse_arc_record(&gold_line).map_err(|reason| CompareError::Format {
                        path: gold_name.to_string(),
                        line_number,
                        line: gold_line.clone(),
                        reason,
                    })?;
                let predicted_record =
                    parse_arc_record(&predicted_line).map_err(|reason| CompareError::Format {
                        path: predicted_name.to_string(),
                        line_number,
                        line: predicted_line.clone(),
                        reason,
                    })?;
                comparator
                    .score_pair(&gold_record, &predicted_record)
                    .map_err(|reason| CompareError::Sync {
                        reason,
                        line_number,
                        gold: gold_line.clone(),
                        predicted: predicted_line.clone(),
                    })?;
            }
            _ => {
                return Err(CompareError::Sync {
                    reason: SyncReason::SentenceBoundary,
                    line_number,
                    gold: gold_line,
                    predicted: predicted_line,
                });
            }
        }
    }

    let tally = comparator.finish();
    log::debug!("compared {} lines: {:?}", line_number - 1, tally);
    Ok(tally)
}

/// Compare a gold file against a predicted file.
pub fn compare_files(gold: &Path, predicted: &Path) -> Result<ArcTally, CompareError> {
    let gold_reader = input::open(gold)?;
    let predicted_reader = input::open(predicted)?;
    compare_streams(
        gold_reader,
        &gold.display().to_string(),
        predicted_reader,
        &predicted.display().to_string(),
    )
}
