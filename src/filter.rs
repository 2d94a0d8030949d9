//! Treebank filtering: tag deletion, length limits, sampling and shuffling.
//!
//! Steps run in a fixed order. Tags are killed before lengths are checked,
//! so a sentence can become short enough by losing its punctuation. Length
//! filtering and shuffling happen before the count cap, otherwise sentences
//! past the cap could never be drawn. Sampling sets its own size.

use std::io::Write;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::corpus::DependencyTree;
use crate::ulk::UlkWriter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Output at most this many sentences (or draw this many when sampling).
    pub max_sentence_count: Option<usize>,
    /// Keep sentences whose node count, root included, is at most this.
    pub max_sentence_length: Option<usize>,
    /// Delete words carrying any of these tags.
    pub kill_tags: Vec<String>,
    pub random_order: bool,
    /// Draw with replacement instead of shuffling and capping.
    pub sample: bool,
}

impl FilterOptions {
    /// Human-readable summary of the effective settings, one line each.
    pub fn describe(&self) -> Vec<String> {
        let enabled = |flag: bool| if flag { "enabled" } else { "disabled" };
        vec![
            match self.max_sentence_length {
                Some(length) => format!("Sentence length < {length}"),
                None => "Sentence length not restricted".to_string(),
            },
            match self.max_sentence_count {
                Some(count) => format!("Sentence count restricted to the first {count}"),
                None => "Sentence count not restricted".to_string(),
            },
            format!("Shuffling {}", enabled(self.random_order)),
            format!("Sampling {}", enabled(self.sample)),
            if self.kill_tags.is_empty() {
                "Killing no tags".to_string()
            } else {
                format!("Killing tags {}", self.kill_tags.join(", "))
            },
        ]
    }
}

/// Apply every transformation in `options` to the corpus.
pub fn apply<R>(
    mut sentences: Vec<DependencyTree>,
    options: &FilterOptions,
    rng: &mut R,
) -> Vec<DependencyTree>
where
    R: Rng + ?Sized,
{
    if !options.kill_tags.is_empty() {
        let killed: usize = sentences
            .iter_mut()
            .map(|tree| tree.kill_tags(&options.kill_tags))
            .sum();
        log::debug!("killed {} words", killed);
    }

    if let Some(max_length) = options.max_sentence_length {
        sentences.retain(|tree| tree.node_count() <= max_length);
        log::debug!("{} sentences within the length limit", sentences.len());
    }

    if options.sample {
        let count = options.max_sentence_count.unwrap_or(sentences.len());
        return (0..count)
            .filter_map(|_| sentences.choose(rng).cloned())
            .collect();
    }

    if options.random_order {
        sentences.shuffle(rng);
    }
    if let Some(max_count) = options.max_sentence_count {
        sentences.truncate(max_count);
    }
    sentences
}

/// Write the non-empty sentences as CoNLL-X, mirroring them into ULK files.
///
/// Returns the number of sentences written.
pub fn write_filtered<W, U>(
    sentences: &[DependencyTree],
    out: &mut W,
    mut ulk: Option<&mut UlkWriter<U>>,
) -> std::io::Result<usize>
where
    W: Write,
    U: Write,
{
    let mut written = 0;
    for tree in sentences {
        // Everything was killed.
        if tree.token_count() == 0 {
            continue;
        }
        out.write_all(tree.to_conll().as_bytes())?;
        if let Some(writer) = ulk.as_deref_mut() {
            writer.write_sentence(tree)?;
        }
        written += 1;
    }
    out.flush()?;
    Ok(written)
}
