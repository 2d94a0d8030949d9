//! Driving an external grammar-induction model.
//!
//! The model itself is opaque: anything implementing [`GrammarInducer`] can
//! be trained one iteration at a time. The driver keeps a copy of the best
//! model by directed accuracy, tolerates a few non-improving iterations to
//! show how accuracy develops past the optimum, and finally writes the best
//! model's parses of a test corpus in the 9-column prediction shape.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::corpus::{read_corpus_file, DependencyTree};
use crate::error::TrainError;

/// Evaluation the model reports after an iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub words: usize,
    pub directed: f64,
    pub undirected: f64,
}

impl Evaluation {
    /// Worse than any real evaluation.
    pub const UNSET: Evaluation = Evaluation {
        words: 0,
        directed: -1.0,
        undirected: -1.0,
    };
}

/// One predicted attachment. Indices are 0-based; `parent` is `None` for
/// words attached to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub index: usize,
    pub parent: Option<usize>,
}

pub trait GrammarInducer: Clone {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run one training iteration followed by an evaluation.
    fn train_step(&mut self) -> Result<Evaluation, Self::Error>;

    /// Parse a sentence given only its tags.
    fn parse(&self, tags: &[&str]) -> Result<Vec<Link>, Self::Error>;

    /// Free-form statistics, such as over- and under-proposed arcs.
    fn eval_stats(&self) -> String {
        String::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub max_iterations: usize,
    /// Non-improving iterations allowed before stopping.
    pub overtrain_limit: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_iterations: 32,
            overtrain_limit: 3,
        }
    }
}

impl TrainingConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TrainError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, TrainError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub iteration: usize,
    pub words: usize,
    pub directed: f64,
    pub undirected: f64,
    pub improved: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    pub entries: Vec<HistoryEntry>,
}

impl TrainingHistory {
    /// Write the history as a tab-separated table with a header row.
    pub fn write_tsv<W: Write>(&self, out: W) -> Result<(), TrainError> {
        let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
        for entry in &self.entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }
}

pub struct TrainingOutcome<M> {
    pub best_model: M,
    pub best_evaluation: Evaluation,
    pub history: TrainingHistory,
}

/// Train `model` until the iteration or overtraining budget runs out.
pub fn train<M: GrammarInducer>(
    mut model: M,
    config: &TrainingConfig,
) -> Result<TrainingOutcome<M>, TrainError> {
    let mut best_model = model.clone();
    let mut best_evaluation = Evaluation::UNSET;
    let mut history = TrainingHistory::default();
    let mut overtrain_budget = config.overtrain_limit;

    for iteration in 1..=config.max_iterations {
        let evaluation = model.train_step().map_err(TrainError::model)?;
        let improved = evaluation.directed >= best_evaluation.directed;
        log::info!(
            "iteration {}: directed {:.4}, undirected {:.4} over {} words",
            iteration,
            evaluation.directed,
            evaluation.undirected,
            evaluation.words
        );
        history.entries.push(HistoryEntry {
            iteration,
            words: evaluation.words,
            directed: evaluation.directed,
            undirected: evaluation.undirected,
            improved,
        });

        if improved {
            best_evaluation = evaluation;
            best_model = model.clone();
        } else {
            overtrain_budget = overtrain_budget.saturating_sub(1);
            if overtrain_budget == 0 {
                log::info!("accuracy kept decreasing, stopping after iteration {}", iteration);
                break;
            }
        }
    }

    let stats = best_model.eval_stats();
    if !stats.is_empty() {
        log::info!("best model statistics:\n{}", stats);
    }

    Ok(TrainingOutcome {
        best_model,
        best_evaluation,
        history,
    })
}

/// Parse every sentence of `corpus` and write the predicted trees.
///
/// Each word becomes `ID FORM _ _ POS HEAD _ _ _` with 1-based ids and the
/// root at 0; every sentence ends with a blank line. Returns the number of
/// sentences written.
pub fn write_predictions<M, W>(
    model: &M,
    corpus: &[DependencyTree],
    out: &mut W,
) -> Result<usize, TrainError>
where
    M: GrammarInducer,
    W: Write,
{
    for (sentence, tree) in corpus.iter().enumerate() {
        let words: Vec<(&str, &str)> = tree
            .tokens()
            .map(|lexeme| (lexeme.form.as_str(), lexeme.tag.as_str()))
            .collect();
        let tags: Vec<&str> = words.iter().map(|&(_, tag)| tag).collect();
        let links = model.parse(&tags).map_err(TrainError::model)?;

        if links.len() != words.len() {
            return Err(TrainError::LinkCount {
                sentence,
                expected: words.len(),
                found: links.len(),
            });
        }

        for (position, (link, (form, tag))) in links.iter().zip(&words).enumerate() {
            if link.index != position {
                return Err(TrainError::LinkOrder {
                    sentence,
                    position,
                    found: link.index,
                });
            }
            let parent = link.parent.map_or(0, |parent| parent + 1);
            writeln!(out, "{}\t{}\t_\t_\t{}\t{}\t_\t_\t_", position + 1, form, tag, parent)?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(corpus.len())
}

/// Paths of the three corpora a training run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingFiles {
    pub train: PathBuf,
    pub heldout: PathBuf,
    pub test: PathBuf,
}

impl TrainingFiles {
    /// Either one file in all three roles, or TRAIN HELDOUT TEST.
    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, TrainError> {
        match paths {
            [single] => Ok(Self {
                train: single.clone(),
                heldout: single.clone(),
                test: single.clone(),
            }),
            [train, heldout, test] => Ok(Self {
                train: train.clone(),
                heldout: heldout.clone(),
                test: test.clone(),
            }),
            _ => Err(TrainError::FileCount(paths.len())),
        }
    }
}

/// Loaded corpora; a file used in several roles is read once and shared.
#[derive(Debug, Clone)]
pub struct TrainingCorpora {
    pub train: Rc<Vec<DependencyTree>>,
    pub heldout: Rc<Vec<DependencyTree>>,
    pub test: Rc<Vec<DependencyTree>>,
}

impl TrainingCorpora {
    pub fn load(files: &TrainingFiles) -> Result<Self, TrainError> {
        let train = Rc::new(read_corpus_file(&files.train)?);
        let load_or_share = |path: &Path| -> Result<Rc<Vec<DependencyTree>>, TrainError> {
            if path == files.train {
                Ok(Rc::clone(&train))
            } else {
                Ok(Rc::new(read_corpus_file(path)?))
            }
        };
        let heldout = load_or_share(&files.heldout)?;
        let test = load_or_share(&files.test)?;
        Ok(Self {
            train,
            heldout,
            test,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::read_corpus;
    use std::fmt;

    #[derive(Debug)]
    struct ScriptError;

    impl fmt::Display for ScriptError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "script exhausted")
        }
    }

    impl std::error::Error for ScriptError {}

    /// Replays a fixed list of directed accuracies and attaches every word
    /// to its left neighbour.
    #[derive(Clone)]
    struct ScriptedModel {
        script: Vec<f64>,
        steps: usize,
        link_shift: usize,
    }

    impl ScriptedModel {
        fn new(script: &[f64]) -> Self {
            Self {
                script: script.to_vec(),
                steps: 0,
                link_shift: 0,
            }
        }
    }

    impl GrammarInducer for ScriptedModel {
        type Error = ScriptError;

        fn train_step(&mut self) -> Result<Evaluation, ScriptError> {
            let directed = *self.script.get(self.steps).ok_or(ScriptError)?;
            self.steps += 1;
            Ok(Evaluation {
                words: 10,
                directed,
                undirected: directed / 2.0,
            })
        }

        fn parse(&self, tags: &[&str]) -> Result<Vec<Link>, ScriptError> {
            Ok((0..tags.len())
                .map(|index| Link {
                    index: index + self.link_shift,
                    parent: index.checked_sub(1),
                })
                .collect())
        }

        fn eval_stats(&self) -> String {
            format!("steps: {}", self.steps)
        }
    }

    const CORPUS: &str = "\
1\tThe\tthe\tD\tDT\t_\t2\t_\t_\t_
2\tcat\tcat\tN\tNN\t_\t0\t_\t_\t_

1\tHi\thi\tI\tUH\t_\t0\t_\t_\t_
";

    #[test]
    fn test_runs_all_iterations_while_improving() {
        let model = ScriptedModel::new(&[0.1, 0.2, 0.3]);
        let config = TrainingConfig {
            max_iterations: 3,
            overtrain_limit: 3,
        };
        let outcome = train(model, &config).unwrap();
        assert_eq!(outcome.history.entries.len(), 3);
        assert_eq!(outcome.best_model.steps, 3);
        assert_eq!(outcome.best_evaluation.directed, 0.3);
    }

    #[test]
    fn test_stops_after_overtrain_limit_and_keeps_best() {
        let model = ScriptedModel::new(&[0.2, 0.5, 0.4, 0.3, 0.2, 0.1, 0.9]);
        let outcome = train(model, &TrainingConfig::default()).unwrap();
        // Three decreasing iterations after the best one, then stop.
        assert_eq!(outcome.history.entries.len(), 5);
        assert_eq!(outcome.best_model.steps, 2);
        assert_eq!(outcome.best_evaluation.directed, 0.5);
        assert!(!outcome.history.entries[4].improved);
    }

    #[test]
    fn test_equal_accuracy_counts_as_improvement() {
        let model = ScriptedModel::new(&[0.4, 0.4]);
        let config = TrainingConfig {
            max_iterations: 2,
            overtrain_limit: 1,
        };
        let outcome = train(model, &config).unwrap();
        assert_eq!(outcome.best_model.steps, 2);
        assert!(outcome.history.entries.iter().all(|entry| entry.improved));
    }

    #[test]
    fn test_model_failure_is_reported() {
        let model = ScriptedModel::new(&[0.1]);
        let config = TrainingConfig {
            max_iterations: 2,
            overtrain_limit: 3,
        };
        let error = train(model, &config).err().unwrap();
        assert_eq!(error.to_string(), "model error: script exhausted");
    }

    #[test]
    fn test_writes_predictions_with_shifted_ids() {
        let corpus = read_corpus(CORPUS.as_bytes(), "corpus").unwrap();
        let model = ScriptedModel::new(&[]);
        let mut out = Vec::new();
        let written = write_predictions(&model, &corpus, &mut out).unwrap();
        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1\tThe\t_\t_\tDT\t0\t_\t_\t_\n\
             2\tcat\t_\t_\tNN\t1\t_\t_\t_\n\
             \n\
             1\tHi\t_\t_\tUH\t0\t_\t_\t_\n\
             \n"
        );
    }

    #[test]
    fn test_predictions_compare_against_gold() {
        let corpus = read_corpus(CORPUS.as_bytes(), "corpus").unwrap();
        let mut out = Vec::new();
        write_predictions(&ScriptedModel::new(&[]), &corpus, &mut out).unwrap();

        let tally =
            crate::compare::compare_streams(CORPUS.as_bytes(), "gold", out.as_slice(), "pred")
                .unwrap();
        assert_eq!(tally.total, 3);
        assert_eq!(tally.correct, 1);
        assert_eq!(tally.reordered, 1);
        assert_eq!(tally.incorrect, 1);
    }

    #[test]
    fn test_rejects_misordered_links() {
        let corpus = read_corpus(CORPUS.as_bytes(), "corpus").unwrap();
        let mut model = ScriptedModel::new(&[]);
        model.link_shift = 1;
        let error = write_predictions(&model, &corpus, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            error,
            TrainError::LinkOrder {
                sentence: 0,
                position: 0,
                found: 1
            }
        ));
    }

    #[test]
    fn test_config_from_yaml_fills_defaults() {
        let config = TrainingConfig::from_yaml_str("overtrain_limit: 5\n").unwrap();
        assert_eq!(config.max_iterations, 32);
        assert_eq!(config.overtrain_limit, 5);
        assert!(TrainingConfig::from_yaml_str("max_iterations: many").is_err());
    }

    #[test]
    fn test_history_as_tsv() {
        let model = ScriptedModel::new(&[0.25, 0.5]);
        let config = TrainingConfig {
            max_iterations: 2,
            overtrain_limit: 3,
        };
        let outcome = train(model, &config).unwrap();
        let mut out = Vec::new();
        outcome.history.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "iteration\twords\tdirected\tundirected\timproved");
        assert_eq!(lines[1], "1\t10\t0.25\t0.125\ttrue");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_training_files_roles() {
        let single = TrainingFiles::from_paths(&[PathBuf::from("all.conll")]).unwrap();
        assert_eq!(single.train, single.heldout);
        assert_eq!(single.train, single.test);

        let three = TrainingFiles::from_paths(&[
            PathBuf::from("train.conll"),
            PathBuf::from("heldout.conll"),
            PathBuf::from("test.conll"),
        ])
        .unwrap();
        assert_eq!(three.test, PathBuf::from("test.conll"));

        assert!(matches!(
            TrainingFiles::from_paths(&[PathBuf::from("a"), PathBuf::from("b")]),
            Err(TrainError::FileCount(2))
        ));
    }

    #[test]
    fn test_single_file_is_read_once_and_shared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.conll");
        std::fs::write(&path, CORPUS).unwrap();

        let files = TrainingFiles::from_paths(&[path]).unwrap();
        let corpora = TrainingCorpora::load(&files).unwrap();
        assert!(Rc::ptr_eq(&corpora.train, &corpora.test));
        assert!(Rc::ptr_eq(&corpora.train, &corpora.heldout));
        assert_eq!(corpora.test.len(), 2);
    }
}
