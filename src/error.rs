//! Error types shared by the comparison, corpus, filter and training code.

use std::fmt;
use std::io;

use thiserror::Error;

/// Why a tabular token line was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    #[error("expected 9 or 10 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("field {0} is empty")]
    EmptyField(usize),

    #[error("field {0} is not a non-negative integer")]
    NotANumber(usize),

    #[error("field {0} is out of range")]
    OutOfRange(usize),
}

/// Which correspondence between the gold and predicted streams broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncReason {
    Address,
    Form,
    AddressOrder,
    SentenceBoundary,
    StreamLength,
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncReason::Address => write!(f, "Addresses"),
            SyncReason::Form => write!(f, "Forms"),
            SyncReason::AddressOrder => write!(f, "Address order"),
            SyncReason::SentenceBoundary => write!(f, "Sentence boundaries"),
            SyncReason::StreamLength => write!(f, "Stream lengths"),
        }
    }
}

/// Failures of a gold/predicted comparison. All of them abort the run.
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("malformed line {line_number} in {path}: {reason}\n\t'{line}'")]
    Format {
        path: String,
        line_number: usize,
        line: String,
        reason: RecordError,
    },

    #[error("{reason} on lines {line_number}\n\tGold: '{gold}'\n\tPred: '{predicted}'\ndon't match")]
    Sync {
        reason: SyncReason,
        line_number: usize,
        gold: String,
        predicted: String,
    },

    #[error("accuracy is undefined: no tokens were scored")]
    DivisionUndefined,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures while reading a CoNLL-X corpus.
#[derive(Error, Debug)]
pub enum CorpusError {
    #[error("{path}:{line_number}: expected 10 tab-separated fields, found {found}")]
    FieldCount {
        path: String,
        line_number: usize,
        found: usize,
    },

    #[error("{path}:{line_number}: invalid {column} value '{value}'")]
    InvalidNumber {
        path: String,
        line_number: usize,
        column: &'static str,
        value: String,
    },

    #[error("{path}:{line_number}: expected address {expected}, found {found}")]
    Address {
        path: String,
        line_number: usize,
        expected: usize,
        found: usize,
    },

    #[error("{path}:{line_number}: word {address} is its own head")]
    SelfLoop {
        path: String,
        line_number: usize,
        address: usize,
    },

    #[error("{path}:{line_number}: head {head} points outside a sentence of {tokens} tokens")]
    DanglingHead {
        path: String,
        line_number: usize,
        head: usize,
        tokens: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures of the corpus filter outside of reading the corpus itself.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Universal Knowledge path '{0}' is not a directory")]
    NotADirectory(String),

    #[error("a corpus suffix is required to name the Universal Knowledge files")]
    MissingCorpusSuffix,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failures of the training driver.
#[derive(Error, Debug)]
pub enum TrainError {
    #[error("expected 1 or 3 corpus files (TRAIN [HELDOUT TEST]), got {0}")]
    FileCount(usize),

    #[error("sentence {sentence}: model predicted {found} links for {expected} words")]
    LinkCount {
        sentence: usize,
        expected: usize,
        found: usize,
    },

    #[error("sentence {sentence}: link at position {position} belongs to word {found}")]
    LinkOrder {
        sentence: usize,
        position: usize,
        found: usize,
    },

    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("corpus error: {0}")]
    Corpus(#[from] CorpusError),

    #[error("configuration error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("history serialization error: {0}")]
    History(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TrainError {
    pub fn model<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TrainError::Model(Box::new(error))
    }
}
