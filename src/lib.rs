//! Tooling for dependency-parsing experiments on CoNLL-X treebanks.
//!
//! - [`compare`] scores predicted trees against gold trees, crediting
//!   direction-swapped arcs separately from wrong attachments.
//! - [`filter`] and [`ulk`] prepare corpora: tag deletion, length limits,
//!   sampling, shuffling and Universal Linguistic Knowledge export.
//! - [`train`] drives an external grammar-induction model and writes its
//!   predictions in a format [`compare`] reads back.

pub mod compare;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod input;
pub mod logging;
pub mod record;
pub mod train;
pub mod types;
pub mod ulk;

pub use compare::{compare_files, compare_streams, Accuracy, ArcTally, SentenceArcComparator};
pub use corpus::{read_corpus, read_corpus_file, DependencyTree};
pub use error::{CompareError, CorpusError, FilterError, RecordError, SyncReason, TrainError};
pub use types::{Lexeme, ROOT_ADDRESS};
