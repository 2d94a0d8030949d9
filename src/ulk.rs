//! Universal Linguistic Knowledge files.
//!
//! Three parallel files hold one sentence per line: the word forms, the
//! tags, and the dependencies as `parent-child` pairs. Words are numbered
//! from 0 and the root takes the slot after the last word, where a `#`
//! placeholder stands in for it. The files must not end with a newline, so
//! separators are written before every line except the first.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::corpus::DependencyTree;
use crate::error::FilterError;
use crate::types::ROOT_ADDRESS;

const ROOT_PLACEHOLDER: &str = "#";

/// One sentence rendered as the three ULK lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UlkSentence {
    pub words: String,
    pub poses: String,
    pub deps: String,
}

impl UlkSentence {
    /// Render a tree whose addresses are contiguous.
    pub fn from_tree(tree: &DependencyTree) -> Self {
        let root_id = tree.node_count();
        let mut words = Vec::with_capacity(root_id);
        let mut poses = Vec::with_capacity(root_id);
        let mut deps = Vec::with_capacity(root_id);

        for lexeme in tree.tokens() {
            let parent = match lexeme.head {
                Some(ROOT_ADDRESS) | None => root_id,
                Some(head) => head,
            };
            words.push(lexeme.form.as_str());
            poses.push(lexeme.tag.as_str());
            deps.push(format!("{}-{}", parent - 1, lexeme.address - 1));
        }
        words.push(ROOT_PLACEHOLDER);
        poses.push(ROOT_PLACEHOLDER);

        Self {
            words: words.join(" "),
            poses: poses.join(" "),
            deps: deps.join(" "),
        }
    }
}

pub struct UlkWriter<W: Write> {
    words: W,
    poses: W,
    deps: W,
    first_line: bool,
}

impl UlkWriter<BufWriter<File>> {
    /// Create `words_<suffix>`, `poses_<suffix>` and `deps_<suffix>` in `dir`.
    pub fn create(dir: &Path, suffix: &str) -> Result<Self, FilterError> {
        if !dir.is_dir() {
            return Err(FilterError::NotADirectory(dir.display().to_string()));
        }
        let open = |kind: &str| -> io::Result<BufWriter<File>> {
            File::create(dir.join(format!("{kind}_{suffix}"))).map(BufWriter::new)
        };
        Ok(Self::new(open("words")?, open("poses")?, open("deps")?))
    }
}

impl<W: Write> UlkWriter<W> {
    pub fn new(words: W, poses: W, deps: W) -> Self {
        Self {
            words,
            poses,
            deps,
            first_line: true,
        }
    }

    pub fn write_sentence(&mut self, tree: &DependencyTree) -> io::Result<()> {
        let sentence = UlkSentence::from_tree(tree);

        if self.first_line {
            self.first_line = false;
        } else {
            self.words.write_all(b"\n")?;
            self.poses.write_all(b"\n")?;
            self.deps.write_all(b"\n")?;
        }

        self.words.write_all(sentence.words.as_bytes())?;
        self.poses.write_all(sentence.poses.as_bytes())?;
        self.deps.write_all(sentence.deps.as_bytes())?;
        Ok(())
    }

    /// Flush and hand back the three sinks.
    pub fn finish(mut self) -> io::Result<(W, W, W)> {
        self.words.flush()?;
        self.poses.flush()?;
        self.deps.flush()?;
        Ok((self.words, self.poses, self.deps))
    }
}
