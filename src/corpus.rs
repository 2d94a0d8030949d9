//! CoNLL-X corpora as dependency trees.
//!
//! A tree always contains the artificial root at address 0, so
//! [`DependencyTree::node_count`] is one more than the number of words.

use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::path::Path;

use crate::error::CorpusError;
use crate::input;
use crate::record::CONLLX_FIELDS;
use crate::types::{Lexeme, ROOT_ADDRESS};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyTree {
    nodes: BTreeMap<usize, Lexeme>,
}

impl Default for DependencyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyTree {
    /// A tree holding only the root.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(ROOT_ADDRESS, Lexeme::root());
        Self { nodes }
    }

    /// Build a tree from word lexemes; the root is added automatically.
    pub fn from_lexemes(lexemes: impl IntoIterator<Item = Lexeme>) -> Self {
        let mut tree = Self::new();
        for lexeme in lexemes {
            tree.nodes.insert(lexeme.address, lexeme);
        }
        tree
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of words, root excluded.
    pub fn token_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn get(&self, address: usize) -> Option<&Lexeme> {
        self.nodes.get(&address)
    }

    /// Words in address order, root excluded.
    pub fn tokens(&self) -> impl Iterator<Item = &Lexeme> {
        self.nodes.values().filter(|lexeme| !lexeme.is_root())
    }

    /// Remove the node at `address`, reattaching its children to its head.
    ///
    /// Returns `false` if there is no such node or it is the root.
    pub fn kill_node(&mut self, address: usize) -> bool {
        let new_head = match self.nodes.get(&address).and_then(|lexeme| lexeme.head) {
            Some(head) => head,
            None => return false,
        };

        for lexeme in self.nodes.values_mut() {
            if lexeme.head == Some(address) {
                // A cycle through the killed node would otherwise become a self-loop.
                let head = if lexeme.address == new_head {
                    ROOT_ADDRESS
                } else {
                    new_head
                };
                lexeme.head = Some(head);
            }
        }
        self.nodes.remove(&address);
        true
    }

    /// Kill every word whose `POSTAG` is one of `tags`, then renumber.
    ///
    /// Returns the number of removed words.
    pub fn kill_tags(&mut self, tags: &[String]) -> usize {
        let mut killed = 0;
        for tag in tags {
            let doomed: Vec<usize> = self
                .tokens()
                .filter(|lexeme| &lexeme.tag == tag)
                .map(|lexeme| lexeme.address)
                .collect();
            for address in doomed {
                if self.kill_node(address) {
                    killed += 1;
                }
            }
        }
        self.renumber();
        killed
    }

    /// Make addresses contiguous again, keeping their relative order.
    ///
    /// A word whose head no longer exists is attached to the root.
    pub fn renumber(&mut self) {
        let mapping: HashMap<usize, usize> = self
            .nodes
            .keys()
            .enumerate()
            .map(|(new_address, &old_address)| (old_address, new_address))
            .collect();

        let old_nodes = std::mem::take(&mut self.nodes);
        for (_, mut lexeme) in old_nodes {
            lexeme.address = mapping[&lexeme.address];
            lexeme.head = lexeme
                .head
                .map(|head| mapping.get(&head).copied().unwrap_or(ROOT_ADDRESS));
            self.nodes.insert(lexeme.address, lexeme);
        }
    }

    /// The sentence as 10-column CoNLL-X, terminated by a blank line.
    pub fn to_conll(&self) -> String {
        let mut text = String::new();
        for lexeme in self.tokens() {
            text.push_str(&lexeme.to_conll_line());
            text.push('\n');
        }
        text.push('\n');
        text
    }
}

/// Read every sentence of a CoNLL-X stream.
pub fn read_corpus<R: BufRead>(reader: R, name: &str) -> Result<Vec<DependencyTree>, CorpusError> {
    let mut sentences = Vec::new();
    let mut builder = SentenceBuilder::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            if let Some(tree) = builder.finish(name)? {
                sentences.push(tree);
            }
            continue;
        }
        builder.push(line, name, line_number)?;
    }
    if let Some(tree) = builder.finish(name)? {
        sentences.push(tree);
    }

    log::debug!("read {} sentences from {}", sentences.len(), name);
    Ok(sentences)
}

/// Read every sentence of a CoNLL-X file.
pub fn read_corpus_file(path: &Path) -> Result<Vec<DependencyTree>, CorpusError> {
    let reader = input::open(path)?;
    read_corpus(reader, &path.display().to_string())
}

#[derive(Default)]
struct SentenceBuilder {
    lexemes: Vec<Lexeme>,
    /// Line of each lexeme, for head diagnostics.
    lines: Vec<usize>,
}

impl SentenceBuilder {
    fn push(&mut self, line: &str, name: &str, line_number: usize) -> Result<(), CorpusError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != CONLLX_FIELDS {
            return Err(CorpusError::FieldCount {
                path: name.to_string(),
                line_number,
                found: fields.len(),
            });
        }

        let number = |column: &'static str, value: &str| {
            value.parse::<usize>().map_err(|_| CorpusError::InvalidNumber {
                path: name.to_string(),
                line_number,
                column,
                value: value.to_string(),
            })
        };
        let address = number("ID", fields[0])?;
        let head = number("HEAD", fields[6])?;

        if head == address {
            return Err(CorpusError::SelfLoop {
                path: name.to_string(),
                line_number,
                address,
            });
        }

        let expected = self.lexemes.len() + 1;
        if address != expected {
            return Err(CorpusError::Address {
                path: name.to_string(),
                line_number,
                expected,
                found: address,
            });
        }

        self.lexemes.push(Lexeme {
            address,
            form: fields[1].to_string(),
            lemma: fields[2].to_string(),
            ctag: fields[3].to_string(),
            tag: fields[4].to_string(),
            feats: fields[5].to_string(),
            head: Some(head),
            rel: fields[7].to_string(),
            phead: fields[8].to_string(),
            pdeprel: fields[9].to_string(),
        });
        self.lines.push(line_number);
        Ok(())
    }

    fn finish(&mut self, name: &str) -> Result<Option<DependencyTree>, CorpusError> {
        if self.lexemes.is_empty() {
            return Ok(None);
        }

        let tokens = self.lexemes.len();
        for (lexeme, &line_number) in self.lexemes.iter().zip(&self.lines) {
            if let Some(head) = lexeme.head.filter(|&head| head > tokens) {
                return Err(CorpusError::DanglingHead {
                    path: name.to_string(),
                    line_number,
                    head,
                    tokens,
                });
            }
        }

        self.lines.clear();
        Ok(Some(DependencyTree::from_lexemes(self.lexemes.drain(..))))
    }
}
