/// Address of the artificial root node every sentence attaches to.
pub const ROOT_ADDRESS: usize = 0;

/// One full CoNLL-X row.
///
/// `head` is `None` only for the artificial root node, which is never
/// written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme {
    pub address: usize,
    pub form: String,
    pub lemma: String,
    pub ctag: String,
    pub tag: String,
    pub feats: String,
    pub head: Option<usize>,
    pub rel: String,
    pub phead: String,
    pub pdeprel: String,
}

impl Lexeme {
    /// The artificial root node at address 0.
    pub fn root() -> Self {
        Self {
            address: ROOT_ADDRESS,
            form: String::new(),
            lemma: String::new(),
            ctag: "TOP".to_string(),
            tag: "TOP".to_string(),
            feats: String::new(),
            head: None,
            rel: String::new(),
            phead: String::new(),
            pdeprel: String::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.head.is_none()
    }

    /// Render the 10-column CoNLL-X line, without the trailing newline.
    pub fn to_conll_line(&self) -> String {
        let head = self.head.unwrap_or(ROOT_ADDRESS);
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.address,
            self.form,
            self.lemma,
            self.ctag,
            self.tag,
            self.feats,
            head,
            self.rel,
            self.phead,
            self.pdeprel,
        )
    }
}
