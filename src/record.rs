//! The (address, form, parent) view of one tabular token line.
//!
//! Two fixed shapes are accepted, told apart by their field count:
//!
//! | fields | layout                                                  | head column |
//! |--------|---------------------------------------------------------|-------------|
//! | 10     | `ID FORM LEMMA CPOSTAG POSTAG FEATS HEAD DEPREL PHEAD PDEPREL` | 7 |
//! | 9      | `ID FORM _ _ POS HEAD _ _ _`                            | 6           |
//!
//! The 10-field shape is CoNLL-X as treebanks and `filter_conll` write it;
//! the 9-field shape is what the training driver emits. Every field must be
//! non-empty, and `ID` and `HEAD` must be plain decimal integers. Downstream
//! tooling depends on these positions, so they must not drift.

use crate::error::RecordError;

pub const CONLLX_FIELDS: usize = 10;
pub const CONLLX_HEAD_INDEX: usize = 6;

pub const PREDICTED_FIELDS: usize = 9;
pub const PREDICTED_HEAD_INDEX: usize = 5;

const ADDRESS_INDEX: usize = 0;
const FORM_INDEX: usize = 1;

/// One token as the comparator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcRecord<'a> {
    pub address: usize,
    pub form: &'a str,
    pub parent: usize,
}

/// True for the blank line that separates sentences.
pub fn is_sentence_boundary(line: &str) -> bool {
    line.trim_end_matches(|c| c == '\r' || c == '\n').is_empty()
}

/// Parse one line (with or without its line terminator) into an [`ArcRecord`].
pub fn parse_arc_record(line: &str) -> Result<ArcRecord<'_>, RecordError> {
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    let fields: Vec<&str> = line.split('\t').collect();

    let head_index = match fields.len() {
        CONLLX_FIELDS => CONLLX_HEAD_INDEX,
        PREDICTED_FIELDS => PREDICTED_HEAD_INDEX,
        found => return Err(RecordError::FieldCount(found)),
    };

    if let Some(empty) = fields.iter().position(|field| field.is_empty()) {
        return Err(RecordError::EmptyField(empty + 1));
    }

    Ok(ArcRecord {
        address: parse_number(fields[ADDRESS_INDEX], ADDRESS_INDEX)?,
        form: fields[FORM_INDEX],
        parent: parse_number(fields[head_index], head_index)?,
    })
}

fn parse_number(field: &str, index: usize) -> Result<usize, RecordError> {
    // `usize::from_str` would also take a leading '+'.
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RecordError::NotANumber(index + 1));
    }
    // All digits, so parsing can only fail on overflow.
    field
        .parse()
        .map_err(|_| RecordError::OutOfRange(index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_conllx_line() {
        let record = parse_arc_record("2\tcat\tcat\tN\tNN\t_\t0\tSb\t_\t_\n").unwrap();
        assert_eq!(
            record,
            ArcRecord {
                address: 2,
                form: "cat",
                parent: 0
            }
        );
    }

    #[test]
    fn test_parses_predicted_line() {
        let record = parse_arc_record("1\tthe\t_\t_\tDT\t2\t_\t_\t_").unwrap();
        assert_eq!(record.address, 1);
        assert_eq!(record.form, "the");
        assert_eq!(record.parent, 2);
    }

    #[test]
    fn test_tolerates_carriage_return() {
        let record = parse_arc_record("1\tthe\t_\t_\tDT\t2\t_\t_\t_\r\n").unwrap();
        assert_eq!(record.parent, 2);
    }

    #[test]
    fn test_rejects_wrong_field_count() {
        assert_eq!(
            parse_arc_record("1\tthe\t2"),
            Err(RecordError::FieldCount(3))
        );
        assert_eq!(
            parse_arc_record("1\tthe\t_\t_\t_\t_\t2\t_\t_\t_\t_"),
            Err(RecordError::FieldCount(11))
        );
    }

    #[test]
    fn test_rejects_empty_field() {
        assert_eq!(
            parse_arc_record("1\t\t_\t_\tDT\t2\t_\t_\t_"),
            Err(RecordError::EmptyField(2))
        );
    }

    #[test]
    fn test_rejects_non_numeric_address_and_head() {
        assert_eq!(
            parse_arc_record("x\tthe\t_\t_\tDT\t2\t_\t_\t_"),
            Err(RecordError::NotANumber(1))
        );
        assert_eq!(
            parse_arc_record("1\tthe\t_\t_\tDT\t+2\t_\t_\t_"),
            Err(RecordError::NotANumber(6))
        );
        assert_eq!(
            parse_arc_record("1\tthe\tthe\tD\tDT\t_\t_\tAtr\t_\t_"),
            Err(RecordError::NotANumber(7))
        );
    }

    #[test]
    fn test_rejects_overflowing_number() {
        assert_eq!(
            parse_arc_record("1\tthe\t_\t_\tDT\t99999999999999999999999\t_\t_\t_"),
            Err(RecordError::OutOfRange(6))
        );
    }

    #[test]
    fn test_sentence_boundary() {
        assert!(is_sentence_boundary(""));
        assert!(is_sentence_boundary("\n"));
        assert!(is_sentence_boundary("\r\n"));
        assert!(!is_sentence_boundary("1\tthe"));
    }
}
