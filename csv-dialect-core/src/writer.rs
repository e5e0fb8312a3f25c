use std::error;
use std::fmt;

use crate::dialect::{Dialect, QuoteStyle};

/// An error that occurs when a field can't be represented in a dialect.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteErrorKind {
    /// An unquoted field contains a special character, but the dialect has
    /// no escape character.
    NoEscapeChar,
    /// A quoted field contains a quote, but the dialect neither doubles
    /// quotes nor has an escape character.
    UnescapedQuote,
    /// A record consisting of a single empty field can't be written
    /// without quotes: it would read back as an empty record.
    SingleEmptyField,
}

impl fmt::Display for WriteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            WriteErrorKind::NoEscapeChar => {
                write!(f, "need to escape, but no escapechar set")
            }
            WriteErrorKind::UnescapedQuote => write!(
                f,
                "single quotechar found in non-doublequote, \
                 non-escaped, quoted field"
            ),
            WriteErrorKind::SingleEmptyField => {
                write!(f, "single empty field record must be quoted")
            }
        }
    }
}

impl error::Error for WriteErrorKind {}

/// How a field should be treated by the quoting discipline.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// Text data.
    Text,
    /// The canonical text form of a number.
    Numeric,
}

/// A writer for CSV fields.
///
/// This writer appends quoted and escaped fields to a caller provided
/// `String`, keeping track of whether a delimiter is needed before the next
/// field.
#[derive(Clone, Debug)]
pub struct Writer {
    dialect: Dialect,
    first_field_in_record: bool,
}

impl Writer {
    /// Creates a new CSV field writer for the given dialect.
    pub fn new(dialect: Dialect) -> Writer {
        Writer { dialect, first_field_in_record: true }
    }

    /// The dialect of this writer.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Forget about any partially written record.
    pub fn reset(&mut self) {
        self.first_field_in_record = true;
    }

    /// Append a single field to `output`, preceded by a delimiter if it
    /// isn't the first field of the record.
    ///
    /// `only` must be true when this field is the only one in its record.
    /// On error, `output` may contain a partial field; callers are expected
    /// to discard the record.
    pub fn write_field(
        &mut self,
        field: &str,
        kind: FieldKind,
        only: bool,
        output: &mut String,
    ) -> Result<(), WriteErrorKind> {
        if !self.first_field_in_record {
            output.push(self.dialect.delimiter());
        }
        self.first_field_in_record = false;

        let quote = match self.should_quote(field, kind, only)? {
            None => return self.write_unquoted(field, output),
            Some(quote) => quote,
        };
        output.reserve(field.len() + 2);
        output.push(quote);
        for c in field.chars() {
            if c == quote {
                if self.dialect.doublequote() {
                    output.push(quote);
                } else if let Some(escape) = self.dialect.escapechar() {
                    output.push(escape);
                } else {
                    return Err(WriteErrorKind::UnescapedQuote);
                }
            } else if Some(c) == self.dialect.escapechar() {
                output.push(c);
            }
            output.push(c);
        }
        output.push(quote);
        Ok(())
    }

    /// Append the record terminator to `output`.
    pub fn write_term(&mut self, output: &mut String) {
        output.push_str(self.dialect.lineterminator());
        self.first_field_in_record = true;
    }

    /// Decide whether the field gets quoted. Returns the quote to use.
    fn should_quote(
        &self,
        field: &str,
        kind: FieldKind,
        only: bool,
    ) -> Result<Option<char>, WriteErrorKind> {
        let quote = self.dialect.quotechar();
        let lone_empty = only && field.is_empty();
        Ok(match self.dialect.quoting() {
            QuoteStyle::Always => quote,
            QuoteStyle::NonNumeric => match kind {
                FieldKind::Text => quote,
                FieldKind::Numeric => None,
            },
            QuoteStyle::Necessary => {
                if lone_empty || self.needs_quotes(field) {
                    quote
                } else {
                    None
                }
            }
            QuoteStyle::Never => {
                if lone_empty {
                    return Err(WriteErrorKind::SingleEmptyField);
                }
                None
            }
        })
    }

    fn needs_quotes(&self, field: &str) -> bool {
        (self.dialect.skipinitialspace() && field.starts_with(' '))
            || field.chars().any(|c| self.dialect.is_special(c))
    }

    fn write_unquoted(
        &self,
        field: &str,
        output: &mut String,
    ) -> Result<(), WriteErrorKind> {
        let skip_space = self.dialect.skipinitialspace();
        for (i, c) in field.char_indices() {
            if self.dialect.is_special(c) || (i == 0 && c == ' ' && skip_space)
            {
                match self.dialect.escapechar() {
                    None => return Err(WriteErrorKind::NoEscapeChar),
                    Some(escape) => output.push(escape),
                }
            }
            output.push(c);
        }
        Ok(())
    }
}
