use std::error;
use std::fmt;

use crate::dialect::{Dialect, QuoteStyle};

/// The state of the CSV parser between two characters.
///
/// A parser starts in `StartRecord` and returns to it whenever a logical
/// record has been completed. Any other state at the end of a physical line
/// means the record continues on the next line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// Nothing of the current record has been seen.
    StartRecord,
    /// At the beginning of a field, after a delimiter.
    StartField,
    /// The previous character was an escape outside of quotes.
    EscapedChar,
    /// An escaped line break was added to an unquoted field. The end of the
    /// physical line that follows doesn't end the record.
    AfterEscapedCrnl,
    /// Inside an unquoted field.
    InField,
    /// Inside a quoted field.
    InQuotedField,
    /// The previous character was an escape inside of quotes.
    EscapeInQuotedField,
    /// The previous character was a quote inside of a quoted field. It
    /// either closes the field or starts a doubled quote.
    QuoteInQuotedField,
    /// A record ended on `\r` or `\n`; only line breaks may follow until
    /// the physical line ends.
    EatCrnl,
}

impl Default for State {
    fn default() -> State {
        State::StartRecord
    }
}

/// A single unit of input to the parser.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Input {
    /// A character of the current physical line.
    Char(char),
    /// The end of the current physical line. This is delivered once after
    /// the last character of every line.
    EndOfLine,
}

/// What the caller of `transition` must do with the field it is building.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    /// The input carries no field data.
    Nothing,
    /// Append the character to the current field.
    Push(char),
    /// Append the character to the current field. It is the first
    /// character of an unquoted field, which makes the field a candidate
    /// for numeric conversion.
    PushFirst(char),
    /// Append both characters to the current field.
    PushPair(char, char),
    /// The current field is complete. When `record_end` is true, it is also
    /// the last field of the record.
    Save {
        /// Whether this was the last field in a record or not.
        record_end: bool,
    },
    /// A line without any data ended: the record has zero fields.
    EmptyRecord,
}

/// An error that occurs while parsing CSV data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// In strict mode, a closing quote was followed by something other than
    /// a delimiter or the end of the record.
    ExpectedDelimiter {
        /// The dialect's delimiter.
        delimiter: char,
        /// The dialect's quote character.
        quote: char,
    },
    /// Data followed a line break in the middle of a physical line.
    NewlineInUnquotedField,
    /// A field grew beyond the field size limit.
    FieldTooLarge {
        /// The limit in effect, in bytes.
        limit: usize,
    },
    /// The input ended inside of a quoted field or after an escape.
    UnexpectedEof,
    /// An unquoted field could not be parsed as a number.
    InvalidNumber {
        /// The field data.
        field: String,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseErrorKind::ExpectedDelimiter { delimiter, quote } => {
                write!(f, "'{}' expected after '{}'", delimiter, quote)
            }
            ParseErrorKind::NewlineInUnquotedField => {
                write!(f, "new-line character seen in unquoted field")
            }
            ParseErrorKind::FieldTooLarge { limit } => {
                write!(f, "field larger than field limit ({})", limit)
            }
            ParseErrorKind::UnexpectedEof => write!(f, "unexpected end of data"),
            ParseErrorKind::InvalidNumber { ref field } => {
                write!(f, "could not convert string to float: '{}'", field)
            }
        }
    }
}

impl error::Error for ParseErrorKind {}

/// Compute the parser's next state for one unit of input.
///
/// This is the whole of the CSV grammar: callers only need to keep the
/// returned state and apply the returned action to the field and record
/// they are building. Line breaks (`\r` and `\n`) always end records outside
/// of quotes, whatever the dialect's line terminator is.
pub fn transition(
    state: State,
    input: Input,
    dialect: &Dialect,
) -> Result<(State, Action), ParseErrorKind> {
    use self::Action::*;
    use self::State::*;

    let c = match input {
        Input::Char(c) => c,
        Input::EndOfLine => return Ok(transition_eol(state)),
    };
    let quoting = dialect.quoting() != QuoteStyle::Never;
    let is_quote = dialect.quotechar() == Some(c);
    let is_escape = dialect.escapechar() == Some(c);
    Ok(match state {
        StartRecord => {
            if Dialect::is_line_break(c) {
                (EatCrnl, Nothing)
            } else {
                return transition(StartField, input, dialect);
            }
        }
        StartField => {
            if is_quote && quoting {
                (InQuotedField, Nothing)
            } else if is_escape {
                (EscapedChar, Nothing)
            } else if c == dialect.delimiter() {
                (StartField, Save { record_end: false })
            } else if Dialect::is_line_break(c) {
                (EatCrnl, Save { record_end: true })
            } else if c == ' ' && dialect.skipinitialspace() {
                (StartField, Nothing)
            } else {
                (InField, PushFirst(c))
            }
        }
        EscapedChar => {
            if Dialect::is_line_break(c) {
                (AfterEscapedCrnl, Push(c))
            } else {
                (InField, Push(c))
            }
        }
        AfterEscapedCrnl => return transition(InField, input, dialect),
        InField => {
            if is_escape {
                (EscapedChar, Nothing)
            } else if c == dialect.delimiter() {
                (StartField, Save { record_end: false })
            } else if Dialect::is_line_break(c) {
                (EatCrnl, Save { record_end: true })
            } else {
                (InField, Push(c))
            }
        }
        InQuotedField => {
            if is_escape {
                (EscapeInQuotedField, Nothing)
            } else if is_quote {
                (QuoteInQuotedField, Nothing)
            } else {
                (InQuotedField, Push(c))
            }
        }
        EscapeInQuotedField => (InQuotedField, Push(c)),
        QuoteInQuotedField => {
            if is_quote && dialect.doublequote() {
                (InQuotedField, Push(c))
            } else if c == dialect.delimiter() {
                (StartField, Save { record_end: false })
            } else if Dialect::is_line_break(c) {
                (EatCrnl, Save { record_end: true })
            } else {
                // Only reachable from a quoted field, so the dialect has a
                // quote character.
                let quote = dialect.quotechar().unwrap_or('"');
                if dialect.strict() {
                    return Err(ParseErrorKind::ExpectedDelimiter {
                        delimiter: dialect.delimiter(),
                        quote,
                    });
                }
                (InField, PushPair(quote, c))
            }
        }
        EatCrnl => {
            if Dialect::is_line_break(c) {
                (EatCrnl, Nothing)
            } else {
                return Err(ParseErrorKind::NewlineInUnquotedField);
            }
        }
    })
}

fn transition_eol(state: State) -> (State, Action) {
    use self::Action::*;
    use self::State::*;

    match state {
        StartRecord => (StartRecord, EmptyRecord),
        StartField | InField | QuoteInQuotedField => {
            (StartRecord, Save { record_end: true })
        }
        // An escaped line end is kept as a newline in the field.
        EscapedChar => (InField, Push('\n')),
        AfterEscapedCrnl => (AfterEscapedCrnl, Nothing),
        EscapeInQuotedField => (InQuotedField, Push('\n')),
        InQuotedField => (InQuotedField, Nothing),
        EatCrnl => (StartRecord, Nothing),
    }
}
