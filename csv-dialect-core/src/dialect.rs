use std::convert::TryFrom;
use std::error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The quoting discipline of a dialect.
///
/// The writer uses this to decide which fields get wrapped in the quote
/// character. The reader uses it in two places: `Never` disables the
/// recognition of quoted fields, and `NonNumeric` converts every unquoted
/// field into a floating point number.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum QuoteStyle {
    /// This puts quotes around every field. Always.
    ///
    /// Known elsewhere as `QUOTE_ALL`.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, delimiter, escape or
    /// record terminator, or when a record consists of a single empty field.
    ///
    /// This is the default. Known elsewhere as `QUOTE_MINIMAL`.
    Necessary,
    /// This puts quotes around every field that isn't a number.
    ///
    /// When reading, unquoted fields are parsed as numbers. Known elsewhere
    /// as `QUOTE_NONNUMERIC`.
    NonNumeric,
    /// This *never* writes quotes.
    ///
    /// Special characters in a field are escaped with the escape character
    /// instead. If one needs escaping and no escape character is set, then
    /// the writer reports an error. Known elsewhere as `QUOTE_NONE`.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// One of the three single character settings of a dialect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Special {
    /// The field delimiter.
    Delimiter,
    /// The quote character.
    QuoteChar,
    /// The escape character.
    EscapeChar,
}

impl fmt::Display for Special {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Special::Delimiter => write!(f, "delimiter"),
            Special::QuoteChar => write!(f, "quotechar"),
            Special::EscapeChar => write!(f, "escapechar"),
        }
    }
}

/// An error that occurs when a dialect's settings are inconsistent.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialectError {
    /// Quoting is enabled but no quote character was given.
    QuoteCharRequired,
    /// Two of the special characters are the same character.
    Collision {
        /// The first of the colliding settings.
        first: Special,
        /// The second of the colliding settings.
        second: Special,
        /// The character both of them were set to.
        ch: char,
    },
    /// A special character was set to `\r` or `\n`. The reader always
    /// treats those as record terminators.
    LineBreak(Special),
    /// The line terminator is the empty string.
    EmptyLineTerminator,
}

impl fmt::Display for DialectError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DialectError::QuoteCharRequired => {
                write!(f, "quotechar must be set if quoting enabled")
            }
            DialectError::Collision { first, second, ch } => write!(
                f,
                "{} and {} must be different characters (both are {:?})",
                first, second, ch
            ),
            DialectError::LineBreak(which) => {
                write!(f, "{} must not be a line break character", which)
            }
            DialectError::EmptyLineTerminator => {
                write!(f, "lineterminator must be set")
            }
        }
    }
}

impl error::Error for DialectError {}

/// A bundle of CSV formatting rules.
///
/// A dialect is immutable once built. To change a setting, build a new
/// dialect from an existing one with `Dialect::builder` or
/// `DialectBuilder::from_dialect`.
///
/// The default dialect is the one spreadsheet programs produce: fields
/// separated by `,`, quoted with `"` when necessary, doubled quotes inside
/// quoted fields and records terminated by `\r\n`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "DialectBuilder")
)]
pub struct Dialect {
    delimiter: char,
    quotechar: Option<char>,
    escapechar: Option<char>,
    lineterminator: String,
    quoting: QuoteStyle,
    doublequote: bool,
    skipinitialspace: bool,
    strict: bool,
}

impl Default for Dialect {
    fn default() -> Dialect {
        Dialect::excel()
    }
}

impl Dialect {
    /// The dialect of CSV files written by Excel.
    pub fn excel() -> Dialect {
        Dialect {
            delimiter: ',',
            quotechar: Some('"'),
            escapechar: None,
            lineterminator: "\r\n".to_string(),
            quoting: QuoteStyle::Necessary,
            doublequote: true,
            skipinitialspace: false,
            strict: false,
        }
    }

    /// Like `excel`, but fields are separated by tabs.
    pub fn excel_tab() -> Dialect {
        Dialect { delimiter: '\t', ..Dialect::excel() }
    }

    /// The dialect of CSV files generated on UNIX systems: records end with
    /// `\n` and every field is quoted.
    pub fn unix() -> Dialect {
        Dialect {
            lineterminator: "\n".to_string(),
            quoting: QuoteStyle::Always,
            ..Dialect::excel()
        }
    }

    /// Start building a new dialect whose settings default to this one's.
    pub fn builder(&self) -> DialectBuilder {
        DialectBuilder::from_dialect(self)
    }

    /// The character that separates fields.
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// The character that quotes fields containing special characters.
    pub fn quotechar(&self) -> Option<char> {
        self.quotechar
    }

    /// The character that removes the special meaning of the character
    /// that follows it.
    pub fn escapechar(&self) -> Option<char> {
        self.escapechar
    }

    /// The string written after every record.
    ///
    /// The reader ignores this setting: it always accepts `\r`, `\n` and
    /// `\r\n` as the end of a record.
    pub fn lineterminator(&self) -> &str {
        &self.lineterminator
    }

    /// The quoting discipline.
    pub fn quoting(&self) -> QuoteStyle {
        self.quoting
    }

    /// Whether a quote inside a quoted field is represented by two quotes.
    pub fn doublequote(&self) -> bool {
        self.doublequote
    }

    /// Whether spaces immediately following a delimiter are ignored.
    pub fn skipinitialspace(&self) -> bool {
        self.skipinitialspace
    }

    /// Whether malformed quoting is an error rather than literal data.
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Returns true when `c` ends a record while reading.
    #[inline]
    pub fn is_line_break(c: char) -> bool {
        c == '\r' || c == '\n'
    }

    /// Returns true when `c` has a special meaning to this dialect and
    /// therefore can't appear bare in an unquoted field.
    #[inline]
    pub fn is_special(&self, c: char) -> bool {
        c == self.delimiter
            || Some(c) == self.quotechar
            || Some(c) == self.escapechar
            || Dialect::is_line_break(c)
            || self.lineterminator.contains(c)
    }

    fn validate(&self) -> Result<(), DialectError> {
        if self.quoting != QuoteStyle::Never && self.quotechar.is_none() {
            return Err(DialectError::QuoteCharRequired);
        }
        let specials = [
            (Special::Delimiter, Some(self.delimiter)),
            (Special::QuoteChar, self.quotechar),
            (Special::EscapeChar, self.escapechar),
        ];
        for &(which, ch) in &specials {
            if ch.map_or(false, Dialect::is_line_break) {
                return Err(DialectError::LineBreak(which));
            }
        }
        for (i, &(first, a)) in specials.iter().enumerate() {
            for &(second, b) in &specials[i + 1..] {
                match (a, b) {
                    (Some(a), Some(b)) if a == b => {
                        return Err(DialectError::Collision {
                            first,
                            second,
                            ch: a,
                        });
                    }
                    _ => {}
                }
            }
        }
        if self.lineterminator.is_empty() {
            return Err(DialectError::EmptyLineTerminator);
        }
        Ok(())
    }
}

/// Builds a dialect with various configuration knobs.
///
/// Every setting starts out with the value of the dialect the builder was
/// created from (the Excel dialect for `DialectBuilder::new`). Settings are
/// only checked for consistency by `build`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Deserialize), serde(default))]
pub struct DialectBuilder {
    delimiter: char,
    quotechar: Option<char>,
    escapechar: Option<char>,
    lineterminator: String,
    quoting: QuoteStyle,
    doublequote: bool,
    skipinitialspace: bool,
    strict: bool,
}

impl Default for DialectBuilder {
    fn default() -> DialectBuilder {
        DialectBuilder::new()
    }
}

impl DialectBuilder {
    /// Create a new builder starting from the Excel dialect.
    pub fn new() -> DialectBuilder {
        DialectBuilder::from_dialect(&Dialect::excel())
    }

    /// Create a new builder starting from the given dialect.
    pub fn from_dialect(dialect: &Dialect) -> DialectBuilder {
        DialectBuilder {
            delimiter: dialect.delimiter,
            quotechar: dialect.quotechar,
            escapechar: dialect.escapechar,
            lineterminator: dialect.lineterminator.clone(),
            quoting: dialect.quoting,
            doublequote: dialect.doublequote,
            skipinitialspace: dialect.skipinitialspace,
            strict: dialect.strict,
        }
    }

    /// Validate the settings and build the dialect.
    pub fn build(&self) -> Result<Dialect, DialectError> {
        let dialect = Dialect {
            delimiter: self.delimiter,
            quotechar: self.quotechar,
            escapechar: self.escapechar,
            lineterminator: self.lineterminator.clone(),
            quoting: self.quoting,
            doublequote: self.doublequote,
            skipinitialspace: self.skipinitialspace,
            strict: self.strict,
        };
        dialect.validate()?;
        Ok(dialect)
    }

    /// The field delimiter.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut DialectBuilder {
        self.delimiter = delimiter;
        self
    }

    /// The quote character. `None` is only valid with `QuoteStyle::Never`.
    ///
    /// The default is `Some('"')`.
    pub fn quotechar(&mut self, quote: Option<char>) -> &mut DialectBuilder {
        self.quotechar = quote;
        self
    }

    /// The escape character.
    ///
    /// When reading, the character following an escape is taken literally.
    /// When writing, it is used to escape special characters under
    /// `QuoteStyle::Never` and quotes when `doublequote` is disabled.
    ///
    /// By default, there is no escape character.
    pub fn escapechar(&mut self, escape: Option<char>) -> &mut DialectBuilder {
        self.escapechar = escape;
        self
    }

    /// The string terminating each written record.
    ///
    /// The default is `\r\n`.
    pub fn lineterminator<S: Into<String>>(
        &mut self,
        term: S,
    ) -> &mut DialectBuilder {
        self.lineterminator = term.into();
        self
    }

    /// The quoting discipline.
    ///
    /// The default is `QuoteStyle::Necessary`.
    pub fn quoting(&mut self, style: QuoteStyle) -> &mut DialectBuilder {
        self.quoting = style;
        self
    }

    /// Enable double quote escapes.
    ///
    /// This is enabled by default. When disabled, a quote inside a quoted
    /// field must be escaped with the escape character.
    pub fn doublequote(&mut self, yes: bool) -> &mut DialectBuilder {
        self.doublequote = yes;
        self
    }

    /// Skip spaces that immediately follow a delimiter.
    ///
    /// This is disabled by default.
    pub fn skipinitialspace(&mut self, yes: bool) -> &mut DialectBuilder {
        self.skipinitialspace = yes;
        self
    }

    /// Report malformed quoting as an error.
    ///
    /// This is disabled by default, in which case a quote followed by
    /// something other than a delimiter or record terminator is kept as
    /// literal field data.
    pub fn strict(&mut self, yes: bool) -> &mut DialectBuilder {
        self.strict = yes;
        self
    }
}

impl TryFrom<DialectBuilder> for Dialect {
    type Error = DialectError;

    fn try_from(builder: DialectBuilder) -> Result<Dialect, DialectError> {
        builder.build()
    }
}
