use csv_dialect_core::{
    transition, Action, Dialect, Input, ParseErrorKind, QuoteStyle, State,
};

use crate::error::{Error, Result};
use crate::limit;
use crate::line::LineSource;
use crate::record::{Field, Record};
use crate::registry::DialectChoice;

/// The position of a record in CSV data.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Position {
    line: u64,
    record: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position initialized to the start of the data: line 1,
    /// record 0.
    pub fn new() -> Position {
        Position { line: 1, record: 0 }
    }

    /// The line number, starting at `1`, on which the record begins.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The record index, starting at `0`.
    pub fn record(&self) -> u64 {
        self.record
    }

    /// Set the line number.
    pub fn set_line(&mut self, line: u64) -> &mut Position {
        self.line = line;
        self
    }

    /// Set the record index.
    pub fn set_record(&mut self, record: u64) -> &mut Position {
        self.record = record;
        self
    }
}

/// A record assembler that turns physical lines into records.
///
/// A `Parser` holds the state of one logical record across lines: a quoted
/// field may span any number of physical lines. Most callers want a
/// [`Reader`](struct.Reader.html), which feeds a parser from a
/// `LineSource`.
///
/// # Example
///
/// ```
/// use csv_dialect::{Dialect, Parser, Record};
///
/// let mut parser = Parser::new(Dialect::excel());
/// let mut record = Record::new();
/// assert!(!parser.feed("a,\"b\n", &mut record).unwrap());
/// assert!(parser.feed("c\",d\n", &mut record).unwrap());
/// assert_eq!(record, vec!["a", "b\nc", "d"]);
/// parser.finish().unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct Parser {
    dialect: Dialect,
    state: State,
    field: String,
    fields: Vec<Field>,
    numeric_field: bool,
    field_size_limit: Option<usize>,
    line_num: u64,
    record_line: u64,
    record: u64,
}

impl Parser {
    /// Create a parser for the given dialect.
    ///
    /// The parser uses the process-wide field size limit.
    pub fn new(dialect: Dialect) -> Parser {
        Parser {
            dialect,
            state: State::StartRecord,
            field: String::new(),
            fields: vec![],
            numeric_field: false,
            field_size_limit: None,
            line_num: 0,
            record_line: 1,
            record: 0,
        }
    }

    /// Use `limit` as the field size limit instead of the process-wide one.
    ///
    /// `None` goes back to the process-wide limit.
    pub fn set_field_size_limit(&mut self, limit: Option<usize>) {
        self.field_size_limit = limit;
    }

    /// The dialect of this parser.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The number of physical lines fed to this parser so far.
    pub fn line_num(&self) -> u64 {
        self.line_num
    }

    /// The position at which the next record begins.
    pub fn position(&self) -> Position {
        let mut pos = Position::new();
        pos.set_line(self.record_line).set_record(self.record);
        pos
    }

    /// Returns true if a record spans lines and hasn't been completed yet.
    pub fn is_in_record(&self) -> bool {
        self.state != State::StartRecord
    }

    /// Parse one physical line.
    ///
    /// If the line completes a record, its fields are moved into `record`
    /// (replacing what was there) and this returns `true`. Otherwise, the
    /// line ended inside of a quoted field and the record continues on the
    /// next line.
    ///
    /// On error, the partial record is discarded, as is the rest of the
    /// line, so the next line starts a new record.
    pub fn feed(&mut self, line: &str, record: &mut Record) -> Result<bool> {
        self.line_num += 1;
        let limit = self.field_size_limit.unwrap_or_else(limit::field_size_limit);
        if let Err(kind) = self.parse_line(line, limit) {
            let pos = self.position();
            log::trace!(
                "parse error on line {}, resetting record: {}",
                self.line_num,
                kind
            );
            self.reset_record();
            self.record_line = self.line_num + 1;
            return Err(Error::Parse { pos, kind });
        }
        if self.state != State::StartRecord {
            return Ok(false);
        }
        record.clear();
        record.swap_fields(&mut self.fields);
        self.record += 1;
        self.record_line = self.line_num + 1;
        Ok(true)
    }

    /// Signal the end of input.
    ///
    /// This fails with `ParseErrorKind::UnexpectedEof` if a record was left
    /// open, which happens when the last quoted field is never closed or the
    /// last line ends with an escape character.
    pub fn finish(&mut self) -> Result<()> {
        if self.state == State::StartRecord {
            return Ok(());
        }
        let pos = self.position();
        self.reset_record();
        Err(Error::Parse { pos, kind: ParseErrorKind::UnexpectedEof })
    }

    /// Return this parser to its initial state, discarding any partial
    /// record and zeroing its line and record counters.
    pub fn reset(&mut self) {
        self.reset_record();
        self.line_num = 0;
        self.record_line = 1;
        self.record = 0;
    }

    fn reset_record(&mut self) {
        self.state = State::StartRecord;
        self.field.clear();
        self.fields.clear();
        self.numeric_field = false;
    }

    fn parse_line(
        &mut self,
        line: &str,
        limit: usize,
    ) -> std::result::Result<(), ParseErrorKind> {
        for c in line.chars() {
            self.step(Input::Char(c), limit)?;
        }
        self.step(Input::EndOfLine, limit)
    }

    fn step(
        &mut self,
        input: Input,
        limit: usize,
    ) -> std::result::Result<(), ParseErrorKind> {
        let (next, action) = transition(self.state, input, &self.dialect)?;
        match action {
            Action::Nothing | Action::EmptyRecord => {}
            Action::Push(c) => self.push_char(c, limit)?,
            Action::PushFirst(c) => {
                if self.dialect.quoting() == QuoteStyle::NonNumeric {
                    self.numeric_field = true;
                }
                self.push_char(c, limit)?;
            }
            Action::PushPair(c1, c2) => {
                self.push_char(c1, limit)?;
                self.push_char(c2, limit)?;
            }
            Action::Save { .. } => self.save_field()?,
        }
        self.state = next;
        Ok(())
    }

    fn push_char(
        &mut self,
        c: char,
        limit: usize,
    ) -> std::result::Result<(), ParseErrorKind> {
        if self.field.len() + c.len_utf8() > limit {
            return Err(ParseErrorKind::FieldTooLarge { limit });
        }
        self.field.push(c);
        Ok(())
    }

    fn save_field(&mut self) -> std::result::Result<(), ParseErrorKind> {
        let field = if self.numeric_field {
            self.numeric_field = false;
            match self.field.trim().parse::<f64>() {
                Ok(n) => Field::Float(n),
                Err(_) => {
                    return Err(ParseErrorKind::InvalidNumber {
                        field: self.field.clone(),
                    })
                }
            }
        } else {
            Field::Text(self.field.clone())
        };
        self.field.clear();
        self.fields.push(field);
        Ok(())
    }
}

/// Builds a CSV reader with various configuration knobs.
///
/// The reader's dialect starts out as the Excel dialect. It can be replaced
/// by another dialect or by the name of a registered one, and each of its
/// settings can be overridden individually. Names are looked up, and the
/// resulting dialect is validated, when the reader is built.
#[derive(Clone, Debug, Default)]
pub struct ReaderBuilder {
    dialect: DialectChoice,
    field_size_limit: Option<usize>,
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV reader from this configuration that reads lines from
    /// `rdr`.
    ///
    /// This fails if the configured dialect name isn't registered or the
    /// overrides produce an invalid dialect.
    ///
    /// # Example
    ///
    /// ```
    /// use csv_dialect::ReaderBuilder;
    ///
    /// let data = "city;country\nBoston;United States\n";
    /// let mut rdr = ReaderBuilder::new()
    ///     .delimiter(';')
    ///     .from_reader(data.as_bytes())
    ///     .unwrap();
    /// let header = rdr.records().next().unwrap().unwrap();
    /// assert_eq!(header, vec!["city", "country"]);
    /// ```
    pub fn from_reader<R: LineSource>(&self, rdr: R) -> Result<Reader<R>> {
        Ok(Reader::new(self.build_parser()?, rdr))
    }

    /// Build a bare parser from this configuration.
    pub fn build_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new(self.dialect.resolve()?);
        parser.set_field_size_limit(self.field_size_limit);
        Ok(parser)
    }

    /// Start from the given dialect. This discards a dialect name set with
    /// `dialect_name`, but keeps the individual overrides.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut ReaderBuilder {
        self.dialect.set_dialect(dialect);
        self
    }

    /// Start from the dialect registered under `name`.
    pub fn dialect_name(&mut self, name: &str) -> &mut ReaderBuilder {
        self.dialect.set_name(name);
        self
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut ReaderBuilder {
        self.dialect.delimiter(delimiter);
        self
    }

    /// The quote character to use when parsing CSV, or `None` to disable
    /// quoting (which also requires `QuoteStyle::Never`).
    ///
    /// The default is `"`.
    pub fn quotechar(&mut self, quote: Option<char>) -> &mut ReaderBuilder {
        self.dialect.quotechar(quote);
        self
    }

    /// The escape character to use when parsing CSV.
    ///
    /// An escape character makes the next character literal, inside or
    /// outside of quotes. This is disabled by default.
    pub fn escapechar(&mut self, escape: Option<char>) -> &mut ReaderBuilder {
        self.dialect.escapechar(escape);
        self
    }

    /// The quoting discipline.
    ///
    /// `QuoteStyle::Never` makes quotes ordinary characters.
    /// `QuoteStyle::NonNumeric` converts unquoted fields to floats.
    pub fn quoting(&mut self, style: QuoteStyle) -> &mut ReaderBuilder {
        self.dialect.quoting(style);
        self
    }

    /// Enable or disable doubled quotes inside quoted fields.
    ///
    /// This is enabled by default.
    pub fn doublequote(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.dialect.doublequote(yes);
        self
    }

    /// Skip spaces that immediately follow a delimiter.
    ///
    /// This is disabled by default.
    pub fn skipinitialspace(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.dialect.skipinitialspace(yes);
        self
    }

    /// Fail on a quote that is followed by anything other than a delimiter
    /// or the end of the record.
    ///
    /// This is disabled by default, in which case such a quote is kept as
    /// data.
    pub fn strict(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.dialect.strict(yes);
        self
    }

    /// Limit the size of fields for this reader only, in bytes.
    ///
    /// By default, readers use the process-wide `field_size_limit`.
    pub fn field_size_limit(&mut self, limit: Option<usize>) -> &mut ReaderBuilder {
        self.field_size_limit = limit;
        self
    }
}

/// A CSV reader.
///
/// A reader pulls physical lines from a `LineSource`, such as any
/// `io::BufRead`, and assembles them into records.
///
/// Parse errors don't end reading: the offending record is skipped and the
/// next call starts with the following line.
#[derive(Debug)]
pub struct Reader<R> {
    rdr: R,
    parser: Parser,
    line: String,
    eof: bool,
}

impl<R: LineSource> Reader<R> {
    /// Create a new CSV reader with the Excel dialect.
    ///
    /// To customize parsing, use a `ReaderBuilder`.
    pub fn from_reader(rdr: R) -> Reader<R> {
        Reader::new(Parser::new(Dialect::excel()), rdr)
    }

    fn new(parser: Parser, rdr: R) -> Reader<R> {
        Reader { rdr, parser, line: String::new(), eof: false }
    }

    /// Read a single record into the given record. Returns false when no
    /// more records could be read.
    ///
    /// A blank line is read as a record with no fields.
    ///
    /// # Example
    ///
    /// ```
    /// use csv_dialect::{Reader, Record};
    ///
    /// let data = "a,b\n\n\"c\nd\",e\n";
    /// let mut rdr = Reader::from_reader(data.as_bytes());
    /// let mut record = Record::new();
    ///
    /// assert!(rdr.read_record(&mut record).unwrap());
    /// assert_eq!(record, vec!["a", "b"]);
    /// assert!(rdr.read_record(&mut record).unwrap());
    /// assert!(record.is_empty());
    /// assert!(rdr.read_record(&mut record).unwrap());
    /// assert_eq!(record, vec!["c\nd", "e"]);
    /// assert!(!rdr.read_record(&mut record).unwrap());
    /// ```
    pub fn read_record(&mut self, record: &mut Record) -> Result<bool> {
        loop {
            if self.eof {
                return Ok(false);
            }
            if !self.rdr.next_line(&mut self.line)? {
                self.eof = true;
                self.parser.finish()?;
                return Ok(false);
            }
            if self.parser.feed(&self.line, record)? {
                return Ok(true);
            }
        }
    }

    /// Returns a borrowed iterator over all records.
    ///
    /// The iterator yields parse errors and carries on after them. It stops
    /// after an I/O error.
    pub fn records(&mut self) -> RecordsIter<R> {
        RecordsIter { rdr: self, done: false }
    }

    /// Returns an owned iterator over all records.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr: self, done: false }
    }

    /// The dialect of this reader.
    pub fn dialect(&self) -> &Dialect {
        self.parser.dialect()
    }

    /// The number of physical lines read so far.
    pub fn line_num(&self) -> u64 {
        self.parser.line_num()
    }

    /// The position at which the next record begins.
    pub fn position(&self) -> Position {
        self.parser.position()
    }

    /// Returns true if all input has been consumed.
    pub fn is_done(&self) -> bool {
        self.eof
    }

    /// Returns a reference to the underlying line source.
    pub fn get_ref(&self) -> &R {
        &self.rdr
    }

    /// Returns a mutable reference to the underlying line source.
    ///
    /// Reading from it directly skips those lines for the parser, which is
    /// only sensible between records.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.rdr
    }

    /// Unwraps this reader, returning the underlying line source.
    pub fn into_inner(self) -> R {
        self.rdr
    }
}

/// A borrowed iterator over the records of a CSV reader.
pub struct RecordsIter<'r, R: 'r> {
    rdr: &'r mut Reader<R>,
    done: bool,
}

impl<'r, R: LineSource> Iterator for RecordsIter<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        next_record(self.rdr, &mut self.done)
    }
}

/// An owned iterator over the records of a CSV reader.
pub struct RecordsIntoIter<R> {
    rdr: Reader<R>,
    done: bool,
}

impl<R> RecordsIntoIter<R> {
    /// Returns a reference to the underlying reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: LineSource> Iterator for RecordsIntoIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        next_record(&mut self.rdr, &mut self.done)
    }
}

fn next_record<R: LineSource>(
    rdr: &mut Reader<R>,
    done: &mut bool,
) -> Option<Result<Record>> {
    if *done {
        return None;
    }
    let mut record = Record::new();
    match rdr.read_record(&mut record) {
        Ok(true) => Some(Ok(record)),
        Ok(false) => {
            *done = true;
            None
        }
        Err(err) => {
            if err.is_io_error() {
                *done = true;
            }
            Some(Err(err))
        }
    }
}
