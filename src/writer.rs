use csv_dialect_core::{
    Dialect, FieldKind, QuoteStyle, Writer as CoreWriter,
};

use crate::error::Result;
use crate::line::LineSink;
use crate::record::{AsField, FieldRef};
use crate::registry::DialectChoice;

/// Builds a CSV writer with various configuration knobs.
///
/// Like `ReaderBuilder`, this starts out with the Excel dialect, which can
/// be replaced by another dialect or the name of a registered one, and
/// individual settings can be overridden on top of it.
#[derive(Clone, Debug, Default)]
pub struct WriterBuilder {
    dialect: DialectChoice,
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Build a CSV writer from this configuration that writes rows to
    /// `wtr`.
    ///
    /// This fails if the configured dialect name isn't registered or the
    /// overrides produce an invalid dialect.
    ///
    /// # Example
    ///
    /// ```
    /// use csv_dialect::{QuoteStyle, WriterBuilder};
    ///
    /// let mut wtr = WriterBuilder::new()
    ///     .quoting(QuoteStyle::Always)
    ///     .lineterminator("\n")
    ///     .from_writer(vec![])
    ///     .unwrap();
    /// wtr.write_row(&["a", "b"]).unwrap();
    /// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    /// assert_eq!("\"a\",\"b\"\n", data);
    /// ```
    pub fn from_writer<W: LineSink>(&self, wtr: W) -> Result<Writer<W>> {
        Ok(Writer::new(self.dialect.resolve()?, wtr))
    }

    /// Start from the given dialect. This discards a dialect name set with
    /// `dialect_name`, but keeps the individual overrides.
    pub fn dialect(&mut self, dialect: Dialect) -> &mut WriterBuilder {
        self.dialect.set_dialect(dialect);
        self
    }

    /// Start from the dialect registered under `name`.
    pub fn dialect_name(&mut self, name: &str) -> &mut WriterBuilder {
        self.dialect.set_name(name);
        self
    }

    /// The field delimiter to use when writing CSV.
    ///
    /// The default is `,`.
    pub fn delimiter(&mut self, delimiter: char) -> &mut WriterBuilder {
        self.dialect.delimiter(delimiter);
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `"`.
    pub fn quotechar(&mut self, quote: Option<char>) -> &mut WriterBuilder {
        self.dialect.quotechar(quote);
        self
    }

    /// The escape character to use when writing CSV.
    ///
    /// With `QuoteStyle::Never`, it is put in front of every special
    /// character. Otherwise, it escapes quotes when `doublequote` is
    /// disabled.
    pub fn escapechar(&mut self, escape: Option<char>) -> &mut WriterBuilder {
        self.dialect.escapechar(escape);
        self
    }

    /// The string written after every row.
    ///
    /// The default is `\r\n`.
    pub fn lineterminator<S: Into<String>>(
        &mut self,
        term: S,
    ) -> &mut WriterBuilder {
        self.dialect.lineterminator(term.into());
        self
    }

    /// The quoting discipline.
    ///
    /// The default is `QuoteStyle::Necessary`.
    pub fn quoting(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.dialect.quoting(style);
        self
    }

    /// Enable or disable doubling quotes inside quoted fields.
    ///
    /// When disabled, quotes are escaped with the escape character instead.
    /// This is enabled by default.
    pub fn doublequote(&mut self, yes: bool) -> &mut WriterBuilder {
        self.dialect.doublequote(yes);
        self
    }

    /// Quote (or escape) fields with a leading space, so that a reader that
    /// skips initial spaces gives them back intact.
    ///
    /// This is disabled by default.
    pub fn skipinitialspace(&mut self, yes: bool) -> &mut WriterBuilder {
        self.dialect.skipinitialspace(yes);
        self
    }
}

/// A CSV writer.
///
/// A writer quotes and escapes rows of fields according to its dialect and
/// hands each finished row, terminator included, to a `LineSink` in a
/// single call. A row that can't be represented in the dialect is not
/// written at all.
///
/// # Example
///
/// ```
/// use csv_dialect::Writer;
///
/// let mut wtr = Writer::from_writer(vec![]);
/// wtr.write_row(&["name", "note"]).unwrap();
/// wtr.write_row(&["Ann", "says \"hi\", twice"]).unwrap();
///
/// let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
/// assert_eq!("name,note\r\nAnn,\"says \"\"hi\"\", twice\"\r\n", data);
/// ```
#[derive(Debug)]
pub struct Writer<W> {
    wtr: W,
    core: CoreWriter,
    row: String,
}

impl<W: LineSink> Writer<W> {
    /// Create a new CSV writer with the Excel dialect.
    ///
    /// To customize writing, use a `WriterBuilder`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        Writer::new(Dialect::excel(), wtr)
    }

    fn new(dialect: Dialect, wtr: W) -> Writer<W> {
        Writer { wtr, core: CoreWriter::new(dialect), row: String::new() }
    }

    /// Write a single row.
    ///
    /// The row may be any iterable of values implementing `AsField`, such as
    /// a slice of strings, a `Record` or a mix of fields. Integers and
    /// floats count as numbers for `QuoteStyle::NonNumeric`.
    ///
    /// If a field can't be written in this writer's dialect, nothing of the
    /// row is written and an error is returned.
    pub fn write_row<I>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsField,
    {
        self.row.clear();
        self.core.reset();
        if let Err(err) = self.encode_row(row) {
            self.row.clear();
            return Err(err);
        }
        let res = self.wtr.write_line(&self.row);
        self.row.clear();
        Ok(res?)
    }

    /// Write every row produced by `rows`.
    ///
    /// This stops at the first error. Rows written before it stay written.
    pub fn write_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: IntoIterator,
        <I::Item as IntoIterator>::Item: AsField,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    /// The dialect of this writer.
    pub fn dialect(&self) -> &Dialect {
        self.core.dialect()
    }

    /// Returns a reference to the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.wtr
    }

    /// Flush the underlying sink and return it.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.wtr)
    }

    fn encode_row<I>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsField,
    {
        let mut fields = row.into_iter().peekable();
        let mut first = true;
        while let Some(field) = fields.next() {
            let only = first && fields.peek().is_none();
            first = false;
            match field.as_field() {
                FieldRef::Text(s) => self.core.write_field(
                    s,
                    FieldKind::Text,
                    only,
                    &mut self.row,
                )?,
                FieldRef::Int(n) => {
                    let mut buf = itoa::Buffer::new();
                    let s = buf.format(n);
                    self.core.write_field(
                        s,
                        FieldKind::Numeric,
                        only,
                        &mut self.row,
                    )?
                }
                FieldRef::Uint(n) => {
                    let mut buf = itoa::Buffer::new();
                    let s = buf.format(n);
                    self.core.write_field(
                        s,
                        FieldKind::Numeric,
                        only,
                        &mut self.row,
                    )?
                }
                FieldRef::Float(n) => {
                    let mut buf = ryu::Buffer::new();
                    let s = buf.format(n);
                    self.core.write_field(
                        s,
                        FieldKind::Numeric,
                        only,
                        &mut self.row,
                    )?
                }
            }
        }
        self.core.write_term(&mut self.row);
        Ok(())
    }
}
