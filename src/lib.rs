/*!
The `csv-dialect` crate reads and writes CSV data in any of a family of
dialects: the delimiter, quoting, escaping and line terminator are all
configurable, and dialects can be registered under a name.

# Overview

The [`Reader`](struct.Reader.html) pulls physical lines from a
[`LineSource`](trait.LineSource.html) (any `io::BufRead` is one) and
assembles them into [`Record`](struct.Record.html)s. A quoted field may span
any number of lines.

The [`Writer`](struct.Writer.html) quotes and escapes rows of fields
according to its dialect's [`QuoteStyle`](enum.QuoteStyle.html) and hands
each row to a [`LineSink`](trait.LineSink.html) (any `io::Write` is one).

[`DictReader`](struct.DictReader.html) and
[`DictWriter`](struct.DictWriter.html) map records onto field names.

# Example

This reads records with the default Excel dialect and writes them back out
with every field quoted:

```
use csv_dialect::{QuoteStyle, Reader, WriterBuilder};

# fn main() -> csv_dialect::Result<()> {
let data = "\
city,pop
Boston,\"4,628,910\"
";
let mut rdr = Reader::from_reader(data.as_bytes());
let mut wtr = WriterBuilder::new()
    .quoting(QuoteStyle::Always)
    .from_writer(vec![])?;
for result in rdr.records() {
    let record = result?;
    wtr.write_row(&record)?;
}
let out = String::from_utf8(wtr.into_inner()?).unwrap();
assert_eq!("\"city\",\"pop\"\r\n\"Boston\",\"4,628,910\"\r\n", out);
# Ok(())
# }
```

# Dialects

A [`Dialect`](struct.Dialect.html) is an immutable, validated set of
formatting rules. The registry starts out with `excel`, `excel-tab` and
`unix`; others can be added with
[`register_dialect`](fn.register_dialect.html) and then selected by name
with `ReaderBuilder::dialect_name` or `WriterBuilder::dialect_name`.

# Errors

Every fallible operation returns an [`Error`](enum.Error.html). Parse
errors carry the [`Position`](struct.Position.html) of the record that
failed. A reader that hits a parse error skips the rest of that record and
can keep going.
*/

#![deny(missing_docs)]

pub use csv_dialect_core::{
    Dialect, DialectBuilder, DialectError, ParseErrorKind, QuoteStyle,
    Special, WriteErrorKind,
};

pub use crate::dict::{DictReader, DictRecord, DictWriter, ExtrasAction, RowMap};
pub use crate::error::{Error, Result};
pub use crate::limit::{
    field_size_limit, set_field_size_limit, DEFAULT_FIELD_SIZE_LIMIT,
};
pub use crate::line::{IterLines, LineSink, LineSource};
pub use crate::reader::{
    Parser, Position, Reader, ReaderBuilder, RecordsIntoIter, RecordsIter,
};
pub use crate::record::{AsField, Field, FieldRef, Record, RecordIter};
pub use crate::registry::{
    get_dialect, list_dialects, register_dialect, unregister_dialect,
};
pub use crate::writer::{Writer, WriterBuilder};

mod dict;
mod error;
mod limit;
mod line;
mod reader;
mod record;
mod registry;
mod writer;
