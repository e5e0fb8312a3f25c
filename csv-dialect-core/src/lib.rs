/*!
`csv-dialect-core` provides the dialect model, the parsing state machine and
the field quoting rules for CSV data, with no I/O and no global state.

Most users want the `csv-dialect` crate, which drives these pieces over line
sources and sinks. This crate is the place to look if you need to feed
characters to the parser yourself.

# Dialects

A [`Dialect`](struct.Dialect.html) describes one flavor of CSV: the
delimiter, the quote and escape characters, the line terminator used when
writing, the quoting discipline and a few flags. Dialects are immutable and
always valid. They are built with a
[`DialectBuilder`](struct.DialectBuilder.html):

```
use csv_dialect_core::{Dialect, QuoteStyle};

let dialect = Dialect::excel()
    .builder()
    .delimiter(';')
    .quoting(QuoteStyle::Always)
    .build()
    .unwrap();
assert_eq!(';', dialect.delimiter());
```

# Parsing

The parser is a single pure function, [`transition`](fn.transition.html),
that maps a [`State`](enum.State.html) and one [`Input`](enum.Input.html) to
the next state and an [`Action`](enum.Action.html) telling the caller what to
do with the field under construction.

```
use csv_dialect_core::{transition, Action, Dialect, Input, State};

let dialect = Dialect::excel();
let (state, action) =
    transition(State::StartRecord, Input::Char('a'), &dialect).unwrap();
assert_eq!(State::InField, state);
assert_eq!(Action::PushFirst('a'), action);
```

# Writing

A [`Writer`](struct.Writer.html) appends quoted and escaped fields to a
`String` following the dialect's [`QuoteStyle`](enum.QuoteStyle.html).
*/

#![deny(missing_docs)]

pub use crate::dialect::{
    Dialect, DialectBuilder, DialectError, QuoteStyle, Special,
};
pub use crate::reader::{transition, Action, Input, ParseErrorKind, State};
pub use crate::writer::{FieldKind, WriteErrorKind, Writer};

mod dialect;
mod reader;
mod writer;
