use std::collections::{BTreeMap, HashMap};

use csv_dialect::{
    get_dialect, register_dialect, Dialect, DictReader, DictRecord,
    DictWriter, Error, ExtrasAction, Field, IterLines, ParseErrorKind,
    QuoteStyle, Reader, ReaderBuilder, Record, WriteErrorKind, Writer,
    WriterBuilder,
};

fn write_all(dialect: &Dialect, rows: &[Vec<Field>]) -> String {
    let mut wtr =
        WriterBuilder::new().dialect(dialect.clone()).from_writer(vec![]).unwrap();
    wtr.write_rows(rows).unwrap();
    String::from_utf8(wtr.into_inner().unwrap()).unwrap()
}

fn read_all(dialect: &Dialect, data: &str) -> Vec<Vec<Field>> {
    let rdr = ReaderBuilder::new()
        .dialect(dialect.clone())
        .from_reader(data.as_bytes())
        .unwrap();
    rdr.into_records().map(|r| r.unwrap().into_fields()).collect()
}

fn text_rows(rows: &[&[&str]]) -> Vec<Vec<Field>> {
    rows.iter().map(|row| row.iter().map(|&f| Field::from(f)).collect()).collect()
}

fn roundtrip(dialect: &Dialect, rows: Vec<Vec<Field>>) {
    let data = write_all(dialect, &rows);
    assert_eq!(rows, read_all(dialect, &data), "written as {:?}", data);
}

#[test]
fn roundtrip_necessary() {
    let d = Dialect::excel();
    roundtrip(
        &d,
        text_rows(&[
            &["a", "b,c", "say \"hi\""],
            &["multi\r\nline", "", " lead"],
            &[""],
            &["x"],
        ]),
    );
}

#[test]
fn roundtrip_always() {
    let d = Dialect::unix();
    roundtrip(
        &d,
        text_rows(&[&["a", "b\nc", "\"q\""], &["", ""], &[""], &["tail"]]),
    );
}

#[test]
fn roundtrip_non_numeric() {
    let d = Dialect::excel()
        .builder()
        .quoting(QuoteStyle::NonNumeric)
        .build()
        .unwrap();
    let rows = vec![
        vec![Field::from("name"), Field::from("score")],
        vec![Field::from("ann"), Field::Float(1.5)],
        vec![Field::from("bob, jr"), Field::Float(-0.25)],
        vec![Field::Float(1e300), Field::from("")],
    ];
    roundtrip(&d, rows);
}

#[test]
fn roundtrip_never() {
    let d = Dialect::excel()
        .builder()
        .quoting(QuoteStyle::Never)
        .escapechar(Some('\\'))
        .build()
        .unwrap();
    roundtrip(
        &d,
        text_rows(&[
            &["a,b", "c\"d", "back\\slash"],
            &["two\nlines", "crlf\r\nhere", "x"],
            &["plain", "", "x"],
        ]),
    );
}

#[test]
fn roundtrip_never_without_quotechar() {
    let d = Dialect::excel()
        .builder()
        .quoting(QuoteStyle::Never)
        .quotechar(None)
        .escapechar(Some('\\'))
        .build()
        .unwrap();
    roundtrip(&d, text_rows(&[&["a\"b", "c,d"], &["e", "f"]]));
}

#[test]
fn escaped_line_break_same_for_every_source() {
    let d = Dialect::excel()
        .builder()
        .quoting(QuoteStyle::Never)
        .escapechar(Some('\\'))
        .build()
        .unwrap();
    let data = write_all(&d, &text_rows(&[&["a\nb", "c"]]));
    assert_eq!("a\\\nb,c\r\n", data);

    let from_bytes = read_all(&d, &data);
    let lines = IterLines::new(vec!["a\\", "b,c"]);
    let rdr = ReaderBuilder::new().dialect(d).from_reader(lines).unwrap();
    let from_lines: Vec<Vec<Field>> =
        rdr.into_records().map(|r| r.unwrap().into_fields()).collect();
    assert_eq!(text_rows(&[&["a\nb", "c"]]), from_bytes);
    assert_eq!(from_bytes, from_lines);
}

#[test]
fn delimiter_is_quoted_or_rejected() {
    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_row(&["a,b", "c"]).unwrap();
    let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!("\"a,b\",c\r\n", out);

    let mut wtr = WriterBuilder::new()
        .quoting(QuoteStyle::Never)
        .from_writer(vec![])
        .unwrap();
    let err = wtr.write_row(&["a,b", "c"]).unwrap_err();
    match err {
        Error::Write(WriteErrorKind::NoEscapeChar) => {}
        err => panic!("unexpected error: {:?}", err),
    }
    assert!(wtr.into_inner().unwrap().is_empty());
}

#[test]
fn quoted_field_spans_lines() {
    let data = "a,\"first\r\nsecond\r\nthird\",b\r\nnext\r\n";
    let mut rdr = Reader::from_reader(data.as_bytes());
    let mut rec = Record::new();

    assert!(rdr.read_record(&mut rec).unwrap());
    assert_eq!(rec, vec!["a", "first\r\nsecond\r\nthird", "b"]);
    assert_eq!(3, rdr.line_num());

    assert!(rdr.read_record(&mut rec).unwrap());
    assert_eq!(rec, vec!["next"]);
    assert_eq!(2, rdr.position().record());
}

#[test]
fn quoted_field_spans_iterated_lines() {
    let lines = IterLines::new(vec!["a,\"b", "c\",d"]);
    let mut rdr = ReaderBuilder::new().from_reader(lines).unwrap();
    let rec = rdr.records().next().unwrap().unwrap();
    assert_eq!(rec, vec!["a", "bc", "d"]);
}

#[test]
fn doubled_quote() {
    let rows = read_all(&Dialect::excel(), "\"a\"\"b\"\r\n");
    assert_eq!(text_rows(&[&["a\"b"]]), rows);
}

#[test]
fn blank_line_vs_empty_field() {
    let rows = read_all(&Dialect::excel(), "\r\n\"\"\r\n");
    assert_eq!(2, rows.len());
    assert!(rows[0].is_empty());
    assert_eq!(vec![Field::from("")], rows[1]);

    let mut wtr = Writer::from_writer(vec![]);
    wtr.write_row(Vec::<&str>::new()).unwrap();
    wtr.write_row(&[""]).unwrap();
    let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!("\r\n\"\"\r\n", out);
}

#[test]
fn stray_quote_strict_and_lenient() {
    let data = "a,\"b,c\",\"\"d\"\"\r\n";

    let lenient = read_all(&Dialect::excel(), data);
    assert_eq!(text_rows(&[&["a", "b,c", "\"d\"\""]]), lenient);

    let mut rdr =
        ReaderBuilder::new().strict(true).from_reader(data.as_bytes()).unwrap();
    let err = rdr.records().next().unwrap().unwrap_err();
    match err {
        Error::Parse {
            ref pos,
            kind: ParseErrorKind::ExpectedDelimiter { delimiter, quote },
        } => {
            assert_eq!(1, pos.line());
            assert_eq!(',', delimiter);
            assert_eq!('"', quote);
        }
        ref err => panic!("unexpected error: {:?}", err),
    }
    assert!(err.is_csv_error());
}

#[test]
fn eof_in_quoted_field() {
    let mut rdr = Reader::from_reader("a,\"open\r\nstill open".as_bytes());
    let err = rdr.records().next().unwrap().unwrap_err();
    match err {
        Error::Parse { kind: ParseErrorKind::UnexpectedEof, .. } => {}
        err => panic!("unexpected error: {:?}", err),
    }
}

#[test]
fn dict_reader_restkey_restval() {
    let rdr = Reader::from_reader("1,2,3\r\n1\r\n".as_bytes());
    let mut dict = DictReader::with_fieldnames(rdr, vec!["a", "b"]);
    dict.restkey("extra").restval("missing");

    let first = dict.next().unwrap().unwrap();
    assert_eq!(first.get("a").unwrap(), "1");
    assert_eq!(first.get("b").unwrap(), "2");
    assert_eq!(Some(("extra", &[Field::from("3")][..])), first.rest());

    let second = dict.next().unwrap().unwrap();
    assert_eq!(second.get("a").unwrap(), "1");
    assert_eq!(second.get("b").unwrap(), "missing");
    assert_eq!(None, second.rest());

    assert!(dict.next().is_none());
}

#[test]
fn dict_reader_header() {
    let data = "name,age\r\nann,30\r\n\r\nbob,41\r\n";
    let mut dict = DictReader::from_reader(Reader::from_reader(data.as_bytes()));
    assert_eq!(&["name", "age"], dict.fieldnames().unwrap());

    let rows: Vec<DictRecord> = dict.map(|r| r.unwrap()).collect();
    assert_eq!(2, rows.len());
    assert_eq!(rows[0].get("name").unwrap(), "ann");
    assert_eq!(rows[1].get("age").unwrap(), "41");
}

#[test]
fn dict_writer_extras() {
    let mut row = BTreeMap::new();
    row.insert("a", 1i64);
    row.insert("b", 2);
    row.insert("c", 3);

    let mut dict = DictWriter::new(Writer::from_writer(vec![]), vec!["a", "b"]);
    match dict.write_row(&row).unwrap_err() {
        Error::ExtraFields { ref fields } => assert_eq!(&["c"], &fields[..]),
        err => panic!("unexpected error: {:?}", err),
    }
    assert!(dict.into_inner().unwrap().is_empty());

    let mut dict = DictWriter::new(Writer::from_writer(vec![]), vec!["a", "b"]);
    dict.extras_action(ExtrasAction::Ignore);
    dict.write_row(&row).unwrap();
    let out = String::from_utf8(dict.into_inner().unwrap()).unwrap();
    assert_eq!("1,2\r\n", out);
}

#[test]
fn dict_writer_then_reader() {
    let mut first = HashMap::new();
    first.insert("city", "Boston");
    first.insert("state", "MA");
    let mut second = HashMap::new();
    second.insert("city", "Salem, OR");

    let mut dict =
        DictWriter::new(Writer::from_writer(vec![]), vec!["city", "state"]);
    dict.restval("?");
    dict.write_header().unwrap();
    dict.write_rows(vec![&first, &second]).unwrap();
    let data = String::from_utf8(dict.into_inner().unwrap()).unwrap();
    assert_eq!("city,state\r\nBoston,MA\r\n\"Salem, OR\",?\r\n", data);

    let dict = DictReader::from_reader(Reader::from_reader(data.as_bytes()));
    let rows: Vec<DictRecord> = dict.map(|r| r.unwrap()).collect();
    assert_eq!(rows[1].get("city").unwrap(), "Salem, OR");
    assert_eq!(rows[1].get("state").unwrap(), "?");
}

#[test]
fn registered_dialect_by_name() {
    let pipes = Dialect::excel()
        .builder()
        .delimiter('|')
        .lineterminator("\n")
        .build()
        .unwrap();
    register_dialect("integration-pipes", pipes.clone());
    assert_eq!(pipes, get_dialect("integration-pipes").unwrap());

    let mut wtr = WriterBuilder::new()
        .dialect_name("integration-pipes")
        .from_writer(vec![])
        .unwrap();
    wtr.write_row(&["a|b", "c"]).unwrap();
    let data = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!("\"a|b\"|c\n", data);

    let rdr = ReaderBuilder::new()
        .dialect_name("integration-pipes")
        .from_reader(data.as_bytes())
        .unwrap();
    let rows: Vec<Record> = rdr.into_records().map(|r| r.unwrap()).collect();
    assert_eq!(rows[0], vec!["a|b", "c"]);
}

#[test]
fn unknown_dialect_name() {
    let err = ReaderBuilder::new()
        .dialect_name("integration-no-such-dialect")
        .from_reader("".as_bytes())
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        "unknown dialect: \"integration-no-such-dialect\"",
        err.to_string()
    );
}

#[test]
fn invalid_override() {
    let err = WriterBuilder::new()
        .quotechar(Some(','))
        .from_writer(vec![])
        .unwrap_err();
    assert!(err.is_config());
}

#[test]
fn dialect_shared_between_readers() {
    let d = get_dialect("excel-tab").unwrap();
    let a = read_all(&d, "1\t2\n");
    let b = read_all(&d, "x\ty\n");
    assert_eq!(text_rows(&[&["1", "2"]]), a);
    assert_eq!(text_rows(&[&["x", "y"]]), b);
}

#[cfg(feature = "serde")]
#[test]
fn dialect_from_json() {
    let d: Dialect = serde_json::from_str(
        r#"{"delimiter": ";", "quoting": "non_numeric", "lineterminator": "\n"}"#,
    )
    .unwrap();
    let mut wtr = WriterBuilder::new().dialect(d).from_writer(vec![]).unwrap();
    wtr.write_row(vec![Field::from("a"), Field::Int(3)]).unwrap();
    let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
    assert_eq!("\"a\";3\n", out);
}

#[cfg(feature = "serde")]
#[test]
fn records_to_json() {
    let d = Dialect::excel()
        .builder()
        .quoting(QuoteStyle::NonNumeric)
        .build()
        .unwrap();
    let mut rdr = ReaderBuilder::new()
        .dialect(d)
        .from_reader("\"a\",2\r\n".as_bytes())
        .unwrap();
    let rec = rdr.records().next().unwrap().unwrap();
    assert_eq!(r#"["a",2.0]"#, serde_json::to_string(&rec).unwrap());
}
