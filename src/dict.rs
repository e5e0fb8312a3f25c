use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use crate::error::{Error, Result};
use crate::line::{LineSink, LineSource};
use crate::reader::Reader;
use crate::record::{AsField, Field, FieldRef, Record};
use crate::writer::Writer;

/// A record keyed by field name, as produced by a `DictReader`.
///
/// Fields are kept in fieldname order. When a record has more fields than
/// there are fieldnames and the reader has a `restkey`, the surplus is kept
/// separately under that key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DictRecord {
    fields: Vec<(String, Field)>,
    rest: Option<(String, Vec<Field>)>,
}

impl DictRecord {
    /// Create a new empty record.
    pub fn new() -> DictRecord {
        DictRecord::default()
    }

    /// Returns the field named `name`.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|&&(ref k, _)| k == name).map(|&(_, ref v)| v)
    }

    /// Set the field named `name`, keeping its place if it already exists.
    pub fn insert<S, F>(&mut self, name: S, field: F)
    where
        S: Into<String>,
        F: Into<Field>,
    {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|entry| entry.0 == name) {
            Some(entry) => entry.1 = field,
            None => self.fields.push((name, field)),
        }
    }

    /// The surplus fields and the key they are stored under, if any.
    pub fn rest(&self) -> Option<(&str, &[Field])> {
        self.rest.as_ref().map(|&(ref k, ref v)| (k.as_str(), v.as_slice()))
    }

    /// The number of named fields, not counting the surplus.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if there are no named fields and no surplus.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.rest.is_none()
    }

    /// Iterate over the named fields in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|&(ref k, ref v)| (k.as_str(), v))
    }

    /// Remove all fields.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.rest = None;
    }
}

/// A mapping from field names to values that a `DictWriter` can write.
///
/// This is implemented for `HashMap` and `BTreeMap` with string keys and
/// `AsField` values, and for `DictRecord`.
pub trait RowMap {
    /// Returns the value for `key`, if present.
    fn get_field(&self, key: &str) -> Option<FieldRef>;

    /// Returns every key of this mapping.
    fn keys<'a>(&'a self) -> Box<dyn Iterator<Item = &'a str> + 'a>;
}

impl<K, V, S> RowMap for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsField,
    S: BuildHasher,
{
    fn get_field(&self, key: &str) -> Option<FieldRef> {
        self.get(key).map(|v| v.as_field())
    }

    fn keys<'a>(&'a self) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(HashMap::keys(self).map(|k| <K as Borrow<str>>::borrow(k)))
    }
}

impl<K, V> RowMap for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsField,
{
    fn get_field(&self, key: &str) -> Option<FieldRef> {
        self.get(key).map(|v| v.as_field())
    }

    fn keys<'a>(&'a self) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        Box::new(BTreeMap::keys(self).map(|k| <K as Borrow<str>>::borrow(k)))
    }
}

impl RowMap for DictRecord {
    fn get_field(&self, key: &str) -> Option<FieldRef> {
        self.get(key).map(Field::as_field_ref)
    }

    fn keys<'a>(&'a self) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        let rest = self.rest.iter().map(|&(ref k, _)| k.as_str());
        Box::new(self.iter().map(|(k, _)| k).chain(rest))
    }
}

/// A CSV reader that maps every record onto a set of field names.
///
/// The field names are either given up front or taken from the first
/// record of the data, even when that record is blank. Blank data records
/// are skipped.
///
/// # Example
///
/// ```
/// use csv_dialect::{DictReader, Reader};
///
/// let data = "name,age\nAnn,30\nBob\n";
/// let mut rdr = DictReader::from_reader(Reader::from_reader(data.as_bytes()));
///
/// let ann = rdr.next().unwrap().unwrap();
/// assert_eq!(ann.get("name").unwrap(), "Ann");
/// assert_eq!(ann.get("age").unwrap(), "30");
///
/// let bob = rdr.next().unwrap().unwrap();
/// assert_eq!(bob.get("age").unwrap(), "");
/// assert!(rdr.next().is_none());
/// ```
#[derive(Debug)]
pub struct DictReader<R> {
    rdr: Reader<R>,
    fieldnames: Option<Vec<String>>,
    restkey: Option<String>,
    restval: Field,
    record: Record,
    done: bool,
}

impl<R: LineSource> DictReader<R> {
    /// Wrap a reader, taking field names from the first record.
    pub fn from_reader(rdr: Reader<R>) -> DictReader<R> {
        DictReader {
            rdr,
            fieldnames: None,
            restkey: None,
            restval: Field::default(),
            record: Record::new(),
            done: false,
        }
    }

    /// Wrap a reader, using the given field names. Every record of the data
    /// is treated as a data record.
    pub fn with_fieldnames<I>(rdr: Reader<R>, fieldnames: I) -> DictReader<R>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut dict = DictReader::from_reader(rdr);
        dict.set_fieldnames(fieldnames);
        dict
    }

    /// Store fields beyond the field names under `key`.
    ///
    /// Without a rest key, they are dropped.
    pub fn restkey<S: Into<String>>(&mut self, key: S) -> &mut DictReader<R> {
        self.restkey = Some(key.into());
        self
    }

    /// The value given to field names that a short record has no field for.
    ///
    /// The default is an empty text field.
    pub fn restval<F: Into<Field>>(&mut self, val: F) -> &mut DictReader<R> {
        self.restval = val.into();
        self
    }

    /// Replace the field names. Records read afterwards are keyed by them,
    /// and the data's first record is no longer taken as a header.
    pub fn set_fieldnames<I>(&mut self, fieldnames: I) -> &mut DictReader<R>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.fieldnames = Some(fieldnames.into_iter().map(Into::into).collect());
        self
    }

    /// Returns the field names, reading them from the first record of the
    /// data if needed.
    ///
    /// A blank first record, or no data at all, means there are no field
    /// names.
    pub fn fieldnames(&mut self) -> Result<&[String]> {
        if self.fieldnames.is_none() {
            let mut names = vec![];
            if self.rdr.read_record(&mut self.record)? {
                names = self.record.iter().map(|f| f.to_string()).collect();
            }
            self.fieldnames = Some(names);
        }
        match self.fieldnames {
            Some(ref names) => Ok(names.as_slice()),
            None => Ok(&[]),
        }
    }

    /// Read the next non-blank record into `record`. Returns false when no
    /// more records could be read.
    pub fn read_record(&mut self, record: &mut DictRecord) -> Result<bool> {
        self.fieldnames()?;
        loop {
            if !self.rdr.read_record(&mut self.record)? {
                return Ok(false);
            }
            if !self.record.is_empty() {
                break;
            }
        }
        record.clear();
        let names: &[String] = match self.fieldnames {
            Some(ref names) => names,
            None => &[],
        };
        let mut fields = self.record.iter();
        for name in names {
            let field = fields.next().unwrap_or(&self.restval);
            record.insert(name.as_str(), field.clone());
        }
        let rest: Vec<Field> = fields.cloned().collect();
        if !rest.is_empty() {
            if let Some(ref key) = self.restkey {
                record.rest = Some((key.clone(), rest));
            }
        }
        Ok(true)
    }

    /// The number of physical lines read so far.
    pub fn line_num(&self) -> u64 {
        self.rdr.line_num()
    }

    /// Returns a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R> {
        &self.rdr
    }

    /// Unwraps this reader, returning the underlying CSV reader.
    pub fn into_reader(self) -> Reader<R> {
        self.rdr
    }
}

impl<R: LineSource> Iterator for DictReader<R> {
    type Item = Result<DictRecord>;

    fn next(&mut self) -> Option<Result<DictRecord>> {
        if self.done {
            return None;
        }
        let mut record = DictRecord::new();
        match self.read_record(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                if err.is_io_error() {
                    self.done = true;
                }
                Some(Err(err))
            }
        }
    }
}

/// What a `DictWriter` does with keys that aren't among its field names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExtrasAction {
    /// Fail with `Error::ExtraFields`. This is the default.
    Raise,
    /// Leave them out.
    Ignore,
}

impl Default for ExtrasAction {
    fn default() -> ExtrasAction {
        ExtrasAction::Raise
    }
}

/// A CSV writer that writes mappings as rows, in field name order.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use csv_dialect::{DictWriter, Writer};
///
/// let mut wtr = DictWriter::new(Writer::from_writer(vec![]), vec!["a", "b"]);
/// wtr.write_header().unwrap();
///
/// let mut row = HashMap::new();
/// row.insert("b", "2");
/// wtr.write_row(&row).unwrap();
///
/// let data = wtr.into_inner().unwrap();
/// assert_eq!("a,b\r\n,2\r\n", String::from_utf8(data).unwrap());
/// ```
#[derive(Debug)]
pub struct DictWriter<W> {
    wtr: Writer<W>,
    fieldnames: Vec<String>,
    restval: Field,
    extras: ExtrasAction,
}

impl<W: LineSink> DictWriter<W> {
    /// Wrap a writer with the given field names.
    pub fn new<I>(wtr: Writer<W>, fieldnames: I) -> DictWriter<W>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        DictWriter {
            wtr,
            fieldnames: fieldnames.into_iter().map(Into::into).collect(),
            restval: Field::default(),
            extras: ExtrasAction::default(),
        }
    }

    /// The value written for field names missing from a mapping.
    ///
    /// The default is an empty text field.
    pub fn restval<F: Into<Field>>(&mut self, val: F) -> &mut DictWriter<W> {
        self.restval = val.into();
        self
    }

    /// What to do with keys that aren't field names.
    pub fn extras_action(&mut self, action: ExtrasAction) -> &mut DictWriter<W> {
        self.extras = action;
        self
    }

    /// The field names, in the order their values are written.
    pub fn fieldnames(&self) -> &[String] {
        &self.fieldnames
    }

    /// Write the field names as a row.
    pub fn write_header(&mut self) -> Result<()> {
        self.wtr.write_row(&self.fieldnames)
    }

    /// Write one mapping as a row.
    pub fn write_row<M: RowMap + ?Sized>(&mut self, row: &M) -> Result<()> {
        if self.extras == ExtrasAction::Raise {
            let fieldnames = &self.fieldnames;
            let extra: Vec<String> = row
                .keys()
                .filter(|k| !fieldnames.iter().any(|n| n == k))
                .map(String::from)
                .collect();
            if !extra.is_empty() {
                return Err(Error::ExtraFields { fields: extra });
            }
        }
        let restval = self.restval.as_field_ref();
        let fields = self
            .fieldnames
            .iter()
            .map(|name| row.get_field(name).unwrap_or(restval));
        self.wtr.write_row(fields)
    }

    /// Write every mapping in `rows`.
    ///
    /// This stops at the first error. Rows written before it stay written.
    pub fn write_rows<'a, I, M>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a M>,
        M: RowMap + ?Sized + 'a,
    {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()
    }

    /// Returns a reference to the underlying CSV writer.
    pub fn writer(&self) -> &Writer<W> {
        &self.wtr
    }

    /// Flush and unwrap this writer, returning the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashMap};

    use csv_dialect_core::QuoteStyle;

    use crate::error::Error;
    use crate::line::IterLines;
    use crate::reader::{Reader, ReaderBuilder};
    use crate::record::Field;
    use crate::writer::{Writer, WriterBuilder};

    use super::{DictReader, DictRecord, DictWriter, ExtrasAction, RowMap};

    fn dict_reader(data: &str) -> DictReader<&[u8]> {
        DictReader::from_reader(Reader::from_reader(data.as_bytes()))
    }

    fn output(wtr: DictWriter<Vec<u8>>) -> String {
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn header_from_data() {
        let mut rdr = dict_reader("a,b\n\n1,2\n");
        assert_eq!(rdr.fieldnames().unwrap(), &["a", "b"]);
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.get("a").unwrap(), "1");
        assert_eq!(rec.get("b").unwrap(), "2");
        assert!(rdr.next().is_none());
        assert_eq!(3, rdr.line_num());
    }

    #[test]
    fn blank_first_record_is_header() {
        let mut rdr = dict_reader("\na,b\n");
        rdr.restkey("rest");
        assert!(rdr.fieldnames().unwrap().is_empty());
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(0, rec.len());
        let rest = vec![Field::from("a"), Field::from("b")];
        assert_eq!(Some(("rest", &rest[..])), rec.rest());
    }

    #[test]
    fn set_fieldnames_skips_header() {
        let mut rdr = dict_reader("1,2\n3,4\n");
        rdr.set_fieldnames(vec!["x", "y"]);
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.get("x").unwrap(), "1");

        rdr.set_fieldnames(vec!["p"]);
        assert_eq!(rdr.fieldnames().unwrap(), &["p"]);
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.get("p").unwrap(), "3");
        assert_eq!(None, rec.get("x"));
    }

    #[test]
    fn short_and_long_records() {
        let lines = vec!["1,2,3,4", "5", "", "6,7,8"];
        let rdr = Reader::from_reader(IterLines::new(lines));
        let mut rdr = DictReader::with_fieldnames(rdr, vec!["a", "b", "c"]);
        rdr.restkey("rest").restval("?");

        let rec = rdr.next().unwrap().unwrap();
        let got: Vec<(&str, String)> =
            rec.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(
            vec![
                ("a", "1".to_string()),
                ("b", "2".to_string()),
                ("c", "3".to_string()),
            ],
            got
        );
        assert_eq!(Some(("rest", &[Field::from("4")][..])), rec.rest());

        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.get("a").unwrap(), "5");
        assert_eq!(rec.get("b").unwrap(), "?");
        assert_eq!(rec.get("c").unwrap(), "?");
        assert_eq!(None, rec.rest());

        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.get("c").unwrap(), "8");
        assert!(rdr.next().is_none());
    }

    #[test]
    fn surplus_dropped_without_restkey() {
        let mut rdr = dict_reader("a\n1,2\n");
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(1, rec.len());
        assert_eq!(None, rec.rest());
    }

    #[test]
    fn duplicate_fieldnames_keep_last() {
        let mut rdr = dict_reader("a,b,a\n1,2,3\n");
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(2, rec.len());
        assert_eq!(rec.get("a").unwrap(), "3");
    }

    #[test]
    fn no_data() {
        let mut rdr = dict_reader("\n\n");
        assert!(rdr.fieldnames().unwrap().is_empty());
        assert!(rdr.next().is_none());
    }

    #[test]
    fn non_numeric_reader() {
        let mut b = ReaderBuilder::new();
        b.quoting(QuoteStyle::NonNumeric);
        let rdr = b.from_reader("\"x\",\"y\"\n1,\"2\"\n".as_bytes()).unwrap();
        let mut rdr = DictReader::from_reader(rdr);
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(Some(&Field::Float(1.0)), rec.get("x"));
        assert_eq!(rec.get("y").unwrap(), "2");
    }

    #[test]
    fn parse_error_is_yielded() {
        let mut b = ReaderBuilder::new();
        b.strict(true);
        let rdr = b.from_reader("a\n\"x\"y\nz\n".as_bytes()).unwrap();
        let mut rdr = DictReader::from_reader(rdr);
        assert!(rdr.next().unwrap().unwrap_err().is_csv_error());
        let rec = rdr.next().unwrap().unwrap();
        assert_eq!(rec.get("a").unwrap(), "z");
    }

    #[test]
    fn write_missing_keys() {
        let wtr = Writer::from_writer(vec![]);
        let mut wtr = DictWriter::new(wtr, vec!["a", "b", "c"]);
        wtr.restval("-");
        let mut row = BTreeMap::new();
        row.insert("c".to_string(), Field::Int(3));
        row.insert("a".to_string(), Field::from("x,y"));
        wtr.write_header().unwrap();
        wtr.write_row(&row).unwrap();
        assert_eq!("a,b,c\r\n\"x,y\",-,3\r\n", output(wtr));
    }

    #[test]
    fn write_extras_raise() {
        let mut wtr = DictWriter::new(Writer::from_writer(vec![]), vec!["a"]);
        let mut row = BTreeMap::new();
        row.insert("a", "1");
        row.insert("z", "2");
        match wtr.write_row(&row) {
            Err(Error::ExtraFields { fields }) => assert_eq!(vec!["z"], fields),
            res => panic!("unexpected result: {:?}", res),
        }
        assert_eq!("", output(wtr));
    }

    #[test]
    fn write_extras_ignore() {
        let mut wtr = DictWriter::new(Writer::from_writer(vec![]), vec!["a"]);
        wtr.extras_action(ExtrasAction::Ignore);
        let mut row = HashMap::new();
        row.insert("a", 1);
        row.insert("z", 2);
        wtr.write_row(&row).unwrap();
        assert_eq!("1\r\n", output(wtr));
    }

    #[test]
    fn write_non_numeric() {
        let mut b = WriterBuilder::new();
        b.quoting(QuoteStyle::NonNumeric);
        let wtr = b.from_writer(vec![]).unwrap();
        let mut wtr = DictWriter::new(wtr, vec!["name", "score"]);
        let mut row: HashMap<&str, Field> = HashMap::new();
        row.insert("name", Field::from("Ann"));
        row.insert("score", Field::Float(9.5));
        wtr.write_rows(vec![&row, &row]).unwrap();
        assert_eq!("\"Ann\",9.5\r\n\"Ann\",9.5\r\n", output(wtr));
    }

    #[test]
    fn dict_record_round_trip() {
        let mut rdr = dict_reader("a,b\n1,2\n");
        let rec = rdr.next().unwrap().unwrap();
        let mut keys: Vec<&str> = rec.keys().collect();
        keys.sort();
        assert_eq!(vec!["a", "b"], keys);

        let mut wtr = DictWriter::new(Writer::from_writer(vec![]), vec!["b", "a"]);
        wtr.write_row(&rec).unwrap();
        assert_eq!("2,1\r\n", output(wtr));
    }

    #[test]
    fn dict_record_insert() {
        let mut rec = DictRecord::new();
        assert!(rec.is_empty());
        rec.insert("a", "1");
        rec.insert("b", "2");
        rec.insert("a", "3");
        let keys: Vec<&str> = rec.iter().map(|(k, _)| k).collect();
        assert_eq!(vec!["a", "b"], keys);
        assert_eq!(rec.get("a").unwrap(), "3");
    }
}
