use std::convert::TryFrom;
use std::fmt;
use std::iter::FromIterator;
use std::ops;
use std::slice;

#[cfg(feature = "serde")]
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// A single CSV field.
///
/// Readers produce `Text` fields, except for unquoted fields in a
/// `QuoteStyle::NonNumeric` dialect, which become `Float`. Writers accept
/// all three, and treat `Int` and `Float` as numbers when deciding whether
/// to quote.
#[derive(Clone, Debug, PartialEq)]
pub enum Field {
    /// Text data.
    Text(String),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
}

impl Default for Field {
    fn default() -> Field {
        Field::Text(String::new())
    }
}

impl Field {
    /// Returns the text of this field, if it is a `Text` field.
    pub fn as_str(&self) -> Option<&str> {
        match *self {
            Field::Text(ref s) => Some(s),
            _ => None,
        }
    }

    /// Returns this field as a float, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Field::Text(_) => None,
            Field::Int(n) => Some(n as f64),
            Field::Float(n) => Some(n),
        }
    }

    /// Returns true if this field is an `Int` or a `Float`.
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Returns a borrowed view of this field.
    pub fn as_field_ref(&self) -> FieldRef {
        match *self {
            Field::Text(ref s) => FieldRef::Text(s),
            Field::Int(n) => FieldRef::Int(n),
            Field::Float(n) => FieldRef::Float(n),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.as_field_ref(), f)
    }
}

impl<'a> From<&'a str> for Field {
    fn from(s: &'a str) -> Field {
        Field::Text(s.to_string())
    }
}

impl From<String> for Field {
    fn from(s: String) -> Field {
        Field::Text(s)
    }
}

impl From<i64> for Field {
    fn from(n: i64) -> Field {
        Field::Int(n)
    }
}

impl From<f64> for Field {
    fn from(n: f64) -> Field {
        Field::Float(n)
    }
}

impl<'a> From<FieldRef<'a>> for Field {
    fn from(field: FieldRef<'a>) -> Field {
        match field {
            FieldRef::Text(s) => Field::Text(s.to_string()),
            FieldRef::Int(n) => Field::Int(n),
            FieldRef::Float(n) => Field::Float(n),
            FieldRef::Uint(n) => {
                Field::Text(itoa::Buffer::new().format(n).to_string())
            }
        }
    }
}

impl PartialEq<str> for Field {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl<'a> PartialEq<&'a str> for Field {
    fn eq(&self, other: &&'a str) -> bool {
        self.as_str() == Some(*other)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Field {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match *self {
            Field::Text(ref v) => s.serialize_str(v),
            Field::Int(v) => s.serialize_i64(v),
            Field::Float(v) => s.serialize_f64(v),
        }
    }
}

/// A borrowed CSV field.
///
/// This is what writers consume: anything that implements `AsField` can
/// produce one without allocating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldRef<'a> {
    /// Text data.
    Text(&'a str),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// An unsigned integer too large for `Int`.
    ///
    /// `Field` has no room for these, so converting one into a `Field`
    /// gives its text.
    Uint(u64),
}

impl<'a> FieldRef<'a> {
    /// Returns true if this field is a number of any kind.
    pub fn is_numeric(&self) -> bool {
        match *self {
            FieldRef::Text(_) => false,
            FieldRef::Int(_) | FieldRef::Float(_) | FieldRef::Uint(_) => true,
        }
    }
}

impl<'a> fmt::Display for FieldRef<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FieldRef::Text(s) => f.write_str(s),
            FieldRef::Int(n) => f.write_str(itoa::Buffer::new().format(n)),
            FieldRef::Float(n) => f.write_str(ryu::Buffer::new().format(n)),
            FieldRef::Uint(n) => f.write_str(itoa::Buffer::new().format(n)),
        }
    }
}

/// A value that can be written as a CSV field.
///
/// This is implemented for strings, the primitive numeric types and
/// `Field`. Integers and floats count as numbers for
/// `QuoteStyle::NonNumeric`; everything else is text.
pub trait AsField {
    /// Borrow this value as a field.
    fn as_field(&self) -> FieldRef;
}

impl AsField for str {
    fn as_field(&self) -> FieldRef {
        FieldRef::Text(self)
    }
}

impl AsField for String {
    fn as_field(&self) -> FieldRef {
        FieldRef::Text(self)
    }
}

impl AsField for Field {
    fn as_field(&self) -> FieldRef {
        self.as_field_ref()
    }
}

impl<'a> AsField for FieldRef<'a> {
    fn as_field(&self) -> FieldRef {
        *self
    }
}

impl<'a, T: AsField + ?Sized> AsField for &'a T {
    fn as_field(&self) -> FieldRef {
        (**self).as_field()
    }
}

macro_rules! int_as_field {
    ($($ty:ty),*) => {
        $(
            impl AsField for $ty {
                fn as_field(&self) -> FieldRef {
                    FieldRef::Int(i64::from(*self))
                }
            }
        )*
    };
}

int_as_field!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_uint_as_field {
    ($($ty:ty),*) => {
        $(
            impl AsField for $ty {
                fn as_field(&self) -> FieldRef {
                    match i64::try_from(*self) {
                        Ok(n) => FieldRef::Int(n),
                        Err(_) => FieldRef::Uint(*self as u64),
                    }
                }
            }
        )*
    };
}

wide_uint_as_field!(u64, usize);

impl AsField for f32 {
    fn as_field(&self) -> FieldRef {
        FieldRef::Float(f64::from(*self))
    }
}

impl AsField for f64 {
    fn as_field(&self) -> FieldRef {
        FieldRef::Float(*self)
    }
}

/// A single CSV record: an ordered sequence of fields.
///
/// A record read from a blank line has no fields, which is different from a
/// record with one empty field.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Create a new empty `Record`.
    pub fn new() -> Record {
        Record::default()
    }

    /// Create a new empty `Record` with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Record {
        Record { fields: Vec::with_capacity(capacity) }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&Field> {
        self.fields.get(i)
    }

    /// Returns true if and only if this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Clear this record so that it has zero fields.
    ///
    /// Note that it is not necessary to clear the record to reuse it with
    /// a reader.
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Add a new field to the end of this record.
    pub fn push_field<F: Into<Field>>(&mut self, field: F) {
        self.fields.push(field.into());
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> RecordIter {
        RecordIter(self.fields.iter())
    }

    /// Returns the fields of this record as a slice.
    pub fn as_slice(&self) -> &[Field] {
        &self.fields
    }

    /// Convert this record into its fields.
    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    /// Swap the fields of this record with `fields`.
    pub(crate) fn swap_fields(&mut self, fields: &mut Vec<Field>) {
        std::mem::swap(&mut self.fields, fields);
    }
}

impl ops::Index<usize> for Record {
    type Output = Field;

    fn index(&self, i: usize) -> &Field {
        &self.fields[i]
    }
}

impl<'a> IntoIterator for &'a Record {
    type IntoIter = RecordIter<'a>;
    type Item = &'a Field;

    fn into_iter(self) -> RecordIter<'a> {
        self.iter()
    }
}

impl IntoIterator for Record {
    type IntoIter = std::vec::IntoIter<Field>;
    type Item = Field;

    fn into_iter(self) -> std::vec::IntoIter<Field> {
        self.fields.into_iter()
    }
}

impl<T: Into<Field>> From<Vec<T>> for Record {
    fn from(fields: Vec<T>) -> Record {
        fields.into_iter().collect()
    }
}

impl<T: Into<Field>> FromIterator<T> for Record {
    fn from_iter<I: IntoIterator<Item = T>>(it: I) -> Record {
        Record { fields: it.into_iter().map(Into::into).collect() }
    }
}

impl<T: Into<Field>> Extend<T> for Record {
    fn extend<I: IntoIterator<Item = T>>(&mut self, it: I) {
        self.fields.extend(it.into_iter().map(Into::into));
    }
}

impl<T: AsRef<str>> PartialEq<[T]> for Record {
    fn eq(&self, other: &[T]) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| *a == *b.as_ref())
    }
}

impl<T: AsRef<str>> PartialEq<Vec<T>> for Record {
    fn eq(&self, other: &Vec<T>) -> bool {
        *self == other[..]
    }
}

#[cfg(feature = "serde")]
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let mut seq = s.serialize_seq(Some(self.len()))?;
        for field in self {
            seq.serialize_element(field)?;
        }
        seq.end()
    }
}

/// An iterator over the fields in a record.
#[derive(Clone, Debug)]
pub struct RecordIter<'a>(slice::Iter<'a, Field>);

impl<'a> Iterator for RecordIter<'a> {
    type Item = &'a Field;

    fn next(&mut self) -> Option<&'a Field> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> DoubleEndedIterator for RecordIter<'a> {
    fn next_back(&mut self) -> Option<&'a Field> {
        self.0.next_back()
    }
}

impl<'a> ExactSizeIterator for RecordIter<'a> {}
