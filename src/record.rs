use std::iter::FromIterator;
use std::ops;
use std::slice;

/// A single CSV record.
///
/// Each field is either a string or null. Whether an empty field comes back
/// as null or as an empty string is decided by the reader's
/// `NullFieldPolicy`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record(Vec<Option<String>>);

impl Record {
    /// Create a new empty `Record`.
    pub fn new() -> Record {
        Record(vec![])
    }

    /// Create a new empty `Record` with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Record {
        Record(Vec::with_capacity(capacity))
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`. If the
    /// field exists but is null, this returns `Some(None)`.
    pub fn get(&self, i: usize) -> Option<Option<&str>> {
        self.0.get(i).map(|field| field.as_ref().map(|s| s.as_str()))
    }

    /// Returns true if the field at index `i` exists and is null.
    pub fn is_null(&self, i: usize) -> bool {
        self.get(i) == Some(None)
    }

    /// Returns true if and only if this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Clear this record so that it has zero fields.
    ///
    /// Note that it is not necessary to clear the record to reuse it with
    /// the CSV reader.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Add a field to the end of this record.
    pub fn push_field(&mut self, field: Option<&str>) {
        self.0.push(field.map(|s| s.to_string()));
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> RecordIter {
        RecordIter(self.0.iter())
    }

    /// Consume this record and return its fields.
    pub fn into_fields(self) -> Vec<Option<String>> {
        self.0
    }

    pub(crate) fn extend_owned(&mut self, fields: Vec<Option<String>>) {
        self.0.extend(fields);
    }
}

impl From<Vec<Option<String>>> for Record {
    fn from(fields: Vec<Option<String>>) -> Record {
        Record(fields)
    }
}

impl<T: Into<String>> FromIterator<Option<T>> for Record {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Record {
        Record(iter.into_iter().map(|f| f.map(Into::into)).collect())
    }
}

impl ops::Index<usize> for Record {
    type Output = Option<String>;
    fn index(&self, i: usize) -> &Option<String> {
        &self.0[i]
    }
}

impl<'a> IntoIterator for &'a Record {
    type IntoIter = RecordIter<'a>;
    type Item = Option<&'a str>;
    fn into_iter(self) -> RecordIter<'a> {
        self.iter()
    }
}

/// An iterator over the fields in a record.
pub struct RecordIter<'a>(slice::Iter<'a, Option<String>>);

impl<'a> Iterator for RecordIter<'a> {
    type Item = Option<&'a str>;

    fn next(&mut self) -> Option<Option<&'a str>> {
        self.0.next().map(|field| field.as_ref().map(|s| s.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> DoubleEndedIterator for RecordIter<'a> {
    fn next_back(&mut self) -> Option<Option<&'a str>> {
        self.0.next_back().map(|field| field.as_ref().map(|s| s.as_str()))
    }
}

impl<'a> ExactSizeIterator for RecordIter<'a> {}
