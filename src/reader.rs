use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use bstr::ByteSlice;
use csv_line_core::{LineParser, NullFieldPolicy, ParserBuilder, Rfc4180Parser};
use log::{debug, trace, warn};

use crate::error::{Error, Result, Utf8Error};
use crate::record::Record;

/// Builds a CSV reader with various configuration knobs.
///
/// This builder can be used to tweak the separator, quote character, null
/// field policy and how physical lines are read. Once a CSV `Reader` is
/// built, its configuration cannot be changed.
#[derive(Debug)]
pub struct ReaderBuilder {
    parser: ParserBuilder,
    skip_lines: usize,
    multiline_limit: Option<usize>,
    keep_cr: bool,
}

impl Default for ReaderBuilder {
    fn default() -> ReaderBuilder {
        ReaderBuilder {
            parser: ParserBuilder::new(),
            skip_lines: 0,
            multiline_limit: None,
            keep_cr: false,
        }
    }
}

impl ReaderBuilder {
    /// Create a new builder for configuring CSV parsing.
    ///
    /// To convert a builder into a reader, call one of the methods starting
    /// with `from_`.
    ///
    /// # Example
    ///
    /// ```
    /// use std::error::Error;
    /// use csv_line::{ReaderBuilder, Record};
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let data = "\
    /// city,country,pop
    /// Boston,United States,4628910
    /// ";
    ///     let mut rdr = ReaderBuilder::new()
    ///         .skip_lines(1)
    ///         .from_reader(data.as_bytes());
    ///     let mut record = Record::new();
    ///     assert!(rdr.read_record(&mut record)?);
    ///     assert_eq!(record.get(0), Some(Some("Boston")));
    ///     Ok(())
    /// }
    /// ```
    pub fn new() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Build a CSV reader from this configuration that reads data from
    /// `rdr`.
    ///
    /// Note that the CSV reader is buffered automatically, so you should not
    /// wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Reader<R> {
        self.from_reader_with_parser(rdr, self.parser.build())
    }

    /// Build a CSV reader from this configuration that reads data from the
    /// given file path.
    ///
    /// If there was a problem opening the file at the given path, then this
    /// returns the corresponding error.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Reader<File>> {
        Ok(self.from_reader(File::open(path)?))
    }

    /// Build a CSV reader that tokenizes lines with `parser` instead of the
    /// parser described by this builder.
    ///
    /// The separator, quote and null field policy set on this builder are
    /// ignored; everything else applies.
    pub fn from_reader_with_parser<R: io::Read, P: LineParser>(
        &self,
        rdr: R,
        parser: P,
    ) -> Reader<R, P> {
        Reader {
            rdr: io::BufReader::new(rdr),
            parser,
            buf: Vec::with_capacity(1024),
            skip_lines: self.skip_lines,
            multiline_limit: self.multiline_limit,
            keep_cr: self.keep_cr,
            lines_read: 0,
            records_read: 0,
            pos: Position::new(),
            eof: false,
        }
    }

    /// The field separator to use when parsing CSV.
    ///
    /// The default is `','`.
    pub fn separator(&mut self, separator: char) -> &mut ReaderBuilder {
        self.parser.separator(separator);
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ReaderBuilder {
        self.parser.quote(quote);
        self
    }

    /// Which empty fields should be reported as null.
    ///
    /// The default is `NullFieldPolicy::None`.
    pub fn null_field_policy(
        &mut self,
        policy: NullFieldPolicy,
    ) -> &mut ReaderBuilder {
        self.parser.null_field_policy(policy);
        self
    }

    /// The number of physical lines to discard before the first record.
    ///
    /// Lines are counted as physical lines, so a quoted line break inside
    /// a skipped region is not recognized. The default is `0`.
    pub fn skip_lines(&mut self, n: usize) -> &mut ReaderBuilder {
        self.skip_lines = n;
        self
    }

    /// The maximum number of physical lines a single record may span.
    ///
    /// When a record needs more lines than this, reading it fails with
    /// `Error::MultilineLimit`. `None` (the default) and `Some(0)` both mean
    /// that there is no limit.
    pub fn multiline_limit(
        &mut self,
        limit: Option<usize>,
    ) -> &mut ReaderBuilder {
        self.multiline_limit = limit.filter(|&n| n > 0);
        self
    }

    /// Whether to keep a carriage return that precedes a line feed.
    ///
    /// By default, both `\n` and `\r\n` end a physical line and neither is
    /// part of the line. When enabled, only the `\n` is removed, so a quoted
    /// `\r\n` line break survives inside a field.
    pub fn keep_carriage_return(&mut self, yes: bool) -> &mut ReaderBuilder {
        self.keep_cr = yes;
        self
    }
}

/// A CSV reader.
///
/// The reader pulls physical lines out of an `io::Read` and hands them to a
/// `LineParser`. When the parser reports that a quoted field continues past
/// the end of a line, the reader fetches the next line and keeps going until
/// the record is complete.
///
/// By default, the reader uses an `Rfc4180Parser` configured through
/// `ReaderBuilder`.
///
/// # Example
///
/// ```
/// use std::error::Error;
/// use csv_line::Reader;
///
/// # fn main() { example().unwrap(); }
/// fn example() -> Result<(), Box<dyn Error>> {
///     let data = "\
/// id,note
/// 1,\"multi
/// line\"
/// 2,plain
/// ";
///     let mut rdr = Reader::from_reader(data.as_bytes());
///     let records = rdr.read_all()?;
///     assert_eq!(records.len(), 3);
///     assert_eq!(records[1].get(1), Some(Some("multi\nline")));
///     assert_eq!(rdr.lines_read(), 4);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Reader<R, P = Rfc4180Parser> {
    rdr: io::BufReader<R>,
    parser: P,
    /// The raw bytes of the physical line being processed.
    buf: Vec<u8>,
    /// Lines still to discard before the first record.
    skip_lines: usize,
    multiline_limit: Option<usize>,
    keep_cr: bool,
    lines_read: u64,
    records_read: u64,
    pos: Position,
    eof: bool,
}

/// The location of a record in the input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: u64,
    record: u64,
}

impl Position {
    /// Returns a new position initialized to the start value.
    pub fn new() -> Position {
        Position { line: 1, record: 0 }
    }

    /// The 1-based physical line number at which the record starts.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The 0-based index of the record.
    pub fn record(&self) -> u64 {
        self.record
    }
}

impl Reader<File> {
    /// Create a new CSV reader with a default configuration for the given
    /// file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        ReaderBuilder::new().from_path(path)
    }
}

impl<R: io::Read> Reader<R> {
    /// Create a new CSV reader with a default configuration for the given
    /// reader.
    ///
    /// To customize CSV parsing, use a `ReaderBuilder`.
    pub fn from_reader(rdr: R) -> Reader<R> {
        ReaderBuilder::new().from_reader(rdr)
    }
}

impl<R: io::Read, P: LineParser> Reader<R, P> {
    /// Read a single record into the given record.
    ///
    /// Returns `false` when no more records could be read.
    ///
    /// A record ends at the first line break that is not inside a quoted
    /// field. If the input ends inside a quoted field, the text read so far
    /// is flushed as the record's last field, opening quote included.
    ///
    /// If an error is returned, the partial record is discarded and the next
    /// call starts a fresh record on the next physical line.
    pub fn read_record(&mut self, record: &mut Record) -> Result<bool> {
        record.clear();
        self.skip_leading_lines()?;
        let result = self.read_record_lines(record);
        if result.is_err() {
            // Forget any half-read quoted field.
            self.parser.parse(None, false);
            record.clear();
        }
        result
    }

    fn read_record_lines(&mut self, record: &mut Record) -> Result<bool> {
        let mut lines_in_record = 0;
        loop {
            let line = match read_line(&mut self.rdr, &mut self.buf, self.keep_cr)?
            {
                Some(line) => line,
                None => {
                    self.eof = true;
                    if self.parser.is_pending() {
                        warn!(
                            "unterminated quoted field in record starting \
                             at line {}",
                            self.pos.line
                        );
                        if let Some(fields) = self.parser.parse(None, true) {
                            record.extend_owned(fields);
                        }
                    }
                    if lines_in_record == 0 {
                        return Ok(false);
                    }
                    break;
                }
            };
            self.lines_read += 1;
            if lines_in_record == 0 {
                self.pos = Position {
                    line: self.lines_read,
                    record: self.records_read,
                };
            }
            lines_in_record += 1;
            if let Some(limit) = self.multiline_limit {
                if lines_in_record > limit {
                    return Err(Error::MultilineLimit {
                        line: self.pos.line,
                        limit,
                    });
                }
            }

            let line_number = self.lines_read;
            let line = line.to_str().map_err(|err| Error::Utf8 {
                line: line_number,
                err: Utf8Error::from_bstr(&err),
            })?;
            if let Some(fields) = self.parser.parse(Some(line), true) {
                record.extend_owned(fields);
            }
            if !self.parser.is_pending() {
                break;
            }
            debug!(
                "record starting at line {} continues past line {}",
                self.pos.line, self.lines_read
            );
        }
        self.records_read += 1;
        Ok(true)
    }

    fn skip_leading_lines(&mut self) -> Result<()> {
        while self.skip_lines > 0 {
            self.skip_lines -= 1;
            match read_line(&mut self.rdr, &mut self.buf, self.keep_cr)? {
                None => {
                    self.eof = true;
                    self.skip_lines = 0;
                }
                Some(_) => {
                    self.lines_read += 1;
                    trace!("skipped line {}", self.lines_read);
                }
            }
        }
        Ok(())
    }

    /// Returns a borrowed iterator over all records as `Record`s.
    ///
    /// Each item yielded by this iterator is a `Result<Record, Error>`.
    pub fn records(&mut self) -> RecordsIter<R, P> {
        RecordsIter { rdr: self }
    }

    /// Returns an owned iterator over all records as `Record`s.
    pub fn into_records(self) -> RecordsIntoIter<R, P> {
        RecordsIntoIter { rdr: self }
    }

    /// Read all remaining records.
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        self.records().collect()
    }

    /// The number of physical lines read so far, including skipped lines.
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// The number of records read so far.
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    /// The position of the most recently read record.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// Returns true if this reader has been exhausted.
    pub fn is_done(&self) -> bool {
        self.eof
    }

    /// Return a reference to the line parser in use.
    ///
    /// This is useful to build a writer for the same dialect, e.g., with
    /// `WriterBuilder::from_parser`.
    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Return a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        self.rdr.get_ref()
    }

    /// Unwraps this CSV reader, returning the underlying reader.
    ///
    /// Note that any leftover data inside this reader's internal buffer is
    /// lost.
    pub fn into_inner(self) -> R {
        self.rdr.into_inner()
    }
}

/// Read one physical line into `buf` and return it without its terminator.
///
/// Returns `None` at the end of input.
fn read_line<'b, R: BufRead>(
    rdr: &mut R,
    buf: &'b mut Vec<u8>,
    keep_cr: bool,
) -> io::Result<Option<&'b [u8]>> {
    buf.clear();
    if rdr.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let mut line = &buf[..];
    if line.last() == Some(&b'\n') {
        line = &line[..line.len() - 1];
        if !keep_cr && line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }
    }
    Ok(Some(line))
}

/// A borrowed iterator over records.
///
/// The lifetime parameter `'r` refers to the lifetime of the underlying CSV
/// `Reader`.
pub struct RecordsIter<'r, R: 'r, P: 'r> {
    rdr: &'r mut Reader<R, P>,
}

impl<'r, R: io::Read, P: LineParser> Iterator for RecordsIter<'r, R, P> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        let mut record = Record::new();
        match self.rdr.read_record(&mut record) {
            Err(err) => Some(Err(err)),
            Ok(true) => Some(Ok(record)),
            Ok(false) => None,
        }
    }
}

/// An owned iterator over records.
pub struct RecordsIntoIter<R, P> {
    rdr: Reader<R, P>,
}

impl<R: io::Read, P: LineParser> RecordsIntoIter<R, P> {
    /// Return a reference to the underlying CSV reader.
    pub fn reader(&self) -> &Reader<R, P> {
        &self.rdr
    }

    /// Drop this iterator and return the underlying CSV reader.
    pub fn into_reader(self) -> Reader<R, P> {
        self.rdr
    }
}

impl<R: io::Read, P: LineParser> Iterator for RecordsIntoIter<R, P> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        let mut record = Record::new();
        match self.rdr.read_record(&mut record) {
            Err(err) => Some(Err(err)),
            Ok(true) => Some(Ok(record)),
            Ok(false) => None,
        }
    }
}
