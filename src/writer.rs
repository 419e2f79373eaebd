use std::fs::File;
use std::io;
use std::path::Path;

use csv_line_core::{LineParser, NullFieldPolicy, QuoteStyle};

use crate::error::{IntoInnerError, Result};

/// The record terminator to use when writing CSV data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Terminator {
    /// Writes `\r\n` after every record.
    CRLF,
    /// Writes `\n` after every record. This is the default.
    LF,
}

impl Terminator {
    fn as_str(&self) -> &'static str {
        match *self {
            Terminator::CRLF => "\r\n",
            Terminator::LF => "\n",
        }
    }
}

impl Default for Terminator {
    fn default() -> Terminator {
        Terminator::LF
    }
}

/// Builds a CSV writer with various configuration knobs.
///
/// This builder can be used to tweak the separator, quote character, null
/// field policy, quoting style and record terminator. Once a CSV `Writer`
/// is built, its configuration cannot be changed.
#[derive(Debug)]
pub struct WriterBuilder {
    builder: csv_line_core::WriterBuilder,
    term: Terminator,
    capacity: usize,
}

impl Default for WriterBuilder {
    fn default() -> WriterBuilder {
        WriterBuilder {
            builder: csv_line_core::WriterBuilder::new(),
            term: Terminator::default(),
            capacity: 8 * (1 << 10),
        }
    }
}

impl WriterBuilder {
    /// Create a new builder for configuring CSV writing.
    ///
    /// To convert a builder into a writer, call one of the methods starting
    /// with `from_`.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Create a builder that writes the dialect `parser` reads, so that the
    /// output reads back into the same records.
    ///
    /// # Example
    ///
    /// ```
    /// use std::error::Error;
    /// use csv_line::{NullFieldPolicy, ReaderBuilder, WriterBuilder};
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let rdr = ReaderBuilder::new()
    ///         .separator(';')
    ///         .null_field_policy(NullFieldPolicy::EmptySeparatorsAsNull)
    ///         .from_reader(&b""[..]);
    ///     let mut wtr = WriterBuilder::from_parser(rdr.parser())
    ///         .from_writer(vec![]);
    ///     wtr.write_record(vec![Some("a;b"), Some(""), None])?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "\"a;b\";\"\";\n");
    ///     Ok(())
    /// }
    /// ```
    pub fn from_parser<P: LineParser + ?Sized>(parser: &P) -> WriterBuilder {
        WriterBuilder {
            builder: csv_line_core::WriterBuilder::from_parser(parser),
            ..WriterBuilder::default()
        }
    }

    /// Build a CSV writer from this configuration that writes data to `wtr`.
    ///
    /// Note that the CSV writer is buffered automatically, so you should not
    /// wrap `wtr` in a buffered writer like `io::BufWriter`.
    pub fn from_writer<W: io::Write>(&self, wtr: W) -> Writer<W> {
        Writer {
            wtr: Some(wtr),
            core: self.builder.build(),
            term: self.term,
            buf: String::with_capacity(self.capacity),
            capacity: self.capacity,
            panicked: false,
        }
    }

    /// Build a CSV writer from this configuration that writes data to the
    /// given file path. The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Writer<File>> {
        Ok(self.from_writer(File::create(path)?))
    }

    /// The field separator to use when writing CSV.
    ///
    /// The default is `','`.
    pub fn separator(&mut self, separator: char) -> &mut WriterBuilder {
        self.builder.separator(separator);
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.builder.quote(quote);
        self
    }

    /// The null field policy of the reader that will consume the output.
    pub fn null_field_policy(
        &mut self,
        policy: NullFieldPolicy,
    ) -> &mut WriterBuilder {
        self.builder.null_field_policy(policy);
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// The default is `QuoteStyle::Necessary`.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.builder.quote_style(style);
        self
    }

    /// The record terminator to use when writing CSV.
    ///
    /// The default is `Terminator::LF`.
    pub fn terminator(&mut self, term: Terminator) -> &mut WriterBuilder {
        self.term = term;
        self
    }

    /// Set the capacity (in bytes) of the internal buffer used in the CSV
    /// writer. This defaults to a reasonable setting.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut WriterBuilder {
        self.capacity = capacity;
        self
    }
}

/// A CSV writer.
///
/// Every record is written as one logical line followed by the configured
/// terminator. Fields that contain a line break are quoted, so such a record
/// occupies several physical lines but still reads back as one record.
///
/// The writer buffers its output and flushes it when dropped. Errors that
/// happen during that last flush are ignored; call `flush` to observe them.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    wtr: Option<W>,
    core: csv_line_core::Writer,
    term: Terminator,
    buf: String,
    capacity: usize,
    /// Set while writing to `wtr`, so that a panic in the middle of a write
    /// does not cause a second write from `Drop`.
    panicked: bool,
}

impl<W: io::Write> Drop for Writer<W> {
    fn drop(&mut self) {
        if self.wtr.is_some() && !self.panicked {
            let _ = self.flush();
        }
    }
}

impl Writer<File> {
    /// Build a CSV writer with a default configuration that writes data to
    /// the given file path. The file is truncated if it already exists.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Writer<File>> {
        WriterBuilder::new().from_path(path)
    }
}

impl<W: io::Write> Writer<W> {
    /// Build a CSV writer with a default configuration that writes data to
    /// `wtr`.
    pub fn from_writer(wtr: W) -> Writer<W> {
        WriterBuilder::new().from_writer(wtr)
    }

    /// Write a single record.
    ///
    /// A `None` field is written as a null field; see
    /// `csv_line_core::Writer` for how nulls are represented.
    ///
    /// A `&Record` can be passed directly.
    pub fn write_record<I, T>(&mut self, record: I) -> Result<()>
    where
        I: IntoIterator<Item = Option<T>>,
        T: AsRef<str>,
    {
        self.core.write_record_into(record, &mut self.buf);
        self.buf.push_str(self.term.as_str());
        if self.buf.len() >= self.capacity {
            self.flush_buf()?;
        }
        Ok(())
    }

    /// Write a single record in which no field is null.
    pub fn write_fields<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.write_record(fields.into_iter().map(Some))
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// If there was a problem writing to the underlying writer, then an
    /// error is returned.
    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_buf()?;
        match self.wtr {
            Some(ref mut wtr) => wtr.flush(),
            None => Ok(()),
        }
    }

    fn flush_buf(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        self.panicked = true;
        let result = match self.wtr {
            Some(ref mut wtr) => wtr.write_all(self.buf.as_bytes()),
            None => Ok(()),
        };
        self.panicked = false;
        result?;
        self.buf.clear();
        Ok(())
    }

    /// Return a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        self.wtr.as_ref().expect("writer is present until into_inner")
    }

    /// Flush the contents of the internal buffer and return the underlying
    /// writer.
    pub fn into_inner(
        mut self,
    ) -> std::result::Result<W, IntoInnerError<Writer<W>>> {
        match self.flush() {
            Ok(()) => match self.wtr.take() {
                Some(wtr) => Ok(wtr),
                None => Err(IntoInnerError::new(
                    self,
                    io::Error::new(io::ErrorKind::Other, "writer is gone"),
                )),
            },
            Err(err) => Err(IntoInnerError::new(self, err)),
        }
    }
}
