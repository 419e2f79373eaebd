use crate::parser::{LineParser, Needle, NullFieldPolicy};

/// The quoting style to use when writing CSV data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QuoteStyle {
    /// This puts quotes around every non-null field. Always.
    Always,
    /// This puts quotes around fields only when necessary.
    ///
    /// They are necessary when fields contain a quote, separator, carriage
    /// return or line feed, and when an empty field would otherwise be read
    /// back as null.
    ///
    /// This is the default.
    Necessary,
    /// This *never* writes quotes.
    ///
    /// Fields that need quotes are written as is, so the output may not
    /// parse back into the same record.
    Never,
}

impl Default for QuoteStyle {
    fn default() -> QuoteStyle {
        QuoteStyle::Necessary
    }
}

/// A builder for configuring a CSV line writer.
///
/// This builder permits specifying the separator, quote character, null
/// field policy and quoting style.
#[derive(Debug, Default)]
pub struct WriterBuilder {
    wtr: Writer,
}

impl WriterBuilder {
    /// Create a new builder for configuring a CSV line writer.
    pub fn new() -> WriterBuilder {
        WriterBuilder::default()
    }

    /// Create a builder that writes the same dialect that `parser` reads.
    pub fn from_parser<P: LineParser + ?Sized>(parser: &P) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .separator(parser.separator())
            .quote(parser.quote_char())
            .null_field_policy(parser.null_field_policy());
        builder
    }

    /// Build a writer from this configuration.
    pub fn build(&self) -> Writer {
        self.wtr.clone()
    }

    /// The field separator to use when writing CSV.
    ///
    /// The default is `','`.
    pub fn separator(&mut self, separator: char) -> &mut WriterBuilder {
        self.wtr.separator = separator;
        self
    }

    /// The quote character to use when writing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut WriterBuilder {
        self.wtr.quote = quote;
        self.wtr.quote_needle = Needle::new(quote);
        self
    }

    /// The null field policy of the reader that will consume the output.
    ///
    /// The writer uses it to decide how to write null and empty fields so
    /// that they read back the same way.
    pub fn null_field_policy(
        &mut self,
        policy: NullFieldPolicy,
    ) -> &mut WriterBuilder {
        self.wtr.policy = policy;
        self
    }

    /// The quoting style to use when writing CSV.
    ///
    /// By default, this is set to `QuoteStyle::Necessary`, which will only
    /// use quotes when they are necessary to preserve the integrity of data.
    pub fn quote_style(&mut self, style: QuoteStyle) -> &mut WriterBuilder {
        self.wtr.style = style;
        self
    }
}

/// Converts records into single lines of CSV text.
///
/// Quotes inside quoted fields are escaped by doubling them, as RFC 4180
/// requires. No record terminator is written.
///
/// Null fields are written as nothing at all, except when the policy only
/// nulls quoted empty fields (`NullFieldPolicy::EmptyQuotesAsNull`), in
/// which case they are written as `""`. Together with quoting empty strings
/// under `NullFieldPolicy::EmptySeparatorsAsNull`, this keeps the difference
/// between null and empty across a write and a read.
///
/// # Example
///
/// ```
/// use csv_line_core::Writer;
///
/// let wtr = Writer::new();
/// let line = wtr.write_record(vec![Some("a"), Some("b,c"), None]);
/// assert_eq!(line, "a,\"b,c\",");
/// ```
#[derive(Clone, Debug)]
pub struct Writer {
    separator: char,
    quote: char,
    quote_needle: Needle,
    policy: NullFieldPolicy,
    style: QuoteStyle,
}

impl Default for Writer {
    fn default() -> Writer {
        Writer {
            separator: ',',
            quote: '"',
            quote_needle: Needle::Byte(b'"'),
            policy: NullFieldPolicy::default(),
            style: QuoteStyle::default(),
        }
    }
}

impl Writer {
    /// Creates a new CSV line writer with the default configuration.
    pub fn new() -> Writer {
        Writer::default()
    }

    /// The field separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// The quote character.
    pub fn quote_char(&self) -> char {
        self.quote
    }

    /// The null field policy this writer writes for.
    pub fn null_field_policy(&self) -> NullFieldPolicy {
        self.policy
    }

    /// The quoting style.
    pub fn quote_style(&self) -> QuoteStyle {
        self.style
    }

    /// Write a record as one line of CSV text, without a terminator.
    pub fn write_record<I, T>(&self, record: I) -> String
    where
        I: IntoIterator<Item = Option<T>>,
        T: AsRef<str>,
    {
        let mut line = String::new();
        self.write_record_into(record, &mut line);
        line
    }

    /// Like `write_record`, but appends to `line`.
    pub fn write_record_into<I, T>(&self, record: I, line: &mut String)
    where
        I: IntoIterator<Item = Option<T>>,
        T: AsRef<str>,
    {
        for (i, field) in record.into_iter().enumerate() {
            if i > 0 {
                line.push(self.separator);
            }
            match field {
                None => self.write_null(line),
                Some(field) => self.write_field(field.as_ref(), line),
            }
        }
    }

    fn write_null(&self, line: &mut String) {
        if self.style != QuoteStyle::Never
            && self.policy == NullFieldPolicy::EmptyQuotesAsNull
        {
            line.push(self.quote);
            line.push(self.quote);
        }
    }

    fn write_field(&self, field: &str, line: &mut String) {
        if !self.should_quote(field) {
            line.push_str(field);
            return;
        }
        line.push(self.quote);
        for ch in field.chars() {
            if ch == self.quote {
                line.push(self.quote);
            }
            line.push(ch);
        }
        line.push(self.quote);
    }

    fn should_quote(&self, field: &str) -> bool {
        match self.style {
            QuoteStyle::Always => true,
            QuoteStyle::Never => false,
            QuoteStyle::Necessary => {
                if field.is_empty() {
                    return self.policy.nulls_empty_separators();
                }
                self.quote_needle.is_in(field)
                    || field.contains(self.separator)
                    || field.contains(|c: char| c == '\n' || c == '\r')
            }
        }
    }
}
