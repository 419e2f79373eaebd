use memchr::{memchr, memchr_iter};

/// Selects which empty fields are reported as null instead of as an empty
/// string.
///
/// An "empty separator" field is one with nothing at all between two
/// separators, e.g., the middle field of `a,,b`. An "empty quotes" field is a
/// quoted field with no content, e.g., the middle field of `a,"",b`.
///
/// | Policy                  | `a,,b`     | `a,"",b`   |
/// |-------------------------|------------|------------|
/// | `None`                  | `""`       | `""`       |
/// | `EmptySeparatorsAsNull` | null       | `""`       |
/// | `EmptyQuotesAsNull`     | `""`       | null       |
/// | `Both`                  | null       | null       |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NullFieldPolicy {
    /// No field is ever null. This is the default.
    None,
    /// Fields with nothing between their separators are null.
    EmptySeparatorsAsNull,
    /// Quoted fields with no content are null.
    EmptyQuotesAsNull,
    /// Both kinds of empty field are null.
    Both,
}

impl Default for NullFieldPolicy {
    fn default() -> NullFieldPolicy {
        NullFieldPolicy::None
    }
}

impl NullFieldPolicy {
    /// Returns true if unquoted empty fields are reported as null.
    pub fn nulls_empty_separators(&self) -> bool {
        match *self {
            NullFieldPolicy::EmptySeparatorsAsNull | NullFieldPolicy::Both => {
                true
            }
            NullFieldPolicy::None | NullFieldPolicy::EmptyQuotesAsNull => false,
        }
    }

    /// Returns true if quoted empty fields are reported as null.
    pub fn nulls_empty_quotes(&self) -> bool {
        match *self {
            NullFieldPolicy::EmptyQuotesAsNull | NullFieldPolicy::Both => true,
            NullFieldPolicy::None | NullFieldPolicy::EmptySeparatorsAsNull => {
                false
            }
        }
    }
}

/// A tokenizer that turns physical lines of CSV text into records.
///
/// A record is a sequence of optional fields, where `None` is a null field
/// as decided by the parser's `NullFieldPolicy`.
///
/// Implementations are stateful: a quoted field may span several physical
/// lines, in which case the parser holds the unterminated part of the field
/// until the next call. A single parser must therefore only ever be fed
/// lines from one stream. Build one parser per stream if several streams are
/// read at the same time.
pub trait LineParser {
    /// Parse one physical line.
    ///
    /// `line` is `None` at the end of input. `multi_line` permits a record to
    /// continue onto the next physical line. When it is `false`, any
    /// continuation left over from a previous call is discarded.
    ///
    /// This returns `None` when there is no record to report. That happens at
    /// the end of input, and when a multi-line call completed no field at all
    /// (in which case `is_pending` returns `true`). When a multi-line call
    /// leaves a field pending after completing some fields, the completed
    /// fields are returned and the caller is expected to append the fields
    /// of the next call to them.
    fn parse(
        &mut self,
        line: Option<&str>,
        multi_line: bool,
    ) -> Option<Vec<Option<String>>>;

    /// Returns true when the parser is in the middle of a record and needs
    /// another physical line to finish it.
    fn is_pending(&self) -> bool;

    /// The buffered text of a field that has not been terminated yet, if any.
    fn pending_text(&self) -> Option<&str>;

    /// The field separator.
    fn separator(&self) -> char;

    /// The quote character.
    fn quote_char(&self) -> char;

    /// The policy that decides which empty fields are null.
    fn null_field_policy(&self) -> NullFieldPolicy;

    /// Parse a line that is known to hold an entire record.
    fn parse_line(&mut self, line: &str) -> Vec<Option<String>> {
        self.parse(Some(line), false).unwrap_or_default()
    }

    /// Parse a line that may be only part of a record.
    ///
    /// This is a shorthand for `parse(Some(line), true)`.
    fn parse_line_multi(&mut self, line: &str) -> Option<Vec<Option<String>>> {
        self.parse(Some(line), true)
    }
}

impl<'a, P: LineParser + ?Sized> LineParser for &'a mut P {
    fn parse(
        &mut self,
        line: Option<&str>,
        multi_line: bool,
    ) -> Option<Vec<Option<String>>> {
        (**self).parse(line, multi_line)
    }

    fn is_pending(&self) -> bool {
        (**self).is_pending()
    }

    fn pending_text(&self) -> Option<&str> {
        (**self).pending_text()
    }

    fn separator(&self) -> char {
        (**self).separator()
    }

    fn quote_char(&self) -> char {
        (**self).quote_char()
    }

    fn null_field_policy(&self) -> NullFieldPolicy {
        (**self).null_field_policy()
    }
}

impl<P: LineParser + ?Sized> LineParser for Box<P> {
    fn parse(
        &mut self,
        line: Option<&str>,
        multi_line: bool,
    ) -> Option<Vec<Option<String>>> {
        (**self).parse(line, multi_line)
    }

    fn is_pending(&self) -> bool {
        (**self).is_pending()
    }

    fn pending_text(&self) -> Option<&str> {
        (**self).pending_text()
    }

    fn separator(&self) -> char {
        (**self).separator()
    }

    fn quote_char(&self) -> char {
        (**self).quote_char()
    }

    fn null_field_policy(&self) -> NullFieldPolicy {
        (**self).null_field_policy()
    }
}

/// A literal matcher for a single character.
///
/// ASCII characters are searched for with `memchr`. Anything else falls back
/// to a plain `char` search, which is correct but slower.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Needle {
    Byte(u8),
    Char(char),
}

impl Needle {
    pub(crate) fn new(ch: char) -> Needle {
        if ch.is_ascii() {
            Needle::Byte(ch as u8)
        } else {
            Needle::Char(ch)
        }
    }

    /// The length of the character in bytes.
    pub(crate) fn len(&self) -> usize {
        match *self {
            Needle::Byte(_) => 1,
            Needle::Char(ch) => ch.len_utf8(),
        }
    }

    /// Find the first occurrence at or after byte offset `at`.
    pub(crate) fn find(&self, haystack: &str, at: usize) -> Option<usize> {
        if at >= haystack.len() {
            return None;
        }
        match *self {
            Needle::Byte(b) => {
                memchr(b, &haystack.as_bytes()[at..]).map(|i| at + i)
            }
            Needle::Char(ch) => {
                haystack.get(at..)?.find(ch).map(|i| at + i)
            }
        }
    }

    pub(crate) fn is_in(&self, haystack: &str) -> bool {
        self.find(haystack, 0).is_some()
    }

    /// Returns true if the character occurs exactly at byte offset `at`.
    pub(crate) fn is_at(&self, haystack: &str, at: usize) -> bool {
        match *self {
            Needle::Byte(b) => haystack.as_bytes().get(at) == Some(&b),
            Needle::Char(ch) => {
                haystack.get(at..).map_or(false, |rest| rest.starts_with(ch))
            }
        }
    }

    pub(crate) fn ends(&self, haystack: &str) -> bool {
        match *self {
            Needle::Byte(b) => haystack.as_bytes().last() == Some(&b),
            Needle::Char(ch) => haystack.ends_with(ch),
        }
    }

    /// Split on every occurrence, keeping empty pieces (including a trailing
    /// one).
    pub(crate) fn split(&self, haystack: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut start = 0;
        match *self {
            Needle::Byte(b) => {
                for i in memchr_iter(b, haystack.as_bytes()) {
                    pieces.push(haystack[start..i].to_string());
                    start = i + 1;
                }
            }
            Needle::Char(ch) => {
                for (i, _) in haystack.match_indices(ch) {
                    pieces.push(haystack[start..i].to_string());
                    start = i + ch.len_utf8();
                }
            }
        }
        pieces.push(haystack[start..].to_string());
        pieces
    }
}

/// Builds an RFC 4180 line parser with various configuration knobs.
///
/// Once a parser is built, its configuration cannot be changed.
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    separator: char,
    quote: char,
    policy: NullFieldPolicy,
}

impl Default for ParserBuilder {
    fn default() -> ParserBuilder {
        ParserBuilder {
            separator: ',',
            quote: '"',
            policy: NullFieldPolicy::default(),
        }
    }
}

impl ParserBuilder {
    /// Create a new builder.
    pub fn new() -> ParserBuilder {
        ParserBuilder::default()
    }

    /// Build a parser from this configuration.
    pub fn build(&self) -> Rfc4180Parser {
        Rfc4180Parser {
            separator: self.separator,
            quote: self.quote,
            policy: self.policy,
            sep_needle: Needle::new(self.separator),
            quote_needle: Needle::new(self.quote),
            quote_pair: [self.quote, self.quote].iter().collect(),
            pending: None,
        }
    }

    /// The field separator to use when parsing CSV.
    ///
    /// The default is `','`. The separator must differ from the quote
    /// character; if it does not, splitting is unspecified.
    pub fn separator(&mut self, separator: char) -> &mut ParserBuilder {
        self.separator = separator;
        self
    }

    /// The quote character to use when parsing CSV.
    ///
    /// The default is `'"'`.
    pub fn quote(&mut self, quote: char) -> &mut ParserBuilder {
        self.quote = quote;
        self
    }

    /// Which empty fields should be reported as null.
    ///
    /// The default is `NullFieldPolicy::None`.
    pub fn null_field_policy(
        &mut self,
        policy: NullFieldPolicy,
    ) -> &mut ParserBuilder {
        self.policy = policy;
        self
    }

    /// The configured separator.
    pub fn get_separator(&self) -> char {
        self.separator
    }

    /// The configured quote character.
    pub fn get_quote(&self) -> char {
        self.quote
    }

    /// The configured null field policy.
    pub fn get_null_field_policy(&self) -> NullFieldPolicy {
        self.policy
    }
}

/// A line parser that follows RFC 4180 quoting.
///
/// Fields may be quoted, and a quote inside a quoted field is escaped by
/// doubling it. There is no separate escape character. Malformed input never
/// produces an error: an unterminated quoted field simply runs to the end of
/// the line (or, in multi-line mode, onto the next line).
///
/// # Example
///
/// ```
/// use csv_line_core::{LineParser, Rfc4180Parser};
///
/// let mut parser = Rfc4180Parser::new();
/// let fields = parser.parse_line("a,\"b,c\",\"say \"\"hi\"\"\"");
/// assert_eq!(fields, vec![
///     Some("a".to_string()),
///     Some("b,c".to_string()),
///     Some("say \"hi\"".to_string()),
/// ]);
/// ```
#[derive(Clone, Debug)]
pub struct Rfc4180Parser {
    separator: char,
    quote: char,
    policy: NullFieldPolicy,
    sep_needle: Needle,
    quote_needle: Needle,
    /// Two quote characters, the escaped form of one literal quote.
    quote_pair: String,
    /// The unterminated quoted field carried over from the previous line,
    /// with the line break that separated it from the next one.
    pending: Option<String>,
}

impl Default for Rfc4180Parser {
    fn default() -> Rfc4180Parser {
        ParserBuilder::new().build()
    }
}

impl LineParser for Rfc4180Parser {
    fn parse(
        &mut self,
        line: Option<&str>,
        multi_line: bool,
    ) -> Option<Vec<Option<String>>> {
        if !multi_line {
            self.pending = None;
        }
        let line = match line {
            Some(line) => line,
            None => {
                return self.pending.take().map(|field| vec![Some(field)]);
            }
        };

        let joined;
        let text = match self.pending.take() {
            Some(mut pending) => {
                pending.push_str(line);
                joined = pending;
                joined.as_str()
            }
            None => line,
        };

        if !self.quote_needle.is_in(text) {
            return Some(self.null_empty_separators(self.sep_needle.split(text)));
        }
        let fields = self.split_quoted(text, multi_line);
        if fields.is_empty() && self.pending.is_some() {
            return None;
        }
        let fields = self
            .null_empty_separators(fields)
            .into_iter()
            .map(|field| match field {
                Some(field) if self.quote_needle.is_in(&field) => {
                    self.unescape(&field)
                }
                field => field,
            })
            .collect();
        Some(fields)
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn pending_text(&self) -> Option<&str> {
        self.pending.as_ref().map(|s| s.as_str())
    }

    fn separator(&self) -> char {
        self.separator
    }

    fn quote_char(&self) -> char {
        self.quote
    }

    fn null_field_policy(&self) -> NullFieldPolicy {
        self.policy
    }
}

impl Rfc4180Parser {
    /// Create a parser with the default configuration: `,` as the separator,
    /// `"` as the quote and no null fields.
    pub fn new() -> Rfc4180Parser {
        Rfc4180Parser::default()
    }

    /// Split a line that contains at least one quote character.
    ///
    /// Fields are returned raw, i.e., quoted fields still carry their quotes.
    /// In multi-line mode, a trailing field whose closing quote is missing is
    /// removed and stashed in `pending`.
    fn split_quoted(&mut self, line: &str, multi_line: bool) -> Vec<String> {
        if line.is_empty() {
            return vec![String::new()];
        }
        let mut fields = vec![];
        let mut pos = 0;
        while pos < line.len() {
            let next_sep = self.sep_needle.find(line, pos);
            let next_quote = self.quote_needle.find(line, pos);
            match next_sep {
                None => {
                    fields.push(line[pos..].to_string());
                    pos = line.len();
                }
                Some(sep)
                    if next_quote.map_or(true, |q| q > sep || q != pos) =>
                {
                    fields.push(line[pos..sep].to_string());
                    pos = sep + self.sep_needle.len();
                }
                Some(_) => {
                    let end = self.quoted_field_end(line, pos);
                    fields.push(line[pos..end].to_string());
                    pos = end + self.sep_needle.len();
                }
            }
        }

        // A continuation wins over the trailing separator rule: the
        // separator belongs to the unterminated field.
        if multi_line && fields.last().map_or(false, |f| self.is_open(f)) {
            if let Some(mut field) = fields.pop() {
                field.push('\n');
                self.pending = Some(field);
            }
        } else if self.sep_needle.ends(line) {
            fields.push(String::new());
        }
        fields
    }

    /// Find the end of the quoted field that starts at `start`.
    ///
    /// The returned offset is just past the closing quote, or the length of
    /// the line if the field is not terminated by a quote followed by a
    /// separator.
    fn quoted_field_end(&self, line: &str, start: usize) -> usize {
        let qlen = self.quote_needle.len();
        // A quote is only interesting if something follows it.
        let has_next = |q: usize| q + qlen < line.len();

        let mut in_pair = false;
        let mut next = self.quote_needle.find(line, start + qlen);
        while let Some(q) = next.filter(|&q| has_next(q)) {
            if !in_pair && self.sep_needle.is_at(line, q + qlen) {
                return q + qlen;
            }
            let mut cursor = q;
            loop {
                next = self.quote_needle.find(line, cursor + qlen);
                in_pair = !in_pair;
                match next {
                    Some(q)
                        if has_next(q)
                            && self.quote_needle.is_at(line, q + qlen) =>
                    {
                        cursor = q;
                    }
                    _ => break,
                }
            }
        }
        line.len()
    }

    /// Returns true if `field` opens a quote that it never closes.
    ///
    /// After the opening quote, the field is closed only if it ends in an odd
    /// run of quotes: any even run is made of escaped quotes.
    fn is_open(&self, field: &str) -> bool {
        let qlen = self.quote_needle.len();
        if !self.quote_needle.is_at(field, 0) {
            return false;
        }
        let mut rest = &field[qlen..];
        let mut trailing = 0;
        while self.quote_needle.ends(rest) {
            rest = &rest[..rest.len() - qlen];
            trailing += 1;
        }
        trailing % 2 == 0
    }

    fn null_empty_separators(&self, fields: Vec<String>) -> Vec<Option<String>> {
        let nulls = self.policy.nulls_empty_separators();
        fields
            .into_iter()
            .map(|f| if nulls && f.is_empty() { None } else { Some(f) })
            .collect()
    }

    /// Strip the surrounding quotes from a field and collapse escaped quotes.
    fn unescape(&self, field: &str) -> Option<String> {
        let qlen = self.quote_needle.len();
        let mut value = field;
        if self.quote_needle.is_at(value, 0) {
            value = &value[qlen..];
            if self.quote_needle.ends(value) {
                value = &value[..value.len() - qlen];
            }
        }
        let mut buf = [0; 4];
        let quote: &str = self.quote.encode_utf8(&mut buf);
        let value = value.replace(self.quote_pair.as_str(), quote);
        if value.is_empty() && self.policy.nulls_empty_quotes() {
            None
        } else {
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{LineParser, Needle, NullFieldPolicy, ParserBuilder};

    type Row = Vec<Option<String>>;

    fn row(fields: &[Option<&str>]) -> Row {
        fields.iter().map(|f| f.map(|s| s.to_string())).collect()
    }

    macro_rules! parses_to {
        ($name:ident, $line:expr, $expected:expr) => {
            parses_to!($name, $line, $expected, |builder| builder);
        };
        ($name:ident, $line:expr, $expected:expr, $config:expr) => {
            #[test]
            fn $name() {
                let mut builder = ParserBuilder::new();
                $config(&mut builder);
                let mut parser = builder.build();
                let got = parser.parse(Some($line), false);
                assert_eq!(Some(row(&$expected)), got, "single line");
                assert!(!parser.is_pending());
            }
        };
    }

    parses_to!(one_field, "a", [Some("a")]);
    parses_to!(empty_line, "", [Some("")]);
    parses_to!(lone_separator, ",", [Some(""), Some("")]);
    parses_to!(
        simple,
        "a,b,,c",
        [Some("a"), Some("b"), Some(""), Some("c")]
    );
    parses_to!(trailing_empty, "a,b,", [Some("a"), Some("b"), Some("")]);
    parses_to!(leading_empty, ",a", [Some(""), Some("a")]);
    parses_to!(quoted_separator, "\"a,b\",c", [Some("a,b"), Some("c")]);
    parses_to!(quoted_escape, "\"a\"\"b\",c", [Some("a\"b"), Some("c")]);
    parses_to!(
        quoted_escape_before_separator,
        "\"a\"\"\",b",
        [Some("a\""), Some("b")]
    );
    parses_to!(
        quoted_escaped_quote_then_separator,
        "\"x\"\",y\",z",
        [Some("x\",y"), Some("z")]
    );
    parses_to!(quoted_only_quote, "\"\"\"\"", [Some("\"")]);
    parses_to!(quoted_empty, "a,\"\",b", [Some("a"), Some(""), Some("b")]);
    parses_to!(
        quoted_trailing_empty,
        "\"a\",",
        [Some("a"), Some("")]
    );
    parses_to!(
        quoted_last,
        "a,\"b\"",
        [Some("a"), Some("b")]
    );
    parses_to!(
        quote_mid_field,
        "ab\"c,d",
        [Some("ab\"c"), Some("d")]
    );
    parses_to!(
        doubled_quote_unquoted_field,
        "a\"\"b,c",
        [Some("a\"b"), Some("c")]
    );
    parses_to!(
        trailing_quote_unquoted_field,
        "ab\",c",
        [Some("ab\""), Some("c")]
    );
    parses_to!(
        quote_then_text_runs_to_end,
        "\"ab\"c,d",
        [Some("ab\"c,d")]
    );
    parses_to!(unterminated_single_line, "a,\"bc", [Some("a"), Some("bc")]);
    parses_to!(
        unterminated_single_line_trailing_separator,
        "\"bc,",
        [Some("bc,"), Some("")]
    );
    parses_to!(
        tab_separator,
        "a\t\"b\tc\"\td",
        [Some("a"), Some("b\tc"), Some("d")],
        |b: &mut ParserBuilder| {
            b.separator('\t');
        }
    );
    parses_to!(
        regex_meta_separator,
        "a|b||c",
        [Some("a"), Some("b"), Some(""), Some("c")],
        |b: &mut ParserBuilder| {
            b.separator('|');
        }
    );
    parses_to!(
        single_quote_char,
        "'a,b',c,'it''s'",
        [Some("a,b"), Some("c"), Some("it's")],
        |b: &mut ParserBuilder| {
            b.quote('\'');
        }
    );
    parses_to!(
        double_quote_is_literal_with_other_quote,
        "\"a,b\"",
        [Some("\"a"), Some("b\"")],
        |b: &mut ParserBuilder| {
            b.quote('\'');
        }
    );
    parses_to!(
        non_ascii_separator,
        "α§«β§γ«§",
        [Some("α"), Some("β§γ"), Some("")],
        |b: &mut ParserBuilder| {
            b.separator('§').quote('«');
        }
    );
    parses_to!(
        non_ascii_text,
        "héllo,\"wörld, ok\",ünï",
        [Some("héllo"), Some("wörld, ok"), Some("ünï")]
    );

    parses_to!(
        policy_none,
        "a,,\"\",b",
        [Some("a"), Some(""), Some(""), Some("b")]
    );
    parses_to!(
        policy_empty_separators,
        "a,,\"\",b",
        [Some("a"), None, Some(""), Some("b")],
        |b: &mut ParserBuilder| {
            b.null_field_policy(NullFieldPolicy::EmptySeparatorsAsNull);
        }
    );
    parses_to!(
        policy_empty_quotes,
        "a,,\"\",b",
        [Some("a"), Some(""), None, Some("b")],
        |b: &mut ParserBuilder| {
            b.null_field_policy(NullFieldPolicy::EmptyQuotesAsNull);
        }
    );
    parses_to!(
        policy_both,
        "a,,\"\",b",
        [Some("a"), None, None, Some("b")],
        |b: &mut ParserBuilder| {
            b.null_field_policy(NullFieldPolicy::Both);
        }
    );
    parses_to!(
        policy_empty_separators_fast_path,
        ",,",
        [None, None, None],
        |b: &mut ParserBuilder| {
            b.null_field_policy(NullFieldPolicy::EmptySeparatorsAsNull);
        }
    );
    parses_to!(
        policy_empty_quotes_fast_path,
        ",,",
        [Some(""), Some(""), Some("")],
        |b: &mut ParserBuilder| {
            b.null_field_policy(NullFieldPolicy::EmptyQuotesAsNull);
        }
    );
    parses_to!(
        policy_empty_separators_trailing_after_quote,
        "\"a\",",
        [Some("a"), None],
        |b: &mut ParserBuilder| {
            b.null_field_policy(NullFieldPolicy::EmptySeparatorsAsNull);
        }
    );

    #[test]
    fn policy_table() {
        let cases = [
            (NullFieldPolicy::None, Some(""), Some("")),
            (NullFieldPolicy::EmptySeparatorsAsNull, None, Some("")),
            (NullFieldPolicy::EmptyQuotesAsNull, Some(""), None),
            (NullFieldPolicy::Both, None, None),
        ];
        for &(policy, unquoted, quoted) in &cases {
            let mut parser =
                ParserBuilder::new().null_field_policy(policy).build();
            assert_eq!(
                parser.parse_line(",,"),
                row(&[unquoted, unquoted, unquoted]),
                "unquoted under {:?}",
                policy
            );
            assert_eq!(
                parser.parse_line(",\"\","),
                row(&[unquoted, quoted, unquoted]),
                "quoted under {:?}",
                policy
            );
        }
    }

    #[test]
    fn end_of_input_on_fresh_parser() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse(None, false), None);
        assert_eq!(parser.parse(None, true), None);
        assert!(!parser.is_pending());
        assert_eq!(parser.pending_text(), None);
    }

    #[test]
    fn multi_line_round_trip() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse(Some("\"abc"), true), None);
        assert!(parser.is_pending());
        assert_eq!(parser.pending_text(), Some("\"abc\n"));
        assert_eq!(
            parser.parse(Some("def\""), true),
            Some(row(&[Some("abc\ndef")]))
        );
        assert!(!parser.is_pending());
    }

    #[test]
    fn multi_line_many_lines() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("1,\"a"), Some(row(&[Some("1")])));
        assert_eq!(parser.parse_line_multi(""), None);
        assert_eq!(parser.pending_text(), Some("\"a\n\n"));
        assert_eq!(parser.parse_line_multi("b,c"), None);
        assert_eq!(
            parser.parse_line_multi("d\",2"),
            Some(row(&[Some("a\n\nb,c\nd"), Some("2")]))
        );
        assert!(!parser.is_pending());
    }

    #[test]
    fn multi_line_escaped_quote_at_line_end() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("\"a\"\""), None);
        assert!(parser.is_pending());
        assert_eq!(
            parser.parse_line_multi("b\""),
            Some(row(&[Some("a\"\nb")]))
        );
    }

    #[test]
    fn multi_line_lone_quote_opens_field() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("x,\""), Some(row(&[Some("x")])));
        assert!(parser.is_pending());
        assert_eq!(
            parser.parse_line_multi("\""),
            Some(row(&[Some("\n")]))
        );
    }

    #[test]
    fn multi_line_quoted_empty_is_complete() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(
            parser.parse_line_multi("a,\"\""),
            Some(row(&[Some("a"), Some("")]))
        );
        assert!(!parser.is_pending());
    }

    #[test]
    fn continuation_wins_over_trailing_separator() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("a,\"b,"), Some(row(&[Some("a")])));
        assert_eq!(parser.pending_text(), Some("\"b,\n"));
        assert_eq!(
            parser.parse_line_multi("c\","),
            Some(row(&[Some("b,\nc"), Some("")]))
        );
    }

    #[test]
    fn single_line_discards_pending() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("\"abc"), None);
        assert!(parser.is_pending());
        assert_eq!(parser.parse_line("x,y"), row(&[Some("x"), Some("y")]));
        assert!(!parser.is_pending());
        assert_eq!(parser.parse(None, true), None);
    }

    #[test]
    fn end_of_input_flushes_pending() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("\"abc"), None);
        assert_eq!(parser.parse(None, true), Some(row(&[Some("\"abc\n")])));
        assert!(!parser.is_pending());
        assert_eq!(parser.parse(None, true), None);
    }

    #[test]
    fn end_of_input_single_line_drops_pending() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line_multi("\"abc"), None);
        assert_eq!(parser.parse(None, false), None);
        assert!(!parser.is_pending());
    }

    #[test]
    fn single_line_never_pending() {
        let mut parser = ParserBuilder::new().build();
        assert_eq!(parser.parse_line("a,\"bc"), row(&[Some("a"), Some("bc")]));
        assert!(!parser.is_pending());
    }

    #[test]
    fn accessors() {
        let parser = ParserBuilder::new()
            .separator(';')
            .quote('\'')
            .null_field_policy(NullFieldPolicy::Both)
            .build();
        assert_eq!(parser.separator(), ';');
        assert_eq!(parser.quote_char(), '\'');
        assert_eq!(parser.null_field_policy(), NullFieldPolicy::Both);
    }

    #[test]
    fn boxed_parser() {
        let mut parser: Box<dyn LineParser> =
            Box::new(ParserBuilder::new().build());
        assert_eq!(parser.parse_line("a,b"), row(&[Some("a"), Some("b")]));
        assert_eq!(parser.separator(), ',');
    }

    /// Every string up to length 6 over a small alphabet.
    fn quote_free_texts() -> Vec<String> {
        let alphabet = ['a', ',', ' ', 'é'];
        let mut all = vec![String::new()];
        let mut last = vec![String::new()];
        for _ in 0..6 {
            let mut next = vec![];
            for s in &last {
                for &ch in &alphabet {
                    let mut t = s.clone();
                    t.push(ch);
                    next.push(t);
                }
            }
            all.extend(next.iter().cloned());
            last = next;
        }
        all
    }

    #[test]
    fn fast_path_matches_quote_aware_path() {
        let mut parser = ParserBuilder::new().build();
        for text in quote_free_texts() {
            let fast = parser.sep_needle.split(&text);
            let slow = parser.split_quoted(&text, false);
            assert_eq!(fast, slow, "text: {:?}", text);
            let slow_multi = parser.split_quoted(&text, true);
            assert_eq!(fast, slow_multi, "multi-line text: {:?}", text);
            assert!(!parser.is_pending());
        }
    }

    #[test]
    fn needle_find() {
        let comma = Needle::new(',');
        assert_eq!(comma, Needle::Byte(b','));
        assert_eq!(comma.find("a,b,c", 0), Some(1));
        assert_eq!(comma.find("a,b,c", 2), Some(3));
        assert_eq!(comma.find("a,b,c", 4), None);
        assert_eq!(comma.find("a,b,c", 99), None);

        let section = Needle::new('§');
        assert_eq!(section, Needle::Char('§'));
        assert_eq!(section.len(), 2);
        assert_eq!(section.find("a§b", 0), Some(1));
        assert!(section.is_at("a§b", 1));
        assert!(!section.is_at("a§b", 0));
        assert_eq!(section.split("§a§"), vec!["", "a", ""]);
    }
}
