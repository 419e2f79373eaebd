/*!
`csv-line-core` provides a line-oriented RFC 4180 CSV tokenizer.

The tokenizer is fed one physical line of text at a time and turns it into a
record: an ordered list of fields, each of which is either a string or null.
Quoted fields may contain separators, doubled quotes and, in multi-line mode,
line breaks. When a quoted field is not finished at the end of a line, the
parser holds on to it and reports that it needs another line.

This crate does no I/O. Reading lines from a stream is left to the caller
(the `csv-line` crate provides a reader on top of `std::io::BufRead`).

# Example

Reading a record whose second field spans two lines:

```
use csv_line_core::{LineParser, ParserBuilder};

let mut parser = ParserBuilder::new().build();
let mut record = vec![];
for line in &["1,\"first", "second\",3"] {
    if let Some(fields) = parser.parse(Some(*line), true) {
        record.extend(fields);
    }
}
assert!(!parser.is_pending());
assert_eq!(record, vec![
    Some("1".to_string()),
    Some("first\nsecond".to_string()),
    Some("3".to_string()),
]);
```

# Null fields

Whether an empty field is reported as null depends on the
[`NullFieldPolicy`](enum.NullFieldPolicy.html):

```
use csv_line_core::{LineParser, NullFieldPolicy, ParserBuilder};

let mut parser = ParserBuilder::new()
    .null_field_policy(NullFieldPolicy::EmptySeparatorsAsNull)
    .build();
assert_eq!(parser.parse_line("a,,\"\""), vec![
    Some("a".to_string()),
    None,
    Some("".to_string()),
]);
```
*/

#![deny(missing_docs)]

pub use crate::parser::{
    LineParser, NullFieldPolicy, ParserBuilder, Rfc4180Parser,
};
pub use crate::writer::{QuoteStyle, Writer, WriterBuilder};

mod parser;
mod writer;
