/*!
The `csv-line` crate reads and writes CSV data one physical line at a time,
following RFC 4180 quoting.

Records may span several physical lines when a quoted field contains a line
break. Every field is either a string or null, and the
[`NullFieldPolicy`](enum.NullFieldPolicy.html) decides which empty fields are
reported as null.

The tokenizer itself lives in the
[`csv-line-core`](https://docs.rs/csv-line-core) crate and does no I/O. This
crate adds a [`Reader`](struct.Reader.html) that pulls lines from any
`io::Read`, a [`Writer`](struct.Writer.html) that produces output the reader
parses back into the same records, and a [`Record`](struct.Record.html) type.

# Example

```
use std::error::Error;
use csv_line::{NullFieldPolicy, ReaderBuilder};

# fn main() { example().unwrap(); }
fn example() -> Result<(), Box<dyn Error>> {
    let data = "\
name,comment,score
alice,\"likes \"\"quotes\"\"\",10
bob,,
carol,\"line one
line two\",7
";
    let mut rdr = ReaderBuilder::new()
        .skip_lines(1)
        .null_field_policy(NullFieldPolicy::EmptySeparatorsAsNull)
        .from_reader(data.as_bytes());
    let mut records = vec![];
    for result in rdr.records() {
        records.push(result?);
    }
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].get(1), Some(Some("likes \"quotes\"")));
    assert_eq!(records[1].get(1), Some(None));
    assert_eq!(records[2].get(1), Some(Some("line one\nline two")));
    Ok(())
}
```

# Logging

The reader logs through the [`log`](https://docs.rs/log) facade: records that
continue onto another line are reported at `debug` level, and a quoted field
left open at the end of the input is reported at `warn` level.
*/

#![deny(missing_docs)]

pub use csv_line_core::{
    LineParser, NullFieldPolicy, ParserBuilder, QuoteStyle, Rfc4180Parser,
};
pub use csv_line_core::{
    Writer as LineWriter, WriterBuilder as LineWriterBuilder,
};

pub use crate::error::{Error, IntoInnerError, Result, Utf8Error};
pub use crate::reader::{
    Position, Reader, ReaderBuilder, RecordsIntoIter, RecordsIter,
};
pub use crate::record::{Record, RecordIter};
pub use crate::writer::{Terminator, Writer, WriterBuilder};

mod error;
mod reader;
mod record;
#[cfg(feature = "serde")]
mod serde_impl;
mod writer;
