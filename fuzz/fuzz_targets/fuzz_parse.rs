#![no_main]
use libfuzzer_sys::fuzz_target;

use csv_line::{ReaderBuilder, Record, WriterBuilder};

fuzz_target!(|data: &[u8]| {
    let mut rdr = ReaderBuilder::new().from_reader(data);
    let records: Vec<Record> = rdr.records().filter_map(Result::ok).collect();

    let mut wtr = WriterBuilder::from_parser(rdr.parser()).from_writer(vec![]);
    for record in &records {
        wtr.write_record(record).unwrap();
    }
    let written = wtr.into_inner().unwrap();

    let again = ReaderBuilder::new()
        .keep_carriage_return(true)
        .from_reader(&written[..])
        .read_all()
        .unwrap();
    assert_eq!(records, again);
});
