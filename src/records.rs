use csv::ReaderBuilder;
use std::{collections::HashMap, fs::File, io::Read, path::Path};

use crate::error::{MapperError, Result};

const UTF8_BOM: char = '\u{feff}';

/// One data line of the input, keyed by header name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceRow {
    fields: HashMap<String, String>,
}

impl SourceRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceRow {
    // Later duplicates of a header overwrite earlier ones.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let fields = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        SourceRow { fields }
    }
}

pub fn read_rows<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Vec<SourceRow>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MapperError::io(path, e))?;
    // The CSV reader is buffered automatically, so it does not need to be
    // wrapped in an io::BufReader
    read_rows_from_reader(file, delimiter)
}

/// Reads every data row from `reader`. The first line is the header.
///
/// Rows may be shorter or longer than the header: missing cells are simply
/// absent from the row and surplus cells are dropped.
pub fn read_rows_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Vec<SourceRow>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, name)| match i {
            0 => name.trim_start_matches(UTF8_BOM).to_owned(),
            _ => name.to_owned(),
        })
        .collect();

    let mut rows: Vec<SourceRow> = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_owned))
                .collect(),
        );
    }

    Ok(rows)
}
