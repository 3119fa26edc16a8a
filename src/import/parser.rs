use std::{io, str::FromStr};

use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use tracing::debug;

use super::error::{ImportError, RowError};

/// CSV columns understood by the importer, in header-name order of the catalog export.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Field {
    Name,
    Genre,
    Description,
    Director,
    Actors,
    Year,
    Runtime,
    Rating,
    Votes,
    Revenue,
    Metascore,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Name,
        Field::Genre,
        Field::Description,
        Field::Director,
        Field::Actors,
        Field::Year,
        Field::Runtime,
        Field::Rating,
        Field::Votes,
        Field::Revenue,
        Field::Metascore,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Genre => "Genre",
            Field::Description => "Description",
            Field::Director => "Director",
            Field::Actors => "Actors",
            Field::Year => "Year",
            Field::Runtime => "Runtime (Minutes)",
            Field::Rating => "Rating",
            Field::Votes => "Votes",
            Field::Revenue => "Revenue (Millions)",
            Field::Metascore => "Metascore",
        }
    }

    /// Whether the header row must carry this column.
    pub fn required(self) -> bool {
        !matches!(self, Field::Year | Field::Revenue | Field::Metascore)
    }
}

/// One data row, typed but not yet validated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRecord {
    pub line: u64,
    pub name: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<i32>,
    pub rating: Option<f64>,
    pub votes: i32,
    pub revenue: Option<f64>,
    pub metascore: Option<i32>,
}

#[derive(Debug)]
struct ColumnMap([Option<usize>; Field::ALL.len()]);

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let mut positions = [None; Field::ALL.len()];
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim_start_matches('\u{feff}').trim();
            if let Some(field) = Field::ALL.iter().find(|f| f.header() == name) {
                positions[*field as usize].get_or_insert(idx);
            }
        }

        let missing: Vec<&'static str> = Field::ALL
            .iter()
            .filter(|f| f.required() && positions[**f as usize].is_none())
            .map(|f| f.header())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        Ok(Self(positions))
    }

    fn cell<'r>(&self, record: &'r StringRecord, field: Field) -> Option<&'r str> {
        self.0[field as usize].and_then(|idx| record.get(idx))
    }
}

/// Lazily yields one [`RawRecord`] per data row, in file order.
pub struct RecordReader<R> {
    rows: StringRecordsIntoIter<R>,
    columns: ColumnMap,
}

impl<R: io::Read> RecordReader<R> {
    /// Reads the header row. Fails only when the header cannot be read or lacks required columns.
    pub fn new(reader: R) -> Result<Self, ImportError> {
        let mut csv = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
        let headers = csv.headers()?.clone();
        debug!(columns = headers.len(), "read csv header");
        let columns = ColumnMap::from_headers(&headers)?;
        Ok(Self { rows: csv.into_records(), columns })
    }

    fn record(&self, row: &StringRecord) -> Result<RawRecord, RowError> {
        let line = row.position().map(|p| p.line()).unwrap_or_default();

        let votes = self
            .number::<i32>(row, Field::Votes, line)?
            .ok_or_else(|| RowError::malformed(line, "Votes is required"))?;

        Ok(RawRecord {
            line,
            name: self.columns.cell(row, Field::Name).map(str::to_string),
            genre: self.text(row, Field::Genre),
            description: self.text(row, Field::Description),
            director: self.text(row, Field::Director),
            actors: self.text(row, Field::Actors),
            year: self.number(row, Field::Year, line)?,
            runtime: self.number(row, Field::Runtime, line)?,
            rating: self.decimal(row, Field::Rating, line)?,
            votes,
            revenue: self.decimal(row, Field::Revenue, line)?,
            metascore: self.number(row, Field::Metascore, line)?,
        })
    }

    fn text(&self, row: &StringRecord, field: Field) -> Option<String> {
        self.columns.cell(row, field).filter(|s| !s.trim().is_empty()).map(str::to_string)
    }

    fn number<T: FromStr>(
        &self,
        row: &StringRecord,
        field: Field,
        line: u64,
    ) -> Result<Option<T>, RowError> {
        match self.columns.cell(row, field).map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => text.parse().map(Some).map_err(|_| {
                RowError::malformed(line, format!("{} is not a number: {text:?}", field.header()))
            }),
        }
    }

    fn decimal(&self, row: &StringRecord, field: Field, line: u64) -> Result<Option<f64>, RowError> {
        match self.number::<f64>(row, field, line)? {
            Some(value) if !value.is_finite() => Err(RowError::malformed(
                line,
                format!("{} is not a finite number", field.header()),
            )),
            value => Ok(value),
        }
    }
}

impl<R: io::Read> Iterator for RecordReader<R> {
    type Item = Result<RawRecord, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = match self.rows.next()? {
            Ok(row) => row,
            Err(err) if err.is_io_error() => return Some(Err(RowError::Read(err))),
            Err(err) => {
                let line = err.position().map(|p| p.line()).unwrap_or_default();
                return Some(Err(RowError::malformed(line, err.to_string())));
            },
        };
        Some(self.record(&row))
    }
}
