use crate::error::{ProcessingError, Result};
use crate::models::Observation;
use crate::store::TemperatureStore;
use crate::utils::constants::{
    DATE_FIELD, DEFAULT_BUFFER_SIZE, DEFAULT_DELIMITER, FIELDS_PER_ROW, STATION_ID_FIELD,
    TEMPERATURE_FIELD,
};
use csv::{ReaderBuilder, StringRecord};
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::{debug, info};

pub struct TemperatureReader {
    has_header: bool,
    delimiter: u8,
    use_mmap: bool,
}

impl TemperatureReader {
    pub fn new() -> Self {
        Self {
            has_header: true,
            delimiter: DEFAULT_DELIMITER,
            use_mmap: false,
        }
    }

    pub fn with_has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Load a CSV file straight into a store
    pub fn read_store(&self, path: &Path) -> Result<TemperatureStore> {
        info!("Reading temperature data from {}", path.display());
        let file = File::open(path)?;

        if self.use_mmap {
            // SAFETY: the map is read-only and dropped before this call returns
            let mmap = unsafe { Mmap::map(&file)? };
            debug!("Memory-mapped {} bytes", mmap.len());
            self.store_from_reader(&mmap[..])
        } else {
            self.store_from_reader(file)
        }
    }

    /// Read every observation from a CSV file
    pub fn read_observations(&self, path: &Path) -> Result<Vec<Observation>> {
        let file = File::open(path)?;
        self.observations(file).collect()
    }

    pub fn store_from_reader<R: Read>(&self, reader: R) -> Result<TemperatureStore> {
        TemperatureStore::build(self.observations(reader))
    }

    /// Stream observations row by row
    pub fn observations<R: Read>(&self, reader: R) -> ObservationIterator<R> {
        let reader = ReaderBuilder::new()
            .has_headers(self.has_header)
            .delimiter(self.delimiter)
            .flexible(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(BlankLineDetector::new(reader, self.delimiter));

        ObservationIterator {
            reader,
            record: StringRecord::new(),
            finished: false,
        }
    }
}

impl Default for TemperatureReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one data row: station id, date, temperature
pub fn parse_record(record: &StringRecord) -> Result<Observation> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    if record.len() != FIELDS_PER_ROW {
        return Err(ProcessingError::invalid_record(
            line,
            format!("expected {} fields, found {}", FIELDS_PER_ROW, record.len()),
        ));
    }

    Observation::parse(
        &record[STATION_ID_FIELD],
        &record[DATE_FIELD],
        &record[TEMPERATURE_FIELD],
        line,
    )
}

/// Watches the bytes handed to the CSV parser for empty lines.
///
/// The parser drops empty lines silently, so they are located here with a
/// small lexer that knows about quoted fields and CRLF terminators. Only the
/// first one is kept.
struct BlankLineDetector<R> {
    inner: R,
    delimiter: u8,
    line: u64,
    at_line_start: bool,
    at_field_start: bool,
    in_quotes: bool,
    closed_quote: bool,
    after_cr: bool,
    blank_line: Option<u64>,
}

impl<R> BlankLineDetector<R> {
    fn new(inner: R, delimiter: u8) -> Self {
        Self {
            inner,
            delimiter,
            line: 1,
            at_line_start: true,
            at_field_start: true,
            in_quotes: false,
            closed_quote: false,
            after_cr: false,
            blank_line: None,
        }
    }

    /// 1-based line of the first empty line seen so far
    fn blank_line(&self) -> Option<u64> {
        self.blank_line
    }

    fn scan(&mut self, byte: u8) {
        let after_cr = std::mem::replace(&mut self.after_cr, false);
        let closed_quote = std::mem::replace(&mut self.closed_quote, false);

        if self.in_quotes {
            if byte == b'"' {
                self.in_quotes = false;
                self.closed_quote = true;
            }
        } else if byte == b'\n' || byte == b'\r' {
            // \r\n is one terminator
            let completes_crlf = after_cr && byte == b'\n';
            if self.at_line_start && !completes_crlf {
                self.blank_line.get_or_insert(self.line);
            }
            self.at_line_start = true;
            self.at_field_start = true;
            self.after_cr = byte == b'\r';
        } else if byte == b'"' && (self.at_field_start || closed_quote) {
            self.in_quotes = true;
            self.at_line_start = false;
            self.at_field_start = false;
        } else {
            self.at_line_start = false;
            self.at_field_start = byte == self.delimiter;
        }

        if byte == b'\n' {
            self.line += 1;
        }
    }
}

impl<R: Read> Read for BlankLineDetector<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        for &byte in &buf[..n] {
            self.scan(byte);
        }
        Ok(n)
    }
}

/// Iterator over the observations of a CSV source.
///
/// An empty line is a row with no fields: iteration stops with an
/// `InvalidRecord` once the parser has moved past it.
pub struct ObservationIterator<R> {
    reader: csv::Reader<BlankLineDetector<R>>,
    record: StringRecord,
    finished: bool,
}

impl<R: Read> ObservationIterator<R> {
    fn read_next(&mut self) -> Result<Option<Observation>> {
        let more = self.reader.read_record(&mut self.record)?;
        self.check_blank_line()?;

        if !more {
            return Ok(None);
        }
        parse_record(&self.record).map(Some)
    }

    /// The detector reads ahead of the parser; only report lines the parser has passed.
    fn check_blank_line(&self) -> Result<()> {
        match self.reader.get_ref().blank_line() {
            Some(line) if line < self.reader.position().line() => {
                debug!("Empty line at {}", line);
                Err(ProcessingError::invalid_record(
                    line,
                    format!("expected {} fields, found 0", FIELDS_PER_ROW),
                ))
            }
            _ => Ok(()),
        }
    }
}

impl<R: Read> Iterator for ObservationIterator<R> {
    type Item = Result<Observation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.read_next() {
            Ok(Some(observation)) => Some(Ok(observation)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
