//! The Emitter: writes one record per line as newline-delimited JSON.

use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};

use crate::error::MinerError;
use crate::record::Record;

/// Where the NDJSON stream goes.
enum Sink {
    File(BufWriter<File>),
    Stdout(BufWriter<Stdout>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::File(w) => w.write(buf),
            Self::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::File(w) => w.flush(),
            Self::Stdout(w) => w.flush(),
        }
    }
}

/// Streams [`Record`]s to a file or stdout, one compact JSON object per
/// line, flushing after each record.
pub struct Emitter {
    sink: Sink,
}

impl Emitter {
    /// Opens `path` for writing (truncating), or streams to stdout if `path`
    /// is `None`.
    pub fn new(path: Option<&str>) -> Result<Self, MinerError> {
        let sink = match path {
            Some(path) => {
                let file = File::create(path).map_err(|source| MinerError::SinkOpen {
                    path: path.to_string(),
                    source,
                })?;
                Sink::File(BufWriter::new(file))
            }
            None => Sink::Stdout(BufWriter::new(io::stdout())),
        };
        Ok(Self { sink })
    }

    /// Serializes `record` and writes it as one line, then flushes.
    pub fn emit(&mut self, record: &Record) -> Result<(), MinerError> {
        let line = serde_json::to_string(record).map_err(MinerError::Serialize)?;
        self.sink
            .write_all(line.as_bytes())
            .and_then(|()| self.sink.write_all(b"\n"))
            .map_err(MinerError::SinkWrite)?;
        self.sink.flush().map_err(MinerError::SinkWrite)
    }
}
