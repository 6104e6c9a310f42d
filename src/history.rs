//! Persistent search history log
//!
//! The log starts with a short header and holds one length-prefixed record
//! per saved search, in append order. All integers are little-endian.
//!
//! ```text
//! header : magic "TFHL" | version u8
//! record : dir_len u16 | dir bytes | total_files u32 | nterms u8
//!          nterms x (word_len u8 | word bytes | term_count u32 | document_count u32)
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use arrayvec::{ArrayString, ArrayVec};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::types::{MAX_PATH_LENGTH, MAX_TERM_LENGTH, MAX_TERMS, SearchReport, TermRecord};

/// History file magic number
pub const MAGIC: [u8; 4] = *b"TFHL";

/// History file version
pub const VERSION: u8 = 1;

/// Default history file name
pub const DEFAULT_HISTORY_FILE: &str = "history.dat";

/// Length of the file header in bytes
const HEADER_LEN: usize = MAGIC.len() + 1;

/// Append-only log of saved search reports
#[derive(Debug, Clone)]
pub struct History {
    /// Location of the log file
    path: PathBuf,
}

impl History {
    /// Create a history store backed by the file at `path`
    ///
    /// The file is not touched until the first operation.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `report` as a single record
    ///
    /// The record is written with one call. If that write fails the file is cut
    /// back to its previous length so no partial record remains.
    ///
    /// # Errors
    /// Returns error if:
    /// - The log cannot be opened for appending
    /// - The record cannot be written; the message also names a failed rollback
    pub fn append(&self, report: &SearchReport) -> Result<()> {
        let mut record = Vec::new();
        encode_report(report, &mut record)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| Error::LogOpen { path: self.path.clone(), source })?;

        let write_error = |source| Error::LogWrite { path: self.path.clone(), source };
        let start = file.metadata().map_err(write_error)?.len();

        let mut buf = Vec::with_capacity(HEADER_LEN + record.len());
        if start == 0 {
            buf.extend_from_slice(&MAGIC);
            buf.push(VERSION);
        }
        buf.extend_from_slice(&record);

        write_or_rollback(&mut file, start, &buf, &self.path).map_err(write_error)?;

        info!(path = %self.path.display(), bytes = buf.len(), "appended search to history");
        Ok(())
    }

    /// Read every saved report, oldest first
    ///
    /// A missing or empty log yields an empty list.
    ///
    /// # Errors
    /// Returns error if:
    /// - The log exists but cannot be opened
    /// - The header or a record is malformed or truncated
    pub fn list(&self) -> Result<Vec<SearchReport>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(Error::LogOpen { path: self.path.clone(), source }),
        };
        let mut reader = BufReader::new(file);

        let mut header = [0u8; HEADER_LEN];
        match read_full(&mut reader, &mut header)? {
            0 => return Ok(Vec::new()),
            n if n < header.len() => return Err(Error::corrupt("Truncated file header")),
            _ => {},
        }
        if header[..MAGIC.len()] != MAGIC {
            return Err(Error::corrupt("Invalid history file format"));
        }
        let version = header[MAGIC.len()];
        if version != VERSION {
            return Err(Error::corrupt(&format!("Unsupported history version: {version}")));
        }

        let mut reports = Vec::new();
        while let Some(report) = decode_report(&mut reader)? {
            reports.push(report);
        }
        Ok(reports)
    }

    /// Remove every saved report
    ///
    /// The log is truncated to zero length, or created empty if missing.
    ///
    /// # Errors
    /// Returns error if the log cannot be truncated
    pub fn clear(&self) -> Result<()> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|source| Error::LogClear { path: self.path.clone(), source })?;

        info!(path = %self.path.display(), "cleared history");
        Ok(())
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}

/// Storage that can be cut back to a given length
trait Truncate {
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl Truncate for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Write `buf` to `target`, cutting it back to `start` bytes if the write fails
fn write_or_rollback<T: Write + Truncate>(
    target: &mut T,
    start: u64,
    buf: &[u8],
    path: &Path,
) -> io::Result<()> {
    let Err(source) = target.write_all(buf).and_then(|()| target.flush()) else {
        return Ok(());
    };
    match target.truncate_to(start) {
        Ok(()) => Err(source),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot roll back partial history record");
            Err(io::Error::new(
                source.kind(),
                format!("{source}; rollback to {start} bytes failed: {e}"),
            ))
        },
    }
}

/// Serialize `report` into `buf`
fn encode_report(report: &SearchReport, buf: &mut Vec<u8>) -> Result<()> {
    let dir_len = u16::try_from(report.directory.len()).map_err(|_| Error::PathTooLong)?;
    buf.extend_from_slice(&dir_len.to_le_bytes());
    buf.extend_from_slice(report.directory.as_bytes());
    buf.extend_from_slice(&report.total_files.to_le_bytes());

    let nterms = u8::try_from(report.records.len()).map_err(|_| Error::TooManyTerms)?;
    buf.push(nterms);
    for record in &report.records {
        let word_len = u8::try_from(record.word.len())
            .map_err(|_| Error::invalid_term("Term too long for history format"))?;
        buf.push(word_len);
        buf.extend_from_slice(record.word.as_bytes());
        buf.extend_from_slice(&record.term_count.to_le_bytes());
        buf.extend_from_slice(&record.document_count.to_le_bytes());
    }
    Ok(())
}

/// Read the next record, or `None` at a clean end of file
fn decode_report<R: Read>(reader: &mut R) -> Result<Option<SearchReport>> {
    let mut dir_len = [0u8; 2];
    match read_full(reader, &mut dir_len)? {
        0 => return Ok(None),
        2 => {},
        _ => return Err(Error::corrupt("Truncated record")),
    }
    let dir_len = usize::from(u16::from_le_bytes(dir_len));
    if dir_len > MAX_PATH_LENGTH {
        return Err(Error::corrupt("Directory field too long"));
    }

    let mut dir_buf = [0u8; MAX_PATH_LENGTH];
    read_field(reader, &mut dir_buf[..dir_len])?;
    let directory = decode_str::<MAX_PATH_LENGTH>(&dir_buf[..dir_len])?;
    let total_files = read_u32(reader)?;

    let mut nterms = [0u8; 1];
    read_field(reader, &mut nterms)?;
    let nterms = usize::from(nterms[0]);
    if nterms > MAX_TERMS {
        return Err(Error::corrupt("Too many terms in record"));
    }

    let mut records = ArrayVec::new();
    for _ in 0..nterms {
        let mut word_len = [0u8; 1];
        read_field(reader, &mut word_len)?;
        let word_len = usize::from(word_len[0]);
        if word_len > MAX_TERM_LENGTH {
            return Err(Error::corrupt("Term field too long"));
        }

        let mut word_buf = [0u8; MAX_TERM_LENGTH];
        read_field(reader, &mut word_buf[..word_len])?;
        let word = decode_str::<MAX_TERM_LENGTH>(&word_buf[..word_len])?;
        let term_count = read_u32(reader)?;
        let document_count = read_u32(reader)?;

        records.push(TermRecord { word, term_count, document_count });
    }

    Ok(Some(SearchReport { directory, total_files, records }))
}

fn decode_str<const N: usize>(bytes: &[u8]) -> Result<ArrayString<N>> {
    let s = std::str::from_utf8(bytes).map_err(|_| Error::corrupt("Invalid UTF-8 in record"))?;
    ArrayString::from(s).map_err(|_| Error::corrupt("Field exceeds its fixed width"))
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut bytes = [0u8; 4];
    read_field(reader, &mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Fill `buf` completely, treating end of file as a truncated record
fn read_field<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::corrupt("Truncated record"),
        _ => Error::Io(e),
    })
}

/// Read until `buf` is full or end of file, returning the bytes read
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {},
            Err(e) => return Err(Error::Io(e)),
        }
    }
    Ok(filled)
}
