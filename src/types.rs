//! Common types and constants for `termfreq`

use std::fmt;

use arrayvec::{ArrayString, ArrayVec};

/// Maximum number of terms in a single search
pub const MAX_TERMS: usize = 20;

/// Maximum term length in bytes
pub const MAX_TERM_LENGTH: usize = 32;

/// Maximum length of the stored directory string in bytes
pub const MAX_PATH_LENGTH: usize = 255;

/// Maximum number of files listed in one scan
pub const MAX_FILES: usize = 1_000;

/// Returns true if `byte` ends a token (space, newline, period or comma)
#[must_use]
pub const fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b' ' | b'\n' | b'.' | b',')
}

/// Frequencies of a single term across a scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermRecord {
    /// The searched term
    pub word:           ArrayString<MAX_TERM_LENGTH>,
    /// Total occurrences over all files
    pub term_count:     u32,
    /// Number of files containing the term at least once
    pub document_count: u32,
}

impl TermRecord {
    /// Create an empty record for `word`
    #[must_use]
    pub const fn new(word: ArrayString<MAX_TERM_LENGTH>) -> Self {
        Self { word, term_count: 0, document_count: 0 }
    }
}

/// Result of one search over a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    /// Directory as entered by the user
    pub directory:   ArrayString<MAX_PATH_LENGTH>,
    /// Number of files listed in the directory
    pub total_files: u32,
    /// One record per requested term, in entry order
    pub records:     ArrayVec<TermRecord, MAX_TERMS>,
}

const RULE: &str = "---------------------------------------------------------------------------";

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t{RULE}")?;
        writeln!(f, "\tDirectory : {}", self.directory)?;
        writeln!(f, "\t{RULE}")?;
        writeln!(f, "\t{:<24}{:>16}{:>24}", "Term", "Term Frequency", "Document Frequency")?;
        writeln!(f)?;
        for record in &self.records {
            writeln!(
                f,
                "\t{:<24}{:>16}{:>24}",
                record.word.as_str(),
                record.term_count,
                record.document_count
            )?;
        }
        writeln!(f, "\t{RULE}")?;
        writeln!(f, "\tTotal files: {}", self.total_files)?;
        write!(f, "\t{RULE}")
    }
}

const _: () = {
    assert!(MAX_TERMS > 0);
    assert!(MAX_TERMS <= u8::MAX as usize);
    assert!(MAX_TERM_LENGTH > 0);
    assert!(MAX_TERM_LENGTH <= u8::MAX as usize);
    assert!(MAX_PATH_LENGTH <= u16::MAX as usize);
    assert!(MAX_FILES > 0);
};
