//! Term and document frequency report builder

use std::path::Path;

use arrayvec::{ArrayString, ArrayVec};
use tracing::{debug, warn};

use crate::crawler::Crawler;
use crate::error::{Error, Result};
use crate::text;
use crate::types::{MAX_TERM_LENGTH, MAX_TERMS, SearchReport, TermRecord, is_delimiter};

/// Validate a single search term
///
/// # Errors
/// Returns error if the term is empty, longer than `MAX_TERM_LENGTH` bytes, or
/// contains a token delimiter
pub fn validate_term(term: &str) -> Result<ArrayString<MAX_TERM_LENGTH>> {
    if term.is_empty() {
        return Err(Error::invalid_term("Term must not be empty"));
    }
    if term.bytes().any(is_delimiter) {
        return Err(Error::invalid_term(&format!("Term '{term}' contains a delimiter")));
    }
    ArrayString::from(term).map_err(|_| {
        Error::invalid_term(&format!("Term is longer than {MAX_TERM_LENGTH} bytes"))
    })
}

/// Builds a `SearchReport` by scanning every file of a directory
#[derive(Debug, Default)]
pub struct ReportBuilder {
    /// Lister used to enumerate the scan directory
    crawler: Crawler,
}

impl ReportBuilder {
    /// Create a builder with the given lister
    #[must_use]
    pub const fn new(crawler: Crawler) -> Self {
        Self { crawler }
    }

    /// Scan `dir` and count every term of `terms`
    ///
    /// Files that cannot be read are skipped with a warning and still count
    /// towards `total_files`.
    ///
    /// # Errors
    /// Returns error if:
    /// - `terms` is empty, too long, or holds an invalid term
    /// - `dir` cannot be listed
    /// - The directory string exceeds `MAX_PATH_LENGTH`
    pub fn build<S: AsRef<str>>(&self, dir: &Path, terms: &[S]) -> Result<SearchReport> {
        if terms.is_empty() {
            return Err(Error::invalid_term("At least one term is required"));
        }
        if terms.len() > MAX_TERMS {
            return Err(Error::TooManyTerms);
        }

        let mut records = ArrayVec::<TermRecord, MAX_TERMS>::new();
        for term in terms {
            records.push(TermRecord::new(validate_term(term.as_ref())?));
        }

        let directory =
            ArrayString::from(&dir.to_string_lossy()).map_err(|_| Error::PathTooLong)?;
        let files = self.crawler.list_files(dir)?;
        let total_files = u32::try_from(files.len()).map_err(|_| Error::FileCountExceeded)?;
        debug!(dir = %dir.display(), total_files, "listed scan directory");

        for name in &files {
            let path = dir.join(name);
            let counts = match text::count_all(terms, &path) {
                Ok(counts) => counts,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                },
            };

            for (record, n) in records.iter_mut().zip(counts) {
                if n > 0 {
                    record.document_count += 1;
                    record.term_count = record.term_count.saturating_add(n);
                }
            }
        }

        for record in &records {
            assert!(record.document_count <= total_files, "Document count exceeds file count");
            assert!(
                record.document_count == 0 || record.term_count > 0,
                "Matching documents imply matching terms"
            );
        }

        Ok(SearchReport { directory, total_files, records })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn record<'a>(report: &'a SearchReport, word: &str) -> &'a TermRecord {
        report.records.iter().find(|r| r.word.as_str() == word).unwrap()
    }

    #[test]
    fn test_two_file_scenario() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir, "a.txt", "cat dog cat");
        create_test_file(&temp_dir, "b.txt", "dog dog");

        let report = ReportBuilder::default().build(temp_dir.path(), &["dog", "cat"]).unwrap();

        assert_eq!(report.total_files, 2);
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].word.as_str(), "dog");
        assert_eq!(report.records[1].word.as_str(), "cat");

        let dog = record(&report, "dog");
        assert_eq!((dog.term_count, dog.document_count), (3, 2));
        let cat = record(&report, "cat");
        assert_eq!((cat.term_count, cat.document_count), (2, 1));
    }

    #[test]
    fn test_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let report = ReportBuilder::default().build(temp_dir.path(), &["cat"]).unwrap();

        assert_eq!(report.total_files, 0);
        assert_eq!(report.records[0].term_count, 0);
        assert_eq!(report.records[0].document_count, 0);
    }

    #[test]
    fn test_document_count_increments_once_per_file() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir, "many.txt", "x x x x x");
        create_test_file(&temp_dir, "none.txt", "y");

        let report = ReportBuilder::default().build(temp_dir.path(), &["x"]).unwrap();
        assert_eq!(report.records[0].term_count, 5);
        assert_eq!(report.records[0].document_count, 1);
        assert_eq!(report.total_files, 2);
    }

    #[test]
    fn test_directory_is_recorded_as_given() {
        let temp_dir = TempDir::new().unwrap();
        let report = ReportBuilder::default().build(temp_dir.path(), &["cat"]).unwrap();
        assert_eq!(report.directory.as_str(), temp_dir.path().to_string_lossy());
    }

    #[test]
    fn test_subdirectory_is_not_scanned() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir, "top.txt", "cat");
        let subdir = temp_dir.path().join("nested");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("deep.txt"), "cat cat").unwrap();

        let report = ReportBuilder::default().build(temp_dir.path(), &["cat"]).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.records[0].term_count, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir, "ok.txt", "cat");
        // A dangling symlink is listed but cannot be opened
        std::os::unix::fs::symlink(temp_dir.path().join("gone"), temp_dir.path().join("broken"))
            .unwrap();

        let report = ReportBuilder::default().build(temp_dir.path(), &["cat"]).unwrap();
        assert_eq!(report.total_files, 2);
        assert_eq!(report.records[0].term_count, 1);
        assert_eq!(report.records[0].document_count, 1);
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = ReportBuilder::default().build(&temp_dir.path().join("missing"), &["cat"]);
        assert!(matches!(result, Err(Error::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_include_pattern_limits_files() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(&temp_dir, "a.txt", "cat");
        create_test_file(&temp_dir, "b.log", "cat");

        let builder = ReportBuilder::new(Crawler::with_include("*.txt").unwrap());
        let report = builder.build(temp_dir.path(), &["cat"]).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.records[0].document_count, 1);
    }

    #[test]
    fn test_term_validation() {
        let temp_dir = TempDir::new().unwrap();
        let builder = ReportBuilder::default();
        let no_terms: [&str; 0] = [];

        assert!(matches!(builder.build(temp_dir.path(), &no_terms), Err(Error::InvalidTerm(_))));
        assert!(matches!(builder.build(temp_dir.path(), &[""]), Err(Error::InvalidTerm(_))));
        assert!(matches!(builder.build(temp_dir.path(), &["a,b"]), Err(Error::InvalidTerm(_))));
        assert!(matches!(builder.build(temp_dir.path(), &["a b"]), Err(Error::InvalidTerm(_))));

        let long = "t".repeat(MAX_TERM_LENGTH + 1);
        assert!(matches!(builder.build(temp_dir.path(), &[long]), Err(Error::InvalidTerm(_))));

        let many = vec!["t"; MAX_TERMS + 1];
        assert!(matches!(builder.build(temp_dir.path(), &many), Err(Error::TooManyTerms)));
    }

    #[test]
    fn test_max_length_term_is_counted() {
        let temp_dir = TempDir::new().unwrap();
        let term = "m".repeat(MAX_TERM_LENGTH);
        create_test_file(&temp_dir, "long.txt", &format!("{term} {term}."));

        let report = ReportBuilder::default().build(temp_dir.path(), &[&term]).unwrap();
        assert_eq!(report.records[0].word.as_str(), term);
        assert_eq!(report.records[0].term_count, 2);
    }

    #[test]
    fn test_validate_term() {
        assert_eq!(validate_term("word").unwrap().as_str(), "word");
        assert!(validate_term("tab\tok").is_ok());
        assert!(validate_term("end.").is_err());
        assert!(validate_term("line\nbreak").is_err());
        assert!(validate_term("a,b").is_err());
        assert!(validate_term("a b").is_err());
        // Every byte the tokenizer splits on is rejected
        for byte in 0..=u8::MAX {
            let term = format!("x{}", char::from(byte));
            if is_delimiter(byte) {
                assert!(validate_term(&term).is_err(), "byte {byte} should be rejected");
            }
        }
    }
}
