//! Tokenizer and term counter

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use arrayvec::ArrayVec;

use crate::error::{Error, Result};
use crate::types::{MAX_TERM_LENGTH, MAX_TERMS, is_delimiter};

/// Token buffer with a fixed capacity
///
/// # Design
/// - Tokens longer than `MAX_TERM_LENGTH` are consumed but flagged as overlong
/// - An overlong token never compares equal to any term
#[derive(Debug, Default)]
struct TokenBuf {
    /// Bytes of the current token
    bytes:    ArrayVec<u8, MAX_TERM_LENGTH>,
    /// Set once the current token overflows the buffer
    overlong: bool,
}

impl TokenBuf {
    fn push(&mut self, byte: u8) {
        if self.bytes.try_push(byte).is_err() {
            self.overlong = true;
        }
    }

    /// The completed token, or `None` for an empty or overlong run
    fn token(&self) -> Option<&[u8]> {
        (!self.overlong && !self.bytes.is_empty()).then_some(self.bytes.as_slice())
    }

    fn clear(&mut self) {
        self.bytes.clear();
        self.overlong = false;
    }
}

/// Feed every token of `reader` to `on_token`
///
/// The final token is emitted even without a trailing delimiter.
fn for_each_token<R, F>(mut reader: R, mut on_token: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(&[u8]),
{
    let mut buf = TokenBuf::default();

    loop {
        let chunk = match reader.fill_buf() {
            Ok([]) => break,
            Ok(chunk) => chunk,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        for &byte in chunk {
            if is_delimiter(byte) {
                if let Some(token) = buf.token() {
                    on_token(token);
                }
                buf.clear();
            } else {
                buf.push(byte);
            }
        }

        let consumed = chunk.len();
        reader.consume(consumed);
    }

    if let Some(token) = buf.token() {
        on_token(token);
    }

    Ok(())
}

/// Count tokens in `reader` that exactly equal `term`
///
/// # Errors
/// Returns error if reading fails
pub fn count_in<R: BufRead>(term: &str, reader: R) -> io::Result<u32> {
    let term = term.as_bytes();
    let mut count = 0_u32;
    for_each_token(reader, |token| {
        if token == term {
            count = count.saturating_add(1);
        }
    })?;
    Ok(count)
}

/// Count occurrences of `term` in the file at `path`
///
/// # Errors
/// Returns `Error::FileRead` if the file cannot be opened or read
pub fn count(term: &str, path: &Path) -> Result<u32> {
    let file_error = |source| Error::FileRead { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(file_error)?;
    count_in(term, BufReader::new(file)).map_err(file_error)
}

/// Count every term of `terms` in the file at `path` with a single read
///
/// The result holds one count per term, in the order of `terms`.
///
/// # Errors
/// Returns `Error::FileRead` if the file cannot be opened or read
///
/// # Panics
/// Panics if more than `MAX_TERMS` terms are passed
pub fn count_all<S: AsRef<str>>(terms: &[S], path: &Path) -> Result<ArrayVec<u32, MAX_TERMS>> {
    assert!(terms.len() <= MAX_TERMS, "Term count must not exceed maximum");

    let file_error = |source| Error::FileRead { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(file_error)?;

    let mut counts: ArrayVec<u32, MAX_TERMS> = terms.iter().map(|_| 0).collect();
    for_each_token(BufReader::new(file), |token| {
        for (term, count) in terms.iter().zip(counts.iter_mut()) {
            if token == term.as_ref().as_bytes() {
                *count = count.saturating_add(1);
            }
        }
    })
    .map_err(file_error)?;

    Ok(counts)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn count_str(term: &str, content: &str) -> u32 {
        count_in(term, Cursor::new(content.as_bytes())).unwrap()
    }

    #[test]
    fn test_counts_exact_tokens() {
        assert_eq!(count_str("cat", "cat dog cat\n"), 2);
        assert_eq!(count_str("dog", "cat dog cat\n"), 1);
        assert_eq!(count_str("bird", "cat dog cat\n"), 0);
    }

    #[test]
    fn test_all_delimiters_split() {
        assert_eq!(count_str("a", "a b.a,a\na"), 4);
    }

    #[test]
    fn test_consecutive_delimiters() {
        assert_eq!(count_str("x", "  x,, ..x\n\n"), 2);
        assert_eq!(count_str("", " , .\n"), 0);
    }

    #[test]
    fn test_trailing_token_counts() {
        assert_eq!(count_str("dog", "dog dog"), 2);
        assert_eq!(count_str("end", "end"), 1);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(count_str("Cat", "cat Cat CAT"), 1);
    }

    #[test]
    fn test_no_trimming() {
        // Tabs and carriage returns are part of the token
        assert_eq!(count_str("cat", "cat\r\ncat\tcat"), 0);
        assert_eq!(count_str("cat\r", "cat\r\n"), 1);
    }

    #[test]
    fn test_substring_does_not_match() {
        assert_eq!(count_str("cat", "concatenate cats scat"), 0);
    }

    #[test]
    fn test_overlong_token_never_matches() {
        let long = "a".repeat(MAX_TERM_LENGTH + 5);
        let prefix = "a".repeat(MAX_TERM_LENGTH);
        let content = format!("{long} {prefix}");
        assert_eq!(count_str(&prefix, &content), 1);
        assert_eq!(count_str(&long, &content), 0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(count_str("cat", ""), 0);
    }

    #[test]
    fn test_tokens_across_buffer_boundary() {
        let content = format!("{}dog", " ".repeat(8191));
        let reader = BufReader::with_capacity(8192, Cursor::new(content.into_bytes()));
        assert_eq!(count_in("dog", reader).unwrap(), 1);
    }

    #[test]
    fn test_count_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(&temp_dir, "a.txt", "cat dog cat");
        assert_eq!(count("cat", &path).unwrap(), 2);
        assert_eq!(count("dog", &path).unwrap(), 1);
    }

    #[test]
    fn test_count_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.txt");
        assert!(matches!(count("cat", &path), Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_count_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(count("cat", temp_dir.path()), Err(Error::FileRead { .. })));
    }

    #[test]
    fn test_count_all_matches_count() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(
            &temp_dir,
            "story.txt",
            "The cat sat. The dog sat, the cat ran\nThe end",
        );
        let terms = ["The", "cat", "sat", "the", "bird", "end"];

        let counts = count_all(&terms, &path).unwrap();
        assert_eq!(counts.as_slice(), &[3, 2, 2, 1, 0, 1]);
        for (term, n) in terms.iter().zip(&counts) {
            assert_eq!(count(term, &path).unwrap(), *n);
        }
    }

    #[test]
    fn test_count_all_duplicate_terms() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_test_file(&temp_dir, "dup.txt", "x x");
        assert_eq!(count_all(&["x", "x"], &path).unwrap().as_slice(), &[2, 2]);
    }
}
