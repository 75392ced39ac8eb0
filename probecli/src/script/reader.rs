//! Restartable, lazy reader over a script's command lines.

use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::{Path, PathBuf};

use crate::error::ScriptError;

/// A non-comment, non-blank line of a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    /// 1-based line number in the source.
    pub number: usize,

    /// Line text without its terminator.
    pub text: String,
}

#[derive(Debug, Clone)]
enum Source {
    File(PathBuf),
    Memory(String),
}

/// Produces the command lines of a script, once per call to [`lines`].
///
/// Each pass starts from the top of the source, so the discovery pass and
/// the execution pass never share iterator state.
///
/// [`lines`]: ScriptReader::lines
#[derive(Debug, Clone)]
pub struct ScriptReader {
    source: Source,
}

impl ScriptReader {
    /// Use the file at `path` as the script, failing early if it cannot be
    /// opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref().to_path_buf();
        File::open(&path).map_err(|source| ScriptError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            source: Source::File(path),
        })
    }

    /// Use an in-memory string as the script.
    pub fn from_string(script: impl Into<String>) -> Self {
        Self {
            source: Source::Memory(script.into()),
        }
    }

    /// Path of the script file, if it came from one.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            Source::File(path) => Some(path),
            Source::Memory(_) => None,
        }
    }

    /// Start a fresh pass over the script.
    pub fn lines(&self) -> Result<ScriptLines, ScriptError> {
        let (path, inner): (PathBuf, Box<dyn BufRead + Send>) = match &self.source {
            Source::File(path) => {
                let file = File::open(path).map_err(|source| ScriptError::Open {
                    path: path.clone(),
                    source,
                })?;
                (path.clone(), Box::new(BufReader::new(file)))
            }
            Source::Memory(text) => (
                PathBuf::from("<memory>"),
                Box::new(Cursor::new(text.clone().into_bytes())),
            ),
        };

        Ok(ScriptLines {
            path,
            inner,
            number: 0,
        })
    }
}

/// Iterator over one pass of a script.
pub struct ScriptLines {
    path: PathBuf,
    inner: Box<dyn BufRead + Send>,
    number: usize,
}

impl Iterator for ScriptLines {
    type Item = Result<ScriptLine, ScriptError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = String::new();
        loop {
            buf.clear();
            self.number += 1;
            match self.inner.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(source) => {
                    return Some(Err(ScriptError::Read {
                        path: self.path.clone(),
                        line: self.number,
                        source,
                    }));
                }
            }

            let text = buf.trim_end_matches(['\r', '\n']);
            if is_skipped(text) {
                continue;
            }

            return Some(Ok(ScriptLine {
                number: self.number,
                text: text.to_string(),
            }));
        }
    }
}

/// Comments (`#` in the first column) and blank lines are never sent.
fn is_skipped(line: &str) -> bool {
    line.starts_with('#') || line.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn texts(reader: &ScriptReader) -> Vec<String> {
        reader
            .lines()
            .unwrap()
            .map(|l| l.unwrap().text)
            .collect()
    }

    #[test]
    fn test_skips_comments_and_blanks() {
        let reader = ScriptReader::from_string(
            "# header\n\nenable\n   \n\t\n# comment\nshow version\n",
        );
        assert_eq!(texts(&reader), vec!["enable", "show version"]);
    }

    #[test]
    fn test_indented_hash_is_a_command() {
        let reader = ScriptReader::from_string("  # not a comment
#comment
");
        assert_eq!(texts(&reader), vec!["  # not a comment"]);
    }

    #[test]
    fn test_line_numbers_and_crlf() {
        let reader = ScriptReader::from_string("# c\r\nenable\r\n\r\nconfigure terminal\r\n");
        let lines: Vec<ScriptLine> = reader.lines().unwrap().map(|l| l.unwrap()).collect();
        assert_eq!(
            lines,
            vec![
                ScriptLine {
                    number: 2,
                    text: "enable".into()
                },
                ScriptLine {
                    number: 4,
                    text: "configure terminal".into()
                },
            ]
        );
    }

    #[test]
    fn test_last_line_without_newline() {
        let reader = ScriptReader::from_string("enable\nshow version");
        assert_eq!(texts(&reader), vec!["enable", "show version"]);
    }

    #[test]
    fn test_restartable() {
        let reader = ScriptReader::from_string("@prompt x\nenable\n");
        let mut first = reader.lines().unwrap();
        assert_eq!(first.next().unwrap().unwrap().text, "@prompt x");

        // A second pass starts from the top regardless of the first.
        assert_eq!(texts(&reader), vec!["@prompt x", "enable"]);
        assert_eq!(first.next().unwrap().unwrap().text, "enable");
    }

    #[test]
    fn test_file_source_two_passes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# vm setup\nvm create <VMNAME>\n@sleep 1\n").unwrap();

        let reader = ScriptReader::open(file.path()).unwrap();
        assert_eq!(reader.path(), Some(file.path()));
        assert_eq!(texts(&reader), texts(&reader));
        assert_eq!(texts(&reader), vec!["vm create <VMNAME>", "@sleep 1"]);
    }

    #[test]
    fn test_open_missing_file() {
        let err = ScriptReader::open("/nonexistent/dir/script.txt").unwrap_err();
        assert!(matches!(err, ScriptError::Open { .. }));
    }
}
