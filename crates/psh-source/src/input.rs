//! Line-oriented input sources for the processor.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Something that yields source lines one at a time.
///
/// Lines come back without their trailing newline. `line_number` is
/// 1-based and refers to the most recently returned line.
pub trait InputSource {
    fn read_line(&mut self) -> Option<String>;
    fn name(&self) -> &str;
    fn line_number(&self) -> usize;
}

/// Input backed by an in-memory string.
#[derive(Debug, Clone)]
pub struct StringInput {
    lines: Vec<String>,
    index: usize,
    name: String,
}

impl StringInput {
    pub fn new(source: &str) -> Self {
        Self::with_name(source, "<string>")
    }

    pub fn with_name(source: &str, name: &str) -> Self {
        StringInput {
            lines: source.lines().map(String::from).collect(),
            index: 0,
            name: name.to_string(),
        }
    }
}

impl InputSource for StringInput {
    fn read_line(&mut self) -> Option<String> {
        let line = self.lines.get(self.index)?.clone();
        self.index += 1;
        Some(line)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn line_number(&self) -> usize {
        self.index
    }
}

/// Input backed by any buffered reader.
pub struct ReaderInput<R: BufRead> {
    reader: R,
    name: String,
    line_number: usize,
}

impl<R: BufRead> ReaderInput<R> {
    pub fn new(reader: R, name: &str) -> Self {
        ReaderInput { reader, name: name.to_string(), line_number: 0 }
    }
}

impl<R: BufRead> InputSource for ReaderInput<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                self.line_number += 1;
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                Some(line)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Input backed by a script file.
pub struct FileInput {
    inner: ReaderInput<BufReader<File>>,
}

impl FileInput {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let name = path.display().to_string();
        Ok(FileInput { inner: ReaderInput::new(BufReader::new(file), &name) })
    }
}

impl InputSource for FileInput {
    fn read_line(&mut self) -> Option<String> {
        self.inner.read_line()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn line_number(&self) -> usize {
        self.inner.line_number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_input_tracks_line_numbers() {
        let mut input = StringInput::new("first\nsecond\n");
        assert_eq!(input.line_number(), 0);
        assert_eq!(input.read_line().as_deref(), Some("first"));
        assert_eq!(input.line_number(), 1);
        assert_eq!(input.read_line().as_deref(), Some("second"));
        assert_eq!(input.line_number(), 2);
        assert_eq!(input.read_line(), None);
    }

    #[test]
    fn reader_input_strips_line_endings() {
        let data: &[u8] = b"unix\ndos\r\nlast";
        let mut input = ReaderInput::new(data, "<bytes>");
        assert_eq!(input.read_line().as_deref(), Some("unix"));
        assert_eq!(input.read_line().as_deref(), Some("dos"));
        assert_eq!(input.read_line().as_deref(), Some("last"));
        assert_eq!(input.read_line(), None);
    }

    #[test]
    fn file_input_reads_scripts() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "echo from-file").unwrap();
        let mut input = FileInput::open(file.path()).unwrap();
        assert_eq!(input.read_line().as_deref(), Some("echo from-file"));
        assert_eq!(input.read_line(), None);
    }
}
