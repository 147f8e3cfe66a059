//! Byte-level line reader shared by the OBJ and MTL parsers.
//!
//! Lines are split on `\n` and cut at the first `#` before any decoding, so
//! comment text may hold bytes in any encoding. Only the remaining content
//! has to be UTF-8.

use std::io::{self, BufRead};

#[derive(Debug)]
pub enum LineError {
    Io { line: usize, source: io::Error },
    Utf8 { line: usize },
}

/// Yields `(line_no, content)` with 1-based line numbers. `content` is
/// comment-stripped and trimmed; it may be empty.
pub(crate) struct ContentLines<R> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
}

impl<R: BufRead> ContentLines<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for ContentLines<R> {
    type Item = Result<(usize, String), LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf);
        self.line_no += 1;
        let line = self.line_no;
        match read {
            Ok(0) => None,
            Ok(_) => Some(content(&self.buf, line).map(|text| (line, text))),
            Err(source) => Some(Err(LineError::Io { line, source })),
        }
    }
}

fn content(raw: &[u8], line: usize) -> Result<String, LineError> {
    let end = raw
        .iter()
        .position(|&b| b == b'#' || b == b'\n')
        .unwrap_or(raw.len());
    std::str::from_utf8(&raw[..end])
        .map(|text| text.trim().to_string())
        .map_err(|_| LineError::Utf8 { line })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(bytes: &[u8]) -> Vec<(usize, String)> {
        ContentLines::new(io::Cursor::new(bytes))
            .collect::<Result<_, _>>()
            .expect("read lines")
    }

    #[test]
    fn strips_comments_and_line_endings() {
        let lines = collect(b"v 1 2 3 # note\r\n\r\n  f 1 1 1\n");
        assert_eq!(
            lines,
            vec![
                (1, "v 1 2 3".to_string()),
                (2, String::new()),
                (3, "f 1 1 1".to_string())
            ]
        );
    }

    #[test]
    fn comment_bytes_are_never_decoded() {
        let lines = collect(b"# caf\xE9\nv 0 0 0 #\xFF\xFE\n");
        assert_eq!(lines[0], (1, String::new()));
        assert_eq!(lines[1], (2, "v 0 0 0".to_string()));
    }

    #[test]
    fn invalid_content_reports_line() {
        let err = ContentLines::new(io::Cursor::new(&b"v 0 0 0\nusemtl caf\xE9\n"[..]))
            .find_map(Result::err)
            .expect("utf8 error");
        assert!(matches!(err, LineError::Utf8 { line: 2 }));
    }

    #[test]
    fn last_line_without_newline() {
        assert_eq!(collect(b"a\nb"), vec![(1, "a".into()), (2, "b".into())]);
    }
}
