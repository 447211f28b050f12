//! Newline framing over an arbitrarily chunked byte stream.
//!
//! Framing works on bytes, not text. A `\n` byte never occurs inside a
//! multi-byte UTF-8 sequence, so a character split across two chunks simply
//! stays in the carry-over until its line is complete, and is decoded whole.

/// Splits incoming byte chunks into complete lines.
///
/// Bytes after the last `\n` are kept as carry-over for the next chunk.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    /// Create an empty framer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and return every line it completed, without the
    /// terminator (`\n`, or `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        // Only the new bytes can hold a terminator; the carry-over has none.
        let carried = self.buf.len();
        self.buf.extend_from_slice(chunk);

        let Some(last_newline) = chunk.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let last_newline = carried + last_newline;

        let complete: Vec<u8> = self.buf.drain(..=last_newline).collect();
        complete[..complete.len() - 1]
            .split(|&b| b == b'\n')
            .map(|line| strip_cr(line).to_vec())
            .collect()
    }

    /// Take whatever is left at end of stream as a final, unterminated line.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(strip_cr(&rest).to_vec())
    }

    /// Bytes currently held as carry-over.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(framer: &mut LineFramer, chunk: &str) -> Vec<String> {
        framer
            .push(chunk.as_bytes())
            .into_iter()
            .map(|l| String::from_utf8(l).expect("utf8"))
            .collect()
    }

    #[test]
    fn partial_line_is_carried_over() {
        let mut framer = LineFramer::new();
        assert!(lines(&mut framer, r#"{"respo"#).is_empty());
        assert_eq!(framer.pending(), 7);
        assert_eq!(
            lines(&mut framer, "nse\":\"Hi\"}\n{\"a\""),
            vec![r#"{"response":"Hi"}"#]
        );
        assert_eq!(framer.pending(), 4);
    }

    #[test]
    fn several_lines_in_one_chunk() {
        let mut framer = LineFramer::new();
        assert_eq!(lines(&mut framer, "a\nb\n\nc\n"), vec!["a", "b", "", "c"]);
        assert_eq!(framer.pending(), 0);
        assert!(framer.finish().is_none());
    }

    #[test]
    fn crlf_terminators_are_stripped() {
        let mut framer = LineFramer::new();
        assert_eq!(lines(&mut framer, "a\r\nb\r"), vec!["a"]);
        assert_eq!(lines(&mut framer, "\n"), vec!["b"]);
    }

    #[test]
    fn finish_returns_unterminated_tail() {
        let mut framer = LineFramer::new();
        assert!(lines(&mut framer, "tail").is_empty());
        assert_eq!(framer.finish(), Some(b"tail".to_vec()));
        assert!(framer.finish().is_none());
    }

    #[test]
    fn split_multibyte_character_waits_for_its_line() {
        let bytes = "价格\n".as_bytes();
        let mut framer = LineFramer::new();
        assert!(framer.push(&bytes[..2]).is_empty());
        assert!(framer.push(&bytes[2..4]).is_empty());
        let out = framer.push(&bytes[4..]);
        assert_eq!(out, vec!["价格".as_bytes().to_vec()]);
    }

    #[test]
    fn long_line_in_small_chunks_is_framed_once() {
        let mut framer = LineFramer::new();
        let line = "x".repeat(10_000);
        for piece in line.as_bytes().chunks(3) {
            assert!(framer.push(piece).is_empty());
        }
        assert_eq!(framer.pending(), 10_000);
        assert_eq!(framer.push(b"\nnext"), vec![line.into_bytes()]);
        assert_eq!(framer.pending(), 4);
    }
}
