/// Splits the raw transport byte buffer into complete newline-terminated
/// records, holding back an incomplete trailing record until the next read.
#[derive(Default)]
pub struct LineFramer {
    buf: Vec<u8>,
}

impl LineFramer {
    /// Appends a transport chunk and returns every complete line it closed.
    ///
    /// A single chunk may close zero or many lines. `\r\n` endings are
    /// tolerated; the terminator is not part of the returned line.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.iter().position(|&b| b == b'\n') {
            let line_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..=idx);
            let text = String::from_utf8_lossy(&line_bytes);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// Bytes of the partial record held back for the next read.
    pub fn pending(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_back_partial_record_across_chunks() {
        let mut framer = LineFramer::default();
        let first = framer.push_chunk(b"data: {\"type\":\"RUN_ST");
        assert!(first.is_empty());
        assert_eq!(framer.pending(), b"data: {\"type\":\"RUN_ST");
        let second = framer.push_chunk(b"ARTED\"}\n");
        assert_eq!(second, vec!["data: {\"type\":\"RUN_STARTED\"}"]);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn yields_many_lines_from_one_chunk() {
        let mut framer = LineFramer::default();
        let lines = framer.push_chunk(b"one\ntwo\n\nthree\npartial");
        assert_eq!(lines, vec!["one", "two", "", "three"]);
        assert_eq!(framer.pending(), b"partial");
    }

    #[test]
    fn strips_carriage_returns() {
        let mut framer = LineFramer::default();
        let lines = framer.push_chunk(b"data: x\r\n\r\n");
        assert_eq!(lines, vec!["data: x", ""]);
    }

    #[test]
    fn empty_chunk_yields_nothing() {
        let mut framer = LineFramer::default();
        assert!(framer.push_chunk(b"").is_empty());
    }
}
