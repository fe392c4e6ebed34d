//! Line framing over a raw byte stream.
//!
//! Chunks arrive with no alignment to line or character boundaries. The
//! buffer decodes UTF-8 statefully (a code point split across two chunks is
//! held back until its remaining bytes arrive) and hands out only complete,
//! newline-terminated lines. Whatever follows the last newline stays in the
//! buffer until a later chunk terminates it.

/// Accumulates text that has not yet been resolved into complete lines.
#[derive(Debug, Default, Clone)]
pub struct FrameBuffer {
    /// Decoded text after the last newline seen so far.
    text: String,
    /// Leading bytes of a UTF-8 sequence still waiting for continuation bytes.
    partial_char: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw chunk and return every line it completed, in order.
    ///
    /// Returned lines exclude the `\n` terminator and a trailing `\r`.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        // The pending tail never holds a newline, so only new text is scanned.
        let scanned = self.text.len();
        self.decode_into_text(chunk);

        if !self.text[scanned..].contains('\n') {
            return Vec::new();
        }

        let mut segments: Vec<&str> = self.text.split('\n').collect();
        // The final segment is the unterminated tail (possibly empty).
        let tail = segments.pop().unwrap_or_default().to_string();
        let lines = segments
            .into_iter()
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        self.text = tail;
        lines
    }

    /// Text received after the last newline.
    pub fn pending(&self) -> &str {
        &self.text
    }

    /// True when nothing is buffered, including partial characters.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.partial_char.is_empty()
    }

    /// Drop the unterminated tail and report how many bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let dropped = self.text.len() + self.partial_char.len();
        self.text.clear();
        self.partial_char.clear();
        dropped
    }

    fn decode_into_text(&mut self, chunk: &[u8]) {
        let owned;
        let mut input: &[u8] = if self.partial_char.is_empty() {
            chunk
        } else {
            let mut joined = std::mem::take(&mut self.partial_char);
            joined.extend_from_slice(chunk);
            owned = joined;
            &owned
        };

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    return;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    self.text
                        .push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end of input.
                            self.partial_char.extend_from_slice(rest);
                            return;
                        }
                    }
                }
            }
        }
    }
}
