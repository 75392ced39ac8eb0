//! Response buffer with incremental UTF-8 decoding.
//!
//! Devices deliver output in arbitrary chunks, so a multi-byte character can
//! be split across two reads. The buffer keeps the raw bytes of the current
//! command cycle, decodes only what is new on each `extend`, and holds an
//! incomplete trailing sequence back until the rest of it arrives.
//!
//! Prompt detection always runs over the whole decoded text: a prompt may
//! only complete once a later chunk lands.

/// Buffer for accumulating one command cycle's output.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    /// Every byte received in this cycle.
    raw: Vec<u8>,

    /// Text decoded so far.
    text: String,

    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
}

impl ResponseBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self {
            raw: Vec::with_capacity(4096),
            text: String::with_capacity(4096),
            pending: Vec::new(),
        }
    }

    /// Append a chunk and decode whatever became decodable.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.raw.extend_from_slice(chunk);
        self.pending.extend_from_slice(chunk);
        self.decode_pending();
    }

    fn decode_pending(&mut self) {
        let mut consumed = 0;
        loop {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    if let Ok(valid) = std::str::from_utf8(&rest[..valid_up_to]) {
                        self.text.push_str(valid);
                    }
                    consumed += valid_up_to;
                    match e.error_len() {
                        // Incomplete sequence at the end: wait for more bytes.
                        None => break,
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            consumed += len;
                        }
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }

    /// The decoded text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The raw bytes received so far, including any pending tail.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Number of bytes held back as an incomplete character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Take the decoded text and raw bytes, leaving the buffer empty.
    ///
    /// Bytes still pending are decoded lossily so nothing is dropped.
    pub fn take(&mut self) -> (String, Vec<u8>) {
        if !self.pending.is_empty() {
            let tail = String::from_utf8_lossy(&self.pending).into_owned();
            self.text.push_str(&tail);
            self.pending.clear();
        }
        (std::mem::take(&mut self.text), std::mem::take(&mut self.raw))
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.text.clear();
        self.pending.clear();
    }
}
