//! Append-only pending-text buffer with size-bounded prefix releases.
//!
//! The buffer is the only place channel text lives between arrival and
//! reveal. Text enters by append and leaves as contiguous prefixes, so
//! concatenating every release reproduces the input exactly. Sizes are
//! measured in characters and splits always land on UTF-8 boundaries.

#[derive(Debug, Default)]
pub struct ChannelBuffer {
    pending: String,
    pending_chars: usize,
}

impl ChannelBuffer {
    pub fn push_str(&mut self, text: &str) {
        self.pending.push_str(text);
        self.pending_chars += text.chars().count();
    }

    pub fn char_len(&self) -> usize {
        self.pending_chars
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Releases the entire pending text.
    pub fn take_all(&mut self) -> String {
        self.pending_chars = 0;
        std::mem::take(&mut self.pending)
    }

    /// Releases a prefix of at most `max_chars` characters.
    pub fn take_chars(&mut self, max_chars: usize) -> String {
        if max_chars >= self.pending_chars {
            return self.take_all();
        }

        let split = self
            .pending
            .char_indices()
            .nth(max_chars)
            .map(|(index, _)| index)
            .unwrap_or(self.pending.len());
        let rest = self.pending.split_off(split);
        let head = std::mem::replace(&mut self.pending, rest);
        self.pending_chars -= max_chars;
        head
    }

    /// Whether a non-forced release may fire: either enough text has
    /// accumulated for a full chunk, or a word boundary means a short,
    /// complete fragment can appear without looking choppy.
    pub fn release_allowed(&self, desired_chunk: usize) -> bool {
        self.pending_chars >= desired_chunk || self.has_word_boundary()
    }

    pub fn has_word_boundary(&self) -> bool {
        self.pending.chars().any(is_word_boundary)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.pending_chars = 0;
    }
}

fn is_word_boundary(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | ',' | ';' | ':' | '!' | '?')
}
