/// Reassembles arbitrarily-chunked text fragments into complete lines.
///
/// Fragments are appended to an internal buffer which is split on the
/// line-feed character only; the trailing piece stays buffered because it may
/// still be incomplete. `finish` drains whatever remains at end of input.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment and return every complete line it closed.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        if fragment.is_empty() {
            return Vec::new();
        }
        self.buffer.push_str(fragment);
        if !self.buffer.contains('\n') {
            return Vec::new();
        }
        let mut pieces: Vec<String> = self.buffer.split('\n').map(str::to_string).collect();
        self.buffer = pieces.pop().unwrap_or_default();
        pieces
    }

    /// Emit the residual buffer as one final line, if any.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.buffer))
    }
}
