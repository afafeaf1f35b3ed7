//! In-progress scan buffer.

use wedge_core::constants::DEFAULT_BUFFER_CAPACITY;

/// Characters accumulated since the last flush.
///
/// The buffer itself is not synchronized; the scan controller keeps it
/// behind the same lock as the debounce timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanBuffer {
    chars: String,
}

impl ScanBuffer {
    /// Create an empty buffer with room for a typical payload.
    pub fn new() -> Self {
        Self {
            chars: String::with_capacity(DEFAULT_BUFFER_CAPACITY),
        }
    }

    /// Append one character.
    pub fn append(&mut self, c: char) {
        self.chars.push(c);
    }

    /// Take the accumulated contents and leave the buffer empty.
    ///
    /// Returns an empty string when nothing was accumulated.
    ///
    /// # Examples
    ///
    /// ```
    /// use wedge_reader::buffer::ScanBuffer;
    ///
    /// let mut buffer = ScanBuffer::new();
    /// buffer.append('X');
    /// buffer.append('Y');
    ///
    /// assert_eq!(buffer.flush_and_clear(), "XY");
    /// assert!(buffer.is_empty());
    /// assert_eq!(buffer.flush_and_clear(), "");
    /// ```
    pub fn flush_and_clear(&mut self) -> String {
        std::mem::replace(&mut self.chars, String::with_capacity(DEFAULT_BUFFER_CAPACITY))
    }

    /// Drop the accumulated contents.
    pub fn clear(&mut self) {
        self.chars.clear();
    }

    /// Number of characters accumulated.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True when nothing has been accumulated since the last flush.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Current contents without flushing.
    pub fn as_str(&self) -> &str {
        &self.chars
    }
}

impl Default for ScanBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut buffer = ScanBuffer::new();
        for c in "A123".chars() {
            buffer.append(c);
        }

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.as_str(), "A123");
    }

    #[test]
    fn test_flush_clears() {
        let mut buffer = ScanBuffer::new();
        buffer.append('Q');

        assert_eq!(buffer.flush_and_clear(), "Q");
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
    }

    #[test]
    fn test_flush_empty_returns_empty_string() {
        let mut buffer = ScanBuffer::default();
        assert_eq!(buffer.flush_and_clear(), "");
    }

    #[test]
    fn test_grows_past_initial_capacity() {
        let mut buffer = ScanBuffer::new();
        let payload: String = std::iter::repeat_n('9', DEFAULT_BUFFER_CAPACITY * 4).collect();
        for c in payload.chars() {
            buffer.append(c);
        }

        assert_eq!(buffer.flush_and_clear(), payload);
    }

    #[test]
    fn test_clear_discards_contents() {
        let mut buffer = ScanBuffer::new();
        buffer.append('Z');
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.flush_and_clear(), "");
    }
}
