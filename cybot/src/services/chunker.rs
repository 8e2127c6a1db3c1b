//! Overlapping fixed-size text splitter.
//!
//! Lengths are counted in `char`s. Every chunk holds at most `size` chars and
//! each chunk starts with the last `overlap` chars of its predecessor, so the
//! original text is the first chunk followed by every later chunk minus its
//! first `overlap` chars. Split points prefer a paragraph break, then a line
//! break, then a sentence end, then a space, searched backwards from the end
//! of the window but never earlier than its midpoint.

use crate::error::{CyBotError, Result};

const SEPARATORS: [&[char]; 4] = [&['\n', '\n'], &['\n'], &['.', ' '], &[' ']];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    size: usize,
    overlap: usize,
}

impl TextChunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(CyBotError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if overlap >= size {
            return Err(CyBotError::Config(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
            )));
        }
        Ok(Self { size, overlap })
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let window_end = start + self.size;
            if window_end >= chars.len() {
                chunks.push(chars[start..].iter().collect());
                break;
            }

            let end = self.split_point(&chars, start, window_end);
            chunks.push(chars[start..end].iter().collect());
            start = end - self.overlap;
        }

        chunks
    }

    // end > start + overlap keeps the next start strictly ahead of this one.
    fn split_point(&self, chars: &[char], start: usize, window_end: usize) -> usize {
        let earliest = (start + self.overlap + 1).max(start + self.size / 2);

        for separator in SEPARATORS {
            let mut end = window_end;
            while end >= earliest && end >= separator.len() {
                if &chars[end - separator.len()..end] == separator {
                    return end;
                }
                end -= 1;
            }
        }

        window_end
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self {
            size: 1000,
            overlap: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn statute_text() -> String {
        let mut text = String::new();
        for n in 0..40 {
            text.push_str(&format!(
                "Section 66{n}. Whoever, fraudulently or dishonestly, makes use of the electronic \
                 signature, password or any other unique identification feature of any other \
                 person shall be punished with imprisonment of either description.\n"
            ));
            if n % 5 == 4 {
                text.push('\n');
            }
        }
        text
    }

    fn char_len(s: &str) -> usize {
        s.chars().count()
    }

    fn head(s: &str, n: usize) -> String {
        s.chars().take(n).collect()
    }

    fn tail(s: &str, n: usize) -> String {
        let len = char_len(s);
        s.chars().skip(len - n).collect()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(100, 20).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\n\t ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::default();
        let text = "Section 66C deals with identity theft.";
        assert_eq!(chunker.chunk(text), vec![text.to_string()]);
    }

    #[test]
    fn test_chunks_respect_size_and_exact_overlap() {
        let text = statute_text();
        for (size, overlap) in [(1000, 200), (300, 50), (120, 0), (64, 63)] {
            let chunker = TextChunker::new(size, overlap).unwrap();
            let chunks = chunker.chunk(&text);
            assert!(chunks.len() > 1);

            for chunk in &chunks {
                assert!(char_len(chunk) <= size, "chunk longer than {size}");
            }
            for pair in chunks.windows(2) {
                assert_eq!(tail(&pair[0], overlap), head(&pair[1], overlap));
            }

            let mut rebuilt = chunks[0].clone();
            for chunk in &chunks[1..] {
                rebuilt.extend(chunk.chars().skip(overlap));
            }
            assert_eq!(rebuilt, text);
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let first = "a".repeat(60);
        let second = "b ".repeat(40);
        let text = format!("{first}\n\n{second}");
        let chunker = TextChunker::new(80, 10).unwrap();

        let chunks = chunker.chunk(&text);
        assert!(chunks[0].ends_with("\n\n"));
    }

    #[test]
    fn test_does_not_split_words_when_spaces_exist() {
        let text = "identity theft cheating personation privacy violation ".repeat(20);
        let chunker = TextChunker::new(50, 8).unwrap();

        let chunks = chunker.chunk(&text);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.ends_with(' '), "split mid-word: {chunk:?}");
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let text = "സൈബർ നിയമം ".repeat(30);
        let chunker = TextChunker::new(40, 5).unwrap();

        let chunks = chunker.chunk(&text);
        assert!(chunks.iter().all(|c| char_len(c) <= 40));
    }

    #[test]
    fn test_is_deterministic() {
        let text = statute_text();
        let chunker = TextChunker::new(250, 40).unwrap();
        assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(TextChunker::new(0, 0).is_err());
        assert!(TextChunker::new(100, 100).is_err());
        assert!(TextChunker::new(100, 150).is_err());
    }
}
