//! Recursive text chunker.
//!
//! Splits text by trying progressively smaller separators until chunks
//! fit within the token limit, then overlaps consecutive chunks so that
//! answers spanning a paragraph boundary stay retrievable.

use support_core::{ChunkConfig, ChunkData, Chunker, Result};

/// Recursive chunker that splits text by multiple separators.
///
/// Tries each separator in order until chunks are small enough:
/// 1. Double newline (paragraph breaks)
/// 2. Single newline
/// 3. Sentence boundaries
/// 4. Word boundaries (space)
/// 5. Fixed size (last resort)
pub struct RecursiveChunker {
    /// Function to count tokens in text.
    /// Uses a character-count approximation if None.
    token_counter: Option<Box<dyn Fn(&str) -> usize + Send + Sync>>,
}

const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

impl RecursiveChunker {
    /// Create a new recursive chunker with default token estimation.
    pub fn new() -> Self {
        Self { token_counter: None }
    }

    /// Create a chunker with a custom token counter.
    pub fn with_token_counter<F>(counter: F) -> Self
    where
        F: Fn(&str) -> usize + Send + Sync + 'static,
    {
        Self {
            token_counter: Some(Box::new(counter)),
        }
    }

    /// Count tokens in text.
    fn count_tokens(&self, text: &str) -> usize {
        match &self.token_counter {
            Some(counter) => counter(text),
            // Simple approximation: ~4 chars per token on average
            None => (text.len() / 4).max(1),
        }
    }

    /// Recursively chunk text.
    fn chunk_recursive(
        &self,
        text: &str,
        separators: &[&str],
        config: &ChunkConfig,
    ) -> Vec<ChunkData> {
        let tokens = self.count_tokens(text);

        // If text fits in one chunk, return it
        if tokens <= config.max_tokens {
            return vec![ChunkData {
                content: text.to_string(),
                token_count: tokens,
            }];
        }

        // Try each separator
        for (sep_idx, separator) in separators.iter().enumerate() {
            let parts: Vec<&str> = text.split(separator).filter(|s| !s.is_empty()).collect();

            if parts.len() <= 1 {
                continue;
            }

            let mut chunks = Vec::new();
            let mut current = String::new();

            for part in parts {
                let candidate = if current.is_empty() {
                    part.to_string()
                } else {
                    format!("{}{}{}", current, separator, part)
                };

                if self.count_tokens(&candidate) <= config.max_tokens {
                    current = candidate;
                    continue;
                }

                if !current.is_empty() {
                    let token_count = self.count_tokens(&current);
                    chunks.push(ChunkData {
                        content: std::mem::take(&mut current),
                        token_count,
                    });
                }

                if self.count_tokens(part) <= config.max_tokens {
                    current = part.to_string();
                } else {
                    // Part itself is too big, recurse with smaller separators
                    let remaining = &separators[sep_idx + 1..];
                    if remaining.is_empty() {
                        chunks.extend(self.split_by_size(part, config));
                    } else {
                        chunks.extend(self.chunk_recursive(part, remaining, config));
                    }
                }
            }

            // Don't forget the last chunk
            if !current.is_empty() {
                let token_count = self.count_tokens(&current);
                chunks.push(ChunkData {
                    content: current,
                    token_count,
                });
            }

            if !chunks.is_empty() {
                return chunks;
            }
        }

        // Fallback: split by size
        self.split_by_size(text, config)
    }

    /// Split text by size (last resort).
    fn split_by_size(&self, text: &str, config: &ChunkConfig) -> Vec<ChunkData> {
        let mut chunks = Vec::new();
        let chars: Vec<char> = text.chars().collect();
        let target_chars = config.max_tokens * 4; // Approximate chars per chunk
        let mut start = 0;

        while start < chars.len() {
            let end = (start + target_chars).min(chars.len());

            // Try to break at a word boundary
            let mut actual_end = end;
            if end < chars.len() {
                for i in (start..end).rev() {
                    if chars[i] == ' ' || chars[i] == '\n' {
                        actual_end = i + 1;
                        break;
                    }
                }
            }

            let chunk_text: String = chars[start..actual_end].iter().collect();
            let tokens = self.count_tokens(&chunk_text);

            if tokens > 0 {
                chunks.push(ChunkData {
                    content: chunk_text,
                    token_count: tokens,
                });
            }

            start = actual_end;
        }

        chunks
    }

    /// Take roughly `overlap_tokens` worth of text from the end of a chunk,
    /// starting at a word boundary.
    fn tail(&self, text: &str, overlap_tokens: usize) -> String {
        let target_chars = overlap_tokens * 4;
        let chars: Vec<char> = text.chars().collect();

        if chars.len() <= target_chars {
            return text.to_string();
        }

        let mut start = chars.len() - target_chars;
        while start < chars.len() && !chars[start].is_whitespace() {
            start += 1;
        }

        chars[start..]
            .iter()
            .collect::<String>()
            .trim_start()
            .to_string()
    }

    /// Prepend the tail of each chunk to its successor.
    fn apply_overlap(&self, chunks: Vec<ChunkData>, config: &ChunkConfig) -> Vec<ChunkData> {
        if config.overlap_tokens == 0 || chunks.len() < 2 {
            return chunks;
        }

        let mut out = Vec::with_capacity(chunks.len());
        let mut prev_tail: Option<String> = None;

        for chunk in chunks {
            let tail = self.tail(&chunk.content, config.overlap_tokens);
            let content = match prev_tail.take() {
                Some(prev) if !prev.is_empty() => format!("{} {}", prev, chunk.content),
                _ => chunk.content,
            };
            prev_tail = Some(tail);

            let token_count = self.count_tokens(&content);
            out.push(ChunkData {
                content,
                token_count,
            });
        }

        out
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkConfig) -> Result<Vec<ChunkData>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let chunks = self.chunk_recursive(content, &SEPARATORS, config);

        // Filter out chunks that are too small before overlapping
        let chunks: Vec<_> = chunks
            .into_iter()
            .filter(|c| c.token_count >= config.min_tokens)
            .collect();

        tracing::debug!("Chunked {} bytes into {} chunks", content.len(), chunks.len());

        Ok(self.apply_overlap(chunks, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_config(max: usize, min: usize, overlap: usize) -> ChunkConfig {
        ChunkConfig {
            max_tokens: max,
            min_tokens: min,
            overlap_tokens: overlap,
        }
    }

    #[test]
    fn test_simple_chunk() {
        let chunker = RecursiveChunker::new();
        let config = word_config(100, 1, 0);

        let text = "Hello world. This is a test.";
        let chunks = chunker.chunk(text, &config).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, text);
    }

    #[test]
    fn test_paragraph_split() {
        // Use a word-count token counter to make splitting predictable
        let chunker = RecursiveChunker::with_token_counter(|s| s.split_whitespace().count());
        let config = word_config(5, 1, 0);

        let text = "First paragraph with several words here.\n\nSecond paragraph also with words.\n\nThird paragraph too.";
        let chunks = chunker.chunk(text, &config).unwrap();

        assert!(chunks.len() >= 2, "Expected at least 2 chunks, got {}", chunks.len());
    }

    #[test]
    fn test_overlap_carries_previous_tail() {
        let chunker = RecursiveChunker::with_token_counter(|s| s.split_whitespace().count());
        let config = ChunkConfig {
            max_tokens: 6,
            min_tokens: 1,
            // tail() works in chars (~4 per token), so 2 tokens ~ 8 chars
            overlap_tokens: 2,
        };

        let text = "alpha beta gamma delta epsilon zeta\n\neta theta iota kappa lambda mu";
        let chunks = chunker.chunk(text, &config).unwrap();

        assert!(chunks.len() >= 2);
        // The second chunk starts with text carried over from the first
        assert!(
            chunks[1].content.contains("zeta"),
            "second chunk should overlap the first: {:?}",
            chunks[1].content
        );
        assert!(chunks[1].content.contains("eta theta"));
    }

    #[test]
    fn test_min_tokens_filter() {
        let chunker = RecursiveChunker::with_token_counter(|s| s.split_whitespace().count());
        let config = word_config(5, 3, 0);

        let text = "one two three four five six seven.\n\nok";
        let chunks = chunker.chunk(text, &config).unwrap();

        assert!(chunks.iter().all(|c| c.token_count >= 3));
    }

    #[test]
    fn test_empty_content() {
        let chunker = RecursiveChunker::new();
        let config = ChunkConfig::default();

        let chunks = chunker.chunk("", &config).unwrap();
        assert!(chunks.is_empty());

        let chunks = chunker.chunk("   \n\n  ", &config).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_long_unbroken_text_splits_by_size() {
        let chunker = RecursiveChunker::new();
        let config = word_config(10, 1, 0);

        let text = "x".repeat(1000);
        let chunks = chunker.chunk(&text, &config).unwrap();

        assert!(chunks.len() > 1);
    }
}
