use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SplitterConfig {
    /// Upper bound on chunk length in bytes. A single sentence longer than
    /// this becomes its own oversized chunk.
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub sentence_aware: bool,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            sentence_aware: true,
        }
    }
}

/// Cuts raw item text into the chunks that get embedded one by one.
#[derive(Debug, Clone, Default)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Split `text` into ordered chunks. Whitespace-only chunks are dropped,
    /// so blank input yields an empty vec.
    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        let SplitterConfig {
            chunk_size,
            chunk_overlap,
            sentence_aware,
        } = self.config;

        let chunks = if sentence_aware {
            merge_sentences(&split_sentences(text), chunk_size, chunk_overlap)
        } else {
            split_chars(text, chunk_size, chunk_overlap)
        };

        chunks
            .into_iter()
            .filter(|chunk| !chunk.trim().is_empty())
            .collect()
    }
}

/// Break on paragraph gaps and on `.`, `?`, `!` followed by a space.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().copied();
        let boundary = match (c, next) {
            ('\n', Some((j, '\n'))) => {
                chars.next();
                Some(j + 1)
            }
            ('.' | '?' | '!', Some((_, ' '))) => Some(i + c.len_utf8()),
            _ => None,
        };

        if let Some(end) = boundary
            && !text[start..end].trim().is_empty()
        {
            sentences.push(&text[start..end]);
            start = end;
        }
    }

    if !text[start..].trim().is_empty() {
        sentences.push(&text[start..]);
    }

    sentences
}

fn merge_sentences(sentences: &[&str], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut window_start = 0;

    for (idx, sentence) in sentences.iter().enumerate() {
        if !current.is_empty() && current.len() + sentence.len() > chunk_size {
            chunks.push(std::mem::take(&mut current));

            // Carry trailing sentences of the closed chunk while they fit the overlap.
            let mut carried = 0;
            let mut overlap_start = idx;
            while overlap_start > window_start {
                let len = sentences[overlap_start - 1].len();
                if carried + len > chunk_overlap {
                    break;
                }
                carried += len;
                overlap_start -= 1;
            }
            current.extend(sentences[overlap_start..idx].iter().copied());
            window_start = overlap_start;
        }
        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn split_chars(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = chunk_size.max(1);
    let step = size.saturating_sub(overlap).max(1);

    (0..chars.len())
        .step_by(step)
        .map(|start| chars[start..(start + size).min(chars.len())].iter().collect())
        .collect()
}
