//! Recursive character text splitter.
//!
//! Splits on the coarsest separator that appears in the text (paragraphs,
//! then lines, then words, then characters), packs the pieces into chunks of
//! at most `chunk_size` characters, and carries up to `overlap` characters
//! of trailing context into the next chunk.

use std::collections::VecDeque;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Split `text` into chunks of at most `chunk_size` characters.
///
/// Lengths are counted in `char`s. Whitespace-only chunks are dropped.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if chunk_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(chunk_size.saturating_sub(1));
    split_recursive(text, &SEPARATORS, chunk_size, overlap)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn split_recursive(
    text: &str,
    separators: &[&str],
    chunk_size: usize,
    overlap: usize,
) -> Vec<String> {
    // First separator present in the text; "" always matches.
    let pos = separators
        .iter()
        .position(|sep| sep.is_empty() || text.contains(sep))
        .unwrap_or(separators.len().saturating_sub(1));
    let separator = separators.get(pos).copied().unwrap_or("");
    let remaining = separators.get(pos + 1..).unwrap_or(&[]);

    let splits: Vec<String> = if separator.is_empty() {
        text.chars().map(String::from).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    };

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for piece in splits {
        if char_len(&piece) < chunk_size {
            pending.push(piece);
            continue;
        }

        if !pending.is_empty() {
            chunks.extend(merge_splits(&pending, separator, chunk_size, overlap));
            pending.clear();
        }

        if remaining.is_empty() {
            chunks.push(piece);
        } else {
            chunks.extend(split_recursive(&piece, remaining, chunk_size, overlap));
        }
    }

    if !pending.is_empty() {
        chunks.extend(merge_splits(&pending, separator, chunk_size, overlap));
    }

    chunks
}

/// Greedily join small pieces into chunks, keeping an overlap window.
fn merge_splits(
    pieces: &[String],
    separator: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<String> {
    let sep_len = char_len(separator);
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);
        let joiner = if window.is_empty() { 0 } else { sep_len };

        if total + len + joiner > chunk_size && !window.is_empty() {
            push_chunk(&mut chunks, &window, separator);

            // Shrink the window until it fits the overlap budget and leaves
            // room for the incoming piece.
            while total > overlap
                || (total > 0
                    && total + len + if window.is_empty() { 0 } else { sep_len } > chunk_size)
            {
                let Some(front) = window.pop_front() else {
                    break;
                };
                total -= char_len(front) + if window.is_empty() { 0 } else { sep_len };
            }
        }

        let joiner = if window.is_empty() { 0 } else { sep_len };
        window.push_back(piece);
        total += len + joiner;
    }

    push_chunk(&mut chunks, &window, separator);
    chunks
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let joined = window.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
