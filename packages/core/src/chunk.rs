//! Word-boundary text chunking for reply-chained threads.
//!
//! Threads rejects posts longer than [`THREADS_CHAR_LIMIT`] characters, so
//! long-form text is split into an ordered sequence of chunks that are later
//! published as a linear reply chain.
//!
//! # Rules
//!
//! - Empty text yields no chunks.
//! - Text that already fits is returned untouched as a single chunk.
//! - Otherwise whitespace-delimited words are accumulated greedily, joined
//!   by a single space, and a chunk is closed when the next word would push
//!   it past the limit.
//! - A single word longer than the limit is hard-split at character
//!   boundaries into limit-sized pieces, so no chunk ever exceeds the limit.
//!
//! Lengths are counted in Unicode scalar values, not bytes.

/// Maximum number of characters Threads accepts in a single post.
pub const THREADS_CHAR_LIMIT: usize = 500;

/// Split `text` into ordered chunks of at most `limit` characters.
///
/// A `limit` of zero is treated as one.
///
/// ```
/// use threadpost::split_text;
///
/// assert_eq!(split_text("", 10), Vec::<String>::new());
/// assert_eq!(split_text("short", 10), vec!["short"]);
/// assert_eq!(split_text("one two three", 7), vec!["one two", "three"]);
/// ```
pub fn split_text(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);

    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = char_len(word);

        if word_len > limit {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let mut pieces = hard_split(word, limit);
            // The tail piece stays open so following words can share its chunk.
            let tail = pieces.pop().unwrap_or_default();
            chunks.extend(pieces.into_iter().map(str::to_string));
            current_len = char_len(tail);
            current = tail.to_string();
            continue;
        }

        let needed = if current.is_empty() {
            word_len
        } else {
            current_len + 1 + word_len
        };

        if needed > limit {
            chunks.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Number of characters in `s`, as Threads counts them.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Cut `word` into consecutive pieces of `limit` characters; the last piece
/// may be shorter. Never returns an empty vector for a non-empty word.
fn hard_split(word: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in word.char_indices() {
        if count == limit {
            pieces.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    pieces.push(&word[start..]);
    pieces
}
