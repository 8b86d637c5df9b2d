//! Word shingling.
//!
//! Text is lowercased and split on single spaces, exactly: no punctuation is
//! stripped and runs of spaces produce empty tokens. Each token window is
//! joined back with one space and hashed with XXH32 (seed 0), so a given
//! window string maps to the same 32-bit fingerprint on every platform.

use rayon::prelude::*;
use xxhash_rust::xxh32::xxh32;

use crate::config::{ShingleConfig, TailPolicy};

/// Lowercase `content` and split it on `' '`.
pub fn tokenize(content: &str) -> Vec<String> {
    content.to_lowercase().split(' ').map(str::to_owned).collect()
}

/// One window per start index. Windows near the end shrink instead of
/// being dropped, so the output always has `values.len()` entries.
///
/// `n == 0` yields no windows.
pub fn make_ngrams<T>(values: &[T], n: usize) -> Vec<&[T]> {
    if n == 0 {
        return Vec::new();
    }
    let len = values.len();
    (0..len).map(|i| &values[i..(i + n).min(len)]).collect()
}

/// Fingerprint of a token window: the tokens joined by one space, hashed.
pub fn fingerprint<S: AsRef<str>>(window: &[S]) -> u32 {
    let mut buf = String::new();
    fingerprint_into(window, &mut buf)
}

#[inline]
fn fingerprint_into<S: AsRef<str>>(window: &[S], buf: &mut String) -> u32 {
    buf.clear();
    for (i, token) in window.iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        buf.push_str(token.as_ref());
    }
    xxh32(buf.as_bytes(), 0)
}

/// Shingle fingerprints of a document, in window order.
///
/// Duplicates are kept unless `cfg.dedup` is set, in which case the output
/// is sorted and deduplicated.
pub fn make_shingles(content: &str, cfg: &ShingleConfig) -> Vec<u32> {
    if content.is_empty() || cfg.width == 0 {
        return Vec::new();
    }

    let tokens = tokenize(content);
    let mut buf = String::new();
    let mut out: Vec<u32> = make_ngrams(&tokens, cfg.width)
        .into_iter()
        .filter(|window| window.len() == cfg.width || cfg.tail_policy == TailPolicy::Keep)
        .map(|window| fingerprint_into(window, &mut buf))
        .collect();

    if cfg.dedup {
        out.sort_unstable();
        out.dedup();
    }
    out
}

/// Shingle every document; output index `i` belongs to `contents[i]`.
pub fn make_shingles_batch<S>(contents: &[S], cfg: &ShingleConfig, use_parallel: bool) -> Vec<Vec<u32>>
where
    S: AsRef<str> + Sync,
{
    if use_parallel {
        contents
            .par_iter()
            .map(|c| make_shingles(c.as_ref(), cfg))
            .collect()
    } else {
        contents
            .iter()
            .map(|c| make_shingles(c.as_ref(), cfg))
            .collect()
    }
}
