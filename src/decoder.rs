//! Greedy token-to-text decoding.
//!
//! The inference engine emits a fixed-length id sequence. Decoding walks it in
//! order until the end-of-text sentinel, renders text tokens through the
//! vocabulary, skips control ids, and collapses repeated spaces in the result.

use crate::bundle::Vocabulary;

/// Decode an id sequence into text.
///
/// Rules, in order per id:
/// - equal to `vocab.token_eot` stops decoding immediately; anything after the
///   sentinel is discarded;
/// - below the sentinel renders as text via the vocabulary;
/// - above the sentinel is a control id and is skipped silently.
///
/// Ids with no vocabulary entry (a collaborator contract violation) are
/// skipped rather than panicking. Runs of spaces in the accumulated text are
/// collapsed to a single space.
pub fn decode_tokens(ids: &[i32], vocab: &Vocabulary) -> String {
    let mut text = String::new();

    for (pos, &id) in ids.iter().enumerate() {
        if id == vocab.token_eot {
            log::trace!("End-of-text sentinel at position {}", pos);
            break;
        }
        if id > vocab.token_eot {
            continue;
        }
        if let Some(word) = vocab.token(id) {
            text.push_str(word);
        }
    }

    collapse_spaces(&text)
}

/// Collapse every maximal run of space characters to a single space.
///
/// Only `' '` is normalized; tabs and newlines pass through untouched.
fn collapse_spaces(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut in_space_run = false;

    for c in input.chars() {
        if c == ' ' {
            if !in_space_run {
                result.push(c);
            }
            in_space_run = true;
        } else {
            result.push(c);
            in_space_run = false;
        }
    }

    result
}
