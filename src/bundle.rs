//! Parsing of the packed filter-bank/vocabulary resource bundle.
//!
//! Whisper TFLite deployments ship a single self-describing blob (typically
//! embedded at build time with `include_bytes!`) that packs the mel filter
//! bank and the token vocabulary. The layout is little-endian and sequential:
//!
//! ```text
//! magic:u32 | n_mel:u32 | n_fft:u32 | weights:f32[n_mel * n_fft]
//!          | n_vocab:i32 | { len:u32 | utf8_bytes[len] } * n_vocab
//! ```
//!
//! The magic constant is `0x74666C74` ("tflt"). Every read is bounds-checked;
//! a truncated or corrupt bundle yields a [`BundleError`] instead of reading
//! past the buffer.

use std::str;

/// Magic constant at the start of every bundle ("tflt", little-endian).
pub const BUNDLE_MAGIC: u32 = 0x74666C74;

/// Maximum byte length of a single vocabulary entry.
///
/// The bundle format caps words at 255 bytes; longer entries are rejected as
/// corrupt rather than truncated.
pub const MAX_TOKEN_LEN: usize = 255;

/// Default end-of-text sentinel id for Whisper vocabularies.
pub const TOKEN_EOT: i32 = 50256;

/// Token count of the multilingual Whisper vocabulary.
pub const N_VOCAB_MULTILINGUAL: i32 = 51865;

#[derive(thiserror::Error, Debug)]
pub enum BundleError {
    #[error("invalid bundle magic 0x{0:08x}, expected 0x{BUNDLE_MAGIC:08x}")]
    BadMagic(u32),
    #[error("bundle truncated: need {needed} bytes at offset {offset}, only {remaining} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[error("filter bank dimensions overflow ({n_mel} x {n_fft})")]
    FilterDimensions { n_mel: u32, n_fft: u32 },
    #[error("vocabulary declares a negative token count ({0})")]
    NegativeVocabSize(i32),
    #[error("token {index} is {len} bytes long, maximum is {MAX_TOKEN_LEN}")]
    TokenTooLong { index: usize, len: usize },
    #[error("token {index} is not valid UTF-8")]
    TokenUtf8 {
        index: usize,
        #[source]
        source: str::Utf8Error,
    },
}

/// Mel filter bank coefficients, row-major with shape `[n_mel, n_fft]`.
///
/// Constructed once from the bundle and immutable afterwards. The length
/// invariant `data.len() == n_mel * n_fft` is enforced by [`parse_bundle`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterBank {
    pub n_mel: u32,
    pub n_fft: u32,
    pub data: Vec<f32>,
}

/// Token vocabulary mapping sequential ids to UTF-8 strings.
///
/// Ids `>= token_eot` are control tokens and are never rendered as text.
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    pub n_vocab: i32,
    id_to_token: Vec<String>,
    pub token_eot: i32,
}

impl Vocabulary {
    /// Build a vocabulary from an id-ordered token list.
    ///
    /// The end-of-text sentinel defaults to [`TOKEN_EOT`]; see
    /// [`Vocabulary::with_token_eot`].
    pub fn new(id_to_token: Vec<String>) -> Self {
        Self {
            n_vocab: id_to_token.len() as i32,
            id_to_token,
            token_eot: TOKEN_EOT,
        }
    }

    /// Look up a token by id. Returns `None` for ids outside `[0, n_vocab)`.
    pub fn token(&self, id: i32) -> Option<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.id_to_token.get(i))
            .map(|s| s.as_str())
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_token.is_empty()
    }

    /// Whether the declared size matches the multilingual Whisper vocabulary.
    pub fn is_multilingual(&self) -> bool {
        self.n_vocab == N_VOCAB_MULTILINGUAL
    }

    /// Override the end-of-text sentinel for non-default vocabularies.
    pub fn with_token_eot(mut self, token_eot: i32) -> Self {
        self.token_eot = token_eot;
        self
    }
}

/// Bounds-checked sequential reader over the bundle bytes.
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], BundleError> {
        let remaining = self.data.len() - self.pos;
        if len > remaining {
            return Err(BundleError::Truncated {
                offset: self.pos,
                needed: len,
                remaining,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_u32(&mut self) -> Result<u32, BundleError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_i32(&mut self) -> Result<i32, BundleError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_f32s(&mut self, count: usize) -> Result<Vec<f32>, BundleError> {
        let bytes = self.take(count * 4)?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

/// Parse a resource bundle into its filter bank and vocabulary.
///
/// Single sequential pass over the bytes, no backtracking. Parsing is a pure
/// function of the byte content; a given bundle always produces the same
/// structures. The end-of-text sentinel is not stored in the bundle and
/// defaults to [`TOKEN_EOT`].
pub fn parse_bundle(bytes: &[u8]) -> Result<(FilterBank, Vocabulary), BundleError> {
    let mut cursor = Cursor::new(bytes);

    let magic = cursor.read_u32()?;
    if magic != BUNDLE_MAGIC {
        return Err(BundleError::BadMagic(magic));
    }

    let n_mel = cursor.read_u32()?;
    let n_fft = cursor.read_u32()?;
    let weight_count = (n_mel as usize)
        .checked_mul(n_fft as usize)
        .filter(|c| c.checked_mul(4).is_some())
        .ok_or(BundleError::FilterDimensions { n_mel, n_fft })?;
    let data = cursor.read_f32s(weight_count)?;

    let filters = FilterBank { n_mel, n_fft, data };

    let n_vocab = cursor.read_i32()?;
    if n_vocab < 0 {
        return Err(BundleError::NegativeVocabSize(n_vocab));
    }

    let mut id_to_token = Vec::with_capacity(n_vocab as usize);
    for index in 0..n_vocab as usize {
        let len = cursor.read_u32()? as usize;
        if len > MAX_TOKEN_LEN {
            return Err(BundleError::TokenTooLong { index, len });
        }
        let bytes = cursor.take(len)?;
        let word = str::from_utf8(bytes)
            .map_err(|source| BundleError::TokenUtf8 { index, source })?;
        id_to_token.push(word.to_string());
    }

    log::info!(
        "Parsed resource bundle: {}x{} filter bank, {} tokens",
        filters.n_mel,
        filters.n_fft,
        id_to_token.len()
    );

    let vocab = Vocabulary {
        n_vocab,
        id_to_token,
        token_eot: TOKEN_EOT,
    };

    Ok((filters, vocab))
}

/// Encode a filter bank and vocabulary back into the bundle byte layout.
///
/// Exact inverse of [`parse_bundle`]: re-encoding a parsed bundle reproduces
/// the original bytes. Used to author bundles.
pub fn encode_bundle(filters: &FilterBank, vocab: &Vocabulary) -> Vec<u8> {
    let mut out = Vec::with_capacity(16 + filters.data.len() * 4);
    out.extend_from_slice(&BUNDLE_MAGIC.to_le_bytes());
    out.extend_from_slice(&filters.n_mel.to_le_bytes());
    out.extend_from_slice(&filters.n_fft.to_le_bytes());
    for &w in &filters.data {
        out.extend_from_slice(&w.to_le_bytes());
    }
    out.extend_from_slice(&vocab.n_vocab.to_le_bytes());
    for word in &vocab.id_to_token {
        out.extend_from_slice(&(word.len() as u32).to_le_bytes());
        out.extend_from_slice(word.as_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> Vec<u8> {
        let filters = FilterBank {
            n_mel: 2,
            n_fft: 3,
            data: vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6],
        };
        let vocab = Vocabulary::new(vec![
            "Hello".to_string(),
            " world".to_string(),
            "!".to_string(),
        ]);
        encode_bundle(&filters, &vocab)
    }

    #[test]
    fn test_round_trip() {
        let bytes = sample_bundle();
        let (filters, vocab) = parse_bundle(&bytes).unwrap();

        assert_eq!(filters.n_mel, 2);
        assert_eq!(filters.n_fft, 3);
        assert_eq!(filters.data.len(), 6);
        assert_eq!(vocab.len(), 3);
        assert_eq!(vocab.token(0), Some("Hello"));
        assert_eq!(vocab.token(1), Some(" world"));
        assert_eq!(vocab.token(3), None);
        assert_eq!(vocab.token(-1), None);

        assert_eq!(encode_bundle(&filters, &vocab), bytes);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut bytes = sample_bundle();
        bytes[0] = 0x00;
        match parse_bundle(&bytes) {
            Err(BundleError::BadMagic(_)) => {}
            other => panic!("expected BadMagic, got {:?}", other),
        }
    }

    #[test]
    fn test_truncation_rejected_at_every_boundary() {
        let bytes = sample_bundle();
        // Any prefix shorter than the full bundle must fail cleanly.
        for len in 0..bytes.len() {
            let result = parse_bundle(&bytes[..len]);
            match result {
                Err(BundleError::Truncated { .. }) | Err(BundleError::BadMagic(_)) => {}
                other => panic!("prefix of {} bytes: expected error, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_declared_length_past_end_rejected() {
        let mut bytes = sample_bundle();
        // Inflate the length prefix of the first token far past the buffer.
        let first_len_offset = 4 + 4 + 4 + 6 * 4 + 4;
        bytes[first_len_offset..first_len_offset + 4].copy_from_slice(&200u32.to_le_bytes());
        match parse_bundle(&bytes) {
            Err(BundleError::Truncated { .. }) => {}
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_token_rejected() {
        let filters = FilterBank {
            n_mel: 1,
            n_fft: 1,
            data: vec![1.0],
        };
        let vocab = Vocabulary::new(vec!["x".repeat(MAX_TOKEN_LEN + 1)]);
        let bytes = encode_bundle(&filters, &vocab);
        match parse_bundle(&bytes) {
            Err(BundleError::TokenTooLong { index: 0, len }) => {
                assert_eq!(len, MAX_TOKEN_LEN + 1);
            }
            other => panic!("expected TokenTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let filters = FilterBank {
            n_mel: 1,
            n_fft: 1,
            data: vec![1.0],
        };
        let vocab = Vocabulary::new(vec!["ab".to_string()]);
        let mut bytes = encode_bundle(&filters, &vocab);
        let last = bytes.len() - 1;
        bytes[last] = 0xFF;
        match parse_bundle(&bytes) {
            Err(BundleError::TokenUtf8 { index: 0, .. }) => {}
            other => panic!("expected TokenUtf8, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_vocabulary() {
        let filters = FilterBank {
            n_mel: 1,
            n_fft: 2,
            data: vec![0.5, 0.25],
        };
        let vocab = Vocabulary::new(vec![]);
        let bytes = encode_bundle(&filters, &vocab);
        let (_, parsed) = parse_bundle(&bytes).unwrap();
        assert!(parsed.is_empty());
        assert!(!parsed.is_multilingual());
    }
}
