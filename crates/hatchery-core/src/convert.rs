//! # Byte-to-Word Conversion
//!
//! Interpret caller-supplied raw bytes (seeds, captured memory) as native
//! words.
//!
//! ## Byte Order
//!
//! Native byte order, the same order every flat register view uses. A word
//! read here from bytes taken out of a [`RegisterFile`](crate::types::RegisterFile)
//! equals the word the register file reports for that slot.

use tracing::{debug, trace};

use crate::arch::{ArchProfile, Word};
use crate::error::{HatcheryError, Result};

/// Interpret the first word-size bytes of `bytes` as a word of profile `A`.
///
/// Bytes past the first word are ignored.
///
/// ## Errors
///
/// `HatcheryError::InvalidInput` if `bytes` is shorter than one word. The
/// input is never zero-padded.
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::Arm;
/// use hatchery_core::convert::word_from_bytes;
///
/// let word = word_from_bytes::<Arm>(&0x10u32.to_ne_bytes())?;
/// assert_eq!(word, 0x10);
/// # Ok::<(), hatchery_core::HatcheryError>(())
/// ```
pub fn word_from_bytes<A: ArchProfile>(bytes: &[u8]) -> Result<A::Word>
{
    match A::Word::from_ne_slice(bytes) {
        Some(word) => {
            trace!(arch = A::NAME, word = %A::format_word(word), "converted bytes to word");
            Ok(word)
        }
        None => {
            debug!(arch = A::NAME, expected = A::WORD_SIZE, actual = bytes.len(), "input shorter than a word");
            Err(HatcheryError::InvalidInput {
                expected: A::WORD_SIZE,
                actual: bytes.len(),
            })
        }
    }
}

/// Encode a word of profile `A` as bytes, in the order
/// [`word_from_bytes`] reads them.
#[must_use]
pub fn word_to_bytes<A: ArchProfile>(word: A::Word) -> Vec<u8>
{
    let mut out = vec![0; A::WORD_SIZE];
    word.write_ne(&mut out);
    out
}

/// Interpret the first word-size bytes of `bytes` as a native word.
///
/// ## Errors
///
/// `HatcheryError::InvalidInput` if `bytes` is shorter than one native word.
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub fn bytes_to_integer(bytes: &[u8]) -> Result<crate::arch::NativeWord>
{
    word_from_bytes::<crate::arch::Native>(bytes)
}
