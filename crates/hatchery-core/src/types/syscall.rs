//! System-call register vector.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

use smallvec::SmallVec;
use tracing::debug;

use crate::arch::{ArchProfile, Word};
use crate::error::{HatcheryError, Result};

/// Inline capacity for a syscall register vector (7 × 8 bytes on x86-64).
const INLINE_SYSREG_BYTES: usize = 64;

/// The registers that carry a system-call number and its arguments
///
/// Slot 0 is the call-number register; slots `1..` are the arguments in
/// calling-convention order (see [`ArchProfile::SYSCALL_REGISTERS`]). The
/// vector owns exactly `SYSREG_COUNT × WORD_SIZE` bytes and exposes them two
/// ways: as ordered words and as a flat byte slice. Both views read and write
/// the same storage, so a word set through [`set_word`](Self::set_word) is
/// immediately visible in [`as_bytes`](Self::as_bytes) and vice versa.
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::{ArchProfile, X86_64};
/// use hatchery_core::types::SyscallRegisters;
///
/// let mut sysregs = SyscallRegisters::<X86_64>::zeroed();
/// sysregs.set_number(60); // exit
/// sysregs.set_arg(0, 42);
///
/// assert_eq!(sysregs.as_bytes().len(), X86_64::SYSREG_BYTES);
/// assert_eq!(&sysregs.as_bytes()[..8], &60u64.to_ne_bytes());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyscallRegisters<A: ArchProfile>
{
    bytes: SmallVec<[u8; INLINE_SYSREG_BYTES]>,
    _arch: PhantomData<A>,
}

impl<A: ArchProfile> SyscallRegisters<A>
{
    /// A vector with every register set to zero.
    #[must_use]
    pub fn zeroed() -> Self
    {
        Self {
            bytes: SmallVec::from_elem(0, A::SYSREG_BYTES),
            _arch: PhantomData,
        }
    }

    /// Interpret a raw byte image as a syscall register vector.
    ///
    /// The bytes are copied; the caller's buffer is not touched.
    ///
    /// ## Errors
    ///
    /// `HatcheryError::SizeMismatch` unless `bytes` is exactly
    /// [`ArchProfile::SYSREG_BYTES`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self>
    {
        if bytes.len() != A::SYSREG_BYTES {
            debug!(
                arch = A::NAME,
                expected = A::SYSREG_BYTES,
                actual = bytes.len(),
                "rejected syscall register image"
            );
            return Err(HatcheryError::SizeMismatch {
                expected: A::SYSREG_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: SmallVec::from_slice(bytes),
            _arch: PhantomData,
        })
    }

    /// Build a vector from words in calling-convention order.
    ///
    /// ## Errors
    ///
    /// `HatcheryError::SizeMismatch` unless exactly
    /// [`ArchProfile::SYSREG_COUNT`] words are supplied.
    pub fn from_words(words: &[A::Word]) -> Result<Self>
    {
        if words.len() != A::SYSREG_COUNT {
            return Err(HatcheryError::SizeMismatch {
                expected: A::SYSREG_BYTES,
                actual: words.len() * A::WORD_SIZE,
            });
        }
        let mut regs = Self::zeroed();
        for (slot, word) in words.iter().enumerate() {
            regs.set_word(slot, *word);
        }
        Ok(regs)
    }

    /// Number of slots in the vector.
    #[must_use]
    pub fn len(&self) -> usize
    {
        A::SYSREG_COUNT
    }

    /// Always `false`; every profile has at least the call-number register.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        A::SYSREG_COUNT == 0
    }

    /// The word in `slot`, or `None` past the end of the vector.
    #[must_use]
    pub fn word(&self, slot: usize) -> Option<A::Word>
    {
        A::Word::from_ne_slice(self.bytes.get(word_span::<A>(slot)?)?)
    }

    /// Overwrite the word in `slot`. Returns `None` past the end of the vector.
    pub fn set_word(&mut self, slot: usize, value: A::Word) -> Option<()>
    {
        let dest = self.bytes.get_mut(word_span::<A>(slot)?)?;
        value.write_ne(dest);
        Some(())
    }

    /// The system-call number register.
    #[must_use]
    pub fn number(&self) -> A::Word
    {
        self.word(0).unwrap_or(A::Word::ZERO)
    }

    /// Set the system-call number register.
    pub fn set_number(&mut self, number: A::Word)
    {
        self.set_word(0, number);
    }

    /// Argument `index` (zero-based), or `None` if the convention has no such
    /// argument register.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<A::Word>
    {
        self.word(index.checked_add(1)?)
    }

    /// Set argument `index` (zero-based). Returns `None` if the convention has
    /// no such argument register.
    pub fn set_arg(&mut self, index: usize, value: A::Word) -> Option<()>
    {
        self.set_word(index.checked_add(1)?, value)
    }

    /// The architectural register aliased by `slot`.
    #[must_use]
    pub fn register_at(slot: usize) -> Option<A::Register>
    {
        A::SYSCALL_REGISTERS.get(slot).copied()
    }

    /// All words in calling-convention order.
    pub fn words(&self) -> impl Iterator<Item = A::Word> + '_
    {
        self.bytes.chunks_exact(A::WORD_SIZE).filter_map(A::Word::from_ne_slice)
    }

    /// Flat byte view.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    /// Mutable flat byte view. Writes are visible through the word view.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8]
    {
        &mut self.bytes
    }
}

/// Byte range of word `index` in a flat buffer of `A` words.
pub(crate) fn word_span<A: ArchProfile>(index: usize) -> Option<Range<usize>>
{
    let start = index.checked_mul(A::WORD_SIZE)?;
    Some(start..start.checked_add(A::WORD_SIZE)?)
}

impl<A: ArchProfile> Default for SyscallRegisters<A>
{
    fn default() -> Self
    {
        Self::zeroed()
    }
}

impl<A: ArchProfile> fmt::Debug for SyscallRegisters<A>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let mut map = f.debug_map();
        for (reg, word) in A::SYSCALL_REGISTERS.iter().zip(self.words()) {
            map.entry(&format_args!("{reg}"), &format_args!("{}", A::format_word(word)));
        }
        map.finish()
    }
}
