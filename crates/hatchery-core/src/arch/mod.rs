//! # Architecture Profiles
//!
//! Static descriptions of the CPU architectures the hatchery knows how to
//! inject code into.
//!
//! Every architecture-dependent fact lives behind the [`ArchProfile`] trait:
//! the native word width, the register-file layout captured by `ptrace`, the
//! system-call calling convention and the fixed address injected code is
//! expected to live at. The rest of the crate is generic over the profile, so
//! there are no `cfg` branches scattered through the register or hatching
//! logic.
//!
//! Two profiles exist:
//!
//! - [`X86_64`]: 64-bit words, Linux `user_regs_struct` layout
//! - [`Arm`]: 32-bit words, Linux `user_regs` layout (ARM EABI)
//!
//! Exactly one of them is the [`Native`] profile of a given build, selected
//! with `#[cfg(target_arch = "...")]`. Both stay available by name so that
//! layouts can be inspected (and tested) on any host.

use std::fmt;
use std::hash::Hash;

pub mod arm;
pub mod x86_64;

pub use arm::{Arm, ArmRegister};
pub use x86_64::{X86_64Register, X86_64};

/// The profile of the architecture this crate was compiled for.
#[cfg(target_arch = "x86_64")]
pub type Native = X86_64;

/// The profile of the architecture this crate was compiled for.
#[cfg(target_arch = "arm")]
pub type Native = Arm;

/// The native word of the build's architecture (`u64` on x86-64, `u32` on ARM).
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub type NativeWord = <Native as ArchProfile>::Word;

/// A general-purpose register width.
///
/// Implemented for `u64` and `u32`. All conversions between words and raw
/// bytes use **native byte order**, and every flat view in this crate goes
/// through these methods, so a value written through one view reads back
/// identically through any other.
pub trait Word:
    Copy + Default + Eq + Ord + Hash + fmt::Debug + fmt::LowerHex + fmt::UpperHex + Send + Sync + 'static
{
    /// Width of the word in bytes.
    const SIZE: usize;

    /// The zero word.
    const ZERO: Self;

    /// Read a word from the first `SIZE` bytes of `bytes`.
    ///
    /// Returns `None` if fewer than `SIZE` bytes are available. Trailing bytes
    /// are ignored.
    fn from_ne_slice(bytes: &[u8]) -> Option<Self>;

    /// Write the word into the first `SIZE` bytes of `out`.
    ///
    /// # Panics
    ///
    /// Panics if `out` is shorter than `SIZE`.
    fn write_ne(self, out: &mut [u8]);

    /// Widen the word to 64 bits.
    fn to_u64(self) -> u64;

    /// Narrow a 64-bit value, returning `None` if it does not fit.
    fn from_u64(value: u64) -> Option<Self>;

    /// Overflow-checked addition.
    fn checked_add(self, rhs: Self) -> Option<Self>;
}

macro_rules! impl_word {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Word for $ty
            {
                const SIZE: usize = std::mem::size_of::<$ty>();
                const ZERO: Self = 0;

                fn from_ne_slice(bytes: &[u8]) -> Option<Self>
                {
                    let head = bytes.get(..Self::SIZE)?;
                    head.try_into().ok().map(<$ty>::from_ne_bytes)
                }

                fn write_ne(self, out: &mut [u8])
                {
                    out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
                }

                fn to_u64(self) -> u64
                {
                    u64::from(self)
                }

                fn from_u64(value: u64) -> Option<Self>
                {
                    <$ty>::try_from(value).ok()
                }

                fn checked_add(self, rhs: Self) -> Option<Self>
                {
                    <$ty>::checked_add(self, rhs)
                }
            }
        )*
    };
}

impl_word!(u32, u64);

/// Static description of one CPU architecture.
///
/// A profile is a zero-sized marker type; it is never instantiated with data
/// and never switched at runtime. Everything it describes is an associated
/// type or constant.
///
/// ## Implementing a profile
///
/// Only [`ArchProfile::register_index`] and the un-defaulted constants need to
/// be provided; sizes are derived from them.
pub trait ArchProfile: Copy + Default + fmt::Debug + PartialEq + Eq + Hash + Send + Sync + 'static
{
    /// Native general-purpose register width.
    type Word: Word;

    /// Named register identifier for this architecture.
    type Register: Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Human-readable architecture name (e.g. `"x86_64"`).
    const NAME: &'static str;

    /// Number of words in the captured register file.
    const REGISTER_COUNT: usize;

    /// Index of the program counter in the flat word view.
    const PC_INDEX: usize;

    /// Registers carrying the system-call number and its arguments, in
    /// calling-convention order. The call-number register comes first.
    const SYSCALL_REGISTERS: &'static [Self::Register];

    /// Encoding of the instruction that performs a system call.
    const SYSCALL_INSTRUCTION: &'static [u8];

    /// Required alignment of an instruction address, in bytes.
    const INSTRUCTION_ALIGNMENT: usize;

    /// Address at which injected code is expected to reside.
    ///
    /// Deliberately high and implausible so it does not collide with any
    /// mapping the target already has. Mapping it is the job of whoever
    /// writes the code into the target.
    const INJECTION_ADDRESS: Self::Word;

    /// Whether hatching needs a seed-derived value on this architecture.
    const SEED_REQUIRED: bool;

    /// Width of one word in bytes.
    const WORD_SIZE: usize = <Self::Word as Word>::SIZE;

    /// Size of the system-call instruction in bytes.
    const SYSCALL_INST_SIZE: usize = Self::SYSCALL_INSTRUCTION.len();

    /// Number of registers in the system-call register vector.
    const SYSREG_COUNT: usize = Self::SYSCALL_REGISTERS.len();

    /// Size of the captured register file in bytes.
    const REGISTER_BYTES: usize = Self::REGISTER_COUNT * Self::WORD_SIZE;

    /// Size of the system-call register vector in bytes.
    const SYSREG_BYTES: usize = Self::SYSREG_COUNT * Self::WORD_SIZE;

    /// Position of `register` in the flat word view, or `None` if the
    /// identifier does not name a register of this architecture.
    fn register_index(register: Self::Register) -> Option<usize>;

    /// Canonical diagnostic rendering of a word: lowercase hex, no prefix.
    fn format_word(word: Self::Word) -> String
    {
        format!("{word:x}")
    }
}
