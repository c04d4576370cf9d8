//! # Code Hatching
//!
//! Compose the execution context that makes a traced process run injected
//! code.
//!
//! Hatching is pure: it takes the caller's code, seed and register bytes and
//! produces a [`RegisterFile`] whose program counter points at the injection
//! address. Writing the code into the target, mapping the region and resuming
//! the thread are left to the process-control layer.
//!
//! ## Flow
//!
//! ```text
//! process-control layer                 hatchery
//! ---------------------                 --------
//! PTRACE_GETREGS        -> reg bytes
//! mmap region at INJECTION_ADDRESS
//! seed = region length  ------------->  hatch_code(code, seed, reg)
//!                       <-------------  RegisterFile (pc = INJECTION_ADDRESS)
//! write code at INJECTION_ADDRESS
//! PTRACE_SETREGS(registers)
//! PTRACE_CONT / PTRACE_SINGLESTEP
//! ```

pub mod builder;

pub use builder::Hatcher;

use crate::arch::ArchProfile;
use crate::types::RegisterFile;

/// The result of hatching: everything the process-control layer needs to
/// start the injected code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hatchling<'c, A: ArchProfile>
{
    registers: RegisterFile<A>,
    code: &'c [u8],
    entry: A::Word,
    region: Option<u64>,
}

impl<'c, A: ArchProfile> Hatchling<'c, A>
{
    /// The composed register file.
    #[must_use]
    pub fn registers(&self) -> &RegisterFile<A>
    {
        &self.registers
    }

    /// Take the composed register file.
    #[must_use]
    pub fn into_registers(self) -> RegisterFile<A>
    {
        self.registers
    }

    /// The code to write at [`injection_address`](Self::injection_address).
    #[must_use]
    pub fn code(&self) -> &'c [u8]
    {
        self.code
    }

    /// Where the code must be written.
    #[must_use]
    pub fn injection_address(&self) -> A::Word
    {
        A::INJECTION_ADDRESS
    }

    /// Where execution resumes; equal to the program counter of
    /// [`registers`](Self::registers).
    #[must_use]
    pub fn entry_point(&self) -> A::Word
    {
        self.entry
    }

    /// Length of the writable region read from the seed, if any.
    #[must_use]
    pub fn region_length(&self) -> Option<u64>
    {
        self.region
    }
}

/// Compose the register file that runs `code` in a traced process
///
/// `seed`'s first word is the length of the writable region mapped at the
/// injection address; `reg` is the baseline CPU state, a full register file
/// image or a syscall register vector image. The returned register file is
/// the baseline with the program counter set to the injection address.
///
/// Uses the profile `A` explicitly; see [`hatch_code`] for the native one.
///
/// ## Errors
///
/// `SizeMismatch`, `EmptyCode`, `InvalidSeed` or `CodeTooLarge`; see
/// [`Hatcher::hatch`].
pub fn hatch_code_for<A: ArchProfile>(code: &[u8], seed: &[u8], reg: &[u8]) -> crate::Result<RegisterFile<A>>
{
    Hatcher::<A>::new().hatch(code, seed, reg).map(Hatchling::into_registers)
}

/// Compose the register file that runs `code` in a traced process, for the
/// native architecture.
///
/// ## Example
///
/// ```rust
/// # #[cfg(target_arch = "x86_64")]
/// # fn main() -> hatchery_core::Result<()> {
/// use hatchery_core::{hatch_code, size_of_sysreg_union};
///
/// let code = [0x0f, 0x05]; // syscall
/// let seed = 0x10u64.to_ne_bytes();
/// let reg = vec![0u8; size_of_sysreg_union()];
///
/// let regs = hatch_code(&code, &seed, &reg)?;
/// assert_eq!(regs.pc(), 0x7000_0000_0000);
/// # Ok(())
/// # }
/// # #[cfg(not(target_arch = "x86_64"))]
/// # fn main() {}
/// ```
///
/// ## Errors
///
/// `SizeMismatch`, `EmptyCode`, `InvalidSeed` or `CodeTooLarge`; see
/// [`Hatcher::hatch`].
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub fn hatch_code(code: &[u8], seed: &[u8], reg: &[u8]) -> crate::Result<RegisterFile<crate::arch::Native>>
{
    hatch_code_for::<crate::arch::Native>(code, seed, reg)
}
