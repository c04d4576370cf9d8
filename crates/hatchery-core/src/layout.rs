//! # Layout Introspection
//!
//! Static byte sizes of the register structures, for sizing buffers before
//! any read from or write to a traced process.
//!
//! Nothing here needs a target process: every value is a constant of the
//! architecture profile.

use std::fmt;

use crate::arch::{ArchProfile, Word};

/// Byte size of one register file for profile `A`.
#[must_use]
pub const fn register_bytes<A: ArchProfile>() -> usize
{
    A::REGISTER_BYTES
}

/// Byte size of one syscall register vector for profile `A`.
#[must_use]
pub const fn sysreg_bytes<A: ArchProfile>() -> usize
{
    A::SYSREG_BYTES
}

/// Byte size of one register file for the native architecture.
///
/// ## Example
///
/// ```rust
/// # #[cfg(target_arch = "x86_64")]
/// # fn main() {
/// assert_eq!(hatchery_core::size_of_registers(), 216);
/// # }
/// # #[cfg(not(target_arch = "x86_64"))]
/// # fn main() {}
/// ```
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
#[must_use]
pub const fn size_of_registers() -> usize
{
    register_bytes::<crate::arch::Native>()
}

/// Byte size of one syscall register vector for the native architecture.
///
/// Always `SYSREG_COUNT × WORD_SIZE`.
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
#[must_use]
pub const fn size_of_sysreg_union() -> usize
{
    sysreg_bytes::<crate::arch::Native>()
}

/// Summary of an architecture profile's layout
///
/// Handy for diagnostics: the `Display` implementation prints one line per
/// fact, with addresses in the profile's canonical word format.
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::Arm;
/// use hatchery_core::layout::Layout;
///
/// let layout = Layout::of::<Arm>();
/// assert_eq!(layout.register_bytes, 72);
/// assert_eq!(layout.sysreg_bytes, 28);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout
{
    /// Architecture name
    pub arch: &'static str,
    /// Native word width in bytes
    pub word_size: usize,
    /// Words in the register file
    pub register_count: usize,
    /// Bytes in the register file
    pub register_bytes: usize,
    /// Index of the program counter in the register file
    pub pc_index: usize,
    /// Registers in the syscall register vector
    pub sysreg_count: usize,
    /// Bytes in the syscall register vector
    pub sysreg_bytes: usize,
    /// Size of the system-call instruction
    pub syscall_inst_size: usize,
    /// Required instruction alignment
    pub instruction_alignment: usize,
    /// Fixed injection address, widened to 64 bits
    pub injection_address: u64,
}

impl Layout
{
    /// Layout of profile `A`.
    #[must_use]
    pub fn of<A: ArchProfile>() -> Self
    {
        Self {
            arch: A::NAME,
            word_size: A::WORD_SIZE,
            register_count: A::REGISTER_COUNT,
            register_bytes: A::REGISTER_BYTES,
            pc_index: A::PC_INDEX,
            sysreg_count: A::SYSREG_COUNT,
            sysreg_bytes: A::SYSREG_BYTES,
            syscall_inst_size: A::SYSCALL_INST_SIZE,
            instruction_alignment: A::INSTRUCTION_ALIGNMENT,
            injection_address: A::INJECTION_ADDRESS.to_u64(),
        }
    }

    /// Layout of the native architecture.
    #[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
    #[must_use]
    pub fn native() -> Self
    {
        Self::of::<crate::arch::Native>()
    }
}

impl fmt::Display for Layout
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        writeln!(f, "arch:              {}", self.arch)?;
        writeln!(f, "word size:         {}", self.word_size)?;
        writeln!(f, "register file:     {} words, {} bytes", self.register_count, self.register_bytes)?;
        writeln!(f, "pc index:          {}", self.pc_index)?;
        writeln!(f, "syscall registers: {} words, {} bytes", self.sysreg_count, self.sysreg_bytes)?;
        writeln!(f, "syscall insn size: {}", self.syscall_inst_size)?;
        writeln!(f, "insn alignment:    {}", self.instruction_alignment)?;
        write!(f, "injection address: {:x}", self.injection_address)
    }
}
