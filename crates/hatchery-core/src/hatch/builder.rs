//! # Hatcher Builder
//!
//! Builder pattern for configuring how injected code is entered.
//!
//! Most callers want [`hatch_code`](crate::hatch::hatch_code), which enters
//! the code at its first byte. The builder exists for payloads whose entry
//! point is further in (a data prologue, a jump table, ...).

use std::marker::PhantomData;

use tracing::debug;

use super::Hatchling;
use crate::arch::{ArchProfile, Word};
use crate::error::{HatcheryError, Result};
use crate::types::{RegisterFile, SyscallRegisters};

/// Builder that composes injectable execution contexts for profile `A`.
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::{ArchProfile, X86_64};
/// use hatchery_core::hatch::Hatcher;
///
/// // jmp +0 ; syscall
/// let code = [0xeb, 0x00, 0x0f, 0x05];
/// let region = 0x1000u64.to_ne_bytes();
/// let regs = vec![0u8; X86_64::REGISTER_BYTES];
///
/// let hatchling = Hatcher::<X86_64>::new()
///     .with_entry_offset(2)
///     .hatch(&code, &region, &regs)?;
/// assert_eq!(hatchling.entry_point(), X86_64::INJECTION_ADDRESS + 2);
/// # Ok::<(), hatchery_core::HatcheryError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hatcher<A: ArchProfile>
{
    entry_offset: usize,
    _arch: PhantomData<A>,
}

impl<A: ArchProfile> Hatcher<A>
{
    /// Create a hatcher that enters the code at its first byte.
    #[must_use]
    pub fn new() -> Self
    {
        Self {
            entry_offset: 0,
            _arch: PhantomData,
        }
    }

    /// Enter the code `offset` bytes past the injection address.
    ///
    /// The offset is checked against the code and the architecture's
    /// instruction alignment when hatching.
    #[must_use]
    pub fn with_entry_offset(mut self, offset: usize) -> Self
    {
        self.entry_offset = offset;
        self
    }

    /// The configured entry offset.
    #[must_use]
    pub fn entry_offset(&self) -> usize
    {
        self.entry_offset
    }

    /// Compose the execution context for `code`.
    ///
    /// ## Parameters
    ///
    /// - `code`: instructions to be written at [`ArchProfile::INJECTION_ADDRESS`]
    /// - `seed`: its first word (native byte order) is the length of the
    ///   writable region the caller has mapped at the injection address
    /// - `reg`: baseline CPU state, either a full register file image
    ///   ([`ArchProfile::REGISTER_BYTES`]) or a syscall register vector image
    ///   ([`ArchProfile::SYSREG_BYTES`]) installed over zeroed registers
    ///
    /// The program counter is set to the entry point; every other register
    /// keeps its baseline value. None of the inputs are modified.
    ///
    /// ## Errors
    ///
    /// Checked in this order:
    ///
    /// - `SizeMismatch`: `reg` is neither of the accepted sizes
    /// - `EmptyCode`: `code` is empty
    /// - `InvalidSeed`: `seed` is shorter than one word and the profile
    ///   requires it
    /// - `CodeTooLarge`: `code` is longer than the region
    /// - `EntryOutOfRange` / `MisalignedEntry`: the entry offset is not a
    ///   valid instruction address inside `code`
    pub fn hatch<'c>(&self, code: &'c [u8], seed: &[u8], reg: &[u8]) -> Result<Hatchling<'c, A>>
    {
        let mut registers = baseline::<A>(reg)?;

        if code.is_empty() {
            debug!(arch = A::NAME, "refusing to hatch empty code");
            return Err(HatcheryError::EmptyCode);
        }

        let region = region_length::<A>(seed)?;
        if let Some(region) = region {
            if code.len() as u64 > region {
                debug!(arch = A::NAME, code_len = code.len(), region, "code does not fit in region");
                return Err(HatcheryError::CodeTooLarge {
                    code: code.len(),
                    region,
                });
            }
        }

        let entry = self.entry_point(code)?;
        registers.set_pc(entry);

        debug!(
            arch = A::NAME,
            pc = %A::format_word(entry),
            code_len = code.len(),
            region = ?region,
            "hatched code"
        );

        Ok(Hatchling {
            registers,
            code,
            entry,
            region,
        })
    }

    fn entry_point(&self, code: &[u8]) -> Result<A::Word>
    {
        let offset = self.entry_offset;
        if offset >= code.len() {
            debug!(arch = A::NAME, offset, code_len = code.len(), "entry offset outside code");
            return Err(HatcheryError::EntryOutOfRange {
                offset,
                code: code.len(),
            });
        }
        if offset % A::INSTRUCTION_ALIGNMENT != 0 {
            debug!(arch = A::NAME, offset, alignment = A::INSTRUCTION_ALIGNMENT, "misaligned entry offset");
            return Err(HatcheryError::MisalignedEntry {
                offset,
                alignment: A::INSTRUCTION_ALIGNMENT,
            });
        }

        u64::try_from(offset)
            .ok()
            .and_then(A::Word::from_u64)
            .and_then(|offset| A::INJECTION_ADDRESS.checked_add(offset))
            .ok_or(HatcheryError::EntryOutOfRange {
                offset,
                code: code.len(),
            })
    }
}

impl<A: ArchProfile> Default for Hatcher<A>
{
    fn default() -> Self
    {
        Self::new()
    }
}

/// Turn the caller's register bytes into the baseline register file.
fn baseline<A: ArchProfile>(reg: &[u8]) -> Result<RegisterFile<A>>
{
    if reg.len() == A::REGISTER_BYTES {
        return RegisterFile::from_bytes(reg);
    }
    if reg.len() == A::SYSREG_BYTES {
        let sysregs = SyscallRegisters::<A>::from_bytes(reg)?;
        let mut registers = RegisterFile::zeroed();
        registers.install_syscall_registers(&sysregs);
        return Ok(registers);
    }

    debug!(
        arch = A::NAME,
        expected = A::REGISTER_BYTES,
        sysreg = A::SYSREG_BYTES,
        actual = reg.len(),
        "register material has no recognised size"
    );
    Err(HatcheryError::SizeMismatch {
        expected: A::REGISTER_BYTES,
        actual: reg.len(),
    })
}

/// Length of the writable region at the injection address, read from the
/// seed. `None` means unbounded, which only happens on profiles that do not
/// require a seed and were not given one.
fn region_length<A: ArchProfile>(seed: &[u8]) -> Result<Option<u64>>
{
    match A::Word::from_ne_slice(seed) {
        Some(word) => Ok(Some(word.to_u64())),
        None if A::SEED_REQUIRED => {
            debug!(arch = A::NAME, expected = A::WORD_SIZE, actual = seed.len(), "seed shorter than a word");
            Err(HatcheryError::InvalidSeed {
                expected: A::WORD_SIZE,
                actual: seed.len(),
            })
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests
{
    use std::fmt;

    use super::*;
    use crate::arch::{Arm, X86_64};

    /// A profile whose injection scheme works without a seed.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    struct Seedless;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct Slot(usize);

    impl fmt::Display for Slot
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            write!(f, "s{}", self.0)
        }
    }

    impl ArchProfile for Seedless
    {
        type Register = Slot;
        type Word = u32;

        const INJECTION_ADDRESS: u32 = 0x1000;
        const INSTRUCTION_ALIGNMENT: usize = 2;
        const NAME: &'static str = "seedless";
        const PC_INDEX: usize = 3;
        const REGISTER_COUNT: usize = 4;
        const SEED_REQUIRED: bool = false;
        const SYSCALL_INSTRUCTION: &'static [u8] = &[0xaa, 0xbb];
        const SYSCALL_REGISTERS: &'static [Slot] = &[Slot(0), Slot(1)];

        fn register_index(register: Slot) -> Option<usize>
        {
            (register.0 < Self::REGISTER_COUNT).then_some(register.0)
        }
    }

    #[test]
    fn test_seedless_profile_accepts_empty_seed()
    {
        let code = [0u8; 64];
        let regs = [0u8; 16];
        let hatchling = Hatcher::<Seedless>::new().hatch(&code, &[], &regs).unwrap();
        assert_eq!(hatchling.region_length(), None);
        assert_eq!(hatchling.registers().pc(), 0x1000);
    }

    #[test]
    fn test_entry_offset_must_be_inside_code()
    {
        let seed = 0x100u64.to_ne_bytes();
        let regs = [0u8; X86_64::REGISTER_BYTES];
        let err = Hatcher::<X86_64>::new()
            .with_entry_offset(2)
            .hatch(&[0x0f, 0x05], &seed, &regs)
            .unwrap_err();
        assert_eq!(err, HatcheryError::EntryOutOfRange { offset: 2, code: 2 });
    }

    #[test]
    fn test_entry_offset_respects_alignment()
    {
        let seed = 0x100u32.to_ne_bytes();
        let regs = [0u8; Arm::REGISTER_BYTES];
        let code = [0u8; 8];
        let err = Hatcher::<Arm>::new().with_entry_offset(2).hatch(&code, &seed, &regs).unwrap_err();
        assert_eq!(err, HatcheryError::MisalignedEntry { offset: 2, alignment: 4 });

        let ok = Hatcher::<Arm>::new().with_entry_offset(4).hatch(&code, &seed, &regs).unwrap();
        assert_eq!(ok.entry_point(), Arm::INJECTION_ADDRESS + 4);
        assert_eq!(ok.registers().pc(), Arm::INJECTION_ADDRESS + 4);
    }

    #[test]
    fn test_size_check_runs_before_code_check()
    {
        let err = Hatcher::<X86_64>::new().hatch(&[], &[], &[0u8; 3]).unwrap_err();
        assert_eq!(err, HatcheryError::SizeMismatch { expected: 216, actual: 3 });
    }
}
