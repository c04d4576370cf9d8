//! CPU register file types and access.

use std::fmt;
use std::marker::PhantomData;

use smallvec::SmallVec;
use tracing::debug;

use super::syscall::{word_span, SyscallRegisters};
use crate::arch::{ArchProfile, Word};
use crate::error::{HatcheryError, Result};

/// Inline capacity for a register file (27 × 8 = 216 bytes on x86-64).
const INLINE_REGISTER_BYTES: usize = 256;

/// A captured register file for one thread of a traced process
///
/// This struct holds exactly [`ArchProfile::REGISTER_BYTES`] bytes laid out the
/// way the kernel hands them to `ptrace`. It offers three views of that single
/// buffer:
///
/// - **Named**: [`get`](Self::get) / [`set`](Self::set) by register identifier,
///   plus [`pc`](Self::pc) / [`set_pc`](Self::set_pc)
/// - **Flat words**: [`word`](Self::word) / [`set_word`](Self::set_word) /
///   [`words`](Self::words) in layout order
/// - **Flat bytes**: [`as_bytes`](Self::as_bytes) /
///   [`as_bytes_mut`](Self::as_bytes_mut)
///
/// The views compute offsets into the same storage, so a write through any
/// one of them is visible through the others. Words are stored in native
/// byte order.
///
/// ## Lifecycle
///
/// 1. The process-control layer captures the target's registers and builds a
///    `RegisterFile` from the raw bytes
/// 2. The code hatcher redirects the program counter to the injected code
/// 3. The process-control layer writes the bytes back to the target
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::{X86_64, X86_64Register};
/// use hatchery_core::types::RegisterFile;
///
/// let mut regs = RegisterFile::<X86_64>::zeroed();
/// regs.set(X86_64Register::Rax, 0x3c);
///
/// // The named write is visible through the flat word view
/// assert_eq!(regs.word(X86_64Register::Rax.index()), Some(0x3c));
/// ```
///
/// ## Thread Safety
///
/// The register file is a plain owned value with no interior mutability. If
/// several threads need it, the one currently controlling the traced process
/// should own it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RegisterFile<A: ArchProfile>
{
    bytes: SmallVec<[u8; INLINE_REGISTER_BYTES]>,
    _arch: PhantomData<A>,
}

impl<A: ArchProfile> RegisterFile<A>
{
    /// Create a register file with every register set to zero.
    #[must_use]
    pub fn zeroed() -> Self
    {
        Self {
            bytes: SmallVec::from_elem(0, A::REGISTER_BYTES),
            _arch: PhantomData,
        }
    }

    /// Interpret a raw register block as a register file.
    ///
    /// The bytes are copied; the caller's buffer is not touched.
    ///
    /// ## Errors
    ///
    /// `HatcheryError::SizeMismatch` unless `bytes` is exactly
    /// [`ArchProfile::REGISTER_BYTES`] long. Short buffers are never padded
    /// and long ones are never truncated.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self>
    {
        if bytes.len() != A::REGISTER_BYTES {
            debug!(
                arch = A::NAME,
                expected = A::REGISTER_BYTES,
                actual = bytes.len(),
                "rejected register image"
            );
            return Err(HatcheryError::SizeMismatch {
                expected: A::REGISTER_BYTES,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            bytes: SmallVec::from_slice(bytes),
            _arch: PhantomData,
        })
    }

    /// Build a register file from words in layout order.
    ///
    /// ## Errors
    ///
    /// `HatcheryError::SizeMismatch` unless exactly
    /// [`ArchProfile::REGISTER_COUNT`] words are supplied.
    pub fn from_words(words: &[A::Word]) -> Result<Self>
    {
        if words.len() != A::REGISTER_COUNT {
            return Err(HatcheryError::SizeMismatch {
                expected: A::REGISTER_BYTES,
                actual: words.len() * A::WORD_SIZE,
            });
        }
        let mut regs = Self::zeroed();
        for (index, word) in words.iter().enumerate() {
            regs.set_word(index, *word);
        }
        Ok(regs)
    }

    /// Get the value of a register by its identifier
    ///
    /// Returns `None` if the identifier does not name a register of this
    /// architecture (for example `ArmRegister::R(16)`).
    #[must_use]
    pub fn get(&self, register: A::Register) -> Option<A::Word>
    {
        self.word(A::register_index(register)?)
    }

    /// Set the value of a register by its identifier
    ///
    /// Returns `None` if the identifier does not name a register of this
    /// architecture; nothing is written in that case.
    pub fn set(&mut self, register: A::Register, value: A::Word) -> Option<()>
    {
        self.set_word(A::register_index(register)?, value)
    }

    /// Program counter.
    #[must_use]
    pub fn pc(&self) -> A::Word
    {
        self.word(A::PC_INDEX).unwrap_or(A::Word::ZERO)
    }

    /// Redirect the program counter.
    pub fn set_pc(&mut self, value: A::Word)
    {
        self.set_word(A::PC_INDEX, value);
    }

    /// The word at `index` in layout order, or `None` past the end.
    #[must_use]
    pub fn word(&self, index: usize) -> Option<A::Word>
    {
        A::Word::from_ne_slice(self.bytes.get(word_span::<A>(index)?)?)
    }

    /// Overwrite the word at `index`. Returns `None` past the end.
    pub fn set_word(&mut self, index: usize, value: A::Word) -> Option<()>
    {
        let dest = self.bytes.get_mut(word_span::<A>(index)?)?;
        value.write_ne(dest);
        Some(())
    }

    /// Number of words in the register file.
    #[must_use]
    pub fn word_count(&self) -> usize
    {
        A::REGISTER_COUNT
    }

    /// All words in layout order.
    pub fn words(&self) -> impl Iterator<Item = A::Word> + '_
    {
        self.bytes.chunks_exact(A::WORD_SIZE).filter_map(A::Word::from_ne_slice)
    }

    /// Flat byte view, ready to hand to `PTRACE_SETREGS`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8]
    {
        &self.bytes
    }

    /// Mutable flat byte view. Writes are visible through the named and word
    /// views.
    #[must_use]
    pub fn as_bytes_mut(&mut self) -> &mut [u8]
    {
        &mut self.bytes
    }

    /// Consume the register file and return its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8>
    {
        self.bytes.into_vec()
    }

    /// Gather the system-call registers into a vector in calling-convention
    /// order.
    #[must_use]
    pub fn syscall_registers(&self) -> SyscallRegisters<A>
    {
        let mut sysregs = SyscallRegisters::zeroed();
        for (slot, register) in A::SYSCALL_REGISTERS.iter().enumerate() {
            if let Some(value) = self.get(*register) {
                sysregs.set_word(slot, value);
            }
        }
        sysregs
    }

    /// Scatter a syscall register vector into the corresponding registers.
    ///
    /// Registers outside the calling convention are left untouched.
    pub fn install_syscall_registers(&mut self, sysregs: &SyscallRegisters<A>)
    {
        for (register, value) in A::SYSCALL_REGISTERS.iter().zip(sysregs.words()) {
            self.set(*register, value);
        }
    }
}

impl<A: ArchProfile> Default for RegisterFile<A>
{
    fn default() -> Self
    {
        Self::zeroed()
    }
}

impl<A: ArchProfile> fmt::Debug for RegisterFile<A>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let mut s = f.debug_struct("RegisterFile");
        s.field("arch", &A::NAME);
        s.field("pc", &format_args!("{}", A::format_word(self.pc())));
        s.field(
            "words",
            &format_args!(
                "[{}]",
                self.words().map(A::format_word).collect::<Vec<_>>().join(", ")
            ),
        );
        s.finish()
    }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
mod linux_x86_64
{
    use super::RegisterFile;
    use crate::arch::{X86_64Register as R, X86_64};

    impl RegisterFile<X86_64>
    {
        /// Build a register file from the `libc` structure filled in by
        /// `PTRACE_GETREGS`.
        #[must_use]
        pub fn from_user_regs(regs: &libc::user_regs_struct) -> Self
        {
            let words = [
                regs.r15,
                regs.r14,
                regs.r13,
                regs.r12,
                regs.rbp,
                regs.rbx,
                regs.r11,
                regs.r10,
                regs.r9,
                regs.r8,
                regs.rax,
                regs.rcx,
                regs.rdx,
                regs.rsi,
                regs.rdi,
                regs.orig_rax,
                regs.rip,
                regs.cs,
                regs.eflags,
                regs.rsp,
                regs.ss,
                regs.fs_base,
                regs.gs_base,
                regs.ds,
                regs.es,
                regs.fs,
                regs.gs,
            ];
            let mut file = Self::zeroed();
            for (index, word) in words.into_iter().enumerate() {
                file.set_word(index, word);
            }
            file
        }

        /// Convert to the `libc` structure expected by `PTRACE_SETREGS`.
        #[must_use]
        pub fn to_user_regs(&self) -> libc::user_regs_struct
        {
            let get = |r: R| self.word(r.index()).unwrap_or(0);
            libc::user_regs_struct {
                r15: get(R::R15),
                r14: get(R::R14),
                r13: get(R::R13),
                r12: get(R::R12),
                rbp: get(R::Rbp),
                rbx: get(R::Rbx),
                r11: get(R::R11),
                r10: get(R::R10),
                r9: get(R::R9),
                r8: get(R::R8),
                rax: get(R::Rax),
                rcx: get(R::Rcx),
                rdx: get(R::Rdx),
                rsi: get(R::Rsi),
                rdi: get(R::Rdi),
                orig_rax: get(R::OrigRax),
                rip: get(R::Rip),
                cs: get(R::Cs),
                eflags: get(R::Eflags),
                rsp: get(R::Rsp),
                ss: get(R::Ss),
                fs_base: get(R::FsBase),
                gs_base: get(R::GsBase),
                ds: get(R::Ds),
                es: get(R::Es),
                fs: get(R::Fs),
                gs: get(R::Gs),
            }
        }
    }

    impl From<libc::user_regs_struct> for RegisterFile<X86_64>
    {
        fn from(regs: libc::user_regs_struct) -> Self
        {
            Self::from_user_regs(&regs)
        }
    }

    impl From<&RegisterFile<X86_64>> for libc::user_regs_struct
    {
        fn from(regs: &RegisterFile<X86_64>) -> Self
        {
            regs.to_user_regs()
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::arch::{Arm, ArmRegister, X86_64};

    #[test]
    fn test_inline_capacity_covers_profiles()
    {
        assert!(X86_64::REGISTER_BYTES <= INLINE_REGISTER_BYTES);
        assert!(Arm::REGISTER_BYTES <= INLINE_REGISTER_BYTES);
        assert!(!RegisterFile::<X86_64>::zeroed().bytes.spilled());
    }

    #[test]
    fn test_unknown_register_is_rejected()
    {
        let mut regs = RegisterFile::<Arm>::zeroed();
        assert_eq!(regs.get(ArmRegister::R(16)), None);
        assert_eq!(regs.set(ArmRegister::R(200), 1), None);
        assert!(regs.words().all(|w| w == 0));
    }

    #[test]
    fn test_debug_shows_pc_in_hex()
    {
        let mut regs = RegisterFile::<Arm>::zeroed();
        regs.set_pc(0x7000_0000);
        let text = format!("{regs:?}");
        assert!(text.contains("arch: \"arm\""), "{text}");
        assert!(text.contains("pc: 70000000"), "{text}");
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn test_user_regs_round_trip()
    {
        let mut file = RegisterFile::<X86_64>::zeroed();
        for (i, _) in crate::arch::X86_64Register::ALL.iter().enumerate() {
            file.set_word(i, 0x100 + i as u64);
        }
        let user = file.to_user_regs();
        assert_eq!(user.r15, 0x100);
        assert_eq!(user.rip, 0x110);
        assert_eq!(user.gs, 0x11a);
        assert_eq!(RegisterFile::from_user_regs(&user), file);
    }
}
