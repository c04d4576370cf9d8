//! # x86-64 Profile
//!
//! Register layout and calling convention for 64-bit x86 Linux.
//!
//! ## Register File Layout
//!
//! The register file mirrors the kernel's `user_regs_struct`, which is what
//! `PTRACE_GETREGS` / `PTRACE_SETREGS` transfer. It is 27 consecutive 64-bit
//! words:
//!
//! ```text
//! Index 0-3:    r15 r14 r13 r12
//! Index 4-9:    rbp rbx r11 r10 r9 r8
//! Index 10-15:  rax rcx rdx rsi rdi orig_rax
//! Index 16:     rip  (program counter)
//! Index 17-20:  cs eflags rsp ss
//! Index 21-26:  fs_base gs_base ds es fs gs
//! Total: 27 words = 216 bytes
//! ```
//!
//! ## System Calls
//!
//! The call number goes in `rax`, arguments in `rdi`, `rsi`, `rdx`, `r10`,
//! `r8`, `r9`, and the call is made with `syscall` (`0f 05`).
//!
//! ## References
//!
//! - [syscall(2)](https://man7.org/linux/man-pages/man2/syscall.2.html)
//! - [`user_regs_struct`](https://elixir.bootlin.com/linux/latest/source/arch/x86/include/asm/user_64.h)

use std::fmt;

use super::ArchProfile;

/// x86-64 architecture profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct X86_64;

/// A register of the x86-64 `user_regs_struct`, declared in layout order.
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::{ArchProfile, X86_64, X86_64Register};
///
/// assert_eq!(X86_64::register_index(X86_64Register::Rip), Some(16));
/// assert_eq!(X86_64Register::Rax.to_string(), "rax");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum X86_64Register
{
    /// R15
    R15,
    /// R14
    R14,
    /// R13
    R13,
    /// R12
    R12,
    /// RBP - base (frame) pointer
    Rbp,
    /// RBX
    Rbx,
    /// R11 - clobbered by `syscall` (holds saved RFLAGS)
    R11,
    /// R10 - fourth system-call argument
    R10,
    /// R9 - sixth system-call argument
    R9,
    /// R8 - fifth system-call argument
    R8,
    /// RAX - system-call number on entry, return value on exit
    Rax,
    /// RCX - clobbered by `syscall` (holds the return address)
    Rcx,
    /// RDX - third system-call argument
    Rdx,
    /// RSI - second system-call argument
    Rsi,
    /// RDI - first system-call argument
    Rdi,
    /// Original RAX as seen by the kernel on system-call entry
    OrigRax,
    /// RIP - instruction pointer
    Rip,
    /// CS segment selector
    Cs,
    /// RFLAGS
    Eflags,
    /// RSP - stack pointer
    Rsp,
    /// SS segment selector
    Ss,
    /// FS base address
    FsBase,
    /// GS base address
    GsBase,
    /// DS segment selector
    Ds,
    /// ES segment selector
    Es,
    /// FS segment selector
    Fs,
    /// GS segment selector
    Gs,
}

impl X86_64Register
{
    /// Every register, in `user_regs_struct` order.
    pub const ALL: [X86_64Register; 27] = [
        X86_64Register::R15,
        X86_64Register::R14,
        X86_64Register::R13,
        X86_64Register::R12,
        X86_64Register::Rbp,
        X86_64Register::Rbx,
        X86_64Register::R11,
        X86_64Register::R10,
        X86_64Register::R9,
        X86_64Register::R8,
        X86_64Register::Rax,
        X86_64Register::Rcx,
        X86_64Register::Rdx,
        X86_64Register::Rsi,
        X86_64Register::Rdi,
        X86_64Register::OrigRax,
        X86_64Register::Rip,
        X86_64Register::Cs,
        X86_64Register::Eflags,
        X86_64Register::Rsp,
        X86_64Register::Ss,
        X86_64Register::FsBase,
        X86_64Register::GsBase,
        X86_64Register::Ds,
        X86_64Register::Es,
        X86_64Register::Fs,
        X86_64Register::Gs,
    ];

    /// Position of this register in the flat word view.
    #[must_use]
    pub const fn index(self) -> usize
    {
        self as usize
    }

    /// Lowercase register name as used by assemblers and `ptrace` headers.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            X86_64Register::R15 => "r15",
            X86_64Register::R14 => "r14",
            X86_64Register::R13 => "r13",
            X86_64Register::R12 => "r12",
            X86_64Register::Rbp => "rbp",
            X86_64Register::Rbx => "rbx",
            X86_64Register::R11 => "r11",
            X86_64Register::R10 => "r10",
            X86_64Register::R9 => "r9",
            X86_64Register::R8 => "r8",
            X86_64Register::Rax => "rax",
            X86_64Register::Rcx => "rcx",
            X86_64Register::Rdx => "rdx",
            X86_64Register::Rsi => "rsi",
            X86_64Register::Rdi => "rdi",
            X86_64Register::OrigRax => "orig_rax",
            X86_64Register::Rip => "rip",
            X86_64Register::Cs => "cs",
            X86_64Register::Eflags => "eflags",
            X86_64Register::Rsp => "rsp",
            X86_64Register::Ss => "ss",
            X86_64Register::FsBase => "fs_base",
            X86_64Register::GsBase => "gs_base",
            X86_64Register::Ds => "ds",
            X86_64Register::Es => "es",
            X86_64Register::Fs => "fs",
            X86_64Register::Gs => "gs",
        }
    }
}

impl fmt::Display for X86_64Register
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

// syscall
const SYSCALL: [u8; 2] = [0x0f, 0x05];

impl ArchProfile for X86_64
{
    type Register = X86_64Register;
    type Word = u64;

    const INJECTION_ADDRESS: u64 = 0x7000_0000_0000;
    const INSTRUCTION_ALIGNMENT: usize = 1;
    const NAME: &'static str = "x86_64";
    const PC_INDEX: usize = X86_64Register::Rip.index();
    const REGISTER_COUNT: usize = X86_64Register::ALL.len();
    const SEED_REQUIRED: bool = true;
    const SYSCALL_INSTRUCTION: &'static [u8] = &SYSCALL;
    const SYSCALL_REGISTERS: &'static [X86_64Register] = &[
        X86_64Register::Rax,
        X86_64Register::Rdi,
        X86_64Register::Rsi,
        X86_64Register::Rdx,
        X86_64Register::R10,
        X86_64Register::R8,
        X86_64Register::R9,
    ];

    fn register_index(register: X86_64Register) -> Option<usize>
    {
        Some(register.index())
    }
}
