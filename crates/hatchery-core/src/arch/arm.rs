//! # ARM Profile
//!
//! Register layout and calling convention for 32-bit ARM Linux (EABI).
//!
//! ## Register File Layout
//!
//! The register file mirrors the kernel's `struct user_regs` (`uregs[18]`):
//!
//! ```text
//! Index 0-12:   r0-r12
//! Index 13:     sp (r13)
//! Index 14:     lr (r14)
//! Index 15:     pc (r15)
//! Index 16:     cpsr
//! Index 17:     orig_r0
//! Total: 18 words = 72 bytes
//! ```
//!
//! ## System Calls
//!
//! Under EABI the call number goes in `r7`, arguments in `r0`-`r5`, and the
//! call is made with `svc #0` (`0xef000000`).
//!
//! ## References
//!
//! - [syscall(2)](https://man7.org/linux/man-pages/man2/syscall.2.html)
//! - [ARM `user_regs`](https://elixir.bootlin.com/linux/latest/source/arch/arm/include/asm/user.h)

use std::fmt;

use super::ArchProfile;

/// 32-bit ARM architecture profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Arm;

/// A register of the ARM `user_regs` block.
///
/// Core registers are addressed by number through `R(n)` (`0..=15`); the
/// well-known aliases are available as associated constants.
///
/// ## Example
///
/// ```rust
/// use hatchery_core::arch::{Arm, ArmRegister, ArchProfile};
///
/// assert_eq!(Arm::register_index(ArmRegister::PC), Some(15));
/// assert_eq!(Arm::register_index(ArmRegister::R(16)), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmRegister
{
    /// Core register r0-r15
    R(u8),
    /// Current Program Status Register
    Cpsr,
    /// r0 as seen by the kernel on system-call entry
    OrigR0,
}

impl ArmRegister
{
    /// Frame pointer (r11)
    pub const FP: ArmRegister = ArmRegister::R(11);
    /// Intra-procedure scratch register (r12)
    pub const IP: ArmRegister = ArmRegister::R(12);
    /// Link register (r14)
    pub const LR: ArmRegister = ArmRegister::R(14);
    /// Program counter (r15)
    pub const PC: ArmRegister = ArmRegister::R(15);
    /// Stack pointer (r13)
    pub const SP: ArmRegister = ArmRegister::R(13);

    /// Position of this register in the flat word view.
    #[must_use]
    pub const fn index(self) -> Option<usize>
    {
        match self {
            ArmRegister::R(n) if n <= 15 => Some(n as usize),
            ArmRegister::R(_) => None,
            ArmRegister::Cpsr => Some(16),
            ArmRegister::OrigR0 => Some(17),
        }
    }
}

impl fmt::Display for ArmRegister
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match *self {
            ArmRegister::R(13) => f.write_str("sp"),
            ArmRegister::R(14) => f.write_str("lr"),
            ArmRegister::R(15) => f.write_str("pc"),
            ArmRegister::R(n) => write!(f, "r{n}"),
            ArmRegister::Cpsr => f.write_str("cpsr"),
            ArmRegister::OrigR0 => f.write_str("orig_r0"),
        }
    }
}

// svc #0
const SVC_0: [u8; 4] = 0xef00_0000u32.to_le_bytes();

impl ArchProfile for Arm
{
    type Register = ArmRegister;
    type Word = u32;

    const INJECTION_ADDRESS: u32 = 0x7000_0000;
    const INSTRUCTION_ALIGNMENT: usize = 4;
    const NAME: &'static str = "arm";
    const PC_INDEX: usize = 15;
    const REGISTER_COUNT: usize = 18;
    const SEED_REQUIRED: bool = true;
    const SYSCALL_INSTRUCTION: &'static [u8] = &SVC_0;
    const SYSCALL_REGISTERS: &'static [ArmRegister] = &[
        ArmRegister::R(7),
        ArmRegister::R(0),
        ArmRegister::R(1),
        ArmRegister::R(2),
        ArmRegister::R(3),
        ArmRegister::R(4),
        ArmRegister::R(5),
    ];

    fn register_index(register: ArmRegister) -> Option<usize>
    {
        register.index()
    }
}
