//! # hatchery-core
//!
//! Register abstraction and code-hatching primitives for injecting machine
//! code into a traced process.
//!
//! This crate provides:
//! - Architecture profiles for x86-64 and 32-bit ARM (word width, register
//!   layout, syscall convention, injection address)
//! - A register file with named, flat-word and flat-byte views of one buffer
//! - The syscall register vector in calling-convention order
//! - Byte-to-word conversion in the byte order the register views use
//! - The code hatcher, which redirects a register file to injected code
//! - Static layout queries for sizing buffers
//!
//! ## What this crate does not do
//!
//! Attaching to processes, reading or writing their memory, and driving
//! `ptrace` are the job of the surrounding process-control layer. Everything
//! here is synchronous, allocation-light and free of I/O.
//!
//! ## Quick Start
//!
//! ```rust
//! use hatchery_core::arch::{ArchProfile, X86_64};
//! use hatchery_core::hatch::hatch_code_for;
//! use hatchery_core::layout::register_bytes;
//!
//! let captured = vec![0u8; register_bytes::<X86_64>()];
//! let seed = 0x1000u64.to_ne_bytes();
//! let regs = hatch_code_for::<X86_64>(X86_64::SYSCALL_INSTRUCTION, &seed, &captured)?;
//! assert_eq!(regs.pc(), X86_64::INJECTION_ADDRESS);
//! # Ok::<(), hatchery_core::HatcheryError>(())
//! ```

pub mod arch;
pub mod convert;
pub mod error;
pub mod hatch;
pub mod layout;
pub mod prelude;
pub mod types;

pub use arch::{ArchProfile, Word};
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub use arch::{Native, NativeWord};
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub use convert::bytes_to_integer;
// Re-export commonly used types
pub use error::{HatcheryError, Result};
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub use hatch::hatch_code;
#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
pub use layout::{size_of_registers, size_of_sysreg_union};
pub use types::{RegisterFile, SyscallRegisters};
