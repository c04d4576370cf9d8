//! Common module for library exports

pub use crate::arch::{Arm, ArmRegister, ArchProfile, Word, X86_64Register, X86_64};
pub use crate::convert::{word_from_bytes, word_to_bytes};
pub use crate::error::{HatcheryError, Result};
pub use crate::hatch::{hatch_code_for, Hatcher, Hatchling};
pub use crate::layout::Layout;
pub use crate::types::{RegisterFile, SyscallRegisters};
