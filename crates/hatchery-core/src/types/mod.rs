//! # Types
//!
//! Register storage shared by the hatcher and the process-control layer.
//!
//! Both types own a single inline buffer and expose structured and flat views
//! over it; neither ever copies the storage between views.

pub mod registers;
pub mod syscall;

// Re-export all public types
pub use registers::RegisterFile;
pub use syscall::SyscallRegisters;
