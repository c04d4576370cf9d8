//! # Error Types
//!
//! Errors returned by the register model and the code hatcher.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

/// Result type for hatchery operations
pub type Result<T> = std::result::Result<T, HatcheryError>;

/// Main error type for hatchery operations
///
/// Every variant is a contract violation by the caller: a buffer of the wrong
/// size, or a payload that cannot be placed where it has to go. None of them
/// is transient, so nothing in this crate retries. The process-control layer
/// should abort the current injection attempt on any of them rather than pad
/// or truncate buffers and try again.
///
/// ## Error Categories
///
/// 1. **Sizing errors**: InvalidInput, SizeMismatch, InvalidSeed
/// 2. **Payload errors**: EmptyCode, CodeTooLarge
/// 3. **Entry point errors**: EntryOutOfRange, MisalignedEntry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HatcheryError
{
    /// A buffer was too short to be read as a native word
    ///
    /// Returned by `bytes_to_integer`. The input is never zero-padded.
    #[error("Invalid input: need at least {expected} bytes for a word, got {actual}")]
    InvalidInput
    {
        /// Native word size in bytes
        expected: usize,
        /// Length of the buffer supplied
        actual: usize,
    },

    /// A register buffer did not have the architecture's exact size
    ///
    /// Register files and syscall register vectors are fixed-size; use the
    /// layout queries (`size_of_registers`, `size_of_sysreg_union`) to size
    /// buffers before reading from or writing to a traced process.
    #[error("Size mismatch: expected {expected} bytes of register state, got {actual}")]
    SizeMismatch
    {
        /// Size the architecture requires
        expected: usize,
        /// Length of the buffer supplied
        actual: usize,
    },

    /// The code payload was empty
    #[error("No code to hatch: code payload is empty")]
    EmptyCode,

    /// The seed was too short to derive the value the injection scheme needs
    #[error("Invalid seed: need at least {expected} bytes, got {actual}")]
    InvalidSeed
    {
        /// Native word size in bytes
        expected: usize,
        /// Length of the seed supplied
        actual: usize,
    },

    /// The code does not fit in the writable region at the injection address
    #[error("Code too large: {code} bytes do not fit in a {region} byte region")]
    CodeTooLarge
    {
        /// Length of the code payload
        code: usize,
        /// Length of the writable region derived from the seed
        region: u64,
    },

    /// The requested entry point lies outside the code payload
    #[error("Entry offset {offset} is outside the {code} byte code payload")]
    EntryOutOfRange
    {
        /// Requested entry offset
        offset: usize,
        /// Length of the code payload
        code: usize,
    },

    /// The requested entry point is not a valid instruction address
    #[error("Entry offset {offset} is not aligned to {alignment} bytes")]
    MisalignedEntry
    {
        /// Requested entry offset
        offset: usize,
        /// Instruction alignment of the architecture
        alignment: usize,
    },
}
