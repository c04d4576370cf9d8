//! Compose the register state for an injected `exit(42)` on x86-64.
//!
//! Run with:
//!
//! ```text
//! RUST_LOG=hatchery_core=debug cargo run -p hatchery-core --example hatch_syscall
//! ```
//!
//! A real process-control layer would capture the baseline with
//! `PTRACE_GETREGS`, map a region at the injection address, write
//! `hatchling.code()` there and install the registers with `PTRACE_SETREGS`.

use std::process;

use hatchery_core::arch::{ArchProfile, X86_64};
use hatchery_core::hatch::Hatcher;
use hatchery_core::layout::Layout;
use hatchery_core::SyscallRegisters;
use hatchery_utils::{info, init_logging};

fn main()
{
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    println!("{}", Layout::of::<X86_64>());

    let mut sysregs = SyscallRegisters::<X86_64>::zeroed();
    sysregs.set_number(60); // exit
    sysregs.set_arg(0, 42);

    let region = 0x1000u64.to_ne_bytes();
    match Hatcher::<X86_64>::new().hatch(X86_64::SYSCALL_INSTRUCTION, &region, sysregs.as_bytes()) {
        Ok(hatchling) => {
            info!(entry = %X86_64::format_word(hatchling.entry_point()), "payload ready");
            println!("write {:02x?} at {:#x}", hatchling.code(), hatchling.injection_address());
            println!("{:#?}", hatchling.registers());
            println!("{:?}", hatchling.registers().syscall_registers());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
