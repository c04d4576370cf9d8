//! Tests for code hatching

use hatchery_core::arch::{ArchProfile, Arm, ArmRegister, X86_64Register, X86_64};
use hatchery_core::hatch::{hatch_code_for, Hatcher};
use hatchery_core::{HatcheryError, RegisterFile, SyscallRegisters};

const SYSCALL: [u8; 2] = [0x0f, 0x05];

fn seed64(value: u64) -> [u8; 8]
{
    value.to_ne_bytes()
}

#[test]
fn test_hatch_syscall_vector_baseline()
{
    // 7 registers x 8 bytes of zeroes, a 16 byte region, one syscall
    let reg = [0u8; 56];
    let regs = hatch_code_for::<X86_64>(&SYSCALL, &seed64(0x10), &reg).unwrap();

    assert_eq!(regs.pc(), 0x7000_0000_0000);
    for (index, word) in regs.words().enumerate() {
        if index != X86_64::PC_INDEX {
            assert_eq!(word, 0, "register {index} changed");
        }
    }
}

#[test]
fn test_hatch_keeps_baseline_registers()
{
    let mut baseline = RegisterFile::<X86_64>::zeroed();
    baseline.set(X86_64Register::Rsp, 0x7ffd_0000_1000);
    baseline.set(X86_64Register::Rax, 39);
    baseline.set(X86_64Register::Rip, 0x40_1234);
    let reg = baseline.as_bytes().to_vec();

    let regs = hatch_code_for::<X86_64>(&SYSCALL, &seed64(0x1000), &reg).unwrap();

    assert_eq!(regs.pc(), X86_64::INJECTION_ADDRESS);
    assert_eq!(regs.get(X86_64Register::Rsp), Some(0x7ffd_0000_1000));
    assert_eq!(regs.get(X86_64Register::Rax), Some(39));
    for register in X86_64Register::ALL {
        if register != X86_64Register::Rip {
            assert_eq!(regs.get(register), baseline.get(register), "{register} changed");
        }
    }
}

#[test]
fn test_hatch_installs_syscall_vector()
{
    let sysregs = SyscallRegisters::<X86_64>::from_words(&[60, 7, 0, 0, 0, 0, 0]).unwrap();
    let regs = hatch_code_for::<X86_64>(&SYSCALL, &seed64(0x10), sysregs.as_bytes()).unwrap();

    assert_eq!(regs.get(X86_64Register::Rax), Some(60));
    assert_eq!(regs.get(X86_64Register::Rdi), Some(7));
    assert_eq!(regs.syscall_registers(), sysregs);
}

#[test]
fn test_hatch_does_not_touch_inputs()
{
    let code = SYSCALL;
    let seed = seed64(0x10);
    let reg = vec![0x11u8; X86_64::REGISTER_BYTES];

    let _ = hatch_code_for::<X86_64>(&code, &seed, &reg).unwrap();

    assert_eq!(code, SYSCALL);
    assert_eq!(seed, seed64(0x10));
    assert!(reg.iter().all(|b| *b == 0x11));
}

#[test]
fn test_hatch_rejects_register_block_one_short()
{
    let reg = vec![0u8; X86_64::REGISTER_BYTES - 1];
    for code in [&SYSCALL[..], &[][..], &[0x90; 64][..]] {
        for seed in [&seed64(0x10)[..], &[][..]] {
            let err = hatch_code_for::<X86_64>(code, seed, &reg).unwrap_err();
            assert!(matches!(err, HatcheryError::SizeMismatch { .. }), "{err}");
        }
    }

    let arm_reg = vec![0u8; Arm::REGISTER_BYTES - 1];
    let err = hatch_code_for::<Arm>(&[0; 4], &0x10u32.to_ne_bytes(), &arm_reg).unwrap_err();
    assert_eq!(err, HatcheryError::SizeMismatch { expected: 72, actual: 71 });
}

#[test]
fn test_hatch_rejects_empty_code()
{
    for reg in [vec![0u8; X86_64::REGISTER_BYTES], vec![0u8; X86_64::SYSREG_BYTES]] {
        let err = hatch_code_for::<X86_64>(&[], &seed64(0x10), &reg).unwrap_err();
        assert_eq!(err, HatcheryError::EmptyCode);
    }
}

#[test]
fn test_hatch_rejects_missing_seed()
{
    let reg = [0u8; 56];
    let err = hatch_code_for::<X86_64>(&SYSCALL, &[], &reg).unwrap_err();
    assert_eq!(err, HatcheryError::InvalidSeed { expected: 8, actual: 0 });

    let err = hatch_code_for::<X86_64>(&SYSCALL, &[0x10, 0, 0, 0], &reg).unwrap_err();
    assert_eq!(err, HatcheryError::InvalidSeed { expected: 8, actual: 4 });
}

#[test]
fn test_hatch_rejects_code_larger_than_region()
{
    let reg = [0u8; 56];
    let code = [0x90u8; 17];
    let err = hatch_code_for::<X86_64>(&code, &seed64(0x10), &reg).unwrap_err();
    assert_eq!(err, HatcheryError::CodeTooLarge { code: 17, region: 16 });

    // exactly filling the region is fine
    assert!(hatch_code_for::<X86_64>(&code[..16], &seed64(0x10), &reg).is_ok());
}

#[test]
fn test_hatch_arm()
{
    let mut baseline = RegisterFile::<Arm>::zeroed();
    baseline.set(ArmRegister::SP, 0xbeff_f000);
    baseline.set(ArmRegister::Cpsr, 0x10);

    let regs = hatch_code_for::<Arm>(Arm::SYSCALL_INSTRUCTION, &0x1000u32.to_ne_bytes(), baseline.as_bytes()).unwrap();

    assert_eq!(regs.pc(), 0x7000_0000);
    assert_eq!(regs.get(ArmRegister::PC), Some(0x7000_0000));
    assert_eq!(regs.get(ArmRegister::SP), Some(0xbeff_f000));
    assert_eq!(regs.get(ArmRegister::Cpsr), Some(0x10));
}

#[test]
fn test_hatchling_reports_placement()
{
    let code = [0x90, 0x90, 0x0f, 0x05];
    let reg = [0u8; 56];
    let hatchling = Hatcher::<X86_64>::new()
        .with_entry_offset(2)
        .hatch(&code, &seed64(0x100), &reg)
        .unwrap();

    assert_eq!(hatchling.code(), &code);
    assert_eq!(hatchling.injection_address(), 0x7000_0000_0000);
    assert_eq!(hatchling.entry_point(), 0x7000_0000_0002);
    assert_eq!(hatchling.region_length(), Some(0x100));
    assert_eq!(hatchling.registers().pc(), hatchling.entry_point());
}

#[cfg(target_arch = "x86_64")]
#[test]
fn test_native_hatch_code()
{
    let regs = hatchery_core::hatch_code(&SYSCALL, &seed64(0x10), &[0u8; 56]).unwrap();
    assert_eq!(regs.pc(), 0x7000_0000_0000);
    assert_eq!(regs.as_bytes().len(), hatchery_core::size_of_registers());
}
