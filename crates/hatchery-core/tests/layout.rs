//! Tests for layout introspection and byte-to-word conversion

use hatchery_core::arch::{ArchProfile, Arm, X86_64};
use hatchery_core::convert::{word_from_bytes, word_to_bytes};
use hatchery_core::layout::{register_bytes, sysreg_bytes, Layout};
use hatchery_core::{HatcheryError, RegisterFile};

#[test]
fn test_profile_sizes()
{
    assert_eq!(register_bytes::<X86_64>(), 216);
    assert_eq!(sysreg_bytes::<X86_64>(), 56);
    assert_eq!(register_bytes::<Arm>(), 72);
    assert_eq!(sysreg_bytes::<Arm>(), 28);
}

#[test]
fn test_sysreg_size_is_count_times_word()
{
    assert_eq!(sysreg_bytes::<X86_64>(), X86_64::SYSREG_COUNT * X86_64::WORD_SIZE);
    assert_eq!(sysreg_bytes::<Arm>(), Arm::SYSREG_COUNT * Arm::WORD_SIZE);
}

#[test]
fn test_layout_of_x86_64()
{
    let layout = Layout::of::<X86_64>();
    assert_eq!(layout.arch, "x86_64");
    assert_eq!(layout.word_size, 8);
    assert_eq!(layout.pc_index, 16);
    assert_eq!(layout.syscall_inst_size, 2);
    assert_eq!(layout.instruction_alignment, 1);
    assert_eq!(layout.injection_address, 0x7000_0000_0000);
}

#[test]
fn test_layout_of_arm()
{
    let layout = Layout::of::<Arm>();
    assert_eq!(layout.word_size, 4);
    assert_eq!(layout.register_count, 18);
    assert_eq!(layout.pc_index, 15);
    assert_eq!(layout.syscall_inst_size, 4);
    assert_eq!(layout.injection_address, 0x7000_0000);
}

#[test]
fn test_word_from_bytes_is_deterministic()
{
    let bytes = [0x10, 0x32, 0x54, 0x76, 0x98, 0xba, 0xdc, 0xfe];
    let first = word_from_bytes::<X86_64>(&bytes).unwrap();
    for _ in 0..8 {
        assert_eq!(word_from_bytes::<X86_64>(&bytes).unwrap(), first);
    }
}

#[test]
fn test_word_from_bytes_ignores_extra_bytes()
{
    let mut bytes = word_to_bytes::<X86_64>(0x10);
    bytes.extend_from_slice(&[0xff; 8]);
    assert_eq!(word_from_bytes::<X86_64>(&bytes), Ok(0x10));
}

#[test]
fn test_word_from_bytes_never_pads()
{
    for len in 0..8 {
        let err = word_from_bytes::<X86_64>(&vec![0xaa; len]).unwrap_err();
        assert_eq!(err, HatcheryError::InvalidInput { expected: 8, actual: len });
    }
    for len in 0..4 {
        assert!(word_from_bytes::<Arm>(&vec![0xaa; len]).is_err());
    }
}

#[test]
fn test_word_from_bytes_agrees_with_register_view()
{
    let mut regs = RegisterFile::<X86_64>::zeroed();
    regs.set_word(3, 0x0123_4567_89ab_cdef);
    let bytes = &regs.as_bytes()[3 * 8..];
    assert_eq!(word_from_bytes::<X86_64>(bytes), Ok(0x0123_4567_89ab_cdef));
}

#[cfg(any(target_arch = "x86_64", target_arch = "arm"))]
mod native
{
    use hatchery_core::arch::{ArchProfile, Native};
    use hatchery_core::layout::Layout;
    use hatchery_core::{bytes_to_integer, size_of_registers, size_of_sysreg_union, HatcheryError};

    #[test]
    fn test_sizes_are_constant()
    {
        let regs = size_of_registers();
        let sysregs = size_of_sysreg_union();
        for _ in 0..4 {
            assert_eq!(size_of_registers(), regs);
            assert_eq!(size_of_sysreg_union(), sysregs);
        }
        assert_eq!(sysregs, Native::SYSREG_COUNT * Native::WORD_SIZE);
        assert_eq!(Layout::native().register_bytes, regs);
    }

    #[test]
    fn test_bytes_to_integer_short_input()
    {
        let err = bytes_to_integer(&[1]).unwrap_err();
        assert!(matches!(err, HatcheryError::InvalidInput { actual: 1, .. }));
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn test_register_size_matches_libc()
    {
        assert_eq!(size_of_registers(), std::mem::size_of::<libc::user_regs_struct>());
    }
}
