//! Test suite for kreg

use std::{cell::Cell, cell::RefCell, ptr::NonNull, vec::Vec};

use kfault::{FaultCode, checks_enabled, set_fault_handler};

use super::*;

thread_local! {
    static RAISED: RefCell<Vec<FaultCode>> = const { RefCell::new(Vec::new()) };
}

fn record(code: FaultCode) {
    RAISED.with(|r| r.borrow_mut().push(code));
}

fn take_raised() -> Vec<FaultCode> {
    RAISED.with(|r| r.borrow_mut().drain(..).collect())
}

fn backed<T: RegisterWidth>(cell: &Cell<T>) -> Register<T> {
    unsafe { Register::new(NonNull::new(cell.as_ptr()).unwrap()) }
}

fn check_bit_masks<T: RegisterWidth + Into<u64>>() {
    for bit in 0..bit_limit::<T>() {
        let mask: u64 = mask_for_bit::<T>(bit).into();
        assert_eq!(mask.count_ones(), 1);
        assert_eq!(mask.trailing_zeros(), bit);
    }
}

fn check_range_masks<T: RegisterWidth + Into<u64>>() {
    for msb in 0..bit_limit::<T>() {
        for lsb in 0..=msb {
            let mask: u64 = mask_for_range::<T>(msb, lsb).into();
            assert_eq!(mask.count_ones(), msb - lsb + 1, "[{msb}:{lsb}]");
            assert_eq!(mask.trailing_zeros(), lsb, "[{msb}:{lsb}]");
            assert_eq!(63 - mask.leading_zeros(), msb, "[{msb}:{lsb}]");
        }
    }
}

#[test]
fn single_bit_masks() {
    check_bit_masks::<u8>();
    check_bit_masks::<u16>();
    check_bit_masks::<u32>();
    check_bit_masks::<u64>();
}

#[test]
fn range_masks_are_contiguous() {
    check_range_masks::<u8>();
    check_range_masks::<u16>();
    check_range_masks::<u32>();
    check_range_masks::<u64>();
}

#[test]
fn known_masks() {
    assert_eq!(mask_for_range::<u32>(3, 0), 0x0000_000F);
    assert_eq!(mask_for_range::<u32>(30, 25), 0x7E00_0000);
    assert_eq!(mask_for_range::<u16>(7, 4), 0x00F0);
    assert_eq!(mask_for_range::<u8>(0, 0), 0x01);
    assert_eq!(mask_for_bit::<u64>(62), 1 << 62);
}

#[test]
fn top_bit_is_out_of_bounds() {
    set_fault_handler(record);
    if !checks_enabled() {
        return;
    }

    assert_eq!(bit_limit::<u32>(), 31);
    assert_eq!(mask_for_bit::<u32>(31), 0);
    assert_eq!(take_raised(), [FaultCode::RegisterBitOutOfBounds]);

    assert_eq!(mask_for_range::<u8>(7, 0), 0);
    assert_eq!(take_raised(), [FaultCode::RegisterBitOutOfBounds]);

    assert_eq!(mask_for_range::<u16>(3, 15), 0);
    assert_eq!(take_raised(), [FaultCode::RegisterBitOutOfBounds]);
}

#[test]
fn reversed_range_faults() {
    set_fault_handler(record);
    if !checks_enabled() {
        return;
    }

    assert_eq!(mask_for_range::<u32>(3, 7), 0);
    assert_eq!(take_raised(), [FaultCode::RegisterBitOutOfBounds]);
}

#[cfg(not(any(debug_assertions, feature = "checked")))]
#[test]
fn unchecked_indices_wrap() {
    set_fault_handler(record);
    assert!(!checks_enabled());

    // The top bit is reachable once the bound is not enforced.
    assert_eq!(mask_for_bit::<u32>(31), 0x8000_0000);
    assert_eq!(mask_for_range::<u8>(7, 0), 0xFF);

    // Indices past the width wrap like the shift amount does.
    assert_eq!(mask_for_bit::<u8>(9), 0x02);
    assert_eq!(mask_for_range::<u16>(17, 16), 0x0003);
    assert!(take_raised().is_empty());
}

#[cfg(not(any(debug_assertions, feature = "checked")))]
#[test]
fn unchecked_reversed_range_yields_msb() {
    set_fault_handler(record);

    assert_eq!(mask_for_range::<u32>(3, 7), 0x0000_0008);
    assert_eq!(mask_for_range::<u64>(0, 40), 0x1);

    // Only bit 4 is touched, and the value shifted by 9 has nothing there.
    let cell = Cell::new(0xFFFF_FFFFu32);
    let reg = backed(&cell);
    reg.write_field(4, 9, 0xFFFF_FFFF);
    assert_eq!(cell.get(), 0xFFFF_FFEF);
    assert!(take_raised().is_empty());
}

#[cfg(feature = "checked")]
#[test]
fn checked_feature_keeps_faults() {
    set_fault_handler(record);
    assert!(checks_enabled());

    assert_eq!(mask_for_bit::<u64>(63), 0);
    assert_eq!(mask_for_range::<u32>(3, 7), 0);
    assert_eq!(
        take_raised(),
        [
            FaultCode::RegisterBitOutOfBounds,
            FaultCode::RegisterBitOutOfBounds
        ]
    );
}

#[test]
fn bit_tests() {
    let cell = Cell::new(0b1010_0101u8);
    let reg = backed(&cell);

    assert!(reg.is_set(0));
    assert!(reg.is_clear(1));
    assert!(reg.is_set(2));
    assert!(reg.is_clear(6));
    assert!(reg.is_set(5));
}

#[test]
fn field_round_trip() {
    let cell = Cell::new(0u32);
    let reg = backed(&cell);

    reg.write_field(15, 0, 0x1234);
    reg.write_field(24, 16, 0x1AB);
    reg.write_field(30, 25, 0x2A);

    assert_eq!(reg.read_field(15, 0), 0x1234);
    assert_eq!(reg.read_field(24, 16), 0x1AB);
    assert_eq!(reg.read_field(30, 25), 0x2A);
    assert_eq!(cell.get(), (0x2A << 25) | (0x1AB << 16) | 0x1234);
}

#[test]
fn oversized_value_is_truncated() {
    let cell = Cell::new(0u32);
    let reg = backed(&cell);

    let value = 0xFFu32;
    reg.write_field(11, 8, value);
    assert_eq!(reg.read_field(11, 8), value & mask_for_range::<u32>(11 - 8, 0));
    assert_eq!(cell.get(), 0x0000_0F00);
}

#[test]
fn write_field_keeps_other_bits() {
    let cell = Cell::new(0xFFFF_FFFFu32);
    let reg = backed(&cell);

    reg.write_field(15, 0, 0x0000);
    assert_eq!(cell.get(), 0xFFFF_0000);

    reg.write_field(23, 20, 0x5);
    assert_eq!(cell.get(), 0xFF5F_0000);
}

#[test]
fn set_and_clear_bit() {
    let cell = Cell::new(0u16);
    let reg = backed(&cell);

    reg.set_bit(3);
    reg.set_bit(14);
    assert_eq!(cell.get(), 0x4008);
    reg.clear_bit(3);
    assert_eq!(cell.get(), 0x4000);
    assert!(reg.is_set(14));
}

#[test]
fn read_sees_external_updates() {
    let cell = Cell::new(0u64);
    let reg = backed(&cell);

    assert_eq!(reg.read_field(47, 32), 0);
    cell.set(0xBEEF << 32);
    assert_eq!(reg.read_field(47, 32), 0xBEEF);
}

#[test]
fn out_of_bounds_write_is_skipped() {
    set_fault_handler(record);
    if !checks_enabled() {
        return;
    }

    let cell = Cell::new(0x0F0Fu16);
    let reg = backed(&cell);

    reg.write_field(15, 8, 0xFF);
    assert_eq!(cell.get(), 0x0F0F);
    assert_eq!(reg.read_field(15, 8), 0);
    assert_eq!(
        take_raised(),
        [
            FaultCode::RegisterBitOutOfBounds,
            FaultCode::RegisterBitOutOfBounds
        ]
    );
}

#[test]
fn debug_output_does_not_read() {
    let cell = Cell::new(0u32);
    let reg = backed(&cell);
    let debug_str = format!("{:?}", reg);
    assert!(debug_str.contains("Register"));
    assert!(debug_str.contains(&format!("{:#x}", reg.addr())));
}
