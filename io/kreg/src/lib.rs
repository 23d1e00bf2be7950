// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Typed access to memory-mapped registers.
//!
//! - [`mask`]: bit masks for single bits and inclusive `[msb:lsb]` ranges.
//! - [`Register`]: a volatile register handle with bit-test and bit-field
//!   accessors built on those masks.
//!
//! Registers also implement the `tock-registers` [`Readable`] and
//! [`Writeable`] interfaces, so `Field`/`FieldValue` based code works on top
//! of them.
//!
//! # Feature Flags
//!
//! - `checked`: keep bit-index checks in release builds.
//!
//! [`Readable`]: tock_registers::interfaces::Readable
//! [`Writeable`]: tock_registers::interfaces::Writeable

#![cfg_attr(not(test), no_std)]

pub mod mask;
mod register;
mod width;

pub use mask::{bit_limit, mask_for_bit, mask_for_range};
pub use register::Register;
pub use width::RegisterWidth;

#[cfg(test)]
mod tests;
