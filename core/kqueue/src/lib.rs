// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Lock-free single-producer/single-consumer ring buffer.
//!
//! [`RingBuffer`] is the message path between tasks, interrupt handlers and
//! peripherals. Elements are moved in and out by swapping with the caller's
//! value, which keeps large payloads (network packets, DMA descriptors) off
//! the copy path.
//!
//! The occupancy counter is an atomic with release/acquire ordering, so one
//! [`Producer`] and one [`Consumer`] can run concurrently without a lock.
//! The consumer may see an element late, but never before it was pushed.
//!
//! Full and empty are ordinary outcomes, reported as `false` (or as
//! `Err`/`None` by the moving variants), never as faults.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod ring;

pub use ring::{Consumer, Producer, RingBuffer};
