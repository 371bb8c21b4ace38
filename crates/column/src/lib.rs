// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

//! Columnar buffers: validity bitmap, typed containers, the dynamic
//! `ColumnData` dispatch and the `Block` transfer unit.

pub mod bitvec;
pub mod block;
pub mod container;
pub mod data;

pub use bitvec::BitVec;
pub use block::{Block, BlockColumn};
pub use container::{Container, NullableContainer, UuidContainer};
pub use data::ColumnData;
