/*
 *  Copyright (c) 2024 The kotoha developers
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! Double array over internal character codes, in the two on-disk shapes.
//!
//! A state is its base offset. From state `r` on internal code `c`, the
//! transition exists when `label[r + c] == c` and leads to `base[r + c]`.
//! A state whose own cell carries label [`EOK`] accepts; its base value is
//! the first record id of the homograph run ending there.

/// Label of an accepting cell.
pub const EOK: u16 = 0;

const PACKED_BASE_BITS: u32 = 19;
const PACKED_BASE_MASK: u32 = (1 << PACKED_BASE_BITS) - 1;
const PACKED_LABEL_MASK: u32 = 0x1FFF;

#[derive(Debug)]
pub enum DoubleArray {
    /// V1.25: separate `u32` base and `u16` label arrays.
    Split { base: Vec<u32>, label: Vec<u16> },
    /// V1.24: one `u32` per cell, 19-bit base and 13-bit label.
    ///
    /// Read with explicit shifts; the original's bit-fields are not a
    /// portable layout.
    Packed(Vec<u32>),
}

impl DoubleArray {
    #[inline]
    fn label(&self, idx: u32) -> Option<u16> {
        match self {
            DoubleArray::Split { label, .. } => label.get(idx as usize).copied(),
            DoubleArray::Packed(cells) => cells
                .get(idx as usize)
                .map(|&v| ((v >> PACKED_BASE_BITS) & PACKED_LABEL_MASK) as u16),
        }
    }

    #[inline]
    fn base(&self, idx: u32) -> u32 {
        match self {
            DoubleArray::Split { base, .. } => base[idx as usize],
            DoubleArray::Packed(cells) => cells[idx as usize] & PACKED_BASE_MASK,
        }
    }

    /// Advances from `state` on `code`; `None` when no such transition.
    #[inline]
    pub fn step(&self, state: u32, code: u16) -> Option<u32> {
        let idx = state + code as u32;
        if self.label(idx) == Some(code) {
            Some(self.base(idx))
        } else {
            None
        }
    }

    /// Record id when `state` accepts.
    #[inline]
    pub fn record(&self, state: u32) -> Option<u32> {
        if self.label(state) == Some(EOK) {
            Some(self.base(state))
        } else {
            None
        }
    }
}
