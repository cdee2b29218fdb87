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

use std::fmt;
use std::ops::Range;

/// Sub-structure value meaning "no sub-morphemes".
pub const NO_SUB_STRUCTURE: u32 = 0x00FF_FFFF;

/// One analyzed morpheme.
///
/// `begin` and `length` address the analyzer handle's current text buffer
/// in UTF-16 code units; fetch the surface through
/// [`Analyzer::surface`](crate::analysis::Analyzer::surface). A morpheme is
/// invalidated by the next analysis call on the same handle.
///
/// `app_i` packs `(dictionary_index << 24) | record_id`. Registered
/// dictionaries occupy indices `0..n`; the English detector and the
/// unknown-word detector follow. `sub_i` is a dictionary sub-structure
/// offset, a sub-morpheme count (English hyphen continuations) or
/// [`NO_SUB_STRUCTURE`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Morpheme {
    pub begin: usize,
    pub length: u16,
    pub pos: u16,
    pub app_i: u32,
    pub sub_i: u32,
    pub cost: u16,
}

impl Morpheme {
    /// Index of the candidate source that produced this morpheme.
    #[inline]
    pub fn dictionary_index(&self) -> usize {
        (self.app_i >> 24) as usize
    }

    /// Record id within the producing source.
    #[inline]
    pub fn record_id(&self) -> u32 {
        self.app_i & 0x00FF_FFFF
    }

    /// Range of the surface in the handle's text buffer.
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.begin..self.begin + self.length as usize
    }

    #[inline]
    pub fn has_sub_structure(&self) -> bool {
        self.sub_i != NO_SUB_STRUCTURE
    }
}

impl fmt::Debug for Morpheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "({}+{} pos={} app={:#x} sub={:#x} cost={})",
            self.begin, self.length, self.pos, self.app_i, self.sub_i, self.cost
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_index_packing() {
        let m = Morpheme {
            begin: 3,
            length: 2,
            pos: 5,
            app_i: (2 << 24) | 0x1234,
            sub_i: NO_SUB_STRUCTURE,
            cost: 10,
        };
        assert_eq!(m.dictionary_index(), 2);
        assert_eq!(m.record_id(), 0x1234);
        assert_eq!(m.range(), 3..5);
        assert!(!m.has_sub_structure());
    }
}
