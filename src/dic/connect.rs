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

//! Connection-cost table.
//!
//! Maps a pair of POS numbers to the cost of placing them next to each
//! other. POS numbers are first compressed through per-side `kakari`
//! (left) and `uke` (right) code arrays; the V1.15 layout predates the
//! compression and uses the POS numbers directly. The table also carries
//! the POS → type-POS mapping and the POS-name pool.

use nom::multi::count;
use nom::number::complete::{le_i32, le_u16, le_u32};

use crate::dic::header::{self, HeaderError};
use crate::error::{KotohaNomResult, KotohaResult};

/// Stored cost meaning "cannot connect".
pub const CANT_CONNECT: u8 = 255;
/// Cost that "cannot connect" expands to at lookup time.
pub const MAX_CONNECT_COST: u16 = 65535;

#[derive(Debug)]
pub struct ConnectionTable {
    pos_max: u32,
    kakari_max: u32,
    uke_max: u32,
    type_pos: Vec<u16>,
    kakari: Option<Vec<u16>>,
    uke: Option<Vec<u16>>,
    costs: Vec<u8>,
    name_offsets: Vec<i32>,
    name_pool: Vec<u16>,
}

fn u32_le(input: &[u8]) -> KotohaNomResult<&[u8], u32> {
    le_u32(input)
}

fn u16s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u16>> {
    count(le_u16, n)(input)
}

fn i32s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<i32>> {
    count(le_i32, n)(input)
}

fn u8s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u8>> {
    nom::combinator::map(nom::bytes::complete::take(n), |b: &[u8]| b.to_vec())(input)
}

impl ConnectionTable {
    pub fn parse(data: &[u8]) -> KotohaResult<ConnectionTable> {
        let hdr = header::Header::parse(data, "connection table")?;
        let compressed = if hdr.version_is(header::CONNECT_V116) {
            true
        } else if hdr.version_is(header::CONNECT_V115) {
            false
        } else {
            return Err(HeaderError::InvalidVersion("connection table").into());
        };
        let body = &data[header::HEADER_SIZE..];

        let (rest, pos_max) = u32_le(body)?;
        // A byte-swapped file produces an absurd POS count; reject it as a
        // version problem, the way a tag mismatch is rejected.
        if pos_max >= 0x10000 {
            return Err(HeaderError::InvalidVersion("connection table").into());
        }
        let (rest, type_pos) = u16s(rest, pos_max as usize)?;

        let (rest, kakari_max, uke_max, kakari, uke) = if compressed {
            let (rest, kakari_max) = u32_le(rest)?;
            let (rest, uke_max) = u32_le(rest)?;
            let (rest, kakari) = u16s(rest, pos_max as usize)?;
            let (rest, uke) = u16s(rest, pos_max as usize)?;
            (rest, kakari_max, uke_max, Some(kakari), Some(uke))
        } else {
            // V1.15 carries no code arrays; the POS number is the code.
            (rest, pos_max, pos_max, None, None)
        };

        let (rest, costs) = u8s(rest, kakari_max as usize * uke_max as usize)?;
        let (rest, name_offsets) = i32s(rest, pos_max as usize)?;
        let (_rest, name_pool) = u16s(rest, rest.len() / 2)?;

        Ok(ConnectionTable {
            pos_max,
            kakari_max,
            uke_max,
            type_pos,
            kakari,
            uke,
            costs,
            name_offsets,
            name_pool,
        })
    }

    /// Number of POS entries; POS numbers index tables directly.
    pub fn pos_max(&self) -> u32 {
        self.pos_max
    }

    /// Type-POS of a morpheme POS. The local void sentinel has none.
    pub fn type_pos(&self, pos: u16) -> u16 {
        if (pos as u32) < self.pos_max {
            self.type_pos[pos as usize]
        } else {
            0
        }
    }

    #[inline]
    fn kakari_code(&self, pos: u16) -> u32 {
        match &self.kakari {
            Some(k) => k[pos as usize] as u32,
            None => pos as u32,
        }
    }

    #[inline]
    fn uke_code(&self, pos: u16) -> u32 {
        match &self.uke {
            Some(u) => u[pos as usize] as u32,
            None => pos as u32,
        }
    }

    /// Connection cost of `right_pos` following `left_pos`, with the
    /// "cannot connect" value expanded.
    #[inline]
    pub fn cost(&self, left_pos: u16, right_pos: u16) -> u16 {
        self.cost_for_uke_code(left_pos, self.uke_code(right_pos))
    }

    /// Uke code of a POS, precomputed once per linked morpheme.
    #[inline]
    pub fn uke_code_of(&self, pos: u16) -> u32 {
        self.uke_code(pos)
    }

    /// Connection cost against a precomputed uke code.
    #[inline]
    pub fn cost_for_uke_code(&self, left_pos: u16, uke_code: u32) -> u16 {
        let raw = self.costs[(self.kakari_code(left_pos) * self.uke_max + uke_code) as usize];
        if raw == CANT_CONNECT {
            MAX_CONNECT_COST
        } else {
            raw as u16
        }
    }

    /// POS name, or None for an out-of-range number.
    pub fn pos_name(&self, pos: u16) -> Option<&[u16]> {
        if (pos as u32) >= self.pos_max {
            return None;
        }
        let start = self.name_offsets[pos as usize] as usize;
        let end = self.name_pool[start..]
            .iter()
            .position(|&c| c == 0)
            .map(|p| start + p)
            .unwrap_or(self.name_pool.len());
        Some(&self.name_pool[start..end])
    }

    /// Finds a POS number by name.
    ///
    /// The offline tools sort POS names by raw Unicode ordinals while some
    /// builds store U+FF5E/U+FF0D where others store U+301C/U+2212, so
    /// both sides are canonicalized before comparison.
    pub fn pos_by_name(&self, name: &[u16]) -> Option<u16> {
        fn canon(c: u16) -> u16 {
            match c {
                0xFF5E => 0x301C,
                0xFF0D => 0x2212,
                other => other,
            }
        }
        let query: Vec<u16> = name.iter().map(|&c| canon(c)).collect();
        for p in 0..self.pos_max as u16 {
            let stored = self.pos_name(p)?;
            if stored.len() == query.len()
                && stored.iter().zip(query.iter()).all(|(&a, &b)| canon(a) == b)
            {
                return Some(p);
            }
        }
        None
    }

}
