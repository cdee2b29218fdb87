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

//! Grammar table backing bunsetsu segmentation and dependency costs.
//!
//! The body starts with eleven `i32` header fields; the section offsets
//! they carry are relative to the start of the image (header included).
//! The left-attribute table doubles as the phrase-break table: bit 7 of an
//! entry flags a boundary, the low bits are the attribute code.

use nom::multi::count;
use nom::number::complete::{le_i16, le_i32};

use crate::dic::header;
use crate::error::{KotohaError, KotohaNomResult, KotohaResult};

/// Number of dependency-relation categories.
pub const RELATION_KINDS: usize = 12;

/// Stored cost meaning "cannot relate".
pub const CANT_RELATE: u8 = 255;
/// Cost that "cannot relate" expands to.
pub const CANT_RELATE_COST: i32 = 256 * 16;

const BREAK_FLAG: u8 = 0x80;
const ATTR_MASK: u8 = 0x7F;

#[derive(Debug)]
pub struct GrammarTable {
    pos_max: i32,
    compressed_max: i32,
    kakari_attr_max: i32,
    uke_attr_max: i32,
    distance_max: i32,
    compressed: Vec<i16>,
    kakari_tbl: Vec<u8>,
    uke_tbl: Vec<u8>,
    rule_tbl: Vec<u8>,
    cost_tbl: Vec<u8>,
    distance_tbl: Vec<u8>,
}

fn i32s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<i32>> {
    count(le_i32, n)(input)
}

fn i16s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<i16>> {
    count(le_i16, n)(input)
}

fn section<'a>(data: &'a [u8], start: i32, len: usize) -> KotohaResult<&'a [u8]> {
    let start = start as usize;
    data.get(start..start + len)
        .ok_or(KotohaError::MalformedResource {
            resource: "grammar table",
            offset: start,
        })
}

impl GrammarTable {
    pub fn parse(data: &[u8]) -> KotohaResult<GrammarTable> {
        let body = header::body_checked(data, header::GRAMMAR_V111, "grammar table")?;
        let (_rest, fields) = i32s(body, 11)?;
        let (pos_max, compressed_max, kakari_attr_max, uke_attr_max, distance_max) =
            (fields[0], fields[1], fields[2], fields[3], fields[4]);
        if pos_max < 0 || compressed_max < 0 || distance_max <= 0 {
            return Err(KotohaError::MalformedResource {
                resource: "grammar table",
                offset: header::HEADER_SIZE,
            });
        }

        let sq = (compressed_max * compressed_max) as usize;
        let attrs = (kakari_attr_max * uke_attr_max) as usize;
        let (_r, compressed) = i16s(section(data, fields[5], pos_max as usize * 2)?, pos_max as usize)?;
        let kakari_tbl = section(data, fields[6], sq)?.to_vec();
        let uke_tbl = section(data, fields[7], sq)?.to_vec();
        let rule_tbl = section(data, fields[8], attrs)?.to_vec();
        let cost_tbl = section(data, fields[9], attrs)?.to_vec();
        let distance_tbl =
            section(data, fields[10], RELATION_KINDS * distance_max as usize)?.to_vec();

        Ok(GrammarTable {
            pos_max,
            compressed_max,
            kakari_attr_max,
            uke_attr_max,
            distance_max,
            compressed,
            kakari_tbl,
            uke_tbl,
            rule_tbl,
            cost_tbl,
            distance_tbl,
        })
    }

    /// Compressed POS of a morpheme POS; errors outside the table.
    pub fn compressed_pos(&self, pos: u16) -> KotohaResult<i16> {
        if (pos as i32) >= self.pos_max {
            return Err(KotohaError::InvalidPos(pos));
        }
        Ok(self.compressed[pos as usize])
    }

    /// Phrase boundary between two compressed POS?
    #[inline]
    pub fn is_break(&self, left: i16, right: i16) -> bool {
        self.kakari_tbl[(left as i32 * self.compressed_max + right as i32) as usize] & BREAK_FLAG
            != 0
    }

    /// Kakari attribute of a phrase tail bigram.
    #[inline]
    pub fn kakari_attr(&self, left: i16, right: i16) -> u8 {
        self.kakari_tbl[(left as i32 * self.compressed_max + right as i32) as usize] & ATTR_MASK
    }

    /// Uke attribute of a phrase head bigram.
    #[inline]
    pub fn uke_attr(&self, left: i16, right: i16) -> u8 {
        self.uke_tbl[(left as i32 * self.compressed_max + right as i32) as usize] & ATTR_MASK
    }

    /// Dependency-rule type of an attribute pair.
    #[inline]
    pub fn rule(&self, kakari: u8, uke: u8) -> u8 {
        debug_assert!((kakari as i32) < self.kakari_attr_max);
        self.rule_tbl[(kakari as i32 * self.uke_attr_max + uke as i32) as usize]
    }

    /// Attribute-pair cost with "cannot relate" expanded.
    #[inline]
    pub fn relation_cost(&self, kakari: u8, uke: u8) -> i32 {
        let raw = self.cost_tbl[(kakari as i32 * self.uke_attr_max + uke as i32) as usize];
        if raw == CANT_RELATE {
            CANT_RELATE_COST
        } else {
            raw as i32
        }
    }

    /// Distance cost of a rule type over `distance` phrases.
    #[inline]
    pub fn distance_cost(&self, rule: u8, distance: usize) -> i32 {
        let raw = self.distance_tbl[rule as usize * self.distance_max as usize + distance];
        if raw == CANT_RELATE {
            CANT_RELATE_COST
        } else {
            raw as i32
        }
    }
}
