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

//! English-token detector.
//!
//! A 36-state machine over 14 character classes recognizes alphabet runs,
//! digit runs, initialisms and line-end hyphen continuations
//! (`word-\n word`). Three tables are consulted in parallel per input
//! character: the next state, a registration type, and a termination flag.
//! Only the normal (1) and hyphen-continuation (2) registration types
//! insert lattice edges; the remaining types classify surfaces that the
//! unknown-word detector covers.

use crate::analysis::lattice::{Lattice, Lookup, DETECTOR_PRIO};
use crate::analysis::morpheme::Morpheme;
use crate::dic::connect::ConnectionTable;
use crate::dic::header::{self, HeaderError};
use crate::error::{KotohaError, KotohaResult};
use crate::pos;

/// Token-type bits stored in the low 24 bits of `app_i`.
pub const TOKEN_NORMAL: u32 = 1;
pub const TOKEN_HYPHEN: u32 = 1 << 1;
pub const TOKEN_ARABIC: u32 = 1 << 2;
pub const TOKEN_SYMBOL: u32 = 1 << 3;
pub const TOKEN_SPACE: u32 = 1 << 4;
pub const TOKEN_RETURN: u32 = 1 << 5;
pub const TOKEN_INITIAL: u32 = 1 << 6;

// Character classes.
const CLASS_OUTSIDE: u8 = 0;
const CLASS_DIGIT: u8 = 1;
const CLASS_DIACRITIC: u8 = 8;
const CLASS_PERIOD: u8 = 9;
const CLASS_HYPHEN: u8 = 10;
const CLASS_SPACE: u8 = 11;
const CLASS_CR: u8 = 12;
const CLASS_LF: u8 = 13;

const STATE_ERROR: u8 = 88;

/// Next-state table; 88 is the error state, 99 marks impossible input.
#[rustfmt::skip]
const NEXT_STATE: [[u8; 14]; 36] = [
    [99, 1, 3, 3, 3, 4, 4, 4,35,11,16,20,27,31],
    [ 0, 1, 3, 3, 3, 4, 4, 4,35,11,16,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2, 2,11,17,20,27,31],
    [ 0, 1, 5, 5, 5, 6, 6, 6, 3,12,17,20,27,31],
    [ 0, 1, 2, 2, 2, 6, 6, 6, 4,13,18,20,27,31],
    [ 0, 1, 5, 5, 5, 2, 2, 2, 5,11,17,20,27,31],
    [ 0, 1, 2, 2, 2, 6, 6, 6, 6,11,18,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2, 7,14,16,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2, 8,15,16,20,27,31],
    [ 0, 1,10,10,10,10,10,10,10,11,16,20,27,31],
    [ 0, 1,10,10,10,10,10,10,10,11,16,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,20,27,31],
    [ 0, 1, 7, 7, 7, 8, 8, 8,35,11,16,20,27,31],
    [ 0, 1, 7, 7, 7, 8, 8, 8,35,11,16,20,27,31],
    [ 0, 1, 7, 7, 7, 8, 8, 8,35,11,16,20,27,31],
    [ 0, 1, 7, 7, 7, 8, 8, 8,35,11,16,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,21,29,33],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,22,29,33],
    [99,99,99,99,99,99,99,99,99,99,99,99,99,99],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,20,27,31],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,21,29,33],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,22,29,33],
    [99,99,99,99,99,99,99,99,99,99,99,99,99,99],
    [ 0, 1,10,10,10,10,10,10,35,11,16,24,27,31],
    [ 0, 1,10,10,10,10,10,10,35,11,16,25,27,31],
    [99,99,99,99,99,99,99,99,99,99,99,99,99,99],
    [88,88,88,88,88,88,88,88,88,88,88,88,88,31],
    [88,88,88,88,88,88,88,88,88,88,88,88,88,32],
    [88,88,88,88,88,88,88,88,88,88,88,88,88,33],
    [99,99,99,99,99,99,99,99,99,99,99,99,99,99],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,20,27,31],
    [ 0, 1,10,10,10,10,10,10,35,11,16,24,27,31],
    [ 0, 1,10,10,10,10,10,10,35,11,16,25,27,31],
    [99,99,99,99,99,99,99,99,99,99,99,99,99,99],
    [ 0, 1, 2, 2, 2, 2, 2, 2,35,11,16,20,27,31],
];

/// Registration-type table: 0 none, 1 normal token, 2 hyphen continuation,
/// 3 digit run, 4 symbol, 5 space, 6 newline, 7 initialism, 9 impossible.
#[rustfmt::skip]
const REGISTRATION: [[u8; 14]; 36] = [
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9],
    [ 3, 0, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [ 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 7, 7, 7, 7],
    [ 7, 7, 0, 0, 0, 0, 0, 0, 0, 0, 7, 7, 7, 7],
    [ 2, 2, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2],
    [ 2, 2, 0, 0, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2],
    [ 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4],
    [ 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7],
    [ 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7],
    [ 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7],
    [ 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7],
    [ 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 0, 5, 5],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [ 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4, 4],
];

/// Termination table: 1 stops the scan, 9 impossible.
#[rustfmt::skip]
const TERMINATION: [[u8; 14]; 36] = [
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9],
    [ 1, 0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 1, 1, 1, 0, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0],
    [ 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 9, 0],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [ 1, 1, 0, 0, 0, 1, 1, 1, 1, 1, 1, 0, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1],
    [ 1, 1, 0, 0, 0, 0, 0, 0, 1, 1, 1, 0, 1, 1],
    [ 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Per-type costs used when the table file predates them.
const DEFAULT_COSTS: [u16; 8] = [0, 4, 9, 1, 1, 1, 1, 1];

#[derive(Debug)]
pub struct EnglishTokenizer {
    classes: Vec<u8>,
    costs: [u16; 8],
}

impl EnglishTokenizer {
    pub fn parse(image: &[u8]) -> KotohaResult<EnglishTokenizer> {
        let hdr = header::Header::parse(image, "english class table")?;
        let with_costs = if hdr.version_is(header::ENGLISH_V108) {
            true
        } else if hdr.version_is(header::ENGLISH_V107) {
            false
        } else {
            return Err(HeaderError::InvalidVersion("english class table").into());
        };
        let body = &image[header::HEADER_SIZE..];
        let classes = body
            .get(..0x10000)
            .ok_or(KotohaError::MalformedResource {
                resource: "english class table",
                offset: header::HEADER_SIZE,
            })?
            .to_vec();

        let mut costs = DEFAULT_COSTS;
        if with_costs {
            let tail = body.get(0x10000..0x10000 + 16).ok_or(
                KotohaError::MalformedResource {
                    resource: "english class table",
                    offset: header::HEADER_SIZE + 0x10000,
                },
            )?;
            for (k, chunk) in tail.chunks_exact(2).enumerate() {
                costs[k] = u16::from_le_bytes([chunk[0], chunk[1]]);
            }
        }

        Ok(EnglishTokenizer { classes, costs })
    }

    #[inline]
    fn class_of(&self, c: u16) -> u8 {
        self.classes[c as usize]
    }

    /// Detects English tokens starting at `txt_pos`.
    pub fn search(
        &self,
        lat: &mut Lattice,
        conn: &ConnectionTable,
        dic_num: u8,
        txt_pos: usize,
        max_word_len: u32,
    ) -> Lookup {
        let mut count = 0usize;

        let class = self.class_of(lat.text()[txt_pos]);
        if class == CLASS_OUTSIDE {
            return Lookup::Found(0);
        }
        if self.bypass(lat.text(), txt_pos, class) {
            return Lookup::Found(0);
        }

        let mut next_status = NEXT_STATE[0][class as usize];
        let mut mor_len = 0usize;
        let mut i = txt_pos;
        loop {
            let cur_status = next_status;
            mor_len += 1;
            if mor_len as u32 > max_word_len {
                break;
            }

            let reg;
            let finish;
            if i + 1 >= lat.txt_len() || lat.text()[i + 1] == 0 {
                // The character after the text counts as "outside".
                reg = REGISTRATION[cur_status as usize][CLASS_OUTSIDE as usize];
                finish = true;
            } else {
                let k = self.class_of(lat.text()[i + 1]);
                next_status = NEXT_STATE[cur_status as usize][k as usize];
                if next_status == STATE_ERROR {
                    break;
                }
                reg = REGISTRATION[cur_status as usize][k as usize];
                finish = TERMINATION[cur_status as usize][k as usize] == 1;
            }

            if reg == 1 || reg == 2 {
                let sub_count = if reg == 2 {
                    self.count_hyphen_subs(lat.text(), txt_pos, mor_len)
                } else {
                    0
                };
                let app_i = ((dic_num as u32) << 24) | (1 << (reg - 1));
                let r = lat.insert(
                    conn,
                    txt_pos,
                    mor_len,
                    pos::ENGLISH_TOKEN,
                    self.costs[reg as usize],
                    app_i,
                    sub_count,
                    DETECTOR_PRIO,
                    false,
                );
                count += 1;
                if r.is_err() {
                    return Lookup::Converged;
                }
            }

            if finish {
                break;
            }
            i += 1;
        }

        Lookup::Found(count)
    }

    /// A scan started in the middle of a digit, alphabet or space run is
    /// already covered by the scan that started the run.
    fn bypass(&self, text: &[u16], txt_pos: usize, class: u8) -> bool {
        if txt_pos == 0 {
            return false;
        }
        let prev = self.class_of(text[txt_pos - 1]);
        (class == CLASS_DIGIT && prev == CLASS_DIGIT)
            || ((2..=CLASS_DIACRITIC).contains(&class) && (2..=7).contains(&prev))
            || (class == CLASS_SPACE && prev == CLASS_SPACE)
    }

    /// Counts the sub-morphemes of a hyphen-continuation token: leading
    /// segment, hyphen, line break and trailing segment, plus one per
    /// whitespace group around the break.
    fn count_hyphen_subs(&self, text: &[u16], txt_pos: usize, mor_len: usize) -> u32 {
        let mut i = txt_pos;
        while self.class_of(text[i]) != CLASS_HYPHEN {
            i += 1;
        }
        let mut subs = 0u32;
        let mut count_space = true;
        for &c in &text[i + 1..txt_pos + mor_len] {
            match self.class_of(c) {
                CLASS_SPACE => {
                    // A whitespace run counts once.
                    if count_space {
                        subs += 1;
                        count_space = false;
                    }
                }
                CLASS_CR | CLASS_LF => count_space = true,
                _ => {}
            }
        }
        subs + 4
    }

    /// Sub-morphemes of a hyphen-continuation token; other token types
    /// have none.
    pub fn sub_morphemes(
        &self,
        text: &[u16],
        m: &Morpheme,
        out: &mut Vec<Morpheme>,
        limit: usize,
    ) -> KotohaResult<()> {
        if m.sub_i as usize > limit {
            return Err(KotohaError::SubMorphemeBufferOverflow);
        }
        if m.record_id() != TOKEN_HYPHEN {
            return Ok(());
        }
        let head = m.app_i & 0xFF00_0000;
        let surface = &text[m.range()];
        let piece = |begin: usize, len: usize, ty: u32| Morpheme {
            begin: m.begin + begin,
            length: len as u16,
            pos: pos::ENGLISH_TOKEN,
            app_i: head | ty,
            sub_i: 0,
            cost: 0,
        };

        // Leading segment up to the hyphen.
        let mut p = 0usize;
        while self.class_of(surface[p]) != CLASS_HYPHEN {
            p += 1;
        }
        out.push(piece(0, p, TOKEN_NORMAL));
        let mut offset = p;

        out.push(piece(offset, 1, TOKEN_SYMBOL));
        offset += 1;
        p += 1;

        // Whitespace between the hyphen and the break.
        let mut spaces = 0usize;
        while !matches!(self.class_of(surface[p]), CLASS_CR | CLASS_LF) {
            spaces += 1;
            p += 1;
        }
        if spaces != 0 {
            out.push(piece(offset, spaces, TOKEN_SPACE));
            offset += spaces;
        }

        // The break itself: CR+LF or a lone LF.
        let break_len = if self.class_of(surface[p]) == CLASS_CR {
            2
        } else {
            1
        };
        out.push(piece(offset, break_len, TOKEN_RETURN));
        offset += break_len;
        p += break_len;

        // Whitespace between the break and the trailing segment.
        let mut spaces = 0usize;
        while self.class_of(surface[p]) == CLASS_SPACE {
            spaces += 1;
            p += 1;
        }
        if spaces != 0 {
            out.push(piece(offset, spaces, TOKEN_SPACE));
            offset += spaces;
        }

        out.push(piece(offset, surface.len() - p, TOKEN_NORMAL));
        Ok(())
    }

    /// The condensed surface of a token: hyphen-continuation tokens drop
    /// the hyphen, whitespace and line-break characters so `xxx-\nyyy`
    /// reads back as `xxxyyy`.
    pub fn condensed_surface(&self, text: &[u16], m: &Morpheme) -> Vec<u16> {
        let surface = &text[m.range()];
        if m.record_id() != TOKEN_HYPHEN {
            return surface.to_vec();
        }
        surface
            .iter()
            .copied()
            .filter(|&c| {
                !matches!(
                    self.class_of(c),
                    CLASS_HYPHEN | CLASS_SPACE | CLASS_CR | CLASS_LF
                )
            })
            .collect()
    }
}
