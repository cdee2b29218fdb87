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

//! Input-text normalizer.
//!
//! Applies from-string → to-string replacement rules through a double
//! array before analysis, producing the rewritten text plus an index map
//! back to the original offsets. A 65536-entry stop-character bitmap
//! provides the cheap prefilter that lets plain text skip normalization
//! entirely.

use nom::multi::count;
use nom::number::complete::{le_i32, le_u16, le_u32};

use crate::analysis::lattice::LOCAL_TEXT_SIZE;
use crate::dic::header;
use crate::error::{KotohaError, KotohaNomResult, KotohaResult};

const EOK: u16 = 0;
/// High bit of a base cell marks it unusable for transitions.
const BASE_GUARD: u32 = 0x8000_0000;

#[derive(Debug)]
pub struct TextNormalizer {
    stop_chars: Vec<u8>,
    base: Vec<u32>,
    label: Vec<u16>,
    replacement_index: Vec<u32>,
    pool: Vec<u8>,
}

fn i32_le(input: &[u8]) -> KotohaNomResult<&[u8], i32> {
    le_i32(input)
}

fn u16s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u16>> {
    count(le_u16, n)(input)
}

fn u32s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u32>> {
    count(le_u32, n)(input)
}

impl TextNormalizer {
    pub fn parse(image: &[u8]) -> KotohaResult<TextNormalizer> {
        let body = header::body_checked(image, header::NORMALIZE_V101, "normalize table")?;
        let (rest, rule_count) = i32_le(body)?;
        let (rest, array_size) = i32_le(rest)?;
        if rule_count < 0 || array_size < 0 {
            return Err(KotohaError::MalformedResource {
                resource: "normalize table",
                offset: header::HEADER_SIZE,
            });
        }
        let stop_chars = rest
            .get(..0x10000)
            .ok_or(KotohaError::MalformedResource {
                resource: "normalize table",
                offset: header::HEADER_SIZE + 8,
            })?
            .to_vec();
        let rest = &rest[0x10000..];
        let (rest, base) = u32s(rest, array_size as usize)?;
        let (rest, label) = u16s(rest, array_size as usize)?;
        let (rest, replacement_index) = u32s(rest, rule_count as usize)?;
        Ok(TextNormalizer {
            stop_chars,
            base,
            label,
            replacement_index,
            pool: rest.to_vec(),
        })
    }

    /// Quick prefilter: does anything in the first characters need
    /// replacement at all?
    pub fn check(&self, text: &[u16]) -> bool {
        for &c in text.iter().take(LOCAL_TEXT_SIZE) {
            if self.stop_chars[c as usize] != 0 {
                return c != 0;
            }
        }
        false
    }

    #[inline]
    fn step(&self, state: u32, c: u16) -> Option<u32> {
        let idx = state as usize + c as usize;
        if self.label.get(idx) == Some(&c) && self.base[idx] & BASE_GUARD == 0 {
            Some(self.base[idx])
        } else {
            None
        }
    }

    fn replacement(&self, rule: u32) -> (usize, &[u8]) {
        let at = self.replacement_index[rule as usize] as usize;
        let len = i32::from_le_bytes([
            self.pool[at],
            self.pool[at + 1],
            self.pool[at + 2],
            self.pool[at + 3],
        ]) as usize;
        (len / 2, &self.pool[at + 4..at + 4 + len])
    }

    /// Greedy longest-match replacement of `text`, stopping cleanly when
    /// the output would exceed `max_out` code units.
    ///
    /// Returns the rewritten text and the index map: `index[i]` is the
    /// original offset of the leading input character that produced output
    /// character `i`, with one extra trailing entry mapping the position
    /// just past the output. Surrogate pairs pass through atomically.
    pub fn convert(&self, text: &[u16], max_out: usize) -> (Vec<u16>, Vec<usize>) {
        let mut out: Vec<u16> = Vec::new();
        let mut index: Vec<usize> = Vec::new();
        let out_max = max_out - 1;

        // Analysis covers up to the character right after a terminator.
        let mut t_max = text.len();
        for (i, &c) in text.iter().enumerate() {
            if c == 0 {
                t_max = i + 1;
                break;
            }
        }

        let mut t_pos = 0usize;
        while t_pos < t_max {
            // Longest match from t_pos.
            let mut state = 0u32;
            let mut rule: Option<u32> = None;
            let mut end_pos = t_pos;
            let mut i = t_pos;
            while i < t_max {
                if text[i] == 0 {
                    break;
                }
                match self.step(state, text[i]) {
                    None => break,
                    Some(next) => {
                        state = next;
                        if self.label.get(state as usize) == Some(&EOK) {
                            rule = Some(self.base[state as usize]);
                            end_pos = i;
                        }
                        i += 1;
                    }
                }
            }

            if let Some(rule) = rule {
                let (len, bytes) = self.replacement(rule);
                if out.len() + len >= out_max {
                    break;
                }
                for k in 0..len {
                    out.push(u16::from_le_bytes([bytes[2 * k], bytes[2 * k + 1]]));
                    index.push(t_pos);
                }
                t_pos = end_pos + 1;
            } else if t_pos + 1 < t_max
                && (0xD800..=0xDBFF).contains(&text[t_pos])
                && (0xDC00..=0xDFFF).contains(&text[t_pos + 1])
            {
                if out.len() + 2 >= out_max {
                    break;
                }
                out.push(text[t_pos]);
                out.push(text[t_pos + 1]);
                index.push(t_pos);
                index.push(t_pos + 1);
                t_pos += 2;
            } else {
                if out.len() + 1 >= out_max {
                    break;
                }
                out.push(text[t_pos]);
                index.push(t_pos);
                t_pos += 1;
            }
        }

        // The trailing index entry maps the end of the output; a copied
        // terminator is not part of the result.
        if out.last() == Some(&0) {
            out.pop();
            *index.last_mut().unwrap() = t_pos - 1;
        } else {
            index.push(t_pos);
        }
        (out, index)
    }
}
