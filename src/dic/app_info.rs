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

//! Application-information dictionary: a parallel array of variable-length
//! byte payloads indexed by the same record ids as the word dictionary.

use nom::multi::count;
use nom::number::complete::{le_i32, le_u32};

use crate::dic::header;
use crate::error::{KotohaNomResult, KotohaResult};

#[derive(Debug)]
pub struct AppInfoDictionary {
    offsets: Vec<u32>,
    pool: Vec<u8>,
}

fn u32_le(input: &[u8]) -> KotohaNomResult<&[u8], u32> {
    le_u32(input)
}

fn u32s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u32>> {
    count(le_u32, n)(input)
}

impl AppInfoDictionary {
    /// Parses an application dictionary image; `None` yields an empty one.
    pub fn parse(image: Option<&[u8]>) -> KotohaResult<AppInfoDictionary> {
        let data = match image {
            None => {
                return Ok(AppInfoDictionary {
                    offsets: Vec::new(),
                    pool: Vec::new(),
                })
            }
            Some(d) => d,
        };
        let body = header::body_checked(data, header::APP_DIC_V123, "application dictionary")?;
        let (rest, rec_count) = u32_le(body)?;
        let (rest, offsets) = u32s(rest, rec_count as usize)?;
        Ok(AppInfoDictionary {
            offsets,
            pool: rest.to_vec(),
        })
    }

    pub fn record_count(&self) -> u32 {
        self.offsets.len() as u32
    }

    /// Payload bytes of a record; empty when no dictionary is configured.
    pub fn info(&self, record_id: u32) -> &[u8] {
        if self.offsets.is_empty() {
            return &[];
        }
        let at = self.offsets[record_id as usize] as usize;
        let (_, len) = le_i32::<_, crate::error::KotohaNomError<&[u8]>>(&self.pool[at..])
            .unwrap_or((&[], 0));
        let start = at + 4;
        &self.pool[start..start + len.max(0) as usize]
    }
}
