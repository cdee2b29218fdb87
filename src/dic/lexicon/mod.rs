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

//! Registered-word dictionaries.
//!
//! A dictionary image holds a Unicode → internal-code remap table, a
//! double array over internal codes, a sub-structure list pool and a
//! record-info array. Two on-disk layouts exist (V1.25 and the compact
//! V1.24) plus the null dictionary used when no image is configured;
//! there are exactly three kinds and no runtime extensibility, so the
//! dispatch is a plain enum.

use nom::multi::count;
use nom::number::complete::{le_u16, le_u32};

use crate::analysis::lattice::{Lattice, Lookup, SubEdge, EDGE_MAX};
use crate::analysis::morpheme::{Morpheme, NO_SUB_STRUCTURE};
use crate::dic::connect::ConnectionTable;
use crate::dic::header::{self, HeaderError};
use crate::dic::lexicon::trie::DoubleArray;
use crate::error::{KotohaError, KotohaNomResult, KotohaResult};
use crate::pos;

pub mod trie;

/// Collocation POS sentinel in V1.25 records.
pub const COLLOCATION_POS_V125: u16 = 0xFFFF;
/// Collocation POS sentinel in V1.24 records (11-bit POS field).
pub const COLLOCATION_POS_V124: u16 = 0x7FF;
/// Upper bound of sub-morphemes per registered word.
pub const SUB_MORPH_MAX: usize = 100;

// Internal codes of the line-break characters, fixed by the builder.
const NWL: u16 = 0x000A;
const RET: u16 = 0x000D;

/// Unified view of one dictionary record.
#[derive(Clone, Copy, Debug)]
pub struct RecordInfo {
    /// Homograph-run length, counted from the run's first record; 0 when
    /// the record is not a run head.
    pub homographs: u8,
    pub cost: u8,
    pub pos: u16,
    pub length: u8,
    /// Offset into the sub-structure list, or [`NO_SUB_STRUCTURE`].
    pub sub_list: u32,
}

/// Record layout internals shared by the search/expansion algorithms.
trait Records {
    fn remap(&self) -> &[u16];
    fn da(&self) -> &DoubleArray;
    fn sub_list(&self) -> &[u32];
    fn record(&self, id: u32) -> RecordInfo;
    fn is_collocation(&self, raw_pos: u16) -> bool;
    /// POS as it goes onto the lattice (void-word rewriting).
    fn lattice_pos(&self, raw_pos: u16) -> u16;
    /// Record id of the next homograph.
    fn next_id(&self, id: u32) -> u32;
}

#[derive(Debug)]
pub struct Lexicon125 {
    pub(crate) remap: Vec<u16>,
    pub(crate) da: DoubleArray,
    pub(crate) sub_list: Vec<u32>,
    pub(crate) records: Vec<RecordInfo>,
    pub(crate) has_void: bool,
}

#[derive(Debug)]
pub struct Lexicon124 {
    pub(crate) remap: Vec<u16>,
    pub(crate) da: DoubleArray,
    pub(crate) sub_list: Vec<u32>,
    pub(crate) cells: Vec<u32>,
}

#[derive(Debug)]
pub enum WordDictionary {
    V125(Lexicon125),
    V124(Lexicon124),
    Null,
}

fn u8_le(input: &[u8]) -> KotohaNomResult<&[u8], u8> {
    nom::number::complete::le_u8(input)
}

fn u16_le(input: &[u8]) -> KotohaNomResult<&[u8], u16> {
    le_u16(input)
}

fn u32_le(input: &[u8]) -> KotohaNomResult<&[u8], u32> {
    le_u32(input)
}

fn u16s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u16>> {
    count(le_u16, n)(input)
}

fn u32s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u32>> {
    count(le_u32, n)(input)
}

impl WordDictionary {
    /// Parses a dictionary image, trying the V1.25 layouts first and then
    /// the compact V1.24 one. `None` yields the null dictionary.
    pub fn parse(image: Option<&[u8]>) -> KotohaResult<WordDictionary> {
        let data = match image {
            None => return Ok(WordDictionary::Null),
            Some(d) => d,
        };
        let hdr = header::Header::parse(data, "word dictionary")?;
        let body = &data[header::HEADER_SIZE..];
        if hdr.version_is(header::WORD_DIC_V125_VOID) {
            Ok(WordDictionary::V125(Lexicon125::parse(body, true)?))
        } else if hdr.version_is(header::WORD_DIC_V125) {
            Ok(WordDictionary::V125(Lexicon125::parse(body, false)?))
        } else if hdr.version_is(header::WORD_DIC_V124) {
            Ok(WordDictionary::V124(Lexicon124::parse(body)?))
        } else {
            Err(HeaderError::InvalidVersion("word dictionary").into())
        }
    }

    pub fn record_count(&self) -> u32 {
        match self {
            WordDictionary::V125(l) => l.records.len() as u32,
            WordDictionary::V124(l) => l.cells.len() as u32,
            WordDictionary::Null => 0,
        }
    }

    /// Enumerates every registered word whose surface is a prefix of the
    /// lattice text at `txt_pos` and inserts each as a candidate edge.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &self,
        lat: &mut Lattice,
        conn: &ConnectionTable,
        dic_num: u8,
        dic_prio: u8,
        txt_pos: usize,
        ignore_cr: bool,
        max_word_len: u32,
    ) -> Lookup {
        match self {
            WordDictionary::V125(l) => {
                search_impl(l, lat, conn, dic_num, dic_prio, txt_pos, ignore_cr, max_word_len)
            }
            WordDictionary::V124(l) => {
                search_impl(l, lat, conn, dic_num, dic_prio, txt_pos, ignore_cr, max_word_len)
            }
            WordDictionary::Null => Lookup::Found(0),
        }
    }

    /// Expands the pending collocation edge into its sub-morpheme chain.
    /// Returns the new lattice end.
    pub fn expand_priority(
        &self,
        lat: &mut Lattice,
        conn: &ConnectionTable,
        begin: usize,
    ) -> usize {
        match self {
            WordDictionary::V125(l) => expand_priority_impl(l, lat, conn, begin),
            WordDictionary::V124(l) => expand_priority_impl(l, lat, conn, begin),
            WordDictionary::Null => lat.lattice_end(),
        }
    }

    /// Fetches the sub-morphemes of a registered word; `out` stays empty
    /// when the word has no sub-structure.
    pub fn sub_morphemes(
        &self,
        m: &Morpheme,
        out: &mut Vec<Morpheme>,
        limit: usize,
    ) -> KotohaResult<()> {
        match self {
            WordDictionary::V125(l) => sub_morphemes_impl(l, m, out, limit),
            WordDictionary::V124(l) => sub_morphemes_impl(l, m, out, limit),
            WordDictionary::Null => Ok(()),
        }
    }
}

impl Lexicon125 {
    fn parse(body: &[u8], has_void: bool) -> KotohaResult<Lexicon125> {
        let (rest, rec_count) = u32_le(body)?;
        let (rest, lst_count) = u32_le(rest)?;
        let (rest, da_count) = u32_le(rest)?;
        let (rest, remap) = u16s(rest, 0x10000)?;
        let (rest, base) = u32s(rest, da_count as usize)?;
        let (rest, label) = u16s(rest, da_count as usize)?;
        let (rest, sub_list) = u32s(rest, lst_count as usize)?;

        let mut records = Vec::with_capacity(rec_count as usize);
        let mut cursor = rest;
        for _ in 0..rec_count {
            let (r, homographs) = u8_le(cursor)?;
            let (r, cost) = u8_le(r)?;
            let (r, pos) = u16_le(r)?;
            let (r, packed) = u32_le(r)?;
            records.push(RecordInfo {
                homographs,
                cost,
                pos,
                length: (packed & 0xFF) as u8,
                sub_list: packed >> 8,
            });
            cursor = r;
        }

        Ok(Lexicon125 {
            remap,
            da: DoubleArray::Split { base, label },
            sub_list,
            records,
            has_void,
        })
    }
}

impl Records for Lexicon125 {
    fn remap(&self) -> &[u16] {
        &self.remap
    }
    fn da(&self) -> &DoubleArray {
        &self.da
    }
    fn sub_list(&self) -> &[u32] {
        &self.sub_list
    }
    fn record(&self, id: u32) -> RecordInfo {
        self.records[id as usize]
    }
    fn is_collocation(&self, raw_pos: u16) -> bool {
        raw_pos == COLLOCATION_POS_V125
    }
    fn lattice_pos(&self, raw_pos: u16) -> u16 {
        if self.has_void && raw_pos == pos::DIC_VOID {
            pos::LOCAL_VOID
        } else {
            raw_pos
        }
    }
    fn next_id(&self, id: u32) -> u32 {
        id + 1
    }
}

impl Lexicon124 {
    fn parse(body: &[u8]) -> KotohaResult<Lexicon124> {
        let (rest, rec_count) = u32_le(body)?;
        let (rest, lst_count) = u32_le(rest)?;
        let (rest, da_count) = u32_le(rest)?;
        let (rest, remap) = u16s(rest, 0x10000)?;
        let (rest, cells) = u32s(rest, da_count as usize)?;
        let (rest, sub_list) = u32s(rest, lst_count as usize)?;
        let (_rest, records) = u32s(rest, rec_count as usize)?;

        Ok(Lexicon124 {
            remap,
            da: DoubleArray::Packed(cells),
            sub_list,
            cells: records,
        })
    }
}

impl Records for Lexicon124 {
    fn remap(&self) -> &[u16] {
        &self.remap
    }
    fn da(&self) -> &DoubleArray {
        &self.da
    }
    fn sub_list(&self) -> &[u32] {
        &self.sub_list
    }
    fn record(&self, id: u32) -> RecordInfo {
        // {pos:11, sub_flag:1, homographs:4, length:8, cost:8}, LSB first.
        let cell = self.cells[id as usize];
        let sub_flag = (cell >> 11) & 1 == 1;
        RecordInfo {
            homographs: ((cell >> 12) & 0xF) as u8,
            cost: (cell >> 24) as u8,
            pos: (cell & 0x7FF) as u16,
            length: ((cell >> 16) & 0xFF) as u8,
            sub_list: if sub_flag {
                self.cells[id as usize + 1]
            } else {
                NO_SUB_STRUCTURE
            },
        }
    }
    fn is_collocation(&self, raw_pos: u16) -> bool {
        raw_pos == COLLOCATION_POS_V124
    }
    fn lattice_pos(&self, raw_pos: u16) -> u16 {
        raw_pos
    }
    fn next_id(&self, id: u32) -> u32 {
        // A record with sub-structure is followed by its offset cell.
        let cell = self.cells[id as usize];
        if (cell >> 11) & 1 == 1 {
            id + 2
        } else {
            id + 1
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn search_impl<L: Records>(
    lex: &L,
    lat: &mut Lattice,
    conn: &ConnectionTable,
    dic_num: u8,
    dic_prio: u8,
    txt_pos: usize,
    ignore_cr: bool,
    max_word_len: u32,
) -> Lookup {
    let mut state = 0u32;
    let mut mor_len = 0usize;
    let mut count = 0usize;
    let mut converged = false;
    let mut nl_run = 0usize;

    let mut i = txt_pos;
    while i < lat.txt_len() && lat.text()[i] != 0 {
        let in_code = lex.remap()[lat.text()[i] as usize];
        match lex.da().step(state, in_code) {
            None => {
                // At most one embedded CR/LF run may be skipped to catch a
                // word broken across a line break.
                if ignore_cr && mor_len > 0 && nl_run < 1 {
                    if in_code == RET {
                        if i + 1 < lat.txt_len()
                            && lex.remap()[lat.text()[i + 1] as usize] == NWL
                        {
                            mor_len += 2;
                            nl_run += 1;
                            i += 2;
                            continue;
                        }
                        mor_len += 1;
                        nl_run += 1;
                        i += 1;
                        continue;
                    } else if in_code == NWL {
                        mor_len += 1;
                        nl_run += 1;
                        i += 1;
                        continue;
                    }
                }
                break;
            }
            Some(next) => {
                state = next;
                nl_run = 0;
                mor_len += 1;
            }
        }

        if mor_len as u32 > max_word_len {
            break;
        }

        if let Some(first_id) = lex.da().record(state) {
            let head = lex.record(first_id);
            let mut prio_flag = false;
            if lex.is_collocation(head.pos) {
                // The builder guarantees collocations have no homographs.
                debug_assert_eq!(head.homographs, 1);
                prio_flag = true;
                converged = true;
            }
            let mut id = first_id;
            for _ in 0..head.homographs {
                let rec = lex.record(id);
                let app_i = ((dic_num as u32) << 24) | id;
                let r = lat.insert(
                    conn,
                    txt_pos,
                    mor_len,
                    lex.lattice_pos(rec.pos),
                    rec.cost as u16,
                    app_i,
                    rec.sub_list,
                    dic_prio,
                    prio_flag,
                );
                count += 1;
                if r.is_err() {
                    return Lookup::Converged;
                }
                id = lex.next_id(id);
            }
        }

        i += 1;
    }

    if converged {
        Lookup::Converged
    } else {
        Lookup::Found(count)
    }
}

/// Reads the sub-structure run at `lst_no`: the first entry is the count,
/// followed by that many record ids.
fn expand_sub_list<L: Records>(
    lex: &L,
    dic_num: u32,
    lst_no: u32,
    out: &mut Vec<SubEdge>,
    limit: usize,
) -> KotohaResult<()> {
    debug_assert_ne!(lst_no, NO_SUB_STRUCTURE);
    let n = lex.sub_list()[lst_no as usize] as usize;
    for k in 1..=n {
        if out.len() >= limit {
            return Err(KotohaError::SubMorphemeBufferOverflow);
        }
        let id = lex.sub_list()[lst_no as usize + k];
        let rec = lex.record(id);
        out.push(SubEdge {
            pos: rec.pos,
            length: rec.length,
            cost: rec.cost as u16,
            app_i: (dic_num << 24) | id,
            sub_i: rec.sub_list,
        });
    }
    Ok(())
}

fn expand_priority_impl<L: Records>(
    lex: &L,
    lat: &mut Lattice,
    conn: &ConnectionTable,
    begin: usize,
) -> usize {
    let prio = lat.prio_edge();
    debug_assert_ne!(prio, 0);
    let dic_num = lat.edge(prio).app_i >> 24;
    let dic_prio = lat.edge(prio).dic_prio;
    let lst_no = lat.edge(prio).sub_i;

    let mut subs = Vec::new();
    let limit = EDGE_MAX - lat.start_edge() + 1;
    // On overflow the expansion keeps what fits; at least the first
    // sub-morpheme is always present.
    let _ = expand_sub_list(lex, dic_num, lst_no, &mut subs, limit);
    lat.expand_collocation(conn, begin, &subs, dic_prio)
}

fn sub_morphemes_impl<L: Records>(
    lex: &L,
    m: &Morpheme,
    out: &mut Vec<Morpheme>,
    limit: usize,
) -> KotohaResult<()> {
    let rec = lex.record(m.record_id());
    if rec.sub_list == NO_SUB_STRUCTURE {
        return Ok(());
    }
    let mut subs = Vec::new();
    expand_sub_list(lex, m.app_i >> 24, rec.sub_list, &mut subs, limit)?;
    let mut at = m.begin;
    for s in subs {
        out.push(Morpheme {
            begin: at,
            length: s.length as u16,
            pos: s.pos,
            app_i: s.app_i,
            sub_i: s.sub_i,
            cost: s.cost,
        });
        at += s.length as usize;
    }
    Ok(())
}
