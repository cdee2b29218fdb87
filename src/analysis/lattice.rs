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

//! Morpheme lattice for the Viterbi search.
//!
//! Edges live in a fixed arena of 256 slots (slot 0 is the virtual root).
//! `end_index[p]` heads a chain, through `older_sibling`, of every edge
//! whose surface ends at text position `p`; the tail of a chain points to
//! itself. `parent` is the minimum-cost back-pointer. The arena never
//! reallocates, so an analysis that would need a 256th edge converges
//! early instead.

use std::io::Write;

use crate::analysis::morpheme::Morpheme;
use crate::dic::connect::ConnectionTable;
use crate::error::{KotohaError, KotohaResult};
use crate::pos;

/// Maximum number of real edges; slot count minus the root.
pub const EDGE_MAX: usize = 255;
/// Maximum number of characters analyzed in one segment.
pub const LOCAL_TEXT_SIZE: usize = 255;
/// Maximum surface length of a single morpheme, in characters.
pub const SURFACE_LEN_MAX: usize = 255;
/// Priority given to candidate detectors so they are always registered.
pub const DETECTOR_PRIO: u8 = 255;

const NO_EDGE: u8 = EDGE_MAX as u8;
const MAX_ACCUM_COST: u32 = u32::MAX;

/// The edge arena is exhausted; the caller must force convergence.
#[derive(Debug, PartialEq, Eq)]
pub struct LatticeFull;

/// Outcome of consulting one candidate source at one position.
#[derive(Debug)]
pub enum Lookup {
    /// Number of candidates inserted.
    Found(usize),
    /// The source forced convergence (collocation or arena overflow).
    Converged,
}

#[derive(Clone, Copy)]
pub struct Edge {
    pub begin: i16,
    pub pos: u16,
    pub type_pos: u16,
    pub accum_cost: u32,
    pub length: u8,
    pub cost: u16,
    pub parent: u8,
    pub older_sibling: u8,
    pub app_i: u32,
    pub sub_i: u32,
    pub dic_prio: u8,
}

impl Edge {
    const fn empty() -> Edge {
        Edge {
            begin: 0,
            pos: 0,
            type_pos: 0,
            accum_cost: 0,
            length: 0,
            cost: 0,
            parent: 0,
            older_sibling: 0,
            app_i: 0,
            sub_i: 0,
            dic_prio: 0,
        }
    }
}

/// Values of one sub-morpheme expanded from a collocation record.
#[derive(Clone, Copy)]
pub struct SubEdge {
    pub pos: u16,
    pub length: u8,
    pub cost: u16,
    pub app_i: u32,
    pub sub_i: u32,
}

pub struct Lattice {
    edges: Vec<Edge>,
    text: Vec<u16>,
    txt_len: usize,
    lattice_end: usize,
    end_index: [u8; LOCAL_TEXT_SIZE + 2],
    morph_check: [bool; SURFACE_LEN_MAX + 1],
    cur_edge: usize,
    start_edge: usize,
    prio_edge: usize,
}

impl Default for Lattice {
    fn default() -> Self {
        Lattice {
            edges: vec![Edge::empty(); EDGE_MAX + 1],
            text: Vec::with_capacity(LOCAL_TEXT_SIZE),
            txt_len: 0,
            lattice_end: 0,
            end_index: [NO_EDGE; LOCAL_TEXT_SIZE + 2],
            morph_check: [false; SURFACE_LEN_MAX + 1],
            cur_edge: 0,
            start_edge: 0,
            prio_edge: 0,
        }
    }
}

impl Lattice {
    /// Prepare for the next segment: clears index state touched by the
    /// previous analysis, installs the root edge carrying the POS that
    /// precedes this segment, and copies in the text.
    ///
    /// At most [`LOCAL_TEXT_SIZE`] characters are taken; when that cut
    /// would split a surrogate pair, one character less is taken.
    pub fn clear(&mut self, conn: &ConnectionTable, root_pos: u16, input: &[u16]) {
        debug_assert!(self.lattice_end <= LOCAL_TEXT_SIZE + 1);
        for slot in self.end_index[..=self.lattice_end].iter_mut() {
            *slot = NO_EDGE;
        }

        let root_type = if (root_pos as u32) < conn.pos_max() {
            conn.type_pos(root_pos)
        } else {
            0
        };
        self.edges[0] = Edge {
            begin: 0,
            pos: root_pos,
            type_pos: root_type,
            accum_cost: 0,
            parent: NO_EDGE,
            older_sibling: 0,
            ..Edge::empty()
        };

        let mut take = input.len().min(LOCAL_TEXT_SIZE);
        if input.len() > LOCAL_TEXT_SIZE
            && (0xD800..=0xDBFF).contains(&input[LOCAL_TEXT_SIZE - 1])
            && (0xDC00..=0xDFFF).contains(&input[LOCAL_TEXT_SIZE])
        {
            take = LOCAL_TEXT_SIZE - 1;
        }
        self.text.clear();
        self.text.extend_from_slice(&input[..take]);
        self.txt_len = take;

        self.lattice_end = 0;
        self.cur_edge = 0;
        self.end_index[0] = 0;
    }

    /// Appends one candidate edge ending at `begin + length`.
    ///
    /// The edge is dropped silently when a same-start candidate of a
    /// strictly higher dictionary priority with the same coarse type-POS
    /// group already ends there. Returns `Err(LatticeFull)` when the arena
    /// is exhausted after registration; the caller treats that as forced
    /// convergence.
    #[allow(clippy::too_many_arguments)]
    pub fn insert(
        &mut self,
        conn: &ConnectionTable,
        begin: usize,
        length: usize,
        pos: u16,
        cost: u16,
        app_i: u32,
        sub_i: u32,
        dic_prio: u8,
        prio_flag: bool,
    ) -> Result<(), LatticeFull> {
        // Void words never participate in cost minimization.
        let cost = if pos == pos::LOCAL_VOID { 0 } else { cost };
        let type_pos = if (pos as u32) < conn.pos_max() {
            conn.type_pos(pos)
        } else {
            0
        };

        let end = begin + length;
        debug_assert!(end <= LOCAL_TEXT_SIZE + 1);

        let brother;
        if self.end_index[end] == NO_EDGE {
            self.cur_edge += 1;
            debug_assert!(self.cur_edge <= EDGE_MAX);
            brother = self.cur_edge;
        } else {
            let head = self.end_index[end] as usize;
            let mut n = head;
            loop {
                let e = &self.edges[n];
                if e.begin as usize == begin
                    && e.dic_prio > dic_prio
                    && (e.type_pos & pos::TYPE_POS_GROUP_MASK)
                        == (type_pos & pos::TYPE_POS_GROUP_MASK)
                {
                    // A higher-priority dictionary already produced this
                    // homograph group here.
                    return Ok(());
                }
                let older = e.older_sibling as usize;
                if older == n {
                    break;
                }
                n = older;
            }
            self.cur_edge += 1;
            debug_assert!(self.cur_edge <= EDGE_MAX);
            brother = head;
        }

        self.edges[self.cur_edge] = Edge {
            begin: begin as i16,
            pos,
            type_pos,
            accum_cost: MAX_ACCUM_COST,
            length: length as u8,
            cost,
            parent: self.cur_edge as u8,
            older_sibling: brother as u8,
            app_i,
            sub_i,
            dic_prio,
        };

        self.end_index[end] = self.cur_edge as u8;
        if end > self.lattice_end {
            self.lattice_end = end;
        }

        // Record the surface length so the unknown-word detector can skip
        // same-length duplicates. Void words stay unrecorded, letting an
        // unknown word of the same surface through.
        if pos != pos::LOCAL_VOID {
            self.morph_check[length] = true;
        }

        if prio_flag {
            self.prio_edge = self.cur_edge;
        }

        // One slot stays reserved for the virtual sentence end forced on
        // overflow.
        if self.cur_edge >= EDGE_MAX - 1 {
            self.reset_end(end);
            return Err(LatticeFull);
        }

        Ok(())
    }

    /// Viterbi step: for every edge in `start_pos..=end_pos` (all starting
    /// at text position `begin`), picks the minimum-cost predecessor among
    /// the edges ending at `begin` and adds the edge's own cost.
    pub fn link_with_parent(
        &mut self,
        conn: &ConnectionTable,
        begin: usize,
        start_pos: usize,
        end_pos: usize,
    ) {
        debug_assert!(begin <= LOCAL_TEXT_SIZE);
        for i in start_pos..=end_pos {
            if self.edges[i].pos == pos::LOCAL_VOID {
                // Void edges are isolated.
                self.edges[i].accum_cost = 0;
                self.edges[i].parent = i as u8;
                continue;
            }
            let uke = conn.uke_code_of(self.edges[i].pos);
            let mut n = self.end_index[begin] as usize;
            debug_assert!(n != NO_EDGE as usize);
            loop {
                let older = self.edges[n].older_sibling as usize;
                if self.edges[n].pos != pos::LOCAL_VOID {
                    let con = conn.cost_for_uke_code(self.edges[n].pos, uke) as u32;
                    let accum = self.edges[n].accum_cost + con;
                    if self.edges[i].accum_cost >= accum {
                        self.edges[i].parent = n as u8;
                        self.edges[i].accum_cost = accum;
                    }
                }
                if older == n {
                    break;
                }
                n = older;
            }
            self.edges[i].accum_cost += self.edges[i].cost as u32;
        }
    }

    /// Replaces the pending collocation edge by the chain of its
    /// sub-morphemes, starting at the position's first edge slot. Only the
    /// first expanded edge is parent-linked by cost; the rest inherit its
    /// cumulative cost and chain onto their left neighbor. Returns the end
    /// position of the last expanded edge, which becomes the new lattice
    /// end.
    pub fn expand_collocation(
        &mut self,
        conn: &ConnectionTable,
        begin: usize,
        subs: &[SubEdge],
        dic_prio: u8,
    ) -> usize {
        debug_assert!(self.prio_edge != 0);
        debug_assert!(!subs.is_empty());

        let first = self.start_edge;
        let mut at = begin;
        for (k, sub) in subs.iter().enumerate() {
            let type_pos = if (sub.pos as u32) < conn.pos_max() {
                conn.type_pos(sub.pos)
            } else {
                0
            };
            self.edges[first + k] = Edge {
                begin: at as i16,
                pos: sub.pos,
                type_pos,
                accum_cost: MAX_ACCUM_COST,
                length: sub.length,
                cost: sub.cost,
                parent: (first + k) as u8,
                older_sibling: 0,
                app_i: sub.app_i,
                sub_i: sub.sub_i,
                dic_prio,
            };
            at += sub.length as usize;
        }
        self.cur_edge = first + subs.len() - 1;

        self.link_with_parent(conn, begin, first, first);
        for i in first + 1..=self.cur_edge {
            self.edges[i].parent = (i - 1) as u8;
            self.edges[i].accum_cost = self.edges[i - 1].accum_cost;
        }

        self.reset_end(at);
        at
    }

    /// Rewinds `lattice_end` to `end`, clearing the part of the end index
    /// that stuck out. Needed after an overflow or a collocation expansion
    /// picked a path shorter than the furthest registered edge.
    pub fn reset_end(&mut self, end: usize) {
        debug_assert!(self.lattice_end >= end);
        debug_assert!(end <= LOCAL_TEXT_SIZE + 1);
        if self.lattice_end == end {
            return;
        }
        for slot in self.end_index[end + 1..=self.lattice_end].iter_mut() {
            *slot = NO_EDGE;
        }
        self.lattice_end = end;
    }

    /// Extracts the optimal path ending at the most recent edge, appending
    /// its morphemes to `out`. Fails without writing when the path does
    /// not fit into `limit` more elements.
    pub fn extract_path(&self, out: &mut Vec<Morpheme>, limit: usize) -> KotohaResult<usize> {
        let mut len = 0usize;
        let mut i = self.cur_edge;
        loop {
            len += 1;
            // Non-void parents are strictly earlier in the arena, so the
            // walk terminates within the arena size.
            debug_assert!(len <= EDGE_MAX + 1);
            i = self.edges[i].parent as usize;
            if i == 0 {
                break;
            }
        }
        if len >= limit {
            return Err(KotohaError::MorphemeBufferOverflow);
        }

        let at = out.len();
        out.resize(
            at + len,
            Morpheme {
                begin: 0,
                length: 0,
                pos: 0,
                app_i: 0,
                sub_i: 0,
                cost: 0,
            },
        );
        let mut i = self.cur_edge;
        for slot in (at..at + len).rev() {
            let e = &self.edges[i];
            out[slot] = Morpheme {
                begin: e.begin as usize,
                length: e.length as u16,
                pos: e.pos,
                app_i: e.app_i,
                sub_i: e.sub_i,
                cost: e.cost,
            };
            i = e.parent as usize;
        }
        Ok(len)
    }

    /// Clears the per-position same-length bookkeeping.
    pub fn clear_morph_check(&mut self) {
        for f in self.morph_check.iter_mut() {
            *f = false;
        }
    }

    /// True when a registered word of `length` characters was inserted at
    /// the current start position.
    #[inline]
    pub fn morph_check(&self, length: usize) -> bool {
        self.morph_check[length]
    }

    /// True when some edge ends exactly at text position `p`.
    #[inline]
    pub fn has_edge_ending_at(&self, p: usize) -> bool {
        self.end_index[p] != NO_EDGE
    }

    /// Marks where this position's edges start in the arena and forgets
    /// any pending priority edge.
    pub fn begin_position(&mut self) {
        self.start_edge = self.cur_edge + 1;
        self.prio_edge = 0;
    }

    #[inline]
    pub fn text(&self) -> &[u16] {
        &self.text
    }

    #[inline]
    pub fn txt_len(&self) -> usize {
        self.txt_len
    }

    #[inline]
    pub fn lattice_end(&self) -> usize {
        self.lattice_end
    }

    #[inline]
    pub fn cur_edge(&self) -> usize {
        self.cur_edge
    }

    #[inline]
    pub fn start_edge(&self) -> usize {
        self.start_edge
    }

    #[inline]
    pub fn prio_edge(&self) -> usize {
        self.prio_edge
    }

    #[inline]
    pub fn edge(&self, i: usize) -> &Edge {
        &self.edges[i]
    }

    /// Dumps the arena for debugging.
    pub fn dump<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for i in 0..=self.cur_edge {
            let e = &self.edges[i];
            writeln!(
                out,
                "[{}] {}+{} pos={} type={:#06x} cost={} accum={} parent=[{}] sibling=[{}] \
                 app={:#x} sub={:#x} prio={}",
                i,
                e.begin,
                e.length,
                e.pos,
                e.type_pos,
                e.cost,
                e.accum_cost,
                e.parent,
                e.older_sibling,
                e.app_i,
                e.sub_i,
                e.dic_prio
            )?;
        }
        writeln!(
            out,
            "lattice_end = {}, cur_edge = {}",
            self.lattice_end, self.cur_edge
        )
    }
}
