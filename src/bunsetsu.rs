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

//! Bunsetsu segmentation and dependency assignment.
//!
//! Segmentation walks the morpheme stream and opens a new phrase wherever
//! the grammar table flags a boundary between two compressed POS; a
//! period always closes the phrase run. Dependencies are the minimum-cost
//! cross-free assignment, computed bottom-up over span length on a
//! triangular cost table.

use crate::analysis::morpheme::Morpheme;
use crate::dic::grammar::GrammarTable;
use crate::error::{KotohaError, KotohaResult};
use crate::pos;

/// Maximum number of phrases per dependency analysis.
pub const LOCAL_PHRASE_SIZE: usize = 128;

/// Dependency-relation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DependencyRelation {
    Nothing = 0,
    Compound = 1,
    ParallelStrong = 2,
    ParallelWeak = 3,
    ContinuousStrong = 4,
    ContinuousWeak = 5,
    AttributiveStrong = 6,
    AttributiveWeak = 7,
    ConnectiveStrong = 8,
    ConnectiveWeak = 9,
    Bracket = 10,
    Isolated = 11,
}

impl DependencyRelation {
    pub fn from_raw(v: u8) -> DependencyRelation {
        use DependencyRelation::*;
        match v {
            1 => Compound,
            2 => ParallelStrong,
            3 => ParallelWeak,
            4 => ContinuousStrong,
            5 => ContinuousWeak,
            6 => AttributiveStrong,
            7 => AttributiveWeak,
            8 => ConnectiveStrong,
            9 => ConnectiveWeak,
            10 => Bracket,
            11 => Isolated,
            _ => Nothing,
        }
    }
}

/// One phrase: a run of morphemes plus its dependency target.
#[derive(Debug, Clone, Copy)]
pub struct Phrase {
    /// Index of the first morpheme, into the analysis' morpheme list.
    pub first: usize,
    /// Number of morphemes.
    pub len: usize,
    /// Index of the governed-by phrase; the last phrase points to itself.
    pub target: usize,
    pub relation: DependencyRelation,
}

/// Work buffers of the dependency DP, reused across calls.
pub struct DepScratch {
    cost: Vec<i32>,
    pattern: Vec<u8>,
    stack: Vec<i32>,
}

impl Default for DepScratch {
    fn default() -> Self {
        DepScratch {
            cost: vec![0; LOCAL_PHRASE_SIZE * LOCAL_PHRASE_SIZE],
            pattern: vec![0; LOCAL_PHRASE_SIZE * LOCAL_PHRASE_SIZE],
            stack: vec![0; LOCAL_PHRASE_SIZE],
        }
    }
}

fn compressed(gram: &GrammarTable, p: u16) -> KotohaResult<i16> {
    let c = gram.compressed_pos(p)?;
    if c < 0 {
        return Err(KotohaError::InvalidPos(p));
    }
    Ok(c)
}

/// Extends `phrases` with the morphemes `morphs[new_start..]`.
///
/// An existing phrase list is continued: the last phrase stays open and
/// accumulates until the next boundary. Generation stops at a period,
/// when [`LOCAL_PHRASE_SIZE`] phrases exist, or when the morphemes run
/// out; the number of morphemes consumed is returned. Without a grammar
/// table every morpheme becomes its own phrase.
pub fn generate(
    gram: Option<&GrammarTable>,
    phrases: &mut Vec<Phrase>,
    limit: usize,
    morphs: &[Morpheme],
    new_start: usize,
) -> KotohaResult<usize> {
    let gram = match gram {
        Some(g) => g,
        None => {
            let mut consumed = 0;
            for i in new_start..morphs.len() {
                if phrases.len() >= LOCAL_PHRASE_SIZE.min(limit) {
                    break;
                }
                phrases.push(Phrase {
                    first: i,
                    len: 1,
                    target: 0,
                    relation: DependencyRelation::Nothing,
                });
                consumed += 1;
            }
            return Ok(consumed);
        }
    };

    if limit <= phrases.len() {
        return Ok(0);
    }
    if new_start >= morphs.len() {
        return Ok(0);
    }

    let mut left;
    if phrases.is_empty() {
        phrases.push(Phrase {
            first: new_start,
            len: 0,
            target: 0,
            relation: DependencyRelation::Nothing,
        });
        left = 0i16; // no previous morpheme
    } else {
        let open = phrases.last().unwrap();
        let tail = &morphs[open.first + open.len - 1];
        // Nothing continues past a period.
        if tail.pos == pos::PERIOD {
            return Ok(0);
        }
        left = compressed(gram, tail.pos)?;
    }

    let mut read = new_start;
    while read < morphs.len() {
        let m = &morphs[read];
        let right = compressed(gram, m.pos)?;

        if m.pos == pos::PERIOD {
            read += 1;
            break;
        }

        // The very first morpheme of a fresh run has no left neighbor to
        // break against.
        let has_left = read > new_start || phrases.last().map(|p| p.len > 0).unwrap_or(false);
        if has_left && gram.is_break(left, right) {
            let open = phrases.last_mut().unwrap();
            open.len = read - open.first;
            if phrases.len() >= LOCAL_PHRASE_SIZE {
                break;
            }
            if phrases.len() >= limit {
                return Err(KotohaError::PhraseBufferOverflow);
            }
            phrases.push(Phrase {
                first: read,
                len: 0,
                target: 0,
                relation: DependencyRelation::Nothing,
            });
        }

        left = right;
        read += 1;
    }

    let open = phrases.last_mut().unwrap();
    open.len = read - open.first;
    Ok(read - new_start)
}

/// Assigns the minimum-cost cross-free dependencies over `phrases`.
/// Without a grammar table every phrase simply points at its neighbor.
pub fn analyze(
    gram: Option<&GrammarTable>,
    phrases: &mut [Phrase],
    morphs: &[Morpheme],
    scratch: &mut DepScratch,
) -> KotohaResult<()> {
    let n = phrases.len();
    if n == 0 {
        return Ok(());
    }
    let gram = match gram {
        Some(g) => g,
        None => {
            for (i, p) in phrases.iter_mut().enumerate() {
                p.relation = DependencyRelation::Nothing;
                p.target = i + 1;
            }
            phrases[n - 1].target = n - 1;
            return Ok(());
        }
    };
    debug_assert!(n <= LOCAL_PHRASE_SIZE);

    init_pair_costs(gram, phrases, morphs, scratch)?;
    search_splits(scratch, n);
    assign_targets(gram, phrases, morphs, scratch)?;
    Ok(())
}

/// Kakari attribute of a phrase: the bigram of its last two morphemes.
fn kakari_attr_of(
    gram: &GrammarTable,
    phrase: &Phrase,
    morphs: &[Morpheme],
) -> KotohaResult<u8> {
    let h1 = if phrase.len > 1 {
        compressed(gram, morphs[phrase.first + phrase.len - 2].pos)?
    } else {
        0
    };
    let h2 = compressed(gram, morphs[phrase.first + phrase.len - 1].pos)?;
    Ok(gram.kakari_attr(h1, h2))
}

/// Uke attribute of a phrase: the bigram of its first two morphemes.
fn uke_attr_of(gram: &GrammarTable, phrase: &Phrase, morphs: &[Morpheme]) -> KotohaResult<u8> {
    let h3 = compressed(gram, morphs[phrase.first].pos)?;
    let h4 = if phrase.len > 1 {
        compressed(gram, morphs[phrase.first + 1].pos)?
    } else {
        0
    };
    Ok(gram.uke_attr(h3, h4))
}

fn init_pair_costs(
    gram: &GrammarTable,
    phrases: &[Phrase],
    morphs: &[Morpheme],
    scratch: &mut DepScratch,
) -> KotohaResult<()> {
    let n = phrases.len();
    for k in 0..n {
        let kg = kakari_attr_of(gram, &phrases[k], morphs)?;
        for u in k + 1..n {
            let ug = uke_attr_of(gram, &phrases[u], morphs)?;
            let rule = gram.rule(kg, ug);
            let cost = gram.relation_cost(kg, ug) + gram.distance_cost(rule, u - k);
            scratch.cost[k * LOCAL_PHRASE_SIZE + u] = cost;
            scratch.pattern[k * LOCAL_PHRASE_SIZE + u] = (u - k) as u8;
        }
    }
    Ok(())
}

/// Bottom-up over span length: for each span, the best internal split is
/// kept and its cost folded into the enclosing span.
fn search_splits(scratch: &mut DepScratch, n: usize) {
    for span in 1..n {
        for s in 0..n - span {
            let e = s + span;
            let mut best_split = span;
            let mut best_cost = scratch.cost[s * LOCAL_PHRASE_SIZE + e];
            for t in 1..span {
                let c = scratch.cost[s * LOCAL_PHRASE_SIZE + s + t]
                    + scratch.cost[(s + t) * LOCAL_PHRASE_SIZE + e];
                if c < best_cost {
                    best_cost = c;
                    best_split = t;
                }
            }
            scratch.cost[s * LOCAL_PHRASE_SIZE + e] = best_cost;
            scratch.pattern[s * LOCAL_PHRASE_SIZE + e] = best_split as u8;
            if s > 0 {
                scratch.cost[(s - 1) * LOCAL_PHRASE_SIZE + e] += best_cost;
            }
        }
    }
}

/// Walks the winning split pattern, recording each phrase's target and
/// relation. A small stack carries the remaining span widths.
fn assign_targets(
    gram: &GrammarTable,
    phrases: &mut [Phrase],
    morphs: &[Morpheme],
    scratch: &mut DepScratch,
) -> KotohaResult<()> {
    let n = phrases.len();
    let mut span = (n - 1) as i32;
    scratch.stack[0] = 0;
    let mut sp = 1usize;

    for k in 0..n - 1 {
        let step = scratch.pattern[k * LOCAL_PHRASE_SIZE + k + span as usize] as i32;
        let u = k + step as usize;
        phrases[k].target = u;

        let kg = kakari_attr_of(gram, &phrases[k], morphs)?;
        let ug = uke_attr_of(gram, &phrases[u], morphs)?;
        phrases[k].relation = DependencyRelation::from_raw(gram.rule(kg, ug));

        if span - step > 0 {
            scratch.stack[sp] = span - step;
            sp += 1;
        }
        span = step - 1;
        if span <= 0 {
            sp -= 1;
            // Every non-final phrase has a non-crossing target, so the
            // stack never underflows.
            span = scratch.stack[sp];
        }
    }

    phrases[n - 1].relation = DependencyRelation::Nothing;
    phrases[n - 1].target = n - 1;
    Ok(())
}
