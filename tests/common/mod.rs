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

//! In-memory resource images for the integration tests: a minimal stand-in
//! for the offline build tools.

#![allow(dead_code)]

use std::collections::BTreeMap;

pub const COMMENT_SIZE: usize = 48;

pub const WORD_DIC_V125_VOID: &[u8; 16] = b"WRD V1.25V-    \0";
pub const WORD_DIC_V125: &[u8; 16] = b"WRD V1.25-     \0";
pub const WORD_DIC_V124: &[u8; 16] = b"WRD V1.24-     \0";
pub const APP_DIC_V123: &[u8; 16] = b"WRD APP V1.23- \0";
pub const CONNECT_V116: &[u8; 16] = b"CON V1.16-     \0";
pub const GRAMMAR_V111: &[u8; 16] = b"GRM V1.11-     \0";
pub const ENGLISH_V108: &[u8; 16] = b"EMK V1.08-     \0";
pub const UNKNOWN_V101: &[u8; 16] = b"UMK V1.01-     \0";
pub const UNKNOWN_COST_V102: &[u8; 16] = b"UC V1.02-      \0";
pub const NORMALIZE_V101: &[u8; 16] = b"STD V1.01-     \0";

pub fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn header(tag: &[u8; 16]) -> Vec<u8> {
    let mut img = vec![b' '; COMMENT_SIZE];
    img.extend_from_slice(tag);
    img
}

/// Connection table: identity kakari/uke codes, uniform connection cost 1,
/// type-POS derived from the POS number so that distinct POS land in
/// distinct coarse groups.
pub fn connection_image(pos_max: u16) -> Vec<u8> {
    let mut img = header(CONNECT_V116);
    img.extend_from_slice(&(pos_max as u32).to_le_bytes());
    for p in 0..pos_max {
        img.extend_from_slice(&((p & 0xF) << 12).to_le_bytes());
    }
    img.extend_from_slice(&(pos_max as u32).to_le_bytes());
    img.extend_from_slice(&(pos_max as u32).to_le_bytes());
    for p in 0..pos_max {
        img.extend_from_slice(&p.to_le_bytes());
    }
    for p in 0..pos_max {
        img.extend_from_slice(&p.to_le_bytes());
    }
    img.extend(std::iter::repeat(1u8).take(pos_max as usize * pos_max as usize));
    for _ in 0..pos_max {
        img.extend_from_slice(&0u32.to_le_bytes());
    }
    img.extend_from_slice(&0u16.to_le_bytes());
    img
}

/// Legacy V1.15 connection table: no code arrays, POS numbers index the
/// cost matrix directly.
pub fn connection_image_v115(pos_max: u16) -> Vec<u8> {
    let mut img = header(b"CON V1.15-     \0");
    img.extend_from_slice(&(pos_max as u32).to_le_bytes());
    for p in 0..pos_max {
        img.extend_from_slice(&((p & 0xF) << 12).to_le_bytes());
    }
    img.extend(std::iter::repeat(1u8).take(pos_max as usize * pos_max as usize));
    for _ in 0..pos_max {
        img.extend_from_slice(&0u32.to_le_bytes());
    }
    img.extend_from_slice(&0u16.to_le_bytes());
    img
}

/// One word-dictionary entry. Homographs must be consecutive.
pub struct WordEntry {
    pub surface: String,
    pub pos: u16,
    pub cost: u8,
    /// Entry indices of the sub-morphemes of a compound or collocation.
    pub subs: Vec<usize>,
}

impl WordEntry {
    pub fn new(surface: &str, pos: u16, cost: u8) -> WordEntry {
        WordEntry {
            surface: surface.to_string(),
            pos,
            cost,
            subs: Vec::new(),
        }
    }

    pub fn with_subs(surface: &str, pos: u16, cost: u8, subs: &[usize]) -> WordEntry {
        WordEntry {
            surface: surface.to_string(),
            pos,
            cost,
            subs: subs.to_vec(),
        }
    }
}

#[derive(Default)]
struct TrieNode {
    children: BTreeMap<u16, usize>,
    accept: Option<u32>,
}

struct BuiltTrie {
    remap: Vec<u16>,
    base: Vec<u32>,
    label: Vec<u16>,
}

const UNMAPPED: u16 = 0x3FFF;
const FREE_LABEL: u16 = 0x1FFD;

/// Builds a double array over the surfaces; line-break characters keep
/// their own internal codes so ignore-line-break lookups work.
fn build_trie(entries: &[WordEntry]) -> BuiltTrie {
    let mut remap = vec![UNMAPPED; 0x10000];
    remap[0x0D] = 0x0D;
    remap[0x0A] = 0x0A;
    let mut next_code = 0x20u16;

    let mut nodes: Vec<TrieNode> = vec![TrieNode::default()];
    for (id, e) in entries.iter().enumerate() {
        let mut n = 0usize;
        for c in e.surface.encode_utf16() {
            if remap[c as usize] == UNMAPPED {
                remap[c as usize] = next_code;
                next_code += 1;
            }
            let code = remap[c as usize];
            n = match nodes[n].children.get(&code).copied() {
                Some(next) => next,
                None => {
                    nodes.push(TrieNode::default());
                    let k = nodes.len() - 1;
                    nodes[n].children.insert(code, k);
                    k
                }
            };
        }
        // The first entry of a homograph run owns the accept cell.
        if nodes[n].accept.is_none() {
            nodes[n].accept = Some(id as u32);
        }
    }

    // Breadth-first address assignment: every node claims its own identity
    // cell plus one cell per outgoing code.
    let mut order = vec![0usize];
    let mut head = 0;
    while head < order.len() {
        let n = order[head];
        head += 1;
        for &child in nodes[n].children.values() {
            order.push(child);
        }
    }

    let mut used: Vec<bool> = Vec::new();
    let mut addr = vec![0usize; nodes.len()];
    for &n in &order {
        let offsets: Vec<usize> = std::iter::once(0)
            .chain(nodes[n].children.keys().map(|&c| c as usize))
            .collect();
        let mut b = if n == 0 { 0 } else { 1 };
        loop {
            let fits = offsets.iter().all(|&o| !used.get(b + o).copied().unwrap_or(false));
            if fits {
                break;
            }
            assert_ne!(n, 0, "root must allocate at base 0");
            b += 1;
        }
        for &o in &offsets {
            if b + o >= used.len() {
                used.resize(b + o + 1, false);
            }
            used[b + o] = true;
        }
        addr[n] = b;
    }

    let size = used.len() + next_code as usize;
    let mut base = vec![0u32; size];
    let mut label = vec![FREE_LABEL; size];
    for (n, node) in nodes.iter().enumerate() {
        let b = addr[n];
        if let Some(rec) = node.accept {
            label[b] = 0;
            base[b] = rec;
        }
        for (&c, &child) in &node.children {
            label[b + c as usize] = c;
            base[b + c as usize] = addr[child] as u32;
        }
    }

    BuiltTrie { remap, base, label }
}

fn homograph_counts(entries: &[WordEntry]) -> Vec<u8> {
    let mut counts = vec![0u8; entries.len()];
    let mut i = 0;
    while i < entries.len() {
        let mut j = i + 1;
        while j < entries.len() && entries[j].surface == entries[i].surface {
            j += 1;
        }
        counts[i] = (j - i) as u8;
        i = j;
    }
    counts
}

fn sub_lists(entries: &[WordEntry]) -> (Vec<u32>, Vec<u32>) {
    let mut pool: Vec<u32> = vec![0]; // offset 0 stays unused
    let mut offsets = vec![0x00FF_FFFFu32; entries.len()];
    for (i, e) in entries.iter().enumerate() {
        if e.subs.is_empty() {
            continue;
        }
        offsets[i] = pool.len() as u32;
        pool.push(e.subs.len() as u32);
        for &s in &e.subs {
            pool.push(s as u32);
        }
    }
    (pool, offsets)
}

/// Serializes a V1.25 word dictionary.
pub fn word_dic_v125(entries: &[WordEntry], has_void: bool) -> Vec<u8> {
    let trie = build_trie(entries);
    let counts = homograph_counts(entries);
    let (pool, offsets) = sub_lists(entries);

    let mut img = header(if has_void {
        WORD_DIC_V125_VOID
    } else {
        WORD_DIC_V125
    });
    img.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    img.extend_from_slice(&(pool.len() as u32).to_le_bytes());
    img.extend_from_slice(&(trie.base.len() as u32).to_le_bytes());
    for c in &trie.remap {
        img.extend_from_slice(&c.to_le_bytes());
    }
    for b in &trie.base {
        img.extend_from_slice(&b.to_le_bytes());
    }
    for l in &trie.label {
        img.extend_from_slice(&l.to_le_bytes());
    }
    for s in &pool {
        img.extend_from_slice(&s.to_le_bytes());
    }
    for (i, e) in entries.iter().enumerate() {
        img.push(counts[i]);
        img.push(e.cost);
        img.extend_from_slice(&e.pos.to_le_bytes());
        let len = e.surface.encode_utf16().count() as u32;
        img.extend_from_slice(&(len | (offsets[i] << 8)).to_le_bytes());
    }
    img
}

/// Serializes a V1.24 compact word dictionary (entries without
/// sub-structure only, so record ids equal entry indices).
pub fn word_dic_v124(entries: &[WordEntry]) -> Vec<u8> {
    assert!(entries.iter().all(|e| e.subs.is_empty()));
    let trie = build_trie(entries);
    let counts = homograph_counts(entries);

    let mut img = header(WORD_DIC_V124);
    img.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    img.extend_from_slice(&1u32.to_le_bytes()); // unused sub-list slot
    img.extend_from_slice(&(trie.base.len() as u32).to_le_bytes());
    for c in &trie.remap {
        img.extend_from_slice(&c.to_le_bytes());
    }
    for (b, l) in trie.base.iter().zip(trie.label.iter()) {
        assert!(*b < (1 << 19) && *l < (1 << 13));
        let cell = *b | ((*l as u32) << 19);
        img.extend_from_slice(&cell.to_le_bytes());
    }
    img.extend_from_slice(&0u32.to_le_bytes()); // sub list
    for (i, e) in entries.iter().enumerate() {
        assert!(e.pos < 0x7FF);
        let len = e.surface.encode_utf16().count() as u32;
        let cell = (e.pos as u32)
            | ((counts[i] as u32) << 12)
            | (len << 16)
            | ((e.cost as u32) << 24);
        img.extend_from_slice(&cell.to_le_bytes());
    }
    img
}

/// Application dictionary parallel to a word dictionary.
pub fn app_dic(payloads: &[&[u8]]) -> Vec<u8> {
    let mut img = header(APP_DIC_V123);
    img.extend_from_slice(&(payloads.len() as u32).to_le_bytes());
    let mut offset = 0u32;
    for p in payloads {
        img.extend_from_slice(&offset.to_le_bytes());
        offset += 4 + p.len() as u32;
    }
    for p in payloads {
        img.extend_from_slice(&(p.len() as i32).to_le_bytes());
        img.extend_from_slice(p);
    }
    img
}

/// Unknown-word class table over the usual scripts plus the matching cost
/// table with one uniform cost.
pub fn unknown_images(default_cost: u16) -> (Vec<u8>, Vec<u8>) {
    let mut classes = vec![6u8; 0x10000]; // sign
    for c in '0' as usize..='9' as usize {
        classes[c] = 2;
    }
    for c in 'A' as usize..='Z' as usize {
        classes[c] = 3;
    }
    for c in 'a' as usize..='z' as usize {
        classes[c] = 4;
    }
    for c in 0x30A1..=0x30FA {
        classes[c] = 5; // katakana
    }
    for c in 0x3041..=0x3096 {
        classes[c] = 7; // hiragana (one representative class)
    }
    for c in 0x4E00..=0x9FFF {
        classes[c] = 1; // kanji
    }
    classes[0x3005] = 98;
    classes[0x30FC] = 98;

    let mut class_img = header(UNKNOWN_V101);
    class_img.extend_from_slice(&classes);

    let mut cost_img = header(UNKNOWN_COST_V102);
    for _ in 0..13 * 255 {
        cost_img.extend_from_slice(&default_cost.to_le_bytes());
    }
    (class_img, cost_img)
}

/// English character-class table with the standard cost row.
pub fn english_image() -> Vec<u8> {
    let mut classes = vec![0u8; 0x10000];
    for c in b'0'..=b'9' {
        classes[c as usize] = 1;
    }
    for c in b'A'..=b'Z' {
        classes[c as usize] = match c {
            b'A' | b'E' | b'I' | b'O' | b'U' => 2,
            b'Y' => 4,
            _ => 3,
        };
    }
    for c in b'a'..=b'z' {
        classes[c as usize] = match c {
            b'a' | b'e' | b'i' | b'o' | b'u' => 5,
            b'y' => 7,
            _ => 6,
        };
    }
    classes['.' as usize] = 9;
    classes['-' as usize] = 10;
    classes[' ' as usize] = 11;
    classes[0x0D] = 12;
    classes[0x0A] = 13;

    let mut img = header(ENGLISH_V108);
    img.extend_from_slice(&classes);
    for cost in [0u16, 4, 9, 1, 1, 1, 1, 1] {
        img.extend_from_slice(&cost.to_le_bytes());
    }
    img
}

/// Grammar table: compressed POS is the identity, a single attribute pair,
/// uniform costs, boundaries between the given POS bigrams.
pub fn grammar_image(pos_max: u16, breaks: &[(u16, u16)]) -> Vec<u8> {
    let n = pos_max as usize;
    let mut img = header(GRAMMAR_V111);
    let header_end = COMMENT_SIZE + 16 + 11 * 4;
    let ku_hin_start = header_end;
    let k_start = ku_hin_start + n * 2;
    let u_start = k_start + n * n;
    let map_start = u_start + n * n;
    let cost_start = map_start + 1;
    let ln_start = cost_start + 1;
    for v in [
        pos_max as i32,
        pos_max as i32,
        1,
        1,
        128,
        ku_hin_start as i32,
        k_start as i32,
        u_start as i32,
        map_start as i32,
        cost_start as i32,
        ln_start as i32,
    ] {
        img.extend_from_slice(&v.to_le_bytes());
    }
    for p in 0..pos_max {
        img.extend_from_slice(&(p as i16).to_le_bytes());
    }
    let mut ktbl = vec![0u8; n * n];
    for &(l, r) in breaks {
        ktbl[l as usize * n + r as usize] = 0x80;
    }
    img.extend_from_slice(&ktbl);
    img.extend_from_slice(&vec![0u8; n * n]); // uke
    img.push(4); // rule type: continuous-strong
    img.push(2); // relation cost
    img.extend_from_slice(&vec![1u8; 12 * 128]);
    img
}

/// Normalization table over single- or multi-character rules.
pub fn normalize_image(rules: &[(&str, &str)]) -> Vec<u8> {
    let array_size = 0x3000usize;
    let mut base = vec![0u32; array_size];
    let mut label = vec![0xFFFFu16; array_size];
    let mut stop = vec![0u8; 0x10000];
    stop[0] = 1;
    let mut pool: Vec<u8> = Vec::new();
    let mut rep_idx: Vec<u32> = Vec::new();

    let mut next_free = 1u32;
    for (r, (from, to)) in rules.iter().enumerate() {
        let from: Vec<u16> = utf16(from);
        stop[from[0] as usize] = 1;
        let mut state = 0u32;
        for (k, &c) in from.iter().enumerate() {
            let idx = state as usize + c as usize;
            if label[idx] == c {
                state = base[idx];
            } else {
                assert_eq!(label[idx], 0xFFFF, "test table collision");
                let target = next_free;
                next_free += 1;
                label[idx] = c;
                base[idx] = target;
                state = target;
            }
            if k == from.len() - 1 {
                label[state as usize] = 0;
                base[state as usize] = r as u32;
            }
        }
        let to: Vec<u16> = utf16(to);
        rep_idx.push(pool.len() as u32);
        pool.extend_from_slice(&((to.len() * 2) as i32).to_le_bytes());
        for c in to {
            pool.extend_from_slice(&c.to_le_bytes());
        }
    }

    let mut img = header(NORMALIZE_V101);
    img.extend_from_slice(&(rules.len() as i32).to_le_bytes());
    img.extend_from_slice(&(array_size as i32).to_le_bytes());
    img.extend_from_slice(&stop);
    for b in &base {
        img.extend_from_slice(&b.to_le_bytes());
    }
    for l in &label {
        img.extend_from_slice(&l.to_le_bytes());
    }
    for r in &rep_idx {
        img.extend_from_slice(&r.to_le_bytes());
    }
    img.extend_from_slice(&pool);
    img
}
