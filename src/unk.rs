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

//! Unknown-word detector.
//!
//! Scans left to right from a start position, classifying each character
//! into one of 43 classes, and consults a registration matrix (emit a
//! candidate ending here?) and a termination matrix (stop scanning?) on
//! every class transition. Kanji alternate between classes 0 and 1 so the
//! matrices can tell odd from even positions; class 98 characters
//! (prolonged marks, voicing marks, iteration marks, hyphens) take a class
//! that depends on their left neighbor. Surrogate pairs count as one
//! character of class kanji or sign but two characters of surface length.

use crate::analysis::lattice::{Lattice, Lookup, DETECTOR_PRIO, SURFACE_LEN_MAX};
use crate::dic::connect::ConnectionTable;
use crate::dic::header;
use crate::error::{KotohaNomResult, KotohaResult};
use crate::pos;

/// Weighted surface-length limit of one unknown word.
pub const UNK_SURFACE_LIMIT: u32 = SURFACE_LEN_MAX as u32;
/// Unknown words at or below this cost are registered even when a
/// registered word of the same length exists at the same start.
pub const PUT_COST: u16 = 25;
/// Number of unknown-word categories.
pub const UNK_KIND_COUNT: usize = 13;

// Character classes.
const CHINESE_CHARACTER: u8 = 1;
const NUMBER: u8 = 2;
const CAPITAL_LETTER: u8 = 3;
const KATAKANA: u8 = 5;
const SIGN: u8 = 6;
const HIRAGANA_FIRST: u8 = 7;
const HIRAGANA_TSU: u8 = 32;
const HIRAGANA_LAST: u8 = 39;
const SMALL_KATAKANA: u8 = 40;
const CHINESE_NUMERAL: u8 = 41;
const ITERATION_MARK: u8 = 42;
const HIGH_SURROGATE: u8 = 95;
const HIGH_SURROGATE_IDEOGRAPH: u8 = 96;
const LOW_SURROGATE: u8 = 97;
const VARIABLE: u8 = 98;

// Unknown-word categories, by (start class, end class, length).
const KIND_KANJI: usize = 0;
const KIND_KANJI_HIRAGANA: usize = 1;
const KIND_HIRAGANA: usize = 2;
const KIND_NUMERIC: usize = 3;
const KIND_CHINESE_NUMERAL: usize = 4;
const KIND_KATAKANA: usize = 5;
const KIND_SMALL_KATAKANA: usize = 6;
const KIND_SIGN: usize = 7;
const KIND_ITERATION_KANJI: usize = 8;
const KIND_ITERATION_HIRAGANA: usize = 9;
const KIND_ALPHABET_1: usize = 10;
const KIND_CAPITAL_INITIAL: usize = 11;
const KIND_SMALL_INITIAL: usize = 12;

/// Category -> morpheme POS.
const KIND_POS: [u16; UNK_KIND_COUNT] = [
    pos::UNK_SAHEN_NOUN,  // kanji run
    pos::UNK_CONJUGATED,  // kanji + hiragana tail
    pos::UNK_GENERAL,     // hiragana run
    pos::NUMERAL,         // digit run
    pos::NUMERAL,         // kanji-numeral run
    pos::UNK_KATAKANA,    // katakana run
    pos::UNK_GENERAL,     // small-katakana-initial run
    pos::UNK_SYMBOL,      // sign
    pos::UNK_GENERAL,     // iteration-mark kanji run
    pos::UNK_GENERAL,     // iteration-mark hiragana run
    pos::UNK_ALPHABET,    // single alphabet
    pos::UNK_PROPER_NOUN, // capital-initial alphabet run
    pos::UNK_GENERAL,     // small-initial alphabet run
];

/// Registration matrix: emit a candidate ending at the current character
/// when `[end class][next class]` is 1. The iteration-mark row and column
/// equal the odd-kanji ones.
#[rustfmt::skip]
const REGISTRATION: [[u8; 43]; 43] = [
    [1,1,1,1,1,1,1,0,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,1,1,1,1,1,1,0,1,1,0,0,1,0,0,1,0,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,0,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,1,0,1,1,0,1,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,1,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,0,0,1,0,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,0,0,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,0,0,1,0,0,0,1,0,0,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,0,1,1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,0,1,1,1,0,1,0,1,0,1,0,1,0,1,0,1,0,0,1,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,1,1,1,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,1,1,1,0,1,1,0,0,1,0,0,0,1,0,1,1,0,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,1,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,1,0,1,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,0,1,1,0,0,0,1,0,0,0,1,1,1,0,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,0,0,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,0,0,0,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,1,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,0,0,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,1,0,1,0,1,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,0,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,0,0,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,0,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,0,1,0,1,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,0,1,1,0,0,0,1,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,0,0,1,1,0,0,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,0,1,1,0,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,0,1,1,1,1,1,1,0,1,1,1,0,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,1,1,1,1,0,1,1,1,1,1,1,0,1,1,1,0,1,0,0,0,1,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,1,0,1,0,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,0,0,1,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,1,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,0,0,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,0,1,0,1,0,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,1,1,1,1,1,1,0,1,1,0,0,1,0,0,1,0,0,0,1,1,1,0,0,1,1,1,1,1],
];

/// Termination matrix: stop scanning when `[end class][next class]` is 1.
#[rustfmt::skip]
const TERMINATION: [[u8; 43]; 43] = [
    [1,0,1,1,1,1,1,0,0,1,1,0,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,1,1,1,0,1,1,1,0,0,1,1,1,1,0],
    [0,1,1,1,1,1,1,0,0,0,1,0,0,1,1,1,1,1,1,1,1,0,1,0,0,0,1,0,0,0,0,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,0,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,0,1,0,1,0,1,0,1,0,1,0,1,0,0,1,1,0,1,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,0,0,0,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,0,0,0,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,1,1,0,1,1,1,1,1,1,0,1,1,1,0,1,0,0,0,0,0,0,1,1,0,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,0,0,0,1,1,0,0,1,1,1,0,0,1,1,0,0,1,0,0,0,0,0,0,1,0,0,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1,0,0,0,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,0,1,0,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,1,1,1,1,0,0,1,1,1,1,1,0,0,1,1,1,1,0,1,1,0,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,1,1,1,0,1,1,1,1,0,1,1,0,1,1,1,1,0,1,1,1,1,0,1,1,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,1,1,1,1,1,1,0,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,0,1,1,1,1,1,0,0,1,1,0,0,1,0,0,0,1,0,1,1,0,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,1,1,1,1,0,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,0,1,1,1,0,1,0,1,0,1,1,1,1,0,1,0,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,0,1,1,0,1,1,1,0,1,0,1,0,1,0,1,0,1,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,0,1,1,0,0,0,1,0,0,0,1,1,1,0,0,0,0,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,1,1,1,1,1,1,1,1,1,0,1,0,1,0,1,0,0,0,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,0,1,1,1,1,1,0,1,1,0,0,1,1,0,0,0,0,0,0,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,1,1,0,1,1,1,1,1,1,1,0,1,0,1,0,1,0,1,0,0,0,0,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,0,0,0,1,1,0,1,1,1,1,1,0,1,1,1,0,1,1,1,0,0,1,0,0,0,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,0,1,0,1,0,1,0,0,0,0,0,0,0,0,0,0,0,1,0,1,0,1,0,0,0,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,0,0,1,1,0,0,1,1,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,0,1,1,1,1,1,1,0,1,0,1,0,1,0,1,0,1,0,1,0,0,0,1,0,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,0,0,0,1,1,0,1,1,1,0,1,0,1,0,1,0,1,0,1,0,1,0,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,0,1,1,1,1,1,0,0,1,0,0,0,1,0,0,0,1,0,0,0,0,1,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,0,0,1,1,0,0,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,0,0,0,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,1,0,0,1,0,0,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,0,0,1,1,0,0,0,0,1,1,0,1,0,0,0,0,0,0,1,1,1,0,0,1,1,1,0,0,0,0,1,1,1],
    [1,1,1,1,1,1,1,0,1,0,1,0,0,1,1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,0,1,1,0,0,1,1,0,0,1,0,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,0,1,0,1,0,1,1,1,1,1,1,0,1,1,1,0,1,0,0,0,1,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,1,0,1,1,1,1,1,1,1,0,1,0,1,0,1,0,1,0,0,0,0,0,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,1,1,0,0,1,1,0,1,1,1,0,0,1,0,0,0,1,0,0,0,1,1,1,1,0,1,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,1,1,0,0,0,0,0,0,1,1,1,1,1,1,0,1,0,1,0,1,0,1,0,1,0,1,0,0,0,1,1,0,0,1,1,1,1,1],
    [1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1],
    [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1],
    [0,1,1,1,1,1,1,0,0,0,1,0,0,1,1,1,1,1,1,1,1,0,1,0,0,0,1,0,0,0,0,0,0,1,1,1,0,0,1,1,1,1,1],
];

#[derive(Debug)]
pub struct UnknownTables {
    classes: Vec<u8>,
    costs: Vec<u16>,
}

fn u16s(input: &[u8], n: usize) -> KotohaNomResult<&[u8], Vec<u16>> {
    nom::multi::count(nom::number::complete::le_u16, n)(input)
}

impl UnknownTables {
    /// Parses the character-class table and the cost table.
    pub fn parse(class_image: &[u8], cost_image: &[u8]) -> KotohaResult<UnknownTables> {
        let class_body =
            header::body_checked(class_image, header::UNKNOWN_V101, "unknown class table")?;
        let mut classes = class_body
            .get(..0x10000)
            .ok_or(crate::error::KotohaError::MalformedResource {
                resource: "unknown class table",
                offset: header::HEADER_SIZE,
            })?
            .to_vec();

        // The surrogate blocks are classified here so that any table build
        // handles them the same way: the supplementary CJK planes pair up
        // to kanji, everything else to sign.
        for c in 0xD800..=0xD83F {
            classes[c] = HIGH_SURROGATE;
        }
        for c in 0xD840..=0xD8BF {
            classes[c] = HIGH_SURROGATE_IDEOGRAPH;
        }
        for c in 0xD8C0..=0xDBFF {
            classes[c] = HIGH_SURROGATE;
        }
        for c in 0xDC00..=0xDFFF {
            classes[c] = LOW_SURROGATE;
        }

        let cost_body =
            header::body_checked(cost_image, header::UNKNOWN_COST_V102, "unknown cost table")?;
        let (_rest, costs) = u16s(cost_body, UNK_KIND_COUNT * SURFACE_LEN_MAX)?;

        Ok(UnknownTables { classes, costs })
    }

    #[inline]
    fn class_of(&self, c: u16) -> u8 {
        self.classes[c as usize]
    }

    /// Detects unknown-word candidates starting at `txt_pos` and inserts
    /// them into the lattice.
    ///
    /// In non-Japanese mode every CJK character is reclassified as a sign,
    /// which yields one-character morphemes for those scripts. With
    /// `emulate_bug` the forced-termination check reproduces the legacy
    /// max-length comparison instead of the weighted limit.
    #[allow(clippy::too_many_arguments)]
    pub fn search(
        &self,
        lat: &mut Lattice,
        conn: &ConnectionTable,
        dic_num: u8,
        txt_pos: usize,
        japanese: bool,
        emulate_bug: bool,
        max_word_len: u32,
    ) -> Lookup {
        let mut count = 0usize;
        let mut mor_len = 0usize;
        let mut kanji_flip: u8 = 1;
        let mut is_pair = false;
        let mut start_pos = txt_pos;

        let start_class = {
            let c = lat.text()[txt_pos];
            let raw = self.class_of(c);
            if japanese {
                match raw {
                    VARIABLE => {
                        if c == 0x3005 {
                            ITERATION_MARK
                        } else {
                            SIGN
                        }
                    }
                    HIGH_SURROGATE | HIGH_SURROGATE_IDEOGRAPH => {
                        if txt_pos + 1 < lat.txt_len()
                            && self.class_of(lat.text()[txt_pos + 1]) == LOW_SURROGATE
                        {
                            start_pos = txt_pos + 1;
                            is_pair = true;
                            if raw == HIGH_SURROGATE_IDEOGRAPH {
                                CHINESE_CHARACTER
                            } else {
                                SIGN
                            }
                        } else {
                            SIGN
                        }
                    }
                    LOW_SURROGATE => SIGN,
                    k => k,
                }
            } else {
                match raw {
                    HIGH_SURROGATE | HIGH_SURROGATE_IDEOGRAPH => {
                        if txt_pos + 1 < lat.txt_len()
                            && self.class_of(lat.text()[txt_pos + 1]) == LOW_SURROGATE
                        {
                            start_pos = txt_pos + 1;
                            is_pair = true;
                        }
                        SIGN
                    }
                    LOW_SURROGATE => SIGN,
                    _ if force_sign(lat.text()[txt_pos], raw) => SIGN,
                    k => k,
                }
            }
        };

        // Katakana starts unweighted so katakana runs may grow longest;
        // every other class starts 15 short of the limit.
        let mut weight: u32 = if start_class == KATAKANA {
            0
        } else {
            UNK_SURFACE_LIMIT - 15
        };

        let mut next_class = start_class;
        let mut i = start_pos;
        loop {
            let end_class = next_class;
            mor_len += if is_pair { 2 } else { 1 };
            is_pair = false;

            let mut register;
            let mut finish;
            if i + 1 >= lat.txt_len() || lat.text()[i + 1] == 0 {
                register = true;
                finish = true;
            } else {
                let c = lat.text()[i + 1];
                let raw = self.class_of(c);
                next_class = if japanese {
                    match raw {
                        VARIABLE => self.variable_class(c, end_class),
                        HIGH_SURROGATE | HIGH_SURROGATE_IDEOGRAPH => {
                            if i + 2 < lat.txt_len()
                                && self.class_of(lat.text()[i + 2]) == LOW_SURROGATE
                            {
                                is_pair = true;
                                i += 1;
                                if raw == HIGH_SURROGATE_IDEOGRAPH {
                                    CHINESE_CHARACTER
                                } else {
                                    SIGN
                                }
                            } else {
                                SIGN
                            }
                        }
                        LOW_SURROGATE => SIGN,
                        k => k,
                    }
                } else {
                    match raw {
                        HIGH_SURROGATE | HIGH_SURROGATE_IDEOGRAPH => {
                            if i + 2 < lat.txt_len()
                                && self.class_of(lat.text()[i + 2]) == LOW_SURROGATE
                            {
                                is_pair = true;
                                i += 1;
                            }
                            SIGN
                        }
                        LOW_SURROGATE => SIGN,
                        _ if force_sign(c, raw) => SIGN,
                        k => k,
                    }
                };

                if japanese {
                    if next_class == CHINESE_CHARACTER {
                        // Kanji alternate between classes 1 and 0 so runs
                        // expose odd/even positions to the matrices, and
                        // weigh two characters each.
                        kanji_flip = 1 - kanji_flip;
                        next_class = kanji_flip;
                        weight += 2;
                    } else {
                        kanji_flip = 0;
                        weight += 1;
                    }
                } else {
                    weight += 1;
                }

                register = REGISTRATION[end_class as usize][next_class as usize] == 1;
                finish = TERMINATION[end_class as usize][next_class as usize] == 1;

                let over_limit = if emulate_bug {
                    weight >= max_word_len
                } else {
                    weight >= UNK_SURFACE_LIMIT || mor_len as u32 >= max_word_len
                };
                if over_limit {
                    finish = true;
                    // A candidate is forced at the cut so an unknown-only
                    // path always exists.
                    if count == 0 {
                        register = true;
                    }
                }
            }

            if register {
                let kind = unknown_kind(start_class, end_class, mor_len);
                let cost = self.costs[kind * SURFACE_LEN_MAX + (mor_len - 1)];

                if cost <= PUT_COST || !lat.morph_check(mor_len) {
                    let mut unk_pos = KIND_POS[kind];
                    if unk_pos == pos::UNK_SYMBOL && lat.text()[txt_pos] < 0x0020 {
                        // Control characters close the sentence.
                        unk_pos = pos::PERIOD;
                    }
                    let app_i = ((dic_num as u32) << 24) | kind as u32;
                    let r = lat.insert(
                        conn,
                        txt_pos,
                        mor_len,
                        unk_pos,
                        cost,
                        app_i,
                        0,
                        DETECTOR_PRIO,
                        false,
                    );
                    count += 1;
                    if r.is_err() {
                        return Lookup::Converged;
                    }
                }
            }

            if finish {
                break;
            }
            i += 1;
        }

        Lookup::Found(count)
    }

    /// Resolves a class-98 character against its left neighbor's class.
    fn variable_class(&self, c: u16, prev_class: u8) -> u8 {
        debug_assert!(prev_class <= ITERATION_MARK);
        match c {
            0x3005 => CHINESE_CHARACTER,
            // Prolonged sound marks and the various hyphens.
            0x30FC | 0xFF70 | 0x002D | 0x2010 | 0x2011 | 0x2015 | 0x207B | 0x208B | 0x2212
            | 0xFE63 | 0xFF0D => {
                if prev_class == KATAKANA || prev_class == SMALL_KATAKANA {
                    SMALL_KATAKANA
                } else if (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&prev_class) {
                    HIRAGANA_TSU
                } else {
                    SIGN
                }
            }
            // Voicing marks.
            0x3099 | 0x309A | 0x309B | 0x309C | 0xFF9E | 0xFF9F => {
                if prev_class == KATAKANA || prev_class == SMALL_KATAKANA {
                    SMALL_KATAKANA
                } else if (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&prev_class) {
                    HIRAGANA_TSU
                } else {
                    SIGN
                }
            }
            // Hiragana iteration marks.
            0x309D | 0x309E => {
                if (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&prev_class) {
                    HIRAGANA_TSU
                } else {
                    SIGN
                }
            }
            // Katakana iteration marks.
            0x30FD | 0x30FE => {
                if prev_class == KATAKANA || prev_class == SMALL_KATAKANA {
                    SMALL_KATAKANA
                } else {
                    SIGN
                }
            }
            _ => SIGN,
        }
    }
}

/// Non-Japanese mode treats all CJK scripts as signs.
#[inline]
fn force_sign(c: u16, raw_class: u8) -> bool {
    (0x3040..=0x30FF).contains(&c)
        || (0x4E00..=0x9FFF).contains(&c)
        || (0xFF66..=0xFF9F).contains(&c)
        || raw_class == VARIABLE
        || raw_class == CHINESE_CHARACTER
}

/// Category of an unknown word from its start class, end class and length.
fn unknown_kind(start_class: u8, end_class: u8, mor_len: usize) -> usize {
    let hiragana = |k: u8| (HIRAGANA_FIRST..=HIRAGANA_LAST).contains(&k);

    if start_class == CHINESE_CHARACTER {
        if hiragana(end_class) {
            return KIND_KANJI_HIRAGANA;
        }
        return KIND_KANJI;
    }
    if hiragana(start_class) {
        return KIND_HIRAGANA;
    }
    match start_class {
        NUMBER => KIND_NUMERIC,
        CHINESE_NUMERAL => KIND_CHINESE_NUMERAL,
        KATAKANA => KIND_KATAKANA,
        SMALL_KATAKANA => KIND_SMALL_KATAKANA,
        SIGN => KIND_SIGN,
        ITERATION_MARK => {
            if hiragana(end_class) {
                KIND_ITERATION_HIRAGANA
            } else {
                KIND_ITERATION_KANJI
            }
        }
        _ => {
            // Alphabet runs.
            if mor_len == 1 {
                KIND_ALPHABET_1
            } else if start_class == CAPITAL_LETTER {
                KIND_CAPITAL_INITIAL
            } else {
                KIND_SMALL_INITIAL
            }
        }
    }
}
