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

//! Fixed part-of-speech numbers shared by every dictionary build.
//!
//! Only the numbers the analyzer itself depends on are listed; everything
//! else is data-driven through the connection table.

/// No word / belongs to no POS.
pub const NOTHING: u16 = 0;
/// Unknown word, katakana run.
pub const UNK_KATAKANA: u16 = 1;
/// Period-class symbol. Doubles as the virtual sentence-end POS.
pub const PERIOD: u16 = 2;
/// Comma-class symbol.
pub const COMMA: u16 = 3;
/// Numeral.
pub const NUMERAL: u16 = 4;
/// Unknown word, sahen-noun-like kanji run.
pub const UNK_SAHEN_NOUN: u16 = 85;
/// Unknown word, proper-noun-like (capitalized alphabet run).
pub const UNK_PROPER_NOUN: u16 = 86;
/// Unknown word, symbol.
pub const UNK_SYMBOL: u16 = 87;
/// Unknown word, single alphabet symbol.
pub const UNK_ALPHABET: u16 = 88;
/// Unknown word, conjugating (kanji + hiragana tail).
pub const UNK_CONJUGATED: u16 = 89;
/// Unknown word, general.
pub const UNK_GENERAL: u16 = 90;
/// User-defined slot 1; assigned to English tokens.
pub const ENGLISH_TOKEN: u16 = 91;
/// Void word as stored in a void-word-capable dictionary.
pub const DIC_VOID: u16 = 99;

/// Void word as it appears on the lattice, common to all dictionaries.
///
/// A dictionary without void-word support uses number 99 as a normal POS,
/// so dictionary lookups rewrite 99 to this sentinel before insertion and
/// the lattice only ever tests against it.
pub const LOCAL_VOID: u16 = 0xFFFF;

/// Mask extracting the coarse group (top 4 bits) of a type-POS number.
pub const TYPE_POS_GROUP_MASK: u16 = 0xF000;
