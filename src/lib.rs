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

//! kotoha, a lattice-based Japanese/multilingual morphological analyzer.
//!
//! Given precompiled linguistic resources — word dictionaries, a
//! connection-cost table, unknown-word and English-token class tables,
//! optionally a grammar table and a normalization table — the analyzer
//! produces the minimum-cost morpheme segmentation of a text, and
//! optionally groups the morphemes into bunsetsu phrases with dependency
//! relations.
//!
//! Resources are loaded once into a [`ResourceSet`](analysis::ResourceSet)
//! and shared immutably; each [`Analyzer`](analysis::Analyzer) handle owns
//! its own mutable state, so one handle per thread analyzes concurrently.

pub mod analysis;
pub mod bunsetsu;
pub mod config;
pub mod dic;
pub mod english;
pub mod error;
pub mod input_text;
pub mod pos;
pub mod unk;

pub mod prelude {
    pub use crate::{
        analysis::morpheme::Morpheme, analysis::Analyzer, analysis::ResourceSet,
        analysis::WordClass, config::AnalyzeOptions, error::KotohaError, error::KotohaResult,
    };
}
