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

//! The analyzer: resource loading and the per-handle analysis driver.
//!
//! A [`ResourceSet`] is loaded once and shared immutably between any
//! number of [`Analyzer`] handles; each handle owns its lattice, text
//! buffer and scratch, so handles on distinct threads never share mutable
//! state.

use std::borrow::Cow;
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use crate::bunsetsu::{self, DepScratch, Phrase};
use crate::config::{self, AnalyzeOptions, Config};
use crate::dic::app_info::AppInfoDictionary;
use crate::dic::connect::ConnectionTable;
use crate::dic::grammar::GrammarTable;
use crate::dic::lexicon::{WordDictionary, SUB_MORPH_MAX};
use crate::dic::storage::Storage;
use crate::english::EnglishTokenizer;
use crate::error::{KotohaError, KotohaResult};
use crate::input_text::TextNormalizer;
use crate::pos;
use crate::unk::UnknownTables;

pub mod lattice;
pub mod morpheme;

use self::lattice::{Lattice, Lookup, DETECTOR_PRIO, LOCAL_TEXT_SIZE, SURFACE_LEN_MAX};
use self::morpheme::Morpheme;

/// Maximum number of word dictionaries per resource set.
pub const WORD_DIC_MAX: usize = 16;

/// Morpheme capacity of one dependency-analysis call.
const KAKARIUKE_MORPH_MAX: usize = 4 * (LOCAL_TEXT_SIZE + 1);

/// Where a morpheme came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordClass {
    /// A registered word.
    Known,
    /// The English-token detector.
    English,
    /// The unknown-word detector.
    Unknown,
}

/// One word dictionary with its payloads and priority.
#[derive(Debug)]
pub struct LoadedDictionary {
    pub words: WordDictionary,
    pub app_info: AppInfoDictionary,
    pub name: String,
    pub priority: u8,
}

/// Borrowed images of one dictionary, input to [`ResourceSet::from_images`].
pub struct DictionaryImage<'a> {
    pub name: &'a str,
    pub words: Option<&'a [u8]>,
    pub app_info: Option<&'a [u8]>,
    pub priority: u8,
}

/// All immutable analysis resources.
#[derive(Debug)]
pub struct ResourceSet {
    connection: ConnectionTable,
    dictionaries: Vec<LoadedDictionary>,
    english: Option<EnglishTokenizer>,
    unknown: UnknownTables,
    grammar: Option<GrammarTable>,
    normalizer: Option<TextNormalizer>,
    japanese: bool,
}

impl ResourceSet {
    /// Builds a resource set from raw images.
    ///
    /// Dictionaries are consulted highest-priority first; with no
    /// dictionary at all the set degrades to non-Japanese mode over the
    /// null dictionary, where the unknown-word detector covers everything.
    #[allow(clippy::too_many_arguments)]
    pub fn from_images(
        dictionaries: &[DictionaryImage],
        connection: &[u8],
        grammar: Option<&[u8]>,
        english: Option<&[u8]>,
        unknown_classes: &[u8],
        unknown_costs: &[u8],
        normalize: Option<&[u8]>,
    ) -> KotohaResult<ResourceSet> {
        if dictionaries.len() > WORD_DIC_MAX {
            return Err(KotohaError::TooManyDictionaries(WORD_DIC_MAX));
        }

        let connection = ConnectionTable::parse(connection)?;
        let japanese = !dictionaries.is_empty();

        let mut loaded = Vec::new();
        if dictionaries.is_empty() {
            loaded.push(LoadedDictionary {
                words: WordDictionary::Null,
                app_info: AppInfoDictionary::parse(None)?,
                name: String::new(),
                priority: 1,
            });
        } else {
            for (i, img) in dictionaries.iter().enumerate() {
                let words = WordDictionary::parse(img.words)?;
                let app_info = AppInfoDictionary::parse(img.app_info)?;
                if img.app_info.is_some() && words.record_count() != app_info.record_count() {
                    return Err(KotohaError::RecordCountMismatch {
                        dic: i,
                        words: words.record_count(),
                        infos: app_info.record_count(),
                    });
                }
                loaded.push(LoadedDictionary {
                    words,
                    app_info,
                    name: img.name.to_string(),
                    priority: img.priority,
                });
            }
            // Dictionary-list files are ordered by ascending priority;
            // lookups go the other way so higher-priority homographs are
            // already on the lattice when lower ones arrive.
            loaded.sort_by(|a, b| b.priority.cmp(&a.priority));
        }

        let english = match english {
            Some(img) => Some(EnglishTokenizer::parse(img)?),
            None => None,
        };
        let unknown = UnknownTables::parse(unknown_classes, unknown_costs)?;
        let grammar = match grammar {
            Some(img) => Some(GrammarTable::parse(img)?),
            None => None,
        };
        let normalizer = match normalize {
            Some(img) => Some(TextNormalizer::parse(img)?),
            None => None,
        };

        Ok(ResourceSet {
            connection,
            dictionaries: loaded,
            english,
            unknown,
            grammar,
            normalizer,
            japanese,
        })
    }

    /// Loads the resources named by a configuration.
    ///
    /// Word dictionaries come from the dictionary-list file as
    /// `<base>wrd.dic` plus an optional `<base>app.dic` each.
    pub fn load(config: &Config) -> KotohaResult<ResourceSet> {
        let connection = Storage::map(&config.connection_table()?)?;
        let unk_classes = Storage::map(&config.unknown_class_table()?)?;
        let unk_costs = Storage::map(&config.unknown_cost_table()?)?;
        let grammar = match &config.grammar_table {
            Some(p) => Some(Storage::map(&config.resolve(p))?),
            None => None,
        };
        let english = match &config.english_table {
            Some(p) => Some(Storage::map(&config.resolve(p))?),
            None => None,
        };
        let normalize = match &config.normalize_table {
            Some(p) => Some(Storage::map(&config.resolve(p))?),
            None => None,
        };

        let entries = match &config.dictionary_list {
            Some(p) => {
                let raw = std::fs::read_to_string(config.resolve(p))?;
                config::parse_dictionary_list(&raw)?
            }
            None => config::default_dictionary_list(),
        };

        let mut word_images = Vec::new();
        for entry in &entries {
            let words = Storage::map(&config.resolve(Path::new(&format!(
                "{}wrd.dic",
                entry.base_name
            ))))?;
            let app_path = config.resolve(Path::new(&format!("{}app.dic", entry.base_name)));
            let app = if app_path.exists() {
                Some(Storage::map(&app_path)?)
            } else {
                None
            };
            word_images.push((entry, words, app));
        }
        let images: Vec<DictionaryImage> = word_images
            .iter()
            .map(|(entry, words, app)| DictionaryImage {
                name: &entry.base_name,
                words: Some(words.view()),
                app_info: app.as_ref().map(|a| a.view()),
                priority: entry.priority,
            })
            .collect();

        ResourceSet::from_images(
            &images,
            connection.view(),
            grammar.as_ref().map(|s| s.view()),
            english.as_ref().map(|s| s.view()),
            unk_classes.view(),
            unk_costs.view(),
            normalize.as_ref().map(|s| s.view()),
        )
    }

    pub fn connection(&self) -> &ConnectionTable {
        &self.connection
    }

    pub fn grammar(&self) -> Option<&GrammarTable> {
        self.grammar.as_ref()
    }

    pub fn dictionary_count(&self) -> usize {
        self.dictionaries.len()
    }

    /// Source index of the English detector, when enabled.
    pub fn english_index(&self) -> Option<usize> {
        self.english.as_ref().map(|_| self.dictionaries.len())
    }

    /// Source index of the unknown-word detector.
    pub fn unknown_index(&self) -> usize {
        self.dictionaries.len() + self.english.is_some() as usize
    }
}

/// Morphological analysis of one text segment.
#[derive(Debug)]
pub struct MorphAnalysis {
    pub morphemes: Vec<Morpheme>,
    /// Characters of the input consumed; resume with the remaining text.
    pub processed: usize,
}

/// Dependency analysis of one phrase run.
#[derive(Debug)]
pub struct KakariukeAnalysis {
    pub morphemes: Vec<Morpheme>,
    pub phrases: Vec<Phrase>,
    pub processed: usize,
}

/// One analyzer handle.
///
/// A handle carries the analysis state between calls: the POS of the last
/// emitted morpheme chains into the connection cost of the next call's
/// first morpheme, as if the inputs were concatenated. Morphemes returned
/// by a call stay addressable through [`Analyzer::surface`] until the next
/// analysis call on the same handle.
pub struct Analyzer {
    res: Arc<ResourceSet>,
    lattice: Lattice,
    prev_pos: u16,
    text_buf: Vec<u16>,
    text_index: Vec<usize>,
    normalized: bool,
    last_ignore_cr: bool,
    dep_scratch: DepScratch,
    debug: bool,
}

impl Analyzer {
    pub fn new(res: Arc<ResourceSet>) -> Analyzer {
        Analyzer {
            res,
            lattice: Lattice::default(),
            prev_pos: pos::PERIOD,
            text_buf: Vec::new(),
            text_index: Vec::new(),
            normalized: false,
            last_ignore_cr: false,
            dep_scratch: DepScratch::default(),
            debug: false,
        }
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.res
    }

    /// Print lattice dumps to stderr after each flush.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Analyzes one segment of `text` into morphemes.
    ///
    /// At most [`LOCAL_TEXT_SIZE`](lattice::LOCAL_TEXT_SIZE) characters are
    /// consumed per call; the caller loops with the remaining suffix until
    /// `processed` reaches the input length. `stop_fn` is polled at every
    /// text position and cancels the call with [`KotohaError::Canceled`].
    pub fn analyze_morpho<F: FnMut() -> bool>(
        &mut self,
        text: &[u16],
        mut stop_fn: F,
        opts: &AnalyzeOptions,
    ) -> KotohaResult<MorphAnalysis> {
        let head_pos = self.prev_pos;
        self.last_ignore_cr = opts.ignore_line_break;
        let limit = LOCAL_TEXT_SIZE + 1;

        let mut morphemes = Vec::new();
        let processed = self.generate(text, &mut morphemes, limit, &mut stop_fn, opts)?;

        let res = self.res.clone();
        let normalizer = res.normalizer.as_ref();
        let run_normalizer = opts.execute_normalization
            && normalizer
                .map(|n| {
                    // Peek a little past the analyzed range so a rule
                    // straddling the segment end still triggers.
                    n.check(&text[..text.len().min(processed + 8)])
                })
                .unwrap_or(false);

        let processed = if !run_normalizer {
            self.text_buf.clear();
            self.text_buf.extend_from_slice(self.lattice.text());
            self.normalized = false;
            processed
        } else {
            // Redo the analysis over the normalized text, restoring the
            // carried POS first.
            self.prev_pos = head_pos;
            let (std_text, index) = normalizer.unwrap().convert(text, LOCAL_TEXT_SIZE + 1);
            morphemes.clear();

            let mut p_std = 0usize;
            while p_std < std_text.len() {
                let iter_head = self.prev_pos;
                let before = morphemes.len();
                let remaining = limit - before;
                let r = self.generate(
                    &std_text[p_std..],
                    &mut morphemes,
                    remaining,
                    &mut stop_fn,
                    opts,
                );
                match r {
                    Err(KotohaError::MorphemeBufferOverflow) => {
                        self.prev_pos = iter_head;
                        break;
                    }
                    Err(e) => return Err(e),
                    Ok(seg) => {
                        if p_std > 0 && p_std + seg >= std_text.len() {
                            // The tail may have been cut mid-word; leave it
                            // for the next call.
                            self.prev_pos = iter_head;
                            morphemes.truncate(before);
                            break;
                        }
                        for m in &mut morphemes[before..] {
                            m.begin += p_std;
                        }
                        p_std += seg;
                    }
                }
            }

            self.text_buf = std_text;
            self.text_index = index;
            self.normalized = true;
            self.text_index[p_std]
        };

        if processed == text.len() || text.get(processed) == Some(&0) {
            self.prev_pos = pos::PERIOD;
        }

        Ok(MorphAnalysis {
            morphemes,
            processed,
        })
    }

    /// Analyzes `text` into phrases with dependency relations.
    ///
    /// Morphological analysis and phrase generation alternate until a
    /// period phrase, phrase-buffer saturation, morpheme-buffer saturation
    /// or the end of the input; the dependency assignment runs once over
    /// the accumulated phrases. Requires no grammar table: without one,
    /// each morpheme forms a phrase and relations chain to the neighbor.
    pub fn analyze_kakariuke<F: FnMut() -> bool>(
        &mut self,
        text: &[u16],
        mut stop_fn: F,
        opts: &AnalyzeOptions,
    ) -> KotohaResult<KakariukeAnalysis> {
        self.last_ignore_cr = opts.ignore_line_break;
        let res = self.res.clone();
        let mut morphemes: Vec<Morpheme> = Vec::new();
        let mut phrases: Vec<Phrase> = Vec::new();
        let mut processed = 0usize;

        loop {
            let before = morphemes.len();
            let remaining = KAKARIUKE_MORPH_MAX - before;
            let seg = match self.generate(
                &text[processed.min(text.len())..],
                &mut morphemes,
                remaining,
                &mut stop_fn,
                opts,
            ) {
                Err(KotohaError::MorphemeBufferOverflow) => break,
                Err(e) => return Err(e),
                Ok(p) => p,
            };
            if morphemes.len() == before {
                break;
            }
            for m in &mut morphemes[before..] {
                m.begin += processed;
            }

            let produced = morphemes.len() - before;
            let consumed = bunsetsu::generate(
                res.grammar.as_ref(),
                &mut phrases,
                bunsetsu::LOCAL_PHRASE_SIZE,
                &morphemes,
                before,
            )?;
            if consumed < produced {
                // Unconsumed morphemes are given back to the caller via
                // the processed length.
                morphemes.truncate(before + consumed);
                if let Some(last) = morphemes.last() {
                    processed = last.begin + last.length as usize;
                }
                break;
            }
            processed += seg;
        }

        self.text_buf.clear();
        self.text_buf
            .extend_from_slice(&text[..processed.min(text.len())]);
        self.normalized = false;

        bunsetsu::analyze(
            res.grammar.as_ref(),
            &mut phrases,
            &morphemes,
            &mut self.dep_scratch,
        )?;

        Ok(KakariukeAnalysis {
            morphemes,
            phrases,
            processed,
        })
    }

    /// One lattice run over a single segment. Appends the optimal path to
    /// `out` (at most `limit` morphemes) and returns the processed length.
    fn generate(
        &mut self,
        text: &[u16],
        out: &mut Vec<Morpheme>,
        limit: usize,
        stop_fn: &mut dyn FnMut() -> bool,
        opts: &AnalyzeOptions,
    ) -> KotohaResult<usize> {
        let res = self.res.clone();
        let conn = &res.connection;
        let max_word = if opts.max_word_length == 0 || opts.max_word_length > SURFACE_LEN_MAX as u32
        {
            SURFACE_LEN_MAX as u32
        } else {
            opts.max_word_length
        };
        let base = out.len();
        let eng_num = res.dictionaries.len() as u8;
        let unk_num = res.unknown_index() as u8;

        self.lattice.clear(conn, self.prev_pos, text);

        let mut converged = false;
        let mut prio_source = 0usize;
        let mut txt_pos = 0usize;
        loop {
            if stop_fn() {
                return Err(KotohaError::Canceled);
            }

            // Text end: force a virtual sentence end and flush.
            if txt_pos >= self.lattice.txt_len() || self.lattice.text()[txt_pos] == 0 {
                let end = self.lattice.lattice_end();
                let _ = self.lattice.insert(
                    conn,
                    end,
                    1,
                    pos::PERIOD,
                    0,
                    0,
                    0,
                    DETECTOR_PRIO,
                    false,
                );
                let cur = self.lattice.cur_edge();
                self.lattice.link_with_parent(conn, txt_pos, cur, cur);
                if self.debug {
                    let _ = self.lattice.dump(&mut std::io::stderr());
                }
                self.lattice.extract_path(out, limit)?;
                out.pop(); // drop the virtual sentence end
                let processed = self.lattice.lattice_end() - 1;
                self.prev_pos = match out.last() {
                    Some(last) if out.len() > base => last.pos,
                    _ => pos::PERIOD,
                };
                return Ok(processed);
            }

            // Convergence: flush the settled prefix and hand the rest back.
            if converged {
                if self.debug {
                    let _ = self.lattice.dump(&mut std::io::stderr());
                }
                self.lattice.extract_path(out, limit)?;
                let processed = self.lattice.lattice_end();
                debug_assert!(processed <= self.lattice.txt_len());
                self.prev_pos =
                    if processed < self.lattice.txt_len() && self.lattice.text()[processed] != 0 {
                        self.lattice.edge(self.lattice.cur_edge()).pos
                    } else {
                        pos::PERIOD
                    };
                return Ok(processed);
            }

            // Nothing ends here, so nothing can start here either.
            if !self.lattice.has_edge_ending_at(txt_pos) {
                txt_pos += 1;
                continue;
            }

            self.lattice.clear_morph_check();
            let lat_end_before = self.lattice.lattice_end();
            self.lattice.begin_position();
            let mut candidates = 0usize;
            let mut halted = false;

            for (i, dic) in res.dictionaries.iter().enumerate() {
                match dic.words.search(
                    &mut self.lattice,
                    conn,
                    i as u8,
                    dic.priority,
                    txt_pos,
                    opts.ignore_line_break,
                    max_word,
                ) {
                    Lookup::Found(n) => candidates += n,
                    Lookup::Converged => {
                        prio_source = i;
                        converged = true;
                        halted = true;
                        break;
                    }
                }
            }
            if !halted {
                if let Some(eng) = &res.english {
                    match eng.search(&mut self.lattice, conn, eng_num, txt_pos, max_word) {
                        Lookup::Found(n) => candidates += n,
                        Lookup::Converged => {
                            converged = true;
                            halted = true;
                        }
                    }
                }
            }
            if !halted {
                match res.unknown.search(
                    &mut self.lattice,
                    conn,
                    unk_num,
                    txt_pos,
                    res.japanese,
                    opts.emulate_bug,
                    max_word,
                ) {
                    Lookup::Found(n) => candidates += n,
                    Lookup::Converged => converged = true,
                }
            }

            if self.lattice.prio_edge() != 0 {
                // A collocation was matched: replace it by its sub-morpheme
                // chain and converge there.
                res.dictionaries[prio_source].words.expand_priority(
                    &mut self.lattice,
                    conn,
                    txt_pos,
                );
            } else {
                let (s, e) = (self.lattice.start_edge(), self.lattice.cur_edge());
                self.lattice.link_with_parent(conn, txt_pos, s, e);
            }

            // Converged when the lattice frontier did not move and exactly
            // one candidate appeared.
            if lat_end_before == txt_pos && candidates == 1 {
                converged = true;
            }
            txt_pos += 1;
        }
    }

    /// Surface of a morpheme. English hyphen-continuation tokens read back
    /// in their condensed form (separators stripped).
    pub fn surface(&self, m: &Morpheme) -> Cow<'_, [u16]> {
        if Some(m.dictionary_index()) == self.res.english_index() {
            let eng = self.res.english.as_ref().unwrap();
            Cow::Owned(eng.condensed_surface(&self.text_buf, m))
        } else {
            Cow::Borrowed(&self.text_buf[m.range()])
        }
    }

    /// Surface exactly as analyzed, separators included.
    pub fn raw_surface(&self, m: &Morpheme) -> &[u16] {
        &self.text_buf[m.range()]
    }

    /// Range of the morpheme in the original (pre-normalization) text of
    /// the producing call.
    pub fn original_range(&self, m: &Morpheme) -> Range<usize> {
        if self.normalized {
            self.text_index[m.begin]..self.text_index[m.begin + m.length as usize]
        } else {
            m.range()
        }
    }

    fn word_class(&self, m: &Morpheme) -> WordClass {
        let dic = m.dictionary_index();
        if dic < self.res.dictionaries.len() {
            WordClass::Known
        } else if Some(dic) == self.res.english_index() {
            WordClass::English
        } else {
            WordClass::Unknown
        }
    }

    /// Application payload of a morpheme plus its word class. Registered
    /// words read from their application dictionary; English tokens
    /// synthesize the condensed surface as UTF-16LE bytes; unknown words
    /// have none.
    pub fn application_info(&self, m: &Morpheme) -> (WordClass, Cow<'_, [u8]>) {
        match self.word_class(m) {
            WordClass::Known => {
                let dic = &self.res.dictionaries[m.dictionary_index()];
                (WordClass::Known, Cow::Borrowed(dic.app_info.info(m.record_id())))
            }
            WordClass::English => {
                let eng = self.res.english.as_ref().unwrap();
                let condensed = eng.condensed_surface(&self.text_buf, m);
                let mut bytes = Vec::with_capacity(condensed.len() * 2);
                for c in condensed {
                    bytes.extend_from_slice(&c.to_le_bytes());
                }
                (WordClass::English, Cow::Owned(bytes))
            }
            WordClass::Unknown => (WordClass::Unknown, Cow::Borrowed(&[])),
        }
    }

    /// Sub-morphemes of a morpheme: dictionary sub-structure for
    /// registered compounds, the separator decomposition for English
    /// hyphen-continuation tokens, nothing otherwise.
    pub fn sub_morphemes(&self, m: &Morpheme) -> KotohaResult<(WordClass, Vec<Morpheme>)> {
        let mut out = Vec::new();
        let class = self.word_class(m);
        match class {
            WordClass::Known => {
                let dic = &self.res.dictionaries[m.dictionary_index()];
                dic.words.sub_morphemes(m, &mut out, SUB_MORPH_MAX)?;
                if self.last_ignore_cr {
                    self.widen_over_line_breaks(m, &mut out);
                }
            }
            WordClass::English => {
                let eng = self.res.english.as_ref().unwrap();
                eng.sub_morphemes(&self.text_buf, m, &mut out, SUB_MORPH_MAX)?;
            }
            WordClass::Unknown => {}
        }
        Ok((class, out))
    }

    /// With ignore-line-break lookups, dictionary sub-morphemes cover
    /// surfaces shorter than the analyzed text; stretch each one over the
    /// CR/LF characters it absorbed.
    fn widen_over_line_breaks(&self, parent: &Morpheme, subs: &mut [Morpheme]) {
        let mut offset = 0usize;
        for sub in subs.iter_mut() {
            debug_assert!(offset < parent.length as usize);
            sub.begin += offset;
            let mut j = 0usize;
            while j < sub.length as usize {
                let c = self.text_buf[sub.begin + j];
                if c == 0x0D || c == 0x0A {
                    sub.length += 1;
                    offset += 1;
                }
                j += 1;
            }
        }
    }

    /// English token-type bits of a morpheme; errors for anything the
    /// English detector did not produce.
    pub fn token_type(&self, m: &Morpheme) -> KotohaResult<u32> {
        if Some(m.dictionary_index()) == self.res.english_index() {
            Ok(m.record_id())
        } else {
            Err(KotohaError::NotEnglishToken)
        }
    }

    /// Base name of the dictionary that produced a registered word.
    pub fn dictionary_name(&self, m: &Morpheme) -> Option<&str> {
        let dic = m.dictionary_index();
        if dic < self.res.dictionaries.len() {
            Some(&self.res.dictionaries[dic].name)
        } else {
            None
        }
    }

    /// Type-POS of a morpheme.
    pub fn type_pos(&self, m: &Morpheme) -> KotohaResult<u16> {
        if (m.pos as u32) >= self.res.connection.pos_max() {
            return Err(KotohaError::InvalidPos(m.pos));
        }
        Ok(self.res.connection.type_pos(m.pos))
    }

    /// POS name of a morpheme, when its number is in range.
    pub fn pos_name(&self, m: &Morpheme) -> Option<String> {
        self.res
            .connection
            .pos_name(m.pos)
            .map(|n| String::from_utf16_lossy(n))
    }

    /// Tells the analyzer the sentence ended: the next call starts fresh
    /// instead of chaining to the last emitted morpheme.
    pub fn terminate_sentence(&mut self) {
        self.prev_pos = pos::PERIOD;
    }

    /// POS that the next call will chain from.
    pub fn sentence_tail(&self) -> u16 {
        self.prev_pos
    }

    pub fn set_sentence_tail(&mut self, pos: u16) {
        self.prev_pos = pos;
    }

    /// Dumps the current lattice for debugging.
    pub fn dump_lattice<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        self.lattice.dump(out)
    }
}
