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

mod common;

use std::sync::Arc;

use claim::assert_matches;
use lazy_static::lazy_static;

use common::*;
use kotoha::analysis::morpheme::Morpheme;
use kotoha::analysis::{Analyzer, DictionaryImage, ResourceSet, WordClass};
use kotoha::config::AnalyzeOptions;
use kotoha::english::TOKEN_HYPHEN;
use kotoha::error::KotohaError;
use kotoha::pos;

lazy_static! {
    static ref CONN_IMG: Vec<u8> = connection_image(128);
    static ref ENGLISH_IMG: Vec<u8> = english_image();
    static ref UNKNOWN_IMGS: (Vec<u8>, Vec<u8>) = unknown_images(30);
}

struct Dic {
    name: &'static str,
    priority: u8,
    image: Vec<u8>,
}

fn resources(dics: &[Dic], english: bool, normalize: Option<Vec<u8>>) -> Arc<ResourceSet> {
    let images: Vec<DictionaryImage> = dics
        .iter()
        .map(|d| DictionaryImage {
            name: d.name,
            words: Some(&d.image),
            app_info: None,
            priority: d.priority,
        })
        .collect();
    Arc::new(
        ResourceSet::from_images(
            &images,
            &CONN_IMG,
            None,
            if english { Some(&ENGLISH_IMG) } else { None },
            &UNKNOWN_IMGS.0,
            &UNKNOWN_IMGS.1,
            normalize.as_deref(),
        )
        .unwrap(),
    )
}

fn never() -> bool {
    false
}

fn surfaces(analyzer: &Analyzer, morphemes: &[Morpheme]) -> Vec<String> {
    morphemes
        .iter()
        .map(|m| String::from_utf16(&analyzer.surface(m)).unwrap())
        .collect()
}

/// Drives the resume loop to the end of the input, like a real caller.
fn analyze_all(
    analyzer: &mut Analyzer,
    text: &[u16],
    opts: &AnalyzeOptions,
) -> (Vec<String>, usize) {
    let mut done = 0;
    let mut all = Vec::new();
    while done < text.len() {
        let result = analyzer
            .analyze_morpho(&text[done..], never, opts)
            .unwrap();
        if result.processed == 0 && result.morphemes.is_empty() {
            break;
        }
        for m in &result.morphemes {
            all.push(String::from_utf16(analyzer.raw_surface(m)).unwrap());
        }
        done += result.processed;
    }
    (all, done)
}

#[test]
fn compound_word_with_sub_morphemes() {
    let dic = word_dic_v125(
        &[
            WordEntry::with_subs("日本語", 5, 5, &[1, 2]),
            WordEntry::new("日本", 5, 10),
            WordEntry::new("語", 6, 10),
        ],
        false,
    );
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        false,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("日本語");
    let result = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(result.processed, 3);
    assert_eq!(surfaces(&analyzer, &result.morphemes), ["日本語"]);

    let m = &result.morphemes[0];
    assert!(m.has_sub_structure());
    let (class, subs) = analyzer.sub_morphemes(m).unwrap();
    assert_eq!(class, WordClass::Known);
    assert_eq!(surfaces(&analyzer, &subs), ["日本", "語"]);
    assert_eq!(subs[0].pos, 5);
    assert_eq!(subs[1].pos, 6);
}

#[test]
fn surface_concatenation_covers_processed_text() {
    let dic = word_dic_v125(
        &[
            WordEntry::new("日本", 5, 5),
            WordEntry::new("語", 6, 10),
        ],
        false,
    );
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        false,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("日本語とカタカナ123");
    let result = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    let mut concat: Vec<u16> = Vec::new();
    for m in &result.morphemes {
        assert!(m.length as usize <= 255);
        concat.extend_from_slice(analyzer.raw_surface(m));
    }
    assert_eq!(concat, text[..result.processed].to_vec());
}

#[test]
fn multi_dictionary_priority_suppresses_homograph() {
    // List-file order is ascending priority; the high-priority dictionary
    // must win the homograph.
    let low = word_dic_v125(&[WordEntry::new("東京", 6, 5)], false);
    let high = word_dic_v125(&[WordEntry::new("東京", 6, 5)], false);
    let res = resources(
        &[
            Dic {
                name: "low",
                priority: 1,
                image: low,
            },
            Dic {
                name: "high",
                priority: 10,
                image: high,
            },
        ],
        false,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("東京");
    let result = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(surfaces(&analyzer, &result.morphemes), ["東京"]);
    let m = &result.morphemes[0];
    assert_eq!(analyzer.dictionary_name(m), Some("high"));
    assert_eq!(m.dictionary_index(), 0, "consultation order is by priority");
}

#[test]
fn line_end_hyphen_token_and_decomposition() {
    let dic = word_dic_v125(&[WordEntry::new("猫", 5, 5)], false);
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        true,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("JAPAN-\nU.S.A.");
    let result = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();

    let token = result
        .morphemes
        .iter()
        .find(|m| matches!(analyzer.token_type(m), Ok(t) if t == TOKEN_HYPHEN))
        .expect("a hyphen-continuation token");
    assert_eq!(token.begin, 0);
    assert_eq!(
        String::from_utf16(analyzer.raw_surface(token)).unwrap(),
        "JAPAN-\nU"
    );
    assert_eq!(
        String::from_utf16(&analyzer.surface(token)).unwrap(),
        "JAPANU",
        "the condensed surface drops the separators"
    );

    let (class, subs) = analyzer.sub_morphemes(token).unwrap();
    assert_eq!(class, WordClass::English);
    let sub_surfaces: Vec<String> = subs
        .iter()
        .map(|m| String::from_utf16(analyzer.raw_surface(m)).unwrap())
        .collect();
    assert_eq!(sub_surfaces, ["JAPAN", "-", "\n", "U"]);

    let (class, info) = analyzer.application_info(token);
    assert_eq!(class, WordClass::English);
    let condensed: Vec<u8> = utf16("JAPANU")
        .iter()
        .flat_map(|c| c.to_le_bytes().to_vec())
        .collect();
    assert_eq!(info.as_ref(), condensed.as_slice());

    // The flushed morphemes cover the processed prefix, and the resume
    // loop covers the whole text.
    let mut concat: Vec<u16> = Vec::new();
    for m in &result.morphemes {
        concat.extend_from_slice(analyzer.raw_surface(m));
    }
    assert_eq!(concat, text[..result.processed].to_vec());

    let mut done = result.processed;
    while done < text.len() {
        let next = analyzer
            .analyze_morpho(&text[done..], never, &AnalyzeOptions::default())
            .unwrap();
        assert!(next.processed > 0);
        done += next.processed;
    }
    assert_eq!(done, text.len());
}

#[test]
fn collocation_expands_and_forces_convergence() {
    let dic = word_dic_v125(
        &[
            WordEntry::with_subs("とは", 0xFFFF, 0, &[1, 2]),
            WordEntry::new("と", 13, 5),
            WordEntry::new("は", 13, 5),
        ],
        false,
    );
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        false,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("とはい");
    let result = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(
        result.processed, 2,
        "the collocation converges the lattice at its end"
    );
    assert_eq!(surfaces(&analyzer, &result.morphemes), ["と", "は"]);
    assert!(result.morphemes.iter().all(|m| m.pos == 13));

    let rest = analyzer
        .analyze_morpho(&text[result.processed..], never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(rest.processed, 1);
}

#[test]
fn lattice_overflow_converges_and_resumes() {
    // 50 homographs per character flood the 255-edge arena in a few
    // positions.
    let entries: Vec<WordEntry> = (0..50).map(|_| WordEntry::new("x", 5, 5)).collect();
    let dic = word_dic_v125(&entries, false);
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        false,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("xxxxxxxxxx");
    let first = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert!(first.processed > 0);
    assert!(
        first.processed < text.len(),
        "overflow must stop short of the input"
    );
    let mut concat: Vec<u16> = Vec::new();
    for m in &first.morphemes {
        concat.extend_from_slice(analyzer.raw_surface(m));
    }
    assert_eq!(concat, text[..first.processed].to_vec());

    // The suffix continues on the same handle.
    let mut done = first.processed;
    while done < text.len() {
        let next = analyzer
            .analyze_morpho(&text[done..], never, &AnalyzeOptions::default())
            .unwrap();
        assert!(next.processed > 0, "no forward progress");
        done += next.processed;
    }
    assert_eq!(done, text.len());
}

#[test]
fn normalizer_rewrites_before_analysis() {
    let dic = word_dic_v125(&[WordEntry::new("12", 5, 5)], false);
    let norm = normalize_image(&[("\u{2460}", "1"), ("\u{2461}", "2")]);
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        false,
        Some(norm),
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("\u{2460}\u{2461}\u{2462}");
    let opts = AnalyzeOptions {
        execute_normalization: true,
        ..AnalyzeOptions::default()
    };
    let result = analyzer.analyze_morpho(&text, never, &opts).unwrap();
    assert_eq!(
        result.processed, 2,
        "the possibly-cut tail is left for the next call"
    );
    assert_eq!(
        surfaces(&analyzer, &result.morphemes),
        ["12"],
        "the dictionary word matches the normalized text"
    );
    assert_eq!(
        analyzer.original_range(&result.morphemes[0]),
        0..2,
        "the index map recovers the original span"
    );

    let rest = analyzer
        .analyze_morpho(&text[result.processed..], never, &opts)
        .unwrap();
    assert_eq!(rest.processed, 1);
    assert_eq!(surfaces(&analyzer, &rest.morphemes), ["\u{2462}"]);

    // Without the option the raw text is analyzed as-is.
    let mut analyzer2 = Analyzer::new(resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: word_dic_v125(&[WordEntry::new("12", 5, 5)], false),
        }],
        false,
        None,
    ));
    let raw = analyzer2
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert!(surfaces(&analyzer2, &raw.morphemes)
        .iter()
        .all(|s| s != "12"));
}

#[test]
fn null_dictionary_yields_single_character_unknowns() {
    let res = resources(&[], false, None);
    let mut analyzer = Analyzer::new(res);

    let text = utf16("日本語です");
    let mut done = 0;
    let mut count = 0;
    while done < text.len() {
        let result = analyzer
            .analyze_morpho(&text[done..], never, &AnalyzeOptions::default())
            .unwrap();
        assert!(result.processed > 0);
        for m in &result.morphemes {
            assert_eq!(m.length, 1);
            let (class, info) = analyzer.application_info(m);
            assert_eq!(class, WordClass::Unknown);
            assert!(info.is_empty());
            count += 1;
        }
        done += result.processed;
    }
    assert_eq!(count, text.len());
}

#[test]
fn analysis_is_resumable_across_calls() {
    let make = || {
        Analyzer::new(resources(
            &[Dic {
                name: "base",
                priority: 1,
                image: word_dic_v125(
                    &[
                        WordEntry::new("あい", 5, 5),
                        WordEntry::new("うえ", 5, 5),
                    ],
                    false,
                ),
            }],
            false,
            None,
        ))
    };

    let whole = utf16("あいうえ");
    let mut one = make();
    let full = one
        .analyze_morpho(&whole, never, &AnalyzeOptions::default())
        .unwrap();
    let full_pos: Vec<u16> = full.morphemes.iter().map(|m| m.pos).collect();

    let mut two = make();
    let a = two
        .analyze_morpho(&utf16("あい"), never, &AnalyzeOptions::default())
        .unwrap();
    let b = two
        .analyze_morpho(&utf16("うえ"), never, &AnalyzeOptions::default())
        .unwrap();
    let mut split_pos: Vec<u16> = a.morphemes.iter().map(|m| m.pos).collect();
    split_pos.extend(b.morphemes.iter().map(|m| m.pos));

    assert_eq!(full_pos, split_pos);
}

#[test]
fn sentence_tail_chains_and_resets() {
    let res = resources(&[], false, None);
    let mut analyzer = Analyzer::new(res);

    assert_eq!(analyzer.sentence_tail(), pos::PERIOD);
    let text = utf16("あ");
    analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(
        analyzer.sentence_tail(),
        pos::PERIOD,
        "text end closes the sentence"
    );

    analyzer.set_sentence_tail(pos::NUMERAL);
    assert_eq!(analyzer.sentence_tail(), pos::NUMERAL);
    analyzer.terminate_sentence();
    assert_eq!(analyzer.sentence_tail(), pos::PERIOD);
}

#[test]
fn stop_function_cancels() {
    let res = resources(&[], false, None);
    let mut analyzer = Analyzer::new(res);
    let text = utf16("あいうえお");
    let r = analyzer.analyze_morpho(&text, || true, &AnalyzeOptions::default());
    assert_matches!(r, Err(KotohaError::Canceled));
}

#[test]
fn kakariuke_with_null_grammar_chains_phrases() {
    let res = resources(&[], false, None);
    let mut analyzer = Analyzer::new(res);

    let text = utf16("日本語");
    let result = analyzer
        .analyze_kakariuke(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(result.processed, 3);
    assert_eq!(result.phrases.len(), result.morphemes.len());
    let n = result.phrases.len();
    for (i, p) in result.phrases.iter().enumerate() {
        if i + 1 < n {
            assert_eq!(p.target, i + 1);
        } else {
            assert_eq!(p.target, i);
        }
    }
}

#[test]
fn kakariuke_with_grammar_builds_phrases() {
    // Breaks between general-noun POS 5 and itself mean each word is its
    // own phrase.
    let dic_entries = || {
        vec![
            WordEntry::new("あい", 5, 5),
            WordEntry::new("うえ", 5, 5),
        ]
    };
    let images = [Dic {
        name: "base",
        priority: 1,
        image: word_dic_v125(&dic_entries(), false),
    }];
    let dic_images: Vec<DictionaryImage> = images
        .iter()
        .map(|d| DictionaryImage {
            name: d.name,
            words: Some(&d.image),
            app_info: None,
            priority: d.priority,
        })
        .collect();
    let grammar = grammar_image(128, &[(5, 5)]);
    let res = Arc::new(
        ResourceSet::from_images(
            &dic_images,
            &CONN_IMG,
            Some(&grammar),
            None,
            &UNKNOWN_IMGS.0,
            &UNKNOWN_IMGS.1,
            None,
        )
        .unwrap(),
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("あいうえ");
    let result = analyzer
        .analyze_kakariuke(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(result.processed, 4);
    assert_eq!(result.morphemes.len(), 2);
    assert_eq!(result.phrases.len(), 2);
    assert_eq!(result.phrases[0].target, 1);
    assert_eq!(result.phrases[1].target, 1);
    // Phrase 0 covers the first word only.
    assert_eq!(result.phrases[0].first, 0);
    assert_eq!(result.phrases[0].len, 1);
}

#[test]
fn bug_emulation_changes_the_unknown_length_cut() {
    let make = || {
        Analyzer::new(resources(
            &[Dic {
                name: "base",
                priority: 1,
                image: word_dic_v125(&[WordEntry::new("猫", 5, 5)], false),
            }],
            false,
            None,
        ))
    };
    let text = utf16("あいうえお");

    let normal = AnalyzeOptions {
        max_word_length: 3,
        ..AnalyzeOptions::default()
    };
    let mut analyzer = make();
    let result = analyzer.analyze_morpho(&text, never, &normal).unwrap();
    assert!(
        result.morphemes.iter().any(|m| m.length >= 2),
        "the weighted limit allows multi-character runs"
    );

    let legacy = AnalyzeOptions {
        max_word_length: 3,
        emulate_bug: true,
        ..AnalyzeOptions::default()
    };
    let mut analyzer = make();
    let result = analyzer.analyze_morpho(&text, never, &legacy).unwrap();
    assert!(
        result.morphemes.iter().all(|m| m.length == 1),
        "the legacy check compares the weight against the word limit"
    );
}

#[test]
fn morphemes_never_split_surrogate_pairs() {
    let res = resources(&[], false, None);
    let mut analyzer = Analyzer::new(res);

    // U+20BB7 followed by plain kanji.
    let mut text: Vec<u16> = vec![0xD842, 0xDFB7];
    text.extend(utf16("野家"));
    let first = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    let pair = &first.morphemes[0];
    assert_eq!(pair.begin, 0);
    assert_eq!(pair.length, 2, "the pair is one two-unit morpheme");
    assert!(first.processed >= 2, "the cut cannot fall inside the pair");

    let mut done = first.processed;
    while done < text.len() {
        let next = analyzer
            .analyze_morpho(&text[done..], never, &AnalyzeOptions::default())
            .unwrap();
        assert!(next.processed > 0);
        done += next.processed;
    }
    assert_eq!(done, text.len());
}

#[test]
fn legacy_connection_table_analyzes() {
    let conn = connection_image_v115(128);
    let (umk, uc) = unknown_images(30);
    let res = Arc::new(
        ResourceSet::from_images(&[], &conn, None, None, &umk, &uc, None).unwrap(),
    );
    let mut analyzer = Analyzer::new(res);
    let text = utf16("日本");
    let (all, done) = analyze_all(&mut analyzer, &text, &AnalyzeOptions::default());
    assert_eq!(done, 2);
    assert_eq!(all, ["日", "本"]);
}

#[test]
fn handles_share_resources_across_threads() {
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: word_dic_v125(&[WordEntry::new("日本", 5, 5)], false),
        }],
        false,
        None,
    );
    let mut workers = Vec::new();
    for _ in 0..4 {
        let res = res.clone();
        workers.push(std::thread::spawn(move || {
            let mut analyzer = Analyzer::new(res);
            let text = utf16("日本語");
            let result = analyzer
                .analyze_morpho(&text, || false, &AnalyzeOptions::default())
                .unwrap();
            result.morphemes.len()
        }));
    }
    for w in workers {
        assert!(w.join().unwrap() >= 1);
    }
}

#[test]
fn kakariuke_stops_after_a_period_phrase() {
    let images = [Dic {
        name: "base",
        priority: 1,
        image: word_dic_v125(
            &[
                WordEntry::new("あ", 5, 5),
                WordEntry::new("い", 5, 5),
            ],
            false,
        ),
    }];
    let dic_images: Vec<DictionaryImage> = images
        .iter()
        .map(|d| DictionaryImage {
            name: d.name,
            words: Some(&d.image),
            app_info: None,
            priority: d.priority,
        })
        .collect();
    let grammar = grammar_image(128, &[]);
    let res = Arc::new(
        ResourceSet::from_images(
            &dic_images,
            &CONN_IMG,
            Some(&grammar),
            None,
            &UNKNOWN_IMGS.0,
            &UNKNOWN_IMGS.1,
            None,
        )
        .unwrap(),
    );
    let mut analyzer = Analyzer::new(res);

    // The control character takes the period POS and hard-stops phrase
    // generation; the trailing word is left unconsumed.
    let text = utf16("あ\u{1}い");
    let result = analyzer
        .analyze_kakariuke(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert_eq!(result.processed, 2);
    assert_eq!(result.phrases.len(), 1);
    assert_eq!(result.morphemes.len(), 2);
    assert_eq!(result.morphemes[1].pos, pos::PERIOD);
}

#[test]
fn max_word_length_option_limits_candidates() {
    let dic = word_dic_v125(&[WordEntry::new("あいう", 5, 1)], false);
    let res = resources(
        &[Dic {
            name: "base",
            priority: 1,
            image: dic,
        }],
        false,
        None,
    );
    let mut analyzer = Analyzer::new(res);

    let text = utf16("あいう");
    let opts = AnalyzeOptions {
        max_word_length: 2,
        ..AnalyzeOptions::default()
    };
    let result = analyzer.analyze_morpho(&text, never, &opts).unwrap();
    for m in &result.morphemes {
        assert!(m.length <= 2, "no morpheme may exceed the limit");
    }
}

#[test]
fn ignore_line_break_stretches_dictionary_word() {
    let make_res = || {
        resources(
            &[Dic {
                name: "base",
                priority: 1,
                image: word_dic_v125(&[WordEntry::new("あい", 5, 1)], false),
            }],
            false,
            None,
        )
    };

    let text = utf16("あ\r\nい");
    let opts = AnalyzeOptions {
        ignore_line_break: true,
        ..AnalyzeOptions::default()
    };
    let mut analyzer = Analyzer::new(make_res());
    let result = analyzer.analyze_morpho(&text, never, &opts).unwrap();
    let m = result
        .morphemes
        .iter()
        .find(|m| m.length == 4)
        .expect("the word spans the line break");
    assert_eq!(m.pos, 5);

    // Off by default: the break splits the word.
    let mut analyzer = Analyzer::new(make_res());
    let result = analyzer
        .analyze_morpho(&text, never, &AnalyzeOptions::default())
        .unwrap();
    assert!(result.morphemes.iter().all(|m| m.length < 4));
}
