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

use std::fmt::Debug;
use std::io::Error;
use thiserror::Error;

use crate::config::ConfigError;
use crate::dic::header::HeaderError;

pub type KotohaResult<T> = Result<T, KotohaError>;

/// Kotoha error
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KotohaError {
    #[error("{context}: {cause}")]
    ErrWithContext {
        context: String,
        cause: Box<KotohaError>,
    },

    #[error("{context}: {cause}")]
    Io {
        cause: std::io::Error,
        context: String,
    },

    #[error("Invalid header: {0}")]
    InvalidHeader(#[from] HeaderError),

    #[error("Malformed resource {resource} at offset {offset}")]
    MalformedResource {
        resource: &'static str,
        offset: usize,
    },

    #[error("Config Error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Serde error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Error from nom {0}")]
    NomParseError(String),

    #[error("Invalid data format: {1} at line {0}")]
    InvalidDataFormat(usize, String),

    #[error("Too many word dictionaries, no more than {0} are supported")]
    TooManyDictionaries(usize),

    #[error("Word dictionary {dic} has {words} records but its application dictionary has {infos}")]
    RecordCountMismatch { dic: usize, words: u32, infos: u32 },

    #[error("Morpheme buffer overflow")]
    MorphemeBufferOverflow,

    #[error("Sub-morpheme buffer overflow")]
    SubMorphemeBufferOverflow,

    #[error("POS number {0} is outside the connection table")]
    InvalidPos(u16),

    #[error("Phrase buffer overflow")]
    PhraseBufferOverflow,

    #[error("Morpheme is not an English token")]
    NotEnglishToken,

    #[error("Analysis canceled by the stop function")]
    Canceled,
}

impl From<std::io::Error> for KotohaError {
    fn from(e: Error) -> Self {
        KotohaError::Io {
            cause: e,
            context: String::from("IO Error"),
        }
    }
}

impl KotohaError {
    pub fn with_context<S: Into<String>>(self, ctx: S) -> Self {
        match self {
            KotohaError::Io { cause, .. } => KotohaError::Io {
                cause,
                context: ctx.into(),
            },
            cause => KotohaError::ErrWithContext {
                cause: Box::new(cause),
                context: ctx.into(),
            },
        }
    }
}

pub type KotohaNomResult<I, O> = nom::IResult<I, O, KotohaNomError<I>>;

/// Custom nom error
#[derive(Debug, PartialEq)]
pub enum KotohaNomError<I> {
    Nom(I, nom::error::ErrorKind),
}

impl<I> nom::error::ParseError<I> for KotohaNomError<I> {
    fn from_error_kind(input: I, kind: nom::error::ErrorKind) -> Self {
        KotohaNomError::Nom(input, kind)
    }
    fn append(_: I, _: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I: Debug> From<nom::Err<KotohaNomError<I>>> for KotohaError {
    fn from(err: nom::Err<KotohaNomError<I>>) -> Self {
        KotohaError::NomParseError(format!("{}", err))
    }
}
