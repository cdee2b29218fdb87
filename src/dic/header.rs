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

//! Common resource-file framing: every binary resource starts with a
//! 48-byte ASCII comment followed by a 16-byte ASCII version tag. The tag
//! is compared like a C string: bytes up to and including the first NUL
//! must match the expected tag exactly.

use thiserror::Error;

/// Size of the free-form comment at the head of every resource.
pub const COMMENT_SIZE: usize = 48;
/// Size of the version tag following the comment.
pub const VERSION_SIZE: usize = 16;
/// Total framing size before the resource body.
pub const HEADER_SIZE: usize = COMMENT_SIZE + VERSION_SIZE;

/// Word dictionary, V1.25 with void-word support.
pub const WORD_DIC_V125_VOID: &[u8; VERSION_SIZE] = b"WRD V1.25V-    \0";
/// Word dictionary, V1.25 without void words.
pub const WORD_DIC_V125: &[u8; VERSION_SIZE] = b"WRD V1.25-     \0";
/// Word dictionary, legacy compact V1.24 layout.
pub const WORD_DIC_V124: &[u8; VERSION_SIZE] = b"WRD V1.24-     \0";
/// Application-information dictionary.
pub const APP_DIC_V123: &[u8; VERSION_SIZE] = b"WRD APP V1.23- \0";
/// Connection-cost table.
pub const CONNECT_V116: &[u8; VERSION_SIZE] = b"CON V1.16-     \0";
/// Legacy uncompressed connection-cost table.
pub const CONNECT_V115: &[u8; VERSION_SIZE] = b"CON V1.15-     \0";
/// Grammar (dependency) table.
pub const GRAMMAR_V111: &[u8; VERSION_SIZE] = b"GRM V1.11-     \0";
/// English-token character-class table with per-type costs.
pub const ENGLISH_V108: &[u8; VERSION_SIZE] = b"EMK V1.08-     \0";
/// Legacy English-token character-class table, built-in costs.
pub const ENGLISH_V107: &[u8; VERSION_SIZE] = b"EMK V1.07-     \0";
/// Unknown-word character-class table.
pub const UNKNOWN_V101: &[u8; VERSION_SIZE] = b"UMK V1.01-     \0";
/// Unknown-word cost table.
pub const UNKNOWN_COST_V102: &[u8; VERSION_SIZE] = b"UC V1.02-      \0";
/// Normalization (replacement) table.
pub const NORMALIZE_V101: &[u8; VERSION_SIZE] = b"STD V1.01-     \0";

#[derive(Error, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum HeaderError {
    #[error("Unsupported version of {0}")]
    InvalidVersion(&'static str),

    #[error("Resource {0} is shorter than its header")]
    TooShort(&'static str),
}

/// Resource header: comment plus version tag.
pub struct Header<'a> {
    comment: &'a [u8],
    version: &'a [u8],
}

impl<'a> Header<'a> {
    /// Splits the header off `data`. `resource` names the file for errors.
    pub fn parse(data: &'a [u8], resource: &'static str) -> Result<Header<'a>, HeaderError> {
        if data.len() < HEADER_SIZE {
            return Err(HeaderError::TooShort(resource));
        }
        Ok(Header {
            comment: &data[..COMMENT_SIZE],
            version: &data[COMMENT_SIZE..HEADER_SIZE],
        })
    }

    /// C-string comparison of the stored tag against an expected one.
    pub fn version_is(&self, tag: &[u8; VERSION_SIZE]) -> bool {
        for i in 0..VERSION_SIZE {
            if self.version[i] != tag[i] {
                return false;
            }
            if tag[i] == 0 {
                break;
            }
        }
        true
    }

    pub fn comment(&self) -> &'a [u8] {
        self.comment
    }
}

/// Checks a resource against one expected version tag and returns its body.
pub fn body_checked<'a>(
    data: &'a [u8],
    tag: &[u8; VERSION_SIZE],
    resource: &'static str,
) -> Result<&'a [u8], HeaderError> {
    let header = Header::parse(data, resource)?;
    if !header.version_is(tag) {
        return Err(HeaderError::InvalidVersion(resource));
    }
    Ok(&data[HEADER_SIZE..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(tag: &[u8; VERSION_SIZE]) -> Vec<u8> {
        let mut img = vec![b' '; COMMENT_SIZE];
        img.extend_from_slice(tag);
        img.extend_from_slice(&[1, 2, 3, 4]);
        img
    }

    #[test]
    fn accepts_exact_tag() {
        let img = image(CONNECT_V116);
        let body = body_checked(&img, CONNECT_V116, "connect").unwrap();
        assert_eq!(body, &[1, 2, 3, 4]);
    }

    #[test]
    fn rejects_other_tag() {
        let img = image(CONNECT_V115);
        assert_eq!(
            body_checked(&img, CONNECT_V116, "connect"),
            Err(HeaderError::InvalidVersion("connect"))
        );
    }

    #[test]
    fn rejects_truncated_header() {
        assert_eq!(
            Header::parse(&[0u8; 10], "connect").err(),
            Some(HeaderError::TooShort("connect"))
        );
    }

    #[test]
    fn terminator_byte_participates() {
        // The NUL at offset 15 is part of the tag; a resource missing it
        // does not match.
        let mut img = image(WORD_DIC_V125);
        img[COMMENT_SIZE + 15] = 0xEE;
        let header = Header::parse(&img, "worddic").unwrap();
        assert!(!header.version_is(WORD_DIC_V125));
        assert!(!header.version_is(WORD_DIC_V125_VOID));
    }

    #[test]
    fn void_and_plain_dictionaries_differ() {
        let img = image(WORD_DIC_V125_VOID);
        let header = Header::parse(&img, "worddic").unwrap();
        assert!(header.version_is(WORD_DIC_V125_VOID));
        assert!(!header.version_is(WORD_DIC_V125));
    }
}
