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

//! Backing storage of a binary resource image: either a memory-mapped file
//! or an owned byte buffer. Resource parsers only ever see `&[u8]`.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use crate::error::{KotohaError, KotohaResult};

pub enum Storage {
    File(Mmap),
    Owned(Vec<u8>),
}

impl Storage {
    /// Memory-maps the file at `path`.
    pub fn map(path: &Path) -> KotohaResult<Storage> {
        let file = File::open(path).map_err(|e| {
            KotohaError::from(e).with_context(format!("reading {}", path.display()))
        })?;
        let mapping = unsafe { Mmap::map(&file) }.map_err(|e| {
            KotohaError::from(e).with_context(format!("mapping {}", path.display()))
        })?;
        Ok(Storage::File(mapping))
    }

    pub fn view(&self) -> &[u8] {
        match self {
            Storage::File(m) => m,
            Storage::Owned(v) => v,
        }
    }
}

impl From<Vec<u8>> for Storage {
    fn from(data: Vec<u8>) -> Self {
        Storage::Owned(data)
    }
}
