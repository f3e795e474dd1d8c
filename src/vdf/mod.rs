//! Parser for Valve's text KeyValues format (VDF/ACF).
//!
//! Steam describes libraries, installed apps and per-user settings with a
//! nested key-value text format:
//!
//! ```text
//! "AppState"
//! {
//!     "appid"     "620"
//!     "name"      "Portal 2"
//!     "UserConfig"
//!     {
//!         "language"  "english"
//!     }
//! }
//! ```
//!
//! The parser is deliberately permissive. Callers scan many independently
//! written descriptor files and need one malformed file to yield "nothing
//! found here" instead of aborting the whole scan, so [`parse`] never fails:
//!
//! - a `}` with no open section is ignored
//! - a `{` with no pending key is ignored
//! - a key still waiting for its value when its section closes stays pending,
//!   and pairs with the next string or `{` in the enclosing section
//! - a key left without a value at the end of the input is dropped
//! - a `"` without a closing quote is skipped and scanning continues after it
//! - sections still open at the end of the input keep what was parsed so far
//!
//! Quoted strings are copied literally (no escape processing). Anything outside
//! a quoted string or a brace is skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Result, UninstallerError};


/// A node of a parsed VDF document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VdfValue {
    /// A leaf string value
    Str(String),
    /// A nested section
    Map(VdfMap),
}

impl VdfValue {
    /// Returns the string if this node is a leaf.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            VdfValue::Str(s) => Some(s),
            VdfValue::Map(_) => None,
        }
    }

    /// Returns the section if this node is a nested map.
    pub fn as_map(&self) -> Option<&VdfMap> {
        match self {
            VdfValue::Map(map) => Some(map),
            VdfValue::Str(_) => None,
        }
    }
}

/// An insertion-ordered section of a VDF document.
///
/// Writing an existing key replaces its value in place (last write wins) and
/// keeps the key's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VdfMap {
    entries: Vec<(String, VdfValue)>,
    index: HashMap<String, usize>,
}

impl VdfMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: VdfValue) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&VdfValue> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    /// Get a leaf value; `None` if absent or if `key` names a section.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(VdfValue::as_str)
    }

    /// Get a nested section; `None` if absent or if `key` names a leaf.
    pub fn get_map(&self, key: &str) -> Option<&VdfMap> {
        self.get(key).and_then(VdfValue::as_map)
    }

    /// Follow a chain of nested section names.
    ///
    /// An empty path returns `self`.
    pub fn lookup_path(&self, path: &[&str]) -> Option<&VdfMap> {
        path.iter().try_fold(self, |map, key| map.get_map(key))
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VdfValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Str(&'a str),
    Open,
    Close,
}

/// Splits VDF text into quoted strings and braces.
struct Tokenizer<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        // Only ASCII bytes are matched, so every slice boundary below falls on
        // a char boundary.
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let b = bytes[self.pos];
            self.pos += 1;
            match b {
                b'{' => return Some(Token::Open),
                b'}' => return Some(Token::Close),
                b'"' => {
                    let start = self.pos;
                    // An unmatched quote is skipped like any other stray byte
                    if let Some(len) = bytes[start..].iter().position(|&c| c == b'"') {
                        self.pos = start + len + 1;
                        return Some(Token::Str(&self.text[start..start + len]));
                    }
                }
                _ => {}
            }
        }
        None
    }
}

/// Parse VDF text into its root section.
///
/// Never fails; see the module documentation for the recovery rules.
pub fn parse(text: &str) -> VdfMap {
    let mut root = VdfMap::new();
    // Sections opened but not yet closed, with the key they belong to.
    let mut open: Vec<(String, VdfMap)> = Vec::new();
    let mut pending: Option<String> = None;

    for token in Tokenizer::new(text) {
        match token {
            Token::Str(s) => match pending.take() {
                None => pending = Some(s.to_string()),
                Some(key) => {
                    current(&mut root, &mut open).insert(key, VdfValue::Str(s.to_string()));
                }
            },
            Token::Open => {
                if let Some(key) = pending.take() {
                    open.push((key, VdfMap::new()));
                }
            }
            // The pending key survives the close
            Token::Close => {
                if let Some((key, map)) = open.pop() {
                    current(&mut root, &mut open).insert(key, VdfValue::Map(map));
                }
            }
        }
    }

    while let Some((key, map)) = open.pop() {
        current(&mut root, &mut open).insert(key, VdfValue::Map(map));
    }

    root
}

fn current<'m>(root: &'m mut VdfMap, open: &'m mut [(String, VdfMap)]) -> &'m mut VdfMap {
    match open.last_mut() {
        Some((_, map)) => map,
        None => root,
    }
}

/// Read and parse a VDF file.
///
/// Reading is the only failure mode; the content itself is parsed leniently.
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_file(path: &Path) -> Result<VdfMap> {
    let bytes = fs::read(path).map_err(|source| UninstallerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(&String::from_utf8_lossy(&bytes)))
}
