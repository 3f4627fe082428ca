//! Front matter + body documents.
//!
//! A document may start with a metadata block bounded by two `---` lines.
//! Each line inside the block is a `key: value` pair. Whatever follows the
//! closing `---` line is the body and is kept byte-for-byte.

use std::collections::BTreeMap;

use log::trace;
use serde::Serialize;

pub(crate) const SENTINEL: &str = "---";

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Document {
    metadata: BTreeMap<String, String>,
    body: String,
}

impl Document {
    /// Splits `input` into metadata and body.
    ///
    /// Never fails: an unterminated block or a document without a leading
    /// sentinel yields empty metadata and the whole input as body.
    pub fn parse(input: &str) -> Self {
        let mut offset = 0;
        let mut opened = false;
        let mut metadata = BTreeMap::new();

        for line in input.split_inclusive('\n') {
            offset += line.len();

            if !opened {
                if line.trim().is_empty() {
                    continue;
                }
                if !is_sentinel(line) {
                    break;
                }
                opened = true;
                continue;
            }

            if is_sentinel(line) {
                return Self {
                    metadata,
                    body: input[offset..].to_string(),
                };
            }
            if line.trim().is_empty() {
                continue;
            }
            match parse_entry(line) {
                Some((key, value)) => {
                    metadata.insert(key.to_string(), value.to_string());
                }
                None => trace!("skipping malformed metadata line: {:?}", line),
            }
        }

        if opened {
            trace!("metadata block is not terminated. treating everything as body");
        }
        Self::verbatim(input)
    }

    fn verbatim(input: &str) -> Self {
        Self {
            metadata: BTreeMap::new(),
            body: input.to_string(),
        }
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_parts(self) -> (BTreeMap<String, String>, String) {
        (self.metadata, self.body)
    }
}

fn is_sentinel(line: &str) -> bool {
    line.trim_end() == SENTINEL
}

fn parse_entry(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value.trim()))
}
