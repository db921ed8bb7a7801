//! YAML front matter at the head of a post.
//!
//! The block is kept as raw lines so that re-emitting it reproduces the
//! author's formatting and key order exactly. The parsed mapping is only used
//! to validate the block and to answer key lookups.

use crate::error::ConvertError;
use anyhow::{Context, Result};
use serde_yaml::{Mapping, Value};
use std::fmt;
use tracing::{debug, warn};

const DELIMITER: &str = "---";
pub const ALIAS_KEY: &str = "alias";

#[derive(Debug, Clone)]
pub struct FrontMatter {
    opening: String,
    /// Raw entry lines, each with its original line ending
    entries: Vec<String>,
    closing: String,
    mapping: Mapping,
}

impl FrontMatter {
    pub fn contains_key(&self, key: &str) -> bool {
        self.mapping.contains_key(key)
    }

    /// Keys in the order they appear in the block
    pub fn keys(&self) -> Vec<String> {
        self.mapping
            .keys()
            .filter_map(|k| k.as_str().map(str::to_string))
            .collect()
    }

    /// Append `alias: <name>` right before the closing delimiter.
    ///
    /// Returns `false` and leaves the block untouched when an alias is
    /// already recorded, so the block never ends up with a duplicate key.
    pub fn inject_alias(&mut self, name: &str) -> Result<bool> {
        if self.contains_key(ALIAS_KEY) {
            warn!(alias = name, "front matter already has an alias, leaving it unchanged");
            return Ok(false);
        }

        let value = serde_yaml::to_string(name)
            .with_context(|| format!("Failed to encode alias {name:?} as YAML"))?;
        let newline = if self.closing.ends_with("\r\n") {
            "\r\n"
        } else {
            "\n"
        };
        self.entries
            .push(format!("{ALIAS_KEY}: {}{newline}", value.trim_end()));
        self.mapping
            .insert(Value::from(ALIAS_KEY), Value::from(name));

        // A flow mapping like `{tags: [a]}` can't take an appended block entry
        if parse_mapping(&self.entries.concat()).is_err() {
            debug!("front matter is not block style, re-emitting it");
            let yaml = serde_yaml::to_string(&self.mapping)
                .context("Failed to encode front matter as YAML")?;
            self.entries = yaml
                .lines()
                .map(|line| format!("{line}{newline}"))
                .collect();
        }

        debug!(alias = name, "injected alias into front matter");
        Ok(true)
    }
}

impl fmt::Display for FrontMatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opening)?;
        for entry in &self.entries {
            f.write_str(entry)?;
        }
        f.write_str(&self.closing)
    }
}

/// Split a leading `---` delimited block off the text.
///
/// The block is only recognised when the very first line is a delimiter.
/// Returns the block (if any) and the remaining body.
pub fn split_front_matter(text: &str) -> Result<(Option<FrontMatter>, &str), ConvertError> {
    let mut lines = text.split_inclusive('\n');

    let opening = match lines.next() {
        Some(line) if is_delimiter(line) => line,
        _ => return Ok((None, text)),
    };

    let mut offset = opening.len();
    let mut entries: Vec<String> = Vec::new();

    for line in lines {
        offset += line.len();
        if is_delimiter(line) {
            let mapping = parse_mapping(&entries.concat())?;
            debug!(keys = mapping.len(), "found front matter");
            let front_matter = FrontMatter {
                opening: opening.to_string(),
                entries,
                closing: line.to_string(),
                mapping,
            };
            return Ok((Some(front_matter), &text[offset..]));
        }
        entries.push(line.to_string());
    }

    Err(ConvertError::UnclosedFrontMatter)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn parse_mapping(yaml: &str) -> Result<Mapping, ConvertError> {
    if yaml.trim().is_empty() {
        return Ok(Mapping::new());
    }

    let value: Value =
        serde_yaml::from_str(yaml).map_err(|e| ConvertError::MalformedFrontMatter {
            reason: e.to_string(),
        })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(ConvertError::MalformedFrontMatter {
            reason: "expected key-value pairs".to_string(),
        }),
    }
}
