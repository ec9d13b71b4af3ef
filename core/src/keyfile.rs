//! Key-group text files.
//!
//! The format is the one desktop configuration files use:
//!
//! ```text
//! # comment
//! [keys]
//! 2 = a,b,c,2
//! KP_3 = d,e,f,3
//! ```
//!
//! A file is a list of `[group]` sections holding `name = value` entries.
//! Structural problems (an entry outside any group, a line without `=`, a
//! broken header) reject the whole file. Whether an individual value makes
//! sense is left to the caller.

use crate::error::ConfigError;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Group {
    name: String,
    entries: Vec<(String, String)>,
}

impl Group {
    fn set(&mut self, key: String, value: String) {
        // Later duplicates win but keep the original position
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// Parsed key file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFile {
    groups: Vec<Group>,
}

impl KeyFile {
    /// Parse key-file text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut file = KeyFile::default();
        let mut current: Option<usize> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| ConfigError::Syntax {
                    line: line_no,
                    message: format!("unterminated group header \"{}\"", line),
                })?;
                if name.is_empty() || name.contains(['[', ']']) {
                    return Err(ConfigError::Syntax {
                        line: line_no,
                        message: format!("invalid group name \"{}\"", name),
                    });
                }
                current = Some(file.group_index_or_insert(name));
                continue;
            }

            let group = current.ok_or_else(|| ConfigError::Syntax {
                line: line_no,
                message: "key file does not start with a group".to_string(),
            })?;

            let (key, value) = line.split_once('=').ok_or_else(|| ConfigError::Syntax {
                line: line_no,
                message: format!("\"{}\" is not a group, key or comment", line),
            })?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Syntax {
                    line: line_no,
                    message: "empty key name".to_string(),
                });
            }

            file.groups[group].set(key.to_string(), value.trim().to_string());
        }

        Ok(file)
    }

    /// Read and parse a key file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(idx) = self.groups.iter().position(|g| g.name == name) {
            return idx;
        }
        self.groups.push(Group {
            name: name.to_string(),
            entries: Vec::new(),
        });
        self.groups.len() - 1
    }

    fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Group names in file order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.group(group).is_some()
    }

    /// Entry names of a group in file order.
    pub fn keys(&self, group: &str) -> Result<Vec<&str>, ConfigError> {
        let group = self
            .group(group)
            .ok_or_else(|| ConfigError::MissingGroup(group.to_string()))?;
        Ok(group.entries.iter().map(|(k, _)| k.as_str()).collect())
    }

    /// Raw value of an entry, escapes untouched.
    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        self.group(group)?
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of an entry split into a list.
    ///
    /// `\s`, `\n`, `\t`, `\r`, `\\` and a backslash-escaped separator are
    /// unescaped. A trailing separator terminates the list without adding an
    /// empty element.
    pub fn get_string_list(&self, group: &str, key: &str, separator: char) -> Option<Vec<String>> {
        self.get(group, key)
            .map(|value| split_string_list(value, separator))
    }
}

/// Split a raw list value on `separator`, honouring escapes.
pub fn split_string_list(value: &str, separator: char) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('s') => current.push(' '),
                Some('n') => current.push('\n'),
                Some('t') => current.push('\t'),
                Some('r') => current.push('\r'),
                Some('\\') => current.push('\\'),
                Some(c) if c == separator => current.push(c),
                Some(c) => {
                    current.push('\\');
                    current.push(c);
                }
                None => current.push('\\'),
            }
        } else if ch == separator {
            items.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }

    if !current.is_empty() {
        items.push(current);
    }
    items
}

/// Join list items into a key-file value, escaping what `split_string_list`
/// would otherwise misread.
pub fn join_string_list<S: AsRef<str>>(items: &[S], separator: char) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(separator);
        }
        for ch in item.as_ref().chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                ' ' => out.push_str("\\s"),
                '\n' => out.push_str("\\n"),
                '\t' => out.push_str("\\t"),
                '\r' => out.push_str("\\r"),
                c if c == separator => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
    }
    out
}
