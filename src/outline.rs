//! Outline decoding and normalization.
//!
//! An outline is a YAML sequence whose items are either bare labels or
//! single-key mappings from a label to a nested sequence:
//!
//! ```yaml
//! - Reading list
//! - Projects:
//!     - notemap
//!     - garden
//! ```
//!
//! [`parse_outline`] decodes the document into [`OutlineEntry`] values and
//! [`normalize`] turns them into [`HierarchyRecord`]s, the uniform
//! `{id, children?}` shape consumed by the hierarchy builder.

use log::debug;
use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;

/// One item of an outline as it appears in the source document.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineEntry {
    /// A leaf label.
    Label(String),
    /// A mapping from labels to nested entries. Well-formed outlines only
    /// ever contain single-key mappings; other key counts are kept here so
    /// that [`normalize`] can report them.
    Mapping(Vec<(String, Vec<OutlineEntry>)>),
}

impl OutlineEntry {
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn branch(label: impl Into<String>, children: Vec<OutlineEntry>) -> Self {
        Self::Mapping(vec![(label.into(), children)])
    }
}

/// Uniform hierarchy input: `{id, children?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<HierarchyRecord>>,
}

impl HierarchyRecord {
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: None,
        }
    }

    pub fn with_children(id: impl Into<String>, children: Vec<HierarchyRecord>) -> Self {
        Self {
            id: id.into(),
            children: Some(children),
        }
    }

    /// Children of this record, empty for leaves.
    pub fn children(&self) -> &[HierarchyRecord] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Number of records in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(HierarchyRecord::subtree_len)
            .sum::<usize>()
    }

    /// The outline entry this record was normalized from.
    pub fn to_outline(&self) -> OutlineEntry {
        match &self.children {
            None => OutlineEntry::Label(self.id.clone()),
            Some(children) => OutlineEntry::branch(
                self.id.clone(),
                children.iter().map(HierarchyRecord::to_outline).collect(),
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("outline must be a sequence of entries, found {found}")]
    NotASequence { found: &'static str },

    #[error("malformed entry at {location}: expected exactly one label key, found {keys}")]
    MalformedEntry { location: String, keys: usize },

    #[error("unsupported {found} at {location}: entries must be labels or label mappings")]
    UnsupportedValue {
        location: String,
        found: &'static str,
    },
}

/// Decodes a YAML outline document.
///
/// An empty document is an empty forest.
pub fn parse_outline(source: &str) -> Result<Vec<OutlineEntry>, OutlineError> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_yaml::from_str(source)?;
    let entries = match untag(&value) {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items
            .iter()
            .map(|item| entry_from_value(item, &[]))
            .collect::<Result<Vec<_>, _>>()?,
        other => {
            return Err(OutlineError::NotASequence {
                found: value_kind(other),
            });
        }
    };
    debug!(entries = entries.len(); "Outline decoded");
    Ok(entries)
}

/// Normalizes outline entries into hierarchy records, preserving order.
pub fn normalize(entries: &[OutlineEntry]) -> Result<Vec<HierarchyRecord>, OutlineError> {
    normalize_at(entries, &[])
}

fn normalize_at(
    entries: &[OutlineEntry],
    path: &[String],
) -> Result<Vec<HierarchyRecord>, OutlineError> {
    entries
        .iter()
        .map(|entry| match entry {
            OutlineEntry::Label(label) => Ok(HierarchyRecord::leaf(label.clone())),
            OutlineEntry::Mapping(branches) => match branches.as_slice() {
                [(label, children)] => {
                    let child_path = extend_path(path, label);
                    Ok(HierarchyRecord::with_children(
                        label.clone(),
                        normalize_at(children, &child_path)?,
                    ))
                }
                _ => Err(OutlineError::MalformedEntry {
                    location: describe_location(path),
                    keys: branches.len(),
                }),
            },
        })
        .collect()
}

fn entry_from_value(value: &Value, path: &[String]) -> Result<OutlineEntry, OutlineError> {
    match untag(value) {
        Value::Mapping(mapping) => {
            let mut branches = Vec::with_capacity(mapping.len());
            for (key, children) in mapping {
                let label = scalar_label(untag(key)).ok_or_else(|| {
                    OutlineError::UnsupportedValue {
                        location: describe_location(path),
                        found: value_kind(untag(key)),
                    }
                })?;
                let child_path = extend_path(path, &label);
                let children = children_from_value(children, &child_path)?;
                branches.push((label, children));
            }
            Ok(OutlineEntry::Mapping(branches))
        }
        other => scalar_label(other)
            .map(OutlineEntry::Label)
            .ok_or_else(|| OutlineError::UnsupportedValue {
                location: describe_location(path),
                found: value_kind(other),
            }),
    }
}

fn children_from_value(value: &Value, path: &[String]) -> Result<Vec<OutlineEntry>, OutlineError> {
    match untag(value) {
        // `- Label:` with nothing below it
        Value::Null => Ok(Vec::new()),
        Value::Sequence(items) => items
            .iter()
            .map(|item| entry_from_value(item, path))
            .collect(),
        other => Err(OutlineError::UnsupportedValue {
            location: describe_location(path),
            found: value_kind(other),
        }),
    }
}

fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn extend_path(path: &[String], label: &str) -> Vec<String> {
    let mut next = path.to_vec();
    next.push(label.to_string());
    next
}

fn describe_location(path: &[String]) -> String {
    if path.is_empty() {
        "top level".to_string()
    } else {
        format!("`{}`", path.join(" > "))
    }
}
