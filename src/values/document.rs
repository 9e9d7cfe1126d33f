//! Structured YAML documents with path-based overrides.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

use crate::error::{Result, ServiceError};

/// A single leaf override: dotted path and the value to put there.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOverride {
    /// Dotted path such as `remoteControlPlane.api.hostname`.
    pub path: String,
    pub value: Value,
}

impl FieldOverride {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }
}

/// A YAML document loaded as a generic tree.
///
/// Mappings keep their key order, so fields that are not overridden are
/// written back exactly as they were read.
///
/// # Example
///
/// ```
/// use crossplane_service::values::{FieldOverride, ValuesDocument};
///
/// let mut doc = ValuesDocument::parse("a: 1\nb:\n  c: 2\n").unwrap();
/// doc.apply(&[FieldOverride::new("b.c", 5)]).unwrap();
///
/// let expected = ValuesDocument::parse("a: 1\nb:\n  c: 5\n").unwrap();
/// assert_eq!(doc, expected);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesDocument {
    root: Value,
}

impl ValuesDocument {
    /// Load a document from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| ServiceError::DocumentLoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ServiceError::DocumentParseFailed { message, .. } => {
                ServiceError::DocumentParseFailed {
                    path: path.to_path_buf(),
                    message,
                }
            }
            other => other,
        })
    }

    /// Parse a document from a string.
    ///
    /// An empty input is treated as an empty mapping.
    pub fn parse(content: &str) -> Result<Self> {
        let root: Value =
            serde_yaml::from_str(content).map_err(|e| ServiceError::DocumentParseFailed {
                path: Default::default(),
                message: e.to_string(),
            })?;

        let root = match root {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        };

        Ok(Self { root })
    }

    /// Read the value at a dotted path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path.split('.').try_fold(&self.root, |node, key| node.get(key))
    }

    /// Set the value at a dotted path.
    ///
    /// Missing intermediate mappings are created. Fails if an existing
    /// intermediate node is a scalar or a sequence.
    pub fn set(&mut self, path: &str, value: Value) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Self::patch_error(path, "empty path segment"));
        }

        let (leaf, parents) = segments
            .split_last()
            .ok_or_else(|| Self::patch_error(path, "empty path"))?;

        let mut node = &mut self.root;
        for segment in parents {
            let Value::Mapping(map) = node else {
                return Err(Self::patch_error(path, &format!("'{}' is not a mapping", segment)));
            };
            node = map
                .entry(Value::String(segment.to_string()))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
        }

        match node {
            Value::Mapping(map) => {
                map.insert(Value::String(leaf.to_string()), value);
                Ok(())
            }
            _ => Err(Self::patch_error(path, "parent is not a mapping")),
        }
    }

    /// Apply overrides in order.
    pub fn apply(&mut self, overrides: &[FieldOverride]) -> Result<()> {
        for field in overrides {
            self.set(&field.path, field.value.clone())?;
        }
        Ok(())
    }

    /// Serialize the document to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(|e| ServiceError::DocumentIo {
            path: Default::default(),
            message: e.to_string(),
        })
    }

    /// Write the document to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_error = |message: String| ServiceError::DocumentIo {
            path: path.to_path_buf(),
            message,
        };

        let yaml = self.to_yaml().map_err(|e| io_error(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(e.to_string()))?;
        }
        fs::write(path, yaml).map_err(|e| io_error(e.to_string()))
    }

    /// The underlying tree.
    pub fn root(&self) -> &Value {
        &self.root
    }

    fn patch_error(path: &str, reason: &str) -> ServiceError {
        ServiceError::DocumentIo {
            path: Default::default(),
            message: format!("cannot set '{}': {}", path, reason),
        }
    }
}
