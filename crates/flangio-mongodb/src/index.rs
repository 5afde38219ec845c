//! Index specifications: ordered (field, direction) pairs

use bson::Document as BsonDocument;
use flangio_common::{FlangioError, Result};

/// Maximum allowed length for field names
const MAX_FIELD_NAME_LENGTH: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexDirection {
    Ascending,
    Descending,
}

impl IndexDirection {
    pub fn as_i32(self) -> i32 {
        match self {
            IndexDirection::Ascending => 1,
            IndexDirection::Descending => -1,
        }
    }

    pub fn from_i64(value: i64) -> Result<Self> {
        match value {
            1 => Ok(IndexDirection::Ascending),
            -1 => Ok(IndexDirection::Descending),
            other => Err(FlangioError::Validation(format!(
                "Index direction must be 1 or -1, got {}",
                other
            ))),
        }
    }
}

/// Ordered index keys for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    keys: Vec<(String, IndexDirection)>,
}

impl IndexSpec {
    pub fn new(keys: Vec<(String, IndexDirection)>) -> Result<Self> {
        if keys.is_empty() {
            return Err(FlangioError::Validation(
                "An index needs at least one field".to_string(),
            ));
        }
        for (field, _) in &keys {
            validate_field_name(field)?;
        }
        for (i, (field, _)) in keys.iter().enumerate() {
            if keys[..i].iter().any(|(seen, _)| seen == field) {
                return Err(FlangioError::Validation(format!(
                    "Field '{}' appears twice in the index",
                    field
                )));
            }
        }
        Ok(Self { keys })
    }

    /// Single ascending field
    pub fn ascending(field: impl Into<String>) -> Result<Self> {
        Self::new(vec![(field.into(), IndexDirection::Ascending)])
    }

    /// Parses `"name:1, created:-1"`; a bare field name is ascending
    pub fn parse(text: &str) -> Result<Self> {
        let mut keys = Vec::new();
        for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (field, direction) = match part.rsplit_once(':') {
                Some((field, dir)) => {
                    let value: i64 = dir.trim().parse().map_err(|_| {
                        FlangioError::Validation(format!(
                            "Index direction must be 1 or -1, got '{}'",
                            dir.trim()
                        ))
                    })?;
                    (field.trim(), IndexDirection::from_i64(value)?)
                }
                None => (part, IndexDirection::Ascending),
            };
            keys.push((field.to_string(), direction));
        }
        Self::new(keys)
    }

    pub fn keys(&self) -> &[(String, IndexDirection)] {
        &self.keys
    }

    /// Key document in declaration order, e.g. `{name: 1, created: -1}`
    pub fn to_document(&self) -> BsonDocument {
        let mut doc = BsonDocument::new();
        for (field, direction) in &self.keys {
            doc.insert(field.clone(), direction.as_i32());
        }
        doc
    }

    /// Name MongoDB gives the index by default, e.g. `name_1_created_-1`
    pub fn default_name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, direction)| format!("{}_{}", field, direction.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

fn validate_field_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FlangioError::Validation(
            "Field name cannot be empty".to_string(),
        ));
    }
    if name.len() > MAX_FIELD_NAME_LENGTH {
        return Err(FlangioError::Validation(format!(
            "Field name exceeds maximum length of {} characters",
            MAX_FIELD_NAME_LENGTH
        )));
    }
    if name.contains('\0') {
        return Err(FlangioError::Validation(
            "Field name cannot contain null bytes".to_string(),
        ));
    }
    if name.starts_with('$') {
        return Err(FlangioError::Validation(format!(
            "Field name cannot start with '$' (reserved for operators): '{}'",
            name
        )));
    }
    Ok(())
}
