use crate::error::InternalError;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// StreamOptionsError
///
/// Rejections raised while mapping physical index columns into key and
/// projection slots.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StreamOptionsError {
    #[error("index stream options must name at least one key field")]
    EmptyKeyFields,

    #[error("index stream field {field} is out of range for rows of width {width}")]
    FieldOutOfRange { field: usize, width: usize },

    #[error("index stream key field {field} is listed more than once")]
    DuplicateKeyField { field: usize },

    #[error("index stream row {row} has width {found}, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
}

impl From<StreamOptionsError> for InternalError {
    fn from(err: StreamOptionsError) -> Self {
        Self::config_unsupported(err.to_string())
    }
}

///
/// IndexStreamOptions
///
/// Column mapping chosen by index selection for one participating index.
/// `used_key_fields` are the physical columns forming the compared key
/// prefix (in key order); `projected_fields` are carried through as
/// projections. A projected field may repeat a key field.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IndexStreamOptions {
    pub used_key_fields: Vec<usize>,
    #[serde(default)]
    pub projected_fields: Vec<usize>,
}

impl IndexStreamOptions {
    #[must_use]
    pub const fn new(used_key_fields: Vec<usize>, projected_fields: Vec<usize>) -> Self {
        Self {
            used_key_fields,
            projected_fields,
        }
    }

    #[must_use]
    pub const fn key_width(&self) -> usize {
        self.used_key_fields.len()
    }

    #[must_use]
    pub const fn projection_width(&self) -> usize {
        self.projected_fields.len()
    }

    /// Validate this mapping against physical rows of `row_width` columns.
    pub fn validate(&self, row_width: usize) -> Result<(), StreamOptionsError> {
        if self.used_key_fields.is_empty() {
            return Err(StreamOptionsError::EmptyKeyFields);
        }

        for (index, field) in self.used_key_fields.iter().enumerate() {
            if self.used_key_fields[..index].contains(field) {
                return Err(StreamOptionsError::DuplicateKeyField { field: *field });
            }
        }

        let out_of_range = self
            .used_key_fields
            .iter()
            .chain(self.projected_fields.iter())
            .find(|field| **field >= row_width);
        if let Some(field) = out_of_range {
            return Err(StreamOptionsError::FieldOutOfRange {
                field: *field,
                width: row_width,
            });
        }

        Ok(())
    }

    /// Pick the key columns out of one physical row.
    pub(crate) fn extract_key<V: Clone>(&self, row: &[V]) -> Vec<V> {
        self.used_key_fields
            .iter()
            .map(|field| row[*field].clone())
            .collect()
    }

    /// Pick the projected columns out of one physical row.
    pub(crate) fn extract_projections<V: Clone>(&self, row: &[V]) -> Vec<V> {
        self.projected_fields
            .iter()
            .map(|field| row[*field].clone())
            .collect()
    }
}
