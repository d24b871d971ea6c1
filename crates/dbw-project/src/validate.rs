//! Loop file validation logic.

use std::collections::HashSet;

use dbw_controls::ControlError;

use crate::schema::LoopFile;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid controller in loop '{loop_id}': {source}")]
    Controller {
        loop_id: String,
        source: ControlError,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_loop_file(file: &LoopFile) -> Result<(), ValidationError> {
    if file.version == 0 || file.version > crate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mut loop_ids = HashSet::new();
    for def in &file.loops {
        if def.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "loops.id".to_string(),
                value: format!("{:?}", def.id),
                reason: "loop ID must not be empty".to_string(),
            });
        }
        if !loop_ids.insert(&def.id) {
            return Err(ValidationError::DuplicateId {
                id: def.id.clone(),
                context: "loops".to_string(),
            });
        }
        def.controller
            .validate()
            .map_err(|source| ValidationError::Controller {
                loop_id: def.id.clone(),
                source,
            })?;
    }

    Ok(())
}
