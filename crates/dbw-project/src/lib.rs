//! dbw-project: loop configuration file format and validation.
//!
//! A loop file names each controller on a vehicle and stores the tuning it
//! starts with. Files are YAML or JSON; both are validated on load and save.

pub mod schema;
pub mod validate;

pub use schema::*;
pub use validate::{ValidationError, validate_loop_file};

/// Newest loop file version this crate reads and writes.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Loop not found: {0}")]
    LoopNotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &std::path::Path) -> ProjectResult<LoopFile> {
    let content = std::fs::read_to_string(path)?;
    let file = from_yaml_str(&content)?;
    tracing::debug!(path = %path.display(), loops = file.loops.len(), "loaded loop file");
    Ok(file)
}

pub fn save_yaml(path: &std::path::Path, file: &LoopFile) -> ProjectResult<()> {
    validate_loop_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ProjectResult<LoopFile> {
    let content = std::fs::read_to_string(path)?;
    let file: LoopFile = serde_json::from_str(&content)?;
    validate_loop_file(&file)?;
    tracing::debug!(path = %path.display(), loops = file.loops.len(), "loaded loop file");
    Ok(file)
}

pub fn save_json(path: &std::path::Path, file: &LoopFile) -> ProjectResult<()> {
    validate_loop_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Parse and validate a loop file held in memory.
pub fn from_yaml_str(content: &str) -> ProjectResult<LoopFile> {
    let file: LoopFile = serde_yaml::from_str(content)?;
    validate_loop_file(&file)?;
    Ok(file)
}

/// Controller configuration of the loop with the given ID.
pub fn loop_config<'a>(
    file: &'a LoopFile,
    id: &str,
) -> ProjectResult<&'a dbw_controls::ControllerConfig> {
    file.find_loop(id)
        .map(|l| &l.controller)
        .ok_or_else(|| ProjectError::LoopNotFound(id.to_string()))
}
