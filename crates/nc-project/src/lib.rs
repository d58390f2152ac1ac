//! nc-project: engine design file format, unit parsing and validation.

pub mod schema;
pub mod units;
pub mod validate;

pub use schema::*;
pub use units::{Quantity, UnitError, parse_quantity};
pub use validate::{ValidationError, resolve_design, validate_inputs};

use std::path::Path;

/// Newest design file schema understood by this build.
pub const LATEST_VERSION: u32 = 1;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<EngineDesignFile> {
    let content = std::fs::read_to_string(path)?;
    let file: EngineDesignFile = serde_yaml::from_str(&content)?;
    resolve_design(&file)?;
    Ok(file)
}

pub fn save_yaml(path: &Path, file: &EngineDesignFile) -> ProjectResult<()> {
    resolve_design(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<EngineDesignFile> {
    let content = std::fs::read_to_string(path)?;
    let file: EngineDesignFile = serde_json::from_str(&content)?;
    resolve_design(&file)?;
    Ok(file)
}

pub fn save_json(path: &Path, file: &EngineDesignFile) -> ProjectResult<()> {
    resolve_design(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &Path) -> ProjectResult<EngineDesignFile> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        load_json(path)
    } else {
        load_yaml(path)
    }
}
