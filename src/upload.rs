//! Validation of the application/API file pair sent for analysis.

use std::path::{Path, PathBuf};

use crate::error::ValidationError;

/// A validated pair of Python source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPair {
    app: PathBuf,
    api: PathBuf,
}

impl UploadPair {
    /// Validate a pair of paths.
    ///
    /// Both files must exist and carry a `.py` extension. Nothing is read
    /// until the pair is actually uploaded.
    pub fn new(app: impl Into<PathBuf>, api: impl Into<PathBuf>) -> Result<Self, ValidationError> {
        let app = app.into();
        let api = api.into();
        check_python_file(&app)?;
        check_python_file(&api)?;
        Ok(Self { app, api })
    }

    /// Validate a pair where either side may not have been chosen yet.
    pub fn from_options(
        app: Option<PathBuf>,
        api: Option<PathBuf>,
    ) -> Result<Self, ValidationError> {
        match (app, api) {
            (Some(app), Some(api)) => Self::new(app, api),
            _ => Err(ValidationError::MissingUpload),
        }
    }

    pub fn app_path(&self) -> &Path {
        &self.app
    }

    pub fn api_path(&self) -> &Path {
        &self.api
    }

    pub fn app_file_name(&self) -> String {
        file_name(&self.app)
    }

    pub fn api_file_name(&self) -> String {
        file_name(&self.api)
    }
}

fn check_python_file(path: &Path) -> Result<(), ValidationError> {
    let is_python = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "py");
    if !is_python {
        return Err(ValidationError::NotPython {
            path: path.display().to_string(),
        });
    }
    if !path.is_file() {
        return Err(ValidationError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
