//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};
use thiserror::Error;
use toml;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (PATHFINDER_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot load the parmeter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// STRUCTURES
// ---------------------------------------------------------------------------

/// A parameter file which can be polled for changes while the executable runs.
///
/// The file is re-read on every poll and compared against the contents seen last, so edits are
/// picked up regardless of filesystem timestamp resolution.
#[derive(Debug)]
pub struct ParamsWatcher {
    path: PathBuf,
    last_contents: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ParamsWatcher {
    /// Watch a parameter file relative to the "params" directory under the software root.
    pub fn new(param_file_path: &str) -> Result<Self, LoadError> {
        Self::from_path(params_path(param_file_path)?)
    }

    /// Watch a parameter file at an arbitrary path.
    ///
    /// The current contents are taken as the baseline, so the first poll only reports a change
    /// if the file has been modified since.
    pub fn from_path<F: AsRef<Path>>(path: F) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let last_contents = read_to_string(&path).map_err(LoadError::FileLoadError)?;

        Ok(Self {
            path,
            last_contents,
        })
    }

    /// Re-read the file, returning the new parameters if its contents changed.
    ///
    /// Contents which fail to parse are remembered, so a broken edit is reported once rather than
    /// on every poll.
    pub fn poll<P>(&mut self) -> Result<Option<P>, LoadError>
    where
        P: DeserializeOwned,
    {
        let contents = read_to_string(&self.path).map_err(LoadError::FileLoadError)?;

        if contents == self.last_contents {
            return Ok(None);
        }

        self.last_contents = contents;

        from_str(&self.last_contents).map(Some)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file
///
/// The file path is relative to the "params" directory under the software root.
pub fn load<P>(param_file_path: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    load_from_path(params_path(param_file_path)?)
}

/// Load a parameter file from an arbitrary path.
pub fn load_from_path<P, F>(path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    // Load the file into a string
    let params_str = read_to_string(path).map_err(LoadError::FileLoadError)?;

    from_str(params_str.as_str())
}

/// Parse parameters from a TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Resolve a path relative to the "params" directory under the software root.
fn params_path(param_file_path: &str) -> Result<PathBuf, LoadError> {
    let mut path = crate::host::get_sw_root().map_err(|_| LoadError::SwRootNotSet)?;
    path.push("params");
    path.push(param_file_path);

    Ok(path)
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestParams {
        period_s: f64,
        name: String,
    }

    #[test]
    fn test_from_str() -> Result<(), LoadError> {
        let p: TestParams = from_str("period_s = 0.5\nname = \"grid\"\n")?;
        assert_eq!(
            p,
            TestParams {
                period_s: 0.5,
                name: "grid".into()
            }
        );

        // Missing fields are rejected
        assert!(matches!(
            from_str::<TestParams>("period_s = 0.5"),
            Err(LoadError::DeserialiseError(_))
        ));

        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_from_path::<TestParams, _>("this/file/does/not/exist.toml"),
            Err(LoadError::FileLoadError(_))
        ));
    }

    #[test]
    fn test_watcher_reports_changes() -> Result<(), LoadError> {
        let path = std::env::temp_dir().join(format!("watched_params_{}.toml", std::process::id()));
        std::fs::write(&path, "period_s = 0.5\nname = \"grid\"\n").unwrap();

        let mut watcher = ParamsWatcher::from_path(&path)?;
        assert_eq!(watcher.poll::<TestParams>()?, None);

        std::fs::write(&path, "period_s = 0.25\nname = \"grid\"\n").unwrap();
        let changed: Option<TestParams> = watcher.poll()?;
        assert_eq!(changed.map(|p| p.period_s), Some(0.25));
        assert_eq!(watcher.poll::<TestParams>()?, None);

        // A broken edit is only reported once
        std::fs::write(&path, "period_s = \n").unwrap();
        assert!(matches!(
            watcher.poll::<TestParams>(),
            Err(LoadError::DeserialiseError(_))
        ));
        assert_eq!(watcher.poll::<TestParams>()?, None);

        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            watcher.poll::<TestParams>(),
            Err(LoadError::FileLoadError(_))
        ));

        Ok(())
    }
}
