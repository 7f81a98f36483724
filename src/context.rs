use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use directories::ProjectDirs;

use crate::error::DraftError;

const APP_NAME: &str = "winston-draft";
const APP_AUTHOR: &str = "winston";
const APP_QUALIFIER: &str = "com";

const RUNTIME_FILE_NAME: &str = "runtime_data.json";
const CUSTOM_LIST_FILE_NAME: &str = "custom_cube.txt";

/// Key under which the path of the last loaded custom card list is stored.
pub const CUSTOM_CUBE_KEY: &str = "custom_cube_file";

/// Small key/value store persisted as JSON between runs.
pub struct RuntimeData {
    data: Arc<RwLock<HashMap<String, String>>>,
    file_path: PathBuf,
}

fn runtime_dir() -> Result<PathBuf, DraftError> {
    let project_dirs = ProjectDirs::from(APP_QUALIFIER, APP_AUTHOR, APP_NAME).ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "no home directory for runtime data")
    })?;

    let runtime_dir = project_dirs.data_local_dir().to_path_buf();
    fs::create_dir_all(&runtime_dir)?;
    Ok(runtime_dir)
}

pub fn create_runtime_data() -> Result<RuntimeData, DraftError> {
    let runtime_dir = runtime_dir()?;
    log::debug!("Runtime directory: {:?}", runtime_dir);

    load_data_from_file(runtime_dir.join(RUNTIME_FILE_NAME))
}

/// Where a custom list pasted into the front end is written.
pub fn custom_list_path() -> Result<PathBuf, DraftError> {
    Ok(runtime_dir()?.join(CUSTOM_LIST_FILE_NAME))
}

pub fn load_data_from_file(file_path: impl AsRef<Path>) -> Result<RuntimeData, DraftError> {
    let path = file_path.as_ref();
    let data = if path.exists() {
        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(&contents)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
        }
    } else {
        HashMap::new()
    };

    Ok(RuntimeData {
        data: Arc::new(RwLock::new(data)),
        file_path: path.to_path_buf(),
    })
}

impl RuntimeData {
    pub fn read_data(&self, key: &str) -> Option<String> {
        let data_read = self.data.read().ok()?;
        data_read.get(key).map(|s| s.to_string())
    }

    pub fn write_data(&self, key: &str, value: &str) -> Result<(), DraftError> {
        let mut data_write = self
            .data
            .write()
            .map_err(|_| DraftError::InvalidState("runtime data lock poisoned".to_string()))?;
        data_write.insert(key.to_string(), value.to_string());
        save_data(&self.file_path, &data_write)
    }
}

fn save_data(file_path: &Path, data: &HashMap<String, String>) -> Result<(), DraftError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)?;
    let content =
        serde_json::to_string(data).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
