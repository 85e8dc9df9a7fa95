//! INI file configuration adapter.

use crate::domain::error::BtclotsError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct FileConfigAdapter {
    config: Ini,
    base_dir: Option<PathBuf>,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BtclotsError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| BtclotsError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    pub fn from_string(content: &str) -> Result<Self, BtclotsError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| BtclotsError::ConfigParse {
                file: "<string>".to_string(),
                reason,
            })?;
        Ok(Self {
            config,
            base_dir: None,
        })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn resolve_path(&self, value: &str) -> PathBuf {
        let path = PathBuf::from(value.trim());
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }
}
