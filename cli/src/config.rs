use anyhow::{Context, Result};
use std::path::PathBuf;

use medinote_core::service::DataPaths;

pub struct Config {
    pub data_dir: PathBuf,
    pub paths: DataPaths,
}

impl Config {
    /// Data files live in the working directory unless `data_dir` is given.
    pub fn load(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => {
                std::fs::create_dir_all(&dir).with_context(|| {
                    format!("Failed to create data directory: {}", dir.display())
                })?;
                dir
            }
            None => std::env::current_dir().context("Could not determine working directory")?,
        };

        let paths = DataPaths::in_dir(&data_dir);

        Ok(Config { data_dir, paths })
    }
}
