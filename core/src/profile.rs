use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::atomic;
use crate::error::{MedError, Result};
use crate::models::{Profile, ProfileForm};

/// The single user profile, stored as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub fn load(&self) -> Result<Profile> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(MedError::ProfileNotFound),
            Err(e) => return Err(MedError::storage(&self.path, e)),
        };
        serde_json::from_str(&data).map_err(|e| MedError::storage(&self.path, e))
    }

    /// Validate and persist a first profile.
    pub fn create(&self, form: &ProfileForm) -> Result<Profile> {
        let profile = form.validate()?;
        self.save(&profile)?;
        tracing::debug!(path = %self.path.display(), "profile created");
        Ok(profile)
    }

    /// Validate and fully replace the stored profile.
    pub fn update(&self, form: &ProfileForm) -> Result<Profile> {
        if !self.exists() {
            return Err(MedError::ProfileNotFound);
        }
        let profile = form.validate()?;
        self.save(&profile)?;
        tracing::debug!(path = %self.path.display(), "profile updated");
        Ok(profile)
    }

    fn save(&self, profile: &Profile) -> Result<()> {
        let json =
            serde_json::to_string_pretty(profile).map_err(|e| MedError::storage(&self.path, e))?;
        atomic::replace_file(&self.path, |file| file.write_all(json.as_bytes()))
    }
}
