use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::error::{MedError, Result};
use crate::models::{
    CatalogEntry, Notification, Profile, ProfileForm, RegimenEntry, RegimenUpdate, Schedule,
};
use crate::profile::ProfileStore;
use crate::regimen::RegimenStore;
use crate::reminder::{Clock, ReminderChecker};

pub const PROFILE_FILE: &str = "user_info.json";
pub const CATALOG_FILE: &str = "medications.csv";
pub const REGIMEN_FILE: &str = "my_medications.csv";

/// Locations of the three data files.
#[derive(Debug, Clone)]
pub struct DataPaths {
    pub profile: PathBuf,
    pub catalog: PathBuf,
    pub regimen: PathBuf,
}

impl DataPaths {
    /// The conventional file names inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            profile: dir.join(PROFILE_FILE),
            catalog: dir.join(CATALOG_FILE),
            regimen: dir.join(REGIMEN_FILE),
        }
    }
}

/// Owns the profile, catalog and regimen for one installation.
pub struct MedinoteService {
    profile: ProfileStore,
    catalog: Catalog,
    regimen: RegimenStore,
    checker: ReminderChecker,
}

impl MedinoteService {
    pub fn open(paths: &DataPaths) -> Result<Self> {
        let catalog = Catalog::load(&paths.catalog)?;
        let regimen = RegimenStore::open(&paths.regimen)?;
        tracing::debug!(
            catalog = catalog.len(),
            regimen = regimen.list().len(),
            "data loaded"
        );
        Ok(Self {
            profile: ProfileStore::new(&paths.profile),
            catalog,
            regimen,
            checker: ReminderChecker::new(),
        })
    }

    // --- Profile ---

    #[must_use]
    pub fn has_profile(&self) -> bool {
        self.profile.exists()
    }

    pub fn profile(&self) -> Result<Profile> {
        self.profile.load()
    }

    pub fn create_profile(&self, form: &ProfileForm) -> Result<Profile> {
        self.profile.create(form)
    }

    pub fn update_profile(&self, form: &ProfileForm) -> Result<Profile> {
        self.profile.update(form)
    }

    // --- Catalog ---

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn search_catalog<'a>(
        &'a self,
        query: &str,
    ) -> impl Iterator<Item = &'a CatalogEntry> + use<'a> {
        self.catalog.search(query)
    }

    pub fn catalog_entry(&self, product_name: &str) -> Result<&CatalogEntry> {
        self.catalog
            .get(product_name)
            .ok_or_else(|| MedError::NotFound(product_name.to_string()))
    }

    // --- Regimen ---

    #[must_use]
    pub fn regimen(&self) -> &RegimenStore {
        &self.regimen
    }

    #[must_use]
    pub fn medications(&self) -> &[RegimenEntry] {
        self.regimen.list()
    }

    pub fn medication(&self, product_name: &str) -> Result<&RegimenEntry> {
        self.regimen
            .get(product_name)
            .ok_or_else(|| MedError::NotFound(product_name.to_string()))
    }

    /// Copy a catalog medication into the regimen with `schedule`.
    pub fn add_medication(&mut self, product_name: &str, schedule: Schedule) -> Result<RegimenEntry> {
        if self.regimen.contains(product_name) {
            return Err(MedError::Duplicate(product_name.to_string()));
        }
        let medication = self
            .catalog
            .get(product_name)
            .ok_or_else(|| MedError::NotFound(product_name.to_string()))?;
        self.regimen.add(medication, schedule)
    }

    pub fn update_medication(
        &mut self,
        product_name: &str,
        update: &RegimenUpdate,
    ) -> Result<RegimenEntry> {
        self.regimen.update(product_name, update)
    }

    pub fn delete_medication(&mut self, product_name: &str) -> Result<()> {
        self.regimen.delete(product_name)
    }

    // --- Reminders ---

    /// Re-read the regimen file, then run one reminder check.
    pub fn check_reminders(&mut self, clock: &dyn Clock) -> Result<Vec<Notification>> {
        self.regimen.reload()?;
        Ok(self.checker.tick(&self.regimen, clock))
    }
}
