use std::path::Path;

use crate::error::Result;
use crate::models::{CATALOG_COLUMNS, CatalogEntry};
use crate::sheet;

/// Read-only reference table of known medications.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load the catalog spreadsheet. A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self> {
        let rows = sheet::read(path, &CATALOG_COLUMNS, &CATALOG_COLUMNS[..1])?.unwrap_or_default();
        let entries = rows
            .into_iter()
            .filter_map(|row| {
                let mut entry = entry_from_row(row);
                // The name is the lookup key; other cells keep their text
                entry.product_name = entry.product_name.trim().to_string();
                (!entry.product_name.is_empty()).then_some(entry)
            })
            .collect();
        Ok(Self { entries })
    }

    /// Entries whose name, main ingredient, or effectiveness contains `query`,
    /// ignoring case, in file order. Spaces in `query` are significant.
    /// Each call starts a fresh scan.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CatalogEntry> + use<'a> {
        let needle = query.to_lowercase();
        self.entries.iter().filter(move |e| e.matches(&needle))
    }

    #[must_use]
    pub fn get(&self, product_name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.product_name == product_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_from_row(row: Vec<Option<String>>) -> CatalogEntry {
    let mut cells = row.into_iter().map(Option::unwrap_or_default);
    CatalogEntry::from_fields(std::array::from_fn(|_| cells.next().unwrap_or_default()))
}
