use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{MedError, Result};
use crate::models::{
    CATALOG_COLUMNS, CatalogEntry, NotificationTime, RegimenEntry, RegimenUpdate,
    SCHEDULE_COLUMNS, Schedule, TakingCondition, parse_bool_cell,
};
use crate::sheet;

const COLUMN_COUNT: usize = CATALOG_COLUMNS.len() + SCHEDULE_COLUMNS.len();

fn columns() -> [&'static str; COLUMN_COUNT] {
    std::array::from_fn(|i| {
        CATALOG_COLUMNS
            .get(i)
            .copied()
            .unwrap_or_else(|| SCHEDULE_COLUMNS[i - CATALOG_COLUMNS.len()])
    })
}

/// The user's active medication list, one entry per product name.
///
/// The whole table is rewritten to disk after every mutation. A mutation
/// only takes effect in memory once that rewrite has succeeded.
#[derive(Debug)]
pub struct RegimenStore {
    path: PathBuf,
    entries: Vec<RegimenEntry>,
}

impl RegimenStore {
    /// Load the regimen spreadsheet. A missing file yields an empty list.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = read_entries(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Re-read the file, picking up changes written by another process.
    pub fn reload(&mut self) -> Result<()> {
        self.entries = read_entries(&self.path)?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn list(&self) -> &[RegimenEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, product_name: &str) -> Option<&RegimenEntry> {
        self.entries.iter().find(|e| e.product_name() == product_name)
    }

    #[must_use]
    pub fn contains(&self, product_name: &str) -> bool {
        self.get(product_name).is_some()
    }

    pub fn add(&mut self, medication: &CatalogEntry, schedule: Schedule) -> Result<RegimenEntry> {
        if self.contains(&medication.product_name) {
            return Err(MedError::Duplicate(medication.product_name.clone()));
        }
        let entry = RegimenEntry::new(medication.clone(), schedule);
        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.commit(next)?;
        tracing::debug!(product = %entry.product_name(), "regimen entry added");
        Ok(entry)
    }

    pub fn update(&mut self, product_name: &str, update: &RegimenUpdate) -> Result<RegimenEntry> {
        let idx = self.position(product_name)?;
        let mut next = self.entries.clone();
        next[idx].apply(update);
        let updated = next[idx].clone();
        self.commit(next)?;
        tracing::debug!(product = %product_name, "regimen entry updated");
        Ok(updated)
    }

    pub fn delete(&mut self, product_name: &str) -> Result<()> {
        let idx = self.position(product_name)?;
        let mut next = self.entries.clone();
        next.remove(idx);
        self.commit(next)?;
        tracing::debug!(product = %product_name, "regimen entry deleted");
        Ok(())
    }

    fn position(&self, product_name: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.product_name() == product_name)
            .ok_or_else(|| MedError::NotFound(product_name.to_string()))
    }

    fn commit(&mut self, next: Vec<RegimenEntry>) -> Result<()> {
        write_entries(&self.path, &next)?;
        self.entries = next;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Result<Vec<RegimenEntry>> {
    let Some(rows) = sheet::read(path, &columns(), &CATALOG_COLUMNS[..1])? else {
        return Ok(Vec::new());
    };
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        if !row[0].as_deref().is_some_and(|name| !name.trim().is_empty()) {
            continue;
        }
        let entry = entry_from_row(path, row)?;
        if !seen.insert(entry.product_name().to_string()) {
            return Err(MedError::storage(
                path,
                format!("duplicate product '{}'", entry.product_name()),
            ));
        }
        entries.push(entry);
    }
    Ok(entries)
}

fn entry_from_row(path: &Path, row: Vec<Option<String>>) -> Result<RegimenEntry> {
    let mut cells = row.into_iter();
    let medication = CatalogEntry::from_fields(std::array::from_fn(|_| {
        cells.next().flatten().unwrap_or_default()
    }));
    let [time, enabled, condition]: [Option<String>; 3] =
        std::array::from_fn(|_| cells.next().flatten());

    let corrupt = |message: String| {
        MedError::storage(path, format!("{}: {message}", medication.product_name))
    };

    let notification_time = NotificationTime::parse_optional(time.as_deref().unwrap_or(""))
        .map_err(|e| corrupt(e.to_string()))?;
    // Files written before the enabled column existed treat reminders as on.
    let notifications_enabled = match enabled.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(cell) => parse_bool_cell(cell)
            .ok_or_else(|| corrupt(format!("invalid Notifications_Enabled value '{cell}'")))?,
    };
    let taking_condition = match condition.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(cell) => Some(
            cell.parse::<TakingCondition>()
                .map_err(|e| corrupt(e.to_string()))?,
        ),
    };

    Ok(RegimenEntry {
        medication,
        notification_time,
        notifications_enabled,
        taking_condition,
    })
}

fn write_entries(path: &Path, entries: &[RegimenEntry]) -> Result<()> {
    let rows: Vec<[String; 3]> = entries
        .iter()
        .map(|e| {
            [
                e.notification_time.map(|t| t.to_string()).unwrap_or_default(),
                e.notifications_enabled.to_string(),
                e.taking_condition
                    .map(|c| c.as_str().to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect();

    sheet::write(
        path,
        &columns(),
        entries.iter().zip(&rows).map(|(e, schedule)| {
            e.medication
                .fields()
                .into_iter()
                .chain(schedule.iter().map(String::as_str))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tylenol() -> CatalogEntry {
        CatalogEntry {
            product_name: "Tylenol".into(),
            company: "Janssen".into(),
            main_ingredient: "Acetaminophen".into(),
            effectiveness: "Fever, pain relief".into(),
            how_to_take: "1 tablet every 4-6 hours".into(),
            precautions: "Liver disease".into(),
            warnings: "Max 4g/day".into(),
            interactions: "Alcohol".into(),
            side_effects: "Nausea".into(),
            storage: "Room temperature".into(),
        }
    }

    fn advil() -> CatalogEntry {
        CatalogEntry {
            product_name: "Advil".into(),
            main_ingredient: "Ibuprofen".into(),
            how_to_take: "1-2 tablets with food".into(),
            ..CatalogEntry::default()
        }
    }

    fn schedule(time: &str) -> Schedule {
        Schedule::parse(time, true, Some("after-meal")).unwrap()
    }

    fn store_in(dir: &Path) -> RegimenStore {
        RegimenStore::open(&dir.join("my_medications.csv")).unwrap()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = store_in(tmp.path());
        assert!(store.list().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_add_copies_catalog_fields() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());

        let entry = store.add(&tylenol(), schedule("09:00")).unwrap();
        assert_eq!(entry.medication, tylenol());
        assert_eq!(entry.notification_time.unwrap().to_string(), "09:00");
        assert!(entry.notifications_enabled);
        assert_eq!(entry.taking_condition, Some(TakingCondition::AfterMeal));

        assert_eq!(store.list().len(), 1);
        let reopened = store_in(tmp.path());
        assert_eq!(reopened.list(), store.list());
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        store.add(&tylenol(), schedule("09:00")).unwrap();
        let on_disk = std::fs::read_to_string(store.path()).unwrap();

        let err = store.add(&tylenol(), schedule("21:00")).unwrap_err();
        assert!(matches!(err, MedError::Duplicate(name) if name == "Tylenol"));
        assert_eq!(store.list().len(), 1);
        assert_eq!(
            store.list()[0].notification_time.unwrap().to_string(),
            "09:00"
        );
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), on_disk);
    }

    #[test]
    fn test_update_partial() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        store.add(&tylenol(), schedule("09:00")).unwrap();

        let updated = store
            .update(
                "Tylenol",
                &RegimenUpdate {
                    taking_condition: Some(TakingCondition::BeforeMeal),
                    ..RegimenUpdate::default()
                },
            )
            .unwrap();
        assert_eq!(updated.notification_time.unwrap().to_string(), "09:00");
        assert_eq!(updated.taking_condition, Some(TakingCondition::BeforeMeal));

        store
            .update(
                "Tylenol",
                &RegimenUpdate {
                    notification_time: Some(None),
                    ..RegimenUpdate::default()
                },
            )
            .unwrap();

        let reopened = store_in(tmp.path());
        let e = reopened.get("Tylenol").unwrap();
        assert!(e.notification_time.is_none());
        assert!(e.notifications_enabled);
        assert_eq!(e.taking_condition, Some(TakingCondition::BeforeMeal));
    }

    #[test]
    fn test_update_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        let err = store
            .update("Nothing", &RegimenUpdate::default())
            .unwrap_err();
        assert!(matches!(err, MedError::NotFound(_)));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_delete() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        store.add(&tylenol(), schedule("09:00")).unwrap();
        store.add(&advil(), schedule("")).unwrap();

        store.delete("Tylenol").unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(store.list()[0].product_name(), "Advil");
        assert_eq!(store_in(tmp.path()).list().len(), 1);
    }

    #[test]
    fn test_delete_not_found_leaves_table() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        store.add(&tylenol(), schedule("09:00")).unwrap();
        let on_disk = std::fs::read_to_string(store.path()).unwrap();

        let err = store.delete("Advil").unwrap_err();
        assert!(matches!(err, MedError::NotFound(name) if name == "Advil"));
        assert_eq!(store.list().len(), 1);
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), on_disk);
    }

    #[test]
    fn test_round_trip_preserves_fields_and_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        store.add(&tylenol(), schedule("09:00")).unwrap();
        store
            .add(&advil(), Schedule::parse("", false, None).unwrap())
            .unwrap();

        let reopened = store_in(tmp.path());
        assert_eq!(reopened.list(), store.list());
        let advil = &reopened.list()[1];
        assert!(advil.notification_time.is_none());
        assert!(!advil.notifications_enabled);
        assert!(advil.taking_condition.is_none());
        assert_eq!(advil.medication.effectiveness, "");

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("None"));
    }

    #[test]
    fn test_failed_write_keeps_memory_unchanged() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("data");
        std::fs::create_dir(&dir).unwrap();
        let mut store = store_in(&dir);
        store.add(&tylenol(), schedule("09:00")).unwrap();

        std::fs::remove_dir_all(&dir).unwrap();
        let err = store.add(&advil(), schedule("10:00")).unwrap_err();
        assert!(matches!(err, MedError::Storage { .. }));
        assert_eq!(store.list().len(), 1);

        let err = store.delete("Tylenol").unwrap_err();
        assert!(matches!(err, MedError::Storage { .. }));
        assert!(store.contains("Tylenol"));
    }

    #[test]
    fn test_round_trip_keeps_cell_whitespace() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut store = store_in(tmp.path());
        let mut med = tylenol();
        med.how_to_take = "  indented\n second line ".into();
        med.warnings = " Max 4g/day ".into();
        store.add(&med, schedule("09:00")).unwrap();

        let reopened = store_in(tmp.path());
        assert_eq!(reopened.list(), store.list());
        let e = reopened.get("Tylenol").unwrap();
        assert_eq!(e.medication.how_to_take, "  indented\n second line ");
        assert_eq!(e.medication.warnings, " Max 4g/day ");
    }

    #[test]
    fn test_open_rejects_repeated_product() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("my_medications.csv");
        std::fs::write(
            &path,
            "Product Name,Notification Time\nTylenol,08:30\nAdvil,09:00\nTylenol,08:30\n",
        )
        .unwrap();

        let err = RegimenStore::open(&path).unwrap_err();
        assert!(matches!(err, MedError::Storage { .. }));
        assert!(err.to_string().contains("duplicate product 'Tylenol'"));
    }

    #[test]
    fn test_open_skips_blank_name_rows() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("my_medications.csv");
        std::fs::write(
            &path,
            "Product Name,Notification Time\n   ,08:30\nTylenol, 08:30 \n",
        )
        .unwrap();

        let store = RegimenStore::open(&path).unwrap();
        assert_eq!(store.list().len(), 1);
        assert_eq!(
            store.get("Tylenol").unwrap().notification_time.unwrap().to_string(),
            "08:30"
        );
    }

    #[test]
    fn test_open_legacy_file_without_schedule_columns() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("my_medications.csv");
        std::fs::write(
            &path,
            "Product Name,How to Take It,Notification Time\nTylenol,1 tablet,08:30\nAdvil,2 tablets,\n",
        )
        .unwrap();

        let store = RegimenStore::open(&path).unwrap();
        assert_eq!(store.list().len(), 2);
        let t = store.get("Tylenol").unwrap();
        assert_eq!(t.notification_time.unwrap().to_string(), "08:30");
        assert!(t.notifications_enabled);
        assert!(t.taking_condition.is_none());
        assert_eq!(t.effective_condition(), TakingCondition::AfterMeal);
        assert_eq!(t.medication.how_to_take, "1 tablet");
        assert!(store.get("Advil").unwrap().notification_time.is_none());
    }

    #[test]
    fn test_open_korean_condition_and_bool_spellings() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("my_medications.csv");
        std::fs::write(
            &path,
            "Product Name,Notification Time,Notifications_Enabled,Taking_Condition\nGaster,07:00,FALSE,공복\n",
        )
        .unwrap();

        let store = RegimenStore::open(&path).unwrap();
        let g = store.get("Gaster").unwrap();
        assert!(!g.notifications_enabled);
        assert_eq!(g.taking_condition, Some(TakingCondition::EmptyStomach));
    }

    #[test]
    fn test_open_rejects_malformed_time() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("my_medications.csv");
        std::fs::write(&path, "Product Name,Notification Time\nTylenol,9am\n").unwrap();
        let err = RegimenStore::open(&path).unwrap_err();
        assert!(matches!(err, MedError::Storage { .. }));
    }

    #[test]
    fn test_reload_sees_external_changes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut watcher = store_in(tmp.path());
        let mut editor = store_in(tmp.path());
        editor.add(&tylenol(), schedule("09:00")).unwrap();

        assert!(watcher.list().is_empty());
        watcher.reload().unwrap();
        assert!(watcher.contains("Tylenol"));
    }
}
