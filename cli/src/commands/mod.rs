mod catalog;
mod helpers;
mod med;
mod profile;
mod remind;

use anyhow::{Result, bail};
use std::io::{BufRead, Write};

use medinote_core::MedError;
use medinote_core::models::CatalogEntry;
use medinote_core::service::MedinoteService;

use helpers::{print_catalog_table, prompt_choice};

pub(crate) use catalog::{cmd_catalog_search, cmd_catalog_show};
pub(crate) use med::{cmd_med_add, cmd_med_delete, cmd_med_list, cmd_med_show, cmd_med_update};
pub(crate) use profile::{
    ProfileArgs, cmd_profile_edit, cmd_profile_init, cmd_profile_show, create_profile_interactive,
};
pub(crate) use remind::{cmd_remind_check, cmd_remind_watch};

/// Resolve a medication query to a catalog product name: exact name first,
/// then search. Several matches prompt for a choice unless `json` is set.
pub(super) fn resolve_medication<R: BufRead, W: Write>(
    svc: &MedinoteService,
    query: &str,
    json: bool,
    input: &mut R,
    output: &mut W,
) -> Result<String> {
    if let Some(entry) = svc.catalog().get(query) {
        return Ok(entry.product_name.clone());
    }

    let matches: Vec<&CatalogEntry> = svc.search_catalog(query).collect();
    match matches.len() {
        0 => Err(MedError::NotFound(query.to_string()).into()),
        1 => Ok(matches[0].product_name.clone()),
        n if json => bail!("'{query}' matches {n} medications. Use the exact product name"),
        n => {
            print_catalog_table(&matches);
            let idx = prompt_choice(input, output, n)?;
            Ok(matches[idx].product_name.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medinote_core::service::DataPaths;
    use std::io::Cursor;

    const CATALOG: &str = "\
Product Name,Company Name,Main Ingredient,Effectiveness,How to Take It,Precautions,Warnings,Medications to Avoid,Major Side Effects,Storage Instructions
Tylenol,Janssen,Acetaminophen,Fever and pain relief,1 tablet every 4-6 hours,,,,,
Tylenol ER,Janssen,Acetaminophen,Long-lasting pain relief,1 tablet every 8 hours,,,,,
Advil,Pfizer,Ibuprofen,Pain relief,1-2 tablets with food,,,,,
";

    fn service() -> (tempfile::TempDir, MedinoteService) {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = DataPaths::in_dir(tmp.path());
        std::fs::write(&paths.catalog, CATALOG).unwrap();
        let svc = MedinoteService::open(&paths).unwrap();
        (tmp, svc)
    }

    fn resolve(svc: &MedinoteService, query: &str, json: bool, input: &str) -> Result<String> {
        resolve_medication(svc, query, json, &mut Cursor::new(input), &mut Vec::new())
    }

    #[test]
    fn test_exact_name_wins() {
        let (_tmp, svc) = service();
        // "Tylenol" also matches "Tylenol ER" by search
        assert_eq!(resolve(&svc, "Tylenol", true, "").unwrap(), "Tylenol");
    }

    #[test]
    fn test_single_search_match() {
        let (_tmp, svc) = service();
        assert_eq!(resolve(&svc, "ibuprofen", false, "").unwrap(), "Advil");
    }

    #[test]
    fn test_ambiguous_prompts() {
        let (_tmp, svc) = service();
        assert_eq!(
            resolve(&svc, "acetaminophen", false, "2\n").unwrap(),
            "Tylenol ER"
        );
        assert!(resolve(&svc, "acetaminophen", true, "2\n").is_err());
    }

    #[test]
    fn test_no_match_is_not_found() {
        let (_tmp, svc) = service();
        let err = resolve(&svc, "aspirin", false, "").unwrap_err();
        assert!(
            err.downcast_ref::<MedError>()
                .is_some_and(MedError::is_not_found)
        );
    }
}
