use anyhow::Result;
use std::process;

use medinote_core::models::CatalogEntry;
use medinote_core::service::MedinoteService;

use super::helpers::{print_catalog_table, print_medication_details};

pub(crate) fn cmd_catalog_search(svc: &MedinoteService, query: &str, json: bool) -> Result<()> {
    let results: Vec<&CatalogEntry> = svc.search_catalog(query).collect();

    if results.is_empty() {
        if json {
            println!("[]");
        } else if svc.catalog().is_empty() {
            eprintln!("The medication catalog is empty. Place medications.csv in the data directory.");
        } else {
            eprintln!("No medications found for '{query}'");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_catalog_table(&results);
    }

    Ok(())
}

pub(crate) fn cmd_catalog_show(svc: &MedinoteService, name: &str, json: bool) -> Result<()> {
    let entry = svc.catalog_entry(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
    } else {
        print_medication_details(entry);
        if svc.regimen().contains(name) {
            println!("\n(in your medication list)");
        }
    }

    Ok(())
}
