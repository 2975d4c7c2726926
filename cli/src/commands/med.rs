use anyhow::{Result, bail};
use serde_json::json;

use medinote_core::models::{
    NotificationTime, RegimenEntry, RegimenUpdate, Schedule, TakingCondition,
};
use medinote_core::service::MedinoteService;

use super::helpers::{confirm, print_medication_details, print_regimen_table, reminder_state};
use super::resolve_medication;

fn print_schedule(entry: &RegimenEntry) {
    let condition = entry.effective_condition();
    match entry.notification_time {
        Some(time) => println!("  {:<16} {time} ({})", "Reminder", reminder_state(entry)),
        None => println!("  {:<16} not set", "Reminder"),
    }
    println!("  {:<16} {condition}: {}", "Condition", condition.guidance());
}

pub(crate) fn cmd_med_add(
    svc: &mut MedinoteService,
    name: &str,
    time: Option<&str>,
    condition: Option<&str>,
    no_notify: bool,
    json: bool,
) -> Result<()> {
    let schedule = Schedule::parse(time.unwrap_or(""), !no_notify, condition)?;
    let stdin = std::io::stdin();
    let product = resolve_medication(svc, name, json, &mut stdin.lock(), &mut std::io::stderr())?;
    let entry = svc.add_medication(&product, schedule)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Added {} to your medication list", entry.product_name());
        print_schedule(&entry);
    }
    Ok(())
}

pub(crate) fn cmd_med_list(svc: &MedinoteService, json: bool) -> Result<()> {
    let entries = svc.medications();

    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("Your medication list is empty. Add one with `medinote med add <name>`.");
    } else {
        print_regimen_table(entries);
    }
    Ok(())
}

pub(crate) fn cmd_med_show(svc: &MedinoteService, name: &str, json: bool) -> Result<()> {
    let entry = svc.medication(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
    } else {
        print_medication_details(&entry.medication);
        print_schedule(entry);
    }
    Ok(())
}

/// Turn `med update` flags into a partial update.
fn build_update(
    time: Option<&str>,
    clear_time: bool,
    condition: Option<&str>,
    notify: Option<bool>,
) -> Result<RegimenUpdate> {
    let notification_time = if clear_time {
        Some(None)
    } else {
        time.map(NotificationTime::parse_optional).transpose()?
    };
    let taking_condition = condition.map(str::parse::<TakingCondition>).transpose()?;

    Ok(RegimenUpdate {
        notification_time,
        notifications_enabled: notify,
        taking_condition,
    })
}

pub(crate) fn cmd_med_update(
    svc: &mut MedinoteService,
    name: &str,
    time: Option<&str>,
    clear_time: bool,
    condition: Option<&str>,
    notify: Option<bool>,
    json: bool,
) -> Result<()> {
    let update = build_update(time, clear_time, condition, notify)?;
    if update.is_empty() {
        bail!("Nothing to update. Provide --time, --clear-time, --condition, or --notify");
    }

    let entry = svc.update_medication(name, &update)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Updated {}", entry.product_name());
        print_schedule(&entry);
    }
    Ok(())
}

pub(crate) fn cmd_med_delete(
    svc: &mut MedinoteService,
    name: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    // Fail on unknown names before asking anything
    svc.medication(name)?;

    if !yes && !json {
        let stdin = std::io::stdin();
        let question = format!("Remove {name} from your medication list?");
        if !confirm(&mut stdin.lock(), &mut std::io::stderr(), &question)? {
            println!("Cancelled");
            return Ok(());
        }
    }

    svc.delete_medication(name)?;

    if json {
        println!("{}", json!({ "deleted": name }));
    } else {
        println!("Removed {name} from your medication list");
    }
    Ok(())
}
