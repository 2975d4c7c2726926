use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Modify, Style, Width, object::Columns},
};

use medinote_core::models::{CatalogEntry, Notification, ProfileForm, RegimenEntry};

/// Print `label`, then read one line. `None` on end of input.
pub(crate) fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<Option<String>> {
    write!(output, "{label}: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line).context("Failed to read input")? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for every profile field in turn. `None` when input ends early.
pub(crate) fn prompt_profile_form<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> Result<Option<ProfileForm>> {
    let mut ask = |label: &str| prompt_line(input, output, label);

    let Some(name) = ask("Name")? else {
        return Ok(None);
    };
    let Some(age) = ask("Age")? else {
        return Ok(None);
    };
    let Some(gender) = ask("Gender (male/female) [male]")? else {
        return Ok(None);
    };
    let Some(height) = ask("Height (cm)")? else {
        return Ok(None);
    };
    let Some(weight) = ask("Weight (kg)")? else {
        return Ok(None);
    };
    let notes = ask("Notes (allergies, conditions)")?.unwrap_or_default();

    Ok(Some(ProfileForm {
        name,
        age,
        gender,
        height,
        weight,
        notes,
    }))
}

pub(crate) fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<bool> {
    let answer = prompt_line(input, output, &format!("{question} [y/N]"))?;
    Ok(matches!(
        answer.as_deref().map(str::to_lowercase).as_deref(),
        Some("y" | "yes")
    ))
}

/// Ask for a 1-based selection out of `count` and return it 0-based.
pub(crate) fn prompt_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    count: usize,
) -> Result<usize> {
    let line = prompt_line(input, output, &format!("\nSelect a medication (1-{count})"))?
        .context("No input")?;
    let n: usize = line.parse().context("Invalid number")?;
    if n < 1 || n > count {
        bail!("Selection out of range");
    }
    Ok(n - 1)
}

pub(crate) fn print_catalog_table(entries: &[&CatalogEntry]) {
    #[derive(Tabled)]
    struct CatalogRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Main Ingredient")]
        ingredient: String,
        #[tabled(rename = "Effectiveness")]
        effectiveness: String,
    }

    let rows: Vec<CatalogRow> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| CatalogRow {
            idx: i + 1,
            name: truncate(&e.product_name, 30),
            ingredient: truncate(&e.main_ingredient, 25),
            effectiveness: truncate(&e.effectiveness, 40),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_regimen_table(entries: &[RegimenEntry]) {
    #[derive(Tabled)]
    struct RegimenRow {
        #[tabled(rename = "Product")]
        name: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Reminder")]
        reminder: &'static str,
        #[tabled(rename = "Condition")]
        condition: String,
        #[tabled(rename = "How to Take")]
        how_to_take: String,
    }

    let rows: Vec<RegimenRow> = entries
        .iter()
        .map(|e| RegimenRow {
            name: truncate(e.product_name(), 30),
            time: e
                .notification_time
                .map_or_else(|| "-".to_string(), |t| t.to_string()),
            reminder: reminder_state(e),
            condition: e.effective_condition().to_string(),
            how_to_take: e.medication.how_to_take.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::single(4)).with(Width::wrap(40)))
        .to_string();
    println!("{table}");
}

pub(crate) fn reminder_state(entry: &RegimenEntry) -> &'static str {
    match (entry.notification_time, entry.notifications_enabled) {
        (None, _) => "not set",
        (Some(_), true) => "on",
        (Some(_), false) => "off",
    }
}

/// Print the catalog fields of a medication as labelled lines.
pub(crate) fn print_medication_details(m: &CatalogEntry) {
    let fields = [
        ("Company", &m.company),
        ("Main ingredient", &m.main_ingredient),
        ("Effectiveness", &m.effectiveness),
        ("How to take", &m.how_to_take),
        ("Precautions", &m.precautions),
        ("Warnings", &m.warnings),
        ("Avoid with", &m.interactions),
        ("Side effects", &m.side_effects),
        ("Storage", &m.storage),
    ];
    println!("{}", m.product_name);
    for (label, value) in fields {
        if !value.is_empty() {
            println!("  {label:<16} {value}");
        }
    }
}

pub(crate) fn format_notification(n: &Notification) -> String {
    let mut out = format!("[{}] Time to take {}", n.time, n.product_name);
    if let Some(guidance) = n.condition_guidance {
        out.push_str("\n  ");
        out.push_str(guidance);
    }
    if !n.how_to_take.is_empty() {
        out.push_str("\n  ");
        out.push_str(&n.how_to_take);
    }
    out
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
