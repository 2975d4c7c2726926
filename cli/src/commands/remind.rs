use anyhow::Result;
use std::io::Write;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};

use medinote_core::models::Notification;
use medinote_core::reminder::{Clock, SystemClock};
use medinote_core::service::MedinoteService;

use super::helpers::format_notification;

fn write_notifications<W: Write>(out: &mut W, due: &[Notification], json: bool) -> Result<()> {
    for n in due {
        if json {
            writeln!(out, "{}", serde_json::to_string(n)?)?;
        } else {
            writeln!(out, "{}", format_notification(n))?;
        }
    }
    out.flush()?;
    Ok(())
}

pub(crate) fn cmd_remind_check(svc: &mut MedinoteService, json: bool) -> Result<()> {
    let due = svc.check_reminders(&SystemClock)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&due)?);
    } else if due.is_empty() {
        println!("No reminders due right now");
    } else {
        write_notifications(&mut std::io::stdout(), &due, false)?;
    }
    Ok(())
}

/// Run the reminder check every `period`. Stops after `max_ticks` ticks when
/// given, otherwise runs until the process is killed. A failed check is
/// reported and the loop keeps going.
pub(crate) async fn watch<W: Write>(
    svc: &mut MedinoteService,
    clock: &dyn Clock,
    period: Duration,
    max_ticks: Option<usize>,
    json: bool,
    out: &mut W,
) -> Result<usize> {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut fired = 0;
    let mut ticks = 0;

    while max_ticks.is_none_or(|max| ticks < max) {
        interval.tick().await;
        ticks += 1;
        match svc.check_reminders(clock) {
            Ok(due) => {
                fired += due.len();
                write_notifications(out, &due, json)?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "reminder check failed");
                eprintln!("Error: {e}");
            }
        }
    }
    Ok(fired)
}

pub(crate) async fn cmd_remind_watch(
    svc: &mut MedinoteService,
    interval_secs: u64,
    json: bool,
) -> Result<()> {
    let period = Duration::from_secs(interval_secs.max(1));
    if !json {
        eprintln!(
            "Watching for reminders every {}s. Press Ctrl-C to stop.",
            period.as_secs()
        );
    }
    watch(svc, &SystemClock, period, None, json, &mut std::io::stdout()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use medinote_core::models::Schedule;
    use medinote_core::service::DataPaths;

    const CATALOG: &str = "\
Product Name,Company Name,Main Ingredient,Effectiveness,How to Take It,Precautions,Warnings,Medications to Avoid,Major Side Effects,Storage Instructions
Tylenol,Janssen,Acetaminophen,Fever and pain relief,1 tablet every 4-6 hours,,,,,
Advil,Pfizer,Ibuprofen,Pain relief,1-2 tablets with food,,,,,
";

    struct At(NaiveDateTime);

    impl Clock for At {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    fn at(h: u32, m: u32, s: u32) -> At {
        At(NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap())
    }

    fn service() -> (tempfile::TempDir, MedinoteService) {
        let tmp = tempfile::TempDir::new().unwrap();
        let paths = DataPaths::in_dir(tmp.path());
        std::fs::write(&paths.catalog, CATALOG).unwrap();
        let mut svc = MedinoteService::open(&paths).unwrap();
        svc.add_medication(
            "Tylenol",
            Schedule::parse("08:30", true, Some("after-meal")).unwrap(),
        )
        .unwrap();
        svc.add_medication("Advil", Schedule::parse("08:30", false, None).unwrap())
            .unwrap();
        (tmp, svc)
    }

    #[tokio::test]
    async fn test_watch_fires_once_per_minute() {
        let (_tmp, mut svc) = service();
        let mut out = Vec::new();

        let fired = watch(
            &mut svc,
            &at(8, 30, 5),
            Duration::from_millis(5),
            Some(3),
            false,
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(fired, 1);
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(
            shown,
            "[08:30] Time to take Tylenol\n  Take right after a meal.\n  1 tablet every 4-6 hours\n"
        );
    }

    #[tokio::test]
    async fn test_watch_json_lines() {
        let (_tmp, mut svc) = service();
        let mut out = Vec::new();

        watch(
            &mut svc,
            &at(8, 30, 0),
            Duration::from_millis(5),
            Some(1),
            true,
            &mut out,
        )
        .await
        .unwrap();

        let line = String::from_utf8(out).unwrap();
        let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["product_name"], "Tylenol");
        assert_eq!(value["time"], "08:30");
        assert_eq!(value["taking_condition"], "after-meal");
    }

    #[tokio::test]
    async fn test_watch_quiet_minute() {
        let (_tmp, mut svc) = service();
        let mut out = Vec::new();
        let fired = watch(
            &mut svc,
            &at(8, 31, 0),
            Duration::from_millis(5),
            Some(2),
            false,
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(fired, 0);
        assert!(out.is_empty());
    }
}
