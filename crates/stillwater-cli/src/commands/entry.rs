use chrono::{Local, NaiveTime};
use clap::Subcommand;
use stillwater_core::achievements::catalog;
use stillwater_core::format::{format_clock_time, relative_day_label};
use stillwater_core::reflection::count_today;
use stillwater_core::Event;

use super::{open_app, runtime, CmdResult};

const RECENT_SCAN: usize = 100;

#[derive(Subcommand)]
pub enum EntryAction {
    /// Write a journal entry
    Add {
        /// Entry text
        text: String,
        /// Mood from 1 to 10
        #[arg(long)]
        mood: Option<u8>,
        /// Mark the entry as dictated
        #[arg(long)]
        voice: bool,
    },
    /// List recent entries, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EntryAction) -> CmdResult {
    let (app, _config) = open_app()?;

    match action {
        EntryAction::Add { text, mood, voice } => {
            let mut events = app.events().subscribe();
            let rt = runtime()?;
            let entry = rt.block_on(app.submit_entry(&text, mood, voice))?;
            println!("Entry saved: {}", entry.id);

            while let Ok(event) = events.try_recv() {
                if let Event::AchievementsUnlocked { ids, .. } = event {
                    for id in ids {
                        let title = catalog::find(&id).map(|a| a.title).unwrap_or(id);
                        println!("Achievement unlocked: {title}");
                    }
                }
            }

            let today = Local::now().date_naive();
            let count = count_today(
                &app.database().entries_for(&entry.user_id, RECENT_SCAN)?,
                today,
            );
            let update = app.reflection_update(count);
            println!("Reflections today: {count} ({:.0}%)", update.ratio * 100.0);
        }
        EntryAction::List { limit, json } => {
            let user = app
                .database()
                .current_user_id()?
                .ok_or("no user registered; run `stillwater-cli user init`")?;
            let entries = app.database().entries_for(&user, limit)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }
            if entries.is_empty() {
                println!("No entries yet.");
                return Ok(());
            }

            let today = Local::now().date_naive();
            for entry in &entries {
                let local = entry.created_at.with_timezone(&Local);
                let time: NaiveTime = local.time();
                let mood = entry
                    .mood
                    .map(|m| format!(" mood {m}/10"))
                    .unwrap_or_default();
                println!(
                    "{} {}{}{}",
                    relative_day_label(local.date_naive(), today),
                    format_clock_time(time),
                    mood,
                    if entry.via_voice { " (voice)" } else { "" }
                );
                println!("  {}", entry.text);
            }
        }
    }
    Ok(())
}
