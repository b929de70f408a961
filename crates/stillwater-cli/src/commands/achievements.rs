use clap::ValueEnum;
use stillwater_core::AchievementCategory;

use super::{open_app, CmdResult};

#[derive(Clone, Copy, ValueEnum)]
pub enum CategoryFilter {
    Unlocked,
    PendingUnlock,
    InProgress,
    Locked,
}

impl From<CategoryFilter> for AchievementCategory {
    fn from(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::Unlocked => AchievementCategory::Unlocked,
            CategoryFilter::PendingUnlock => AchievementCategory::PendingUnlock,
            CategoryFilter::InProgress => AchievementCategory::InProgress,
            CategoryFilter::Locked => AchievementCategory::Locked,
        }
    }
}

pub fn run(filter: Option<CategoryFilter>, json: bool) -> CmdResult {
    let (app, _config) = open_app()?;
    let wanted = filter.map(AchievementCategory::from);

    let rows: Vec<_> = app
        .achievement_progress()?
        .into_iter()
        .filter(|status| wanted.map_or(true, |c| status.category == c))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let counts = app.achievement_counts()?;
    println!(
        "{} unlocked, {} ready to unlock, {} in progress, {} locked",
        counts.unlocked, counts.pending_unlock, counts.in_progress, counts.locked
    );
    for status in &rows {
        let mark = match status.category {
            AchievementCategory::Unlocked => "[x]",
            AchievementCategory::PendingUnlock => "[!]",
            AchievementCategory::InProgress => "[~]",
            AchievementCategory::Locked => "[ ]",
        };
        println!(
            "{mark} {:<18} {:>4.0}%  {}",
            status.achievement.title,
            status.progress * 100.0,
            status.achievement.description
        );
    }
    Ok(())
}
