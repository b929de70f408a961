use chrono::{Local, NaiveDate, Utc};
use clap::Subcommand;
use stillwater_core::entry::local_noon;

use super::{open_app, CmdResult};

#[derive(Subcommand)]
pub enum EvaluationAction {
    /// Record a maturity score (0-10)
    Add {
        score: f64,
        /// Day the evaluation belongs to (YYYY-MM-DD); defaults to now
        #[arg(long)]
        date: Option<String>,
    },
    /// List recorded evaluations, newest first
    List {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EvaluationAction) -> CmdResult {
    let (app, _config) = open_app()?;

    match action {
        EvaluationAction::Add { score, date } => {
            let at = match date {
                Some(raw) => {
                    let day = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                        .map_err(|e| format!("invalid date '{raw}': {e}"))?;
                    local_noon(day)
                }
                None => Utc::now(),
            };
            let evaluation = app.record_evaluation(score, at)?;
            println!(
                "Evaluation recorded: {} ({:.1} on {})",
                evaluation.id,
                evaluation.maturity_score,
                evaluation.local_date()
            );
        }
        EvaluationAction::List { json } => {
            let user = app
                .database()
                .current_user_id()?
                .ok_or("no user registered; run `stillwater-cli user init`")?;
            let evaluations = app.database().evaluations_for(&user)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&evaluations)?);
            } else if evaluations.is_empty() {
                println!("No evaluations yet.");
            } else {
                for evaluation in &evaluations {
                    let local = evaluation.created_at.with_timezone(&Local);
                    println!("{}  {:.1}", local.format("%Y-%m-%d %H:%M"), evaluation.maturity_score);
                }
            }
        }
    }
    Ok(())
}
