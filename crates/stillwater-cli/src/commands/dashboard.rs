use chrono::Local;
use stillwater_core::format::short_weekday;
use stillwater_core::rhythm::display_values;

use super::{open_app, runtime, CmdResult};

const BAR_WIDTH: f64 = 2.0;

pub fn run(json: bool) -> CmdResult {
    let (app, config) = open_app()?;
    let rt = runtime()?;
    let today = Local::now().date_naive();

    let snapshot = rt
        .block_on(app.dashboard_for(today))
        .ok_or("no user registered; run `stillwater-cli user init`")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{}", snapshot.energy.title());
    println!("  {}", snapshot.energy.description());
    println!();

    println!("Weekly rhythm");
    let shown = display_values(&snapshot.rhythm.values());
    for (point, value) in snapshot.rhythm.points.iter().zip(shown) {
        let bar = "#".repeat((value * BAR_WIDTH).round() as usize);
        let label = if point.has_data() {
            format!("{:.1}", point.score)
        } else {
            "-".to_string()
        };
        println!("  {} {:<20} {}", short_weekday(point.date), bar, label);
    }
    println!();

    println!(
        "Reflections today: {}/{} ({:.0}%)",
        snapshot.reflection_count,
        config.reflection.daily_target,
        snapshot.reflection_ratio * 100.0
    );
    Ok(())
}
