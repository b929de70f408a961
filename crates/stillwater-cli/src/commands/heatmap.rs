use chrono::Local;

use super::{open_app, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let (app, _config) = open_app()?;
    let today = Local::now().date_naive();
    let heatmap = app.heatmap(today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&heatmap.grid())?);
        return Ok(());
    }

    println!("Activity, last five weeks (newest week first, today bottom-right of w0)");
    print!("{}", heatmap.render_ascii());
    Ok(())
}
