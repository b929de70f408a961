use super::{open_app, runtime, CmdResult};

pub fn run(recalculate: bool) -> CmdResult {
    let (app, _config) = open_app()?;

    if recalculate {
        let rt = runtime()?;
        let unlocked = rt.block_on(app.recalculate_stats())?;
        for id in &unlocked {
            eprintln!("unlocked: {id}");
        }
    }

    let stats = app.current_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
