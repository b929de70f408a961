use clap::Subcommand;
use stillwater_core::Database;

use super::CmdResult;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create the local user if none exists
    Init,
    /// Print the current user id
    Show,
}

pub fn run(action: UserAction) -> CmdResult {
    let db = Database::open()?;
    match action {
        UserAction::Init => match db.current_user_id()? {
            Some(user) => println!("already initialized: {user}"),
            None => {
                let user = db.register_user()?;
                println!("user created: {user}");
            }
        },
        UserAction::Show => match db.current_user_id()? {
            Some(user) => println!("{user}"),
            None => return Err("no user registered; run `stillwater-cli user init`".into()),
        },
    }
    Ok(())
}
