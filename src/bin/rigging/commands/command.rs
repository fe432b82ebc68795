//! `rigging command` command

use anyhow::{Context, Result};

use super::Session;
use crate::cli::{CommandArgs, GlobalArgs};

pub fn execute(global: &GlobalArgs, args: CommandArgs) -> Result<()> {
    let session = Session::open(global)?;
    let commands = session.commands()?;

    match args.key {
        Some(key) => session
            .block_on(commands.exec(&key, &args.args))
            .with_context(|| format!("command `{}` failed", key))?,
        None => {
            let keys = session.block_on(commands.list())?;
            if keys.is_empty() {
                eprintln!("No commands defined");
            }
            for key in keys {
                println!("{}", key);
            }
        }
    }

    Ok(())
}
