//! `rigging setting` command

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, SettingArgs, SettingCommands};
use rigging::wrapper::{SettingWrapper, SimpleSettingWrapper};

pub fn execute(global: &GlobalArgs, args: SettingArgs) -> Result<()> {
    let session = Session::open(global)?;
    let settings = SimpleSettingWrapper::new(session.api().registry().clone());

    match args.command {
        SettingCommands::Get { key } => {
            let value = session.block_on(settings.get(&key))?;
            println!("{}", value);
        }
        SettingCommands::Set { key, value } => {
            session.block_on(settings.set(&key, &value))?;
            eprintln!("     Updated {} = {}", key, value);
        }
        SettingCommands::List => {
            for key in session.block_on(settings.list())? {
                println!("{}", key);
            }
        }
    }

    Ok(())
}
