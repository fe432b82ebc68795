//! `rigging up|down|start|stop` commands

use anyhow::Result;

use super::Session;
use crate::cli::GlobalArgs;

#[derive(Debug, Clone, Copy)]
pub enum Action {
    Up,
    Down,
    Start,
    Stop,
}

pub fn execute(global: &GlobalArgs, action: Action) -> Result<()> {
    let session = Session::open(global)?;
    let orchestrate = session.orchestrate()?;

    session.block_on(async {
        match action {
            Action::Up => orchestrate.up().await,
            Action::Down => orchestrate.down().await,
            Action::Start => orchestrate.start().await,
            Action::Stop => orchestrate.stop().await,
        }
    })?;

    Ok(())
}
