//! `rigging ps` and `rigging logs` commands

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, LogsArgs, PsArgs};
use rigging::handlers::monitor::MONITOR_PS;
use rigging::handlers::orchestrate::MONITOR_LOGS;

pub fn ps(global: &GlobalArgs, args: PsArgs) -> Result<()> {
    let session = Session::open(global)?;
    session.run(MONITOR_PS, |props| props.set("services", args.services))?;
    Ok(())
}

pub fn logs(global: &GlobalArgs, args: LogsArgs) -> Result<()> {
    let session = Session::open(global)?;
    session.run(MONITOR_LOGS, |props| {
        props.set("follow", args.follow)?;
        props.set("services", args.services)
    })?;
    Ok(())
}
