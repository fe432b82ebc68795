//! `rigging exec` command

use anyhow::Result;

use super::Session;
use crate::cli::{ExecArgs, GlobalArgs};

pub fn execute(global: &GlobalArgs, args: ExecArgs) -> Result<()> {
    let session = Session::open(global)?;

    let result = session.run(&args.id, |props| {
        for assignment in &args.set {
            props.parse_assignment(assignment)?;
        }
        Ok(())
    })?;

    for (name, value) in result.outputs() {
        println!("{} = {}", name, value);
    }

    Ok(())
}
