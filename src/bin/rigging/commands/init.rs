//! `rigging init` command

use std::path::{Path, PathBuf};

use anyhow::Result;

use super::Session;
use crate::cli::{GlobalArgs, InitArgs};
use rigging::core::PropertyValue;
use rigging::handlers::project::PROJECT_INIT;

/// Determines the project name from the arguments or directory.
pub fn determine_project_name(name: &Option<String>, path: &Path) -> Option<String> {
    name.clone()
        .or_else(|| path.file_name().and_then(|n| n.to_str()).map(String::from))
}

pub fn execute(global: &GlobalArgs, args: InitArgs) -> Result<()> {
    let session = Session::open_only(global, "project")?;

    let root = match &args.path {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => std::env::current_dir()?.join(path),
        None => std::env::current_dir()?,
    };
    let name = determine_project_name(&args.name, &root);

    let result = session.run(PROJECT_INIT, |props| {
        props.set("root", PathBuf::from(&root))?;
        props.set("demo", args.demo)?;
        if let Some(name) = &name {
            props.set("name", name.as_str())?;
        }
        Ok(())
    })?;

    if let Some(PropertyValue::Strings(files)) = result.output("files") {
        for file in files {
            eprintln!("     Created {}", file);
        }
    }
    eprintln!(
        "     Initialized project `{}`",
        name.as_deref().unwrap_or(rigging::builder::DEFAULT_PROJECT_NAME)
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_project_name_with_explicit_name() {
        let name = Some("acme".to_string());
        assert_eq!(
            determine_project_name(&name, Path::new("/srv/other")),
            Some("acme".to_string())
        );
    }

    #[test]
    fn test_determine_project_name_from_path() {
        assert_eq!(
            determine_project_name(&None, Path::new("/home/user/shop")),
            Some("shop".to_string())
        );
        assert_eq!(determine_project_name(&None, Path::new("/")), None);
    }
}
