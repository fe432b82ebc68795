//! `project.init`: lay out a new rigging project.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use super::{probe_root, FnOperation};
use crate::builder::{BuilderSettings, DEFAULT_PROJECT_NAME};
use crate::core::handler::Handler;
use crate::core::operation::Operations;
use crate::core::property::{Properties, Property, PropertyKind};
use crate::core::result::OpResult;
use crate::util::context::{ProjectPaths, COMPOSE_FILE};
use crate::util::fs::{ensure_dir, write_string};

pub const PROJECT_HANDLER_ID: &str = "local.project";
pub const PROJECT_INIT: &str = "project.init";

/// Options for initializing a project.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project name written to the settings
    pub name: String,

    /// Write the demo services instead of an empty definition
    pub demo: bool,
}

const MINIMAL_COMPOSE: &str = r#"services: {}
"#;

const DEMO_COMPOSE: &str = r#"services:
  web:
    image: nginx:alpine
    ports:
      - "8080:80"
    depends_on:
      - app

  app:
    image: python:3.12-alpine
    command: python -m http.server 8000
    working_dir: /srv
    volumes:
      - ./:/srv

  db:
    image: postgres:16-alpine
    environment:
      POSTGRES_PASSWORD: rigging
    volumes:
      - db-data:/var/lib/postgresql/data

volumes:
  db-data:
"#;

const MINIMAL_COMMANDS: &str = r#"# Project commands, run with `rigging command <name>`.
#
# [commands.shell]
# description = "Open a shell in the app container"
# service = "app"
# run = ["sh"]
"#;

const DEMO_COMMANDS: &str = r#"# Project commands, run with `rigging command <name>`.

[commands.shell]
description = "Open a shell in the app container"
service = "app"
run = ["sh"]

[commands.psql]
description = "Connect to the database"
service = "db"
run = ["psql", "-U", "postgres"]
"#;

/// Write the project files under `root`, returning the paths written.
pub fn init_project(root: &Path, opts: &InitOptions) -> Result<Vec<PathBuf>> {
    let paths = ProjectPaths::new(root);

    let compose_file = paths.compose_file();
    if compose_file.exists() {
        bail!(
            "`{}` already exists in `{}`",
            COMPOSE_FILE,
            root.display()
        );
    }

    ensure_dir(&paths.rigging_dir())
        .with_context(|| format!("failed to initialize project in {}", root.display()))?;

    let (compose, commands) = if opts.demo {
        (DEMO_COMPOSE, DEMO_COMMANDS)
    } else {
        (MINIMAL_COMPOSE, MINIMAL_COMMANDS)
    };

    let mut settings = toml_edit::DocumentMut::new();
    settings["Project"] = toml_edit::value(opts.name.as_str());

    let files = vec![
        (compose_file, compose.to_string()),
        (paths.settings_file(), settings.to_string()),
        (paths.config_document("commands"), commands.to_string()),
    ];

    let mut written = Vec::new();
    for (path, contents) in files {
        // Settings and commands a user already has are kept.
        if path.exists() {
            tracing::debug!("keeping existing {}", path.display());
            continue;
        }
        write_string(&path, &contents)?;
        written.push(path);
    }

    tracing::info!(
        project = %opts.name,
        demo = opts.demo,
        "Initialized project in {}",
        root.display()
    );
    Ok(written)
}

/// Creates new projects.
pub struct ProjectHandler {
    settings: Arc<BuilderSettings>,
}

impl ProjectHandler {
    pub fn new(settings: Arc<BuilderSettings>) -> Self {
        ProjectHandler { settings }
    }

    fn init_properties(&self) -> Properties {
        let paths = self.settings.paths();
        let name = self
            .settings
            .config()
            .project
            .name
            .clone()
            .or_else(|| paths.dir_name())
            .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string());

        Properties::new()
            .with(
                Property::new("demo", PropertyKind::Bool)
                    .with_description("Write demo services and commands")
                    .with_default(false),
            )
            .with(
                Property::new("root", PropertyKind::Path)
                    .with_description("Directory to initialize")
                    .with_default(paths.root().to_path_buf()),
            )
            .with(
                Property::new("name", PropertyKind::String)
                    .with_description("Project name")
                    .with_default(name),
            )
    }
}

impl Handler for ProjectHandler {
    fn id(&self) -> &str {
        PROJECT_HANDLER_ID
    }

    fn validate(&self) -> OpResult {
        probe_root(self.settings.paths().root())
    }

    fn operations(&self) -> Operations {
        let init = FnOperation::new(
            PROJECT_INIT,
            "Create a project definition, settings and commands",
            self.init_properties(),
            |props| {
                OpResult::spawn_blocking(move |producer| {
                    let request = props.require("root").and_then(|root| {
                        Ok((
                            root.as_path()?.to_path_buf(),
                            InitOptions {
                                name: props.require("name")?.as_str()?.to_string(),
                                demo: props.require("demo")?.as_bool()?,
                            },
                        ))
                    });
                    let (root, opts) = match request {
                        Ok(request) => request,
                        Err(e) => return producer.fail(e),
                    };
                    match init_project(&root, &opts) {
                        Ok(files) => producer.set_output(
                            "files",
                            files
                                .iter()
                                .map(|f| f.display().to_string())
                                .collect::<Vec<_>>(),
                        ),
                        Err(e) => producer.fail(e),
                    }
                })
            },
        );

        let mut ops = Operations::new();
        let _ = ops.add(init);
        ops
    }
}
