//! The shared compose execution context.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::backend::BackendError;
use crate::util::context::ProjectPaths;
use crate::util::process::ProcessBuilder;

/// Where process output goes.
#[derive(Clone, Default)]
pub enum OutputSink {
    /// The parent process's stream
    #[default]
    Inherit,
    /// An in-memory buffer
    Capture(Arc<Mutex<Vec<u8>>>),
}

impl OutputSink {
    /// A new capturing sink.
    pub fn capture() -> Self {
        OutputSink::Capture(Arc::new(Mutex::new(Vec::new())))
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, OutputSink::Inherit)
    }

    /// Captured output so far; `None` for inherited streams.
    pub fn contents(&self) -> Option<String> {
        match self {
            OutputSink::Inherit => None,
            OutputSink::Capture(buf) => {
                let buf = buf.lock().unwrap_or_else(|e| e.into_inner());
                Some(String::from_utf8_lossy(&buf).into_owned())
            }
        }
    }

    fn write(&self, bytes: &[u8], stderr: bool) {
        match self {
            OutputSink::Inherit if stderr => {
                let _ = std::io::stderr().write_all(bytes);
            }
            OutputSink::Inherit => {
                let _ = std::io::stdout().write_all(bytes);
            }
            OutputSink::Capture(buf) => {
                buf.lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .extend_from_slice(bytes);
            }
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSink::Inherit => f.write_str("Inherit"),
            OutputSink::Capture(_) => f.write_str("Capture"),
        }
    }
}

/// How compose processes are launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecEnvironment {
    /// Program to run (e.g. `docker`)
    pub program: PathBuf,
    /// Arguments placed before the compose arguments (e.g. `compose`)
    pub args: Vec<String>,
    /// Working directory
    pub cwd: PathBuf,
    /// Extra environment variables
    pub env: BTreeMap<String, String>,
}

impl ExecEnvironment {
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        ExecEnvironment {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

/// A compose project binding shared by every handler of one builder.
#[derive(Debug, Clone)]
pub struct ComposeContext {
    project_name: String,
    files: Vec<PathBuf>,
    environment: ExecEnvironment,
    stdout: OutputSink,
    stderr: OutputSink,
    paths: ProjectPaths,
}

impl ComposeContext {
    pub fn new(
        project_name: impl Into<String>,
        files: Vec<PathBuf>,
        environment: ExecEnvironment,
        stdout: OutputSink,
        stderr: OutputSink,
        paths: ProjectPaths,
    ) -> Self {
        ComposeContext {
            project_name: project_name.into(),
            files,
            environment,
            stdout,
            stderr,
            paths,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Definition files, in the order they are passed to compose.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn environment(&self) -> &ExecEnvironment {
        &self.environment
    }

    pub fn paths(&self) -> &ProjectPaths {
        &self.paths
    }

    pub fn stdout(&self) -> &OutputSink {
        &self.stdout
    }

    pub fn stderr(&self) -> &OutputSink {
        &self.stderr
    }

    /// A copy of this context bound to another project name.
    pub fn with_project_name(&self, project_name: impl Into<String>) -> Self {
        ComposeContext {
            project_name: project_name.into(),
            ..self.clone()
        }
    }

    /// Definition files that exist on disk.
    pub fn existing_files(&self) -> Vec<&Path> {
        self.files
            .iter()
            .filter(|f| f.is_file())
            .map(PathBuf::as_path)
            .collect()
    }

    /// Build the process for a compose invocation.
    pub fn process<I, S>(&self, args: I) -> ProcessBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut process = ProcessBuilder::new(&self.environment.program)
            .args(&self.environment.args)
            .arg("-p")
            .arg(&self.project_name);

        for file in &self.files {
            process = process.arg("-f").arg(file);
        }

        process
            .args(args.into_iter().map(|a| a.as_ref().to_string()))
            .envs(&self.environment.env)
            .cwd(&self.environment.cwd)
    }

    /// Run a compose process to completion, routing its output to the sinks.
    pub fn run(&self, process: &ProcessBuilder) -> Result<(), BackendError> {
        let command = process.display_command();
        tracing::debug!(%command, "running compose");

        let status = if self.stdout.is_inherit() && self.stderr.is_inherit() {
            process
                .status()
                .map_err(|e| BackendError::Spawn {
                    command: command.clone(),
                    message: format!("{:#}", e),
                })?
        } else {
            let output = process.exec().map_err(|e| BackendError::Spawn {
                command: command.clone(),
                message: format!("{:#}", e),
            })?;
            self.stdout.write(&output.stdout, false);
            self.stderr.write(&output.stderr, true);
            output.status
        };

        if status.success() {
            Ok(())
        } else {
            Err(BackendError::Exit {
                command,
                code: status.code(),
            })
        }
    }
}
