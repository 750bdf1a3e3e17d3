// MiniZinc adapter
// Implements the ConstraintEngine interface on top of the `minizinc` command line.
// Every call runs its own child process, so concurrent tool calls never share state.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_stream::{wrappers::LinesStream, StreamExt};

use super::json_stream::{self, StreamCollector};
use crate::domain::{
    BackendDescriptor, ConstraintEngine, EngineOutcome, EngineStatus, Instance, Model, Result,
    SolveOptions, SolverError,
};

const MODEL_FILE: &str = "model.mzn";
const DATA_FILE: &str = "data.json";

/// Time MiniZinc gets to shut its solver down after SIGTERM
const TERMINATE_GRACE: Duration = Duration::from_secs(1);

/// Where MiniZinc lives and how long to wait for it past a requested timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniZincConfig {
    pub executable: PathBuf,
    /// Installation directory; its binaries and libraries are put on the
    /// child's search paths
    pub install_dir: Option<PathBuf>,
    /// Extra time given to MiniZinc after its own time limit before it is killed
    pub timeout_grace: Duration,
}

impl Default for MiniZincConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("minizinc"),
            install_dir: None,
            timeout_grace: Duration::from_secs(5),
        }
    }
}

impl MiniZincConfig {
    fn install_subdir(&self, name: &str) -> Option<PathBuf> {
        let home = self.install_dir.as_ref()?;
        [home.join(name), home.join("usr").join(name)]
            .into_iter()
            .find(|dir| dir.is_dir())
    }

    fn bin_dir(&self) -> Option<PathBuf> {
        self.install_subdir("bin")
    }

    fn lib_dir(&self) -> Option<PathBuf> {
        self.install_subdir("lib")
    }

    fn stdlib_dir(&self) -> Option<PathBuf> {
        self.install_subdir("share")
            .map(|share| share.join("minizinc"))
            .filter(|dir| dir.is_dir())
    }

    /// The executable to launch: a bare name is looked up in the installation first
    pub fn resolved_executable(&self) -> PathBuf {
        let bare = self.executable.components().count() == 1;
        if bare {
            if let Some(candidate) = self.bin_dir().map(|bin| bin.join(&self.executable)) {
                if candidate.is_file() {
                    return candidate;
                }
            }
        }
        self.executable.clone()
    }
}

pub struct MiniZincEngine {
    config: MiniZincConfig,
}

impl MiniZincEngine {
    pub fn new(config: MiniZincConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MiniZincConfig {
        &self.config
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(self.config.resolved_executable());
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so the solver MiniZinc starts can be stopped with it
        #[cfg(unix)]
        command.process_group(0);

        if let Some(bin) = self.config.bin_dir() {
            if let Some(path) = prepend_search_path("PATH", &bin) {
                command.env("PATH", path);
            }
        }
        if let Some(lib) = self.config.lib_dir() {
            if let Some(path) = prepend_search_path("LD_LIBRARY_PATH", &lib) {
                command.env("LD_LIBRARY_PATH", path);
            }
        }
        if std::env::var_os("MINIZINC_DIR").is_none() {
            if let Some(stdlib) = self.config.stdlib_dir() {
                command.env("MINIZINC_DIR", stdlib);
            }
        }
        command
    }

    /// Run MiniZinc to completion and capture its output
    async fn run<I, S>(&self, args: I) -> std::io::Result<CapturedOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.command(args).output().await?;
        Ok(CapturedOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Every backend registered with this MiniZinc installation
    async fn registry(&self) -> std::result::Result<Vec<BackendDescriptor>, String> {
        let output = self
            .run(["--solvers-json"])
            .await
            .map_err(|e| format!("could not run {}: {}", self.config.executable.display(), e))?;
        if !output.status.success() {
            return Err(output.failure_message());
        }
        json_stream::decode_solvers(&output.stdout)
            .map_err(|e| format!("unreadable solver list: {}", e))
    }

    async fn stream_solve(
        &self,
        args: Vec<OsString>,
        deadline: Option<Duration>,
    ) -> Result<(StreamCollector, ExitStatus, String, bool)> {
        let mut child = self
            .command(&args)
            .spawn()
            .map_err(|e| SolverError::Solve(format!("could not start MiniZinc: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SolverError::Solve("MiniZinc stdout unavailable".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SolverError::Solve("MiniZinc stderr unavailable".to_string()))?;
        let stderr_task = tokio::spawn(async move {
            let mut text = String::new();
            let _ = stderr.read_to_string(&mut text).await;
            text
        });

        let mut collector = StreamCollector::new();
        let mut lines = LinesStream::new(BufReader::new(stdout).lines());
        let read_all = async {
            while let Some(line) = lines.next().await {
                collector.push_line(&line?);
            }
            Ok::<(), std::io::Error>(())
        };

        let timed_out = match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, read_all).await {
                Ok(read) => {
                    read.map_err(|e| SolverError::Solve(format!("reading MiniZinc output: {}", e)))?;
                    false
                }
                Err(_) => true,
            },
            None => {
                read_all
                    .await
                    .map_err(|e| SolverError::Solve(format!("reading MiniZinc output: {}", e)))?;
                false
            }
        };

        if timed_out {
            log::warn!(
                "MiniZinc still running {:?} after its time limit, stopping it ({} solution(s) so far)",
                self.config.timeout_grace,
                collector.solutions_seen()
            );
            stop_process_tree(&mut child).await;
            stderr_task.abort();
        }

        let status = child
            .wait()
            .await
            .map_err(|e| SolverError::Solve(format!("waiting for MiniZinc: {}", e)))?;
        let stderr_text = if timed_out {
            String::new()
        } else {
            stderr_task.await.unwrap_or_default()
        };

        Ok((collector, status, stderr_text, timed_out))
    }
}

#[tonic::async_trait]
impl ConstraintEngine for MiniZincEngine {
    async fn lookup(&self, solver_id: &str) -> Result<BackendDescriptor> {
        let registry = self.registry().await.map_err(SolverError::Lookup)?;
        registry
            .iter()
            .find(|backend| backend.id == solver_id)
            .or_else(|| registry.iter().find(|backend| backend.matches(solver_id)))
            .cloned()
            .ok_or_else(|| SolverError::Lookup(format!("no solver registered for '{}'", solver_id)))
    }

    async fn parse(&self, model_text: &str, backend: &BackendDescriptor) -> Result<Model> {
        let workspace = Workspace::create().map_err(workspace_error)?;
        let model_path = workspace
            .write(MODEL_FILE, model_text.as_bytes())
            .await
            .map_err(workspace_error)?;

        let output = self
            .run([
                OsStr::new("--solver"),
                OsStr::new(&backend.id),
                OsStr::new("--model-interface-only"),
                OsStr::new("--json-stream"),
                model_path.as_os_str(),
            ])
            .await
            .map_err(|e| SolverError::Solve(format!("could not start MiniZinc: {}", e)))?;

        let mut collector = StreamCollector::new();
        for line in output.stdout.lines() {
            collector.push_line(line);
        }
        if !collector.diagnostics().is_empty() {
            return Err(json_stream::diagnostics_to_error(collector.diagnostics()));
        }
        if !output.status.success() {
            return Err(SolverError::Model(output.failure_message()));
        }

        let interface = json_stream::decode_interface(&output.stdout).ok_or_else(|| {
            SolverError::Model("MiniZinc did not report a model interface".to_string())
        })?;
        log::debug!(
            "Model interface: method={} inputs={:?}",
            interface.method,
            interface.inputs.keys().collect::<Vec<_>>()
        );
        Ok(Model::new(model_text, interface))
    }

    async fn solve(&self, instance: &Instance, options: &SolveOptions) -> Result<EngineOutcome> {
        let backend = instance.backend();
        let method = instance.model().method();

        // MiniZinc turns `--intermediate-solutions` into `-a` for solvers that only declare `-a`
        let (enumeration_flag, accepted): (Option<&str>, &[&str]) =
            match (options.all_solutions, method.is_optimization()) {
                (false, _) => (None, &[]),
                (true, false) => (Some("--all-solutions"), &["-a"]),
                (true, true) => (Some("--intermediate-solutions"), &["-i", "-a"]),
            };
        if enumeration_flag.is_some()
            && !backend.std_flags.is_empty()
            && !accepted.iter().any(|flag| backend.supports_flag(flag))
        {
            return Err(SolverError::Solve(format!(
                "solver '{}' cannot report more than one solution ({} unsupported)",
                backend.id,
                accepted.join(" / ")
            )));
        }

        let workspace = Workspace::create().map_err(workspace_error)?;
        let model_path = workspace
            .write(MODEL_FILE, instance.model().source.as_bytes())
            .await
            .map_err(workspace_error)?;

        let mut args: Vec<OsString> = [
            "--solver",
            backend.id.as_str(),
            "--json-stream",
            "--output-mode",
            "json",
            "--output-objective",
            "--statistics",
        ]
        .iter()
        .map(OsString::from)
        .collect();
        if let Some(flag) = enumeration_flag {
            args.push(flag.into());
        }
        if let Some(timeout) = options.timeout {
            args.push("--time-limit".into());
            args.push(timeout.as_millis().max(1).to_string().into());
        }
        args.push(model_path.into_os_string());

        if !instance.data().is_empty() {
            let data: serde_json::Map<String, serde_json::Value> = instance
                .data()
                .iter()
                .map(|(name, value)| (name.clone(), value.to_engine_json()))
                .collect();
            let encoded = serde_json::to_vec(&data)
                .map_err(|e| SolverError::Model(format!("could not encode data: {}", e)))?;
            let data_path = workspace
                .write(DATA_FILE, &encoded)
                .await
                .map_err(workspace_error)?;
            args.push(data_path.into_os_string());
        }

        let deadline = options
            .timeout
            .map(|timeout| timeout + self.config.timeout_grace);
        let (collector, exit, stderr, timed_out) = self.stream_solve(args, deadline).await?;
        drop(workspace);

        let (outcome, diagnostics) = collector.finish(timed_out);
        if !diagnostics.is_empty() {
            return Err(json_stream::diagnostics_to_error(&diagnostics));
        }
        if outcome.status == Some(EngineStatus::Error) {
            return Err(SolverError::Solve(non_empty_or(
                stderr.trim(),
                "the solver reported an error",
            )));
        }
        if !timed_out && !exit.success() {
            return Err(SolverError::Solve(non_empty_or(
                stderr.trim(),
                &format!("MiniZinc exited with {}", exit),
            )));
        }
        Ok(outcome)
    }

    async fn available_backend_ids(&self) -> Result<Vec<String>> {
        let registry = self.registry().await.map_err(SolverError::Discovery)?;
        Ok(registry.into_iter().map(|backend| backend.id).collect())
    }

    fn name(&self) -> &str {
        "MiniZinc"
    }
}

/// Ask the MiniZinc process group to terminate, then kill whatever is left
async fn stop_process_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        if signal_process_group(pid, "TERM").await {
            if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_err() {
                log::debug!("MiniZinc ignored SIGTERM, killing process group {}", pid);
            }
            signal_process_group(pid, "KILL").await;
        }
    }
    if let Err(e) = child.kill().await {
        log::debug!("MiniZinc already stopped: {}", e);
    }
}

#[cfg(unix)]
async fn signal_process_group(pgid: u32, signal: &str) -> bool {
    Command::new("kill")
        .arg(format!("-{}", signal))
        .arg("--")
        .arg(format!("-{}", pgid))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .is_ok_and(|status| status.success())
}

struct CapturedOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

impl CapturedOutput {
    fn failure_message(&self) -> String {
        non_empty_or(
            self.stderr.trim(),
            &format!("MiniZinc exited with {}", self.status),
        )
    }
}

/// Scratch directory holding the files of one engine call
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn create() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("minizinc-tools-").tempdir()?;
        Ok(Self { dir })
    }

    async fn write(&self, name: &str, contents: &[u8]) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(name);
        tokio::fs::write(&path, contents).await?;
        Ok(path)
    }
}

fn workspace_error(e: std::io::Error) -> SolverError {
    SolverError::Solve(format!("could not prepare MiniZinc input files: {}", e))
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    if text.is_empty() {
        fallback.to_string()
    } else {
        text.to_string()
    }
}

fn prepend_search_path(variable: &str, dir: &Path) -> Option<OsString> {
    let existing = std::env::var_os(variable).unwrap_or_default();
    let paths = std::iter::once(dir.to_path_buf()).chain(std::env::split_paths(&existing));
    std::env::join_paths(paths).ok()
}
