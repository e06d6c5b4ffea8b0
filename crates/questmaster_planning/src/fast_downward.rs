//! Fast Downward subprocess adapter.

use async_trait::async_trait;
use derive_getters::Getters;
use questmaster_error::{BuilderError, PlannerError, PlannerErrorKind, QuestResult};
use questmaster_interface::{Planner, PlannerOutcome};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Default search configuration.
pub const DEFAULT_SEARCH: &str = "astar(lmcut())";

/// File name Fast Downward writes the plan to.
pub const DEFAULT_PLAN_FILE: &str = "sas_plan";

/// Slack on top of the planner's own time limit before the process is killed.
const KILL_GRACE_SECS: u64 = 10;

/// Runs Fast Downward as a subprocess.
///
/// The planner is launched in `work_dir` as
/// `<command> [args] [--overall-time-limit Ns] --plan-file <plan_file> <domain> <problem> --search <search>`.
/// A run succeeds only if the process exits with status 0 and the plan file
/// exists afterwards.
///
/// # Examples
///
/// ```
/// use questmaster_planning::FastDownwardBuilder;
///
/// let planner = FastDownwardBuilder::default()
///     .command("./downward/fast-downward.py")
///     .work_dir("/tmp/questmaster")
///     .build()
///     .unwrap();
/// assert_eq!(planner.search(), "astar(lmcut())");
/// assert_eq!(planner.plan_file(), "sas_plan");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_builder::Builder)]
#[builder(setter(into), build_fn(private, name = "build_internal"))]
pub struct FastDownward {
    /// Planner executable
    command: String,
    /// Arguments placed before the planner's own options
    #[builder(default)]
    args: Vec<String>,
    /// Search configuration passed to `--search`
    #[builder(default = "DEFAULT_SEARCH.to_string()")]
    search: String,
    /// Plan file name, relative to `work_dir`
    #[builder(default = "DEFAULT_PLAN_FILE.to_string()")]
    plan_file: String,
    /// Directory the planner runs in
    work_dir: PathBuf,
    /// Wall-clock limit handed to the planner
    #[builder(default, setter(strip_option))]
    time_limit_secs: Option<u64>,
}

impl FastDownwardBuilder {
    /// Build the planner adapter.
    ///
    /// # Errors
    ///
    /// Returns error if `command` or `work_dir` is missing.
    pub fn build(&self) -> Result<FastDownward, BuilderError> {
        self.build_internal()
            .map_err(|e| BuilderError::from(e.to_string()))
    }
}

impl FastDownward {
    /// Path of the plan file.
    pub fn plan_path(&self) -> PathBuf {
        self.work_dir.join(&self.plan_file)
    }

    fn io_error(context: &str, path: &Path, err: std::io::Error) -> PlannerError {
        PlannerError::new(PlannerErrorKind::Io(format!(
            "{} {}: {}",
            context,
            path.display(),
            err
        )))
    }

    async fn remove_stale_plan(&self) -> Result<(), PlannerError> {
        let path = self.plan_path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed stale plan file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error("remove", &path, e)),
        }
    }

    fn build_command(&self, domain: &Path, problem: &Path) -> Command {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args);
        if let Some(secs) = self.time_limit_secs {
            cmd.arg("--overall-time-limit").arg(format!("{}s", secs));
        }
        cmd.arg("--plan-file")
            .arg(&self.plan_file)
            .arg(domain)
            .arg(problem)
            .arg("--search")
            .arg(&self.search)
            .current_dir(&self.work_dir)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl Planner for FastDownward {
    #[tracing::instrument(
        skip(self),
        fields(
            planner = %self.command,
            domain = %domain.display(),
            problem = %problem.display(),
            search = %self.search
        )
    )]
    async fn solve(&self, domain: &Path, problem: &Path) -> QuestResult<PlannerOutcome> {
        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|e| Self::io_error("create", &self.work_dir, e))?;

        // The planner runs in work_dir, so relative model paths must be resolved first.
        let domain = tokio::fs::canonicalize(domain)
            .await
            .map_err(|e| Self::io_error("resolve", domain, e))?;
        let problem = tokio::fs::canonicalize(problem)
            .await
            .map_err(|e| Self::io_error("resolve", problem, e))?;

        self.remove_stale_plan().await?;

        let child = self.build_command(&domain, &problem).spawn().map_err(|e| {
            PlannerError::new(PlannerErrorKind::Spawn {
                command: self.command.clone(),
                message: e.to_string(),
            })
        })?;

        tracing::info!("Planner started");

        let output = match self.time_limit_secs {
            Some(secs) => {
                let limit = Duration::from_secs(secs + KILL_GRACE_SECS);
                tokio::time::timeout(limit, child.wait_with_output())
                    .await
                    .map_err(|_| PlannerError::new(PlannerErrorKind::Timeout(secs)))?
            }
            None => child.wait_with_output().await,
        }
        .map_err(|e| PlannerError::new(PlannerErrorKind::Io(e.to_string())))?;

        let log = format!(
            "STDOUT:\n{}\nSTDERR:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        let exit_code = output.status.code();

        if output.status.success() {
            let path = self.plan_path();
            match tokio::fs::read_to_string(&path).await {
                Ok(plan) => {
                    tracing::info!(plan_bytes = plan.len(), "Plan found");
                    return Ok(PlannerOutcome::solved(plan, log));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!("Planner exited cleanly without writing a plan");
                }
                Err(e) => return Err(Self::io_error("read", &path, e).into()),
            }
        }

        tracing::warn!(exit_code = ?exit_code, "Planner found no plan");
        Ok(PlannerOutcome::failed(log, exit_code))
    }

    fn name(&self) -> &str {
        "fast-downward"
    }
}
