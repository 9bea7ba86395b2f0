use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::log_debug;

/// Runs the `svn` executable.
///
/// Implementations never fail: any spawn error or non-zero exit is reported
/// as an empty string, so callers only ever inspect the text they got back.
#[async_trait]
pub trait SvnRunner: Send + Sync {
    /// Run `svn <args>` with `cwd` as the working directory and return its
    /// trimmed standard output.
    async fn run(&self, args: &[&str], cwd: &Path) -> String;
}

/// Runner backed by a real subprocess.
#[derive(Debug, Clone)]
pub struct SystemSvn {
    program: String,
}

impl SystemSvn {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for SystemSvn {
    fn default() -> Self {
        Self::new("svn")
    }
}

#[async_trait]
impl SvnRunner for SystemSvn {
    async fn run(&self, args: &[&str], cwd: &Path) -> String {
        log_debug!("Running {} {} in {}", self.program, args.join(" "), cwd.display());

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                log_debug!("Failed to execute {} {}: {}", self.program, args.join(" "), e);
                return String::new();
            }
        };

        // stderr is advisory; only the exit status decides success
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            log_debug!("{} {} stderr: {}", self.program, args.join(" "), stderr.trim());
        }

        if !output.status.success() {
            log_debug!(
                "{} {} exited with {}",
                self.program,
                args.join(" "),
                output.status
            );
            return String::new();
        }

        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_executable_yields_empty_output() {
        let runner = SystemSvn::new("svn-buildinfo-definitely-not-installed");
        let cwd = std::env::temp_dir();
        assert_eq!(runner.run(&["--version"], &cwd).await, "");
    }
}
