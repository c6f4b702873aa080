//! Thin shell-outs to the Docker CLI: volume locations and pausing the
//! project's containers while volume data is copied.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::AppError;

pub fn is_docker_available() -> bool {
    Command::new("docker")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn run(args: &[&str]) -> Result<String, AppError> {
    let output = Command::new("docker").args(args).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            format!("'docker {}' exited with status {}", args.join(" "), output.status)
        } else {
            format!("'docker {}' failed: {}", args.join(" "), stderr.trim())
        };
        return Err(AppError::Docker(message));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Where a named volume's data lives on the Docker host.
pub fn volume_mountpoint(volume: &str) -> Result<PathBuf, AppError> {
    let stdout = run(&["volume", "inspect", "--format", "{{.Mountpoint}}", volume])?;
    let path = stdout.trim();
    if path.is_empty() {
        return Err(AppError::Docker(format!("no mountpoint reported for volume '{volume}'")));
    }
    Ok(PathBuf::from(path))
}

/// Pause every running container of the project and return their ids.
pub fn pause_project(project: &str, verbose: bool) -> Result<Vec<String>, AppError> {
    let filter = format!("label=com.docker.compose.project={project}");
    let stdout = run(&["ps", "-q", "--filter", &filter])?;
    let ids: Vec<String> = stdout.split_whitespace().map(str::to_string).collect();
    if ids.is_empty() {
        return Ok(ids);
    }
    if verbose {
        eprintln!("Pausing {} container(s) of project '{}'.", ids.len(), project);
    }
    let mut args: Vec<&str> = vec!["pause"];
    args.extend(ids.iter().map(String::as_str));
    run(&args)?;
    Ok(ids)
}

pub fn unpause_containers(ids: &[String], verbose: bool) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    if verbose {
        eprintln!("Unpausing {} container(s).", ids.len());
    }
    let mut args: Vec<&str> = vec!["unpause"];
    args.extend(ids.iter().map(String::as_str));
    run(&args)?;
    Ok(())
}
