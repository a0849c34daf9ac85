use anyhow::{Context, Result};
use cargo_metadata::MetadataCommand;
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Find the workspace root by looking for a Cargo.toml with a [workspace] table
pub fn find_project_root() -> Result<PathBuf> {
    let current = env::current_dir().context("Failed to get current directory")?;

    let mut path = current.as_path();
    loop {
        let manifest = path.join("Cargo.toml");
        if manifest.exists() {
            let contents = std::fs::read_to_string(&manifest)
                .with_context(|| format!("Failed to read {}", manifest.display()))?;
            if contents.lines().any(|line| line.trim() == "[workspace]") {
                return Ok(path.to_path_buf());
            }
        }

        match path.parent() {
            Some(parent) => path = parent,
            None => {
                anyhow::bail!("Could not find project root (looking for a workspace Cargo.toml)")
            }
        }
    }
}

/// Names and manifest paths of all workspace members
pub fn get_workspace_crates(project_root: &Path) -> Result<Vec<(String, String)>> {
    let metadata = MetadataCommand::new()
        .manifest_path(project_root.join("Cargo.toml"))
        .no_deps()
        .exec()
        .context("Failed to read cargo metadata")?;

    Ok(metadata
        .workspace_packages()
        .into_iter()
        .map(|package| (package.name.to_string(), package.manifest_path.to_string()))
        .collect())
}

/// Run a cargo subcommand on a single crate, failing with its stderr
pub fn run_cargo_command(
    command: &str,
    crate_name: &str,
    manifest_path: &str,
    extra_args: &[&str],
    verb: &str,
) -> Result<()> {
    println!("  {verb} {crate_name} ...");

    let output = Command::new("cargo")
        .args([command, "--quiet", "--manifest-path", manifest_path])
        .args(extra_args)
        .output()
        .with_context(|| format!("Failed to run cargo {command} on {crate_name}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("cargo {command} failed on {crate_name}: {stderr}");
    }

    Ok(())
}
