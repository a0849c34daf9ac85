use anyhow::{Context, Result};
use std::collections::HashSet;
use std::env;
use std::process::Command;

use crate::utils::{find_project_root, get_workspace_crates, run_cargo_command};

/// Crates the checks know about
const CRATES: &[&str] = &["monzo-lab", "xtask"];

/// Run comprehensive checks including build, format, clippy and tests
pub fn run_check(skip_fmt: bool) -> Result<()> {
    println!("🔧 Running comprehensive checks...");

    let project_root = find_project_root()?;
    env::set_current_dir(&project_root).context("Failed to change to project root directory")?;

    check_all_crates()?;

    if !skip_fmt {
        println!("📝 Checking code formatting...");
        let output = Command::new("cargo")
            .args(["fmt", "--all", "--", "--check"])
            .output()
            .context("Failed to run cargo fmt check")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Code formatting check failed: {}", stderr);
        }
    } else {
        println!("📝 Skipping code formatting check (--skip-fmt)");
    }

    clippy_all_crates()?;

    println!("🧪 Running tests...");
    let output = Command::new("cargo")
        .args(["test", "--quiet", "--workspace", "--all-features"])
        .output()
        .context("Failed to run cargo test")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Tests failed: {}", stderr);
    }

    println!("📚 Running doc tests...");
    let output = Command::new("cargo")
        .args(["test", "--quiet", "--workspace", "--doc"])
        .output()
        .context("Failed to run cargo test --doc")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("Doc tests failed: {}", stderr);
    }

    println!("✅ All checks passed successfully!");
    Ok(())
}

/// Check all workspace crates
pub fn check_all_crates() -> Result<()> {
    println!("🔧 Checking all crates...");

    let project_root = find_project_root()?;
    env::set_current_dir(&project_root).context("Failed to change to project root directory")?;

    let crates = get_workspace_crates(&project_root)?;
    for (crate_name, manifest_path) in &crates {
        if CRATES.contains(&crate_name.as_str()) {
            run_cargo_command("check", crate_name, manifest_path, &["--all-targets"], "Checking")?;
        }
    }

    let crate_names: Vec<String> = crates.iter().map(|(name, _)| name.clone()).collect();
    verify_crate_coverage(&crate_names)?;

    println!("✅ All crates checked successfully!");
    Ok(())
}

/// Run clippy on all workspace crates
pub fn clippy_all_crates() -> Result<()> {
    println!("🔧 Running clippy on all crates...");

    let project_root = find_project_root()?;
    env::set_current_dir(&project_root).context("Failed to change to project root directory")?;

    let crates = get_workspace_crates(&project_root)?;
    for (crate_name, manifest_path) in &crates {
        if CRATES.contains(&crate_name.as_str()) {
            run_cargo_command(
                "clippy",
                crate_name,
                manifest_path,
                &[
                    "--all-targets",
                    "--all-features",
                    "--",
                    "-D",
                    "warnings",
                    "-W",
                    "clippy::all",
                ],
                "Running clippy on",
            )?;
        }
    }

    let crate_names: Vec<String> = crates.iter().map(|(name, _)| name.clone()).collect();
    verify_crate_coverage(&crate_names)?;

    println!("✅ All crates linted successfully!");
    Ok(())
}

/// Verify that all crates in the workspace are handled
fn verify_crate_coverage(crates: &[String]) -> Result<()> {
    let mut expected = CRATES.iter().copied().collect::<HashSet<_>>();
    let mut uncategorized = Vec::new();

    for crate_name in crates {
        if !expected.remove(crate_name.as_str()) {
            uncategorized.push(crate_name.clone());
        }
    }

    if !expected.is_empty() {
        let mut missing: Vec<_> = expected.into_iter().collect();
        missing.sort_unstable();
        anyhow::bail!("Expected crates not found in workspace: {}", missing.join(", "));
    }

    if !uncategorized.is_empty() {
        println!(
            "⚠️  Warning: Found uncategorized crates (not processed): {}",
            uncategorized.join(", ")
        );
        println!("   Consider adding them to CRATES in check.rs");
    }

    Ok(())
}
