use std::fs;
use std::path::Path;

use anyhow::Result;
use assert_cmd::Command;
use tempfile::TempDir;

fn readysteady_cmd(root: &Path) -> Result<Command> {
    let mut cmd = Command::cargo_bin("readysteady")?;
    cmd.current_dir(root);
    cmd.env_remove("GITHUB_TOKEN");
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

fn run(cmd: &mut Command) -> Result<(Option<i32>, String, String)> {
    let output = cmd.output()?;
    Ok((
        output.status.code(),
        String::from_utf8(output.stdout)?,
        String::from_utf8(output.stderr)?,
    ))
}

#[test]
fn missing_token_fails_before_any_request() -> Result<()> {
    let td = TempDir::new()?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.args(["--owner", "davidwinter", "--repo", "readysteady", "--tag", "v1.0.0"]);
    let (code, stdout, stderr) = run(&mut cmd)?;
    assert_eq!(code, Some(1), "stderr: {}", stderr);
    insta::assert_snapshot!(stdout, @"");
    assert!(
        stderr.contains("error: GITHUB_TOKEN environment variable not detected"),
        "stderr: {}",
        stderr
    );
    Ok(())
}

#[test]
fn empty_token_is_rejected() -> Result<()> {
    let td = TempDir::new()?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.env("GITHUB_TOKEN", "");
    cmd.args(["--owner", "davidwinter", "--repo", "readysteady", "--tag", "v1.0.0"]);
    let (code, _, stderr) = run(&mut cmd)?;
    assert_eq!(code, Some(1));
    assert!(stderr.contains("GITHUB_TOKEN environment variable not detected"));
    Ok(())
}

#[test]
fn token_variable_comes_from_config() -> Result<()> {
    let td = TempDir::new()?;
    fs::write(
        td.path().join(".readysteady.toml"),
        "owner = \"davidwinter\"\nrepo = \"readysteady\"\ntoken_env = \"READYSTEADY_TEST_TOKEN\"\n",
    )?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.env_remove("READYSTEADY_TEST_TOKEN");
    cmd.args(["--tag", "v1.0.0"]);
    let (code, _, stderr) = run(&mut cmd)?;
    assert_eq!(code, Some(1));
    assert!(
        stderr.contains("READYSTEADY_TEST_TOKEN environment variable not detected"),
        "stderr: {}",
        stderr
    );
    Ok(())
}

#[test]
fn owner_is_required_without_config() -> Result<()> {
    let td = TempDir::new()?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.args(["--repo", "readysteady", "--tag", "v1.0.0"]);
    let (code, _, stderr) = run(&mut cmd)?;
    assert_eq!(code, Some(1));
    assert!(stderr.contains("missing --owner"), "stderr: {}", stderr);
    Ok(())
}

#[test]
fn malformed_config_is_reported_with_path() -> Result<()> {
    let td = TempDir::new()?;
    fs::write(td.path().join(".readysteady.toml"), "owner = [\n")?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.args(["--tag", "v1.0.0"]);
    let (code, _, stderr) = run(&mut cmd)?;
    assert_eq!(code, Some(1));
    assert!(stderr.contains("failed to parse"), "stderr: {}", stderr);
    assert!(stderr.contains(".readysteady.toml"), "stderr: {}", stderr);
    Ok(())
}

#[test]
fn bare_prefix_tag_is_rejected() -> Result<()> {
    let td = TempDir::new()?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.args(["--owner", "davidwinter", "--repo", "readysteady", "--tag", "v"]);
    let (code, _, stderr) = run(&mut cmd)?;
    assert_eq!(code, Some(1));
    assert!(
        stderr.contains("error: cannot derive a release name from tag \"v\""),
        "stderr: {}",
        stderr
    );
    Ok(())
}

#[test]
fn tag_flag_is_required() -> Result<()> {
    let td = TempDir::new()?;
    let mut cmd = readysteady_cmd(td.path())?;
    cmd.args(["--owner", "davidwinter", "--repo", "readysteady"]);
    let (code, stdout, stderr) = run(&mut cmd)?;
    assert_ne!(code, Some(0));
    insta::assert_snapshot!(stdout, @"");
    assert!(stderr.contains("--tag <TAG>"), "stderr: {}", stderr);
    Ok(())
}
