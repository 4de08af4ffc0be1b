mod common;

use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

async fn wait_for_exit(mut child: Child, reason: &str) -> Result<ExitStatus> {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            let _ = child.wait();
            anyhow::bail!("server started with {}", reason);
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

fn with_free_port(cmd: &mut Command) -> Result<&mut Command> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(cmd.env("CVEDB_WEB_PORT", port.to_string()))
}

#[tokio::test]
async fn refuses_to_start_with_empty_session_key() -> Result<()> {
    let mut cmd = common::server_command("");
    let child = with_free_port(&mut cmd)?.spawn()?;

    let status = wait_for_exit(child, "an empty CVEDB_SESSION_KEY").await?;
    assert!(!status.success());
    Ok(())
}

#[tokio::test]
async fn refuses_to_start_without_session_key() -> Result<()> {
    // Empty working directory so no .env file can supply the key
    let workdir = std::env::temp_dir().join(format!("cvedb-web-no-env-{}", std::process::id()));
    std::fs::create_dir_all(&workdir)?;

    let mut cmd = common::server_command("");
    cmd.env_remove("CVEDB_SESSION_KEY").current_dir(&workdir);
    let child = with_free_port(&mut cmd)?.spawn()?;

    let status = wait_for_exit(child, "CVEDB_SESSION_KEY unset").await;
    let _ = std::fs::remove_dir_all(&workdir);

    assert!(!status?.success());
    Ok(())
}
