use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Context;

pub(crate) fn send_to_clipboard(data: &[u8]) -> anyhow::Result<()> {
    let mut cmd = clipboard_cmd();
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to start the clipboard helper (`{program}`)"))?;
    child
        .stdin
        .take()
        .context("clipboard helper has no stdin")?
        .write_all(data)
        .with_context(|| format!("failed to write to the clipboard helper (`{program}`)"))?;
    let exit_status = child
        .wait()
        .with_context(|| format!("failed to wait for the clipboard helper (`{program}`)"))?;
    if exit_status.success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "the clipboard helper (`{}`) exited with {}",
            program,
            exit_status
        ))
    }
}

#[cfg(target_os = "macos")]
fn clipboard_cmd() -> Command {
    Command::new("pbcopy")
}

#[cfg(not(target_os = "macos"))]
fn clipboard_cmd() -> Command {
    let mut cmd = Command::new("xsel");
    cmd.arg("-b");
    cmd
}
