//! Utility functions for use in other parts of penrose
use crate::{Error, Result};
use nix::unistd::{fork, setsid, ForkResult};
use std::{
    io::Read,
    os::unix::process::CommandExt,
    process::{Command, Stdio},
};
use tracing::{info, warn};

/// Run an external command
///
/// This redirects the process stdout and stderr to /dev/null.
pub fn spawn<S: Into<String>>(cmd: S) -> Result<()> {
    let s = cmd.into();
    let mut parts = s.split_whitespace();
    let program = parts.next().ok_or_else(|| Error::SpawnProc("empty command".to_owned()))?;
    let args: Vec<&str> = parts.collect();

    fork_exec(program, &args)
}

/// Run an external command with the specified command line arguments
///
/// This redirects the process stdout and stderr to /dev/null.
pub fn spawn_with_args<S: Into<String>>(cmd: S, args: &[&str]) -> Result<()> {
    fork_exec(&cmd.into(), args)
}

/// Detach `program` from the running window manager process using a double
/// fork: the intermediate child calls `setsid()` to become a session leader
/// (so it survives the window manager restarting or exiting) before the
/// grandchild execs `program` in its place. The intermediate child exits
/// immediately after forking so that it never becomes a zombie that we have
/// to wait on: the kernel reaps it directly.
fn fork_exec(program: &str, args: &[&str]) -> Result<()> {
    match unsafe { fork() }.map_err(|e| Error::SpawnProc(format!("fork failed: {e}")))? {
        ForkResult::Parent { .. } => Ok(()),

        ForkResult::Child => {
            if let Err(e) = setsid() {
                warn!(%e, "setsid failed in forked child");
            }

            match unsafe { fork() } {
                Ok(ForkResult::Parent { .. }) => std::process::exit(0),

                Ok(ForkResult::Child) => {
                    let err = Command::new(program)
                        .args(args)
                        .stdout(Stdio::null())
                        .stderr(Stdio::null())
                        .exec();
                    warn!(%err, %program, "failed to exec spawned process");
                    std::process::exit(1);
                }

                Err(_) => std::process::exit(1),
            }
        }
    }
}

/// Run an external command and return its output.
///
/// NOTE: std::process::Command::output will not work within penrose due to the
/// way that signal handling is set up. Use this function if you need to access the
/// output of a process that you spawn.
pub fn spawn_for_output<S: Into<String>>(cmd: S) -> std::io::Result<String> {
    let cmd = cmd.into();
    info!(?cmd, "spawning subprocess for output");
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    let result = if parts.len() > 1 {
        Command::new(parts[0])
            .stdout(Stdio::piped())
            .args(&parts[1..])
            .spawn()
    } else {
        Command::new(parts[0]).stdout(Stdio::piped()).spawn()
    };

    let mut child = result?;
    let mut buff = String::new();
    child
        .stdout
        .take()
        .expect("to have output")
        .read_to_string(&mut buff)
        .map(|_| buff)
}

/// Run an external command with arguments and return its output.
///
/// NOTE: std::process::Command::output will not work within penrose due to the
/// way that signal handling is set up. Use this function if you need to access the
/// output of a process that you spawn.
pub fn spawn_for_output_with_args<S: Into<String>>(
    cmd: S,
    args: &[&str],
) -> std::io::Result<String> {
    let cmd = cmd.into();

    info!(?cmd, ?args, "spawning subprocess for output");
    let mut child = Command::new(&cmd)
        .stdout(Stdio::piped())
        .args(args)
        .spawn()?;

    info!(?cmd, ?args, "reading output");
    let mut buff = String::new();
    child
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut buff)
        .map(|_| buff)
}

/// Use `notify-send` to display a message to the user
pub fn notify(msg: &str) -> std::io::Result<()> {
    Command::new("notify-send").arg(msg).output().map(|_| ())
}
