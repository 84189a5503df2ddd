// ABOUTME: Launches the deployer subprocess and streams its combined output.
// ABOUTME: Races completion against an optional timeout, killing the process on expiry.

use crate::session::SessionContext;
use crate::types::DeployCommand;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum Error {
    #[error("deployment failed with exit code {exit_code}")]
    Failed { exit_code: i32, output: String },

    #[error("deployment timed out after {limit:?}")]
    TimedOut { limit: Duration, output: String },

    #[error("failed to launch deployer: {0}")]
    Launch(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of a completed, successful deployment run.
#[derive(Debug)]
pub struct RunResult {
    pub exit_code: i32,
    /// Combined stdout and stderr in arrival order as observed by the two
    /// listeners. No cross-stream ordering is guaranteed beyond what the
    /// subprocess's own I/O delivers.
    pub output: String,
}

/// Run the deployer in `working_dir` with the built argument vector.
///
/// stdout and stderr are consumed by two independent listeners; each chunk is
/// appended to one shared accumulation buffer and forwarded immediately to
/// the corresponding stream of this process, so the caller sees output live.
///
/// With a timeout configured, the exit wait races a timer; tokio drops the
/// timer on either outcome. If the timer wins, the subprocess is killed and
/// the run fails with [`Error::TimedOut`]. A non-zero exit fails with
/// [`Error::Failed`]. Both variants retain the output captured so far.
pub async fn run(
    binary: &Path,
    command: &DeployCommand,
    working_dir: &Path,
    ctx: &SessionContext,
    timeout: Option<Duration>,
) -> Result<RunResult> {
    let mut cmd = Command::new(binary);
    cmd.args(command.args())
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    ctx.apply(&mut cmd);

    tracing::debug!(args = ?command.args(), "launching deployer");
    let mut child = cmd.spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("child stdout not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| std::io::Error::other("child stderr not captured"))?;

    let buffer = Arc::new(Mutex::new(String::new()));
    let out_listener = tokio::spawn(pump(stdout, Arc::clone(&buffer), tokio::io::stdout()));
    let err_listener = tokio::spawn(pump(stderr, Arc::clone(&buffer), tokio::io::stderr()));

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(waited) => waited?,
            Err(_) => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                let output = drain(out_listener, err_listener, &buffer).await;
                return Err(Error::TimedOut { limit, output });
            }
        },
        None => child.wait().await?,
    };

    let output = drain(out_listener, err_listener, &buffer).await;
    let exit_code = status.code().unwrap_or(-1);

    if exit_code != 0 {
        return Err(Error::Failed { exit_code, output });
    }

    Ok(RunResult { exit_code, output })
}

/// Copy chunks from a child stream into the shared buffer and the live sink.
async fn pump<R, W>(mut reader: R, buffer: Arc<Mutex<String>>, mut sink: W)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut chunk = [0u8; 8192];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                buffer
                    .lock()
                    .await
                    .push_str(&String::from_utf8_lossy(&chunk[..n]));
                let _ = sink.write_all(&chunk[..n]).await;
                let _ = sink.flush().await;
            }
        }
    }
}

/// Wait for both listeners to hit EOF, then take the accumulated output.
async fn drain(
    out_listener: JoinHandle<()>,
    err_listener: JoinHandle<()>,
    buffer: &Mutex<String>,
) -> String {
    let _ = futures::future::join(out_listener, err_listener).await;
    buffer.lock().await.clone()
}
