//! Engine process transport
//!
//! [`EngineIo`] is the line-oriented channel the bridge speaks UCI over.
//! [`UciProcess`] is the real one: a child process with piped stdin/stdout.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::game::error::{GameError, GameResult};

/// How long a process gets to exit after `quit` before it is killed
const EXIT_GRACE: Duration = Duration::from_millis(500);

/// Kills the engine from any thread, unblocking whoever waits on its output
pub type KillSwitch = Arc<dyn Fn() + Send + Sync>;

/// Line-oriented connection to a UCI engine
pub trait EngineIo: Send {
    /// Write one command line
    fn send_line(&mut self, line: &str) -> GameResult<()>;

    /// Next line of engine output
    ///
    /// `Ok(None)` when nothing arrived within `timeout`. Once the engine has
    /// closed its output this is an error.
    fn read_line(&mut self, timeout: Duration) -> GameResult<Option<String>>;

    /// Release the underlying process after `quit` has been sent
    fn shutdown(&mut self) {}

    /// Handle that can terminate the engine while another thread talks to it
    fn kill_switch(&self) -> Option<KillSwitch> {
        None
    }
}

/// A UCI engine running as a child process
///
/// Stdout is drained by a reader thread so reads can time out.
pub struct UciProcess {
    path: PathBuf,
    child: Arc<Mutex<Child>>,
    stdin: BufWriter<ChildStdin>,
    lines: Receiver<String>,
    reader: Option<thread::JoinHandle<()>>,
}

impl UciProcess {
    /// Launch the engine executable at `path`
    ///
    /// # Errors
    /// [`GameError::EngineProcessUnavailable`] if it cannot be started.
    pub fn spawn(path: &Path) -> GameResult<Self> {
        let unavailable = |source: std::io::Error| GameError::EngineProcessUnavailable {
            path: path.to_path_buf(),
            source,
        };

        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(unavailable)?;

        let missing_pipe = |name: &str| {
            std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                format!("no {name} handle for engine process"),
            )
        };
        let stdin = child.stdin.take().ok_or_else(|| unavailable(missing_pipe("stdin")));
        let stdout = child.stdout.take().ok_or_else(|| unavailable(missing_pipe("stdout")));
        let (stdin, stdout) = match (stdin, stdout) {
            (Ok(stdin), Ok(stdout)) => (stdin, stdout),
            (Err(e), _) | (_, Err(e)) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let (lines, reader) = match spawn_reader(stdout) {
            Ok(spawned) => spawned,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(unavailable(e));
            }
        };

        debug!("[ENGINE] Spawned {:?} (pid {})", path, child.id());
        Ok(UciProcess {
            path: path.to_path_buf(),
            child: Arc::new(Mutex::new(child)),
            stdin: BufWriter::new(stdin),
            lines,
            reader: Some(reader),
        })
    }

    fn broken(&self, source: std::io::Error) -> GameError {
        GameError::EngineProcessUnavailable {
            path: self.path.clone(),
            source,
        }
    }
}

/// Forward stdout lines into a channel until the engine closes it
fn spawn_reader(
    stdout: ChildStdout,
) -> std::io::Result<(Receiver<String>, thread::JoinHandle<()>)> {
    let (tx, rx) = unbounded();
    let handle = thread::Builder::new()
        .name("uci-stdout".into())
        .spawn(move || {
            for line in BufReader::new(stdout).lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("[ENGINE] Failed to read engine output: {}", e);
                        break;
                    }
                }
            }
            trace!("[ENGINE] Engine output closed");
        })?;
    Ok((rx, handle))
}

fn kill_child(child: &Mutex<Child>) {
    let mut child = child.lock();
    if let Ok(None) = child.try_wait() {
        if let Err(e) = child.kill() {
            warn!("[ENGINE] Failed to kill engine process: {}", e);
        }
        let _ = child.wait();
    }
}

impl EngineIo for UciProcess {
    fn send_line(&mut self, line: &str) -> GameResult<()> {
        trace!("[ENGINE] >> {}", line);
        writeln!(self.stdin, "{line}").map_err(|e| self.broken(e))?;
        self.stdin.flush().map_err(|e| self.broken(e))
    }

    fn read_line(&mut self, timeout: Duration) -> GameResult<Option<String>> {
        match self.lines.recv_timeout(timeout) {
            Ok(line) => {
                let line = line.trim_end().to_string();
                trace!("[ENGINE] << {}", line);
                Ok(Some(line))
            }
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => {
                Err(GameError::protocol("engine closed its output"))
            }
        }
    }

    fn shutdown(&mut self) {
        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            let status = self.child.lock().try_wait();
            match status {
                Ok(Some(status)) => {
                    debug!("[ENGINE] Process exited with {}", status);
                    break;
                }
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                Ok(None) | Err(_) => {
                    warn!("[ENGINE] Process did not exit after quit, killing it");
                    kill_child(&self.child);
                    break;
                }
            }
        }
        // stdout is closed once the process is gone
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }

    fn kill_switch(&self) -> Option<KillSwitch> {
        let child = Arc::clone(&self.child);
        Some(Arc::new(move || kill_child(&child)))
    }
}

impl Drop for UciProcess {
    fn drop(&mut self) {
        // reap the child if shutdown was never called
        kill_child(&self.child);
    }
}
