//! Runs commands through the monitored channel or hands them off

use super::environment::Environment;
use super::handoff::HandoffSink;
use super::outcome::{DispatchMode, ExecutionOutcome, TOOL_NOT_FOUND_EXIT_CODE};
use crate::error::{Error, Result};
use crate::log::LogView;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Owns the monitored log view and the hand-off channel.
///
/// `dispatch` takes `&mut self`, so only one run can write the view at a time.
pub struct Dispatcher<H: HandoffSink> {
    environment: Environment,
    handoff: H,
    log: LogView,
    log_path: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    echo: bool,
}

impl<H: HandoffSink> Dispatcher<H> {
    pub fn new(environment: Environment, handoff: H) -> Self {
        Self {
            environment,
            handoff,
            log: LogView::new(),
            log_path: None,
            working_dir: None,
            echo: true,
        }
    }

    /// Persist the log view to `path` at the start and end of every run
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Directory monitored commands run in
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Mirror captured output to this process's stdout/stderr
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn log(&self) -> &LogView {
        &self.log
    }

    pub fn handoff(&self) -> &H {
        &self.handoff
    }

    pub fn dispatch(&mut self, command: &str, mode: DispatchMode) -> Result<ExecutionOutcome> {
        match mode {
            DispatchMode::Handoff => {
                self.handoff.publish(command)?;
                info!("Handed off via {}: {}", self.handoff.name(), command);
                Ok(ExecutionOutcome::handoff())
            }
            DispatchMode::Monitored => {
                let exit_code = self.run_monitored(command)?;
                let mut outcome = ExecutionOutcome::completed(exit_code);
                match classify_exit(command, exit_code) {
                    Ok(()) => {}
                    Err(Error::ToolNotFound(failed)) => {
                        warn!(
                            "Tool not found (exit {}); copy the command into a shell where the toolchain is on PATH",
                            TOOL_NOT_FOUND_EXIT_CODE
                        );
                        match self.handoff.publish(&failed) {
                            Ok(()) => outcome.handed_off = true,
                            Err(e) => warn!("Could not hand off recovery command: {}", e),
                        }
                        outcome.recovery_command = Some(failed);
                    }
                    Err(e) => return Err(e),
                }
                Ok(outcome)
            }
        }
    }

    fn run_monitored(&mut self, command: &str) -> Result<Option<i32>> {
        self.log.begin(command);
        self.persist_log()?;
        info!("Running: {}", command);

        let mut cmd = self.environment.command(command);
        if let Some(dir) = &self.working_dir {
            debug!("Working directory: {}", dir.display());
            cmd.current_dir(dir);
        }
        let spawned = cmd
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("Failed to start {}: {}", self.environment.shell().display(), e);
                self.log.push_line(format!("failed to start: {e}"));
                self.log.finish(None);
                self.persist_log()?;
                return Err(e.into());
            }
        };

        let (tx, rx) = mpsc::channel::<(Stream, String)>();
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(forward_lines(stdout, Stream::Stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(forward_lines(stderr, Stream::Stderr, tx.clone()));
        }
        drop(tx);

        for (stream, line) in rx {
            if self.echo {
                echo_line(stream, &line);
            }
            self.log.push_line(line);
        }
        for reader in readers {
            if reader.join().is_err() {
                warn!("Output reader thread panicked");
            }
        }

        let status = child.wait()?;
        let exit_code = exit_code(status);
        debug!("Command finished with exit code {:?}", exit_code);

        self.log.finish(exit_code);
        self.persist_log()?;
        Ok(exit_code)
    }

    fn persist_log(&self) -> Result<()> {
        if let Some(path) = &self.log_path {
            self.log.save(path)?;
        }
        Ok(())
    }
}

/// Sort a finished run: exit 127 is a recoverable missing-tool failure,
/// everything else is left to the log.
pub fn classify_exit(command: &str, exit_code: Option<i32>) -> Result<()> {
    if exit_code == Some(TOOL_NOT_FOUND_EXIT_CODE) {
        return Err(Error::ToolNotFound(command.to_string()));
    }
    Ok(())
}

fn forward_lines<R: Read + Send + 'static>(
    source: R,
    stream: Stream,
    tx: mpsc::Sender<(Stream, String)>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\n', '\r'])
                        .to_string();
                    if tx.send((stream, line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!("Stopped reading {:?}: {}", stream, e);
                    break;
                }
            }
        }
    })
}

fn echo_line(stream: Stream, line: &str) {
    // A closed terminal must not abort the run
    let _ = match stream {
        Stream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
        Stream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
    };
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.code().or_else(|| status.signal().map(|signal| 128 + signal))
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> Option<i32> {
    status.code()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemorySink;

    fn dispatcher() -> Dispatcher<MemorySink> {
        Dispatcher::new(Environment::inherit(), MemorySink::new()).with_echo(false)
    }

    #[test]
    fn test_classify_exit() {
        assert!(classify_exit("x", Some(0)).is_ok());
        assert!(classify_exit("x", Some(1)).is_ok());
        assert!(classify_exit("x", None).is_ok());
        assert!(matches!(
            classify_exit("mpicc a.c", Some(127)),
            Err(Error::ToolNotFound(ref cmd)) if cmd == "mpicc a.c"
        ));
    }

    #[test]
    fn test_handoff_does_not_execute() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let marker = temp_dir.path().join("ran");
        let command = format!("touch {}", marker.display());

        let mut dispatcher = dispatcher();
        let outcome = dispatcher.dispatch(&command, DispatchMode::Handoff).unwrap();

        assert_eq!(outcome.exit_code, None);
        assert!(outcome.handed_off);
        assert!(outcome.success());
        assert_eq!(dispatcher.handoff().contents(), Some(command.as_str()));
        assert!(!marker.exists());
        assert!(dispatcher.log().command.is_empty());
    }

    #[test]
    fn test_monitored_captures_both_streams() {
        let mut dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch(
                "echo out; echo 'code.c:2:3: error: boom' 1>&2",
                DispatchMode::Monitored,
            )
            .unwrap();

        assert_eq!(outcome.exit_code, Some(0));
        assert!(outcome.success());
        let log = dispatcher.log();
        assert!(log.lines.contains(&"out".to_string()));
        assert_eq!(log.diagnostics.len(), 1);
        assert_eq!(log.diagnostics[0].line, 2);
        assert!(!log.running);
        assert_eq!(dispatcher.handoff().writes(), 0);
    }

    #[test]
    fn test_exit_127_hands_off_same_command() {
        let mut dispatcher = dispatcher();
        let command = "dslc-definitely-not-installed --mpi code.c";
        let outcome = dispatcher.dispatch(command, DispatchMode::Monitored).unwrap();

        assert_eq!(outcome.exit_code, Some(127));
        assert!(outcome.is_tool_not_found());
        assert_eq!(outcome.recovery_command.as_deref(), Some(command));
        assert!(outcome.handed_off);
        assert_eq!(dispatcher.handoff().contents(), Some(command));
    }

    #[test]
    fn test_other_failures_leave_handoff_untouched() {
        let mut dispatcher = dispatcher();
        for code in [1, 2, 126, 128] {
            let outcome = dispatcher
                .dispatch(&format!("exit {code}"), DispatchMode::Monitored)
                .unwrap();
            assert_eq!(outcome.exit_code, Some(code));
            assert_eq!(outcome.recovery_command, None);
            assert!(!outcome.handed_off);
        }
        assert_eq!(dispatcher.handoff().contents(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_reports_128_plus_signal() {
        let mut dispatcher = dispatcher();
        let outcome = dispatcher
            .dispatch("kill -TERM $$", DispatchMode::Monitored)
            .unwrap();
        assert_eq!(outcome.exit_code, Some(128 + 15));
    }

    #[test]
    fn test_rerun_replaces_log() {
        let mut dispatcher = dispatcher();
        dispatcher.dispatch("echo first", DispatchMode::Monitored).unwrap();
        dispatcher.dispatch("echo second", DispatchMode::Monitored).unwrap();
        assert_eq!(dispatcher.log().command, "echo second");
        assert_eq!(dispatcher.log().lines, vec!["second".to_string()]);
    }

    #[test]
    fn test_working_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut dispatcher = dispatcher().with_working_dir(temp_dir.path());
        dispatcher.dispatch("touch made", DispatchMode::Monitored).unwrap();
        assert!(temp_dir.path().join("made").exists());
    }

    #[test]
    fn test_spawn_failure_finishes_log() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = LogView::path_in(temp_dir.path());
        let environment = Environment::login_shell(temp_dir.path().join("no-such-shell"), None);
        let mut dispatcher = Dispatcher::new(environment, MemorySink::new())
            .with_echo(false)
            .with_log_path(&path);

        let result = dispatcher.dispatch("make code", DispatchMode::Monitored);
        assert!(matches!(result, Err(Error::IoError(_))));

        let saved = LogView::load(&path).unwrap();
        assert_eq!(saved.command, "make code");
        assert!(!saved.running);
        assert_eq!(saved.exit_code, None);
        assert_eq!(dispatcher.handoff().writes(), 0);
    }

    #[test]
    fn test_log_is_persisted() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = LogView::path_in(temp_dir.path());
        let mut dispatcher = dispatcher().with_log_path(&path);
        dispatcher
            .dispatch("echo 'code.c:5: warning: w'; exit 3", DispatchMode::Monitored)
            .unwrap();

        let saved = LogView::load(&path).unwrap();
        assert_eq!(saved.exit_code, Some(3));
        assert_eq!(saved.diagnostics.len(), 1);
        assert!(!saved.running);
    }
}
