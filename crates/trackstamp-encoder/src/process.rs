//! Waiting on the encoder subprocess.

use std::io::Read;
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

/// How a wait ended.
#[derive(Debug)]
pub(crate) enum WaitOutcome {
    Exited { status: ExitStatus, stderr: String },
    TimedOut,
}

/// Waits for `child`, killing it after `timeout`.
///
/// stderr is drained on a separate thread so a chatty encoder cannot block
/// on a full pipe.
pub(crate) fn wait_with_timeout(mut child: Child, timeout: Duration) -> std::io::Result<WaitOutcome> {
    let reader = child.stderr.take().map(|mut err| {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = err.read_to_string(&mut buf);
            buf
        })
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(WaitOutcome::TimedOut);
                }
                thread::sleep(Duration::from_millis(50));
            }
        }
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok(WaitOutcome::Exited { status, stderr })
}

/// Last `max_lines` lines of `text`, trimmed.
pub(crate) fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let skip = lines.len().saturating_sub(max_lines);
    lines[skip..].join("\n")
}
