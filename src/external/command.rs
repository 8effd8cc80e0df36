//! Shell-command rasterizers
//!
//! The command reads the source on stdin and writes PNG, JPEG or GIF bytes
//! to stdout. It runs through `sh -c`, is killed once the timeout expires,
//! and sees the chart theme both as `MDOCX_THEME` and through a `{theme}`
//! placeholder in the command line.

use std::io::{self, Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use super::{DiagramRenderer, MathRasterizer, RasterImage};
use crate::config::ChartTheme;

pub const THEME_ENV: &str = "MDOCX_THEME";
const THEME_PLACEHOLDER: &str = "{theme}";
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Diagram renderer backed by an external command, e.g.
/// `mmdc -i - -o - -e png -t {theme}`.
#[derive(Debug, Clone)]
pub struct CommandDiagramRenderer {
    command: String,
    timeout: Duration,
}

impl CommandDiagramRenderer {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

impl DiagramRenderer for CommandDiagramRenderer {
    fn render(&self, source: &str, theme: ChartTheme) -> Option<RasterImage> {
        let command = self.command.replace(THEME_PLACEHOLDER, theme.as_str());
        let env = [(THEME_ENV, theme.as_str())];
        rasterize_with(&command, source, &env, self.timeout, "diagram renderer")
    }
}

/// Math rasterizer backed by an external command.
#[derive(Debug, Clone)]
pub struct CommandMathRasterizer {
    command: String,
    timeout: Duration,
}

impl CommandMathRasterizer {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }
}

impl MathRasterizer for CommandMathRasterizer {
    fn rasterize(&self, latex: &str) -> Option<RasterImage> {
        rasterize_with(&self.command, latex, &[], self.timeout, "math rasterizer")
    }
}

fn rasterize_with(
    command: &str,
    input: &str,
    env: &[(&str, &str)],
    timeout: Duration,
    what: &str,
) -> Option<RasterImage> {
    match run_with_timeout(command, input, env, timeout) {
        Ok(bytes) => {
            debug!("{} produced {} bytes", what, bytes.len());
            let image = RasterImage::from_bytes(bytes);
            if image.is_none() {
                warn!("{} output is not a PNG, JPEG or GIF image", what);
            }
            image
        }
        Err(err) => {
            warn!("{} failed: {}", what, err);
            None
        }
    }
}

/// Run `sh -c command` with `input` on stdin and return its stdout.
///
/// `timeout` bounds the whole run, from spawn until the child exits. A
/// child still alive at the deadline is killed, even if it has already
/// closed stdout. A non-zero exit status is an error.
pub fn run_with_timeout(
    command: &str,
    input: &str,
    env: &[(&str, &str)],
    timeout: Duration,
) -> io::Result<Vec<u8>> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(command)
        .envs(env.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()?;
    let deadline = Instant::now() + timeout;

    let stdin = child.stdin.take();
    let payload = input.to_owned();
    let writer = thread::spawn(move || {
        if let Some(mut stdin) = stdin {
            // A command that ignores stdin closes the pipe early.
            let _ = stdin.write_all(payload.as_bytes());
        }
    });

    let mut stdout = match child.stdout.take() {
        Some(stdout) => stdout,
        None => {
            kill(&mut child);
            let _ = writer.join();
            return Err(io::Error::new(io::ErrorKind::Other, "child stdout unavailable"));
        }
    };
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = stdout.read_to_end(&mut buf).map(|_| buf);
        let _ = tx.send(result);
    });

    let output = match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(output) => output,
        Err(_) => {
            kill(&mut child);
            let _ = writer.join();
            return Err(timed_out(timeout));
        }
    };

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL_INTERVAL),
            Ok(None) => {
                kill(&mut child);
                let _ = writer.join();
                return Err(timed_out(timeout));
            }
            Err(err) => {
                kill(&mut child);
                let _ = writer.join();
                return Err(err);
            }
        }
    };
    let _ = writer.join();

    let data = output?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("command exited with {}", status),
        ));
    }
    Ok(data)
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn timed_out(timeout: Duration) -> io::Error {
    io::Error::new(
        io::ErrorKind::TimedOut,
        format!("command timed out after {} ms", timeout.as_millis()),
    )
}
