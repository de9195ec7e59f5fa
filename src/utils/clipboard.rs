use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Command(&'static str),
    Osc52,
}

#[derive(Debug)]
pub enum ClipboardError {
    /// No clipboard command ran successfully and the OSC 52 write failed.
    Unavailable(io::Error),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(err) => write!(
                f,
                "No clipboard available (install wl-copy, xclip, or xsel): {err}"
            ),
        }
    }
}

impl std::error::Error for ClipboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClipboardError::Unavailable(err) => Some(err),
        }
    }
}

#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];
#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Copy `text` with the first platform command that works, falling back to
/// an OSC 52 escape written to stdout.
pub fn copy_to_clipboard(text: &str) -> Result<CopyMethod, ClipboardError> {
    for &(cmd, args) in CLIPBOARD_COMMANDS {
        match run_with_stdin(cmd, args, text) {
            Ok(()) => return Ok(CopyMethod::Command(cmd)),
            Err(err) => debug!(cmd, %err, "clipboard command failed"),
        }
    }

    let mut stdout = io::stdout();
    write_osc52(&mut stdout, text).map_err(ClipboardError::Unavailable)?;
    Ok(CopyMethod::Osc52)
}

/// OSC 52 "set clipboard" sequence carrying `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

fn write_osc52<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writer.write_all(osc52_sequence(text).as_bytes())?;
    writer.flush()
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> io::Result<()> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(input.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("`{cmd}` exited with {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osc52_sequence_is_base64_payload() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn write_osc52_emits_sequence() {
        let mut buf: Vec<u8> = Vec::new();
        write_osc52(&mut buf, "let x = 1;\n").expect("write");
        assert_eq!(buf, osc52_sequence("let x = 1;\n").into_bytes());
    }

    #[test]
    fn missing_command_is_an_error() {
        assert!(run_with_stdin("ultron-no-such-clipboard-tool", &[], "x").is_err());
    }
}
