use super::error::ActionError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A clipboard tool and the arguments that make it read stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClipboardTool {
    program: &'static str,
    args: &'static [&'static str],
}

const PBCOPY: ClipboardTool = ClipboardTool {
    program: "pbcopy",
    args: &[],
};
const CLIP: ClipboardTool = ClipboardTool {
    program: "clip",
    args: &[],
};
const WL_COPY: ClipboardTool = ClipboardTool {
    program: "wl-copy",
    args: &[],
};
const XSEL: ClipboardTool = ClipboardTool {
    program: "xsel",
    args: &["--clipboard", "--input"],
};
const XCLIP: ClipboardTool = ClipboardTool {
    program: "xclip",
    args: &["-selection", "clipboard"],
};

/// Candidate tools in preference order for this platform.
fn candidates(wayland: bool) -> Vec<ClipboardTool> {
    if cfg!(target_os = "macos") {
        return vec![PBCOPY];
    }
    if cfg!(target_os = "windows") {
        return vec![CLIP];
    }
    let mut tools = Vec::with_capacity(3);
    if wayland {
        tools.push(WL_COPY);
    }
    tools.extend([XSEL, XCLIP]);
    tools
}

fn find_tool(wayland: bool) -> Option<(ClipboardTool, PathBuf)> {
    candidates(wayland)
        .into_iter()
        .find_map(|tool| which::which(tool.program).ok().map(|path| (tool, path)))
}

/// Run `program` with `text` on stdin and wait for it to exit.
fn pipe_to(program: &Path, args: &[&str], text: &str) -> Result<(), String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| e.to_string())?;
    // stdin is closed at the end of this statement.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    if let Err(err) = written {
        let _ = child.kill();
        let status = child.wait().map_err(|e| e.to_string())?;
        return Err(format!("failed to write stdin ({status}): {err}"));
    }
    let status = child.wait().map_err(|e| e.to_string())?;
    if !status.success() {
        return Err(format!("exited with {status}"));
    }
    Ok(())
}

/// Write `text` to the system clipboard through the first available tool.
pub fn copy(text: &str) -> Result<(), ActionError> {
    let wayland = std::env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty());
    let Some((tool, path)) = find_tool(wayland) else {
        return Err(ActionError::SinkUnavailable);
    };

    let command_error = |reason: String| ActionError::Command {
        program: tool.program.to_string(),
        reason,
    };
    pipe_to(&path, tool.args, text).map_err(command_error)?;
    tracing::debug!(tool = tool.program, bytes = text.len(), "copied to clipboard");
    Ok(())
}
