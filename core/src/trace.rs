//! Diagnostic traces attached to errors at construction.
//!
//! Two capture paths exist. [`Capture::Backtrace`] records a full
//! backtrace and is chosen when the standard backtrace variables
//! (`RUST_LIB_BACKTRACE`, `RUST_BACKTRACE`) enable it. Otherwise
//! [`Capture::Location`] records only the raising call site. The check runs
//! once per process; [`set_capture`] overrides it.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::debug;

/// How a [`Trace`] is captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Full backtrace of the raising thread.
    Backtrace,
    /// Source location of the raiser only.
    Location,
}

static DETECTED: OnceLock<Capture> = OnceLock::new();
static OVERRIDE: RwLock<Option<Capture>> = parking_lot::const_rwlock(None);

fn detected() -> Capture {
    *DETECTED.get_or_init(|| {
        let capture = match Backtrace::capture().status() {
            BacktraceStatus::Captured => Capture::Backtrace,
            _ => Capture::Location,
        };
        debug!(
            event = "trace.capture_resolved",
            capture = ?capture,
            "trace.capture_resolved"
        );
        capture
    })
}

/// Force a capture policy for the whole process. `None` restores the
/// environment-detected one.
pub fn set_capture(capture: Option<Capture>) {
    *OVERRIDE.write() = capture;
}

/// The policy new errors are captured with.
pub fn capture_policy() -> Capture {
    match *OVERRIDE.read() {
        Some(capture) => capture,
        None => detected(),
    }
}

/// Where an error was raised.
#[derive(Debug, Clone)]
pub struct Trace {
    caller: &'static Location<'static>,
    backtrace: Option<Arc<Backtrace>>,
}

impl Trace {
    /// Capture under the current [`capture_policy`].
    pub fn capture(caller: &'static Location<'static>) -> Self {
        match capture_policy() {
            Capture::Backtrace => Self::backtrace(caller),
            Capture::Location => Self::location(caller),
        }
    }

    pub fn backtrace(caller: &'static Location<'static>) -> Self {
        Self {
            caller,
            backtrace: Some(Arc::new(Backtrace::force_capture())),
        }
    }

    pub fn location(caller: &'static Location<'static>) -> Self {
        Self {
            caller,
            backtrace: None,
        }
    }

    pub fn caller(&self) -> &'static Location<'static> {
        self.caller
    }

    /// The recorded backtrace, if this trace took the full path.
    pub fn frames(&self) -> Option<&Backtrace> {
        self.backtrace.as_deref()
    }

    /// Text form: `header`, the raising location, then any backtrace.
    ///
    /// Frames above the raiser (capture and constructor frames) are left out.
    pub fn render(&self, header: &str) -> String {
        let mut out = String::from(header);
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("    at {}", self.caller));
        if let Some(backtrace) = &self.backtrace {
            out.push('\n');
            out.push_str(&raiser_frames(&backtrace.to_string(), self.caller));
        }
        out
    }
}

/// Drop the leading frames of a rendered backtrace that sit above `caller`.
///
/// The raiser frame is found by its `at file:line:` line. Without debug
/// info that line is missing, so frames belonging to this crate's capture
/// and constructor paths are skipped by name instead.
fn raiser_frames(rendered: &str, caller: &Location<'_>) -> String {
    let frames = split_frames(rendered);
    let file = Path::new(caller.file())
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(caller.file());
    let site = format!("{}:{}:", file, caller.line());

    let start = frames
        .iter()
        .position(|frame| {
            frame
                .lines()
                .any(|line| line.trim_start().starts_with("at ") && line.contains(&site))
        })
        .or_else(|| frames.iter().position(|frame| !is_constructor_frame(frame)))
        .unwrap_or(0);

    frames[start..].concat()
}

fn split_frames(rendered: &str) -> Vec<&str> {
    let mut starts = vec![0];
    let mut offset = 0;
    for line in rendered.split_inclusive('\n') {
        if offset > 0 && is_frame_header(line) {
            starts.push(offset);
        }
        offset += line.len();
    }
    starts.push(rendered.len());
    starts.windows(2).map(|w| &rendered[w[0]..w[1]]).collect()
}

fn is_frame_header(line: &str) -> bool {
    match line.trim_start().split_once(": ") {
        Some((index, _)) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

fn is_constructor_frame(frame: &str) -> bool {
    frame.contains("rpc_core::trace::") || frame.contains("rpc_core::error::RpcError")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_path() {
        let here = Location::caller();
        let trace = Trace::location(here);

        assert!(trace.frames().is_none());
        assert_eq!(trace.caller().file(), file!());

        let text = trace.render("RpcError: boom");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("RpcError: boom"));
        assert_eq!(lines.next(), Some(format!("    at {here}").as_str()));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_backtrace_path() {
        let trace = Trace::backtrace(Location::caller());

        assert!(trace.frames().is_some());
        let text = trace.render("RpcError");
        assert!(text.starts_with("RpcError\n    at "));
        assert!(text.lines().count() > 2);
    }

    #[test]
    fn test_frames_above_raiser_dropped() {
        let here = Location::caller();
        let rendered = format!(
            concat!(
                "   0: rpc_core::trace::Trace::backtrace\n",
                "             at ./src/trace.rs:1:1\n",
                "   1: rpc_core::error::RpcError::build\n",
                "             at ./src/error.rs:2:1\n",
                "   2: app::handler\n",
                "             at ./src/trace.rs:{}:9\n",
                "   3: main\n",
            ),
            here.line()
        );

        let kept = raiser_frames(&rendered, here);
        assert!(kept.starts_with("   2: app::handler\n"));
        assert!(kept.ends_with("   3: main\n"));
        assert!(!kept.contains("rpc_core::"));
    }

    #[test]
    fn test_constructor_frames_dropped_without_debug_info() {
        let rendered = concat!(
            "   0: rpc_core::trace::Trace::capture\n",
            "   1: <rpc_core::error::RpcError as core::default::Default>::default\n",
            "   2: app::handler\n",
            "   3: main\n",
        );

        let kept = raiser_frames(rendered, Location::caller());
        assert_eq!(kept, "   2: app::handler\n   3: main\n");
    }

    #[test]
    fn test_unsupported_backtrace_kept() {
        assert_eq!(
            raiser_frames("unsupported backtrace", Location::caller()),
            "unsupported backtrace"
        );
    }

    #[test]
    fn test_render_without_header_is_not_empty() {
        let text = Trace::location(Location::caller()).render("");
        assert!(text.starts_with("    at "));
        assert!(text.contains(file!()));
    }

    #[test]
    fn test_override_then_restore() {
        set_capture(Some(Capture::Location));
        assert_eq!(capture_policy(), Capture::Location);
        assert!(Trace::capture(Location::caller()).frames().is_none());

        set_capture(Some(Capture::Backtrace));
        assert_eq!(capture_policy(), Capture::Backtrace);
        assert!(Trace::capture(Location::caller()).frames().is_some());

        set_capture(None);
        assert_eq!(capture_policy(), detected());
    }
}
