//! Call-stack capture.
//!
//! Frames are plain text (`file:line:in 'symbol'`) and are only ever matched
//! against allow-list patterns or handed to strategies; nothing parses them.

use std::fmt;
use std::ops::Deref;

/// Symbol prefixes of frames that sit above the deprecated call site.
const INTERNAL_FRAMES: &[&str] = &[
    "_Unwind_",
    "backtrace::",
    "deprecation_helper::stack::",
    "deprecation_helper::dispatch::",
];

/// An ordered sequence of textual frames, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Stack(Vec<String>);

impl Stack {
    #[must_use]
    pub const fn new(frames: Vec<String>) -> Self {
        Self(frames)
    }

    #[must_use]
    pub fn frames(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_frames(self) -> Vec<String> {
        self.0
    }
}

impl Deref for Stack {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for Stack {
    fn from(frames: Vec<String>) -> Self {
        Self(frames)
    }
}

impl<S: Into<String>> FromIterator<S> for Stack {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Stack {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            f.write_str(frame)?;
        }
        Ok(())
    }
}

/// Produces the call stack attached to a deprecation notice.
///
/// Any `Fn() -> Stack` closure is a source, which is how tests pin the stack
/// to known frames.
pub trait StackSource: Send + Sync {
    fn capture(&self) -> Stack;
}

impl<F> StackSource for F
where
    F: Fn() -> Stack + Send + Sync,
{
    fn capture(&self) -> Stack {
        self()
    }
}

/// Captures the native backtrace of the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktraceSource;

impl StackSource for BacktraceSource {
    #[inline(never)]
    fn capture(&self) -> Stack {
        capture()
    }
}

/// Captures the current thread's stack, starting at the caller of the dispatcher.
#[inline(never)]
#[must_use]
pub fn capture() -> Stack {
    let mut frames = Vec::new();
    let mut internal = Vec::new();

    backtrace::trace(|frame| {
        let mut resolved = false;
        backtrace::resolve_frame(frame, |symbol| {
            let name = symbol.name().map(|name| format!("{name:#}"));
            internal.push(name.as_deref().is_some_and(is_internal));
            frames.push(format_frame(name.as_deref(), symbol.filename(), symbol.lineno()));
            resolved = true;
        });
        if !resolved {
            internal.push(false);
            frames.push(format!("{:?}", frame.ip()));
        }
        true
    });

    Stack(frames.split_off(caller_start(&internal)))
}

/// Index of the first frame after the leading run of internal frames.
///
/// Unresolved or unwinder frames above that run are skipped with it. Internal
/// frames further down belong to an outer dispatch and are kept.
fn caller_start(internal: &[bool]) -> usize {
    let Some(first) = internal.iter().position(|&flag| flag) else {
        return 0;
    };
    internal[first..].iter().position(|&flag| !flag).map_or(internal.len(), |n| first + n)
}

fn is_internal(name: &str) -> bool {
    let name = name.trim_start_matches('<');
    INTERNAL_FRAMES.iter().any(|prefix| name.starts_with(prefix))
}

fn format_frame(
    name: Option<&str>,
    file: Option<&std::path::Path>,
    line: Option<u32>,
) -> String {
    let name = name.unwrap_or("<unknown>");
    match (file, line) {
        (Some(file), Some(line)) => format!("{}:{line}:in '{name}'", file.display()),
        (Some(file), None) => format!("{}:in '{name}'", file.display()),
        _ => format!("in '{name}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn formats_frames_with_location() {
        let frame = format_frame(Some("app::handler"), Some(Path::new("src/app.rs")), Some(42));
        assert_eq!(frame, "src/app.rs:42:in 'app::handler'");
    }

    #[test]
    fn formats_frames_without_location() {
        assert_eq!(format_frame(Some("app::handler"), None, None), "in 'app::handler'");
        assert_eq!(format_frame(None, None, None), "in '<unknown>'");
    }

    #[test]
    fn recognises_internal_frames() {
        assert!(is_internal("deprecation_helper::dispatch::Deprecator::deprecate"));
        assert!(is_internal("backtrace::backtrace::trace"));
        assert!(is_internal("_Unwind_Backtrace"));
        assert!(is_internal("<deprecation_helper::stack::BacktraceSource as Trait>::capture"));
        assert!(!is_internal("my_app::legacy::old_api"));
    }

    #[test]
    fn display_joins_frames_by_line() {
        let stack: Stack = ["frame0", "frame1"].into_iter().collect();
        assert_eq!(stack.to_string(), "frame0\nframe1");
    }

    #[test]
    fn closures_are_stack_sources() {
        let source = || Stack::from_iter(["frame0", "frame1", "frame2"]);
        assert_eq!(source.capture().len(), 3);
    }

    #[test]
    fn trims_only_the_leading_internal_run() {
        assert_eq!(caller_start(&[false, true, true, false, true, false]), 3);
        assert_eq!(caller_start(&[true, true, false]), 2);
        assert_eq!(caller_start(&[false, false]), 0);
        assert_eq!(caller_start(&[true, true]), 2);
        assert_eq!(caller_start(&[]), 0);
    }

    #[test]
    fn capture_skips_internal_frames() {
        let stack = capture();
        assert!(!stack.is_empty());
        assert!(stack.iter().all(|frame| !frame.contains("deprecation_helper::stack::capture")));
    }
}
