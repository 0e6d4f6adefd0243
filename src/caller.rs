use std::{
    collections::HashMap,
    panic::Location,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

/// Source location a line is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl CallSite<'static> {
    /// Substituted when the call site cannot be resolved.
    pub const UNKNOWN: CallSite<'static> = CallSite {
        file: "???",
        line: 0,
    };
}

impl CallSite<'_> {
    /// File name without its directories.
    pub fn basename(&self) -> &str {
        self.file.rsplit(['/', '\\']).next().unwrap_or(self.file)
    }
}

impl From<&'static Location<'static>> for CallSite<'static> {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

/// Resolves the call site a log line is attributed to.
///
/// `depth` is the logger's configured caller depth and `origin` is the
/// `#[track_caller]` location of the call into the logger.
pub trait ResolveCaller: Send + Sync {
    fn resolve(&self, depth: usize, origin: &'static Location<'static>)
    -> Option<CallSite<'static>>;
}

impl<F> ResolveCaller for F
where
    F: Fn(usize, &'static Location<'static>) -> Option<CallSite<'static>> + Send + Sync,
{
    fn resolve(
        &self,
        depth: usize,
        origin: &'static Location<'static>,
    ) -> Option<CallSite<'static>> {
        self(depth, origin)
    }
}

/// Default resolver built on `#[track_caller]` and a stack walk.
///
/// Every public entry point of the logger is `#[track_caller]`, so `origin`
/// already is the application call site and depth 0 resolves to it without
/// touching the stack. A depth of `n` walks the stack to the frame calling
/// `origin` and then `n` frames further up, so a plain wrapper around the
/// logger is skipped with depth 1. Walking needs debug info; without it, or
/// when the stack is shallower than `n`, the site is unresolvable.
#[derive(Debug, Default)]
pub struct TrackedCaller {
    files: Mutex<HashMap<PathBuf, &'static str>>,
}

impl TrackedCaller {
    fn walk(
        &self,
        depth: usize,
        origin: &'static Location<'static>,
    ) -> Option<CallSite<'static>> {
        let mut frames: Vec<(Option<PathBuf>, Option<u32>)> = Vec::new();
        backtrace::trace(|frame| {
            backtrace::resolve_frame(frame, |symbol| {
                frames.push((symbol.filename().map(Path::to_path_buf), symbol.lineno()));
            });
            true
        });
        let start = frames.iter().position(|(file, line)| {
            *line == Some(origin.line())
                && file.as_deref().is_some_and(|f| f.ends_with(origin.file()))
        })?;
        let (file, line) = frames.get(start.checked_add(depth)?)?;
        Some(CallSite {
            file: self.intern(file.as_deref()?),
            line: (*line)?,
        })
    }

    /// Source paths live for the whole process; each distinct file is leaked once.
    fn intern(&self, file: &Path) -> &'static str {
        let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(known) = files.get(file) {
            return *known;
        }
        let leaked: &'static str = Box::leak(file.to_string_lossy().into_owned().into_boxed_str());
        files.insert(file.to_path_buf(), leaked);
        leaked
    }
}

impl ResolveCaller for TrackedCaller {
    fn resolve(
        &self,
        depth: usize,
        origin: &'static Location<'static>,
    ) -> Option<CallSite<'static>> {
        if depth == 0 {
            Some(CallSite::from(origin))
        } else {
            self.walk(depth, origin)
        }
    }
}
