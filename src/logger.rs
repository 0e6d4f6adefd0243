use std::{
    fmt,
    io::{self, Write},
    panic::Location,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU8, Ordering},
    },
};

use chrono::{DateTime, FixedOffset, Local};

use crate::{
    buffer_pool::BufferPool,
    caller::{CallSite, ResolveCaller, TrackedCaller},
    format::{Arg, FormatOptions, Header, Message},
    severity::Severity,
};

/// Leveled logger writing one line per call to a shared sink.
///
/// Formatting and writing a line happen under a single lock, so lines from
/// concurrent callers never interleave. The threshold is read without that
/// lock: a concurrent [`Logger::set_level`] may let one line through or drop
/// one at the boundary.
pub struct Logger<W> {
    sink: Mutex<W>,
    prefix: String,
    options: FormatOptions,
    caller_depth: usize,
    level: AtomicU8,
    resolver: Box<dyn ResolveCaller>,
    pool: BufferPool,
}

impl<W: Write + Send> Logger<W> {
    /// Creates a logger passing every severity.
    pub fn new(sink: W, prefix: &str, options: FormatOptions, caller_depth: usize) -> Self {
        Self::from_parts(
            sink,
            prefix.into(),
            options,
            caller_depth,
            Box::new(TrackedCaller::default()),
            BufferPool::default(),
        )
    }

    pub(crate) fn from_parts(
        sink: W,
        prefix: String,
        options: FormatOptions,
        caller_depth: usize,
        resolver: Box<dyn ResolveCaller>,
        pool: BufferPool,
    ) -> Self {
        Self {
            sink: Mutex::new(sink),
            prefix,
            options,
            caller_depth,
            level: AtomicU8::new(Severity::DEBUG.ordinal()),
            resolver,
            pool,
        }
    }

    /// Drops calls below `level` from now on.
    pub fn set_level(&self, level: Severity) {
        self.level.store(level.ordinal(), Ordering::Relaxed);
    }

    /// Current minimum severity.
    pub fn level(&self) -> Severity {
        Severity::from_ordinal(self.level.load(Ordering::Relaxed))
    }

    /// Whether a line at `severity` would be written.
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.level()
    }

    /// Text written at the start of every line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Header segments this logger renders.
    pub fn options(&self) -> FormatOptions {
        self.options
    }

    /// Frames above the direct caller that lines are attributed to.
    pub fn caller_depth(&self) -> usize {
        self.caller_depth
    }

    /// Consumes the logger and returns its sink.
    pub fn into_sink(self) -> W {
        self.sink.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    #[track_caller]
    pub fn debug(&self, args: &[Arg<'_>]) {
        self.emit(Severity::DEBUG, Message::Args(args));
    }

    #[track_caller]
    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::DEBUG, Message::Formatted(args));
    }

    #[track_caller]
    pub fn info(&self, args: &[Arg<'_>]) {
        self.emit(Severity::INFO, Message::Args(args));
    }

    #[track_caller]
    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::INFO, Message::Formatted(args));
    }

    #[track_caller]
    pub fn error(&self, args: &[Arg<'_>]) {
        self.emit(Severity::ERROR, Message::Args(args));
    }

    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.emit(Severity::ERROR, Message::Formatted(args));
    }

    /// Logs `args` at `severity` and returns the sink's error, if any.
    ///
    /// Filtered calls return `Ok(())` without touching the sink.
    #[track_caller]
    pub fn output(&self, severity: Severity, args: &[Arg<'_>]) -> io::Result<()> {
        self.output_message(severity, Message::Args(args))
    }

    /// Formats and writes one line with an explicit timestamp and call site.
    ///
    /// Ignores the threshold. The timestamp is rendered in its own offset
    /// unless [`FormatOptions::UTC`] is set.
    pub fn write(
        &self,
        severity: Severity,
        now: DateTime<FixedOffset>,
        site: CallSite<'_>,
        args: &[Arg<'_>],
    ) -> io::Result<()> {
        self.write_message(severity, now, site, Message::Args(args))
    }

    #[track_caller]
    fn emit(&self, severity: Severity, message: Message<'_>) {
        if let Err(err) = self.output_message(severity, message) {
            log::warn!(target: "simplelog", "failed to write {severity} line: {err}");
        }
    }

    #[track_caller]
    fn output_message(&self, severity: Severity, message: Message<'_>) -> io::Result<()> {
        if !self.enabled(severity) {
            return Ok(());
        }
        let site = self
            .resolver
            .resolve(self.caller_depth, Location::caller())
            .unwrap_or(CallSite::UNKNOWN);
        self.write_message(severity, Local::now().fixed_offset(), site, message)
    }

    pub(crate) fn write_message(
        &self,
        severity: Severity,
        now: DateTime<FixedOffset>,
        site: CallSite<'_>,
        message: Message<'_>,
    ) -> io::Result<()> {
        let now = if self.options.contains(FormatOptions::UTC) {
            now.naive_utc()
        } else {
            now.naive_local()
        };
        let header = Header {
            prefix: &self.prefix,
            options: self.options,
            now,
            site,
            severity,
        };
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        let mut buf = self.pool.get();
        header.write_to(&mut buf)?;
        writeln!(buf, "{message}")?;
        sink.write_all(&buf)?;
        sink.flush()
    }
}

impl<W: Write + Send> log::Log for Logger<W> {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Logger::enabled(self, metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let severity = record.level().into();
        if !Logger::enabled(self, severity) {
            return;
        }
        let site = match (record.file(), record.line()) {
            (Some(file), Some(line)) => CallSite { file, line },
            _ => CallSite::UNKNOWN,
        };
        // Reporting a failure here would re-enter this logger.
        self.write_message(
            severity,
            Local::now().fixed_offset(),
            site,
            Message::Formatted(*record.args()),
        )
        .ok();
    }

    fn flush(&self) {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
            .ok();
    }
}

impl<W: Write + Send + 'static> Logger<W> {
    /// Registers this logger as the `log` crate's global logger.
    ///
    /// The logger is leaked; the returned reference keeps [`Logger::set_level`]
    /// usable. Fails if a global logger is already set.
    pub fn install(self) -> Result<&'static Self, log::SetLoggerError> {
        let logger: &'static Self = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use regex::Regex;

    use super::*;
    use crate::{debug, debugf, error, errorf, info, infof, log_writer::SharedBuffer};

    fn new_logger(out: SharedBuffer) -> Logger<SharedBuffer> {
        Logger::new(out, "[hoge] ", FormatOptions::SHORT_FILE, 0)
    }

    fn tokyo_time() -> DateTime<FixedOffset> {
        NaiveDate::from_ymd_opt(2017, 2, 3)
            .unwrap()
            .and_hms_nano_opt(8, 1, 2, 123_456_789)
            .unwrap()
            .and_local_timezone(FixedOffset::east_opt(9 * 3600).unwrap())
            .single()
            .unwrap()
    }

    #[test]
    fn test_write() {
        let cases = [
            (FormatOptions::NONE, "[hoge] [DEBUG] hogefuga123\n"),
            (
                FormatOptions::UTC
                    | FormatOptions::DATE
                    | FormatOptions::MICROSECONDS
                    | FormatOptions::SHORT_FILE,
                "[hoge] 2017/02/02 23:01:02.123456 file.txt:2345: [DEBUG] hogefuga123\n",
            ),
            (
                FormatOptions::DATE | FormatOptions::TIME | FormatOptions::LONG_FILE,
                "[hoge] 2017/02/03 08:01:02 /path/to/file.txt:2345: [DEBUG] hogefuga123\n",
            ),
        ];
        for (options, expected) in cases {
            let logger = Logger::new(Vec::new(), "[hoge] ", options, 0);
            let site = CallSite {
                file: "/path/to/file.txt",
                line: 2345,
            };
            let args = [
                Arg::from("hoge"),
                Arg::from("fuga"),
                Arg::from(1),
                Arg::from(2),
                Arg::from(3),
            ];
            logger
                .write(Severity::DEBUG, tokyo_time(), site, &args)
                .unwrap();
            assert_eq!(String::from_utf8(logger.into_sink()).unwrap(), expected);
        }
    }

    #[test]
    fn test_write_unknown_severity() {
        let logger = Logger::new(Vec::new(), "", FormatOptions::NONE, 0);
        logger
            .write(
                Severity::from_ordinal(42),
                tokyo_time(),
                CallSite::UNKNOWN,
                &[Arg::from("x")],
            )
            .unwrap();
        assert_eq!(logger.into_sink(), b"[???] x\n");
    }

    #[test]
    fn test_debug() {
        let out = SharedBuffer::new();
        let logger = new_logger(out.clone());
        debug!(logger, "hoge");
        assert!(Regex::new(r"^\[hoge\] logger\.rs:\d+: \[DEBUG\] hoge\n$")
            .unwrap()
            .is_match(&out.contents()));

        out.clear();
        debug!(logger, "hoge", 1, 2);
        assert!(Regex::new(r"\[DEBUG\] hoge12\n$")
            .unwrap()
            .is_match(&out.contents()));
    }

    #[test]
    fn test_debugf() {
        let out = SharedBuffer::new();
        let logger = new_logger(out.clone());
        debugf!(logger, "hoge {} -- {}", "fuga", 123);
        assert!(Regex::new(r"\[DEBUG\] hoge fuga -- 123\n$")
            .unwrap()
            .is_match(&out.contents()));
    }

    #[test]
    fn test_call_site_is_caller() {
        let out = SharedBuffer::new();
        let logger = new_logger(out.clone());
        let line = line!() + 1;
        logger.info(&["here".into()]);
        assert_eq!(
            out.contents(),
            format!("[hoge] logger.rs:{line}: [INFO] here\n")
        );
    }

    #[test]
    fn test_unresolvable_call_site() {
        let out = SharedBuffer::new();
        let logger = Logger::new(out.clone(), "", FormatOptions::LONG_FILE, 10_000);
        errorf!(logger, "too deep");
        assert_eq!(out.contents(), "???:0: [ERROR] too deep\n");
    }

    #[inline(never)]
    fn log_via_wrapper(logger: &Logger<SharedBuffer>) {
        info!(logger, "via wrapper");
    }

    #[test]
    fn test_wrapper_call_site() {
        let out = SharedBuffer::new();
        let logger = Logger::new(out.clone(), "[d1] ", FormatOptions::SHORT_FILE, 1);
        let line = line!() + 1;
        log_via_wrapper(&logger);
        assert_eq!(
            out.contents(),
            format!("[d1] logger.rs:{line}: [INFO] via wrapper\n")
        );
    }

    #[test]
    fn test_injected_resolver() {
        let out = SharedBuffer::new();
        let logger = crate::logger_config()
            .with_options(FormatOptions::SHORT_FILE)
            .with_caller_depth(2)
            .with_resolver(|depth: usize, _: &'static Location<'static>| {
                Some(CallSite {
                    file: "/srv/app/handler.rs",
                    line: depth as u32 * 100,
                })
            })
            .build(out.clone());
        info!(logger, "ok");
        assert_eq!(out.contents(), "handler.rs:200: [INFO] ok\n");
        assert_eq!(logger.caller_depth(), 2);
    }

    fn writes_at(level: Severity, emit: impl Fn(&Logger<SharedBuffer>)) -> bool {
        let out = SharedBuffer::new();
        let logger = new_logger(out.clone());
        logger.set_level(level);
        emit(&logger);
        let contents = out.contents();
        assert!(contents.is_empty() || contents.ends_with('\n'));
        !contents.is_empty()
    }

    #[test]
    fn test_debug_for_levels() {
        let cases = [
            (Severity::DEBUG, true),
            (Severity::INFO, false),
            (Severity::ERROR, false),
        ];
        for (level, should_write) in cases {
            assert_eq!(writes_at(level, |l| debug!(l, "hoge")), should_write);
            assert_eq!(writes_at(level, |l| debugf!(l, "{}", 1)), should_write);
        }
    }

    #[test]
    fn test_info_for_levels() {
        let cases = [
            (Severity::DEBUG, true),
            (Severity::INFO, true),
            (Severity::ERROR, false),
        ];
        for (level, should_write) in cases {
            assert_eq!(writes_at(level, |l| info!(l, "hoge")), should_write);
            assert_eq!(writes_at(level, |l| infof!(l, "{}", 1)), should_write);
        }
    }

    #[test]
    fn test_error_for_levels() {
        let cases = [
            (Severity::DEBUG, true),
            (Severity::INFO, true),
            (Severity::ERROR, true),
            (Severity::from_ordinal(9), false),
        ];
        for (level, should_write) in cases {
            assert_eq!(writes_at(level, |l| error!(l, "hoge")), should_write);
            assert_eq!(writes_at(level, |l| errorf!(l, "{}", 1)), should_write);
        }
    }

    #[test]
    fn test_default_level() {
        let out = SharedBuffer::new();
        let logger = new_logger(out.clone());
        assert_eq!(logger.level(), Severity::DEBUG);
        debug!(logger, "a");
        info!(logger, "b");
        error!(logger, "c");
        assert_eq!(out.contents().lines().count(), 3);
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_failure() {
        let logger = Logger::new(BrokenSink, "", FormatOptions::NONE, 0);
        let err = logger.output(Severity::INFO, &["x".into()]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        // Convenience methods swallow the failure.
        info!(logger, "still alive");
        logger.set_level(Severity::ERROR);
        assert!(logger.output(Severity::INFO, &["x".into()]).is_ok());
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        const THREADS: usize = 8;
        const LINES: usize = 200;
        let out = SharedBuffer::new();
        let logger = Logger::new(
            out.clone(),
            "[mt] ",
            FormatOptions::STD | FormatOptions::MICROSECONDS | FormatOptions::SHORT_FILE,
            0,
        );
        std::thread::scope(|s| {
            for t in 0..THREADS {
                let logger = &logger;
                s.spawn(move || {
                    for i in 0..LINES {
                        info!(logger, "thread ", t, " line ", i, " ", "x".repeat(64).as_str());
                    }
                });
            }
        });
        let re = Regex::new(
            r"^\[mt\] \d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}\.\d{6} logger\.rs:\d+: \[INFO\] thread \d+ line \d+ x{64}$",
        )
        .unwrap();
        let contents = out.contents();
        assert!(contents.ends_with('\n'));
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), THREADS * LINES);
        assert!(lines.iter().all(|line| re.is_match(line)));
    }

    #[test]
    fn test_set_level_while_logging() {
        let out = SharedBuffer::new();
        let logger = new_logger(out.clone());
        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..500 {
                    debug!(logger, i);
                }
            });
            s.spawn(|| {
                for i in 0..500 {
                    logger.set_level(if i % 2 == 0 {
                        Severity::ERROR
                    } else {
                        Severity::DEBUG
                    });
                }
            });
        });
        assert!(out.contents().lines().all(|l| l.contains("[DEBUG] ")));
    }

    #[test]
    fn test_pool_is_reused() {
        let pool = BufferPool::new(2);
        let logger = crate::logger_config()
            .with_pool(pool.clone())
            .build(Vec::new());
        info!(logger, "one");
        info!(logger, "two");
        assert_eq!(pool.size(), 1);
    }
}
