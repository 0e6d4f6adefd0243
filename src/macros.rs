/// Logs values concatenated without separators at DEBUG.
///
/// Each value converts into an [`Arg`](crate::Arg); text and integers render,
/// anything else renders as nothing.
#[macro_export]
macro_rules! debug {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.debug(&[$($crate::Arg::from($arg)),*])
    };
}

/// Logs values concatenated without separators at INFO.
#[macro_export]
macro_rules! info {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.info(&[$($crate::Arg::from($arg)),*])
    };
}

/// Logs values concatenated without separators at ERROR.
#[macro_export]
macro_rules! error {
    ($logger:expr $(, $arg:expr)* $(,)?) => {
        $logger.error(&[$($crate::Arg::from($arg)),*])
    };
}

/// Logs a `format!`-style template at DEBUG.
#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($fmt:tt)+) => {
        $logger.debugf(format_args!($($fmt)+))
    };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr, $($fmt:tt)+) => {
        $logger.infof(format_args!($($fmt)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($fmt:tt)+) => {
        $logger.errorf(format_args!($($fmt)+))
    };
}
