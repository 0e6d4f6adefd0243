use std::{
    fmt,
    io::{self, Write},
    ops::{BitOr, BitOrAssign},
    str::FromStr,
};

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::{caller::CallSite, severity::Severity};

/// Set of optional header segments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatOptions(u16);

impl FormatOptions {
    pub const NONE: FormatOptions = FormatOptions(0);
    /// `2009/01/23 `
    pub const DATE: FormatOptions = FormatOptions(1);
    /// `01:23:23 `
    pub const TIME: FormatOptions = FormatOptions(1 << 1);
    /// `01:23:23.123123 `, implies TIME.
    pub const MICROSECONDS: FormatOptions = FormatOptions(1 << 2);
    /// `/a/b/c/d.rs:23: `
    pub const LONG_FILE: FormatOptions = FormatOptions(1 << 3);
    /// `d.rs:23: `, overrides LONG_FILE.
    pub const SHORT_FILE: FormatOptions = FormatOptions(1 << 4);
    /// Render date and time in UTC rather than the timestamp's own offset.
    pub const UTC: FormatOptions = FormatOptions(1 << 5);
    /// Paint the severity label with ANSI colours.
    ///
    /// Whether escapes are emitted follows `colored`'s global control
    /// (`NO_COLOR`, `CLICOLOR_FORCE`, [`colored::control::set_override`]),
    /// not the sink the logger writes to.
    pub const COLOR: FormatOptions = FormatOptions(1 << 6);
    pub const STD: FormatOptions = FormatOptions(Self::DATE.0 | Self::TIME.0);

    const NAMES: [(&'static str, FormatOptions); 8] = [
        ("date", Self::DATE),
        ("time", Self::TIME),
        ("microseconds", Self::MICROSECONDS),
        ("longfile", Self::LONG_FILE),
        ("shortfile", Self::SHORT_FILE),
        ("utc", Self::UTC),
        ("color", Self::COLOR),
        ("std", Self::STD),
    ];

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// True when any flag of `other` is set.
    pub const fn intersects(self, other: FormatOptions) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: FormatOptions) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for FormatOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FormatOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Parses flag names separated by `|` or `,`, e.g. `date|time|shortfile`.
impl FromStr for FormatOptions {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut options = Self::NONE;
        for name in s.split(['|', ',']).map(str::trim).filter(|n| !n.is_empty()) {
            let name = name.to_ascii_lowercase();
            let Some((_, flag)) = Self::NAMES.iter().find(|(known, _)| *known == name) else {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("unknown format option {name:?}"),
                ));
            };
            options |= *flag;
        }
        Ok(options)
    }
}

/// A single renderable message argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg<'a> {
    Text(&'a str),
    Int(i64),
    Uint(u64),
    /// Anything else. Renders as nothing.
    Unsupported,
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Text(text) => f.write_str(text),
            Arg::Int(n) => write!(f, "{n}"),
            Arg::Uint(n) => write!(f, "{n}"),
            Arg::Unsupported => Ok(()),
        }
    }
}

impl<'a> From<&'a str> for Arg<'a> {
    fn from(text: &'a str) -> Self {
        Arg::Text(text)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    fn from(text: &'a String) -> Self {
        Arg::Text(text)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $wide:ty, $($t:ty),*) => {
        $(impl From<$t> for Arg<'_> {
            fn from(n: $t) -> Self {
                Arg::$variant(n as $wide)
            }
        })*
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64, isize);
impl_from_int!(Uint, u64, u8, u16, u32, u64, usize);

macro_rules! impl_from_unsupported {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg<'_> {
            fn from(_: $t) -> Self {
                Arg::Unsupported
            }
        })*
    };
}

impl_from_unsupported!(f32, f64, bool, char, ());

/// Body of a line: either loose arguments or a pre-formatted template.
#[derive(Clone, Copy)]
pub(crate) enum Message<'a> {
    Args(&'a [Arg<'a>]),
    Formatted(fmt::Arguments<'a>),
}

impl fmt::Display for Message<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Args(args) => args.iter().try_for_each(|arg| fmt::Display::fmt(arg, f)),
            Message::Formatted(args) => f.write_fmt(*args),
        }
    }
}

struct Padded(i64, usize);

impl fmt::Display for Padded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Padded(value, width) = *self;
        write!(f, "{value:0width$}")
    }
}

/// Decimal `value` left-padded with zeros up to `width` digits. Never truncates.
pub fn zero_pad(value: i64, width: usize) -> String {
    Padded(value, width).to_string()
}

/// Everything needed to render the fixed part of one line.
pub(crate) struct Header<'a> {
    pub prefix: &'a str,
    pub options: FormatOptions,
    pub now: NaiveDateTime,
    pub site: CallSite<'a>,
    pub severity: Severity,
}

impl Header<'_> {
    pub fn write_to(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        let Self {
            prefix,
            options,
            now,
            site,
            severity,
        } = self;
        buf.extend_from_slice(prefix.as_bytes());
        if options.contains(FormatOptions::DATE) {
            write!(
                buf,
                "{}/{}/{} ",
                Padded(now.year().into(), 4),
                Padded(now.month().into(), 2),
                Padded(now.day().into(), 2)
            )?;
        }
        if options.intersects(FormatOptions::TIME | FormatOptions::MICROSECONDS) {
            write!(
                buf,
                "{}:{}:{}",
                Padded(now.hour().into(), 2),
                Padded(now.minute().into(), 2),
                Padded(now.second().into(), 2)
            )?;
            if options.contains(FormatOptions::MICROSECONDS) {
                write!(buf, ".{}", Padded((now.nanosecond() / 1_000).into(), 6))?;
            }
            buf.push(b' ');
        }
        if options.contains(FormatOptions::SHORT_FILE) {
            write!(buf, "{}:{}: ", site.basename(), site.line)?;
        } else if options.contains(FormatOptions::LONG_FILE) {
            write!(buf, "{}:{}: ", site.file, site.line)?;
        }
        if options.contains(FormatOptions::COLOR) {
            write!(buf, "[{}] ", severity.colored())
        } else {
            write!(buf, "[{}] ", severity.as_str())
        }
    }
}
