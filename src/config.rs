use derive_from_env::FromEnv;

use crate::{format::FormatOptions, severity::Severity};

pub(crate) const DEFAULT_POOL_SIZE: usize = 16;

/// Logger settings read from `SIMPLELOG_*` environment variables.
#[derive(FromEnv)]
#[from_env(prefix = "SIMPLELOG")]
#[allow(non_snake_case)]
pub struct EnvConfig {
    /// `debug`, `info` or `error`.
    #[from_env(default = "debug")]
    pub LEVEL: String,
    /// Format option names joined by `|` or `,`, e.g. `date|time|shortfile`.
    #[from_env(default = "")]
    pub FLAGS: String,
    /// Idle line buffers kept for reuse.
    #[from_env(default = "16")]
    pub POOL_SIZE: usize,
}

impl EnvConfig {
    pub fn load() -> Result<Self, std::io::Error> {
        Self::from_env().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid SIMPLELOG environment: {err:?}"),
            )
        })
    }

    pub fn level(&self) -> Result<Severity, std::io::Error> {
        self.LEVEL.parse()
    }

    pub fn options(&self) -> Result<FormatOptions, std::io::Error> {
        self.FLAGS.parse()
    }
}
