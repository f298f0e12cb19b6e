use crate::archive;
use crate::jvm::SupportedVersions;
use std::fmt;

/// Ways a whole comparison run can fail
///
/// Problems with individual class files are not in here: those end up in the report, next to the
/// class they concern.
#[derive(Debug)]
pub enum Error {
    InvalidSettings(SettingsDefect),
    ThreadPool(rayon::ThreadPoolBuildError),
    Source(archive::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsDefect {
    ZeroParallelism,
    EmptyVersionRange(SupportedVersions),
}

impl From<archive::Error> for Error {
    fn from(err: archive::Error) -> Error {
        Error::Source(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Error {
        Error::ThreadPool(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidSettings(defect) => write!(f, "invalid settings: {}", defect),
            Error::ThreadPool(err) => write!(f, "failed to start worker threads: {}", err),
            Error::Source(err) => write!(f, "{}", err),
        }
    }
}

impl fmt::Display for SettingsDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsDefect::ZeroParallelism => f.write_str("parallelism must be at least 1"),
            SettingsDefect::EmptyVersionRange(range) => {
                write!(f, "supported major version range {} is empty", range)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidSettings(_) => None,
            Error::ThreadPool(err) => Some(err),
            Error::Source(err) => Some(err),
        }
    }
}
