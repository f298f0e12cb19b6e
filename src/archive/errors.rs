use std::fmt;
use std::io;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Zip(zip::result::ZipError),
    Pattern {
        pattern: String,
        err: glob::PatternError,
    },
    NotFound(PathBuf),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Error {
        Error::Io(err.into())
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Error {
        Error::Zip(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
            Error::Zip(err) => write!(f, "invalid archive: {}", err),
            Error::Pattern { pattern, err } => {
                write!(f, "invalid exclude pattern '{}': {}", pattern, err)
            }
            Error::NotFound(path) => write!(f, "{} does not exist", path.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Zip(err) => Some(err),
            Error::Pattern { err, .. } => Some(err),
            Error::NotFound(_) => None,
        }
    }
}
