use std::fmt;
use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// An expected column is absent from an input report.
    MissingColumn { path: PathBuf, column: String },
    /// A record or cell could not be interpreted.
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },
    /// A caller-supplied parameter violates a precondition.
    InvalidValue {
        name: &'static str,
        value: String,
        expected: String,
    },
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl Error {
    pub fn invalid<V: ToString, E: Into<String>>(name: &'static str, value: V, expected: E) -> Self {
        Error::InvalidValue {
            name,
            value: value.to_string(),
            expected: expected.into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingColumn { path, column } => {
                write!(f, "missing column '{}' in {}", column, path.display())
            }
            Error::Parse {
                path,
                line,
                message,
            } => write!(f, "{}:{}: {}", path.display(), line, message),
            Error::InvalidValue {
                name,
                value,
                expected,
            } => write!(f, "invalid {} '{}': {}", name, value, expected),
            Error::Io(e) => write!(f, "{}", e),
            Error::Csv(e) => write!(f, "{}", e),
            Error::Json(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Csv(e) => Some(e),
            Error::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}
