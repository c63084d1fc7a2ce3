use std::fmt;
use std::path::PathBuf;

/// An error that can occur when reading a save file
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    /// Return the specific type of error
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }
}

/// Specific type of error
#[derive(Debug)]
pub enum ErrorKind {
    /// An underlying IO error while reading the file or its metadata
    Io(std::io::Error),

    /// The file did not start with the GVAS signature
    InvalidSignature { path: PathBuf },

    /// No compressed block could be located and inflated into valid data
    NoDecodableBlock { path: PathBuf },
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => write!(f, "io error: {}", err),
            ErrorKind::InvalidSignature { ref path } => {
                write!(f, "missing GVAS signature: {}", path.display())
            }
            ErrorKind::NoDecodableBlock { ref path } => {
                write!(f, "no decodable save block: {}", path.display())
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::new(ErrorKind::Io(error))
    }
}
