use std::{error::Error, fmt, io};

pub type GenericError = Box<dyn Error + Send + Sync + 'static>;

/// Failure classes that end a ping run, or keep it from starting (`Resolve`).
///
/// A lost or late reply is not one of them. The probe loop records it as a lost packet and keeps
/// going.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PingErrorKind {
    Resolve,
    SocketOpen,
    Send,
    Encode,
    Other,
}

impl fmt::Display for PingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PingErrorKind::Resolve => "resolve",
            PingErrorKind::SocketOpen => "socket open",
            PingErrorKind::Send => "send",
            PingErrorKind::Encode => "encode",
            PingErrorKind::Other => "other",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug)]
pub struct PingError {
    pub kind: PingErrorKind,
    pub message: String,
}

impl PingError {
    pub fn new(kind: PingErrorKind, message: impl Into<String>) -> Self {
        PingError { kind, message: message.into() }
    }

    pub(crate) fn socket_open(error: &io::Error) -> Self {
        PingError::new(PingErrorKind::SocketOpen, error.to_string())
    }

    pub(crate) fn send(error: &io::Error) -> Self {
        PingError::new(PingErrorKind::Send, error.to_string())
    }
}

impl fmt::Display for PingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "PingError ({})", self.kind)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl Error for PingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl From<io::Error> for PingError {
    fn from(error: io::Error) -> PingError {
        PingError::new(PingErrorKind::Other, error.to_string())
    }
}
