use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    RemoteTransient,
    Remote,
    Configuration,
    InvalidArgument,
    Parse,
}

#[derive(Debug, ThisError)]
#[error("{kind:?}: {context}")]
pub struct Error {
    pub kind: ErrorKind,
    pub context: String,
}

impl Error {
    pub fn new(kind: ErrorKind, context: impl Into<String>) -> Self {
        Error { kind, context: context.into() }
    }

    pub fn io(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, context)
    }

    pub fn remote_transient(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteTransient, context)
    }

    pub fn remote(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote, context)
    }

    pub fn configuration(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, context)
    }

    pub fn invalid_argument(context: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, context)
    }

    /// Network failures and transient engine conditions are worth another
    /// attempt; everything else is a caller or programming error.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Io | ErrorKind::RemoteTransient)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            kind: ErrorKind::Io,
            context: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            kind: ErrorKind::Parse,
            context: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_and_transient_errors_are_retryable() {
        assert!(Error::io("connection reset").is_retryable());
        assert!(Error::remote_transient("no live replica").is_retryable());
        assert!(!Error::remote("undefined field").is_retryable());
        assert!(!Error::configuration("facet without field").is_retryable());
    }

    #[test]
    fn display_carries_kind_and_context() {
        let err = Error::invalid_argument("blank accession");
        assert_eq!(err.to_string(), "InvalidArgument: blank accession");
    }

    #[test]
    fn std_io_errors_convert_to_io_kind() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out").into();
        assert_eq!(err.kind, ErrorKind::Io);
    }
}
