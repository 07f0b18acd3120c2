use std::fmt;

/// Error kinds produced by the engine.
///
/// Kinds that correspond to plan-build failures (`Schema`,
/// `UnknownColumn`, `InvalidArgument`) are raised before any data is
/// touched. Kinds raised during `collect` (`Kernel`, `Eval`) abort the
/// entire call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Column count, name, or length mismatch when building a table.
    Schema,
    /// Lookup of a column that does not exist on a table.
    ColumnNotFound,
    /// A verb referenced a column missing from the plan's schema.
    UnknownColumn,
    /// A native kernel invocation failed.
    Kernel,
    /// The fallback evaluator failed.
    Eval,
    /// Invalid argument to a verb (e.g. negative head count).
    InvalidArgument,
    /// Feature isn't implemented.
    NotImplemented,
    /// Catch-all.
    Other,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Schema => "Schema",
            ErrorKind::ColumnNotFound => "ColumnNotFound",
            ErrorKind::UnknownColumn => "UnknownColumn",
            ErrorKind::Kernel => "Kernel",
            ErrorKind::Eval => "Eval",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::Other => "Other",
        }
    }
}

#[derive(Debug)]
pub struct QuiverError {
    /// Kind of the error.
    kind: ErrorKind,
    /// User-facing message.
    msg: String,
    /// Source of the error, if any.
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QuiverError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self::with_kind(ErrorKind::Other, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<String>) -> Self {
        QuiverError {
            kind,
            msg: msg.into(),
            source: None,
        }
    }

    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for QuiverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.msg)
    }
}

impl std::error::Error for QuiverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T, E = QuiverError> = std::result::Result<T, E>;

/// Extension trait for adding context to results holding arbitrary
/// errors.
pub trait ResultExt<T> {
    /// Wrap the error with additional context.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap the error with additional lazily evaluated context.
    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| QuiverError::new(msg).with_source(e))
    }

    fn context_fn<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| QuiverError::new(f()).with_source(e))
    }
}

/// Return a `NotImplemented` error.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        return Err($crate::QuiverError::with_kind(
            $crate::ErrorKind::NotImplemented,
            msg,
        ));
    }};
}
