//! Error taxonomy for the distributed fitness-evaluation engine.
//!
//! Mirrors the taxonomy in spec section 7: `Configuration` errors for bad
//! rendezvous/engine setup, `Protocol` errors for malformed wire traffic,
//! `Evaluation` errors for user fitness-function failures, `Decode` errors
//! for malformed codec output, and `Io` for transport-level failures.
//! The core recovers nothing - every error is surfaced to the caller.

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

#[cfg(feature = "backtrace")]
use std::backtrace::Backtrace;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    Configuration,
    Protocol,
    Evaluation,
    Decode,
    Io,
    Multiple,
    Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrString(Cow<'static, str>);

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Into<Cow<'static, str>>> From<T> for ErrString {
    fn from(v: T) -> Self {
        Self(v.into())
    }
}

#[derive(Debug)]
pub enum EngineError {
    /// Bad rendezvous trigger, oversubscribed rendezvous, missing config entry.
    Configuration { message: ErrString },
    /// Mismatched tag sequence or truncated payload on the transport.
    Protocol { message: ErrString },
    /// Failure inside a user-supplied fitness function.
    Evaluation { message: ErrString },
    /// Malformed individual/fitness bytes.
    Decode { message: ErrString },
    Io {
        source: std::io::Error,
        #[cfg(feature = "backtrace")]
        backtrace: Backtrace,
    },
    Multiple(MultiDisplay),
    Context {
        context: ErrorContext,
        source: Box<EngineError>,
        #[cfg(feature = "backtrace")]
        backtrace: Backtrace,
    },
}

impl EngineError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Configuration { .. } => ErrorCode::Configuration,
            Self::Protocol { .. } => ErrorCode::Protocol,
            Self::Evaluation { .. } => ErrorCode::Evaluation,
            Self::Decode { .. } => ErrorCode::Decode,
            Self::Io { .. } => ErrorCode::Io,
            Self::Multiple(_) => ErrorCode::Multiple,
            Self::Context { .. } => ErrorCode::Context,
        }
    }

    pub fn with_context(self, msg: impl Into<String>) -> Self {
        EngineError::Context {
            context: ErrorContext::new(msg),
            source: Box::new(self),
            #[cfg(feature = "backtrace")]
            backtrace: Backtrace::capture(),
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { message } => write!(f, "configuration error: {}", message),
            Self::Protocol { message } => write!(f, "protocol error: {}", message),
            Self::Evaluation { message } => write!(f, "evaluation error: {}", message),
            Self::Decode { message } => write!(f, "decode error: {}", message),
            Self::Io { source, .. } => write!(f, "io error: {}", source),
            Self::Multiple(m) => write!(f, "multiple errors:\n{}", m),
            Self::Context {
                context, source, ..
            } => write!(f, "{}\nCaused by: {}", context, source),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Context { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(source: std::io::Error) -> Self {
        EngineError::Io {
            source,
            #[cfg(feature = "backtrace")]
            backtrace: Backtrace::capture(),
        }
    }
}

#[derive(Debug)]
pub struct ErrorContext {
    message: String,
}

impl ErrorContext {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorContext {}

#[derive(Debug)]
pub struct MultiDisplay(Vec<EngineError>);

impl Display for MultiDisplay {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[{}] {} (code: {:?})", i, e, e.code())?;
        }
        Ok(())
    }
}

impl From<Vec<EngineError>> for MultiDisplay {
    fn from(v: Vec<EngineError>) -> Self {
        Self(v)
    }
}

pub trait ResultExt<T> {
    fn context(self, msg: impl Into<String>) -> EngineResult<T>;
    fn with_context<F: FnOnce() -> String>(self, f: F) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn context(self, msg: impl Into<String>) -> EngineResult<T> {
        self.map_err(|e| e.into().with_context(msg))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> EngineResult<T> {
        self.map_err(|e| e.into().with_context(f()))
    }
}

#[doc(hidden)]
pub mod __private {
    #[inline]
    #[cold]
    #[must_use]
    pub fn must_use<E>(e: E) -> E {
        e
    }
}

#[macro_export]
macro_rules! evo_err {
    (Configuration: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::EngineError::Configuration { message: format!($fmt, $($arg),*).into() })
    };
    (Protocol: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::EngineError::Protocol { message: format!($fmt, $($arg),*).into() })
    };
    (Evaluation: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::EngineError::Evaluation { message: format!($fmt, $($arg),*).into() })
    };
    (Decode: $fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::__private::must_use($crate::EngineError::Decode { message: format!($fmt, $($arg),*).into() })
    };
}

#[macro_export]
macro_rules! evo_bail {
    ($($tt:tt)+) => { return Err($crate::evo_err!($($tt)+)) };
}

#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($tt:tt)+) => {
        if !$cond { $crate::evo_bail!($($tt)+); }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_formats_message() {
        let err = evo_err!(Configuration: "trigger must be non-zero, got {}", 0);
        assert_eq!(err.code(), ErrorCode::Configuration);
        assert!(err.to_string().contains("trigger must be non-zero"));
    }

    #[test]
    fn with_context_wraps_source() {
        let err = evo_err!(Protocol: "truncated payload").with_context("reading fitness reply");
        assert_eq!(err.code(), ErrorCode::Context);
        let rendered = err.to_string();
        assert!(rendered.contains("reading fitness reply"));
        assert!(rendered.contains("truncated payload"));
    }

    #[test]
    fn ensure_macro_bails_with_configuration_error() {
        fn check(trigger: usize) -> EngineResult<()> {
            ensure!(trigger > 0, Configuration: "trigger must be non-zero, got {}", trigger);
            Ok(())
        }

        assert!(check(0).is_err());
        assert!(check(1).is_ok());
    }
}
