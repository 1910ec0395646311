
use std::error::Error;
use std::fmt::{self, Display, Debug};

use crate::dialect::DialectId;

pub trait ErrorDescription {
    fn description(&self) -> impl Display;
    fn code(&self) -> Option<i32> {
        None
    }
    fn error_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

impl<T> ErrorDescription for T
where
    T: Display,
{
    fn description(&self) -> impl Display {
        self
    }
}

pub struct GenericError<T>(pub T) where T: ErrorDescription;

impl<T> GenericError<T>
where
    T: ErrorDescription,
{
    pub const fn new(err: T) -> Self {
        Self(err)
    }

    pub fn into_inner(self) -> T {
        self.0
    }

    pub fn as_inner(&self) -> &T {
        &self.0
    }

    pub fn map<U, F>(self, f: F) -> GenericError<U>
    where
        U: ErrorDescription,
        F: FnOnce(T) -> U,
    {
        GenericError(f(self.0))
    }

    pub fn error_name(&self) -> &'static str {
        self.0.error_name()
    }

    pub fn code(&self) -> Option<i32> {
        self.0.code()
    }
}

impl<T> Debug for GenericError<T>
where
    T: ErrorDescription,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(code) = self.0.code() {
            write!(f, "GenericError({}): {} ({})", self.error_name(), self.0.description(), code)
        } else {
            write!(f, "GenericError({}): {}", self.error_name(), self.0.description())
        }
    }
}

impl<T> Display for GenericError<T>
where
    T: ErrorDescription,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.description())
    }
}

impl<T> Error for GenericError<T>
where
    T: ErrorDescription,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl<T> From<T> for GenericError<T>
where
    T: ErrorDescription,
{
    fn from(err: T) -> Self {
        Self::new(err)
    }
}

/// Failures raised while building or querying the dialect engine.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum DialectErrorKind {
    /// A dialect id that is not part of the configured profile table.
    UnknownDialect(String),
    MalformedProfile {
        dialect: DialectId,
        reason: String,
    },
    DuplicateProfile(DialectId),
    InvalidConfig(String),
    /// The profile file could not be read or parsed.
    ProfileFile(String),
    /// A response could not be encoded.
    Serialization(String),
}

impl ErrorDescription for DialectErrorKind {
    #[allow(refining_impl_trait)]
    fn description(&self) -> String {
        match self {
            Self::UnknownDialect(id) => format!("Unknown dialect: {}", id),
            Self::MalformedProfile { dialect, reason } => format!("Malformed profile for {}: {}", dialect, reason),
            Self::DuplicateProfile(dialect) => format!("Profile for {} is declared more than once", dialect),
            Self::InvalidConfig(reason) => format!("Invalid engine configuration: {}", reason),
            Self::ProfileFile(reason) => format!("Failed to load profile file: {}", reason),
            Self::Serialization(reason) => format!("Failed to encode response: {}", reason),
        }
    }

    fn code(&self) -> Option<i32> {
        Some(match self {
            Self::UnknownDialect(_) => 100,
            Self::MalformedProfile { .. } => 101,
            Self::DuplicateProfile(_) => 102,
            Self::InvalidConfig(_) => 103,
            Self::ProfileFile(_) => 104,
            Self::Serialization(_) => 105,
        })
    }

    fn error_name(&self) -> &'static str {
        match self {
            Self::UnknownDialect(_) => "UnknownDialectError",
            Self::MalformedProfile { .. } => "MalformedProfileError",
            Self::DuplicateProfile(_) => "DuplicateProfileError",
            Self::InvalidConfig(_) => "InvalidConfigError",
            Self::ProfileFile(_) => "ProfileFileError",
            Self::Serialization(_) => "SerializationError",
        }
    }
}

pub type DialectError = GenericError<DialectErrorKind>;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum SynthesisErrorKind {
    InvalidSampleRate(u32),
    InvalidParameter(String),
    Encoding(String),
}

impl ErrorDescription for SynthesisErrorKind {
    #[allow(refining_impl_trait)]
    fn description(&self) -> String {
        match self {
            Self::InvalidSampleRate(rate) => format!("Invalid sample rate: {}", rate),
            Self::InvalidParameter(reason) => format!("Invalid synthesis parameter: {}", reason),
            Self::Encoding(reason) => format!("Failed to encode audio: {}", reason),
        }
    }

    fn code(&self) -> Option<i32> {
        Some(match self {
            Self::InvalidSampleRate(_) => 200,
            Self::InvalidParameter(_) => 201,
            Self::Encoding(_) => 202,
        })
    }
}

pub type SynthesisError = GenericError<SynthesisErrorKind>;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceErrorKind {
    Dialect(DialectErrorKind),
    Synthesis(SynthesisErrorKind),
    /// The runner thread has gone away.
    Disconnected,
}

impl ErrorDescription for ServiceErrorKind {
    #[allow(refining_impl_trait)]
    fn description(&self) -> String {
        match self {
            Self::Dialect(kind) => kind.description(),
            Self::Synthesis(kind) => kind.description(),
            Self::Disconnected => "Speech service is not running".to_string(),
        }
    }

    fn code(&self) -> Option<i32> {
        match self {
            Self::Dialect(kind) => kind.code(),
            Self::Synthesis(kind) => kind.code(),
            Self::Disconnected => Some(300),
        }
    }
}

pub type ServiceError = GenericError<ServiceErrorKind>;

impl From<DialectError> for ServiceError {
    fn from(err: DialectError) -> Self {
        err.map(ServiceErrorKind::Dialect)
    }
}

impl From<SynthesisError> for ServiceError {
    fn from(err: SynthesisError) -> Self {
        err.map(ServiceErrorKind::Synthesis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dialect_is_named_and_coded() {
        let err = DialectError::new(DialectErrorKind::UnknownDialect("klingon".into()));
        assert_eq!(err.error_name(), "UnknownDialectError");
        assert_eq!(err.code(), Some(100));
        assert_eq!(err.to_string(), "Unknown dialect: klingon");
    }

    #[test]
    fn service_error_keeps_inner_code() {
        let err: ServiceError = DialectError::new(DialectErrorKind::InvalidConfig("x".into())).into();
        assert_eq!(err.code(), Some(103));
        assert!(matches!(err.as_inner(), ServiceErrorKind::Dialect(DialectErrorKind::InvalidConfig(_))));
    }

    #[test]
    fn plain_strings_are_descriptions() {
        let err = GenericError::new("boom");
        assert_eq!(format!("{}", err), "boom");
        assert_eq!(err.code(), None);
    }
}
