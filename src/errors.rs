//! Definition of errors.

use core::fmt;

/// A specialized Result type for this crate.
pub type Result<T, E = LazyAcError> = core::result::Result<T, E>;

/// Errors raised while building an automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LazyAcError {
    /// Contains [`InputError`].
    Input(InputError),

    /// Contains [`ScaleError`].
    Scale(ScaleError),
}

impl fmt::Display for LazyAcError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Input(e) => e.fmt(f),
            Self::Scale(e) => e.fmt(f),
        }
    }
}

impl LazyAcError {
    pub(crate) const fn input(msg: &'static str) -> Self {
        Self::Input(InputError { msg })
    }

    pub(crate) const fn scale(arg: &'static str, max: u32) -> Self {
        Self::Scale(ScaleError { arg, max })
    }
}

/// Error used when the input dictionary is not allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputError {
    msg: &'static str,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InputError: {}", self.msg)
    }
}

/// Error used when the scale of the input or of the automaton exceeds what it can address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleError {
    arg: &'static str,
    max: u32,
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ScaleError: {} must be no greater than {}",
            self.arg, self.max
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LazyAcError {}

#[cfg(feature = "std")]
impl std::error::Error for InputError {}

#[cfg(feature = "std")]
impl std::error::Error for ScaleError {}
