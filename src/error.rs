// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Io(String),
    Config(String),
    Storage(String),
    Network(String),
    /// A caller-supplied id is already resident or waiting for admission.
    DuplicateId(String),
    /// A manager lookup happened outside of any `context::provide` scope.
    MissingContext(&'static str),
    /// A tokio-backed scheduler was requested outside of a runtime.
    NoRuntime,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Storage(e) => write!(f, "Storage Error: {}", e),
            Error::Network(e) => write!(f, "Network Error: {}", e),
            Error::DuplicateId(id) => write!(f, "Feedback id already in use: {}", id),
            Error::MissingContext(what) => write!(
                f,
                "No {} in scope: call context::provide before using it",
                what
            ),
            Error::NoRuntime => write!(f, "No tokio runtime available for timer scheduling"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
