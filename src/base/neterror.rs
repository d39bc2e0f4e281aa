use crate::filter::FilterError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum NetError {
    // Connection Errors
    #[error("WebSocket protocol error")]
    WsProtocolError,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Disallowed URL scheme")]
    DisallowedUrlScheme,

    // Exchange errors (custom codes starting at -910)
    #[error("Maximum redirect reached: {max}")]
    MaxRedirectsExceeded { max: u32 },
    #[error("Response filter failed: {0}")]
    Filter(FilterError),
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("Request dispatcher closed")]
    DispatcherClosed,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::WsProtocolError => -145,

            NetError::InvalidUrl => -300,
            NetError::DisallowedUrlScheme => -301,

            NetError::MaxRedirectsExceeded { .. } => -910,
            NetError::Filter(_) => -911,
            NetError::InvalidHeader => -912,
            NetError::InvalidConfig { .. } => -913,
            NetError::DispatcherClosed => -914,
            NetError::Unknown(code) => *code,
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        NetError::InvalidConfig {
            message: message.into(),
        }
    }
}

impl From<FilterError> for NetError {
    fn from(err: FilterError) -> Self {
        NetError::Filter(err)
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -145 => NetError::WsProtocolError,

            -300 => NetError::InvalidUrl,
            -301 => NetError::DisallowedUrlScheme,

            -912 => NetError::InvalidHeader,
            -914 => NetError::DispatcherClosed,
            _ => NetError::Unknown(code),
        }
    }
}
