//! Windows error code handling utilities

use std::fmt;
use winapi::um::errhandlingapi::GetLastError;

/// Windows error codes the process backend tells apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success,
    AccessDenied,
    InvalidHandle,
    InvalidParameter,
    PartialCopy,
    InvalidAddress,
    NoAccess,
    Unknown(u32),
}

impl From<u32> for ErrorCode {
    fn from(code: u32) -> Self {
        match code {
            0 => ErrorCode::Success,
            5 => ErrorCode::AccessDenied,
            6 => ErrorCode::InvalidHandle,
            87 => ErrorCode::InvalidParameter,
            299 => ErrorCode::PartialCopy,
            487 => ErrorCode::InvalidAddress,
            998 => ErrorCode::NoAccess,
            _ => ErrorCode::Unknown(code),
        }
    }
}

impl ErrorCode {
    /// Get the last Windows error
    pub fn last_error() -> Self {
        unsafe { ErrorCode::from(GetLastError()) }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Success => write!(f, "Success"),
            ErrorCode::AccessDenied => write!(f, "Access denied"),
            ErrorCode::InvalidHandle => write!(f, "Invalid handle"),
            ErrorCode::InvalidParameter => write!(f, "Invalid parameter"),
            ErrorCode::PartialCopy => write!(f, "Partial copy"),
            ErrorCode::InvalidAddress => write!(f, "Invalid address"),
            ErrorCode::NoAccess => write!(f, "Invalid access to memory location"),
            ErrorCode::Unknown(code) => write!(f, "Unknown error: {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_conversion() {
        assert_eq!(ErrorCode::from(0), ErrorCode::Success);
        assert_eq!(ErrorCode::from(299), ErrorCode::PartialCopy);
        assert_eq!(ErrorCode::from(998), ErrorCode::NoAccess);
        assert_eq!(ErrorCode::from(999), ErrorCode::Unknown(999));
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::PartialCopy), "Partial copy");
        assert_eq!(format!("{}", ErrorCode::Unknown(123)), "Unknown error: 123");
    }
}
