//! Error macros for textreuse

/// Macro for creating configuration errors
#[macro_export]
macro_rules! bail_config {
    ($($arg:tt)*) => {
        return Err($crate::error::ReuseError::InvalidConfig(format!($($arg)*)))
    };
}

/// Macro for creating usage errors
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::ReuseError::UsageError($msg.to_string()))
    };
}
