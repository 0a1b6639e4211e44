//! Numeric validation functions.

use crate::error::ValidationError;
use crate::sanitized::ValidatedValue;
use crate::{MAX_MTU, MAX_TIMEOUT_SECONDS, MIN_MTU};

/// Type alias for validated port numbers.
pub type ValidatedPort = ValidatedValue<u16>;

/// Type alias for validated MTU values.
pub type ValidatedMtu = ValidatedValue<u32>;

/// Type alias for validated timeouts.
pub type ValidatedTimeout = ValidatedValue<u64>;

/// Validate a port number.
///
/// Ports must be in the range 1-65535.
///
/// # Errors
///
/// Returns `ValidationError` if the port is out of range.
pub fn validate_port(port: u16) -> Result<ValidatedPort, ValidationError> {
    if port == 0 {
        return Err(ValidationError::out_of_range("port", 1, 65535, 0));
    }
    Ok(ValidatedValue::new(port))
}

/// Validate an interface MTU.
///
/// The lower bound is the IPv4 minimum datagram size, the upper bound a
/// jumbo frame.
///
/// # Errors
///
/// Returns `ValidationError` if the MTU is out of range.
pub fn validate_mtu(mtu: u32) -> Result<ValidatedMtu, ValidationError> {
    if !(MIN_MTU..=MAX_MTU).contains(&mtu) {
        return Err(ValidationError::out_of_range(
            "mtu",
            u64::from(MIN_MTU),
            u64::from(MAX_MTU),
            u64::from(mtu),
        ));
    }
    Ok(ValidatedValue::new(mtu))
}

/// Validate a timeout in seconds.
///
/// # Errors
///
/// Returns `ValidationError` if the timeout is zero or longer than an hour.
pub fn validate_timeout(seconds: u64) -> Result<ValidatedTimeout, ValidationError> {
    if seconds == 0 || seconds > MAX_TIMEOUT_SECONDS {
        return Err(ValidationError::out_of_range(
            "timeout",
            1,
            MAX_TIMEOUT_SECONDS,
            seconds,
        ));
    }
    Ok(ValidatedValue::new(seconds))
}
