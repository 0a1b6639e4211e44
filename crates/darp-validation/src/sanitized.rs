//! Sanitized value wrapper types with marker traits.

use std::fmt;
use std::marker::PhantomData;

/// Marker trait for sanitization kinds.
pub trait SanitizationKind: private::Sealed {}

mod private {
    pub trait Sealed {}
}

/// Marker for network interface names.
#[derive(Debug, Clone, Copy)]
pub struct InterfaceName;
impl private::Sealed for InterfaceName {}
impl SanitizationKind for InterfaceName {}

/// Marker for hostnames.
#[derive(Debug, Clone, Copy)]
pub struct Hostname;
impl private::Sealed for Hostname {}
impl SanitizationKind for Hostname {}

/// A wrapper for validated values with type-level guarantees.
///
/// The type parameter `K` records which validator produced the value, so an
/// interface name cannot be passed where a hostname is expected.
///
/// ```
/// use darp_validation::{sanitize_interface_name, InterfaceName, Sanitized};
///
/// let iface: Sanitized<InterfaceName> = sanitize_interface_name("warp0")?;
/// assert_eq!(iface.as_str(), "warp0");
/// # Ok::<(), darp_validation::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sanitized<K: SanitizationKind> {
    value: String,
    _marker: PhantomData<K>,
}

impl<K: SanitizationKind> Sanitized<K> {
    /// Wrap a value that has already passed validation.
    pub(crate) fn new(value: String) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    /// Get the sanitized string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Consume the wrapper and return the inner value.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.value
    }
}

impl<K: SanitizationKind> AsRef<str> for Sanitized<K> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl<K: SanitizationKind> fmt::Display for Sanitized<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A validated numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidatedValue<T> {
    value: T,
}

impl<T: Copy> ValidatedValue<T> {
    /// Create a new validated value.
    pub(crate) const fn new(value: T) -> Self {
        Self { value }
    }

    /// Get the inner value.
    #[must_use]
    pub const fn value(&self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for ValidatedValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
