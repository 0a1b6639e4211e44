//! String validation functions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::MAX_INTERFACE_NAME_LENGTH;
use crate::error::ValidationError;
use crate::sanitized::{Hostname, InterfaceName, Sanitized};

/// Shell metacharacters that could enable command injection.
const SHELL_METACHARACTERS: &[char] = &[
    ';', '|', '&', '$', '`', '(', ')', '{', '}', '<', '>', '\n', '\r', '\0',
];

/// Maximum length for hostnames (RFC 1035).
const MAX_HOSTNAME_LENGTH: usize = 253;

/// Characters the kernel accepts in an interface name that `wg-quick` also
/// accepts in a config file name.
#[allow(clippy::expect_used)]
static INTERFACE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_=+.-]+$").expect("interface name regex compiles"));

/// Regex for valid hostnames (RFC 1123).
#[allow(clippy::expect_used)]
static HOSTNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]*[a-zA-Z0-9])?)*$")
        .expect("hostname regex compiles")
});

fn check_null_bytes(field: &str, input: &str) -> Result<(), ValidationError> {
    if input.contains('\0') {
        return Err(ValidationError::null_byte(field));
    }
    Ok(())
}

fn check_shell_chars(field: &str, input: &str) -> Result<(), ValidationError> {
    for ch in input.chars() {
        if SHELL_METACHARACTERS.contains(&ch) {
            return Err(ValidationError::shell_injection(field, ch));
        }
    }
    Ok(())
}

/// Sanitize and validate a network interface name.
///
/// Linux limits interface names to 15 bytes (`IFNAMSIZ - 1`); `wg-quick`
/// further restricts them to `[a-zA-Z0-9_=+.-]` because the name doubles as
/// the config file stem.
///
/// # Errors
///
/// Returns `ValidationError` if the name is empty, too long, contains
/// characters outside the allowed set, or is `.`/`..`.
pub fn sanitize_interface_name(name: &str) -> Result<Sanitized<InterfaceName>, ValidationError> {
    let field = "interface";

    if name.is_empty() {
        return Err(ValidationError::empty(field));
    }

    if name.len() > MAX_INTERFACE_NAME_LENGTH {
        return Err(ValidationError::too_long(
            field,
            MAX_INTERFACE_NAME_LENGTH,
            name.len(),
        ));
    }

    check_null_bytes(field, name)?;
    check_shell_chars(field, name)?;

    if !INTERFACE_NAME_REGEX.is_match(name) {
        return Err(ValidationError::invalid_characters(
            field,
            name,
            "alphanumeric and _=+.-",
        ));
    }

    if name == "." || name == ".." {
        return Err(ValidationError::invalid_format(
            field,
            "interface name",
            name,
        ));
    }

    Ok(Sanitized::new(name.to_string()))
}

/// Sanitize and validate a hostname.
///
/// # Errors
///
/// Returns `ValidationError` if the hostname is invalid.
pub fn sanitize_hostname(hostname: &str) -> Result<Sanitized<Hostname>, ValidationError> {
    let field = "hostname";
    let hostname = hostname.trim();

    if hostname.is_empty() {
        return Err(ValidationError::empty(field));
    }

    if hostname.len() > MAX_HOSTNAME_LENGTH {
        return Err(ValidationError::too_long(field, MAX_HOSTNAME_LENGTH, hostname.len()));
    }

    check_null_bytes(field, hostname)?;
    check_shell_chars(field, hostname)?;

    if !HOSTNAME_REGEX.is_match(hostname) {
        return Err(ValidationError::invalid_format(
            field,
            "RFC 1123 hostname",
            hostname,
        ));
    }

    Ok(Sanitized::new(hostname.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValidationErrorKind;
    use test_case::test_case;

    #[test]
    fn test_pattern_statics_compile() {
        assert!(INTERFACE_NAME_REGEX.is_match("warp0"));
        assert!(HOSTNAME_REGEX.is_match("engage.cloudflareclient.com"));
        assert!(!HOSTNAME_REGEX.is_match("-bad.example"));
    }

    #[test_case("warp0" ; "default name")]
    #[test_case("wg0" ; "short")]
    #[test_case("darp" ; "letters only")]
    #[test_case("wg_home.1" ; "underscore and dot")]
    #[test_case("a=b+c-d" ; "punctuation")]
    #[test_case("abcdefghijklmno" ; "exactly fifteen")]
    fn test_valid_interface_names(name: &str) {
        assert_eq!(sanitize_interface_name(name).map(|s| s.into_inner()), Ok(name.to_string()));
    }

    #[test]
    fn test_interface_name_empty() {
        let err = sanitize_interface_name("").unwrap_err();
        assert!(err.is_empty_error());
    }

    #[test]
    fn test_interface_name_too_long() {
        let err = sanitize_interface_name("abcdefghijklmnop").unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::TooLong { max: 15, actual: 16 }));
    }

    #[test_case("wg 0" ; "space")]
    #[test_case("wg/0" ; "slash")]
    #[test_case("wg:0" ; "colon")]
    fn test_interface_name_invalid_chars(name: &str) {
        let err = sanitize_interface_name(name).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidCharacters { .. }));
    }

    #[test]
    fn test_interface_name_shell_injection() {
        let err = sanitize_interface_name("wg0;reboot").unwrap_err();
        assert!(err.is_security_error());
    }

    #[test]
    fn test_interface_name_dots() {
        assert!(sanitize_interface_name(".").is_err());
        assert!(sanitize_interface_name("..").is_err());
        assert!(sanitize_interface_name("...").is_ok());
    }

    #[test]
    fn test_hostname_validation() {
        assert!(sanitize_hostname("localhost").is_ok());
        assert!(sanitize_hostname("engage.cloudflareclient.com").is_ok());
        assert!(sanitize_hostname("host; cat /etc/passwd").is_err());
        assert!(sanitize_hostname("-leading.example.com").is_err());
        assert!(sanitize_hostname("").is_err());
    }

    #[test]
    fn test_hostname_lowercased_and_trimmed() {
        let host = sanitize_hostname("  Cloudflare.COM ").unwrap();
        assert_eq!(host.as_str(), "cloudflare.com");
    }

    #[test]
    fn test_hostname_too_long() {
        let label = "a".repeat(63);
        let long = [label.as_str(); 5].join(".");
        let err = sanitize_hostname(&long).unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::TooLong { .. }));
    }
}
