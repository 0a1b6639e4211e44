//! `darp keygen`: the `wg genkey | tee private | wg pubkey` equivalent.

use std::io::Write;

use darp_wireguard::KeyPair;

use crate::error::CliError;
use crate::output::{KeygenReport, OutputFormat};

/// Keygen command executor.
#[derive(Debug, Default)]
pub struct KeygenCommand;

impl KeygenCommand {
    /// Create a keygen command.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a key pair and print both halves.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn execute<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let pair = KeyPair::generate();
        let report = KeygenReport {
            private_key: pair.private_key().to_base64(),
            public_key: pair.public_key().to_base64(),
        };
        format.write(writer, &report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use crate::commands::testing::output;
    use darp_wireguard::PrivateKey;

    #[test]
    fn keys_match() {
        let mut buf = Vec::new();
        KeygenCommand::new()
            .execute(&mut buf, &OutputFormat::new(Format::Json))
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&output(buf)).unwrap();
        let private = PrivateKey::from_base64(value["private_key"].as_str().unwrap()).unwrap();
        assert_eq!(
            private.public_key().to_base64(),
            value["public_key"].as_str().unwrap()
        );
    }

    #[test]
    fn table_layout() {
        let mut buf = Vec::new();
        KeygenCommand::new()
            .execute(&mut buf, &OutputFormat::default())
            .unwrap();

        let out = output(buf);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Private Key:  "));
        assert_eq!(lines[1].len(), "Public Key:   ".len() + 44);
    }
}
