//! `OctetString` type for variable-length byte sequences.
//!
//! RAN parameter elements and KPM test-condition values carry raw octets.
//! `OctetString` wraps a `Vec<u8>` with the conversions those builders need.

use std::fmt;

/// A variable-length sequence of octets (bytes).
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct OctetString {
    data: Vec<u8>,
}

impl OctetString {
    /// Creates a new empty `OctetString`.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Creates an `OctetString` from a `Vec<u8>`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Creates an `OctetString` from a byte slice.
    pub fn from_slice(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Creates an `OctetString` holding the bytes of an ASCII/UTF-8 string.
    ///
    /// No terminator is appended.
    pub fn from_ascii(ascii: &str) -> Self {
        Self {
            data: ascii.as_bytes().to_vec(),
        }
    }

    /// Creates an `OctetString` from a hex string.
    ///
    /// Whitespace is ignored. Returns `None` for odd-length or non-hex input.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex: String = hex.chars().filter(|c| !c.is_whitespace()).collect();
        if hex.len() % 2 != 0 {
            return None;
        }

        let mut data = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let byte = u8::from_str_radix(hex.get(i..i + 2)?, 16).ok()?;
            data.push(byte);
        }
        Some(Self { data })
    }

    /// Returns a reference to the underlying byte slice.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the string is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the content as text when it is valid UTF-8.
    pub fn as_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    /// Converts to a hex string (uppercase).
    pub fn to_hex_string(&self) -> String {
        self.data.iter().map(|b| format!("{b:02X}")).collect()
    }

    /// Consumes self and returns the underlying `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OctetString({})", self.to_hex_string())
    }
}

impl fmt::Display for OctetString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_string())
    }
}

impl From<Vec<u8>> for OctetString {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for OctetString {
    fn from(data: &[u8]) -> Self {
        Self::from_slice(data)
    }
}

impl From<&str> for OctetString {
    fn from(s: &str) -> Self {
        Self::from_ascii(s)
    }
}

impl AsRef<[u8]> for OctetString {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
