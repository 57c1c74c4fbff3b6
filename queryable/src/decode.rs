//! URL decoding for raw query strings.

use std::fmt;

/// Error returned when URL decoding fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Decoded output would exceed the configured maximum length.
    TooLong {
        /// The limit that was hit, in bytes.
        max: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max } => {
                write!(f, "url decoded query exceeds maximum length ({max} bytes)")
            },
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode `%XX` escapes and `+` (as space) in a query string.
///
/// Invalid or truncated escapes are kept verbatim and invalid UTF-8 is
/// replaced lossily, so decoding only fails on the length limit.
///
/// # Examples
///
/// ```
/// use queryable::url_decode;
///
/// assert_eq!(url_decode("age%3C%3D30", 1024).unwrap(), "age<=30");
/// assert_eq!(url_decode("name=John+Doe", 1024).unwrap(), "name=John Doe");
/// assert_eq!(url_decode("%GG", 1024).unwrap(), "%GG");
/// ```
pub fn url_decode(s: &str, max_len: usize) -> Result<String, DecodeError> {
    let input = s.as_bytes();
    let mut bytes = Vec::with_capacity(input.len().min(max_len));
    let mut i = 0;

    while let Some(&b) = input.get(i) {
        if bytes.len() >= max_len {
            return Err(DecodeError::TooLong { max: max_len });
        }

        match b {
            b'%' => {
                let decoded = input
                    .get(i + 1..i + 3)
                    .filter(|hex| hex.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|hex| std::str::from_utf8(hex).ok())
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok());
                if let Some(decoded) = decoded {
                    bytes.push(decoded);
                    i += 3;
                    continue;
                }
                bytes.push(b'%');
            },
            b'+' => bytes.push(b' '),
            _ => bytes.push(b),
        }
        i += 1;
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
