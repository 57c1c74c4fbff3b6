//! Fragment tokenizer: `key<op>value` → [`RawToken`].
//!
//! A fragment is split on every character of the operator class
//! ([`OPERATOR_CHARS`]), keeping each delimiter as its own piece and
//! discarding empty pieces:
//!
//! ```text
//! age<=30   -> ["age", "<", "=", "30"]
//! name=bob  -> ["name", "=", "bob"]
//! ```
//!
//! Two-character operators (`<=`, `>=`, `!=`, `!~`) come out of the split as
//! two one-character pieces, so whenever four or more pieces exist the
//! second and third are merged back into a single operator and the next
//! piece becomes the value.
//!
//! # Known limitation
//!
//! Values containing operator-class characters are not supported. The
//! split does not know about them, and after the merge every piece past
//! the value slot is dropped: `a=b=c` tokenizes to `("a", "=b", "=")`,
//! which the descriptor builder then rejects as an unknown operator.

/// Characters that make up operators; each one splits a fragment.
pub const OPERATOR_CHARS: [char; 5] = ['!', '=', '<', '>', '~'];

/// The `(key, operator, value)` triple of one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    key: String,
    operator: String,
    value: String,
}

impl RawToken {
    /// Create a token from its parts.
    pub fn new(
        key: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// The field name as written in the fragment (or normalized, after
    /// [`with_key`](Self::with_key)).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The operator string, one or two characters.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// The raw value text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The same token with its key replaced.
    #[must_use]
    pub fn with_key(self, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..self
        }
    }

    /// Split into owned parts.
    pub fn into_parts(self) -> (String, String, String) {
        (self.key, self.operator, self.value)
    }
}

/// Whether `c` belongs to the operator class ([`OPERATOR_CHARS`]).
#[inline]
pub fn is_operator_char(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

/// Split a fragment on operator characters, keeping the delimiters.
fn split_keep_operators(fragment: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (i, c) in fragment.char_indices() {
        if is_operator_char(c) {
            if let Some(piece) = fragment.get(start..i).filter(|p| !p.is_empty()) {
                pieces.push(piece);
            }
            let end = i + c.len_utf8();
            if let Some(op) = fragment.get(i..end) {
                pieces.push(op);
            }
            start = end;
        }
    }
    if let Some(rest) = fragment.get(start..).filter(|p| !p.is_empty()) {
        pieces.push(rest);
    }

    pieces
}

/// Tokenize one URL-decoded fragment.
///
/// Returns `None` when the fragment yields fewer than three pieces. No
/// authorization happens here; callers check the (normalized) key.
///
/// # Examples
///
/// ```
/// use queryable::tokenize;
///
/// let token = tokenize("age<=30").unwrap();
/// assert_eq!((token.key(), token.operator(), token.value()), ("age", "<=", "30"));
///
/// assert!(tokenize("age=").is_none());
/// assert!(tokenize("plain").is_none());
/// ```
pub fn tokenize(fragment: &str) -> Option<RawToken> {
    let pieces = split_keep_operators(fragment);

    match pieces.as_slice() {
        [key, op, value] => Some(RawToken::new(*key, *op, *value)),
        [key, op1, op2, value, ..] => Some(RawToken::new(*key, format!("{op1}{op2}"), *value)),
        _ => None,
    }
}
