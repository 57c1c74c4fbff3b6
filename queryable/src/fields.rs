//! Field authorization: the allow-list and the hidden-field deny-list.

use crate::constants::ALLOW_ALL_MARKER;

/// Which fields may be filtered or sorted on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedFields {
    /// Every field is permitted (hidden fields still excluded).
    All,
    /// Only the listed fields, in insertion order.
    Only(Vec<String>),
}

impl Default for AllowedFields {
    fn default() -> Self {
        Self::Only(Vec::new())
    }
}

/// Allow-list plus deny-list for one query context.
///
/// The deny-list (hidden fields) always wins, including over
/// [`AllowedFields::All`]. Names are compared literally, so they must
/// already be in the backend's convention (see [`Normalizer`](crate::Normalizer)).
///
/// # Example
///
/// ```
/// use queryable::AllowedFieldSet;
///
/// let mut fields = AllowedFieldSet::new();
/// fields.set(["name", "email", "password"]).hide("password");
///
/// assert!(fields.is_authorized("name"));
/// assert!(!fields.is_authorized("password"));
/// assert!(!fields.is_authorized("role"));
///
/// fields.allow_all();
/// assert!(fields.is_authorized("role"));
/// assert!(!fields.is_authorized("password"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AllowedFieldSet {
    #[cfg_attr(feature = "serde", serde(rename = "allow", with = "allow_serde"))]
    allowed: AllowedFields,
    hidden: Vec<String>,
}

impl AllowedFieldSet {
    /// An empty set: nothing is authorized until fields are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set that authorizes every field.
    pub fn all() -> Self {
        Self {
            allowed: AllowedFields::All,
            hidden: Vec::new(),
        }
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(fields);
        self
    }

    /// Builder form of [`set_hidden`](Self::set_hidden).
    #[must_use]
    pub fn with_hidden<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_hidden(fields);
        self
    }

    /// Replace the allow-list.
    ///
    /// A `"*"` entry switches the set to allow-all.
    pub fn set<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = AllowedFields::Only(Vec::new());
        for field in fields {
            self.add(field);
        }
        self
    }

    /// Append a field to the allow-list if it is not already present.
    ///
    /// Adding `"*"` switches the set to allow-all. Adding a field to an
    /// allow-all set changes nothing.
    pub fn add(&mut self, field: impl Into<String>) -> &mut Self {
        let field = field.into();
        if field == ALLOW_ALL_MARKER {
            self.allowed = AllowedFields::All;
            return self;
        }
        if let AllowedFields::Only(list) = &mut self.allowed
            && !list.contains(&field)
        {
            list.push(field);
        }
        self
    }

    /// Remove a field from the allow-list. No-op on an allow-all set;
    /// use [`hide`](Self::hide) to exclude a field from allow-all.
    pub fn remove(&mut self, field: &str) -> &mut Self {
        if let AllowedFields::Only(list) = &mut self.allowed {
            list.retain(|f| f != field);
        }
        self
    }

    /// Authorize every field not hidden.
    pub fn allow_all(&mut self) -> &mut Self {
        self.allowed = AllowedFields::All;
        self
    }

    /// Empty the allow-list; nothing is authorized afterwards.
    pub fn clear(&mut self) -> &mut Self {
        self.allowed = AllowedFields::Only(Vec::new());
        self
    }

    /// Add a field to the deny-list.
    pub fn hide(&mut self, field: impl Into<String>) -> &mut Self {
        let field = field.into();
        if !self.hidden.contains(&field) {
            self.hidden.push(field);
        }
        self
    }

    /// Remove a field from the deny-list.
    pub fn unhide(&mut self, field: &str) -> &mut Self {
        self.hidden.retain(|f| f != field);
        self
    }

    /// Replace the deny-list.
    pub fn set_hidden<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hidden.clear();
        for field in fields {
            self.hide(field);
        }
        self
    }

    /// Back to an empty allow-list with no hidden fields.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::default();
        self
    }

    /// The current allow-list.
    pub const fn allowed(&self) -> &AllowedFields {
        &self.allowed
    }

    /// The current deny-list.
    pub fn hidden(&self) -> &[String] {
        &self.hidden
    }

    /// Whether every non-hidden field is authorized.
    pub const fn allows_all(&self) -> bool {
        matches!(self.allowed, AllowedFields::All)
    }

    /// Check a (normalized) field name against the set.
    #[inline]
    pub fn is_authorized(&self, field: &str) -> bool {
        if field.is_empty() || self.hidden.iter().any(|h| h == field) {
            return false;
        }
        match &self.allowed {
            AllowedFields::All => true,
            AllowedFields::Only(list) => list.iter().any(|f| f == field),
        }
    }
}

/// `allow` is either the string `"*"` or a list of field names; a list
/// containing `"*"` also means allow-all.
#[cfg(feature = "serde")]
mod allow_serde {
    use super::AllowedFields;
    use crate::constants::ALLOW_ALL_MARKER;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Marker(String),
        List(Vec<String>),
    }

    pub(super) fn serialize<S: Serializer>(
        allowed: &AllowedFields,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match allowed {
            AllowedFields::All => Repr::Marker(ALLOW_ALL_MARKER.to_string()),
            AllowedFields::Only(list) => Repr::List(list.clone()),
        }
        .serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<AllowedFields, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Marker(m) if m == ALLOW_ALL_MARKER => Ok(AllowedFields::All),
            Repr::Marker(m) => Ok(AllowedFields::Only(vec![m])),
            Repr::List(list) if list.iter().any(|f| f == ALLOW_ALL_MARKER) => {
                Ok(AllowedFields::All)
            },
            Repr::List(mut list) => {
                let mut seen = Vec::with_capacity(list.len());
                list.retain(|f| {
                    if seen.contains(f) {
                        false
                    } else {
                        seen.push(f.clone());
                        true
                    }
                });
                Ok(AllowedFields::Only(list))
            },
        }
    }
}
