//! Ordered scope lists carried through the authorization flow.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when validating scopes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ScopeValidationError {
	/// Empty scope entries are not allowed.
	#[error("Scope entries cannot be empty.")]
	Empty,
	/// Scopes cannot contain whitespace or list delimiters.
	#[error("Scope contains a delimiter character: {scope}.")]
	ContainsDelimiter {
		/// The offending scope string.
		scope: String,
	},
}

/// Ordered list of OAuth scopes.
///
/// Unlike a normalized set, the list keeps the caller's order and duplicates so the exact
/// sequence requested at `authenticate` time is what the callback hands to the authenticator.
/// Entries must be non-empty and free of whitespace and commas, which keeps the delimited
/// wire forms unambiguous.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeList(Vec<String>);
impl ScopeList {
	/// Builds a list from any iterator, validating every entry.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let scopes = scopes
			.into_iter()
			.map(|scope| {
				let owned = scope.into();

				validate(&owned)?;

				Ok(owned)
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(Self(scopes))
	}

	/// Parses delimited scope strings (space or comma separated), preserving order.
	pub fn parse_delimited<'a, I>(values: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = &'a str>,
	{
		Self::new(
			values
				.into_iter()
				.flat_map(|value| value.split(|c: char| c == ',' || c.is_whitespace()))
				.filter(|piece| !piece.is_empty()),
		)
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if no scopes were requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Joins the scopes with the provided delimiter, or `None` when empty.
	pub fn join(&self, delimiter: char) -> Option<String> {
		if self.is_empty() {
			return None;
		}

		let mut buf = String::new();

		for (idx, value) in self.iter().enumerate() {
			if idx > 0 {
				buf.push(delimiter);
			}

			buf.push_str(value);
		}

		Some(buf)
	}

	/// Returns the underlying slice of scope strings.
	pub fn as_slice(&self) -> &[String] {
		&self.0
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.0).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.join(' ').unwrap_or_default())
	}
}
impl<'a> IntoIterator for &'a ScopeList {
	type IntoIter = std::iter::Map<Iter<'a, String>, fn(&'a String) -> &'a str>;
	type Item = &'a str;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter().map(String::as_str as fn(&'a String) -> &'a str)
	}
}
impl TryFrom<Vec<String>> for ScopeList {
	type Error = ScopeValidationError;

	fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl FromStr for ScopeList {
	type Err = ScopeValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse_delimited([s])
	}
}
impl<'de> Deserialize<'de> for ScopeList {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let values = <Vec<String>>::deserialize(deserializer)?;

		ScopeList::new(values).map_err(DeError::custom)
	}
}

fn validate(scope: &str) -> Result<(), ScopeValidationError> {
	if scope.is_empty() {
		return Err(ScopeValidationError::Empty);
	}
	if scope.chars().any(|c| c == ',' || c.is_whitespace()) {
		return Err(ScopeValidationError::ContainsDelimiter { scope: scope.to_owned() });
	}

	Ok(())
}
