// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Basalt

use std::{
	fmt::{self, Display, Formatter},
	str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The 128-bit identifier type of Basalt.
///
/// Occupies exactly 16 bytes (UUID wire layout) and displays in the
/// canonical hyphenated form.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uuid(uuid::Uuid);

impl Uuid {
	/// Generate a new random (version 4) identifier.
	pub fn generate() -> Self {
		Self(uuid::Uuid::new_v4())
	}

	/// The all-zero identifier.
	pub fn nil() -> Self {
		Self(uuid::Uuid::nil())
	}

	/// Parse the canonical hyphenated form.
	pub fn parse_str(input: &str) -> Result<Self> {
		uuid::Uuid::parse_str(input).map(Self).map_err(|err| Error::Format {
			message: format!("invalid identifier {input:?}: {err}"),
		})
	}

	pub fn from_bytes(bytes: [u8; 16]) -> Self {
		Self(uuid::Uuid::from_bytes(bytes))
	}

	pub fn as_bytes(&self) -> &[u8; 16] {
		self.0.as_bytes()
	}

	pub fn from_u128(value: u128) -> Self {
		Self(uuid::Uuid::from_u128(value))
	}

	pub fn as_u128(&self) -> u128 {
		self.0.as_u128()
	}

	pub fn is_nil(&self) -> bool {
		self.0.is_nil()
	}

	pub fn get_version_num(&self) -> usize {
		self.0.get_version_num()
	}
}

impl Default for Uuid {
	fn default() -> Self {
		Self::nil()
	}
}

impl Display for Uuid {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl FromStr for Uuid {
	type Err = Error;

	fn from_str(input: &str) -> Result<Self> {
		Self::parse_str(input)
	}
}

impl From<uuid::Uuid> for Uuid {
	fn from(value: uuid::Uuid) -> Self {
		Self(value)
	}
}

impl From<Uuid> for uuid::Uuid {
	fn from(value: Uuid) -> Self {
		value.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_generate_unique() {
		let mut seen = Vec::new();
		for _ in 0..10 {
			let id = Uuid::generate();
			assert!(!seen.contains(&id), "identifiers should be unique");
			seen.push(id);
		}
	}

	#[test]
	fn test_generate_version() {
		assert_eq!(Uuid::generate().get_version_num(), 4);
	}

	#[test]
	fn test_nil_default() {
		assert_eq!(Uuid::default(), Uuid::nil());
		assert!(Uuid::nil().is_nil());
		assert_eq!(Uuid::nil().as_u128(), 0);
	}

	#[test]
	fn test_bytes_round_trip() {
		let id = Uuid::generate();
		let bytes = *id.as_bytes();
		assert_eq!(Uuid::from_bytes(bytes), id);
		assert_eq!(bytes.len(), 16);
	}

	#[test]
	fn test_u128_round_trip() {
		let id = Uuid::generate();
		assert_eq!(Uuid::from_u128(id.as_u128()), id);
	}

	#[test]
	fn test_parse_display_round_trip() {
		let id = Uuid::generate();
		let text = id.to_string();

		// Canonical hyphenated format (8-4-4-4-12)
		assert_eq!(text.len(), 36);
		assert_eq!(text.matches('-').count(), 4);

		assert_eq!(Uuid::parse_str(&text).unwrap(), id);
		assert_eq!(text.parse::<Uuid>().unwrap(), id);
	}

	#[test]
	fn test_parse_rejects_garbage() {
		let err = Uuid::parse_str("not-an-identifier").unwrap_err();
		assert!(matches!(err, Error::Format { .. }));
	}

	#[test]
	fn test_serde_round_trip() {
		let id = Uuid::generate();
		let json = serde_json::to_string(&id).unwrap();
		assert_eq!(json, format!("\"{id}\""));

		let back: Uuid = serde_json::from_str(&json).unwrap();
		assert_eq!(back, id);
	}
}
