use serde::{Serialize, Deserialize};

use super::version::Version;

/// An interval of [`Version`]s with per-bound inclusivity.
///
/// The default range is `[0.0.0, Infinite)` which admits every finite
/// version. Because [`Version::Infinite`] compares greater than itself, the
/// sentinel is never a member, whichever inclusivity the ceiling carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionRange {
	floor: Version,
	ceiling: Version,
	floor_inclusive: bool,
	ceiling_inclusive: bool,
}

impl VersionRange {
	/// # Errors
	/// - [`InvalidBundle`](crate::Error::InvalidBundle) when `floor > ceiling`.
	pub fn new(floor: Version, ceiling: Version, floor_inclusive: bool, ceiling_inclusive: bool) -> crate::Result<Self> {
		if floor > ceiling {
			return Err(crate::Error::InvalidBundle(format!("version range floor `{}` is above its ceiling `{}`", floor, ceiling)));
		}
		Ok(VersionRange { floor, ceiling, floor_inclusive, ceiling_inclusive })
	}

	/// The range `[version, Infinite)`: anything at or above `version`.
	pub fn at_least(version: Version) -> Self {
		VersionRange { floor: version, ceiling: Version::Infinite, floor_inclusive: true, ceiling_inclusive: false }
	}

	/// Reads either a bracketed interval such as `"[1.2,2)"` or a bare
	/// version `v`, which stands for `[v, Infinite)`.
	///
	/// # Errors
	/// - [`InvalidBundle`](crate::Error::InvalidBundle) on unbalanced brackets, a missing comma or an unreadable version.
	pub fn parse(s: &str) -> crate::Result<Self> {
		let s = s.trim();

		let (floor_inclusive, rest) = if let Some(rest) = s.strip_prefix('[') {
			(true, rest)
		} else if let Some(rest) = s.strip_prefix('(') {
			(false, rest)
		} else {
			return Ok(VersionRange::at_least(Version::parse(s)?));
		};

		let (ceiling_inclusive, body) = if let Some(body) = rest.strip_suffix(']') {
			(true, body)
		} else if let Some(body) = rest.strip_suffix(')') {
			(false, body)
		} else {
			return Err(crate::Error::InvalidBundle(format!("unterminated version range `{}`", s)));
		};

		let (floor, ceiling) = body.split_once(',')
			.ok_or_else(|| crate::Error::InvalidBundle(format!("version range `{}` has no ceiling", s)))?;

		VersionRange::new(Version::parse(floor)?, Version::parse(ceiling)?, floor_inclusive, ceiling_inclusive)
	}

	pub fn includes(&self, version: &Version) -> bool {
		let above_floor = if self.floor_inclusive { version >= &self.floor } else { version > &self.floor };
		let below_ceiling = if self.ceiling_inclusive { version <= &self.ceiling } else { version < &self.ceiling };
		above_floor && below_ceiling
	}

	pub fn floor(&self) -> &Version {
		&self.floor
	}

	pub fn ceiling(&self) -> &Version {
		&self.ceiling
	}
}

impl Default for VersionRange {
	fn default() -> Self {
		VersionRange::at_least(Version::default())
	}
}

impl std::fmt::Display for VersionRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.ceiling.is_infinite() && self.floor_inclusive && !self.ceiling_inclusive {
			return write!(f, "{}", self.floor);
		}
		write!(
			f,
			"{}{},{}{}",
			if self.floor_inclusive { '[' } else { '(' },
			self.floor,
			self.ceiling,
			if self.ceiling_inclusive { ']' } else { ')' },
		)
	}
}
