use serde::{Serialize, Deserialize};

/// An OSGi bundle or package version.
///
/// Ordering is lexicographic over `(major, minor, micro, qualifier)` with the
/// qualifier compared by byte value. [`Version::Infinite`] compares strictly
/// greater than every version *including itself*; range membership relies on
/// this to keep the sentinel out of `[v, Infinite)` style ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
	Finite {
		major: u32,
		minor: u32,
		micro: u32,
		qualifier: String,
	},
	/// Upper bound sentinel. Never produced by [`Version::parse`].
	Infinite,
}

impl Version {
	pub fn new(major: u32, minor: u32, micro: u32, qualifier: impl Into<String>) -> Self {
		Version::Finite { major, minor, micro, qualifier: qualifier.into() }
	}

	/// Reads a dotted version string such as `"1.2.3.beta"`.
	///
	/// Absent segments default to `0` or the empty qualifier. Everything after
	/// the third dot is the qualifier, so qualifiers may themselves contain
	/// dots.
	///
	/// # Errors
	/// - [`InvalidBundle`](crate::Error::InvalidBundle) when a numeric segment doesn't read as a non-negative integer.
	pub fn parse(s: &str) -> crate::Result<Self> {
		let s = s.trim();
		let mut segments = s.splitn(4, '.');

		fn numeric(segment: Option<&str>, whole: &str) -> crate::Result<u32> {
			match segment {
				None => Ok(0),
				Some(segment) => segment.trim().parse::<u32>().map_err(|_|
					crate::Error::InvalidBundle(format!("invalid version segment `{}` in `{}`", segment, whole))
				),
			}
		}

		Ok(Version::Finite {
			major: numeric(segments.next(), s)?,
			minor: numeric(segments.next(), s)?,
			micro: numeric(segments.next(), s)?,
			qualifier: segments.next().unwrap_or("").trim().to_string(),
		})
	}

	pub fn is_infinite(&self) -> bool {
		matches!(self, Version::Infinite)
	}
}

impl Default for Version {
	fn default() -> Self {
		Version::new(0, 0, 0, "")
	}
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		match (self, other) {
			/* The sentinel sits above everything, itself included. */
			(Version::Infinite, _) => std::cmp::Ordering::Greater,
			(Version::Finite { .. }, Version::Infinite) => std::cmp::Ordering::Less,
			(
				Version::Finite { major, minor, micro, qualifier },
				Version::Finite { major: other_major, minor: other_minor, micro: other_micro, qualifier: other_qualifier },
			) => {
				major.cmp(other_major)
					.then_with(|| minor.cmp(other_minor))
					.then_with(|| micro.cmp(other_micro))
					.then_with(|| qualifier.as_bytes().cmp(other_qualifier.as_bytes()))
			},
		}
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::fmt::Display for Version {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Version::Infinite => write!(f, "infinite"),
			Version::Finite { major, minor, micro, qualifier } => {
				if !qualifier.is_empty() {
					write!(f, "{}.{}.{}.{}", major, minor, micro, qualifier)
				} else if *micro != 0 {
					write!(f, "{}.{}.{}", major, minor, micro)
				} else if *minor != 0 {
					write!(f, "{}.{}", major, minor)
				} else {
					write!(f, "{}", major)
				}
			},
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn version_orders_numerically() { assert!(Version::parse("1.2.4").unwrap() < Version::parse("1.2.10").unwrap()) }
	#[test] fn version_absent_segments_default() { assert_eq!(Version::parse("1.2").unwrap(), Version::new(1, 2, 0, "")) }
	#[test] fn version_qualifier_breaks_ties() { assert!(Version::new(1, 0, 0, "a") < Version::new(1, 0, 0, "b")) }
	#[test] fn version_without_qualifier_is_lt() { assert!(Version::new(1, 0, 0, "") < Version::new(1, 0, 0, "a")) }
	#[test] fn version_default_is_smallest() { assert!(Version::default() <= Version::parse("0.0.0").unwrap()) }
	#[test] fn version_infinite_above_everything() { assert!(Version::new(u32::MAX, 0, 0, "") < Version::Infinite) }
	#[test] fn version_infinite_above_itself() { assert!(Version::Infinite > Version::Infinite) }
	#[test] fn version_non_numeric_segment_fails() { assert!(Version::parse("1.x.3").is_err()) }
	#[test] fn version_negative_segment_fails() { assert!(Version::parse("-1.0.0").is_err()) }
	#[test] fn version_dotted_qualifier_is_kept() { assert_eq!(Version::parse("1.2.3.a.b").unwrap(), Version::new(1, 2, 3, "a.b")) }
	#[test] fn version_display_omits_trailing_zeroes() { assert_eq!(Version::new(2, 0, 0, "").to_string(), "2") }
	#[test] fn version_display_keeps_inner_zeroes() { assert_eq!(Version::new(1, 0, 3, "").to_string(), "1.0.3") }
	#[test] fn version_display_keeps_qualifier() { assert_eq!(Version::new(1, 2, 3, "something").to_string(), "1.2.3.something") }

	#[test]
	fn version_display_round_trips() {
		for v in [Version::new(0, 0, 0, ""), Version::new(2, 0, 0, ""), Version::new(1, 2, 0, ""), Version::new(1, 0, 3, "rc1")] {
			assert_eq!(Version::parse(&v.to_string()).unwrap(), v);
		}
	}
}
