use serde::{Serialize, Deserialize};

use super::version_range::VersionRange;

/// One direct bundle dependency from a `Require-Bundle` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequiredBundle {
	pub symbolic_name: String,
	pub optional: bool,
	pub version: VersionRange,
	/// Whether the requiring bundle re-exports the required bundle's packages.
	pub reexport: bool,
}

impl RequiredBundle {
	pub fn new(symbolic_name: impl Into<String>) -> Self {
		RequiredBundle {
			symbolic_name: symbolic_name.into(),
			optional: false,
			version: VersionRange::default(),
			reexport: false,
		}
	}
}

impl std::fmt::Display for RequiredBundle {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.symbolic_name)?;
		if self.version != VersionRange::default() {
			write!(f, ";version=\"{}\"", self.version)?;
		}
		if self.optional {
			write!(f, ";resolution:=optional")?;
		}
		if self.reexport {
			write!(f, ";visibility:=reexport")?;
		}
		Ok(())
	}
}
