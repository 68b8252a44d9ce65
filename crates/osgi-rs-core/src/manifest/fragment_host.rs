use serde::{Serialize, Deserialize};

use super::version_range::VersionRange;

/// Where an extension fragment attaches inside the framework.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extension {
	/// A regular fragment, attached to an ordinary host bundle.
	#[default] None,
	/// Attaches to the framework implementation itself.
	Framework,
	/// Attaches to the boot class path.
	BootClassPath,
}

/// The `Fragment-Host` link of a fragment bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentHost {
	pub symbolic_name: String,
	pub version: VersionRange,
	pub extension: Extension,
}

impl FragmentHost {
	pub fn new(symbolic_name: impl Into<String>) -> Self {
		FragmentHost {
			symbolic_name: symbolic_name.into(),
			version: VersionRange::default(),
			extension: Extension::None,
		}
	}
}

impl std::fmt::Display for FragmentHost {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.symbolic_name)?;
		if self.version != VersionRange::default() {
			write!(f, ";version=\"{}\"", self.version)?;
		}
		match self.extension {
			Extension::None => {},
			Extension::Framework => write!(f, ";extension:=framework")?,
			Extension::BootClassPath => write!(f, ";extension:=bootclasspath")?,
		}
		Ok(())
	}
}
