use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

use super::version_range::VersionRange;

/// One package requirement from an `Import-Package` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportedPackage {
	pub name: String,
	pub optional: bool,
	pub version: VersionRange,
	/// When set, only exports owned by a bundle with this symbolic name match.
	pub bundle_symbolic_name: Option<String>,
	pub bundle_version: VersionRange,
	/// Arbitrary `name=value` attributes the matching export must carry.
	pub matching_attributes: BTreeMap<String, String>,
}

impl ImportedPackage {
	pub fn new(name: impl Into<String>) -> Self {
		ImportedPackage {
			name: name.into(),
			optional: false,
			version: VersionRange::default(),
			bundle_symbolic_name: None,
			bundle_version: VersionRange::default(),
			matching_attributes: BTreeMap::new(),
		}
	}
}

impl std::fmt::Display for ImportedPackage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name)?;
		if self.optional {
			write!(f, ";resolution:=optional")?;
		}
		if self.version != VersionRange::default() {
			write!(f, ";version=\"{}\"", self.version)?;
		}
		if let Some(symbolic_name) = &self.bundle_symbolic_name {
			write!(f, ";bundle-symbolic-name={}", symbolic_name)?;
		}
		if self.bundle_version != VersionRange::default() {
			write!(f, ";bundle-version=\"{}\"", self.bundle_version)?;
		}
		for (key, value) in &self.matching_attributes {
			write!(f, ";{}=\"{}\"", key, value)?;
		}
		Ok(())
	}
}
