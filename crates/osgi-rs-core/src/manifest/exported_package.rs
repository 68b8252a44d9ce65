use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Deserialize};

use super::version::Version;

/// One package capability from an `Export-Package` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExportedPackage {
	pub name: String,
	pub version: Version,
	/// Packages this export's API is entangled with. Parsed but not enforced.
	pub uses: BTreeSet<String>,
	/// Attribute names an import must specify for this export to match it.
	pub mandatory_attributes: BTreeSet<String>,
	pub included_classes: BTreeSet<String>,
	pub excluded_classes: BTreeSet<String>,
	pub matching_attributes: BTreeMap<String, String>,
}

impl ExportedPackage {
	pub fn new(name: impl Into<String>) -> Self {
		ExportedPackage {
			name: name.into(),
			version: Version::default(),
			uses: BTreeSet::new(),
			mandatory_attributes: BTreeSet::new(),
			included_classes: BTreeSet::new(),
			excluded_classes: BTreeSet::new(),
			matching_attributes: BTreeMap::new(),
		}
	}
}

fn comma_joined(set: &BTreeSet<String>) -> String {
	set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

impl std::fmt::Display for ExportedPackage {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name)?;
		if self.version != Version::default() {
			write!(f, ";version=\"{}\"", self.version)?;
		}
		if !self.uses.is_empty() {
			write!(f, ";uses:=\"{}\"", comma_joined(&self.uses))?;
		}
		if !self.mandatory_attributes.is_empty() {
			write!(f, ";mandatory:={}", comma_joined(&self.mandatory_attributes))?;
		}
		if !self.included_classes.is_empty() {
			write!(f, ";include:={}", comma_joined(&self.included_classes))?;
		}
		if !self.excluded_classes.is_empty() {
			write!(f, ";exclude:={}", comma_joined(&self.excluded_classes))?;
		}
		for (key, value) in &self.matching_attributes {
			write!(f, ";{}=\"{}\"", key, value)?;
		}
		Ok(())
	}
}
