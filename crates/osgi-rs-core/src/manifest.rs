//! Various types associated with bundle manifests.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

pub mod version;
pub mod version_range;
pub mod header;

mod imported_package;
mod exported_package;
mod required_bundle;
mod fragment_host;
mod parse;

pub use version::Version;
pub use version_range::VersionRange;
pub use imported_package::ImportedPackage;
pub use exported_package::ExportedPackage;
pub use required_bundle::RequiredBundle;
pub use fragment_host::FragmentHost;
pub use fragment_host::Extension;

/// The structured form of one bundle manifest.
///
/// Two bundles are the same bundle exactly when every field matches; the
/// registry rejects structural duplicates and otherwise tells equal-named
/// bundles apart by the numeric ID it assigns at add time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleInfo {
	/// From `Bundle-ManifestVersion`; `1` when the header is absent.
	pub manifest_version: u32,
	pub symbolic_name: String,
	pub name: Option<String>,
	pub description: Option<String>,
	pub version: Version,
	pub fragment_host: Option<FragmentHost>,
	pub exported_packages: Vec<ExportedPackage>,
	pub imported_packages: Vec<ImportedPackage>,
	pub required_bundles: Vec<RequiredBundle>,
	/// Every header as supplied, for pass-through lookups of headers this
	/// model doesn't interpret.
	pub headers: BTreeMap<String, String>,
}

impl BundleInfo {
	pub fn new(symbolic_name: impl Into<String>, version: Version) -> Self {
		BundleInfo {
			manifest_version: 1,
			symbolic_name: symbolic_name.into(),
			name: None,
			description: None,
			version,
			fragment_host: None,
			exported_packages: Vec::new(),
			imported_packages: Vec::new(),
			required_bundles: Vec::new(),
			headers: BTreeMap::new(),
		}
	}

	/// Looks up a raw header value. Header names compare ASCII-case-insensitively.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.iter()
			.find(|(key, _)| key.len() == name.len() && header::starts_with_ignore_case(key, name))
			.map(|(_, value)| value.as_str())
	}

	pub fn is_fragment(&self) -> bool {
		self.fragment_host.is_some()
	}
}

impl std::fmt::Display for BundleInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.symbolic_name, self.version)
	}
}
