//! Various helper functions for testing
//!
//! Fixture builders shared by the integration tests. Panicking on bad input
//! is fine here; these only ever run under `cargo test`.

use osgi_rs::BundleInfo;
use osgi_rs::BundleRegistry;
use osgi_rs::RegistryConfig;

/// Builds the header mapping a manifest reader would produce.
pub fn manifest(entries: &[(&str, &str)]) -> Vec<(String, String)> {
	entries.iter().map(|(name, value)| (name.to_string(), value.to_string())).collect()
}

/// Parses a bundle straight from header pairs.
pub fn bundle(entries: &[(&str, &str)]) -> BundleInfo {
	BundleInfo::parse(manifest(entries)).expect("failed to parse test manifest")
}

/// A registry without any system packages configured.
pub fn empty_registry() -> BundleRegistry {
	BundleRegistry::new(&RegistryConfig::default())
}

/// A registry whose system bundle exports `system_packages`, pre-loaded with
/// the given bundles in order.
pub fn registry_with(system_packages: &str, bundles: impl IntoIterator<Item = BundleInfo>) -> BundleRegistry {
	let mut registry = BundleRegistry::new(&RegistryConfig {
		system_packages: system_packages.to_string(),
		system_packages_extra: String::new(),
	});
	for bundle in bundles {
		registry.add(bundle).expect("failed to add test bundle");
	}
	registry
}
