//! An indexed, in-memory store of bundles and their resolution state.
//!
//! The registry owns every bundle added to it and answers the lookups the
//! resolver is built on. It is single-owner: nothing in here synchronizes,
//! callers that share a registry across threads must serialize access
//! themselves.

use std::collections::HashMap;

use tracing::debug;

use crate::manifest::*;

mod resolver;
pub use resolver::ResolverResult;

/// Identifies a bundle inside one [`BundleRegistry`].
///
/// Assigned once at [`BundleRegistry::add`], monotonically increasing in
/// insertion order, never reused. Separate from bundle identity, which is
/// structural.
pub type BundleId = usize;

/// Symbolic name of the synthetic bundle every registry is seeded with.
pub const SYSTEM_BUNDLE_SYMBOLIC_NAME: &str = "system.bundle";

/// Host-supplied configuration, read once at registry construction. Changing
/// the source of these values afterwards does not affect an existing registry.
#[derive(Debug, Default, Clone)]
pub struct RegistryConfig {
	/// Comma-separated packages exported by the system bundle.
	pub system_packages: String,
	/// Appended to `system_packages` when non-empty.
	pub system_packages_extra: String,
}

#[derive(Debug)]
struct RegistryEntry {
	bundle: BundleInfo,
	resolved: bool,
}

/// The bundle store and dependency index.
#[derive(Debug)]
pub struct BundleRegistry {
	/// Slot per bundle; the slot index is the bundle's [`BundleId`].
	entries: Vec<RegistryEntry>,
	by_symbolic_name: HashMap<String, Vec<BundleId>>,
	/// Package name to `(owning bundle, index into its exported_packages)`.
	by_exported_package: HashMap<String, Vec<(BundleId, usize)>>,
	/// Host symbolic name to the fragments naming it.
	by_fragment_host: HashMap<String, Vec<BundleId>>,
}

impl BundleRegistry {
	/// Creates a registry seeded with the synthetic system bundle (ID 0)
	/// exporting the packages named by `config`.
	pub fn new(config: &RegistryConfig) -> Self {
		let mut registry = BundleRegistry {
			entries: Vec::new(),
			by_symbolic_name: HashMap::new(),
			by_exported_package: HashMap::new(),
			by_fragment_host: HashMap::new(),
		};
		registry.insert(system_bundle(config));
		registry
	}

	/// Adds a bundle and assigns its ID.
	///
	/// # Errors
	/// - [`AlreadyRegistered`](crate::Error::AlreadyRegistered) when a structurally equal bundle is present.
	pub fn add(&mut self, bundle: BundleInfo) -> crate::Result<BundleId> {
		if self.entries.iter().any(|entry| entry.bundle == bundle) {
			return Err(crate::Error::AlreadyRegistered(Box::new(bundle)));
		}
		Ok(self.insert(bundle))
	}

	fn insert(&mut self, bundle: BundleInfo) -> BundleId {
		let id = self.entries.len();
		self.by_symbolic_name.entry(bundle.symbolic_name.clone()).or_default().push(id);
		for (index, export) in bundle.exported_packages.iter().enumerate() {
			self.by_exported_package.entry(export.name.clone()).or_default().push((id, index));
		}
		if let Some(host) = &bundle.fragment_host {
			self.by_fragment_host.entry(host.symbolic_name.clone()).or_default().push(id);
		}
		debug!(bundle = %bundle, id, "bundle registered");
		self.entries.push(RegistryEntry { bundle, resolved: false });
		id
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Every registered bundle, in insertion (ID) order.
	pub fn bundles(&self) -> impl Iterator<Item = &BundleInfo> {
		self.entries.iter().map(|entry| &entry.bundle)
	}

	pub fn get_by_id(&self, id: BundleId) -> Option<&BundleInfo> {
		self.entries.get(id).map(|entry| &entry.bundle)
	}

	/// The ID of a registered bundle, by structural equality.
	pub fn get_id(&self, bundle: &BundleInfo) -> Option<BundleId> {
		self.entries.iter().position(|entry| &entry.bundle == bundle)
	}

	/// Whether the registry currently records `bundle` as resolved. A bundle
	/// that was never added is unresolved by definition.
	pub fn is_resolved(&self, bundle: &BundleInfo) -> bool {
		self.get_id(bundle).map(|id| self.entries[id].resolved).unwrap_or(false)
	}

	/// Bundles with the given symbolic name and a version inside `range`,
	/// best candidate first.
	pub fn find_bundles(&self, symbolic_name: &str, range: &VersionRange) -> Vec<&BundleInfo> {
		let mut ids: Vec<BundleId> = self.by_symbolic_name.get(symbolic_name)
			.map(|ids| ids.iter().copied().filter(|id| range.includes(&self.entries[*id].bundle.version)).collect())
			.unwrap_or_default();
		self.sort_by_priority(&mut ids);
		ids.into_iter().map(|id| &self.entries[id].bundle).collect()
	}

	pub fn find_bundle(&self, symbolic_name: &str, range: &VersionRange) -> Option<&BundleInfo> {
		self.find_bundles(symbolic_name, range).into_iter().next()
	}

	/// Candidates satisfying a `Require-Bundle` requirement, best first.
	pub fn find_bundles_for_required(&self, required: &RequiredBundle) -> Vec<&BundleInfo> {
		let mut ids: Vec<BundleId> = self.by_symbolic_name.get(&required.symbolic_name)
			.map(|ids| ids.iter().copied().filter(|id| does_bundle_satisfy_required(&self.entries[*id].bundle, required)).collect())
			.unwrap_or_default();
		self.sort_by_priority(&mut ids);
		ids.into_iter().map(|id| &self.entries[id].bundle).collect()
	}

	pub fn find_bundle_for_required(&self, required: &RequiredBundle) -> Option<&BundleInfo> {
		self.find_bundles_for_required(required).into_iter().next()
	}

	/// Candidate hosts for a `Fragment-Host` requirement, best first.
	pub fn find_bundles_for_fragment(&self, host: &FragmentHost) -> Vec<&BundleInfo> {
		self.find_bundles(&host.symbolic_name, &host.version)
	}

	pub fn find_bundle_for_fragment(&self, host: &FragmentHost) -> Option<&BundleInfo> {
		self.find_bundles_for_fragment(host).into_iter().next()
	}

	/// Bundles owning an export that satisfies `import`, best first. A bundle
	/// appears once however many of its exports match.
	pub fn find_bundles_for_import(&self, import: &ImportedPackage) -> Vec<&BundleInfo> {
		let mut ids = Vec::<BundleId>::new();
		for (id, export_index) in self.by_exported_package.get(&import.name).map(Vec::as_slice).unwrap_or_default() {
			let entry = &self.entries[*id];
			let export = &entry.bundle.exported_packages[*export_index];
			if does_export_satisfy_import(import, export, &entry.bundle) && !ids.contains(id) {
				ids.push(*id);
			}
		}
		self.sort_by_priority(&mut ids);
		ids.into_iter().map(|id| &self.entries[id].bundle).collect()
	}

	pub fn find_bundle_for_import(&self, import: &ImportedPackage) -> Option<&BundleInfo> {
		self.find_bundles_for_import(import).into_iter().next()
	}

	/// Fragments whose host requirement `bundle` satisfies, best first.
	pub fn find_fragments(&self, bundle: &BundleInfo) -> Vec<&BundleInfo> {
		let mut ids: Vec<BundleId> = self.by_fragment_host.get(&bundle.symbolic_name)
			.map(|ids| ids.iter().copied().filter(|id| does_fragment_attach_to(&self.entries[*id].bundle, bundle)).collect())
			.unwrap_or_default();
		self.sort_by_priority(&mut ids);
		ids.into_iter().map(|id| &self.entries[id].bundle).collect()
	}

	/// Resolved above unresolved, then higher version, then lower ID.
	fn sort_by_priority(&self, ids: &mut [BundleId]) {
		ids.sort_by(|a, b| {
			let entry_a = &self.entries[*a];
			let entry_b = &self.entries[*b];
			entry_b.resolved.cmp(&entry_a.resolved)
				.then_with(|| entry_b.bundle.version.cmp(&entry_a.bundle.version))
				.then_with(|| a.cmp(b))
		});
	}
}

fn system_bundle(config: &RegistryConfig) -> BundleInfo {
	let mut packages = config.system_packages.clone();
	if !config.system_packages_extra.is_empty() {
		if packages.is_empty() {
			packages = config.system_packages_extra.clone();
		} else {
			packages = format!("{},{}", packages, config.system_packages_extra);
		}
	}

	let mut bundle = BundleInfo::new(SYSTEM_BUNDLE_SYMBOLIC_NAME, Version::default());
	bundle.manifest_version = 2;
	bundle.exported_packages = packages.split(',')
		.map(str::trim)
		.filter(|name| !name.is_empty())
		.map(ExportedPackage::new)
		.collect();
	bundle
}

/// Whether `bundle` satisfies a `Require-Bundle` requirement.
pub fn does_bundle_satisfy_required(bundle: &BundleInfo, required: &RequiredBundle) -> bool {
	bundle.symbolic_name == required.symbolic_name && required.version.includes(&bundle.version)
}

/// Whether `export`, owned by `owner`, satisfies `import`.
pub fn does_export_satisfy_import(import: &ImportedPackage, export: &ExportedPackage, owner: &BundleInfo) -> bool {
	if import.name != export.name {
		return false;
	}
	if !import.version.includes(&export.version) {
		return false;
	}
	if let Some(symbolic_name) = &import.bundle_symbolic_name {
		if symbolic_name != &owner.symbolic_name {
			return false;
		}
	}
	if !import.bundle_version.includes(&owner.version) {
		return false;
	}
	/* Every attribute the export marks mandatory must be specified by the import. */
	for mandatory in &export.mandatory_attributes {
		if !import.matching_attributes.contains_key(mandatory) {
			return false;
		}
	}
	/* Every attribute the import specifies must be carried, verbatim, by the export. */
	for (key, value) in &import.matching_attributes {
		if export.matching_attributes.get(key) != Some(value) {
			return false;
		}
	}
	true
}

/// Whether `fragment` names `host` (at its current version) as its host.
pub fn does_fragment_attach_to(fragment: &BundleInfo, host: &BundleInfo) -> bool {
	match &fragment.fragment_host {
		Some(fragment_host) => {
			fragment_host.symbolic_name == host.symbolic_name && fragment_host.version.includes(&host.version)
		},
		None => false,
	}
}
