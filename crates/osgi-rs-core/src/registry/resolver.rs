//! Transitive dependency calculation and the resolve state machine.
//!
//! Resolution works in three steps: build one *wire* per dependency a bundle
//! declares, pick at most one candidate per wire against the registry's
//! priority order, then walk the chosen candidates recursively, carrying the
//! path from the root so a revisited bundle surfaces as a
//! [`DependencyCycle`](crate::Error::DependencyCycle) instead of looping.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use super::*;

/// One transitively reached dependency, or one unsatisfiable requirement.
///
/// The `Missing*` variants are diagnostics, not errors: they travel in the
/// returned set and never unwind. Sets of results deduplicate structurally,
/// so reaching the same bundle through two dependency chains reports it once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolverResult {
	/// A dependency the registry currently records as resolved.
	Resolved(BundleInfo),
	/// A dependency that is present but not (yet) resolved.
	Unresolved(BundleInfo),
	/// No candidate satisfies a mandatory `Require-Bundle`.
	MissingRequiredBundle { owner: BundleInfo, requirement: RequiredBundle },
	/// No candidate satisfies a mandatory `Import-Package`.
	MissingImportedPackage { owner: BundleInfo, requirement: ImportedPackage },
	/// No candidate hosts a fragment.
	MissingFragmentHost { owner: BundleInfo, requirement: FragmentHost },
}

impl ResolverResult {
	/// Whether this is one of the missing-dependency diagnostics.
	pub fn is_missing(&self) -> bool {
		matches!(
			self,
			ResolverResult::MissingRequiredBundle { .. }
				| ResolverResult::MissingImportedPackage { .. }
				| ResolverResult::MissingFragmentHost { .. }
		)
	}

	/// The reached bundle, for the two non-missing variants.
	pub fn bundle(&self) -> Option<&BundleInfo> {
		match self {
			ResolverResult::Resolved(bundle) | ResolverResult::Unresolved(bundle) => Some(bundle),
			_ => None,
		}
	}
}

impl std::fmt::Display for ResolverResult {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ResolverResult::Resolved(bundle) => write!(f, "resolved {}", bundle),
			ResolverResult::Unresolved(bundle) => write!(f, "unresolved {}", bundle),
			ResolverResult::MissingRequiredBundle { owner, requirement } => write!(f, "{} requires missing bundle {}", owner, requirement),
			ResolverResult::MissingImportedPackage { owner, requirement } => write!(f, "{} imports missing package {}", owner, requirement),
			ResolverResult::MissingFragmentHost { owner, requirement } => write!(f, "{} names missing host {}", owner, requirement),
		}
	}
}

/// One declared dependency paired with its candidate set, best candidate first.
enum Wire<'a> {
	Required(&'a RequiredBundle, Vec<&'a BundleInfo>),
	Import(&'a ImportedPackage, Vec<&'a BundleInfo>),
	Fragment(&'a FragmentHost, Vec<&'a BundleInfo>),
}

impl BundleRegistry {
	/// Every bundle `bundle` transitively depends on, as
	/// [`Resolved`](ResolverResult::Resolved)/[`Unresolved`](ResolverResult::Unresolved)
	/// entries, plus a `Missing*` entry per unsatisfiable mandatory
	/// requirement. Optional requirements are skipped outright unless
	/// `include_optional` is set, and are never reported missing.
	///
	/// `bundle` itself does not have to be registered.
	///
	/// # Errors
	/// - [`DependencyCycle`](crate::Error::DependencyCycle) when the walk reaches a bundle already on the path to it.
	pub fn calculate_required_bundles(&self, bundle: &BundleInfo, include_optional: bool) -> crate::Result<HashSet<ResolverResult>> {
		let mut path = Vec::<BundleInfo>::new();
		let mut cache = HashMap::<BundleId, HashSet<ResolverResult>>::new();
		self.explore(bundle, include_optional, &mut path, &mut cache)
	}

	fn explore(
		&self,
		bundle: &BundleInfo,
		include_optional: bool,
		path: &mut Vec<BundleInfo>,
		cache: &mut HashMap<BundleId, HashSet<ResolverResult>>,
	) -> crate::Result<HashSet<ResolverResult>> {
		if let Some(id) = self.get_id(bundle) {
			if let Some(explored) = cache.get(&id) {
				return Ok(explored.clone());
			}
		}

		path.push(bundle.clone());
		let mut results = HashSet::<ResolverResult>::new();

		for wire in self.build_wires(bundle, include_optional) {
			let Some(result) = self.classify_wire(bundle, &wire) else { continue };
			trace!(owner = %bundle, result = %result, "wire classified");

			match result.bundle().cloned() {
				/* A missing dependency ends its branch; there is nothing to walk into. */
				None => {
					results.insert(result);
				},
				Some(dependency) => {
					if let Some(first) = path.iter().position(|visited| visited == &dependency) {
						let mut cycle: Vec<BundleInfo> = path[first..].to_vec();
						cycle.push(dependency);
						return Err(crate::Error::DependencyCycle(cycle));
					}
					results.insert(result);
					results.extend(self.explore(&dependency, include_optional, path, cache)?);
				},
			}
		}

		path.pop();
		if let Some(id) = self.get_id(bundle) {
			cache.insert(id, results.clone());
		}
		Ok(results)
	}

	fn build_wires<'a>(&'a self, bundle: &'a BundleInfo, include_optional: bool) -> Vec<Wire<'a>> {
		let mut wires = Vec::<Wire>::new();
		for required in &bundle.required_bundles {
			if required.optional && !include_optional {
				continue;
			}
			wires.push(Wire::Required(required, self.find_bundles_for_required(required)));
		}
		for import in &bundle.imported_packages {
			if import.optional && !include_optional {
				continue;
			}
			wires.push(Wire::Import(import, self.find_bundles_for_import(import)));
		}
		if let Some(host) = &bundle.fragment_host {
			wires.push(Wire::Fragment(host, self.find_bundles_for_fragment(host)));
		}
		wires
	}

	/// Chooses at most one result for a wire.
	///
	/// The owner itself never becomes its own dependency: a candidate equal
	/// to the owner is skipped, and a wire whose only candidates were the
	/// owner is satisfied internally (a bundle may import what it exports).
	fn classify_wire(&self, owner: &BundleInfo, wire: &Wire) -> Option<ResolverResult> {
		fn first_external<'a>(candidates: &[&'a BundleInfo], owner: &BundleInfo) -> Option<&'a BundleInfo> {
			candidates.iter().copied().find(|candidate| *candidate != owner)
		}

		match wire {
			Wire::Required(required, candidates) => match first_external(candidates, owner) {
				Some(candidate) => Some(self.state_of(candidate)),
				None if !candidates.is_empty() => None,
				None if required.optional => None,
				None => Some(ResolverResult::MissingRequiredBundle {
					owner: owner.clone(),
					requirement: (*required).clone(),
				}),
			},
			Wire::Import(import, candidates) => match first_external(candidates, owner) {
				Some(candidate) => Some(self.state_of(candidate)),
				None if !candidates.is_empty() => None,
				None if import.optional => None,
				None => Some(ResolverResult::MissingImportedPackage {
					owner: owner.clone(),
					requirement: (*import).clone(),
				}),
			},
			Wire::Fragment(host, candidates) => match first_external(candidates, owner) {
				Some(candidate) => Some(self.state_of(candidate)),
				None if !candidates.is_empty() => None,
				None => Some(ResolverResult::MissingFragmentHost {
					owner: owner.clone(),
					requirement: (*host).clone(),
				}),
			},
		}
	}

	fn state_of(&self, bundle: &BundleInfo) -> ResolverResult {
		if self.is_resolved(bundle) {
			ResolverResult::Resolved(bundle.clone())
		} else {
			ResolverResult::Unresolved(bundle.clone())
		}
	}

	/// Attempts to resolve one bundle, returning the missing-dependency
	/// diagnostics that prevented it (empty on success).
	///
	/// A bundle already recorded as resolved returns an empty set without
	/// re-walking its dependencies. A bundle that is not in the registry is
	/// checked but never inserted, and no state is recorded for it.
	///
	/// # Errors
	/// - [`DependencyCycle`](crate::Error::DependencyCycle), as for [`calculate_required_bundles`](BundleRegistry::calculate_required_bundles).
	pub fn resolve_bundle(&mut self, bundle: &BundleInfo) -> crate::Result<HashSet<ResolverResult>> {
		if self.is_resolved(bundle) {
			return Ok(HashSet::new());
		}

		let results = self.calculate_required_bundles(bundle, false)?;
		let errors: HashSet<ResolverResult> = results.into_iter().filter(ResolverResult::is_missing).collect();

		if errors.is_empty() {
			if let Some(id) = self.get_id(bundle) {
				self.entries[id].resolved = true;
				debug!(bundle = %bundle, "bundle resolved");
			}
		} else {
			debug!(bundle = %bundle, missing = errors.len(), "bundle left unresolved");
		}

		Ok(errors)
	}

	/// Attempts to resolve every registered bundle, in insertion order,
	/// returning the union of their missing-dependency diagnostics.
	///
	/// Re-running is monotonic: a resolved bundle stays resolved, and bundles
	/// added since the last run can allow previously failed bundles through.
	///
	/// # Errors
	/// - [`DependencyCycle`](crate::Error::DependencyCycle), as for [`calculate_required_bundles`](BundleRegistry::calculate_required_bundles).
	pub fn resolve_bundles(&mut self) -> crate::Result<HashSet<ResolverResult>> {
		let mut errors = HashSet::<ResolverResult>::new();
		for id in 0..self.entries.len() {
			let bundle = self.entries[id].bundle.clone();
			errors.extend(self.resolve_bundle(&bundle)?);
		}
		Ok(errors)
	}
}
