pub type Result<T> = std::result::Result<T, Error>;

/// Failures that halt parsing or resolution.
///
/// Missing-dependency diagnostics are *not* errors; the resolver reports them
/// as [`ResolverResult`](crate::registry::ResolverResult) values for the
/// caller to inspect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// The manifest, or a version string inside it, violates the OSGi R4 grammar.
	#[error("invalid bundle: {0}")]
	InvalidBundle(String),
	/// A structurally equal bundle is already present in the registry.
	#[error("bundle already registered: {0}")]
	AlreadyRegistered(Box<crate::manifest::BundleInfo>),
	/// The dependency walk closed on itself.
	///
	/// The path runs from the bundle that closes the cycle through every
	/// bundle on it and back to the first entry, so first and last are the
	/// same bundle.
	#[error("dependency cycle: {}", format_cycle(.0))]
	DependencyCycle(Vec<crate::manifest::BundleInfo>),
}

fn format_cycle(path: &[crate::manifest::BundleInfo]) -> String {
	path.iter().map(|b| b.symbolic_name.as_str()).collect::<Vec<_>>().join(" -> ")
}
