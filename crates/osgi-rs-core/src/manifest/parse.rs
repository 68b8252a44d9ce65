//! Reading a [`BundleInfo`] from raw manifest headers.
//!
//! The input is whatever mapping the host read out of `META-INF/MANIFEST.MF`;
//! locating and unfolding the file is the host's problem. Errors are raised
//! eagerly: a manifest either yields a complete [`BundleInfo`] or a single
//! [`InvalidBundle`](crate::Error::InvalidBundle) explaining the first
//! violation found.

use std::collections::{BTreeMap, HashSet};

use try_map::FallibleMapExt;

use super::*;
use super::header::{HeaderToken, split_clauses, split_list, lex_token, strip_quotes, starts_with_ignore_case};

impl BundleInfo {
	/// Reads a bundle manifest from a header-name to raw-value mapping.
	///
	/// Headers outside the interpreted set are kept verbatim and retrievable
	/// through [`BundleInfo::header`].
	///
	/// # Errors
	/// - [`InvalidBundle`](crate::Error::InvalidBundle) on any violation of the R4 manifest grammar.
	pub fn parse(headers: impl IntoIterator<Item = (String, String)>) -> crate::Result<BundleInfo> {
		use crate::Error::InvalidBundle;

		let headers: BTreeMap<String, String> = headers.into_iter().collect();

		fn find_header<'a>(headers: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
			headers.iter()
				.find(|(key, _)| key.len() == name.len() && starts_with_ignore_case(key, name))
				.map(|(_, value)| value.as_str())
		}

		let manifest_version = match find_header(&headers, "Bundle-ManifestVersion") {
			None => 1,
			Some(value) => value.trim().parse::<u32>().map_err(|_|
				InvalidBundle(format!("`Bundle-ManifestVersion` is not an integer: `{}`", value))
			)?,
		};

		let symbolic_name = {
			let value = find_header(&headers, "Bundle-SymbolicName")
				.ok_or_else(|| InvalidBundle("`Bundle-SymbolicName` header is missing".to_string()))?;
			let clauses = split_clauses(value);
			let first = clauses.first().and_then(|clause| clause.first())
				.ok_or_else(|| InvalidBundle("`Bundle-SymbolicName` header is empty".to_string()))?;
			match lex_token(first) {
				HeaderToken::Name(name) if !name.is_empty() => name,
				_ => return Err(InvalidBundle(format!("`Bundle-SymbolicName` does not start with a name: `{}`", value))),
			}
		};

		let version = find_header(&headers, "Bundle-Version")
			.try_map(|value| Version::parse(strip_quotes(value)))?
			.unwrap_or_default();

		let fragment_host = find_header(&headers, "Fragment-Host")
			.try_map(parse_fragment_host)?;

		let exported_packages = find_header(&headers, "Export-Package")
			.try_map(parse_exported_packages)?
			.unwrap_or_default();

		let imported_packages = find_header(&headers, "Import-Package")
			.try_map(parse_imported_packages)?
			.unwrap_or_default();

		let required_bundles = find_header(&headers, "Require-Bundle")
			.try_map(parse_required_bundles)?
			.unwrap_or_default();

		Ok(BundleInfo {
			manifest_version,
			symbolic_name,
			name: find_header(&headers, "Bundle-Name").map(str::to_string),
			description: find_header(&headers, "Bundle-Description").map(str::to_string),
			version,
			fragment_host,
			exported_packages,
			imported_packages,
			required_bundles,
			headers,
		})
	}
}

/// `true` for `optional`, `false` for `mandatory`, anything else is an error.
fn parse_resolution(value: &str) -> crate::Result<bool> {
	match value {
		"optional" => Ok(true),
		"mandatory" => Ok(false),
		_ => Err(crate::Error::InvalidBundle(format!("unknown `resolution` directive value `{}`", value))),
	}
}

/// The R4 grammar allows `version` and its deprecated `specification-version`
/// alias to appear together only when they agree.
fn reconcile_versions<T: PartialEq + Default>(version: Option<T>, specification: Option<T>) -> crate::Result<T> {
	match (version, specification) {
		(Some(version), Some(specification)) => {
			if version == specification {
				Ok(version)
			} else {
				Err(crate::Error::InvalidBundle("`version` and `specification-version` disagree".to_string()))
			}
		},
		(Some(version), None) | (None, Some(version)) => Ok(version),
		(None, None) => Ok(T::default()),
	}
}

fn parse_fragment_host(value: &str) -> crate::Result<FragmentHost> {
	use crate::Error::InvalidBundle;

	let clauses = split_clauses(value);
	if clauses.len() > 1 {
		return Err(InvalidBundle(format!("`Fragment-Host` must be a single clause, found {}", clauses.len())));
	}

	let mut host: Option<String> = None;
	let mut version = VersionRange::default();
	let mut extension = Extension::None;

	for token in clauses.first().map(Vec::as_slice).unwrap_or_default() {
		match lex_token(token) {
			HeaderToken::Name(name) => {
				if host.is_some() {
					return Err(InvalidBundle(format!("`Fragment-Host` names more than one host: `{}`", value)));
				}
				host = Some(name);
			},
			HeaderToken::Directive(name, directive_value) => {
				if name == "extension" {
					extension = match directive_value.as_str() {
						"framework" => Extension::Framework,
						"bootclasspath" => Extension::BootClassPath,
						_ => return Err(InvalidBundle(format!("unknown `extension` directive value `{}`", directive_value))),
					};
				}
			},
			HeaderToken::Parameter(name, parameter_value) => {
				if name == "bundle-version" {
					version = VersionRange::parse(&parameter_value)?;
				}
			},
		}
	}

	Ok(FragmentHost {
		symbolic_name: host.ok_or_else(|| InvalidBundle("`Fragment-Host` has no host name".to_string()))?,
		version,
		extension,
	})
}

fn parse_imported_packages(value: &str) -> crate::Result<Vec<ImportedPackage>> {
	use crate::Error::InvalidBundle;

	let mut imports = Vec::<ImportedPackage>::new();
	let mut seen = HashSet::<String>::new();

	for clause in split_clauses(value) {
		let mut names = Vec::<String>::new();
		let mut optional = false;
		let mut version: Option<VersionRange> = None;
		let mut specification_version: Option<VersionRange> = None;
		let mut bundle_symbolic_name: Option<String> = None;
		let mut bundle_version = VersionRange::default();
		let mut matching_attributes = BTreeMap::<String, String>::new();

		for token in &clause {
			match lex_token(token) {
				HeaderToken::Name(name) => names.push(name),
				HeaderToken::Directive(name, directive_value) => {
					if name == "resolution" {
						optional = parse_resolution(&directive_value)?;
					}
				},
				HeaderToken::Parameter(name, parameter_value) => match name.as_str() {
					"version" => version = Some(VersionRange::parse(&parameter_value)?),
					"specification-version" => specification_version = Some(VersionRange::parse(&parameter_value)?),
					"bundle-symbolic-name" => bundle_symbolic_name = Some(parameter_value),
					"bundle-version" => bundle_version = VersionRange::parse(&parameter_value)?,
					_ => { matching_attributes.insert(name, parameter_value); },
				},
			}
		}

		if names.is_empty() {
			return Err(InvalidBundle(format!("`Import-Package` clause has no package name: `{}`", value)));
		}

		/* The attributes of a clause apply to every package it names. */
		let version = reconcile_versions(version, specification_version)?;
		for name in names {
			if !seen.insert(name.clone()) {
				return Err(InvalidBundle(format!("duplicate import of package `{}`", name)));
			}
			imports.push(ImportedPackage {
				name,
				optional,
				version: version.clone(),
				bundle_symbolic_name: bundle_symbolic_name.clone(),
				bundle_version: bundle_version.clone(),
				matching_attributes: matching_attributes.clone(),
			});
		}
	}

	Ok(imports)
}

fn parse_exported_packages(value: &str) -> crate::Result<Vec<ExportedPackage>> {
	use crate::Error::InvalidBundle;

	let mut exports = Vec::<ExportedPackage>::new();

	for clause in split_clauses(value) {
		let mut names = Vec::<String>::new();
		let mut version: Option<Version> = None;
		let mut specification_version: Option<Version> = None;
		let mut uses = std::collections::BTreeSet::<String>::new();
		let mut mandatory_attributes = std::collections::BTreeSet::<String>::new();
		let mut included_classes = std::collections::BTreeSet::<String>::new();
		let mut excluded_classes = std::collections::BTreeSet::<String>::new();
		let mut matching_attributes = BTreeMap::<String, String>::new();

		for token in &clause {
			match lex_token(token) {
				HeaderToken::Name(name) => names.push(name),
				HeaderToken::Directive(name, directive_value) => match name.as_str() {
					"uses" => uses.extend(split_list(&directive_value)),
					"mandatory" => mandatory_attributes.extend(split_list(&directive_value)),
					"include" => included_classes.extend(split_list(&directive_value)),
					"exclude" => excluded_classes.extend(split_list(&directive_value)),
					_ => {},
				},
				HeaderToken::Parameter(name, parameter_value) => match name.as_str() {
					"version" => version = Some(Version::parse(&parameter_value)?),
					"specification-version" => specification_version = Some(Version::parse(&parameter_value)?),
					_ => { matching_attributes.insert(name, parameter_value); },
				},
			}
		}

		if names.is_empty() {
			return Err(InvalidBundle(format!("`Export-Package` clause has no package name: `{}`", value)));
		}

		let version = reconcile_versions(version, specification_version)?;
		for name in names {
			exports.push(ExportedPackage {
				name,
				version: version.clone(),
				uses: uses.clone(),
				mandatory_attributes: mandatory_attributes.clone(),
				included_classes: included_classes.clone(),
				excluded_classes: excluded_classes.clone(),
				matching_attributes: matching_attributes.clone(),
			});
		}
	}

	Ok(exports)
}

fn parse_required_bundles(value: &str) -> crate::Result<Vec<RequiredBundle>> {
	use crate::Error::InvalidBundle;

	let mut required = Vec::<RequiredBundle>::new();

	for clause in split_clauses(value) {
		let mut name: Option<String> = None;
		let mut optional = false;
		let mut version = VersionRange::default();
		let mut reexport = false;

		for token in &clause {
			match lex_token(token) {
				HeaderToken::Name(token_name) => {
					if name.is_some() {
						return Err(InvalidBundle(format!("`Require-Bundle` clause names more than one bundle: `{}`", value)));
					}
					name = Some(token_name);
				},
				HeaderToken::Directive(directive_name, directive_value) => match directive_name.as_str() {
					"visibility" => {
						reexport = match directive_value.as_str() {
							"reexport" => true,
							"private" => false,
							_ => return Err(InvalidBundle(format!("unknown `visibility` directive value `{}`", directive_value))),
						};
					},
					"resolution" => optional = parse_resolution(&directive_value)?,
					_ => {},
				},
				HeaderToken::Parameter(parameter_name, parameter_value) => {
					if parameter_name == "bundle-version" {
						version = VersionRange::parse(&parameter_value)?;
					}
				},
			}
		}

		required.push(RequiredBundle {
			symbolic_name: name.ok_or_else(|| InvalidBundle("`Require-Bundle` clause has no bundle name".to_string()))?,
			optional,
			version,
			reexport,
		});
	}

	Ok(required)
}

#[cfg(test)]
mod test {
	use super::*;

	fn manifest(entries: &[(&str, &str)]) -> Vec<(String, String)> {
		entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
	}

	#[test]
	fn minimal_manifest_defaults() {
		let bundle = BundleInfo::parse(manifest(&[("Bundle-SymbolicName", "a.b")])).unwrap();
		assert_eq!(bundle.manifest_version, 1);
		assert_eq!(bundle.symbolic_name, "a.b");
		assert_eq!(bundle.version, Version::default());
		assert!(bundle.exported_packages.is_empty());
		assert!(bundle.imported_packages.is_empty());
		assert!(bundle.required_bundles.is_empty());
		assert!(!bundle.is_fragment());
	}

	#[test]
	fn symbolic_name_is_mandatory() {
		assert!(BundleInfo::parse(manifest(&[("Bundle-Version", "1")])).is_err());
		assert!(BundleInfo::parse(manifest(&[("Bundle-SymbolicName", "")])).is_err());
	}

	#[test]
	fn symbolic_name_ignores_trailing_directives() {
		let bundle = BundleInfo::parse(manifest(&[("Bundle-SymbolicName", "a.b;singleton:=true")])).unwrap();
		assert_eq!(bundle.symbolic_name, "a.b");
	}

	#[test]
	fn manifest_version_must_be_an_integer() {
		assert!(BundleInfo::parse(manifest(&[("Bundle-SymbolicName", "a"), ("Bundle-ManifestVersion", "two")])).is_err());
		let bundle = BundleInfo::parse(manifest(&[("Bundle-SymbolicName", "a"), ("Bundle-ManifestVersion", "2")])).unwrap();
		assert_eq!(bundle.manifest_version, 2);
	}

	#[test]
	fn header_names_are_case_insensitive() {
		let bundle = BundleInfo::parse(manifest(&[("bundle-symbolicname", "a"), ("BUNDLE-VERSION", "1.2")])).unwrap();
		assert_eq!(bundle.version, Version::new(1, 2, 0, ""));
	}

	#[test]
	fn import_clause_attributes_apply_to_every_name() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;q;version=\"[1,2)\";resolution:=optional,r"),
		])).unwrap();
		assert_eq!(bundle.imported_packages.len(), 3);
		assert!(bundle.imported_packages[0].optional);
		assert!(bundle.imported_packages[1].optional);
		assert_eq!(bundle.imported_packages[0].version, VersionRange::parse("[1,2)").unwrap());
		assert_eq!(bundle.imported_packages[2].name, "r");
		assert!(!bundle.imported_packages[2].optional);
	}

	#[test]
	fn import_unknown_parameters_become_matching_attributes() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;attr1=value1;attr2=\"value2\""),
		])).unwrap();
		let import = &bundle.imported_packages[0];
		assert_eq!(import.matching_attributes.get("attr1"), Some(&"value1".to_string()));
		assert_eq!(import.matching_attributes.get("attr2"), Some(&"value2".to_string()));
	}

	#[test]
	fn import_duplicate_package_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;version=1,p"),
		])).is_err());
	}

	#[test]
	fn import_unknown_resolution_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;resolution:=sometimes"),
		])).is_err());
	}

	#[test]
	fn import_specification_version_must_agree() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;version=\"1\";specification-version=\"2\""),
		])).is_err());
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;version=\"1\";specification-version=\"1\""),
		])).unwrap();
		assert_eq!(bundle.imported_packages[0].version, VersionRange::parse("1").unwrap());
	}

	#[test]
	fn export_directives_read_quoted_lists() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Export-Package", "p;q;version=\"1.2\";uses:=\"x,y\";mandatory:=\"attr1\";attr1=value1"),
		])).unwrap();
		assert_eq!(bundle.exported_packages.len(), 2);
		let export = &bundle.exported_packages[0];
		assert_eq!(export.version, Version::new(1, 2, 0, ""));
		assert!(export.uses.contains("x") && export.uses.contains("y"));
		assert!(export.mandatory_attributes.contains("attr1"));
		assert_eq!(export.matching_attributes.get("attr1"), Some(&"value1".to_string()));
		assert_eq!(bundle.exported_packages[1].name, "q");
		assert_eq!(bundle.exported_packages[1].version, export.version);
	}

	#[test]
	fn export_same_package_twice_is_allowed() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Export-Package", "p;version=1,p;version=2"),
		])).unwrap();
		assert_eq!(bundle.exported_packages.len(), 2);
	}

	#[test]
	fn require_bundle_reads_directives() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Require-Bundle", "b;bundle-version=\"[1,2)\";visibility:=reexport,c;resolution:=optional"),
		])).unwrap();
		assert_eq!(bundle.required_bundles.len(), 2);
		assert!(bundle.required_bundles[0].reexport);
		assert_eq!(bundle.required_bundles[0].version, VersionRange::parse("[1,2)").unwrap());
		assert!(bundle.required_bundles[1].optional);
		assert!(!bundle.required_bundles[1].reexport);
	}

	#[test]
	fn require_bundle_two_names_in_one_clause_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Require-Bundle", "b;c"),
		])).is_err());
	}

	#[test]
	fn require_bundle_unknown_visibility_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Require-Bundle", "b;visibility:=global"),
		])).is_err());
	}

	#[test]
	fn fragment_host_reads_clause() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Fragment-Host", "host;bundle-version=\"[1,2)\";extension:=framework"),
		])).unwrap();
		let host = bundle.fragment_host.unwrap();
		assert_eq!(host.symbolic_name, "host");
		assert_eq!(host.version, VersionRange::parse("[1,2)").unwrap());
		assert_eq!(host.extension, Extension::Framework);
	}

	#[test]
	fn fragment_host_two_names_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Fragment-Host", "host;other"),
		])).is_err());
	}

	#[test]
	fn fragment_host_two_clauses_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Fragment-Host", "host,other"),
		])).is_err());
	}

	#[test]
	fn fragment_host_unknown_extension_fails() {
		assert!(BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Fragment-Host", "host;extension:=sidecar"),
		])).is_err());
	}

	#[test]
	fn unknown_directives_are_ignored() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Import-Package", "p;made-up:=whatever"),
			("Export-Package", "q;also-made-up:=whatever"),
		])).unwrap();
		assert_eq!(bundle.imported_packages.len(), 1);
		assert_eq!(bundle.exported_packages.len(), 1);
	}

	#[test]
	fn uninterpreted_headers_pass_through() {
		let bundle = BundleInfo::parse(manifest(&[
			("Bundle-SymbolicName", "a"),
			("Bundle-Vendor", "Example Corp"),
		])).unwrap();
		assert_eq!(bundle.header("Bundle-Vendor"), Some("Example Corp"));
	}
}
