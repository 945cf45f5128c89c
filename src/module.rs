//! Module resolution boundary and interpreter configuration.
//!
//! Resolving a `req name;` to an actual program is out of scope for the
//! core: the evaluator only knows about the [`ModuleLoader`] trait.
//! Embedders supply a loader; tests use an in-memory one.

use crate::ast::Program;
use std::fmt;

#[derive(Debug, Clone)]
pub enum ModuleLoadError {
	NotFound(String),
	InvalidModule(String),
}

impl fmt::Display for ModuleLoadError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ModuleLoadError::NotFound(name) => write!(f, "module '{name}' not found"),
			ModuleLoadError::InvalidModule(name) => write!(f, "module '{name}' failed to parse"),
		}
	}
}

pub trait ModuleLoader {
	fn load(&mut self, name_or_url: &str) -> Result<Program, ModuleLoadError>;
}

/// A loader that never resolves anything; the default for `Interpreter::new`
/// when an embedder has no modules to offer.
pub struct NullModuleLoader;

impl ModuleLoader for NullModuleLoader {
	fn load(&mut self, name_or_url: &str) -> Result<Program, ModuleLoadError> {
		Err(ModuleLoadError::NotFound(name_or_url.to_string()))
	}
}

/// `vMAJOR[.MINOR[.PATCH]]`, numeric-component comparison only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version {
	pub major: u32,
	pub minor: u32,
	pub patch: u32,
}

impl Version {
	pub fn new(major: u32, minor: u32, patch: u32) -> Self {
		Version { major, minor, patch }
	}

	/// Parses `v1`, `v1.2`, or `v1.2.3`. Missing components default to 0.
	pub fn parse(text: &str) -> Option<Version> {
		let text = text.strip_prefix('v')?;
		let mut parts = text.split('.');
		let major = parts.next()?.parse().ok()?;
		let minor = parts.next().map(|p| p.parse().ok()).unwrap_or(Some(0))?;
		let patch = parts.next().map(|p| p.parse().ok()).unwrap_or(Some(0))?;
		if parts.next().is_some() {
			return None;
		}
		Some(Version::new(major, minor, patch))
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
	}
}

/// Checks a `req` version constraint against the host interpreter version.
/// `constraint` is the raw text reassembled by the parser, e.g. `"v1.2"`,
/// `"+v1"`, `"-v2.0"`, `"v1 - v2.3"`.
pub fn satisfies(constraint: &str, host: Version) -> bool {
	let constraint = constraint.trim();
	if let Some(rest) = constraint.strip_prefix('+') {
		return Version::parse(rest).is_some_and(|v| host >= v);
	}
	if let Some(rest) = constraint.strip_prefix('-') {
		return Version::parse(rest).is_some_and(|v| host <= v);
	}
	if let Some((lo, hi)) = constraint.split_once(" - ") {
		return match (Version::parse(lo.trim()), Version::parse(hi.trim())) {
			(Some(lo), Some(hi)) => host >= lo && host <= hi,
			_ => false,
		};
	}
	Version::parse(constraint).is_some_and(|v| v == host)
}

#[derive(Debug, Clone, Copy)]
pub struct InterpreterConfig {
	pub max_depth: usize,
	pub host_version: Version,
	pub tracing_enabled: bool,
}

impl Default for InterpreterConfig {
	fn default() -> Self {
		InterpreterConfig {
			max_depth: 2048,
			host_version: Version::new(0, 1, 0),
			tracing_enabled: true,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_partial_versions() {
		assert_eq!(Version::parse("v1"), Some(Version::new(1, 0, 0)));
		assert_eq!(Version::parse("v1.2"), Some(Version::new(1, 2, 0)));
		assert_eq!(Version::parse("v1.2.3"), Some(Version::new(1, 2, 3)));
		assert_eq!(Version::parse("1.2"), None);
	}

	#[test]
	fn constraint_prefixes() {
		let host = Version::new(1, 5, 0);
		assert!(satisfies("+v1", host));
		assert!(satisfies("+v1.5", host));
		assert!(!satisfies("+v2", host));
		assert!(satisfies("-v2", host));
		assert!(!satisfies("-v1.0", host));
		assert!(satisfies("v1 - v2", host));
		assert!(satisfies("v1.5", host));
		assert!(!satisfies("v1.4", host));
	}
}
