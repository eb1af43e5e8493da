//! `package.toml` manifest.
//!
//! A deliberately minimal INI-like TOML subset: two sections,
//! `[package]` (name, version, description, license, authors) and
//! `[dependencies]` (`name = "version"` pairs). Values may be unquoted or
//! double-quoted — the unquoted form is accepted here even though full
//! TOML would reject it, which is why this parser is hand-rolled.

use indexmap::IndexMap;
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("line {line}: expected 'key = value', got '{text}'")]
    MalformedLine { line: usize, text: String },
    #[error("line {line}: unknown section '[{name}]'")]
    UnknownSection { line: usize, name: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackageSection {
    pub name: String,
    pub version: String,
    pub description: String,
    pub license: String,
    pub authors: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    pub package: PackageSection,
    pub dependencies: IndexMap<String, String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Section {
    None,
    Package,
    Dependencies,
}

impl Manifest {
    /// Creates a manifest for a new package with sensible defaults.
    pub fn new(name: &str) -> Self {
        Self {
            package: PackageSection {
                name: name.to_string(),
                version: "0.1.0".to_string(),
                description: String::new(),
                license: "MIT".to_string(),
                authors: Vec::new(),
            },
            dependencies: IndexMap::new(),
        }
    }

    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut manifest = Manifest::default();
        let mut section = Section::None;

        for (index, raw_line) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = match name.trim() {
                    "package" => Section::Package,
                    "dependencies" => Section::Dependencies,
                    other => {
                        return Err(ManifestError::UnknownSection {
                            line: line_no,
                            name: other.to_string(),
                        })
                    }
                };
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(ManifestError::MalformedLine {
                    line: line_no,
                    text: line.to_string(),
                });
            };
            let key = key.trim();
            let value = unquote(value.trim());

            match section {
                Section::Package => match key {
                    "name" => manifest.package.name = value,
                    "version" => manifest.package.version = value,
                    "description" => manifest.package.description = value,
                    "license" => manifest.package.license = value,
                    "authors" => {
                        manifest.package.authors = value
                            .split(',')
                            .map(|author| unquote(author.trim()))
                            .filter(|author| !author.is_empty())
                            .collect();
                    }
                    // Unknown package keys are tolerated.
                    _ => {}
                },
                Section::Dependencies => {
                    manifest.dependencies.insert(key.to_string(), value);
                }
                Section::None => {
                    return Err(ManifestError::MalformedLine {
                        line: line_no,
                        text: line.to_string(),
                    })
                }
            }
        }

        Ok(manifest)
    }

    pub fn add_dependency(&mut self, name: &str, version: &str) {
        self.dependencies.insert(name.to_string(), version.to_string());
    }

    /// Removes a dependency; returns whether it existed.
    pub fn remove_dependency(&mut self, name: &str) -> bool {
        self.dependencies.shift_remove(name).is_some()
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[package]")?;
        writeln!(f, "name = \"{}\"", self.package.name)?;
        writeln!(f, "version = \"{}\"", self.package.version)?;
        if !self.package.description.is_empty() {
            writeln!(f, "description = \"{}\"", self.package.description)?;
        }
        if !self.package.license.is_empty() {
            writeln!(f, "license = \"{}\"", self.package.license)?;
        }
        if !self.package.authors.is_empty() {
            writeln!(f, "authors = \"{}\"", self.package.authors.join(", "))?;
        }
        writeln!(f)?;
        writeln!(f, "[dependencies]")?;
        for (name, version) in &self.dependencies {
            writeln!(f, "{} = \"{}\"", name, version)?;
        }
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = Manifest::parse(
            "[package]\nname = \"demo\"\nversion = \"0.2.0\"\ndescription = \"A demo\"\nlicense = \"MIT\"\nauthors = \"Ada, Grace\"\n\n[dependencies]\nmathlib = \"1.0\"\nstrutil = \"0.3\"\n",
        )
        .expect("parse");
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.package.version, "0.2.0");
        assert_eq!(manifest.package.authors, vec!["Ada", "Grace"]);
        assert_eq!(manifest.dependencies.get("mathlib").unwrap(), "1.0");
        assert_eq!(manifest.dependencies.len(), 2);
    }

    #[test]
    fn test_unquoted_values_accepted() {
        let manifest =
            Manifest::parse("[package]\nname = demo\nversion = 0.1.0\n").expect("parse");
        assert_eq!(manifest.package.name, "demo");
        assert_eq!(manifest.package.version, "0.1.0");
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let manifest = Manifest::parse(
            "# top comment\n[package]\nname = \"x\" # trailing\n\n[dependencies]\n",
        )
        .expect("parse");
        assert_eq!(manifest.package.name, "x");
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Manifest::parse("[profile]\nopt = 3\n").unwrap_err();
        assert!(matches!(err, ManifestError::UnknownSection { .. }));
    }

    #[test]
    fn test_malformed_line_rejected() {
        let err = Manifest::parse("[package]\njust a line\n").unwrap_err();
        assert!(matches!(err, ManifestError::MalformedLine { .. }));
    }

    #[test]
    fn test_round_trip_through_display() {
        let mut manifest = Manifest::new("roundtrip");
        manifest.package.description = "says hi".into();
        manifest.add_dependency("mathlib", "1.2");
        let text = manifest.to_string();
        let reparsed = Manifest::parse(&text).expect("reparse");
        assert_eq!(manifest, reparsed);
    }

    #[test]
    fn test_add_and_remove_dependency() {
        let mut manifest = Manifest::new("deps");
        manifest.add_dependency("a", "1");
        assert!(manifest.remove_dependency("a"));
        assert!(!manifest.remove_dependency("a"));
        assert!(manifest.dependencies.is_empty());
    }

    #[test]
    fn test_dependency_order_preserved() {
        let manifest =
            Manifest::parse("[dependencies]\nzeta = \"1\"\nalpha = \"2\"\n").expect("parse");
        let names: Vec<_> = manifest.dependencies.keys().cloned().collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }
}
