//! Field annotation parsing and per-type matching.
//!
//! An annotation is the text of a `#[fieldmap("...")]` attribute:
//!
//! ```text
//! <path>[,types<rule[|rule...]>]
//! ```
//!
//! `<path>` is a dot separated list of foreign field names, where a trailing
//! `[0]` on a segment marks traversal through the first element of a
//! collection. `->` (or `→`) as the whole path dismisses path inheritance and
//! `+` as the whole path defers to per-type paths. Each `rule` is `TypeName`
//! or `TypeName:override.path`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::errors::MapError;

/// Path marker telling a record field not to contribute a path segment.
pub const DISMISS_NESTED: &str = "->";
/// Alternate spelling of [`DISMISS_NESTED`].
pub const DISMISS_NESTED_ALT: &str = "→";
/// Path marker deferring to the per-type override paths.
pub const MULTI_TYPE: &str = "+";

const PATH_SPLIT: char = '.';
const OPTION_SPLIT: char = ',';
const TYPES_SPLIT: char = '|';
const TYPES_PATH_SPLIT: char = ':';

static TYPES_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^types<([^>]+)>$").expect("types option pattern is valid"));
static FIRST_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z0-9_]+)\[0\]$").expect("first element pattern is valid"));

/// One segment of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    name: String,
    first_element: bool,
}

impl PathSegment {
    pub fn parse(raw: &str) -> Self {
        match FIRST_ELEMENT.captures(raw).and_then(|caps| caps.get(1)) {
            Some(name) => Self {
                name: name.as_str().to_string(),
                first_element: true,
            },
            None => Self {
                name: raw.to_string(),
                first_element: false,
            },
        }
    }

    /// Field name with any `[0]` marker stripped.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the segment was written with the `[0]` marker.
    pub fn is_first_element(&self) -> bool {
        self.first_element
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first_element {
            write!(f, "{}[0]", self.name)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Ordered path of foreign field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        Self {
            segments: raw.split(PATH_SPLIT).map(PathSegment::parse).collect(),
        }
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Single-segment `->` path.
    pub fn is_dismiss(&self) -> bool {
        self.is_single(|name| name == DISMISS_NESTED || name == DISMISS_NESTED_ALT)
    }

    /// Single-segment `+` path.
    pub fn is_multi_type(&self) -> bool {
        self.is_single(|name| name == MULTI_TYPE)
    }

    /// `self` followed by `child`.
    pub fn joined(&self, child: &FieldPath) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        Self { segments }
    }

    fn is_single(&self, predicate: impl Fn(&str) -> bool) -> bool {
        match self.segments.as_slice() {
            [only] => !only.first_element && predicate(&only.name),
            _ => false,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `types<...>` entry restricting a field to one foreign root type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeMatchRule {
    type_name: String,
    path: Option<FieldPath>,
}

impl TypeMatchRule {
    pub fn new(type_name: impl Into<String>, path: Option<FieldPath>) -> Self {
        Self {
            type_name: type_name.into(),
            path,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Override path used when this rule matches.
    pub fn path(&self) -> Option<&FieldPath> {
        self.path.as_ref()
    }
}

/// Parsed form of a field's annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldAnnotation {
    path: FieldPath,
    rules: Vec<TypeMatchRule>,
    skip: bool,
    target_type: Option<&'static str>,
}

impl FieldAnnotation {
    /// Parses raw annotation text. Absent or empty text yields a skipped
    /// annotation. Option clauses that are not a well formed `types<...>`
    /// are ignored.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Self::skipped();
        };

        let mut clauses = raw.split(OPTION_SPLIT);
        let path = FieldPath::parse(clauses.next().unwrap_or_default());
        let mut rules = Vec::new();
        for clause in clauses {
            if let Some(entries) = TYPES_OPTION.captures(clause).and_then(|caps| caps.get(1)) {
                parse_type_rules(entries.as_str(), &mut rules);
            }
        }

        Self {
            path,
            rules,
            skip: false,
            target_type: None,
        }
    }

    pub fn skipped() -> Self {
        Self {
            skip: true,
            ..Self::default()
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn rules(&self) -> &[TypeMatchRule] {
        &self.rules
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Type name of the resolved foreign field, once the target is known.
    pub fn target_type(&self) -> Option<&'static str> {
        self.target_type
    }

    /// Resolves the annotation for one foreign root type.
    ///
    /// Without rules the annotation applies unconditionally. With rules, a
    /// rule naming `foreign_root` must exist, otherwise the returned
    /// annotation is skipped. A matching rule with an override path replaces
    /// the primary path, which must then be exactly `+`.
    pub fn resolve_for(&self, foreign_root: &str, field: &'static str) -> Result<Self, MapError> {
        if self.skip || self.rules.is_empty() {
            return Ok(self.clone());
        }

        let Some(rule) = self.rules.iter().find(|rule| rule.type_name == foreign_root) else {
            tracing::trace!(field, foreign_root, "field filtered out by type rules");
            return Ok(Self {
                skip: true,
                ..self.clone()
            });
        };

        match &rule.path {
            Some(_) if !self.path.is_multi_type() => Err(MapError::InvalidPerTypePath { field }),
            Some(path) => Ok(Self {
                path: path.clone(),
                ..self.clone()
            }),
            None => Ok(self.clone()),
        }
    }

    pub(crate) fn with_path(self, path: FieldPath) -> Self {
        Self { path, ..self }
    }

    pub(crate) fn with_target_type(self, target_type: Option<&'static str>) -> Self {
        Self { target_type, ..self }
    }
}

fn parse_type_rules(entries: &str, rules: &mut Vec<TypeMatchRule>) {
    for entry in entries.split(TYPES_SPLIT) {
        let mut parts = entry.split(TYPES_PATH_SPLIT);
        let type_name = parts.next().unwrap_or_default();
        let path = parts.next().map(FieldPath::parse);
        rules.push(TypeMatchRule::new(type_name, path));
    }
}
