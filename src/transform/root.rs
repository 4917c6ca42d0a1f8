use serde_json::{Map, Value};

use super::field;
use crate::xml::ATTRIBUTES_KEY;

/// Artifact kinds ADT tags as distinct document roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Class,
    MainObject,
    Program,
    Table,
}

impl RootKind {
    /// Probe order. The first tag present wins.
    pub const PRIORITY: [RootKind; 4] = [
        RootKind::Class,
        RootKind::MainObject,
        RootKind::Program,
        RootKind::Table,
    ];

    pub fn tag(self) -> &'static str {
        match self {
            RootKind::Class => "class:abapClass",
            RootKind::MainObject => "adtcore:mainObject",
            RootKind::Program => "program:abapProgram",
            RootKind::Table => "table:abapTable",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RootKind::Class => "class",
            RootKind::MainObject => "object",
            RootKind::Program => "program",
            RootKind::Table => "table",
        }
    }
}

/// The resolved document root of an object response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdtRoot<'a> {
    Known { kind: RootKind, node: &'a Value },
    Unknown,
}

static EMPTY: Value = Value::Null;

impl<'a> AdtRoot<'a> {
    pub fn resolve(raw: &'a Value) -> Self {
        RootKind::PRIORITY
            .iter()
            .find_map(|kind| {
                raw.get(kind.tag())
                    .filter(|node| node.is_object())
                    .map(|node| AdtRoot::Known { kind: *kind, node })
            })
            .unwrap_or(AdtRoot::Unknown)
    }

    pub fn kind(&self) -> Option<RootKind> {
        match *self {
            AdtRoot::Known { kind, .. } => Some(kind),
            AdtRoot::Unknown => None,
        }
    }

    /// The root element, or an empty placeholder when nothing matched.
    pub fn node(&self) -> &'a Value {
        match *self {
            AdtRoot::Known { node, .. } => node,
            AdtRoot::Unknown => &EMPTY,
        }
    }

    pub fn attributes(&self) -> Option<&'a Map<String, Value>> {
        self.node().get(ATTRIBUTES_KEY).and_then(Value::as_object)
    }

    pub fn attribute(&self, aliases: &[&str]) -> Option<String> {
        field(self.node(), aliases)
    }

    pub fn name(&self) -> Option<String> {
        self.attribute(&["adtcore:name", "name"])
    }

    /// Name of the package the object belongs to, from `adtcore:packageRef`.
    pub fn package_name(&self) -> Option<String> {
        self.node()
            .get("adtcore:packageRef")
            .and_then(|pkg| field(pkg, &["adtcore:name", "name"]))
    }
}
