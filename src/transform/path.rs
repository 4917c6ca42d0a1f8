//! Two distinct path renderings.
//!
//! [`object_path`] names one level only (`package > object`) from a single
//! object response. [`ancestor_path`] renders an already-resolved ancestor
//! chain. The single-level form never walks the package tree.

use serde_json::Value;

use super::{field, field_or_empty, AdtRoot, CanonicalResult};

/// Package token used when an object response names no package.
pub const FALLBACK_PACKAGE: &str = "TMP";

const NAME: &[&str] = &["name", "ObjectName", "adtcore:name"];
const TYPE: &[&str] = &["type", "ObjectType", "adtcore:type"];

/// `"<package or TMP> > <object name>"` for a single object response.
pub fn object_path(raw: &Value) -> CanonicalResult {
    CanonicalResult::Text(single_level_path(&AdtRoot::resolve(raw)))
}

pub(crate) fn single_level_path(root: &AdtRoot<'_>) -> String {
    let package = root
        .package_name()
        .unwrap_or_else(|| FALLBACK_PACKAGE.to_string());
    let name = root.name().unwrap_or_default();
    format!("{package} > {name}")
}

/// Render an ordered ancestor chain (outermost first) as
/// `name (type) > name (type) > ...`.
pub fn ancestor_path(ancestors: &[Value]) -> CanonicalResult {
    let segments: Vec<String> = ancestors
        .iter()
        .filter_map(|node| {
            let name = field(node, NAME)?;
            let kind = field_or_empty(node, TYPE);
            Some(if kind.is_empty() {
                name
            } else {
                format!("{name} ({kind})")
            })
        })
        .collect();

    CanonicalResult::Text(segments.join(" > "))
}

/// One hop of the package tree, read from a `pak:package` response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageNode {
    pub name: String,
    pub package_type: String,
    pub parent: Option<String>,
}

/// Read a package response. `None` when the body is not a package document.
pub fn package_node(raw: &Value) -> Option<PackageNode> {
    let node = raw.get("pak:package")?;
    let name = field(node, &["adtcore:name", "name"])?;
    let package_type = field(node, &["adtcore:type", "type"]).unwrap_or_else(|| "DEVC/K".into());
    let parent = node
        .get("pak:superPackage")
        .and_then(|sup| field(sup, &["adtcore:name", "name"]))
        .filter(|p| !p.eq_ignore_ascii_case(&name));

    Some(PackageNode {
        name,
        package_type,
        parent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_without_package_falls_back_to_tmp() {
        let raw = json!({"table:abapTable": {"_attributes": {"adtcore:name": "ZTAB"}}});
        assert_eq!(object_path(&raw), CanonicalResult::Text("TMP > ZTAB".into()));
    }

    #[test]
    fn unknown_root_still_renders() {
        let raw = json!({"whatever": 1});
        assert_eq!(object_path(&raw), CanonicalResult::Text("TMP > ".into()));
    }

    #[test]
    fn class_path_uses_package_ref() {
        let raw = json!({
            "class:abapClass": {
                "_attributes": {"adtcore:name": "ZCL_FOO"},
                "adtcore:packageRef": {"_attributes": {"adtcore:name": "ZPKG_CORE"}}
            }
        });
        assert_eq!(
            object_path(&raw),
            CanonicalResult::Text("ZPKG_CORE > ZCL_FOO".into())
        );
    }

    #[test]
    fn ancestor_chain_is_joined() {
        let chain = vec![
            json!({"name": "ZROOT", "type": "DEVC/K"}),
            json!({"ObjectName": "ZPKG", "ObjectType": "DEVC/K"}),
            json!({"name": "ZCL_FOO", "type": "CLAS/OC"}),
        ];
        assert_eq!(
            ancestor_path(&chain),
            CanonicalResult::Text("ZROOT (DEVC/K) > ZPKG (DEVC/K) > ZCL_FOO (CLAS/OC)".into())
        );
    }

    #[test]
    fn ancestor_without_type_is_bare() {
        let chain = vec![json!({"name": "ZROOT"}), json!({"name": "ZX", "type": "PROG/P"})];
        assert_eq!(
            ancestor_path(&chain),
            CanonicalResult::Text("ZROOT > ZX (PROG/P)".into())
        );
    }

    #[test]
    fn package_node_reads_super_package() {
        let raw = json!({
            "pak:package": {
                "_attributes": {"adtcore:name": "ZPKG", "adtcore:type": "DEVC/K"},
                "pak:superPackage": {"_attributes": {"adtcore:name": "ZROOT"}}
            }
        });
        assert_eq!(
            package_node(&raw),
            Some(PackageNode {
                name: "ZPKG".into(),
                package_type: "DEVC/K".into(),
                parent: Some("ZROOT".into()),
            })
        );
    }

    #[test]
    fn top_level_package_has_no_parent() {
        let raw = json!({
            "pak:package": {
                "_attributes": {"adtcore:name": "ZROOT"},
                "pak:superPackage": {}
            }
        });
        assert_eq!(package_node(&raw).and_then(|p| p.parent), None);
    }
}
