use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::args::{adt_path, optional_bool, optional_count, required_str};
use super::handler::AdtTool;
use crate::client::{AdtRequest, AdtTransport};
use crate::error::ToolError;
use crate::transform::{
    ancestor_path, normalize_query, object_metadata, object_path, package_node, search_response,
    source_text, version_history, where_used, AdtRoot, CanonicalResult, FALLBACK_PACKAGE,
};

const DEFAULT_MAX_RESULTS: u32 = 50;
const MAX_RESULTS_CAP: u32 = 500;
/// Package hops followed when resolving a full path.
const MAX_PACKAGE_DEPTH: usize = 16;

fn url_schema(key: &str, what: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            key: {
                "type": "string",
                "description": format!("ADT URL of the {what}, e.g. /sap/bc/adt/oo/classes/zcl_example")
            }
        },
        "required": [key]
    })
}

pub struct SearchObjects;

#[async_trait]
impl AdtTool for SearchObjects {
    fn name(&self) -> &str {
        "search_objects"
    }

    fn description(&self) -> &str {
        "Search ABAP repository objects by name. Supports * wildcards."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Name pattern, e.g. ZCL_SALES*"},
                "max_results": {"type": "integer", "description": "Maximum hits (default 50)"}
            },
            "required": ["query"]
        })
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let query = normalize_query(required_str(args, "query")?);
        if query.trim_matches('*').is_empty() {
            return Err(ToolError::invalid("query must contain more than wildcards"));
        }
        let max_results = optional_count(args, "max_results", DEFAULT_MAX_RESULTS, MAX_RESULTS_CAP)?;

        let resp = transport
            .send(
                AdtRequest::get("/sap/bc/adt/repository/informationsystem/search")
                    .query("operation", "quickSearch")
                    .query("query", query)
                    .query("maxResults", max_results.to_string())
                    .accept("application/xml"),
            )
            .await?;
        Ok(search_response(&resp.data))
    }
}

pub struct GetObjectInfo;

#[async_trait]
impl AdtTool for GetObjectInfo {
    fn name(&self) -> &str {
        "get_object_info"
    }

    fn description(&self) -> &str {
        "Read the metadata of an ABAP object: name, type, description, package and path."
    }

    fn input_schema(&self) -> Value {
        url_schema("object_url", "object")
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let url = adt_path(args, "object_url")?;
        let resp = transport
            .send(AdtRequest::get(url).accept("application/*"))
            .await?;
        Ok(object_metadata(&resp.data))
    }
}

pub struct GetObjectSource;

#[async_trait]
impl AdtTool for GetObjectSource {
    fn name(&self) -> &str {
        "get_object_source"
    }

    fn description(&self) -> &str {
        "Read the main source code of an ABAP object."
    }

    fn input_schema(&self) -> Value {
        url_schema("object_url", "object")
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let url = adt_path(args, "object_url")?;
        let source_url = if url.ends_with("/source/main") {
            url
        } else {
            format!("{url}/source/main")
        };
        let resp = transport
            .send(AdtRequest::get(source_url).accept("text/plain"))
            .await?;
        Ok(source_text(&resp.data))
    }
}

pub struct GetObjectPath;

impl GetObjectPath {
    /// Walk from the object's package up through its super packages and
    /// return the chain outermost first. A failed package lookup ends the
    /// walk with what was resolved so far.
    async fn ancestors(
        transport: &dyn AdtTransport,
        object: &Value,
    ) -> Result<Vec<Value>, ToolError> {
        let root = AdtRoot::resolve(object);
        let mut chain = vec![json!({
            "name": root.name().unwrap_or_default(),
            "type": root.attribute(&["adtcore:type", "type"]).unwrap_or_default(),
        })];

        let Some(mut package) = root.package_name() else {
            chain.push(json!({"name": FALLBACK_PACKAGE}));
            chain.reverse();
            return Ok(chain);
        };

        let mut seen = HashSet::new();
        for _ in 0..MAX_PACKAGE_DEPTH {
            if !seen.insert(package.to_ascii_uppercase()) {
                debug!(package = %package, "package cycle, stopping");
                break;
            }
            let resp = match transport
                .send(
                    AdtRequest::get(format!("/sap/bc/adt/packages/{}", package_segment(&package)))
                        .accept("application/*"),
                )
                .await
            {
                Ok(resp) => resp,
                Err(e) => {
                    warn!(package = %package, error = %e, "package lookup failed, path is partial");
                    chain.push(json!({"name": package}));
                    break;
                }
            };

            let Some(node) = package_node(&resp.data) else {
                chain.push(json!({"name": package, "type": "DEVC/K"}));
                break;
            };
            chain.push(json!({"name": node.name, "type": node.package_type}));
            match node.parent {
                Some(parent) => package = parent,
                None => break,
            }
        }

        chain.reverse();
        Ok(chain)
    }
}

/// Package names go into the URL lower-cased, namespace slashes escaped.
fn package_segment(name: &str) -> String {
    name.to_ascii_lowercase().replace('/', "%2f")
}

#[async_trait]
impl AdtTool for GetObjectPath {
    fn name(&self) -> &str {
        "get_object_path"
    }

    fn description(&self) -> &str {
        "Show where an ABAP object lives. By default 'package > object'; with full=true the whole package chain."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "object_url": {"type": "string", "description": "ADT URL of the object"},
                "full": {"type": "boolean", "description": "Resolve every super package (default false)"}
            },
            "required": ["object_url"]
        })
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let url = adt_path(args, "object_url")?;
        let full = optional_bool(args, "full")?;
        let resp = transport
            .send(AdtRequest::get(url).accept("application/*"))
            .await?;

        if !full {
            return Ok(object_path(&resp.data));
        }
        let chain = Self::ancestors(transport, &resp.data).await?;
        Ok(ancestor_path(&chain))
    }
}

pub struct FindWhereUsed;

const USAGE_REQUEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<usagereferences:usageReferenceRequest xmlns:usagereferences="http://www.sap.com/adt/ris/usageReferences">
  <usagereferences:affectedObjects/>
</usagereferences:usageReferenceRequest>"#;

#[async_trait]
impl AdtTool for FindWhereUsed {
    fn name(&self) -> &str {
        "find_where_used"
    }

    fn description(&self) -> &str {
        "List the objects that reference an ABAP object."
    }

    fn input_schema(&self) -> Value {
        url_schema("object_url", "referenced object")
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let url = adt_path(args, "object_url")?;
        let resp = transport
            .send(
                AdtRequest::post("/sap/bc/adt/repository/informationsystem/usageReferences")
                    .query("uri", url)
                    .accept("application/*")
                    .body(USAGE_REQUEST),
            )
            .await?;
        Ok(where_used(&resp.data))
    }
}

pub struct GetObjectVersions;

#[async_trait]
impl AdtTool for GetObjectVersions {
    fn name(&self) -> &str {
        "get_object_versions"
    }

    fn description(&self) -> &str {
        "List the stored versions of an object's main source."
    }

    fn input_schema(&self) -> Value {
        url_schema("object_url", "object")
    }

    async fn run(
        &self,
        transport: &dyn AdtTransport,
        args: &Value,
    ) -> Result<CanonicalResult, ToolError> {
        let url = adt_path(args, "object_url")?;
        let base = url.trim_end_matches("/source/main");
        let resp = transport
            .send(
                AdtRequest::get(format!("{base}/source/main/versions"))
                    .accept("application/atom+xml;type=feed"),
            )
            .await?;
        Ok(version_history(&resp.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::mock::MockTransport;
    use crate::transform::search::NO_RESULTS;

    fn class_response() -> Value {
        json!({
            "class:abapClass": {
                "_attributes": {"adtcore:name": "ZCL_FOO", "adtcore:type": "CLAS/OC"},
                "adtcore:packageRef": {"_attributes": {"adtcore:name": "ZPKG"}}
            }
        })
    }

    #[tokio::test]
    async fn search_normalizes_query_and_caps_results() {
        let transport = MockTransport::new().route(
            "/sap/bc/adt/repository/informationsystem/search",
            json!({"adtcore:objectReferences": {}}),
        );

        let result = SearchObjects
            .run(&transport, &json!({"query": "ZCL_.*", "max_results": 9999}))
            .await
            .unwrap();

        assert_eq!(result, CanonicalResult::Text(NO_RESULTS.into()));
        let sent = transport.sent();
        assert!(sent[0].query.contains(&("query".into(), "ZCL_*".into())));
        assert!(sent[0].query.contains(&("maxResults".into(), "500".into())));
    }

    #[tokio::test]
    async fn wildcard_only_query_is_rejected_before_fetch() {
        let transport = MockTransport::new();
        let err = SearchObjects
            .run(&transport, &json!({"query": ".*"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn source_path_is_appended_once() {
        let transport = MockTransport::new().route(
            "/sap/bc/adt/programs/programs/zreport/source/main",
            json!("\nREPORT zreport.\n"),
        );

        for url in [
            "/sap/bc/adt/programs/programs/zreport",
            "/sap/bc/adt/programs/programs/zreport/source/main",
        ] {
            let result = GetObjectSource
                .run(&transport, &json!({"object_url": url}))
                .await
                .unwrap();
            assert_eq!(result, CanonicalResult::Text("REPORT zreport.".into()));
        }
    }

    #[tokio::test]
    async fn short_path_does_not_walk_packages() {
        let transport =
            MockTransport::new().route("/sap/bc/adt/oo/classes/zcl_foo", class_response());
        let result = GetObjectPath
            .run(&transport, &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo"}))
            .await
            .unwrap();
        assert_eq!(result, CanonicalResult::Text("ZPKG > ZCL_FOO".into()));
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn full_path_follows_super_packages() {
        let transport = MockTransport::new()
            .route("/sap/bc/adt/oo/classes/zcl_foo", class_response())
            .route(
                "/sap/bc/adt/packages/zpkg",
                json!({"pak:package": {
                    "_attributes": {"adtcore:name": "ZPKG", "adtcore:type": "DEVC/K"},
                    "pak:superPackage": {"_attributes": {"adtcore:name": "ZROOT"}}
                }}),
            )
            .route(
                "/sap/bc/adt/packages/zroot",
                json!({"pak:package": {
                    "_attributes": {"adtcore:name": "ZROOT", "adtcore:type": "DEVC/K"},
                    "pak:superPackage": {}
                }}),
            );

        let result = GetObjectPath
            .run(
                &transport,
                &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo", "full": true}),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            CanonicalResult::Text("ZROOT (DEVC/K) > ZPKG (DEVC/K) > ZCL_FOO (CLAS/OC)".into())
        );
    }

    fn package(name: &str, parent: &str) -> Value {
        json!({"pak:package": {
            "_attributes": {"adtcore:name": name, "adtcore:type": "DEVC/K"},
            "pak:superPackage": {"_attributes": {"adtcore:name": parent}}
        }})
    }

    #[tokio::test]
    async fn full_path_stops_at_package_cycle() {
        let transport = MockTransport::new()
            .route("/sap/bc/adt/oo/classes/zcl_foo", class_response())
            .route("/sap/bc/adt/packages/zpkg", package("ZPKG", "ZROOT"))
            .route("/sap/bc/adt/packages/zroot", package("ZROOT", "ZPKG"));

        let result = GetObjectPath
            .run(
                &transport,
                &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo", "full": true}),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            CanonicalResult::Text("ZROOT (DEVC/K) > ZPKG (DEVC/K) > ZCL_FOO (CLAS/OC)".into())
        );
        assert_eq!(transport.sent().len(), 3);
    }

    #[tokio::test]
    async fn full_path_is_capped_in_depth() {
        let mut transport = MockTransport::new().route(
            "/sap/bc/adt/oo/classes/zcl_foo",
            json!({"class:abapClass": {
                "_attributes": {"adtcore:name": "ZCL_FOO", "adtcore:type": "CLAS/OC"},
                "adtcore:packageRef": {"_attributes": {"adtcore:name": "Z0"}}
            }}),
        );
        for i in 0..20 {
            transport = transport.route(
                &format!("/sap/bc/adt/packages/z{i}"),
                package(&format!("Z{i}"), &format!("Z{}", i + 1)),
            );
        }

        let result = GetObjectPath
            .run(
                &transport,
                &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo", "full": true}),
            )
            .await
            .unwrap();

        let CanonicalResult::Text(path) = result else {
            panic!("expected text");
        };
        assert_eq!(transport.sent().len(), 1 + MAX_PACKAGE_DEPTH);
        assert_eq!(path.split(" > ").count(), 1 + MAX_PACKAGE_DEPTH);
        assert!(path.starts_with("Z15 (DEVC/K) > "), "got: {path}");
        assert!(path.ends_with("Z0 (DEVC/K) > ZCL_FOO (CLAS/OC)"));
    }

    #[tokio::test]
    async fn failed_package_lookup_keeps_partial_path() {
        let transport = MockTransport::new()
            .route("/sap/bc/adt/oo/classes/zcl_foo", class_response())
            .route("/sap/bc/adt/packages/zpkg", package("ZPKG", "ZROOT"));

        let result = GetObjectPath
            .run(
                &transport,
                &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo", "full": true}),
            )
            .await
            .unwrap();

        assert_eq!(
            result,
            CanonicalResult::Text("ZROOT > ZPKG (DEVC/K) > ZCL_FOO (CLAS/OC)".into())
        );
    }

    #[tokio::test]
    async fn full_path_without_package_uses_tmp() {
        let transport = MockTransport::new().route(
            "/sap/bc/adt/ddic/tables/ztab",
            json!({"table:abapTable": {"_attributes": {"adtcore:name": "ZTAB", "adtcore:type": "TABL/DT"}}}),
        );
        let result = GetObjectPath
            .run(
                &transport,
                &json!({"object_url": "/sap/bc/adt/ddic/tables/ztab", "full": true}),
            )
            .await
            .unwrap();
        assert_eq!(result, CanonicalResult::Text("TMP > ZTAB (TABL/DT)".into()));
    }

    #[tokio::test]
    async fn where_used_posts_the_object_uri() {
        let transport = MockTransport::new().route(
            "/sap/bc/adt/repository/informationsystem/usageReferences",
            json!({}),
        );
        let result = FindWhereUsed
            .run(&transport, &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo"}))
            .await
            .unwrap();
        assert_eq!(result, CanonicalResult::List(vec![]));

        let sent = transport.sent();
        assert_eq!(sent[0].method, crate::client::AdtMethod::Post);
        assert!(sent[0]
            .query
            .contains(&("uri".into(), "/sap/bc/adt/oo/classes/zcl_foo".into())));
        assert!(sent[0].body.is_some());
    }

    #[tokio::test]
    async fn versions_use_the_source_feed() {
        let transport = MockTransport::new().route(
            "/sap/bc/adt/oo/classes/zcl_foo/source/main/versions",
            json!({"atom:feed": {"atom:entry": {"atom:id": {"_text": "00000"}}}}),
        );
        let result = GetObjectVersions
            .run(
                &transport,
                &json!({"object_url": "/sap/bc/adt/oo/classes/zcl_foo/source/main"}),
            )
            .await
            .unwrap();
        assert_eq!(
            result,
            CanonicalResult::List(vec![json!({"name": "00000", "type": "version"})])
        );
    }

    #[test]
    fn namespaced_packages_are_escaped() {
        assert_eq!(package_segment("/ABC/CORE"), "%2fabc%2fcore");
    }
}
