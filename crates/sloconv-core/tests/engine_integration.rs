//! Integration tests for the conversion engine
//!
//! These drive [`Engine`] through a small profile that mirrors how a real
//! destination schema is wired: shared and kind-specific tables, defer
//! groups, and an extension map with an override channel.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sloconv_core::{
    flatten, setter, ConversionProfile, Converter, Engine, Error, ExtensionBridge, Path,
    PathOrdering, Result, Rules,
};
use std::sync::Arc;

struct ItemsProfile {
    rules: Arc<Rules>,
    ordering: PathOrdering,
    extensions: Arc<ExtensionBridge>,
}

impl ItemsProfile {
    /// `defer_fan_out` controls whether the fan-out rule runs after the items are populated
    fn new(defer_fan_out: bool) -> Self {
        let extensions = Arc::new(ExtensionBridge::new("meta.ext", "src.io/", "dst.io/"));
        let common = Rules::new()
            .with("version", Converter::constant(json!("dst/v1")))
            .with("kind", Converter::Identity)
            .with("meta.name", Converter::Identity)
            .with("meta.ext", extensions.override_converter());
        let items = Rules::new()
            .with("spec.items.#.id", Converter::indexed("out.{}.id"))
            .with("spec.items.#.secret", Converter::Discard)
            .with("spec.label", Converter::rename("title"))
            .with(
                "spec.default",
                Converter::custom(|doc, _, value| setter::set(doc, &Path::parse("out.#.default"), value)),
            );
        let mut ordering = PathOrdering::new();
        if defer_fan_out {
            ordering = ordering.defer("spec.default");
        }
        Self {
            rules: Arc::new(Rules::merge([&common, &items])),
            ordering: ordering.defer("meta.ext"),
            extensions,
        }
    }
}

impl ConversionProfile for ItemsProfile {
    fn rules(&self, version: &str, kind: &str) -> Result<Option<Arc<Rules>>> {
        match (version, kind) {
            ("src/v1", "Items") => Ok(Some(Arc::clone(&self.rules))),
            ("src/v1", "Note") => Ok(None),
            ("src/v1", other) => Err(Error::UnsupportedKind {
                version: version.to_string(),
                kind: other.to_string(),
            }),
            _ => Err(Error::UnsupportedVersion {
                version: version.to_string(),
            }),
        }
    }

    fn ordering(&self) -> &PathOrdering {
        &self.ordering
    }

    fn extensions(&self) -> &ExtensionBridge {
        &self.extensions
    }

    fn discriminators(&self, object: &Value) -> (String, String) {
        let field = |name: &str| object[name].as_str().unwrap_or_default().to_string();
        (field("version"), field("kind"))
    }

    fn object_name(&self, object: &Value) -> Option<String> {
        object["meta"]["name"].as_str().map(str::to_string)
    }
}

fn items_object() -> Value {
    json!({
        "version": "src/v1",
        "kind": "Items",
        "meta": {
            "name": "sample",
            "ext": {"dst.io/out.#.flag": true, "team": "sre"}
        },
        "spec": {
            "label": "Sample",
            "default": 5,
            "items": [
                {"id": "a", "secret": "x"},
                {"id": "b", "secret": "y", "note": "keep me"}
            ]
        }
    })
}

#[test]
fn test_full_conversion() {
    let engine = Engine::new(ItemsProfile::new(true));
    let converted = engine.convert_object(&items_object()).unwrap().unwrap();
    assert_eq!(
        converted,
        json!({
            "version": "dst/v1",
            "kind": "Items",
            "title": "Sample",
            "meta": {
                "name": "sample",
                "ext": {"team": "sre", "src.io/spec.items.1.note": "keep me"}
            },
            "out": [
                {"id": "a", "default": 5, "flag": true},
                {"id": "b", "default": 5, "flag": true}
            ]
        })
    );
}

#[test]
fn test_fan_out_needs_deferral() {
    let deferred = Engine::new(ItemsProfile::new(true))
        .convert_object(&items_object())
        .unwrap()
        .unwrap();
    assert_eq!(deferred["out"][1]["default"], json!(5));

    // "spec.default" sorts before "spec.items" without a defer group, so the
    // fan-out runs against a missing array and writes nothing
    let undeferred = Engine::new(ItemsProfile::new(false))
        .convert_object(&items_object())
        .unwrap()
        .unwrap();
    assert!(undeferred["out"][0].get("default").is_none());
}

#[test]
fn test_unmapped_leaf_adds_exactly_one_extension_entry() {
    let engine = Engine::new(ItemsProfile::new(true));
    let mut object = items_object();
    let baseline = engine.convert_object(&object).unwrap().unwrap();
    object["spec"]["unknown"] = json!({"deep": [1]});
    let converted = engine.convert_object(&object).unwrap().unwrap();

    let before = flatten(&baseline);
    let after = flatten(&converted);
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(
        converted["meta"]["ext"]["src.io/spec.unknown.deep.0"],
        json!(1)
    );
}

#[test]
fn test_identity_and_rename_preserve_values() {
    let engine = Engine::new(ItemsProfile::new(true));
    let object = items_object();
    let converted = engine.convert_object(&object).unwrap().unwrap();
    assert_eq!(converted["meta"]["name"], object["meta"]["name"]);
    assert_eq!(converted["title"], object["spec"]["label"]);
    assert_eq!(converted["out"][0]["id"], object["spec"]["items"][0]["id"]);
}

#[test]
fn test_batch_skips_and_fails_fast() {
    let engine = Engine::new(ItemsProfile::new(true));
    let note = json!({"version": "src/v1", "kind": "Note"});
    let converted = engine.convert_all(&[note.clone(), items_object(), note]).unwrap();
    assert_eq!(converted.len(), 1);

    let unknown = json!({"version": "src/v1", "kind": "Widget", "meta": {"name": "w"}});
    let err = engine
        .convert_all(&[items_object(), unknown, json!({"version": "src/v9"})])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to convert object #1 (w): Unsupported kind Widget for version src/v1"
    );
}

#[test]
fn test_write_conflict_aborts_object() {
    let engine = Engine::new(ItemsProfile::new(true));
    let mut object = items_object();
    object["meta"]["ext"] = json!({"dst.io/out.name": "conflict"});
    let err = engine.convert_object(&object).unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
}
