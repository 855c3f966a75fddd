mod common;

use common::{client_schema, node_schema, order_schema, product_schema};
use modelkit_model::{Entity, ModelConfig, ModelError, Serializer};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn order_payload(date: &str, is_valid: bool) -> Value {
    json!({
        "id": 1,
        "date": date,
        "name": "Test name",
        "is_valid": is_valid,
        "number": "123",
        "products": [
            {"id": 2, "name": "Maffin"},
            {"id": 3, "name": "Coffee"}
        ],
        "client": {
            "id": 1,
            "name": "Client1",
            "custom_array": [500, 512, 525, 640],
            "custom_object": {"key1": "value1", "key2": {"nested_key1": "nested_value"}}
        }
    })
}

// ── Output shape ─────────────────────────────────────────────────

#[test]
fn end_to_end_ingest_then_serialize() {
    let order = Entity::from_payload(
        order_schema(),
        &json!({
            "id": 1,
            "date": "2021-05-06",
            "name": "Test",
            "is_valid": true,
            "number": "123",
            "products": [{"id": 2, "name": "Maffin"}],
            "client": {"id": 1, "name": "C1"}
        }),
    );

    let serialized = Value::Object(order.serialize().unwrap());
    assert_eq!(
        serialized,
        json!({
            "id": "1",
            "name": "Test",
            "number": 123,
            "is_valid": true,
            "date": "2021-05-06T00:00:00",
            "products": [{"id": "2", "name": "Maffin"}],
            "client": {"id": "1", "name": "C1", "custom_array": [], "custom_object": {}}
        })
    );
}

#[test]
fn transform_applies_to_top_level_only() {
    let order = Entity::from_payload(order_schema(), &order_payload("2024-07-03T14:04:13", false));

    let serialized = order
        .serialize_with(|mut out| {
            let date = out
                .get("date")
                .and_then(Value::as_str)
                .map(|d| d.split('T').next().unwrap_or(d).to_string());
            out.insert("date".into(), date.map_or(Value::Null, Value::String));
            out
        })
        .unwrap();

    assert_eq!(
        Value::Object(serialized),
        json!({
            "id": "1",
            "name": "Test name",
            "number": 123,
            "is_valid": false,
            "date": "2024-07-03",
            "products": [{"id": "2", "name": "Maffin"}, {"id": "3", "name": "Coffee"}],
            "client": {
                "id": "1",
                "name": "Client1",
                "custom_array": [500, 512, 525, 640],
                "custom_object": {"key1": "value1", "key2": {"nested_key1": "nested_value"}}
            }
        })
    );
}

#[test]
fn keys_follow_declaration_order() {
    let order = Entity::from_payload(order_schema(), &order_payload("2021-05-06", true));
    let out = order.serialize().unwrap();
    let keys: Vec<&str> = out.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["id", "name", "number", "is_valid", "date", "products", "client"]
    );
}

#[test]
fn unset_fields_serialize_as_null_or_default() {
    let order = Entity::of(order_schema);
    assert_eq!(
        Value::Object(order.serialize().unwrap()),
        json!({
            "id": null,
            "name": null,
            "number": 0,
            "is_valid": false,
            "date": null,
            "products": [],
            "client": null
        })
    );
}

#[test]
fn cleared_collection_serializes_as_null() {
    let mut order = Entity::of(order_schema);
    order.set("products", json!(null)).unwrap();
    assert_eq!(order.serialize().unwrap()["products"], json!(null));
}

#[test]
fn sentinels_serialize() {
    let order = Entity::from_payload(order_schema(), &json!({"number": "abc", "date": "someday"}));
    let out = order.serialize().unwrap();
    assert_eq!(out["number"], json!(null));
    assert_eq!(out["date"], json!("Invalid date"));
}

#[test]
fn fractional_numbers_keep_fraction() {
    let order = Entity::from_payload(order_schema(), &json!({"number": "12,75"}));
    assert_eq!(order.serialize().unwrap()["number"], json!(12.75));
}

#[test]
fn pushed_entities_are_serialized() {
    let mut order = Entity::of(order_schema);
    order
        .collection_mut("products")
        .unwrap()
        .push(Entity::from_payload(product_schema(), &json!({"id": 7, "name": "Tea"})).into_ref());
    assert_eq!(
        order.serialize().unwrap()["products"],
        json!([{"id": "7", "name": "Tea"}])
    );
}

// ── Properties ───────────────────────────────────────────────────

#[test]
fn round_trip_reproduces_payload_keys() {
    let payload = json!({
        "id": "c-1",
        "name": "Client1",
        "custom_array": [1, 2],
        "custom_object": {"a": {"b": null}}
    });
    let client = Entity::from_payload(client_schema(), &payload);
    assert_eq!(Value::Object(client.serialize().unwrap()), payload);
}

#[test]
fn serialize_is_idempotent() {
    let order = Entity::from_payload(order_schema(), &order_payload("2024-07-03T14:04:13", true));
    assert_eq!(order.serialize().unwrap(), order.serialize().unwrap());
}

#[test]
fn reingesting_serialized_output_is_stable() {
    let order = Entity::from_payload(order_schema(), &order_payload("2024-07-03T14:04:13", true));
    let first = Value::Object(order.serialize().unwrap());
    let again = Entity::from_payload(order_schema(), &first);
    assert_eq!(Value::Object(again.serialize().unwrap()), first);
}

#[test]
fn shared_entity_serialized_under_each_parent() {
    let client = Entity::from_payload(client_schema(), &json!({"id": 1})).into_ref();
    let mut first = Entity::of(order_schema);
    let mut second = Entity::of(order_schema);
    first.set("client", client.clone()).unwrap();
    second.set("client", client).unwrap();
    assert_eq!(
        first.serialize().unwrap()["client"],
        second.serialize().unwrap()["client"]
    );
}

// ── serde integration ────────────────────────────────────────────

#[test]
fn serde_serialize_matches_serialize() {
    let order = Entity::from_payload(order_schema(), &order_payload("2021-05-06", true));
    let via_serde = serde_json::to_value(&order).unwrap();
    assert_eq!(via_serde, Value::Object(order.serialize().unwrap()));
    assert_eq!(
        order.to_json_string().unwrap(),
        serde_json::to_string(&order).unwrap()
    );
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn custom_date_format() {
    let order = Entity::from_payload(order_schema(), &json!({"date": "2024-07-03T14:04:13"}));
    let serializer = Serializer::new(ModelConfig {
        date_format: "%d.%m.%Y %H:%M".to_string(),
        ..ModelConfig::default()
    });
    assert_eq!(serializer.serialize(&order).unwrap()["date"], json!("03.07.2024 14:04"));
}

#[test]
fn depth_limit_allows_shallow_graphs() {
    let order = Entity::from_payload(order_schema(), &order_payload("2021-05-06", true));
    let serializer = Serializer::new(ModelConfig {
        max_depth: 1,
        ..ModelConfig::default()
    });
    assert!(serializer.serialize(&order).is_ok());

    let serializer = Serializer::new(ModelConfig {
        max_depth: 0,
        ..ModelConfig::default()
    });
    assert!(matches!(
        serializer.serialize(&order),
        Err(ModelError::DepthExceeded(0))
    ));
}

#[test]
fn cyclic_graph_fails_instead_of_overflowing() {
    let a = Entity::from_payload(node_schema(), &json!({"label": "a"})).into_ref();
    let b = Entity::from_payload(node_schema(), &json!({"label": "b"})).into_ref();
    a.borrow_mut().set("parent", b.clone()).unwrap();
    b.borrow_mut().set("parent", a.clone()).unwrap();

    let err = a.borrow().serialize().unwrap_err();
    assert!(matches!(err, ModelError::DepthExceeded(64)));

    // Break the cycle so the handles can be dropped.
    b.borrow_mut().set("parent", Value::Null).unwrap();
}

#[test]
fn self_assignment_while_borrowed_is_reported() {
    let node = Entity::of(node_schema).into_ref();
    let err = node.borrow_mut().set("parent", node.clone()).unwrap_err();
    assert!(matches!(err, ModelError::EntityBorrowed));
}
