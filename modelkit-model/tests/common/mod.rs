//! Shared entity types for model tests.

#![allow(dead_code)]

use modelkit_model::{
    AttrParams, AttrType, EntitySchema, KeyStyle, attr, attr_with, belongs_to, has_many, plain,
};
use serde_json::json;
use std::sync::{Arc, OnceLock};

pub fn product_schema() -> Arc<EntitySchema> {
    static SCHEMA: OnceLock<Arc<EntitySchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            EntitySchema::builder("Product")
                .field("name", attr(AttrType::String))
                .build()
        })
        .clone()
}

pub fn client_schema() -> Arc<EntitySchema> {
    static SCHEMA: OnceLock<Arc<EntitySchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            EntitySchema::builder("Client")
                .field("name", attr(AttrType::String))
                .field("customArray", attr_with(AttrType::Json, AttrParams::with_default(json!([]))))
                .field("customObject", attr_with(AttrType::Json, AttrParams::with_default(json!({}))))
                .build()
        })
        .clone()
}

pub fn order_schema() -> Arc<EntitySchema> {
    static SCHEMA: OnceLock<Arc<EntitySchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            EntitySchema::builder("Order")
                .field("name", attr(AttrType::String))
                .field("number", attr_with(AttrType::Number, AttrParams::with_default(0)))
                .field("isValid", attr_with(AttrType::Boolean, AttrParams::with_default(false)))
                .field("date", attr(AttrType::Date))
                .field("products", has_many(product_schema))
                .field("client", belongs_to(client_schema))
                .build()
        })
        .clone()
}

/// A client subtype: inherits every client field and adds its own.
pub fn vip_client_schema() -> Arc<EntitySchema> {
    static SCHEMA: OnceLock<Arc<EntitySchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            EntitySchema::builder("VipClient")
                .extends(client_schema)
                .field("discountRate", attr(AttrType::Number))
                .build()
        })
        .clone()
}

/// Self-referencing type used to build cyclic graphs.
pub fn node_schema() -> Arc<EntitySchema> {
    static SCHEMA: OnceLock<Arc<EntitySchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            EntitySchema::builder("Node")
                .field("label", attr(AttrType::String))
                .field("parent", belongs_to(node_schema))
                .field("children", has_many(node_schema))
                .build()
        })
        .clone()
}

/// Payload keys equal field names.
pub fn camel_payload_schema() -> Arc<EntitySchema> {
    static SCHEMA: OnceLock<Arc<EntitySchema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            EntitySchema::builder("CamelPayload")
                .key_style(KeyStyle::Verbatim)
                .field("firstName", attr(AttrType::String))
                .field("extra", plain(json!(null)))
                .build()
        })
        .clone()
}
