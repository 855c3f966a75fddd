//! Declarative entity models for modelkit.
//!
//! An entity type is described once by an [`EntitySchema`]: an ordered
//! registry of fields, each built by a factory function:
//! - [`attr`] / [`attr_with`]: a typed scalar or JSON value ([`Attr`])
//! - [`belongs_to`]: a single related entity ([`BelongsTo`])
//! - [`has_many`]: an ordered collection of related entities ([`HasMany`])
//! - [`plain`]: an uncoerced passthrough value
//!
//! An [`Entity`] instantiates one container per declared field. It ingests
//! loosely-typed payloads with [`Entity::push_payload`], mapping field names
//! to payload keys through the schema's [`KeyStyle`], and turns the object
//! graph back into plain JSON with [`Entity::serialize`].
//!
//! Entities are single-threaded: related entities are shared through
//! [`EntityRef`] (`Rc<RefCell<Entity>>`) so one instance can be attached
//! to several parents without copying.

mod attr;
mod config;
mod entity;
mod error;
mod relation;
mod schema;
mod serializer;

pub use attr::{Attr, AttrParams};
pub use config::ModelConfig;
pub use entity::{Entity, Field, FieldValue, Input};
pub use error::{ModelError, ModelResult};
pub use relation::{BelongsTo, EntityRef, HasMany, RelationInput};
pub use schema::{
    EntitySchema, EntitySchemaBuilder, FieldDef, SchemaFn, attr, attr_with, belongs_to, has_many,
    plain,
};
pub use serializer::Serializer;

pub use modelkit_types::{AttrType, AttrValue, KeyStyle};
