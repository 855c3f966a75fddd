//! Relation containers: to-one ([`BelongsTo`]) and to-many ([`HasMany`]).

use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::schema::{EntitySchema, SchemaFn};
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Shared handle to a related entity.
///
/// Relations hold references, not copies: an entity built elsewhere can be
/// attached to several parents and mutations through any handle are seen
/// by all of them.
pub type EntityRef = Rc<RefCell<Entity>>;

/// One element assigned to a relation.
#[derive(Debug, Clone)]
pub enum RelationInput {
    /// An existing entity, stored by reference when its type fits.
    Instance(EntityRef),
    /// A raw payload fragment, ingested into a new related entity.
    Payload(Value),
}

impl From<EntityRef> for RelationInput {
    fn from(entity: EntityRef) -> Self {
        Self::Instance(entity)
    }
}

impl From<Entity> for RelationInput {
    fn from(entity: Entity) -> Self {
        Self::Instance(entity.into_ref())
    }
}

impl From<Value> for RelationInput {
    fn from(payload: Value) -> Self {
        Self::Payload(payload)
    }
}

/// Holds at most one related entity.
#[derive(Clone)]
pub struct BelongsTo {
    related: SchemaFn,
    value: Option<EntityRef>,
}

impl BelongsTo {
    pub fn new(related: SchemaFn) -> Self {
        Self {
            related,
            value: None,
        }
    }

    /// Schema of the entity type this relation accepts.
    pub fn related_schema(&self) -> Arc<EntitySchema> {
        (self.related)()
    }

    pub fn value(&self) -> Option<&EntityRef> {
        self.value.as_ref()
    }

    /// Assigns the related entity.
    ///
    /// `None` (or a null payload) clears the relation. An instance of an
    /// unrelated type is not rejected: a new related entity is built from
    /// its serialized payload instead.
    pub fn set_value(&mut self, input: Option<RelationInput>) -> ModelResult<()> {
        self.value = match input {
            None => None,
            Some(input) => resolve(self.related, input)?,
        };
        Ok(())
    }

    /// Assigns a raw payload fragment. Null clears the relation.
    pub fn set_payload(&mut self, payload: Value) {
        self.value = build_from_payload(self.related, payload);
    }
}

impl fmt::Debug for BelongsTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BelongsTo")
            .field("related", &self.related_schema().name())
            .field("is_set", &self.value.is_some())
            .finish()
    }
}

/// Holds an ordered collection of related entities.
///
/// A new container starts with an empty collection. The collection returned
/// by [`value_mut`](Self::value_mut) is live: entities pushed into it are
/// part of the relation.
#[derive(Clone)]
pub struct HasMany {
    related: SchemaFn,
    value: Option<Vec<EntityRef>>,
}

impl HasMany {
    pub fn new(related: SchemaFn) -> Self {
        Self {
            related,
            value: Some(Vec::new()),
        }
    }

    /// Schema of the entity type this relation accepts.
    pub fn related_schema(&self) -> Arc<EntitySchema> {
        (self.related)()
    }

    pub fn value(&self) -> Option<&[EntityRef]> {
        self.value.as_deref()
    }

    pub fn value_mut(&mut self) -> Option<&mut Vec<EntityRef>> {
        self.value.as_mut()
    }

    /// Replaces the collection, keeping input order.
    ///
    /// Each element is stored by reference when it is an instance of the
    /// related type and built from its payload otherwise. Null payload
    /// elements are skipped.
    pub fn set_value(&mut self, input: Option<Vec<RelationInput>>) -> ModelResult<()> {
        let Some(items) = input else {
            self.value = None;
            return Ok(());
        };

        let mut collection = Vec::with_capacity(items.len());
        for item in items {
            if let Some(entity) = resolve(self.related, item)? {
                collection.push(entity);
            }
        }
        self.value = Some(collection);
        Ok(())
    }

    /// Replaces the collection from a raw payload.
    ///
    /// Null clears the relation. An array contributes one entity per
    /// non-null element; any other value is read as a one-element list.
    pub fn set_payload(&mut self, payload: Value) {
        let items = match payload {
            Value::Null => {
                self.value = None;
                return;
            }
            Value::Array(items) => items,
            single => vec![single],
        };

        self.value = Some(
            items
                .into_iter()
                .filter_map(|item| build_from_payload(self.related, item))
                .collect(),
        );
    }
}

impl fmt::Debug for HasMany {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HasMany")
            .field("related", &self.related_schema().name())
            .field("len", &self.value.as_ref().map(Vec::len))
            .finish()
    }
}

fn resolve(related: SchemaFn, input: RelationInput) -> ModelResult<Option<EntityRef>> {
    match input {
        RelationInput::Payload(payload) => Ok(build_from_payload(related, payload)),
        RelationInput::Instance(entity) => adopt_instance(related, entity).map(Some),
    }
}

fn build_from_payload(related: SchemaFn, payload: Value) -> Option<EntityRef> {
    if payload.is_null() {
        trace!("null relation payload, nothing to build");
        return None;
    }
    let schema = related();
    debug!(entity_type = schema.name(), "building related entity from payload");
    Some(Entity::from_payload(schema, &payload).into_ref())
}

fn adopt_instance(related: SchemaFn, entity: EntityRef) -> ModelResult<EntityRef> {
    let schema = related();
    let payload = {
        let borrowed = entity.try_borrow().map_err(|_| ModelError::EntityBorrowed)?;
        if borrowed.is_instance_of(&schema) {
            drop(borrowed);
            return Ok(entity);
        }
        warn!(
            expected = schema.name(),
            actual = borrowed.schema().name(),
            "relation received an unrelated entity type, rebuilding from its payload"
        );
        Value::Object(borrowed.serialize()?)
    };
    Ok(Entity::from_payload(schema, &payload).into_ref())
}
