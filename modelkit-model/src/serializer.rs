//! Entity graph to plain JSON.

use crate::config::ModelConfig;
use crate::entity::{Entity, Field};
use crate::error::{ModelError, ModelResult};
use crate::relation::EntityRef;
use serde_json::{Map, Value};
use tracing::debug;

/// Turns entities into JSON objects keyed by payload key.
///
/// Fields are written in declaration order. Related entities are
/// serialized recursively; the recursion depth is capped by
/// [`ModelConfig::max_depth`] so that a cyclic graph fails with
/// [`ModelError::DepthExceeded`] instead of exhausting the stack.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    config: ModelConfig,
}

impl Serializer {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn serialize(&self, entity: &Entity) -> ModelResult<Map<String, Value>> {
        debug!(entity_type = entity.schema().name(), "serializing entity graph");
        self.serialize_entity(entity, 0)
    }

    /// Serializes `entity` and returns `transform` applied to the result.
    /// Only the top-level mapping is passed to `transform`.
    pub fn serialize_with<F>(&self, entity: &Entity, transform: F) -> ModelResult<Map<String, Value>>
    where
        F: FnOnce(Map<String, Value>) -> Map<String, Value>,
    {
        self.serialize(entity).map(transform)
    }

    fn serialize_entity(&self, entity: &Entity, depth: usize) -> ModelResult<Map<String, Value>> {
        if depth > self.config.max_depth {
            return Err(ModelError::DepthExceeded(self.config.max_depth));
        }

        let key_style = entity.schema().key_style();
        let mut out = Map::new();
        for (name, field) in entity.fields() {
            let value = match field {
                Field::Attr(attr) => attr.value().to_json_with(&self.config.date_format),
                Field::BelongsTo(rel) => match rel.value() {
                    Some(related) => Value::Object(self.serialize_ref(related, depth + 1)?),
                    None => Value::Null,
                },
                Field::HasMany(rel) => match rel.value() {
                    Some(items) => Value::Array(
                        items
                            .iter()
                            .map(|item| self.serialize_ref(item, depth + 1).map(Value::Object))
                            .collect::<ModelResult<Vec<_>>>()?,
                    ),
                    None => Value::Null,
                },
                Field::Plain(value) => value.clone(),
            };
            out.insert(key_style.to_key(name), value);
        }
        Ok(out)
    }

    fn serialize_ref(&self, entity: &EntityRef, depth: usize) -> ModelResult<Map<String, Value>> {
        let entity = entity.try_borrow().map_err(|_| ModelError::EntityBorrowed)?;
        self.serialize_entity(&entity, depth)
    }
}
