use crate::attr::Attr;
use crate::error::{ModelError, ModelResult};
use crate::relation::{BelongsTo, EntityRef, HasMany, RelationInput};
use crate::schema::{EntitySchema, SchemaFn};
use crate::serializer::Serializer;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use modelkit_types::AttrValue;
use serde::{Serialize, Serializer as SerdeSerializer};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{Level, enabled, trace};

/// The container behind one declared field of an entity.
#[derive(Debug, Clone)]
pub enum Field {
    Attr(Attr),
    BelongsTo(BelongsTo),
    HasMany(HasMany),
    Plain(Value),
}

impl Field {
    /// Human-readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attr(_) => "attribute",
            Self::BelongsTo(_) => "to-one relation",
            Self::HasMany(_) => "to-many relation",
            Self::Plain(_) => "plain",
        }
    }

    /// Borrows the field's current value.
    pub fn value(&self) -> FieldValue<'_> {
        match self {
            Self::Attr(attr) => FieldValue::Attr(attr.value()),
            Self::BelongsTo(rel) => FieldValue::One(rel.value()),
            Self::HasMany(rel) => FieldValue::Many(rel.value()),
            Self::Plain(value) => FieldValue::Plain(value),
        }
    }
}

/// Read view of a field's current value.
#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Attr(&'a AttrValue),
    One(Option<&'a EntityRef>),
    Many(Option<&'a [EntityRef]>),
    Plain(&'a Value),
}

/// A value assigned through [`Entity::set`].
#[derive(Debug, Clone)]
pub enum Input {
    /// Payload-style value; coerced by attributes, ingested by relations.
    Json(Value),
    /// Native date for an attribute.
    Date(DateTime<Utc>),
    /// Existing entity for a to-one relation.
    Entity(EntityRef),
    /// Elements for a to-many relation.
    Many(Vec<RelationInput>),
}

impl Input {
    fn kind(&self) -> &'static str {
        match self {
            Self::Json(_) => "a JSON value",
            Self::Date(_) => "a date",
            Self::Entity(_) => "an entity",
            Self::Many(_) => "an entity list",
        }
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<f64> for Input {
    fn from(value: f64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<i64> for Input {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<DateTime<Utc>> for Input {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value)
    }
}

impl From<EntityRef> for Input {
    fn from(value: EntityRef) -> Self {
        Self::Entity(value)
    }
}

impl From<Entity> for Input {
    fn from(value: Entity) -> Self {
        Self::Entity(value.into_ref())
    }
}

impl From<Option<EntityRef>> for Input {
    fn from(value: Option<EntityRef>) -> Self {
        value.map_or(Self::Json(Value::Null), Self::Entity)
    }
}

impl From<Vec<EntityRef>> for Input {
    fn from(value: Vec<EntityRef>) -> Self {
        Self::Many(value.into_iter().map(RelationInput::Instance).collect())
    }
}

impl From<Vec<RelationInput>> for Input {
    fn from(value: Vec<RelationInput>) -> Self {
        Self::Many(value)
    }
}

/// An instance of an entity type: one container per declared field.
#[derive(Clone)]
pub struct Entity {
    schema: Arc<EntitySchema>,
    fields: IndexMap<String, Field>,
}

impl Entity {
    /// Creates an entity with every declared field at its initial value.
    pub fn new(schema: Arc<EntitySchema>) -> Self {
        let fields = schema
            .fields()
            .map(|(name, def)| (name.to_string(), def.instantiate()))
            .collect();
        Self { schema, fields }
    }

    /// Creates an entity of the type returned by `schema`.
    pub fn of(schema: SchemaFn) -> Self {
        Self::new(schema())
    }

    /// Creates an entity and ingests `data` into it.
    pub fn from_payload(schema: Arc<EntitySchema>, data: &Value) -> Self {
        Self::new(schema).with_payload(data)
    }

    pub fn schema(&self) -> &Arc<EntitySchema> {
        &self.schema
    }

    /// Returns true if this entity's type is `schema` or derives from it.
    pub fn is_instance_of(&self, schema: &EntitySchema) -> bool {
        self.schema.is_a(schema)
    }

    /// Wraps the entity in a shared handle for use in relations.
    pub fn into_ref(self) -> EntityRef {
        Rc::new(RefCell::new(self))
    }

    // ── Ingestion ────────────────────────────────────────────────

    /// Fills declared fields from a payload.
    ///
    /// Each field's payload key comes from the schema's key style. Keys
    /// that are missing or null leave the field untouched, so repeated
    /// calls merge rather than reset. Non-object payloads change nothing.
    pub fn push_payload(&mut self, data: &Value) -> &mut Self {
        let Some(data) = data.as_object() else {
            trace!(entity_type = self.schema.name(), "payload is not an object, ignoring");
            return self;
        };

        let key_style = self.schema.key_style();
        for (name, field) in &mut self.fields {
            let key = key_style.to_key(name);
            let Some(value) = data.get(&key).filter(|v| !v.is_null()) else {
                continue;
            };
            match field {
                Field::Attr(attr) => attr.set_value(value.clone()),
                Field::BelongsTo(rel) => rel.set_payload(value.clone()),
                Field::HasMany(rel) => rel.set_payload(value.clone()),
                Field::Plain(plain) => *plain = value.clone(),
            }
        }

        if enabled!(Level::TRACE) {
            for key in data.keys() {
                if self.schema.field_for_key(key).is_none() {
                    trace!(
                        entity_type = self.schema.name(),
                        key = key.as_str(),
                        "ignoring undeclared payload key"
                    );
                }
            }
        }

        self
    }

    /// By-value form of [`push_payload`](Self::push_payload) for chaining
    /// off a constructor.
    pub fn with_payload(mut self, data: &Value) -> Self {
        self.push_payload(data);
        self
    }

    // ── Field access ─────────────────────────────────────────────

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.get_mut(name)
    }

    /// Current value of a field.
    pub fn value(&self, name: &str) -> Option<FieldValue<'_>> {
        self.fields.get(name).map(Field::value)
    }

    /// Assigns a field through its container.
    ///
    /// JSON values are coerced or ingested the same way payload values are.
    /// Assigning JSON to an undeclared name adds a plain field at the end.
    pub fn set(&mut self, name: &str, input: impl Into<Input>) -> ModelResult<()> {
        let input = input.into();

        let Some(field) = self.fields.get_mut(name) else {
            return match input {
                Input::Json(value) => {
                    self.fields.insert(name.to_string(), Field::Plain(value));
                    Ok(())
                }
                _ => Err(ModelError::UnknownField(name.to_string())),
            };
        };

        match (field, input) {
            (Field::Attr(attr), Input::Json(value)) => attr.set_value(value),
            (Field::Attr(attr), Input::Date(date)) => attr.set_date(date),
            (Field::BelongsTo(rel), Input::Json(value)) => rel.set_payload(value),
            (Field::BelongsTo(rel), Input::Entity(entity)) => {
                rel.set_value(Some(RelationInput::Instance(entity)))?;
            }
            (Field::HasMany(rel), Input::Json(value)) => rel.set_payload(value),
            (Field::HasMany(rel), Input::Many(items)) => rel.set_value(Some(items))?,
            (Field::Plain(plain), Input::Json(value)) => *plain = value,
            (field, input) => {
                return Err(ModelError::TypeMismatch {
                    field: name.to_string(),
                    kind: field.kind(),
                    input: input.kind(),
                });
            }
        }
        Ok(())
    }

    fn attr_value(&self, name: &str) -> Option<&AttrValue> {
        match self.fields.get(name)? {
            Field::Attr(attr) => Some(attr.value()),
            _ => None,
        }
    }

    /// The implicit identifier, if set.
    pub fn id(&self) -> Option<&str> {
        self.get_str(crate::schema::ID_FIELD)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attr_value(name).and_then(AttrValue::as_str)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.attr_value(name).and_then(AttrValue::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.attr_value(name).and_then(AttrValue::as_bool)
    }

    pub fn get_date(&self, name: &str) -> Option<DateTime<Utc>> {
        self.attr_value(name).and_then(AttrValue::as_date).copied()
    }

    /// JSON attribute value, or the content of a plain field.
    pub fn get_json(&self, name: &str) -> Option<&Value> {
        match self.fields.get(name)? {
            Field::Attr(attr) => attr.value().as_json(),
            Field::Plain(value) => Some(value),
            _ => None,
        }
    }

    /// Handle to the entity held by a to-one relation.
    pub fn related(&self, name: &str) -> Option<EntityRef> {
        match self.fields.get(name)? {
            Field::BelongsTo(rel) => rel.value().cloned(),
            _ => None,
        }
    }

    /// Entities held by a to-many relation.
    pub fn collection(&self, name: &str) -> Option<&[EntityRef]> {
        match self.fields.get(name)? {
            Field::HasMany(rel) => rel.value(),
            _ => None,
        }
    }

    /// Live collection of a to-many relation, for in-place changes.
    pub fn collection_mut(&mut self, name: &str) -> Option<&mut Vec<EntityRef>> {
        match self.fields.get_mut(name)? {
            Field::HasMany(rel) => rel.value_mut(),
            _ => None,
        }
    }

    // ── Serialization ────────────────────────────────────────────

    /// Serializes the entity graph with the default configuration.
    pub fn serialize(&self) -> ModelResult<Map<String, Value>> {
        Serializer::default().serialize(self)
    }

    /// Serializes the entity graph and passes the top-level mapping through
    /// `transform`. Nested entities are not transformed.
    pub fn serialize_with<F>(&self, transform: F) -> ModelResult<Map<String, Value>>
    where
        F: FnOnce(Map<String, Value>) -> Map<String, Value>,
    {
        Serializer::default().serialize_with(self, transform)
    }

    /// Serializes the entity graph to a JSON string.
    pub fn to_json_string(&self) -> ModelResult<String> {
        Ok(serde_json::to_string(&self.serialize()?)?)
    }
}

impl Serialize for Entity {
    fn serialize<S: SerdeSerializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Entity::serialize(self)
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("type", &self.schema.name())
            .field("fields", &self.fields)
            .finish()
    }
}
