use crate::attr::{Attr, AttrParams};
use crate::entity::Field;
use crate::relation::{BelongsTo, HasMany};
use indexmap::IndexMap;
use modelkit_types::{AttrType, KeyStyle};
use serde_json::Value;
use std::sync::Arc;

/// Returns the schema of an entity type.
///
/// Relations store this function rather than the schema itself so that
/// entity types can refer to each other (an order belongs to a client that
/// has many orders). Implementations usually cache the schema in a
/// `static OnceLock`.
pub type SchemaFn = fn() -> Arc<EntitySchema>;

/// Name of the implicit identifier field every schema starts with.
pub const ID_FIELD: &str = "id";

/// Describes an entity type: its name, its ordered fields and how field
/// names map to payload keys.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    name: String,
    parent: Option<Arc<EntitySchema>>,
    key_style: KeyStyle,
    fields: IndexMap<String, FieldDef>,
}

impl EntitySchema {
    /// Starts a schema with the implicit `id: string` field.
    pub fn builder(name: impl Into<String>) -> EntitySchemaBuilder {
        let mut fields = IndexMap::new();
        fields.insert(ID_FIELD.to_string(), attr(AttrType::String));
        EntitySchemaBuilder {
            name: name.into(),
            parent: None,
            key_style: None,
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<EntitySchema>> {
        self.parent.as_ref()
    }

    pub fn key_style(&self) -> KeyStyle {
        self.key_style
    }

    /// Declared fields in declaration order, inherited fields first.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.fields.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Payload key of a declared field.
    pub fn key_for(&self, field_name: &str) -> String {
        self.key_style.to_key(field_name)
    }

    /// Resolves a payload key back to the declared field it fills.
    pub fn field_for_key(&self, key: &str) -> Option<&str> {
        let candidate = self.key_style.to_field_name(key);
        if let Some((name, _)) = self.fields.get_key_value(candidate.as_str()) {
            if self.key_for(name) == key {
                return Some(name.as_str());
            }
        }
        self.fields
            .keys()
            .find(|name| self.key_for(name) == key)
            .map(String::as_str)
    }

    /// Returns true if this type is `other` or derives from it.
    pub fn is_a(&self, other: &EntitySchema) -> bool {
        self.name == other.name || self.parent.as_ref().is_some_and(|p| p.is_a(other))
    }
}

/// Builds an [`EntitySchema`].
#[derive(Debug)]
pub struct EntitySchemaBuilder {
    name: String,
    parent: Option<Arc<EntitySchema>>,
    key_style: Option<KeyStyle>,
    fields: IndexMap<String, FieldDef>,
}

impl EntitySchemaBuilder {
    /// Inherits the parent's fields (in order, ahead of this type's own) and
    /// its key style unless one is set explicitly.
    pub fn extends(mut self, parent: SchemaFn) -> Self {
        let parent = parent();
        let mut fields = parent.fields.clone();
        for (name, def) in self.fields.drain(..) {
            if name == ID_FIELD && fields.contains_key(ID_FIELD) {
                continue;
            }
            fields.insert(name, def);
        }
        self.fields = fields;
        self.parent = Some(parent);
        self
    }

    pub fn key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = Some(key_style);
        self
    }

    /// Declares a field. Redeclaring a field replaces its definition but
    /// keeps its position.
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn build(self) -> Arc<EntitySchema> {
        let key_style = self
            .key_style
            .or_else(|| self.parent.as_ref().map(|p| p.key_style))
            .unwrap_or_default();
        Arc::new(EntitySchema {
            name: self.name,
            parent: self.parent,
            key_style,
            fields: self.fields,
        })
    }
}

/// Declaration of one field; instantiated into a [`Field`] per entity.
#[derive(Debug, Clone)]
pub enum FieldDef {
    Attr { attr_type: AttrType, params: AttrParams },
    BelongsTo(SchemaFn),
    HasMany(SchemaFn),
    /// Passthrough value with its initial content.
    Plain(Value),
}

impl FieldDef {
    /// Creates the container this definition describes.
    pub fn instantiate(&self) -> Field {
        match self {
            Self::Attr { attr_type, params } => Field::Attr(Attr::new(*attr_type, params.clone())),
            Self::BelongsTo(related) => Field::BelongsTo(BelongsTo::new(*related)),
            Self::HasMany(related) => Field::HasMany(HasMany::new(*related)),
            Self::Plain(initial) => Field::Plain(initial.clone()),
        }
    }
}

/// Declares a typed attribute.
pub fn attr(attr_type: AttrType) -> FieldDef {
    attr_with(attr_type, AttrParams::default())
}

/// Declares a typed attribute with construction params.
pub fn attr_with(attr_type: AttrType, params: AttrParams) -> FieldDef {
    FieldDef::Attr { attr_type, params }
}

/// Declares a to-one relation.
pub fn belongs_to(related: SchemaFn) -> FieldDef {
    FieldDef::BelongsTo(related)
}

/// Declares a to-many relation.
pub fn has_many(related: SchemaFn) -> FieldDef {
    FieldDef::HasMany(related)
}

/// Declares an uncoerced passthrough field.
pub fn plain(initial: impl Into<Value>) -> FieldDef {
    FieldDef::Plain(initial.into())
}
