//! Schema descriptors and the registry that caches them per entity type.
//!
//! A descriptor is plain data: the table name, the logical-to-physical field
//! mapping, the declared key fields and the declared foreign keys. It is built
//! once per type by [`Entity::schema`](crate::Entity::schema) and never changes
//! afterwards.

use hashbrown::HashMap;

use crate::entity::Entity;
use crate::error::{RelqError, Result};
use crate::value::FieldType;

//------------------------------------------------------------------------------
// Field and key declarations
//------------------------------------------------------------------------------

/// Field-level declaration of a navigation (related entity or collection).
///
/// Either key list may be left empty; the resolver then derives keys from the
/// target's declarations or its key fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationDecl {
    /// Entity name of the related type.
    pub target: &'static str,
    pub is_collection: bool,
    /// Fields of the declaring entity holding the reference values.
    pub local_keys: Vec<&'static str>,
    /// Fields of the target matched against `local_keys`.
    pub foreign_keys: Vec<&'static str>,
}

impl NavigationDecl {
    /// A single-valued navigation.
    pub fn one(target: &'static str) -> Self {
        Self {
            target,
            is_collection: false,
            local_keys: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// A collection-valued navigation.
    pub fn many(target: &'static str) -> Self {
        Self {
            is_collection: true,
            ..Self::one(target)
        }
    }

    pub fn local_keys(mut self, keys: &[&'static str]) -> Self {
        self.local_keys = keys.to_vec();
        self
    }

    pub fn foreign_keys(mut self, keys: &[&'static str]) -> Self {
        self.foreign_keys = keys.to_vec();
        self
    }
}

/// One logical field of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub column: &'static str,
    pub ty: FieldType,
    pub is_key: bool,
    /// Virtual fields have no column (navigations, computed values).
    pub is_virtual: bool,
    pub navigation: Option<NavigationDecl>,
}

impl FieldDef {
    /// A stored field whose column has the same name.
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            column: name,
            ty,
            is_key: false,
            is_virtual: false,
            navigation: None,
        }
    }

    pub fn column(mut self, column: &'static str) -> Self {
        self.column = column;
        self
    }

    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    pub fn virtual_field(mut self) -> Self {
        self.is_virtual = true;
        self
    }
}

/// Entity-level foreign key declaration.
///
/// `local_keys` are fields of the declaring entity, `foreign_keys` the fields
/// of `references` they point at, and `navigation_field` the navigation this
/// declaration serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub references: &'static str,
    pub local_keys: Vec<&'static str>,
    pub foreign_keys: Vec<&'static str>,
    pub navigation_field: &'static str,
}

impl ForeignKeyDef {
    pub fn new(
        references: &'static str,
        local_keys: &[&'static str],
        foreign_keys: &[&'static str],
    ) -> Self {
        Self {
            references,
            local_keys: local_keys.to_vec(),
            foreign_keys: foreign_keys.to_vec(),
            navigation_field: "",
        }
    }

    pub fn navigation_field(mut self, field: &'static str) -> Self {
        self.navigation_field = field;
        self
    }
}

//------------------------------------------------------------------------------
// EntitySchema
//------------------------------------------------------------------------------

/// Descriptor of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub entity: &'static str,
    pub table: &'static str,
    pub fields: Vec<FieldDef>,
    pub foreign_keys: Vec<ForeignKeyDef>,
}

impl EntitySchema {
    pub fn new(entity: &'static str, table: &'static str) -> Self {
        Self {
            entity,
            table,
            fields: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a key field stored under the same column name.
    pub fn key(self, name: &'static str, ty: FieldType) -> Self {
        self.with(FieldDef::new(name, ty).key())
    }

    /// Adds a stored field under the same column name.
    pub fn field(self, name: &'static str, ty: FieldType) -> Self {
        self.with(FieldDef::new(name, ty))
    }

    /// Adds a stored field whose column name differs from the field name.
    pub fn mapped(self, name: &'static str, column: &'static str, ty: FieldType) -> Self {
        self.with(FieldDef::new(name, ty).column(column))
    }

    /// Adds a virtual navigation field.
    pub fn navigation(self, name: &'static str, decl: NavigationDecl) -> Self {
        let mut def = FieldDef::new(name, FieldType::Bytes).virtual_field();
        def.navigation = Some(decl);
        self.with(def)
    }

    pub fn foreign_key(mut self, fk: ForeignKeyDef) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn with(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field_def(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn require_field(&self, name: &str) -> Result<&FieldDef> {
        self.field_def(name).ok_or_else(|| {
            RelqError::Schema(format!("entity `{}` has no field `{name}`", self.entity))
        })
    }

    /// Declared key fields; defaults to a field named `id` when none is flagged.
    pub fn key_fields(&self) -> Vec<&FieldDef> {
        let keys: Vec<_> = self.fields.iter().filter(|f| f.is_key).collect();
        if keys.is_empty() {
            self.field_def("id").into_iter().collect()
        } else {
            keys
        }
    }

    /// Stored (non-virtual) fields in declaration order.
    pub fn stored_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.is_virtual)
    }

    /// Navigation fields whose declared target is `target`.
    pub fn navigations_to<'s>(
        &'s self,
        target: &'s str,
    ) -> impl Iterator<Item = (&'s FieldDef, &'s NavigationDecl)> + 's {
        self.fields.iter().filter_map(move |f| {
            f.navigation
                .as_ref()
                .filter(|nav| nav.target == target)
                .map(|nav| (f, nav))
        })
    }

    pub fn navigation_decl(&self, field: &str) -> Result<&NavigationDecl> {
        self.require_field(field)?.navigation.as_ref().ok_or_else(|| {
            RelqError::Schema(format!(
                "field `{}.{field}` is not a navigation field",
                self.entity
            ))
        })
    }

    /// Entity-level foreign keys pointing at `entity`.
    pub fn foreign_keys_to<'s>(
        &'s self,
        entity: &'s str,
    ) -> impl Iterator<Item = &'s ForeignKeyDef> + 's {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.references == entity)
    }
}

//------------------------------------------------------------------------------
// SchemaRegistry
//------------------------------------------------------------------------------

/// Per-entity schema descriptors, supplied once per type and cached.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<&'static str, EntitySchema>,
    tables: HashMap<&'static str, &'static str>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T`'s descriptor. Registering the same type twice is a no-op.
    pub fn register<T: Entity>(&mut self) -> &mut Self {
        if !self.entities.contains_key(T::NAME) {
            self.insert(T::schema());
        }
        self
    }

    /// Inserts a descriptor unless its entity is already present.
    pub fn insert(&mut self, schema: EntitySchema) {
        self.tables.entry(schema.table).or_insert(schema.entity);
        self.entities.entry(schema.entity).or_insert(schema);
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn get(&self, entity: &str) -> Result<&EntitySchema> {
        self.entities
            .get(entity)
            .ok_or_else(|| RelqError::Schema(format!("entity `{entity}` is not registered")))
    }

    /// Descriptor of the entity stored in `table`.
    pub fn by_table(&self, table: &str) -> Option<&EntitySchema> {
        self.tables
            .get(table)
            .and_then(|entity| self.entities.get(entity))
    }

    pub fn field(&self, entity: &str, name: &str) -> Result<&FieldDef> {
        self.get(entity)?.require_field(name)
    }

    pub fn key_fields(&self, entity: &str) -> Result<Vec<&FieldDef>> {
        Ok(self.get(entity)?.key_fields())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
