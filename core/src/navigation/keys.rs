//! Key derivation between a navigation field and its target entity.

use crate::error::{RelqError, Result};
use crate::schema::{EntitySchema, ForeignKeyDef};

/// Paired key fields of one navigation.
///
/// `reference_keys[i]` (a field of the source) is matched against
/// `foreign_key_fields[i]` (a field of the target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKeys {
    pub reference_keys: Vec<&'static str>,
    pub foreign_key_fields: Vec<&'static str>,
}

/// Derives the keys joining `source.field` to `target`.
///
/// In priority order:
/// 1. keys declared on the navigation field itself, or a foreign key of the
///    source that references `target` for this field;
/// 2. a foreign key of `target` referencing the source (the one serving
///    `field` if any, else the only one);
/// 3. the target's key fields against the field's declared local keys.
pub fn derive_join_keys(
    source: &EntitySchema,
    field: &str,
    target: &EntitySchema,
) -> Result<JoinKeys> {
    let decl = source.navigation_decl(field)?;
    if decl.target != target.entity {
        return Err(RelqError::Schema(format!(
            "navigation `{}.{field}` targets `{}`, not `{}`",
            source.entity, decl.target, target.entity
        )));
    }

    let keys = if !decl.local_keys.is_empty() && !decl.foreign_keys.is_empty() {
        JoinKeys {
            reference_keys: decl.local_keys.clone(),
            foreign_key_fields: decl.foreign_keys.clone(),
        }
    } else if let Some(fk) = source
        .foreign_keys_to(target.entity)
        .find(|fk| fk.navigation_field == field)
    {
        JoinKeys {
            reference_keys: fk.local_keys.clone(),
            foreign_key_fields: fk.foreign_keys.clone(),
        }
    } else if let Some(fk) = inverse_foreign_key(source, field, target)? {
        JoinKeys {
            reference_keys: fk.foreign_keys.clone(),
            foreign_key_fields: fk.local_keys.clone(),
        }
    } else {
        let foreign_key_fields = if decl.foreign_keys.is_empty() {
            target.key_fields().iter().map(|f| f.name).collect()
        } else {
            decl.foreign_keys.clone()
        };
        JoinKeys {
            reference_keys: decl.local_keys.clone(),
            foreign_key_fields,
        }
    };

    validate(source, field, target, &keys)?;
    Ok(keys)
}

/// Foreign key declared on `target` pointing back at `source`.
fn inverse_foreign_key<'t>(
    source: &EntitySchema,
    field: &str,
    target: &'t EntitySchema,
) -> Result<Option<&'t ForeignKeyDef>> {
    let candidates: Vec<&ForeignKeyDef> = target.foreign_keys_to(source.entity).collect();
    if let Some(fk) = candidates.iter().find(|fk| fk.navigation_field == field) {
        return Ok(Some(*fk));
    }
    match candidates.as_slice() {
        [] => Ok(None),
        [fk] => Ok(Some(*fk)),
        _ => Err(RelqError::AmbiguousNavigation {
            entity: source.entity.to_owned(),
            target: target.entity.to_owned(),
            candidates: candidates
                .iter()
                .map(|fk| {
                    if fk.navigation_field.is_empty() {
                        fk.local_keys.join(",")
                    } else {
                        fk.navigation_field.to_owned()
                    }
                })
                .collect(),
        }),
    }
}

fn validate(
    source: &EntitySchema,
    field: &str,
    target: &EntitySchema,
    keys: &JoinKeys,
) -> Result<()> {
    if keys.reference_keys.is_empty() {
        return Err(RelqError::Schema(format!(
            "no reference keys resolved for `{}.{field}`",
            source.entity
        )));
    }
    if keys.foreign_key_fields.is_empty() {
        return Err(RelqError::Schema(format!(
            "no foreign-key fields resolved on `{}` for `{}.{field}`",
            target.entity, source.entity
        )));
    }
    if keys.reference_keys.len() != keys.foreign_key_fields.len() {
        return Err(RelqError::Schema(format!(
            "`{}.{field}` pairs {} reference keys with {} foreign-key fields",
            source.entity,
            keys.reference_keys.len(),
            keys.foreign_key_fields.len()
        )));
    }
    for name in &keys.reference_keys {
        source.require_field(name)?;
    }
    for name in &keys.foreign_key_fields {
        target.require_field(name)?;
    }
    Ok(())
}
