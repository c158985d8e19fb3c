use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::entity::{Entity, Navigate};
use crate::error::{RelqError, Result};
use crate::row::Row;
use crate::schema::EntitySchema;
use crate::value::{FieldType, KeyPart, KeyTuple};

use super::{NavigationOptions, key_tuple};

/// Key of a returned row over `fields`; `None` when a component is null.
fn row_key(
    row: &Row,
    target: &EntitySchema,
    fields: &[(&'static str, FieldType)],
) -> Result<Option<KeyTuple>> {
    let mut key = KeyTuple::new();
    for (name, ty) in fields {
        let value = row
            .value_of(target, name)?
            .coerce(*ty)
            .map_err(|err| RelqError::Mapping(err.to_string()))?;
        match value.key_part() {
            KeyPart::Null => return Ok(None),
            part => key.push(part),
        }
    }
    Ok(Some(key))
}

/// Attaches the rows of a lookup to `items`.
///
/// Rows are indexed first; a duplicate key on a single-valued navigation
/// fails before any item is touched.
pub(crate) fn merge_rows<S, R>(
    options: &NavigationOptions,
    target: &EntitySchema,
    rows: &[Row],
    items: &mut [S],
) -> Result<()>
where
    S: Navigate<R>,
    R: Entity + Clone,
{
    if items.len() != options.item_keys.len() {
        return Err(RelqError::Mapping(format!(
            "lookup for `{}` was prepared for {} items, got {}",
            options.reference_field,
            options.item_keys.len(),
            items.len()
        )));
    }

    let fields = options
        .foreign_key_fields
        .iter()
        .map(|name| target.require_field(name).map(|f| (f.name, f.ty)))
        .collect::<Result<Vec<_>>>()?;

    let mut index: HashMap<KeyTuple, Vec<R>> = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(key) = row_key(row, target, &fields)? else {
            continue;
        };
        let entity = R::from_row(row, target)?;
        match index.entry(key) {
            Entry::Occupied(entry) if !options.is_collection => {
                return Err(RelqError::DuplicateKey {
                    entity: R::NAME.to_owned(),
                    key: format!("{:?}", entry.key()),
                });
            }
            Entry::Occupied(mut entry) => entry.get_mut().push(entity),
            Entry::Vacant(entry) => {
                entry.insert(vec![entity]);
            }
        }
    }

    for (item, key) in items.iter_mut().zip(&options.item_keys) {
        let matched = key.as_deref().and_then(|values| index.get(&key_tuple(values)));
        if options.is_collection {
            let values = matched.cloned().unwrap_or_default();
            item.set_collection(options.reference_field, values)?;
        } else {
            let value = matched.and_then(|rows| rows.first()).cloned();
            item.set_reference(options.reference_field, value)?;
        }
    }
    Ok(())
}
