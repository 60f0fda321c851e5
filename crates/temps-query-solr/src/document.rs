//! Entity <-> flat Solr document mapping

use crate::translate::SolrTranslator;
use serde_json::{Map, Value};
use temps_query::json::{json_to_value, native_to_json};
use temps_query::{DataError, Entity, NativeValue, Result};
use uuid::Uuid;

pub type SolrDocument = Map<String, Value>;

/// Unique key field of the schema
pub const ID_FIELD: &str = "id";

const VERSION_FIELD: &str = "_version_";

fn field_value(native: NativeValue) -> Value {
    match native {
        NativeValue::Date(d) => Value::String(format!("{}T00:00:00Z", d)),
        NativeValue::List(items) => Value::Array(items.into_iter().map(field_value).collect()),
        other => native_to_json(other),
    }
}

/// Flatten an entity into a document tagged with its collection.
///
/// Composite values are rejected; lists of scalars become multi-valued fields.
pub fn to_document(translator: &SolrTranslator, entity: &Entity) -> Result<SolrDocument> {
    let mut document = Map::new();
    for attribute in &entity.attributes {
        if attribute.value.is_composite() {
            return Err(DataError::unsupported_value(format!(
                "Solr documents are flat; {} holds a structural value",
                attribute.name
            )));
        }
        let native = translator.coercion().coerce(&attribute.value)?;
        document.insert(attribute.name.clone(), field_value(native));
    }

    if !document.contains_key(ID_FIELD) {
        document.insert(ID_FIELD.to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    document.insert(
        translator.entity_field().to_string(),
        Value::String(entity.collection.clone()),
    );
    Ok(document)
}

pub fn to_entity(translator: &SolrTranslator, mut document: SolrDocument) -> Entity {
    let collection = match document.remove(translator.entity_field()) {
        Some(Value::String(collection)) => collection,
        _ => String::new(),
    };
    document.remove(VERSION_FIELD);

    let mut entity = Entity::new(collection);
    for (name, value) in document {
        entity = entity.with(name, json_to_value(value));
    }
    entity
}
