//! Entity <-> JSON source mapping

use serde_json::{Map, Value};
use crate::translate::field_name;
use temps_query::json::{json_to_value, native_to_json};
use temps_query::{AttributeValue, CodecRegistry, Coercion, DataError, Entity, Result, Scalar};

/// Attribute used as the document `_id`
pub const ID_FIELD: &str = "id";

/// Convert an attribute value, keeping nested structures as JSON objects
pub fn value_to_json<R: CodecRegistry>(coercion: &Coercion<R>, value: &AttributeValue) -> Result<Value> {
    match value {
        AttributeValue::Scalar(scalar) => coercion.coerce_scalar(scalar).map(native_to_json),
        AttributeValue::List(items) => items
            .iter()
            .map(|item| value_to_json(coercion, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        AttributeValue::Structural(fields) => fields
            .iter()
            .map(|(name, value)| Ok((name.clone(), value_to_json(coercion, value)?)))
            .collect::<Result<Map<_, _>>>()
            .map(Value::Object),
    }
}

/// Document id and JSON source for an entity
pub fn to_source<R: CodecRegistry>(
    coercion: &Coercion<R>,
    entity: &Entity,
) -> Result<(Option<String>, Value)> {
    let id = entity.find(ID_FIELD).map(document_id).transpose()?;
    let source = entity
        .attributes
        .iter()
        .map(|a| {
            field_name(&a.name)?;
            Ok((a.name.clone(), value_to_json(coercion, &a.value)?))
        })
        .collect::<Result<Map<_, _>>>()?;
    Ok((id, Value::Object(source)))
}

pub fn to_entity(collection: impl Into<String>, source: Value) -> Entity {
    let mut entity = Entity::new(collection);
    if let Value::Object(fields) = source {
        for (name, value) in fields {
            entity = entity.with(name, json_to_value(value));
        }
    }
    entity
}

fn document_id(value: &AttributeValue) -> Result<String> {
    match value {
        AttributeValue::Scalar(Scalar::Text(s)) => Ok(s.clone()),
        AttributeValue::Scalar(Scalar::Int(i)) => Ok(i.to_string()),
        AttributeValue::Scalar(Scalar::Uuid(u)) => Ok(u.to_string()),
        other => Err(DataError::unsupported_value(format!(
            "{:?} cannot be used as a document id",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use temps_query::StaticCodecs;

    #[test]
    fn test_nested_values_become_objects() {
        let entity = Entity::new("person")
            .with("id", 7)
            .with("name", "Poliana")
            .with(
                "phones",
                AttributeValue::List(vec![AttributeValue::structural([("mobile", "1231231")])]),
            );

        let (id, source) = to_source(&Coercion::new(StaticCodecs::json()), &entity).unwrap();
        assert_eq!(id.as_deref(), Some("7"));
        assert_eq!(
            source,
            json!({"id": 7, "name": "Poliana", "phones": [{"mobile": "1231231"}]})
        );
        assert_eq!(to_entity("person", source), entity);
    }

    #[test]
    fn test_metadata_field_names_are_rejected() {
        for name in ["_id", "_source"] {
            let entity = Entity::new("person").with("id", 1).with(name, "x");
            assert!(matches!(
                to_source(&Coercion::new(StaticCodecs::json()), &entity),
                Err(DataError::UnsupportedValue(_))
            ));
        }
    }

    #[test]
    fn test_list_id_is_rejected() {
        let entity = Entity::new("person").with("id", vec![1, 2]);
        assert!(matches!(
            to_source(&Coercion::new(StaticCodecs::json()), &entity),
            Err(DataError::UnsupportedValue(_))
        ));
    }
}
