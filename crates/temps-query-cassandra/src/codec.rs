use temps_query::{CodecRegistry, ScalarKind};

/// Scalar kinds the CQL driver binds without conversion
#[derive(Debug, Clone, Copy, Default)]
pub struct CqlCodecs;

impl CodecRegistry for CqlCodecs {
    fn accepts(&self, kind: ScalarKind) -> bool {
        !matches!(kind, ScalarKind::Enum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use temps_query::{AttributeValue, Coercion, NativeValue, Scalar};

    #[test]
    fn test_enums_become_text() {
        let coercion = Coercion::new(CqlCodecs);
        assert_eq!(
            coercion
                .coerce(&AttributeValue::Scalar(Scalar::Enum("SUMMER".into())))
                .unwrap(),
            NativeValue::Text("SUMMER".into())
        );
        assert_eq!(
            coercion
                .coerce(&AttributeValue::Scalar(Scalar::Bytes(vec![1])))
                .unwrap(),
            NativeValue::Blob(vec![1])
        );
    }
}
