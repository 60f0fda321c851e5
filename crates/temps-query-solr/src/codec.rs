use temps_query::{CodecRegistry, ScalarKind};

/// Scalar kinds Solr field types index directly; bytes go through base64
#[derive(Debug, Clone, Copy, Default)]
pub struct SolrCodecs;

impl CodecRegistry for SolrCodecs {
    fn accepts(&self, kind: ScalarKind) -> bool {
        !matches!(kind, ScalarKind::Bytes | ScalarKind::Enum)
    }
}
