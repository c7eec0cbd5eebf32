//! Authority resolver: maps a type id to its ordered sources.

use std::sync::Arc;

use authrecon_core::{Error, Result, ServiceMetadata, ServiceProfile, SourceDescriptor};

/// Resolves caller type ids against the static TypeMapping of a profile.
#[derive(Debug, Clone)]
pub struct AuthorityResolver {
    profile: Arc<ServiceProfile>,
}

impl AuthorityResolver {
    pub fn new(profile: Arc<ServiceProfile>) -> Self {
        Self { profile }
    }

    /// Sources for `type_id`, in fallback order.
    pub fn resolve(&self, type_id: &str) -> Result<&[SourceDescriptor]> {
        self.profile
            .find_type(type_id)
            .map(|entry| entry.sources.as_slice())
            .ok_or_else(|| Error::UnknownType(type_id.to_string()))
    }

    pub fn profile(&self) -> &ServiceProfile {
        &self.profile
    }

    pub fn metadata(&self) -> ServiceMetadata {
        self.profile.metadata()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AuthorityResolver {
        AuthorityResolver::new(Arc::new(ServiceProfile::ucsc("http://qa.test/")))
    }

    #[test]
    fn test_resolve_chain_in_order() {
        let resolver = resolver();
        let sources = resolver.resolve("places").unwrap();
        let ids: Vec<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["geonames", "locSubjects"]);
    }

    #[test]
    fn test_resolve_single_source() {
        let resolver = AuthorityResolver::new(Arc::new(ServiceProfile::qa("http://qa.test/")));
        let sources = resolver.resolve("gettyTgn").unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].authority_id, "getty");
        assert_eq!(sources[0].subauthority_id, "tgn");
    }

    #[test]
    fn test_unknown_type() {
        let err = resolver().resolve("planets").unwrap_err();
        assert!(matches!(err, Error::UnknownType(ref t) if t == "planets"));
        assert!(err.is_client_error());
    }
}
