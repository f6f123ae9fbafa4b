//! Reference resolution across an ordered set of services.

use core_model::RawRef;
use tracing::debug;

use crate::error::{Result, ServiceError};
use crate::service::Service;
use core_model::Ref;

/// An ordered collection of services that resolves raw references by asking
/// each service, in registration order, whether it recognizes the shape.
///
/// Order is significant: catch-all services (such as a local file backend
/// that accepts bare paths) must be registered last, after every service
/// with a more specific shape.
pub struct ServiceRegistry<S> {
    services: Vec<S>,
}

impl<S: Service> ServiceRegistry<S> {
    pub fn new(services: Vec<S>) -> Self {
        Self { services }
    }

    /// Resolve a raw reference to the first service that claims it.
    ///
    /// Returns the owning service alongside the parsed [`Ref`]. When no
    /// service claims the input, fails with [`ServiceError::RefUnresolved`]
    /// listing the names of the registered services.
    pub fn resolve(&self, raw: &str) -> Result<(&S, Ref)> {
        let raw_ref = RawRef::parse(raw);
        for service in &self.services {
            if let Some(parsed) = service.parse_ref(&raw_ref) {
                debug!(input = raw, service = service.name(), "resolved reference");
                return Ok((service, parsed));
            }
        }
        Err(ServiceError::RefUnresolved {
            input: raw.to_string(),
            known: self.services.iter().map(|s| s.name().to_string()).collect(),
        })
    }

    pub fn services(&self) -> &[S] {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::{ResourceLocation, ResourceType};

    /// Claims token refs whose text starts with the service name.
    struct PrefixService(&'static str);

    impl Service for PrefixService {
        fn name(&self) -> &str {
            self.0
        }

        fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
            if !raw_ref.is_token {
                return None;
            }
            let rest = raw_ref.text.strip_prefix(self.0)?.strip_prefix('/')?;
            Some(Ref::new(
                self.0,
                ResourceType::Playlist,
                ResourceLocation::Id(rest.to_string()),
            ))
        }
    }

    /// Claims every non-token ref, like a path-based file backend.
    struct CatchAll;

    impl Service for CatchAll {
        fn name(&self) -> &str {
            "file"
        }

        fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
            (!raw_ref.is_token).then(|| {
                Ref::new(
                    "file",
                    ResourceType::Playlist,
                    ResourceLocation::Path(raw_ref.text.clone().into()),
                )
            })
        }
    }

    enum Either {
        Prefix(PrefixService),
        CatchAll(CatchAll),
    }

    impl Service for Either {
        fn name(&self) -> &str {
            match self {
                Either::Prefix(s) => s.name(),
                Either::CatchAll(s) => s.name(),
            }
        }

        fn parse_ref(&self, raw_ref: &RawRef) -> Option<Ref> {
            match self {
                Either::Prefix(s) => s.parse_ref(raw_ref),
                Either::CatchAll(s) => s.parse_ref(raw_ref),
            }
        }
    }

    fn registry() -> ServiceRegistry<Either> {
        ServiceRegistry::new(vec![
            Either::Prefix(PrefixService("alpha")),
            Either::Prefix(PrefixService("beta")),
            Either::CatchAll(CatchAll),
        ])
    }

    #[test]
    fn test_resolve_picks_first_match() {
        let registry = registry();
        let (service, parsed) = registry.resolve("@beta/xyz").unwrap();
        assert_eq!(service.name(), "beta");
        assert_eq!(parsed.service_name, "beta");
    }

    #[test]
    fn test_catch_all_claims_non_token_refs() {
        let registry = registry();
        let (service, _) = registry.resolve("some/local/path.json").unwrap();
        assert_eq!(service.name(), "file");
    }

    #[test]
    fn test_unresolved_lists_known_services() {
        let registry = registry();
        let err = registry.resolve("@gamma/xyz").err().unwrap();
        match err {
            ServiceError::RefUnresolved { input, known } => {
                assert_eq!(input, "@gamma/xyz");
                assert_eq!(known, vec!["alpha", "beta", "file"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
