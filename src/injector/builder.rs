use std::sync::Arc;

use super::{Injector, Shared};
use crate::class::Class;
use crate::config::InjectorConfig;
use crate::error::DiResult;
use crate::metadata::{MetadataRegistry, MetadataSource};
use crate::observer::{InjectorObserver, Observers};
use crate::provider::Provider;
use crate::scope::{Scope, ScopeRequest};
use crate::token::Token;

/// Builder for root injectors.
///
/// Everything set here is shared by the descendants of the built root.
///
/// ```rust
/// use ferrous_injector::{Injector, InjectorConfig, MetadataRegistry, Provider, Resolver, Token};
///
/// let root = Injector::builder()
///     .provide(Provider::value(Token::named("a"), 1u8))
///     .tag("all", ["a"])
///     .metadata(MetadataRegistry::new())
///     .config(InjectorConfig::default().with_root_scope(2))
///     .build()
///     .unwrap();
///
/// assert_eq!(root.scope().id(), 2);
/// assert_eq!(root.get_tagged::<u8>(&Token::named("all")).unwrap().len(), 1);
/// ```
#[derive(Default)]
pub struct InjectorBuilder {
    providers: Vec<Provider>,
    tags: Vec<(Token, Vec<Token>)>,
    metadata: Option<Arc<dyn MetadataSource>>,
    observers: Observers,
    config: InjectorConfig,
    scope: Option<ScopeRequest>,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provide(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.providers.extend(providers);
        self
    }

    pub fn add_class(self, class: Class) -> Self {
        self.provide(Provider::class(class))
    }

    pub fn tag<T: Into<Token>>(
        mut self,
        tag: impl Into<Token>,
        tokens: impl IntoIterator<Item = T>,
    ) -> Self {
        self.tags.push((tag.into(), tokens.into_iter().map(Into::into).collect()));
        self
    }

    /// Descriptor source for the tree. Defaults to an empty [`MetadataRegistry`].
    pub fn metadata(mut self, source: impl MetadataSource + 'static) -> Self {
        self.metadata = Some(Arc::new(source));
        self
    }

    pub fn shared_metadata(mut self, source: Arc<dyn MetadataSource>) -> Self {
        self.metadata = Some(source);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn InjectorObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn config(mut self, config: InjectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Scope of the root. Defaults to the configured `root_scope`.
    pub fn scope(mut self, scope: impl Into<ScopeRequest>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn build(self) -> DiResult<Injector> {
        self.config.validate()?;

        let request = self
            .scope
            .unwrap_or(ScopeRequest::Level(i64::from(self.config.root_scope)));
        let shared = Arc::new(Shared {
            metadata: self.metadata.unwrap_or_else(|| Arc::new(MetadataRegistry::new())),
            observers: self.observers,
            config: self.config,
        });
        let scope = Scope::create_child(shared.scope_request(request)?, None)?;

        let root = Injector::node(None, scope, shared);
        for provider in self.providers {
            root.add(provider);
        }
        for (tag, tokens) in self.tags {
            root.tag(tag, tokens)?;
        }

        tracing::debug!(injector = %root.id(), scope = scope.id(), "root injector built");
        Ok(root)
    }
}
