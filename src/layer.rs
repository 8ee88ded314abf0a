use crate::content_type::SniffPool;
use crate::encoding::EncodingTable;
use crate::service::PrecompressedService;
use crate::store::{FileStore, StoreChain};
use std::sync::Arc;
use tower::Layer;

/// A Tower layer that serves pre-compressed variants of static files.
///
/// Wraps a backend service (typically a static file server) and, when the
/// client accepts it, rewrites requests to an already-compressed sibling
/// artifact found in the configured store chain.
#[derive(Debug, Clone)]
pub struct PrecompressedLayer {
    store: StoreChain,
    encodings: EncodingTable,
    sniff_pool: Arc<SniffPool>,
}

impl PrecompressedLayer {
    /// Creates a layer probing the given store.
    pub fn new(store: impl FileStore + 'static) -> Self {
        let mut chain = StoreChain::new();
        chain.push(store);
        Self {
            store: chain,
            encodings: EncodingTable::default(),
            sniff_pool: Arc::new(SniffPool::new()),
        }
    }

    /// Appends another store to the lookup chain. Stores are consulted in
    /// the order they were added; earlier ones shadow later ones.
    pub fn with_store(mut self, store: impl FileStore + 'static) -> Self {
        self.store.push(store);
        self
    }

    /// Registers an extra encoding token and its on-disk artifact suffix,
    /// e.g. `("lzma", ".xz")`.
    pub fn with_encoding(mut self, token: &str, suffix: &str) -> Self {
        self.encodings.insert(token, suffix);
        self
    }
}

impl<S> Layer<S> for PrecompressedLayer {
    type Service = PrecompressedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        PrecompressedService::new(
            inner,
            self.store.clone(),
            self.encodings.clone(),
            Arc::clone(&self.sniff_pool),
        )
    }
}
