//! Tower middleware that serves pre-compressed variants of static files.
//!
//! This crate provides a Tower layer that sits in front of a static file
//! backend and, when the client's `Accept-Encoding` allows it, rewrites the
//! request to an already-compressed sibling artifact (`/a.txt.gz` next to
//! `/a.txt`). Nothing is ever compressed on the fly: if no artifact exists
//! on disk for an acceptable encoding, the original resource is served.
//!
//! # Example
//!
//! ```ignore
//! use http_precompressed::{DirStore, PrecompressedLayer};
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .layer(PrecompressedLayer::new(DirStore::new("/var/www")))
//!     .service(my_static_file_server);
//! ```
//!
//! # Negotiation Rules
//!
//! - `Accept-Encoding` entries are ranked by quality value, ties in
//!   first-seen order; entries with malformed or out-of-range `q` values are
//!   dropped individually.
//! - Recognized encodings (`gzip`/`x-gzip` → `.gz`, `br` → `.br`,
//!   `deflate` → `.fl`, `zstd` → `.zst`) are probed in rank order; the first
//!   artifact found on disk wins. Unknown tokens are skipped.
//! - Directory requests (trailing `/`) resolve against `index.html`.
//! - If no artifact matches, the original resource is served — unless the
//!   client forbade it with `identity;q=0` (or `*;q=0` with no overriding
//!   `identity` entry), in which case the response is `406 Not Acceptable`
//!   and the backend is never invoked.
//!
//! # Response Modifications
//!
//! When an artifact is served:
//! - `Content-Encoding` is set to the negotiated token
//! - `Content-Length` is the artifact's size, not the original's
//! - `Content-Type` is that of the *original* resource, by extension or by
//!   sniffing its first bytes when the extension is unrecognized; an
//!   artifact whose original type cannot be determined is never served with
//!   encoding headers
//! - the request path handed to the backend is rewritten to the artifact
//! - `Accept-Encoding` is stripped before delegation either way

#![deny(missing_docs)]

mod body;
mod content_type;
mod encoding;
mod future;
mod layer;
mod negotiate;
mod resolve;
mod service;
mod store;

pub use body::ResponseBody;
pub use encoding::EncodingTable;
pub use future::ResponseFuture;
pub use layer::PrecompressedLayer;
pub use negotiate::{
    AcceptedEncoding, IDENTITY, WILDCARD, identity_forbidden, parse_accept_encoding,
};
pub use resolve::INDEX_PAGE;
pub use service::PrecompressedService;
pub use store::{DirStore, FileStore, MemoryStore, StoreChain, StoreFile};
