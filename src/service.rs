use crate::content_type::{SniffPool, resolve_content_type};
use crate::encoding::EncodingTable;
use crate::future::{ResponseFuture, VariantHeaders};
use crate::negotiate::{identity_forbidden, parse_accept_encoding};
use crate::resolve::resolve_variant;
use crate::store::StoreChain;
use http::uri::{PathAndQuery, Uri};
use http::{Request, header};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// A Tower service that serves pre-compressed variants of static files.
///
/// For each request it negotiates an encoding from `Accept-Encoding`, probes
/// the store chain for a matching artifact, and on a hit rewrites the request
/// path to the artifact before delegating to the wrapped backend. The backend
/// streams the bytes; this service only decides which bytes and stamps the
/// `Content-Type`, `Content-Length` and `Content-Encoding` headers.
#[derive(Debug, Clone)]
pub struct PrecompressedService<S> {
    inner: S,
    store: StoreChain,
    encodings: EncodingTable,
    sniff_pool: Arc<SniffPool>,
}

/// The composed outcome of negotiation for one request.
enum Plan {
    Identity,
    NotAcceptable,
    Variant {
        artifact_path: String,
        headers: VariantHeaders,
    },
}

impl<S> PrecompressedService<S> {
    pub(crate) fn new(
        inner: S,
        store: StoreChain,
        encodings: EncodingTable,
        sniff_pool: Arc<SniffPool>,
    ) -> Self {
        Self {
            inner,
            store,
            encodings,
            sniff_pool,
        }
    }

    /// Returns a reference to the inner service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Returns a mutable reference to the inner service.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consumes this service, returning the inner service.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn plan(&self, path: &str, accept_encoding: Option<&str>) -> Plan {
        let Some(accept_encoding) = accept_encoding else {
            return Plan::Identity;
        };
        let entries = parse_accept_encoding(accept_encoding);

        for entry in entries.iter().filter(|e| e.weight > 0.0) {
            // identity, * and unknown tokens all fall through here.
            let Some(suffix) = self.encodings.suffix_for(&entry.token) else {
                continue;
            };
            let Some(variant) = resolve_variant(&self.store, path, &entry.token, suffix) else {
                continue;
            };
            let Some(content_type) =
                resolve_content_type(&self.store, &variant.logical_path, &self.sniff_pool)
            else {
                // Never attach encoding headers without a determinable type;
                // treat the artifact as absent and keep going.
                log::debug!(
                    "no content type for {}, skipping {} variant",
                    variant.logical_path,
                    entry.token
                );
                continue;
            };
            let Ok(content_type) = header::HeaderValue::from_str(content_type) else {
                continue;
            };
            let Ok(content_encoding) = header::HeaderValue::from_str(&variant.encoding) else {
                continue;
            };

            log::debug!(
                "serving {} as {} ({})",
                variant.logical_path,
                variant.artifact_path,
                variant.encoding
            );
            return Plan::Variant {
                artifact_path: variant.artifact_path,
                headers: VariantHeaders {
                    content_type,
                    content_length: variant.size,
                    content_encoding,
                },
            };
        }

        if identity_forbidden(&entries) {
            log::debug!("identity disallowed and no variant matched for {path}");
            Plan::NotAcceptable
        } else {
            Plan::Identity
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for PrecompressedService<S>
where
    S: Service<Request<ReqBody>, Response = http::Response<ResBody>>,
{
    type Response = http::Response<crate::body::ResponseBody<ResBody>>;
    type Error = S::Error;
    type Future = ResponseFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let accept_encoding = req
            .headers()
            .get(header::ACCEPT_ENCODING)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        match self.plan(req.uri().path(), accept_encoding.as_deref()) {
            Plan::NotAcceptable => ResponseFuture::not_acceptable(),
            Plan::Identity => {
                // Drop the header so the backend does not re-negotiate.
                req.headers_mut().remove(header::ACCEPT_ENCODING);
                ResponseFuture::delegated(self.inner.call(req), None)
            }
            Plan::Variant {
                artifact_path,
                headers,
            } => {
                req.headers_mut().remove(header::ACCEPT_ENCODING);
                match rewrite_path(&mut req, &artifact_path) {
                    Ok(()) => ResponseFuture::delegated(self.inner.call(req), Some(headers)),
                    // The artifact path cannot be expressed as a URI; serve
                    // the original resource instead.
                    Err(_) => ResponseFuture::delegated(self.inner.call(req), None),
                }
            }
        }
    }
}

/// Replaces the request's path, keeping the query string intact.
fn rewrite_path<B>(req: &mut Request<B>, path: &str) -> Result<(), http::Error> {
    let mut parts = req.uri().clone().into_parts();
    let path_and_query = match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_owned(),
    };
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>()?);
    *req.uri_mut() = Uri::from_parts(parts)?;
    Ok(())
}
