use crate::body::ResponseBody;
use http::{Response, StatusCode, header};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Headers to stamp onto the backend's response when a pre-compressed
/// variant is being served in place of the logical resource.
pub(crate) struct VariantHeaders {
    /// Type of the *uncompressed* logical resource.
    pub content_type: header::HeaderValue,
    /// Size of the compressed artifact, not the original.
    pub content_length: u64,
    /// The negotiated encoding token.
    pub content_encoding: header::HeaderValue,
}

pin_project! {
    /// Future for pre-compressed file service responses.
    #[project = ResponseFutureProj]
    #[allow(missing_docs)]
    pub enum ResponseFuture<F> {
        /// The request was delegated to the backend; `variant` is present
        /// when a compressed artifact is being served.
        Delegated {
            // The backend's response future.
            #[pin]
            inner: F,
            // Headers to apply once the backend responds.
            variant: Option<VariantHeaders>,
        },
        /// Negotiation failed outright; respond without delegating.
        NotAcceptable,
    }
}

impl<F> ResponseFuture<F> {
    pub(crate) fn delegated(inner: F, variant: Option<VariantHeaders>) -> Self {
        Self::Delegated { inner, variant }
    }

    pub(crate) fn not_acceptable() -> Self {
        Self::NotAcceptable
    }
}

impl<F, B, E> Future for ResponseFuture<F>
where
    F: Future<Output = Result<Response<B>, E>>,
{
    type Output = Result<Response<ResponseBody<B>>, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.project() {
            ResponseFutureProj::Delegated { inner, variant } => match inner.poll(cx) {
                Poll::Pending => Poll::Pending,
                Poll::Ready(Err(e)) => Poll::Ready(Err(e)),
                Poll::Ready(Ok(response)) => {
                    let (mut parts, body) = response.into_parts();
                    if let Some(headers) = variant.take() {
                        apply_variant_headers(&mut parts.headers, headers);
                    }
                    Poll::Ready(Ok(Response::from_parts(parts, ResponseBody::inner(body))))
                }
            },
            ResponseFutureProj::NotAcceptable => {
                let mut response = Response::new(ResponseBody::empty());
                *response.status_mut() = StatusCode::NOT_ACCEPTABLE;
                Poll::Ready(Ok(response))
            }
        }
    }
}

fn apply_variant_headers(headers: &mut header::HeaderMap, variant: VariantHeaders) {
    headers.insert(header::CONTENT_TYPE, variant.content_type);
    headers.insert(
        header::CONTENT_LENGTH,
        header::HeaderValue::from(variant.content_length),
    );
    headers.insert(header::CONTENT_ENCODING, variant.content_encoding);
}
