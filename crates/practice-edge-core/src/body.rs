use std::fmt;

use bytes::{Bytes, BytesMut};
use futures_util::stream::{LocalBoxStream, Stream, StreamExt};
use serde::Serialize;

/// Chunk stream carried by streaming bodies. `LocalBoxStream` keeps it usable on `wasm32` targets
/// without thread support.
pub type BodyStream = LocalBoxStream<'static, Result<Bytes, anyhow::Error>>;

/// HTTP body that is either one in-memory buffer or an opaque stream of chunks.
///
/// Proxied upstream payloads are never inspected: adapters hand them over as whichever variant
/// their platform produces and the handlers pass them through untouched.
pub enum Body {
    Once(Bytes),
    Stream(BodyStream),
}

impl Body {
    pub fn empty() -> Self {
        Self::Once(Bytes::new())
    }

    pub fn from_bytes<B>(bytes: B) -> Self
    where
        B: Into<Bytes>,
    {
        Self::Once(bytes.into())
    }

    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + 'static,
        anyhow::Error: From<E>,
    {
        Self::Stream(
            stream
                .map(|chunk| chunk.map_err(anyhow::Error::from))
                .boxed_local(),
        )
    }

    pub fn text<S>(text: S) -> Self
    where
        S: Into<String>,
    {
        Self::from_bytes(text.into().into_bytes())
    }

    pub fn json<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
    {
        serde_json::to_vec(value).map(Self::from_bytes)
    }

    /// Buffered contents, or `None` for a streaming body.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Body::Once(bytes) => Some(bytes.as_ref()),
            Body::Stream(_) => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Once(bytes) if bytes.is_empty())
    }

    pub fn into_stream(self) -> Option<BodyStream> {
        match self {
            Body::Once(_) => None,
            Body::Stream(stream) => Some(stream),
        }
    }

    /// Drain the body into a single buffer.
    pub async fn collect(self) -> Result<Bytes, anyhow::Error> {
        match self {
            Body::Once(bytes) => Ok(bytes),
            Body::Stream(mut stream) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = stream.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Once(bytes) => f
                .debug_struct("Body::Once")
                .field("len", &bytes.len())
                .finish(),
            Body::Stream(_) => f.debug_tuple("Body::Stream").finish(),
        }
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Body::Once(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(value: Vec<u8>) -> Self {
        Body::from_bytes(value)
    }
}

impl From<&'static [u8]> for Body {
    fn from(value: &'static [u8]) -> Self {
        Body::from_bytes(Bytes::from_static(value))
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Body::text(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Body::text(value)
    }
}
