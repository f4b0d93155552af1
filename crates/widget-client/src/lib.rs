//! widget-client: Remote Session Client
//!
//! Talks to the chatbot backend over request/reply HTTP calls, or over a
//! token-streaming WebSocket channel when streaming is enabled. Every
//! failure resolves into a fallback value at this boundary; callers never
//! see a transport error.

mod error;
mod http;
pub mod stream;

pub use error::{ClientError, Result};
pub use http::HttpBackend;
pub use stream::{MessageStream, StreamEvent};
