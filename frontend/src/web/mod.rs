//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装（fetch、LocalStorage、History），
//! 核心逻辑只依赖其中的特性与领域类型。

mod http;
pub mod route;
pub mod router;
mod storage;

#[cfg(test)]
pub(crate) use http::testing;
pub use http::{FetchTransport, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use storage::LocalTokenStore;
