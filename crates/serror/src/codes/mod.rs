//! Status code spaces and the translation between them.
//!
//! # Code Spaces
//!
//! | Space | Type      | Unset / fallback                         |
//! |-------|-----------|------------------------------------------|
//! | HTTP  | `u16`     | `0` = unset; emission defaults to `500`  |
//! | RPC   | [`RpcCode`] | unknown codes translate to HTTP `500`  |
//!
//! # Usage
//!
//! ```rust
//! use serror::codes::{self, RpcCode};
//!
//! assert_eq!(codes::to_rpc_code(codes::NOT_FOUND), RpcCode::NotFound);
//! assert_eq!(codes::from_rpc_code(RpcCode::InvalidArgument.code()), codes::BAD_REQUEST);
//! ```

mod convert;
mod http;
mod rpc;

pub use convert::*;
pub use http::*;
pub use rpc::*;
