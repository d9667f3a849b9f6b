//! HTTP ↔ RPC translation.
//!
//! One hand-maintained table drives both directions. Round trips are
//! guaranteed only for the HTTP codes listed in it.

use super::http;
use super::rpc::RpcCode;

/// The enumerated pairs.
pub const TRANSLATION_TABLE: [(u16, RpcCode); 10] = [
    (http::OK,                  RpcCode::Ok),
    (http::BAD_REQUEST,         RpcCode::InvalidArgument),
    (http::UNAUTHORIZED,        RpcCode::Unauthenticated),
    (http::FORBIDDEN,           RpcCode::PermissionDenied),
    (http::NOT_FOUND,           RpcCode::NotFound),
    (http::CONFLICT,            RpcCode::AlreadyExists),
    (http::TOO_MANY_REQUESTS,   RpcCode::ResourceExhausted),
    (http::NOT_IMPLEMENTED,     RpcCode::Unimplemented),
    (http::SERVICE_UNAVAILABLE, RpcCode::Unavailable),
    (http::GATEWAY_TIMEOUT,     RpcCode::DeadlineExceeded),
];

/// Translate an HTTP status to an RPC code.
///
/// Unlisted codes `>= 500` become `Internal`; everything else unlisted
/// becomes `Unknown`.
pub fn to_rpc_code(status: u16) -> RpcCode {
    TRANSLATION_TABLE
        .iter()
        .find(|(h, _)| *h == status)
        .map(|(_, r)| *r)
        .unwrap_or(if status >= 500 { RpcCode::Internal } else { RpcCode::Unknown })
}

/// Translate a numeric RPC code to an HTTP status.
///
/// Unlisted codes (including out-of-range values) become 500.
pub fn from_rpc_code(code: i32) -> u16 {
    TRANSLATION_TABLE
        .iter()
        .find(|(_, r)| r.code() == code)
        .map(|(h, _)| *h)
        .unwrap_or(http::INTERNAL_SERVER_ERROR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn listed_codes_round_trip() {
        for (status, _) in TRANSLATION_TABLE {
            assert_eq!(from_rpc_code(to_rpc_code(status).code()), status);
        }
    }

    #[test]
    fn known_pairs() {
        assert_eq!(to_rpc_code(404), RpcCode::NotFound);
        assert_eq!(to_rpc_code(404).code(), 5);
        assert_eq!(from_rpc_code(3), 400);
        assert_eq!(to_rpc_code(401).code(), 16);
        assert_eq!(to_rpc_code(504).code(), 4);
    }

    #[test]
    fn forward_fallbacks() {
        assert_eq!(to_rpc_code(500), RpcCode::Internal);
        assert_eq!(to_rpc_code(502), RpcCode::Internal);
        assert_eq!(to_rpc_code(418), RpcCode::Unknown);
        assert_eq!(to_rpc_code(0), RpcCode::Unknown);
    }

    #[test]
    fn reverse_fallbacks() {
        assert_eq!(from_rpc_code(RpcCode::Internal.code()), 500);
        assert_eq!(from_rpc_code(RpcCode::Cancelled.code()), 500);
        assert_eq!(from_rpc_code(99), 500);
        assert_eq!(from_rpc_code(-3), 500);
    }

    proptest! {
        #[test]
        fn reverse_is_total(code in any::<i32>()) {
            let status = from_rpc_code(code);
            prop_assert!(TRANSLATION_TABLE.iter().any(|(h, _)| *h == status) || status == 500);
        }

        #[test]
        fn forward_respects_server_class(status in 0u16..1000) {
            let listed = TRANSLATION_TABLE.iter().any(|(h, _)| *h == status);
            let rpc = to_rpc_code(status);
            if !listed {
                prop_assert_eq!(rpc, if status >= 500 { RpcCode::Internal } else { RpcCode::Unknown });
            }
        }
    }
}
