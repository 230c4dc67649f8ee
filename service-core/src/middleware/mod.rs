pub mod tracing;

pub use self::tracing::{REQUEST_ID_HEADER, RequestIdSpan, http_trace_layer, request_id_middleware};
