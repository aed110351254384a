pub mod client_id;

pub use client_id::{client_id_middleware, make_span_with_client_id, ClientId, CLIENT_ID_HEADER};
