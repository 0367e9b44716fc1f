/// `X-API-KEY` gate for client requests
pub mod api_key;

pub use api_key::ClientApiKey;
