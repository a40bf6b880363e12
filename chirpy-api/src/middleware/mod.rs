/// Middleware modules for the API server
///
/// - `hits`: counts file server requests
///
/// Bearer authentication lives in `chirpy_shared::auth::middleware`.

pub mod hits;
