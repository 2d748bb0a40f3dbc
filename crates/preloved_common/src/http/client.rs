use reqwest::{Client, Error as ReqwestError};
use std::time::Duration;

/// Creates a new HTTP client with an explicit request timeout.
///
/// Outbound calls to push providers must never hang a request handler, so
/// every client in the workspace is built through here with a bound.
pub fn create_client(timeout: Duration, follow_redirects: bool) -> Result<Client, ReqwestError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(if follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        })
        .build()
}
