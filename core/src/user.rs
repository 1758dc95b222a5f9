//! User endpoints.

use crate::client::{Client, NO_BODY};
use crate::error::Error;
use crate::http::HttpMethod;
use crate::pipeline::Response;
use crate::types::User;

const USER_PATH: &str = "user.json";
const DEAUTHORIZE_PATH: &str = "user/deauthorize.json";

/// Operations on the authenticated user.
#[derive(Debug, Clone, Copy)]
pub struct UserService<'a> {
    client: &'a Client,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// The user the access token belongs to.
    pub fn get(&self) -> Result<Response<User>, Error> {
        let req = self.client.new_request(HttpMethod::Get, USER_PATH, NO_BODY)?;
        self.client.send(&req)
    }

    /// Revoke the access token. Returns the service's `success` flag; a
    /// response without content counts as success.
    pub fn deauthorize(&self) -> Result<Response<bool>, Error> {
        let req = self.client.new_request(HttpMethod::Post, DEAUTHORIZE_PATH, NO_BODY)?;
        let response = self.client.send_enveloped::<bool>(&req, "success")?;
        Ok(response.map(|body| body.into_decoded().unwrap_or(true)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::HttpResponse;
    use crate::testing::StubTransport;

    #[test]
    fn get_hits_user_json() {
        let stub = Arc::new(StubTransport::with_responses(vec![HttpResponse::new(
            200,
            r#"{"id":"u1","plan":"awesome","timezone":"Europe/London"}"#,
        )]));
        let client = Client::new(Some(stub.clone()));

        let user = client.users().get().unwrap().data;
        assert_eq!(user.id, "u1");
        assert_eq!(user.plan, "awesome");

        let seen = stub.requests();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].url, "https://api.bufferapp.com/1/user.json");
    }

    #[test]
    fn deauthorize_reads_success_flag() {
        let stub = Arc::new(StubTransport::with_responses(vec![HttpResponse::new(200, r#"{"success":true}"#)]));
        let client = Client::new(Some(stub.clone()));

        assert!(client.users().deauthorize().unwrap().data);
        assert_eq!(stub.requests()[0].method, HttpMethod::Post);
    }

    #[test]
    fn deauthorize_no_content_is_success() {
        let stub = Arc::new(StubTransport::with_responses(vec![HttpResponse::new(204, "")]));
        let client = Client::new(Some(stub));

        let out = client.users().deauthorize().unwrap();
        assert_eq!(out.status(), 204);
        assert!(out.data);
    }
}
