//! Profile endpoints.

use crate::client::{path_segment, Client, NO_BODY};
use crate::error::Error;
use crate::http::HttpMethod;
use crate::pipeline::Response;
use crate::types::{Profile, Schedule};

/// Operations on the social media profiles connected to the account.
#[derive(Debug, Clone, Copy)]
pub struct ProfileService<'a> {
    client: &'a Client,
}

impl<'a> ProfileService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// All profiles of the current user.
    pub fn list(&self) -> Result<Response<Vec<Profile>>, Error> {
        let req = self.client.new_request(HttpMethod::Get, "profiles.json", NO_BODY)?;
        self.client.send(&req)
    }

    pub fn get(&self, profile_id: &str) -> Result<Response<Profile>, Error> {
        let path = format!("profiles/{}.json", path_segment(profile_id)?);
        let req = self.client.new_request(HttpMethod::Get, &path, NO_BODY)?;
        self.client.send(&req)
    }

    /// Posting schedules of a profile.
    pub fn schedules(&self, profile_id: &str) -> Result<Response<Vec<Schedule>>, Error> {
        let path = format!("profiles/{}/schedules.json", path_segment(profile_id)?);
        let req = self.client.new_request(HttpMethod::Get, &path, NO_BODY)?;
        self.client.send(&req)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::HttpResponse;
    use crate::testing::StubTransport;

    fn client_with(body: &str) -> (Client, Arc<StubTransport>) {
        let stub = Arc::new(StubTransport::with_responses(vec![HttpResponse::new(200, body)]));
        (Client::new(Some(stub.clone())), stub)
    }

    #[test]
    fn list_decodes_array() {
        let (client, stub) = client_with(r#"[{"id":"p1","service":"twitter"},{"id":"p2","service":"facebook"}]"#);
        let profiles = client.profiles().list().unwrap().data;
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].service, "facebook");
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/profiles.json");
    }

    #[test]
    fn get_uses_profile_id_in_path() {
        let (client, stub) = client_with(r#"{"id":"42","formatted_username":"@buffer"}"#);
        let profile = client.profiles().get("42").unwrap().data;
        assert_eq!(profile.formatted_username, "@buffer");
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/profiles/42.json");
    }

    #[test]
    fn schedules_path_and_decode() {
        let (client, stub) = client_with(r#"[{"days":["mon"],"times":["09:00","17:30"]}]"#);
        let schedules = client.profiles().schedules("42").unwrap().data;
        assert_eq!(schedules[0].times, vec!["09:00", "17:30"]);
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/profiles/42/schedules.json");
    }

    #[test]
    fn id_cannot_add_path_components() {
        let (client, stub) = client_with("{}");
        client.profiles().get("a/b c").unwrap();
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/profiles/a%2Fb%20c.json");

        let err = client.profiles().schedules("..").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
    }
}
