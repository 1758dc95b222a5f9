//! Update endpoints: reading, listing, scheduling and editing posts.

use serde::Serialize;

use crate::client::{path_segment, Client, NO_BODY};
use crate::error::Error;
use crate::http::HttpMethod;
use crate::options::add_options;
use crate::pipeline::Response;
use crate::types::{
    InteractionList, InteractionListOptions, Update, UpdateCreateOptions, UpdateEditOptions, UpdateEnvelope,
    UpdateList, UpdateListOptions, UpdateReorderOptions, UpdateShuffleOptions, UpdatesEnvelope,
};

/// Operations on updates, the posts Buffer schedules for a profile.
#[derive(Debug, Clone, Copy)]
pub struct UpdateService<'a> {
    client: &'a Client,
}

impl<'a> UpdateService<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn get(&self, update_id: &str) -> Result<Response<Update>, Error> {
        let path = format!("updates/{}.json", path_segment(update_id)?);
        let req = self.client.new_request(HttpMethod::Get, &path, NO_BODY)?;
        self.client.send(&req)
    }

    /// Updates waiting in the profile's queue.
    pub fn pending(&self, profile_id: &str, opts: Option<&UpdateListOptions>) -> Result<Response<UpdateList>, Error> {
        let path = format!("profiles/{}/updates/pending.json", path_segment(profile_id)?);
        self.list(&path, opts)
    }

    /// Updates already posted from the profile.
    pub fn sent(&self, profile_id: &str, opts: Option<&UpdateListOptions>) -> Result<Response<UpdateList>, Error> {
        let path = format!("profiles/{}/updates/sent.json", path_segment(profile_id)?);
        self.list(&path, opts)
    }

    fn list(&self, path: &str, opts: Option<&UpdateListOptions>) -> Result<Response<UpdateList>, Error> {
        let path = add_options(path, opts)?;
        let req = self.client.new_request(HttpMethod::Get, &path, NO_BODY)?;
        self.client.send(&req)
    }

    /// Interactions (retweets, likes, comments, ...) on a sent update.
    pub fn interactions(
        &self,
        update_id: &str,
        opts: Option<&InteractionListOptions>,
    ) -> Result<Response<InteractionList>, Error> {
        let path = format!("updates/{}/interactions.json", path_segment(update_id)?);
        let path = add_options(&path, opts)?;
        let req = self.client.new_request(HttpMethod::Get, &path, NO_BODY)?;
        self.client.send(&req)
    }

    /// Change the order of the profile's pending updates.
    pub fn reorder(&self, profile_id: &str, opts: &UpdateReorderOptions) -> Result<Response<bool>, Error> {
        let path = format!("profiles/{}/updates/reorder.json", path_segment(profile_id)?);
        self.post_for_success(&path, Some(opts))
    }

    /// Randomize the order of the profile's pending updates.
    pub fn shuffle(&self, profile_id: &str, opts: Option<&UpdateShuffleOptions>) -> Result<Response<bool>, Error> {
        let path = format!("profiles/{}/updates/shuffle.json", path_segment(profile_id)?);
        self.post_for_success(&path, opts)
    }

    /// Create one update per profile in `opts.profile_ids`.
    pub fn create(&self, opts: &UpdateCreateOptions) -> Result<Response<Vec<Update>>, Error> {
        let req = self.client.new_request(HttpMethod::Post, "updates/create.json", Some(opts))?;
        let response = self.client.send::<UpdatesEnvelope>(&req)?;
        Ok(response.map(|envelope| envelope.updates))
    }

    /// Edit an update that has not been sent yet.
    pub fn edit(&self, update_id: &str, opts: &UpdateEditOptions) -> Result<Response<Update>, Error> {
        let path = format!("updates/{}/update.json", path_segment(update_id)?);
        let req = self.client.new_request(HttpMethod::Post, &path, Some(opts))?;
        let response = self.client.send::<UpdateEnvelope>(&req)?;
        Ok(response.map(|envelope| envelope.update))
    }

    /// Send a buffered update immediately.
    pub fn share(&self, update_id: &str) -> Result<Response<bool>, Error> {
        let path = format!("updates/{}/share.json", path_segment(update_id)?);
        self.post_for_success(&path, NO_BODY)
    }

    /// Permanently delete an update.
    pub fn destroy(&self, update_id: &str) -> Result<Response<bool>, Error> {
        let path = format!("updates/{}/destroy.json", path_segment(update_id)?);
        self.post_for_success(&path, NO_BODY)
    }

    /// Move an update to the top of the queue.
    pub fn move_to_top(&self, update_id: &str) -> Result<Response<Update>, Error> {
        let path = format!("updates/{}/move_to_top.json", path_segment(update_id)?);
        let req = self.client.new_request(HttpMethod::Post, &path, NO_BODY)?;
        let response = self.client.send::<UpdateEnvelope>(&req)?;
        Ok(response.map(|envelope| envelope.update))
    }

    /// POST and read the `success` flag. A 2xx without content counts as
    /// success.
    fn post_for_success<B>(&self, path: &str, body: Option<&B>) -> Result<Response<bool>, Error>
    where
        B: Serialize + ?Sized,
    {
        let req = self.client.new_request(HttpMethod::Post, path, body)?;
        let response = self.client.send_enveloped::<bool>(&req, "success")?;
        Ok(response.map(|body| body.into_decoded().unwrap_or(true)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::error::DecodeStage;
    use crate::http::HttpResponse;
    use crate::testing::StubTransport;

    fn client_with(status: u16, body: &str) -> (Client, Arc<StubTransport>) {
        let stub = Arc::new(StubTransport::with_responses(vec![HttpResponse::new(status, body)]));
        (Client::new(Some(stub.clone())), stub)
    }

    #[test]
    fn pending_appends_list_options() {
        let (client, stub) = client_with(200, r#"{"total":1,"updates":[{"id":"u1","text":"queued"}]}"#);
        let opts = UpdateListOptions {
            page: 2,
            count: 10,
            ..UpdateListOptions::default()
        };
        let list = client.updates().pending("42", Some(&opts)).unwrap().data;
        assert_eq!(list.total, 1);
        assert_eq!(list.updates[0].text, "queued");
        assert_eq!(
            stub.requests()[0].url,
            "https://api.bufferapp.com/1/profiles/42/updates/pending.json?page=2&count=10"
        );
    }

    #[test]
    fn sent_without_options_has_no_query() {
        let (client, stub) = client_with(200, r#"{"total":0,"updates":[]}"#);
        client.updates().sent("42", None).unwrap();
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/profiles/42/updates/sent.json");
    }

    #[test]
    fn interactions_filter_by_event() {
        let (client, stub) = client_with(
            200,
            r#"{"total":1,"interactions":[{"id":"i1","event":"retweet","user":{"username":"bufferapp"}}]}"#,
        );
        let opts = InteractionListOptions {
            event: "retweet".into(),
            ..InteractionListOptions::default()
        };
        let list = client.updates().interactions("u1", Some(&opts)).unwrap().data;
        assert_eq!(list.interactions[0].user.username, "bufferapp");
        assert_eq!(
            stub.requests()[0].url,
            "https://api.bufferapp.com/1/updates/u1/interactions.json?event=retweet"
        );
    }

    #[test]
    fn reorder_posts_json_body_under_form_content_type() {
        let (client, stub) = client_with(200, r#"{"success":true,"updates":[]}"#);
        let opts = UpdateReorderOptions {
            order: vec!["b".into(), "a".into()],
            offset: 1,
            utc: false,
        };
        assert!(client.updates().reorder("42", &opts).unwrap().data);

        let req = &stub.requests()[0];
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"order": ["b", "a"], "offset": 1}));
    }

    #[test]
    fn shuffle_missing_success_is_decode_error() {
        let (client, _) = client_with(200, r#"{"updates":[]}"#);
        let err = client.updates().shuffle("42", None).unwrap_err();
        assert!(matches!(err, Error::Decode { stage: DecodeStage::Field(ref f), .. } if f == "success"));
    }

    #[test]
    fn shuffle_non_boolean_success_is_decode_error() {
        let (client, _) = client_with(200, r#"{"success":"true"}"#);
        let opts = UpdateShuffleOptions { count: 3, utc: true };
        let err = client.updates().shuffle("42", Some(&opts)).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn destroy_with_no_content_is_success() {
        let (client, stub) = client_with(204, "");
        let out = client.updates().destroy("u1").unwrap();
        assert_eq!(out.status(), 204);
        assert!(out.data);
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/updates/u1/destroy.json");
    }

    #[test]
    fn destroy_with_unrelated_json_is_field_decode_error() {
        let (client, _) = client_with(200, r#"{"foo":1}"#);
        let err = client.updates().destroy("u1").unwrap_err();
        assert!(matches!(err, Error::Decode { stage: DecodeStage::Field(ref f), .. } if f == "success"));
        assert_eq!(err.response().map(|m| m.status), Some(200));
    }

    #[test]
    fn get_with_no_content_is_not_a_decode_error() {
        let (client, _) = client_with(204, "");
        let out = client.updates().get("u1").unwrap();
        assert_eq!(out.status(), 204);
        assert_eq!(out.data, Update::default());
    }

    #[test]
    fn create_unwraps_updates_envelope() {
        let (client, stub) = client_with(
            200,
            r#"{"success":true,"buffer_count":10,"updates":[{"id":"n1","profile_id":"p1","text":"hello"}]}"#,
        );
        let opts = UpdateCreateOptions {
            profile_ids: vec!["p1".into()],
            text: "hello".into(),
            ..UpdateCreateOptions::default()
        };
        let updates = client.updates().create(&opts).unwrap().data;
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].profile_id, "p1");
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/updates/create.json");
    }

    #[test]
    fn edit_unwraps_update_envelope() {
        let (client, stub) = client_with(200, r#"{"success":true,"update":{"id":"abc","text":"hi"}}"#);
        let opts = UpdateEditOptions {
            text: "hi".into(),
            ..UpdateEditOptions::default()
        };
        let update = client.updates().edit("abc", &opts).unwrap().data;
        assert_eq!(update.id, "abc");
        assert_eq!(update.text, "hi");
        assert_eq!(stub.requests()[0].url, "https://api.bufferapp.com/1/updates/abc/update.json");
    }

    #[test]
    fn edit_api_error_keeps_response() {
        let (client, _) = client_with(400, r#"{"error":"Update already sent","code":1011}"#);
        let err = client.updates().edit("abc", &UpdateEditOptions::default()).unwrap_err();
        let api = err.as_api().unwrap();
        assert_eq!(api.status, 400);
        assert_eq!(api.code, 1011);
        assert_eq!(api.url(), "https://api.bufferapp.com/1/updates/abc/update.json");
    }

    #[test]
    fn share_destroy_and_move_to_top_paths() {
        let stub = Arc::new(StubTransport::with_responses(vec![
            HttpResponse::new(200, r#"{"success":true}"#),
            HttpResponse::new(200, r#"{"success":true}"#),
            HttpResponse::new(200, r#"{"success":true,"update":{"id":"u9"}}"#),
        ]));
        let client = Client::new(Some(stub.clone()));

        assert!(client.updates().share("u1").unwrap().data);
        assert!(client.updates().destroy("u2").unwrap().data);
        assert_eq!(client.updates().move_to_top("u9").unwrap().data.id, "u9");

        let urls: Vec<String> = stub.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.bufferapp.com/1/updates/u1/share.json",
                "https://api.bufferapp.com/1/updates/u2/destroy.json",
                "https://api.bufferapp.com/1/updates/u9/move_to_top.json",
            ]
        );
    }
}
