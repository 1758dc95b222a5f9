//! Verify option encoding and error normalization against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each vector file describes inputs, simulated responses and the expected
//! outcome, so the same cases can be replayed by other client
//! implementations.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use buffer_core::{
    add_options, Client, Error, HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UpdateListOptions,
    User,
};
use chrono::{TimeZone, Utc};

/// Transport that answers every request with one canned response.
struct Canned(Mutex<Option<HttpResponse>>);

impl Transport for Canned {
    fn execute(&self, _request: &HttpRequest, _deadline: Option<Duration>) -> Result<HttpResponse, TransportError> {
        self.0
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| TransportError::new("no canned response left"))
    }
}

fn list_options(value: &serde_json::Value) -> Option<UpdateListOptions> {
    if value.is_null() {
        return None;
    }
    Some(UpdateListOptions {
        page: value["page"].as_i64().unwrap(),
        count: value["count"].as_i64().unwrap(),
        since: value["since"].as_i64().map(|s| Utc.timestamp_opt(s, 0).unwrap()),
        utc: value["utc"].as_bool().unwrap(),
    })
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[test]
fn options_test_vectors() {
    let raw = include_str!("../../test-vectors/options.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let path = case["path"].as_str().unwrap();
        let opts = list_options(&case["options"]);

        let encoded = add_options(path, opts.as_ref()).unwrap();
        assert_eq!(encoded, case["expected"].as_str().unwrap(), "{name}: encoded path");
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn error_test_vectors() {
    let raw = include_str!("../../test-vectors/errors.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );
        let client = Client::new(Some(Arc::new(Canned(Mutex::new(Some(response))))));

        let req = client
            .new_request(HttpMethod::Get, case["path"].as_str().unwrap(), None::<&()>)
            .unwrap();
        let result = client.send::<User>(&req);

        let expected = &case["expected"];
        match expected["kind"].as_str().unwrap() {
            "ok" => {
                assert!(result.is_ok(), "{name}: expected success, got {result:?}");
            }
            "api" => {
                let err = result.unwrap_err();
                let api = err.as_api().unwrap_or_else(|| panic!("{name}: expected api error, got {err:?}"));
                assert_eq!(u64::from(api.status), expected["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(api.code, expected["code"].as_i64().unwrap(), "{name}: code");
                assert_eq!(api.message, expected["message"].as_str().unwrap(), "{name}: message");
                assert_eq!(api.url(), expected["url"].as_str().unwrap(), "{name}: url");
                assert!(!err.to_string().contains("shh-very-secret"), "{name}: secret leaked");
            }
            "decode" => {
                let err = result.unwrap_err();
                assert!(matches!(err, Error::Decode { .. }), "{name}: expected decode error, got {err:?}");
                assert_eq!(
                    err.response().map(|m| u64::from(m.status)),
                    expected["status"].as_u64(),
                    "{name}: response kept"
                );
            }
            other => panic!("{name}: unknown kind {other}"),
        }
    }
}
