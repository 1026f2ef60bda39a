/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

// tests/ufm_client.rs
// UfmClient against a mock UFM REST server.

mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use common::{GUID_1, GUID_2, closed_endpoint, guid, pkey, spawn_server};
use ib_partition_binder::config::VerifyCa;
use ib_partition_binder::ufm::{
    MemberOptions, Membership, PartitionApi, UfmClient, UfmError,
};

// RecordedRequest is one request the mock UFM received.
#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path_and_query: String,
    authorization: Option<String>,
    body: String,
}

#[derive(Default)]
struct MockUfm {
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockUfm {
    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

const LISTING: &str = r#"{
    "0x7fff": {"partition": "Default", "ip_over_ib": true, "guids": []},
    "0x3e7e": {
        "partition": "management",
        "ip_over_ib": true,
        "guids": [
            {"guid": "04bd700300374486", "membership": "full", "index0": true},
            {"guid": "04bd700300374487", "membership": "limited", "index0": false}
        ]
    }
}"#;

const SINGLE: &str = r#"{
    "partition": "management",
    "ip_over_ib": true,
    "guids": [{"guid": "04bd700300374486", "membership": "full", "index0": true}]
}"#;

async fn handle(
    State(mock): State<Arc<MockUfm>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    mock.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path_and_query: uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_default(),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });

    let path = uri.path();
    match (method.as_str(), path) {
        ("GET", "/ufmRest/resources/pkeys") => (StatusCode::OK, LISTING.to_string()),
        ("GET", "/ufmRest/resources/pkeys/0x3e7e") => (StatusCode::OK, SINGLE.to_string()),
        ("POST", "/ufmRest/resources/pkeys/") => (StatusCode::OK, String::new()),
        ("PUT", "/ufmRest/resources/pkeys") => (StatusCode::OK, String::new()),
        ("DELETE", "/ufmRest/resources/pkeys/0x10") => {
            (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
        }
        ("DELETE", "/ufmRest/resources/pkeys/0x11") => {
            (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
        }
        ("DELETE", "/ufmRest/resources/pkeys/0x12") => {
            (StatusCode::BAD_REQUEST, "bad pkey".to_string())
        }
        ("DELETE", p) if p.starts_with("/ufmRest/resources/pkeys/0x3e7e") => {
            (StatusCode::OK, String::new())
        }
        _ => (StatusCode::NOT_FOUND, "Not Found".to_string()),
    }
}

async fn setup() -> (UfmClient, Arc<MockUfm>) {
    let mock = Arc::new(MockUfm::default());
    let router = Router::new().fallback(handle).with_state(mock.clone());
    let endpoint = spawn_server(router).await;
    let client = UfmClient::new(
        &endpoint,
        Some("admin".to_string()),
        Some("123456".to_string()),
        &VerifyCa::System,
        Duration::from_secs(5),
    )
    .unwrap();
    (client, mock)
}

#[tokio::test]
async fn test_list_pkeys() {
    let (client, mock) = setup().await;

    let pkeys = client.list(true).await.unwrap();
    let names: Vec<&str> = pkeys.iter().map(|pkey| pkey.pkey.as_str()).collect();
    assert_eq!(names, vec!["0x3e7e", "0x7fff"]);
    assert_eq!(pkeys[0].partition.as_deref(), Some("management"));
    assert_eq!(pkeys[0].guids.len(), 2);
    assert_eq!(pkeys[0].guids[1].membership, Membership::Limited);
    assert!(pkeys[1].guids.is_empty());

    let requests = mock.requests();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path_and_query, "/ufmRest/resources/pkeys?guids_data=true");
    // admin:123456
    assert_eq!(requests[0].authorization.as_deref(), Some("Basic YWRtaW46MTIzNDU2"));
}

#[tokio::test]
async fn test_get_pkey() {
    let (client, mock) = setup().await;

    let pkey_entry = client.get(pkey(0x3e7e), false).await.unwrap();
    assert_eq!(pkey_entry.pkey, "0x3e7e");
    assert_eq!(pkey_entry.guids[0].guid, GUID_1);
    assert_eq!(
        mock.requests()[0].path_and_query,
        "/ufmRest/resources/pkeys/0x3e7e?guids_data=false"
    );

    let err = client.get(pkey(0x20), true).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_add_members_payload() {
    let (client, mock) = setup().await;

    client
        .add_members(
            pkey(0x3e7e),
            &[guid(GUID_1), guid(GUID_2)],
            MemberOptions::full(true),
        )
        .await
        .unwrap();
    client
        .add_members(pkey(0x10), &[guid("fefe000300374486")], MemberOptions::limited(false))
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path_and_query, "/ufmRest/resources/pkeys/");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "guids": [GUID_1, GUID_2],
            "ip_over_ib": true,
            "index0": true,
            "membership": "full",
            "pkey": "0x3e7e",
        })
    );

    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    assert_eq!(body["membership"], "limited");
    assert_eq!(body["index0"], false);
    assert_eq!(body["pkey"], "0x10");
}

#[tokio::test]
async fn test_replace_members_payload() {
    let (client, mock) = setup().await;

    client
        .replace(pkey(0x3e7e), &[guid(GUID_1)], MemberOptions::default())
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].method, "PUT");
    assert_eq!(requests[0].path_and_query, "/ufmRest/resources/pkeys");
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["guids"], serde_json::json!([GUID_1]));
}

#[tokio::test]
async fn test_remove_members() {
    let (client, mock) = setup().await;

    client
        .remove_members(pkey(0x3e7e), &[guid(GUID_1), guid(GUID_2)])
        .await
        .unwrap();
    assert_eq!(
        mock.requests()[0].path_and_query,
        "/ufmRest/resources/pkeys/0x3e7e/guids/04bd700300374486,04bd700300374487"
    );

    let err = client
        .remove_members(pkey(0x20), &[guid(GUID_1)])
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    // Nothing to remove means no request at all.
    client.remove_members(pkey(0x20), &[]).await.unwrap();
    assert_eq!(mock.requests().len(), 2);
}

#[tokio::test]
async fn test_error_classification() {
    let (client, _mock) = setup().await;

    let err = client.delete(pkey(0x10)).await.unwrap_err();
    assert!(
        matches!(&err, UfmError::ServerError { status: 500, body, .. } if body == "boom"),
        "{err:?}"
    );

    let err = client.delete(pkey(0x11)).await.unwrap_err();
    assert!(matches!(err, UfmError::AccessDenied { status: 401, .. }), "{err:?}");

    let err = client.delete(pkey(0x12)).await.unwrap_err();
    assert!(matches!(err, UfmError::BadRequest { .. }), "{err:?}");

    client.delete(pkey(0x3e7e)).await.unwrap();
}

#[tokio::test]
async fn test_connection_error() {
    let endpoint = closed_endpoint().await;
    let client = UfmClient::new(&endpoint, None, None, &VerifyCa::System, Duration::from_secs(2))
        .unwrap();

    let err = client.list(false).await.unwrap_err();
    assert!(matches!(err, UfmError::ConnectionError { .. }), "{err:?}");
    assert!(!err.is_not_found());
}
