use chrono::{DateTime, Duration, Utc};
use mockito::{Matcher, Mock, Server, ServerGuard};

use fntrack::{
    Client, ClientError, Content, NewSequenceRevision, PanelLocator, RevisionLocator,
    RevisionedPanel,
};

const BASIC_TEST_CREDENTIAL: &str = "Basic dGVzdC11c2VyOnRlc3QtcGFzcw==";

fn auth_body(expiry: DateTime<Utc>) -> String {
    format!(
        r#"{{
            "id": "test-access-key",
            "secret_access_key": "test-secret",
            "expiry_date": "{}"
        }}"#,
        expiry.format("%Y-%m-%dT%H:%M:%S%.6f")
    )
}

async fn mock_authenticate(server: &mut ServerGuard, expiry: DateTime<Utc>) -> Mock {
    server
        .mock("POST", "/authenticate")
        .match_header("Authorization", BASIC_TEST_CREDENTIAL)
        .match_header("Content-Type", "application/json")
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(auth_body(expiry))
        .create_async()
        .await
}

fn fnauth_header_matcher() -> Matcher {
    Matcher::Regex(r"^FNAUTH test-access-key:[A-Za-z0-9+/]+=*$".to_string())
}

fn date_header_matcher() -> Matcher {
    Matcher::Regex(r"^[A-Z][a-z]{2}, \d{2} [A-Z][a-z]{2} \d{4} \d{2}:\d{2}:\d{2} GMT$".to_string())
}

async fn authenticated_client(server: &mut ServerGuard) -> Client {
    let mock = mock_authenticate(server, Utc::now() + Duration::hours(24)).await;
    let client = Client::new().expect("failed to build client");
    client
        .authenticate(server.url(), "test-user", "test-pass")
        .await
        .expect("authenticate should succeed");
    mock.assert_async().await;
    client
}

#[tokio::test]
async fn authenticate_success_discards_expiry_fraction() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/authenticate")
        .match_header("Authorization", BASIC_TEST_CREDENTIAL)
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(
            r#"{
                "id": "test-access-key",
                "secret_access_key": "test-secret",
                "expiry_date": "2999-01-01T10:00:00.123456"
            }"#,
        )
        .create_async()
        .await;

    let client = Client::new().expect("failed to build client");
    let token = client
        .authenticate(server.url(), "test-user", "test-pass")
        .await
        .expect("authenticate should succeed");

    assert_eq!(token.access_key_id, "test-access-key");
    assert_eq!(token.secret_access_key, "test-secret");
    assert_eq!(token.expiry.to_rfc3339(), "2999-01-01T10:00:00+00:00");

    mock.assert_async().await;
}

#[tokio::test]
async fn authenticate_rejected() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/authenticate")
        .with_status(401)
        .with_body("invalid credentials")
        .create_async()
        .await;

    let client = Client::new().expect("failed to build client");
    let err = client
        .authenticate(server.url(), "test-user", "wrong-pass")
        .await
        .expect_err("authenticate should fail");

    assert!(err.requires_reauthentication());
    match err {
        ClientError::AuthRejected { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "invalid credentials");
        }
        other => panic!("expected ClientError::AuthRejected, got: {:?}", other),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn authenticate_unreachable_host() {
    let client = Client::new().expect("failed to build client");
    let err = client
        .authenticate("http://127.0.0.1:1", "test-user", "test-pass")
        .await
        .expect_err("authenticate should fail against a closed port");

    assert!(matches!(err, ClientError::AuthTransport(_)));
}

#[tokio::test]
async fn request_before_authenticate_is_a_caller_error() {
    let client = Client::new().expect("failed to build client");
    let err = client
        .sequence_revision(&RevisionLocator::new(1, 2, 1))
        .await
        .expect_err("call without prior authenticate should fail");

    assert!(matches!(err, ClientError::Credential(_)));
}

#[tokio::test]
async fn sequence_revision_is_signed_and_token_reused() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let mock = server
        .mock("GET", "/show/1/sequence/2/revision/1")
        .match_header("Authorization", fnauth_header_matcher())
        .match_header("Content-Type", "application/json")
        .match_header("Date", date_header_matcher())
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(
            r#"{
                "revision": 1,
                "comment": "initial",
                "meta_data": {"movie_asset_id": 17}
            }"#,
        )
        .create_async()
        .await;

    let revision = client
        .sequence_revision(&RevisionLocator::new(1, 2, 1))
        .await
        .expect("sequence_revision should succeed");

    assert_eq!(revision.revision, Some(1));
    assert_eq!(revision.comment.as_deref(), Some("initial"));
    assert_eq!(revision.meta_data.unwrap().movie_asset_id, 17);

    // the far-future token from authenticated_client() was reused: the
    // /authenticate mock was asserted at exactly one hit there
    mock.assert_async().await;
}

#[tokio::test]
async fn episode_revision_path() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let mock = server
        .mock("GET", "/show/1/episode/9/sequence/2/revision/3")
        .match_header("Authorization", fnauth_header_matcher())
        .with_status(200)
        .with_body(r#"{"revision": 3}"#)
        .create_async()
        .await;

    let revision = client
        .sequence_revision(&RevisionLocator::new(1, 2, 3).with_episode(9))
        .await
        .expect("sequence_revision should succeed");

    assert_eq!(revision.revision, Some(3));
    mock.assert_async().await;
}

#[tokio::test]
async fn panels_are_unwrapped_from_envelope() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let mock = server
        .mock("GET", "/show/1/sequence/2/revision/1/panels")
        .match_header("Authorization", fnauth_header_matcher())
        .with_status(200)
        .with_body(
            r#"{
                "panels": [
                    {"panel_id": 7, "revision_number": 2, "duration": 12},
                    {"panel_id": 8, "revision_number": 1}
                ]
            }"#,
        )
        .create_async()
        .await;

    let panels = client
        .sequence_revision_panels(&RevisionLocator::new(1, 2, 1))
        .await
        .expect("sequence_revision_panels should succeed");

    assert_eq!(panels.len(), 2);
    assert_eq!(panels[0].panel_id, 7);
    assert_eq!(panels[0].duration, Some(12));
    assert_eq!(panels[1].panel_id, 8);

    mock.assert_async().await;
}

#[tokio::test]
async fn revision_and_panel_dialogues_are_unwrapped() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let revision_mock = server
        .mock("GET", "/show/1/sequence/2/revision/1/dialogues")
        .match_header("Authorization", fnauth_header_matcher())
        .with_status(200)
        .with_body(r#"{"dialogues": [{"dialogue_id": 3, "text": "hello"}]}"#)
        .create_async()
        .await;

    let panel_mock = server
        .mock("GET", "/show/1/sequence/2/panel/7/dialogues")
        .match_header("Authorization", fnauth_header_matcher())
        .with_status(200)
        .with_body(r#"{"dialogues": [{"dialogue_id": 4, "text": "goodbye"}]}"#)
        .create_async()
        .await;

    let revision_dialogues = client
        .revision_dialogues(&RevisionLocator::new(1, 2, 1))
        .await
        .expect("revision_dialogues should succeed");
    assert_eq!(revision_dialogues.len(), 1);
    assert_eq!(revision_dialogues[0].text.as_deref(), Some("hello"));

    let panel_dialogues = client
        .panel_dialogues(&PanelLocator::new(1, 2, 7))
        .await
        .expect("panel_dialogues should succeed");
    assert_eq!(panel_dialogues.len(), 1);
    assert_eq!(panel_dialogues[0].dialogue_id, Some(4));

    revision_mock.assert_async().await;
    panel_mock.assert_async().await;
}

#[tokio::test]
async fn collaborator_unauthorized_is_token_revoked() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let mock = server
        .mock("GET", "/show/1/sequence/2/revision/1")
        .with_status(401)
        .with_body("token revoked")
        .create_async()
        .await;

    let err = client
        .sequence_revision(&RevisionLocator::new(1, 2, 1))
        .await
        .expect_err("revoked token should surface a typed error");

    assert!(matches!(err, ClientError::TokenRevoked));
    assert!(err.requires_reauthentication());

    mock.assert_async().await;
}

#[tokio::test]
async fn near_expiry_token_triggers_one_refresh() {
    let mut server = Server::new_async().await;

    // initial exchange yields a token already inside the 2h margin
    let near_expiry = mock_authenticate(&mut server, Utc::now() + Duration::hours(1)).await;
    let client = Client::new().expect("failed to build client");
    client
        .authenticate(server.url(), "test-user", "test-pass")
        .await
        .expect("authenticate should succeed");
    near_expiry.assert_async().await;
    near_expiry.remove_async().await;

    // the refresh must hit /authenticate again and pick up a fresh token
    let refreshed = mock_authenticate(&mut server, Utc::now() + Duration::hours(24)).await;

    let get_mock = server
        .mock("GET", "/show/1/sequence/2/revision/1")
        .match_header("Authorization", fnauth_header_matcher())
        .with_status(200)
        .with_body(r#"{"revision": 1}"#)
        .create_async()
        .await;

    client
        .sequence_revision(&RevisionLocator::new(1, 2, 1))
        .await
        .expect("sequence_revision should succeed");

    refreshed.assert_async().await;
    get_mock.assert_async().await;
}

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    use std::sync::Arc;
    use tokio::task::JoinSet;

    let mut server = Server::new_async().await;

    let near_expiry = mock_authenticate(&mut server, Utc::now() + Duration::hours(1)).await;
    let client = Arc::new(Client::new().expect("failed to build client"));
    client
        .authenticate(server.url(), "test-user", "test-pass")
        .await
        .expect("authenticate should succeed");
    near_expiry.assert_async().await;
    near_expiry.remove_async().await;

    // exactly one of the racing callers performs the refresh; the rest
    // reuse the fresh far-future token
    let refreshed = mock_authenticate(&mut server, Utc::now() + Duration::hours(24)).await;

    let get_mock = server
        .mock("GET", "/show/1/sequence/2/revision/1")
        .match_header("Authorization", fnauth_header_matcher())
        .with_status(200)
        .with_body(r#"{"revision": 1}"#)
        .expect(4)
        .create_async()
        .await;

    let mut tasks = JoinSet::new();
    for _ in 0..4 {
        let client = Arc::clone(&client);
        tasks.spawn(async move {
            client
                .sequence_revision(&RevisionLocator::new(1, 2, 1))
                .await
        });
    }

    let mut success_count = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap().is_ok() {
            success_count += 1;
        }
    }
    assert_eq!(success_count, 4);

    refreshed.assert_async().await;
    get_mock.assert_async().await;
}

#[tokio::test]
async fn create_sequence_revision_posts_signed_json() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let fetch_mock = server
        .mock("GET", "/show/3/sequence/4/revision/2")
        .with_status(200)
        .with_body(
            r#"{
                "revision": 2,
                "meta_data": {
                    "movie_asset_id": 17,
                    "audio_asset_id": 9,
                    "annotations": [{"id": 1}],
                    "markers": [{"at": 120}]
                }
            }"#,
        )
        .create_async()
        .await;

    let create_mock = server
        .mock("POST", "/show/3/sequence/4/revision")
        .match_header("Authorization", fnauth_header_matcher())
        .match_header("Content-Type", "application/json")
        .match_header("Date", date_header_matcher())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "comment": "relinked",
            "imported": false,
            "meta_data": {
                "movie_asset_id": 0,
                "audio_asset_id": 0,
                "annotations": [{"id": 1}],
                "markers": [{"at": 120}]
            }
        })))
        .with_status(200)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"revision": 3, "comment": "relinked"}"#)
        .create_async()
        .await;

    let revision = client
        .sequence_revision(&RevisionLocator::new(3, 4, 2))
        .await
        .expect("sequence_revision should succeed");

    let panels = vec![];
    let payload = NewSequenceRevision::from_revision(
        &revision,
        RevisionedPanel::from_panels(&panels, None),
        "relinked",
    );
    let created = client
        .create_sequence_revision(3, 4, &payload)
        .await
        .expect("create_sequence_revision should succeed");

    assert_eq!(created.revision, Some(3));
    assert_eq!(created.comment.as_deref(), Some("relinked"));

    fetch_mock.assert_async().await;
    create_mock.assert_async().await;
}

#[tokio::test]
async fn signed_headers_exposes_full_header_set() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    let headers = client
        .signed_headers("GET", "/show/1/sequence/2?page=3", &Content::Empty)
        .await
        .expect("signed_headers should succeed");

    assert_eq!(headers.len(), 3);
    assert!(
        headers
            .get("Authorization")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("FNAUTH test-access-key:")
    );
    assert_eq!(
        headers.get("Content-Type").unwrap().to_str().unwrap(),
        "application/json"
    );
    assert!(
        headers
            .get("Date")
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("GMT")
    );
}

#[tokio::test]
async fn reset_clears_the_session() {
    let mut server = Server::new_async().await;
    let client = authenticated_client(&mut server).await;

    client.reset().await;

    let err = client
        .sequence_revision(&RevisionLocator::new(1, 2, 1))
        .await
        .expect_err("call after reset should fail");
    assert!(matches!(err, ClientError::Credential(_)));
}
