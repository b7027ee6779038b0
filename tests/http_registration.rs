// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP registration client using wiremock.

#![cfg(feature = "http")]

use std::sync::Arc;
use std::time::Duration;

use webpush_lib::platform::MemoryPlatform;
use webpush_lib::{
    Error, HttpRegistrationClient, ParseError, ProtocolError, PushConfig, PushNotifications,
    PushSubscription, RegistrationConfig, RegistrationServer, ServerRegistrationId,
    SubscriptionKeys,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn subscription() -> PushSubscription {
    PushSubscription::new(
        "https://push.example.com/send/abc123",
        SubscriptionKeys {
            p256dh: "BClientPublicKey".to_string(),
            auth: "client-auth".to_string(),
        },
    )
}

fn client(server: &MockServer) -> HttpRegistrationClient {
    HttpRegistrationClient::new(server.uri()).unwrap()
}

// ============================================================================
// Submit
// ============================================================================

mod submit {
    use super::*;

    #[tokio::test]
    async fn posts_subscription_and_returns_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "endpoint": "https://push.example.com/send/abc123",
                "keys": {"p256dh": "BClientPublicKey", "auth": "client-auth"}
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "srv-42"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = client(&mock_server).submit(&subscription()).await.unwrap();
        assert_eq!(id.as_str(), "srv-42");
    }

    #[tokio::test]
    async fn accepts_numeric_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 42})))
            .mount(&mock_server)
            .await;

        let id = client(&mock_server).submit(&subscription()).await.unwrap();
        assert_eq!(id, ServerRegistrationId::new("42").unwrap());
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .submit(&subscription())
            .await
            .unwrap_err();

        match err {
            Error::Protocol(ProtocolError::Rejected { status, reason }) => {
                assert_eq!(status, 500);
                assert_eq!(reason, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_id_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "stored"})),
            )
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .submit(&subscription())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::MissingField(ref field)) if field == "id"));
    }

    #[tokio::test]
    async fn empty_id_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": ""})))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .submit(&subscription())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server)
            .submit(&subscription())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Parse(ParseError::Json(_))));
    }

    #[tokio::test]
    async fn configured_headers_are_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/subscription"))
            .and(header("x-client", "web"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "a"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = RegistrationConfig::new(format!("{}/api/", mock_server.uri()))
            .with_header("x-client", "web")
            .into_client()
            .unwrap();

        assert!(client.submit(&subscription()).await.is_ok());
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"id": "late"}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = RegistrationConfig::new(mock_server.uri())
            .with_timeout(Duration::from_millis(50))
            .into_client()
            .unwrap();

        let err = client.submit(&subscription()).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(ProtocolError::Timeout(50))));
    }
}

// ============================================================================
// Fetch status
// ============================================================================

mod fetch_status {
    use super::*;

    #[tokio::test]
    async fn known_id_succeeds() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/subscription/srv-42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "srv-42",
                "endpoint": "https://push.example.com/send/abc123"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let id = ServerRegistrationId::new("srv-42").unwrap();
        assert!(client(&mock_server).fetch_status(&id).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_id_is_rejected() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/subscription/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let id = ServerRegistrationId::new("missing").unwrap();
        let err = client(&mock_server).fetch_status(&id).await.unwrap_err();

        match err {
            Error::Protocol(protocol) => assert_eq!(protocol.status(), Some(404)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_protocol_error() {
        // Nothing listens on the discard port
        let client = HttpRegistrationClient::new("http://127.0.0.1:9").unwrap();
        let id = ServerRegistrationId::new("srv-42").unwrap();

        let err = client.fetch_status(&id).await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}

// ============================================================================
// End to end
// ============================================================================

mod lifecycle {
    use super::*;

    async fn machine(
        mock_server: &MockServer,
    ) -> PushNotifications<MemoryPlatform, HttpRegistrationClient> {
        let config = PushConfig::new()
            .with_application_server_key("BVapidPublicKey")
            .with_server_url(mock_server.uri());
        let push = PushNotifications::with_http(Arc::new(MemoryPlatform::new()), &config).unwrap();

        assert!(push.bootstrap().await.is_completed());
        assert!(push.request_consent().await.is_completed());
        assert!(push.subscribe().await.is_completed());
        push
    }

    #[tokio::test]
    async fn register_then_confirm() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": "srv-42"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/subscription/srv-42"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let push = machine(&mock_server).await;

        assert!(push.register_with_server().await.is_completed());
        assert_eq!(
            push.state()
                .push_server_subscription_id()
                .map(ServerRegistrationId::as_str),
            Some("srv-42")
        );

        assert!(push.confirm_with_server().await.is_completed());
        let state = push.state();
        assert!(state.error().is_none());
        assert!(!state.loading());
    }

    #[tokio::test]
    async fn server_failure_lands_in_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/subscription"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let push = machine(&mock_server).await;
        let outcome = push.register_with_server().await;

        let state = push.state();
        let error = state.error().unwrap();
        assert_eq!(error.name, "NetworkError");
        assert_eq!(error.code, 503);
        assert_eq!(outcome.error(), Some(error));
        assert!(state.push_server_subscription_id().is_none());
        assert!(state.user_subscription().is_some());
    }

    #[tokio::test]
    async fn missing_server_url_is_rejected() {
        let result = PushNotifications::with_http(Arc::new(MemoryPlatform::new()), &PushConfig::new());
        assert!(matches!(
            result,
            Err(Error::Protocol(ProtocolError::InvalidAddress(_)))
        ));
    }
}
