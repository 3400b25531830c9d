//! Search session over a paged client directory served by a mock tenant.

use std::{sync::Arc, time::Duration};

use authtool::{
    broker::{BrokerSettings, MockAudienceSelector, MockBrowserLauncher, TokenBroker},
    directory::{DirectoryFetcher, HttpManagementApi, RetryPolicy},
    search::{ConsoleEvent, DetailView, ResultLine},
    session::Session,
    store::{ApiDescriptor, ClientProfile, ClientType, TenantProfile},
};
use httpmock::prelude::*;
use serde_json::json;
use testresult::TestResult;

fn tenant(server: &MockServer) -> TenantProfile {
    TenantProfile {
        name: "acme".to_string(),
        domain: server.base_url(),
        apis: vec![ApiDescriptor {
            name: "management".to_string(),
            audience: "https://acme.test/api/v2/".to_string(),
        }],
        default_client: None,
    }
}

fn operator_client() -> ClientProfile {
    ClientProfile {
        name: "operator".to_string(),
        client_id: "operator-id".to_string(),
        client_secret: "operator-secret".to_string(),
        client_type: ClientType::MachineToMachine,
        tenant_name: "acme".to_string(),
        audience: Some("https://acme.test/api/v2/".to_string()),
    }
}

fn clients(prefix: &str, count: usize) -> Vec<serde_json::Value> {
    (0..count)
        .map(|n| json!({ "name": format!("{prefix}-{n:03}"), "client_id": format!("{prefix}-{n}") }))
        .collect()
}

fn broker() -> TokenBroker {
    TokenBroker::new(
        BrokerSettings {
            redirect_port: 0,
            callback_timeout: Duration::from_secs(5),
        },
        Arc::new(MockBrowserLauncher::new()),
        Arc::new(MockAudienceSelector::new()),
    )
}

#[tokio::test]
async fn session_searches_every_page() -> TestResult {
    let server = MockServer::start();
    let tenant = tenant(&server);

    let token = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .body_includes("\"audience\":\"https://acme.test/api/v2/\"");
        then.status(200).json_body(json!({ "access_token": "mgmt-token" }));
    });

    let first = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/clients")
            .query_param("page", "0")
            .header("authorization", "Bearer mgmt-token");
        then.status(200).json_body(json!({
            "total": 130,
            "clients": clients("web", 100),
        }));
    });

    let second = server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/clients")
            .query_param("page", "1")
            .header("authorization", "Bearer mgmt-token");
        then.status(200).json_body(json!({
            "total": 130,
            "clients": [
                { "name": "billing-worker", "client_id": "billing-id", "callbacks": null },
            ],
        }));
    });

    let fetcher = DirectoryFetcher::new(Arc::new(HttpManagementApi::new(
        reqwest::Client::new(),
        &tenant,
    )))
    .with_retry(RetryPolicy {
        interval: Duration::from_millis(1),
        max_retries: 1,
    });

    let mut session = Session::open(&broker(), &fetcher, &operator_client(), &tenant).await?;

    token.assert();
    first.assert();
    second.assert();
    assert_eq!(session.snapshot().len(), 101);

    for c in "billing".chars() {
        session.apply(ConsoleEvent::Char(c));
    }

    let view = session.view();
    assert_eq!(view.match_count(), 1);
    assert_eq!(
        view.results.first().map(ResultLine::plain).as_deref(),
        Some("billing-worker")
    );

    let detail = match &view.detail {
        DetailView::Entry(json) => json.as_str(),
        DetailView::NoMatch => "",
    };
    assert!(detail.contains("\"client_id\": \"billing-id\""), "detail was {detail:?}");
    assert!(detail.contains("\"callbacks\": []"), "detail was {detail:?}");

    session.apply(ConsoleEvent::Char('z'));
    session.apply(ConsoleEvent::Char('z'));

    assert_eq!(session.view().match_count(), 0);
    assert_eq!(session.view().detail, DetailView::NoMatch);

    Ok(())
}

#[tokio::test]
async fn failing_page_aborts_the_session() {
    let server = MockServer::start();
    let tenant = tenant(&server);

    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200).json_body(json!({ "access_token": "mgmt-token" }));
    });

    let failing = server.mock(|when, then| {
        when.method(GET).path("/api/v2/clients");
        then.status(503).body("upstream unavailable");
    });

    let fetcher = DirectoryFetcher::new(Arc::new(HttpManagementApi::new(
        reqwest::Client::new(),
        &tenant,
    )))
    .with_retry(RetryPolicy {
        interval: Duration::from_millis(1),
        max_retries: 2,
    });

    let result = Session::open(&broker(), &fetcher, &operator_client(), &tenant).await;

    assert!(result.is_err(), "session opened despite a failing page");
    assert_eq!(failing.calls(), 3);
}
