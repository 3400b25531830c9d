//! One-shot loopback listener that catches the browser redirect.

use std::{
    future::Future,
    io,
    net::{Ipv4Addr, Ipv6Addr},
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
};
use serde::Deserialize;
use tokio::{
    net::TcpListener,
    sync::{oneshot, watch},
};
use tracing::{debug, info, warn};

use crate::broker::{BrokerError, redirect_uri};

/// How long teardown may take before the server task is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

const IMPLICIT_TOKEN_PAGE: &str = r#"<html>
  <body>
    <h1>authtool</h1>
    <h2>You can close this window and return to authtool.</h2>
    <p style="overflow-wrap: anywhere" id="authToken"></p>
    <script>
      document.getElementById("authToken").textContent = window.location.hash;
    </script>
  </body>
</html>
"#;

const CODE_RECEIVED_PAGE: &str = r#"<html>
  <body>
    <h1>authtool</h1>
    <h2>Authorization code received. Return to authtool to see whether the token exchange succeeded.</h2>
  </body>
</html>
"#;

const MISSING_CODE_PAGE: &str = "Error: could not find 'code' URL parameter\n";

const ALREADY_HANDLED_PAGE: &str = "Error: this login callback was already handled\n";

/// Whether the redirect is expected to carry an authorization code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackMode {
    /// Code flows; a redirect without `code` is an error.
    AuthorizationCode,

    /// Implicit flow; the token sits in the URL fragment, which never
    /// reaches the server.
    Implicit,
}

/// Query parameters of the redirect request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    /// Authorization code.
    #[serde(default)]
    pub code: Option<String>,

    /// Provider error code.
    #[serde(default)]
    pub error: Option<String>,

    /// Provider error explanation.
    #[serde(default)]
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Whether the redirect carried a non-empty `code`.
    #[must_use]
    pub fn has_code(&self) -> bool {
        self.code.as_deref().is_some_and(|code| !code.is_empty())
    }

    /// Authorization code, or [`BrokerError::CallbackMissingCode`].
    ///
    /// # Errors
    ///
    /// Returns an error when the redirect carried no non-empty `code`.
    pub fn into_code(self) -> Result<String, BrokerError> {
        let Self {
            code,
            error,
            error_description,
        } = self;

        code.filter(|code| !code.is_empty())
            .ok_or(BrokerError::CallbackMissingCode {
                error,
                description: error_description,
            })
    }
}

#[derive(Clone)]
struct CallbackState {
    mode: CallbackMode,
    result: Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>,
}

/// Loopback listener bound for a single redirect.
///
/// Listens on `127.0.0.1` and, where available, `[::1]` on the same port so
/// that `localhost` reaches it whichever address family the browser tries
/// first. The port is held from [`CallbackListener::bind`] until
/// [`CallbackListener::wait`] returns, on every path. Dropping an unused
/// listener also frees it.
#[derive(Debug)]
pub struct CallbackListener {
    listeners: Vec<TcpListener>,
    port: u16,
}

impl CallbackListener {
    /// Bind `127.0.0.1:{port}`, then `[::1]` on the same port when the host
    /// has IPv6 loopback. Port `0` picks a free port.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::ListenerBind`] when the IPv4 port is
    /// unavailable.
    pub async fn bind(port: u16) -> Result<Self, BrokerError> {
        let ipv4 = TcpListener::bind((Ipv4Addr::LOCALHOST, port))
            .await
            .map_err(|source| BrokerError::ListenerBind { port, source })?;

        let port = ipv4
            .local_addr()
            .map_err(|source| BrokerError::ListenerBind { port, source })?
            .port();

        let mut listeners = vec![ipv4];

        match TcpListener::bind((Ipv6Addr::LOCALHOST, port)).await {
            Ok(ipv6) => listeners.push(ipv6),
            Err(error) => debug!(port, %error, "IPv6 loopback unavailable; listening on IPv4 only"),
        }

        debug!(port, listeners = listeners.len(), "callback listener bound");

        Ok(Self { listeners, port })
    }

    /// Port actually bound.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Number of loopback addresses being served.
    #[must_use]
    pub fn address_count(&self) -> usize {
        self.listeners.len()
    }

    /// Redirect URI to register with the authorization request.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        redirect_uri(self.port)
    }

    /// Serve until exactly one redirect arrives, the timeout elapses or
    /// `cancel` resolves, then tear every listener down.
    ///
    /// The page for the redirect is flushed to the browser before the servers
    /// stop.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::CallbackTimeout`], [`BrokerError::CallbackCancelled`]
    /// or [`BrokerError::Listener`] when the servers die first.
    pub async fn wait<F>(
        self,
        mode: CallbackMode,
        timeout: Duration,
        cancel: F,
    ) -> Result<CallbackParams, BrokerError>
    where
        F: Future<Output = ()>,
    {
        let Self { listeners, port } = self;
        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let router = Router::new()
            .route("/", get(handle_callback))
            .with_state(CallbackState {
                mode,
                result: Arc::new(Mutex::new(Some(result_tx))),
            });

        let mut servers: Vec<_> = listeners
            .into_iter()
            .map(|listener| {
                let router = router.clone();
                let mut shutdown_rx = shutdown_rx.clone();

                tokio::spawn(async move {
                    axum::serve(listener, router)
                        .with_graceful_shutdown(async move {
                            // A dropped sender also means shut down.
                            shutdown_rx.wait_for(|stop| *stop).await.ok();
                        })
                        .await
                })
            })
            .collect();

        info!(port, ?timeout, "waiting for the browser redirect");

        let outcome = tokio::select! {
            received = result_rx => received.map_err(|_closed| {
                BrokerError::Listener(io::Error::other("callback server stopped before a redirect arrived"))
            }),
            () = tokio::time::sleep(timeout) => Err(BrokerError::CallbackTimeout(timeout)),
            () = cancel => Err(BrokerError::CallbackCancelled),
        };

        if shutdown_tx.send(true).is_err() {
            debug!("callback servers already stopped");
        }

        for server in &mut servers {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut *server).await {
                Ok(Ok(Ok(()))) => debug!("callback listener shut down"),
                Ok(Ok(Err(error))) => warn!(%error, "callback server failed"),
                Ok(Err(error)) => warn!(%error, "callback server task failed"),
                Err(_elapsed) => {
                    warn!("callback server did not stop in time; aborting");
                    server.abort();
                }
            }
        }

        outcome
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> (StatusCode, Html<&'static str>) {
    let sender = state.result.lock().ok().and_then(|mut slot| slot.take());

    let Some(sender) = sender else {
        return (StatusCode::CONFLICT, Html(ALREADY_HANDLED_PAGE));
    };

    let page = match state.mode {
        CallbackMode::AuthorizationCode if !params.has_code() => {
            warn!("redirect is missing the 'code' parameter");
            (StatusCode::BAD_REQUEST, Html(MISSING_CODE_PAGE))
        }
        CallbackMode::AuthorizationCode => (StatusCode::OK, Html(CODE_RECEIVED_PAGE)),
        CallbackMode::Implicit => (StatusCode::OK, Html(IMPLICIT_TOKEN_PAGE)),
    };

    if sender.send(params).is_err() {
        debug!("redirect arrived after the wait ended");
    }

    page
}
