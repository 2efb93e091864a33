use crate::app_config::{AdapterConfig, SessionSettings};
use crate::client::{ClientFactory, DeviceClient, DeviceClientError};
use crate::definitions::{action_definitions, feedback_definitions};
use crate::domain::DeviceKind;
use crate::domain::session::{ConnectionStatus, Session};
use crate::host::Host;
use crate::inventory::{Inventory, InventoryCache, RefreshOutcome};
use std::sync::{Arc, Weak};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug)]
pub enum SessionOutcome {
    /// Authenticated and the inventory is populated.
    Ready,
    Failed(SessionError),
    /// A newer connect or a disconnect took over before this attempt completed.
    Superseded,
    /// No controller address is configured.
    Skipped,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("unable to create a client for '{host}': {source}")]
    ClientUnavailable { host: String, source: DeviceClientError },
    #[error("authentication failed: {0}")]
    AuthenticationFailure(#[source] DeviceClientError),
    #[error("populating the inventory failed for {0:?}")]
    InventoryQueryFailure(Vec<DeviceKind>),
}

/// Owns the single controller session of an adapter: authentication, the inventory
/// refresh that follows it and the maintenance task that keeps both alive.
#[derive(Debug, Clone)]
pub struct ConnectionSupervisor {
    inner: Arc<SupervisorInner>,
}

#[derive(Debug)]
struct SupervisorInner {
    factory: Arc<dyn ClientFactory>,
    host: Arc<dyn Host>,
    inventory: InventoryCache,
    state: Mutex<SessionState>,
}

#[derive(Debug, Default)]
struct SessionState {
    session: Session,
    generation: u64,
    token: CancellationToken,
    client: Option<Arc<dyn DeviceClient>>,
    task: Option<JoinHandle<()>>,
}

impl SessionState {
    fn teardown(&mut self) -> Option<Arc<dyn DeviceClient>> {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation += 1;
        self.client.take()
    }
}

// Everything a single session generation needs, captured when it starts.
#[derive(Debug, Clone)]
struct Attempt {
    generation: u64,
    token: CancellationToken,
    host: String,
    config: AdapterConfig,
}

impl ConnectionSupervisor {
    pub fn new(factory: Arc<dyn ClientFactory>, host: Arc<dyn Host>) -> Self {
        ConnectionSupervisor {
            inner: Arc::new(SupervisorInner {
                factory,
                host,
                inventory: InventoryCache::new(),
                state: Mutex::new(SessionState::default()),
            }),
        }
    }

    pub fn inventory(&self) -> &InventoryCache {
        &self.inner.inventory
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.state.lock().await.session.status()
    }

    pub async fn session(&self) -> Session {
        self.inner.state.lock().await.session.clone()
    }

    /// The client of the current session, once it has authenticated.
    pub async fn client(&self) -> Option<Arc<dyn DeviceClient>> {
        self.inner.state.lock().await.client.clone()
    }

    /// Tears down the current session and starts a new one. Without a configured host
    /// nothing happens and the current session is left as is.
    #[instrument(skip_all, fields(host = config.device().host().unwrap_or_default()))]
    pub async fn connect(&self, config: &AdapterConfig) -> SessionOutcome {
        let Some(host) = config.device().host() else {
            debug!("🔌 No controller address configured, not connecting");
            return SessionOutcome::Skipped;
        };

        let attempt = self.inner.begin(host, config).await;
        let outcome = self.inner.establish(&attempt).await;
        self.inner.schedule(attempt, &outcome).await;
        outcome
    }

    /// Logs out and stops all session activity. Does nothing when there is no session.
    #[instrument(skip(self))]
    pub async fn disconnect(&self) {
        let client = {
            let mut state = self.inner.state.lock().await;
            let client = state.teardown();
            self.inner.inventory.begin_generation(state.generation);

            if client.is_none() && state.session.status() == ConnectionStatus::Disconnected {
                debug!("🔌 No session to disconnect");
                return;
            }
            self.inner.transition(&mut state, ConnectionStatus::Disconnected, "Disconnected");
            client
        };

        if let Some(client) = client {
            debug!("🔌 Logging out...");
            match client.logout().await {
                Ok(()) => debug!("🔌 Logging out... OK"),
                Err(e) => warn!("⚠️ Logging out... failed: {}", e),
            }
        }
        info!("🔌 Controller disconnected");
    }
}

impl SupervisorInner {
    async fn begin(&self, host: &str, config: &AdapterConfig) -> Attempt {
        let mut state = self.state.lock().await;
        if state.teardown().is_some() {
            debug!("🔌 Released the client of the previous session");
        }
        state.token = CancellationToken::new();
        self.inventory.begin_generation(state.generation);

        Attempt {
            generation: state.generation,
            token: state.token.clone(),
            host: host.to_string(),
            config: config.clone(),
        }
    }

    #[instrument(skip_all, fields(generation = attempt.generation))]
    async fn establish(&self, attempt: &Attempt) -> SessionOutcome {
        {
            let mut state = self.state.lock().await;
            if state.generation != attempt.generation {
                return SessionOutcome::Superseded;
            }
            if state.session.status() == ConnectionStatus::Disconnected {
                self.transition(&mut state, ConnectionStatus::Connecting, "Connecting");
            }
        }

        info!("🔌 Connecting to controller {}...", attempt.host);
        let client = match self.factory.create(&attempt.host) {
            Ok(client) => client,
            Err(source) => {
                let error = SessionError::ClientUnavailable {
                    host: attempt.host.clone(),
                    source,
                };
                return self.fail(attempt, error, "Invalid controller address").await;
            }
        };

        let device = attempt.config.device();
        let result = tokio::select! {
            biased;
            _ = attempt.token.cancelled() => {
                debug!("🔌 Connecting to controller {}... superseded", attempt.host);
                return SessionOutcome::Superseded;
            }
            result = client.authenticate(device.user(), device.password()) => result,
        };

        if let Err(e) = result {
            debug!("🔌 Connecting to controller {}... failed: {}", attempt.host, e);
            return self.fail(attempt, SessionError::AuthenticationFailure(e), "Network error").await;
        }

        {
            let mut state = self.state.lock().await;
            if state.generation != attempt.generation {
                return SessionOutcome::Superseded;
            }
            state.client = Some(client.clone());
            self.transition(&mut state, ConnectionStatus::Connected, "Connected");
        }
        info!("🔌 Connecting to controller {}... OK", attempt.host);

        self.refresh(attempt, client.as_ref()).await
    }

    #[instrument(skip_all, fields(generation = attempt.generation))]
    async fn refresh(&self, attempt: &Attempt, client: &dyn DeviceClient) -> SessionOutcome {
        let outcome = tokio::select! {
            biased;
            _ = attempt.token.cancelled() => RefreshOutcome::Discarded,
            outcome = self.inventory.refresh(client, attempt.generation) => outcome,
        };

        match outcome {
            RefreshOutcome::Replaced(inventory) => {
                self.publish(&inventory);
                SessionOutcome::Ready
            }
            RefreshOutcome::PartialFailure(failed) => self.fail(attempt, SessionError::InventoryQueryFailure(failed), "Network error").await,
            RefreshOutcome::Discarded => SessionOutcome::Superseded,
        }
    }

    fn publish(&self, inventory: &Inventory) {
        self.host.set_action_definitions(action_definitions(inventory));
        self.host.set_feedback_definitions(feedback_definitions(inventory));
        debug!("📤 Published action and feedback definitions");
    }

    async fn fail(&self, attempt: &Attempt, error: SessionError, message: &str) -> SessionOutcome {
        let mut state = self.state.lock().await;
        if state.generation != attempt.generation {
            return SessionOutcome::Superseded;
        }

        if self.transition(&mut state, ConnectionStatus::Error, message) {
            error!("❌ {}", error);
        } else {
            debug!("❌ {}", error);
        }
        SessionOutcome::Failed(error)
    }

    // Returns whether the status was emitted to the host
    fn transition(&self, state: &mut SessionState, status: ConnectionStatus, message: &str) -> bool {
        let emit = state.session.transition(status);
        if emit {
            self.host.update_status(status, Some(message));
        }
        emit
    }

    async fn current_client(&self, attempt: &Attempt) -> Option<Arc<dyn DeviceClient>> {
        let state = self.state.lock().await;
        if state.generation != attempt.generation {
            return None;
        }
        state.client.clone()
    }

    async fn schedule(self: &Arc<Self>, attempt: Attempt, outcome: &SessionOutcome) {
        let ready = match outcome {
            SessionOutcome::Ready => true,
            SessionOutcome::Failed(_) => false,
            SessionOutcome::Superseded | SessionOutcome::Skipped => return,
        };

        let generation = attempt.generation;
        let task = tokio::spawn(maintain(Arc::downgrade(self), attempt, ready));

        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.task = Some(task);
        } else {
            task.abort();
        }
    }
}

impl Drop for SupervisorInner {
    fn drop(&mut self) {
        self.state.get_mut().teardown();
    }
}

/// Keeps a session alive: refreshes the inventory periodically while ready and
/// re-establishes the session with backoff after a failure.
#[instrument(skip_all, fields(generation = attempt.generation))]
async fn maintain(supervisor: Weak<SupervisorInner>, attempt: Attempt, mut ready: bool) {
    let settings = attempt.config.session().clone();
    let mut delays = reconnect_delays(&settings);

    loop {
        let delay = if ready {
            settings.refresh_interval()
        } else if settings.reconnect() {
            delays.next()
        } else {
            None
        };
        let Some(delay) = delay else {
            debug!("🕗 Nothing left to schedule for this session");
            break;
        };

        tokio::select! {
            biased;
            _ = attempt.token.cancelled() => break,
            _ = sleep(delay) => {}
        }

        let Some(inner) = supervisor.upgrade() else {
            break;
        };

        let outcome = if ready {
            debug!("🕗 Running scheduled inventory refresh...");
            match inner.current_client(&attempt).await {
                Some(client) => inner.refresh(&attempt, client.as_ref()).await,
                None => SessionOutcome::Superseded,
            }
        } else {
            debug!(?delay, "🕗 Re-establishing session...");
            inner.establish(&attempt).await
        };

        match outcome {
            SessionOutcome::Ready => {
                if !ready {
                    delays = reconnect_delays(&settings);
                }
                ready = true;
            }
            SessionOutcome::Failed(_) => ready = false,
            SessionOutcome::Superseded | SessionOutcome::Skipped => break,
        }
    }
}

// Doubling delays starting at twice `retry_ms`, capped and jittered
fn reconnect_delays(settings: &SessionSettings) -> impl Iterator<Item = Duration> + use<> {
    ExponentialBackoff::from_millis(2)
        .factor(settings.retry_ms().max(1))
        .max_delay(settings.retry_max_delay())
        .map(jitter)
}
