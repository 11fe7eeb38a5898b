// ── Setup / unload lifecycle ──
//
// The host-facing entry points. `setup` performs the first refresh and
// either returns a running `Bridge` or fails with `AuthenticationFailed`
// / `NotReady`; `unload` releases every held resource, tolerating
// individual close failures, and reports the platform unload result.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use wattsvision_api::transport::TransportConfig;
use wattsvision_api::{AuthProvider, VisionClient};

use crate::config::BridgeConfig;
use crate::coordinator::Coordinator;
use crate::entity::{ClimateEntity, SwitchEntity, build_entities};
use crate::error::CoreError;

// ── Traits ───────────────────────────────────────────────────────

/// A resource released during unload.
pub trait Closeable {
    async fn close(&mut self) -> Result<(), CoreError>;
}

/// The host's side of the unload handshake: tearing down whatever entity
/// platforms it registered for this bridge.
pub trait HostPlatform {
    async fn unload_platforms(&self) -> bool;
}

// ── Resource impls ───────────────────────────────────────────────

impl Closeable for Arc<VisionClient> {
    async fn close(&mut self) -> Result<(), CoreError> {
        // The pooled connections are released when the last clone of the
        // inner reqwest client drops, which happens once the coordinator
        // tasks have stopped and this handle goes out of scope.
        debug!("API client released");
        Ok(())
    }
}

impl Closeable for Arc<AuthProvider> {
    async fn close(&mut self) -> Result<(), CoreError> {
        debug!("auth provider released");
        Ok(())
    }
}

impl Closeable for Coordinator {
    async fn close(&mut self) -> Result<(), CoreError> {
        Coordinator::close(self).await;
        Ok(())
    }
}

// ── Bridge ───────────────────────────────────────────────────────

/// A running bridge instance: the three owned resources plus the entity
/// adapters built from the first snapshot.
pub struct Bridge {
    client: Arc<VisionClient>,
    auth: Arc<AuthProvider>,
    coordinator: Coordinator,
    climates: Vec<ClimateEntity>,
    switches: Vec<SwitchEntity>,
}

impl Bridge {
    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn climates(&self) -> &[ClimateEntity] {
        &self.climates
    }

    pub fn switches(&self) -> &[SwitchEntity] {
        &self.switches
    }

    /// Hand the entity adapters to the host, leaving the bridge running.
    pub fn take_entities(&mut self) -> (Vec<ClimateEntity>, Vec<SwitchEntity>) {
        (
            std::mem::take(&mut self.climates),
            std::mem::take(&mut self.switches),
        )
    }

    /// Tear the bridge down. See [`unload_resources`].
    pub async fn unload<P: HostPlatform>(self, platform: &P) -> bool {
        unload_resources(self.client, self.auth, self.coordinator, platform).await
    }
}

// ── Setup ────────────────────────────────────────────────────────

/// Set up a bridge: validate credentials, run the first refresh, start
/// polling, and build the entity adapters.
///
/// Bad credentials fail with [`CoreError::AuthenticationFailed`]; a
/// vendor API that cannot be reached or will not serve the first refresh
/// fails with [`CoreError::NotReady`], which the host may retry.
pub async fn setup(config: BridgeConfig, auth: Arc<AuthProvider>) -> Result<Bridge, CoreError> {
    debug!("setting up Vision+ bridge");

    // Surface bad credentials as an auth failure here rather than as a
    // first-refresh not-ready.
    auth.access_token().await.map_err(CoreError::for_setup)?;

    let transport = TransportConfig {
        timeout: config.timeout,
    };
    let http = transport.build_client().map_err(CoreError::for_setup)?;
    let client = Arc::new(VisionClient::new(
        http,
        config.api_base_url.clone(),
        Arc::clone(&auth),
    ));

    let coordinator = Coordinator::new(Arc::clone(&client), config);

    coordinator.first_refresh().await.map_err(|err| match err {
        CoreError::AuthenticationFailed { .. } => err,
        CoreError::UpdateFailed { message } => CoreError::NotReady { reason: message },
        other => other,
    })?;

    coordinator.start().await;

    let (climates, switches) = build_entities(&coordinator);
    info!(
        climates = climates.len(),
        switches = switches.len(),
        "bridge ready"
    );

    Ok(Bridge {
        client,
        auth,
        coordinator,
        climates,
        switches,
    })
}

// ── Unload ───────────────────────────────────────────────────────

/// Close all three resources in order, then run the platform unload.
///
/// Close failures are logged as warnings and never block the remaining
/// closes; the overall result is the platform unload result alone.
pub async fn unload_resources<C, A, K, P>(
    mut client: C,
    mut auth: A,
    mut coordinator: K,
    platform: &P,
) -> bool
where
    C: Closeable,
    A: Closeable,
    K: Closeable,
    P: HostPlatform,
{
    if let Err(err) = client.close().await {
        warn!(error = %err, "error closing API client");
    }
    if let Err(err) = auth.close().await {
        warn!(error = %err, "error closing auth provider");
    }
    if let Err(err) = coordinator.close().await {
        warn!(error = %err, "error closing coordinator");
    }

    let unloaded = platform.unload_platforms().await;
    if unloaded {
        debug!("platforms unloaded");
    } else {
        error!("platform unload failed");
    }
    unloaded
}
