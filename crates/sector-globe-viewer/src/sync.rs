//! External selection polling.
//!
//! A host application can drive the selection by serving
//! `{ "selection": "<sector key or name>" | null }` at an endpoint. The
//! endpoint is fetched on a fixed interval in the background; results come
//! back over a channel and are applied on the frame thread. Fetch failures
//! are logged and otherwise ignored.

use std::time::Duration;

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use sector_globe::ExternalSelection;

use crate::async_runtime::TaskSpawner;
use crate::globe::{GlobeSession, GlobeSet, SelectionChanged};
use crate::launch_params::LaunchParams;

/// Plugin for externally driven selection.
pub struct SelectionSyncPlugin;

impl Plugin for SelectionSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_selection_sync).add_systems(
            Update,
            (start_poll, apply_poll_results)
                .chain()
                .run_if(resource_exists::<SelectionSync>)
                .in_set(GlobeSet::Input),
        );
    }
}

/// Polling state for the external selection endpoint.
#[derive(Resource)]
pub struct SelectionSync {
    url: String,
    timer: Timer,
    in_flight: bool,
    result_rx: async_channel::Receiver<Result<Option<String>, String>>,
    result_tx: async_channel::Sender<Result<Option<String>, String>>,
}

impl SelectionSync {
    #[must_use]
    pub fn new(url: String, interval: Duration) -> Self {
        let (result_tx, result_rx) = async_channel::bounded(1);
        Self {
            url,
            timer: Timer::new(interval, TimerMode::Repeating),
            in_flight: false,
            result_rx,
            result_tx,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start a fetch if one is due and none is running.
    fn start_request(&mut self, delta: Duration, spawner: &TaskSpawner<'_, '_>) {
        self.timer.tick(delta);
        if !self.timer.just_finished() || self.in_flight {
            return;
        }
        self.in_flight = true;

        let url = self.url.clone();
        let tx = self.result_tx.clone();
        spawner.spawn(async move {
            let result = fetch_external_selection(&url).await;
            let _ = tx.send(result).await;
        });
    }
}

#[allow(clippy::needless_pass_by_value)]
fn setup_selection_sync(mut commands: Commands, params: Res<LaunchParams>) {
    let Some(url) = params.selection_url.clone() else {
        tracing::info!("External selection polling disabled");
        return;
    };
    tracing::info!("Polling {url} every {}s for external selections", params.poll_interval);
    commands.insert_resource(SelectionSync::new(
        url,
        Duration::from_secs_f32(params.poll_interval),
    ));
}

#[allow(clippy::needless_pass_by_value)]
fn start_poll(time: Res<Time>, mut sync: ResMut<SelectionSync>, spawner: TaskSpawner) {
    sync.start_request(time.delta(), &spawner);
}

/// Apply fetched values to the globe state.
fn apply_poll_results(
    mut sync: ResMut<SelectionSync>,
    mut session: ResMut<GlobeSession>,
    mut changes: MessageWriter<SelectionChanged>,
) {
    while let Ok(result) = sync.result_rx.try_recv() {
        sync.in_flight = false;
        match result {
            Ok(value) => {
                let session = &mut *session;
                if let Some(selection) = session
                    .state
                    .apply_external_selection(&session.dataset, value.as_deref())
                {
                    changes.write(SelectionChanged(Some(selection)));
                }
            }
            Err(e) => tracing::debug!("External selection poll failed: {e}"),
        }
    }
}

/// Fetch the externally selected sector.
async fn fetch_external_selection(url: &str) -> Result<Option<String>, String> {
    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .header(reqwest::header::CACHE_CONTROL, "no-store")
        .send()
        .await
        .map_err(|e| format!("Request failed: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }

    let payload: ExternalSelection = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {e}"))?;

    Ok(payload.selection.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_waits_for_interval() {
        let mut sync = SelectionSync::new("http://localhost/selected.json".into(), Duration::from_secs(2));
        sync.timer.tick(Duration::from_millis(1500));
        assert!(!sync.timer.just_finished());
        sync.timer.tick(Duration::from_millis(600));
        assert!(sync.timer.just_finished());
        assert_eq!(sync.url(), "http://localhost/selected.json");
    }
}
