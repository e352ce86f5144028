//! Bridge engine with statum state machine for the tick loop
//!
//! # State Machine
//!
//! ```text
//! Configured ──► Active ──► Stopped
//!                  │
//!            (tick every 10ms)
//! ```
//!
//! # One tick
//!
//! ```text
//! InputSource::poll ──► Translator::translate ──► InjectionSink::inject
//!        │                      ▲                        (one batch)
//!        └── error: skip tick   └── TranslatorState
//! ```

use std::time::Duration;

use statum::{machine, state};
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::bridge::stats::TickStats;
use crate::config::BridgeConfig;
use crate::controller::InputSource;
use crate::injection::InjectionSink;
use crate::mapping::{Translator, TranslatorState};

/// Loop timing and buffer size
#[derive(Debug, Clone)]
pub struct BridgeSettings {
    pub tick_interval: Duration,
    pub max_events_per_tick: usize,
    pub stats_interval: chrono::Duration,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self::from(&BridgeConfig::default())
    }
}

impl From<&BridgeConfig> for BridgeSettings {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            tick_interval: config.tick_interval(),
            max_events_per_tick: config.max_events_per_tick,
            stats_interval: config.stats_interval(),
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing to inject
    Idle,
    /// One batch with this many events was injected
    Injected(usize),
    /// The source failed, state left untouched
    SourceFailed,
    /// The batch was produced but the sink rejected it
    InjectFailed,
}

#[state]
#[derive(Debug, Clone)]
pub enum BridgeState {
    Configured,
    Active,
    Stopped,
}

/// Owns the source, the sink and the translator state for the whole run
#[machine]
pub struct Bridge<S: BridgeState> {
    // Fields drop in declaration order: the sink is released before the source
    sink: Box<dyn InjectionSink>,
    source: Box<dyn InputSource>,
    translator: Translator,
    translator_state: TranslatorState,
    settings: BridgeSettings,
    stats: TickStats,
}

impl<S: BridgeState> Bridge<S> {
    pub fn translator_state(&self) -> TranslatorState {
        self.translator_state
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }
}

impl Bridge<Configured> {
    pub fn create(
        source: Box<dyn InputSource>,
        sink: Box<dyn InjectionSink>,
        translator: Translator,
        settings: BridgeSettings,
    ) -> Self {
        info!(
            "Configuring bridge for {} with settings: {:?}",
            source.device_name(),
            settings
        );
        let stats = TickStats::new(settings.stats_interval);

        Self::new(
            sink,
            source,
            translator,
            TranslatorState::default(),
            settings,
            stats,
        )
    }

    pub fn activate(self) -> Bridge<Active> {
        info!("Activating bridge");
        self.transition()
    }
}

impl Bridge<Active> {
    /// Runs one poll → translate → inject cycle
    pub fn tick(&mut self) -> TickOutcome {
        let events = match self.source.poll(self.settings.max_events_per_tick) {
            Ok(events) => events,
            Err(e) => {
                if e.is_transient() {
                    warn!("Error getting device data: {}", e);
                } else {
                    error!("Input source failed: {}", e);
                }
                self.stats.record_failure();
                return TickOutcome::SourceFailed;
            }
        };

        let batch = self
            .translator
            .translate(&events, &mut self.translator_state);

        if batch.is_empty() {
            self.stats.record(events.len(), 0);
            return TickOutcome::Idle;
        }

        debug!(
            "Injecting {} events from {} controller events",
            batch.len(),
            events.len()
        );

        match self.sink.inject(&batch) {
            Ok(()) => {
                self.stats.record(events.len(), batch.len());
                TickOutcome::Injected(batch.len())
            }
            Err(e) => {
                warn!("Failed to inject input batch: {}", e);
                self.stats.record_failure();
                TickOutcome::InjectFailed
            }
        }
    }

    /// Ticks at the configured interval until the token is cancelled
    ///
    /// Ticks never overlap; a tick that runs late skips the missed ones instead
    /// of bursting to catch up.
    pub async fn run_until_shutdown(mut self, shutdown: CancellationToken) -> Bridge<Stopped> {
        info!(
            "Starting tick loop every {:?}",
            self.settings.tick_interval
        );

        let mut interval = time::interval(self.settings.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received");
                    break;
                }

                _ = interval.tick() => {
                    self.tick();
                    self.stats.maybe_log();
                }
            }
        }

        info!("Transitioning to Stopped state");
        self.transition()
    }
}

impl Bridge<Stopped> {
    /// Releases the injection device, then the controller
    pub fn shutdown(self) -> TranslatorState {
        let final_state = self.translator_state;
        info!("Releasing devices, final state: {:?}", final_state);
        drop(self);
        final_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{ControlId, ControllerEvent, SourceError};
    use crate::injection::InjectionError;
    use crate::mapping::{Key, SyntheticInputEvent};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    type Batches = Rc<RefCell<Vec<Vec<SyntheticInputEvent>>>>;

    // Replays one scripted poll result per tick, cancels the token once empty
    struct ScriptedSource {
        ticks: VecDeque<Result<Vec<ControllerEvent>, SourceError>>,
        requested: Rc<RefCell<Vec<usize>>>,
        done: Option<CancellationToken>,
    }

    impl ScriptedSource {
        fn new(ticks: Vec<Result<Vec<ControllerEvent>, SourceError>>) -> Self {
            Self {
                ticks: ticks.into(),
                requested: Rc::new(RefCell::new(Vec::new())),
                done: None,
            }
        }
    }

    impl InputSource for ScriptedSource {
        fn poll(&mut self, max_events: usize) -> Result<Vec<ControllerEvent>, SourceError> {
            self.requested.borrow_mut().push(max_events);
            match self.ticks.pop_front() {
                Some(result) => result,
                None => {
                    if let Some(token) = &self.done {
                        token.cancel();
                    }
                    Ok(Vec::new())
                }
            }
        }
    }

    struct RecordingSink {
        batches: Batches,
        fail: bool,
    }

    impl InjectionSink for RecordingSink {
        fn inject(&mut self, batch: &[SyntheticInputEvent]) -> Result<(), InjectionError> {
            if self.fail {
                return Err(InjectionError::Submit("device gone".to_string()));
            }
            self.batches.borrow_mut().push(batch.to_vec());
            Ok(())
        }
    }

    fn bridge(source: ScriptedSource, fail: bool) -> (Bridge<Active>, Batches) {
        let batches: Batches = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink {
            batches: batches.clone(),
            fail,
        };
        let settings = BridgeSettings {
            tick_interval: Duration::from_millis(1),
            ..BridgeSettings::default()
        };
        let bridge = Bridge::create(
            Box::new(source),
            Box::new(sink),
            Translator::default(),
            settings,
        )
        .activate();
        (bridge, batches)
    }

    fn key(key: Key, down: bool) -> SyntheticInputEvent {
        SyntheticInputEvent::Key { key, down }
    }

    #[test]
    fn one_batch_per_tick_in_order() {
        let source = ScriptedSource::new(vec![Ok(vec![
            ControllerEvent::button(0, true),
            ControllerEvent::new(ControlId::AxisY, 0),
            ControllerEvent::button(0, false),
        ])]);
        let (mut bridge, batches) = bridge(source, false);

        assert_eq!(bridge.tick(), TickOutcome::Injected(3));

        assert_eq!(
            *batches.borrow(),
            vec![vec![
                key(Key::R, true),
                key(Key::W, true),
                key(Key::R, false)
            ]]
        );
    }

    #[test]
    fn polls_with_configured_buffer_size() {
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);
        let requested = source.requested.clone();
        let (mut bridge, _) = bridge(source, false);

        bridge.tick();

        assert_eq!(*requested.borrow(), vec![32]);
    }

    #[test]
    fn empty_ticks_are_not_injected() {
        let source = ScriptedSource::new(vec![Ok(Vec::new())]);
        let (mut bridge, batches) = bridge(source, false);

        assert_eq!(bridge.tick(), TickOutcome::Idle);
        assert!(batches.borrow().is_empty());
    }

    #[test]
    fn source_failure_leaves_state_untouched() {
        let source = ScriptedSource::new(vec![
            Ok(vec![
                ControllerEvent::new(ControlId::AxisX, 65000),
                ControllerEvent::new(ControlId::AxisY, 0),
            ]),
            Err(SourceError::Read("buffer overflow".to_string())),
        ]);
        let (mut bridge, batches) = bridge(source, false);

        bridge.tick();
        let before = bridge.translator_state();

        assert_eq!(bridge.tick(), TickOutcome::SourceFailed);
        assert_eq!(bridge.translator_state(), before);
        assert_eq!(batches.borrow().len(), 1);
        assert_eq!(bridge.stats().failed_ticks, 1);
    }

    #[test]
    fn strafe_keeps_turning_after_failure() {
        let source = ScriptedSource::new(vec![
            Ok(vec![ControllerEvent::new(ControlId::AxisX, 0)]),
            Err(SourceError::Disconnected("pad".to_string())),
            Ok(Vec::new()),
        ]);
        let (mut bridge, batches) = bridge(source, false);

        bridge.tick();
        bridge.tick();
        bridge.tick();

        assert_eq!(
            *batches.borrow(),
            vec![
                vec![SyntheticInputEvent::MouseMove { dx: -20 }],
                vec![SyntheticInputEvent::MouseMove { dx: -20 }],
            ]
        );
    }

    #[test]
    fn sink_failure_is_not_fatal() {
        let source = ScriptedSource::new(vec![
            Ok(vec![ControllerEvent::button(9, true)]),
            Ok(vec![ControllerEvent::button(9, false)]),
        ]);
        let (mut bridge, _) = bridge(source, true);

        assert_eq!(bridge.tick(), TickOutcome::InjectFailed);
        assert_eq!(bridge.tick(), TickOutcome::InjectFailed);
        assert_eq!(bridge.stats().failed_ticks, 2);
    }

    #[test]
    fn oversized_stats_interval_does_not_panic() {
        let config = BridgeConfig {
            stats_interval_secs: 10_000_000_000_000_000,
            ..BridgeConfig::default()
        };

        let settings = BridgeSettings::from(&config);

        assert_eq!(settings.stats_interval, chrono::Duration::days(1));
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_loop() {
        let (bridge, batches) = bridge(ScriptedSource::new(Vec::new()), false);
        let token = CancellationToken::new();
        token.cancel();

        let stopped = bridge.run_until_shutdown(token).await;

        assert_eq!(stopped.shutdown(), TranslatorState::default());
        assert!(batches.borrow().is_empty());
    }

    #[tokio::test]
    async fn loop_injects_each_tick_until_shutdown() {
        let token = CancellationToken::new();
        let mut source = ScriptedSource::new(vec![
            Ok(vec![ControllerEvent::new(ControlId::AxisY, 500)]),
            Ok(vec![ControllerEvent::new(ControlId::AxisY, 500)]),
            Ok(vec![ControllerEvent::new(ControlId::AxisY, 40000)]),
        ]);
        source.done = Some(token.clone());
        let (bridge, batches) = bridge(source, false);

        let stopped = bridge.run_until_shutdown(token).await;

        assert_eq!(
            *batches.borrow(),
            vec![vec![key(Key::W, true)], vec![key(Key::W, false)]]
        );
        assert!(!stopped.shutdown().moving_forward);
    }
}
