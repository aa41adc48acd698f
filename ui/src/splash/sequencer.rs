//! The boot state machine behind the splash screen.
//!
//! All phase changes go through [`SequencerCore::apply`], which is the whole
//! transition table. Every accepted transition bumps an epoch; timer tasks
//! capture the epoch they were started under and stop as soon as it is stale,
//! so starting a phase implicitly cancels the previous phase's timers and a
//! torn-down screen can invalidate everything at once.

use std::time::Duration;

/// The splash title; one animated unit per character.
pub const TITLE: &str = "Entropy";

pub const TAGLINE: &str = "surf the chain!";

pub const CONFIRM_LABEL: &str = "Leverage Entropy";

/// A status phrase: fixed leading text, typed-out punctuation, dwell time.
pub struct Phrase {
    pub base: &'static str,
    pub end: &'static str,
    pub dwell: Duration,
}

/// Cycled in order. The last phrase never auto-advances; it holds until the
/// user confirms.
pub const PHRASES: [Phrase; 4] = [
    Phrase {
        base: "Setting your experience",
        end: "...",
        dwell: Duration::from_millis(2000),
    },
    Phrase {
        base: "Connecting to the network",
        end: "...",
        dwell: Duration::from_millis(2000),
    },
    Phrase {
        base: "Ready to surf the chain",
        end: "???",
        dwell: Duration::from_millis(2000),
    },
    Phrase {
        base: "Let's Go",
        end: "!!!",
        dwell: Duration::from_millis(4000),
    },
];

/// Delay before a phrase fades in.
pub const PHRASE_LEAD_IN: Duration = Duration::from_millis(200);

/// Duration of a phrase's fade-out before the next one starts.
pub const PHRASE_FADE_OUT: Duration = Duration::from_millis(400);

const TYPE_DELAY_BASE_MS: u64 = 80;
const TYPE_JITTER_MS: u64 = 60;

/// Per-character delay for the punctuation typing effect.
pub fn type_delay() -> Duration {
    use rand::Rng;
    Duration::from_millis(TYPE_DELAY_BASE_MS + rand::rng().random_range(0..TYPE_JITTER_MS))
}

/// Sub-phases of the exit transition, run strictly in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStage {
    FadeOut,
    Pulse,
    Expand,
    Hold,
}

pub struct TransitionStep {
    pub stage: TransitionStage,
    pub duration: Duration,
}

pub const TRANSITION_STEPS: [TransitionStep; 4] = [
    TransitionStep {
        stage: TransitionStage::FadeOut,
        duration: Duration::from_millis(800),
    },
    TransitionStep {
        stage: TransitionStage::Pulse,
        duration: Duration::from_millis(1100),
    },
    TransitionStep {
        stage: TransitionStage::Expand,
        duration: Duration::from_millis(1500),
    },
    TransitionStep {
        stage: TransitionStage::Hold,
        duration: Duration::from_millis(300),
    },
];

/// Runs the exit sub-phases sequentially, sleeping each one's duration.
///
/// `enter_step` fires at the start of every sub-phase; returning `false`
/// aborts the remainder (used when the epoch has gone stale).
pub async fn run_transition_steps<F>(mut enter_step: F)
where
    F: FnMut(TransitionStage) -> bool,
{
    for step in &TRANSITION_STEPS {
        if !enter_step(step.stage) {
            return;
        }
        tokio::time::sleep(step.duration).await;
    }
}

/// The phases of the boot sequence, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumIs)]
pub enum BootPhase {
    Entering,
    Cycling,
    AwaitingConfirm,
    Growing,
    Transitioning,
    Done,
}

/// Everything that can advance the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootEvent {
    EntranceComplete,
    FinalPhraseRevealed,
    Confirm,
    GrowthComplete,
    TransitionComplete,
}

#[derive(Debug)]
pub struct SequencerCore {
    phase: BootPhase,
    epoch: u64,
    handed_off: bool,
}

impl Default for SequencerCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SequencerCore {
    pub fn new() -> Self {
        Self {
            phase: BootPhase::Entering,
            epoch: 0,
            handed_off: false,
        }
    }

    pub fn phase(&self) -> BootPhase {
        self.phase
    }

    /// Whether a timer started under `token` may still act.
    pub fn is_current(&self, token: u64) -> bool {
        self.epoch == token
    }

    /// Advances the machine. Returns the new epoch token when the event is
    /// legal for the current phase; out-of-order and repeated events are
    /// no-ops.
    pub fn apply(&mut self, event: BootEvent) -> Option<u64> {
        use BootEvent::*;
        use BootPhase::*;

        let next = match (self.phase, event) {
            (Entering, EntranceComplete) => Cycling,
            (Cycling, FinalPhraseRevealed) => AwaitingConfirm,
            // Confirm counts while the final phrase is still revealing.
            (Cycling | AwaitingConfirm, Confirm) => Growing,
            (Growing, GrowthComplete) => Transitioning,
            (Transitioning, TransitionComplete) => Done,
            _ => return None,
        };
        self.phase = next;
        self.epoch = self.epoch.wrapping_add(1);
        Some(self.epoch)
    }

    /// Claims the one-time handoff. True exactly once, and only in `Done`.
    pub fn try_hand_off(&mut self) -> bool {
        if self.phase.is_done() && !self.handed_off {
            self.handed_off = true;
            true
        } else {
            false
        }
    }

    /// Teardown: stops every outstanding timer by making its token stale.
    pub fn invalidate(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_in_order() {
        let mut core = SequencerCore::new();
        assert!(core.phase().is_entering());

        assert!(core.apply(BootEvent::EntranceComplete).is_some());
        assert!(core.phase().is_cycling());

        assert!(core.apply(BootEvent::FinalPhraseRevealed).is_some());
        assert!(core.phase().is_awaiting_confirm());

        assert!(core.apply(BootEvent::Confirm).is_some());
        assert!(core.phase().is_growing());

        assert!(core.apply(BootEvent::GrowthComplete).is_some());
        assert!(core.phase().is_transitioning());

        assert!(core.apply(BootEvent::TransitionComplete).is_some());
        assert!(core.phase().is_done());
    }

    #[test]
    fn out_of_order_events_are_ignored() {
        let mut core = SequencerCore::new();
        assert_eq!(core.apply(BootEvent::Confirm), None);
        assert_eq!(core.apply(BootEvent::GrowthComplete), None);
        assert_eq!(core.apply(BootEvent::TransitionComplete), None);
        assert!(core.phase().is_entering());
    }

    #[test]
    fn confirm_is_accepted_during_the_final_phrase() {
        let mut core = SequencerCore::new();
        core.apply(BootEvent::EntranceComplete);
        assert!(core.apply(BootEvent::Confirm).is_some());
        assert!(core.phase().is_growing());
    }

    #[test]
    fn repeated_confirm_is_a_no_op() {
        let mut core = SequencerCore::new();
        core.apply(BootEvent::EntranceComplete);
        core.apply(BootEvent::FinalPhraseRevealed);
        assert!(core.apply(BootEvent::Confirm).is_some());
        assert_eq!(core.apply(BootEvent::Confirm), None);
        assert!(core.phase().is_growing());
    }

    #[test]
    fn transitions_stale_outstanding_timers() {
        let mut core = SequencerCore::new();
        let cycling = core.apply(BootEvent::EntranceComplete).unwrap();
        assert!(core.is_current(cycling));

        let growing = core.apply(BootEvent::Confirm).unwrap();
        assert!(!core.is_current(cycling));
        assert!(core.is_current(growing));
    }

    #[test]
    fn invalidate_stops_everything() {
        let mut core = SequencerCore::new();
        let token = core.apply(BootEvent::EntranceComplete).unwrap();
        core.invalidate();
        assert!(!core.is_current(token));
    }

    #[test]
    fn handoff_requires_done_and_fires_once() {
        let mut core = SequencerCore::new();
        assert!(!core.try_hand_off());

        core.apply(BootEvent::EntranceComplete);
        core.apply(BootEvent::FinalPhraseRevealed);
        core.apply(BootEvent::Confirm);
        core.apply(BootEvent::GrowthComplete);
        assert!(!core.try_hand_off());

        core.apply(BootEvent::TransitionComplete);
        assert!(core.try_hand_off());
        assert!(!core.try_hand_off());
    }

    mod gating {
        use std::sync::Arc;
        use std::time::Duration;

        use chain::data_loader::DataLoader;
        use chain::error::ChainError;
        use chain::rpc::ChainConnector;
        use chain::rpc::ChainRpc;

        use super::super::run_transition_steps;
        use super::super::TRANSITION_STEPS;

        struct SlowFailingConnector {
            delay: Duration,
        }

        #[async_trait::async_trait]
        impl ChainConnector for SlowFailingConnector {
            async fn connect(&self) -> Result<Arc<dyn ChainRpc>, ChainError> {
                tokio::time::sleep(self.delay).await;
                Err(ChainError::Connect {
                    endpoint: "test".to_string(),
                    reason: "unreachable".to_string(),
                })
            }
        }

        #[tokio::test(start_paused = true)]
        async fn handoff_waits_for_a_slow_load() {
            let start = tokio::time::Instant::now();
            let load_delay = Duration::from_secs(60);
            let loader = DataLoader::new(Arc::new(SlowFailingConnector { delay: load_delay }));

            // The screen starts the load at mount without awaiting it...
            let mount_load = loader.clone();
            tokio::spawn(async move {
                mount_load.load_all().await;
            });

            // ...runs the animation sub-phases to completion...
            let mut stages = Vec::new();
            run_transition_steps(|stage| {
                stages.push(stage);
                true
            })
            .await;
            assert_eq!(stages.len(), TRANSITION_STEPS.len());
            let animation: Duration = TRANSITION_STEPS.iter().map(|s| s.duration).sum();
            assert!(start.elapsed() >= animation);
            assert!(start.elapsed() < load_delay);

            // ...and must still block the handoff on the load settling.
            let result = loader.load_all().await;
            assert!(start.elapsed() >= load_delay);
            assert!(result.status.is_failed());
        }

        #[tokio::test(start_paused = true)]
        async fn settled_load_adds_no_extra_wait() {
            let loader = DataLoader::new(Arc::new(SlowFailingConnector {
                delay: Duration::from_millis(1),
            }));
            loader.load_all().await;

            let before = tokio::time::Instant::now();
            let result = loader.load_all().await;
            assert_eq!(before.elapsed(), Duration::ZERO);
            assert!(result.status.is_failed());
        }
    }
}
