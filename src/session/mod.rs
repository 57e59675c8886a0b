//! Session runner: the fixed-rate frame loop around a match

pub mod triggers;

use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::game::snapshot::{MatchSnapshot, SnapshotBuilder};
use crate::game::{GameEvent, Match, MatchState};
use crate::perception::{LandmarkFrame, PerceptionOracle};
use crate::util::time::{SessionClock, Timer};

pub use triggers::{parse_command, spawn_stdin_triggers};

/// Discrete UI triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Replay: start a fresh round
    Restart,
    /// End the session
    Close,
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    CloseRequested,
    SourceExhausted,
}

/// What a finished session reports
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub frames: u64,
    pub rounds: u32,
    pub final_state: MatchState,
    pub stop_reason: StopReason,
    pub uptime_ms: u64,
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub session_id: Uuid,
    pub command_tx: mpsc::Sender<SessionCommand>,
    pub snapshot_tx: broadcast::Sender<MatchSnapshot>,
}

impl SessionHandle {
    pub fn subscribe(&self) -> broadcast::Receiver<MatchSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Queue a command; false if the session is gone
    pub async fn send(&self, command: SessionCommand) -> bool {
        self.command_tx.send(command).await.is_ok()
    }
}

/// One game session: a match fed by a perception source
pub struct Session<O: PerceptionOracle> {
    game: Match,
    oracle: O,
    command_rx: mpsc::Receiver<SessionCommand>,
    snapshot_tx: broadcast::Sender<MatchSnapshot>,
    snapshot_builder: SnapshotBuilder,
    frame_interval: Duration,
    clock: SessionClock,
}

impl<O: PerceptionOracle> Session<O> {
    /// Create a new session
    pub fn new(config: &Config, oracle: O) -> (Self, SessionHandle) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (snapshot_tx, _) = broadcast::channel(64);

        let game = Match::new(config.game.clone());
        let handle = SessionHandle {
            session_id: game.id(),
            command_tx,
            snapshot_tx: snapshot_tx.clone(),
        };

        let session = Self {
            game,
            oracle,
            command_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(config.snapshot_every),
            frame_interval: config.frame_interval(),
            clock: SessionClock::new(),
        };

        (session, handle)
    }

    /// Run the frame loop until closed or the source runs dry
    pub async fn run(mut self) -> SessionSummary {
        info!(session_id = %self.game.id(), "Session started");

        self.clock = SessionClock::new();
        let mut ticker = interval(self.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let stop_reason = loop {
            ticker.tick().await;

            if self.process_commands() {
                break StopReason::CloseRequested;
            }

            let Some(frame) = self.oracle.next_frame() else {
                info!(session_id = %self.game.id(), "Perception source exhausted");
                break StopReason::SourceExhausted;
            };

            self.run_frame(&frame);
        };

        // Final state for anyone still listening
        let snapshot = self.snapshot_builder.build(&self.game, self.clock.frame_time(None));
        let _ = self.snapshot_tx.send(snapshot);

        let summary = SessionSummary {
            session_id: self.game.id(),
            frames: self.game.frame(),
            rounds: self.game.round(),
            final_state: self.game.state(),
            stop_reason,
            uptime_ms: self.clock.uptime().as_millis() as u64,
        };
        info!(
            session_id = %summary.session_id,
            frames = summary.frames,
            rounds = summary.rounds,
            reason = ?summary.stop_reason,
            "Session ended"
        );
        summary
    }

    /// Drain pending commands, returns true if the session should close
    fn process_commands(&mut self) -> bool {
        while let Ok(command) = self.command_rx.try_recv() {
            match command {
                SessionCommand::Restart => {
                    self.game.reset();
                    self.snapshot_builder.record(vec![GameEvent::MatchReset]);
                }
                SessionCommand::Close => return true,
            }
        }
        false
    }

    fn run_frame(&mut self, frame: &LandmarkFrame) {
        let timer = Timer::new();
        let now = self.clock.frame_time(frame.t_ms);

        let events = self.game.step(frame, now);
        self.snapshot_builder.record(events);

        if self.snapshot_builder.should_send() {
            let snapshot = self.snapshot_builder.build(&self.game, now);
            let _ = self.snapshot_tx.send(snapshot);
        }

        let budget = self.frame_interval.as_micros() as u64;
        let spent = timer.elapsed_micros();
        if spent > budget {
            warn!(session_id = %self.game.id(), spent_us = spent, budget_us = budget, "Slow frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perception::ReplaySource;

    fn fast_config() -> Config {
        Config {
            target_fps: 1000,
            snapshot_every: 1,
            ..Config::default()
        }
    }

    fn empty_frames(n: usize) -> ReplaySource {
        ReplaySource::from_jsonl(&"{\"faces\":[],\"hands\":[]}\n".repeat(n))
    }

    #[tokio::test]
    async fn stops_when_source_runs_dry() {
        let (session, handle) = Session::new(&fast_config(), empty_frames(5));
        let mut snapshots = handle.subscribe();

        let summary = session.run().await;
        assert_eq!(summary.frames, 5);
        assert_eq!(summary.rounds, 1);
        assert_eq!(summary.stop_reason, StopReason::SourceExhausted);
        assert_eq!(summary.final_state, MatchState::Playing);

        let first = snapshots.recv().await.unwrap();
        assert_eq!(first.frame, 1);
        assert_eq!(first.session_id, handle.session_id);
    }

    #[tokio::test]
    async fn close_request_stops_before_next_frame() {
        let (session, handle) = Session::new(&fast_config(), empty_frames(100));
        assert!(handle.send(SessionCommand::Close).await);

        let summary = session.run().await;
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.stop_reason, StopReason::CloseRequested);
    }

    #[tokio::test]
    async fn restart_starts_a_new_round() {
        let (session, handle) = Session::new(&fast_config(), empty_frames(3));
        let mut snapshots = handle.subscribe();
        assert!(handle.send(SessionCommand::Restart).await);

        let summary = session.run().await;
        assert_eq!(summary.rounds, 2);

        let first = snapshots.recv().await.unwrap();
        assert_eq!(first.round, 2);
        assert_eq!(first.events, vec![GameEvent::MatchReset]);
    }
}
