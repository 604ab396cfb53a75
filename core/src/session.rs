use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use log::{debug, info, warn};
use serde_json::Value;
use tessera_protocol::{
    DoneMessage, GameStatus, Interact, PlayMessage, PlayerId, PlayerSummary, Recording, ServerFrame,
};

use crate::{
    AutoplayTicket, DenseIndex, GameVariant, History, IdentityCache, NativeBoard, PlayerMark, Result,
    ScoreBoard, Snapshot, TurnInfo, VariantConfig, aggregate, aggregate_ids, encode_move,
    encode_place, transcode,
};

/// How long a notice stays up before the adapter clears it.
pub const NOTICE_TIMEOUT_MS: u32 = 2000;

/// What the transport adapter reports.
#[derive(Clone, Debug, PartialEq)]
pub enum TransportEvent {
    Connected,
    Play(Value),
    Done(Value),
    ActionRejected,
    Disconnected,
}

impl From<ServerFrame> for TransportEvent {
    fn from(frame: ServerFrame) -> Self {
        match frame {
            ServerFrame::Play(payload) => Self::Play(payload),
            ServerFrame::Done(payload) => Self::Done(payload),
            ServerFrame::ActionNotPermitted => Self::ActionRejected,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    ActionRejected,
    InvalidUpdate(String),
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionRejected => f.write_str("Action not permitted"),
            Self::InvalidUpdate(reason) => write!(f, "Ignored an invalid update: {reason}"),
        }
    }
}

/// Transient user-visible message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
}

/// What the adapters have to do after [`Session::handle`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionUpdate {
    pub redraw: bool,
    /// A running autoplay timer must be dropped.
    pub autoplay_cancelled: bool,
    /// Newly raised notice; schedule its clearing.
    pub notice: Option<Notice>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    /// Showing a recorded game, no engine behind it.
    Replay,
}

/// The engine's verdict once a game is over.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSummary {
    pub status: GameStatus,
    pub players: Vec<PlayerSummary>,
    pub winners: Vec<PlayerId>,
    pub winning_marks: Vec<PlayerMark>,
    pub scores: ScoreBoard,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordingReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Owned view state of one viewer: history, identities, notices.
#[derive(Debug)]
pub struct Session {
    config: VariantConfig,
    identities: IdentityCache,
    history: History,
    notice: Option<Notice>,
    next_notice_id: u64,
    connection: ConnectionState,
    summary: Option<GameSummary>,
}

impl Session {
    pub fn new(config: VariantConfig) -> Self {
        Self {
            config,
            identities: IdentityCache::new(),
            history: History::new(),
            notice: None,
            next_notice_id: 0,
            connection: ConnectionState::Connecting,
            summary: None,
        }
    }

    pub fn for_variant(variant: GameVariant) -> Self {
        Self::new(variant.config())
    }

    pub fn config(&self) -> &VariantConfig {
        &self.config
    }

    pub fn identities(&self) -> &IdentityCache {
        &self.identities
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Navigation and autoplay go straight to the history.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn current(&self) -> Option<&Rc<Snapshot>> {
        self.history.current()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn handle(&mut self, event: TransportEvent) -> SessionUpdate {
        match event {
            TransportEvent::Connected => {
                info!("Connected");
                self.connection = ConnectionState::Connected;
                SessionUpdate {
                    redraw: true,
                    ..Default::default()
                }
            }
            TransportEvent::Play(payload) => match self.receive_play(payload) {
                Ok(cancelled) => SessionUpdate {
                    redraw: true,
                    autoplay_cancelled: cancelled.is_some(),
                    notice: None,
                },
                Err(err) => {
                    warn!("Dropping play update: {err}");
                    self.raise(NoticeKind::InvalidUpdate(err.to_string()))
                }
            },
            TransportEvent::Done(payload) => match self.receive_done(payload) {
                Ok(()) => SessionUpdate {
                    redraw: true,
                    ..Default::default()
                },
                Err(err) => {
                    warn!("Dropping game summary: {err}");
                    self.raise(NoticeKind::InvalidUpdate(err.to_string()))
                }
            },
            TransportEvent::ActionRejected => {
                debug!("Engine rejected the last action");
                self.raise(NoticeKind::ActionRejected)
            }
            TransportEvent::Disconnected => {
                info!("Disconnected, keeping {} snapshots", self.history.len());
                self.connection = ConnectionState::Disconnected;
                SessionUpdate {
                    redraw: true,
                    ..Default::default()
                }
            }
        }
    }

    /// Turns one `play` payload into a snapshot and appends it.
    ///
    /// Nothing is kept when the payload is rejected, identities included.
    /// Returns the autoplay the append cancelled.
    pub fn receive_play(&mut self, payload: Value) -> Result<Option<AutoplayTicket>> {
        let message = PlayMessage::from_value(payload)?;
        let board = NativeBoard::from_representation(&message.rep)?;

        let mut identities = self.identities.clone();
        for err in identities.observe(&message.players, message.next_player.as_ref(), &board) {
            if err.is_pending_identity() {
                debug!("{err}");
            } else {
                warn!("{err}");
            }
        }

        let grid = transcode(&board, &self.config.table, &identities)?;
        let scores = aggregate(
            &message.scores,
            &message.players,
            &identities,
            self.config.score_convention,
            self.config.marks,
        );
        let turn = message
            .next_player
            .as_ref()
            .map(|next| TurnInfo::from_descriptor(next, &identities));
        let snapshot = Snapshot::new(grid, scores, turn).with_remaining_time(message.remaining_time);

        self.identities = identities;
        Ok(self.history.append(snapshot))
    }

    pub fn receive_done(&mut self, payload: Value) -> Result<()> {
        let done = DoneMessage::from_value(payload)?;
        self.finish(done);
        Ok(())
    }

    /// Replays a recorded game into the history.
    ///
    /// Steps are applied in order as if they arrived live; a bad step is
    /// skipped. Only an unreadable recording is an error.
    pub fn load_recording(&mut self, text: &str) -> Result<RecordingReport> {
        let recording = Recording::from_text(text)?;
        let mut report = RecordingReport::default();
        self.connection = ConnectionState::Replay;

        for (step, payload) in recording.steps.into_iter().enumerate() {
            match self.receive_play(payload) {
                Ok(_) => report.applied += 1,
                Err(err) => {
                    warn!("Skipping recorded step {step}: {err}");
                    report.skipped += 1;
                }
            }
        }
        if let Some(done) = recording.final_summary {
            self.finish(done);
        }

        info!(
            "Loaded recording: {} steps applied, {} skipped",
            report.applied, report.skipped
        );
        Ok(report)
    }

    /// Clears the notice if `id` is still the one shown.
    pub fn clear_notice(&mut self, id: u64) -> bool {
        if self.notice.as_ref().is_some_and(|notice| notice.id == id) {
            self.notice = None;
            true
        } else {
            false
        }
    }

    /// The latest snapshot is shown and a human at this viewer is to move.
    pub fn can_interact(&self) -> bool {
        self.connection == ConnectionState::Connected
            && self.history.cursor().is_some_and(|cursor| cursor + 1 == self.history.len())
            && self.history.autoplay().is_none()
            && self.current().is_some_and(|snapshot| snapshot.is_interactive_turn())
    }

    pub fn encode_move(&self, from: DenseIndex, to: DenseIndex, mark: PlayerMark) -> Result<Interact> {
        encode_move(&self.config.table, from, to, mark)
    }

    pub fn encode_place(&self, position: DenseIndex) -> Result<Interact> {
        encode_place(&self.config.table, position)
    }

    /// Starts over with an empty history. Nothing else clears it.
    pub fn restart(&mut self) {
        info!("Restarting {} session", self.config.variant.name());
        self.history.clear();
        self.identities = IdentityCache::new();
        self.notice = None;
        self.summary = None;
    }

    fn finish(&mut self, done: DoneMessage) {
        let winning_marks = done
            .winners_id
            .iter()
            .filter_map(|&id| self.identities.mark_of(id))
            .collect();
        let scores = aggregate_ids(
            &done.scores,
            done.players.iter().map(|player| player.id),
            &self.identities,
            self.config.score_convention,
            self.config.marks,
        );
        info!("Game {:?}, winners {:?}", done.status, done.winners_id);

        self.summary = Some(GameSummary {
            status: done.status,
            players: done.players,
            winners: done.winners_id,
            winning_marks,
            scores,
        });
    }

    fn raise(&mut self, kind: NoticeKind) -> SessionUpdate {
        self.next_notice_id += 1;
        let notice = Notice {
            id: self.next_notice_id,
            kind,
        };
        self.notice = Some(notice.clone());
        SessionUpdate {
            redraw: true,
            autoplay_cancelled: false,
            notice: Some(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellState, HistoryState, NativeCoord, Piece, ViewerError};
    use serde_json::json;

    fn abalone_play(x: i32, y: i32, tag: &str, owner: PlayerId) -> Value {
        let mut env = serde_json::Map::new();
        env.insert(
            NativeCoord(x, y).to_string(),
            json!({"piece_type": tag, "owner_id": owner}),
        );
        json!({
            "rep": {"env": env, "dimensions": [17, 9]},
            "scores": {"7": -3.0},
            "players": ["7"]
        })
    }

    #[test]
    fn hex_scenario_end_to_end() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        let text = abalone_play(4, 4, "W", 7).to_string();

        let update = session.handle(TransportEvent::Play(Value::String(text)));

        assert_eq!(
            update,
            SessionUpdate {
                redraw: true,
                autoplay_cancelled: false,
                notice: None
            }
        );
        let snapshot = session.current().unwrap();
        assert_eq!(snapshot.scores().get(PlayerMark::White), Some(3));
        assert_eq!(snapshot.scores().get(PlayerMark::Black), Some(0));
        assert_eq!(
            snapshot.grid()[(2, 5)],
            CellState::Occupied(Piece::new(PlayerMark::White))
        );
        assert_eq!(snapshot.grid().occupied().count(), 1);
        assert_eq!(session.identities().mark_of(7), Some(PlayerMark::White));
    }

    #[test]
    fn bad_update_keeps_last_snapshot() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        session.handle(TransportEvent::Play(abalone_play(4, 4, "W", 7)));
        let before = session.current().cloned();

        let update = session.handle(TransportEvent::Play(abalone_play(0, 0, "B", 8)));

        let notice = update.notice.unwrap();
        assert_eq!(
            notice.kind,
            NoticeKind::InvalidUpdate(ViewerError::UnmappedCoordinate(NativeCoord(0, 0)).to_string())
        );
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.current().cloned(), before);
        assert_eq!(session.identities().mark_of(8), None);
    }

    #[test]
    fn malformed_payload_raises_notice() {
        let mut session = Session::for_variant(GameVariant::TicTacToe);

        let update = session.handle(TransportEvent::Play(Value::String("{nope".to_string())));

        assert!(matches!(
            update.notice,
            Some(Notice {
                kind: NoticeKind::InvalidUpdate(_),
                ..
            })
        ));
        assert!(session.history().is_empty());
    }

    #[test]
    fn rejected_action_only_touches_the_notice() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        session.handle(TransportEvent::Play(abalone_play(4, 4, "W", 7)));
        session.history_mut().reset();
        let cursor = session.history().cursor();

        let update = session.handle(TransportEvent::ActionRejected);

        let notice = update.notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::ActionRejected);
        assert_eq!(session.notice(), Some(&notice));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history().cursor(), cursor);
    }

    #[test]
    fn superseded_notice_is_not_cleared() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        let first = session.handle(TransportEvent::ActionRejected).notice.unwrap();
        let second = session.handle(TransportEvent::ActionRejected).notice.unwrap();

        assert!(!session.clear_notice(first.id));
        assert_eq!(session.notice(), Some(&second));
        assert!(session.clear_notice(second.id));
        assert_eq!(session.notice(), None);
    }

    #[test]
    fn new_state_cancels_autoplay() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        session.handle(TransportEvent::Play(abalone_play(4, 4, "W", 7)));
        session.handle(TransportEvent::Play(abalone_play(5, 5, "W", 7)));
        session.history_mut().reset();
        session.history_mut().start_autoplay(500).unwrap();

        let update = session.handle(TransportEvent::Play(abalone_play(6, 6, "W", 7)));

        assert!(update.autoplay_cancelled);
        assert_eq!(session.history().state(), HistoryState::Live);
        assert_eq!(session.history().cursor(), Some(2));
    }

    #[test]
    fn disconnect_keeps_history() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        session.handle(TransportEvent::Connected);
        session.handle(TransportEvent::Play(abalone_play(4, 4, "W", 7)));

        session.handle(TransportEvent::Disconnected);

        assert_eq!(session.connection(), ConnectionState::Disconnected);
        assert_eq!(session.history().len(), 1);

        session.restart();
        assert!(session.history().is_empty());
        assert!(session.identities().is_empty());
    }

    #[test]
    fn done_summary_resolves_winner_marks() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        session.handle(TransportEvent::Play(abalone_play(4, 4, "W", 7)));

        session.handle(TransportEvent::Done(json!({
            "players": [{"id": 7, "name": "alice"}, {"id": 8, "name": "bob"}],
            "scores": {"7": -1.0, "8": -6.0},
            "winners_id": [7],
            "status": "done"
        })));

        let summary = session.summary().unwrap();
        assert_eq!(summary.status, GameStatus::Done);
        assert_eq!(summary.winning_marks, [PlayerMark::White]);
        assert_eq!(summary.scores.get(PlayerMark::White), Some(1));
    }

    #[test]
    fn recording_replays_in_order_and_skips_bad_steps() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        let recording = json!({
            "steps": [
                abalone_play(4, 4, "W", 7),
                abalone_play(0, 0, "W", 7),
                abalone_play(5, 5, "W", 7).to_string()
            ],
            "final_summary": {"status": "cancelled", "winners_id": []}
        });

        let report = session.load_recording(&recording.to_string()).unwrap();

        assert_eq!(report, RecordingReport { applied: 2, skipped: 1 });
        assert_eq!(session.connection(), ConnectionState::Replay);
        assert!(!session.can_interact());
        assert_eq!(session.history().len(), 2);
        let first = session.history().get(0).unwrap();
        assert_eq!(
            first.grid()[(2, 5)],
            CellState::Occupied(Piece::new(PlayerMark::White))
        );
        assert_eq!(session.summary().unwrap().status, GameStatus::Cancelled);
    }

    #[test]
    fn unreadable_recording_is_an_error() {
        let mut session = Session::for_variant(GameVariant::Abalone);
        assert!(matches!(
            session.load_recording("[1, 2]"),
            Err(ViewerError::MalformedMessage(_))
        ));
        assert_eq!(session.connection(), ConnectionState::Connecting);
    }

    #[test]
    fn interaction_needs_live_interactive_turn() {
        let mut session = Session::for_variant(GameVariant::TicTacToe);
        session.handle(TransportEvent::Connected);
        let play = |tag: &str| {
            json!({
                "rep": {"board": [[tag, null, null], [null, null, null], [null, null, null]]},
                "players": [{"id": 1, "piece_type": "X"}, {"id": 2, "piece_type": "O"}],
                "next_player": {"id": 2, "piece_type": "O", "player_type": "interactive"}
            })
        };
        session.handle(TransportEvent::Play(play("X")));
        assert!(session.can_interact());

        session.handle(TransportEvent::Play(play("O")));
        session.history_mut().step_back();
        assert!(!session.can_interact());

        session.history_mut().jump_to_end();
        assert!(session.can_interact());
        assert_eq!(
            session.encode_place((1, 1)),
            Ok(Interact::Place { position: [1, 1] })
        );
    }

    #[test]
    fn transport_events_from_frames() {
        assert_eq!(
            TransportEvent::from(ServerFrame::ActionNotPermitted),
            TransportEvent::ActionRejected
        );
        assert_eq!(
            TransportEvent::from(ServerFrame::Play(json!({}))),
            TransportEvent::Play(json!({}))
        );
    }
}
