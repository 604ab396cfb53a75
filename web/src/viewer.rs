use crate::board::CellView;
use crate::transport::Transport;
use clap::{Args, ValueEnum};
use gloo::timers::callback::{Interval, Timeout};
use tessera_core::{
    ActionKind, CellState, ConnectionState, DenseIndex, GameVariant, HistoryState,
    NOTICE_TIMEOUT_MS, PlayerMark, Session, SessionUpdate, Snapshot, TransportEvent,
    VariantConfig,
};
use tessera_protocol::{ClientFrame, GameStatus, Interact};
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub(crate) const DEFAULT_SERVER: &str = "ws://localhost:16001";

/// Shortest autoplay interval the controls accept.
const MIN_INTERVAL_MS: u32 = 50;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum VariantArg {
    #[default]
    Abalone,
    Avalam,
    Tictactoe,
}

impl From<VariantArg> for GameVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Abalone => Self::Abalone,
            VariantArg::Avalam => Self::Avalam,
            VariantArg::Tictactoe => Self::TicTacToe,
        }
    }
}

#[derive(Args, Properties, Debug, Clone, PartialEq)]
pub(crate) struct ViewerProps {
    /// Game to display
    #[arg(long, value_enum, default_value_t)]
    pub(crate) variant: VariantArg,

    /// Relay to connect to
    #[arg(long, default_value = DEFAULT_SERVER)]
    pub(crate) server: String,

    /// Autoplay interval in milliseconds, defaults to the game's own
    #[arg(long)]
    pub(crate) interval: Option<u32>,

    /// URL of a recorded game to replay instead of connecting
    #[arg(long)]
    pub(crate) recording: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Transport(TransportEvent),
    StepForward,
    StepBack,
    JumpToEnd,
    Reset,
    Play,
    Stop,
    Tick(u64),
    SetInterval(u32),
    ClearNotice(u64),
    Select(DenseIndex),
    RecordingLoaded(Result<String, String>),
}

/// What a click on a cell amounts to.
#[derive(Clone, Debug, PartialEq)]
enum Selection {
    Ignored,
    Cleared,
    Picked(DenseIndex),
    Send(Interact),
}

/// Two clicks for a move (piece, then neighbouring destination), one for a placement.
fn select(
    snapshot: &Snapshot,
    config: &VariantConfig,
    selected: Option<DenseIndex>,
    index: DenseIndex,
) -> Selection {
    let grid = snapshot.grid();
    let Some(cell) = grid.get(index) else {
        return Selection::Ignored;
    };
    let active_mark = snapshot.turn().and_then(|turn| turn.active_mark);
    let is_own = |cell: CellState| {
        cell.piece()
            .is_some_and(|piece| active_mark.is_none_or(|mark| mark == piece.mark))
    };

    let encoded = match (config.action_kind, selected) {
        (ActionKind::Place, _) if cell == CellState::Empty => {
            tessera_core::encode_place(&config.table, index)
        }
        (ActionKind::Place, _) => return Selection::Ignored,
        (ActionKind::Move, None) if is_own(cell) => return Selection::Picked(index),
        (ActionKind::Move, None) => return Selection::Ignored,
        (ActionKind::Move, Some(from)) if from == index => return Selection::Cleared,
        (ActionKind::Move, Some(from)) => {
            let mark = grid.get(from).and_then(CellState::piece).map(|piece| piece.mark);
            let reachable = grid
                .playable_neighbors(from, config.layout)
                .any(|next| next == index);
            match mark {
                Some(mark) if reachable => {
                    tessera_core::encode_move(&config.table, from, index, mark)
                }
                _ if is_own(cell) => return Selection::Picked(index),
                _ => return Selection::Cleared,
            }
        }
    };

    match encoded {
        Ok(action) => Selection::Send(action),
        Err(err) => {
            log::warn!("Cannot encode action: {err}");
            Selection::Cleared
        }
    }
}

pub(crate) struct ViewerView {
    session: Session,
    interval_ms: u32,
    selected: Option<DenseIndex>,
    transport: Option<Transport>,
    autoplay: Option<Interval>,
    notice_timeout: Option<Timeout>,
}

impl ViewerView {
    fn apply(&mut self, ctx: &Context<Self>, update: SessionUpdate) -> bool {
        if update.autoplay_cancelled {
            self.autoplay = None;
        }
        if let Some(notice) = update.notice {
            let link = ctx.link().clone();
            let id = notice.id;
            self.notice_timeout = Some(Timeout::new(NOTICE_TIMEOUT_MS, move || {
                link.send_message(Msg::ClearNotice(id))
            }));
        }
        if update.redraw {
            self.selected = None;
        }
        update.redraw
    }

    fn start_autoplay(&mut self, ctx: &Context<Self>) -> bool {
        self.autoplay = None;
        let Some(ticket) = self.session.history_mut().start_autoplay(self.interval_ms) else {
            return false;
        };
        let link = ctx.link().clone();
        self.autoplay = Some(Interval::new(ticket.interval_ms, move || {
            link.send_message(Msg::Tick(ticket.generation))
        }));
        true
    }

    fn stop_autoplay(&mut self) {
        self.autoplay = None;
        self.session.history_mut().stop_autoplay();
    }

    fn send(&self, action: &Interact) {
        let Some(transport) = &self.transport else {
            log::warn!("Not connected, dropping {action:?}");
            return;
        };
        let sent = ClientFrame::interact(action)
            .map_err(anyhow::Error::from)
            .and_then(|frame| transport.send(&frame));
        if let Err(err) = sent {
            log::warn!("{err:#}");
        }
    }

    fn view_controls(&self, ctx: &Context<Self>) -> Html {
        let history = self.session.history();
        let position = match history.cursor() {
            Some(cursor) => format!("{} / {}", cursor + 1, history.len()),
            None => "0 / 0".to_string(),
        };
        let (toggle_label, toggle_msg) = if history.state() == HistoryState::Autoplaying {
            ("⏸", Msg::Stop)
        } else {
            ("▶", Msg::Play)
        };
        let oninput = ctx.link().batch_callback(|e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            input.value().parse().ok().map(Msg::SetInterval)
        });

        html! {
            <nav>
                <button onclick={ctx.link().callback(|_| Msg::Reset)}>{"⏮"}</button>
                <button onclick={ctx.link().callback(|_| Msg::StepBack)}>{"◀"}</button>
                <button onclick={ctx.link().callback(move |_| toggle_msg.clone())}>{toggle_label}</button>
                <button onclick={ctx.link().callback(|_| Msg::StepForward)}>{"▶▶"}</button>
                <button onclick={ctx.link().callback(|_| Msg::JumpToEnd)}>{"⏭"}</button>
                <input
                    type="number"
                    min={MIN_INTERVAL_MS.to_string()}
                    step="50"
                    value={self.interval_ms.to_string()}
                    {oninput}
                />
                <span class="position">{position}</span>
            </nav>
        }
    }

    fn view_scores(&self, snapshot: &Snapshot) -> Html {
        let active_mark = snapshot.turn().and_then(|turn| turn.active_mark);
        let clock = snapshot
            .turn()
            .and_then(|turn| turn.player)
            .and_then(|player| snapshot.remaining_time(player))
            .map(|secs| format!("{secs:.0}s"));

        html! {
            <aside class="scores">
                {
                    for snapshot.scores().iter().map(|(mark, score)| {
                        let class = classes!("ball", (active_mark == Some(mark)).then_some("active"));
                        let style = format!("background-color: {}", mark.color());
                        html! { <span {class} {style}>{score}</span> }
                    })
                }
                <span class="clock">{clock.unwrap_or_default()}</span>
            </aside>
        }
    }

    fn view_board(&self, ctx: &Context<Self>, snapshot: &Snapshot) -> Html {
        let config = self.session.config();
        let grid = snapshot.grid();
        let (rows, cols) = grid.size();
        let targets: Vec<DenseIndex> = self
            .selected
            .map(|from| grid.playable_neighbors(from, config.layout).collect())
            .unwrap_or_default();
        let playable = self.session.can_interact().then_some("playable");

        html! {
            <table class={classes!(config.variant.name(), playable)}>
                {
                    for (0..rows).map(|row| html! {
                        <tr class={(row % 2 == 1).then_some("odd")}>
                            {
                                for (0..cols).map(|col| {
                                    let index = (row, col);
                                    let cell = grid[index];
                                    let selected = self.selected == Some(index);
                                    let target = targets.contains(&index);
                                    let callback = ctx.link().callback(Msg::Select);
                                    html! {
                                        <CellView {index} {cell} {selected} {target} {callback}/>
                                    }
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }

    fn view_summary(&self) -> Html {
        let Some(summary) = self.session.summary() else {
            return html! {};
        };
        let status = match summary.status {
            GameStatus::Done => "Game over",
            GameStatus::Cancelled => "Game cancelled",
        };
        let winners: Vec<&str> = summary
            .winning_marks
            .iter()
            .map(|&mark: &PlayerMark| mark.piece_type())
            .collect();

        html! {
            <footer>
                <strong>{status}</strong>
                if !winners.is_empty() {
                    <span>{format!(" Winner: {}", winners.join(", "))}</span>
                }
            </footer>
        }
    }
}

impl Component for ViewerView {
    type Message = Msg;
    type Properties = ViewerProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let session = Session::for_variant(props.variant.into());
        let interval_ms = props
            .interval
            .unwrap_or(session.config().autoplay_interval_ms)
            .max(MIN_INTERVAL_MS);

        let transport = match &props.recording {
            Some(url) => {
                let url = url.clone();
                ctx.link().send_future(async move {
                    let text = match gloo::net::http::Request::get(&url).send().await {
                        Ok(response) => response.text().await,
                        Err(err) => Err(err),
                    };
                    Msg::RecordingLoaded(text.map_err(|err| err.to_string()))
                });
                None
            }
            None => match Transport::connect(&props.server, ctx.link().callback(Msg::Transport)) {
                Ok(transport) => Some(transport),
                Err(err) => {
                    log::error!("{err:#}");
                    None
                }
            },
        };

        Self {
            session,
            interval_ms,
            selected: None,
            transport,
            autoplay: None,
            notice_timeout: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Transport(event) => {
                let update = self.session.handle(event);
                self.apply(ctx, update)
            }
            Msg::StepForward => {
                let stopped = self.autoplay.take().is_some();
                self.session.history_mut().step_forward().has_update() || stopped
            }
            Msg::StepBack => {
                let stopped = self.autoplay.take().is_some();
                self.session.history_mut().step_back().has_update() || stopped
            }
            Msg::JumpToEnd => {
                let stopped = self.autoplay.take().is_some();
                self.session.history_mut().jump_to_end().has_update() || stopped
            }
            Msg::Reset => {
                let stopped = self.autoplay.take().is_some();
                self.session.history_mut().reset().has_update() || stopped
            }
            Msg::Play => self.start_autoplay(ctx),
            Msg::Stop => {
                self.stop_autoplay();
                true
            }
            Msg::Tick(generation) => {
                let outcome = self.session.history_mut().tick(generation);
                if outcome.ends_autoplay() {
                    self.autoplay = None;
                }
                outcome.has_update()
            }
            Msg::SetInterval(interval_ms) => {
                self.interval_ms = interval_ms.max(MIN_INTERVAL_MS);
                log::debug!("Autoplay interval {}ms", self.interval_ms);
                if self.session.history().state() == HistoryState::Autoplaying {
                    self.start_autoplay(ctx);
                }
                false
            }
            Msg::ClearNotice(id) => self.session.clear_notice(id),
            Msg::Select(index) => {
                if !self.session.can_interact() {
                    return false;
                }
                let Some(snapshot) = self.session.current().cloned() else {
                    return false;
                };
                match select(&snapshot, self.session.config(), self.selected, index) {
                    Selection::Ignored => false,
                    Selection::Cleared => self.selected.take().is_some(),
                    Selection::Picked(index) => self.selected.replace(index) != Some(index),
                    Selection::Send(action) => {
                        self.send(&action);
                        self.selected = None;
                        true
                    }
                }
            }
            Msg::RecordingLoaded(Ok(text)) => match self.session.load_recording(&text) {
                Ok(report) => {
                    log::info!("Replaying {} recorded states", report.applied);
                    self.session.history_mut().reset();
                    true
                }
                Err(err) => {
                    log::error!("Unreadable recording: {err}");
                    false
                }
            },
            Msg::RecordingLoaded(Err(err)) => {
                log::error!("Could not fetch recording: {err}");
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let connection = match self.session.connection() {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Replay => "replay",
        };
        let notice = self
            .session
            .notice()
            .map(|notice| html! { <div class="notice">{notice.kind.to_string()}</div> });

        html! {
            <div class={classes!("tessera", connection)}>
                {self.view_controls(ctx)}
                {
                    match self.session.current() {
                        Some(snapshot) => html! {
                            <>
                                {self.view_scores(snapshot)}
                                {self.view_board(ctx, snapshot)}
                            </>
                        },
                        None => html! { <p class="waiting">{"Waiting for the first state"}</p> },
                    }
                }
                {notice.unwrap_or_default()}
                {self.view_summary()}
            </div>
        }
    }
}
