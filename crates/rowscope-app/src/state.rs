// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::{
    Field, Generator, IndexReply, IndexRequest, RequestSeq, ResultOrdering, SortDirection,
    SortSpec, UNIVERSE_SIZE, Viewport, VisibleRange, VisibleRow, materialize,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Nav,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    AwaitingResult,
}

/// What to do with a reply whose sequence number is not the latest issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyPolicy {
    LatestOnly,
    AcceptAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineStatus {
    Available,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSettings {
    pub universe_size: u32,
    pub debounce: Duration,
    pub search_fields: Vec<Field>,
    pub reply_policy: ReplyPolicy,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            universe_size: UNIVERSE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
            search_fields: Field::DEFAULT_SEARCH.to_vec(),
            reply_policy: ReplyPolicy::LatestOnly,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub settings: ControllerSettings,
    pub viewport: Viewport,
    pub mode: InputMode,
    pub query: String,
    pub sort: Option<SortSpec>,
    pub ordering: ResultOrdering,
    pub scroll_offset: u64,
    pub engine: EngineStatus,
    pub status_line: Option<String>,
    debounce_deadline: Option<Instant>,
    dispatched_query: String,
    in_flight: Option<RequestSeq>,
    last_issued: RequestSeq,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ControllerSettings::default(), Viewport::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    EnterSearch,
    ExitSearch,
    EditQuery { text: String, now: Instant },
    Tick { now: Instant },
    ActivateSort(Field),
    ScrollBy(i64),
    ScrollTo(u64),
    ScrollToEnd,
    Resize { viewport_height: u32 },
    ReplyReceived(IndexReply),
    EngineUnavailable(String),
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(InputMode),
    QueryChanged(String),
    DebounceArmed { deadline: Instant },
    RequestIssued(IndexRequest),
    SortChanged(SortSpec),
    BusyChanged(bool),
    OrderingReplaced { len: usize },
    StaleReplyDropped { seq: RequestSeq },
    ScrollChanged(u64),
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn new(settings: ControllerSettings, viewport: Viewport) -> Self {
        Self {
            settings,
            viewport,
            mode: InputMode::Nav,
            query: String::new(),
            sort: None,
            ordering: ResultOrdering::Identity,
            scroll_offset: 0,
            engine: EngineStatus::Available,
            status_line: None,
            debounce_deadline: None,
            dispatched_query: String::new(),
            in_flight: None,
            last_issued: RequestSeq::new(0),
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::EnterSearch => self.set_mode(InputMode::Search),
            AppCommand::ExitSearch => self.set_mode(InputMode::Nav),
            AppCommand::EditQuery { text, now } => self.edit_query(text, now),
            AppCommand::Tick { now } => self.tick(now),
            AppCommand::ActivateSort(field) => self.activate_sort(field),
            AppCommand::ScrollBy(delta) => {
                let target = if delta < 0 {
                    self.scroll_offset.saturating_sub(delta.unsigned_abs())
                } else {
                    self.scroll_offset.saturating_add(delta.unsigned_abs())
                };
                self.scroll_to(target)
            }
            AppCommand::ScrollTo(offset) => self.scroll_to(offset),
            AppCommand::ScrollToEnd => self.scroll_to(u64::MAX),
            AppCommand::Resize { viewport_height } => {
                self.viewport = self.viewport.with_viewport_height(viewport_height);
                self.scroll_to(self.scroll_offset)
            }
            AppCommand::ReplyReceived(reply) => self.receive_reply(reply),
            AppCommand::EngineUnavailable(reason) => self.disable_engine(reason),
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.debounce_deadline.is_some() {
            Phase::Debouncing
        } else if self.in_flight.is_some() {
            Phase::AwaitingResult
        } else {
            Phase::Idle
        }
    }

    pub const fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub const fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    pub const fn last_issued(&self) -> RequestSeq {
        self.last_issued
    }

    pub fn logical_len(&self) -> usize {
        self.ordering.len(self.settings.universe_size)
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.viewport
            .visible_range(self.scroll_offset, self.logical_len())
    }

    pub fn visible_rows(&self, generator: &Generator) -> Vec<VisibleRow> {
        materialize(
            generator,
            &self.ordering,
            self.settings.universe_size,
            self.visible_range(),
        )
    }

    fn set_mode(&mut self, mode: InputMode) -> Vec<AppEvent> {
        if self.mode == mode {
            return Vec::new();
        }
        self.mode = mode;
        vec![AppEvent::ModeChanged(mode)]
    }

    fn edit_query(&mut self, text: String, now: Instant) -> Vec<AppEvent> {
        if text == self.query {
            return Vec::new();
        }
        self.query = text;
        let deadline = now + self.settings.debounce;
        self.debounce_deadline = Some(deadline);
        vec![
            AppEvent::QueryChanged(self.query.clone()),
            AppEvent::DebounceArmed { deadline },
        ]
    }

    fn tick(&mut self, now: Instant) -> Vec<AppEvent> {
        match self.debounce_deadline {
            Some(deadline) if deadline <= now => {
                self.debounce_deadline = None;
            }
            _ => return Vec::new(),
        }

        // Typing and deleting within one debounce window leaves nothing to do.
        if self.query == self.dispatched_query {
            return Vec::new();
        }
        if let EngineStatus::Unavailable(reason) = &self.engine {
            let message = format!("search unavailable: {reason}");
            return vec![self.set_status(&message)];
        }

        self.dispatched_query = self.query.clone();
        self.sort = None;
        let seq = self.next_seq();
        let request = IndexRequest::search(
            seq,
            self.settings.universe_size,
            &self.query,
            &self.settings.search_fields,
        );
        self.issue(request)
    }

    fn activate_sort(&mut self, field: Field) -> Vec<AppEvent> {
        if let EngineStatus::Unavailable(reason) = &self.engine {
            let message = format!("sort unavailable: {reason}");
            return vec![self.set_status(&message)];
        }

        let direction = match self.sort {
            Some(current) if current.field == field => current.direction.toggled(),
            _ => SortDirection::Asc,
        };
        let spec = SortSpec { field, direction };
        self.sort = Some(spec);

        let seq = self.next_seq();
        let request = IndexRequest::sort(seq, self.settings.universe_size, field, direction);
        let mut events = vec![AppEvent::SortChanged(spec)];
        events.extend(self.issue(request));
        events
    }

    fn issue(&mut self, request: IndexRequest) -> Vec<AppEvent> {
        debug!(seq = %request.seq(), kind = request.kind(), "issuing index request");
        let was_busy = self.is_busy();
        self.in_flight = Some(request.seq());
        let mut events = vec![AppEvent::RequestIssued(request)];
        if !was_busy {
            events.push(AppEvent::BusyChanged(true));
        }
        events
    }

    fn next_seq(&mut self) -> RequestSeq {
        self.last_issued = self.last_issued.next();
        self.last_issued
    }

    fn receive_reply(&mut self, reply: IndexReply) -> Vec<AppEvent> {
        let seq = reply.seq();
        if self.settings.reply_policy == ReplyPolicy::LatestOnly && seq != self.last_issued {
            warn!(%seq, latest = %self.last_issued, "dropping stale index reply");
            return vec![AppEvent::StaleReplyDropped { seq }];
        }

        let mut events = Vec::new();
        if self.in_flight.take().is_some() {
            events.push(AppEvent::BusyChanged(false));
        }

        let ordering = match reply {
            IndexReply::Result { indices, .. } => ResultOrdering::from_reply(indices),
            IndexReply::Sorted { indices, .. } => ResultOrdering::explicit(indices),
            IndexReply::Error { error, .. } => {
                let message = format!("index request failed: {error}");
                events.push(self.set_status(&message));
                return events;
            }
        };

        self.ordering = ordering;
        let len = self.logical_len();
        debug!(%seq, len, "installed result ordering");
        events.push(AppEvent::OrderingReplaced { len });

        // The old offset has no meaning in the new ordering.
        self.scroll_offset = 0;
        events.push(AppEvent::ScrollChanged(0));
        events
    }

    fn disable_engine(&mut self, reason: String) -> Vec<AppEvent> {
        warn!(%reason, "index engine unavailable");
        let mut events = Vec::new();
        self.debounce_deadline = None;
        if self.in_flight.take().is_some() {
            events.push(AppEvent::BusyChanged(false));
        }
        let message = format!("search and sort unavailable: {reason}");
        self.engine = EngineStatus::Unavailable(reason);
        events.push(self.set_status(&message));
        events
    }

    fn scroll_to(&mut self, offset: u64) -> Vec<AppEvent> {
        let clamped = self
            .viewport
            .clamp_scroll_offset(offset, self.logical_len());
        if clamped == self.scroll_offset {
            return Vec::new();
        }
        self.scroll_offset = clamped;
        vec![AppEvent::ScrollChanged(clamped)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppCommand, AppEvent, AppState, ControllerSettings, EngineStatus, InputMode, Phase,
        ReplyPolicy,
    };
    use crate::{
        DataIndex, Field, IndexError, IndexReply, IndexRequest, RequestSeq, ResultOrdering,
        SortDirection, SortSpec, Viewport,
    };
    use anyhow::Result;
    use std::time::{Duration, Instant};

    fn state() -> Result<AppState> {
        let settings = ControllerSettings {
            universe_size: 10,
            ..ControllerSettings::default()
        };
        Ok(AppState::new(settings, Viewport::new(1, 4, 2)?))
    }

    fn type_query(state: &mut AppState, text: &str, now: Instant) -> Vec<AppEvent> {
        state.dispatch(AppCommand::EditQuery {
            text: text.to_owned(),
            now,
        })
    }

    fn issued_request(events: &[AppEvent]) -> Option<&IndexRequest> {
        events.iter().find_map(|event| match event {
            AppEvent::RequestIssued(request) => Some(request),
            _ => None,
        })
    }

    fn indices(values: &[u32]) -> Vec<DataIndex> {
        values.iter().copied().map(DataIndex::new).collect()
    }

    #[test]
    fn debounce_waits_for_quiet_input() -> Result<()> {
        let mut state = state()?;
        let start = Instant::now();

        type_query(&mut state, "a", start);
        type_query(&mut state, "av", start + Duration::from_millis(100));
        assert_eq!(state.phase(), Phase::Debouncing);

        // First keystroke's deadline has passed, but the second one restarted it.
        let early = state.dispatch(AppCommand::Tick {
            now: start + Duration::from_millis(300),
        });
        assert!(early.is_empty());

        let fired = state.dispatch(AppCommand::Tick {
            now: start + Duration::from_millis(350),
        });
        assert_eq!(
            issued_request(&fired),
            Some(&IndexRequest::search(
                RequestSeq::new(1),
                10,
                "av",
                &Field::DEFAULT_SEARCH,
            ))
        );
        assert!(fired.contains(&AppEvent::BusyChanged(true)));
        assert_eq!(state.phase(), Phase::AwaitingResult);
        Ok(())
    }

    #[test]
    fn reverting_query_inside_window_skips_dispatch() -> Result<()> {
        let mut state = state()?;
        let start = Instant::now();

        type_query(&mut state, "a", start);
        type_query(&mut state, "", start + Duration::from_millis(50));
        let events = state.dispatch(AppCommand::Tick {
            now: start + Duration::from_secs(1),
        });
        assert!(events.is_empty());
        assert_eq!(state.phase(), Phase::Idle);
        Ok(())
    }

    #[test]
    fn reply_installs_ordering_and_resets_scroll() -> Result<()> {
        let mut state = state()?;
        state.dispatch(AppCommand::ScrollTo(5));
        assert_eq!(state.scroll_offset, 5);

        let start = Instant::now();
        type_query(&mut state, "ava", start);
        state.dispatch(AppCommand::Tick {
            now: start + Duration::from_secs(1),
        });

        let events = state.dispatch(AppCommand::ReplyReceived(IndexReply::Result {
            seq: RequestSeq::new(1),
            indices: Some(indices(&[0, 7])),
        }));
        assert_eq!(
            events,
            vec![
                AppEvent::BusyChanged(false),
                AppEvent::OrderingReplaced { len: 2 },
                AppEvent::ScrollChanged(0),
            ]
        );
        assert_eq!(state.scroll_offset, 0);
        assert_eq!(state.logical_len(), 2);
        assert!(!state.is_busy());
        Ok(())
    }

    #[test]
    fn sort_toggles_direction_on_same_field() -> Result<()> {
        let mut state = state()?;

        let first = state.dispatch(AppCommand::ActivateSort(Field::Score));
        assert_eq!(
            first[0],
            AppEvent::SortChanged(SortSpec {
                field: Field::Score,
                direction: SortDirection::Asc,
            })
        );

        state.dispatch(AppCommand::ActivateSort(Field::Score));
        assert_eq!(
            state.sort.map(|sort| sort.direction),
            Some(SortDirection::Desc)
        );

        state.dispatch(AppCommand::ActivateSort(Field::Score));
        assert_eq!(
            state.sort.map(|sort| sort.direction),
            Some(SortDirection::Asc)
        );

        state.dispatch(AppCommand::ActivateSort(Field::Name));
        assert_eq!(
            state.sort,
            Some(SortSpec {
                field: Field::Name,
                direction: SortDirection::Asc,
            })
        );
        assert_eq!(state.last_issued(), RequestSeq::new(4));
        Ok(())
    }

    #[test]
    fn stale_reply_is_dropped_under_latest_only() -> Result<()> {
        let mut state = state()?;
        state.dispatch(AppCommand::ActivateSort(Field::Score));
        state.dispatch(AppCommand::ActivateSort(Field::Score));

        let stale = state.dispatch(AppCommand::ReplyReceived(IndexReply::Sorted {
            seq: RequestSeq::new(1),
            indices: indices(&[3, 1, 2]),
        }));
        assert_eq!(
            stale,
            vec![AppEvent::StaleReplyDropped {
                seq: RequestSeq::new(1)
            }]
        );
        assert!(state.ordering.is_identity());
        assert!(state.is_busy());

        state.dispatch(AppCommand::ReplyReceived(IndexReply::Sorted {
            seq: RequestSeq::new(2),
            indices: indices(&[2, 1, 3]),
        }));
        assert_eq!(state.ordering, ResultOrdering::explicit(indices(&[2, 1, 3])));
        assert!(!state.is_busy());
        Ok(())
    }

    #[test]
    fn accept_all_installs_out_of_order_replies() -> Result<()> {
        let mut state = state()?;
        state.settings.reply_policy = ReplyPolicy::AcceptAll;
        state.dispatch(AppCommand::ActivateSort(Field::Score));
        state.dispatch(AppCommand::ActivateSort(Field::Score));

        state.dispatch(AppCommand::ReplyReceived(IndexReply::Sorted {
            seq: RequestSeq::new(2),
            indices: indices(&[2, 1]),
        }));
        state.dispatch(AppCommand::ReplyReceived(IndexReply::Sorted {
            seq: RequestSeq::new(1),
            indices: indices(&[1, 2]),
        }));
        assert_eq!(state.ordering, ResultOrdering::explicit(indices(&[1, 2])));
        Ok(())
    }

    #[test]
    fn error_reply_keeps_previous_ordering() -> Result<()> {
        let mut state = state()?;
        state.ordering = ResultOrdering::explicit(indices(&[4, 5]));
        state.dispatch(AppCommand::ActivateSort(Field::Email));

        let events = state.dispatch(AppCommand::ReplyReceived(IndexReply::Error {
            seq: RequestSeq::new(1),
            error: IndexError::InvalidField {
                field: "avatar".to_owned(),
            },
        }));
        assert_eq!(events[0], AppEvent::BusyChanged(false));
        assert_eq!(state.ordering, ResultOrdering::explicit(indices(&[4, 5])));
        assert!(
            state
                .status_line
                .as_deref()
                .is_some_and(|status| status.contains("invalid field"))
        );
        Ok(())
    }

    #[test]
    fn search_clears_sort_indicator() -> Result<()> {
        let mut state = state()?;
        state.dispatch(AppCommand::ActivateSort(Field::Score));
        let start = Instant::now();
        type_query(&mut state, "mia", start);
        state.dispatch(AppCommand::Tick {
            now: start + Duration::from_secs(1),
        });
        assert_eq!(state.sort, None);
        Ok(())
    }

    #[test]
    fn unavailable_engine_keeps_browsing() -> Result<()> {
        let mut state = state()?;
        state.dispatch(AppCommand::EngineUnavailable("spawn failed".to_owned()));
        assert!(matches!(state.engine, EngineStatus::Unavailable(_)));

        let sort = state.dispatch(AppCommand::ActivateSort(Field::Score));
        assert!(issued_request(&sort).is_none());

        let start = Instant::now();
        type_query(&mut state, "ava", start);
        let tick = state.dispatch(AppCommand::Tick {
            now: start + Duration::from_secs(1),
        });
        assert!(issued_request(&tick).is_none());
        assert!(!state.is_busy());

        assert_eq!(
            state.dispatch(AppCommand::ScrollBy(3)),
            vec![AppEvent::ScrollChanged(3)]
        );
        assert_eq!(state.logical_len(), 10);
        Ok(())
    }

    #[test]
    fn scroll_is_clamped_to_last_page() -> Result<()> {
        let mut state = state()?;
        state.dispatch(AppCommand::ScrollToEnd);
        assert_eq!(state.scroll_offset, 6);
        state.dispatch(AppCommand::ScrollBy(-100));
        assert_eq!(state.scroll_offset, 0);

        state.dispatch(AppCommand::ScrollToEnd);
        state.dispatch(AppCommand::Resize { viewport_height: 8 });
        assert_eq!(state.scroll_offset, 2);
        Ok(())
    }

    #[test]
    fn search_mode_transitions() {
        let mut state = AppState::default();
        assert_eq!(
            state.dispatch(AppCommand::EnterSearch),
            vec![AppEvent::ModeChanged(InputMode::Search)]
        );
        assert!(state.dispatch(AppCommand::EnterSearch).is_empty());
        state.dispatch(AppCommand::ExitSearch);
        assert_eq!(state.mode, InputMode::Nav);
    }
}
