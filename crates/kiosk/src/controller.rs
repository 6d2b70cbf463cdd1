//! Display controller
//!
//! A single task owns the screen. Keystrokes, lookup completions and
//! countdown expiries all arrive as [`Event`]s on one queue and are applied
//! in order, so no screen state is ever shared between tasks.
//!
//! ```text
//! Idle --barcode--> Loading --found--> Result --countdown--> Idle
//!                          \--not found / failure--> Error --dialog countdown--> Idle
//! ```
//!
//! A new barcode is accepted in any state. It aborts the lookup in flight and
//! bumps the sequence number, so a late answer to an older scan is dropped.

use crate::format::format_amount;
use crate::input::InputBuffer;
use crate::lookup::{LookupRequest, PriceLookup};
use crate::screen::{messages, Dialog, Screen, UiState};
use crate::timer::Countdown;
use pricemonitor_api_client::{ApiError, ApiResult, LookupOutcome};
use pricemonitor_core::config::{Settings, SettingsProvider};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Anything that can change what the kiosk shows
#[derive(Debug)]
pub enum Event {
    /// Text typed or scanned into the input field
    Input(String),
    /// A lookup task finished
    LookupFinished {
        seq: u64,
        result: ApiResult<LookupOutcome>,
    },
    /// The result countdown of the given generation ran out
    ResultExpired { generation: u64 },
    /// The countdown of the given dialog ran out
    DialogExpired { id: u64 },
    /// Stop once the lookup in flight and every countdown have finished
    Shutdown,
}

/// Front end that draws the screen
pub trait Display: Send + 'static {
    /// Called after every change with the complete picture
    fn render(&mut self, state: &UiState, screen: &Screen);
}

/// Sends events to a running controller
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: UnboundedSender<Event>,
}

impl ControllerHandle {
    /// Feed typed text; returns false once the controller has stopped
    pub fn input(&self, text: impl Into<String>) -> bool {
        self.tx.send(Event::Input(text.into())).is_ok()
    }

    /// Ask the controller to stop after the current scan has played out
    pub fn shutdown(&self) {
        let _ = self.tx.send(Event::Shutdown);
    }
}

/// Owner of the kiosk screen state
pub struct Controller<L: PriceLookup, D: Display> {
    lookup: Arc<L>,
    display: D,
    settings: Arc<dyn SettingsProvider>,
    active: Settings,

    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,

    state: UiState,
    screen: Screen,
    input: InputBuffer,

    seq: u64,
    in_flight: Option<JoinHandle<()>>,

    result_generation: u64,
    result_countdown: Option<Countdown>,

    next_dialog_id: u64,
    dialog_countdown: Option<Countdown>,

    stopping: bool,
}

impl<L: PriceLookup, D: Display> Controller<L, D> {
    pub fn new(lookup: L, settings: Arc<dyn SettingsProvider>, display: D) -> (Self, ControllerHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let active = settings.snapshot();
        let handle = ControllerHandle { tx: tx.clone() };

        let controller = Self {
            lookup: Arc::new(lookup),
            display,
            settings,
            active,
            tx,
            rx,
            state: UiState::Idle,
            screen: Screen::idle(),
            input: InputBuffer::new(),
            seq: 0,
            in_flight: None,
            result_generation: 0,
            result_countdown: None,
            next_dialog_id: 0,
            dialog_countdown: None,
            stopping: false,
        };
        (controller, handle)
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Process events until shutdown, returning the display
    ///
    /// After [`Event::Shutdown`] the loop keeps running until the pending
    /// lookup has been shown and its countdown has returned the screen to
    /// idle.
    pub async fn run(mut self) -> D {
        self.render();

        while !(self.stopping && self.is_settled()) {
            let Some(event) = self.rx.recv().await else {
                break;
            };
            self.handle_event(event);
        }

        info!("Display controller stopped");
        self.display
    }

    /// Nothing in flight and no countdown pending
    pub fn is_settled(&self) -> bool {
        self.in_flight.is_none() && self.result_countdown.is_none() && self.dialog_countdown.is_none()
    }

    /// Apply one event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Input(text) => self.on_input(&text),
            Event::LookupFinished { seq, result } => self.on_lookup_finished(seq, result),
            Event::ResultExpired { generation } => self.on_result_expired(generation),
            Event::DialogExpired { id } => self.on_dialog_expired(id),
            Event::Shutdown => {
                debug!(settled = self.is_settled(), "Shutdown requested");
                self.stopping = true;
            }
        }
    }

    fn on_input(&mut self, text: &str) {
        let barcodes = self.input.push(text);
        self.screen.input = self.input.text().to_string();

        if barcodes.is_empty() {
            self.render();
            return;
        }
        for barcode in barcodes {
            self.submit(barcode);
        }
    }

    fn submit(&mut self, barcode: String) {
        self.seq += 1;
        if let Some(task) = self.in_flight.take() {
            debug!(seq = self.seq - 1, "Aborting superseded lookup");
            task.abort();
        }
        if let Some(countdown) = self.result_countdown.take() {
            countdown.cancel();
        }

        self.active = self.settings.snapshot();
        let request = LookupRequest::new(barcode, &self.active);
        info!(
            seq = self.seq,
            barcode = %request.barcode,
            base_url = %request.base_url,
            "Barcode submitted"
        );

        self.transition(UiState::Loading);
        self.screen.show_loading();
        self.render();

        let seq = self.seq;
        let lookup = Arc::clone(&self.lookup);
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = lookup.lookup(request).await;
            let _ = tx.send(Event::LookupFinished { seq, result });
        }));
    }

    fn on_lookup_finished(&mut self, seq: u64, result: ApiResult<LookupOutcome>) {
        if seq != self.seq {
            debug!(seq, current = self.seq, "Dropping stale lookup result");
            return;
        }
        self.in_flight = None;

        match result {
            Ok(LookupOutcome::Found(record)) => {
                let price = format_amount(record.amount(), &self.active.display.currency);
                self.screen.show_record(&record, price);
                self.transition(UiState::Result(record));
                self.start_result_countdown();
            }
            Ok(LookupOutcome::NotFound { barcode }) => {
                self.fail(messages::NOT_FOUND_TITLE, messages::not_found(&barcode));
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Lookup failed");
                self.fail(messages::ERROR_TITLE, failure_message(&e));
            }
        }
        self.render();
    }

    fn fail(&mut self, title: &str, message: String) {
        self.screen.show_initial();
        self.show_dialog(title, message.clone());
        self.transition(UiState::Error {
            title: title.to_string(),
            message,
        });
    }

    fn show_dialog(&mut self, title: &str, message: String) {
        self.next_dialog_id += 1;
        let id = self.next_dialog_id;

        self.screen.dialog = Some(Dialog {
            id,
            title: title.to_string(),
            message,
        });
        self.dialog_countdown = Some(Countdown::start(
            self.active.timeouts.result(),
            self.tx.clone(),
            Event::DialogExpired { id },
        ));
    }

    fn start_result_countdown(&mut self) {
        self.result_generation += 1;
        self.result_countdown = Some(Countdown::start(
            self.active.timeouts.result(),
            self.tx.clone(),
            Event::ResultExpired {
                generation: self.result_generation,
            },
        ));
    }

    fn on_result_expired(&mut self, generation: u64) {
        if generation != self.result_generation {
            return;
        }
        self.result_countdown = None;
        if !matches!(self.state, UiState::Result(_)) {
            return;
        }
        self.screen.show_initial();
        self.transition(UiState::Idle);
        self.render();
    }

    fn on_dialog_expired(&mut self, id: u64) {
        if self.screen.dialog.as_ref().map(|d| d.id) != Some(id) {
            return;
        }
        self.dialog_countdown = None;
        self.screen.dialog = None;
        if matches!(self.state, UiState::Error { .. }) {
            self.transition(UiState::Idle);
        }
        self.render();
    }

    fn transition(&mut self, next: UiState) {
        debug!(from = self.state.name(), to = next.name(), "State transition");
        self.state = next;
    }

    fn render(&mut self) {
        self.display.render(&self.state, &self.screen);
    }
}

fn failure_message(error: &ApiError) -> String {
    messages::server_error(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricemonitor_api_client::PriceRecord;
    use pricemonitor_core::config::StaticSettings;
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Lookup that answers from a script after an optional delay
    #[derive(Default)]
    struct ScriptedLookup {
        answers: Mutex<VecDeque<(Duration, ApiResult<LookupOutcome>)>>,
        requests: Arc<Mutex<Vec<LookupRequest>>>,
    }

    impl ScriptedLookup {
        fn answer(self, delay: Duration, result: ApiResult<LookupOutcome>) -> Self {
            self.answers.lock().unwrap().push_back((delay, result));
            self
        }
    }

    impl PriceLookup for ScriptedLookup {
        async fn lookup(&self, request: LookupRequest) -> ApiResult<LookupOutcome> {
            self.requests.lock().unwrap().push(request);
            let next = self.answers.lock().unwrap().pop_front();
            let (delay, result) = next.expect("unexpected lookup");
            tokio::time::sleep(delay).await;
            result
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(UiState, Screen)>>>);

    impl Recorder {
        fn last(&self) -> (UiState, Screen) {
            self.0.lock().unwrap().last().cloned().expect("nothing rendered")
        }

        fn states(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().iter().map(|(s, _)| s.name()).collect()
        }
    }

    impl Display for Recorder {
        fn render(&mut self, state: &UiState, screen: &Screen) {
            self.0.lock().unwrap().push((state.clone(), screen.clone()));
        }
    }

    fn found(barcode: &str, name: &str, price: &str) -> ApiResult<LookupOutcome> {
        Ok(LookupOutcome::Found(PriceRecord::new(barcode, name, price).unwrap()))
    }

    struct Harness {
        handle: ControllerHandle,
        recorder: Recorder,
        requests: Arc<Mutex<Vec<LookupRequest>>>,
    }

    fn start(lookup: ScriptedLookup, settings: Settings) -> Harness {
        let recorder = Recorder::default();
        let requests = Arc::clone(&lookup.requests);
        let (controller, handle) =
            Controller::new(lookup, Arc::new(StaticSettings::new(settings)), recorder.clone());
        tokio::spawn(controller.run());
        Harness {
            handle,
            recorder,
            requests,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_found_renders_then_resets() {
        let lookup = ScriptedLookup::default().answer(Duration::ZERO, found("123", "Milk", "2.5"));
        let h = start(lookup, Settings::default());

        h.handle.input("123\n");
        settle().await;

        let (state, screen) = h.recorder.last();
        assert!(matches!(state, UiState::Result(ref r) if r.barcode() == "123"));
        assert_eq!(screen.barcode, "123");
        assert_eq!(screen.item_name, "Milk");
        assert_eq!(screen.price, "2.50 AZN");
        assert!(!screen.logo_visible);
        assert!(!screen.progress_visible);
        assert_eq!(h.recorder.states(), vec!["idle", "loading", "result"]);

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        let (state, screen) = h.recorder.last();
        assert_eq!(state, UiState::Idle);
        assert!(screen.shows_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_clears_fields_and_shows_progress() {
        let lookup = ScriptedLookup::default()
            .answer(Duration::ZERO, found("1", "Tea", "3"))
            .answer(Duration::from_secs(1), found("2", "Jam", "4"));
        let h = start(lookup, Settings::default());

        h.handle.input("1\n");
        settle().await;
        h.handle.input("2\n");
        settle().await;

        let (state, screen) = h.recorder.last();
        assert_eq!(state, UiState::Loading);
        assert!(screen.progress_visible);
        assert!(!screen.logo_visible);
        assert!(screen.barcode.is_empty() && screen.price.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_shows_dialog_and_reverts_to_idle_display() {
        let lookup = ScriptedLookup::default().answer(
            Duration::ZERO,
            Ok(LookupOutcome::NotFound {
                barcode: "999".to_string(),
            }),
        );
        let h = start(lookup, Settings::default());

        h.handle.input("999\n");
        settle().await;

        let (state, screen) = h.recorder.last();
        assert!(matches!(state, UiState::Error { ref title, .. } if title == messages::NOT_FOUND_TITLE));
        assert!(screen.shows_idle());
        let dialog = screen.dialog.expect("dialog shown");
        assert!(dialog.message.contains("999"));

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        let (state, screen) = h.recorder.last();
        assert_eq!(state, UiState::Idle);
        assert!(screen.dialog.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_failure_never_enters_result() {
        let lookup = ScriptedLookup::default()
            .answer(Duration::ZERO, Err(ApiError::parse("expected value at line 1")));
        let h = start(lookup, Settings::default());

        h.handle.input("42\n");
        settle().await;

        let (state, screen) = h.recorder.last();
        assert!(matches!(state, UiState::Error { ref title, .. } if title == messages::ERROR_TITLE));
        assert!(screen.shows_idle());
        assert!(screen.dialog.unwrap().message.contains("expected value"));
        assert!(!h.recorder.states().contains(&"result"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_dialog() {
        let lookup = ScriptedLookup::default()
            .answer(Duration::ZERO, Err(ApiError::Timeout(Duration::from_secs(15))));
        let h = start(lookup, Settings::default());

        h.handle.input("42\n");
        settle().await;

        let (_, screen) = h.recorder.last();
        let dialog = screen.dialog.unwrap();
        assert_eq!(dialog.title, messages::ERROR_TITLE);
        assert!(dialog.message.starts_with(messages::SERVER_ERROR));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_ignored() {
        let lookup = ScriptedLookup::default()
            .answer(Duration::from_secs(3), found("1", "Old", "1"))
            .answer(Duration::from_secs(1), found("2", "New", "2"));
        let h = start(lookup, Settings::default());

        h.handle.input("1\n");
        settle().await;
        h.handle.input("2\n");
        tokio::time::sleep(Duration::from_secs(4)).await;

        let (state, screen) = h.recorder.last();
        assert!(matches!(state, UiState::Result(ref r) if r.item_name() == "New"));
        assert_eq!(screen.item_name, "New");
        assert!(
            h.recorder
                .0
                .lock()
                .unwrap()
                .iter()
                .all(|(_, s)| s.item_name != "Old")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_scan_cancels_result_countdown() {
        let lookup = ScriptedLookup::default()
            .answer(Duration::ZERO, found("1", "Tea", "3"))
            .answer(Duration::ZERO, found("2", "Jam", "4"));
        let h = start(lookup, Settings::default());

        h.handle.input("1\n");
        tokio::time::sleep(Duration::from_secs(4)).await;
        h.handle.input("2\n");
        tokio::time::sleep(Duration::from_secs(2)).await;

        // The first countdown would have expired by now
        let (state, screen) = h.recorder.last();
        assert!(matches!(state, UiState::Result(_)));
        assert_eq!(screen.item_name, "Jam");

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(h.recorder.last().0, UiState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_duration_comes_from_settings() {
        let mut settings = Settings::default();
        settings.timeouts.result_secs = 2;
        settings.display.currency = "USD".to_string();
        let lookup = ScriptedLookup::default().answer(Duration::ZERO, found("7", "Soap", "19"));
        let h = start(lookup, settings);

        h.handle.input("7\n");
        settle().await;
        assert_eq!(h.recorder.last().1.price, "19.00 USD");

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(h.recorder.last().0, UiState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_uses_current_settings() {
        let mut settings = Settings::default();
        settings.server.local_mode = false;
        let lookup = ScriptedLookup::default().answer(Duration::ZERO, found("5", "Salt", "1"));
        let h = start(lookup, settings);

        h.handle.input("  5 \n");
        settle().await;

        let requests = h.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].barcode, "5");
        assert_eq!(requests[0].base_url, "http://185.129.0.46:8081");
    }

    #[tokio::test(start_paused = true)]
    async fn test_typed_text_is_shown_until_line_end() {
        let h = start(ScriptedLookup::default(), Settings::default());

        h.handle.input("47");
        settle().await;
        assert_eq!(h.recorder.last().1.input, "47");
        assert_eq!(h.recorder.last().0, UiState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_returns_display() {
        let recorder = Recorder::default();
        let (controller, handle) = Controller::new(
            ScriptedLookup::default(),
            Arc::new(StaticSettings::new(Settings::default())),
            recorder,
        );
        let task = tokio::spawn(controller.run());
        handle.shutdown();

        let display = task.await.unwrap();
        assert_eq!(display.states(), vec!["idle"]);
        assert!(!handle.input("1\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_pending_scan() {
        let lookup = ScriptedLookup::default()
            .answer(Duration::from_millis(200), found("123", "Milk", "2.5"));
        let (controller, handle) = Controller::new(
            lookup,
            Arc::new(StaticSettings::new(Settings::default())),
            Recorder::default(),
        );
        let task = tokio::spawn(controller.run());

        handle.input("123\n");
        handle.shutdown();

        let display = task.await.unwrap();
        assert_eq!(display.states(), vec!["idle", "loading", "result", "idle"]);
        let shown = display.0.lock().unwrap();
        assert!(shown.iter().any(|(_, screen)| screen.price == "2.50 AZN"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_dialog() {
        let lookup = ScriptedLookup::default().answer(
            Duration::ZERO,
            Ok(LookupOutcome::NotFound {
                barcode: "999".to_string(),
            }),
        );
        let (controller, handle) = Controller::new(
            lookup,
            Arc::new(StaticSettings::new(Settings::default())),
            Recorder::default(),
        );
        let task = tokio::spawn(controller.run());

        handle.input("999\n");
        handle.shutdown();

        let display = task.await.unwrap();
        let (state, screen) = display.last();
        assert_eq!(state, UiState::Idle);
        assert!(screen.dialog.is_none());
        assert!(display.states().contains(&"error"));
    }

    proptest! {
        #[test]
        fn prop_blank_input_causes_no_transition(blank in "[ \t\r]{0,10}") {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let lookup = ScriptedLookup::default();
                let requests = Arc::clone(&lookup.requests);
                let (mut controller, _handle) = Controller::new(
                    lookup,
                    Arc::new(StaticSettings::new(Settings::default())),
                    Recorder::default(),
                );

                controller.handle_event(Event::Input(format!("{blank}\n")));

                assert_eq!(controller.state(), &UiState::Idle);
                assert!(controller.screen().shows_idle());
                assert!(requests.lock().unwrap().is_empty());
            });
        }

        #[test]
        fn prop_each_barcode_issues_one_request(code in "[0-9]{1,14}") {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let lookup = ScriptedLookup::default().answer(Duration::ZERO, found(&code, "X", "1"));
                let requests = Arc::clone(&lookup.requests);
                let (mut controller, _handle) = Controller::new(
                    lookup,
                    Arc::new(StaticSettings::new(Settings::default())),
                    Recorder::default(),
                );

                controller.handle_event(Event::Input(format!("{code}\n")));
                assert_eq!(controller.state(), &UiState::Loading);
                tokio::task::yield_now().await;

                let requests = requests.lock().unwrap();
                assert_eq!(requests.len(), 1);
                assert_eq!(requests[0].barcode, code);
            });
        }
    }
}
