use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::client::{ScheduleApi, ServiceError};
use crate::schedule::model::{ConfigForm, ConfigWindow, PauseState, RemoteConfig, ToggleResponse};

pub const STATUS_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Neutral,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: MessageKind,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(text: impl Into<String>, kind: MessageKind, now: Instant) -> Self {
        Self {
            text: text.into(),
            kind,
            expires_at: now + STATUS_TTL,
        }
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Submitting,
    Toggling,
    Checking,
    Launching,
}

enum OpOutcome {
    Load(Result<RemoteConfig, ServiceError>),
    Submit(Result<Option<String>, ServiceError>),
    Toggle(Result<ToggleResponse, ServiceError>),
    Check(Result<Vec<String>, ServiceError>),
    Launch(Result<Option<String>, ServiceError>),
}

pub struct PanelController {
    service: Arc<dyn ScheduleApi>,
    state: SessionState,
    pub form: ConfigForm,
    current: Option<ConfigWindow>,
    pause: PauseState,
    status: Option<StatusMessage>,
    tee_times: Vec<String>,
    inflight: Option<Receiver<OpOutcome>>,
}

impl PanelController {
    pub fn new(service: Arc<dyn ScheduleApi>) -> Self {
        Self {
            service,
            state: SessionState::Idle,
            form: ConfigForm::default(),
            current: None,
            pause: PauseState::Unknown,
            status: None,
            tee_times: Vec::new(),
            inflight: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn pause(&self) -> PauseState {
        self.pause
    }

    pub fn current(&self) -> Option<&ConfigWindow> {
        self.current.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn tee_times(&self) -> &[String] {
        &self.tee_times
    }

    pub fn start_load(&mut self) -> bool {
        if !self.begin(SessionState::Loading) {
            return false;
        }
        self.spawn(|service| OpOutcome::Load(service.fetch_config()));
        true
    }

    pub fn submit(&mut self) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        if !self.form.is_complete() {
            self.set_status("Please fill in all fields.", MessageKind::Error);
            return false;
        }
        let Some(window) = self.form.to_wire() else {
            self.set_status(
                "Date must be YYYY-MM-DD and times 24-hour HH:MM.",
                MessageKind::Error,
            );
            return false;
        };

        self.state = SessionState::Submitting;
        self.set_status("Updating configuration...", MessageKind::Neutral);
        self.spawn(move |service| OpOutcome::Submit(service.write_config(&window)));
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        if !self.begin(SessionState::Toggling) {
            return false;
        }
        self.spawn(|service| OpOutcome::Toggle(service.toggle_pause()));
        true
    }

    pub fn start_check(&mut self) -> bool {
        if !self.begin(SessionState::Checking) {
            return false;
        }
        self.spawn(|service| OpOutcome::Check(service.check_results()));
        true
    }

    pub fn launch_scraper(&mut self) -> bool {
        if !self.begin(SessionState::Launching) {
            return false;
        }
        self.spawn(|service| OpOutcome::Launch(service.launch_scraper()));
        true
    }

    pub fn poll(&mut self) {
        self.poll_at(Instant::now());
    }

    pub fn poll_at(&mut self, now: Instant) {
        if let Some(message) = &self.status
            && message.is_expired_at(now)
        {
            self.status = None;
        }

        let Some(rx) = &self.inflight else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.inflight = None;
                self.apply(outcome, now);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.inflight = None;
                self.state = SessionState::Idle;
                self.set_status_at(
                    "The background request was abandoned.",
                    MessageKind::Error,
                    now,
                );
            }
        }
    }

    fn begin(&mut self, next: SessionState) -> bool {
        if self.state != SessionState::Idle {
            return false;
        }
        self.state = next;
        true
    }

    fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce(&dyn ScheduleApi) -> OpOutcome + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let service = Arc::clone(&self.service);
        thread::spawn(move || {
            let _ = tx.send(job(service.as_ref()));
        });
        self.inflight = Some(rx);
    }

    fn apply(&mut self, outcome: OpOutcome, now: Instant) {
        self.state = SessionState::Idle;
        match outcome {
            OpOutcome::Load(Ok(remote)) => {
                self.form = ConfigForm::from_wire(&remote);
                self.pause = PauseState::from_flag(remote.is_paused);
                self.current = Some(remote.window());
            }
            OpOutcome::Load(Err(err)) => {
                // Load failure blanks the pause state; the form keeps
                // whatever the operator last saw.
                self.pause = PauseState::Unknown;
                self.set_status_at(
                    format!("Failed to load configuration: {err}"),
                    MessageKind::Error,
                    now,
                );
            }
            OpOutcome::Submit(Ok(message)) => {
                self.set_status_at(
                    message.unwrap_or_else(|| "Configuration updated.".to_string()),
                    MessageKind::Success,
                    now,
                );
                // The write's echoed values are not trusted; re-fetch so the
                // form shows what the service actually stored.
                self.start_load();
            }
            OpOutcome::Submit(Err(err)) => {
                self.set_status_at(
                    format!("Failed to update configuration: {err}"),
                    MessageKind::Error,
                    now,
                );
            }
            OpOutcome::Toggle(Ok(toggle)) => {
                self.pause = PauseState::from_flag(Some(toggle.is_paused));
                let fallback = if toggle.is_paused {
                    "Scraper paused."
                } else {
                    "Scraper resumed."
                };
                self.set_status_at(
                    toggle.message.unwrap_or_else(|| fallback.to_string()),
                    MessageKind::Success,
                    now,
                );
            }
            OpOutcome::Toggle(Err(err)) => {
                // Unlike a failed load, a failed toggle keeps the last known
                // pause state.
                self.set_status_at(
                    format!("Failed to toggle scraper pause: {err}"),
                    MessageKind::Error,
                    now,
                );
            }
            OpOutcome::Check(Ok(results)) => {
                self.set_status_at(
                    format!("Fetched {} cached result(s).", results.len()),
                    MessageKind::Success,
                    now,
                );
                self.tee_times = results;
            }
            OpOutcome::Check(Err(err)) => {
                self.set_status_at(
                    format!("Failed to fetch cached results: {err}"),
                    MessageKind::Error,
                    now,
                );
            }
            OpOutcome::Launch(Ok(message)) => {
                self.set_status_at(
                    message.unwrap_or_else(|| "Scraper started in background.".to_string()),
                    MessageKind::Success,
                    now,
                );
            }
            OpOutcome::Launch(Err(err)) => {
                self.set_status_at(
                    format!("Failed to start scraper: {err}"),
                    MessageKind::Error,
                    now,
                );
            }
        }
    }

    fn set_status(&mut self, text: impl Into<String>, kind: MessageKind) {
        self.set_status_at(text, kind, Instant::now());
    }

    fn set_status_at(&mut self, text: impl Into<String>, kind: MessageKind, now: Instant) {
        // Single slot: a newer message always replaces the old one and
        // restarts the visibility window.
        self.status = Some(StatusMessage::new(text, kind, now));
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::Sender;

    use super::*;

    #[derive(Default)]
    struct MockService {
        fetches: Mutex<VecDeque<Result<RemoteConfig, ServiceError>>>,
        writes: Mutex<VecDeque<Result<Option<String>, ServiceError>>>,
        toggles: Mutex<VecDeque<Result<ToggleResponse, ServiceError>>>,
        fetch_calls: AtomicUsize,
        write_calls: AtomicUsize,
        toggle_calls: AtomicUsize,
        gate: Option<Mutex<mpsc::Receiver<()>>>,
    }

    impl MockService {
        fn gated() -> (Self, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            let service = Self {
                gate: Some(Mutex::new(rx)),
                ..Self::default()
            };
            (service, tx)
        }

        fn push_fetch(&self, response: Result<RemoteConfig, ServiceError>) {
            self.fetches.lock().expect("lock").push_back(response);
        }

        fn push_write(&self, response: Result<Option<String>, ServiceError>) {
            self.writes.lock().expect("lock").push_back(response);
        }

        fn push_toggle(&self, response: Result<ToggleResponse, ServiceError>) {
            self.toggles.lock().expect("lock").push_back(response);
        }

        fn wait_gate(&self) {
            if let Some(gate) = &self.gate {
                let _ = gate.lock().expect("lock").recv();
            }
        }
    }

    impl ScheduleApi for MockService {
        fn fetch_config(&self) -> Result<RemoteConfig, ServiceError> {
            self.wait_gate();
            self.fetch_calls.fetch_add(1, Ordering::SeqCst);
            self.fetches
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Service("unscripted fetch".to_string())))
        }

        fn write_config(&self, _window: &ConfigWindow) -> Result<Option<String>, ServiceError> {
            self.wait_gate();
            self.write_calls.fetch_add(1, Ordering::SeqCst);
            self.writes
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Service("unscripted write".to_string())))
        }

        fn toggle_pause(&self) -> Result<ToggleResponse, ServiceError> {
            self.wait_gate();
            self.toggle_calls.fetch_add(1, Ordering::SeqCst);
            self.toggles
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(ServiceError::Service("unscripted toggle".to_string())))
        }

        fn check_results(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec!["07:30 AM - Creek - 2 slots open".to_string()])
        }

        fn launch_scraper(&self) -> Result<Option<String>, ServiceError> {
            Ok(None)
        }
    }

    // Dies before the worker can report back; the channel just disconnects.
    struct CrashingService;

    impl ScheduleApi for CrashingService {
        fn fetch_config(&self) -> Result<RemoteConfig, ServiceError> {
            panic!("worker crashed");
        }

        fn write_config(&self, _window: &ConfigWindow) -> Result<Option<String>, ServiceError> {
            panic!("worker crashed");
        }

        fn toggle_pause(&self) -> Result<ToggleResponse, ServiceError> {
            panic!("worker crashed");
        }

        fn check_results(&self) -> Result<Vec<String>, ServiceError> {
            panic!("worker crashed");
        }

        fn launch_scraper(&self) -> Result<Option<String>, ServiceError> {
            panic!("worker crashed");
        }
    }

    fn remote(date: &str, start: &str, end: &str, paused: Option<bool>) -> RemoteConfig {
        RemoteConfig {
            date: date.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            is_paused: paused,
        }
    }

    fn wait_idle(controller: &mut PanelController) {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            controller.poll();
            if controller.is_idle() && controller.inflight.is_none() {
                return;
            }
            assert!(Instant::now() < deadline, "controller never settled");
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn filled_form() -> ConfigForm {
        ConfigForm {
            date: "2025-06-01".to_string(),
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        }
    }

    #[test]
    fn submit_with_missing_field_never_touches_the_network() {
        let service = Arc::new(MockService::default());
        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        controller.form = ConfigForm {
            date: String::new(),
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        };

        assert!(!controller.submit());
        assert_eq!(controller.state(), SessionState::Idle);
        assert_eq!(service.write_calls.load(Ordering::SeqCst), 0);
        let message = controller.status().expect("validation message");
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, "Please fill in all fields.");
    }

    #[test]
    fn submit_with_unconvertible_field_is_rejected_locally() {
        let service = Arc::new(MockService::default());
        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        controller.form = ConfigForm {
            date: "June 1st".to_string(),
            start: "09:00".to_string(),
            end: "17:00".to_string(),
        };

        assert!(!controller.submit());
        assert_eq!(service.write_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            controller.status().expect("message").kind,
            MessageKind::Error
        );
    }

    #[test]
    fn successful_submit_resyncs_from_the_service() {
        let service = Arc::new(MockService::default());
        service.push_write(Ok(Some("Time window updated successfully".to_string())));
        // The service stored something different from what was submitted;
        // the form must show the service's version.
        service.push_fetch(Ok(remote("06/02/2025", "10:00 AM", "06:00 PM", Some(false))));

        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        controller.form = filled_form();
        assert!(controller.submit());
        wait_idle(&mut controller);

        assert_eq!(service.write_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(controller.form.date, "2025-06-02");
        assert_eq!(controller.form.start, "10:00");
        assert_eq!(controller.form.end, "18:00");
        assert_eq!(controller.pause(), PauseState::Running);
        assert_eq!(
            controller.current().expect("window").date.as_str(),
            "06/02/2025"
        );
        let message = controller.status().expect("submit message");
        assert_eq!(message.kind, MessageKind::Success);
        assert_eq!(message.text, "Time window updated successfully");
    }

    #[test]
    fn failed_submit_keeps_the_form_and_reports_the_service_error() {
        let service = Arc::new(MockService::default());
        service.push_write(Err(ServiceError::Service(
            "config file is locked".to_string(),
        )));

        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        controller.form = filled_form();
        assert!(controller.submit());
        wait_idle(&mut controller);

        assert_eq!(service.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.form, filled_form());
        let message = controller.status().expect("error message");
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.contains("config file is locked"));
    }

    #[test]
    fn toggle_takes_the_flag_from_the_toggle_response() {
        let service = Arc::new(MockService::default());
        service.push_toggle(Ok(ToggleResponse {
            message: None,
            is_paused: true,
        }));

        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        assert!(controller.toggle_pause());
        wait_idle(&mut controller);

        assert_eq!(controller.pause(), PauseState::Paused);
        // No /get round trip is needed after a toggle.
        assert_eq!(service.fetch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            controller.status().expect("message").text,
            "Scraper paused."
        );
    }

    #[test]
    fn failed_toggle_keeps_the_previous_pause_state() {
        let service = Arc::new(MockService::default());
        service.push_fetch(Ok(remote("06/01/2025", "09:00 AM", "05:00 PM", Some(false))));
        service.push_toggle(Err(ServiceError::Transport("connection reset".to_string())));

        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        assert!(controller.start_load());
        wait_idle(&mut controller);
        assert_eq!(controller.pause(), PauseState::Running);

        assert!(controller.toggle_pause());
        wait_idle(&mut controller);
        assert_eq!(controller.pause(), PauseState::Running);
        assert_eq!(
            controller.status().expect("message").kind,
            MessageKind::Error
        );
    }

    #[test]
    fn failed_load_blanks_the_pause_state_but_not_the_form() {
        let service = Arc::new(MockService::default());
        service.push_fetch(Ok(remote("06/01/2025", "09:00 AM", "05:00 PM", Some(true))));
        service.push_fetch(Err(ServiceError::Transport("dns failure".to_string())));

        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        assert!(controller.start_load());
        wait_idle(&mut controller);
        assert_eq!(controller.pause(), PauseState::Paused);
        let populated = controller.form.clone();
        assert!(populated.is_complete());

        assert!(controller.start_load());
        wait_idle(&mut controller);
        assert_eq!(controller.pause(), PauseState::Unknown);
        assert_eq!(controller.form, populated);
        let message = controller.status().expect("error message");
        assert_eq!(message.kind, MessageKind::Error);
        assert!(message.text.contains("dns failure"));
    }

    #[test]
    fn operations_are_mutually_exclusive_while_one_is_in_flight() {
        let (service, gate) = MockService::gated();
        service.push_fetch(Ok(remote("06/01/2025", "09:00 AM", "05:00 PM", Some(false))));
        let service = Arc::new(service);

        let mut controller = PanelController::new(Arc::clone(&service) as Arc<dyn ScheduleApi>);
        controller.form = filled_form();
        assert!(controller.start_load());
        assert_eq!(controller.state(), SessionState::Loading);

        assert!(!controller.submit());
        assert!(!controller.toggle_pause());
        assert!(!controller.start_load());

        gate.send(()).expect("release gate");
        wait_idle(&mut controller);
        assert_eq!(service.fetch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(service.write_calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.toggle_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn abandoned_worker_returns_to_idle_with_an_error() {
        let mut controller = PanelController::new(Arc::new(CrashingService));
        assert!(controller.start_load());
        wait_idle(&mut controller);

        assert_eq!(controller.state(), SessionState::Idle);
        let message = controller.status().expect("error message");
        assert_eq!(message.kind, MessageKind::Error);
        assert_eq!(message.text, "The background request was abandoned.");

        // The machine is usable again after the recovery.
        assert!(controller.toggle_pause());
        assert_eq!(controller.state(), SessionState::Toggling);
    }

    #[test]
    fn status_message_expires_after_the_ttl() {
        let now = Instant::now();
        let message = StatusMessage::new("saved", MessageKind::Success, now);
        assert!(!message.is_expired_at(now + Duration::from_secs(4)));
        assert!(message.is_expired_at(now + STATUS_TTL));
    }

    #[test]
    fn newer_message_restarts_the_visibility_window() {
        let service = Arc::new(MockService::default());
        let mut controller = PanelController::new(service as Arc<dyn ScheduleApi>);
        let start = Instant::now();

        controller.set_status_at("first", MessageKind::Neutral, start);
        controller.set_status_at("second", MessageKind::Success, start + Duration::from_secs(3));

        // Past the first message's window, the replacement is still visible.
        controller.poll_at(start + Duration::from_secs(6));
        assert_eq!(controller.status().expect("message").text, "second");

        controller.poll_at(start + Duration::from_secs(9));
        assert!(controller.status().is_none());
    }
}
