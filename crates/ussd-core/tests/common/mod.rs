//! Shared fakes for the dialog integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rvoip_ussd_core::{
    DialogController, PresentationPort, Rejection, TransportFailure, UssdConfig, UssdRequest,
    UssdResponse, UssdTransport,
};
use tokio::sync::Semaphore;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("rvoip_ussd_core=debug")
        .with_test_writer()
        .try_init();
}

/// What the fake backend does for one turn
pub enum Script {
    Reply(&'static str),
    Fail(TransportFailure),
    /// Never answers
    Hang,
}

/// Transport that replays a script and records every request
///
/// When gated, each exchange waits for a permit before answering.
pub struct FakeTransport {
    script: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<UssdRequest>>,
    gate: Option<Semaphore>,
}

impl FakeTransport {
    pub fn new(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    pub fn gated(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            gate: Some(Semaphore::new(0)),
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn requests(&self) -> Vec<UssdRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl UssdTransport for FakeTransport {
    async fn exchange(&self, request: &UssdRequest) -> Result<UssdResponse, TransportFailure> {
        self.requests.lock().push(request.clone());

        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        let step = self.script.lock().pop_front();
        match step {
            Some(Script::Reply(message)) => Ok(UssdResponse {
                message: message.to_string(),
            }),
            Some(Script::Fail(failure)) => Err(failure),
            Some(Script::Hang) => std::future::pending().await,
            None => Err(TransportFailure::Network {
                reason: "script exhausted".to_string(),
            }),
        }
    }
}

/// Presenter that remembers what a screen would show
#[derive(Default)]
pub struct RecordingPresenter {
    pub display: Mutex<String>,
    pub content: Mutex<String>,
    pub input_cleared: Mutex<usize>,
    pub modal_visible: Mutex<bool>,
    pub input_enabled: Mutex<bool>,
    pub busy_history: Mutex<Vec<bool>>,
    pub focus_count: Mutex<usize>,
    pub highlighted: Mutex<Vec<char>>,
    pub rejections: Mutex<Vec<Rejection>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn content(&self) -> String {
        self.content.lock().clone()
    }

    pub fn display(&self) -> String {
        self.display.lock().clone()
    }

    pub fn is_modal_visible(&self) -> bool {
        *self.modal_visible.lock()
    }

    pub fn is_input_enabled(&self) -> bool {
        *self.input_enabled.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.busy_history.lock().last().copied().unwrap_or(false)
    }
}

impl PresentationPort for RecordingPresenter {
    fn update_display(&self, buffer: &str) {
        *self.display.lock() = buffer.to_string();
    }

    fn highlight_key(&self, key: char) {
        self.highlighted.lock().push(key);
    }

    fn show_modal(&self) {
        *self.modal_visible.lock() = true;
    }

    fn hide_modal(&self) {
        *self.modal_visible.lock() = false;
        *self.input_enabled.lock() = false;
    }

    fn render(&self, message: &str) {
        *self.content.lock() = message.to_string();
    }

    fn set_busy(&self, busy: bool) {
        self.busy_history.lock().push(busy);
    }

    fn focus_input(&self) {
        *self.focus_count.lock() += 1;
    }

    fn enable_input(&self) {
        *self.input_enabled.lock() = true;
    }

    fn clear_content(&self) {
        self.content.lock().clear();
    }

    fn clear_input(&self) {
        *self.input_cleared.lock() += 1;
    }

    fn notify_rejection(&self, rejection: Rejection) {
        self.rejections.lock().push(rejection);
    }
}

pub fn test_config() -> UssdConfig {
    UssdConfig::default()
        .with_request_timeout(Duration::from_millis(8000))
        .with_close_delay(Duration::from_millis(250))
}

pub fn controller(
    transport: Arc<FakeTransport>,
    presenter: Arc<RecordingPresenter>,
) -> DialogController {
    DialogController::new(test_config(), transport, presenter).expect("valid config")
}

pub fn type_keys(controller: &DialogController, keys: &str) {
    for key in keys.chars() {
        controller.append_digit(key);
    }
}
