//! I/O traits for the controllers
//!
//! These traits abstract the HTTP API, the push channel and user-facing
//! notifications, enabling controller tests with mock implementations.

use std::path::Path;

use super::error::ApiError;
use super::protocol::{Card, DrawResponse, NewCard, PushMessage, Settings, SettingsPatch};
use super::reconnect::CloseKind;

// =============================================================================
// CONNECTION STATUS
// =============================================================================

/// Connection status of the push channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Not connected to server
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Connected and receiving updates
    Connected,
    /// Connection lost, waiting for the next attempt
    Reconnecting,
}

/// Events produced by the push channel
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    StatusChanged(ConnectionStatus),
    Message(PushMessage),
    /// The channel closed; a reconnect is already scheduled
    Closed(CloseKind),
    Error(String),
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// Blocking user-facing notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, title, message)
    }

    fn new(level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Surface notices and confirmations to the operator
pub trait Notifier {
    fn notify(&self, notice: Notice);

    /// Ask a yes/no question; `false` cancels the action
    fn confirm(&self, prompt: &str) -> bool;
}

// =============================================================================
// I/O TRAITS
// =============================================================================

/// Source of full settings snapshots
pub trait SettingsSource {
    fn fetch_settings(&self) -> Result<Settings, ApiError>;
}

/// Operations of the admin HTTP API
pub trait AdminApi: SettingsSource {
    fn list_cards(&self) -> Result<Vec<Card>, ApiError>;

    fn create_card(&self, card: &NewCard) -> Result<(), ApiError>;

    fn delete_card(&self, id: i64) -> Result<(), ApiError>;

    fn update_settings(&self, patch: &SettingsPatch) -> Result<(), ApiError>;

    fn start_drawing(&self) -> Result<(), ApiError>;

    /// Draw the next number. An `{"error"}` body is returned as a response,
    /// not as an `ApiError`.
    fn draw_number(&self) -> Result<DrawResponse, ApiError>;

    /// Upload an image and return the server-assigned filename
    fn upload_image(&self, path: &Path) -> Result<String, ApiError>;
}

/// Live-update channel
pub trait PushChannel {
    /// Open the channel; reconnection is handled by the implementation
    fn connect(&mut self);

    /// Poll for the next event (non-blocking)
    fn poll_event(&mut self) -> Option<PushEvent>;

    fn status(&self) -> ConnectionStatus;
}

// =============================================================================
// MOCK IMPLEMENTATIONS FOR TESTING
// =============================================================================

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::rc::Rc;

    /// A request recorded by `MockApi`
    #[derive(Debug, Clone, PartialEq)]
    pub enum ApiCall {
        FetchSettings,
        ListCards,
        CreateCard(NewCard),
        DeleteCard(i64),
        UpdateSettings(SettingsPatch),
        StartDrawing,
        DrawNumber,
        UploadImage(PathBuf),
    }

    /// Mock HTTP API
    ///
    /// Records every call and serves queued responses. Unqueued calls succeed
    /// with the current `settings` / `cards`.
    #[derive(Default)]
    pub struct MockApi {
        pub calls: RefCell<Vec<ApiCall>>,
        pub settings: RefCell<Settings>,
        pub cards: RefCell<Vec<Card>>,
        pub draw_responses: RefCell<VecDeque<Result<DrawResponse, ApiError>>>,
        pub upload_results: RefCell<VecDeque<Result<String, ApiError>>>,
        /// Error returned by the next mutating call
        pub fail_next: RefCell<Option<ApiError>>,
        /// Error returned by every settings fetch
        pub fail_fetch: RefCell<Option<ApiError>>,
        /// Shared log for ordering assertions across mocks
        pub journal: Option<Rc<RefCell<Vec<String>>>>,
    }

    impl MockApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_settings(settings: Settings) -> Self {
            let api = Self::new();
            *api.settings.borrow_mut() = settings;
            api
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        /// Calls other than the read-only refresh requests
        pub fn mutations(&self) -> Vec<ApiCall> {
            self.calls
                .borrow()
                .iter()
                .filter(|c| !matches!(c, ApiCall::FetchSettings | ApiCall::ListCards))
                .cloned()
                .collect()
        }

        fn record(&self, call: ApiCall) {
            if let Some(journal) = &self.journal {
                journal.borrow_mut().push(format!("api:{:?}", call));
            }
            self.calls.borrow_mut().push(call);
        }

        fn mutation_result(&self) -> Result<(), ApiError> {
            match self.fail_next.borrow_mut().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    impl SettingsSource for MockApi {
        fn fetch_settings(&self) -> Result<Settings, ApiError> {
            self.record(ApiCall::FetchSettings);
            if let Some(err) = self.fail_fetch.borrow().clone() {
                return Err(err);
            }
            Ok(self.settings.borrow().clone())
        }
    }

    impl AdminApi for MockApi {
        fn list_cards(&self) -> Result<Vec<Card>, ApiError> {
            self.record(ApiCall::ListCards);
            Ok(self.cards.borrow().clone())
        }

        fn create_card(&self, card: &NewCard) -> Result<(), ApiError> {
            self.record(ApiCall::CreateCard(card.clone()));
            self.mutation_result()
        }

        fn delete_card(&self, id: i64) -> Result<(), ApiError> {
            self.record(ApiCall::DeleteCard(id));
            self.mutation_result()
        }

        fn update_settings(&self, patch: &SettingsPatch) -> Result<(), ApiError> {
            self.record(ApiCall::UpdateSettings(patch.clone()));
            self.mutation_result()
        }

        fn start_drawing(&self) -> Result<(), ApiError> {
            self.record(ApiCall::StartDrawing);
            self.mutation_result()
        }

        fn draw_number(&self) -> Result<DrawResponse, ApiError> {
            self.record(ApiCall::DrawNumber);
            self.mutation_result()?;
            self.draw_responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(DrawResponse::default()))
        }

        fn upload_image(&self, path: &Path) -> Result<String, ApiError> {
            self.record(ApiCall::UploadImage(path.to_path_buf()));
            self.mutation_result()?;
            self.upload_results
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok("upload.png".to_string()))
        }
    }

    /// Mock notifier recording notices and answering confirmations
    pub struct MockNotifier {
        pub notices: RefCell<Vec<Notice>>,
        pub prompts: RefCell<Vec<String>>,
        pub answer: bool,
    }

    impl MockNotifier {
        pub fn new() -> Self {
            Self {
                notices: RefCell::new(Vec::new()),
                prompts: RefCell::new(Vec::new()),
                answer: true,
            }
        }

        pub fn declining() -> Self {
            Self {
                answer: false,
                ..Self::new()
            }
        }

        pub fn last(&self) -> Option<Notice> {
            self.notices.borrow().last().cloned()
        }

        pub fn levels(&self) -> Vec<NoticeLevel> {
            self.notices.borrow().iter().map(|n| n.level).collect()
        }
    }

    impl Default for MockNotifier {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Notifier for MockNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.borrow_mut().push(notice);
        }

        fn confirm(&self, prompt: &str) -> bool {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.answer
        }
    }

    /// Mock push channel fed by the test
    #[derive(Default)]
    pub struct MockPushChannel {
        pub connects: usize,
        pub pending: VecDeque<PushEvent>,
        pub current: Option<ConnectionStatus>,
        pub journal: Option<Rc<RefCell<Vec<String>>>>,
    }

    impl MockPushChannel {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn queue(&mut self, event: PushEvent) {
            self.pending.push_back(event);
        }

        pub fn queue_message(&mut self, message: PushMessage) {
            self.queue(PushEvent::Message(message));
        }
    }

    impl PushChannel for MockPushChannel {
        fn connect(&mut self) {
            if let Some(journal) = &self.journal {
                journal.borrow_mut().push("push:connect".to_string());
            }
            self.connects += 1;
            self.current = Some(ConnectionStatus::Connecting);
        }

        fn poll_event(&mut self) -> Option<PushEvent> {
            let event = self.pending.pop_front()?;
            if let PushEvent::StatusChanged(status) = &event {
                self.current = Some(*status);
            }
            Some(event)
        }

        fn status(&self) -> ConnectionStatus {
            self.current.unwrap_or(ConnectionStatus::Disconnected)
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
