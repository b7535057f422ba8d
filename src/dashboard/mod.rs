//! Role Dashboards
//!
//! Each dashboard is a view-model: it loads its role-scoped lists, keeps
//! them in local state, and applies one update policy everywhere. Once the
//! server confirms an add, edit or delete, the local list is patched from
//! the server's answer, so nothing is reloaded and deleted records are
//! never refetched.
//!
//! ## State
//!
//! `Idle -> Loading -> Ready | Failed`. A rejected token anywhere moves the
//! dashboard to `Failed` with [`DashboardError::SessionExpired`], which the
//! front end turns into a redirect to `/login`.

mod admin;
mod client;
mod nutritionist;

pub use admin::{AdminDashboard, AdminData, AdminStats, ClientRow};
pub use client::{ClientDashboard, ClientData};
pub use nutritionist::{BroadcastReport, NutritionistDashboard, NutritionistData, NutritionistStats};

use crate::forms::ValidationErrors;
use crate::http::ApiError;
use crate::models::{Record, Role};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by dashboard actions
#[derive(Error, Debug)]
pub enum DashboardError {
    /// The form was rejected locally; nothing was sent
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("{0}")]
    Api(ApiError),

    #[error("Dashboard is not loaded")]
    NotLoaded,

    #[error("No such record: {0}")]
    UnknownRecord(String),

    #[error("No nutritionist assigned yet")]
    NoNutritionist,
}

impl From<ApiError> for DashboardError {
    fn from(err: ApiError) -> Self {
        if err.is_session_expired() {
            DashboardError::SessionExpired
        } else {
            DashboardError::Api(err)
        }
    }
}

impl From<crate::session::SessionError> for DashboardError {
    fn from(err: crate::session::SessionError) -> Self {
        DashboardError::Api(ApiError::Session(err))
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Loading lifecycle of a dashboard
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            LoadState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Server records kept in arrival order, addressed by id
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Append a new record, or replace the one with the same id
    pub fn insert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
    }

    /// Replace a record in place; false if the id is unknown
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient toast for the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Pending toasts, oldest first
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: Vec<Notice>,
}

impl Notices {
    pub fn success(&mut self, message: impl Into<String>) {
        self.queue.push(Notice {
            level: NoticeLevel::Success,
            message: message.into(),
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.queue.push(Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.queue.last()
    }

    /// Take every pending notice
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.queue)
    }
}

/// Report an action's outcome as a toast and fold session expiry into the
/// load state
pub(crate) fn settle<D, T>(
    state: &mut LoadState<D>,
    notices: &mut Notices,
    result: DashboardResult<T>,
    success: impl FnOnce(&T) -> String,
) -> DashboardResult<T> {
    match &result {
        Ok(value) => notices.success(success(value)),
        Err(e) => report_error(state, notices, e),
    }
    result
}

/// Like [`settle`] for reads: failures raise a toast, success stays quiet
pub(crate) fn settle_read<D, T>(
    state: &mut LoadState<D>,
    notices: &mut Notices,
    result: DashboardResult<T>,
) -> DashboardResult<T> {
    if let Err(e) = &result {
        report_error(state, notices, e);
    }
    result
}

fn report_error<D>(state: &mut LoadState<D>, notices: &mut Notices, err: &DashboardError) {
    if matches!(err, DashboardError::SessionExpired) {
        *state = LoadState::Failed(err.to_string());
    }
    notices.error(err.to_string());
}

/// Behaviour shared by the three role dashboards
#[async_trait]
pub trait Dashboard: Send {
    /// Role allowed to open this dashboard
    fn role(&self) -> Role;

    /// Fetch everything the dashboard shows, replacing local state
    async fn load(&mut self) -> DashboardResult<()>;

    fn is_ready(&self) -> bool;

    fn notices_mut(&mut self) -> &mut Notices;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        label: &'static str,
    }

    impl Record for Item {
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, label: &'static str) -> Item {
        Item {
            id: id.to_string(),
            label,
        }
    }

    #[test]
    fn test_collection_patching() {
        let mut items = Collection::new(vec![item("1", "a"), item("2", "b")]);

        items.insert(item("3", "c"));
        assert_eq!(items.len(), 3);

        items.insert(item("1", "a2"));
        assert_eq!(items.len(), 3);
        assert_eq!(items.get("1").unwrap().label, "a2");

        assert!(items.replace(item("2", "b2")));
        assert!(!items.replace(item("9", "z")));

        assert_eq!(items.remove("2").unwrap().label, "b2");
        assert!(items.remove("2").is_none());

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_load_state_accessors() {
        let mut state: LoadState<u32> = LoadState::default();
        assert!(state.ready().is_none());

        state = LoadState::Ready(3);
        *state.ready_mut().unwrap() += 1;
        assert_eq!(state.ready(), Some(&4));

        state = LoadState::Failed("down".into());
        assert_eq!(state.error(), Some("down"));
    }

    #[test]
    fn test_settle_session_expiry() {
        let mut state = LoadState::Ready(1);
        let mut notices = Notices::default();

        let result: DashboardResult<()> = Err(ApiError::Unauthorized.into());
        let result = settle(&mut state, &mut notices, result, |_| "ok".into());

        assert!(matches!(result, Err(DashboardError::SessionExpired)));
        assert!(state.error().is_some());
        assert_eq!(notices.drain()[0].level, NoticeLevel::Error);
        assert!(notices.is_empty());
    }

    #[test]
    fn test_settle_success_and_failure() {
        let mut state = LoadState::Ready(1);
        let mut notices = Notices::default();

        settle(&mut state, &mut notices, Ok(5), |n| format!("Saved {}", n)).unwrap();
        let failed: DashboardResult<()> = Err(ApiError::Timeout.into());
        settle(&mut state, &mut notices, failed, |_| String::new()).unwrap_err();

        let drained = notices.drain();
        assert_eq!(drained[0].message, "Saved 5");
        assert_eq!(drained[1].message, "Request timeout");
        assert!(state.is_ready());
    }
}
