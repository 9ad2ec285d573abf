//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::listing::{ListQuery, NodeSortKey};
use crate::models::InheritFields;
use crate::operations::SessionCell;
use crate::session::TreeEditorSession;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MessageKind {
    #[default]
    Info,
    Error,
}

/// Text shown in the view's message area
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Tree,
    List,
}

/// Global application state with field-level reactivity
#[derive(Clone, Debug, Default, Store)]
pub struct AppState {
    /// Nodes, dirty tracking and selection of the open project
    pub session: TreeEditorSession,
    pub message: Option<Message>,
    pub view_mode: ViewMode,
    /// Filter/sort/page state of the flat list view
    pub list_query: ListQuery<NodeSortKey>,
    /// Saved node whose new values may be pushed down to its subtree
    pub pending_inherit: Option<(u32, InheritFields)>,
}

impl AppState {
    pub fn new(project_id: u32) -> Self {
        Self {
            session: TreeEditorSession::new(project_id),
            ..Default::default()
        }
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

impl SessionCell for AppStore {
    fn with_session_mut<R>(&self, f: impl FnOnce(&mut TreeEditorSession) -> R) -> R {
        let field = self.session();
        let mut session = field.write();
        f(&mut session)
    }

    fn with_session<R>(&self, f: impl FnOnce(&TreeEditorSession) -> R) -> R {
        self.session().with_untracked(|session| f(session))
    }
}

// ========================
// Store Helper Functions
// ========================

/// Run a read-only query against the session, tracking changes
pub fn store_session<R>(store: &AppStore, f: impl FnOnce(&TreeEditorSession) -> R) -> R {
    store.session().with(|session| f(session))
}

pub fn store_set_info(store: &AppStore, text: impl Into<String>) {
    store.message().set(Some(Message {
        kind: MessageKind::Info,
        text: text.into(),
    }));
}

pub fn store_set_error(store: &AppStore, text: impl Into<String>) {
    store.message().set(Some(Message {
        kind: MessageKind::Error,
        text: text.into(),
    }));
}

pub fn store_clear_message(store: &AppStore) {
    store.message().set(None);
}

pub fn store_message(store: &AppStore) -> Option<Message> {
    store.message().get()
}

/// Current message without subscribing to it
pub fn store_message_untracked(store: &AppStore) -> Option<Message> {
    store.message().get_untracked()
}

pub fn store_view_mode(store: &AppStore) -> ViewMode {
    store.view_mode().get()
}

pub fn store_set_view_mode(store: &AppStore, mode: ViewMode) {
    store.view_mode().set(mode);
}

pub fn store_list_query(store: &AppStore) -> ListQuery<NodeSortKey> {
    store.list_query().get()
}

/// Change the list query in place
pub fn store_update_list_query(store: &AppStore, f: impl FnOnce(&mut ListQuery<NodeSortKey>)) {
    f(&mut store.list_query().write());
}

pub fn store_pending_inherit(store: &AppStore) -> Option<(u32, InheritFields)> {
    store.pending_inherit().get()
}

pub fn store_set_pending_inherit(store: &AppStore, pending: Option<(u32, InheritFields)>) {
    store.pending_inherit().set(pending);
}
