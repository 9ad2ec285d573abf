//! Application Context
//!
//! Shared state provided via Leptos Context API.

use leptos::prelude::*;

use crate::api::HttpStructureApi;

/// App-wide signals provided via context
#[derive(Clone, Copy)]
pub struct AppContext {
    /// Backend used by every operation
    api: StoredValue<HttpStructureApi>,
    /// Trigger to reload the structure from backend - read
    pub reload_trigger: ReadSignal<u32>,
    /// Trigger to reload the structure from backend - write
    set_reload_trigger: WriteSignal<u32>,
    /// Which node to add a child under (None = root) - read
    pub adding_under: ReadSignal<Option<u32>>,
    /// Which node to add a child under (None = root) - write
    set_adding_under: WriteSignal<Option<u32>>,
}

impl AppContext {
    pub fn new(
        api: HttpStructureApi,
        reload_trigger: (ReadSignal<u32>, WriteSignal<u32>),
        adding_under: (ReadSignal<Option<u32>>, WriteSignal<Option<u32>>),
    ) -> Self {
        Self {
            api: StoredValue::new(api),
            reload_trigger: reload_trigger.0,
            set_reload_trigger: reload_trigger.1,
            adding_under: adding_under.0,
            set_adding_under: adding_under.1,
        }
    }

    pub fn api(&self) -> HttpStructureApi {
        self.api.get_value()
    }

    /// Trigger a reload of the structure
    pub fn reload(&self) {
        self.set_reload_trigger.update(|v| *v += 1);
    }

    /// Set parent for new child node
    pub fn set_adding_under(&self, parent_id: Option<u32>) {
        self.set_adding_under.set(parent_id);
    }
}

pub fn use_app_context() -> AppContext {
    use_context::<AppContext>().expect("AppContext should be provided")
}
