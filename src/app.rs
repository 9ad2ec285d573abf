//! Structure Editor App
//!
//! Main application component: toolbar, messages, new-node form and the
//! tree or list view of the project structure.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos::logging::warn;
use reactive_stores::Store;

use crate::api::HttpStructureApi;
use crate::components::{
    InheritPrompt, MessageArea, NewNodeForm, NodeListView, StructureTable, StructureToolbar,
};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::operations;
use crate::store::{store_set_error, store_view_mode, AppState, ViewMode};

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_env();

    match config.project_id {
        Some(project_id) => view! { <StructureEditor project_id=project_id api_base=config.api_base /> }.into_any(),
        None => view! {
            <div class="app-layout">
                <h1>"Projektstruktur"</h1>
                <p class="message error">"Kein Projekt gewählt. Bitte ?project=<id> an die Adresse anhängen."</p>
            </div>
        }
        .into_any(),
    }
}

#[component]
fn StructureEditor(project_id: u32, api_base: String) -> impl IntoView {
    let (reload_trigger, set_reload_trigger) = signal(0u32);
    let (adding_under, set_adding_under) = signal::<Option<u32>>(None);

    let store = Store::new(AppState::new(project_id));
    provide_context(store);

    let ctx = AppContext::new(
        HttpStructureApi::new(api_base),
        (reload_trigger, set_reload_trigger),
        (adding_under, set_adding_under),
    );
    provide_context(ctx);

    // Load the structure on mount and whenever a reload is requested
    Effect::new(move |_| {
        let _ = reload_trigger.get();
        spawn_local(async move {
            if let Err(err) = operations::reload(&ctx.api(), &store).await {
                warn!("[APP] Loading project {} failed: {}", project_id, err);
                store_set_error(&store, err.to_string());
            }
        });
    });

    view! {
        <div class="app-layout">
            <header class="app-header">
                <h1>{format!("Projektstruktur #{}", project_id)}</h1>
                <button class="reload-btn" on:click=move |_| ctx.reload()>"Neu laden"</button>
            </header>

            <StructureToolbar />
            <MessageArea />
            <InheritPrompt />
            <NewNodeForm />

            {move || match store_view_mode(&store) {
                ViewMode::Tree => view! { <StructureTable /> }.into_any(),
                ViewMode::List => view! { <NodeListView /> }.into_any(),
            }}
        </div>
    }
}
