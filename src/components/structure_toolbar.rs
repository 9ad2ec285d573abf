//! Structure Toolbar Component
//!
//! Selection controls, "Alle speichern", bulk field apply and bulk delete.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{BillingTypeSelector, DeleteConfirmButton};
use crate::context::use_app_context;
use crate::format::parse_amount;
use crate::models::BillingType;
use crate::operations::{self, SessionCell};
use crate::store::{
    store_session, store_set_error, store_set_info, store_set_view_mode, store_view_mode, use_app_store,
    ViewMode,
};

#[component]
pub fn StructureToolbar() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_app_context();
    let (saving_all, set_saving_all) = signal(false);

    let can_save_all = move || store_session(&store, |s| s.can_save_all()) && !saving_all.get();
    let selected_count = move || store_session(&store, |s| s.selected_ids().len());

    let save_all = move |_| {
        set_saving_all.set(true);
        spawn_local(async move {
            let report = operations::save_all(&ctx.api(), &store, |i, total, id| {
                store_set_info(&store, format!("Speichere {} von {} (#{})…", i, total, id));
            })
            .await;
            if report.is_success() {
                store_set_info(&store, report.summary());
            } else {
                store_set_error(&store, report.summary());
            }
            set_saving_all.set(false);
        });
    };

    let delete_selection = move |cascade: bool| {
        let targets = store.with_session(|s| s.selected_ids());
        spawn_local(async move {
            match operations::delete_many(&ctx.api(), &store, &targets, cascade).await {
                Ok(report) if report.is_success() => store_set_info(&store, report.summary()),
                Ok(report) => store_set_error(&store, report.summary()),
                Err(err) => store_set_error(&store, err.to_string()),
            }
        });
    };

    let toggle_view = move |_| {
        let next = match store_view_mode(&store) {
            ViewMode::Tree => ViewMode::List,
            ViewMode::List => ViewMode::Tree,
        };
        store_set_view_mode(&store, next);
    };

    view! {
        <div class="structure-toolbar">
            <button on:click=move |_| store.with_session_mut(|s| s.select_all())>"Alle auswählen"</button>
            <button on:click=move |_| store.with_session_mut(|s| s.select_none())>"Auswahl aufheben"</button>
            <span class="selection-count">{move || format!("{} ausgewählt", selected_count())}</span>

            <button class="save-all-btn" disabled=move || !can_save_all() on:click=save_all>
                "Alle speichern"
            </button>

            <BulkApplyBar />

            <Show when=move || { selected_count() > 0 }>
                <DeleteConfirmButton
                    button_class="delete-btn bulk"
                    label="Auswahl löschen"
                    on_confirm=delete_selection
                />
            </Show>

            <button class="view-toggle" on:click=toggle_view>
                {move || match store_view_mode(&store) {
                    ViewMode::Tree => "Listenansicht",
                    ViewMode::List => "Baumansicht",
                }}
            </button>
        </div>
    }
}

/// Apply a billing type and/or extras percent to the selection, locally
#[component]
fn BulkApplyBar() -> impl IntoView {
    let store = use_app_store();

    let (billing, set_billing) = signal::<Option<BillingType>>(None);
    let (extras, set_extras) = signal(String::new());

    let apply = move |_| {
        let extras_text = extras.get();
        let extras_percent = if extras_text.trim().is_empty() {
            None
        } else {
            match parse_amount(&extras_text) {
                Some(value) => Some(value),
                None => {
                    store_set_error(&store, format!("Ungültige Zahl: {}", extras_text));
                    return;
                }
            }
        };
        let result = store.with_session_mut(|s| {
            let targets = s.selected_ids();
            s.bulk_apply(&targets, billing.get_untracked(), extras_percent)
        });
        match result {
            Ok(count) => {
                store_set_info(&store, format!("{} Element(e) geändert, noch nicht gespeichert.", count));
                set_billing.set(None);
                set_extras.set(String::new());
            }
            Err(err) => store_set_error(&store, err.to_string()),
        }
    };

    view! {
        <span class="bulk-apply">
            <BillingTypeSelector current=billing on_change=move |b: BillingType| set_billing.set(Some(b)) />
            <input
                type="text"
                class="percent"
                placeholder="NK %"
                prop:value=move || extras.get()
                on:input=move |ev| set_extras.set(event_target_value(&ev))
            />
            <button on:click=apply>"Auf Auswahl anwenden"</button>
        </span>
    }
}
