//! Inherit Prompt Component
//!
//! Asks whether a saved node's billing type / extras percent should be
//! pushed down to all of its descendants.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::use_app_context;
use crate::format::format_amount;
use crate::models::InheritFields;
use crate::operations;
use crate::store::{
    store_pending_inherit, store_session, store_set_error, store_set_info, store_set_pending_inherit,
    use_app_store,
};
use crate::tree;

fn describe(fields: &InheritFields) -> String {
    let mut parts = Vec::new();
    if let Some(billing) = fields.billing_type_id {
        parts.push(format!("Abrechnungsart „{}“", billing.label()));
    }
    if let Some(percent) = fields.extras_percent {
        parts.push(format!("Nebenkosten {} %", format_amount(percent)));
    }
    parts.join(" und ")
}

#[component]
pub fn InheritPrompt() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_app_context();

    let confirm = move |_| {
        let Some((node_id, fields)) = store_pending_inherit(&store) else {
            return;
        };
        store_set_pending_inherit(&store, None);
        spawn_local(async move {
            match operations::inherit_to_descendants(&ctx.api(), &store, node_id, fields).await {
                Ok(()) => store_set_info(&store, format!("Auf Unterelemente von #{} übertragen.", node_id)),
                Err(err) => store_set_error(&store, err.to_string()),
            }
        });
    };

    let dismiss = move |_| {
        if let Some((node_id, _)) = store_pending_inherit(&store) {
            store_set_info(&store, format!("#{} gespeichert.", node_id));
        }
        store_set_pending_inherit(&store, None);
    };

    view! {
        {move || store_pending_inherit(&store).map(|(node_id, fields)| {
            let count = store_session(&store, |s| tree::descendants(s.nodes(), node_id).len());
            view! {
                <div class="inherit-prompt">
                    <span>
                        {format!(
                            "#{} gespeichert. {} auf {} Unterelement(e) übertragen?",
                            node_id,
                            describe(&fields),
                            count
                        )}
                    </span>
                    <button class="confirm-btn" on:click=confirm>"Übertragen"</button>
                    <button class="cancel-btn" on:click=dismiss>"Nein"</button>
                </div>
            }
        })}
    }
}
