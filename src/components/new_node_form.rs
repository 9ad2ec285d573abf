//! New Node Form Component
//!
//! Form for creating structure nodes, at root level or under a parent.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::BillingTypeSelector;
use crate::context::use_app_context;
use crate::format::parse_amount;
use crate::models::BillingType;
use crate::operations::{self, SessionCell};
use crate::session::NodeDraft;
use crate::store::{store_set_error, store_set_info, use_app_store};

/// Form for creating new nodes (root or child)
#[component]
pub fn NewNodeForm() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_app_context();

    let (name_short, set_name_short) = signal(String::new());
    let (name_long, set_name_long) = signal(String::new());
    let (billing, set_billing) = signal::<Option<BillingType>>(None);
    let (revenue, set_revenue) = signal(String::new());
    let (extras, set_extras) = signal(String::new());
    let (submitting, set_submitting) = signal(false);

    // Pre-fill billing type and extras from the chosen parent
    Effect::new(move |_| {
        let parent = ctx.adding_under.get();
        let draft = store.with_session(|s| s.draft_under(parent));
        set_billing.set(draft.billing_type_id);
        set_extras.set(if parent.is_some() { draft.extras_percent.to_string() } else { String::new() });
    });

    let create_node = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = NodeDraft {
            parent_id: ctx.adding_under.get_untracked(),
            name_short: name_short.get_untracked(),
            name_long: name_long.get_untracked(),
            billing_type_id: billing.get_untracked(),
            stored_revenue: parse_amount(&revenue.get_untracked()).unwrap_or_default(),
            extras_percent: parse_amount(&extras.get_untracked()).unwrap_or_default(),
        };
        // Input stays in the form until the backend accepted it
        if let Err(err) = draft.validate() {
            store_set_error(&store, err.to_string());
            return;
        }

        set_submitting.set(true);
        spawn_local(async move {
            match operations::create_node(&ctx.api(), &store, &draft).await {
                Ok(created) => {
                    store_set_info(&store, format!("„{}“ angelegt.", created.name_short));
                    set_name_short.set(String::new());
                    set_name_long.set(String::new());
                    set_revenue.set(String::new());
                    ctx.set_adding_under(None);
                }
                Err(err) => store_set_error(&store, err.to_string()),
            }
            set_submitting.set(false);
        });
    };

    view! {
        <form class="new-node-form" on:submit=create_node>
            <div class="new-node-row">
                <input
                    type="text"
                    placeholder=move || {
                        if let Some(pid) = ctx.adding_under.get() {
                            format!("Unterelement von #{}…", pid)
                        } else {
                            "Neues Element…".to_string()
                        }
                    }
                    prop:value=move || name_short.get()
                    on:input=move |ev| set_name_short.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    placeholder="Bezeichnung"
                    prop:value=move || name_long.get()
                    on:input=move |ev| set_name_long.set(event_target_value(&ev))
                />
                <BillingTypeSelector current=billing on_change=move |b: BillingType| set_billing.set(Some(b)) />
                <input
                    type="text"
                    class="amount"
                    placeholder="Honorar"
                    disabled=move || billing.get().map(|b| b.is_fixed()).unwrap_or(false)
                    prop:value=move || revenue.get()
                    on:input=move |ev| set_revenue.set(event_target_value(&ev))
                />
                <input
                    type="text"
                    class="percent"
                    placeholder="NK %"
                    prop:value=move || extras.get()
                    on:input=move |ev| set_extras.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || submitting.get()>"Anlegen"</button>
            </div>

            {move || ctx.adding_under.get().map(|pid| view! {
                <button type="button" class="cancel-btn" on:click=move |_| ctx.set_adding_under(None)>
                    "Abbrechen (#" {pid} ")"
                </button>
            })}
        </form>
    }
}
