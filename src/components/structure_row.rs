//! Structure Row Component
//!
//! One editable node row in the structure table.

use leptos::prelude::*;
use leptos::task::spawn_local;
use rust_decimal::Decimal;

use leptos_dragdrop::*;

use crate::components::{BillingTypeSelector, DeleteConfirmButton};
use crate::context::use_app_context;
use crate::error::ValidationError;
use crate::format::{format_amount, parse_amount};
use crate::models::{BillingType, StructureNode};
use crate::operations::{self, SaveOutcome, SessionCell};
use crate::session::{NodeEvent, RowView};
use crate::store::{
    store_session, store_set_error, store_set_info, store_set_pending_inherit, use_app_store,
};

/// A single node row in the table
#[component]
pub fn StructureRow(row: RowView, dnd: DndSignals) -> impl IntoView {
    let store = use_app_store();
    let ctx = use_app_context();

    let id = row.node.id;
    let has_children = row.node.aggregate.has_children;
    let collapsed = row.collapsed;
    let indent = row.depth * 20;

    // Live values, so edits show up without rebuilding the row
    let field = move |f: fn(&StructureNode) -> String| {
        store_session(&store, move |s| s.node(id).map(f).unwrap_or_default())
    };
    let is_dirty = move || store_session(&store, |s| s.is_dirty(id));
    let is_saving = move || store_session(&store, |s| s.is_saving(id));
    let is_selected = move || store_session(&store, |s| s.is_selected(id));
    let revenue_readonly = move || {
        store_session(&store, |s| {
            s.node(id)
                .map(|n| n.aggregate.has_children || n.billing_type_id.is_fixed())
                .unwrap_or(true)
        })
    };
    let billing = Signal::derive(move || store_session(&store, |s| s.node(id).map(|n| n.billing_type_id)));

    let edit = move |event: NodeEvent| {
        let result = store.with_session_mut(|s| -> Result<bool, ValidationError> {
            s.apply(id, event)?;
            Ok(s.needs_time_booking_total(id))
        });
        match result {
            Err(err) => store_set_error(&store, err.to_string()),
            Ok(true) => spawn_local(async move {
                if let Err(err) = operations::ensure_time_booking_total(&ctx.api(), &store, id).await {
                    store_set_error(&store, err.to_string());
                }
            }),
            Ok(false) => {}
        }
    };

    let edit_amount = move |raw: String, make: fn(Decimal) -> NodeEvent| match parse_amount(&raw) {
        Some(value) => edit(make(value)),
        None => store_set_error(&store, format!("Ungültige Zahl: {}", raw)),
    };

    let save = move |_| {
        spawn_local(async move {
            match operations::save_node(&ctx.api(), &store, id).await {
                Ok(SaveOutcome { inherit: Some(fields) }) => {
                    store_set_pending_inherit(&store, Some((id, fields)));
                }
                Ok(_) => store_set_info(&store, format!("#{} gespeichert.", id)),
                Err(err) => store_set_error(&store, err.to_string()),
            }
        });
    };

    let delete = move |cascade: bool| {
        let targets = store.with_session(|s| s.targets(Some(id)));
        spawn_local(async move {
            let api = ctx.api();
            if let [single] = targets.as_slice() {
                match operations::delete_node(&api, &store, *single, cascade).await {
                    Ok(()) => store_set_info(&store, format!("#{} gelöscht.", single)),
                    Err(err) => store_set_error(&store, err.to_string()),
                }
                return;
            }
            match operations::delete_many(&api, &store, &targets, cascade).await {
                Ok(report) if report.is_success() => store_set_info(&store, report.summary()),
                Ok(report) => store_set_error(&store, report.summary()),
                Err(err) => store_set_error(&store, err.to_string()),
            }
        });
    };

    let on_mousedown = make_on_mousedown(dnd, id);
    let on_mouseenter = make_on_mouseenter(dnd, DropTarget::Node(id));
    let on_mouseleave = make_on_mouseleave(dnd);

    let row_class = move || {
        let mut c = String::from("structure-row");
        if is_dirty() { c.push_str(" dirty"); }
        if is_selected() { c.push_str(" selected"); }
        if dnd.dragging_id.get() == Some(id) { c.push_str(" dragging"); }
        if dnd.is_target(DropTarget::Node(id)) { c.push_str(" drop-target"); }
        c
    };

    view! {
        <div
            class=row_class
            on:mousedown=on_mousedown
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            <input
                type="checkbox"
                prop:checked=is_selected
                on:change=move |_| store.with_session_mut(|s| s.toggle_selected(id))
            />

            <span class="structure-name" style=format!("padding-left: {}px;", indent)>
                // Collapse toggle
                {if has_children {
                    view! {
                        <button
                            class="collapse-btn"
                            on:click=move |_| store.with_session_mut(|s| s.toggle_collapsed(id))
                        >
                            {if collapsed { "▶" } else { "▼" }}
                        </button>
                    }.into_any()
                } else {
                    view! { <span class="collapse-placeholder">"·"</span> }.into_any()
                }}
                <input
                    type="text"
                    class="name-short"
                    prop:value=move || field(|n| n.name_short.clone())
                    on:change=move |ev| edit(NodeEvent::SetNameShort(event_target_value(&ev)))
                />
            </span>

            <input
                type="text"
                class="name-long"
                prop:value=move || field(|n| n.name_long.clone())
                on:change=move |ev| edit(NodeEvent::SetNameLong(event_target_value(&ev)))
            />

            <BillingTypeSelector
                current=billing
                on_change=move |b: BillingType| edit(NodeEvent::SetBillingType(b))
            />

            <input
                type="text"
                class="amount"
                readonly=revenue_readonly
                prop:value=move || field(|n| format_amount(n.aggregate.computed_revenue))
                on:change=move |ev| edit_amount(event_target_value(&ev), NodeEvent::SetStoredRevenue)
            />

            <input
                type="text"
                class="percent"
                prop:value=move || field(|n| format_amount(n.extras_percent))
                on:change=move |ev| edit_amount(event_target_value(&ev), NodeEvent::SetExtrasPercent)
            />

            <span class="amount computed">{move || field(|n| format_amount(n.aggregate.computed_extras))}</span>

            <input
                type="text"
                class="percent"
                disabled=move || has_children
                prop:value=move || field(|n| format_amount(n.revenue_completion_percent))
                on:change=move |ev| edit_amount(event_target_value(&ev), NodeEvent::SetRevenueCompletion)
            />

            <span class="amount computed" title="Erbracht (Honorar + Nebenkosten)">
                {move || field(|n| format_amount(n.aggregate.earned_revenue + n.aggregate.earned_extras))}
            </span>

            <button
                class="save-btn"
                disabled=move || !is_dirty() || is_saving()
                on:click=save
            >
                {move || if is_saving() { "Speichert…" } else { "Speichern" }}
            </button>

            // Add child button
            <button class="add-child-btn" title="Unterelement anlegen" on:click=move |_| ctx.set_adding_under(Some(id))>"+"</button>

            <DeleteConfirmButton button_class="delete-btn" on_confirm=delete />
        </div>
    }
}
