//! Structure Table Component
//!
//! Displays the project structure as an indented table with drag-and-drop
//! reparenting. Dropping on a row makes the dragged node its child, dropping
//! on the strip above the table makes it a root.

use leptos::prelude::*;
use leptos::task::spawn_local;

use leptos_dragdrop::*;

use crate::components::StructureRow;
use crate::context::use_app_context;
use crate::format::format_amount;
use crate::operations;
use crate::store::{store_session, store_set_error, use_app_store};

/// Structure table with DnD support
#[component]
pub fn StructureTable() -> impl IntoView {
    let store = use_app_store();
    let ctx = use_app_context();

    // Create DnD signals
    let dnd = create_dnd_signals();

    bind_global_mouseup(dnd, move |intent: MoveIntent| {
        web_sys::console::log_1(
            &format!("[DND] Move {} under {:?}", intent.node_id, intent.new_parent_id).into(),
        );
        spawn_local(async move {
            if let Err(err) =
                operations::move_node(&ctx.api(), &store, intent.node_id, intent.new_parent_id).await
            {
                web_sys::console::error_1(&format!("[DND] Move failed: {}", err).into());
                store_set_error(&store, err.to_string());
            }
        });
    });

    let rows = move || store_session(&store, |s| s.rows());
    let total = move || store_session(&store, |s| s.total_revenue());

    view! {
        <div class="structure-table">
            <RootDropZone dnd=dnd />

            <div class="structure-row header">
                <span></span>
                <span>"Kurzbezeichnung"</span>
                <span>"Bezeichnung"</span>
                <span>"Abrechnung"</span>
                <span>"Honorar"</span>
                <span>"NK %"</span>
                <span>"Nebenkosten"</span>
                <span>"Fertig %"</span>
                <span>"Erbracht"</span>
                <span></span>
            </div>

            <For
                each=rows
                key=|row| (row.node.id, row.depth, row.collapsed, row.node.aggregate.has_children)
                children=move |row| view! { <StructureRow row=row dnd=dnd /> }
            />

            <div class="structure-total">
                "Summe Honorar: " {move || format_amount(total())}
            </div>
        </div>
    }
}

/// Strip above the table; dropping here moves the node to root level
#[component]
fn RootDropZone(dnd: DndSignals) -> impl IntoView {
    let on_mouseenter = make_on_mouseenter(dnd, DropTarget::Root);
    let on_mouseleave = make_on_mouseleave(dnd);

    let zone_class = move || {
        let mut c = String::from("drop-zone root");
        if !dnd.is_dragging() { c.push_str(" hidden"); }
        if dnd.is_target(DropTarget::Root) { c.push_str(" active"); }
        c
    };

    view! {
        <div
            class=zone_class
            on:mouseenter=on_mouseenter
            on:mouseleave=on_mouseleave
        >
            "Auf oberste Ebene verschieben"
        </div>
    }
}
