//! Node List View Component
//!
//! Flat, searchable and paginated list of all structure nodes.

use leptos::prelude::*;

use crate::format::format_amount;
use crate::listing::{apply_query, NodeSortKey, SortDirection};
use crate::operations::SessionCell;
use crate::store::{store_list_query, store_session, store_update_list_query, use_app_store};

#[component]
pub fn NodeListView() -> impl IntoView {
    let store = use_app_store();

    let page = move || {
        let query = store_list_query(&store);
        store_session(&store, |s| apply_query(&s.nodes_in_display_order(), &query))
    };

    let sort_header = move |key: NodeSortKey, label: &'static str| {
        let arrow = move || match store_list_query(&store).sort {
            Some((active, SortDirection::Ascending)) if active == key => " ▲",
            Some((active, SortDirection::Descending)) if active == key => " ▼",
            _ => "",
        };
        view! {
            <button class="sort-btn" on:click=move |_| store_update_list_query(&store, |q| q.sort_by(key))>
                {label} {arrow}
            </button>
        }
    };

    view! {
        <div class="node-list">
            <input
                type="search"
                placeholder="Suchen…"
                prop:value=move || store_list_query(&store).filter
                on:input=move |ev| {
                    let text = event_target_value(&ev);
                    store_update_list_query(&store, |q| {
                        q.filter = text;
                        q.page = 0;
                    });
                }
            />

            <div class="node-list-row header">
                <span></span>
                {sort_header(NodeSortKey::Id, "#")}
                {sort_header(NodeSortKey::NameShort, "Kurzbezeichnung")}
                <span>"Bezeichnung"</span>
                {sort_header(NodeSortKey::Revenue, "Honorar")}
            </div>

            <For
                each=move || page().items
                key=|node| (node.id, node.name_short.clone(), node.aggregate.computed_revenue)
                children=move |node| {
                    let id = node.id;
                    let selected = move || store_session(&store, |s| s.is_selected(id));
                    view! {
                        <div class=move || if selected() { "node-list-row selected" } else { "node-list-row" }>
                            <input
                                type="checkbox"
                                prop:checked=selected
                                on:change=move |_| store.with_session_mut(|s| s.toggle_selected(id))
                            />
                            <span>{id}</span>
                            <span>{node.name_short.clone()}</span>
                            <span>{node.name_long.clone()}</span>
                            <span class="amount">{format_amount(node.aggregate.computed_revenue)}</span>
                        </div>
                    }
                }
            />

            <div class="pager">
                <button
                    disabled=move || page().page == 0
                    on:click=move |_| store_update_list_query(&store, |q| q.page = q.page.saturating_sub(1))
                >
                    "‹"
                </button>
                <span>
                    {move || {
                        let p = page();
                        format!("Seite {} von {} ({} Treffer)", p.page + 1, p.page_count, p.total)
                    }}
                </span>
                <button
                    disabled=move || { let p = page(); p.page + 1 >= p.page_count }
                    on:click=move |_| {
                        let last = page().page_count - 1;
                        store_update_list_query(&store, |q| q.page = (q.page + 1).min(last));
                    }
                >
                    "›"
                </button>
            </div>
        </div>
    }
}
