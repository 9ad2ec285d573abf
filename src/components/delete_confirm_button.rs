//! Delete Confirm Button Component
//!
//! Inline delete confirmation offering a plain and a cascading delete.

use leptos::prelude::*;

/// Inline delete confirmation button
///
/// Shows a × button initially. When clicked, asks "Löschen?" and offers
/// deleting just the target or the target with all its sub-elements.
///
/// # Arguments
/// * `button_class` - CSS class for the initial delete button
/// * `on_confirm` - Called with `true` for a cascading delete
#[component]
pub fn DeleteConfirmButton(
    #[prop(into)] button_class: String,
    #[prop(into)] on_confirm: Callback<bool>,
    #[prop(optional, into)] label: Option<String>,
) -> impl IntoView {
    let (confirm_delete, set_confirm_delete) = signal(false);
    let label = label.unwrap_or_else(|| "×".to_string());

    let confirm = move |cascade: bool| {
        set_confirm_delete.set(false);
        on_confirm.run(cascade);
    };

    view! {
        <Show when=move || !confirm_delete.get()>
            <button
                class=button_class.clone()
                title="Löschen"
                on:click=move |ev| {
                    ev.stop_propagation();
                    set_confirm_delete.set(true);
                }
            >
                {label.clone()}
            </button>
        </Show>
        <Show when=move || confirm_delete.get()>
            <span class="delete-confirm">
                <span class="delete-confirm-text">"Löschen?"</span>
                <button
                    class="confirm-btn"
                    title="Nur dieses Element (scheitert bei Unterelementen)"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        confirm(false);
                    }
                >
                    "✓"
                </button>
                <button
                    class="confirm-btn cascade"
                    title="Mit allen Unterelementen"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        confirm(true);
                    }
                >
                    "✓ + Unterelemente"
                </button>
                <button
                    class="cancel-btn"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_confirm_delete.set(false);
                    }
                >
                    "✗"
                </button>
            </span>
        </Show>
    }
}
