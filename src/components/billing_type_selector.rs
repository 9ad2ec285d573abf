//! Billing Type Selector Component
//!
//! Dropdown for the revenue policy of a node.

use leptos::prelude::*;

use crate::models::BillingType;

/// Billing type options offered in forms
pub const BILLING_TYPES: &[BillingType] = &[BillingType::StoredRevenue, BillingType::Fixed];

/// Billing type dropdown; an empty choice is shown while nothing is selected
#[component]
pub fn BillingTypeSelector(
    #[prop(into)] current: Signal<Option<BillingType>>,
    #[prop(into)] on_change: Callback<BillingType>,
    #[prop(optional)] disabled: bool,
) -> impl IntoView {
    view! {
        <select
            class="billing-type-select"
            disabled=disabled
            prop:value=move || current.get().map(|b| b.id().to_string()).unwrap_or_default()
            on:change=move |ev| {
                if let Ok(id) = event_target_value(&ev).parse::<u8>() {
                    on_change.run(BillingType::from(id));
                }
            }
        >
            <Show when=move || current.get().is_none()>
                <option value="" disabled=true>"Abrechnungsart…"</option>
            </Show>
            {BILLING_TYPES.iter().map(|billing| {
                let billing = *billing;
                view! {
                    <option
                        value=billing.id().to_string()
                        selected=move || current.get() == Some(billing)
                    >
                        {billing.label()}
                    </option>
                }
            }).collect_view()}
        </select>
    }
}
