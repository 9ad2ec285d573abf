//! Message Area Component
//!
//! Per-view status line. Info messages clear themselves after a while,
//! errors stay until dismissed or replaced.

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::store::{store_clear_message, store_message, store_message_untracked, use_app_store, MessageKind};

const INFO_TIMEOUT_MS: u32 = 4000;

#[component]
pub fn MessageArea() -> impl IntoView {
    let store = use_app_store();

    Effect::new(move |_| {
        let Some(message) = store_message(&store) else {
            return;
        };
        if message.kind != MessageKind::Info {
            return;
        }
        spawn_local(async move {
            TimeoutFuture::new(INFO_TIMEOUT_MS).await;
            // Only clear if nothing newer replaced it
            if store_message_untracked(&store).as_ref() == Some(&message) {
                store_clear_message(&store);
            }
        });
    });

    view! {
        {move || store_message(&store).map(|message| {
            let class = match message.kind {
                MessageKind::Info => "message-area info",
                MessageKind::Error => "message-area error",
            };
            view! {
                <div class=class role="status">
                    <span class="message-text">{message.text}</span>
                    <button class="message-close" on:click=move |_| store_clear_message(&store)>"×"</button>
                </div>
            }
        })}
    }
}
