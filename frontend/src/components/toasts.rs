//! Toast notifications.
//!
//! The queue lives at the application root, so notifications raised just
//! before the upload manager is replaced stay on screen.

use gloo_timers::future::TimeoutFuture;
use leptos::*;

use crate::config::TOAST_DURATION_MS;
use crate::manager::Toast;

/// Shared toast queue, provided as context by [`crate::App`].
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<(u64, Toast)>>,
    next_id: StoredValue<u64>,
}

impl Toasts {
    /// Create the queue and provide it to the component tree.
    pub fn provide() -> Self {
        let toasts = Self {
            items: create_rw_signal(Vec::new()),
            next_id: store_value(0),
        };
        provide_context(toasts);
        toasts
    }

    /// Show a toast; it dismisses itself after [`TOAST_DURATION_MS`].
    pub fn push(&self, toast: Toast) {
        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);

        log::debug!("🔔 {}: {}", toast.title, toast.description);
        self.items.update(|items| items.push((id, toast)));

        let this = *self;
        spawn_local(async move {
            TimeoutFuture::new(TOAST_DURATION_MS).await;
            this.dismiss(id);
        });
    }

    pub fn dismiss(&self, id: u64) {
        let _ = self.items.try_update(|items| items.retain(|(i, _)| *i != id));
    }
}

/// Toast queue from context.
pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

#[component]
pub fn ToastStack() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div class="toast-stack" role="status" aria-live="polite">
            <For
                each=move || toasts.items.get()
                key=|(id, _)| *id
                children=move |(id, toast)| {
                    view! {
                        <div class=toast.css_class() on:click=move |_| toasts.dismiss(id)>
                            <div class="toast-title">{toast.title.clone()}</div>
                            <div class="toast-description">{toast.description.clone()}</div>
                        </div>
                    }
                }
            />
        </div>
    }
}
