//! Delete confirmation dialog.

use leptos::*;

use crate::manager::DeleteDialog;

#[component]
pub fn DeleteConfirmDialog(
    dialog: RwSignal<DeleteDialog>,
    /// True while the delete request is in flight
    #[prop(into)]
    deleting: Signal<bool>,
    #[prop(into)] on_confirm: Callback<()>,
) -> impl IntoView {
    let cancel = move |_| dialog.update(|d| d.close());

    view! {
        <Show when=move || dialog.with(|d| d.is_open()) fallback=|| view! {}>
            <div class="modal-backdrop">
                <div class="modal" role="dialog" aria-modal="true">
                    <div class="modal-title">"Delete file?"</div>
                    <p class="modal-body">
                        "This removes the file and its summary. This action cannot be undone."
                    </p>
                    <div class="modal-actions">
                        <button class="btn btn-secondary" on:click=cancel disabled=move || deleting.get()>
                            "Cancel"
                        </button>
                        <button
                            class="btn btn-danger"
                            on:click=move |_| on_confirm.call(())
                            disabled=move || deleting.get()
                        >
                            {move || if deleting.get() { "Deleting..." } else { "Delete" }}
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
