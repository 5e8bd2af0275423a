//! Spreadsheet upload zone with drag & drop support.
//!
//! Selection and drops are handed to the parent; the zone only tracks the
//! drag highlight and exposes the hidden input through a [`NodeRef`].

use leptos::html::Input;
use leptos::*;
use web_sys::{DragEvent, Event, File, HtmlInputElement};

use crate::config::{accept_attribute, MAX_FILE_SIZE};
use crate::manager::DragState;

#[component]
pub fn UploadSection(
    /// True while a submission is in flight
    #[prop(into)]
    uploading: Signal<bool>,
    /// Hidden picker, cleared by the parent after a successful upload
    file_input: NodeRef<Input>,
    /// Called with the chosen (or first dropped) file
    #[prop(into)]
    on_file: Callback<File>,
) -> impl IntoView {
    let drag = create_rw_signal(DragState::default());

    let on_file_change = move |ev: Event| {
        let input: HtmlInputElement = event_target(&ev);
        if let Some(file) = input.files().and_then(|files| files.get(0)) {
            on_file.call(file);
        }
    };

    let on_drag_enter = move |ev: DragEvent| {
        ev.prevent_default();
        drag.update(|d| d.enter());
    };

    // Required for the browser to accept the drop
    let on_drag_over = move |ev: DragEvent| ev.prevent_default();

    let on_drag_leave = move |ev: DragEvent| {
        ev.prevent_default();
        drag.update(|d| d.leave());
    };

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        let files = dropped_files(&ev);
        let mut first = None;
        drag.update(|d| first = d.drop_files(files));
        if let Some(file) = first {
            on_file.call(file);
        }
    };

    let trigger_file_input = move |_| {
        if let Some(input) = file_input.get_untracked() {
            input.click();
        }
    };

    view! {
        <div
            class="upload-section"
            class:dragging=move || drag.get().dragging
            on:dragenter=on_drag_enter
            on:dragover=on_drag_over
            on:dragleave=on_drag_leave
            on:drop=on_drop
        >
            <div class="upload-icon">"📤"</div>
            <div class="upload-text">
                {move || if uploading.get() {
                    "⏳ Uploading..."
                } else if drag.get().dragging {
                    "Drop the file to upload it"
                } else {
                    "Drag a spreadsheet here"
                }}
            </div>
            <div class="upload-hint">
                {format!(
                    "Excel (.xlsx, .xls) or CSV, up to {}MB",
                    MAX_FILE_SIZE / (1024 * 1024)
                )}
            </div>

            <input
                type="file"
                accept=accept_attribute()
                style="display:none"
                node_ref=file_input
                on:change=on_file_change
            />

            <button
                class="btn btn-primary upload-button"
                on:click=trigger_file_input
                disabled=move || uploading.get()
            >
                {move || if uploading.get() { "Uploading..." } else { "Choose a file" }}
            </button>
        </div>
    }
}

/// Files carried by a drop event, in order.
fn dropped_files(ev: &DragEvent) -> Vec<File> {
    let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) else {
        return Vec::new();
    };
    (0..files.length()).filter_map(|i| files.get(i)).collect()
}
