//! Upload manager screen.
//!
//! Built from one set of page props. Every reload replaces the whole
//! component, so the local state below (phase, banner, dialog) starts
//! fresh each time.

use leptos::html::Input;
use leptos::*;
use web_sys::File;

use crate::components::{
    use_toasts, DeleteConfirmDialog, FileList, FlashBanner, Toasts, UploadSection,
};
use crate::manager::{
    run_delete, run_flash, run_refresh, run_upload, Banner, BannerSlot, DeleteDialog, ManagerUi,
    Toast, UploadPhase,
};
use crate::services::{BrowserTimer, HttpApi};
use crate::types::PageProps;

#[component]
pub fn UploadManager(props: PageProps, set_page: WriteSignal<Option<PageProps>>) -> impl IntoView {
    let api = store_value(HttpApi::from_page());

    let phase = create_rw_signal(UploadPhase::Idle);
    let refreshing = create_rw_signal(false);
    let deleting = create_rw_signal(false);
    let banner = create_rw_signal(BannerSlot::default());
    let dialog = create_rw_signal(DeleteDialog::default());
    let file_input = create_node_ref::<Input>();

    let ui = ManagerView {
        toasts: use_toasts(),
        phase,
        refreshing,
        banner,
        dialog,
        file_input,
        set_page,
    };

    // Flash that came with the page
    let flash = PageProps {
        uploaded_files: Vec::new(),
        success: props.success.clone(),
        error: props.error.clone(),
    };
    spawn_local(async move {
        run_flash(&ui, &BrowserTimer, &flash).await;
    });

    // Not queued: a drop during a submission starts a second upload
    let on_file = move |file: File| {
        spawn_local(async move {
            run_upload(&api.get_value(), &ui, &BrowserTimer, &file).await;
        });
    };

    let on_refresh = move |_| {
        if refreshing.get_untracked() {
            return;
        }
        spawn_local(async move {
            run_refresh(&api.get_value(), &ui).await;
        });
    };

    let on_confirm_delete = move |_: ()| {
        if deleting.get_untracked() {
            return;
        }
        deleting.set(true);
        spawn_local(async move {
            run_delete(&api.get_value(), &ui).await;
            let _ = deleting.try_set(false);
        });
    };

    let request_delete = move |id: u64| dialog.update(|d| d.request(id));

    view! {
        <div class="upload-manager">
            <FlashBanner banner=banner/>

            <UploadSection
                uploading=Signal::derive(move || phase.get().is_uploading())
                file_input=file_input
                on_file=on_file
            />

            <div class="toolbar">
                <button
                    class="btn btn-secondary"
                    on:click=on_refresh
                    disabled=move || refreshing.get()
                >
                    <span class="refresh-icon" class:spinning=move || refreshing.get()>"🔄"</span>
                    " Refresh"
                </button>
            </div>

            <FileList files=props.uploaded_files on_delete=request_delete/>

            <DeleteConfirmDialog dialog=dialog deleting=deleting on_confirm=on_confirm_delete/>
        </div>
    }
}

/// Signals the manager flows act on.
///
/// Writes use the `try_` variants: a flow may finish after a reload has
/// already disposed this view.
#[derive(Clone, Copy)]
struct ManagerView {
    toasts: Toasts,
    phase: RwSignal<UploadPhase>,
    refreshing: RwSignal<bool>,
    banner: RwSignal<BannerSlot>,
    dialog: RwSignal<DeleteDialog>,
    file_input: NodeRef<Input>,
    set_page: WriteSignal<Option<PageProps>>,
}

impl ManagerUi for ManagerView {
    fn notify(&self, toast: Toast) {
        self.toasts.push(toast);
    }

    fn set_phase(&self, phase: UploadPhase) {
        let _ = self.phase.try_set(phase);
    }

    fn set_refreshing(&self, refreshing: bool) {
        let _ = self.refreshing.try_set(refreshing);
    }

    fn show_banner(&self, banner: Banner) -> Option<u64> {
        self.banner.try_update(|slot| slot.show(banner))
    }

    fn expire_banner(&self, ticket: u64) {
        let _ = self.banner.try_update(|slot| slot.expire(ticket));
    }

    fn clear_picker(&self) {
        if let Some(input) = self.file_input.get_untracked() {
            input.set_value("");
        }
    }

    fn replace_page(&self, page: PageProps) {
        let _ = self.set_page.try_set(Some(page));
    }

    fn confirmed_delete_target(&self) -> Option<u64> {
        self.dialog.try_with_untracked(|d| d.confirm()).flatten()
    }

    fn close_dialog(&self) {
        let _ = self.dialog.try_update(|d| d.close());
    }
}
