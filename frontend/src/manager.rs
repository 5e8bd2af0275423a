//! Upload manager logic, independent of the DOM.
//!
//! The components own the signals; this module owns the rules. Every flow
//! talks to the backend through [`UploadsApi`] and to the view through
//! [`ManagerUi`], so the whole upload/delete/refresh contract is testable
//! without a browser.
//!
//! # Upload state machine
//!
//! ```text
//! idle ─▶ validating ─┬─▶ rejected ─────────────▶ idle
//!                     └─▶ submitting ─┬─▶ succeeded ─▶ (page replaced)
//!                                     └─▶ failed ────▶ idle
//! ```

use crate::config::{ACCEPTED_EXTENSIONS, BANNER_DURATION_MS, MAX_FILE_SIZE};
use crate::types::{AppResult, PageProps};

// =============================================================================
// Notifications
// =============================================================================

/// Toast severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient, non-blocking notification.
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            description: description.into(),
        }
    }

    /// Get CSS class for styling.
    pub fn css_class(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "toast toast-success",
            ToastKind::Error => "toast toast-error",
        }
    }
}

// =============================================================================
// Client-side validation
// =============================================================================

/// Why a file was refused before any request was sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    InvalidType,
    TooLarge,
}

impl Rejection {
    /// Notification for this rejection.
    pub fn toast(&self) -> Toast {
        match self {
            Rejection::InvalidType => Toast::error(
                "Invalid file type",
                "Please upload an Excel (.xlsx, .xls) or CSV file.",
            ),
            Rejection::TooLarge => Toast::error(
                "File too large",
                format!("Maximum file size is {}MB.", MAX_FILE_SIZE / (1024 * 1024)),
            ),
        }
    }
}

/// Case-insensitive extension check against the accepted list.
pub fn has_accepted_extension(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted)),
        None => false,
    }
}

/// Type first, then size. A file of exactly [`MAX_FILE_SIZE`] bytes passes.
pub fn validate_file(name: &str, size: u64) -> Result<(), Rejection> {
    if !has_accepted_extension(name) {
        return Err(Rejection::InvalidType);
    }
    if size > MAX_FILE_SIZE {
        return Err(Rejection::TooLarge);
    }
    Ok(())
}

// =============================================================================
// View state
// =============================================================================

/// Phase of the upload currently driven by the view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UploadPhase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Submitting,
    Succeeded,
    Failed,
}

impl UploadPhase {
    /// The picker trigger is disabled in this phase.
    pub fn is_uploading(&self) -> bool {
        matches!(self, UploadPhase::Submitting)
    }
}

/// Drag-and-drop highlight state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DragState {
    pub dragging: bool,
}

impl DragState {
    pub fn enter(&mut self) {
        self.dragging = true;
    }

    pub fn leave(&mut self) {
        self.dragging = false;
    }

    /// End the drag and keep only the first dropped file.
    pub fn drop_files<T>(&mut self, files: impl IntoIterator<Item = T>) -> Option<T> {
        self.dragging = false;
        files.into_iter().next()
    }
}

/// Delete confirmation dialog. At most one target at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeleteDialog {
    open: bool,
    pending: Option<u64>,
}

impl DeleteDialog {
    /// Open the dialog for `id`.
    pub fn request(&mut self, id: u64) {
        self.open = true;
        self.pending = Some(id);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Target to delete once the user confirms; `None` unless the dialog is open.
    pub fn confirm(&self) -> Option<u64> {
        if self.open {
            self.pending
        } else {
            None
        }
    }

    /// Close and forget the target.
    pub fn close(&mut self) {
        self.open = false;
        self.pending = None;
    }
}

/// Banner flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

/// Inline message block.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Error,
            message: message.into(),
        }
    }
}

/// Flash message of a page as a banner; an error wins over a success.
pub fn flash_banner(props: &PageProps) -> Option<Banner> {
    props
        .error
        .clone()
        .map(Banner::error)
        .or_else(|| props.success.clone().map(Banner::success))
}

/// The banner currently shown.
///
/// Every [`show`](Self::show) hands out a ticket; an expiry timer only
/// clears the banner it was started for.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BannerSlot {
    current: Option<Banner>,
    ticket: u64,
}

impl BannerSlot {
    pub fn current(&self) -> Option<&Banner> {
        self.current.as_ref()
    }

    /// Replace the banner; returns the ticket its timer must present.
    pub fn show(&mut self, banner: Banner) -> u64 {
        self.ticket += 1;
        self.current = Some(banner);
        self.ticket
    }

    /// Clear the banner if `ticket` is still current. Returns whether
    /// something was cleared.
    pub fn expire(&mut self, ticket: u64) -> bool {
        if ticket == self.ticket && self.current.is_some() {
            self.current = None;
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Guaranteed cleanup
// =============================================================================

/// Runs a closure when dropped, whatever path left the scope.
pub struct Defer<F: FnOnce()> {
    f: Option<F>,
}

impl<F: FnOnce()> Defer<F> {
    pub fn new(f: F) -> Self {
        Self { f: Some(f) }
    }
}

impl<F: FnOnce()> Drop for Defer<F> {
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            f();
        }
    }
}

// =============================================================================
// Seams
// =============================================================================

/// A file handle as far as validation cares.
pub trait UploadCandidate {
    fn file_name(&self) -> String;
    fn size(&self) -> u64;
}

/// Backend calls used by the manager.
#[allow(async_fn_in_trait)]
pub trait UploadsApi {
    type File: UploadCandidate;

    /// POST the file; the server answers with the new page.
    async fn upload(&self, file: &Self::File) -> AppResult<PageProps>;

    /// DELETE one entry; returns the server's message, if any.
    async fn delete(&self, id: u64) -> AppResult<Option<String>>;

    /// Fetch fresh page props.
    async fn reload(&self) -> AppResult<PageProps>;
}

/// Delays, so banner expiry runs on a real or a test clock.
#[allow(async_fn_in_trait)]
pub trait Timer {
    async fn sleep_ms(&self, ms: u32);
}

/// What the flows need from the view.
///
/// Implementations must tolerate calls after the view was replaced.
pub trait ManagerUi {
    fn notify(&self, toast: Toast);
    fn set_phase(&self, phase: UploadPhase);
    fn set_refreshing(&self, refreshing: bool);
    /// Display a banner; returns its ticket, or `None` once the view is gone.
    fn show_banner(&self, banner: Banner) -> Option<u64>;
    /// Clear the banner shown with `ticket`, if it is still the current one.
    fn expire_banner(&self, ticket: u64);
    fn clear_picker(&self);
    /// Replace the whole view with a freshly served page.
    fn replace_page(&self, page: PageProps);
    /// Target of the delete dialog, only if it is open and confirmed.
    fn confirmed_delete_target(&self) -> Option<u64>;
    fn close_dialog(&self);
}

// =============================================================================
// Flows
// =============================================================================

/// Validate and submit one file.
///
/// A failure banner stays up for [`BANNER_DURATION_MS`]; the returned
/// future completes once it has been cleared.
pub async fn run_upload<A, U, T>(api: &A, ui: &U, timer: &T, file: &A::File)
where
    A: UploadsApi,
    U: ManagerUi + ?Sized,
    T: Timer,
{
    ui.set_phase(UploadPhase::Validating);

    let name = file.file_name();
    if let Err(rejection) = validate_file(&name, file.size()) {
        log::warn!("🚫 {} rejected before upload: {:?}", name, rejection);
        ui.set_phase(UploadPhase::Rejected);
        ui.notify(rejection.toast());
        // Picking the same file again must fire `change`
        ui.clear_picker();
        ui.set_phase(UploadPhase::Idle);
        return;
    }

    ui.set_phase(UploadPhase::Submitting);
    log::info!("📤 Uploading {} ({} bytes)...", name, file.size());

    match api.upload(file).await {
        Ok(page) => {
            log::info!("✅ Upload of {} accepted", name);
            ui.set_phase(UploadPhase::Succeeded);
            ui.clear_picker();
            ui.notify(Toast::success(
                "Upload successful",
                format!("{} has been uploaded and is being processed.", name),
            ));
            ui.replace_page(page);
        }
        Err(e) => {
            log::error!("❌ Upload of {} failed: {}", name, e);
            let message = e.user_message();
            ui.set_phase(UploadPhase::Failed);
            ui.notify(Toast::error("Upload failed", message.clone()));
            ui.clear_picker();
            ui.set_phase(UploadPhase::Idle);
            show_banner_for(timer, ui, Banner::error(message)).await;
        }
    }
}

/// Show the flash message a page arrived with, then clear it.
pub async fn run_flash<U, T>(ui: &U, timer: &T, props: &PageProps)
where
    U: ManagerUi + ?Sized,
    T: Timer,
{
    if let Some(banner) = flash_banner(props) {
        show_banner_for(timer, ui, banner).await;
    }
}

/// Show a banner and clear it after [`BANNER_DURATION_MS`].
async fn show_banner_for<U, T>(timer: &T, ui: &U, banner: Banner)
where
    U: ManagerUi + ?Sized,
    T: Timer,
{
    if let Some(ticket) = ui.show_banner(banner) {
        timer.sleep_ms(BANNER_DURATION_MS).await;
        ui.expire_banner(ticket);
    }
}

/// Delete the confirmed target, then reload the page.
///
/// Nothing is sent unless the dialog was confirmed. The dialog is closed
/// once the attempt ends, whatever its outcome.
pub async fn run_delete<A, U>(api: &A, ui: &U)
where
    A: UploadsApi,
    U: ManagerUi + ?Sized,
{
    let Some(id) = ui.confirmed_delete_target() else {
        log::debug!("Delete requested without confirmation, ignored");
        return;
    };
    let _close = Defer::new(|| ui.close_dialog());

    log::info!("🗑️  Deleting upload {}...", id);
    match api.delete(id).await {
        Ok(message) => {
            ui.notify(Toast::success(
                "File deleted",
                message.unwrap_or_else(|| "The file has been deleted.".to_string()),
            ));
            reload_page(api, ui).await;
        }
        Err(e) => {
            log::error!("❌ Delete of {} failed: {}", id, e);
            ui.notify(Toast::error("Delete failed", e.user_message()));
        }
    }
}

/// Refresh button: reload with the `refreshing` flag raised meanwhile.
pub async fn run_refresh<A, U>(api: &A, ui: &U)
where
    A: UploadsApi,
    U: ManagerUi + ?Sized,
{
    ui.set_refreshing(true);
    let _done = Defer::new(|| ui.set_refreshing(false));

    reload_page(api, ui).await;
}

async fn reload_page<A, U>(api: &A, ui: &U)
where
    A: UploadsApi,
    U: ManagerUi + ?Sized,
{
    match api.reload().await {
        Ok(page) => {
            log::debug!("🔄 Reloaded {} uploads", page.uploaded_files.len());
            ui.replace_page(page);
        }
        Err(e) => {
            log::error!("❌ Reload failed: {}", e);
            ui.notify(Toast::error("Refresh failed", e.user_message()));
        }
    }
}
