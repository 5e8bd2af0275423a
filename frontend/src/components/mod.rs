//! UI Components for the upload manager.
//!
//! # Layout Components
//! - [`Hero`] - Main title and description
//! - [`ToastStack`] - Notifications, owned by the app root
//!
//! # Feature Components
//! - [`UploadManager`] - One rendering of the uploads page
//! - [`UploadSection`] - File picker with drag & drop
//! - [`FileList`] - Uploaded files with expandable rows
//! - `FileDetail` - Summary table of one upload
//! - [`FlashBanner`] - Inline success/error message
//! - [`DeleteConfirmDialog`] - Confirmation before a delete

mod banner;
mod delete_dialog;
mod file_detail;
mod file_list;
mod hero;
mod toasts;
mod upload;
mod upload_manager;

pub use banner::*;
pub use delete_dialog::*;
pub use file_detail::*;
pub use file_list::*;
pub use hero::*;
pub use toasts::*;
pub use upload::*;
pub use upload_manager::*;
