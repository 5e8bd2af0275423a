//! Sheetdrop - Frontend Rust/Leptos Application
//!
//! A WebAssembly upload manager for spreadsheet files: upload Excel or CSV
//! files, watch their processing status, preview summaries and delete them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        App                                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  UploadsPage                                                 │
//! │  ├── Hero (title, description)                              │
//! │  └── UploadManager (remounted on every page reload)         │
//! │      ├── FlashBanner                                        │
//! │      ├── UploadSection (picker, drag & drop)                │
//! │      ├── FileList ── FileDetail                             │
//! │      └── DeleteConfirmDialog                                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ToastStack (survives reloads)                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`types`] - Page props, upload records, errors
//! - [`manager`] - Validation and upload/delete/refresh flows
//! - [`components`] - UI components
//! - [`services`] - Backend communication

use leptos::*;
use leptos_meta::*;
use leptos_router::*;

use crate::manager::UploadsApi;

// =============================================================================
// Module declarations
// =============================================================================

pub mod components;
pub mod config;
pub mod manager;
pub mod services;
pub mod types;

// =============================================================================
// Re-exports
// =============================================================================

// Configuration
pub use config::*;

// Types
pub use types::{
    // Records
    FileStatus, FileType, ProcessedData, UploadedFile,
    // API
    PageProps,
    // Errors
    AppError, AppResult,
};

// Components
pub use components::*;

// Services
pub use services::*;

// =============================================================================
// Application
// =============================================================================

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    Toasts::provide();

    view! {
        <Title text="Sheetdrop - Spreadsheet Uploads"/>
        <Router>
            <main>
                <Routes>
                    <Route path="/" view=UploadsPage/>
                </Routes>
            </main>
        </Router>
        <ToastStack/>
    }
}

/// Holds the current page props; replacing them remounts the manager.
#[component]
fn UploadsPage() -> impl IntoView {
    let (page, set_page) = create_signal(None::<PageProps>);

    spawn_local(async move {
        let props = match services::HttpApi::from_page().reload().await {
            Ok(props) => {
                log::info!("📋 Loaded {} uploads", props.uploaded_files.len());
                props
            }
            Err(e) => {
                log::error!("❌ Initial load failed: {}", e);
                PageProps {
                    error: Some(e.user_message()),
                    ..PageProps::default()
                }
            }
        };
        set_page.set(Some(props));
    });

    view! {
        <div class="container">
            <Hero/>
            {move || match page.get() {
                Some(props) => view! { <UploadManager props=props set_page=set_page/> }.into_view(),
                None => view! { <div class="loading">"⏳ Loading uploads..."</div> }.into_view(),
            }}
        </div>
    }
}
