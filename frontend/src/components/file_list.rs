//! List of uploaded files with expandable summaries.

use chrono::{DateTime, Local};
use leptos::*;

use crate::components::FileDetail;
use crate::types::{FileStatus, UploadedFile};

#[component]
pub fn FileList(
    files: Vec<UploadedFile>,
    /// Opens the delete confirmation for an id
    #[prop(into)]
    on_delete: Callback<u64>,
) -> impl IntoView {
    // Which entry is expanded
    let (expanded_id, set_expanded_id) = create_signal(None::<u64>);

    if files.is_empty() {
        return view! {
            <div class="file-list-empty">
                <div class="empty-icon">"🗂️"</div>
                <p>"No files uploaded yet. Upload a spreadsheet to get started."</p>
            </div>
        }
        .into_view();
    }

    let count = files.len();
    view! {
        <div class="file-list">
            <div class="file-list-title">{format!("📋 Uploaded files ({})", count)}</div>
            {files
                .into_iter()
                .map(|file| {
                    let id = file.id;
                    let is_expanded = move || expanded_id.get() == Some(id);

                    let toggle_expand = move |_| {
                        if expanded_id.get_untracked() == Some(id) {
                            set_expanded_id.set(None);
                        } else {
                            set_expanded_id.set(Some(id));
                        }
                    };

                    let request_delete = move |ev: ev::MouseEvent| {
                        ev.stop_propagation();
                        on_delete.call(id);
                    };

                    let size = file
                        .file_size
                        .map(format_file_size)
                        .unwrap_or_else(|| "—".to_string());
                    let details = format!("{} • {}", size, format_uploaded_at(&file.created_at));
                    let status = file.status;
                    let icon = file.file_type.icon();
                    let name = file.original_filename.clone();

                    view! {
                        <div class="file-item" class:expanded=is_expanded>
                            <div class="file-item-header" on:click=toggle_expand style="cursor: pointer;">
                                <span class="file-icon">{icon}</span>
                                <div class="file-item-main">
                                    <div class="file-item-title">
                                        {move || if is_expanded() { "▼ " } else { "▶ " }}
                                        {name}
                                    </div>
                                    <div class="file-item-details">{details}</div>
                                </div>
                                <span class=status.css_class()>{status.label()}</span>
                                <button
                                    class="btn btn-danger btn-small"
                                    title="Delete"
                                    on:click=request_delete
                                >
                                    "🗑️"
                                </button>
                            </div>

                            <Show when=is_expanded fallback=|| view! {}>
                                <div class="file-item-expanded">
                                    <FileDetail file=file.clone()/>
                                </div>
                            </Show>
                        </div>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

/// Human-readable size, binary units.
pub fn format_file_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Local-time rendering of an RFC 3339 timestamp; unparsable input is shown as is.
pub fn format_uploaded_at(created_at: &str) -> String {
    match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.with_timezone(&Local).format("%b %-d, %Y %H:%M").to_string(),
        Err(_) => created_at.to_string(),
    }
}

/// Whether a row can show a summary table.
pub fn has_summary(file: &UploadedFile) -> bool {
    file.status == FileStatus::Completed && file.processed_data.is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_unparsable_date_is_kept() {
        assert_eq!(format_uploaded_at("yesterday"), "yesterday");
        assert!(format_uploaded_at("2026-10-18T09:30:00+00:00").contains("2026"));
    }
}
