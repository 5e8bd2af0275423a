//! Expanded view of one upload: summary table, progress or failure reason.

use leptos::*;

use crate::components::has_summary;
use crate::types::{FileStatus, ProcessedData, UploadedFile};

#[component]
pub fn FileDetail(file: UploadedFile) -> impl IntoView {
    if has_summary(&file) {
        if let Some(data) = file.processed_data {
            return view! { <SummaryTable data=data/> }.into_view();
        }
    }

    match file.status {
        FileStatus::Failed => {
            let reason = file
                .error_message
                .unwrap_or_else(|| "Processing failed.".to_string());
            view! { <div class="detail-error">"❌ " {reason}</div> }.into_view()
        }
        _ => view! {
            <div class="detail-pending">"⏳ The file is still being processed. Refresh to check again."</div>
        }
        .into_view(),
    }
}

#[component]
fn SummaryTable(data: ProcessedData) -> impl IntoView {
    let caption = summary_caption(&data);

    view! {
        <div class="summary">
            <div class="summary-caption">{caption}</div>
            <div class="summary-scroll">
                <table class="summary-table">
                    <thead>
                        <tr>
                            {data.headers.into_iter().map(|h| view! { <th>{h}</th> }).collect_view()}
                        </tr>
                    </thead>
                    <tbody>
                        {data
                            .data
                            .into_iter()
                            .map(|row| view! {
                                <tr>{row.into_iter().map(|cell| view! { <td>{cell}</td> }).collect_view()}</tr>
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        </div>
    }
}

/// "Showing 10 of 250 rows • 4 columns"
pub fn summary_caption(data: &ProcessedData) -> String {
    format!(
        "Showing {} of {} rows • {} columns",
        data.data.len(),
        data.total_rows,
        data.total_columns
    )
}
