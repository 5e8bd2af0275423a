//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"Spreadsheet Uploads"</h1>
            <p class="subtitle">
                "Upload Excel or CSV files. "
                "Each file is summarised on the server; expand a row to preview its first lines."
            </p>
        </div>
    }
}
