//! Inline flash banner.

use leptos::*;

use crate::manager::{BannerKind, BannerSlot};

#[component]
pub fn FlashBanner(banner: RwSignal<BannerSlot>) -> impl IntoView {
    move || {
        banner.with(|slot| slot.current().cloned()).map(|banner| {
            let class = match banner.kind {
                BannerKind::Success => "banner banner-success",
                BannerKind::Error => "banner banner-error",
            };
            view! { <div class=class role="alert">{banner.message}</div> }
        })
    }
}
