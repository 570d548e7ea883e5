//! Text rendering for the overview grid, status indicator and detail view.

use std::fmt::Write as _;

use shared::{domain::ApiStatus, protocol::Listing};
use url::Url;

use crate::detail::{group_thousands, DetailViewModel};

pub fn status_line(status: Option<ApiStatus>) -> Option<&'static str> {
    match status? {
        ApiStatus::Loading => Some("Loading listings..."),
        ApiStatus::Error => Some("Could not reach the listings service."),
        ApiStatus::Done => None,
    }
}

/// Forces `https` on image URLs before they reach an image loader, which
/// the listings image host requires. Returns `None` for anything that is
/// not an http(s) URL.
pub fn secure_image_url(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "https" => Some(url),
        "http" => {
            url.set_scheme("https").ok()?;
            Some(url)
        }
        _ => None,
    }
}

pub fn listing_grid(listings: &[Listing]) -> String {
    if listings.is_empty() {
        return "No listings.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:<5} {:>14}  IMAGE", "ID", "TYPE", "PRICE");
    for listing in listings {
        let kind = if listing.is_rental() { "rent" } else { "sale" };
        let image = secure_image_url(listing.image_url())
            .map(|url| url.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:<10} {:<5} {:>14}  {}",
            listing.id(),
            kind,
            format!("${}", group_thousands(listing.price())),
            image
        );
    }
    out
}

pub fn detail_view(detail: &DetailViewModel) -> String {
    let listing = detail.selected();
    let mut out = String::new();
    let _ = writeln!(out, "Listing {}", listing.id());
    if !listing.name().is_empty() {
        let _ = writeln!(out, "  {}", listing.name());
    }
    let _ = writeln!(out, "  {}", detail.display_type());
    let _ = writeln!(out, "  {}", detail.display_price());
    if let Some(url) = secure_image_url(listing.image_url()) {
        let _ = writeln!(out, "  {url}");
    }
    out
}
