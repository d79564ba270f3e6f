//! Click attribute extraction from redirect requests.
//!
//! This is the only place that looks at raw request data. The registry and the
//! click recorder receive the finished [`ClickAttributes`].

use std::net::IpAddr;

use axum::http::{HeaderMap, header};
use woothee::parser::Parser;

use crate::domain::entities::ClickAttributes;

/// Country header set by Cloudflare (ISO 3166-1 alpha-2).
const COUNTRY_HEADER: &str = "cf-ipcountry";
/// City header set by Cloudflare when visitor location headers are enabled.
const CITY_HEADER: &str = "cf-ipcity";

/// Builds click attributes from request headers and the peer address.
///
/// Missing or unreadable headers leave the matching attribute empty; nothing is
/// substituted.
pub fn extract_click_attributes(headers: &HeaderMap, peer: IpAddr) -> ClickAttributes {
    let user_agent = header_value(headers, header::USER_AGENT.as_str());
    let (device, browser) = user_agent
        .as_deref()
        .map(classify_user_agent)
        .unwrap_or_default();

    ClickAttributes {
        ip_address: Some(peer.to_string()),
        referrer: header_value(headers, header::REFERER.as_str()),
        country: header_value(headers, COUNTRY_HEADER)
            .filter(|c| c != "XX")
            .map(|c| c.to_ascii_uppercase()),
        city: header_value(headers, CITY_HEADER),
        device,
        browser,
        user_agent,
    }
}

/// Maps a User-Agent string to `(device, browser)`.
///
/// Device is one of `desktop`, `mobile`, `appliance` or `bot`; unrecognized
/// agents yield `None` for either part.
pub fn classify_user_agent(user_agent: &str) -> (Option<String>, Option<String>) {
    let Some(result) = Parser::new().parse(user_agent) else {
        return (None, None);
    };

    let device = match result.category {
        "pc" => Some("desktop"),
        "smartphone" | "mobilephone" => Some("mobile"),
        "appliance" => Some("appliance"),
        "crawler" => Some("bot"),
        _ => None,
    }
    .map(str::to_string);

    let browser = (result.name != "UNKNOWN").then(|| result.name.to_string());

    (device, browser)
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
