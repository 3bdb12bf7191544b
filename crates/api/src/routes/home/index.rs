use axum::{
    http::{header::ACCEPT, HeaderMap},
    response::{Html, IntoResponse, Response},
};

use crate::templates::home_page;

pub const AVAILABLE_ROUTES: [&str; 5] = [
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/2010-01-01",
    "/api/v1.0/2010-01-01/2017-08-23",
];

/// Lists the data routes, as HTML for browsers and plain text otherwise
pub async fn index_handler(headers: HeaderMap) -> Response {
    if prefers_html(&headers) {
        Html(home_page(&AVAILABLE_ROUTES).into_string()).into_response()
    } else {
        route_listing().into_response()
    }
}

pub fn route_listing() -> String {
    let mut listing = String::from("Available Routes:\n");
    for route in AVAILABLE_ROUTES {
        listing.push_str(route);
        listing.push('\n');
    }
    listing
}

fn prefers_html(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.contains("text/html"))
}
