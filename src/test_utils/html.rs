use axum::{body::Body, response::Response};
use scraper::{ElementRef, Html, Selector};

/// Read the whole body of `response` and parse it as an HTML document.
pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Could not get response body");

    Html::parse_document(&String::from_utf8_lossy(&body))
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

/// The first element matching the CSS `selector`, panicking if there is none.
#[track_caller]
pub(crate) fn must_select<'a>(html: &'a Html, selector: &str) -> ElementRef<'a> {
    let parsed = Selector::parse(selector)
        .unwrap_or_else(|error| panic!("Invalid selector {selector}: {error:?}"));

    html.select(&parsed)
        .next()
        .unwrap_or_else(|| panic!("No element matches {selector}"))
}

/// The text content of `element` with surrounding whitespace trimmed.
pub(crate) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}
