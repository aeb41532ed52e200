//! REST client for the invoice backend.
//!
//! [`ApiClient`] resolves URLs, attaches the bearer token and maps statuses
//! to [`ApiError`]. Each endpoint group adds inherent methods in its own
//! module. The network sits behind [`Transport`] so tests can script
//! responses.

mod auth;
mod catalog;
mod client;
mod error;
mod expenses;
mod invoices;
mod ocr;
mod payments;
mod templates;
mod transport;

pub use catalog::CatalogAck;
pub use client::{decode, ApiClient, Query};
pub use error::{extract_server_message, status_message, ApiError, CONNECTION_MESSAGE};
pub use expenses::SummaryQuery;
pub use invoices::{InvoiceFilter, InvoicePage, UploadOptions};
pub use ocr::{OcrExtraction, OcrOptions};
pub use transport::{ApiRequest, ApiResponse, Body, HttpTransport, Method, Transport};

/// Path segment with reserved characters percent-encoded.
pub(crate) fn segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::segment;

    #[test]
    fn segments_escape_spaces_and_slashes() {
        assert_eq!(segment("Home & Garden"), "Home%20%26%20Garden");
        assert_eq!(segment("a/b"), "a%2Fb");
        assert_eq!(segment("plain-tag"), "plain-tag");
    }
}
