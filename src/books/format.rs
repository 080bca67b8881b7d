//! Presentation formatting for book results.

use super::types::Book;

/// Serialize a page of books into the display payload (a JSON array).
///
/// Pure function of its input; the display layer renders the payload
/// as-is.
pub fn page_to_display(page: &[Book]) -> Result<String, serde_json::Error> {
    serde_json::to_string(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_page_as_json_array() {
        let page = vec![Book::titled("Dune"), Book::titled("Hyperion")];
        let payload = page_to_display(&page).unwrap();
        assert_eq!(payload, r#"[{"title":"Dune"},{"title":"Hyperion"}]"#);
    }

    #[test]
    fn empty_page_formats_as_empty_array() {
        assert_eq!(page_to_display(&[]).unwrap(), "[]");
    }
}
