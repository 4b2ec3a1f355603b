/// Sanitizes user-supplied post and comment text with `ammonia`.
///
/// Whitelist-based: safe formatting tags survive, while `<script>`,
/// `<iframe>` and event-handler attributes are stripped.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_keeps_text() {
        let cleaned = clean_html("<b>hi</b><script>alert(1)</script>");
        assert_eq!(cleaned, "<b>hi</b>");
    }
}
