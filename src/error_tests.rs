//! Tests for error types

#[cfg(test)]
mod tests {
    use super::super::error::{BotError, IndexKind};

    #[test]
    fn test_not_found_in_index() {
        let err = BotError::NotFoundInIndex {
            kind: IndexKind::Ticker,
            key: "XYZ".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ticker not found"));
        assert!(msg.contains("XYZ"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_upstream_not_found() {
        let err = BotError::UpstreamNotFound("https://example.com/x/".to_string());
        assert!(err.to_string().contains("Upstream page not found"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_malformed_markup() {
        let err = BotError::malformed("markets-table missing");
        assert!(err.to_string().contains("Malformed markup"));
        assert!(err.to_string().contains("markets-table"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_config_error() {
        let err = BotError::Config("Missing token".to_string());
        assert!(err.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_telegram_error() {
        let err = BotError::Telegram("Unauthorized".to_string());
        assert!(err.to_string().contains("Telegram error"));
    }

    #[test]
    fn test_user_message_for_unknown_ticker() {
        let err = BotError::NotFoundInIndex {
            kind: IndexKind::Ticker,
            key: "FOO".to_string(),
        };
        let msg = err.user_message("foo");
        assert!(msg.starts_with("foo cannot be found in DB"));
        assert!(msg.contains("valid ticker"));
    }

    #[test]
    fn test_user_message_for_unknown_exchange() {
        let err = BotError::NotFoundInIndex {
            kind: IndexKind::Exchange,
            key: "nowhere".to_string(),
        };
        assert!(err.user_message("nowhere").contains("valid exchange name"));
    }

    #[test]
    fn test_user_message_has_no_debug_dump() {
        let err = BotError::malformed("price cell `abc` is not numeric");
        let msg = err.user_message("BTC");
        assert!(msg.contains("BTC"));
        assert!(!msg.contains("abc"));
        assert!(!msg.contains("MalformedMarkup"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "token.txt");
        let err: BotError = io.into();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_error_variants_distinct() {
        let a = BotError::UpstreamNotFound("test".to_string());
        let b = BotError::MalformedMarkup("test".to_string());

        assert_ne!(a.to_string(), b.to_string());
    }
}
