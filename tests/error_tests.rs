//! Tests for error handling
//!
//! - CmsError variants and their messages
//! - Conversions from io and serde errors
//! - Step context and remote detail accessors
//! - Result type usage

use sfcms::error::{CmsError, Result};

// ============================================================================
// CmsError Variant Tests
// ============================================================================

mod error_variant_tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let err = CmsError::Config("missing required configuration: SF_CLIENT_ID".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("SF_CLIENT_ID"));
    }

    #[test]
    fn test_authentication_error() {
        let err = CmsError::Authentication("token endpoint returned 400".to_string());
        assert!(err.to_string().starts_with("Authentication failed"));
    }

    #[test]
    fn test_not_found_error() {
        let err = CmsError::NotFound("no CMS workspace named \"Marketing\"".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Not found"));
        assert!(msg.contains("Marketing"));
    }

    #[test]
    fn test_clearance_error() {
        let err = CmsError::Clearance("token expired".to_string());
        assert!(err.to_string().contains("Clearance required"));
    }

    #[test]
    fn test_invalid_argument_error() {
        let err = CmsError::InvalidArgument("`title` is required".to_string());
        assert!(err.to_string().contains("Invalid argument"));
    }

    #[test]
    fn test_remote_error_display_omits_body() {
        let err = CmsError::Remote {
            step: "create content".to_string(),
            status: 400,
            body: "secret-looking body".to_string(),
        };
        let msg = err.to_string();
        assert_eq!(msg, "create content failed with HTTP 400");
        assert_eq!(err.body(), Some("secret-looking body"));
    }
}

// ============================================================================
// From Conversion Tests
// ============================================================================

mod error_from_tests {
    use super::*;

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: CmsError = io_err.into();
        assert!(matches!(err, CmsError::IoError(_)));
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: CmsError = json_err.into();
        assert!(matches!(err, CmsError::JsonError(_)));
        assert!(err.to_string().contains("JSON error"));
    }
}

// ============================================================================
// Context Tests
// ============================================================================

mod error_context_tests {
    use super::*;

    #[test]
    fn test_context_on_each_message_variant() {
        let cases = vec![
            CmsError::Config("x".to_string()),
            CmsError::Authentication("x".to_string()),
            CmsError::NotFound("x".to_string()),
            CmsError::Http("x".to_string()),
        ];
        for err in cases {
            let msg = err.context("search content").to_string();
            assert!(msg.contains("search content: x"), "{}", msg);
        }
    }

    #[test]
    fn test_context_turns_json_error_into_http() {
        let json_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = CmsError::from(json_err).context("list content");
        match err {
            CmsError::Http(msg) => assert!(msg.starts_with("list content: malformed response")),
            other => panic!("expected Http, got {:?}", other),
        }
    }

    #[test]
    fn test_context_leaves_clearance_alone() {
        let err = CmsError::Clearance("expired".to_string()).context("create content");
        assert_eq!(err.to_string(), "Clearance required: expired");
    }

    #[test]
    fn test_status_only_for_remote() {
        assert_eq!(CmsError::Http("reset".to_string()).status(), None);
        assert_eq!(CmsError::NotFound("x".to_string()).body(), None);
    }
}

// ============================================================================
// Result Type Tests
// ============================================================================

mod result_type_tests {
    use super::*;

    fn lookup(found: bool) -> Result<u32> {
        if found {
            Ok(7)
        } else {
            Err(CmsError::NotFound("content 20Y1".to_string()))
        }
    }

    fn caller(found: bool) -> Result<u32> {
        let v = lookup(found)?;
        Ok(v * 2)
    }

    #[test]
    fn test_result_question_mark_operator() {
        assert_eq!(caller(true).unwrap(), 14);
        assert!(matches!(caller(false), Err(CmsError::NotFound(_))));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CmsError>();
    }

    #[test]
    fn test_error_has_source() {
        use std::error::Error;
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CmsError::from(io_err);
        assert!(err.source().is_some());
        assert!(CmsError::Config("x".to_string()).source().is_none());
    }
}
