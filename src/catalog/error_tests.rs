//! Unit tests for catalog error types

#[cfg(test)]
mod tests {
    use crate::catalog::error::CatalogError;
    use std::error::Error;

    #[test]
    fn test_not_found_error() {
        let error = CatalogError::NotFound("Door_Single".to_string());
        assert_eq!(error.to_string(), "Asset not found in catalog: Door_Single");
    }

    #[test]
    fn test_decode_error() {
        let error = CatalogError::Decode("expected `[`".to_string());
        assert_eq!(error.to_string(), "Error while decoding catalog: expected `[`");
    }

    #[test]
    fn test_invalid_pattern_display() {
        let error = CatalogError::InvalidPattern("[".to_string(), "unclosed".to_string());
        let display = format!("{error}");
        assert!(display.contains("Invalid asset pattern"));
        assert!(display.contains("unclosed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: CatalogError = io.into();
        assert!(matches!(error, CatalogError::Io(_)));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_outside_root_has_no_source() {
        let error = CatalogError::OutsideRoot("/elsewhere/a.rfa".to_string());
        assert!(error.source().is_none());
        assert!(format!("{error:?}").contains("OutsideRoot"));
    }
}
