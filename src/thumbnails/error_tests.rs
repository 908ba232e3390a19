//! Unit tests for thumbnail error types

#[cfg(test)]
mod tests {
    use crate::host::HostError;
    use crate::thumbnails::error::ThumbnailError;

    #[test]
    fn test_invalid_size_display() {
        assert_eq!(
            ThumbnailError::InvalidSize(0).to_string(),
            "Invalid thumbnail size: 0"
        );
    }

    #[test]
    fn test_host_error_is_transparent() {
        let error: ThumbnailError = HostError::Render("export produced no file".into()).into();
        assert_eq!(error.to_string(), "Render failed: export produced no file");
    }

    #[test]
    fn test_io_conversion() {
        let error: ThumbnailError = std::io::Error::other("full").into();
        assert!(matches!(error, ThumbnailError::Io(_)));
    }
}
