use qnote_core::format::OutputFormat;

/// Parse output format from string
pub fn parse_output_format(s: &str) -> std::result::Result<OutputFormat, String> {
    s.parse::<OutputFormat>().map_err(|e| e.to_string())
}

/// Parse a positive count (queue sizes, result limits)
pub fn parse_positive(s: &str) -> std::result::Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("json").unwrap(), OutputFormat::Json);
        assert!(parse_output_format("records")
            .unwrap_err()
            .contains("unknown format"));
    }

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive("5").unwrap(), 5);
        assert!(parse_positive("0").is_err());
        assert!(parse_positive("-1").is_err());
    }
}
