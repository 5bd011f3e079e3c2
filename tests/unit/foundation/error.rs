use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        AvStudioError::schema("x")
            .to_string()
            .contains("schema error:")
    );
    assert!(
        AvStudioError::type_conversion("x")
            .to_string()
            .contains("type conversion error:")
    );
    assert!(
        AvStudioError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        AvStudioError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        AvStudioError::not_found("x")
            .to_string()
            .contains("not found:")
    );
    assert!(
        AvStudioError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn index_error_reports_position_and_len() {
    let s = AvStudioError::index(3, 2).to_string();
    assert!(s.contains("index 3"));
    assert!(s.contains("len 2"));
}

#[test]
fn transport_error_includes_status_when_known() {
    assert_eq!(
        AvStudioError::http_status(404, "GET scenes/x").to_string(),
        "transport error (HTTP 404): GET scenes/x"
    );
    assert_eq!(
        AvStudioError::transport("connection refused").to_string(),
        "transport error: connection refused"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = AvStudioError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
