use super::*;

#[test]
fn test_parse_five_segments() {
    let path = LandingPath::parse(
        "landingzone/spline/application=RAP/date=2022-11-11/RAP-splineOutput-1.json",
    )
    .unwrap();
    assert_eq!(path.zone, "landingzone");
    assert_eq!(path.source, "spline");
    assert_eq!(path.usecase, "RAP");
    assert_eq!(path.date, "2022-11-11");
    assert_eq!(path.filename, "RAP-splineOutput-1.json");
}

#[test]
fn test_parse_with_container_prefix() {
    let path = LandingPath::parse(
        "acquisitionlayer/landingzone/spline/application=RAP/date=20221111/reach.json",
    )
    .unwrap();
    assert_eq!(path.zone, "landingzone");
    assert_eq!(path.usecase, "RAP");
    assert_eq!(path.date, "20221111");
}

#[test]
fn test_parse_plain_segments() {
    let path = LandingPath::parse("zone/src/app/2024-01-01/f.json").unwrap();
    assert_eq!(path.usecase, "app");
    assert_eq!(path.date, "2024-01-01");
}

#[test]
fn test_parse_empty_fails() {
    let err = LandingPath::parse("").unwrap_err();
    assert!(err.to_string().contains("path is empty"));
}

#[test]
fn test_parse_too_few_segments_fails() {
    let err = LandingPath::parse("landingzone/spline/application=RAP/file.json").unwrap_err();
    assert!(matches!(err, CoreError::InvalidLandingPath { .. }));
    assert!(err.to_string().contains("found 4"));
}

#[test]
fn test_parse_empty_segment_fails() {
    assert!(LandingPath::parse("a//b/c/d/e").is_err());
}

#[test]
fn test_display_roundtrip() {
    let path = LandingPath::new("landingzone", "spline", "RAP", "2024-02-03", "x.json");
    let rendered = path.to_string();
    assert_eq!(
        rendered,
        "landingzone/spline/application=RAP/date=2024-02-03/x.json"
    );
    assert_eq!(LandingPath::parse(&rendered).unwrap(), path);
}
