//! Integration tests for error handling: service errors, malformed bodies,
//! configuration and argument failures.

use crate::mock_server::MockServerFixture;
use c2client::transport::TransportError;
use c2client::Error;

#[tokio::test]
async fn test_legacy_xml_service_error_surfaces_code_and_message() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("POST", "/")
        .with_status(400)
        .with_body(
            "<Response><Errors><Error><Code>InvalidAMIID.NotFound</Code>\
             <Message>The image id '[ami-1]' does not exist</Message></Error></Errors>\
             <RequestID>r-1</RequestID></Response>",
        )
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch("ec2", &["RunInstances", "ImageId", "ami-1"])
        .await;
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 6);
    match err {
        Error::Transport(TransportError::Service {
            service,
            status,
            code,
            message,
        }) => {
            assert_eq!(service, "ec2");
            assert_eq!(status, 400);
            assert_eq!(code, "InvalidAMIID.NotFound");
            assert!(message.contains("ami-1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_modern_json_service_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("GET", "/clusters/missing")
        .with_status(404)
        .with_header("x-amzn-errortype", "ResourceNotFoundException")
        .with_body(r#"{"message":"No cluster found for name: missing."}"#)
        .create_async()
        .await;

    let (result, _) = fixture
        .dispatch("eks", &["DescribeCluster", "name", "missing"])
        .await;
    let err = result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "eks returned HTTP 404: ResourceNotFoundException: No cluster found for name: missing."
    );
}

#[tokio::test]
async fn test_malformed_xml_is_decode_error() {
    let mut fixture = MockServerFixture::new().await;
    let _mock = fixture
        .server
        .mock("POST", "/")
        .with_status(200)
        .with_body("<DescribeInstancesResponse><reservationSet>")
        .create_async()
        .await;

    let (result, out) = fixture.dispatch("ec2", &["DescribeInstances"]).await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
    assert_eq!(err.exit_code(), 7);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_sparse_indices_rejected_before_sending() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .expect(0)
        .create_async()
        .await;

    let (result, _) = fixture
        .dispatch("ec2", &["DescribeInstances", "InstanceId.1", "i-1", "InstanceId.3", "i-3"])
        .await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Coercion(_)));
    assert_eq!(err.exit_code(), 4);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_json_mode_rejects_non_object() {
    let fixture = MockServerFixture::new().await;
    let (result, _) = fixture
        .dispatch("ct", &["LookupEvents", "--json", "[1, 2]"])
        .await;
    assert_eq!(result.unwrap_err().exit_code(), 4);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let settings = c2client::Settings::from_vars([
        ("EC2_URL", "http://127.0.0.1:1/"),
        ("AWS_ACCESS_KEY_ID", "AKID"),
        ("AWS_SECRET_ACCESS_KEY", "secret"),
    ]);
    let mut out = Vec::new();
    let result = c2client::shell::dispatch(
        "ec2",
        ["DescribeRegions"],
        &settings,
        std::io::empty(),
        &mut out,
    )
    .await;
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Transport(TransportError::Http(_))));
    assert_eq!(err.exit_code(), 6);
}
