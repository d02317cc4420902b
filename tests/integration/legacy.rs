//! Legacy transport: query services answer XML, the audit-log service JSON.

use crate::mock_server::{authorization_for, MockServerFixture};
use mockito::Matcher;
use serde_json::json;

const RUN_INSTANCES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RunInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2014-10-01/"><requestId>r-1</requestId><instancesSet><item><instanceId>i-1</instanceId></item></instancesSet></RunInstancesResponse>"#;

#[tokio::test]
async fn test_ec2_run_instances_prints_indented_xml() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_header("authorization", authorization_for("ec2"))
        .match_header(
            "content-type",
            "application/x-www-form-urlencoded; charset=utf-8",
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "RunInstances".into()),
            Matcher::UrlEncoded("Version".into(), "2014-10-01".into()),
            Matcher::UrlEncoded("ImageId".into(), "ami-1".into()),
            Matcher::UrlEncoded("MinCount".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/xml;charset=UTF-8")
        .with_body(RUN_INSTANCES_XML)
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch("ec2", &["RunInstances", "ImageId", "ami-1", "MinCount", "1"])
        .await;
    result.unwrap();
    mock.assert_async().await;

    let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<RunInstancesResponse xmlns="http://ec2.amazonaws.com/doc/2014-10-01/">
  <requestId>r-1</requestId>
  <instancesSet>
    <item>
      <instanceId>i-1</instanceId>
    </item>
  </instancesSet>
</RunInstancesResponse>
"#;
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_ec2_dot_notation_filters_are_indexed() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "DescribeInstances".into()),
            Matcher::UrlEncoded("Filter.1.Name".into(), "instance-state-name".into()),
            Matcher::UrlEncoded("Filter.1.Value.1".into(), "running".into()),
            Matcher::UrlEncoded("Filter.1.Value.2".into(), "stopped".into()),
        ]))
        .with_status(200)
        .with_body("<DescribeInstancesResponse><reservationSet/></DescribeInstancesResponse>")
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch(
            "c2-ec2",
            &[
                "DescribeInstances",
                "Filter.1.Name",
                "instance-state-name",
                "Filter.1.Value.1",
                "running",
                "Filter.1.Value.2",
                "stopped",
            ],
        )
        .await;
    result.unwrap();
    mock.assert_async().await;
    assert_eq!(
        out,
        "<DescribeInstancesResponse>\n  <reservationSet/>\n</DescribeInstancesResponse>\n"
    );
}

#[tokio::test]
async fn test_ec2_owner_id_keeps_leading_zero() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "DescribeImages".into()),
            Matcher::UrlEncoded("Owner.1".into(), "012345678901".into()),
            Matcher::UrlEncoded("MaxResults".into(), "10".into()),
        ]))
        .with_status(200)
        .with_body("<DescribeImagesResponse><imagesSet/></DescribeImagesResponse>")
        .create_async()
        .await;

    let (result, _) = fixture
        .dispatch(
            "ec2",
            &["DescribeImages", "Owner.1", "012345678901", "MaxResults", "10"],
        )
        .await;
    result.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cloudwatch_signs_as_monitoring() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_header("authorization", authorization_for("monitoring"))
        .match_body(Matcher::UrlEncoded("Version".into(), "2010-08-01".into()))
        .with_status(200)
        .with_body("<ListMetricsResponse><ListMetricsResult><Metrics/></ListMetricsResult></ListMetricsResponse>")
        .create_async()
        .await;

    let (result, _) = fixture.dispatch("cw", &["ListMetrics"]).await;
    result.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cloudtrail_max_results_sent_as_integer() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_header("authorization", authorization_for("cloudtrail"))
        .match_header(
            "x-amz-target",
            "com.amazonaws.cloudtrail.v20131101.CloudTrail_20131101.LookupEvents",
        )
        .match_header("content-type", "application/x-amz-json-1.1")
        .match_body(Matcher::Json(json!({"MaxResults": 5})))
        .with_status(200)
        .with_header("content-type", "application/x-amz-json-1.1")
        .with_body(r#"{"NextToken":"t","Events":[{"EventName":"RunInstances","EventId":"e-1"}]}"#)
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch("ct", &["LookupEvents", "MaxResults", "5"])
        .await;
    result.unwrap();
    mock.assert_async().await;

    let expected = r#"{
    "Events": [
        {
            "EventId": "e-1",
            "EventName": "RunInstances"
        }
    ],
    "NextToken": "t"
}
"#;
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_json_mode_reads_stdin_verbatim() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_body(Matcher::Json(json!({"MaxResults": "5", "a.b": true})))
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch_with_stdin(
            "ct",
            &["LookupEvents", "--json", "-"],
            r#"{"MaxResults": "5", "a.b": true}"#,
        )
        .await;
    result.unwrap();
    mock.assert_async().await;
    assert_eq!(out, "{}\n");
}
