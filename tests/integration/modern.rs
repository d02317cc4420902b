//! Modern transport: operation lookup, protocol serialization, normalized output.

use crate::mock_server::{authorization_for, MockServerFixture};
use c2client::Error;
use mockito::Matcher;
use serde_json::json;

#[tokio::test]
async fn test_eks_describe_cluster_hides_metadata_and_formats_timestamps() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/clusters/prod")
        .match_header("authorization", authorization_for("eks"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_header("x-amzn-RequestId", "req-42")
        .with_body(
            r#"{"cluster":{"name":"prod","status":"ACTIVE","createdAt":1559392200.0,"version":"1.29"}}"#,
        )
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch("eks", &["describe-cluster", "name", "prod"])
        .await;
    result.unwrap();
    mock.assert_async().await;

    let expected = r#"{
    "cluster": {
        "createdAt": "2019-06-01 12:30:00+00:00",
        "name": "prod",
        "status": "ACTIVE",
        "version": "1.29"
    }
}
"#;
    assert_eq!(out, expected);
    assert!(!out.contains("ResponseMetadata"));
    assert!(!out.contains("req-42"));
}

#[tokio::test]
async fn test_eks_list_sends_remaining_arguments_as_query() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("GET", "/clusters")
        .match_query(Matcher::UrlEncoded("maxResults".into(), "5".into()))
        .with_status(200)
        .with_body(r#"{"clusters":["a","b"]}"#)
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch("eks", &["ListClusters", "maxResults", "5"])
        .await;
    result.unwrap();
    mock.assert_async().await;
    assert_eq!(out, "{\n    \"clusters\": [\n        \"a\",\n        \"b\"\n    ]\n}\n");
}

#[tokio::test]
async fn test_backup_put_sends_json_body() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("PUT", "/backup-vaults/vault-1")
        .match_header("authorization", authorization_for("backup"))
        .match_body(Matcher::Json(json!({"EncryptionKeyArn": "k"})))
        .with_status(200)
        .with_body(r#"{"BackupVaultName":"vault-1","CreationDate":"2019-06-01T12:30:00.250Z"}"#)
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch(
            "bs",
            &[
                "CreateBackupVault",
                "BackupVaultName",
                "vault-1",
                "EncryptionKeyArn",
                "k",
            ],
        )
        .await;
    result.unwrap();
    mock.assert_async().await;
    assert!(out.contains("\"CreationDate\": \"2019-06-01 12:30:00.250000+00:00\""));
}

#[tokio::test]
async fn test_autoscaling_query_protocol_decodes_result() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_header("authorization", authorization_for("autoscaling"))
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("Action".into(), "DescribeAutoScalingGroups".into()),
            Matcher::UrlEncoded("Version".into(), "2011-01-01".into()),
            Matcher::UrlEncoded("AutoScalingGroupNames.member.1".into(), "web".into()),
        ]))
        .with_status(200)
        .with_body(
            r#"<DescribeAutoScalingGroupsResponse xmlns="http://autoscaling.amazonaws.com/doc/2011-01-01/">
  <DescribeAutoScalingGroupsResult>
    <AutoScalingGroups>
      <member>
        <AutoScalingGroupName>web</AutoScalingGroupName>
        <DesiredCapacity>2</DesiredCapacity>
        <CreatedTime>2019-06-01T12:30:00Z</CreatedTime>
      </member>
    </AutoScalingGroups>
  </DescribeAutoScalingGroupsResult>
  <ResponseMetadata><RequestId>req-1</RequestId></ResponseMetadata>
</DescribeAutoScalingGroupsResponse>"#,
        )
        .create_async()
        .await;

    let (result, out) = fixture
        .dispatch(
            "as",
            &["DescribeAutoScalingGroups", "AutoScalingGroupNames.1", "web"],
        )
        .await;
    result.unwrap();
    mock.assert_async().await;

    let expected = r#"{
    "AutoScalingGroups": [
        {
            "AutoScalingGroupName": "web",
            "CreatedTime": "2019-06-01 12:30:00+00:00",
            "DesiredCapacity": "2"
        }
    ]
}
"#;
    assert_eq!(out, expected);
}

#[tokio::test]
async fn test_paas_json_target() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", "/")
        .match_header("x-amz-target", "PaasService.DescribeServices")
        .match_body(Matcher::Json(json!({"ServiceIds": ["s-1"]})))
        .with_status(200)
        .with_body(r#"{"Services":[{"ServiceId":"s-1"}]}"#)
        .create_async()
        .await;

    let (result, _) = fixture
        .dispatch("paas", &["describe_services", "ServiceIds.1", "s-1"])
        .await;
    result.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unknown_action_sends_nothing() {
    let mut fixture = MockServerFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (result, out) = fixture.dispatch("elb", &["RunInstances"]).await;
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownAction { ref service, ref action } if service == "elbv2" && action == "RunInstances"
    ));
    assert_eq!(err.exit_code(), 3);
    assert!(out.is_empty());
    mock.assert_async().await;
}
