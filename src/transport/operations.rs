//! Per-service operation tables for the modern adapter.
//!
//! Each service lists the operations it exposes with their HTTP binding;
//! actions are matched by their snake-case form so `DescribeClusters`,
//! `describe-clusters` and `describe_clusters` all resolve to the same entry.

use regex::Regex;

use super::http::HttpMethod::{self, Delete, Get, Post, Put};

static ACRONYM_BOUNDARY: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());
static CAMEL_BOUNDARY: once_cell::sync::Lazy<Regex> =
    once_cell::sync::Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

/// `DescribeDBInstances` → `describe_db_instances`, `run-instances` → `run_instances`.
pub fn underscore(word: &str) -> String {
    let word = ACRONYM_BOUNDARY.replace_all(word, "${1}_${2}");
    let word = CAMEL_BOUNDARY.replace_all(&word, "${1}_${2}");
    word.replace('-', "_").to_lowercase()
}

/// Wire protocol spoken by a modern service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Form POST with `.member.N` lists; XML `<OpResult>` answers.
    Query { version: &'static str },
    /// Operation-specific method and URI template; JSON both ways.
    RestJson,
    /// JSON POST addressed by `X-Amz-Target: <prefix>.<Op>`.
    JsonTarget { prefix: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub method: HttpMethod,
    /// URI template, `{Member}` placeholders filled from the arguments.
    pub uri: &'static str,
}

impl Operation {
    /// Placeholder member names in the URI template, in order.
    pub fn path_members(&self) -> Vec<&'static str> {
        let mut members = Vec::new();
        let mut rest = self.uri;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            members.push(rest[start + 1..start + len].trim_end_matches('+'));
            rest = &rest[start + len + 1..];
        }
        members
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceModel {
    pub service: &'static str,
    pub signing_name: &'static str,
    pub protocol: Protocol,
    pub operations: &'static [Operation],
    /// Members rendered as timestamps, wherever they appear in a response.
    pub timestamp_members: &'static [&'static str],
}

impl ServiceModel {
    pub fn operation(&self, action: &str) -> Option<&'static Operation> {
        let wanted = underscore(action);
        self.operations.iter().find(|op| underscore(op.name) == wanted)
    }
}

pub fn model(service: &str) -> Option<&'static ServiceModel> {
    MODELS.iter().find(|m| m.service == service)
}

const fn op(name: &'static str, method: HttpMethod, uri: &'static str) -> Operation {
    Operation { name, method, uri }
}

const fn post(name: &'static str) -> Operation {
    op(name, HttpMethod::Post, "/")
}

static EKS_OPERATIONS: &[Operation] = &[
    op("CreateCluster", Post, "/clusters"),
    op("DeleteCluster", Delete, "/clusters/{name}"),
    op("DescribeCluster", Get, "/clusters/{name}"),
    op("ListClusters", Get, "/clusters"),
    op("UpdateClusterVersion", Post, "/clusters/{name}/updates"),
    op("UpdateClusterConfig", Post, "/clusters/{name}/update-config"),
    op("DescribeUpdate", Get, "/clusters/{name}/updates/{updateId}"),
    op("ListUpdates", Get, "/clusters/{name}/updates"),
    op("CreateNodegroup", Post, "/clusters/{clusterName}/node-groups"),
    op(
        "DeleteNodegroup",
        Delete,
        "/clusters/{clusterName}/node-groups/{nodegroupName}",
    ),
    op(
        "DescribeNodegroup",
        Get,
        "/clusters/{clusterName}/node-groups/{nodegroupName}",
    ),
    op("ListNodegroups", Get, "/clusters/{clusterName}/node-groups"),
    op(
        "UpdateNodegroupConfig",
        Post,
        "/clusters/{clusterName}/node-groups/{nodegroupName}/update-config",
    ),
    op(
        "UpdateNodegroupVersion",
        Post,
        "/clusters/{clusterName}/node-groups/{nodegroupName}/update-version",
    ),
    op("CreateAddon", Post, "/clusters/{clusterName}/addons"),
    op("DeleteAddon", Delete, "/clusters/{clusterName}/addons/{addonName}"),
    op("DescribeAddon", Get, "/clusters/{clusterName}/addons/{addonName}"),
    op("ListAddons", Get, "/clusters/{clusterName}/addons"),
    op("DescribeAddonVersions", Get, "/addons/supported-versions"),
    op("TagResource", Post, "/tags/{resourceArn}"),
    op("UntagResource", Delete, "/tags/{resourceArn}"),
    op("ListTagsForResource", Get, "/tags/{resourceArn}"),
];

static BACKUP_OPERATIONS: &[Operation] = &[
    op("CreateBackupPlan", Put, "/backup/plans/"),
    op("DeleteBackupPlan", Delete, "/backup/plans/{BackupPlanId}"),
    op("GetBackupPlan", Get, "/backup/plans/{BackupPlanId}/"),
    op("ListBackupPlans", Get, "/backup/plans/"),
    op("UpdateBackupPlan", Post, "/backup/plans/{BackupPlanId}"),
    op(
        "CreateBackupSelection",
        Put,
        "/backup/plans/{BackupPlanId}/selections/",
    ),
    op(
        "DeleteBackupSelection",
        Delete,
        "/backup/plans/{BackupPlanId}/selections/{SelectionId}",
    ),
    op(
        "GetBackupSelection",
        Get,
        "/backup/plans/{BackupPlanId}/selections/{SelectionId}",
    ),
    op(
        "ListBackupSelections",
        Get,
        "/backup/plans/{BackupPlanId}/selections/",
    ),
    op("CreateBackupVault", Put, "/backup-vaults/{BackupVaultName}"),
    op("DeleteBackupVault", Delete, "/backup-vaults/{BackupVaultName}"),
    op("DescribeBackupVault", Get, "/backup-vaults/{BackupVaultName}"),
    op("ListBackupVaults", Get, "/backup-vaults/"),
    op("StartBackupJob", Put, "/backup-jobs"),
    op("DescribeBackupJob", Get, "/backup-jobs/{BackupJobId}"),
    op("ListBackupJobs", Get, "/backup-jobs/"),
    op("StopBackupJob", Post, "/backup-jobs/{BackupJobId}"),
    op("StartRestoreJob", Put, "/restore-jobs"),
    op("DescribeRestoreJob", Get, "/restore-jobs/{RestoreJobId}"),
    op("ListRestoreJobs", Get, "/restore-jobs/"),
    op(
        "ListRecoveryPointsByBackupVault",
        Get,
        "/backup-vaults/{BackupVaultName}/recovery-points/",
    ),
    op(
        "DescribeRecoveryPoint",
        Get,
        "/backup-vaults/{BackupVaultName}/recovery-points/{RecoveryPointArn}",
    ),
    op(
        "DeleteRecoveryPoint",
        Delete,
        "/backup-vaults/{BackupVaultName}/recovery-points/{RecoveryPointArn}",
    ),
];

static AUTOSCALING_OPERATIONS: &[Operation] = &[
    post("AttachInstances"),
    post("CreateAutoScalingGroup"),
    post("CreateLaunchConfiguration"),
    post("CreateOrUpdateTags"),
    post("DeleteAutoScalingGroup"),
    post("DeleteLaunchConfiguration"),
    post("DeletePolicy"),
    post("DeleteScheduledAction"),
    post("DeleteTags"),
    post("DescribeAccountLimits"),
    post("DescribeAutoScalingGroups"),
    post("DescribeAutoScalingInstances"),
    post("DescribeLaunchConfigurations"),
    post("DescribePolicies"),
    post("DescribeScalingActivities"),
    post("DescribeScheduledActions"),
    post("DescribeTags"),
    post("DetachInstances"),
    post("ExecutePolicy"),
    post("PutScalingPolicy"),
    post("PutScheduledUpdateGroupAction"),
    post("ResumeProcesses"),
    post("SetDesiredCapacity"),
    post("SuspendProcesses"),
    post("TerminateInstanceInAutoScalingGroup"),
    post("UpdateAutoScalingGroup"),
];

static ELBV2_OPERATIONS: &[Operation] = &[
    post("AddTags"),
    post("CreateListener"),
    post("CreateLoadBalancer"),
    post("CreateRule"),
    post("CreateTargetGroup"),
    post("DeleteListener"),
    post("DeleteLoadBalancer"),
    post("DeleteRule"),
    post("DeleteTargetGroup"),
    post("DeregisterTargets"),
    post("DescribeListeners"),
    post("DescribeLoadBalancerAttributes"),
    post("DescribeLoadBalancers"),
    post("DescribeRules"),
    post("DescribeTags"),
    post("DescribeTargetGroupAttributes"),
    post("DescribeTargetGroups"),
    post("DescribeTargetHealth"),
    post("ModifyListener"),
    post("ModifyLoadBalancerAttributes"),
    post("ModifyRule"),
    post("ModifyTargetGroup"),
    post("ModifyTargetGroupAttributes"),
    post("RegisterTargets"),
    post("RemoveTags"),
    post("SetSecurityGroups"),
    post("SetSubnets"),
];

static PAAS_OPERATIONS: &[Operation] = &[
    post("CreateService"),
    post("DeleteService"),
    post("DescribeServices"),
    post("ModifyService"),
    post("RestartService"),
    post("DescribeServiceClasses"),
    post("DescribeServiceParameters"),
];

static MODELS: &[ServiceModel] = &[
    ServiceModel {
        service: "eks",
        signing_name: "eks",
        protocol: Protocol::RestJson,
        operations: EKS_OPERATIONS,
        timestamp_members: &["createdAt", "modifiedAt"],
    },
    ServiceModel {
        service: "backup",
        signing_name: "backup",
        protocol: Protocol::RestJson,
        operations: BACKUP_OPERATIONS,
        timestamp_members: &[
            "CreationDate",
            "CompletionDate",
            "DeletionDate",
            "ExpectedCompletionDate",
            "LastExecutionDate",
            "LastBackupTime",
            "StartBy",
        ],
    },
    ServiceModel {
        service: "autoscaling",
        signing_name: "autoscaling",
        protocol: Protocol::Query {
            version: "2011-01-01",
        },
        operations: AUTOSCALING_OPERATIONS,
        timestamp_members: &["CreatedTime", "StartTime", "EndTime", "Time"],
    },
    ServiceModel {
        service: "elbv2",
        signing_name: "elasticloadbalancing",
        protocol: Protocol::Query {
            version: "2015-12-01",
        },
        operations: ELBV2_OPERATIONS,
        timestamp_members: &["CreatedTime"],
    },
    ServiceModel {
        service: "paas",
        signing_name: "paas",
        protocol: Protocol::JsonTarget {
            prefix: "PaasService",
        },
        operations: PAAS_OPERATIONS,
        timestamp_members: &["CreatedTime", "ModifiedTime"],
    },
];
