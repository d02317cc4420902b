//! Client descriptor registry.
//!
//! The set of programs is closed and known at compile time: each binary
//! (`c2-ec2`, `c2-eks`, ...) resolves its own descriptor from this table.

use crate::{Error, Result};

/// Prefix shared by every installed binary name.
pub const PROGRAM_PREFIX: &str = "c2-";

/// Which transport adapter serves a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// XML/RPC over query string, raw action names.
    Legacy,
    /// Structured calls addressed by named operations.
    Modern,
}

/// Static registration record for one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescriptor {
    /// Short identity, e.g. `ec2`.
    pub name: &'static str,
    /// Environment variable holding the endpoint URL.
    pub url_key: &'static str,
    /// Service identifier understood by the transport layer.
    pub service: &'static str,
    pub kind: TransportKind,
}

impl ClientDescriptor {
    /// Installed binary name, e.g. `c2-ec2`.
    pub fn program(&self) -> String {
        format!("{}{}", PROGRAM_PREFIX, self.name)
    }
}

static DESCRIPTORS: &[ClientDescriptor] = &[
    ClientDescriptor {
        name: "ec2",
        url_key: "EC2_URL",
        service: "ec2",
        kind: TransportKind::Legacy,
    },
    ClientDescriptor {
        name: "cw",
        url_key: "AWS_CLOUDWATCH_URL",
        service: "cw",
        kind: TransportKind::Legacy,
    },
    ClientDescriptor {
        name: "ct",
        url_key: "AWS_CLOUDTRAIL_URL",
        service: "ct",
        kind: TransportKind::Legacy,
    },
    ClientDescriptor {
        name: "eks",
        url_key: "EKS_URL",
        service: "eks",
        kind: TransportKind::Modern,
    },
    ClientDescriptor {
        name: "as",
        url_key: "AUTO_SCALING_URL",
        service: "autoscaling",
        kind: TransportKind::Modern,
    },
    ClientDescriptor {
        name: "elb",
        url_key: "ELB_URL",
        service: "elbv2",
        kind: TransportKind::Modern,
    },
    ClientDescriptor {
        name: "bs",
        url_key: "BS_URL",
        service: "backup",
        kind: TransportKind::Modern,
    },
    ClientDescriptor {
        name: "paas",
        url_key: "PAAS_URL",
        service: "paas",
        kind: TransportKind::Modern,
    },
];

/// All registered descriptors, in registration order.
pub fn descriptors() -> &'static [ClientDescriptor] {
    DESCRIPTORS
}

/// Resolve a program identity (`ec2` or `c2-ec2`).
pub fn lookup(identity: &str) -> Result<&'static ClientDescriptor> {
    let name = identity.strip_prefix(PROGRAM_PREFIX).unwrap_or(identity);
    DESCRIPTORS
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| Error::UnknownClient(identity.to_string()))
}
