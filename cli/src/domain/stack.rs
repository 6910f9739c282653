//! Declarative stack model and the builder that composes it.
//!
//! The builder is a pure function of [`StackSettings`] and a
//! [`StagedArtifact`]. It performs no I/O; staging happens before it runs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::config::{EnvironmentDescriptor, SecretReference, StackSettings};
use crate::domain::error::{NetworkError, StackError};
use crate::domain::layout::StagedArtifact;
use crate::domain::naming::{ResourceNames, SUFFIX_TAG};
use crate::domain::network::{NetworkDefinition, SubnetAllocation};

// ── Fixed identifiers ────────────────────────────────────────────────────────

pub const TASK_DEFINITION_ID: &str = "TaskDef";
pub const SERVICE_ID: &str = "SpringBoot";
pub const CONTAINER_NAME: &str = "app";
pub const LOG_STREAM_PREFIX: &str = "springboot";
pub const IMAGE_PLATFORM: &str = "linux/amd64";

/// Fargate task size defaults.
pub const FARGATE_CPU_UNITS: u32 = 256;
pub const FARGATE_MEMORY_MIB: u32 = 512;

// ── Protocols ────────────────────────────────────────────────────────────────

/// Load-balancer (layer 7) protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationProtocol {
    Http,
    Https,
}

impl fmt::Display for ApplicationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => f.write_str("HTTP"),
            Self::Https => f.write_str("HTTPS"),
        }
    }
}

/// Container port-mapping (layer 4) protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Udp => f.write_str("udp"),
        }
    }
}

// ── Resources ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterDefinition {
    pub cluster_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogDestination {
    pub log_group_name: String,
    pub stream_prefix: String,
}

/// Container image built from a local directory by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    pub context_dir: PathBuf,
    pub platform: String,
    /// Hash of the staged agent jar; doubles as the image tag.
    pub asset_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    pub container_port: u16,
    pub protocol: TransportProtocol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerDefinition {
    pub name: String,
    pub image: ImageAsset,
    pub memory_reservation_mib: u32,
    pub environment: BTreeMap<String, String>,
    /// Variable name → secret handle. Values are resolved at task start.
    pub secrets: BTreeMap<String, SecretReference>,
    pub port_mappings: Vec<PortMapping>,
    pub logging: LogDestination,
}

impl ContainerDefinition {
    /// The first mapped container port.
    #[must_use]
    pub fn exposed_port(&self) -> Option<u16> {
        self.port_mappings.first().map(|m| m.container_port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDefinition {
    pub id: String,
    pub cpu: u32,
    pub memory_mib: u32,
    pub container: ContainerDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub path: String,
    pub interval_secs: u32,
    pub unhealthy_threshold: u32,
    /// Traffic port, string-encoded as the load balancer expects.
    pub port: String,
    pub protocol: ApplicationProtocol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Listener {
    pub protocol: ApplicationProtocol,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetGroup {
    pub protocol: ApplicationProtocol,
    pub port: u16,
    health_check: Option<HealthCheck>,
}

impl TargetGroup {
    #[must_use]
    pub fn new(protocol: ApplicationProtocol, port: u16) -> Self {
        Self {
            protocol,
            port,
            health_check: None,
        }
    }

    /// Attach the health check. A target group carries a single health
    /// check; configuring again replaces the previous one.
    pub fn configure_health_check(&mut self, health_check: HealthCheck) {
        self.health_check = Some(health_check);
    }

    #[must_use]
    pub fn health_check(&self) -> Option<&HealthCheck> {
        self.health_check.as_ref()
    }
}

/// Fargate service fronted by an internet-facing application load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinition {
    pub id: String,
    pub desired_count: u32,
    pub listener: Listener,
    pub target_group: TargetGroup,
}

impl ServiceDefinition {
    /// HTTP listener and HTTP target group, both on `port`.
    #[must_use]
    pub fn load_balanced(id: &str, port: u16, desired_count: u32) -> Self {
        Self {
            id: id.to_string(),
            desired_count,
            listener: Listener {
                protocol: ApplicationProtocol::Http,
                port,
            },
            target_group: TargetGroup::new(ApplicationProtocol::Http, port),
        }
    }
}

/// The complete, immutable declaration handed to the external resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentStack {
    pub stack_name: String,
    pub environment: EnvironmentDescriptor,
    pub names: ResourceNames,
    pub network: NetworkDefinition,
    pub subnets: Vec<SubnetAllocation>,
    pub cluster: ClusterDefinition,
    pub log_destination: LogDestination,
    pub secret: SecretReference,
    pub task_definition: TaskDefinition,
    pub service: ServiceDefinition,
    pub tags: BTreeMap<String, String>,
}

// ── Builder ──────────────────────────────────────────────────────────────────

/// Composes a [`DeploymentStack`] from settings.
pub struct StackBuilder<'a> {
    settings: &'a StackSettings,
}

impl<'a> StackBuilder<'a> {
    #[must_use]
    pub fn new(settings: &'a StackSettings) -> Self {
        Self { settings }
    }

    /// Environment-scoped names for these settings.
    #[must_use]
    pub fn names(&self) -> ResourceNames {
        ResourceNames::resolve(&self.settings.environment.suffix)
    }

    /// The VPC for these settings and its allocated subnets.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured block cannot hold the subnets.
    pub fn network(&self) -> Result<(NetworkDefinition, Vec<SubnetAllocation>), NetworkError> {
        let network = NetworkDefinition::configured(&self.names().vpc, &self.settings.network);
        network.validate()?;
        let subnets = network.allocate()?;
        Ok((network, subnets))
    }

    /// Build network, cluster, task definition and service, then attach the
    /// health check to the service's target group.
    ///
    /// # Errors
    ///
    /// Returns an error if the network cannot be laid out.
    pub fn compose(&self, artifact: &StagedArtifact) -> Result<DeploymentStack, StackError> {
        let names = self.names();
        let (network, subnets) = self.network()?;

        let cluster = ClusterDefinition {
            cluster_name: names.cluster.clone(),
        };
        let log_destination = LogDestination {
            log_group_name: names.log_group.clone(),
            stream_prefix: LOG_STREAM_PREFIX.to_string(),
        };

        let port = self.settings.container.server_port;
        let task_definition = TaskDefinition {
            id: TASK_DEFINITION_ID.to_string(),
            cpu: FARGATE_CPU_UNITS,
            memory_mib: FARGATE_MEMORY_MIB,
            container: self.container(artifact, &log_destination),
        };

        let mut service =
            ServiceDefinition::load_balanced(SERVICE_ID, port, self.settings.service.desired_count);
        service.target_group.configure_health_check(self.health_check());

        let mut tags = BTreeMap::new();
        if let Some(suffix) = self.settings.environment.suffix.as_str() {
            tags.insert(SUFFIX_TAG.to_string(), suffix.to_string());
        }

        Ok(DeploymentStack {
            stack_name: names.stack.clone(),
            environment: self.settings.environment.clone(),
            names,
            network,
            subnets,
            cluster,
            log_destination,
            secret: self.settings.secret.clone(),
            task_definition,
            service,
            tags,
        })
    }

    fn container(&self, artifact: &StagedArtifact, logging: &LogDestination) -> ContainerDefinition {
        let container = &self.settings.container;
        let environment = BTreeMap::from([
            (
                "AWS_REGION".to_string(),
                self.settings.environment.region_or_unknown().to_string(),
            ),
            ("SERVER_PORT".to_string(), container.server_port.to_string()),
            (
                "LUMIGO_DEBUG_SPANDUMP".to_string(),
                container.debug_spandump.clone(),
            ),
        ]);
        let secrets = BTreeMap::from([(
            self.settings.secret.env_var.clone(),
            self.settings.secret.clone(),
        )]);

        ContainerDefinition {
            name: CONTAINER_NAME.to_string(),
            image: ImageAsset {
                context_dir: artifact.context_dir.clone(),
                platform: IMAGE_PLATFORM.to_string(),
                asset_hash: artifact.sha256.clone(),
            },
            memory_reservation_mib: container.memory_reservation_mib,
            environment,
            secrets,
            port_mappings: vec![PortMapping {
                container_port: container.server_port,
                protocol: TransportProtocol::Tcp,
            }],
            logging: logging.clone(),
        }
    }

    fn health_check(&self) -> HealthCheck {
        let hc = &self.settings.health_check;
        HealthCheck {
            path: hc.path.clone(),
            interval_secs: hc.interval_secs,
            unhealthy_threshold: hc.unhealthy_threshold,
            port: self.settings.container.server_port.to_string(),
            protocol: ApplicationProtocol::Http,
        }
    }
}
