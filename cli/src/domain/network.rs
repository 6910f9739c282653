//! VPC definition and subnet address allocation.
//!
//! Pure functions only, no I/O.

use std::collections::HashSet;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::NetworkError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_MAX_AZS: u8 = 3;
pub const DEFAULT_NAT_GATEWAYS: u8 = 1;
pub const DEFAULT_SUBNET_MASK: u8 = 24;

// ── CIDR ─────────────────────────────────────────────────────────────────────

/// An IPv4 network block, always stored with host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    /// # Errors
    ///
    /// Returns an error if `prefix` is greater than 32.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, NetworkError> {
        if prefix > 32 {
            return Err(NetworkError::InvalidCidr(format!("{addr}/{prefix}")));
        }
        let network = Ipv4Addr::from(u32::from(addr) & mask_bits(prefix));
        Ok(Self { network, prefix })
    }

    #[must_use]
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    #[must_use]
    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of addresses in the block.
    #[must_use]
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    fn start(&self) -> u64 {
        u64::from(u32::from(self.network))
    }

    fn end(&self) -> u64 {
        self.start() + self.size()
    }

    /// Whether `other` lies entirely inside this block.
    #[must_use]
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix >= self.prefix && other.start() >= self.start() && other.end() <= self.end()
    }

    /// Whether the two blocks share any address.
    #[must_use]
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

fn mask_bits(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkError::InvalidCidr(s.to_string());
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Self::new(addr, prefix).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Ipv4Cidr {
    type Error = NetworkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ipv4Cidr> for String {
    fn from(cidr: Ipv4Cidr) -> Self {
        cidr.to_string()
    }
}

// ── Subnet configuration ─────────────────────────────────────────────────────

/// Routing role of a subnet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubnetRole {
    /// Private subnets routing outbound traffic through the NAT gateway.
    PrivateWithEgress,
    /// Public subnets routing through the internet gateway.
    Public,
}

impl fmt::Display for SubnetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetRole::PrivateWithEgress => f.write_str("PRIVATE_WITH_EGRESS"),
            SubnetRole::Public => f.write_str("PUBLIC"),
        }
    }
}

/// One subnet group, replicated across every AZ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetConfiguration {
    pub name: String,
    pub role: SubnetRole,
    pub cidr_mask: u8,
}

/// A concrete subnet carved out of the VPC block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubnetAllocation {
    /// Name of the subnet group this subnet belongs to.
    pub group: String,
    pub role: SubnetRole,
    /// Zero-based availability-zone index.
    pub az_index: u8,
    pub cidr: Ipv4Cidr,
}

// ── Settings ─────────────────────────────────────────────────────────────────

/// The tunable part of the VPC, as stored under `network:` in the settings
/// file. NAT gateway count and subnet group names are fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub cidr: Ipv4Cidr,
    pub max_azs: u8,
    pub private_subnet_mask: u8,
    pub public_subnet_mask: u8,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            cidr: Ipv4Cidr {
                network: Ipv4Addr::new(10, 0, 0, 0),
                prefix: 16,
            },
            max_azs: DEFAULT_MAX_AZS,
            private_subnet_mask: DEFAULT_SUBNET_MASK,
            public_subnet_mask: DEFAULT_SUBNET_MASK,
        }
    }
}

// ── Network ──────────────────────────────────────────────────────────────────

/// The VPC: one block, a fixed AZ count, NAT gateways and subnet groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkDefinition {
    pub vpc_name: String,
    pub cidr: Ipv4Cidr,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub subnets: Vec<SubnetConfiguration>,
}

impl NetworkDefinition {
    /// The integration-test topology: 10.0.0.0/16 over three AZs, one NAT
    /// gateway, a private-with-egress and a public /24 group.
    #[must_use]
    pub fn standard(vpc_name: &str) -> Self {
        Self::configured(vpc_name, &NetworkSettings::default())
    }

    /// The integration-test topology with the block, AZ count and subnet
    /// masks taken from `settings`.
    #[must_use]
    pub fn configured(vpc_name: &str, settings: &NetworkSettings) -> Self {
        Self {
            vpc_name: vpc_name.to_string(),
            cidr: settings.cidr,
            max_azs: settings.max_azs,
            nat_gateways: DEFAULT_NAT_GATEWAYS,
            subnets: vec![
                SubnetConfiguration {
                    name: "private-subnet".to_string(),
                    role: SubnetRole::PrivateWithEgress,
                    cidr_mask: settings.private_subnet_mask,
                },
                SubnetConfiguration {
                    name: "public-subnet".to_string(),
                    role: SubnetRole::Public,
                    cidr_mask: settings.public_subnet_mask,
                },
            ],
        }
    }

    /// Check that there is at least one AZ, both subnet roles exist and
    /// group names are unique.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first violated rule.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.max_azs == 0 {
            return Err(NetworkError::NoAvailabilityZones);
        }
        for role in [SubnetRole::PrivateWithEgress, SubnetRole::Public] {
            if !self.subnets.iter().any(|s| s.role == role) {
                return Err(NetworkError::MissingRole(role));
            }
        }
        let mut seen = HashSet::new();
        for subnet in &self.subnets {
            if !seen.insert(subnet.name.as_str()) {
                return Err(NetworkError::DuplicateSubnet(subnet.name.clone()));
            }
        }
        Ok(())
    }

    /// Carve one subnet per (group × AZ) out of the VPC block.
    ///
    /// Groups are allocated in declaration order, AZs in index order, each
    /// subnet at the next address aligned to its own size.
    ///
    /// # Errors
    ///
    /// Returns an error if a mask is wider than the VPC mask or the block
    /// runs out of addresses.
    pub fn allocate(&self) -> Result<Vec<SubnetAllocation>, NetworkError> {
        let mut cursor = self.cidr.start();
        let mut allocated = Vec::with_capacity(self.subnets.len() * usize::from(self.max_azs));

        for group in &self.subnets {
            if group.cidr_mask < self.cidr.prefix || group.cidr_mask > 32 {
                return Err(NetworkError::MaskTooWide {
                    mask: group.cidr_mask,
                    vpc_mask: self.cidr.prefix,
                });
            }
            let size = 1u64 << (32 - u32::from(group.cidr_mask));
            for az_index in 0..self.max_azs {
                cursor = cursor.div_ceil(size) * size;
                if cursor + size > self.cidr.end() {
                    return Err(NetworkError::Exhausted {
                        cidr: self.cidr.to_string(),
                        mask: group.cidr_mask,
                        allocated: allocated.len(),
                    });
                }
                let addr = u32::try_from(cursor).map_err(|_| NetworkError::Exhausted {
                    cidr: self.cidr.to_string(),
                    mask: group.cidr_mask,
                    allocated: allocated.len(),
                })?;
                allocated.push(SubnetAllocation {
                    group: group.name.clone(),
                    role: group.role,
                    az_index,
                    cidr: Ipv4Cidr::new(Ipv4Addr::from(addr), group.cidr_mask)?,
                });
                cursor += size;
            }
        }
        Ok(allocated)
    }
}
