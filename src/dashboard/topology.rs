//! Topology card
//!
//! Cloud resources grouped by provider, with cost and status roll-ups

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Provider {
    Aws,
    Gcp,
    Azure,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Aws, Provider::Gcp, Provider::Azure];

    pub fn label(&self) -> &'static str {
        match self {
            Provider::Aws => "AWS",
            Provider::Gcp => "GCP",
            Provider::Azure => "Azure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
    Server,
    Database,
    Storage,
    Network,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceStatus {
    Running,
    Stopped,
    Pending,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub status: ResourceStatus,
    pub provider: Provider,
    pub region: String,
    pub cost: f64,
}

/// Resources per provider; also the response of `GET /usage/`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub aws: Vec<CloudResource>,
    #[serde(default)]
    pub gcp: Vec<CloudResource>,
    #[serde(default)]
    pub azure: Vec<CloudResource>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Response of `GET /usage/cost-summary`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct UsageCostSummary {
    pub total_cost: f64,
    #[serde(default)]
    pub aws_cost: f64,
    #[serde(default)]
    pub gcp_cost: f64,
    #[serde(default)]
    pub azure_cost: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResourceStatusCounts {
    pub running: usize,
    pub stopped: usize,
    pub pending: usize,
    pub error: usize,
}

impl Topology {
    pub fn resources(&self, provider: Provider) -> &[CloudResource] {
        match provider {
            Provider::Aws => &self.aws,
            Provider::Gcp => &self.gcp,
            Provider::Azure => &self.azure,
        }
    }

    pub fn all_resources(&self) -> impl Iterator<Item = &CloudResource> {
        Provider::ALL
            .into_iter()
            .flat_map(move |provider| self.resources(provider).iter())
    }

    pub fn provider_cost(&self, provider: Provider) -> f64 {
        self.resources(provider).iter().map(|r| r.cost).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.all_resources().map(|r| r.cost).sum()
    }

    pub fn resource_count(&self) -> usize {
        self.aws.len() + self.gcp.len() + self.azure.len()
    }

    pub fn status_counts(&self) -> ResourceStatusCounts {
        self.all_resources()
            .fold(ResourceStatusCounts::default(), |mut counts, resource| {
                match resource.status {
                    ResourceStatus::Running => counts.running += 1,
                    ResourceStatus::Stopped => counts.stopped += 1,
                    ResourceStatus::Pending => counts.pending += 1,
                    ResourceStatus::Error => counts.error += 1,
                }
                counts
            })
    }

    pub fn select_resource(&self, id: &str) -> Option<&CloudResource> {
        self.all_resources().find(|resource| resource.id == id)
    }
}

fn resource(
    id: &str,
    name: &str,
    resource_type: ResourceType,
    status: ResourceStatus,
    provider: Provider,
    region: &str,
    cost: f64,
) -> CloudResource {
    CloudResource {
        id: id.to_string(),
        name: name.to_string(),
        resource_type,
        status,
        provider,
        region: region.to_string(),
        cost,
    }
}

/// Topology shown when the API is unavailable.
pub fn fixture() -> Topology {
    use Provider::*;
    use ResourceStatus::*;
    use ResourceType::*;
    Topology {
        aws: vec![
            resource("aws-vm1", "Web Server", Server, Running, Aws, "us-east-1", 120.0),
            resource("aws-db1", "Primary DB", Database, Running, Aws, "us-east-1", 340.0),
            resource("aws-s3", "File Storage", Storage, Running, Aws, "us-east-1", 45.0),
            resource("aws-lb", "Load Balancer", Network, Running, Aws, "us-east-1", 18.0),
        ],
        gcp: vec![
            resource("gcp-vm1", "App Server", Server, Running, Gcp, "us-central1", 95.0),
            resource("gcp-db1", "Analytics DB", Database, Running, Gcp, "us-central1", 280.0),
            resource("gcp-k8s", "Kubernetes", Container, Running, Gcp, "us-central1", 156.0),
        ],
        azure: vec![
            resource("azure-vm1", "Backup Server", Server, Stopped, Azure, "eastus", 0.0),
            resource("azure-db1", "Cache DB", Database, Running, Azure, "eastus", 78.0),
            resource("azure-storage", "Archive Storage", Storage, Running, Azure, "eastus", 23.0),
        ],
        last_updated: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costs_roll_up_per_provider() {
        let topology = fixture();
        assert_eq!(topology.provider_cost(Provider::Aws), 523.0);
        assert_eq!(topology.provider_cost(Provider::Gcp), 531.0);
        assert_eq!(topology.provider_cost(Provider::Azure), 101.0);
        assert_eq!(topology.total_cost(), 1155.0);
    }

    #[test]
    fn test_counts() {
        let topology = fixture();
        assert_eq!(topology.resource_count(), 10);
        assert_eq!(
            topology.status_counts(),
            ResourceStatusCounts {
                running: 9,
                stopped: 1,
                pending: 0,
                error: 0
            }
        );
    }

    #[test]
    fn test_select_resource_searches_every_provider() {
        let topology = fixture();
        let selected = topology.select_resource("azure-vm1").unwrap();
        assert_eq!(selected.name, "Backup Server");
        assert_eq!(selected.provider, Provider::Azure);
        assert!(topology.select_resource("aws-nope").is_none());
    }

    #[test]
    fn test_empty_topology() {
        let topology = Topology::default();
        assert_eq!(topology.total_cost(), 0.0);
        assert_eq!(topology.resource_count(), 0);
    }

    #[test]
    fn test_usage_response_decodes_type_field() {
        let json = r#"{
            "aws": [{
                "id": "i-1", "name": "web", "type": "server", "status": "pending",
                "provider": "aws", "region": "us-east-1", "cost": 12.5,
                "created_at": "2024-01-01T00:00:00", "updated_at": "2024-01-02T00:00:00"
            }],
            "gcp": [], "azure": [], "total_cost": 12.5,
            "last_updated": "2024-01-21T00:00:00"
        }"#;
        let topology: Topology = serde_json::from_str(json).unwrap();
        assert_eq!(topology.aws[0].resource_type, ResourceType::Server);
        assert_eq!(topology.aws[0].status, ResourceStatus::Pending);
    }
}
