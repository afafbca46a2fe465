// src/provider/ecs.rs

//! AWS ECS implementation of the provider traits.
//!
//! - `RunTask` is issued with `count = 1`, awsvpc networking and a single
//!   capacity-provider strategy item (Fargate Spot by default).
//! - `ListTasks` / `DescribeTasks` back the fleet view.
//!
//! SDK errors are flattened into a message with `DisplayErrorContext` and
//! classified via [`ProviderError::classify`].

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, CapacityProviderStrategyItem, NetworkConfiguration, Task,
};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::ClusterSettings;

use super::{LaunchReply, ProviderError, TaskDescription, TaskLaunchApi, TaskStatusApi};

/// ECS client plus the networking settings every launch needs.
#[derive(Debug, Clone)]
pub struct EcsClient {
    client: aws_sdk_ecs::Client,
    subnets: Vec<String>,
    security_groups: Vec<String>,
    capacity_provider: String,
    assign_public_ip: bool,
}

impl EcsClient {
    /// Build a client from the default AWS credential chain, pinned to the
    /// configured region.
    pub async fn from_env(cluster: &ClusterSettings) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(cluster.region.clone()))
            .load()
            .await;

        info!(region = %cluster.region, cluster = %cluster.name, "ECS client initialised");

        Self::with_client(aws_sdk_ecs::Client::new(&sdk_config), cluster)
    }

    pub fn with_client(client: aws_sdk_ecs::Client, cluster: &ClusterSettings) -> Self {
        Self {
            client,
            subnets: cluster.subnets.clone(),
            security_groups: cluster.security_groups.clone(),
            capacity_provider: cluster.capacity_provider.clone(),
            assign_public_ip: cluster.assign_public_ip,
        }
    }

    fn network_configuration(&self) -> Result<NetworkConfiguration, ProviderError> {
        if self.subnets.is_empty() {
            return Err(ProviderError::unexpected(
                "no subnets configured; set [cluster].subnets or TASKFLEET_SUBNET_ID",
            ));
        }

        let public_ip = if self.assign_public_ip {
            AssignPublicIp::Enabled
        } else {
            AssignPublicIp::Disabled
        };

        let vpc = AwsVpcConfiguration::builder()
            .set_subnets(Some(self.subnets.clone()))
            .set_security_groups(Some(self.security_groups.clone()))
            .assign_public_ip(public_ip)
            .build()
            .map_err(|e| ProviderError::unexpected(e.to_string()))?;

        Ok(NetworkConfiguration::builder()
            .awsvpc_configuration(vpc)
            .build())
    }

    fn capacity_strategy(&self) -> Result<CapacityProviderStrategyItem, ProviderError> {
        CapacityProviderStrategyItem::builder()
            .capacity_provider(&self.capacity_provider)
            .weight(1)
            .base(0)
            .build()
            .map_err(|e| ProviderError::unexpected(e.to_string()))
    }
}

#[async_trait]
impl TaskLaunchApi for EcsClient {
    async fn launch(
        &self,
        cluster: &str,
        task_definition: &str,
    ) -> Result<LaunchReply, ProviderError> {
        let network = self.network_configuration()?;
        let strategy = self.capacity_strategy()?;

        let output = self
            .client
            .run_task()
            .cluster(cluster)
            .task_definition(task_definition)
            .count(1)
            .network_configuration(network)
            .capacity_provider_strategy(strategy)
            .send()
            .await
            .map_err(|e| ProviderError::classify(DisplayErrorContext(&e).to_string()))?;

        if let Some(task) = output.tasks().first() {
            return Ok(LaunchReply::Accepted {
                task_arn: task.task_arn().map(str::to_string),
            });
        }

        let reason = output
            .failures()
            .first()
            .and_then(|f| f.reason())
            .unwrap_or("no task returned by provider")
            .to_string();

        Ok(LaunchReply::Rejected { reason })
    }
}

#[async_trait]
impl TaskStatusApi for EcsClient {
    async fn list_running(
        &self,
        cluster: &str,
        max_results: u32,
    ) -> Result<Vec<String>, ProviderError> {
        let output = self
            .client
            .list_tasks()
            .cluster(cluster)
            .max_results(max_results as i32)
            .send()
            .await
            .map_err(|e| ProviderError::classify(DisplayErrorContext(&e).to_string()))?;

        Ok(output.task_arns().to_vec())
    }

    async fn describe(
        &self,
        cluster: &str,
        task_ids: &[String],
    ) -> Result<Vec<TaskDescription>, ProviderError> {
        let output = self
            .client
            .describe_tasks()
            .cluster(cluster)
            .set_tasks(Some(task_ids.to_vec()))
            .send()
            .await
            .map_err(|e| ProviderError::classify(DisplayErrorContext(&e).to_string()))?;

        for failure in output.failures() {
            debug!(
                arn = failure.arn().unwrap_or_default(),
                reason = failure.reason().unwrap_or_default(),
                "describe skipped task"
            );
        }

        Ok(output.tasks().iter().map(describe_task).collect())
    }
}

fn describe_task(task: &Task) -> TaskDescription {
    TaskDescription {
        task_arn: task.task_arn().unwrap_or_default().to_string(),
        task_definition_arn: task.task_definition_arn().unwrap_or_default().to_string(),
        last_status: task.last_status().unwrap_or_default().to_string(),
        desired_status: task.desired_status().map(str::to_string),
        cpu: task.cpu().map(str::to_string),
        memory: task.memory().map(str::to_string),
        created_at: task
            .created_at()
            .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos())),
    }
}
