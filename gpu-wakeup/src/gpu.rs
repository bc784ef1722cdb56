//! GPU container operations: status query and restart.

use std::sync::Arc;

use crate::config::{CommandsConfig, InstancesConfig};
use crate::exec::CommandRunner;
use crate::instance::{InstanceError, InstanceId, InstanceRange};

/// Status and restart operations over the configured instances.
pub struct GpuOperations {
    runner: Arc<dyn CommandRunner>,
    range: InstanceRange,
    container_prefix: String,
    status_template: String,
    restart_template: String,
}

impl GpuOperations {
    pub fn new(
        instances: &InstancesConfig,
        commands: &CommandsConfig,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, InstanceError> {
        Ok(Self {
            runner,
            range: InstanceRange::new(instances.from, instances.to)?,
            container_prefix: instances.container_prefix.clone(),
            status_template: commands.status.clone(),
            restart_template: commands.restart.clone(),
        })
    }

    pub fn range(&self) -> InstanceRange {
        self.range
    }

    /// Container name for an instance, e.g. `hufs02`.
    pub fn container_name(&self, id: InstanceId) -> String {
        format!("{}{}", self.container_prefix, id)
    }

    fn render(&self, template: &str, id: InstanceId) -> String {
        template
            .replace("{container}", &self.container_name(id))
            .replace("{no}", &id.to_string())
    }

    /// Validate `raw` and return the status command's stdout.
    pub async fn get_status(&self, raw: Option<&str>) -> Result<String, InstanceError> {
        let id = self.range.validate(raw)?;
        Ok(self.status_of(id).await)
    }

    /// Validate `raw`, restart the container, then return a fresh status.
    pub async fn reset_instance(&self, raw: Option<&str>) -> Result<String, InstanceError> {
        let id = self.range.validate(raw)?;

        let command = self.render(&self.restart_template, id);
        tracing::info!(instance = %id, command = %command, "restarting instance");
        let result = self.runner.run(&command).await;
        if !result.succeeded() {
            tracing::warn!(
                instance = %id,
                exit_code = result.exit_code,
                "restart command did not exit cleanly"
            );
        }

        Ok(self.status_of(id).await)
    }

    async fn status_of(&self, id: InstanceId) -> String {
        let command = self.render(&self.status_template, id);
        let result = self.runner.run(&command).await;
        if !result.stderr.is_empty() {
            tracing::debug!(instance = %id, stderr = %result.stderr.trim(), "status command stderr");
        }
        result.stdout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandResult;
    use crate::test_util::RecordingRunner;

    fn operations(runner: Arc<RecordingRunner>) -> GpuOperations {
        GpuOperations::new(
            &InstancesConfig::default(),
            &CommandsConfig::default(),
            runner,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_status_runs_status_command_once() {
        let runner = Arc::new(RecordingRunner::with_stdout("GPU OK"));
        let ops = operations(runner.clone());

        let stdout = ops.get_status(Some("2")).await.unwrap();

        assert_eq!(stdout, "GPU OK");
        assert_eq!(runner.commands(), vec!["docker exec hufs02 nvidia-smi"]);
    }

    #[tokio::test]
    async fn test_every_valid_instance_addresses_its_container() {
        for n in 1..=4 {
            let runner = Arc::new(RecordingRunner::with_stdout(""));
            let ops = operations(runner.clone());
            ops.get_status(Some(&n.to_string())).await.unwrap();
            assert_eq!(runner.commands(), vec![format!("docker exec hufs0{n} nvidia-smi")]);
        }
    }

    #[tokio::test]
    async fn test_invalid_instance_runs_nothing() {
        let runner = Arc::new(RecordingRunner::with_stdout("GPU OK"));
        let ops = operations(runner.clone());

        for raw in [Some("0"), Some("5"), Some("abc"), Some("1;reboot"), None] {
            assert!(ops.get_status(raw).await.is_err());
            assert!(ops.reset_instance(raw).await.is_err());
        }
        assert!(runner.commands().is_empty());
    }

    #[tokio::test]
    async fn test_reset_restarts_then_queries() {
        let runner = Arc::new(RecordingRunner::with_results(vec![
            CommandResult {
                stdout: "hufs03\n".to_string(),
                ..Default::default()
            },
            CommandResult {
                stdout: "fresh status".to_string(),
                ..Default::default()
            },
        ]));
        let ops = operations(runner.clone());

        let stdout = ops.reset_instance(Some("3")).await.unwrap();

        assert_eq!(stdout, "fresh status");
        assert_eq!(
            runner.commands(),
            vec!["docker restart hufs03", "docker exec hufs03 nvidia-smi"]
        );
    }

    #[tokio::test]
    async fn test_failed_commands_still_return_stdout() {
        let runner = Arc::new(RecordingRunner::with_results(vec![
            CommandResult {
                stderr: "restart failed".to_string(),
                exit_code: 1,
                ..Default::default()
            },
            CommandResult {
                stdout: "Failed to initialize NVML: Unknown Error".to_string(),
                stderr: "noise".to_string(),
                exit_code: 255,
            },
        ]));
        let ops = operations(runner);

        let stdout = ops.reset_instance(Some("1")).await.unwrap();
        assert_eq!(stdout, "Failed to initialize NVML: Unknown Error");
    }

    #[tokio::test]
    async fn test_templates_expand_number_and_container() {
        let runner = Arc::new(RecordingRunner::with_stdout(""));
        let commands = CommandsConfig {
            status: "ssh gpu-host docker exec {container} nvidia-smi -i {no}".to_string(),
            restart: "docker restart {container}".to_string(),
        };
        let instances = InstancesConfig {
            from: 10,
            to: 12,
            container_prefix: "worker-".to_string(),
        };
        let ops = GpuOperations::new(&instances, &commands, runner.clone()).unwrap();

        ops.get_status(Some("11")).await.unwrap();
        assert_eq!(
            runner.commands(),
            vec!["ssh gpu-host docker exec worker-11 nvidia-smi -i 11"]
        );
    }
}
