//! Construct fair queues from scheduler configuration.

use std::collections::HashMap;

use crate::config::SchedulerConfig;
use crate::core::{FairQueue, FairQueueError};

/// Build one [`FairQueue`] per named entry in the scheduler configuration.
///
/// # Errors
///
/// Returns [`FairQueueError::InvalidConfig`] when the configuration fails
/// validation (no queues, or a zero capacity/decay dimension).
pub fn build_queues(cfg: &SchedulerConfig) -> Result<HashMap<String, FairQueue>, FairQueueError> {
    cfg.validate().map_err(FairQueueError::InvalidConfig)?;

    let mut queues = HashMap::new();
    for (name, queue_cfg) in &cfg.queues {
        tracing::debug!(queue = %name, "building fair queue");
        queues.insert(name.clone(), FairQueue::new(queue_cfg.clone()));
    }

    Ok(queues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResourceTicket;

    #[test]
    fn builds_one_queue_per_config_entry() {
        let cfg = SchedulerConfig::from_json_str(
            r#"{"queues": {
                "disk": {"max_req_count": 128, "max_bytes_count": 1048576},
                "net": {"tau_ms": 50}
            }}"#,
        )
        .unwrap();
        let queues = build_queues(&cfg).unwrap();
        assert_eq!(queues.len(), 2);
        assert!(queues.contains_key("disk"));
        assert!(queues.contains_key("net"));
    }

    #[test]
    fn built_queue_is_usable() {
        let cfg = SchedulerConfig::from_json_str(
            r#"{"queues": {"disk": {"max_req_count": 2, "max_bytes_count": 4096}}}"#,
        )
        .unwrap();
        let mut queues = build_queues(&cfg).unwrap();
        let disk = queues.get_mut("disk").unwrap();
        let pc = disk.register_priority_class(1);
        disk.queue(&pc, ResourceTicket::new(1, 512), Box::new(|| Ok(())));
        disk.dispatch_requests();
        assert_eq!(disk.requests_currently_executing(), 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cfg = SchedulerConfig {
            queues: HashMap::new(),
        };
        let err = build_queues(&cfg).unwrap_err();
        assert!(err.to_string().contains("at least one queue"));
    }
}
