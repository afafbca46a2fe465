// src/fleet/grouping.rs

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::fleet::reader::RunningTaskSnapshot;
use crate::types::TaskStatus;

/// Family name of a task-definition ARN.
///
/// `arn:aws:ecs:us-west-1:123:task-definition/Video_Mix:7` → `Video_Mix`.
/// A bare `family:revision` or plain family name works as well.
pub fn task_definition_family(arn: &str) -> &str {
    let last = arn.rsplit('/').next().unwrap_or(arn);
    last.split(':').next().unwrap_or(last)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupMember {
    pub task_arn: String,
    pub status: TaskStatus,
    pub created_at: Option<DateTime<Utc>>,
}

/// Running tasks sharing one task-definition family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskGroup {
    pub name: String,
    pub count: usize,
    pub members: Vec<GroupMember>,
}

/// Group snapshots by family, keeping families in first-seen order and
/// members in input order.
pub fn group_by_family(tasks: &[RunningTaskSnapshot]) -> Vec<TaskGroup> {
    let mut groups: Vec<TaskGroup> = Vec::new();

    for task in tasks {
        let member = GroupMember {
            task_arn: task.task_arn.clone(),
            status: task.last_status,
            created_at: task.created_at,
        };

        match groups
            .iter_mut()
            .find(|g| g.name == task.task_definition_family)
        {
            Some(group) => {
                group.members.push(member);
                group.count += 1;
            }
            None => groups.push(TaskGroup {
                name: task.task_definition_family.clone(),
                count: 1,
                members: vec![member],
            }),
        }
    }

    groups
}
