use super::{Access, PveClient, require_non_blank};
use crate::error::Error;
use crate::models::{Task, TaskQuery, TaskStatus, Upid};

impl PveClient {
    /// Recent tasks on a node, newest first.
    ///
    /// `GET /nodes/{node}/tasks?limit=&start=`
    pub async fn tasks(&self, node: &str, query: TaskQuery) -> Result<Vec<Task>, Error> {
        let node = require_non_blank("node", node)?;
        if query.limit == 0 {
            return Err(Error::invalid_input("limit", "must be at least 1"));
        }
        self.get_list(self.endpoint(&["nodes", node, "tasks"]), &query.to_params())
            .await
    }

    /// `GET /nodes/{node}/tasks/{upid}/status`
    pub async fn task_status(&self, node: &str, upid: &Upid) -> Result<TaskStatus, Error> {
        let node = require_non_blank("node", node)?;
        let upid = require_non_blank("upid", upid.as_str())?;
        self.get_object(
            self.endpoint(&["nodes", node, "tasks", upid, "status"]),
            &[],
            Access::Authenticated,
        )
        .await
    }

    /// Stop a running task.
    ///
    /// `DELETE /nodes/{node}/tasks/{upid}`
    pub async fn stop_task(&self, node: &str, upid: &Upid) -> Result<(), Error> {
        let node = require_non_blank("node", node)?;
        let upid = require_non_blank("upid", upid.as_str())?;
        self.delete_unit(self.endpoint(&["nodes", node, "tasks", upid]))
            .await
    }
}
