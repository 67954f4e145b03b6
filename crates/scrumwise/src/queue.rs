//! Pending write calls and their sequential execution

use tracing::{debug, error, info};

use crate::client::Connection;
use crate::error::{Result, ScrumwiseError};
use crate::requests::ApiCall;

/// One call or an arbitrarily nested group of calls handed to the queue as a unit.
#[derive(Debug, Clone, PartialEq)]
pub enum CallBatch {
    One(ApiCall),
    Many(Vec<CallBatch>),
}

impl CallBatch {
    fn flatten_into(self, out: &mut Vec<ApiCall>) {
        match self {
            CallBatch::One(call) => out.push(call),
            CallBatch::Many(batches) => {
                for batch in batches {
                    batch.flatten_into(out);
                }
            }
        }
    }
}

impl From<ApiCall> for CallBatch {
    fn from(call: ApiCall) -> Self {
        CallBatch::One(call)
    }
}

impl<T: Into<CallBatch>> From<Vec<T>> for CallBatch {
    fn from(items: Vec<T>) -> Self {
        CallBatch::Many(items.into_iter().map(Into::into).collect())
    }
}

/// Ordered list of calls waiting to be executed.
#[derive(Debug, Default, Clone)]
pub struct RequestQueue {
    calls: Vec<ApiCall>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call or a nested group of calls, flattened in order.
    pub fn append(&mut self, batch: impl Into<CallBatch>) {
        let before = self.calls.len();
        batch.into().flatten_into(&mut self.calls);
        debug!(
            "[RequestQueue] Queued {} call(s), {} pending",
            self.calls.len() - before,
            self.calls.len()
        );
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn calls(&self) -> &[ApiCall] {
        &self.calls
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Executes every queued call in order, stopping at the first failure.
    ///
    /// Calls after the failing one are never sent. The queue itself is left as
    /// it is either way; clearing it is up to the caller.
    pub async fn execute_all(
        &self,
        connection: &mut Connection,
        require_version: bool,
    ) -> Result<usize> {
        info!("[RequestQueue] Executing {} queued call(s)", self.calls.len());

        for (index, call) in self.calls.iter().enumerate() {
            if let Err(e) = connection.execute(call, require_version).await {
                error!("[RequestQueue] Error to execute {}: {}", call, e);
                return Err(ScrumwiseError::BatchAborted {
                    index,
                    call: call.to_string(),
                    source: Box::new(e),
                });
            }
        }

        Ok(self.calls.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrumwiseConfig;
    use crate::entity::EntityId;
    use crate::fake::FakeTransport;
    use std::sync::Arc;

    fn call(name: &str) -> ApiCall {
        ApiCall::add_task(EntityId::from("B1"), name, "")
    }

    #[test]
    fn test_append_flattens_nested_batches() {
        let mut queue = RequestQueue::new();
        queue.append(vec![
            CallBatch::from(vec![call("A"), call("B")]),
            CallBatch::from(call("C")),
        ]);
        queue.append(Vec::<ApiCall>::new());
        queue.append(call("D"));

        assert_eq!(queue.calls(), &[call("A"), call("B"), call("C"), call("D")]);
    }

    #[tokio::test]
    async fn test_execute_all_stops_at_first_failure() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(1).await;
        transport.push_status(500, "boom").await;
        transport.push_ok(3).await;

        let mut connection = Connection::new(
            ScrumwiseConfig::new("example.com", 443, "user", "key"),
            transport.clone(),
        );
        let mut queue = RequestQueue::new();
        queue.append(vec![call("ok"), call("fail"), call("never")]);

        let err = queue.execute_all(&mut connection, false).await.unwrap_err();

        match err {
            ScrumwiseError::BatchAborted { index, call, source } => {
                assert_eq!(index, 1);
                assert!(call.contains("name=fail"));
                assert!(matches!(*source, ScrumwiseError::Http { status: 500, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(transport.requests().await.len(), 2);
        assert_eq!(transport.remaining().await, 1);
        assert_eq!(queue.len(), 3);
    }

    #[tokio::test]
    async fn test_execute_all_with_required_version() {
        let transport = Arc::new(FakeTransport::new());
        transport.push_ok(8).await;
        transport.push_ok(9).await;

        let mut connection = Connection::new(
            ScrumwiseConfig::new("example.com", 443, "user", "key"),
            transport.clone(),
        );
        connection.set_last_data_version(7);

        let mut queue = RequestQueue::new();
        queue.append(vec![call("A"), call("B")]);
        assert_eq!(queue.execute_all(&mut connection, true).await.unwrap(), 2);

        let requests = transport.requests().await;
        assert_eq!(requests[0].param("requiredDataVersion"), Some("7"));
        assert_eq!(requests[1].param("requiredDataVersion"), Some("8"));
        assert_eq!(connection.last_data_version(), 9);
    }
}
