//! Tracking a submitted process chain

use std::fmt;
use std::sync::Arc;

use crate::api::ActiniaApi;
use crate::error::Result;

/// Status values after which the service no longer changes a job.
const TERMINAL_STATUSES: [&str; 3] = ["finished", "error", "terminated"];

/// Handle to a submitted job.
///
/// Holds the status URL handed out on submission and the last status text the
/// service reported. Nothing polls on its own: call [`refresh`](Self::refresh)
/// for as long as you care about the job.
pub struct JobStatus {
    url: String,
    status: Option<String>,
    source: Arc<dyn ActiniaApi>,
}

impl JobStatus {
    pub fn new(url: impl Into<String>, source: Arc<dyn ActiniaApi>) -> Self {
        Self {
            url: url.into(),
            status: None,
            source,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The last status reported by the service (`accepted`, `running`,
    /// `finished`, `error`, ...), or `None` before the first successful refresh.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether the cached status is one the service never leaves.
    pub fn is_terminal(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| TERMINAL_STATUSES.contains(&s))
    }

    /// Fetches the current status and replaces the cached one with it.
    ///
    /// On failure the previous status is kept and the error is returned.
    pub async fn refresh(&mut self) -> Result<&str> {
        let status = self.source.fetch_status(&self.url).await?;
        if self.status.as_deref() != Some(status.as_str()) {
            log::debug!(
                "Job {} changed status: {} -> {}",
                self.url,
                self.status.as_deref().unwrap_or("unknown"),
                status
            );
        }
        Ok(self.status.insert(status).as_str())
    }
}

impl fmt::Debug for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobStatus")
            .field("url", &self.url)
            .field("status", &self.status)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ModuleDetailRecord;
    use crate::chain::ProcessChain;
    use crate::error::{ActiniaError, TransportError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StatusQueue(Mutex<Vec<Result<String>>>);

    #[async_trait]
    impl ActiniaApi for StatusQueue {
        async fn fetch_module_detail(&self, _module: &str) -> Result<ModuleDetailRecord> {
            unreachable!()
        }

        async fn post_chain(
            &self,
            _location: &str,
            _mapset: &str,
            _chain: &ProcessChain,
        ) -> Result<String> {
            unreachable!()
        }

        async fn fetch_status(&self, _status_url: &str) -> Result<String> {
            self.0.lock().unwrap().remove(0)
        }
    }

    fn job(responses: Vec<Result<String>>) -> JobStatus {
        JobStatus::new(
            "http://h/latest/resources/user/resource_id-1",
            Arc::new(StatusQueue(Mutex::new(responses))),
        )
    }

    #[tokio::test]
    async fn test_refresh_overwrites_status() {
        let mut status = job(vec![Ok("accepted".into()), Ok("finished".into())]);
        assert_eq!(status.status(), None);
        assert!(!status.is_terminal());

        assert_eq!(status.refresh().await.unwrap(), "accepted");
        assert!(!status.is_terminal());
        assert_eq!(status.refresh().await.unwrap(), "finished");
        assert_eq!(status.status(), Some("finished"));
        assert!(status.is_terminal());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_status() {
        let mut status = job(vec![
            Ok("running".into()),
            Err(ActiniaError::RemoteUnavailable {
                operation: "fetch process status",
                target: "http://h/latest/resources/user/resource_id-1".into(),
                source: TransportError::UnexpectedShape("missing 'status'".into()),
            }),
        ]);
        status.refresh().await.unwrap();

        let err = status.refresh().await.unwrap_err();
        assert!(err.is_remote_unavailable());
        assert_eq!(status.status(), Some("running"));
    }

    #[tokio::test]
    async fn test_unknown_status_is_passed_through() {
        let mut status = job(vec![Ok("accepted".into()), Ok("queued-somewhere".into())]);
        status.refresh().await.unwrap();
        assert_eq!(status.refresh().await.unwrap(), "queued-somewhere");
        assert!(!status.is_terminal());
    }
}
