use async_trait::async_trait;

use crate::{domain::Cursor, Result};

/// Port for the remote homework-review API.
///
/// Implementations return the decoded JSON body of a successful response and
/// map every non-200 status to [`crate::Error::Endpoint`]. Shape validation is
/// left to [`crate::homework::check_response`].
#[async_trait]
pub trait HomeworkApi: Send + Sync {
    fn endpoint(&self) -> &str;

    async fn fetch_statuses(&self, from_date: Cursor) -> Result<serde_json::Value>;
}
