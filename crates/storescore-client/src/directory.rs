//! Read-only lookups used to populate pickers: members, departments, walks.

use storescore_core::{Department, Member, StoreId, Walk};

use crate::client::StoreScoreClient;
use crate::error::ClientError;

impl StoreScoreClient {
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a member list.
    pub async fn list_members(&self) -> Result<Vec<Member>, ClientError> {
        self.get_list("members/", &[]).await
    }

    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a department list.
    pub async fn list_departments(&self) -> Result<Vec<Department>, ClientError> {
        self.get_list("departments/", &[]).await
    }

    /// Lists walks, optionally for a single store.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Api`] on a non-2xx response.
    /// - [`ClientError::Http`] on network failure.
    /// - [`ClientError::Deserialize`] if the body is not a walk list.
    pub async fn list_walks(&self, store: Option<StoreId>) -> Result<Vec<Walk>, ClientError> {
        let query: Vec<(&str, String)> = store
            .map(|id| vec![("store", id.to_string())])
            .unwrap_or_default();
        self.get_list("walks/", &query).await
    }
}
