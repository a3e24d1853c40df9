//! Table lifecycle: existence check, creation and readiness wait.
//!
//! A table moves from unknown to either existing or missing; a missing table is
//! created with the shape of the handle's [`Schema`](crate::Schema) and then
//! polled until it, and its index, are active.

use crate::{
    Error, Result,
    client::KvsClient,
    storage::{Storage, TableState},
};

impl<S: Storage> KvsClient<S> {
    /// Create the table if it does not exist yet, and wait until it is active.
    ///
    /// Calling it on an active table is a no-op. A table that exists but is
    /// not active yet, e.g. one just created by another bootstrap, is waited
    /// on. A creation racing with another bootstrap of the same table is not
    /// an error: the table exists either way, and this call waits for it.
    ///
    /// The readiness wait is bounded by [`Self::ready_timeout`]; when it
    /// elapses [`Error::ReadyTimeout`] is returned, and the table may still
    /// become active later.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_kvs.bootstrap", skip(self), fields(table_name = %self.table_name, schema = %self.schema), err)
    )]
    pub async fn bootstrap(&self) -> Result<()> {
        match self.current_state().await? {
            Some(state) if state.is_active() => {
                #[cfg(feature = "tracing")]
                tracing::info!(table_name = %self.table_name, "table already exists");
                return Ok(());
            }
            Some(_) => {
                #[cfg(feature = "tracing")]
                tracing::info!(table_name = %self.table_name, "table exists but is not active yet");
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::info!(table_name = %self.table_name, "creating table");
                self.create_table().await?;
            }
        }
        self.wait_until_active().await?;
        #[cfg(feature = "tracing")]
        tracing::info!(table_name = %self.table_name, "table is active");
        Ok(())
    }

    /// Whether the table exists, regardless of its status.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_kvs.table_exists", skip(self), fields(table_name = %self.table_name), err)
    )]
    pub async fn table_exists(&self) -> Result<bool> {
        Ok(self.current_state().await?.is_some())
    }

    async fn current_state(&self) -> Result<Option<TableState>> {
        match self.storage.table_state(&self.table_name).await {
            Ok(state) => Ok(Some(state)),
            Err(Error::TableNotFound { .. }) => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create_table(&self) -> Result<()> {
        let input = self.schema.create_table_input(&self.table_name)?;
        match self.storage.provision_table(input).await {
            Ok(()) => Ok(()),
            Err(Error::TableAlreadyExists { .. }) => {
                #[cfg(feature = "tracing")]
                tracing::info!(table_name = %self.table_name, "table created concurrently");
                Ok(())
            }
            Err(error) => Err(Error::TableCreation {
                table_name: self.table_name.clone(),
                source: Box::new(error),
            }),
        }
    }

    async fn wait_until_active(&self) -> Result<()> {
        let poll = async {
            loop {
                match self.storage.table_state(&self.table_name).await {
                    Ok(state) if state.is_active() => return Ok(()),
                    Ok(_state) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(table_name = %self.table_name, status = ?_state.status, "table not active yet");
                    }
                    // not visible yet right after creation
                    Err(Error::TableNotFound { .. }) => {}
                    Err(error) => return Err(error),
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        };
        tokio::time::timeout(self.ready_timeout, poll)
            .await
            .map_err(|_| Error::ReadyTimeout {
                table_name: self.table_name.clone(),
                timeout: self.ready_timeout,
            })?
    }
}
