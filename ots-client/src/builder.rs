//! Client construction.

use std::sync::Arc;

use crate::auth::{API_VERSION, Signer};
use crate::client::Client;
use crate::error::Error;
use crate::retry::{DefaultRetryPolicy, RetryPolicy};
use crate::transport::Transport;

/// Builder for [`Client`].
///
/// # Example
///
/// ```ignore
/// use ots_client::{Client, NoDelayRetryPolicy};
///
/// let client = Client::builder("access-id", "access-secret", "my-instance")
///     .retry_policy(NoDelayRetryPolicy::new())
///     .build(transport)?;
/// ```
pub struct ClientBuilder {
    access_key_id: String,
    access_key_secret: String,
    instance_name: String,
    api_version: String,
    retry_policy: Arc<dyn RetryPolicy>,
}

impl ClientBuilder {
    pub fn new(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> Self {
        ClientBuilder {
            access_key_id: access_key_id.into(),
            access_key_secret: access_key_secret.into(),
            instance_name: instance_name.into(),
            api_version: API_VERSION.to_string(),
            retry_policy: Arc::new(DefaultRetryPolicy::new()),
        }
    }

    /// Override the protocol version header. Rarely needed.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Replace the default retry policy.
    pub fn retry_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry_policy = Arc::new(policy);
        self
    }

    /// Build a client over the given transport.
    pub fn build<T: Transport>(self, transport: T) -> Result<Client<T>, Error> {
        if self.access_key_id.is_empty() {
            return Err(Error::invalid_argument("access key id should not be empty"));
        }
        if self.access_key_secret.is_empty() {
            return Err(Error::invalid_argument(
                "access key secret should not be empty",
            ));
        }
        if self.instance_name.is_empty() {
            return Err(Error::invalid_argument("instance name should not be empty"));
        }
        let signer = Signer::new(
            self.access_key_id,
            self.access_key_secret,
            self.instance_name,
            self.api_version,
        );
        Ok(Client::new(transport, signer, self.retry_policy))
    }
}
