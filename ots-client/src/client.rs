//! The table-store client.
//!
//! [`Client`] owns a [`Transport`], a signer, and a retry policy. Every
//! operation is one awaited round trip: encode and validate the request,
//! sign it, send it, verify the response envelope, classify any failure,
//! and either decode the result, sleep and retry, or surface the error.
//! Retries are strictly sequential; attempt N's request is only issued
//! after attempt N-1's delay has elapsed.
//!
//! The client holds no per-call state, so independent operations may run
//! concurrently from separate tasks without coordination.

use std::sync::Arc;

use bytes::Bytes;
use ots_core::{codes, pb};
use prost::Message;

use crate::auth::{HEADER_REQUEST_ID, Signer};
use crate::builder::ClientBuilder;
use crate::error::{ClientError, Error, ServiceError};
use crate::request::{
    BatchGetRow, BatchGetTable, BatchWriteRow, BatchWriteTable, CreateTable, DeleteRow,
    DeleteTable, DescribeTable, GetRange, GetRow, OpRequest, Operation, PutRow, UpdateRow,
    UpdateTable,
};
use crate::response::{
    self, BatchGetRowResponse, BatchWriteRowResponse, DescribeTableResponse, GetRangeResponse,
    GetRowResponse, ListTableResponse, UpdateTableResponse,
};
use crate::retry::RetryPolicy;
use crate::scan::RangeScan;
use crate::transport::{RawResponse, Transport};
use crate::types::{
    Attributes, CapacityUnit, Condition, Direction, PrimaryKey, ReservedThroughput, RowUpdate,
    TableMeta,
};

/// Client for the table-store service.
///
/// # Example
///
/// ```ignore
/// use ots_client::{Client, PrimaryKey, Attributes, Condition};
///
/// let client = Client::builder("access-id", "access-secret", "my-instance")
///     .build(transport)?;
///
/// let key = PrimaryKey::from_pairs([("pk", "A")])?;
/// let attributes = Attributes::from_pairs([("col", 7i64)])?;
/// let consumed = client
///     .put_row("myTable", Condition::ExpectNotExist, key, attributes)
///     .await?;
/// ```
pub struct Client<T> {
    transport: T,
    signer: Signer,
    retry_policy: Arc<dyn RetryPolicy>,
}

impl<T> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("transport", &std::any::type_name::<T>())
            .field("signer", &self.signer)
            .field("retry_policy", &"<dyn RetryPolicy>")
            .finish()
    }
}

impl Client<()> {
    /// Start building a client from credentials and an instance name.
    pub fn builder(
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
        instance_name: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(access_key_id, access_key_secret, instance_name)
    }
}

impl<T: Transport> Client<T> {
    pub(crate) fn new(transport: T, signer: Signer, retry_policy: Arc<dyn RetryPolicy>) -> Self {
        Client {
            transport,
            signer,
            retry_policy,
        }
    }

    /// Create a table with the given schema and reserved throughput.
    pub async fn create_table(
        &self,
        table_meta: TableMeta,
        reserved_throughput: ReservedThroughput,
    ) -> Result<(), Error> {
        let body = self
            .invoke(OpRequest::CreateTable(CreateTable {
                table_meta,
                reserved_throughput,
            }))
            .await?;
        response::decode_create_table(&body)
    }

    /// Delete a table by name.
    pub async fn delete_table(&self, table_name: impl Into<String>) -> Result<(), Error> {
        let body = self
            .invoke(OpRequest::DeleteTable(DeleteTable {
                table_name: table_name.into(),
            }))
            .await?;
        response::decode_delete_table(&body)
    }

    /// List the names of every table in the instance.
    pub async fn list_table(&self) -> Result<ListTableResponse, Error> {
        let body = self.invoke(OpRequest::ListTable).await?;
        ListTableResponse::decode(&body)
    }

    /// Change a table's reserved throughput.
    pub async fn update_table(
        &self,
        table_name: impl Into<String>,
        reserved_throughput: ReservedThroughput,
    ) -> Result<UpdateTableResponse, Error> {
        let body = self
            .invoke(OpRequest::UpdateTable(UpdateTable {
                table_name: table_name.into(),
                reserved_throughput,
            }))
            .await?;
        UpdateTableResponse::decode(&body)
    }

    /// Fetch a table's schema and throughput bookkeeping.
    pub async fn describe_table(
        &self,
        table_name: impl Into<String>,
    ) -> Result<DescribeTableResponse, Error> {
        let body = self
            .invoke(OpRequest::DescribeTable(DescribeTable {
                table_name: table_name.into(),
            }))
            .await?;
        DescribeTableResponse::decode(&body)
    }

    /// Read one row by primary key. `columns_to_get: None` reads every
    /// column.
    pub async fn get_row(
        &self,
        table_name: impl Into<String>,
        primary_key: PrimaryKey,
        columns_to_get: Option<Vec<String>>,
    ) -> Result<GetRowResponse, Error> {
        let body = self
            .invoke(OpRequest::GetRow(GetRow {
                table_name: table_name.into(),
                primary_key,
                columns_to_get,
            }))
            .await?;
        GetRowResponse::decode(&body)
    }

    /// Write a full row, subject to a row-existence precondition.
    pub async fn put_row(
        &self,
        table_name: impl Into<String>,
        condition: Condition,
        primary_key: PrimaryKey,
        attributes: Attributes,
    ) -> Result<CapacityUnit, Error> {
        let body = self
            .invoke(OpRequest::PutRow(PutRow {
                table_name: table_name.into(),
                condition,
                primary_key,
                attributes,
            }))
            .await?;
        response::decode_put_row(&body)
    }

    /// Apply put assignments and delete markers to one row.
    pub async fn update_row(
        &self,
        table_name: impl Into<String>,
        condition: Condition,
        primary_key: PrimaryKey,
        update: RowUpdate,
    ) -> Result<CapacityUnit, Error> {
        let body = self
            .invoke(OpRequest::UpdateRow(UpdateRow {
                table_name: table_name.into(),
                condition,
                primary_key,
                update,
            }))
            .await?;
        response::decode_update_row(&body)
    }

    /// Delete one row by primary key.
    pub async fn delete_row(
        &self,
        table_name: impl Into<String>,
        condition: Condition,
        primary_key: PrimaryKey,
    ) -> Result<CapacityUnit, Error> {
        let body = self
            .invoke(OpRequest::DeleteRow(DeleteRow {
                table_name: table_name.into(),
                condition,
                primary_key,
            }))
            .await?;
        response::decode_delete_row(&body)
    }

    /// Read rows across tables in one request. Per-item failures are
    /// reported in the result records, not raised; inspect each item.
    pub async fn batch_get_row(
        &self,
        tables: Vec<BatchGetTable>,
    ) -> Result<BatchGetRowResponse, Error> {
        let body = self
            .invoke(OpRequest::BatchGetRow(BatchGetRow { tables }))
            .await?;
        BatchGetRowResponse::decode(&body)
    }

    /// Write rows across tables in one request. Per-item failures are
    /// reported in the result records, not raised; inspect each item.
    pub async fn batch_write_row(
        &self,
        tables: Vec<BatchWriteTable>,
    ) -> Result<BatchWriteRowResponse, Error> {
        let body = self
            .invoke(OpRequest::BatchWriteRow(BatchWriteRow { tables }))
            .await?;
        BatchWriteRowResponse::decode(&body)
    }

    /// Read one page of rows in a key interval.
    pub async fn get_range(&self, request: GetRange) -> Result<GetRangeResponse, Error> {
        let body = self.invoke(OpRequest::GetRange(request)).await?;
        GetRangeResponse::decode(&body)
    }

    /// Iterate every row in a key interval, following next-start keys
    /// across as many requests as needed.
    ///
    /// Consumed capacity accumulates into `tally`, which is zeroed first.
    /// `count` bounds the total number of rows; `None` reads the whole
    /// interval. The returned scan is finite and not restartable; dropping
    /// it mid-iteration is safe.
    pub fn range_scan<'a>(
        &'a self,
        table_name: impl Into<String>,
        direction: Direction,
        inclusive_start: PrimaryKey,
        exclusive_end: PrimaryKey,
        columns_to_get: Option<Vec<String>>,
        count: Option<i64>,
        tally: &'a mut CapacityUnit,
    ) -> Result<RangeScan<'a, T>, Error> {
        RangeScan::new(
            self,
            table_name.into(),
            direction,
            inclusive_start,
            exclusive_end,
            columns_to_get,
            count,
            tally,
        )
    }

    /// One bounded send/verify/classify/retry cycle.
    async fn invoke(&self, request: OpRequest) -> Result<Bytes, Error> {
        let operation = request.operation();
        let path = operation.path();
        let body = request.encode_body()?;

        let mut attempts: u32 = 0;
        loop {
            // The date header must be fresh per attempt, so sign each time.
            let headers = self.signer.make_request_headers(&path, &body)?;
            tracing::debug!(api = operation.name(), attempt = attempts, "sending request");

            let outcome = match self.transport.send(&path, headers, body.clone()).await {
                Ok(response) => self
                    .handle_response(operation, &path, &response)
                    .map(|()| response.body),
                Err(err) => Err(Error::from(err)),
            };

            match outcome {
                Ok(body) => return Ok(body),
                Err(err) if self.retry_policy.should_retry(attempts, &err, operation) => {
                    let delay = self.retry_policy.retry_delay(attempts, &err, operation);
                    tracing::debug!(
                        api = operation.name(),
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying after service error"
                    );
                    tokio::time::sleep(delay).await;
                    attempts += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Verify the response envelope and classify a non-2xx status.
    fn handle_response(
        &self,
        operation: Operation,
        path: &str,
        response: &RawResponse,
    ) -> Result<(), Error> {
        let status = response.status;
        self.signer
            .check_response_headers(status, &response.headers, &response.body)?;
        // A 403 may not be signable by our key; its signature is checked
        // only after the error code rules out an auth failure.
        if status != 403 {
            self.signer
                .check_authorization(path, status, &response.headers)?;
        }
        if (200..300).contains(&status) {
            return Ok(());
        }

        let request_id = response
            .headers
            .get(HEADER_REQUEST_ID)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let envelope = match pb::Error::decode(response.body.as_ref()) {
            Ok(envelope) if !envelope.code.is_empty() => envelope,
            _ => {
                return Err(Error::Client(
                    ClientError::new(format!(
                        "Response format is invalid, HTTP status: {status} {}.",
                        response.reason
                    ))
                    .with_status(status),
                ));
            }
        };

        if status == 403 && envelope.code != codes::AUTH_FAILED {
            self.signer
                .check_authorization(path, status, &response.headers)?;
        }

        tracing::warn!(
            api = operation.name(),
            http_status = status,
            code = %envelope.code,
            request_id = %request_id,
            "request rejected by service"
        );
        Err(Error::Service(ServiceError {
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
            http_status: status,
            request_id,
        }))
    }
}
