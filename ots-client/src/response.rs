//! Operation responses and their decoding.
//!
//! Decoding is tolerant where the envelope allows it: absent consumed
//! capacity counts as zero, an empty next-start-key means the scan is done
//! and becomes `None`, and an absent or empty row on a GetRow means the row
//! does not exist. Batch responses preserve request order and carry
//! per-item outcomes; an item-level failure never raises. Only a body that
//! cannot be decoded at all is an error, classified client-side.

use ots_core::pb;
use prost::Message;

use crate::error::{ClientError, Error};
use crate::types::{CapacityUnit, PrimaryKey, ReservedThroughputDetails, Row, TableMeta};

fn decode_message<M: Message + Default>(body: &[u8]) -> Result<M, Error> {
    M::decode(body).map_err(|err| {
        Error::Client(ClientError::new(format!("Response format is invalid, {err}.")))
    })
}

fn missing_field(name: &str) -> Error {
    Error::Client(ClientError::new(format!(
        "Response format is invalid, missing {name}."
    )))
}

pub(crate) fn decode_create_table(body: &[u8]) -> Result<(), Error> {
    decode_message::<pb::CreateTableResponse>(body).map(|_| ())
}

pub(crate) fn decode_delete_table(body: &[u8]) -> Result<(), Error> {
    decode_message::<pb::DeleteTableResponse>(body).map(|_| ())
}

/// The names of every table in the instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListTableResponse {
    pub table_names: Vec<String>,
}

impl ListTableResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::ListTableResponse>(body)?;
        Ok(ListTableResponse {
            table_names: proto.table_names,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateTableResponse {
    pub reserved_throughput_details: ReservedThroughputDetails,
}

impl UpdateTableResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::UpdateTableResponse>(body)?;
        Ok(UpdateTableResponse {
            reserved_throughput_details: ReservedThroughputDetails::from_wire(
                proto.reserved_throughput_details.as_ref(),
            ),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DescribeTableResponse {
    pub table_meta: TableMeta,
    pub reserved_throughput_details: ReservedThroughputDetails,
}

impl DescribeTableResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::DescribeTableResponse>(body)?;
        let meta = proto.table_meta.as_ref().ok_or_else(|| missing_field("table_meta"))?;
        Ok(DescribeTableResponse {
            table_meta: TableMeta::from_wire(meta)?,
            reserved_throughput_details: ReservedThroughputDetails::from_wire(
                proto.reserved_throughput_details.as_ref(),
            ),
        })
    }
}

/// One row read, or `None` when no row matches the key.
#[derive(Clone, Debug, PartialEq)]
pub struct GetRowResponse {
    pub consumed: CapacityUnit,
    pub row: Option<Row>,
}

impl GetRowResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::GetRowResponse>(body)?;
        let row = match &proto.row {
            Some(row) if !Row::is_absent(row) => Some(Row::from_wire(row)?),
            _ => None,
        };
        Ok(GetRowResponse {
            consumed: CapacityUnit::from_wire(proto.consumed.as_ref()),
            row,
        })
    }
}

pub(crate) fn decode_put_row(body: &[u8]) -> Result<CapacityUnit, Error> {
    let proto = decode_message::<pb::PutRowResponse>(body)?;
    Ok(CapacityUnit::from_wire(proto.consumed.as_ref()))
}

pub(crate) fn decode_update_row(body: &[u8]) -> Result<CapacityUnit, Error> {
    let proto = decode_message::<pb::UpdateRowResponse>(body)?;
    Ok(CapacityUnit::from_wire(proto.consumed.as_ref()))
}

pub(crate) fn decode_delete_row(body: &[u8]) -> Result<CapacityUnit, Error> {
    let proto = decode_message::<pb::DeleteRowResponse>(body)?;
    Ok(CapacityUnit::from_wire(proto.consumed.as_ref()))
}

/// Outcome of one row in a BatchGetRow, in request order.
#[derive(Clone, Debug, PartialEq)]
pub struct RowResult {
    pub is_ok: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub consumed: Option<CapacityUnit>,
    pub row: Option<Row>,
}

impl RowResult {
    fn from_wire(item: &pb::RowInBatchGetRowResponse) -> Result<Self, Error> {
        let row = match &item.row {
            Some(row) if !Row::is_absent(row) => Some(Row::from_wire(row)?),
            _ => None,
        };
        Ok(RowResult {
            is_ok: item.is_ok,
            error_code: item.error.as_ref().map(|e| e.code.clone()),
            error_message: item.error.as_ref().and_then(|e| e.message.clone()),
            consumed: item
                .consumed
                .as_ref()
                .map(|c| CapacityUnit::from_wire(Some(c))),
            row,
        })
    }
}

/// One table's results in a BatchGetRow, in request order.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchGetTableResult {
    pub table_name: String,
    pub rows: Vec<RowResult>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchGetRowResponse {
    pub tables: Vec<BatchGetTableResult>,
}

impl BatchGetRowResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::BatchGetRowResponse>(body)?;
        let tables = proto
            .tables
            .iter()
            .map(|table| {
                Ok(BatchGetTableResult {
                    table_name: table.table_name.clone(),
                    rows: table
                        .rows
                        .iter()
                        .map(RowResult::from_wire)
                        .collect::<Result<Vec<_>, Error>>()?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(BatchGetRowResponse { tables })
    }
}

/// Outcome of one write in a BatchWriteRow, in request order.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteResult {
    pub is_ok: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub consumed: Option<CapacityUnit>,
}

impl WriteResult {
    fn from_wire(item: &pb::RowInBatchWriteRowResponse) -> Self {
        WriteResult {
            is_ok: item.is_ok,
            error_code: item.error.as_ref().map(|e| e.code.clone()),
            error_message: item.error.as_ref().and_then(|e| e.message.clone()),
            consumed: item
                .consumed
                .as_ref()
                .map(|c| CapacityUnit::from_wire(Some(c))),
        }
    }
}

/// One table's results in a BatchWriteRow: puts, updates, and deletes each
/// in their own request order.
#[derive(Clone, Debug, PartialEq)]
pub struct BatchWriteTableResult {
    pub table_name: String,
    pub puts: Vec<WriteResult>,
    pub updates: Vec<WriteResult>,
    pub deletes: Vec<WriteResult>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BatchWriteRowResponse {
    pub tables: Vec<BatchWriteTableResult>,
}

impl BatchWriteRowResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::BatchWriteRowResponse>(body)?;
        let tables = proto
            .tables
            .iter()
            .map(|table| BatchWriteTableResult {
                table_name: table.table_name.clone(),
                puts: table.put_rows.iter().map(WriteResult::from_wire).collect(),
                updates: table.update_rows.iter().map(WriteResult::from_wire).collect(),
                deletes: table.delete_rows.iter().map(WriteResult::from_wire).collect(),
            })
            .collect();
        Ok(BatchWriteRowResponse { tables })
    }
}

/// One page of a range scan.
#[derive(Clone, Debug, PartialEq)]
pub struct GetRangeResponse {
    pub consumed: CapacityUnit,
    /// Start key for the next page; `None` when the interval is exhausted.
    pub next_start_primary_key: Option<PrimaryKey>,
    pub rows: Vec<Row>,
}

impl GetRangeResponse {
    pub(crate) fn decode(body: &[u8]) -> Result<Self, Error> {
        let proto = decode_message::<pb::GetRangeResponse>(body)?;
        let next_start_primary_key = if proto.next_start_primary_key.is_empty() {
            None
        } else {
            Some(PrimaryKey::from_wire(&proto.next_start_primary_key)?)
        };
        Ok(GetRangeResponse {
            consumed: CapacityUnit::from_wire(proto.consumed.as_ref()),
            next_start_primary_key,
            rows: proto
                .rows
                .iter()
                .map(Row::from_wire)
                .collect::<Result<Vec<_>, Error>>()?,
        })
    }
}
