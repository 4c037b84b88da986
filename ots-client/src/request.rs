//! Operation requests and their wire encoding.
//!
//! Each operation has a typed request structure. Encoding validates every
//! structural invariant first (unique key names, disjoint put/delete sets,
//! non-empty batch groups, range-bound ordering) and fails with a local
//! `InvalidArgument`-class error before any bytes are built, so a
//! partially-valid message is never sent.
//!
//! Dispatch is a closed enum ([`OpRequest`]) matched exhaustively; adding an
//! operation without handling its encoding does not compile.

use bytes::Bytes;
use ots_core::{checked_i32, pb};
use prost::Message;

use crate::error::Error;
use crate::types::{
    Attributes, Condition, Direction, PrimaryKey, ReservedThroughput, RowUpdate, TableMeta,
};

/// The closed set of operations this protocol supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateTable,
    ListTable,
    DeleteTable,
    DescribeTable,
    UpdateTable,
    GetRow,
    PutRow,
    UpdateRow,
    DeleteRow,
    BatchGetRow,
    BatchWriteRow,
    GetRange,
}

impl Operation {
    /// The operation name as it appears on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Operation::CreateTable => "CreateTable",
            Operation::ListTable => "ListTable",
            Operation::DeleteTable => "DeleteTable",
            Operation::DescribeTable => "DescribeTable",
            Operation::UpdateTable => "UpdateTable",
            Operation::GetRow => "GetRow",
            Operation::PutRow => "PutRow",
            Operation::UpdateRow => "UpdateRow",
            Operation::DeleteRow => "DeleteRow",
            Operation::BatchGetRow => "BatchGetRow",
            Operation::BatchWriteRow => "BatchWriteRow",
            Operation::GetRange => "GetRange",
        }
    }

    /// The request path: `/` plus the operation name.
    pub fn path(self) -> String {
        format!("/{}", self.name())
    }

    /// Whether re-issuing the operation after a partial failure cannot
    /// corrupt state. Only these are retried for stability-class errors.
    pub fn is_repeatable(self) -> bool {
        matches!(
            self,
            Operation::ListTable
                | Operation::DescribeTable
                | Operation::GetRow
                | Operation::BatchGetRow
                | Operation::GetRange
        )
    }
}

/// CreateTable: table schema plus initial reserved throughput.
#[derive(Clone, Debug)]
pub struct CreateTable {
    pub table_meta: TableMeta,
    pub reserved_throughput: ReservedThroughput,
}

impl CreateTable {
    fn to_wire(&self) -> Result<pb::CreateTableRequest, Error> {
        check_capacity_present(&self.reserved_throughput)?;
        Ok(pb::CreateTableRequest {
            table_meta: Some(self.table_meta.to_wire()?),
            reserved_throughput: Some(self.reserved_throughput.to_wire()),
        })
    }
}

/// UpdateTable: change one or both sides of a table's reserved throughput.
#[derive(Clone, Debug)]
pub struct UpdateTable {
    pub table_name: String,
    pub reserved_throughput: ReservedThroughput,
}

impl UpdateTable {
    fn to_wire(&self) -> Result<pb::UpdateTableRequest, Error> {
        check_capacity_present(&self.reserved_throughput)?;
        Ok(pb::UpdateTableRequest {
            table_name: self.table_name.clone(),
            reserved_throughput: Some(self.reserved_throughput.to_wire()),
        })
    }
}

#[derive(Clone, Debug)]
pub struct DeleteTable {
    pub table_name: String,
}

#[derive(Clone, Debug)]
pub struct DescribeTable {
    pub table_name: String,
}

/// GetRow: read one row by primary key, optionally projecting columns.
#[derive(Clone, Debug)]
pub struct GetRow {
    pub table_name: String,
    pub primary_key: PrimaryKey,
    /// `None` reads every column.
    pub columns_to_get: Option<Vec<String>>,
}

impl GetRow {
    fn to_wire(&self) -> Result<pb::GetRowRequest, Error> {
        Ok(pb::GetRowRequest {
            table_name: self.table_name.clone(),
            primary_key: self.primary_key.to_wire()?,
            columns_to_get: self.columns_to_get.clone().unwrap_or_default(),
        })
    }
}

/// PutRow: write a full row, subject to a row-existence precondition.
#[derive(Clone, Debug)]
pub struct PutRow {
    pub table_name: String,
    pub condition: Condition,
    pub primary_key: PrimaryKey,
    pub attributes: Attributes,
}

impl PutRow {
    fn to_wire(&self) -> Result<pb::PutRowRequest, Error> {
        check_attributes_disjoint(&self.primary_key, &self.attributes)?;
        Ok(pb::PutRowRequest {
            table_name: self.table_name.clone(),
            condition: Some(self.condition.to_wire()),
            primary_key: self.primary_key.to_wire()?,
            attribute_columns: self.attributes.to_wire()?,
        })
    }
}

/// UpdateRow: apply put assignments and delete markers to one row.
#[derive(Clone, Debug)]
pub struct UpdateRow {
    pub table_name: String,
    pub condition: Condition,
    pub primary_key: PrimaryKey,
    pub update: RowUpdate,
}

impl UpdateRow {
    fn to_wire(&self) -> Result<pb::UpdateRowRequest, Error> {
        if self.update.is_empty() {
            return Err(Error::invalid_argument(
                "update of attribute columns should not be empty",
            ));
        }
        Ok(pb::UpdateRowRequest {
            table_name: self.table_name.clone(),
            condition: Some(self.condition.to_wire()),
            primary_key: self.primary_key.to_wire()?,
            attribute_columns: self.update.to_wire()?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct DeleteRow {
    pub table_name: String,
    pub condition: Condition,
    pub primary_key: PrimaryKey,
}

impl DeleteRow {
    fn to_wire(&self) -> Result<pb::DeleteRowRequest, Error> {
        Ok(pb::DeleteRowRequest {
            table_name: self.table_name.clone(),
            condition: Some(self.condition.to_wire()),
            primary_key: self.primary_key.to_wire()?,
        })
    }
}

/// One table's worth of rows to read in a BatchGetRow.
#[derive(Clone, Debug)]
pub struct BatchGetTable {
    pub table_name: String,
    pub rows: Vec<PrimaryKey>,
    pub columns_to_get: Option<Vec<String>>,
}

/// BatchGetRow: read rows across one or more tables in a single request.
#[derive(Clone, Debug)]
pub struct BatchGetRow {
    pub tables: Vec<BatchGetTable>,
}

impl BatchGetRow {
    fn to_wire(&self) -> Result<pb::BatchGetRowRequest, Error> {
        if self.tables.is_empty() {
            return Err(Error::invalid_argument("batch_list should not be empty"));
        }
        let mut tables = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            if table.rows.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "rows to get in table '{}' should not be empty",
                    table.table_name
                )));
            }
            check_unique_keys(table.rows.iter(), &table.table_name)?;
            let rows = table
                .rows
                .iter()
                .map(|key| {
                    Ok(pb::RowInBatchGetRowRequest {
                        primary_key: key.to_wire()?,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            tables.push(pb::TableInBatchGetRowRequest {
                table_name: table.table_name.clone(),
                rows,
                columns_to_get: table.columns_to_get.clone().unwrap_or_default(),
            });
        }
        Ok(pb::BatchGetRowRequest { tables })
    }
}

/// A put inside a BatchWriteRow group.
#[derive(Clone, Debug)]
pub struct PutRowItem {
    pub condition: Condition,
    pub primary_key: PrimaryKey,
    pub attributes: Attributes,
}

/// An update inside a BatchWriteRow group.
#[derive(Clone, Debug)]
pub struct UpdateRowItem {
    pub condition: Condition,
    pub primary_key: PrimaryKey,
    pub update: RowUpdate,
}

/// A delete inside a BatchWriteRow group.
#[derive(Clone, Debug)]
pub struct DeleteRowItem {
    pub condition: Condition,
    pub primary_key: PrimaryKey,
}

/// One table's worth of writes in a BatchWriteRow. At least one of the three
/// kinds must be non-empty; row keys must be unique within each kind.
#[derive(Clone, Debug, Default)]
pub struct BatchWriteTable {
    pub table_name: String,
    pub puts: Vec<PutRowItem>,
    pub updates: Vec<UpdateRowItem>,
    pub deletes: Vec<DeleteRowItem>,
}

/// BatchWriteRow: write rows across one or more tables in a single request.
#[derive(Clone, Debug)]
pub struct BatchWriteRow {
    pub tables: Vec<BatchWriteTable>,
}

impl BatchWriteRow {
    fn to_wire(&self) -> Result<pb::BatchWriteRowRequest, Error> {
        if self.tables.is_empty() {
            return Err(Error::invalid_argument("batch_list should not be empty"));
        }
        let mut tables = Vec::with_capacity(self.tables.len());
        for table in &self.tables {
            if table.puts.is_empty() && table.updates.is_empty() && table.deletes.is_empty() {
                return Err(Error::invalid_argument(format!(
                    "rows to write in table '{}' should not be empty",
                    table.table_name
                )));
            }
            check_unique_keys(table.puts.iter().map(|item| &item.primary_key), &table.table_name)?;
            check_unique_keys(
                table.updates.iter().map(|item| &item.primary_key),
                &table.table_name,
            )?;
            check_unique_keys(
                table.deletes.iter().map(|item| &item.primary_key),
                &table.table_name,
            )?;

            let put_rows = table
                .puts
                .iter()
                .map(|item| {
                    check_attributes_disjoint(&item.primary_key, &item.attributes)?;
                    Ok(pb::PutRowInBatchWriteRowRequest {
                        condition: Some(item.condition.to_wire()),
                        primary_key: item.primary_key.to_wire()?,
                        attribute_columns: item.attributes.to_wire()?,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            let update_rows = table
                .updates
                .iter()
                .map(|item| {
                    if item.update.is_empty() {
                        return Err(Error::invalid_argument(
                            "update of attribute columns should not be empty",
                        ));
                    }
                    Ok(pb::UpdateRowInBatchWriteRowRequest {
                        condition: Some(item.condition.to_wire()),
                        primary_key: item.primary_key.to_wire()?,
                        attribute_columns: item.update.to_wire()?,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;
            let delete_rows = table
                .deletes
                .iter()
                .map(|item| {
                    Ok(pb::DeleteRowInBatchWriteRowRequest {
                        condition: Some(item.condition.to_wire()),
                        primary_key: item.primary_key.to_wire()?,
                    })
                })
                .collect::<Result<Vec<_>, Error>>()?;

            tables.push(pb::TableInBatchWriteRowRequest {
                table_name: table.table_name.clone(),
                put_rows,
                update_rows,
                delete_rows,
            });
        }
        Ok(pb::BatchWriteRowRequest { tables })
    }
}

/// GetRange: read rows in a key interval, inclusive start, exclusive end.
#[derive(Clone, Debug)]
pub struct GetRange {
    pub table_name: String,
    pub direction: Direction,
    pub inclusive_start: PrimaryKey,
    pub exclusive_end: PrimaryKey,
    pub columns_to_get: Option<Vec<String>>,
    /// Maximum number of rows to return; `None` lets the service decide.
    /// The wire field is 32-bit, so larger values fail at encode time.
    pub limit: Option<i64>,
}

impl GetRange {
    fn to_wire(&self) -> Result<pb::GetRangeRequest, Error> {
        if let Some(limit) = self.limit {
            if limit <= 0 {
                return Err(Error::invalid_argument(
                    "the value of limit must be larger than 0",
                ));
            }
        }
        let ordering = self.inclusive_start.cmp_key_order(&self.exclusive_end)?;
        match self.direction {
            Direction::Forward if ordering == std::cmp::Ordering::Greater => {
                return Err(Error::invalid_argument(
                    "start primary key must not sort after end primary key in FORWARD direction",
                ));
            }
            Direction::Backward if ordering == std::cmp::Ordering::Less => {
                return Err(Error::invalid_argument(
                    "start primary key must not sort before end primary key in BACKWARD direction",
                ));
            }
            _ => {}
        }
        Ok(pb::GetRangeRequest {
            table_name: self.table_name.clone(),
            direction: self.direction.to_wire() as i32,
            columns_to_get: self.columns_to_get.clone().unwrap_or_default(),
            limit: self.limit.map(checked_i32).transpose()?,
            inclusive_start_primary_key: self.inclusive_start.to_wire_bound()?,
            exclusive_end_primary_key: self.exclusive_end.to_wire_bound()?,
        })
    }
}

/// A fully typed request, one variant per operation.
#[derive(Clone, Debug)]
pub enum OpRequest {
    CreateTable(CreateTable),
    ListTable,
    DeleteTable(DeleteTable),
    DescribeTable(DescribeTable),
    UpdateTable(UpdateTable),
    GetRow(GetRow),
    PutRow(PutRow),
    UpdateRow(UpdateRow),
    DeleteRow(DeleteRow),
    BatchGetRow(BatchGetRow),
    BatchWriteRow(BatchWriteRow),
    GetRange(GetRange),
}

impl OpRequest {
    /// The operation this request belongs to.
    pub fn operation(&self) -> Operation {
        match self {
            OpRequest::CreateTable(_) => Operation::CreateTable,
            OpRequest::ListTable => Operation::ListTable,
            OpRequest::DeleteTable(_) => Operation::DeleteTable,
            OpRequest::DescribeTable(_) => Operation::DescribeTable,
            OpRequest::UpdateTable(_) => Operation::UpdateTable,
            OpRequest::GetRow(_) => Operation::GetRow,
            OpRequest::PutRow(_) => Operation::PutRow,
            OpRequest::UpdateRow(_) => Operation::UpdateRow,
            OpRequest::DeleteRow(_) => Operation::DeleteRow,
            OpRequest::BatchGetRow(_) => Operation::BatchGetRow,
            OpRequest::BatchWriteRow(_) => Operation::BatchWriteRow,
            OpRequest::GetRange(_) => Operation::GetRange,
        }
    }

    /// Validate and encode the request body.
    pub fn encode_body(&self) -> Result<Bytes, Error> {
        let body = match self {
            OpRequest::CreateTable(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::ListTable => pb::ListTableRequest {}.encode_to_vec(),
            OpRequest::DeleteTable(request) => pb::DeleteTableRequest {
                table_name: request.table_name.clone(),
            }
            .encode_to_vec(),
            OpRequest::DescribeTable(request) => pb::DescribeTableRequest {
                table_name: request.table_name.clone(),
            }
            .encode_to_vec(),
            OpRequest::UpdateTable(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::GetRow(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::PutRow(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::UpdateRow(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::DeleteRow(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::BatchGetRow(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::BatchWriteRow(request) => request.to_wire()?.encode_to_vec(),
            OpRequest::GetRange(request) => request.to_wire()?.encode_to_vec(),
        };
        Ok(Bytes::from(body))
    }
}

fn check_capacity_present(throughput: &ReservedThroughput) -> Result<(), Error> {
    if throughput.read.is_none() && throughput.write.is_none() {
        return Err(Error::invalid_argument(
            "at least one of read or write of CapacityUnit is required",
        ));
    }
    Ok(())
}

fn check_attributes_disjoint(key: &PrimaryKey, attributes: &Attributes) -> Result<(), Error> {
    for name in attributes.names() {
        if key.contains(name) {
            return Err(Error::invalid_argument(format!(
                "attribute column '{name}' duplicates a primary key column"
            )));
        }
    }
    Ok(())
}

fn check_unique_keys<'a>(
    keys: impl Iterator<Item = &'a PrimaryKey>,
    table_name: &str,
) -> Result<(), Error> {
    let keys: Vec<_> = keys.collect();
    for (i, key) in keys.iter().enumerate() {
        if keys[..i].contains(key) {
            return Err(Error::invalid_argument(format!(
                "duplicated primary key in batch group for table '{table_name}'"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColumnKind;
    use ots_core::Value;

    fn key(pairs: &[(&str, Value)]) -> PrimaryKey {
        PrimaryKey::from_pairs(pairs.iter().map(|(n, v)| (n.to_string(), v.clone()))).unwrap()
    }

    #[test]
    fn test_operation_names_and_paths() {
        assert_eq!(Operation::PutRow.name(), "PutRow");
        assert_eq!(Operation::PutRow.path(), "/PutRow");
        assert_eq!(Operation::BatchGetRow.path(), "/BatchGetRow");
    }

    #[test]
    fn test_repeatable_operations_are_reads() {
        for op in [
            Operation::ListTable,
            Operation::DescribeTable,
            Operation::GetRow,
            Operation::BatchGetRow,
            Operation::GetRange,
        ] {
            assert!(op.is_repeatable(), "{op:?}");
        }
        for op in [
            Operation::CreateTable,
            Operation::DeleteTable,
            Operation::UpdateTable,
            Operation::PutRow,
            Operation::UpdateRow,
            Operation::DeleteRow,
            Operation::BatchWriteRow,
        ] {
            assert!(!op.is_repeatable(), "{op:?}");
        }
    }

    #[test]
    fn test_put_row_wire_round_trip() {
        let request = PutRow {
            table_name: "myTable".to_string(),
            condition: Condition::ExpectNotExist,
            primary_key: key(&[("pk", Value::String("A".to_string()))]),
            attributes: Attributes::from_pairs([("col", Value::Integer(7))]).unwrap(),
        };
        let body = OpRequest::PutRow(request).encode_body().unwrap();

        let decoded = pb::PutRowRequest::decode(body.as_ref()).unwrap();
        assert_eq!(decoded.table_name, "myTable");
        assert_eq!(
            decoded.condition.unwrap().row_existence,
            pb::RowExistenceExpectation::ExpectNotExist as i32
        );
        assert_eq!(decoded.primary_key.len(), 1);
        assert_eq!(decoded.primary_key[0].name, "pk");
        assert_eq!(
            Value::from_wire(decoded.primary_key[0].value.as_ref().unwrap()).unwrap(),
            Value::String("A".to_string())
        );
        assert_eq!(decoded.attribute_columns.len(), 1);
        assert_eq!(decoded.attribute_columns[0].name, "col");
        assert_eq!(
            Value::from_wire(decoded.attribute_columns[0].value.as_ref().unwrap()).unwrap(),
            Value::Integer(7)
        );
    }

    #[test]
    fn test_put_row_rejects_attribute_shadowing_key() {
        let request = PutRow {
            table_name: "t".to_string(),
            condition: Condition::Ignore,
            primary_key: key(&[("pk", Value::Integer(1))]),
            attributes: Attributes::from_pairs([("pk", Value::Integer(2))]).unwrap(),
        };
        assert!(OpRequest::PutRow(request).encode_body().is_err());
    }

    #[test]
    fn test_put_row_rejects_extreme_key() {
        let request = PutRow {
            table_name: "t".to_string(),
            condition: Condition::Ignore,
            primary_key: key(&[("pk", Value::InfMin)]),
            attributes: Attributes::new(),
        };
        assert!(OpRequest::PutRow(request).encode_body().is_err());
    }

    #[test]
    fn test_create_table_requires_some_capacity() {
        let meta = TableMeta::new("t", vec![("pk".to_string(), ColumnKind::String)]);
        let request = CreateTable {
            table_meta: meta.clone(),
            reserved_throughput: ReservedThroughput::default(),
        };
        assert!(OpRequest::CreateTable(request).encode_body().is_err());

        let request = CreateTable {
            table_meta: meta,
            reserved_throughput: ReservedThroughput::new(Some(1), None),
        };
        assert!(OpRequest::CreateTable(request).encode_body().is_ok());
    }

    #[test]
    fn test_update_row_rejects_empty_update() {
        let request = UpdateRow {
            table_name: "t".to_string(),
            condition: Condition::Ignore,
            primary_key: key(&[("pk", Value::Integer(1))]),
            update: RowUpdate::new(),
        };
        assert!(OpRequest::UpdateRow(request).encode_body().is_err());
    }

    #[test]
    fn test_batch_get_rejects_duplicate_keys() {
        let request = BatchGetRow {
            tables: vec![BatchGetTable {
                table_name: "t".to_string(),
                rows: vec![
                    key(&[("pk", Value::Integer(1))]),
                    key(&[("pk", Value::Integer(1))]),
                ],
                columns_to_get: None,
            }],
        };
        let err = OpRequest::BatchGetRow(request).encode_body().unwrap_err();
        assert!(err.to_string().contains("duplicated primary key"));
    }

    #[test]
    fn test_batch_get_rejects_empty_group() {
        let request = BatchGetRow {
            tables: vec![BatchGetTable {
                table_name: "t".to_string(),
                rows: vec![],
                columns_to_get: None,
            }],
        };
        assert!(OpRequest::BatchGetRow(request).encode_body().is_err());

        let request = BatchGetRow { tables: vec![] };
        assert!(OpRequest::BatchGetRow(request).encode_body().is_err());
    }

    #[test]
    fn test_batch_write_rejects_duplicates_within_kind() {
        let item = |n: i64| DeleteRowItem {
            condition: Condition::Ignore,
            primary_key: key(&[("pk", Value::Integer(n))]),
        };
        let request = BatchWriteRow {
            tables: vec![BatchWriteTable {
                table_name: "t".to_string(),
                deletes: vec![item(1), item(1)],
                ..Default::default()
            }],
        };
        assert!(OpRequest::BatchWriteRow(request).encode_body().is_err());
    }

    #[test]
    fn test_batch_write_allows_same_key_across_kinds() {
        let request = BatchWriteRow {
            tables: vec![BatchWriteTable {
                table_name: "t".to_string(),
                puts: vec![PutRowItem {
                    condition: Condition::Ignore,
                    primary_key: key(&[("pk", Value::Integer(1))]),
                    attributes: Attributes::from_pairs([("c", Value::Integer(1))]).unwrap(),
                }],
                deletes: vec![DeleteRowItem {
                    condition: Condition::Ignore,
                    primary_key: key(&[("pk", Value::Integer(1))]),
                }],
                ..Default::default()
            }],
        };
        assert!(OpRequest::BatchWriteRow(request).encode_body().is_ok());
    }

    #[test]
    fn test_batch_write_rejects_empty_group() {
        let request = BatchWriteRow {
            tables: vec![BatchWriteTable {
                table_name: "t".to_string(),
                ..Default::default()
            }],
        };
        assert!(OpRequest::BatchWriteRow(request).encode_body().is_err());
    }

    #[test]
    fn test_get_range_bound_ordering() {
        let range = |direction, start, end| GetRange {
            table_name: "t".to_string(),
            direction,
            inclusive_start: key(&[("pk", Value::Integer(start))]),
            exclusive_end: key(&[("pk", Value::Integer(end))]),
            columns_to_get: None,
            limit: None,
        };

        assert!(OpRequest::GetRange(range(Direction::Forward, 1, 2)).encode_body().is_ok());
        // Equal bounds describe an empty interval, which is legal.
        assert!(OpRequest::GetRange(range(Direction::Forward, 2, 2)).encode_body().is_ok());
        assert!(OpRequest::GetRange(range(Direction::Forward, 3, 2)).encode_body().is_err());

        assert!(OpRequest::GetRange(range(Direction::Backward, 2, 1)).encode_body().is_ok());
        assert!(OpRequest::GetRange(range(Direction::Backward, 1, 2)).encode_body().is_err());
    }

    #[test]
    fn test_get_range_accepts_extreme_bounds() {
        let request = GetRange {
            table_name: "t".to_string(),
            direction: Direction::Forward,
            inclusive_start: key(&[("pk", Value::InfMin)]),
            exclusive_end: key(&[("pk", Value::InfMax)]),
            columns_to_get: None,
            limit: Some(100),
        };
        let body = OpRequest::GetRange(request).encode_body().unwrap();
        let decoded = pb::GetRangeRequest::decode(body.as_ref()).unwrap();
        assert_eq!(decoded.limit, Some(100));
        assert_eq!(
            decoded.inclusive_start_primary_key[0].value.as_ref().unwrap().r#type,
            pb::ColumnType::InfMin as i32
        );
    }

    #[test]
    fn test_get_range_rejects_limit_beyond_int32() {
        let request = GetRange {
            table_name: "t".to_string(),
            direction: Direction::Forward,
            inclusive_start: key(&[("pk", Value::InfMin)]),
            exclusive_end: key(&[("pk", Value::InfMax)]),
            columns_to_get: None,
            limit: Some(i32::MAX as i64 + 1),
        };
        let err = OpRequest::GetRange(request).encode_body().unwrap_err();
        assert!(err.to_string().contains("exceeds the range of int32"));
    }

    #[test]
    fn test_get_range_rejects_non_positive_limit() {
        let request = GetRange {
            table_name: "t".to_string(),
            direction: Direction::Forward,
            inclusive_start: key(&[("pk", Value::InfMin)]),
            exclusive_end: key(&[("pk", Value::InfMax)]),
            columns_to_get: None,
            limit: Some(0),
        };
        assert!(OpRequest::GetRange(request).encode_body().is_err());
    }
}
