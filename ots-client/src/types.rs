//! Typed table and row structures.
//!
//! These are the value objects callers hand to (and get back from) the
//! operation methods. They enforce the structural invariants that do not
//! need a full request for context: unique column names within a key or an
//! attribute set, disjoint put/delete sets in a row update. Everything here
//! is built immediately before one call and discarded after it; nothing
//! holds a connection or outlives a request/response cycle except
//! [`CapacityUnit`] tallies, which are caller-owned.

use std::collections::{BTreeMap, BTreeSet};

use ots_core::{Value, pb};

use crate::error::Error;

/// Precondition evaluated by the service before a write mutates a row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Write unconditionally.
    #[default]
    Ignore,
    /// The row must already exist.
    ExpectExist,
    /// The row must not exist.
    ExpectNotExist,
}

impl Condition {
    pub(crate) fn to_wire(self) -> pb::Condition {
        let expectation = match self {
            Condition::Ignore => pb::RowExistenceExpectation::Ignore,
            Condition::ExpectExist => pb::RowExistenceExpectation::ExpectExist,
            Condition::ExpectNotExist => pb::RowExistenceExpectation::ExpectNotExist,
        };
        pb::Condition {
            row_existence: expectation as i32,
        }
    }
}

/// Range-scan direction. The start bound is inclusive and the end bound
/// exclusive in both directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub(crate) fn to_wire(self) -> pb::Direction {
        match self {
            Direction::Forward => pb::Direction::Forward,
            Direction::Backward => pb::Direction::Backward,
        }
    }
}

/// Concrete column type usable in a table schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Integer,
    String,
    Boolean,
    Double,
    Binary,
}

impl ColumnKind {
    pub(crate) fn to_wire(self) -> pb::ColumnType {
        match self {
            ColumnKind::Integer => pb::ColumnType::Integer,
            ColumnKind::String => pb::ColumnType::String,
            ColumnKind::Boolean => pb::ColumnType::Boolean,
            ColumnKind::Double => pb::ColumnType::Double,
            ColumnKind::Binary => pb::ColumnType::Binary,
        }
    }

    pub(crate) fn from_wire(raw: i32) -> Result<Self, Error> {
        match pb::ColumnType::try_from(raw) {
            Ok(pb::ColumnType::Integer) => Ok(ColumnKind::Integer),
            Ok(pb::ColumnType::String) => Ok(ColumnKind::String),
            Ok(pb::ColumnType::Boolean) => Ok(ColumnKind::Boolean),
            Ok(pb::ColumnType::Double) => Ok(ColumnKind::Double),
            Ok(pb::ColumnType::Binary) => Ok(ColumnKind::Binary),
            _ => Err(Error::invalid_argument(format!(
                "invalid schema column type: {raw}"
            ))),
        }
    }
}

/// Read/write capacity units, both as per-response consumption and as the
/// caller-owned tally a range scan accumulates into.
///
/// A scan mutates its tally only from the task driving the iteration;
/// sharing one tally between concurrent scans is not supported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CapacityUnit {
    pub read: i32,
    pub write: i32,
}

impl CapacityUnit {
    pub fn new(read: i32, write: i32) -> Self {
        CapacityUnit { read, write }
    }

    /// Decode consumed capacity, treating absent fields as zero.
    pub(crate) fn from_wire(consumed: Option<&pb::ConsumedCapacity>) -> Self {
        let unit = consumed.and_then(|c| c.capacity_unit.as_ref());
        CapacityUnit {
            read: unit.and_then(|u| u.read).unwrap_or(0),
            write: unit.and_then(|u| u.write).unwrap_or(0),
        }
    }

    pub(crate) fn add(&mut self, other: CapacityUnit) {
        self.read += other.read;
        self.write += other.write;
    }
}

/// Reserved throughput to set on a table. `None` leaves that side unchanged
/// (UpdateTable) or unset (CreateTable).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReservedThroughput {
    pub read: Option<i32>,
    pub write: Option<i32>,
}

impl ReservedThroughput {
    pub fn new(read: Option<i32>, write: Option<i32>) -> Self {
        ReservedThroughput { read, write }
    }

    pub(crate) fn to_wire(self) -> pb::ReservedThroughput {
        pb::ReservedThroughput {
            capacity_unit: Some(pb::CapacityUnit {
                read: self.read,
                write: self.write,
            }),
        }
    }
}

/// Reserved-throughput bookkeeping returned by DescribeTable/UpdateTable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReservedThroughputDetails {
    pub capacity_unit: CapacityUnit,
    pub last_increase_time: i64,
    pub last_decrease_time: Option<i64>,
    pub number_of_decreases_today: i32,
}

impl ReservedThroughputDetails {
    pub(crate) fn from_wire(details: Option<&pb::ReservedThroughputDetails>) -> Self {
        let Some(details) = details else {
            return ReservedThroughputDetails::default();
        };
        let unit = details.capacity_unit.as_ref();
        ReservedThroughputDetails {
            capacity_unit: CapacityUnit {
                read: unit.and_then(|u| u.read).unwrap_or(0),
                write: unit.and_then(|u| u.write).unwrap_or(0),
            },
            last_increase_time: details.last_increase_time,
            last_decrease_time: details.last_decrease_time,
            number_of_decreases_today: details.number_of_decreases_today,
        }
    }
}

/// A table's name and primary-key schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableMeta {
    pub table_name: String,
    /// Primary-key columns in schema order.
    pub schema: Vec<(String, ColumnKind)>,
}

impl TableMeta {
    pub fn new(table_name: impl Into<String>, schema: Vec<(String, ColumnKind)>) -> Self {
        TableMeta {
            table_name: table_name.into(),
            schema,
        }
    }

    pub(crate) fn to_wire(&self) -> Result<pb::TableMeta, Error> {
        if self.schema.is_empty() {
            return Err(Error::invalid_argument(
                "schema of primary key should not be empty",
            ));
        }
        let mut seen = BTreeSet::new();
        for (name, _) in &self.schema {
            if !seen.insert(name.as_str()) {
                return Err(Error::invalid_argument(format!(
                    "duplicated primary key name: {name}"
                )));
            }
        }
        Ok(pb::TableMeta {
            table_name: self.table_name.clone(),
            primary_key: self
                .schema
                .iter()
                .map(|(name, kind)| pb::ColumnSchema {
                    name: name.clone(),
                    r#type: kind.to_wire() as i32,
                })
                .collect(),
        })
    }

    pub(crate) fn from_wire(meta: &pb::TableMeta) -> Result<Self, Error> {
        let mut schema = Vec::with_capacity(meta.primary_key.len());
        for column in &meta.primary_key {
            schema.push((column.name.clone(), ColumnKind::from_wire(column.r#type)?));
        }
        Ok(TableMeta {
            table_name: meta.table_name.clone(),
            schema,
        })
    }
}

/// An ordered-by-name mapping from primary-key column name to value.
///
/// Column names are unique; the order keys are supplied in is irrelevant
/// (the service matches by name and type, not position). The range extremes
/// are accepted here only when the key is used as a scan bound; row
/// operations reject them at encode time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PrimaryKey {
    columns: BTreeMap<String, Value>,
}

impl PrimaryKey {
    pub fn new() -> Self {
        PrimaryKey::default()
    }

    /// Add a key column. Fails on a duplicate name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), Error> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(Error::invalid_argument(format!(
                "duplicated primary key name: {name}"
            )));
        }
        self.columns.insert(name, value.into());
        Ok(())
    }

    /// Build a key from name/value pairs.
    ///
    /// # Example
    ///
    /// ```
    /// use ots_client::PrimaryKey;
    ///
    /// let key = PrimaryKey::from_pairs([("pk", "A")]).unwrap();
    /// assert_eq!(key.len(), 1);
    /// ```
    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Result<Self, Error>
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let mut key = PrimaryKey::new();
        for (name, value) in pairs {
            key.insert(name, value)?;
        }
        Ok(key)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate columns in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Encode as a concrete row key; the range extremes are rejected.
    pub(crate) fn to_wire(&self) -> Result<Vec<pb::Column>, Error> {
        self.to_wire_inner(false)
    }

    /// Encode as a scan bound, where the range extremes are legal.
    pub(crate) fn to_wire_bound(&self) -> Result<Vec<pb::Column>, Error> {
        self.to_wire_inner(true)
    }

    fn to_wire_inner(&self, allow_extremes: bool) -> Result<Vec<pb::Column>, Error> {
        if self.columns.is_empty() {
            return Err(Error::invalid_argument("primary key should not be empty"));
        }
        self.columns
            .iter()
            .map(|(name, value)| {
                let wire = if allow_extremes {
                    value.to_wire_bound()
                } else {
                    value.to_wire()?
                };
                Ok(pb::Column {
                    name: name.clone(),
                    value: Some(wire),
                })
            })
            .collect()
    }

    pub(crate) fn from_wire(columns: &[pb::Column]) -> Result<Self, Error> {
        let mut key = PrimaryKey::new();
        for column in columns {
            let value = column
                .value
                .as_ref()
                .ok_or_else(|| Error::invalid_argument("primary key column without a value"))?;
            key.insert(column.name.clone(), Value::from_wire(value)?)?;
        }
        Ok(key)
    }

    /// Compare two keys under primary-key ordering: lexicographic on the
    /// first differing column (in name order), extremes below/above every
    /// concrete value. Fails when the keys name different columns or a
    /// column's values have incompatible concrete types.
    pub(crate) fn cmp_key_order(&self, other: &PrimaryKey) -> Result<std::cmp::Ordering, Error> {
        if self.columns.len() != other.columns.len()
            || !self
                .columns
                .keys()
                .zip(other.columns.keys())
                .all(|(a, b)| a == b)
        {
            return Err(Error::invalid_argument(
                "start and end primary keys should name the same columns",
            ));
        }
        for ((name, a), (_, b)) in self.columns.iter().zip(other.columns.iter()) {
            let ordering = a.cmp_key_order(b).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "incompatible value types for primary key column '{name}'"
                ))
            })?;
            if ordering != std::cmp::Ordering::Equal {
                return Ok(ordering);
            }
        }
        Ok(std::cmp::Ordering::Equal)
    }
}

/// A mapping from attribute column name to value, disjoint from the row's
/// key columns. Duplicate names are rejected, as are the range extremes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    columns: BTreeMap<String, Value>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes::default()
    }

    /// Add an attribute column. Fails on a duplicate name or a range
    /// extreme.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), Error> {
        let name = name.into();
        let value = value.into();
        if value.is_extreme() {
            return Err(Error::invalid_argument(format!(
                "attribute column '{name}' cannot hold a range extreme"
            )));
        }
        if self.columns.contains_key(&name) {
            return Err(Error::invalid_argument(format!(
                "duplicated attribute column name: {name}"
            )));
        }
        self.columns.insert(name, value);
        Ok(())
    }

    pub fn from_pairs<N, V>(pairs: impl IntoIterator<Item = (N, V)>) -> Result<Self, Error>
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let mut attributes = Attributes::new();
        for (name, value) in pairs {
            attributes.insert(name, value)?;
        }
        Ok(attributes)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub(crate) fn to_wire(&self) -> Result<Vec<pb::Column>, Error> {
        self.columns
            .iter()
            .map(|(name, value)| {
                Ok(pb::Column {
                    name: name.clone(),
                    value: Some(value.to_wire()?),
                })
            })
            .collect()
    }

    pub(crate) fn from_wire(columns: &[pb::Column]) -> Result<Self, Error> {
        let mut attributes = Attributes::new();
        for column in columns {
            let value = column
                .value
                .as_ref()
                .ok_or_else(|| Error::invalid_argument("attribute column without a value"))?;
            attributes.insert(column.name.clone(), Value::from_wire(value)?)?;
        }
        Ok(attributes)
    }
}

/// A set of named "put" assignments unioned with a set of named "delete"
/// markers for UpdateRow. A name must not appear in both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowUpdate {
    puts: BTreeMap<String, Value>,
    deletes: BTreeSet<String>,
}

impl RowUpdate {
    pub fn new() -> Self {
        RowUpdate::default()
    }

    /// Assign a column. Fails when the name is already assigned or marked
    /// for deletion, or the value is a range extreme.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), Error> {
        let name = name.into();
        let value = value.into();
        if value.is_extreme() {
            return Err(Error::invalid_argument(format!(
                "attribute column '{name}' cannot hold a range extreme"
            )));
        }
        if self.puts.contains_key(&name) || self.deletes.contains(&name) {
            return Err(Error::invalid_argument(format!(
                "duplicated column name in update: {name}"
            )));
        }
        self.puts.insert(name, value);
        Ok(())
    }

    /// Mark a column for deletion. Fails when the name is already present.
    pub fn delete(&mut self, name: impl Into<String>) -> Result<(), Error> {
        let name = name.into();
        if self.puts.contains_key(&name) || self.deletes.contains(&name) {
            return Err(Error::invalid_argument(format!(
                "duplicated column name in update: {name}"
            )));
        }
        self.deletes.insert(name);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.puts.is_empty() && self.deletes.is_empty()
    }

    pub(crate) fn to_wire(&self) -> Result<Vec<pb::ColumnUpdate>, Error> {
        let mut updates = Vec::with_capacity(self.puts.len() + self.deletes.len());
        for (name, value) in &self.puts {
            updates.push(pb::ColumnUpdate {
                r#type: pb::OperationType::Put as i32,
                name: name.clone(),
                value: Some(value.to_wire()?),
            });
        }
        for name in &self.deletes {
            updates.push(pb::ColumnUpdate {
                r#type: pb::OperationType::Delete as i32,
                name: name.clone(),
                value: None,
            });
        }
        Ok(updates)
    }
}

/// A decoded row: key columns plus attribute columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    pub primary_key: PrimaryKey,
    pub attributes: Attributes,
}

impl Row {
    pub(crate) fn from_wire(row: &pb::Row) -> Result<Self, Error> {
        Ok(Row {
            primary_key: PrimaryKey::from_wire(&row.primary_key_columns)?,
            attributes: Attributes::from_wire(&row.attribute_columns)?,
        })
    }

    /// Whether the service returned an empty row (no such row for a GetRow).
    pub(crate) fn is_absent(row: &pb::Row) -> bool {
        row.primary_key_columns.is_empty() && row.attribute_columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_key_rejects_duplicate_names() {
        let mut key = PrimaryKey::new();
        key.insert("pk", 1i64).unwrap();
        let err = key.insert("pk", 2i64).unwrap_err();
        assert!(err.is_client());
    }

    #[test]
    fn test_primary_key_order_is_by_name() {
        let a = PrimaryKey::from_pairs([("b", Value::Integer(2)), ("a", Value::Integer(1))]).unwrap();
        let b = PrimaryKey::from_pairs([("a", Value::Integer(1)), ("b", Value::Integer(2))]).unwrap();
        assert_eq!(a, b);
        let names: Vec<_> = a.iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_primary_key_wire_rejects_extremes() {
        let key = PrimaryKey::from_pairs([("pk", Value::InfMin)]).unwrap();
        assert!(key.to_wire().is_err());
        assert!(key.to_wire_bound().is_ok());
    }

    #[test]
    fn test_empty_primary_key_rejected() {
        assert!(PrimaryKey::new().to_wire().is_err());
    }

    #[test]
    fn test_key_order_first_differing_column_wins() {
        let a = PrimaryKey::from_pairs([("gid", 1i64), ("uid", 9i64)]).unwrap();
        let b = PrimaryKey::from_pairs([("gid", 2i64), ("uid", 0i64)]).unwrap();
        assert_eq!(a.cmp_key_order(&b).unwrap(), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_key_order_with_extremes() {
        let start = PrimaryKey::from_pairs([("gid", Value::Integer(1)), ("uid", Value::InfMin)])
            .unwrap();
        let end =
            PrimaryKey::from_pairs([("gid", Value::Integer(1)), ("uid", Value::InfMax)]).unwrap();
        assert_eq!(start.cmp_key_order(&end).unwrap(), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_key_order_mismatched_columns() {
        let a = PrimaryKey::from_pairs([("gid", 1i64)]).unwrap();
        let b = PrimaryKey::from_pairs([("uid", 1i64)]).unwrap();
        assert!(a.cmp_key_order(&b).is_err());
    }

    #[test]
    fn test_key_order_incompatible_types() {
        let a = PrimaryKey::from_pairs([("pk", Value::Integer(1))]).unwrap();
        let b = PrimaryKey::from_pairs([("pk", Value::String("1".into()))]).unwrap();
        assert!(a.cmp_key_order(&b).is_err());
    }

    #[test]
    fn test_attributes_reject_extremes_and_duplicates() {
        let mut attributes = Attributes::new();
        assert!(attributes.insert("col", Value::InfMax).is_err());
        attributes.insert("col", 7i64).unwrap();
        assert!(attributes.insert("col", 8i64).is_err());
    }

    #[test]
    fn test_row_update_put_delete_disjoint() {
        let mut update = RowUpdate::new();
        update.put("a", 1i64).unwrap();
        assert!(update.delete("a").is_err());
        update.delete("b").unwrap();
        assert!(update.put("b", 2i64).is_err());
    }

    #[test]
    fn test_row_update_wire_order() {
        let mut update = RowUpdate::new();
        update.put("name", "x").unwrap();
        update.delete("stale").unwrap();
        let wire = update.to_wire().unwrap();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0].r#type, pb::OperationType::Put as i32);
        assert!(wire[0].value.is_some());
        assert_eq!(wire[1].r#type, pb::OperationType::Delete as i32);
        assert!(wire[1].value.is_none());
    }

    #[test]
    fn test_capacity_from_wire_absent_is_zero() {
        assert_eq!(CapacityUnit::from_wire(None), CapacityUnit::new(0, 0));
        let consumed = pb::ConsumedCapacity {
            capacity_unit: Some(pb::CapacityUnit {
                read: Some(3),
                write: None,
            }),
        };
        assert_eq!(
            CapacityUnit::from_wire(Some(&consumed)),
            CapacityUnit::new(3, 0)
        );
    }

    #[test]
    fn test_table_meta_duplicate_schema_name() {
        let meta = TableMeta::new(
            "t",
            vec![
                ("pk".to_string(), ColumnKind::String),
                ("pk".to_string(), ColumnKind::Integer),
            ],
        );
        assert!(meta.to_wire().is_err());
    }
}
