//! Range-scan iteration.
//!
//! [`RangeScan`] drives GetRange across as many requests as the interval
//! needs, feeding each page's next-start key into the following request.
//! It is an explicit iterator advanced one [`RangeScan::next`] call at a
//! time: finite, not restartable once exhausted, and safe to drop
//! mid-iteration (nothing is held beyond the in-flight request).

use std::collections::VecDeque;

use crate::client::Client;
use crate::error::Error;
use crate::request::GetRange;
use crate::transport::Transport;
use crate::types::{CapacityUnit, Direction, PrimaryKey, Row};

/// A lazy sequence of rows in a key interval.
///
/// The caller-owned tally accumulates the consumed capacity of every
/// underlying request. The scan mutates it only from the task driving the
/// iteration; sharing one tally between concurrent scans is the caller's
/// responsibility to avoid.
pub struct RangeScan<'a, T: Transport> {
    client: &'a Client<T>,
    table_name: String,
    direction: Direction,
    exclusive_end: PrimaryKey,
    columns_to_get: Option<Vec<String>>,
    tally: &'a mut CapacityUnit,
    /// Start key for the next request; `None` once the scan is finished.
    next_start: Option<PrimaryKey>,
    /// Remaining row budget; `None` is unbounded.
    remaining: Option<i64>,
    buffer: VecDeque<Row>,
}

impl<'a, T: Transport> RangeScan<'a, T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        client: &'a Client<T>,
        table_name: String,
        direction: Direction,
        inclusive_start: PrimaryKey,
        exclusive_end: PrimaryKey,
        columns_to_get: Option<Vec<String>>,
        count: Option<i64>,
        tally: &'a mut CapacityUnit,
    ) -> Result<Self, Error> {
        if let Some(count) = count {
            if count <= 0 {
                return Err(Error::invalid_argument(
                    "the value of count must be larger than 0",
                ));
            }
        }
        *tally = CapacityUnit::default();
        Ok(RangeScan {
            client,
            table_name,
            direction,
            exclusive_end,
            columns_to_get,
            tally,
            next_start: Some(inclusive_start),
            remaining: count,
            buffer: VecDeque::new(),
        })
    }

    /// The next row, or `None` when the interval or the row budget is
    /// exhausted. After an error the scan is finished.
    pub async fn next(&mut self) -> Option<Result<Row, Error>> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                    if *remaining <= 0 {
                        self.next_start = None;
                        self.buffer.clear();
                    }
                }
                return Some(Ok(row));
            }

            let start = self.next_start.take()?;
            let request = GetRange {
                table_name: self.table_name.clone(),
                direction: self.direction,
                inclusive_start: start,
                exclusive_end: self.exclusive_end.clone(),
                columns_to_get: self.columns_to_get.clone(),
                limit: self.remaining,
            };
            match self.client.get_range(request).await {
                Ok(page) => {
                    self.tally.add(page.consumed);
                    self.next_start = page.next_start_primary_key;
                    self.buffer.extend(page.rows);
                    if self.buffer.is_empty() && self.next_start.is_none() {
                        return None;
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
