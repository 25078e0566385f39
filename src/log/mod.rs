//! Structured run history
//!
//! The world appends one measurement record per entity per tick; experiment
//! drivers can persist the records as delimited text and reload them in the
//! same row shape, e.g. to replay a recorded run through a [`ReplayAgent`].
//!
//! [`ReplayAgent`]: crate::agent::ReplayAgent

use crate::core::{Result, SimError, Tick, Value};
use std::io::{BufRead, Write};

/// One `(time, kind, data)` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub time: Tick,
    pub kind: String,
    pub data: serde_json::Value,
}

/// Append-only history of one run.
#[derive(Debug, Default)]
pub struct RunLog {
    records: Vec<Record>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time: Tick, kind: &str, data: serde_json::Value) {
        self.records.push(Record {
            time,
            kind: kind.to_string(),
            data,
        });
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Per-tick values of one attribute of one entity, in time order,
    /// extracted from `"measure"` records.
    pub fn attribute_history(&self, entity: &str, attribute: &str) -> Vec<(Tick, Value)> {
        let mut history: Vec<(Tick, Value)> = self
            .records
            .iter()
            .filter(|r| r.kind == "measure" && r.data["entity"] == entity)
            .filter_map(|r| {
                let raw = r.data.get("attributes")?.get(attribute)?;
                let value: Value = serde_json::from_value(raw.clone()).ok()?;
                Some((r.time, value))
            })
            .collect();
        history.sort_by_key(|(time, _)| *time);
        history
    }

    /// Write every record as one tab-separated `time\tkind\tjson` line.
    pub fn write_delimited<W: Write>(&self, writer: &mut W) -> Result<()> {
        for record in &self.records {
            writeln!(
                writer,
                "{}\t{}\t{}",
                record.time,
                record.kind,
                serde_json::to_string(&record.data)?
            )?;
        }
        Ok(())
    }

    /// Reload records written by [`RunLog::write_delimited`].
    pub fn read_delimited<R: BufRead>(reader: R) -> Result<Self> {
        let mut log = RunLog::new();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, '\t');
            let time = fields
                .next()
                .and_then(|f| f.parse::<Tick>().ok())
                .ok_or_else(|| SimError::MalformedRecord(line.clone()))?;
            let kind = fields
                .next()
                .ok_or_else(|| SimError::MalformedRecord(line.clone()))?
                .to_string();
            let data = fields
                .next()
                .ok_or_else(|| SimError::MalformedRecord(line.clone()))?;
            log.records.push(Record {
                time,
                kind,
                data: serde_json::from_str(data)?,
            });
        }
        Ok(log)
    }
}
