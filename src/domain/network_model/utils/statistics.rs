use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::sync::{OnceLock, mpsc};
use std::thread;

use crate::error::Result;

/// Each event is a set of key-value pairs. This enum lists all allowed keys and thus the
/// columns of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatParameter {
    /// Id of the simulation run (one per erlang and seed).
    RunId,
    Erlang,
    Seed,

    /// Simulated time of the event.
    Time,

    /// Why this entry was made.
    LogDescription,

    // Request
    RequestId,
    Source,
    Destination,
    Bandwidth,

    /// "committed", "blocked" or "released".
    Outcome,
    BlockReason,
    WasGroomed,
    WasPartiallyGroomed,
    IsSliced,
    Hops,
    PathLength,

    /// Modulation formats of the carrying lightpaths, joined with '|'.
    Modulations,
    NumTransponders,

    // Lightpath
    LightpathId,

    /// "created" or "released".
    LightpathEvent,
    LightpathBandwidth,
    Band,
    Core,
    StartSlot,
    EndSlot,
}

impl StatParameter {
    /// All columns in output order.
    pub const ALL: [StatParameter; 25] = [
        StatParameter::RunId,
        StatParameter::Erlang,
        StatParameter::Seed,
        StatParameter::Time,
        StatParameter::LogDescription,
        StatParameter::RequestId,
        StatParameter::Source,
        StatParameter::Destination,
        StatParameter::Bandwidth,
        StatParameter::Outcome,
        StatParameter::BlockReason,
        StatParameter::WasGroomed,
        StatParameter::WasPartiallyGroomed,
        StatParameter::IsSliced,
        StatParameter::Hops,
        StatParameter::PathLength,
        StatParameter::Modulations,
        StatParameter::NumTransponders,
        StatParameter::LightpathId,
        StatParameter::LightpathEvent,
        StatParameter::LightpathBandwidth,
        StatParameter::Band,
        StatParameter::Core,
        StatParameter::StartSlot,
        StatParameter::EndSlot,
    ];

    /// Column name in the CSV header.
    pub fn header(&self) -> &'static str {
        match self {
            StatParameter::RunId => "RunId",
            StatParameter::Erlang => "Erlang",
            StatParameter::Seed => "Seed",
            StatParameter::Time => "Time",
            StatParameter::LogDescription => "LogDescription",
            StatParameter::RequestId => "RequestId",
            StatParameter::Source => "Source",
            StatParameter::Destination => "Destination",
            StatParameter::Bandwidth => "Bandwidth",
            StatParameter::Outcome => "Outcome",
            StatParameter::BlockReason => "BlockReason",
            StatParameter::WasGroomed => "WasGroomed",
            StatParameter::WasPartiallyGroomed => "WasPartiallyGroomed",
            StatParameter::IsSliced => "IsSliced",
            StatParameter::Hops => "Hops",
            StatParameter::PathLength => "PathLength",
            StatParameter::Modulations => "Modulations",
            StatParameter::NumTransponders => "NumTransponders",
            StatParameter::LightpathId => "LightpathId",
            StatParameter::LightpathEvent => "LightpathEvent",
            StatParameter::LightpathBandwidth => "LightpathBandwidth",
            StatParameter::Band => "Band",
            StatParameter::Core => "Core",
            StatParameter::StartSlot => "StartSlot",
            StatParameter::EndSlot => "EndSlot",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        StatParameter::ALL.iter().map(|param| param.header()).collect()
    }
}

/// Values are stored in their native format and only formatted when written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Integer(v as i64)
    }
}

impl From<usize> for StatValue {
    fn from(v: usize) -> Self {
        StatValue::Integer(v as i64)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl From<bool> for StatValue {
    fn from(v: bool) -> Self {
        StatValue::Bool(v)
    }
}

impl StatValue {
    fn to_field(&self) -> String {
        match self {
            StatValue::Text(t) => t.clone(),
            StatValue::Integer(i) => i.to_string(),
            StatValue::Float(f) => f.to_string(),
            StatValue::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    pub fn get(&self, param: StatParameter) -> Option<&StatValue> {
        self.data.get(&param)
    }

    /// The event as one CSV row in header order. Missing values become "NA".
    pub fn to_row(&self) -> Vec<String> {
        StatParameter::ALL.iter().map(|param| self.data.get(param).map(StatValue::to_field).unwrap_or_else(|| "NA".to_string())).collect()
    }
}

/// Messages sent from the simulation threads to the writer thread.
enum StatsMessage {
    Log(StatisticEvent),
    Flush(mpsc::Sender<()>),
}

/// Handle for logging statistic events. Holds the sending side of the channel; a background
/// thread owns the CSV writer.
pub struct StatsCollector {
    sender: mpsc::Sender<StatsMessage>,
}

impl StatsCollector {
    /// Spawns the writer thread. Without a file name the rows go to stdout.
    pub fn init(filename: Option<&str>) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match filename {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };

        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            Self::worker_loop(rx, writer);
        });

        Ok(StatsCollector { sender: tx })
    }

    fn worker_loop(rx: mpsc::Receiver<StatsMessage>, writer: Box<dyn Write + Send>) {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);

        if let Err(e) = csv_wtr.write_record(StatParameter::headers()) {
            log::error!("StatsError: Failed to write headers: {}", e);
        }

        for msg in rx {
            match msg {
                StatsMessage::Log(event) => {
                    if let Err(e) = csv_wtr.write_record(event.to_row()) {
                        log::error!("StatsError: Failed to write record: {}", e);
                    }
                }
                StatsMessage::Flush(done) => {
                    if let Err(e) = csv_wtr.flush() {
                        log::error!("StatsError: Failed to flush: {}", e);
                    }
                    let _ = done.send(());
                }
            }
        }

        let _ = csv_wtr.flush();
    }

    /// Queues an event. Never blocks the simulation.
    pub fn add_event(&self, event: StatisticEvent) {
        // A dead writer thread must not stop the simulation.
        let _ = self.sender.send(StatsMessage::Log(event));
    }

    /// Blocks until every event queued so far is written.
    pub fn flush(&self) {
        let (done_tx, done_rx) = mpsc::channel();
        if self.sender.send(StatsMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }
}

static GLOBAL_STATS: OnceLock<StatsCollector> = OnceLock::new();

/// Initializes the global statistics collector. Later calls keep the first collector.
pub fn init_global(filename: Option<&str>) -> Result<()> {
    if GLOBAL_STATS.get().is_some() {
        log::warn!("StatsAlreadyInitialized: Keeping the existing statistics collector.");
        return Ok(());
    }

    let collector = StatsCollector::init(filename)?;
    let _ = GLOBAL_STATS.set(collector);
    Ok(())
}

pub fn global_enabled() -> bool {
    GLOBAL_STATS.get().is_some()
}

/// Logs an event to the global collector. Safe to call from any thread.
pub fn add_global_event(event: StatisticEvent) {
    if let Some(collector) = GLOBAL_STATS.get() {
        collector.add_event(event);
    } else {
        log::warn!("StatsDropped: Statistics event dropped. Call init_global() first.");
    }
}

pub fn flush_global() {
    if let Some(collector) = GLOBAL_STATS.get() {
        collector.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_header_order() {
        let mut event = StatisticEvent::new();
        event.set(StatParameter::RequestId, 7u64).set(StatParameter::Outcome, "blocked").set(StatParameter::IsSliced, false);

        let row = event.to_row();
        assert_eq!(row.len(), StatParameter::headers().len());
        assert_eq!(row[5], "7");
        assert_eq!(row[9], "blocked");
        assert_eq!(row[13], "false");
        assert_eq!(row[0], "NA");
    }
}
