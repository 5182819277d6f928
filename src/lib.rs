// MIT License - Copyright (c) 2026 Peter Wright
// Event log protocol library
//
//! # satel-event-log
//!
//! Reads the event log of a Satel alarm panel over the binary protocol of its
//! ETHM integration module (TCP port 7094).
//!
//! The protocol core is small: [`checksum`] and [`frame`] build and parse the
//! `FE FE ... FE 0D` frames, [`record`] unpacks the 8-byte event records, and
//! [`reader`] pages through the standard and Grade 2 logs with the cursor the
//! panel hands back after every record. [`codes`] and [`display`] turn
//! records into text and are not needed to talk to the panel.
//!
//! ## Quick Start
//!
//! ```no_run
//! use satel_event_log::{retrieve_logs, ReaderConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReaderConfig::builder()
//!         .host("192.168.1.100")
//!         .limit(50)
//!         .both_classes()
//!         .build();
//!
//!     for event in retrieve_logs(&config).await? {
//!         println!("{} {} code={}", event.date_string(), event.time_string(), event.code);
//!     }
//!     Ok(())
//! }
//! ```

pub mod checksum;
pub mod codes;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod frame;
pub mod reader;
pub mod record;
pub mod transport;

// Re-exports for convenience
pub use codes::{EventCodeInfo, EventCodeTable};
pub use config::{ReaderConfig, ReaderConfigBuilder};
pub use error::{Result, SatelError};
pub use frame::{decode_frame, encode_frame, Frame, FrameDecode, FrameError};
pub use reader::{
    read_event_log, retrieve_logs, ClassOutcome, EndOfLogReason, LogClass, LogReader,
    MalformedResponse, RetrievalReport,
};
pub use record::EventRecord;
pub use transport::{TcpTransport, Transport};
