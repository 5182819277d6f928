// MIT License - Copyright (c) 2026 Peter Wright
// Event log retrieval

use std::fmt;
use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::ReaderConfig;
use crate::constants::{
    CURSOR_LEN, GRADE2_INITIAL_CURSOR, READ_EVENT_CMD, RECORD_LEN, STANDARD_INITIAL_CURSOR,
};
use crate::error::Result;
use crate::frame::{decode_frame, encode_frame, hex, Frame, FrameDecode, FrameError};
use crate::record::{EventRecord, RecordLengthError};
use crate::transport::{TcpTransport, Transport};

/// The two independently paginated event logs of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogClass {
    /// Main event log. Ends on a record with the continuation bit cleared.
    Standard,
    /// Grade 2 log. Ends on a record whose first raw byte is zero.
    Grade2,
}

impl LogClass {
    /// Cursor sent with the first request for this class.
    pub fn initial_cursor(&self) -> [u8; CURSOR_LEN] {
        match self {
            Self::Standard => STANDARD_INITIAL_CURSOR,
            Self::Grade2 => GRADE2_INITIAL_CURSOR,
        }
    }

    /// Decide whether a response record marks the end of this log.
    ///
    /// `raw` is the record as received, `decoded` its decoding. The two
    /// classes use different sentinels and must not be swapped: a Grade 2
    /// record does not carry a meaningful continuation bit, and a standard
    /// record may legitimately start with a zero byte.
    pub fn end_of_log(
        &self,
        raw: &[u8],
        decoded: &std::result::Result<EventRecord, RecordLengthError>,
    ) -> Option<EndOfLogReason> {
        match self {
            Self::Grade2 => (raw.first() == Some(&0)).then_some(EndOfLogReason::ZeroMarker),
            Self::Standard => match decoded {
                Err(_) => Some(EndOfLogReason::UndecodableRecord),
                Ok(record) if !record.continuation => Some(EndOfLogReason::ContinuationCleared),
                Ok(_) => None,
            },
        }
    }
}

impl fmt::Display for LogClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Grade2 => write!(f, "Grade 2"),
        }
    }
}

/// Why a log class was considered fully read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOfLogReason {
    /// Standard log: the record's "z" bit was clear.
    ContinuationCleared,
    /// Standard log: the record could not be decoded.
    UndecodableRecord,
    /// Grade 2 log: the record's first byte was zero.
    ZeroMarker,
}

/// A response that could not be used to continue the read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedResponse {
    #[error("bad frame: {0}")]
    Frame(#[from] FrameError),

    #[error("unexpected response command {0:#04X}")]
    UnexpectedCommand(u8),

    #[error("payload too short for an event record ({len} bytes)")]
    Truncated { len: usize },

    #[error("payload has no next cursor ({len} bytes)")]
    MissingCursor { len: usize },
}

/// How the read of one log class ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassOutcome {
    EndOfLog(EndOfLogReason),
    /// The overall record limit was reached during or before this class.
    LimitReached,
    /// No complete response within the request timeout.
    TimedOut,
    Malformed(MalformedResponse),
    /// The connection failed. No further classes are read.
    TransportFailed(String),
}

impl ClassOutcome {
    /// Whether the class ended because the panel or the limit said so, rather
    /// than through a failure.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::EndOfLog(_) | Self::LimitReached)
    }
}

/// Events gathered by a run, plus how each requested class ended.
#[derive(Debug, Clone, Default)]
pub struct RetrievalReport {
    /// Events in retrieval order: classes in request order, each newest first
    /// as the panel returns them.
    pub events: Vec<EventRecord>,
    pub outcomes: Vec<(LogClass, ClassOutcome)>,
}

impl RetrievalReport {
    /// Whether every class that was started ended cleanly.
    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_clean())
    }
}

/// Drives the read-event-log command over a transport.
///
/// The cursor lives in the read loop and is threaded from each response into
/// the next request; the reader holds no state between runs besides the
/// transport.
pub struct LogReader<T: Transport> {
    transport: T,
    request_timeout: Duration,
    request_delay: Duration,
    limit: Option<usize>,
    reference_time: Option<NaiveDateTime>,
}

impl<T: Transport> LogReader<T> {
    pub fn new(transport: T, config: &ReaderConfig) -> Self {
        Self {
            transport,
            request_timeout: config.request_timeout(),
            request_delay: config.request_delay(),
            limit: config.limit,
            reference_time: None,
        }
    }

    /// Resolve record years against a fixed time instead of the local clock.
    pub fn with_reference_time(mut self, now: NaiveDateTime) -> Self {
        self.reference_time = Some(now);
        self
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Read each class in turn, accumulating events.
    ///
    /// Never fails: timeouts and bad responses end the current class and
    /// the run moves on. After a timeout, late replies are discarded before
    /// the next class starts. A transport failure ends the run. Classes not
    /// started because the limit was already reached are reported as
    /// [`ClassOutcome::LimitReached`].
    pub async fn run(&mut self, classes: &[LogClass]) -> RetrievalReport {
        let mut report = RetrievalReport::default();

        for (i, &class) in classes.iter().enumerate() {
            if self.limit_reached(report.events.len()) {
                report.outcomes.push((class, ClassOutcome::LimitReached));
                continue;
            }

            let outcome = self.read_class(class, &mut report.events).await;
            let mut broken = matches!(outcome, ClassOutcome::TransportFailed(_));
            if outcome == ClassOutcome::TimedOut && i + 1 < classes.len() {
                // A late reply must not be read as the answer to the next request
                if let Err(e) = self.discard_late_replies().await {
                    warn!("Connection lost after {} log timeout: {}", class, e);
                    broken = true;
                }
            }
            report.outcomes.push((class, outcome));
            if broken {
                break;
            }
        }

        report
    }

    async fn read_class(&mut self, class: LogClass, events: &mut Vec<EventRecord>) -> ClassOutcome {
        info!("Reading {} event log", class);
        let first = events.len();
        let mut cursor = class.initial_cursor();

        let outcome = loop {
            if self.limit_reached(events.len()) {
                break ClassOutcome::LimitReached;
            }

            let payload = match self.request(&cursor).await {
                Ok(payload) => payload,
                Err(outcome) => break outcome,
            };

            let raw = &payload[..RECORD_LEN];
            let decoded = EventRecord::decode(raw, self.now());
            if let Some(reason) = class.end_of_log(raw, &decoded) {
                break ClassOutcome::EndOfLog(reason);
            }
            match decoded {
                Ok(record) => events.push(record),
                Err(e) => warn!("Skipping {} log record: {}", class, e),
            }

            cursor.copy_from_slice(&payload[RECORD_LEN..RECORD_LEN + CURSOR_LEN]);
        };

        let read = events.len() - first;
        match &outcome {
            ClassOutcome::EndOfLog(reason) => {
                info!("End of {} log after {} events ({:?})", class, read, reason)
            }
            ClassOutcome::LimitReached => info!("Record limit reached during {} log", class),
            ClassOutcome::TimedOut => warn!(
                "No response from panel within {:?}; {} log stopped after {} events",
                self.request_timeout, class, read
            ),
            ClassOutcome::Malformed(reason) => {
                warn!("{} log stopped after {} events: {}", class, read, reason)
            }
            ClassOutcome::TransportFailed(reason) => {
                warn!("{} log aborted after {} events: {}", class, read, reason)
            }
        }
        outcome
    }

    /// Send one read request and return the validated response payload,
    /// which holds at least a full record and the next cursor.
    async fn request(&mut self, cursor: &[u8; CURSOR_LEN]) -> std::result::Result<Vec<u8>, ClassOutcome> {
        let request = encode_frame(READ_EVENT_CMD, cursor);
        debug!("Request cursor {}: {}", hex(cursor), hex(&request));
        self.transport
            .send(&request)
            .await
            .map_err(|e| ClassOutcome::TransportFailed(e.to_string()))?;

        if !self.request_delay.is_zero() {
            sleep(self.request_delay).await;
        }

        let frame = self.await_frame().await?;
        if frame.command != READ_EVENT_CMD {
            return Err(ClassOutcome::Malformed(MalformedResponse::UnexpectedCommand(
                frame.command,
            )));
        }
        if frame.payload.len() < RECORD_LEN {
            return Err(ClassOutcome::Malformed(MalformedResponse::Truncated {
                len: frame.payload.len(),
            }));
        }
        if frame.payload.len() < RECORD_LEN + CURSOR_LEN {
            return Err(ClassOutcome::Malformed(MalformedResponse::MissingCursor {
                len: frame.payload.len(),
            }));
        }
        Ok(frame.payload)
    }

    /// Collect incoming chunks until they hold one complete frame.
    ///
    /// The deadline covers the whole response, however many reads it takes.
    async fn await_frame(&mut self) -> std::result::Result<Frame, ClassOutcome> {
        let deadline = Instant::now() + self.request_timeout;
        let mut buffer = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ClassOutcome::TimedOut);
            }

            match self.transport.receive(remaining).await {
                Ok(chunk) => buffer.extend_from_slice(&chunk),
                Err(e) if e.is_timeout() => return Err(ClassOutcome::TimedOut),
                Err(e) => return Err(ClassOutcome::TransportFailed(e.to_string())),
            }

            match decode_frame(&buffer) {
                FrameDecode::Complete { frame, consumed } => {
                    debug!("Response: {}", hex(&buffer[..consumed]));
                    if consumed < buffer.len() {
                        debug!("Dropping {} trailing bytes", buffer.len() - consumed);
                    }
                    return Ok(frame);
                }
                FrameDecode::NeedMoreData => continue,
                FrameDecode::Malformed(e) => {
                    debug!("Malformed response: {}", hex(&buffer));
                    return Err(ClassOutcome::Malformed(e.into()));
                }
            }
        }
    }

    /// Drop whatever the panel still sends after a timed-out request, until
    /// it has been quiet for a full request timeout.
    async fn discard_late_replies(&mut self) -> Result<()> {
        loop {
            match self.transport.receive(self.request_timeout).await {
                Ok(chunk) => debug!("Discarding late reply: {}", hex(&chunk)),
                Err(e) if e.is_timeout() => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }

    fn limit_reached(&self, count: usize) -> bool {
        self.limit.is_some_and(|limit| count >= limit)
    }

    fn now(&self) -> NaiveDateTime {
        self.reference_time
            .unwrap_or_else(|| Local::now().naive_local())
    }
}

/// Connect to the panel, read every configured log class and disconnect.
///
/// Fails only if the connection cannot be established. The connection is
/// closed on every path once it is open.
pub async fn read_event_log(config: &ReaderConfig) -> Result<RetrievalReport> {
    let transport = TcpTransport::connect(config).await?;
    let mut reader = LogReader::new(transport, config);
    let report = reader.run(&config.classes).await;

    if let Err(e) = reader.transport_mut().close().await {
        debug!("Error while closing connection: {}", e);
    }

    info!(
        "Retrieved {} events ({})",
        report.events.len(),
        if report.is_complete() { "complete" } else { "partial" }
    );
    Ok(report)
}

/// Like [`read_event_log`], returning only the events.
pub async fn retrieve_logs(config: &ReaderConfig) -> Result<Vec<EventRecord>> {
    Ok(read_event_log(config).await?.events)
}
