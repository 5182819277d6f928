// End-to-end reads against a fake panel on a loopback socket

use std::collections::HashMap;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Duration};

use satel_event_log::constants::READ_EVENT_CMD;
use satel_event_log::{
    decode_frame, encode_frame, read_event_log, retrieve_logs, ClassOutcome, EndOfLogReason,
    FrameDecode, LogClass, ReaderConfig,
};

/// Responses keyed by the request cursor.
type Script = HashMap<[u8; 3], Vec<u8>>;

/// Cursors whose response is held back, and for how long.
type Delays = HashMap<[u8; 3], Duration>;

fn response(first: u8, code: u8, next_cursor: [u8; 3]) -> Vec<u8> {
    // 1 January, 09:30
    let minutes: u16 = 9 * 60 + 30;
    let mut payload = vec![
        first,
        0x01,
        0x10 | (minutes >> 8) as u8,
        (minutes & 0xFF) as u8,
        0x00,
        code,
        0x21,
        0x00,
    ];
    payload.extend_from_slice(&next_cursor);
    encode_frame(READ_EVENT_CMD, &payload)
}

fn panel_script() -> Script {
    let mut script = HashMap::new();
    // Standard log: two events, then a record with z clear
    script.insert([0xFF, 0xFF, 0xFF], response(0x20, 1, [0x00, 0x00, 0xFE]));
    script.insert([0x00, 0x00, 0xFE], response(0x20, 2, [0x00, 0x00, 0xFD]));
    script.insert([0x00, 0x00, 0xFD], response(0x00, 3, [0x00, 0x00, 0xFC]));
    // Grade 2 log: one event, then a zero marker
    script.insert([0x00, 0xFF, 0xFF], response(0x40, 4, [0x01, 0x00, 0x00]));
    script.insert([0x01, 0x00, 0x00], response(0x00, 5, [0x01, 0x00, 0x01]));
    script
}

/// Serve one connection, answering each request from `script`. Responses
/// are written in two pieces to exercise reassembly. Unknown cursors get no
/// answer.
async fn serve(mut stream: TcpStream, script: Script, delays: Delays) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 256];
    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..n]);

        while let FrameDecode::Complete { frame, consumed } = decode_frame(&buffer) {
            buffer.drain(..consumed);
            assert_eq!(frame.command, READ_EVENT_CMD);
            let cursor: [u8; 3] = frame.payload.as_slice().try_into().unwrap();
            if let Some(reply) = script.get(&cursor) {
                if let Some(delay) = delays.get(&cursor) {
                    sleep(*delay).await;
                }
                let (a, b) = reply.split_at(reply.len() / 2);
                stream.write_all(a).await.unwrap();
                stream.flush().await.unwrap();
                sleep(Duration::from_millis(5)).await;
                stream.write_all(b).await.unwrap();
            }
        }
    }
}

async fn start_panel(script: Script) -> u16 {
    start_slow_panel(script, Delays::new()).await
}

async fn start_slow_panel(script: Script, delays: Delays) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            serve(stream, script, delays).await;
        }
    });
    port
}

fn config(port: u16) -> satel_event_log::ReaderConfigBuilder {
    ReaderConfig::builder()
        .host("127.0.0.1")
        .port(port)
        .request_delay_ms(1)
        .request_timeout_ms(300)
}

#[tokio::test]
async fn test_reads_both_logs() {
    let port = start_panel(panel_script()).await;
    let events = retrieve_logs(&config(port).both_classes().build())
        .await
        .unwrap();

    let codes: Vec<u16> = events.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![1, 2, 4]);
    for event in &events {
        assert_eq!((event.month, event.day), (1, 1));
        assert_eq!((event.hour, event.minute), (9, 30));
        assert_eq!(event.partition, 0);
        assert_eq!(event.source, 0x21);
    }
}

#[tokio::test]
async fn test_report_records_outcomes() {
    let port = start_panel(panel_script()).await;
    let report = read_event_log(&config(port).both_classes().build())
        .await
        .unwrap();

    assert_eq!(
        report.outcomes,
        vec![
            (
                LogClass::Standard,
                ClassOutcome::EndOfLog(EndOfLogReason::ContinuationCleared)
            ),
            (LogClass::Grade2, ClassOutcome::EndOfLog(EndOfLogReason::ZeroMarker)),
        ]
    );
}

#[tokio::test]
async fn test_silent_panel_times_out_per_class() {
    // The standard log stops answering after its first record
    let mut script = panel_script();
    script.remove(&[0x00, 0x00, 0xFE]);
    let port = start_panel(script).await;

    let report = read_event_log(&config(port).both_classes().build())
        .await
        .unwrap();

    let codes: Vec<u16> = report.events.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![1, 4]);
    assert_eq!(report.outcomes[0], (LogClass::Standard, ClassOutcome::TimedOut));
    assert_eq!(
        report.outcomes[1],
        (LogClass::Grade2, ClassOutcome::EndOfLog(EndOfLogReason::ZeroMarker))
    );
}

#[tokio::test]
async fn test_late_reply_is_discarded() {
    // The second standard response arrives after the request timeout
    let mut delays = Delays::new();
    delays.insert([0x00, 0x00, 0xFE], Duration::from_millis(450));
    let port = start_slow_panel(panel_script(), delays).await;

    let report = read_event_log(&config(port).both_classes().build())
        .await
        .unwrap();

    let codes: Vec<u16> = report.events.iter().map(|e| e.code).collect();
    assert_eq!(codes, vec![1, 4]);
    assert_eq!(
        report.outcomes,
        vec![
            (LogClass::Standard, ClassOutcome::TimedOut),
            (LogClass::Grade2, ClassOutcome::EndOfLog(EndOfLogReason::ZeroMarker)),
        ]
    );
}

#[tokio::test]
async fn test_limit_over_tcp() {
    let port = start_panel(panel_script()).await;
    let events = retrieve_logs(&config(port).limit(1).both_classes().build())
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].code, 1);
}

#[tokio::test]
async fn test_connection_failure_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let result = retrieve_logs(&config(port).connect_timeout_ms(1000).build()).await;
    assert!(result.is_err());
}
