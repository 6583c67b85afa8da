use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use qrcheckin::errors::AppError;
use qrcheckin::models::attendee::Attendee;
use qrcheckin::sync::http::{interpret_push, parse_last_update, parse_response, sort_by_last_update};
use qrcheckin::sync::remote::{RemoteHandler, SheetStore, summarize_sessions};
use qrcheckin::sync::row::{HEADERS, RemoteRow};
use qrcheckin::sync::sheet::{CsvSheet, SheetGateway};
use qrcheckin::sync::{
    PushReceipt, ResponseStatus, SessionSummary, SyncGateway, SyncRequest, SyncResponse,
    latest_per_phone, open_gateway,
};
use std::fs::File;
use std::thread;
use std::time::Duration;

mod common;
use common::attendee;

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, h, m, 0).unwrap()
}

#[test]
fn list_sessions_counts_rows_and_takes_latest_timestamp() {
    let rows = vec![
        RemoteRow::new(at(9, 0), "A", &attendee("Hong", "010-1")),
        RemoteRow::new(at(10, 30), "B", &attendee("Kim", "010-2")),
        RemoteRow::new(at(11, 0), "A", &attendee("Lee", "010-3")),
    ];

    let sessions = summarize_sessions(&rows);

    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0].name, "A");
    assert_eq!(sessions[0].count, 2);
    assert_eq!(sessions[0].last_update, at(11, 0).to_rfc3339());
    assert_eq!(sessions[1].name, "B");
    assert_eq!(sessions[1].count, 1);
    assert_eq!(sessions[1].last_update, at(10, 30).to_rfc3339());
}

#[test]
fn handler_over_csv_sheet_answers_the_three_actions() {
    let dir = tempfile::tempdir().unwrap();
    let handler = RemoteHandler::new(CsvSheet::new(dir.path().join("sheet.csv")));

    let mut hong = attendee("Hong", "010-1111-2222");
    hong.mark_checked_in(at(9, 5));
    let a = vec![hong.clone(), attendee("Kim", "010-3")];

    let resp = handler.handle(SyncRequest::save("A", &a), at(9, 10));
    assert_eq!(resp.status, ResponseStatus::Success);
    assert_eq!(resp.count, Some(2));

    handler.handle(SyncRequest::save("B", &[attendee("Lee", "010-4")]), at(12, 0));

    let listed = handler.handle(SyncRequest::get_sessions(), at(12, 1));
    let sessions = listed.sessions.unwrap();
    let summary: Vec<(&str, usize)> = sessions.iter().map(|s| (s.name.as_str(), s.count)).collect();
    assert_eq!(summary, [("B", 1), ("A", 2)]);

    let data = handler
        .handle(SyncRequest::get_session_data("A"), at(12, 2))
        .data
        .unwrap();
    assert_eq!(data, a);
    // leading zero survives the sheet
    assert_eq!(data[0].phone, "010-1111-2222");
    assert_eq!(data[0].checked_in_at, Some(at(9, 5)));
}

#[test]
fn csv_sheet_writes_header_once_and_marks_phones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    let sheet = CsvSheet::new(&path);

    sheet
        .append_rows(&[RemoteRow::new(at(9, 0), "A", &attendee("Hong", "010-1"))])
        .unwrap();
    sheet
        .append_rows(&[RemoteRow::new(at(9, 1), "A", &attendee("Kim", "010-2"))])
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], HEADERS.join(","));
    assert!(lines[1].contains("'010-1"));
    assert!(lines[1].ends_with(",X,"));

    assert_eq!(sheet.read_rows().unwrap().len(), 2);
}

#[test]
fn sheet_gateway_push_then_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = SheetGateway::open(dir.path().join("remote.csv"));

    let roster = vec![attendee("Hong", "010-1"), attendee("Kim", "010-2")];
    let receipt = gateway.push(&roster, "Forum").unwrap();
    assert_eq!(receipt, PushReceipt::Acknowledged { count: 2 });

    assert_eq!(gateway.fetch_session("Forum").unwrap(), roster);
    assert!(gateway.fetch_session("Unknown").unwrap().is_empty());
    assert_eq!(gateway.list_sessions().unwrap()[0].name, "Forum");
}

#[test]
fn repeated_pushes_collapse_to_latest_state_per_phone() {
    let mut checked = attendee("Hong", "010-1");
    checked.mark_checked_in(at(10, 0));

    let log = vec![
        attendee("Hong", "010-1"),
        attendee("Kim", "010-2"),
        checked.clone(),
        attendee("Kim", "010-2"),
    ];

    let latest = latest_per_phone(log);
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0], checked);
    assert_eq!(latest[1].name, "Kim");
}

#[test]
fn error_status_becomes_remote_error() {
    let resp: SyncResponse =
        serde_json::from_str(r#"{"status":"error","message":"sheet locked"}"#).unwrap();
    let err = resp.into_result().unwrap_err();
    assert!(err.to_string().contains("sheet locked"));
}

#[test]
fn requests_use_camel_case_wire_names() {
    let json = serde_json::to_value(SyncRequest::get_session_data("A")).unwrap();
    assert_eq!(json["action"], "getSessionData");
    assert_eq!(json["sessionName"], "A");
    assert!(json.get("data").is_none());
}

#[test]
fn open_gateway_picks_transport_from_endpoint() {
    assert!(open_gateway("  ").is_err());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.csv");
    let gateway = open_gateway(path.to_str().unwrap()).unwrap();
    gateway.push(&[attendee("Hong", "010-1")], "A").unwrap();
    assert!(path.exists());
}

#[test]
fn parallel_pushes_from_separate_gateways_keep_the_sheet_readable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.csv");
    let roster: Vec<Attendee> = (0..500)
        .map(|i| attendee(&format!("P{}", i), &format!("010-{:04}", i)))
        .collect();

    thread::scope(|s| {
        for n in 0..4 {
            let path = path.clone();
            let roster = &roster;
            s.spawn(move || {
                // each client opens its own gateway, like separate CLI runs
                let gateway = SheetGateway::open(path);
                let receipt = gateway.push(roster, &format!("S{}", n)).unwrap();
                assert_eq!(receipt, PushReceipt::Acknowledged { count: 500 });
            });
        }
    });

    let rows = CsvSheet::new(&path).read_rows().unwrap();
    assert_eq!(rows.len(), 2000);

    let sessions = summarize_sessions(&rows);
    assert_eq!(sessions.len(), 4);
    assert!(sessions.iter().all(|s| s.count == 500));

    let text = std::fs::read_to_string(&path).unwrap();
    let header = HEADERS.join(",");
    assert_eq!(text.lines().filter(|l| *l == header).count(), 1);
}

#[test]
fn append_gives_up_while_another_client_holds_the_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.csv");
    let sheet = CsvSheet::with_lock_wait(&path, Duration::from_millis(100));
    let rows = [RemoteRow::new(at(9, 0), "A", &attendee("Hong", "010-1"))];

    let holder = File::create(sheet.lock_path()).unwrap();
    holder.lock().unwrap();

    let err = sheet.append_rows(&rows).unwrap_err();
    assert!(matches!(err, AppError::LockTimeout(_)));
    assert!(!path.exists());

    drop(holder);
    sheet.append_rows(&rows).unwrap();
    assert_eq!(sheet.read_rows().unwrap().len(), 1);
}

#[test]
fn push_body_decides_the_receipt() {
    assert_eq!(
        interpret_push(r#"{"status":"success","count":3}"#).unwrap(),
        PushReceipt::Acknowledged { count: 3 }
    );
    assert_eq!(
        interpret_push(r#"{"status":"success"}"#).unwrap(),
        PushReceipt::Unconfirmed
    );
    assert_eq!(
        interpret_push("<html>Moved Temporarily</html>").unwrap(),
        PushReceipt::Unconfirmed
    );

    let err = interpret_push(r#"{"status":"error","message":"quota"}"#).unwrap_err();
    assert!(matches!(err, AppError::Remote(ref m) if m == "quota"));
}

#[test]
fn read_responses_must_be_json() {
    let err = parse_response("<html></html>").unwrap_err();
    assert!(matches!(err, AppError::Remote(ref m) if m.starts_with("malformed response")));

    let err = parse_response(r#"{"status":"error"}"#).unwrap_err();
    assert!(matches!(err, AppError::Remote(_)));

    let resp = parse_response(r#"{"status":"success","data":[{"name":"Hong","phone":"010-1"}]}"#)
        .unwrap();
    assert_eq!(resp.data.unwrap()[0].name, "Hong");
}

#[test]
fn last_update_accepts_locale_timestamps() {
    let expected = NaiveDate::from_ymd_opt(2026, 3, 1)
        .unwrap()
        .and_hms_opt(14, 5, 0)
        .unwrap();

    assert_eq!(parse_last_update("2026-03-01T14:05:00+00:00"), Some(expected));
    assert_eq!(parse_last_update("3/1/2026, 2:05:00 PM"), Some(expected));
    assert_eq!(parse_last_update("2026. 3. 1. 오후 2:05:00"), Some(expected));
    assert_eq!(parse_last_update("yesterday"), None);
}

#[test]
fn sessions_sort_by_parsed_time_not_text() {
    let summary = |name: &str, last: &str| SessionSummary {
        name: name.into(),
        count: 1,
        last_update: last.into(),
    };
    // as text "9/..." sorts above "10/..."
    let mut sessions = vec![
        summary("old", "9/30/2026, 8:00:00 AM"),
        summary("unknown", "n/a"),
        summary("new", "10/2/2026, 8:00:00 AM"),
    ];

    sort_by_last_update(&mut sessions);

    let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["new", "old", "unknown"]);
}
