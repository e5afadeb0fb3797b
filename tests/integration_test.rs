use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;
use std::thread;

use anyhow::{anyhow, Result};
use tempfile::Builder;

const JOBS: &str = r#"[{"id":"j1","source_file":"/uploads/january.pdf","status":"completed","created_at":"2024-03-01T10:00:00","updated_at":"2024-03-01T10:05:00"}]"#;
const TRANSACTIONS: &str = r#"[
    {"id":1,"date":"2024-01-03","description":"Salary","amount":"100.00","type":"credit","created_at":"2024-03-01T10:05:00Z"},
    {"id":2,"date":"2024-01-04","description":"Coffee","amount":"-3.50","type":"debit","created_at":"2024-03-01T10:05:00Z"}
]"#;
const STATS: &str = r#"{"total_transactions":2,"total_credits":100.00,"total_debits":-3.50}"#;

/// Serves `connections` requests on a background thread, answering by request path.
fn serve(connections: usize) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let address = listener.local_addr()?;

    thread::spawn(move || {
        for stream in listener.incoming().take(connections) {
            let Ok(mut stream) = stream else {
                continue;
            };

            let request_line = read_request(&mut stream);
            let (status, body) = route(&request_line);

            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    Ok(format!("http://{address}"))
}

fn route(request_line: &str) -> (u16, &'static str) {
    let mut parts = request_line.split_whitespace();

    match (parts.next(), parts.next()) {
        (Some("GET"), Some("/jobs")) => (200, JOBS),
        (Some("GET"), Some("/transactions")) => (200, TRANSACTIONS),
        (Some("GET"), Some("/stats")) => (200, STATS),
        (Some("POST"), Some("/jobs")) => (201, r#"{"id":"srv-3"}"#),
        (Some("DELETE"), Some("/transactions/42")) => (204, ""),
        _ => (404, "not found")
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];

    while let Ok(read) = stream.read(&mut chunk) {
        if read == 0 {
            break;
        }

        request.extend_from_slice(&chunk[..read]);

        let Some(head_end) = request.windows(4).position(|window| window == b"\r\n\r\n") else {
            continue;
        };

        let head = String::from_utf8_lossy(&request[..head_end]).to_lowercase();
        let content_length = head.lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        if request.len() >= head_end + 4 + content_length {
            break;
        }
    }

    String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
}

fn statement_sync(base_url: &str) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_statement-sync"));

    command
        .env_remove("STATEMENT_SYNC_JOBS_URL")
        .env_remove("STATEMENT_SYNC_LEDGER_URL")
        .args(["--jobs-url", base_url, "--ledger-url", base_url, "--request-timeout-secs", "5"]);

    command
}

#[test]
fn test_cli_snapshot_prints_jobs_transactions_and_totals() -> Result<()> {
    let base_url = serve(3)?;

    let output = statement_sync(&base_url).arg("snapshot").output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let snapshot: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let stats = snapshot.get("stats").ok_or_else(|| anyhow!("stats missing from output"))?;

    assert_eq!(snapshot["jobs"][0]["id"], "j1");
    assert_eq!(snapshot["transactions"].as_array().map(Vec::len), Some(2));
    assert_eq!(snapshot["transactions"][1]["type"], "debit");
    assert_eq!(stats["total_count"], 2);
    assert_eq!(stats["total_income"], "100.00");
    assert_eq!(stats["total_expenses"], "-3.50");
    assert_eq!(stats["total_balance"], "96.50");

    Ok(())
}

#[test]
fn test_cli_uploads_a_statement() -> Result<()> {
    let base_url = serve(1)?;
    let mut file = Builder::new().suffix(".pdf").tempfile()?;
    file.write_all(b"%PDF-1.4")?;

    let output = statement_sync(&base_url).arg("upload").arg(file.path()).output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8(output.stdout)?.contains("as job srv-3"));

    Ok(())
}

#[test]
fn test_cli_deletes_a_transaction() -> Result<()> {
    let base_url = serve(1)?;

    let output = statement_sync(&base_url).args(["delete-transaction", "42"]).output()?;

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(String::from_utf8(output.stdout)?.trim(), "Deleted transaction 42");

    Ok(())
}

#[test]
fn test_cli_fails_when_services_are_unreachable() -> Result<()> {
    let output = statement_sync("http://127.0.0.1:1").arg("snapshot").output()?;

    assert!(!output.status.success());

    Ok(())
}
