
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::RewriteMode;
use crate::dialect::DialectId;
use crate::engine::DialectEngine;
use crate::error::{DialectError, DialectErrorKind};
use crate::types::{DetectResponse, DialectsResponse, ErrorResponse, Request, RewriteResponse};

const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Serves one JSON request per line until the reader hits EOF.
///
/// Bad lines get an `{"error": ...}` reply; the loop only stops on I/O errors.
/// At most `MAX_LINE_BYTES + 1` bytes of a line are buffered; the tail of a
/// longer line is skipped after its error reply.
pub async fn serve_json_lines<R, W>(engine: &DialectEngine, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut served = 0usize;

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64 + 1)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            break;
        }

        if buf.last() != Some(&b'\n') && buf.len() > MAX_LINE_BYTES {
            log::warn!("Rejected request longer than {} bytes", MAX_LINE_BYTES);
            let reply = error_value(format!("Request too long (max {} bytes)", MAX_LINE_BYTES), None);
            write_reply(&mut writer, &reply).await?;
            served += 1;
            discard_line(&mut reader).await?;
            continue;
        }

        let reply = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(engine, line.trim()),
            Err(e) => error_value(format!("Invalid request: {}", e), None),
        };
        write_reply(&mut writer, &reply).await?;
        served += 1;
    }

    log::info!("Request stream closed after {} requests", served);
    Ok(())
}

async fn write_reply<W: AsyncWrite + Unpin>(writer: &mut W, reply: &Value) -> std::io::Result<()> {
    let mut bytes = serde_json::to_vec(reply).unwrap_or_else(|_| b"{}".to_vec());
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await
}

/// Consumes input up to and including the next newline without keeping it.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        let newline = available.iter().position(|&b| b == b'\n');
        let len = available.len();
        match newline {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => reader.consume(len),
        }
    }
}

pub fn handle_line(engine: &DialectEngine, line: &str) -> Value {
    match serde_json::from_str::<Request>(line) {
        Ok(req) => match handle_request(engine, req) {
            Ok(v) => v,
            Err(e) => error_value(e.to_string(), e.code()),
        },
        Err(e) => {
            log::warn!("Rejected request: {}", e);
            error_value(format!("Invalid request: {}", e), None)
        }
    }
}

pub fn handle_request(engine: &DialectEngine, req: Request) -> Result<Value, DialectError> {
    match req {
        Request::Detect { text, threshold } => {
            let result = match threshold {
                Some(threshold) => engine.detect_with_threshold(&text, threshold),
                None => engine.detect(&text),
            };
            to_value(DetectResponse {
                dialect: result.dialect,
                confidence: result.confidence,
            })
        }
        Request::Rewrite { text, dialect, strict } => {
            let dialect: DialectId = dialect.parse()?;
            let mode = if strict { RewriteMode::Strict } else { engine.config().rewrite_mode };
            let converted = engine.rewrite_with_mode(&text, dialect, mode)?;
            to_value(RewriteResponse {
                original: text,
                converted,
                dialect,
            })
        }
        Request::Dialects => {
            let dialects = engine.supported_dialects();
            to_value(DialectsResponse {
                count: dialects.len(),
                dialects,
            })
        }
        Request::Info { dialect } => {
            let id: DialectId = dialect.parse()?;
            let info = engine
                .dialect_info(id)
                .ok_or_else(|| DialectError::new(DialectErrorKind::UnknownDialect(dialect)))?;
            to_value(info)
        }
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, DialectError> {
    serde_json::to_value(value).map_err(|e| DialectError::new(DialectErrorKind::Serialization(e.to_string())))
}

fn error_value(error: String, code: Option<i32>) -> Value {
    serde_json::to_value(ErrorResponse { error, code }).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detect_line_returns_dialect_and_confidence() {
        let engine = DialectEngine::builtin();
        let reply = handle_line(&engine, r#"{"op":"detect","text":"侬好，今朝天气蛮好"}"#);
        assert_eq!(reply["dialect"], "shanghai");
        assert!(reply["confidence"].as_f64().unwrap() >= 0.3);
    }

    #[test]
    fn rewrite_line_returns_original_and_converted() {
        let engine = DialectEngine::builtin();
        let reply = handle_line(&engine, r#"{"op":"rewrite","text":"你好","dialect":"shanghai"}"#);
        assert_eq!(reply, json!({"original": "你好", "converted": "侬好", "dialect": "shanghai"}));
    }

    #[test]
    fn unknown_dialect_reports_code() {
        let engine = DialectEngine::builtin();
        let reply = handle_line(&engine, r#"{"op":"rewrite","text":"你好","dialect":"nonexistent-dialect-id"}"#);
        assert_eq!(reply["code"], 100);
        assert!(reply["error"].as_str().unwrap().contains("nonexistent-dialect-id"));
    }

    #[test]
    fn garbage_line_is_an_error_reply() {
        let engine = DialectEngine::builtin();
        let reply = handle_line(&engine, "not json");
        assert!(reply["error"].as_str().unwrap().starts_with("Invalid request"));
        assert!(reply.get("code").is_none());
    }

    #[tokio::test]
    async fn oversized_line_is_skipped_and_serving_continues() {
        let engine = DialectEngine::builtin();
        let mut input = vec![b'a'; MAX_LINE_BYTES + 4096];
        input.extend_from_slice(b"\n{\"op\":\"dialects\"}\n");
        let mut output = Vec::new();

        serve_json_lines(&engine, &input[..], &mut output).await.unwrap();

        let replies: Vec<Value> = output
            .split(|&b| b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_slice(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert!(replies[0]["error"].as_str().unwrap().starts_with("Request too long"));
        assert_eq!(replies[1]["count"], 5);
    }

    #[tokio::test]
    async fn line_at_the_limit_is_still_parsed() {
        let engine = DialectEngine::builtin();
        let request = br#"{"op":"dialects"}"#;
        let mut input = request.to_vec();
        input.resize(MAX_LINE_BYTES, b' ');
        input.push(b'\n');
        let mut output = Vec::new();

        serve_json_lines(&engine, &input[..], &mut output).await.unwrap();

        let reply: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(reply["count"], 5);
    }

    #[tokio::test]
    async fn invalid_utf8_is_an_error_reply() {
        let engine = DialectEngine::builtin();
        let input = b"\xff\xfe\n{\"op\":\"dialects\"}\n";
        let mut output = Vec::new();

        serve_json_lines(&engine, &input[..], &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let mut lines = text.lines();
        let first: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert!(first["error"].as_str().unwrap().starts_with("Invalid request"));
        let second: Value = serde_json::from_str(lines.next().unwrap()).unwrap();
        assert_eq!(second["count"], 5);
    }

    #[test]
    fn serialization_failures_are_not_config_errors() {
        use serde::ser::Error as _;
        let err = DialectError::new(DialectErrorKind::Serialization(serde_json::Error::custom("x").to_string()));
        assert_eq!(err.code(), Some(105));
        assert_eq!(err.error_name(), "SerializationError");
    }
}
