// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Newline-delimited transport adapter
//!
//! One JSON-RPC request per input line, one response per output line. Requests are handled
//! strictly in order on the calling thread.

use std::io::{self, BufRead, Write};

use tracing::{debug, error, info, warn};

use crate::envelope::{Request, Response};
use crate::registry::ProcedureRegistry;

/// Handle one raw request line
pub fn handle_line<C>(registry: &ProcedureRegistry<C>, ctx: &mut C, line: &str) -> Response {
    match Request::parse(line) {
        Ok(request) => {
            debug!(target: "coretest-rpc", "-> {} id={}", request.method, request.id);
            registry.dispatch(ctx, &request)
        }
        Err((id, err)) => {
            warn!(target: "coretest-rpc", "Rejected request: {}", err);
            Response::failure(id, &err)
        }
    }
}

/// Serve requests from `reader` until end of input
///
/// Blank lines are skipped. Returns the number of requests answered.
///
/// # Errors
///
/// I/O failures on either stream end the loop.
pub fn serve_lines<C, R, W>(
    registry: &ProcedureRegistry<C>,
    ctx: &mut C,
    reader: R,
    mut writer: W,
) -> io::Result<usize>
where
    R: BufRead,
    W: Write,
{
    info!(target: "coretest-rpc", "Serving {} procedures", registry.len());
    let mut answered = 0;

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(registry, ctx, line);
        let encoded = serde_json::to_string(&response).map_err(|e| {
            error!(target: "coretest-rpc", "Failed to serialize response: {}", e);
            io::Error::new(io::ErrorKind::InvalidData, e)
        })?;
        writeln!(writer, "{}", encoded)?;
        writer.flush()?;
        answered += 1;
    }

    info!(target: "coretest-rpc", "Input closed after {} requests", answered);
    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use serde_json::{json, Value};

    fn echo_registry() -> ProcedureRegistry<()> {
        let mut registry = ProcedureRegistry::new();
        registry
            .register("echo", |_: &mut (), params: &Params<'_>| {
                Ok(json!({ "text": params.string("text")? }))
            })
            .unwrap();
        registry
    }

    #[test]
    fn test_one_response_per_request_line() {
        let registry = echo_registry();
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"echo","params":{"text":"hi"}}"#,
            "\n\n",
            "garbage\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"nope"}"#,
            "\n"
        );
        let mut output = Vec::new();

        let answered = serve_lines(&registry, &mut (), input.as_bytes(), &mut output).unwrap();
        assert_eq!(answered, 3);

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines[0]["result"], json!({"text": "hi"}));
        assert_eq!(lines[1]["error"]["code"], json!(-32700));
        assert_eq!(lines[1]["id"], Value::Null);
        assert_eq!(lines[2]["error"]["code"], json!(-32601));
        assert_eq!(lines[2]["id"], json!(2));
    }
}
