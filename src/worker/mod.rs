//! Long-running worker over a line-delimited channel.
//!
//! Reads one request per line and writes exactly one JSON response line for
//! each, in arrival order. A bad request produces an error response and the
//! loop carries on; end of input ends the loop.

mod protocol;

pub use protocol::{
    CONVERT_UNIT, FORMAT, Request, RequestError, Response, decimal_from_json, text_from_json,
};

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::calculator::Engine;

/// Counters reported when the channel closes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub requests: usize,
    pub failures: usize,
}

/// Serve requests from `input` until end of file.
pub fn run<R: BufRead, W: Write>(engine: &Engine, mut input: R, mut output: W) -> Result<WorkerStats> {
    let mut stats = WorkerStats::default();
    let mut buf = Vec::new();

    info!("worker started");
    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .context("Failed to read request line")?;
        if read == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(engine, line),
            Err(_) => Response::failure(RequestError::InvalidUtf8),
        };

        stats.requests += 1;
        if !response.is_success() {
            stats.failures += 1;
        }
        write_response(&mut output, &response)?;
    }

    info!(
        requests = stats.requests,
        failures = stats.failures,
        "input closed, worker exiting"
    );
    Ok(stats)
}

/// Answer a single request line.
pub fn handle_line(engine: &Engine, line: &str) -> Response {
    debug!(line = line.trim(), "received request");
    let response = match Request::parse(line) {
        Ok(request) => handle_request(engine, request),
        Err(err) => Response::failure(err),
    };
    if let Response::Failure { error } = &response {
        warn!(line = line.trim(), %error, "request failed");
    }
    response
}

fn handle_request(engine: &Engine, request: Request) -> Response {
    match request {
        Request::Bare(expression) | Request::Expression { expression } => {
            Response::from_calc_result(engine.evaluate(&expression))
        }
        Request::ConvertUnit {
            command,
            value,
            from_unit,
            to_unit,
        } => {
            if command != CONVERT_UNIT {
                return Response::failure(RequestError::UnknownCommand(command));
            }
            let converted = decimal_from_json(&value)
                .and_then(|value| engine.convert(value, &from_unit, &to_unit));
            match converted {
                Ok(converted) => Response::from_conversion(converted),
                Err(err) => Response::failure(err),
            }
        }
        Request::NamedConversion { conversion, value } => {
            let converted =
                decimal_from_json(&value).and_then(|value| engine.convert_named(&conversion, value));
            match converted {
                Ok(converted) => Response::from_conversion(converted),
                Err(err) => Response::failure(err),
            }
        }
        Request::Command { command, value } => match command.as_str() {
            FORMAT => match engine.formatter().format_text(&text_from_json(&value)) {
                Ok(result) => Response::Success {
                    result,
                    intermediate: None,
                },
                Err(err) => Response::failure(err),
            },
            CONVERT_UNIT => Response::failure(RequestError::Incomplete(command)),
            _ => Response::failure(RequestError::UnknownCommand(command)),
        },
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> Result<()> {
    serde_json::to_writer(&mut *output, response).context("Failed to encode response")?;
    output
        .write_all(b"\n")
        .and_then(|()| output.flush())
        .context("Failed to write response")
}
