//! Typed constructors and parsers for the `mining.*` methods.
//!
//! The wire represents each method's parameters as a heterogeneous positional
//! array. Parsers walk those arrays manually rather than through serde tuple
//! structs so every failure can name the offending field, and convert them
//! into typed values at the boundary; nothing downstream handles raw JSON.

use serde_json::{json, Value};

use super::error::{ProtocolError, ProtocolResult};
use super::message::{Request, Response, StratumError};

// Method identifiers.
pub const AUTHORIZE: &str = "mining.authorize";
pub const SUBSCRIBE: &str = "mining.subscribe";
pub const SET_DIFFICULTY: &str = "mining.set_difficulty";
pub const NOTIFY: &str = "mining.notify";
pub const SUBMIT: &str = "mining.submit";

/// The extraNonce2 size in bytes advertised in subscribe responses. Several
/// ASIC models ignore it; the header assembler compensates per model.
pub const EXTRA_NONCE2_SIZE: u64 = 4;

/// Create an authorize request message.
pub fn authorize_request(id: u64, address: &str, worker_name: &str) -> Request {
    let user = format!("{address}.{worker_name}");
    Request::new(Some(id), AUTHORIZE, json!([user, ""]))
}

/// Resolve an authorize request into its username. The password parameter is
/// carried on the wire but ignored.
pub fn parse_authorize_request(req: &Request) -> ProtocolResult<String> {
    if req.method != AUTHORIZE {
        return Err(ProtocolError::parse("request method is not authorize"));
    }

    let auth = req
        .params
        .as_array()
        .ok_or_else(|| ProtocolError::parse("failed to parse authorize parameters"))?;

    if auth.len() < 2 {
        return Err(ProtocolError::parse(format!(
            "expected 2 params, got {}",
            auth.len()
        )));
    }

    let username = auth[0]
        .as_str()
        .ok_or_else(|| ProtocolError::parse("failed to parse username parameter"))?;

    Ok(username.to_string())
}

/// Create an authorize response.
pub fn authorize_response(id: u64, status: bool, error: Option<StratumError>) -> Response {
    Response::new(id, Some(Value::Bool(status)), error)
}

/// Resolve an authorize response into its components.
pub fn parse_authorize_response(resp: &Response) -> ProtocolResult<(bool, Option<StratumError>)> {
    let status = resp
        .result
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| ProtocolError::parse("failed to parse result parameter"))?;

    Ok((status, resp.error.clone()))
}

/// Create a subscribe request message. The notify id is only included when
/// the client is resuming an existing subscription.
pub fn subscribe_request(id: u64, user_agent: &str, version: &str, notify_id: &str) -> Request {
    let agent = format!("{user_agent}/{version}");
    let params = if notify_id.is_empty() {
        json!([agent])
    } else {
        json!([agent, notify_id])
    };

    Request::new(Some(id), SUBSCRIBE, params)
}

/// Resolve a subscribe request into its user agent and optional notify id.
pub fn parse_subscribe_request(req: &Request) -> ProtocolResult<(String, String)> {
    if req.method != SUBSCRIBE {
        return Err(ProtocolError::parse("request method is not subscribe"));
    }

    let params = req
        .params
        .as_array()
        .ok_or_else(|| ProtocolError::parse("failed to parse subscribe parameters"))?;

    if params.is_empty() {
        return Err(ProtocolError::parse(
            "no user agent provided for subscribe request",
        ));
    }

    let miner = params[0]
        .as_str()
        .ok_or_else(|| ProtocolError::parse("failed to parse miner parameter"))?
        .to_string();

    let mut id = String::new();
    if params.len() == 2 {
        id = params[1]
            .as_str()
            .ok_or_else(|| ProtocolError::parse("failed to parse id parameter"))?
            .to_string();
    }

    Ok((miner, id))
}

/// Create a subscribe response. Both subscription slots carry the same
/// notify id.
pub fn subscribe_response(
    id: u64,
    notify_id: &str,
    extra_nonce1: &str,
    extra_nonce2_size: u64,
    error: Option<StratumError>,
) -> Response {
    if error.is_some() {
        return Response::new(id, None, error);
    }

    let result = json!([
        [[SET_DIFFICULTY, notify_id], [NOTIFY, notify_id]],
        extra_nonce1,
        extra_nonce2_size
    ]);

    Response::new(id, Some(result), None)
}

/// The parsed components of a subscribe response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribeResult {
    pub diff_id: String,
    pub notify_id: String,
    pub extra_nonce1: String,
    pub extra_nonce2_size: u64,
}

/// Resolve a subscribe response into its components, walking the result
/// indices `[0][0][1]`, `[0][1][1]`, `[1]` and `[2]`. A response carrying a
/// wire error does not parse.
pub fn parse_subscribe_response(resp: &Response) -> ProtocolResult<SubscribeResult> {
    if let Some(err) = &resp.error {
        return Err(ProtocolError::parse(format!(
            "{}, {}, {}",
            err.code, err.message, err.traceback
        )));
    }

    let res = resp
        .result
        .as_ref()
        .and_then(Value::as_array)
        .ok_or_else(|| ProtocolError::parse("failed to parse result parameter"))?;

    let subs = res
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| ProtocolError::parse("failed to parse subscription details"))?;

    let diff = subs
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| ProtocolError::parse("failed to parse difficulty id details"))?;

    let diff_id = diff
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::parse("failed to parse difficulty id"))?
        .to_string();

    let notify = subs
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| ProtocolError::parse("failed to parse notify id details"))?;

    let notify_id = notify
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::parse("failed to parse notify id"))?
        .to_string();

    let extra_nonce1 = res
        .get(1)
        .and_then(Value::as_str)
        .ok_or_else(|| ProtocolError::parse("failed to parse ExtraNonce1 parameter"))?
        .to_string();

    // Tolerate fractional JSON representations of the size by truncating.
    let extra_nonce2_size = res
        .get(2)
        .and_then(Value::as_f64)
        .ok_or_else(|| ProtocolError::parse("failed to parse ExtraNonce2Size parameter"))?
        as u64;

    Ok(SubscribeResult {
        diff_id,
        notify_id,
        extra_nonce1,
        extra_nonce2_size,
    })
}

/// Create a set difficulty notification. The difficulty is truncated to a
/// non-negative integer for the wire.
pub fn set_difficulty_notification(difficulty: f64) -> Request {
    Request::new(None, SET_DIFFICULTY, json!([difficulty as u64]))
}

/// Resolve a set difficulty notification into its difficulty value.
pub fn parse_set_difficulty_notification(req: &Request) -> ProtocolResult<u64> {
    if req.method != SET_DIFFICULTY {
        return Err(ProtocolError::parse(
            "notification method is not set difficulty",
        ));
    }

    let params = req
        .params
        .as_array()
        .ok_or_else(|| ProtocolError::parse("failed to parse set difficulty parameters"))?;

    let difficulty = params
        .first()
        .and_then(Value::as_f64)
        .ok_or_else(|| ProtocolError::parse("failed to parse difficulty parameter"))?;

    Ok(difficulty as u64)
}

/// Create a work notification message.
///
/// The merkle branch slot is always empty: the chain carries merkle data
/// inside `gen_tx2` rather than as separate branches.
#[allow(clippy::too_many_arguments)]
pub fn work_notification(
    job_id: &str,
    prev_block: &str,
    gen_tx1: &str,
    gen_tx2: &str,
    block_version: &str,
    n_bits: &str,
    n_time: &str,
    clean_job: bool,
) -> Request {
    Request::new(
        None,
        NOTIFY,
        json!([
            job_id,
            prev_block,
            gen_tx1,
            gen_tx2,
            [],
            block_version,
            n_bits,
            n_time,
            clean_job
        ]),
    )
}

/// The parsed fields of a work notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkNotification {
    pub job_id: String,
    pub prev_block: String,
    pub gen_tx1: String,
    pub gen_tx2: String,
    pub block_version: String,
    pub n_bits: String,
    pub n_time: String,
    pub clean_job: bool,
}

/// Resolve a work notification message into its components.
pub fn parse_work_notification(req: &Request) -> ProtocolResult<WorkNotification> {
    if req.method != NOTIFY {
        return Err(ProtocolError::parse("notification method is not notify"));
    }

    let params = req
        .params
        .as_array()
        .ok_or_else(|| ProtocolError::parse("failed to parse work parameters"))?;

    let str_param = |idx: usize, desc: &str| -> ProtocolResult<String> {
        params
            .get(idx)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ProtocolError::parse(format!("failed to parse {desc} parameter")))
    };

    let job_id = str_param(0, "jobID")?;
    let prev_block = str_param(1, "prevBlock")?;
    let gen_tx1 = str_param(2, "genTx1")?;
    let gen_tx2 = str_param(3, "genTx2")?;
    // Element 4 is the always-empty merkle branch list.
    let block_version = str_param(5, "blockVersion")?;
    let n_bits = str_param(6, "nBits")?;
    let n_time = str_param(7, "nTime")?;

    let clean_job = params
        .get(8)
        .and_then(Value::as_bool)
        .ok_or_else(|| ProtocolError::parse("failed to parse cleanJob parameter"))?;

    Ok(WorkNotification {
        job_id,
        prev_block,
        gen_tx1,
        gen_tx2,
        block_version,
        n_bits,
        n_time,
        clean_job,
    })
}

/// Create a submit request message.
pub fn submit_work_request(
    id: u64,
    worker_name: &str,
    job_id: &str,
    extra_nonce2: &str,
    n_time: &str,
    nonce: &str,
) -> Request {
    Request::new(
        Some(id),
        SUBMIT,
        json!([worker_name, job_id, extra_nonce2, n_time, nonce]),
    )
}

/// The parsed fields of a work submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitWork {
    pub worker_name: String,
    pub job_id: String,
    pub extra_nonce2: String,
    pub n_time: String,
    pub nonce: String,
}

/// Resolve a submit work request into its components.
pub fn parse_submit_work_request(req: &Request) -> ProtocolResult<SubmitWork> {
    if req.method != SUBMIT {
        return Err(ProtocolError::parse("request method is not submit"));
    }

    let params = req
        .params
        .as_array()
        .ok_or_else(|| ProtocolError::parse("failed to parse submit work parameters"))?;

    if params.len() < 5 {
        return Err(ProtocolError::parse(format!(
            "expected 5 submit work parameters, got {}",
            params.len()
        )));
    }

    let str_param = |idx: usize, desc: &str| -> ProtocolResult<String> {
        params[idx]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ProtocolError::parse(format!("failed to parse {desc} parameter")))
    };

    Ok(SubmitWork {
        worker_name: str_param(0, "workerName")?,
        job_id: str_param(1, "jobID")?,
        extra_nonce2: str_param(2, "extraNonce2")?,
        n_time: str_param(3, "nTime")?,
        nonce: str_param(4, "nonce")?,
    })
}

/// Create a submit response.
pub fn submit_work_response(id: u64, status: bool, error: Option<StratumError>) -> Response {
    Response::new(id, Some(Value::Bool(status)), error)
}

/// Resolve a submit response into its components.
pub fn parse_submit_work_response(resp: &Response) -> ProtocolResult<(bool, Option<StratumError>)> {
    let status = resp
        .result
        .as_ref()
        .and_then(Value::as_bool)
        .ok_or_else(|| ProtocolError::parse("failed to parse result parameter"))?;

    Ok((status, resp.error.clone()))
}
