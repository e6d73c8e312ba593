//! Stratum mining protocol codec.
//!
//! Stratum is a line-delimited, JSON-RPC shaped protocol spoken between
//! mining clients and the pool:
//!
//! - **Client requests**: authorize, subscribe, submit
//! - **Pool notifications**: mining.notify (new work), mining.set_difficulty
//! - **Pool responses**: boolean results or structured error objects
//!
//! This module is the pure function layer between raw bytes and domain
//! values. [`identify`] classifies an incoming line and decodes its
//! envelope; the method codecs validate positional parameter arrays into
//! typed values and construct outbound messages; the header assembler turns
//! a work notification plus a submission into the solved binary block
//! header, compensating for the byte-layout quirks of specific ASIC models.
//!
//! Everything here is stateless and synchronous. Connection handling, job
//! tracking, and share validation belong to the callers.

mod error;
mod header;
mod message;
mod methods;

pub use error::{ErrorKind, ProtocolError, ProtocolResult};
pub use header::{generate_block_header, generate_solved_block_header, hex_reversed, Miner};
pub use message::{
    identify, Message, MessageKind, Request, Response, StratumError, DUPLICATE_SHARE,
    LOW_DIFFICULTY_SHARE, NOT_SUBSCRIBED, STALE_JOB, UNAUTHORIZED_WORKER, UNKNOWN,
};
pub use methods::{
    authorize_request, authorize_response, parse_authorize_request, parse_authorize_response,
    parse_set_difficulty_notification, parse_submit_work_request, parse_submit_work_response,
    parse_subscribe_request, parse_subscribe_response, parse_work_notification,
    set_difficulty_notification, submit_work_request, submit_work_response, subscribe_request,
    subscribe_response, work_notification, SubmitWork, SubscribeResult, WorkNotification,
    AUTHORIZE, EXTRA_NONCE2_SIZE, NOTIFY, SET_DIFFICULTY, SUBMIT, SUBSCRIBE,
};
