//! Candidate block header assembly.
//!
//! Work notifications carry the header as hex fragments; submissions carry
//! the solved fields as hex strings. Assembly therefore happens in
//! hex-character space: one header byte spans two characters, and every
//! offset below is a character index. A nonce patched at `[280..288]` lands
//! in header bytes 140..144.
//!
//! Several ASIC models deviate from the advertised extraNonce2 contract or
//! submit big-endian values where the header wants little-endian. Each model
//! maps to a [`SolvedLayout`] row describing where its submission fields
//! land; supporting a new model means adding a row.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::chain::BlockHeader;

use super::error::{ProtocolError, ProtocolResult};

// Hex-character spans patched into a candidate header at submission time.
const NTIME_SPAN: Range<usize> = 272..280;
const NONCE_SPAN: Range<usize> = 280..288;
const EXTRA_NONCE1_SPAN: Range<usize> = 288..296;
const EXTRA_NONCE2_SPAN: Range<usize> = 296..304;
const COMBINED_12_BYTE_SPAN: Range<usize> = 288..312;
const COMBINED_8_BYTE_SPAN: Range<usize> = 288..304;

/// Minimum header length, in hex characters, required before patching.
const SOLVED_REGION_END: usize = 304;

/// Hex characters reserved between extraNonce1 and the trailing header
/// fields when generating a candidate header: the 4-byte extraNonce2 slot
/// plus the remaining 24 bytes of the coinbase nonce area.
const RESERVED_NIBBLES: usize = 56;

/// ASIC models with known submission quirks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Miner {
    Cpu,
    ObeliskDcr1,
    AntminerDr3,
    AntminerDr5,
    InnosiliconD9,
    WhatsminerD1,
}

impl Miner {
    /// Resolve a miner model from its canonical tag.
    ///
    /// This is the only place unknown models surface; past this boundary
    /// every model has a known solved layout.
    pub fn from_tag(tag: &str) -> ProtocolResult<Self> {
        match tag {
            "cpu" => Ok(Miner::Cpu),
            "obelisk-dcr1" => Ok(Miner::ObeliskDcr1),
            "antminer-dr3" => Ok(Miner::AntminerDr3),
            "antminer-dr5" => Ok(Miner::AntminerDr5),
            "innosilicon-d9" => Ok(Miner::InnosiliconD9),
            "whatsminer-d1" => Ok(Miner::WhatsminerD1),
            _ => Err(ProtocolError::other(format!(
                "specified miner {tag} is unknown"
            ))),
        }
    }

    /// The canonical tag for this model.
    pub fn tag(self) -> &'static str {
        match self {
            Miner::Cpu => "cpu",
            Miner::ObeliskDcr1 => "obelisk-dcr1",
            Miner::AntminerDr3 => "antminer-dr3",
            Miner::AntminerDr5 => "antminer-dr5",
            Miner::InnosiliconD9 => "innosilicon-d9",
            Miner::WhatsminerD1 => "whatsminer-d1",
        }
    }

    /// Where this model's submission fields land in the header.
    fn solved_layout(self) -> SolvedLayout {
        match self {
            // The reference CPU miner honors the advertised contract and
            // submits little-endian nTime and nonce.
            Miner::Cpu => SolvedLayout {
                swaps_endianness: false,
                extra_nonce1_span: Some(EXTRA_NONCE1_SPAN),
                extra_nonce2_span: EXTRA_NONCE2_SPAN,
            },

            // The Obelisk DCR1 and Innosilicon D9 submit a plain 4-byte
            // extraNonce2 but big-endian nTime and nonce values.
            Miner::ObeliskDcr1 | Miner::InnosiliconD9 => SolvedLayout {
                swaps_endianness: true,
                extra_nonce1_span: Some(EXTRA_NONCE1_SPAN),
                extra_nonce2_span: EXTRA_NONCE2_SPAN,
            },

            // The Antminer DR3 and DR5 ignore the advertised extraNonce2
            // size and submit a combined 12-byte extranonce covering both
            // slots, with big-endian nTime and nonce.
            Miner::AntminerDr3 | Miner::AntminerDr5 => SolvedLayout {
                swaps_endianness: true,
                extra_nonce1_span: None,
                extra_nonce2_span: COMBINED_12_BYTE_SPAN,
            },

            // The Whatsminer D1 submits a combined 8-byte extranonce
            // covering both slots, with big-endian nTime and nonce.
            Miner::WhatsminerD1 => SolvedLayout {
                swaps_endianness: true,
                extra_nonce1_span: None,
                extra_nonce2_span: COMBINED_8_BYTE_SPAN,
            },
        }
    }
}

impl fmt::Display for Miner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Miner {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

/// Where one miner model's submission fields land in the solved header.
struct SolvedLayout {
    /// The model submits big-endian nTime and nonce values which must be
    /// byte-reversed before patching.
    swaps_endianness: bool,
    /// The extraNonce1 slot, absent when the extraNonce2 span covers it.
    extra_nonce1_span: Option<Range<usize>>,
    extra_nonce2_span: Range<usize>,
}

/// Reverse the byte order of a hex string: pairs of characters swap as
/// units, individual nibbles do not.
pub fn hex_reversed(hex: &str) -> ProtocolResult<String> {
    if hex.len() % 2 != 0 {
        return Err(ProtocolError::decode(format!(
            "expected even hex input length, got {}",
            hex.len()
        )));
    }

    let mut out = String::with_capacity(hex.len());
    for pair in hex.as_bytes().chunks(2).rev() {
        out.push(pair[0] as char);
        out.push(pair[1] as char);
    }

    Ok(out)
}

/// Overwrite a span of hex characters, copying at most as many characters
/// as the value provides.
fn patch(buf: &mut [u8], span: Range<usize>, value: &str) {
    let start = span.start.min(buf.len());
    let end = span.end.min(buf.len());
    let dst = &mut buf[start..end];
    let src = value.as_bytes();
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

/// Create a candidate block header from the fields of a work notification
/// and the client's extraNonce1.
///
/// The extraNonce2 slot and the rest of the coinbase nonce area are left
/// zeroed for [`generate_solved_block_header`] to fill upon submission. The
/// inputs are concatenated without length validation; a wrong-sized fragment
/// surfaces as a rejection from the binary header parser.
pub fn generate_block_header(
    block_version: &str,
    prev_block: &str,
    gen_tx1: &str,
    extra_nonce1: &str,
    gen_tx2: &str,
) -> ProtocolResult<BlockHeader> {
    let mut header_hex = String::with_capacity(
        block_version.len()
            + prev_block.len()
            + gen_tx1.len()
            + extra_nonce1.len()
            + RESERVED_NIBBLES
            + gen_tx2.len(),
    );
    header_hex.push_str(block_version);
    header_hex.push_str(prev_block);
    header_hex.push_str(gen_tx1);
    header_hex.push_str(extra_nonce1);
    header_hex.extend(std::iter::repeat('0').take(RESERVED_NIBBLES));
    header_hex.push_str(gen_tx2);

    let header_bytes = hex::decode(&header_hex).map_err(|e| {
        ProtocolError::decode_with(format!("failed to decode block header {header_hex}"), e)
    })?;

    BlockHeader::from_bytes(&header_bytes).map_err(|e| {
        ProtocolError::other_with(format!("failed to create header from bytes {header_hex}"), e)
    })
}

/// Patch the submitted fields of a solved header into its hex characters,
/// honoring the miner model's layout.
fn patch_solved_header(
    header_hex: &str,
    extra_nonce1: &str,
    extra_nonce2: &str,
    n_time: &str,
    nonce: &str,
    miner: Miner,
) -> ProtocolResult<Vec<u8>> {
    if header_hex.len() < SOLVED_REGION_END {
        return Err(ProtocolError::decode(format!(
            "expected at least {SOLVED_REGION_END} header characters, got {}",
            header_hex.len()
        )));
    }

    let layout = miner.solved_layout();

    let (n_time, nonce) = if layout.swaps_endianness {
        (hex_reversed(n_time)?, hex_reversed(nonce)?)
    } else {
        (n_time.to_string(), nonce.to_string())
    };

    let mut header = header_hex.as_bytes().to_vec();
    patch(&mut header, NTIME_SPAN, &n_time);
    patch(&mut header, NONCE_SPAN, &nonce);
    if let Some(span) = layout.extra_nonce1_span {
        patch(&mut header, span, extra_nonce1);
    }
    patch(&mut header, layout.extra_nonce2_span, extra_nonce2);

    Ok(header)
}

/// Create a block header from the fields of a work submission and its
/// associated job's candidate header.
pub fn generate_solved_block_header(
    header_hex: &str,
    extra_nonce1: &str,
    extra_nonce2: &str,
    n_time: &str,
    nonce: &str,
    miner: Miner,
) -> ProtocolResult<BlockHeader> {
    let solved = patch_solved_header(header_hex, extra_nonce1, extra_nonce2, n_time, nonce, miner)?;

    let header_bytes = hex::decode(&solved)
        .map_err(|e| ProtocolError::decode_with(format!("failed to decode solved header {miner}"), e))?;

    BlockHeader::from_bytes(&header_bytes).map_err(|e| {
        ProtocolError::decode_with(format!("failed to create header from bytes {miner}"), e)
    })
}
