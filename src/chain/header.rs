//! Decred block header binary format.
//!
//! The serialized header is a fixed 180-byte little-endian layout. The
//! Stratum assembler builds candidate headers in hex-character space and
//! hands the decoded bytes to [`BlockHeader::from_bytes`], which doubles as
//! the structural validator: any input that is not exactly one header long
//! is rejected.

use thiserror::Error;

const HEADER_SIZE: usize = 180;

/// A parsed block header.
///
/// Hash fields (`prev_block`, `merkle_root`, `stake_root`) are stored in
/// internal byte order, exactly as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: [u8; 32],
    pub merkle_root: [u8; 32],
    pub stake_root: [u8; 32],
    pub vote_bits: u16,
    pub final_state: [u8; 6],
    pub voters: u16,
    pub fresh_stake: u8,
    pub revocations: u8,
    pub pool_size: u32,
    pub bits: u32,
    pub s_bits: i64,
    pub height: u32,
    pub size: u32,
    pub timestamp: u32,
    pub nonce: u32,
    /// Coinbase nonce area: extraNonce1 occupies the leading bytes, the
    /// miner's extraNonce2 follows.
    pub extra_data: [u8; 32],
    pub stake_version: u32,
}

/// Errors produced when deserializing a block header.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HeaderError {
    #[error("block header must be {HEADER_SIZE} bytes, got {0}")]
    UnexpectedLength(usize),
}

/// Copy a fixed-size field out of the serialized header.
fn field<const N: usize>(bytes: &[u8], at: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[at..at + N]);
    out
}

impl BlockHeader {
    /// Number of bytes in a serialized header.
    pub const SIZE: usize = HEADER_SIZE;

    /// Deserialize a header from exactly [`Self::SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() != HEADER_SIZE {
            return Err(HeaderError::UnexpectedLength(bytes.len()));
        }

        Ok(Self {
            version: i32::from_le_bytes(field(bytes, 0)),
            prev_block: field(bytes, 4),
            merkle_root: field(bytes, 36),
            stake_root: field(bytes, 68),
            vote_bits: u16::from_le_bytes(field(bytes, 100)),
            final_state: field(bytes, 102),
            voters: u16::from_le_bytes(field(bytes, 108)),
            fresh_stake: bytes[110],
            revocations: bytes[111],
            pool_size: u32::from_le_bytes(field(bytes, 112)),
            bits: u32::from_le_bytes(field(bytes, 116)),
            s_bits: i64::from_le_bytes(field(bytes, 120)),
            height: u32::from_le_bytes(field(bytes, 128)),
            size: u32::from_le_bytes(field(bytes, 132)),
            timestamp: u32::from_le_bytes(field(bytes, 136)),
            nonce: u32::from_le_bytes(field(bytes, 140)),
            extra_data: field(bytes, 144),
            stake_version: u32::from_le_bytes(field(bytes, 176)),
        })
    }

    /// Serialize the header to its wire representation.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.version.to_le_bytes());
        buf[4..36].copy_from_slice(&self.prev_block);
        buf[36..68].copy_from_slice(&self.merkle_root);
        buf[68..100].copy_from_slice(&self.stake_root);
        buf[100..102].copy_from_slice(&self.vote_bits.to_le_bytes());
        buf[102..108].copy_from_slice(&self.final_state);
        buf[108..110].copy_from_slice(&self.voters.to_le_bytes());
        buf[110] = self.fresh_stake;
        buf[111] = self.revocations;
        buf[112..116].copy_from_slice(&self.pool_size.to_le_bytes());
        buf[116..120].copy_from_slice(&self.bits.to_le_bytes());
        buf[120..128].copy_from_slice(&self.s_bits.to_le_bytes());
        buf[128..132].copy_from_slice(&self.height.to_le_bytes());
        buf[132..136].copy_from_slice(&self.size.to_le_bytes());
        buf[136..140].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[140..144].copy_from_slice(&self.nonce.to_le_bytes());
        buf[144..176].copy_from_slice(&self.extra_data);
        buf[176..180].copy_from_slice(&self.stake_version.to_le_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 7,
            prev_block: [0x11; 32],
            merkle_root: [0x22; 32],
            stake_root: [0x33; 32],
            vote_bits: 0x0001,
            final_state: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
            voters: 5,
            fresh_stake: 3,
            revocations: 1,
            pool_size: 41_000,
            bits: 0x1a1f3fc1,
            s_bits: 2_094_473_061,
            height: 376_000,
            size: 12_345,
            timestamp: 0x5cd23ab0,
            nonce: 0xdeadbeef,
            extra_data: [0x44; 32],
            stake_version: 6,
        }
    }

    #[test]
    fn test_roundtrip() {
        let header = sample_header();
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), BlockHeader::SIZE);
        assert_eq!(BlockHeader::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_field_offsets() {
        let bytes = sample_header().to_bytes();

        // Timestamp and nonce sit immediately before the coinbase nonce
        // area; the assembler patches these regions at fixed offsets.
        assert_eq!(bytes[136..140], 0x5cd23ab0u32.to_le_bytes());
        assert_eq!(bytes[140..144], 0xdeadbeefu32.to_le_bytes());
        assert_eq!(bytes[144..176], [0x44; 32]);
        assert_eq!(bytes[176..180], 6u32.to_le_bytes());
    }

    #[test]
    fn test_rejects_wrong_lengths() {
        for len in [0, 1, 179, 181, 360] {
            let bytes = vec![0u8; len];
            assert_eq!(
                BlockHeader::from_bytes(&bytes),
                Err(HeaderError::UnexpectedLength(len)),
            );
        }
    }
}
