//! Wire encoding of the `(request_id, extra)` pair carried by request events
//! and echoed back by the operator at fulfillment time.
//!
//! ```text
//! request_id (8 bytes LE) || extra_len (4 bytes LE) || extra (extra_len bytes)
//! ```

use crate::state::RequestId;

const HEADER_LEN: usize = 8 + 4;

/// Decoded fulfillment payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPayload {
    pub request_id: RequestId,
    pub extra: Vec<u8>,
}

/// Reasons a payload buffer cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("payload truncated: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("payload has {extra} unexpected trailing bytes")]
    TrailingBytes { extra: usize },
    #[error("extra data of {0} bytes does not fit the length prefix")]
    ExtraTooLong(usize),
}

impl RequestPayload {
    pub fn new(request_id: RequestId, extra: impl Into<Vec<u8>>) -> Self {
        Self {
            request_id,
            extra: extra.into(),
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        encode(self.request_id, &self.extra)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.len() < HEADER_LEN {
            return Err(PayloadError::Truncated {
                needed: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        let (id_bytes, rest) = bytes.split_at(8);
        let (len_bytes, body) = rest.split_at(4);

        let mut id = [0u8; 8];
        id.copy_from_slice(id_bytes);
        let mut len = [0u8; 4];
        len.copy_from_slice(len_bytes);
        let extra_len = u32::from_le_bytes(len) as usize;

        if body.len() < extra_len {
            return Err(PayloadError::Truncated {
                needed: extra_len.saturating_add(HEADER_LEN),
                actual: bytes.len(),
            });
        }
        if body.len() > extra_len {
            return Err(PayloadError::TrailingBytes {
                extra: body.len() - extra_len,
            });
        }

        Ok(Self {
            request_id: u64::from_le_bytes(id),
            extra: body.to_vec(),
        })
    }
}

/// Encode a request payload without building a [`RequestPayload`] first.
pub fn encode(request_id: RequestId, extra: &[u8]) -> Result<Vec<u8>, PayloadError> {
    let extra_len =
        u32::try_from(extra.len()).map_err(|_| PayloadError::ExtraTooLong(extra.len()))?;
    Ok(encode_with_len(request_id, extra_len, extra))
}

/// Encode with a length prefix the caller already checked against `extra`.
pub(crate) fn encode_with_len(request_id: RequestId, extra_len: u32, extra: &[u8]) -> Vec<u8> {
    debug_assert_eq!(extra_len as usize, extra.len());
    let mut out = Vec::with_capacity(extra.len().saturating_add(HEADER_LEN));
    out.extend_from_slice(&request_id.to_le_bytes());
    out.extend_from_slice(&extra_len.to_le_bytes());
    out.extend_from_slice(extra);
    out
}
