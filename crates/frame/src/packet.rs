//! Owned frame buffers for the transmit and receive relay
//!
//! Ownership is the whole point of these types. A `TxFrame` moves from the
//! IP stack into the relay at enqueue and from the relay into the transport
//! at send; an `RxFrame` moves from the receive callback into the relay
//! queue and from there into the IP stack's ingest call. Rust's move
//! semantics make "released exactly once on every path" a compile-time
//! property rather than a convention.

use crate::FrameError;
use bytes::Bytes;

/// Maximum relayed frame length: Ethernet II payload MTU plus header,
/// matching the NCM max segment size advertised in the gadget descriptors.
pub const MAX_FRAME_LEN: usize = 1514;

/// An outbound Ethernet frame, owned by whoever holds the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFrame {
    payload: Bytes,
}

impl TxFrame {
    pub fn new(payload: Bytes) -> Result<Self, FrameError> {
        if payload.is_empty() {
            return Err(FrameError::Empty);
        }
        if payload.len() > MAX_FRAME_LEN {
            return Err(FrameError::TooLong {
                len: payload.len(),
                max: MAX_FRAME_LEN,
            });
        }
        Ok(Self { payload })
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Hand the payload to the transport. Consumes the frame.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

/// An inbound Ethernet frame, copied out of the transport's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RxFrame {
    payload: Bytes,
}

impl RxFrame {
    /// Copy an incoming frame out of a transport-owned buffer.
    ///
    /// The transport reuses its buffer as soon as the receive callback
    /// returns, so a copy (not a borrow) is mandatory here.
    pub fn copy_from(data: &[u8]) -> Result<Self, FrameError> {
        if data.is_empty() {
            return Err(FrameError::Empty);
        }
        if data.len() > MAX_FRAME_LEN {
            return Err(FrameError::TooLong {
                len: data.len(),
                max: MAX_FRAME_LEN,
            });
        }
        Ok(Self {
            payload: Bytes::copy_from_slice(data),
        })
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Hand the payload to the IP stack. Consumes the frame.
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx_copy_is_independent_of_source() {
        let mut scratch = vec![0xDE, 0xAD, 0xBE, 0xEF];
        let frame = RxFrame::copy_from(&scratch).unwrap();
        // Transport reuses its buffer after the callback returns.
        scratch.fill(0);
        assert_eq!(frame.payload(), &[0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn oversize_frames_are_rejected() {
        let big = vec![0u8; MAX_FRAME_LEN + 1];
        assert!(matches!(
            RxFrame::copy_from(&big),
            Err(FrameError::TooLong { .. })
        ));
        assert!(matches!(
            TxFrame::new(Bytes::from(big)),
            Err(FrameError::TooLong { .. })
        ));
    }

    #[test]
    fn empty_frames_are_rejected() {
        assert_eq!(RxFrame::copy_from(&[]), Err(FrameError::Empty));
        assert_eq!(TxFrame::new(Bytes::new()), Err(FrameError::Empty));
    }

    #[test]
    fn max_len_frame_is_accepted() {
        let frame = RxFrame::copy_from(&vec![1u8; MAX_FRAME_LEN]).unwrap();
        assert_eq!(frame.len(), MAX_FRAME_LEN);
    }
}
