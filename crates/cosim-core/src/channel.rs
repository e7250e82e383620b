//! Byte channels shared between the simulation and remote clients
//!
//! A [`ByteChannel`] is one direction of traffic for one VVC instance. It is a
//! plain FIFO of [`ByteFrame`]s behind its own mutex; the simulation thread and
//! any number of request handlers may use it concurrently.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// One transferred byte plus its end-of-frame marker
///
/// The marker is stored for framed transfers and is not interpreted by the
/// bulk byte operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteFrame {
    /// Data byte
    pub byte: u8,
    /// Last byte of a frame
    pub end_of_frame: bool,
}

impl ByteFrame {
    /// Create a frame that is not the end of a packet
    pub fn new(byte: u8) -> Self {
        Self {
            byte,
            end_of_frame: false,
        }
    }

    /// Create a frame with an explicit end-of-frame marker
    pub fn with_end_of_frame(byte: u8, end_of_frame: bool) -> Self {
        Self { byte, end_of_frame }
    }
}

/// How much data a bulk read may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadMode {
    /// All or nothing: only return data when the full length is available
    Exact,
    /// Return whatever is available, up to the requested length
    #[default]
    BestEffort,
}

impl ReadMode {
    /// Map the wire-level `all_or_nothing` flag onto a read mode
    pub fn from_all_or_nothing(all_or_nothing: bool) -> Self {
        if all_or_nothing {
            Self::Exact
        } else {
            Self::BestEffort
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::BestEffort => "best-effort",
        }
    }
}

/// Thread-safe FIFO of byte frames
#[derive(Debug, Default)]
pub struct ByteChannel {
    frames: Mutex<VecDeque<ByteFrame>>,
}

impl ByteChannel {
    /// Create an empty channel
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the tail, each without an end-of-frame marker
    pub fn push(&self, bytes: &[u8]) {
        let mut frames = self.frames.lock();
        frames.extend(bytes.iter().copied().map(ByteFrame::new));
    }

    /// Append a single frame
    pub fn push_frame(&self, frame: ByteFrame) {
        self.frames.lock().push_back(frame);
    }

    /// Remove and return the oldest frame
    pub fn pop_front(&self) -> Option<ByteFrame> {
        self.frames.lock().pop_front()
    }

    /// Whether the channel currently holds no frames
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Number of frames currently buffered
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Remove up to `length` bytes from the head of the channel
    ///
    /// - More than `length` frames buffered: the first `length` are returned.
    /// - Exactly `length` buffered, or [`ReadMode::BestEffort`]: everything
    ///   buffered is returned.
    /// - Fewer than `length` buffered in [`ReadMode::Exact`]: nothing is
    ///   returned and the channel is left untouched. Callers poll again later.
    ///
    /// The size check and the removal happen under one lock acquisition.
    pub fn pop_bulk(&self, length: usize, mode: ReadMode) -> Vec<u8> {
        let mut frames = self.frames.lock();

        let take = if frames.len() > length {
            length
        } else if frames.len() == length || mode == ReadMode::BestEffort {
            frames.len()
        } else {
            return Vec::new();
        };

        frames.drain(..take).map(|frame| frame.byte).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_with(bytes: &[u8]) -> ByteChannel {
        let channel = ByteChannel::new();
        channel.push(bytes);
        channel
    }

    #[test]
    fn test_round_trip_exact() {
        let channel = channel_with(&[0x01, 0x02, 0x03]);

        assert_eq!(channel.pop_bulk(3, ReadMode::Exact), vec![0x01, 0x02, 0x03]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_exact_insufficient_leaves_channel_untouched() {
        let channel = channel_with(&[0xAA, 0xBB]);

        assert!(channel.pop_bulk(5, ReadMode::Exact).is_empty());
        assert_eq!(channel.len(), 2);

        // Same state, best effort drains what is there
        assert_eq!(channel.pop_bulk(5, ReadMode::BestEffort), vec![0xAA, 0xBB]);
        assert!(channel.is_empty());
    }

    #[test]
    fn test_exact_length_boundary_both_modes() {
        let exact = channel_with(&[1, 2, 3, 4]);
        assert_eq!(exact.pop_bulk(4, ReadMode::Exact), vec![1, 2, 3, 4]);
        assert!(exact.is_empty());

        let best_effort = channel_with(&[1, 2, 3, 4]);
        assert_eq!(best_effort.pop_bulk(4, ReadMode::BestEffort), vec![1, 2, 3, 4]);
        assert!(best_effort.is_empty());
    }

    #[test]
    fn test_partial_read_keeps_remainder_in_order() {
        let channel = channel_with(&[10, 20, 30, 40, 50]);

        assert_eq!(channel.pop_bulk(2, ReadMode::Exact), vec![10, 20]);
        assert_eq!(channel.len(), 3);
        assert_eq!(channel.pop_bulk(3, ReadMode::Exact), vec![30, 40, 50]);
    }

    #[test]
    fn test_empty_channel_reads() {
        let channel = ByteChannel::new();

        assert!(channel.pop_bulk(1, ReadMode::Exact).is_empty());
        assert!(channel.pop_bulk(1, ReadMode::BestEffort).is_empty());
        assert!(channel.pop_front().is_none());
    }

    #[test]
    fn test_zero_length_read() {
        let channel = channel_with(&[7]);

        assert!(channel.pop_bulk(0, ReadMode::Exact).is_empty());
        assert!(channel.pop_bulk(0, ReadMode::BestEffort).is_empty());
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_end_of_frame_marker_preserved() {
        let channel = ByteChannel::new();
        channel.push(&[0x11]);
        channel.push_frame(ByteFrame::with_end_of_frame(0x22, true));

        assert_eq!(channel.pop_front(), Some(ByteFrame::new(0x11)));
        assert_eq!(
            channel.pop_front(),
            Some(ByteFrame::with_end_of_frame(0x22, true))
        );
    }

    #[test]
    fn test_read_mode_from_flag() {
        assert_eq!(ReadMode::from_all_or_nothing(true), ReadMode::Exact);
        assert_eq!(ReadMode::from_all_or_nothing(false), ReadMode::BestEffort);
    }
}
