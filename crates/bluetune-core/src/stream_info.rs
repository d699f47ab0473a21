//! Stream information snapshots and their frame encoding
//!
//! A StreamInfo message carries a change mask, the snapshot's own mask of valid
//! fields, and every field of the snapshot.
//! 64-bit fields (size, duration) travel as two 32-bit words and are rebuilt
//! with [`decode_wide`].

use crate::error::{ProtocolError, Result};
use crate::message::MessageKind;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the high word of a split 64-bit value
pub const WIDE_WORD_BASE: u64 = 0x7FFF_FFFF;

bitflags::bitflags! {
    /// Fields of a [`StreamInfo`] that changed in a notification.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StreamInfoMask: u32 {
        const NOMINAL_BITRATE = 0x001;
        const AVERAGE_BITRATE = 0x002;
        const INSTANT_BITRATE = 0x004;
        const SIZE            = 0x008;
        const DURATION        = 0x010;
        const SAMPLE_RATE     = 0x020;
        const CHANNEL_COUNT   = 0x040;
        const FLAGS           = 0x080;
        const DATA_TYPE       = 0x100;

        // engines may set bits this table does not name
        const _ = !0;
    }
}

bitflags::bitflags! {
    /// Stream property flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct StreamFlags: u32 {
        /// Variable bitrate
        const VBR        = 0x01;
        /// Continuous stream (no known end)
        const CONTINUOUS = 0x02;

        const _ = !0;
    }
}

/// Attributes of the stream currently decoded by the engine
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Fields the engine holds a value for
    pub mask: StreamInfoMask,
    /// Human-readable data type, usually a MIME type
    pub data_type: Option<String>,
    pub stream_type: i32,
    pub id: i32,
    pub nominal_bitrate: u32,
    pub average_bitrate: u32,
    pub instant_bitrate: u32,
    /// Size in bytes
    pub size: u64,
    /// Duration in milliseconds
    pub duration: u64,
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub channel_count: u16,
    pub flags: StreamFlags,
}

/// Index of each integer argument in a StreamInfo frame
pub(crate) mod layout {
    /// Fields that changed in this notification
    pub const CHANGED: usize = 0;
    /// Fields the snapshot holds a value for
    pub const VALID: usize = 1;
    pub const STREAM_TYPE: usize = 2;
    pub const ID: usize = 3;
    pub const NOMINAL_BITRATE: usize = 4;
    pub const AVERAGE_BITRATE: usize = 5;
    pub const INSTANT_BITRATE: usize = 6;
    pub const SIZE_HIGH: usize = 7;
    pub const SIZE_LOW: usize = 8;
    pub const DURATION_HIGH: usize = 9;
    pub const DURATION_LOW: usize = 10;
    pub const SAMPLE_RATE: usize = 11;
    pub const CHANNEL_COUNT: usize = 12;
    pub const FLAGS: usize = 13;
    pub const INT_COUNT: usize = 14;

    pub const DATA_TYPE: usize = 0;
}

/// Rebuild a 64-bit value from its two-word encoding: `high * 0x7FFFFFFF + low`.
///
/// Both words are read as unsigned 32-bit quantities.
pub fn decode_wide(high: i32, low: i32) -> u64 {
    (high as u32 as u64) * WIDE_WORD_BASE + (low as u32 as u64)
}

/// Split a 64-bit value into the two-word encoding.
///
/// Returns `None` when the high word would not fit a non-negative `i32`.
pub fn encode_wide(value: u64) -> Option<(i32, i32)> {
    let high = value / WIDE_WORD_BASE;
    let low = value % WIDE_WORD_BASE;
    let high = i32::try_from(high).ok()?;
    // low < 0x7FFFFFFF always fits
    Some((high, low as i32))
}

impl StreamInfo {
    /// Copy the fields selected by `changed` from `update` into `self`.
    ///
    /// Stream type, id and the valid-field mask have no change bit and are
    /// always taken from `update`.
    pub fn merge(&mut self, changed: StreamInfoMask, update: &StreamInfo) {
        self.mask = update.mask;
        self.stream_type = update.stream_type;
        self.id = update.id;
        if changed.contains(StreamInfoMask::NOMINAL_BITRATE) {
            self.nominal_bitrate = update.nominal_bitrate;
        }
        if changed.contains(StreamInfoMask::AVERAGE_BITRATE) {
            self.average_bitrate = update.average_bitrate;
        }
        if changed.contains(StreamInfoMask::INSTANT_BITRATE) {
            self.instant_bitrate = update.instant_bitrate;
        }
        if changed.contains(StreamInfoMask::SIZE) {
            self.size = update.size;
        }
        if changed.contains(StreamInfoMask::DURATION) {
            self.duration = update.duration;
        }
        if changed.contains(StreamInfoMask::SAMPLE_RATE) {
            self.sample_rate = update.sample_rate;
        }
        if changed.contains(StreamInfoMask::CHANNEL_COUNT) {
            self.channel_count = update.channel_count;
        }
        if changed.contains(StreamInfoMask::FLAGS) {
            self.flags = update.flags;
        }
        if changed.contains(StreamInfoMask::DATA_TYPE) {
            self.data_type = update.data_type.clone();
        }
    }

    /// Decode a StreamInfo frame into its change mask and snapshot
    pub(crate) fn from_frame(
        ints: &[i32],
        objs: &[Option<String>],
    ) -> Result<(StreamInfoMask, StreamInfo)> {
        if ints.len() < layout::INT_COUNT {
            return Err(ProtocolError::MissingArgument {
                kind: MessageKind::StreamInfo,
                what: "integer",
                index: ints.len(),
            });
        }
        let int = |index: usize| ints[index];

        let changed = StreamInfoMask::from_bits_retain(int(layout::CHANGED) as u32);
        let channels = int(layout::CHANNEL_COUNT);
        let info = StreamInfo {
            mask: StreamInfoMask::from_bits_retain(int(layout::VALID) as u32),
            data_type: objs.get(layout::DATA_TYPE).cloned().flatten(),
            stream_type: int(layout::STREAM_TYPE),
            id: int(layout::ID),
            nominal_bitrate: unsigned("nominal_bitrate", int(layout::NOMINAL_BITRATE))?,
            average_bitrate: unsigned("average_bitrate", int(layout::AVERAGE_BITRATE))?,
            instant_bitrate: unsigned("instant_bitrate", int(layout::INSTANT_BITRATE))?,
            size: decode_wide(int(layout::SIZE_HIGH), int(layout::SIZE_LOW)),
            duration: decode_wide(int(layout::DURATION_HIGH), int(layout::DURATION_LOW)),
            sample_rate: unsigned("sample_rate", int(layout::SAMPLE_RATE))?,
            channel_count: u16::try_from(channels).map_err(|_| ProtocolError::OutOfRange {
                field: "channel_count",
                value: channels as i64,
            })?,
            flags: StreamFlags::from_bits_retain(int(layout::FLAGS) as u32),
        };

        Ok((changed, info))
    }

    /// Encode into frame arguments. Fails when a 64-bit field overflows the
    /// two-word encoding.
    pub(crate) fn to_frame(
        &self,
        changed: StreamInfoMask,
    ) -> Result<(Vec<i32>, Vec<Option<String>>)> {
        let (size_high, size_low) = encode_wide(self.size).ok_or(ProtocolError::OutOfRange {
            field: "size",
            value: self.size as i64,
        })?;
        let (duration_high, duration_low) =
            encode_wide(self.duration).ok_or(ProtocolError::OutOfRange {
                field: "duration",
                value: self.duration as i64,
            })?;

        let mut ints = vec![0; layout::INT_COUNT];
        ints[layout::CHANGED] = changed.bits() as i32;
        ints[layout::VALID] = self.mask.bits() as i32;
        ints[layout::STREAM_TYPE] = self.stream_type;
        ints[layout::ID] = self.id;
        ints[layout::NOMINAL_BITRATE] = self.nominal_bitrate as i32;
        ints[layout::AVERAGE_BITRATE] = self.average_bitrate as i32;
        ints[layout::INSTANT_BITRATE] = self.instant_bitrate as i32;
        ints[layout::SIZE_HIGH] = size_high;
        ints[layout::SIZE_LOW] = size_low;
        ints[layout::DURATION_HIGH] = duration_high;
        ints[layout::DURATION_LOW] = duration_low;
        ints[layout::SAMPLE_RATE] = self.sample_rate as i32;
        ints[layout::CHANNEL_COUNT] = self.channel_count as i32;
        ints[layout::FLAGS] = self.flags.bits() as i32;

        Ok((ints, vec![self.data_type.clone()]))
    }
}

fn unsigned(field: &'static str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| ProtocolError::OutOfRange {
        field,
        value: value as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_wide_known_pairs() {
        assert_eq!(decode_wide(1, 5), 0x7FFF_FFFF + 5);
        assert_eq!(decode_wide(0, 1234), 1234);
        assert_eq!(decode_wide(2, 0), 2 * 0x7FFF_FFFF);
    }

    #[test]
    fn test_encode_wide_matches_decode() {
        let value = 5 * WIDE_WORD_BASE + 17;
        assert_eq!(encode_wide(value), Some((5, 17)));
        assert_eq!(encode_wide(u64::MAX), None);
    }

    #[test]
    fn test_mask_bits_are_independent_flags() {
        let all = [
            StreamInfoMask::NOMINAL_BITRATE,
            StreamInfoMask::AVERAGE_BITRATE,
            StreamInfoMask::INSTANT_BITRATE,
            StreamInfoMask::SIZE,
            StreamInfoMask::DURATION,
            StreamInfoMask::SAMPLE_RATE,
            StreamInfoMask::CHANNEL_COUNT,
            StreamInfoMask::FLAGS,
            StreamInfoMask::DATA_TYPE,
        ];
        for flag in all {
            assert!(flag.bits().is_power_of_two());
        }
        let combined = StreamInfoMask::SIZE | StreamInfoMask::DURATION;
        assert_eq!(combined.bits(), 0x018);
        assert!(StreamInfoMask::from_bits_retain(0x8000).bits() == 0x8000);
    }

    #[test]
    fn test_merge_only_copies_masked_fields() {
        let mut current = StreamInfo {
            sample_rate: 44100,
            channel_count: 2,
            ..Default::default()
        };
        let update = StreamInfo {
            sample_rate: 48000,
            channel_count: 6,
            nominal_bitrate: 320_000,
            data_type: Some("audio/mpeg".to_string()),
            ..Default::default()
        };

        current.merge(StreamInfoMask::SAMPLE_RATE | StreamInfoMask::DATA_TYPE, &update);

        assert_eq!(current.sample_rate, 48000);
        assert_eq!(current.channel_count, 2);
        assert_eq!(current.nominal_bitrate, 0);
        assert_eq!(current.data_type.as_deref(), Some("audio/mpeg"));
    }

    #[test]
    fn test_from_frame_rebuilds_wide_fields() {
        let mut ints = vec![0; layout::INT_COUNT];
        ints[layout::CHANGED] = (StreamInfoMask::SIZE | StreamInfoMask::DURATION).bits() as i32;
        ints[layout::VALID] = 0x1FF;
        ints[layout::SIZE_HIGH] = 1;
        ints[layout::SIZE_LOW] = 5;
        ints[layout::DURATION_HIGH] = 0;
        ints[layout::DURATION_LOW] = 215_000;
        ints[layout::SAMPLE_RATE] = 44100;
        ints[layout::CHANNEL_COUNT] = 2;

        let (mask, info) = StreamInfo::from_frame(&ints, &[Some("audio/flac".into())]).unwrap();
        assert!(mask.contains(StreamInfoMask::SIZE));
        assert_eq!(info.mask.bits(), 0x1FF);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channel_count, 2);
        assert_eq!(info.size, 0x7FFF_FFFF + 5);
        assert_eq!(info.duration, 215_000);
        assert_eq!(info.data_type.as_deref(), Some("audio/flac"));
    }

    #[test]
    fn test_from_frame_rejects_short_frames() {
        let ints = vec![0; 4];
        let err = StreamInfo::from_frame(&ints, &[]).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::MissingArgument {
                kind: MessageKind::StreamInfo,
                what: "integer",
                index: 4,
            }
        );
    }

    #[test]
    fn test_from_frame_rejects_negative_channel_count() {
        let mut ints = vec![0; layout::INT_COUNT];
        ints[layout::CHANNEL_COUNT] = -1;
        assert!(matches!(
            StreamInfo::from_frame(&ints, &[]),
            Err(ProtocolError::OutOfRange { field: "channel_count", .. })
        ));
    }

    #[test]
    fn test_from_frame_reads_engine_positions() {
        // changed, valid, type, id, 3 bitrates, size hi/lo, duration hi/lo, rate, channels, flags
        let ints = [
            0x018, 0x1FF, 1, 7, 128_000, 128_000, 0, 1, 5, 0, 215_000, 44_100, 2, 0x01,
        ];
        let (changed, info) = StreamInfo::from_frame(&ints, &[Some("audio/mpeg".into())]).unwrap();

        assert_eq!(changed, StreamInfoMask::SIZE | StreamInfoMask::DURATION);
        assert_eq!(info.mask.bits(), 0x1FF);
        assert_eq!(info.stream_type, 1);
        assert_eq!(info.id, 7);
        assert_eq!(info.nominal_bitrate, 128_000);
        assert_eq!(info.instant_bitrate, 0);
        assert_eq!(info.size, 0x7FFF_FFFF + 5);
        assert_eq!(info.duration, 215_000);
        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(info.channel_count, 2);
        assert_eq!(info.flags, StreamFlags::VBR);
    }

    #[test]
    fn test_to_frame_writes_both_masks() {
        let info = StreamInfo {
            mask: StreamInfoMask::SAMPLE_RATE | StreamInfoMask::CHANNEL_COUNT,
            sample_rate: 48_000,
            channel_count: 2,
            ..Default::default()
        };
        let (ints, _) = info.to_frame(StreamInfoMask::SAMPLE_RATE).unwrap();
        assert_eq!(ints.len(), 14);
        assert_eq!(ints[layout::CHANGED], 0x020);
        assert_eq!(ints[layout::VALID], 0x060);
        assert_eq!(ints[layout::SAMPLE_RATE], 48_000);
    }
}
