//! QUIC transport parameters, per spec.md §4.1 "Transport parameters (TLV
//! with 16-bit identifier + bitmask selection)". Grounded on
//! `original_source/include/nexus/quic/detail/transport_parameters.hpp`.
//!
//! Each parameter is encoded as a 16-bit identifier, a 16-bit length, and
//! that many value bytes. Which parameters are present is tracked
//! separately by a 16-bit [`TransportParameterSet`] bitmask, mirroring the
//! original's `std::bitset<16>` alongside `transport_parameters`.

use std::time::Duration;

use super::length_prefix::FixedPrefixed;
use super::network_order::{U16, U64};
use super::varint::VarInt;
use super::{Decode, DecodeResult, Encode, Truncated};

/// Registry identifiers, `original_source`'s `transport_parameter_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum TransportParameterId {
    OriginalConnectionId = 0,
    IdleTimeout = 1,
    StatelessResetToken = 2,
    MaxPacketSize = 3,
    InitialMaxData = 4,
    InitialMaxStreamDataBidiLocal = 5,
    InitialMaxStreamDataBidiRemote = 6,
    InitialMaxStreamDataUni = 7,
    InitialMaxStreamsBidi = 8,
    InitialMaxStreamsUni = 9,
    AckDelayExponent = 10,
    MaxAckDelay = 11,
    DisableMigration = 12,
    PreferredAddress = 13,
    ActiveConnectionIdLimit = 14,
}

impl TransportParameterId {
    const ALL: [TransportParameterId; 15] = [
        Self::OriginalConnectionId,
        Self::IdleTimeout,
        Self::StatelessResetToken,
        Self::MaxPacketSize,
        Self::InitialMaxData,
        Self::InitialMaxStreamDataBidiLocal,
        Self::InitialMaxStreamDataBidiRemote,
        Self::InitialMaxStreamDataUni,
        Self::InitialMaxStreamsBidi,
        Self::InitialMaxStreamsUni,
        Self::AckDelayExponent,
        Self::MaxAckDelay,
        Self::DisableMigration,
        Self::PreferredAddress,
        Self::ActiveConnectionIdLimit,
    ];

    #[must_use]
    pub fn bit(self) -> u16 {
        self as u16
    }
}

/// Which transport parameters are present, a 16-bit bitmask (one bit per
/// [`TransportParameterId`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportParameterSet(u16);

impl TransportParameterSet {
    #[must_use]
    pub fn empty() -> Self {
        TransportParameterSet(0)
    }

    #[must_use]
    pub fn contains(self, id: TransportParameterId) -> bool {
        self.0 & (1 << id.bit()) != 0
    }

    pub fn insert(&mut self, id: TransportParameterId) {
        self.0 |= 1 << id.bit();
    }

    pub fn remove(&mut self, id: TransportParameterId) {
        self.0 &= !(1 << id.bit());
    }
}

/// `transport_preferred_address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredAddress {
    pub address_v4: [u8; 4],
    pub port_v4: u16,
    pub address_v6: [u8; 16],
    pub port_v6: u16,
    /// 0..18 bytes, length-prefixed.
    pub connection_id: Vec<u8>,
    pub stateless_reset_token: [u8; 16],
}

impl Encode for PreferredAddress {
    fn encoded_size(&self) -> usize {
        4 + 2 + 16 + 2 + 1 + self.connection_id.len() + 16
    }

    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.address_v4);
        U16::new(u64::from(self.port_v4)).unwrap().encode(out);
        out.extend_from_slice(&self.address_v6);
        U16::new(u64::from(self.port_v6)).unwrap().encode(out);
        FixedPrefixed::<1>(self.connection_id.clone()).encode(out);
        out.extend_from_slice(&self.stateless_reset_token);
    }
}

impl Decode for PreferredAddress {
    fn decode(input: &mut &[u8]) -> DecodeResult<Self> {
        if input.len() < 4 {
            return Err(Truncated);
        }
        let mut address_v4 = [0u8; 4];
        address_v4.copy_from_slice(&input[..4]);
        *input = &input[4..];
        let port_v4 = U16::decode(input)?.get() as u16;

        if input.len() < 16 {
            return Err(Truncated);
        }
        let mut address_v6 = [0u8; 16];
        address_v6.copy_from_slice(&input[..16]);
        *input = &input[16..];
        let port_v6 = U16::decode(input)?.get() as u16;

        let connection_id = FixedPrefixed::<1>::decode(input)?.0;

        if input.len() < 16 {
            return Err(Truncated);
        }
        let mut stateless_reset_token = [0u8; 16];
        stateless_reset_token.copy_from_slice(&input[..16]);
        *input = &input[16..];

        Ok(PreferredAddress {
            address_v4,
            port_v4,
            address_v6,
            port_v6,
            connection_id,
            stateless_reset_token,
        })
    }
}

/// `transport_parameters`. Every field is always present in memory; which
/// ones were actually negotiated on the wire is tracked by a
/// [`TransportParameterSet`] kept alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportParameters {
    pub original_connection_id: Vec<u8>,
    pub idle_timeout: Duration,
    pub stateless_reset_token: [u8; 16],
    /// default/max 65527, min 1200.
    pub max_packet_size: VarInt,
    pub initial_max_data: VarInt,
    pub initial_max_stream_data_bidi_local: VarInt,
    pub initial_max_stream_data_bidi_remote: VarInt,
    pub initial_max_stream_data_uni: VarInt,
    pub initial_max_streams_bidi: VarInt,
    pub initial_max_streams_uni: VarInt,
    /// default 3, max 20.
    pub ack_delay_exponent: VarInt,
    pub max_ack_delay: Duration,
    pub disable_migration: bool,
    pub preferred_address: Option<PreferredAddress>,
    /// default 0.
    pub active_connection_id_limit: VarInt,
}

impl Default for TransportParameters {
    fn default() -> Self {
        TransportParameters {
            original_connection_id: Vec::new(),
            idle_timeout: Duration::ZERO,
            stateless_reset_token: [0u8; 16],
            max_packet_size: VarInt::new(65_527).unwrap(),
            initial_max_data: VarInt::ZERO,
            initial_max_stream_data_bidi_local: VarInt::ZERO,
            initial_max_stream_data_bidi_remote: VarInt::ZERO,
            initial_max_stream_data_uni: VarInt::ZERO,
            initial_max_streams_bidi: VarInt::ZERO,
            initial_max_streams_uni: VarInt::ZERO,
            ack_delay_exponent: VarInt::new(3).unwrap(),
            max_ack_delay: Duration::ZERO,
            disable_migration: false,
            preferred_address: None,
            active_connection_id_limit: VarInt::ZERO,
        }
    }
}

impl TransportParameters {
    fn encode_value(&self, id: TransportParameterId, out: &mut Vec<u8>) {
        match id {
            TransportParameterId::OriginalConnectionId => out.extend_from_slice(&self.original_connection_id),
            TransportParameterId::IdleTimeout => {
                U64::new(self.idle_timeout.as_millis() as u64).unwrap().encode(out);
            }
            TransportParameterId::StatelessResetToken => out.extend_from_slice(&self.stateless_reset_token),
            TransportParameterId::MaxPacketSize => self.max_packet_size.encode(out),
            TransportParameterId::InitialMaxData => self.initial_max_data.encode(out),
            TransportParameterId::InitialMaxStreamDataBidiLocal => {
                self.initial_max_stream_data_bidi_local.encode(out);
            }
            TransportParameterId::InitialMaxStreamDataBidiRemote => {
                self.initial_max_stream_data_bidi_remote.encode(out);
            }
            TransportParameterId::InitialMaxStreamDataUni => self.initial_max_stream_data_uni.encode(out),
            TransportParameterId::InitialMaxStreamsBidi => self.initial_max_streams_bidi.encode(out),
            TransportParameterId::InitialMaxStreamsUni => self.initial_max_streams_uni.encode(out),
            TransportParameterId::AckDelayExponent => self.ack_delay_exponent.encode(out),
            TransportParameterId::MaxAckDelay => {
                U64::new(self.max_ack_delay.as_millis() as u64).unwrap().encode(out);
            }
            TransportParameterId::DisableMigration => {}
            TransportParameterId::PreferredAddress => {
                if let Some(addr) = &self.preferred_address {
                    addr.encode(out);
                }
            }
            TransportParameterId::ActiveConnectionIdLimit => self.active_connection_id_limit.encode(out),
        }
    }

    /// Encodes every parameter in `present`, in registry order, each as a
    /// `(id: u16, length: u16, value)` TLV.
    pub fn encode(&self, present: TransportParameterSet, out: &mut Vec<u8>) {
        for id in TransportParameterId::ALL {
            if !present.contains(id) {
                continue;
            }
            let mut value = Vec::new();
            self.encode_value(id, &mut value);
            U16::new(u64::from(id.bit())).unwrap().encode(out);
            U16::new(value.len() as u64).unwrap().encode(out);
            out.extend_from_slice(&value);
        }
    }

    fn apply_value(&mut self, id: TransportParameterId, mut value: &[u8]) -> DecodeResult<()> {
        match id {
            TransportParameterId::OriginalConnectionId => self.original_connection_id = value.to_vec(),
            TransportParameterId::IdleTimeout => {
                self.idle_timeout = Duration::from_millis(U64::decode(&mut value)?.get());
            }
            TransportParameterId::StatelessResetToken => {
                if value.len() != 16 {
                    return Err(Truncated);
                }
                self.stateless_reset_token.copy_from_slice(value);
            }
            TransportParameterId::MaxPacketSize => self.max_packet_size = VarInt::decode(&mut value)?,
            TransportParameterId::InitialMaxData => self.initial_max_data = VarInt::decode(&mut value)?,
            TransportParameterId::InitialMaxStreamDataBidiLocal => {
                self.initial_max_stream_data_bidi_local = VarInt::decode(&mut value)?;
            }
            TransportParameterId::InitialMaxStreamDataBidiRemote => {
                self.initial_max_stream_data_bidi_remote = VarInt::decode(&mut value)?;
            }
            TransportParameterId::InitialMaxStreamDataUni => {
                self.initial_max_stream_data_uni = VarInt::decode(&mut value)?;
            }
            TransportParameterId::InitialMaxStreamsBidi => {
                self.initial_max_streams_bidi = VarInt::decode(&mut value)?;
            }
            TransportParameterId::InitialMaxStreamsUni => {
                self.initial_max_streams_uni = VarInt::decode(&mut value)?;
            }
            TransportParameterId::AckDelayExponent => self.ack_delay_exponent = VarInt::decode(&mut value)?,
            TransportParameterId::MaxAckDelay => {
                self.max_ack_delay = Duration::from_millis(U64::decode(&mut value)?.get());
            }
            TransportParameterId::DisableMigration => self.disable_migration = true,
            TransportParameterId::PreferredAddress => {
                self.preferred_address = Some(PreferredAddress::decode(&mut value)?);
            }
            TransportParameterId::ActiveConnectionIdLimit => {
                self.active_connection_id_limit = VarInt::decode(&mut value)?;
            }
        }
        Ok(())
    }

    /// Decodes a flat run of TLVs until `input` is exhausted. Unknown
    /// identifiers (outside `0..=14`) are skipped (spec.md §4.1: "Unknown
    /// identifiers are skipped").
    pub fn decode(input: &mut &[u8]) -> DecodeResult<(Self, TransportParameterSet)> {
        let mut params = TransportParameters::default();
        let mut present = TransportParameterSet::empty();
        while !input.is_empty() {
            let id_raw = U16::decode(input)?.get() as u16;
            let len = U16::decode(input)?.get() as usize;
            if input.len() < len {
                return Err(Truncated);
            }
            let value = &input[..len];
            *input = &input[len..];

            if let Some(id) = id_from_bit(id_raw) {
                params.apply_value(id, value)?;
                present.insert(id);
            }
        }
        Ok((params, present))
    }
}

fn id_from_bit(bit: u16) -> Option<TransportParameterId> {
    TransportParameterId::ALL.into_iter().find(|id| id.bit() == bit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_subset_of_scalar_parameters() {
        let mut params = TransportParameters::default();
        params.initial_max_data = VarInt::new(1_048_576).unwrap();
        params.ack_delay_exponent = VarInt::new(5).unwrap();
        params.disable_migration = true;

        let mut present = TransportParameterSet::empty();
        present.insert(TransportParameterId::InitialMaxData);
        present.insert(TransportParameterId::AckDelayExponent);
        present.insert(TransportParameterId::DisableMigration);

        let mut bytes = Vec::new();
        params.encode(present, &mut bytes);

        let mut input: &[u8] = &bytes;
        let (decoded, decoded_present) = TransportParameters::decode(&mut input).unwrap();
        assert!(input.is_empty());
        assert_eq!(decoded_present, present);
        assert_eq!(decoded.initial_max_data, params.initial_max_data);
        assert_eq!(decoded.ack_delay_exponent, params.ack_delay_exponent);
        assert!(decoded.disable_migration);
        assert!(!decoded_present.contains(TransportParameterId::MaxPacketSize));
    }

    #[test]
    fn unknown_identifier_is_skipped() {
        let mut bytes = Vec::new();
        // identifier 0xff (unregistered), length 3, three bytes of filler.
        U16::new(0xff).unwrap().encode(&mut bytes);
        U16::new(3).unwrap().encode(&mut bytes);
        bytes.extend_from_slice(&[1, 2, 3]);

        let mut input: &[u8] = &bytes;
        let (_, present) = TransportParameters::decode(&mut input).unwrap();
        assert!(input.is_empty());
        assert_eq!(present, TransportParameterSet::empty());
    }

    #[test]
    fn preferred_address_round_trips() {
        let addr = PreferredAddress {
            address_v4: [127, 0, 0, 1],
            port_v4: 443,
            address_v6: [0u8; 16],
            port_v6: 443,
            connection_id: vec![1, 2, 3, 4],
            stateless_reset_token: [9u8; 16],
        };
        let mut bytes = Vec::new();
        addr.encode(&mut bytes);
        assert_eq!(bytes.len(), addr.encoded_size());

        let mut input: &[u8] = &bytes;
        let decoded = PreferredAddress::decode(&mut input).unwrap();
        assert_eq!(decoded, addr);
        assert!(input.is_empty());
    }

    #[test]
    fn truncated_tlv_length_is_rejected() {
        let mut bytes = Vec::new();
        U16::new(TransportParameterId::MaxPacketSize.bit() as u64).unwrap().encode(&mut bytes);
        U16::new(10).unwrap().encode(&mut bytes);
        bytes.extend_from_slice(&[1, 2]);
        let mut input: &[u8] = &bytes;
        assert_eq!(TransportParameters::decode(&mut input), Err(Truncated));
    }
}
