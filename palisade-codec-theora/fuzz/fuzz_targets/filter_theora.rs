#![no_main]
use libfuzzer_sys::fuzz_target;
use palisade_codec_theora::TheoraFilter;
use palisade_core::filters::PacketFilter;
use palisade_core::packet::Packet;

// The input is a sequence of packets, each prefixed by a 16-bit big-endian length.
fuzz_target!(|data: &[u8]| {
    let mut filter = match TheoraFilter::try_new(&Default::default()) {
        Ok(filter) => filter,
        Err(_) => return,
    };

    let mut rest = data;

    while rest.len() >= 2 {
        let len = usize::from(u16::from_be_bytes([rest[0], rest[1]])).min(rest.len() - 2);
        let (packet, tail) = rest[2..].split_at(len);
        rest = tail;

        if filter.parse(Packet::new(packet)).is_err() {
            break;
        }
    }
});
