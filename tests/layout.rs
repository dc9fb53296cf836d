// Layout conformance tests for the C-facing message struct.
// They assert size, alignment and field offsets of Message and print the
// observed values to aid debugging when a mismatch occurs on a platform.
use dmxp_dataservice::Structs::{Message, MSG_INLINE};
use dmxp_dataservice::{DataStore, Layout, RegionKind};
use memoffset::offset_of;
use std::mem::{align_of, size_of};

#[test]
fn test_message_layout() {
    let size = size_of::<Message>();
    let align = align_of::<Message>();
    let off_count = offset_of!(Message, count);
    let off_buf = offset_of!(Message, buf);

    println!(
        "Message => size: {size}, align: {align}, offsets: [count:{off_count}, buf:{off_buf}]"
    );

    assert_eq!(align, align_of::<u16>());
    assert_eq!(off_count, 0);
    assert_eq!(off_buf, 2);
    assert_eq!(size, 2 + MSG_INLINE);
}

#[test]
fn test_region_placement() {
    let layout = Layout {
        ds_size: 1024,
        id_offset: 16,
        device_offset: 48,
        data_offset: 112,
    };
    let store = DataStore::new(layout).unwrap();
    let arena = store.arena();

    for (kind, base, limit) in [
        (RegionKind::Identity, 16, 48),
        (RegionKind::Device, 48, 112),
        (RegionKind::Data, 112, 1024),
    ] {
        let region = arena.region(kind);
        println!("{kind}: {region:?}");
        assert_eq!(region.base, base);
        assert_eq!(region.limit, limit);
    }

    // Stamp fills the 32 byte identity region, nothing else is used yet
    assert_eq!(arena.region(RegionKind::Identity).size, 32);
    assert_eq!(arena.region(RegionKind::Device).size, 0);
    assert_eq!(arena.region(RegionKind::Data).size, 0);
}
