use artnode_core::{ChannelBuffer, DMX_CHANNELS};
use proptest::prelude::*;

proptest! {
    #[test]
    fn repeated_ingest_never_marks_dirty(data in proptest::collection::vec(any::<u8>(), 0..600)) {
        let mut buffer = ChannelBuffer::new();
        buffer.ingest(&data);
        buffer.clear_dirty();

        let outcome = buffer.ingest(&data);
        prop_assert!(!outcome.changed);
        prop_assert!(!buffer.is_dirty());
    }

    #[test]
    fn ingest_leaves_tail_untouched(
        first in proptest::collection::vec(any::<u8>(), DMX_CHANNELS),
        second in proptest::collection::vec(any::<u8>(), 0..DMX_CHANNELS),
    ) {
        let mut buffer = ChannelBuffer::new();
        buffer.ingest(&first);
        buffer.ingest(&second);

        let snapshot = buffer.snapshot();
        prop_assert_eq!(&snapshot[..second.len()], &second[..]);
        prop_assert_eq!(&snapshot[second.len()..], &first[second.len()..]);
    }
}

#[test]
fn test_shared_buffer_roundtrip() {
    let shared = ChannelBuffer::shared();
    shared.lock().ingest(&[1, 2, 3]);

    let reader = shared.clone();
    let handle = std::thread::spawn(move || reader.lock().take_if_dirty());
    let snapshot = handle.join().unwrap().unwrap();

    assert_eq!(&snapshot[..3], &[1, 2, 3]);
    assert!(!shared.lock().is_dirty());
}
