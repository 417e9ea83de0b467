// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! P4: a face message round-trips through pack/unpack regardless of how
//! many injectors it carries (spec.md §8).

use pic_wire::{custom_handler_slot, is_custom_handler, FaceBuffer, Injector, Sentinel};
use proptest::prelude::*;

fn arb_injector() -> impl Strategy<Value = Injector> {
    (
        any::<f32>(),
        any::<f32>(),
        any::<f32>(),
        any::<i64>(),
        any::<f32>(),
        any::<f32>(),
        any::<f32>(),
        any::<f32>(),
        any::<f32>(),
        any::<f32>(),
        any::<f32>(),
        0u32..64,
    )
        .prop_map(|(dx, dy, dz, i, ux, uy, uz, q, dispx, dispy, dispz, sp_id)| {
            Injector::new(dx, dy, dz, i, ux, uy, uz, q, dispx, dispy, dispz, sp_id)
        })
}

proptest! {
    #[test]
    fn face_buffer_round_trips_any_injector_list(injectors in proptest::collection::vec(arb_injector(), 0..16)) {
        let mut buf = FaceBuffer::new();
        buf.pack(&injectors);
        let decoded = buf.unpack().unwrap();
        prop_assert_eq!(decoded, injectors);
    }
}

#[test]
fn sentinels_never_decode_as_custom_handlers() {
    assert!(!is_custom_handler(Sentinel::ABSORB));
    assert!(!is_custom_handler(Sentinel::REFLECT));
    assert_eq!(custom_handler_slot(Sentinel::ABSORB), None);
}

#[test]
fn empty_face_message_round_trips() {
    let mut buf = FaceBuffer::new();
    buf.pack(&[]);
    assert_eq!(buf.peek_count().unwrap(), 0);
    assert!(buf.unpack().unwrap().is_empty());
}
