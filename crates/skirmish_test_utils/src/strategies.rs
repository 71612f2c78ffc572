//! Proptest strategies for engine types.

use proptest::prelude::*;
use skirmish_core::action::{ActionCode, ACTION_COUNT};
use skirmish_core::hex::HexCoord;
use skirmish_core::unit::UnitKind;

/// Any coordinate within `radius` of the origin.
pub fn arb_hex(radius: i32) -> impl Strategy<Value = HexCoord> {
    (-radius..=radius)
        .prop_flat_map(move |q| {
            let lo = (-radius).max(-q - radius);
            let hi = radius.min(-q + radius);
            (Just(q), lo..=hi)
        })
        .prop_map(|(q, r)| HexCoord::new(q, r))
}

/// Any unit kind.
pub fn arb_unit_kind() -> impl Strategy<Value = UnitKind> {
    prop::sample::select(UnitKind::ROSTER.to_vec())
}

/// Any valid action.
pub fn arb_action() -> impl Strategy<Value = ActionCode> {
    (0..ACTION_COUNT as u8).prop_map(|code| {
        ActionCode::from_index(code).expect("codes below ACTION_COUNT decode")
    })
}
