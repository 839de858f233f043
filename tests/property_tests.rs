//! Property-based tests for the arithmetic core: unit conversion, order
//! totals, and the order status machine.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::IntoEnumIterator;

use rms_api::entities::order::OrderStatus;
use rms_api::entities::pos_settings::RoundingMode;
use rms_api::services::orders::{deduction_quantity, OrderTotals};
use rms_api::services::settings::ChargeRates;
use rms_api::units::{convert, Unit};

// Strategies for generating test data

fn any_unit() -> impl Strategy<Value = Unit> {
    let units: Vec<Unit> = Unit::iter().collect();
    proptest::sample::select(units)
}

/// Quantities with up to 3 decimal places, as real stock levels have.
fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|raw| Decimal::new(raw, 3))
}

fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn discount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|raw| Decimal::new(raw, 2)) // 0.00..=100.00
}

fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=5_000).prop_map(|raw| Decimal::new(raw, 2)) // 0.00..=50.00
}

fn lines_strategy() -> impl Strategy<Value = Vec<(Decimal, i32)>> {
    proptest::collection::vec((price_strategy(), 1i32..=20), 0..8)
}

// Property: converting to a compatible unit and back is the identity,
// within Decimal division tolerance (dozen factors do not divide evenly).
proptest! {
    #[test]
    fn conversion_round_trips_within_a_dimension(
        value in quantity_strategy(),
        from in any_unit(),
        to in any_unit(),
    ) {
        prop_assume!(from.base() == to.base());
        let there = convert(value, from, to);
        let back = convert(there, to, from);
        let tolerance = Decimal::new(1, 19) * (Decimal::ONE + value);
        prop_assert!(
            (back - value).abs() <= tolerance,
            "{} -> {} -> {}: {} vs {}", from, to, from, back, value
        );
    }

    // Property: incompatible conversions return the input unchanged.
    #[test]
    fn incompatible_conversion_is_identity(
        value in quantity_strategy(),
        from in any_unit(),
        to in any_unit(),
    ) {
        prop_assume!(from.base() != to.base());
        prop_assert_eq!(convert(value, from, to), value);
    }

    // Property: conversion preserves sign and zero.
    #[test]
    fn conversion_preserves_zero(from in any_unit(), to in any_unit()) {
        prop_assert_eq!(convert(Decimal::ZERO, from, to), Decimal::ZERO);
    }
}

// Properties of the order total breakdown.
proptest! {
    #[test]
    fn discount_never_exceeds_subtotal(
        lines in lines_strategy(),
        discount in discount_strategy(),
        tax in rate_strategy(),
        service in rate_strategy(),
    ) {
        let rates = ChargeRates {
            tax_rate: tax,
            service_charge_rate: service,
            rounding: RoundingMode::None,
        };
        let totals = OrderTotals::calculate(&lines, discount, &rates).unwrap();

        prop_assert!(totals.discount <= totals.subtotal);
        prop_assert!(totals.discount >= Decimal::ZERO);
    }

    #[test]
    fn charges_are_non_negative_and_total_covers_discounted_subtotal(
        lines in lines_strategy(),
        discount in discount_strategy(),
        tax in rate_strategy(),
        service in rate_strategy(),
    ) {
        let rates = ChargeRates {
            tax_rate: tax,
            service_charge_rate: service,
            rounding: RoundingMode::None,
        };
        let totals = OrderTotals::calculate(&lines, discount, &rates).unwrap();

        prop_assert!(totals.tax >= Decimal::ZERO);
        prop_assert!(totals.service_charge >= Decimal::ZERO);
        prop_assert!(totals.total >= totals.subtotal - totals.discount);
    }

    #[test]
    fn totals_decompose_exactly_without_rounding(
        lines in lines_strategy(),
        discount in discount_strategy(),
        tax in rate_strategy(),
        service in rate_strategy(),
    ) {
        let rates = ChargeRates {
            tax_rate: tax,
            service_charge_rate: service,
            rounding: RoundingMode::None,
        };
        let totals = OrderTotals::calculate(&lines, discount, &rates).unwrap();

        let taxable = totals.subtotal - totals.discount;
        prop_assert_eq!(totals.total, taxable + totals.tax + totals.service_charge);
    }

    // Rounded totals stay within half the rounding step of the raw total.
    #[test]
    fn rounding_moves_the_total_at_most_half_a_step(
        lines in lines_strategy(),
        tax in rate_strategy(),
        service in rate_strategy(),
    ) {
        let exact = OrderTotals::calculate(
            &lines,
            Decimal::ZERO,
            &ChargeRates { tax_rate: tax, service_charge_rate: service, rounding: RoundingMode::None },
        )
        .unwrap();
        let half = OrderTotals::calculate(
            &lines,
            Decimal::ZERO,
            &ChargeRates { tax_rate: tax, service_charge_rate: service, rounding: RoundingMode::Half },
        )
        .unwrap();
        let unit = OrderTotals::calculate(
            &lines,
            Decimal::ZERO,
            &ChargeRates { tax_rate: tax, service_charge_rate: service, rounding: RoundingMode::Unit },
        )
        .unwrap();

        prop_assert!((half.total - exact.total).abs() <= dec!(0.25));
        prop_assert!((unit.total - exact.total).abs() <= dec!(0.5));
    }
}

// Properties of automatic deduction quantities.
proptest! {
    #[test]
    fn deduction_is_negative_and_scales_linearly(
        quantity in (1i64..1_000_000).prop_map(|raw| Decimal::new(raw, 3)),
        unit in any_unit(),
        line_qty in 1i32..=50,
    ) {
        let single = deduction_quantity(quantity, unit.as_str(), unit.as_str(), 1);
        let scaled = deduction_quantity(quantity, unit.as_str(), unit.as_str(), line_qty);

        prop_assert!(single < Decimal::ZERO);
        prop_assert_eq!(scaled, single * Decimal::from(line_qty));
    }
}

// The order status machine, exercised exhaustively.
#[test]
fn cancellation_is_reachable_from_every_non_terminal_state() {
    for status in OrderStatus::iter() {
        if status.is_terminal() {
            assert!(!status.can_transition_to(OrderStatus::Cancelled));
        } else {
            assert!(status.can_transition_to(OrderStatus::Cancelled));
        }
    }
}

#[test]
fn terminal_states_absorb() {
    for target in OrderStatus::iter() {
        assert!(!OrderStatus::Completed.can_transition_to(target));
        assert!(!OrderStatus::Cancelled.can_transition_to(target));
    }
}

#[test]
fn exactly_one_forward_edge_per_non_terminal_state() {
    // Besides cancellation, each non-terminal state has exactly one legal
    // next step.
    for status in OrderStatus::iter().filter(|s| !s.is_terminal()) {
        let forward: Vec<OrderStatus> = OrderStatus::iter()
            .filter(|t| *t != OrderStatus::Cancelled && status.can_transition_to(*t))
            .collect();
        assert_eq!(forward.len(), 1, "{status:?} has {forward:?}");
    }
}

#[test]
fn status_strings_round_trip() {
    for status in OrderStatus::iter() {
        assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
    }
}
