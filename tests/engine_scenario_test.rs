use std::str::FromStr;
use tokenbook::compile::{compile_views, ViewVersion};
use tokenbook::domain::{Address, BaseUnits, Order, OrderId, PriceDirection, TimeSec};
use tokenbook::engine::{my_trade_history, IntegrityViolation, PriceChange};

const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const TOKEN: &str = "0x3333333333333333333333333333333333333333";

fn addr(s: &str) -> Address {
    Address::from_str(s).unwrap()
}

fn units(s: &str) -> BaseUnits {
    BaseUnits::from_decimal_str(s).unwrap()
}

fn order(id: u64, user: &str, buy: bool, ether: &str, tokens: &str, ts: i64) -> Order {
    let (token_get, amount_get, token_give, amount_give) = if buy {
        (addr(TOKEN), units(tokens), Address::native(), units(ether))
    } else {
        (Address::native(), units(ether), addr(TOKEN), units(tokens))
    };
    Order {
        id: OrderId::new(id),
        user: addr(user),
        token_get,
        amount_get,
        token_give,
        amount_give,
        timestamp: TimeSec::new(ts),
        user_fill: None,
        block: id,
        tx_hash: None,
        extra: Default::default(),
    }
}

fn filled(placed: &Order, by: &str, ts: i64) -> Order {
    Order {
        user_fill: Some(addr(by)),
        timestamp: TimeSec::new(ts),
        ..placed.clone()
    }
}

#[test]
fn test_session_of_trading() {
    let h = 1_700_000_000 / 3600 * 3600;
    let all = vec![
        order(1, ALICE, true, "1", "10", h + 1),
        order(2, ALICE, false, "1", "4", h + 2),
        order(3, BOB, true, "0.5", "10", h + 3),
        order(4, BOB, false, "3", "10", h + 4),
        order(5, ALICE, true, "2", "10", h + 5),
    ];
    let trades = vec![
        filled(&all[0], BOB, h + 100),
        filled(&all[1], BOB, h + 200),
        filled(&all[2], ALICE, h + 3700),
    ];
    let cancels = vec![all[3].clone()];

    let views = compile_views(ViewVersion::new(5, 1, 3), &all, &trades, &cancels);

    let open: Vec<u64> = views.open_orders.orders.iter().map(|o| o.id.as_u64()).collect();
    assert_eq!(open, vec![5]);
    assert!(views.open_orders.violations.is_empty());

    let history: Vec<(u64, Option<PriceDirection>)> = views
        .trade_history
        .iter()
        .map(|o| (o.order.id.as_u64(), o.price_direction))
        .collect();
    assert_eq!(
        history,
        vec![
            (3, Some(PriceDirection::Down)),
            (2, Some(PriceDirection::Up)),
            (1, Some(PriceDirection::Up)),
        ]
    );

    assert_eq!(views.price_chart.candles.len(), 2);
    assert_eq!(views.price_chart.last_price.to_string(), "0.05");
    assert_eq!(views.price_chart.last_price_change, PriceChange::Down);
    let first = &views.price_chart.candles[0];
    assert_eq!(first.open.to_string(), "0.1");
    assert_eq!(first.close.to_string(), "0.25");

    let bob: Vec<(u64, char)> = my_trade_history(&addr(BOB), &views.filled)
        .iter()
        .map(|o| (o.order.id.as_u64(), o.order_sign.unwrap()))
        .collect();
    // Bob filled Alice's buy (a sell for him), filled her sell (a buy), and
    // his own buy was filled.
    assert_eq!(bob, vec![(1, '-'), (2, '+'), (3, '+')]);
}

#[test]
fn test_integrity_violations_are_reported() {
    let all = vec![order(1, ALICE, true, "1", "10", 1)];
    let trades = vec![filled(&all[0], BOB, 2)];
    let cancels = vec![all[0].clone()];
    let views = compile_views(ViewVersion::new(1, 1, 1), &all, &trades, &cancels);
    assert!(views.open_orders.orders.is_empty());
    assert_eq!(
        views.open_orders.violations,
        vec![IntegrityViolation::FilledAndCancelled { id: OrderId::new(1) }]
    );
}
