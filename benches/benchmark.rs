use criterion::{Criterion, criterion_group, criterion_main};
use order_book_engine::engine::MatchingEngine;
use order_book_engine::order::{OrderType, Side};

const SYMBOL: &str = "BTC/USDT";

fn setup_engine(depth: u64, orders_per_level: u64) -> MatchingEngine {
    let engine = MatchingEngine::new();
    engine.register_pair(SYMBOL);
    for price in 1..=depth {
        for _ in 0..orders_per_level {
            engine
                .submit("mm", SYMBOL, Side::Sell, OrderType::Limit, price, 1)
                .unwrap();
            engine
                .submit("mm", SYMBOL, Side::Buy, OrderType::Limit, price, 1)
                .unwrap();
        }
    }
    engine
}

fn bench_match_order(c: &mut Criterion) {
    let depth = 100;
    let orders_per_level = 10;

    c.bench_function("match 1 market order", |b| {
        b.iter_batched(
            || setup_engine(depth, orders_per_level),
            |engine| {
                engine
                    .submit(
                        "taker",
                        SYMBOL,
                        Side::Buy,
                        OrderType::Market,
                        0,
                        depth * orders_per_level / 2,
                    )
                    .unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("match 1 limit crossing order", |b| {
        b.iter_batched(
            || setup_engine(depth, orders_per_level),
            |engine| {
                engine
                    .submit(
                        "taker",
                        SYMBOL,
                        Side::Sell,
                        OrderType::Limit,
                        depth / 2,
                        depth * orders_per_level,
                    )
                    .unwrap();
            },
            criterion::BatchSize::SmallInput,
        )
    });

    c.bench_function("insert non-crossing limit order", |b| {
        let engine = setup_engine(depth, orders_per_level);
        let mut price = depth + 1;
        b.iter(|| {
            engine
                .submit("resting", SYMBOL, Side::Sell, OrderType::Limit, price, 1)
                .unwrap();
            price += 1;
        })
    });
}

criterion_group!(benches, bench_match_order);
criterion_main!(benches);
