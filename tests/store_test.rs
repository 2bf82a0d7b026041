//! Concurrency properties of the shared price store

use coinwatch::store::PriceStore;
use rust_decimal::Decimal;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn interleaved_writers_never_corrupt_entries() {
    let store = PriceStore::new(["BTC", "ETH"]);

    let btc_values: Vec<Decimal> = (1..=200).map(Decimal::from).collect();
    let eth_values: Vec<Decimal> = (1001..=1200).map(Decimal::from).collect();

    let btc_writer = {
        let store = store.clone();
        let values = btc_values.clone();
        tokio::spawn(async move {
            for v in values {
                store.set_latest("BTC", v).await;
            }
        })
    };
    let eth_writer = {
        let store = store.clone();
        let values = eth_values.clone();
        tokio::spawn(async move {
            for v in values {
                store.set_latest("ETH", v).await;
            }
        })
    };

    // Readers run concurrently with the writers; every observed value must
    // be the zero initial value or one of the written values, never a mix
    let reader = {
        let store = store.clone();
        let btc_values = btc_values.clone();
        let eth_values = eth_values.clone();
        tokio::spawn(async move {
            for _ in 0..500 {
                let snapshot = store.all_latest().await;
                let btc = snapshot["BTC"].price;
                let eth = snapshot["ETH"].price;
                assert!(btc == Decimal::ZERO || btc_values.contains(&btc));
                assert!(eth == Decimal::ZERO || eth_values.contains(&eth));
            }
        })
    };

    btc_writer.await.unwrap();
    eth_writer.await.unwrap();
    reader.await.unwrap();

    // Each symbol's writer ran alone, so its last write is the final state
    let final_state = store.all_latest().await;
    assert_eq!(final_state["BTC"].price, Decimal::from(200));
    assert_eq!(final_state["ETH"].price, Decimal::from(1200));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn competing_writers_to_one_symbol_leave_a_written_value() {
    let store = PriceStore::new(["BTC"]);

    let mut writers = Vec::new();
    for base in [1_000i64, 2_000, 3_000, 4_000] {
        let store = store.clone();
        writers.push(tokio::spawn(async move {
            for i in 0..100 {
                store.set_latest("BTC", Decimal::from(base + i)).await;
            }
        }));
    }
    for writer in writers {
        writer.await.unwrap();
    }

    let price = store.latest("BTC").await.unwrap().price;
    let valid = [1_000i64, 2_000, 3_000, 4_000]
        .iter()
        .any(|base| price >= Decimal::from(*base) && price < Decimal::from(base + 100));
    assert!(valid, "final price {} was never written", price);
}
