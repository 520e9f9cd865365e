#![cfg(feature = "tokio-runtime")]

mod common;

use std::time::Duration;

use maplet::{testing::FixtureFetcher, TokioSpawner, VisibleSetCalculator};

use common::*;

#[tokio::test]
async fn test_tiles_load_on_tokio() {
    let _ = env_logger::builder().is_test(true).try_init();

    let fetcher = FixtureFetcher::serving_all();
    let mut view = view(
        saint_petersburg(),
        services(fetcher.clone(), TokioSpawner::current()),
    );
    add_sources(&mut view);

    let expected = 2 * VisibleSetCalculator::new(256).tile_count(800, 600, &saint_petersburg());
    let mut produced = 0;
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        produced += view.process_completions();
        if pending_tiles(&view) == 0 {
            break;
        }
    }

    assert_eq!(produced, expected);
    assert_eq!(view.surface().len(), expected);
    assert_eq!(fetcher.request_count(), expected);
}

#[tokio::test]
async fn test_pan_while_loading_on_tokio() {
    let mut view = view(
        saint_petersburg(),
        services(FixtureFetcher::serving_all(), TokioSpawner::current()),
    );
    add_sources(&mut view);
    view.pan_by(4096.0, 0.0).unwrap();

    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(5)).await;
        view.process_completions();
        if pending_tiles(&view) == 0 {
            break;
        }
    }

    let expected = 2 * VisibleSetCalculator::new(256).tile_count(800, 600, &view.camera());
    assert_eq!(view.surface().len(), expected);
}
