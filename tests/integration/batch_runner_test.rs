// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use rankrs::config::settings::{DelaySettings, TrackingSettings};
use rankrs::domain::models::{Rank, RankStatus};
use rankrs::tracker::batch::BatchRunner;

use crate::helpers::{fast_options, resolver_with, serp_page, MockDriver, MockFactory};

fn zero_delays() -> DelaySettings {
    DelaySettings {
        between_keywords_min_secs: 0.0,
        between_keywords_max_secs: 0.0,
        between_pages_min_secs: 0.0,
        between_pages_max_secs: 0.0,
        settle_min_ms: 0,
        settle_max_ms: 0,
    }
}

fn tracking(keywords: Vec<&str>) -> TrackingSettings {
    TrackingSettings {
        target_domain: "example.com".to_string(),
        keywords: keywords.into_iter().map(String::from).collect(),
        max_pages: 2,
        results_per_page: 10,
        retries: 1,
    }
}

#[tokio::test]
async fn test_batch_collects_one_outcome_per_keyword() {
    let entries = vec![
        ("https://other.test/a", "Other"),
        ("https://example.com/b", "Example"),
    ];
    let driver = MockDriver::new(vec![serp_page(1, &entries, false)]);
    let factory = MockFactory::new(vec![driver.clone()]);
    let resolver = resolver_with(factory, "example.com", fast_options(1)).await;

    let interrupt = Arc::new(AtomicBool::new(false));
    let mut runner = BatchRunner::new(resolver, zero_delays(), interrupt);

    let outcomes = runner.run(&tracking(vec!["alpha", "beta"])).await;
    runner.shutdown().await;

    assert_eq!(outcomes.len(), 2);
    for (outcome, keyword) in outcomes.iter().zip(["alpha", "beta"]) {
        assert_eq!(outcome.keyword, keyword);
        assert_eq!(outcome.target_domain_checked, "example.com");
        assert_eq!(outcome.status, RankStatus::Found);
        assert_eq!(outcome.rank, Rank::Position(2));
        assert_eq!(outcome.page, 1);
    }

    // Each keyword re-issued its own search, and shutdown closed the session.
    assert_eq!(driver.navigations(), 2);
    assert!(driver.closed());
}

#[tokio::test]
async fn test_interrupt_before_start_preserves_empty_batch() {
    let driver = MockDriver::new(vec![serp_page(1, &[], false)]);
    let factory = MockFactory::new(vec![driver.clone()]);
    let resolver = resolver_with(factory, "example.com", fast_options(1)).await;

    let interrupt = Arc::new(AtomicBool::new(true));
    let mut runner = BatchRunner::new(resolver, zero_delays(), interrupt.clone());

    let outcomes = runner.run(&tracking(vec!["alpha", "beta"])).await;
    runner.shutdown().await;

    assert!(outcomes.is_empty());
    assert_eq!(driver.navigations(), 0);
    assert!(driver.closed());
}

#[tokio::test]
async fn test_interrupt_after_first_keyword_keeps_partial_results() {
    let entries = vec![("https://example.com/b", "Example")];
    let driver = MockDriver::new(vec![serp_page(1, &entries, false)]);
    let factory = MockFactory::new(vec![driver.clone()]);
    let resolver = resolver_with(factory, "example.com", fast_options(1)).await;

    let interrupt = Arc::new(AtomicBool::new(false));
    // The first navigation raises the flag; the runner only honors it
    // between keywords, so the first keyword still completes.
    driver.interrupt_on_navigate(interrupt.clone());
    let mut runner = BatchRunner::new(resolver, zero_delays(), interrupt.clone());

    let outcomes = runner.run(&tracking(vec!["alpha", "beta", "gamma"])).await;
    runner.shutdown().await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].keyword, "alpha");
    assert_eq!(outcomes[0].status, RankStatus::Found);
}
