// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rand::Rng;
use std::time::Duration;

pub mod batch;
pub mod resolver;

/// 在闭区间内取一个随机延迟（秒）
pub(crate) fn jitter_secs(min: f64, max: f64) -> Duration {
    if max <= min {
        return Duration::from_secs_f64(min.max(0.0));
    }
    let secs = rand::rng().random_range(min..=max);
    Duration::from_secs_f64(secs)
}

/// 在闭区间内取一个随机延迟（毫秒）
pub(crate) fn jitter_ms(min: u64, max: u64) -> Duration {
    if max <= min {
        return Duration::from_millis(min);
    }
    Duration::from_millis(rand::rng().random_range(min..=max))
}
