// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod filter;
mod project;

#[cfg(test)]
mod tests;

pub use filter::{matches_search, visible};
pub use project::{
    MilestoneProjection, RecordProjection, bucket_counts, bucket_of, iso_milestone_projections,
    project_record, record_buckets,
};
