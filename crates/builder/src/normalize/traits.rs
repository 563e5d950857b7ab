//! Generic abstraction for normalization passes

use crate::normalize::reports::Report;
use crate::normalize::NormalizeOptions;
use ferrite_errors::Error;
use ferrite_recipe::RecipeContext;
use std::future::Future;

pub trait Pass: Send + Sync + 'static {
    /// Human readable label (emitted in events)
    const NAME: &'static str;

    /// Execute the pass over the populated package folder
    fn run(
        ctx: &RecipeContext,
        opts: &NormalizeOptions,
    ) -> impl Future<Output = Result<Report, Error>> + Send;
}
