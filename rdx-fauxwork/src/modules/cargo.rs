//! A Rust package build: download, compile, finish.

use crate::common::CancelToken;
use crate::components::module::Module;
use crate::context::RunContext;
use crate::error::Result;
use crate::output::Color;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const PACKAGES: &str = include_str!("../../data/packages.txt");

/// Pretends to build a crate and its dependency tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cargo;

/// Writes a cargo status line: a right-aligned, colored verb and a message.
fn status(ctx: &RunContext, verb: &str, message: &str) {
    ctx.write_styled(&format!("{verb:>12}"), Some(Color::Green));
    ctx.write_line(&format!(" {message}"));
}

fn version(ctx: &mut RunContext) -> String {
    let rng = ctx.rng();
    format!(
        "v{}.{}.{}",
        rng.gen_range(0..4),
        rng.gen_range(0..30),
        rng.gen_range(0..20)
    )
}

#[async_trait]
impl Module for Cargo {
    fn name(&self) -> &str {
        "cargo"
    }

    fn signature(&self) -> &str {
        "cargo build --release"
    }

    async fn run(&self, ctx: &mut RunContext, cancel: &CancelToken) -> Result<()> {
        let all: Vec<&str> = PACKAGES.lines().filter(|l| !l.is_empty()).collect();
        let count = ctx.rng().gen_range(10..=all.len());
        let picked: Vec<&str> = all.choose_multiple(ctx.rng(), count).copied().collect();
        let packages: Vec<(&str, String)> = picked
            .into_iter()
            .map(|name| (name, version(ctx)))
            .collect();

        status(ctx, "Updating", "crates.io index");
        ctx.delay(Duration::from_millis(800), cancel).await?;

        let mut requested = Duration::ZERO;
        for (name, version) in &packages {
            status(ctx, "Downloaded", &format!("{name} {version}"));
            let pause = Duration::from_millis(ctx.rng().gen_range(10..80));
            requested += pause;
            ctx.delay(pause, cancel).await?;
        }

        for (name, version) in &packages {
            status(ctx, "Compiling", &format!("{name} {version}"));
            let pause = Duration::from_millis(ctx.rng().gen_range(100..1500));
            requested += pause;
            ctx.delay(pause, cancel).await?;
        }

        status(
            ctx,
            "Finished",
            &format!(
                "`release` profile [optimized] target(s) in {:.2}s",
                requested.as_secs_f64()
            ),
        );
        Ok(())
    }
}
