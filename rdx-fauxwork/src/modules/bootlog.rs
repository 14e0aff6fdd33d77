//! Kernel boot messages with dmesg-style uptime stamps.

use crate::common::CancelToken;
use crate::components::module::Module;
use crate::context::RunContext;
use crate::error::Result;
use crate::output::Color;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

const BOOTLOG: &str = include_str!("../../data/bootlog.txt");

/// Replays a slice of a kernel boot log.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bootlog;

fn color_for(line: &str) -> Option<Color> {
    if line.starts_with("systemd") {
        Some(Color::Green)
    } else if line.contains("ACPI") || line.contains("audit") {
        Some(Color::Yellow)
    } else {
        None
    }
}

#[async_trait]
impl Module for Bootlog {
    fn name(&self) -> &str {
        "bootlog"
    }

    fn signature(&self) -> &str {
        "sudo dmesg --follow"
    }

    async fn run(&self, ctx: &mut RunContext, cancel: &CancelToken) -> Result<()> {
        let lines: Vec<&str> = BOOTLOG.lines().collect();
        let start = ctx.rng().gen_range(0..lines.len() / 2);
        let count = ctx.rng().gen_range(20..=lines.len() - start);
        let mut uptime = Duration::from_micros(ctx.rng().gen_range(0..500_000));

        for line in &lines[start..start + count] {
            uptime += Duration::from_micros(ctx.rng().gen_range(100..120_000));
            ctx.write_styled(
                &format!("[{:>5}.{:06}] ", uptime.as_secs(), uptime.subsec_micros()),
                Some(Color::BrightBlack),
            );
            ctx.write_styled(line, color_for(line));
            ctx.write_line("");

            // Mostly a quick scroll, with the odd stall while a driver probes.
            let pause = if ctx.rng().gen_bool(0.05) {
                ctx.rng().gen_range(300..900)
            } else {
                ctx.rng().gen_range(10..150)
            };
            ctx.delay(Duration::from_millis(pause), cancel).await?;
        }
        Ok(())
    }
}
