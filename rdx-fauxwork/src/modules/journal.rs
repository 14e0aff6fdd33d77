//! systemd journal output from a handful of busy services.

use crate::common::CancelToken;
use crate::components::module::Module;
use crate::context::RunContext;
use crate::error::Result;
use crate::output::Color;
use async_trait::async_trait;
use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const HOSTS: &[&str] = &["worker-07", "edge-02", "db-primary", "build-13"];

const SERVICES: &[(&str, &[&str])] = &[
    (
        "sshd",
        &[
            "Accepted publickey for deploy from 10.0.4.17 port 51822 ssh2",
            "pam_unix(sshd:session): session opened for user deploy(uid=1001)",
            "Received disconnect from 10.0.4.17 port 51822:11: disconnected by user",
        ],
    ),
    (
        "kubelet",
        &[
            "Successfully probed container \"api\" in pod \"api-7d9c\"",
            "SyncLoop (PLEG): event for pod \"worker-5f6b\": ContainerStarted",
            "Volume \"config\" mounted for pod \"api-7d9c\"",
        ],
    ),
    (
        "systemd",
        &[
            "Started Daily apt download activities.",
            "logrotate.service: Deactivated successfully.",
            "Finished Cleanup of Temporary Directories.",
        ],
    ),
    (
        "postgres",
        &[
            "checkpoint starting: time",
            "checkpoint complete: wrote 312 buffers (1.9%); 0 WAL file(s) added",
            "automatic vacuum of table \"app.public.events\": index scans: 1",
        ],
    ),
    (
        "CRON",
        &[
            "pam_unix(cron:session): session opened for user root(uid=0)",
            "(root) CMD (/usr/local/bin/backup --incremental)",
        ],
    ),
];

/// Tails a fake system journal.
#[derive(Debug, Default, Clone, Copy)]
pub struct Journal;

#[async_trait]
impl Module for Journal {
    fn name(&self) -> &str {
        "journal"
    }

    fn signature(&self) -> &str {
        "journalctl -f"
    }

    async fn run(&self, ctx: &mut RunContext, cancel: &CancelToken) -> Result<()> {
        let host = HOSTS.choose(ctx.rng()).copied().unwrap_or("localhost");
        let count = ctx.rng().gen_range(15..60);

        for _ in 0..count {
            let (service, messages) = SERVICES[ctx.rng().gen_range(0..SERVICES.len())];
            let message = messages[ctx.rng().gen_range(0..messages.len())];
            let pid = ctx.rng().gen_range(300..65_000);

            ctx.write_styled(
                &Local::now().format("%b %d %H:%M:%S ").to_string(),
                Some(Color::BrightBlack),
            );
            ctx.write(&format!("{host} "));
            ctx.write_styled(&format!("{service}[{pid}]:"), Some(Color::Cyan));
            ctx.write_line(&format!(" {message}"));

            let pause = Duration::from_millis(ctx.rng().gen_range(50..1200));
            ctx.delay(pause, cancel).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::testing::instant_context;
    use crate::output::MemorySink;

    #[tokio::test]
    async fn test_lines_name_host_and_service() {
        let sink = MemorySink::new();
        let mut ctx = instant_context(&sink, 8);
        Journal.run(&mut ctx, &CancelToken::new()).await.unwrap();

        let lines = sink.lines();
        assert!((15..60).contains(&lines.len()));
        let host = HOSTS
            .iter()
            .find(|h| lines[0].contains(&format!(" {h} ")))
            .expect("first line names a known host");
        for line in &lines {
            assert!(line.contains(&format!(" {host} ")), "{line}");
            assert!(SERVICES.iter().any(|(s, _)| line.contains(&format!("{s}["))), "{line}");
        }
    }
}
