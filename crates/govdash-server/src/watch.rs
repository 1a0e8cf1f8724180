use crate::config::Config;
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use govdash_core::{
    HttpProposalSource, ListState, LoadState, PollingController, SystemClock, TokioSleeper,
};
use govdash_models::{Proposal, ProposalFilter, ProposalStatus};
use std::fmt::Write;

const DATE_FORMAT: &str = "%B %-d, %Y at %-I:%M %p UTC";

pub async fn run(
    config: &Config,
    proxy_url: Option<String>,
    filter: Option<ProposalFilter>,
    once: bool,
) -> Result<()> {
    let proxy_url = proxy_url.unwrap_or_else(|| config.poller.proxy_url.clone());
    let source = HttpProposalSource::new(&proxy_url)?;
    let mut poller = config.poller_config();
    if let Some(filter) = filter {
        poller.filter = filter;
    }
    tracing::info!(endpoint = %source.endpoint(), "Watching proposals");

    let controller = PollingController::new(source, SystemClock, TokioSleeper, poller);

    if once {
        controller.refresh().await;
        let state = controller.snapshot();
        print!("{}", render(&state, controller.now()));
        return match state.load {
            LoadState::Error(message) => Err(anyhow!(message)),
            _ => Ok(()),
        };
    }

    let mut updates = controller.subscribe();
    controller.start();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                println!("{}", render(&state, controller.now()));
            }
            _ = &mut shutdown => {
                println!();
                tracing::info!("Shutting down...");
                break;
            }
        }
    }

    controller.stop();
    Ok(())
}

/// Text view of the list at `now`.
pub fn render(state: &ListState, now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let heading = match state.filter {
        ProposalFilter::Active => "Active proposals",
        ProposalFilter::All => "All proposals",
    };
    let _ = write!(out, "== {heading} ==");
    if let Some(updated) = state.last_updated {
        let _ = write!(out, " (updated {})", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    out.push('\n');

    match &state.load {
        LoadState::Loading => out.push_str("Loading proposals...\n"),
        LoadState::Error(message) => {
            let _ = writeln!(out, "Error: {message}");
        }
        LoadState::Success => {
            let visible = state.visible(now);
            if visible.is_empty() {
                out.push_str("No proposals available\n");
            }
            for (proposal, status) in visible {
                render_row(&mut out, proposal, status);
            }
        }
    }
    out
}

fn render_row(out: &mut String, proposal: &Proposal, status: ProposalStatus) {
    let _ = writeln!(out, "[{:<9}] {}", status.label(), proposal.display_title());
    let _ = writeln!(
        out,
        "    Start: {}",
        proposal.activated_at.format(DATE_FORMAT)
    );
    let _ = writeln!(
        out,
        "    End:   {}",
        proposal.voting_ends_at.format(DATE_FORMAT)
    );
    if let Ok(tally) = proposal.option_tally() {
        if !tally.is_empty() {
            let votes: Vec<String> = tally
                .iter()
                .map(|(option, votes)| format!("{option}: {votes}"))
                .collect();
            let _ = writeln!(out, "    Votes: {}", votes.join(" | "));
        }
    }
    let _ = writeln!(out, "    {}", proposal.link);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proposal(key: &str, title: Option<&str>, activated: &str, ends: &str) -> Proposal {
        serde_json::from_value(json!({
            "key": key,
            "title": title,
            "link": format!("https://vote.example.org/proposal/{key}"),
            "options": ["For", "Against"],
            "optionVotes": [1200, 300.5],
            "createdAt": "2024-05-01T00:00:00Z",
            "activatedAt": activated,
            "votingEndsAt": ends,
        }))
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2024-06-02T12:00:00Z".parse().unwrap()
    }

    fn loaded(filter: ProposalFilter) -> ListState {
        ListState {
            load: LoadState::Success,
            proposals: vec![
                proposal("live", Some("Raise fees"), "2024-06-01T00:00:00Z", "2024-06-04T00:00:00Z"),
                proposal("done", None, "2024-05-01T00:00:00Z", "2024-05-04T00:00:00Z"),
                proposal("soon", Some("Add pool"), "2024-06-10T15:30:00Z", "2024-06-13T15:30:00Z"),
            ],
            filter,
            last_updated: Some(now()),
        }
    }

    #[test]
    fn loading_and_error_states() {
        let loading = render(&ListState::default(), now());
        assert!(loading.contains("Loading proposals..."));

        let failed = ListState {
            load: LoadState::Error("External API error".into()),
            ..ListState::default()
        };
        assert!(render(&failed, now()).contains("Error: External API error"));
    }

    #[test]
    fn active_filter_hides_completed() {
        let out = render(&loaded(ProposalFilter::Active), now());
        assert!(out.starts_with("== Active proposals == (updated 2024-06-02 12:00:00 UTC)"));
        assert!(out.contains("[Ongoing  ] Raise fees"));
        assert!(out.contains("[Upcoming ] Add pool"));
        assert!(!out.contains("Untitled Proposal"));
        assert!(out.find("Raise fees").unwrap() < out.find("Add pool").unwrap());
    }

    #[test]
    fn all_filter_shows_completed_with_fallback_title() {
        let out = render(&loaded(ProposalFilter::All), now());
        assert!(out.contains("[Completed] Untitled Proposal"));
        assert!(out.contains("Votes: For: 1200 | Against: 300.5"));
        assert!(out.contains("https://vote.example.org/proposal/done"));
    }

    #[test]
    fn dates_render_in_long_form() {
        let out = render(&loaded(ProposalFilter::Active), now());
        assert!(out.contains("Start: June 10, 2024 at 3:30 PM UTC"));
        assert!(out.contains("End:   June 4, 2024 at 12:00 AM UTC"));
    }

    #[test]
    fn empty_after_filtering() {
        let mut state = loaded(ProposalFilter::Active);
        state.proposals.retain(|p| p.key == "done");
        assert!(render(&state, now()).contains("No proposals available"));
    }
}
