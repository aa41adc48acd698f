//! The main view, rendered from the preloaded boot data.

use chain::block_record::BlockRecord;
use chain::config;
use chain::explore;
use chain::preload::PreloadResult;
use chain::BlockHash;
use dioxus::prelude::*;

use crate::app_state::AppState;
use crate::hooks::use_chain_status::use_chain_status;

#[component]
pub fn HomeScreen(result: PreloadResult, on_retry: EventHandler<()>) -> Element {
    let app_state = use_context_provider(|| AppState::new(&result));
    let status = use_chain_status();
    let blocks = use_signal(|| result.blocks.clone());
    let stats = use_signal(|| result.snapshot);
    let random_block = use_signal(|| None::<BlockRecord>);
    let surfing = use_signal(|| false);

    // Seed the indicator from the handoff.
    {
        let failed = result.status.is_failed();
        let mut status = status;
        use_effect(move || {
            if failed {
                status.mark_disconnected("could not reach the network");
            }
        });
    }

    // Poll the head and pull in blocks minted since the last poll. Failures
    // flip the connection indicator instead of tearing anything down.
    {
        let connection = app_state.connection.clone();
        use_coroutine(move |_rx: UnboundedReceiver<()>| {
            let connection = connection.clone();
            let mut status = status;
            let mut blocks = blocks;
            let mut stats = stats;
            async move {
                let Some(client) = connection else {
                    return;
                };
                loop {
                    tokio::time::sleep(config::DEFAULT_REFRESH_INTERVAL).await;
                    let Some(head) = status.check(client.head().await) else {
                        continue;
                    };
                    let top = blocks.peek().first().map(|b| b.number).unwrap_or(0);
                    if head.number <= top {
                        continue;
                    }
                    let gap = (head.number - top) as usize;
                    let fresh = explore::recent_blocks(
                        &*client,
                        head.number,
                        gap.min(config::MAX_BLOCKS_DISPLAY),
                    )
                    .await;
                    let added: u64 = fresh.iter().map(|b| u64::from(b.extrinsics_count)).sum();

                    let mut merged = fresh;
                    merged.extend(blocks.peek().iter().cloned());
                    merged.truncate(config::MAX_BLOCKS_DISPLAY);
                    blocks.set(merged);

                    let mut snapshot = *stats.peek();
                    snapshot.total_blocks = head.number;
                    snapshot.total_transactions += added;
                    stats.set(snapshot);
                }
            }
        });
    }

    let on_surf = {
        let connection = app_state.connection.clone();
        move |_| {
            if *surfing.peek() {
                return;
            }
            let Some(client) = connection.clone() else {
                return;
            };
            let mut status = status;
            let mut random_block = random_block;
            let mut surfing = surfing;
            surfing.set(true);
            spawn(async move {
                random_block.set(status.check(explore::surf_random_block(&*client).await));
                surfing.set(false);
            });
        }
    };

    let connected = app_state.connection.is_some() && status.status().read().is_connected();
    let status_line = if connected {
        "Connected to Entropy testnet!"
    } else {
        "Failed to connect to Entropy testnet."
    };
    let status_class = if connected { "status ok" } else { "status err" };
    let snapshot = stats();
    let stat_cells = [
        ("Total Blocks", snapshot.total_blocks.to_string()),
        ("Transactions", snapshot.total_transactions.to_string()),
        ("Validators", snapshot.active_validators.to_string()),
        ("Hashrate", format!("{:.0} H/s", snapshot.network_hashrate)),
        ("Block Time", format!("{:.1}s", snapshot.average_block_time)),
    ];
    let cells = stat_cells.iter().map(|(label, value)| {
        rsx! {
            article {
                key: "{label}",
                class: "stat-cell",
                div { class: "stat-value", "{value}" }
                div { class: "stat-label", "{label}" }
            }
        }
    });

    let block_list = blocks.read().clone();
    let have_blocks = !block_list.is_empty();
    let block_rows = block_list.into_iter().map(|block| {
        let short_hash = abbreviate(&block.hash);
        rsx! {
            tr {
                key: "{block.hash}",
                td { "#{block.number}" }
                td { code { title: "{block.hash}", "{short_hash}" } }
                td { "{block.extrinsics_count}" }
                td { "{block.events_count}" }
            }
        }
    });

    let surf_label = if surfing() { "Surfing..." } else { "🌊 Surf the Chain!" };
    let surf_detail = match random_block.read().clone() {
        Some(block) => {
            let parent = match block.parent_hash {
                Some(parent) => rsx! {
                    p {
                        "Parent: "
                        code { "{parent}" }
                    }
                },
                None => rsx! {},
            };
            rsx! {
                div {
                    class: "surf-result",
                    h4 { "You surfed to block #{block.number}!" }
                    p {
                        "Hash: "
                        code { "{block.hash}" }
                    }
                    {parent}
                }
            }
        }
        None => rsx! {},
    };

    rsx! {
        div {
            class: "homepage",
            header {
                h1 { "Entropy" }
                span { class: "tag", "surf the chain!" }
                span {
                    class: "{status_class}",
                    "{status_line}"
                }
            }
            main {
                if !connected && app_state.connection.is_none() {
                    article {
                        class: "card error-card",
                        h3 { "Disconnected" }
                        p { "The network was unreachable during boot. Retry to reconnect and reload." }
                        button {
                            onclick: move |_| on_retry.call(()),
                            "Retry"
                        }
                    }
                }
                section {
                    class: "stats-row",
                    {cells}
                }
                article {
                    class: "card",
                    h3 { "Latest Blocks" }
                    if have_blocks {
                        table {
                            thead {
                                tr {
                                    th { "Block" }
                                    th { "Hash" }
                                    th { "Extrinsics" }
                                    th { "Events" }
                                }
                            }
                            tbody {
                                {block_rows}
                            }
                        }
                    } else {
                        p { "No blocks loaded." }
                    }
                }
                if connected {
                    article {
                        class: "card",
                        h3 { "Chain Surf" }
                        p { "Jump to a random block somewhere in the chain's history." }
                        button {
                            disabled: surfing(),
                            onclick: on_surf,
                            "{surf_label}"
                        }
                        {surf_detail}
                    }
                }
            }
        }
    }
}

/// First and last digits of a hash for table display.
fn abbreviate(hash: &BlockHash) -> String {
    let full = hash.to_string();
    format!("{}…{}", &full[..10], &full[full.len() - 6..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviate_keeps_prefix_and_tail() {
        let hash: BlockHash = "0x00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff"
            .parse()
            .unwrap();
        assert_eq!(abbreviate(&hash), "0x00112233…ddeeff");
    }
}
