//! Command handlers. Each one opens the board, runs a single operation and prints.

use crate::cli::{Cli, Commands};
use anyhow::{bail, Context, Result};
use kanban_sync::{
    BoardId, BoardReconciler, Card, CardId, DropOutcome, HttpBoardStore, ListId, NewCard,
    SyncConfig,
};
use serde_json::json;
use std::sync::Arc;

/// Resolve configuration from file, environment and flags
pub fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = SyncConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(ref base_url) = cli.base_url {
        config.base_url = base_url.clone();
        config.validate().context("--base-url")?;
    }
    Ok(config)
}

pub async fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let store = Arc::new(HttpBoardStore::new(&config)?);
    let reconciler = BoardReconciler::new(store);

    let board = BoardId::from(cli.command.board());
    reconciler
        .open_board(&board)
        .await
        .with_context(|| format!("opening board {board}"))?;

    match &cli.command {
        Commands::Show { .. } => show(&reconciler, cli.json).await,
        Commands::MoveCard {
            card,
            from,
            to,
            before,
            ..
        } => {
            reconciler
                .begin_card_drag(CardId::from(card.as_str()), ListId::from(from.as_str()))
                .await;
            let before = before.as_deref().map(CardId::from);
            let outcome = reconciler
                .drop_card_on_list(&ListId::from(to.as_str()), before.as_ref())
                .await;
            report(outcome, cli.json)?;
            show(&reconciler, cli.json).await
        }
        Commands::MoveList { list, onto, .. } => {
            reconciler.begin_list_drag(ListId::from(list.as_str())).await;
            let outcome = reconciler
                .drop_list_on_list(&ListId::from(onto.as_str()))
                .await;
            report(outcome, cli.json)?;
            show(&reconciler, cli.json).await
        }
        Commands::AddList { title, .. } => {
            let list = reconciler.create_list(title).await?;
            print_value(cli.json, json!(list), || format!("created list {}", list.id));
            Ok(())
        }
        Commands::AddCard {
            list,
            title,
            description,
            ..
        } => {
            let card = reconciler
                .create_card(
                    &ListId::from(list.as_str()),
                    &NewCard::new(title.as_str()).with_description(description.as_str()),
                )
                .await?;
            print_value(cli.json, json!(card), || format!("created card {}", card.id));
            Ok(())
        }
        Commands::Archive { card, .. } => {
            reconciler.archive_card(&CardId::from(card.as_str())).await?;
            print_value(cli.json, json!({ "archived": card }), || {
                format!("archived card {card}")
            });
            Ok(())
        }
        Commands::Archived { .. } => {
            let cards = reconciler.archived_cards().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else {
                for card in &cards {
                    println!("{}", card_line(card));
                }
            }
            Ok(())
        }
        Commands::Restore { card, .. } => {
            let card = reconciler.restore_card(&CardId::from(card.as_str())).await?;
            print_value(cli.json, json!(card), || {
                format!("restored card {} to list {}", card.id, card.list_id)
            });
            Ok(())
        }
        Commands::Delete { card, .. } => {
            reconciler.delete_card(&CardId::from(card.as_str())).await?;
            print_value(cli.json, json!({ "deleted": card }), || {
                format!("deleted card {card}")
            });
            Ok(())
        }
    }
}

fn report(outcome: DropOutcome, json: bool) -> Result<()> {
    match outcome {
        DropOutcome::Committed => Ok(()),
        DropOutcome::Ignored => {
            if !json {
                eprintln!("nothing to move");
            }
            Ok(())
        }
        DropOutcome::Resynced => bail!("the board store refused the move; board reloaded"),
    }
}

fn print_value(json: bool, value: serde_json::Value, text: impl FnOnce() -> String) {
    if json {
        println!("{value}");
    } else {
        println!("{}", text());
    }
}

fn card_line(card: &Card) -> String {
    let mut line = format!("  {}  {}", card.id, card.title);
    if let Some(ref assignee) = card.assignee {
        line.push_str(&format!("  @{assignee}"));
    }
    if let Some(due) = card.due_date {
        line.push_str(&format!("  due {due}"));
    }
    line
}

async fn show(reconciler: &BoardReconciler<HttpBoardStore>, json: bool) -> Result<()> {
    let state = reconciler.state().read().await;
    if json {
        let lists: Vec<_> = state
            .lists()
            .iter()
            .map(|list| json!({ "list": list, "cards": state.cards(&list.id) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    for list in state.lists() {
        println!("{} ({})", list.title, list.id);
        for card in state.cards(&list.id) {
            println!("{}", card_line(card));
        }
    }
    Ok(())
}
