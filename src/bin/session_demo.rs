use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use serde_json::json;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fow_chess_client::board::{Coord, Piece, PieceKind, Side};
use fow_chess_client::config::ClientConfig;
use fow_chess_client::game::{DropOutcome, GameActions, MoveProtocolEngine};
use fow_chess_client::ledger::{
    BoardSnapshot, ChessChoice, ContractRef, ExerciseError, ExerciseOutcome, GameDetails,
    GameLabel, GamePhaseEvent, LedgerClient, Party, PhaseFeed, PhaseKind, RawCreateEvent,
    RawQueryUpdate, SideBoard,
};
use fow_chess_client::session::{
    spawn_session, view, AliasMap, PlayerContext, SessionReconciler,
};

const LOG_TARGET: &str = "bin::session_demo";

#[derive(Debug, Parser)]
#[command(name = "session_demo")]
#[command(about = "Replay a scripted game through the session reconciler", long_about = None)]
struct Args {
    /// Party viewing the session
    #[arg(long, env = "CHESS_PARTY", default_value = "alice")]
    party: String,

    /// Opposing party
    #[arg(long, default_value = "bob")]
    opponent: String,

    /// Game label used for the scripted game
    #[arg(long, default_value = "demo")]
    game: String,
}

/// Ledger stand-in that accepts every choice and logs it.
struct AcceptingClient;

#[async_trait]
impl LedgerClient for AcceptingClient {
    async fn exercise(
        &self,
        contract: &ContractRef,
        choice: ChessChoice,
    ) -> Result<ExerciseOutcome, ExerciseError> {
        info!(
            target: LOG_TARGET,
            %contract,
            choice = choice.name(),
            argument = %choice.argument(),
            "ledger accepted choice"
        );
        Ok(ExerciseOutcome::default())
    }
}

fn live_batch(contract: &str, payload: serde_json::Value) -> RawQueryUpdate {
    RawQueryUpdate {
        loading: false,
        contracts: vec![RawCreateEvent {
            contract_id: ContractRef::new(contract),
            payload,
        }],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ClientConfig::new(Party::new(args.party.clone()));
    let mut aliases = AliasMap::new();
    aliases.insert(config.party.clone(), args.party.clone());
    let ctx = PlayerContext::new(config.party.clone(), aliases);

    let game = GameDetails {
        label: GameLabel::new(args.game.clone()),
        proposer: config.party.clone(),
        opponent: Party::new(args.opponent.clone()),
        desired_side: Side::White,
    };
    let game_value = serde_json::to_value(&game).context("encode game details")?;

    // One raw channel per phase kind, exactly as the transport would hand
    // them over.
    let reconciler = Arc::new(SessionReconciler::new(ctx.clone()));
    let mut updates = reconciler.subscribe();
    let mut senders: HashMap<PhaseKind, mpsc::Sender<RawQueryUpdate>> = HashMap::new();
    let mut feeds = Vec::new();
    for kind in PhaseKind::ALL {
        let (tx, rx) = mpsc::channel(config.channel_capacity);
        senders.insert(kind, tx);
        feeds.push(PhaseFeed::new(kind, rx));
    }
    let tasks = spawn_session(Arc::clone(&reconciler), feeds, config.channel_capacity);
    let actions = GameActions::new(Arc::new(AcceptingClient));

    // Every stream opens loading; nothing reaches the reconciler yet.
    for sender in senders.values() {
        sender
            .send(RawQueryUpdate {
                loading: true,
                contracts: Vec::new(),
            })
            .await
            .context("send loading marker")?;
    }

    // Stage 1: the proposal arrives and becomes the selected game.
    senders[&PhaseKind::Proposed]
        .send(live_batch("#1:0", game_value.clone()))
        .await
        .context("send proposal")?;
    updates.changed().await.context("await proposal view")?;
    let selected = updates
        .borrow_and_update()
        .selected_event()
        .cloned()
        .context("proposal selected")?;
    info!(
        target: LOG_TARGET,
        label = %view::tab_label(&ctx, &selected),
        status = %view::status_line(&ctx, &selected),
        "proposal reconciled"
    );
    if let GamePhaseEvent::Proposed(proposal) = &selected {
        actions.accept_proposal(proposal).await?;
    }

    // Stage 2: our active turn, with a pawn one step from promotion.
    let board = SideBoard {
        side: Side::White,
        pieces: BoardSnapshot::from_pairs([(
            "e7".parse::<Coord>().context("parse e7")?.index(),
            Piece::new(Side::White, PieceKind::Pawn),
        )]),
        in_check: false,
    };
    senders[&PhaseKind::ActiveTurn]
        .send(live_batch(
            "#2:0",
            json!({
                "game": game_value,
                "player": args.party,
                "active": serde_json::to_value(&board).context("encode board")?,
            }),
        ))
        .await
        .context("send active turn")?;
    updates.changed().await.context("await active view")?;
    let selected = updates
        .borrow_and_update()
        .selected_event()
        .cloned()
        .context("active turn selected")?;

    let mut engine =
        MoveProtocolEngine::for_selection(&selected).context("selected game has a board")?;
    let from = "e7".parse::<Coord>()?.index();
    let to = "e8".parse::<Coord>()?.index();
    engine.lift(from).context("lift pawn")?;
    let argument = match engine.drop_piece(to).context("drop pawn")? {
        DropOutcome::PromotionRequired => {
            info!(target: LOG_TARGET, "promotion pending, choosing queen");
            engine.choose_promotion(PieceKind::Queen)?
        }
        DropOutcome::Submit(argument) => argument,
    };
    actions.submit_move(&mut engine, argument).await?;

    // Stage 3: the ledger closes the loop with the result.
    senders[&PhaseKind::Finished]
        .send(live_batch(
            "#3:0",
            json!({
                "gameId": args.game,
                "proposer": args.party,
                "opponent": args.opponent,
                "desiredSide": "White",
                "drawOrWinner": {"tag": "Winner", "value": args.party},
            }),
        ))
        .await
        .context("send result")?;
    updates.changed().await.context("await finished view")?;
    let final_view = updates.borrow_and_update().clone();
    for (_, event) in &final_view.games {
        info!(
            target: LOG_TARGET,
            label = %view::tab_label(&ctx, event),
            status = %view::status_line(&ctx, event),
            version = final_view.version,
            "final session state"
        );
    }

    drop(senders);
    tasks.worker.await.context("join session worker")??;
    for result in futures::future::try_join_all(tasks.feeds)
        .await
        .context("join phase feeds")?
    {
        result?;
    }
    Ok(())
}
