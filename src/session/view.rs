//! Presentation-side derivations over phase events: who the opponent is,
//! which side the viewer plays, tab labels, and per-phase status text.

use crate::board::Side;
use crate::ledger::events::{DrawReason, GameDetails, GameOutcome, GamePhaseEvent};
use crate::ledger::types::Party;
use crate::session::context::PlayerContext;

/// The other party of a game, resolved by identity: whichever of the two
/// fixed slots is not the viewer.
pub fn opponent<'a>(game: &'a GameDetails, viewer: &Party) -> &'a Party {
    if &game.proposer == viewer {
        &game.opponent
    } else {
        &game.proposer
    }
}

/// The side the viewer plays: the proposer got the desired side, the
/// opponent the other one.
pub fn viewer_side(game: &GameDetails, viewer: &Party) -> Side {
    if &game.proposer == viewer {
        game.desired_side
    } else {
        game.desired_side.other()
    }
}

/// Tab label for one game: opponent alias followed by the game label.
pub fn tab_label(ctx: &PlayerContext, event: &GamePhaseEvent) -> String {
    let game = event.game();
    format!(
        "{} {}",
        ctx.alias_of(opponent(game, &ctx.party)),
        game.label
    )
}

pub fn outcome_text(ctx: &PlayerContext, outcome: &GameOutcome) -> String {
    match outcome {
        GameOutcome::Winner(winner) => {
            if ctx.is_self(winner) {
                "You won!".to_string()
            } else {
                format!("{} won!", ctx.alias_of(winner))
            }
        }
        GameOutcome::Draw(DrawReason::PlayerDraw(requester)) => {
            if ctx.is_self(requester) {
                "Your draw was accepted.".to_string()
            } else {
                format!("You accepted {}'s draw offer.", ctx.alias_of(requester))
            }
        }
        GameOutcome::Draw(DrawReason::Stalemate) => "Draw by stalemate.".to_string(),
        GameOutcome::Draw(DrawReason::ThreefoldRepetition) => {
            "Draw by threefold repetition.".to_string()
        }
        GameOutcome::Draw(DrawReason::FiftyMoveRule) => {
            "Draw by the fifty move rule.".to_string()
        }
    }
}

/// One-line status for a game in its current phase, from the viewer's
/// perspective.
pub fn status_line(ctx: &PlayerContext, event: &GamePhaseEvent) -> String {
    let game = event.game();
    match event {
        GamePhaseEvent::Proposed(_) => {
            if ctx.is_self(&game.opponent) {
                format!(
                    "{} challenged you to game \"{}\".",
                    ctx.alias_of(&game.proposer),
                    game.label
                )
            } else {
                format!(
                    "Waiting for {} to accept game request.",
                    ctx.alias_of(&game.opponent)
                )
            }
        }
        GamePhaseEvent::ActiveTurn(active) => {
            if active.board.in_check {
                "In check!".to_string()
            } else {
                "Make your move.".to_string()
            }
        }
        GamePhaseEvent::PassiveTurn(passive) => {
            if passive.board.in_check {
                "Check!".to_string()
            } else {
                format!(
                    "Waiting for {}'s move.",
                    ctx.alias_of(opponent(game, &ctx.party))
                )
            }
        }
        GamePhaseEvent::DrawClaimed(claim) => {
            if ctx.is_self(&claim.claimer) {
                "You requested a draw.".to_string()
            } else {
                format!("{} requested a draw.", ctx.alias_of(&claim.claimer))
            }
        }
        GamePhaseEvent::EndProposed(proposal) => {
            if ctx.is_self(&proposal.proposed_by) {
                "You proposed ending the game.".to_string()
            } else {
                format!(
                    "{} proposed ending the game.",
                    ctx.alias_of(&proposal.proposed_by)
                )
            }
        }
        GamePhaseEvent::Finished(result) => outcome_text(ctx, &result.outcome),
    }
}
