// Simple command-line application to play chess against the automated opponent
//
// Moves are entered as "e2-e4". Besides moves, the following commands are accepted:
// "undo" takes back the last move of both sides, "castle <square>" castles with the rook on
// the given square, "promote <piece>" picks the piece for a pawn on the last rank, "json"
// prints the snapshot of the game and "quit" exits.

use castellan::{Color, Game, GameError, Heuristic, Opponent, PieceKind, Reply};
use std::io::{self, BufRead, Write};
use std::str::FromStr;

fn run_command(game: &mut Game, s: &str) -> Result<bool, GameError> {
    let mut words = s.split_ascii_whitespace();
    match (words.next(), words.next()) {
        (Some("undo"), None) => {
            game.undo()?;
            if game.side() == Color::Black {
                game.undo()?;
            }
            Ok(false)
        }
        (Some("castle"), Some(square)) => {
            game.castle(square)?;
            Ok(true)
        }
        (Some("promote"), Some(piece)) => {
            game.promote(PieceKind::from_str(piece)?)?;
            Ok(true)
        }
        (Some("json"), None) => {
            match game.to_json() {
                Ok(json) => println!("{}", json),
                Err(e) => println!("Cannot save: {}", e),
            }
            Ok(false)
        }
        _ => {
            game.make_move(s)?;
            Ok(game.pending_promotion().is_none())
        }
    }
}

fn main() {
    let mut stdin = io::stdin().lock();

    let mut game = Game::new();
    let mut opponent = Opponent::new(Heuristic::CapturesFirst);

    loop {
        if let Some(color) = game.checkmate() {
            println!("Game finished: {} is checkmated", color);
            for (idx, action) in game.actions().iter().enumerate() {
                println!("{:>3}. {}", idx + 1, action);
            }
            break;
        }

        println!("{}", game.board());
        if let Some(threat) = game.pending_threat() {
            println!("Check: {}", threat);
        }
        print!("Your move: ");
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();
        if s == "quit" {
            break;
        }

        match run_command(&mut game, s) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                println!("Error: {}", e);
                println!();
                continue;
            }
        }

        match game.auto_move(&mut opponent) {
            Ok(Reply::Moved(mv)) => println!("Opponent plays {}", mv),
            Ok(Reply::Checkmated(_)) => {}
            Ok(Reply::NoMoves) => {
                println!("Opponent has no moves");
                break;
            }
            Err(e) => println!("Opponent failed: {}", e),
        }
        println!();
    }
}
