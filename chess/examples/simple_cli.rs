// Simple command-line application to play chess

use gambit::{position::PrettyStyle, Color, Game, Move};
use std::io::{self, BufRead, Write};

fn main() {
    let mut stdin = io::stdin().lock();

    let mut game = Game::new_initial();

    loop {
        if game.is_finished() {
            println!("{}", game.current().pretty(PrettyStyle::Ascii));
            println!("Game finished: {}", game.status());
            println!("Moves:");
            println!("{}", game.uci_list());
            break;
        }

        println!("{}", game.current().pretty(PrettyStyle::Ascii));
        let side = match game.current().side() {
            Color::White => "White",
            Color::Black => "Black",
        };
        print!("{} move ({}): ", side, game.current().fullmove_number());
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let s = s.trim();

        if s == "undo" {
            if game.undo().is_none() {
                println!("Nothing to undo");
            }
            println!();
            continue;
        }

        // We could just call `Game::apply_uci()` here directly. But we want to show more
        // features here, so separate parsing a move and making it.
        let mv = match Move::from_uci(s, game.current()) {
            Ok(mv) => mv,
            Err(e) => {
                println!("Bad move: {}", e);
                println!();
                continue;
            }
        };

        // Move is definitely legal after `Move::from_uci()`, so just `unwrap()` instead of
        // error checking.
        game.apply_move(mv).unwrap();

        println!();
    }
}
