//! Stdin-and-stdout table rendering for the interactive player.

use std::io::{self, Write};

use lan_blackjack::{Card, RoundResult, TableView, messages::Decision};

/// Renders the table to stdout and reads decisions from stdin.
pub struct ConsoleView;

impl TableView for ConsoleView {
    fn round_started(&mut self, round: u8, rounds: u8) {
        println!("\n=== ROUND {round}/{rounds} ===");
    }

    fn own_card(&mut self, card: Card, sum: u8) {
        println!("Your card: {card} (sum={sum})");
    }

    fn dealer_card(&mut self, card: Card) {
        println!("Dealer shows: {card}");
    }

    fn choose(&mut self) -> Decision {
        loop {
            print!("Hit or Stand? ");
            let _ = io::stdout().flush();
            let mut input = String::new();
            match io::stdin().read_line(&mut input) {
                // Stand on a closed stdin so the round can finish.
                Ok(0) | Err(_) => return Decision::Stand,
                Ok(_) => {}
            }
            match input.trim().to_lowercase().chars().next() {
                Some('h') => return Decision::Hit,
                Some('s') => {
                    println!("You STAND. Dealer's turn...");
                    return Decision::Stand;
                }
                _ => println!("Type Hit or Stand."),
            }
        }
    }

    fn round_over(&mut self, result: RoundResult) {
        println!("Result: {result}");
    }
}
