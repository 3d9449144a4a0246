//! Monte Carlo estimate of session outcomes under the shipped balancing.
//!
//! Run with: cargo run --example session_odds -p digbust-simulator

use digbust_execution::{dig, DigRng};
use digbust_types::{GameConfig, Session, SessionStatus};

const TRIALS: u64 = 100_000;

#[derive(Default)]
struct Tally {
    sessions: u64,
    jackpots: u64,
    total_score: u64,
    total_digs: u64,
    best_score: u64,
    longest_run: u32,
}

impl Tally {
    fn add(&mut self, session: &Session) {
        self.sessions += 1;
        if session.status == SessionStatus::Jackpot {
            self.jackpots += 1;
        }
        self.total_score += session.score;
        self.total_digs += u64::from(session.digs);
        self.best_score = self.best_score.max(session.score);
        self.longest_run = self.longest_run.max(session.digs);
    }
}

fn main() {
    let config = GameConfig::default();
    config.validate().expect("default config must validate");

    let mut tally = Tally::default();
    for trial in 0..TRIALS {
        let mut session = Session::new();
        while session.status == SessionStatus::Playing {
            let mut rng = DigRng::new(0xD16, trial, session.digs);
            dig(&mut session, &config, &mut rng).expect("playing session accepts digs");
        }
        tally.add(&session);
    }

    let sessions = tally.sessions as f64;
    println!("sessions:        {}", tally.sessions);
    println!(
        "jackpot rate:    {:.2}% ({} hits)",
        tally.jackpots as f64 / sessions * 100.0,
        tally.jackpots
    );
    println!("mean score:      {:.1}", tally.total_score as f64 / sessions);
    println!("mean digs:       {:.1}", tally.total_digs as f64 / sessions);
    println!("best score:      {}", tally.best_score);
    println!("longest run:     {} digs", tally.longest_run);
}
