use std::io::{self, Write};

use log::{error, info};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::PollOption;
use crate::voting;

const MENU_PROMPT: &str = "\
-- Menu --

1) Create new poll
2) List open polls
3) Vote on a poll
4) Show poll votes
5) Select a random winner from a poll option
6) Exit

Enter your choice: ";

const NEW_OPTION_PROMPT: &str = "Enter new option text (or leave empty to stop adding options): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    CreatePoll,
    ListPolls,
    Vote,
    ShowVotes,
    PickWinner,
    Exit,
}

impl MenuAction {
    pub fn parse(token: &str) -> Result<Self> {
        match token.trim() {
            "1" => Ok(MenuAction::CreatePoll),
            "2" => Ok(MenuAction::ListPolls),
            "3" => Ok(MenuAction::Vote),
            "4" => Ok(MenuAction::ShowVotes),
            "5" => Ok(MenuAction::PickWinner),
            "6" => Ok(MenuAction::Exit),
            other => Err(Error::InvalidSelection(other.to_string())),
        }
    }
}

/// The interactive session. Every error stops the current action only;
/// the menu comes back until the user picks Exit.
pub async fn run_menu(db: &Database) -> Result<()> {
    loop {
        let token = prompt(MENU_PROMPT)?;

        let action = match MenuAction::parse(&token) {
            Ok(action) => action,
            Err(_) => {
                println!("Invalid input selected. Please try again.");
                continue;
            }
        };

        let result = match action {
            MenuAction::CreatePoll => prompt_create_poll(db).await,
            MenuAction::ListPolls => list_polls(db).await,
            MenuAction::Vote => prompt_vote(db).await,
            MenuAction::ShowVotes => show_poll_votes(db).await,
            MenuAction::PickWinner => randomize_winner(db).await,
            MenuAction::Exit => {
                info!("session ended by user");
                return Ok(());
            }
        };

        if let Err(why) = result {
            error!("menu action failed: {}", why);
            println!("Error: {why}");
        }
    }
}

async fn prompt_create_poll(db: &Database) -> Result<()> {
    let title = prompt("Enter poll title: ")?;
    let owner = prompt("Enter poll owner: ")?;

    let poll_id = db.create_poll(&title, &owner).await?;
    info!("created poll {} ({})", poll_id, title);

    loop {
        let option_text = prompt(NEW_OPTION_PROMPT)?;
        if option_text.is_empty() {
            return Ok(());
        }
        db.add_option(&option_text, poll_id).await?;
    }
}

async fn list_polls(db: &Database) -> Result<()> {
    for poll in db.get_all_polls().await? {
        println!("{}: {} (created by {})", poll.id, poll.title, poll.owner_username);
    }
    Ok(())
}

async fn prompt_vote(db: &Database) -> Result<()> {
    let poll_id = prompt_id("Enter poll would you like to vote on: ")?;
    let poll = db.get_poll(poll_id).await?;
    print_poll_options(&db.get_poll_options(poll.id).await?);

    let option_id = prompt_id("Enter option you'd like to vote for: ")?;
    let option = db.get_option(option_id).await?;

    let username = prompt("Enter the username you'd like to vote as: ")?;
    db.add_vote(&username, option.id).await?;

    Ok(())
}

async fn show_poll_votes(db: &Database) -> Result<()> {
    let poll_id = prompt_id("Enter poll you would like to see votes for: ")?;
    let poll = db.get_poll(poll_id).await?;

    let options = db.get_poll_options(poll.id).await?;
    let mut option_counts = Vec::with_capacity(options.len());
    for option in options {
        let votes = db.get_votes_for_option(option.id).await?;
        option_counts.push((option, votes.len()));
    }

    match voting::tally(&option_counts) {
        Some(tally) => {
            for count in &tally.counts {
                println!(
                    "{} got {} votes ({:.2}% of total)",
                    count.option_text, count.votes, count.percentage
                );
            }
        }
        None => println!("No votes cast for this poll yet."),
    }

    Ok(())
}

async fn randomize_winner(db: &Database) -> Result<()> {
    let poll_id = prompt_id("Enter poll you'd like to pick a winner for: ")?;
    let poll = db.get_poll(poll_id).await?;
    print_poll_options(&db.get_poll_options(poll.id).await?);

    let option_id =
        prompt_id("Enter which is the winning option, we'll pick a random winner from voters: ")?;
    let votes = db.get_votes_for_option(option_id).await?;

    let winner = voting::pick_winner(option_id, &votes)?;
    println!("The randomly selected winner is {}.", winner.username);

    Ok(())
}

fn print_poll_options(options: &[PollOption]) {
    for option in options {
        println!("{}: {}", option.id, option.option_text);
    }
}

pub(crate) fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;

    let mut line = String::new();
    // A zero-byte read means stdin is closed; surface it instead of
    // spinning on empty input.
    if io::stdin().read_line(&mut line)? == 0 {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "stdin closed",
        )));
    }

    Ok(line.trim().to_string())
}

fn prompt_id(message: &str) -> Result<i64> {
    let input = prompt(message)?;
    input
        .parse()
        .map_err(move |_| Error::InvalidSelection(input))
}
