use std::sync::Arc;

use anyhow::{Context, Result};
use client_core::{CountrySource, DetailController, DetailViewState, ListConfig, ListController};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    task::JoinHandle,
};
use tokio_stream::StreamExt;
use tracing::debug;

use crate::render;

pub const HELP: &str = "\
Type to search by name. Commands:
  :clear        show every country again
  :next, :prev  move between pages
  :page N       jump to page N
  :retry        repeat the last request
  :detail CODE  show one country
  :help         print this text
  :quit         leave";

#[derive(Debug, PartialEq, Eq)]
pub enum BrowseInput {
    Query(String),
    Clear,
    Next,
    Previous,
    Page(usize),
    Retry,
    Detail(Option<String>),
    Help,
    Quit,
    Invalid(String),
}

impl BrowseInput {
    /// Lines starting with `:` are commands; anything else is search text,
    /// passed through untrimmed.
    pub fn parse(line: &str) -> Self {
        let Some(command) = line.trim().strip_prefix(':') else {
            return BrowseInput::Query(line.to_string());
        };
        let mut words = command.split_whitespace();
        match (words.next(), words.next()) {
            (Some("clear"), None) => BrowseInput::Clear,
            (Some("next"), None) => BrowseInput::Next,
            (Some("prev"), None) => BrowseInput::Previous,
            (Some("retry"), None) => BrowseInput::Retry,
            (Some("help"), None) => BrowseInput::Help,
            (Some("quit"), None) => BrowseInput::Quit,
            (Some("detail"), code) => BrowseInput::Detail(code.map(str::to_string)),
            (Some("page"), Some(number)) => match number.parse() {
                Ok(page) => BrowseInput::Page(page),
                Err(_) => BrowseInput::Invalid(format!("'{number}' is not a page number")),
            },
            _ => BrowseInput::Invalid(format!("unknown command ':{command}', try :help")),
        }
    }
}

/// Interactive loop over stdin. Every list state the controller publishes is
/// printed by a separate render task.
pub async fn run(source: Arc<dyn CountrySource>, config: ListConfig) -> Result<()> {
    let list = ListController::new(Arc::clone(&source), config);
    let renderer = spawn_renderer(&list);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let input = BrowseInput::parse(&line);
        debug!(?input, "browse: input");
        match input {
            BrowseInput::Query(text) => list.on_query_change(text),
            BrowseInput::Clear => list.clear_query(),
            BrowseInput::Next => {
                if !list.next_page() {
                    println!("no next page");
                }
            }
            BrowseInput::Previous => {
                if !list.previous_page() {
                    println!("no previous page");
                }
            }
            BrowseInput::Page(page) => {
                if !list.go_to_page(page) {
                    println!("page {page} is not available");
                }
            }
            BrowseInput::Retry => list.retry(),
            BrowseInput::Detail(code) => {
                let detail = DetailController::new(Arc::clone(&source), code);
                print!("{}", render::detail_state(&settled_detail(&detail).await?));
            }
            BrowseInput::Help => println!("{HELP}"),
            BrowseInput::Quit => break,
            BrowseInput::Invalid(message) => println!("{message}"),
        }
    }

    renderer.abort();
    Ok(())
}

pub async fn settled_detail(detail: &DetailController) -> Result<DetailViewState> {
    let mut states = detail.subscribe();
    let state = states
        .wait_for(|state| !matches!(state, DetailViewState::Loading))
        .await
        .context("detail controller stopped")?
        .clone();
    Ok(state)
}

fn spawn_renderer(list: &ListController) -> JoinHandle<()> {
    let mut states = list.state_stream();
    let mut searching = list.subscribe_searching();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                state = states.next() => match state {
                    Some(state) => print!("{}", render::list_state(&state)),
                    None => break,
                },
                changed = searching.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *searching.borrow_and_update() {
                        println!("searching...");
                    }
                }
            }
        }
    })
}
