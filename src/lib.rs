pub mod api;
pub mod calendar;
pub mod cli;
pub mod completion;
pub mod flow;
pub mod models;
pub mod settings;
pub mod shell;
pub mod timer;
pub mod utils;

use std::{io, sync::Arc};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::{info, warn};
use tokio::io::BufReader;

use api::{ApiClient, BookCatalog, CompletionStore, GroupDirectory, ShelfStore};
use calendar::{shift_month, DayDetail, MonthView, YearMonth};
use cli::{BooksCommand, Cli, Command, ConfigCommand, ShelfCommand};
use flow::ReadingFlow;
use models::{Book, BookId, NewBook};
use settings::SettingsStore;
use shell::SessionOutcome;
use timer::TimerController;

pub(crate) struct AppState {
    settings: SettingsStore,
    api: Arc<ApiClient>,
}

impl AppState {
    fn load(cli: &Cli) -> Result<Self> {
        let path = match &cli.settings {
            Some(path) => path.clone(),
            None => SettingsStore::default_path()?,
        };
        let settings = SettingsStore::new(path)?;
        let api = ApiClient::new(settings.api_session()?).context("failed to build api client")?;
        Ok(Self {
            settings,
            api: Arc::new(api),
        })
    }
}

pub async fn run() -> Result<()> {
    // Defaults to warn; RUST_LOG overrides.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let state = AppState::load(&cli)?;
    info!("readtrack using api at {}", state.api.session().base_url);

    match cli.command {
        Command::Timer { minutes, book } => run_timer(&state, minutes, book).await,
        Command::Books { command } => run_books(&state, command).await,
        Command::Calendar { day: Some(day), .. } => run_day(&state, day).await,
        Command::Calendar {
            year,
            month,
            offset,
            day: None,
        } => run_calendar(&state, year, month, offset).await,
        Command::Shelf { command } => run_shelf(&state, command).await,
        Command::Groups => run_groups(&state).await,
        Command::Config { command } => run_config(&state, command),
    }
}

async fn run_timer(state: &AppState, minutes: Option<u32>, book: Option<BookId>) -> Result<()> {
    let minutes = match minutes {
        Some(minutes) => minutes,
        None => state.settings.default_minutes()?,
    };

    let book = match book {
        Some(id) => {
            let detail = state
                .api
                .detail(id)
                .await
                .with_context(|| format!("failed to load book {id}"))?;
            println!("Reading \"{}\" by {}", detail.book.title, detail.book.author);
            Some(detail.book)
        }
        None => None,
    };

    let timer = TimerController::new();
    let completions: Arc<dyn CompletionStore> = state.api.clone();
    let flow = ReadingFlow::new(timer.clone(), completions);
    flow.select_book(book).await;

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = io::stdout();
    let outcome = shell::run_timer(&flow, minutes, stdin, &mut stdout).await;
    timer.shutdown().await?;

    match outcome? {
        SessionOutcome::Saved(receipt) => info!("session saved as completion {}", receipt.id),
        SessionOutcome::Skipped => info!("session finished without a record"),
        SessionOutcome::Cancelled => info!("session cancelled"),
    }
    Ok(())
}

async fn run_books(state: &AppState, command: BooksCommand) -> Result<()> {
    match command {
        BooksCommand::Search { query } => {
            let books = state.api.search(&query).await?;
            if books.is_empty() {
                println!("No books match \"{query}\".");
            }
            print_books(&books);
        }
        BooksCommand::Show { id } => {
            let detail = state.api.detail(id).await?;
            println!("{} by {}", detail.book.title, detail.book.author);
            if !detail.book.description.is_empty() {
                println!("\n{}", detail.book.description);
            }
            if !detail.related_books.is_empty() {
                println!("\nRelated:");
                print_books(&detail.related_books);
            }
        }
        BooksCommand::Popular => print_books(&state.api.popular().await?),
        BooksCommand::Add {
            title,
            author,
            description,
        } => {
            let id = state
                .api
                .add(&NewBook {
                    title,
                    author,
                    description,
                })
                .await?;
            println!("Added book #{id}.");
        }
    }
    Ok(())
}

fn print_books(books: &[Book]) {
    for book in books {
        println!("{:>6}  {} by {}", book.id, book.title, book.author);
    }
}

async fn run_calendar(
    state: &AppState,
    year: Option<i32>,
    month: Option<u32>,
    offset: i32,
) -> Result<()> {
    let today = Local::now().date_naive();
    let base = match (year, month) {
        (Some(year), Some(month)) => YearMonth::new(year, month)?,
        (None, Some(month)) => YearMonth::new(YearMonth::of(today).year, month)?,
        _ => YearMonth::of(today),
    };
    let target = shift_month(base, offset)?;

    let completions = match state.api.list_by_month(target.year, target.month).await {
        Ok(completions) => completions,
        Err(err) => {
            warn!("failed to load completions for {}-{:02}: {err}", target.year, target.month);
            return Err(err.into());
        }
    };

    let view = MonthView::build(target, &completions, today)?;
    print!("{}", shell::render_month(&view));
    Ok(())
}

async fn run_day(state: &AppState, day: NaiveDate) -> Result<()> {
    let month = YearMonth::of(day);
    let completions = state
        .api
        .list_by_month(month.year, month.month)
        .await
        .with_context(|| format!("failed to load completions for {day}"))?;
    print!("{}", shell::render_day(&DayDetail::collect(day, &completions)));
    Ok(())
}

async fn run_shelf(state: &AppState, command: ShelfCommand) -> Result<()> {
    match command {
        ShelfCommand::List => print!("{}", shell::render_shelf(&state.api.records().await?)),
        ShelfCommand::Add { book_id } => {
            let id = state
                .api
                .shelve(book_id)
                .await
                .with_context(|| format!("failed to shelve book {book_id}"))?;
            println!("Shelved book #{book_id} as record #{id}.");
        }
        ShelfCommand::Remove { id } => {
            state
                .api
                .remove(id)
                .await
                .with_context(|| format!("failed to remove record {id}"))?;
            println!("Removed record #{id} from the shelf.");
        }
    }
    Ok(())
}

async fn run_groups(state: &AppState) -> Result<()> {
    let groups = state.api.list().await?;
    if groups.is_empty() {
        println!("No reading groups yet.");
    }
    for group in groups {
        println!("{:>6}  {} by {}", group.id, group.book_title, group.book_author);
        if !group.description.is_empty() {
            println!("        {}", group.description);
        }
    }
    Ok(())
}

fn run_config(state: &AppState, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            let stored = state.settings.snapshot()?;
            let session = state.settings.api_session()?;
            let from_env = |overridden: bool, var: &str| {
                if overridden {
                    format!(" (from {var})")
                } else {
                    String::new()
                }
            };
            println!("settings file:   {}", state.settings.path().display());
            println!(
                "api url:         {}{}",
                session.base_url,
                from_env(session.base_url != stored.api.base_url, settings::API_URL_ENV)
            );
            println!(
                "api token:       {}{}",
                if session.is_authenticated() { "set" } else { "not set" },
                from_env(session.token != stored.api.token, settings::TOKEN_ENV)
            );
            println!("default minutes: {}", stored.default_minutes);
        }
        ConfigCommand::Set {
            api_url,
            token,
            clear_token,
            default_minutes,
        } => {
            state.settings.update(|s| {
                if let Some(url) = api_url {
                    s.api.base_url = url;
                }
                if let Some(token) = token {
                    s.api.token = Some(token);
                }
                if clear_token {
                    s.api.token = None;
                }
                if let Some(minutes) = default_minutes {
                    s.default_minutes = minutes;
                }
            })?;
            println!("Saved {}", state.settings.path().display());
        }
    }
    Ok(())
}
