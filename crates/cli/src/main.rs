use std::env;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use leaddev_agents::{ActionOutcome, BookingDesk, ConversationConfig, ConversationManager};
use leaddev_core::{
    analyze_message, generate_customization_response, generate_detailed_service_response,
    get_service_by_id, list_services, services_by_category, BookingRequest, BudgetRange,
    ConversationState, ServiceCategory, Timeline, TurnRole,
};
use leaddev_observability::{init_tracing, AppMetrics};
use leaddev_storage::Store;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "assistant")]
#[command(about = "LeadDevCorps sales assistant CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive conversation; `/help` lists the action commands.
    Chat,
    Services {
        #[arg(long)]
        category: Option<String>,
    },
    Classify {
        text: String,
    },
    Quote {
        service_id: String,
        #[arg(long)]
        customize: bool,
    },
    Book {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long, default_value = "")]
        message: String,
        #[arg(long)]
        budget: Option<String>,
        #[arg(long)]
        timeline: Option<String>,
    },
    Bookings {
        #[arg(long)]
        service: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("leaddev_cli");
    let cli = Cli::parse();
    let metrics = AppMetrics::shared();

    match cli.command {
        Command::Chat => {
            let manager = ConversationManager::new(ConversationConfig::from_env(), metrics.clone());
            run_chat(&manager).await?;
            manager.close();
            info!(metrics = ?metrics.snapshot(), "chat finished");
        }
        Command::Services { category } => {
            let services = match category {
                Some(category) => {
                    let category = category
                        .parse::<ServiceCategory>()
                        .context("invalid --category value")?;
                    services_by_category(category)
                }
                None => list_services().iter().collect(),
            };
            println!("{}", serde_json::to_string_pretty(&services)?);
        }
        Command::Classify { text } => {
            println!("{}", serde_json::to_string_pretty(&analyze_message(&text))?);
        }
        Command::Quote {
            service_id,
            customize,
        } => {
            let Some(service) = get_service_by_id(&service_id) else {
                bail!("unknown service `{}`", service_id);
            };
            let text = if customize {
                generate_customization_response(service)
            } else {
                generate_detailed_service_response(service)
            };
            println!("{text}");
        }
        Command::Book {
            name,
            email,
            service,
            phone,
            company,
            message,
            budget,
            timeline,
        } => {
            let request = BookingRequest {
                name,
                email,
                phone,
                company,
                service_id: service,
                message,
                budget: budget
                    .map(|value| value.parse::<BudgetRange>())
                    .transpose()
                    .context("invalid --budget value")?,
                timeline: timeline
                    .map(|value| value.parse::<Timeline>())
                    .transpose()
                    .context("invalid --timeline value")?,
            };

            let desk = BookingDesk::new(Arc::new(build_store().await?), metrics);
            let confirmation = desk.submit(request).await?;
            println!("{}", serde_json::to_string_pretty(&confirmation)?);
        }
        Command::Bookings { service } => {
            let desk = BookingDesk::new(Arc::new(build_store().await?), metrics);
            let records = match service {
                Some(service_id) => desk.for_service(&service_id).await?,
                None => desk.list().await?,
            };
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }

    Ok(())
}

async fn run_chat(manager: &ConversationManager) -> Result<()> {
    println!("LeadDevCorps assistant. type '/help' for actions, 'exit' to quit.\n");

    let mut printed = print_new_turns(&manager.snapshot(), 0);
    let mut panel_shown = false;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        if let Some(command) = message.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            let name = parts.next().unwrap_or_default();
            let payload = parts.next();

            match name {
                "help" => print_help(),
                "close" => manager.close_booking_modal(),
                _ => {
                    let outcome = match name.parse::<usize>() {
                        Ok(index) => click_button(manager, index),
                        Err(_) => manager.click_action(name, payload),
                    };
                    if outcome == ActionOutcome::Ignored {
                        println!("(nothing to do for `/{command}`)");
                    }
                }
            }
        } else if !manager.submit_text(message) {
            println!("(still thinking, message dropped)");
        }

        manager.flush().await;
        let state = manager.snapshot();
        printed = print_new_turns(&state, printed);

        if state.is_service_panel_visible && !panel_shown {
            panel_shown = true;
            print_service_panel();
        }
        if state.is_booking_modal_open {
            let draft = manager.booking_draft();
            println!(
                "[booking form open{}] submit with `assistant book --service ...`, or /close\n",
                if draft.service_id.is_empty() {
                    String::new()
                } else {
                    format!(" for {}", draft.service_id)
                }
            );
        }
    }

    Ok(())
}

/// Clicks the `index`-th (1-based) button of the most recent turn that offers any.
fn click_button(manager: &ConversationManager, index: usize) -> ActionOutcome {
    let state = manager.snapshot();
    let option = state
        .turns
        .iter()
        .rev()
        .find(|turn| !turn.actions.is_empty())
        .and_then(|turn| turn.actions.get(index.wrapping_sub(1)));

    match option {
        Some(option) => manager.click(option),
        None => ActionOutcome::Ignored,
    }
}

fn print_new_turns(state: &ConversationState, already_printed: usize) -> usize {
    for turn in state.turns.iter().skip(already_printed) {
        let speaker = match turn.role {
            TurnRole::User => "you",
            TurnRole::Assistant => "assistant",
        };
        println!("{speaker}: {}\n", turn.text);

        for (idx, action) in turn.actions.iter().enumerate() {
            println!("  [/{}] {}", idx + 1, action.label);
        }
        if !turn.actions.is_empty() {
            println!();
        }
    }

    state.turns.len()
}

fn print_service_panel() {
    println!("Services:");
    for service in list_services() {
        println!("  {:<22} {}", service.id, service.name);
    }
    println!("  pick one with /select_service <id>\n");
}

fn print_help() {
    println!("Actions:");
    println!("  /<n>                        click button n of the latest reply");
    println!("  /show_services              open the service catalog");
    println!("  /book_consultation          open the booking form");
    println!("  /select_service <id>        detailed quote for a service");
    println!("  /customize_quote <id>       customization options for a service");
    println!("  /close                      close the booking form");
    println!();
}

async fn build_store() -> Result<Store> {
    let store = match env::var("LEADDEV_DATABASE_URL") {
        Ok(database_url) => Store::sqlite(&database_url).await?,
        Err(_) => Store::memory(),
    };

    if !store.is_persistent() {
        warn!("booking store is in-memory; set LEADDEV_DATABASE_URL to keep bookings between runs");
    }
    Ok(store)
}
