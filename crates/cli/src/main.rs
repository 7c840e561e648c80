use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use colored::Colorize;

use collectors::{CatalogClient, WeatherClient, WebSearchClient};
use judge::ChatJudge;
use model::{ConversationLog, RecommendationSet, UserRequest};
use server::{QaOrchestrator, RecommendationOrchestrator};

/// Encore - live event recommendations
#[derive(Parser)]
#[command(name = "encore")]
#[command(about = "Find and rank live events matched to what you're in the mood for", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for events and print the ranked recommendations
    Search {
        /// City to search in
        #[arg(long)]
        city: String,

        /// State/province code, e.g. NY
        #[arg(long)]
        region: Option<String>,

        /// Country code
        #[arg(long, default_value = "US")]
        country: String,

        /// First day of the search window (defaults to today)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of the search window (defaults to a week from today)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// What you're looking for, in your own words
        #[arg(long)]
        intent: String,

        /// Indoor/outdoor or named-venue preference
        #[arg(long)]
        venue: Option<String>,

        /// Budget ceiling in dollars
        #[arg(long)]
        budget: Option<f64>,

        /// Number of recommendations to show
        #[arg(long, default_value = "6")]
        top_n: usize,

        /// Drop into a follow-up Q&A loop after the results
        #[arg(long)]
        chat: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            city,
            region,
            country,
            start,
            end,
            intent,
            venue,
            budget,
            top_n,
            chat,
        } => {
            let today = Local::now().date_naive();
            let request = UserRequest {
                city,
                region_code: region,
                country_code: country,
                start_date: start.unwrap_or(today),
                end_date: end.unwrap_or(today + Duration::days(7)),
                intent,
                venue_preference: venue,
                budget_max: budget,
            };
            handle_search(request, top_n, chat).await?;
        }
    }

    Ok(())
}

/// Handle the 'search' command
async fn handle_search(request: UserRequest, top_n: usize, chat: bool) -> Result<()> {
    // Collaborator clients; credentials come from the environment and are
    // injected here, never read from inside the pipeline
    let judge = Arc::new(ChatJudge::from_env());
    let orchestrator = RecommendationOrchestrator::new(
        Arc::new(CatalogClient::from_env()),
        Arc::new(WeatherClient::new()),
        judge.clone(),
    );

    println!(
        "Searching {} for \"{}\" ({} to {})...",
        request.city.bold(),
        request.intent,
        request.start_date,
        request.end_date
    );
    let start = Instant::now();
    let set = orchestrator.produce_recommendations(request, top_n).await?;
    println!("{} Search finished in {:?}\n", "✓".green(), start.elapsed());

    if let Some(error) = &set.error {
        println!("{} Event search failed: {}", "✗".red(), error);
        return Ok(());
    }
    if set.recommendations.is_empty() {
        println!("No events found — try a wider date range or another city.");
        return Ok(());
    }

    print_recommendations(&set);

    if chat {
        run_chat(&set, judge).await?;
    }
    Ok(())
}

/// Format and print the ranked set
fn print_recommendations(set: &RecommendationSet) {
    println!(
        "{}",
        format!(
            "Top {} events in {} ({} to {})",
            set.recommendations.len(),
            set.request.city,
            set.request.start_date,
            set.request.end_date
        )
        .bold()
        .blue()
    );

    for (i, rec) in set.recommendations.iter().enumerate() {
        let event = &rec.event;

        let score = format!("{:.0}/100", rec.relevance_score);
        let score = if rec.relevance_score >= 75.0 {
            score.green()
        } else if rec.relevance_score >= 50.0 {
            score.yellow()
        } else {
            score.red()
        };

        let mut badges = vec![];
        if !event.category.is_empty() {
            badges.push(event.category.clone());
        }
        if !event.genre.is_empty() {
            badges.push(event.genre.clone());
        }
        badges.push(if event.is_outdoor { "Outdoor" } else { "Indoor" }.to_string());
        badges.push(if event.is_weekend { "Weekend" } else { "Weekday" }.to_string());

        let price = if event.price_min > 0.0 || event.price_max > 0.0 {
            format!("${:.0} - ${:.0}", event.price_min, event.price_max)
        } else {
            "Free / Not listed".to_string()
        };
        let weather = match &rec.weather {
            Some(w) => format!(
                "{} · {:.0}-{:.0}°F · Rain {:.0}%",
                w.description, w.temp_min_f, w.temp_max_f, w.precipitation_chance
            ),
            None => "No forecast".to_string(),
        };

        println!("\n{}. {} [{}]", (i + 1).to_string().green(), event.name.bold(), score);
        println!("   {}", badges.join("  "));
        println!("   {} {} @ {}", "When: ".cyan(), event.date, event.time);
        println!("   {} {}", "Venue:".cyan(), event.venue_name);
        println!("   {} {}", "Price:".cyan(), price);
        println!("   {} {}", "Sky:  ".cyan(), weather);
        println!("   {} {}", "Why:  ".cyan(), rec.score_reason);
        if !event.ticket_url.is_empty() {
            println!("   {} {}", "Tix:  ".cyan(), event.ticket_url);
        }
    }

    // Summary line
    let weekend = set.recommendations.iter().filter(|r| r.event.is_weekend).count();
    let avg: f64 = set
        .recommendations
        .iter()
        .map(|r| r.relevance_score)
        .sum::<f64>()
        / set.recommendations.len() as f64;
    println!(
        "\n{} {} recommendations · {} on a weekend · average score {:.1}/100",
        "Σ".bold(),
        set.recommendations.len(),
        weekend,
        avg
    );
}

/// Interactive follow-up Q&A over the printed recommendations
async fn run_chat(set: &RecommendationSet, judge: Arc<ChatJudge>) -> Result<()> {
    let mut qa = QaOrchestrator::new(judge);
    if let Some(search) = WebSearchClient::from_env() {
        qa = qa.with_search(Arc::new(search));
    }

    // Supplementary lookups happen once per ranked set, not per turn
    let enrichment = qa.prepare_enrichment(set).await;

    println!(
        "\n{}",
        "Ask anything about these events (empty line or 'exit' to quit):".bold()
    );

    let stdin = io::stdin();
    let mut log = ConversationLog::new();

    loop {
        print!("{} ", ">".bold().blue());
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() || question.eq_ignore_ascii_case("exit") {
            break;
        }

        let turn = qa.answer_question(set, &enrichment, &log, question).await;
        println!("{}\n", turn.answer);
        log = turn.log;
    }

    Ok(())
}
