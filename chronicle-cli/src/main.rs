//! chronicle-cli - terminal frontend for the Chronicle history API
//!
//! Talks to a running `chronicle-server` over HTTP.
//!
//! # Subcommands
//! - `status`                  - dataset summary and years covered
//! - `years`                   - every year with recorded events
//! - `places <year>`           - places recorded for a year
//! - `events <year> <place>`   - events at a year and place
//! - `timeline <country>`      - a country's events, oldest first
//! - `explore <type>`          - events of one type, with map country
//! - `quiz [-n <size>]`        - interactive trivia quiz
//! - `ask <question...>`       - ask the historical assistant
//! - `curiosity`               - a random historical curiosity

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_SERVER: &str = "http://127.0.0.1:8777";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "chronicle-cli",
    version,
    about = "Browse historical events, take a quiz and ask the history assistant"
)]
struct Cli {
    /// Chronicle HTTP server URL (overrides CHRONICLE_HTTP_URL env var)
    #[arg(long, env = "CHRONICLE_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Print raw JSON responses instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show dataset summary
    Status,

    /// List every year with recorded events
    Years,

    /// List places recorded for a year (BC years are negative)
    Places {
        #[arg(allow_hyphen_values = true)]
        year: i64,
    },

    /// Show events for a year and place
    Events {
        #[arg(allow_hyphen_values = true)]
        year: i64,
        place: String,
    },

    /// Show a country's timeline
    Timeline { country: String },

    /// Explore events of one type
    Explore { event_type: String },

    /// Take an interactive trivia quiz
    Quiz {
        /// Number of questions (server default when omitted)
        #[arg(short = 'n', long)]
        size: Option<usize>,
    },

    /// Ask the historical assistant a question
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Print a random historical curiosity
    Curiosity,
}

// ============================================================================
// HTTP Client
// ============================================================================

struct ApiClient {
    server: String,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    fn new(server: &str) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder().build()?;
        Ok(Self {
            server: server.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn get(&self, path: &str) -> anyhow::Result<Value> {
        self.get_with_query(path, &[])
    }

    fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .get(&url)
            .query(query)
            .send()
            .with_context(|| format!("connection failed to {}", url))?;
        Self::read_body(resp)
    }

    fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .with_context(|| format!("connection failed to {}", url))?;
        Self::read_body(resp)
    }

    fn delete(&self, path: &str) -> anyhow::Result<Value> {
        let url = format!("{}{}", self.server, path);
        let resp = self
            .client
            .delete(&url)
            .send()
            .with_context(|| format!("connection failed to {}", url))?;
        Self::read_body(resp)
    }

    fn read_body(resp: reqwest::blocking::Response) -> anyhow::Result<Value> {
        let status = resp.status();
        let body: Value = resp.json().context("failed to parse server response")?;
        if !status.is_success() {
            let msg = body["error"].as_str().unwrap_or("unknown error");
            return Err(anyhow!("server returned {}: {}", status, msg));
        }
        Ok(body)
    }
}

/// Country and event-type names contain spaces, so they are encoded into the path.
fn timeline_path(country: &str) -> String {
    format!("/countries/{}/timeline", urlencoding::encode(country))
}

fn event_type_path(event_type: &str) -> String {
    format!("/event-types/{}/events", urlencoding::encode(event_type))
}

// ============================================================================
// Formatting
// ============================================================================

fn field<'a>(v: &'a Value, key: &str) -> &'a str {
    v[key].as_str().unwrap_or("-")
}

/// The year as written in the table (`"753 BC"`), falling back to the normalized year.
fn display_year(event: &Value) -> String {
    match &event["raw_year"] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => event["year"].to_string(),
    }
}

/// Detail block for one event, mirroring the dashboard's expanders.
fn format_event(event: &Value) -> String {
    let mut out = format!("{} - {}\n", display_year(event), field(event, "name"));
    out.push_str(&format!("  Place:      {}\n", field(event, "place")));
    out.push_str(&format!("  Type:       {}\n", field(event, "event_type")));
    out.push_str(&format!("  Impact:     {}\n", field(event, "impact")));
    out.push_str(&format!("  Key figure: {}\n", field(event, "responsible_party")));
    out.push_str(&format!("  Outcome:    {}\n", field(event, "outcome")));
    out.push_str(&format!("  Country:    {}\n", field(event, "country")));
    out
}

fn string_list(v: &Value) -> Vec<String> {
    v.as_array()
        .map(|items| {
            items
                .iter()
                .map(|i| match i {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Accept either a 1-based choice number or the exact text of a choice.
fn parse_choice_input(input: &str, choices: &[String]) -> Option<String> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| choices.get(i)).cloned();
    }
    choices.iter().find(|c| c.as_str() == input).cloned()
}

// ============================================================================
// Commands
// ============================================================================

fn print_json(v: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(v)?);
    Ok(())
}

fn do_status(api: &ApiClient, json: bool) -> anyhow::Result<()> {
    let body = api.get("/health")?;
    if json {
        return print_json(&body);
    }
    println!("Chronicle server: {}", field(&body, "status"));
    println!("Version:          {}", field(&body, "version"));
    println!("Events:           {}", body["events"]);
    println!(
        "Dropped rows:     {}",
        body["dropped_events"].as_array().map_or(0, Vec::len)
    );
    println!("Quiz questions:   {}", body["questions"]);
    if !body["year_span"].is_null() {
        println!(
            "Years covered:    {} to {}",
            body["year_span"]["min"], body["year_span"]["max"]
        );
    }
    println!(
        "Assistant:        {}",
        body["assistant"].as_str().unwrap_or("disabled")
    );
    Ok(())
}

fn do_list(
    api: &ApiClient,
    path: &str,
    query: &[(&str, &str)],
    key: &str,
    json: bool,
) -> anyhow::Result<()> {
    let body = api.get_with_query(path, query)?;
    if json {
        return print_json(&body);
    }
    let items = string_list(&body[key]);
    if items.is_empty() {
        eprintln!("Nothing found.");
    }
    for item in items {
        println!("{}", item);
    }
    Ok(())
}

fn do_events(api: &ApiClient, year: i64, place: &str, json: bool) -> anyhow::Result<()> {
    let year = year.to_string();
    let body = api.get_with_query("/events", &[("year", year.as_str()), ("place", place)])?;
    if json {
        return print_json(&body);
    }
    let events = body["events"].as_array().cloned().unwrap_or_default();
    if events.is_empty() {
        eprintln!("No events found for that combination.");
        return Ok(());
    }
    for event in &events {
        println!("{}", format_event(event));
    }
    Ok(())
}

fn do_timeline(api: &ApiClient, country: &str, json: bool) -> anyhow::Result<()> {
    let body = api.get(&timeline_path(country))?;
    if json {
        return print_json(&body);
    }
    let events = body["events"].as_array().cloned().unwrap_or_default();
    if events.is_empty() {
        eprintln!("No events recorded for {}.", country);
        return Ok(());
    }
    println!("Timeline of key events - {}\n", country);
    for event in &events {
        println!("{}", format_event(event));
    }
    Ok(())
}

fn do_explore(api: &ApiClient, event_type: &str, json: bool) -> anyhow::Result<()> {
    let body = api.get(&event_type_path(event_type))?;
    if json {
        return print_json(&body);
    }
    for event in body["events"].as_array().cloned().unwrap_or_default() {
        print!("{}", format_event(&event));
        if let Some(country) = event["map_country"].as_str() {
            println!("  Map:        {}", country);
        }
        println!();
    }
    Ok(())
}

fn read_line(stdin: &mut impl BufRead) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn do_quiz(api: &ApiClient, size: Option<usize>) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdin = stdin.lock();

    let mut quiz = api.post("/quiz", &serde_json::json!({ "size": size }))?;
    let session = quiz["session"]
        .as_str()
        .ok_or_else(|| anyhow!("server did not return a quiz session"))?
        .to_string();

    loop {
        let questions = quiz["questions"].as_array().cloned().unwrap_or_default();
        for (i, q) in questions.iter().enumerate() {
            let choices = string_list(&q["choices"]);
            println!("\nQuestion {}: {}", i + 1, field(q, "prompt"));
            for (n, c) in choices.iter().enumerate() {
                println!("  {}. {}", n + 1, c);
            }

            loop {
                print!("Your answer (number, blank to skip): ");
                io::stdout().flush()?;
                let Some(line) = read_line(&mut stdin)? else {
                    break;
                };
                if line.trim().is_empty() {
                    break;
                }
                match parse_choice_input(&line, &choices) {
                    Some(answer) => {
                        api.post(
                            &format!("/quiz/{}/answer", session),
                            &serde_json::json!({ "index": i, "answer": answer }),
                        )?;
                        break;
                    }
                    None => println!("Please pick one of the listed choices."),
                }
            }
        }

        let score = api.get(&format!("/quiz/{}/score", session))?;
        println!(
            "\nYou got {} of {} answers right.",
            score["score"], score["total"]
        );
        for (i, r) in score["results"].as_array().cloned().unwrap_or_default().iter().enumerate() {
            if r["correct"] == Value::Bool(true) {
                continue;
            }
            match r["correct_answer"].as_str() {
                Some(answer) => println!("  {}. correct answer: {}", i + 1, answer),
                None => println!("  {}. unanswered", i + 1),
            }
        }

        print!("\nTry again? [y/N] ");
        io::stdout().flush()?;
        match read_line(&mut stdin)? {
            Some(line) if line.trim().eq_ignore_ascii_case("y") => {
                quiz = api.post(&format!("/quiz/{}/reset", session), &Value::Null)?;
            }
            _ => {
                api.delete(&format!("/quiz/{}", session))?;
                return Ok(());
            }
        }
    }
}

fn do_ask(api: &ApiClient, question: &str, json: bool) -> anyhow::Result<()> {
    let body = api.post("/ask", &serde_json::json!({ "question": question }))?;
    if json {
        return print_json(&body);
    }
    let message = field(&body, "message");
    if body["ok"] == Value::Bool(true) {
        println!("{}", message);
    } else {
        eprintln!("{}", message);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CuriosityResponse {
    curiosity: String,
}

fn do_curiosity(api: &ApiClient, json: bool) -> anyhow::Result<()> {
    let body = api.get("/curiosity")?;
    if json {
        return print_json(&body);
    }
    let parsed: CuriosityResponse = serde_json::from_value(body)?;
    println!("{}", parsed.curiosity);
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();

    let result = ApiClient::new(&cli.server).and_then(|api| match cli.command {
        Commands::Status => do_status(&api, cli.json),
        Commands::Years => do_list(&api, "/years", &[], "years", cli.json),
        Commands::Places { year } => {
            let year = year.to_string();
            do_list(&api, "/places", &[("year", year.as_str())], "places", cli.json)
        }
        Commands::Events { year, place } => do_events(&api, year, &place, cli.json),
        Commands::Timeline { country } => do_timeline(&api, &country, cli.json),
        Commands::Explore { event_type } => do_explore(&api, &event_type, cli.json),
        Commands::Quiz { size } => do_quiz(&api, size),
        Commands::Ask { question } => do_ask(&api, &question.join(" "), cli.json),
        Commands::Curiosity => do_curiosity(&api, cli.json),
    });

    if let Err(e) = result {
        eprintln!("chronicle-cli: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
