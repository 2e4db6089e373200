use std::error::Error;
use std::io::Write;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use rustyline::DefaultEditor;

use crate::config::Settings;
use crate::server::types::{ApiResponse, SummarizeData, SummarizeRequest};
use crate::session::{RUNNING_MESSAGE, VALIDATION_WARNING};
use crate::summarizer::BundleInfo;
use super::display;

const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const BRIGHT_CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";

fn print_help() {
    println!("\n{CYAN}Text Summarizer Commands{RESET}");
    println!("{BRIGHT_CYAN}{}{RESET}", "=".repeat(60));
    println!("{GREEN}exit, bye, quit{RESET} - Exit the session");
    println!("{GREEN}help{RESET}            - Show this help message");
    println!("{GREEN}clear{RESET}           - Clear the screen");
    println!("{GREEN}model{RESET}           - Show the loaded model checkpoint");
    println!("Anything else is treated as text to summarize.");
    println!();
}

/// Interactive terminal client for the summarization server.
///
/// Free-form input is sent to the summarize endpoint; a handful of
/// commands are handled locally. Blank input never reaches the server.
pub async fn chat_loop(settings: &Settings) -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting summarizer session");
    print_help();

    let mut rl = DefaultEditor::new()?;
    let client = Client::new();
    let server_url = format!("http://{}:{}", settings.server.host, settings.server.port);

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(input) => {
                let input_trimmed = input.trim();
                if input_trimmed.is_empty() {
                    display::print_warning(VALIDATION_WARNING);
                    continue;
                }

                match input_trimmed.to_lowercase().as_str() {
                    "exit" | "bye" | "quit" => {
                        println!("Goodbye!");
                        break;
                    }
                    "help" => print_help(),
                    "clear" => {
                        print!("\x1B[2J\x1B[1;1H");
                        std::io::stdout().flush()?;
                    }
                    "model" => handle_model_info(&client, &server_url).await,
                    _ => handle_summarize(&client, &server_url, input_trimmed).await,
                }

                let _ = rl.add_history_entry(input_trimmed);
            }
            Err(_) => {
                println!("Goodbye!");
                break;
            }
        }
    }
    Ok(())
}

async fn handle_model_info(client: &Client, server_url: &str) {
    let url = format!("{}/api/v1/model", server_url);
    match client.get(url).send().await {
        Ok(response) => match response.json::<ApiResponse<BundleInfo>>().await {
            Ok(body) => match body.data {
                Some(info) => display::print_model_info(&info),
                None => display::print_error(
                    body.message.as_deref().unwrap_or("No model information available"),
                ),
            },
            Err(e) => display::print_error(&format!("Error reading response: {}", e)),
        },
        Err(e) => display::print_error(&format!("Error requesting model info: {}", e)),
    }
}

async fn handle_summarize(client: &Client, server_url: &str, text: &str) {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{prefix:.bold.dim} {spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(RUNNING_MESSAGE);
    spinner.enable_steady_tick(Duration::from_millis(120));

    let url = format!("{}/api/v1/summarize", server_url);
    let request = SummarizeRequest { text: text.to_string() };
    let result = client.post(url).json(&request).send().await;
    spinner.finish_and_clear();

    match result {
        Ok(response) => match response.json::<ApiResponse<SummarizeData>>().await {
            Ok(body) => match (body.status.as_str(), body.data) {
                ("success", Some(data)) => display::print_summary(&data.summary),
                ("warning", _) | ("empty", _) => display::print_warning(
                    body.message.as_deref().unwrap_or("The summarizer returned nothing"),
                ),
                (_, _) => display::print_error(
                    body.message.as_deref().unwrap_or("Summarization failed"),
                ),
            },
            Err(e) => display::print_error(&format!("Error reading response: {}", e)),
        },
        Err(e) => display::print_error(&format!("Error sending request: {}", e)),
    }
}
