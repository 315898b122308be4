//! `threadpost`: command-line companion to the Threads connector.
//!
//! Provides two subcommands:
//!
//! - **`split`**: show how a text would be divided into Threads posts.
//! - **`post`**: publish through a running connector (or, with
//!   `--dry-run`, print the posts that would be created).
//!
//! Text is read from an argument, a file path, or stdin (`-`).

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use threadpost::{split_text, ContentPlan, ContentRequest, THREADS_CHAR_LIMIT};
use threadpost_connector_api::{
    ErrorResponse, PostRequest, PostResponse, API_KEY_HEADER, POST_PATH,
};

/// Publishing can wait on several containers in sequence.
const POST_TIMEOUT: Duration = Duration::from_secs(300);

/// threadpost: publish long-form content to Threads
#[derive(Parser)]
#[command(name = "threadpost", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split text into post-sized chunks and print them.
    ///
    /// Pass `-` as FILE (or omit it) to read from stdin.
    Split {
        /// Path to a text file, or `-` for stdin.
        #[arg(default_value = "-")]
        file: PathBuf,

        /// Maximum characters per chunk.
        #[arg(short, long, default_value_t = THREADS_CHAR_LIMIT)]
        limit: usize,
    },

    /// Publish text, an image, and/or a link through a connector.
    ///
    /// Examples:
    ///   threadpost post --text "Hello" --url https://example.com
    ///   threadpost post --file notes.md --image-url https://cdn.example.com/a.jpg
    ///   cat notes.md | threadpost post --file - --dry-run
    Post {
        /// Connector base URL.
        #[arg(long, env = "THREADPOST_CONNECTOR", default_value = "http://localhost:8080")]
        connector: String,

        /// Value for the connector's X-API-Key header.
        #[arg(long, env = "API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Post text.
        #[arg(short, long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the post text from a file, or `-` for stdin.
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Image to attach to the first post.
        #[arg(long, value_name = "URL")]
        image_url: Option<String>,

        /// Link published as the final reply.
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Print the planned posts instead of publishing.
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Split { file, limit } => {
            let text = read_input(&file);
            print!("{}", render_chunks(&split_text(text.trim_end(), limit)));
        }

        Command::Post {
            connector,
            api_key,
            text,
            file,
            image_url,
            url,
            dry_run,
        } => {
            let text = match (text, file) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => Some(read_input(&path)),
                (None, None) => None,
            };
            let request = PostRequest {
                text: text.map(|t| t.trim_end().to_string()),
                image_url,
                url,
            };

            if dry_run {
                let content = ContentRequest::from(request);
                let plan = ContentPlan::build(&content)
                    .unwrap_or_else(|e| fatal(&format!("nothing to post: {e}")));
                print!("{}", render_plan(&plan));
                return;
            }

            if !request.has_primary_content() {
                fatal("a post needs --text, --file, or --image-url");
            }
            let api_key = api_key
                .unwrap_or_else(|| fatal("--api-key (or API_KEY) is required to publish"));

            match publish(&connector, &api_key, &request) {
                Ok(post_id) => println!("{post_id}"),
                Err(e) => fatal(&e),
            }
        }
    }
}

/// Send `request` to the connector and return the root post id.
fn publish(connector: &str, api_key: &str, request: &PostRequest) -> Result<String, String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(POST_TIMEOUT)
        .build()
        .map_err(|e| format!("failed to build HTTP client: {e}"))?;

    let url = format!("{}{POST_PATH}", connector.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .header(API_KEY_HEADER, api_key)
        .json(request)
        .send()
        .map_err(|e| format!("request to {url} failed: {e}"))?;

    let status = resp.status();
    let body = resp
        .text()
        .map_err(|e| format!("failed to read response: {e}"))?;

    if status.is_success() {
        let parsed: PostResponse = serde_json::from_str(&body)
            .map_err(|e| format!("unexpected response {body:?}: {e}"))?;
        return Ok(parsed.post_id);
    }

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => Err(format!("{status}: {} ({})", err.error, err.code)),
        Err(_) => Err(format!("{status}: {body}")),
    }
}

fn render_chunks(chunks: &[String]) -> String {
    let mut out = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!(
            "--- {}/{} ({} chars) ---\n{}\n",
            i + 1,
            chunks.len(),
            chunk.chars().count(),
            chunk
        ));
    }
    out
}

fn render_plan(plan: &ContentPlan) -> String {
    let mut out = String::new();
    for (i, unit) in plan.units().iter().enumerate() {
        let parent = if i == 0 {
            "root".to_string()
        } else {
            format!("reply to #{i}")
        };
        out.push_str(&format!("#{} {} ({parent})\n", i + 1, unit.role));
        if let Some(image) = &unit.image_url {
            out.push_str(&format!("  image: {image}\n"));
        }
        if let Some(text) = &unit.text {
            for line in text.lines() {
                out.push_str(&format!("  | {line}\n"));
            }
        }
    }
    out
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &Path) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {e}")));
        buf
    } else {
        fs::read_to_string(path)
            .unwrap_or_else(|e| fatal(&format!("failed to read {}: {e}", path.display())))
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("threadpost: {msg}");
    process::exit(2);
}
