use anyhow::{bail, Context, Result};
use bookmark::catalog::{CatalogClient, GoogleBooksClient};
use bookmark::config::{default_config_path, find_config_file, load_config, Config, LoggingConfig};
use bookmark::models::{BookDetails, BookRecord, SortMode};
use bookmark::store::MarkedBookStore;
use bookmark::ui::{self, Spinner, Status};
use bookmark::views::{DetailView, MarkedBooksView, SearchResultsView, SearchRow};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Bookmark - Search Google Books and keep a list of marked books
#[derive(Parser, Debug)]
#[command(name = "bookmark")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search Google Books and keep a list of marked books", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the marked book list
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if ui::is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the catalog
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Toggle the mark on the Nth result (1-based, repeatable)
        #[arg(long, short, value_name = "N")]
        mark: Vec<usize>,
    },

    /// List marked books
    #[command(alias = "ls")]
    Marked {
        /// Sort order: latest, oldest, date-asc, date-desc, author-asc, author-desc
        #[arg(long, short, default_value_t = SortMode::MarkedTimeDesc)]
        sort: SortMode,
    },

    /// Show the details of a marked book
    Show {
        /// Exact title of the book
        title: String,
    },

    /// Remove a book from the marked list
    #[command(alias = "rm")]
    Unmark {
        /// Exact title of the book
        title: String,
    },

    /// Print the share text of a marked book
    Share {
        /// Exact title of the book
        title: String,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    init_tracing(cli.verbose, cli.quiet, &config.logging);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.storage.data_dir());
    let store = MarkedBookStore::open(&data_dir);
    let format = cli.output.resolve();

    match cli.command {
        Commands::Search { query, mark } => {
            let catalog: Arc<dyn CatalogClient> =
                Arc::new(GoogleBooksClient::from_config(&config.catalog)?);
            run_search(catalog, &store, &query, &mark, format, cli.quiet).await?;
        }

        Commands::Marked { sort } => {
            let mut view = MarkedBooksView::new(store);
            view.set_sort(sort);
            view.show();
            output_marked(&view, format)?;
            view.hide();
        }

        Commands::Show { title } => {
            let book = find_marked(&store, &title)?;
            let view = DetailView::new(BookDetails::from(&book));
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&book)?),
                _ => ui::print_detail(&view, view.mark_label(&store)),
            }
        }

        Commands::Unmark { title } => {
            if store.remove(&title)? {
                if !cli.quiet {
                    ui::print_status(Status::Success, &format!("Unmarked \"{}\"", title));
                }
            } else {
                ui::print_status(Status::Warning, &format!("\"{}\" is not marked", title));
            }
        }

        Commands::Share { title } => {
            let book = find_marked(&store, &title)?;
            println!("{}", book.share_text());
        }

        Commands::Config { action } => match action {
            ConfigCommands::Init { force } => {
                let path = cli.config.clone().unwrap_or_else(default_config_path);
                if path.exists() && !force {
                    bail!(
                        "Config file already exists: {} (use --force to overwrite)",
                        path.display()
                    );
                }
                Config::default().save(&path)?;
                ui::print_status(
                    Status::Success,
                    &format!("Wrote config to {}", path.display()),
                );
            }
            ConfigCommands::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: u8, quiet: bool, logging: &LoggingConfig) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("bookmark={}", level)),
    );

    let json = logging.is_json();
    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
        }))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

async fn run_search(
    catalog: Arc<dyn CatalogClient>,
    store: &MarkedBookStore,
    query: &str,
    marks: &[usize],
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let view = SearchResultsView::new();
    let spinner = if quiet || format != OutputFormat::Table {
        Spinner::hidden()
    } else {
        Spinner::new(&format!("Searching {} for \"{}\"", catalog.name(), query.trim()))
    };

    let start = Instant::now();
    if let Some(handle) = view.submit(catalog, query) {
        handle.await.context("Search task failed")?;
    }
    view.close();

    if let Some(notice) = view.take_notice() {
        spinner.finish_with_error("Search failed");
        bail!("{}", notice.strip_prefix("Error: ").unwrap_or(&notice));
    }

    let results = view.results();
    spinner.finish_with_success(&format!("Found {} books", results.len()));

    for &n in marks {
        let Some(index) = n.checked_sub(1) else {
            ui::print_status(Status::Warning, "Result numbers start at 1");
            continue;
        };
        match view.toggle_mark(index, store)? {
            Some(true) => ui::print_status(
                Status::Marked,
                &format!("Marked \"{}\"", results[index].title),
            ),
            Some(false) => ui::print_status(
                Status::Info,
                &format!("Unmarked \"{}\"", results[index].title),
            ),
            None => ui::print_status(Status::Warning, &format!("No result #{}", n)),
        }
    }

    if format == OutputFormat::Table {
        ui::print_search_header(query.trim(), results.len(), start.elapsed());
    }
    output_results(&results, store, format)
}

fn find_marked(store: &MarkedBookStore, title: &str) -> Result<BookRecord> {
    match store.get(title) {
        Some(book) => Ok(book),
        None => bail!("\"{}\" is not marked", title),
    }
}

fn output_results(books: &[BookRecord], store: &MarkedBookStore, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(books)?);
        }
        OutputFormat::Plain => {
            for (i, book) in books.iter().enumerate() {
                println!("{}. {} ({})", i + 1, book.title, book.published_date);
                if !book.authors.is_empty() {
                    println!("   {}", book.authors.join(", "));
                }
                if book.has_preview_link() {
                    println!("   Preview: {}", book.preview_link);
                }
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            use comfy_table::{Attribute, Cell, Table};

            let title_width = (ui::terminal_width() / 2).max(20);
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "", "Title", "Publisher", "Pages", "Published"]);

            for (i, book) in books.iter().enumerate() {
                let row = SearchRow::from(book);
                let marked = if store.contains(&book.title) { "★" } else { "" };
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(marked),
                    Cell::new(ui::truncate_with_ellipsis(&row.title, title_width))
                        .add_attribute(Attribute::Bold),
                    Cell::new(ui::truncate_with_ellipsis(&row.publisher, 30)),
                    Cell::new(row.pages),
                    Cell::new(row.published_date),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn output_marked(view: &MarkedBooksView, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(view.books())?);
        return Ok(());
    }

    if let Some(notice) = view.notice() {
        ui::print_status(Status::Info, notice);
        return Ok(());
    }

    match format {
        OutputFormat::Plain => {
            for row in view.rows() {
                println!("{} - {} ({})", row.title, row.author, row.published_date);
            }
        }
        _ => {
            use comfy_table::{Attribute, Cell, Table};

            ui::print_section(&format!("Marked books ({})", view.sort_mode().label()));
            let title_width = (ui::terminal_width() / 2).max(20);
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "Title", "Author", "Published", "Marked"]);

            for (i, (row, book)) in view.rows().into_iter().zip(view.books()).enumerate() {
                table.add_row(vec![
                    Cell::new(i + 1),
                    Cell::new(ui::truncate_with_ellipsis(&row.title, title_width))
                        .add_attribute(Attribute::Bold),
                    Cell::new(row.author),
                    Cell::new(row.published_date),
                    Cell::new(format_marked_time(book.marked_time)),
                ]);
            }
            println!("{table}");
        }
    }
    Ok(())
}

fn format_marked_time(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .filter(|_| millis > 0)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_version() {
        let version = env!("CARGO_PKG_VERSION");
        let parts: Vec<&str> = version.split('.').collect();
        assert!(parts.len() >= 2);
        assert!(parts[0].parse::<u32>().is_ok());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from(["bookmark", "-vv", "-o", "json", "marked"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(!cli.quiet);

        let cli = Cli::parse_from([
            "bookmark",
            "--quiet",
            "--config",
            "/tmp/bookmark.toml",
            "--data-dir",
            "/tmp/books",
            "marked",
        ]);
        assert!(cli.quiet);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/bookmark.toml")));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/books")));
    }

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["bookmark"]).is_err());
    }

    #[test]
    fn test_cli_search_command() {
        let cli = Cli::parse_from(["bookmark", "search", "frank herbert", "--mark", "1", "-m", "3"]);
        match cli.command {
            Commands::Search { query, mark } => {
                assert_eq!(query, "frank herbert");
                assert_eq!(mark, vec![1, 3]);
            }
            _ => panic!("Expected Search command"),
        }

        let cli = Cli::parse_from(["bookmark", "s", "dune"]);
        assert!(matches!(cli.command, Commands::Search { .. }));
    }

    #[test]
    fn test_cli_marked_sort() {
        let cli = Cli::parse_from(["bookmark", "marked"]);
        match cli.command {
            Commands::Marked { sort } => assert_eq!(sort, SortMode::MarkedTimeDesc),
            _ => panic!("Expected Marked command"),
        }

        let cli = Cli::parse_from(["bookmark", "ls", "--sort", "author-desc"]);
        match cli.command {
            Commands::Marked { sort } => assert_eq!(sort, SortMode::AuthorDesc),
            _ => panic!("Expected Marked command"),
        }

        assert!(Cli::try_parse_from(["bookmark", "marked", "--sort", "random"]).is_err());
    }

    #[test]
    fn test_cli_title_commands() {
        let cli = Cli::parse_from(["bookmark", "show", "Dune"]);
        assert!(matches!(cli.command, Commands::Show { title } if title == "Dune"));

        let cli = Cli::parse_from(["bookmark", "rm", "Dune"]);
        assert!(matches!(cli.command, Commands::Unmark { title } if title == "Dune"));

        let cli = Cli::parse_from(["bookmark", "share", "Dune"]);
        assert!(matches!(cli.command, Commands::Share { title } if title == "Dune"));
    }

    #[test]
    fn test_cli_config_commands() {
        let cli = Cli::parse_from(["bookmark", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::Init { force: true }
            }
        ));

        let cli = Cli::parse_from(["bookmark", "config", "show"]);
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigCommands::Show
            }
        ));
    }

    #[test]
    fn test_output_format_resolve() {
        assert_eq!(OutputFormat::Plain.resolve(), OutputFormat::Plain);
        assert_ne!(OutputFormat::Auto.resolve(), OutputFormat::Auto);
    }

    #[tokio::test]
    async fn test_run_search_failure_returns_error() {
        use bookmark::catalog::{CatalogError, MockCatalog};

        let failing = MockCatalog::new();
        failing.set_error(CatalogError::Network("offline".to_string()));
        let store = MarkedBookStore::in_memory();

        let err = run_search(Arc::new(failing), &store, "dune", &[], OutputFormat::Json, true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Network error: offline");

        let err = run_search(
            Arc::new(MockCatalog::new()),
            &store,
            "  ",
            &[],
            OutputFormat::Json,
            true,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Please enter search query");
    }

    #[test]
    fn test_format_marked_time() {
        assert_eq!(format_marked_time(0), "");
        assert!(!format_marked_time(1_700_000_000_000).is_empty());
    }
}
