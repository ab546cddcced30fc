mod paths;

use std::fs::File;

use clap::{Parser, Subcommand};
use emoji_lib::model::{PickerData, SkinTone};
use emoji_lib::storage::{InMemoryStorage, LOCAL_DATA_KEY_PREFIX, SqliteStorage, Storage};
use emoji_lib::{DEFAULT_BASE_URL, EmojiDataClient, LocalEntry, search_and_exclude};
use emoji_picker::{Picker, PickerConfig};
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio_util::sync::CancellationToken;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "emoji", version, about = "Browse and search Emojibase data")]
struct Cli {
    /// Log debug output to the log file
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Emojibase data mirror
    #[arg(long, global = true, env = "EMOJI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Keep fetched data in memory only
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the picker grid, category by category
    Show {
        #[arg(long, default_value = "en")]
        locale: String,
        #[arg(long, default_value_t = 10)]
        columns: usize,
        /// none, light, medium-light, medium, medium-dark or dark
        #[arg(long, default_value = "none")]
        skin_tone: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        max_version: Option<f64>,
        /// Emojis to leave out
        #[arg(long = "exclude")]
        excluded: Vec<String>,
    },
    /// List emojis matching a query, best matches first
    Search {
        query: String,
        #[arg(long, default_value = "en")]
        locale: String,
        #[arg(long, default_value = "none")]
        skin_tone: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Inspect the local data cache
    Cache {
        #[command(subcommand)]
        command: CacheCommand,
    },
}

#[derive(Subcommand)]
enum CacheCommand {
    /// List cached locales
    List,
    /// Remove cached data for one locale, or all of them
    Clear {
        #[arg(long)]
        locale: Option<String>,
    },
}

#[tokio::main]
async fn main() -> CliResult {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let local = local_storage(cli.no_cache).await?;

    match cli.command {
        Commands::Show {
            locale,
            columns,
            skin_tone,
            search,
            max_version,
            excluded,
        } => {
            let client = client(&cli.base_url, local)?;
            let mut config = PickerConfig::new()
                .with_locale(locale)
                .with_columns(columns)
                .with_skin_tone(SkinTone::parse_or_default(&skin_tone))
                .with_excluded(excluded)
                .immediate_rebuilds();
            if let Some(max_version) = max_version {
                config = config.with_max_version(max_version);
            }
            show(client, config, search).await
        }
        Commands::Search {
            query,
            locale,
            skin_tone,
            limit,
        } => {
            let client = client(&cli.base_url, local)?;
            search(&client, &locale, &query, SkinTone::parse_or_default(&skin_tone), limit).await
        }
        Commands::Cache { command } => match command {
            CacheCommand::List => cache_list(&local).await,
            CacheCommand::Clear { locale } => cache_clear(&local, locale.as_deref()).await,
        },
    }
}

fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("warning: cannot create log file {}: {e}", path.display()),
    }
}

async fn local_storage(no_cache: bool) -> Result<Storage, Box<dyn std::error::Error>> {
    if no_cache {
        return Ok(Storage::new(InMemoryStorage::new()));
    }
    match paths::cache_db() {
        Some(path) => {
            log::debug!("[cli] using cache at {}", path.display());
            Ok(Storage::new(SqliteStorage::open(path).await?))
        }
        None => {
            log::warn!("[cli] no cache directory, keeping data in memory");
            Ok(Storage::new(InMemoryStorage::new()))
        }
    }
}

fn client(base_url: &str, local: Storage) -> Result<EmojiDataClient, Box<dyn std::error::Error>> {
    Ok(EmojiDataClient::builder()
        .base_url(base_url)
        .local_storage(local)
        .build()?)
}

async fn show(client: EmojiDataClient, config: PickerConfig, search: Option<String>) -> CliResult {
    let picker = Picker::builder(client).config(config).build();
    picker.load().await?;
    if let Some(search) = search {
        picker.set_search(search);
    }

    let state = picker.store().get();
    if let Some(data) = state.data.as_ready() {
        print_grid(data);
    } else if let Some(e) = state.data.as_error() {
        eprintln!("error: {e}");
    } else if state.data.is_idle() {
        println!("No emoji data.");
    }
    if let Some(label) = picker.skin_tone_label() {
        println!("\nSkin tone: {label}");
    }
    Ok(())
}

fn print_grid(data: &PickerData) {
    if data.is_empty() {
        println!("No emojis match.");
        return;
    }
    for category in &data.categories {
        println!("{} ({} rows)", category.label, category.rows_count);
        let rows = &data.rows[category.start_row_index..category.start_row_index + category.rows_count];
        for row in rows {
            let glyphs: Vec<&str> = row.emojis.iter().map(|e| e.emoji.as_str()).collect();
            println!("  {}", glyphs.join(" "));
        }
    }
    println!("\n{} emojis", data.count);
}

async fn search(client: &EmojiDataClient, locale: &str, query: &str, skin_tone: SkinTone, limit: usize) -> CliResult {
    let data = client.get_emoji_data(locale, None, &CancellationToken::new()).await?;
    let results = search_and_exclude::<String>(&data.emojis, Some(query), &[]);
    if results.is_empty() {
        println!("No emojis match {query:?}.");
        return Ok(());
    }

    for emoji in results.iter().take(limit) {
        let category = data
            .categories
            .iter()
            .find(|c| c.index == emoji.category)
            .map(|c| c.label.as_str())
            .unwrap_or_default();
        println!("{}  {}  [{}]", emoji.glyph(skin_tone), emoji.label, category);
    }
    if results.len() > limit {
        println!("... and {} more", results.len() - limit);
    }
    Ok(())
}

async fn cache_list(local: &Storage) -> CliResult {
    let keys = local.keys_with_prefix(LOCAL_DATA_KEY_PREFIX).await?;
    if keys.is_empty() {
        println!("Cache is empty.");
        return Ok(());
    }
    for key in keys {
        let locale = key.trim_start_matches(LOCAL_DATA_KEY_PREFIX);
        match local.get::<LocalEntry, _>(&key, |_| true).await {
            Some(entry) => println!(
                "{locale}: {} emojis, fetched {}",
                entry.data.emojis.len(),
                entry.metadata.cached_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("{locale}: unreadable"),
        }
    }
    Ok(())
}

async fn cache_clear(local: &Storage, locale: Option<&str>) -> CliResult {
    let keys = local.keys_with_prefix(LOCAL_DATA_KEY_PREFIX).await?;
    let mut removed = 0;
    for key in keys {
        let key_locale = key.trim_start_matches(LOCAL_DATA_KEY_PREFIX);
        if locale.is_some_and(|l| !l.eq_ignore_ascii_case(key_locale)) {
            continue;
        }
        local.remove(&key).await?;
        removed += 1;
    }
    log::info!("[cli] removed {removed} cache entries");
    println!("Removed {removed} cached locale(s).");
    Ok(())
}
