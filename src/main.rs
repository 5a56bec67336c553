use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use style_studio::app::batch_use_case::{BatchOrchestrator, Pacing};
use style_studio::app::ports::GalleryPort;
use style_studio::attribution::{AttributionQuery, AttributionResolver, AttributionTables};
use style_studio::carousel::{NavEvent, ResultCarousel};
use style_studio::catalog::StyleCatalog;
use style_studio::config::Config;
use style_studio::constants::{DEFAULT_CONFIG_PATH, ENV_CONFIG_PATH};
use style_studio::education::{Commentary, EducationLookup};
use style_studio::infra::gallery_adapter::FsGallery;
use style_studio::infra::http_transform_adapter::HttpTransformService;
use style_studio::observability;
use style_studio::session::{Slide, StudioSession};
use style_studio::types::{Category, Photo, StyleDescriptor};

#[derive(Parser)]
#[command(name = "style_studio")]
#[command(about = "Turn one photo into a gallery of art-historical styles")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print Prometheus metrics before exiting
    #[arg(long, global = true)]
    metrics: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available styles
    Styles {
        /// Only this category: movements, masters or oriental
        #[arg(long)]
        category: Option<String>,
    },
    /// Resolve an artist/work label to its educational entry
    Resolve {
        #[arg(long)]
        category: String,
        #[arg(long)]
        style: String,
        #[arg(long)]
        artist: Option<String>,
        #[arg(long)]
        work: Option<String>,
    },
    /// Transform a photo in a single style
    Transform {
        #[arg(long)]
        photo: PathBuf,
        #[arg(long)]
        style: String,
    },
    /// Transform a photo in several styles, one after another
    Batch {
        #[arg(long)]
        photo: PathBuf,
        /// Every style of this category
        #[arg(long, conflicts_with = "styles")]
        category: Option<String>,
        /// Specific style ids (comma-separated)
        #[arg(long)]
        styles: Option<String>,
        /// Browse results from stdin while the batch runs (n, p, o, or a number)
        #[arg(long)]
        interactive: bool,
    },
}

struct Tables {
    catalog: StyleCatalog,
    resolver: Arc<AttributionResolver>,
}

fn load_tables(config: &Config) -> anyhow::Result<Tables> {
    let catalog = match &config.tables.styles {
        Some(path) => StyleCatalog::load(path)?,
        None => StyleCatalog::builtin()?,
    };
    let education = match &config.tables.education {
        Some(path) => EducationLookup::load(path)?,
        None => EducationLookup::builtin()?,
    };
    let attribution = match &config.tables.attribution {
        Some(path) => AttributionTables::load(path)?,
        None => AttributionTables::builtin()?,
    };

    let dangling = attribution.validate_against(&education);
    if !dangling.is_empty() {
        warn!("{} attribution keys have no education entry", dangling.len());
    }
    info!(
        "Tables ready: styles v{}, attribution v{}, education v{}",
        catalog.version(),
        attribution.version(),
        education.version()
    );

    Ok(Tables {
        catalog,
        resolver: Arc::new(AttributionResolver::new(Arc::new(attribution), Arc::new(education))),
    })
}

fn config_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path
        .or_else(|| std::env::var(ENV_CONFIG_PATH).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn build_orchestrator(config: &Config) -> anyhow::Result<BatchOrchestrator> {
    let service = HttpTransformService::new(config.service.endpoint.clone(), config.service.timeout())?;
    info!("Transform service at {}", service.endpoint());
    Ok(BatchOrchestrator::new(Arc::new(service)).with_pacing(Pacing::from_millis(
        config.pacing.intro_delay_ms,
        config.pacing.outro_delay_ms,
    )))
}

fn build_gallery(config: &Config) -> anyhow::Result<Option<Arc<dyn GalleryPort>>> {
    if !config.gallery.enabled {
        return Ok(None);
    }
    let gallery = FsGallery::new(&config.gallery.directory)
        .with_context(|| format!("opening gallery at {}", config.gallery.directory.display()))?;
    Ok(Some(Arc::new(gallery)))
}

fn pick_styles(catalog: &StyleCatalog, category: Option<String>, styles: Option<String>) -> anyhow::Result<Vec<StyleDescriptor>> {
    if let Some(list) = styles {
        let ids: Vec<String> = list
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        return Ok(catalog.select(&ids)?);
    }
    let category: Category = category.as_deref().unwrap_or("movements").parse()?;
    Ok(catalog.by_category(category))
}

fn parse_nav(line: &str) -> Option<NavEvent> {
    match line.trim() {
        "n" | "next" => Some(NavEvent::StepForward),
        "p" | "prev" => Some(NavEvent::StepBackward),
        "o" | "overview" => Some(NavEvent::ShowOverview),
        other => match other.parse::<usize>() {
            // Results are numbered from 1 on screen
            Ok(n) if n > 0 => Some(NavEvent::JumpTo(n - 1)),
            _ => other
                .strip_prefix("swipe ")
                .and_then(|dx| dx.trim().parse::<f32>().ok())
                .map(NavEvent::Swipe),
        },
    }
}

fn print_commentary(commentary: &Commentary) {
    println!("   📖 {}", commentary.title);
    println!("      {}", commentary.body);
}

fn print_slide(session: &StudioSession) {
    match session.current_slide() {
        Slide::Overview {
            styles,
            completed,
            success_count,
        } => {
            println!("\n🖼️  Overview: {}/{} done, {} succeeded", completed, styles.len(), success_count);
            for (i, resolved) in session.completed().iter().enumerate() {
                let mark = if resolved.outcome.is_success() { "✅" } else { "❌" };
                println!("   {} {}. {}", mark, i + 1, resolved.outcome.style.name);
            }
        }
        Slide::Result { index, resolved } => {
            println!("\n🎨 {}. {}", index + 1, resolved.outcome.style.name);
            if let Some(artifact) = resolved.outcome.artifact_ref() {
                println!("   Result: {}", artifact);
            }
            if let Some(artist) = resolved.outcome.attributed_artist() {
                println!("   Artist: {}", artist);
            }
            if let Some(work) = resolved.outcome.attributed_work() {
                println!("   Work: {}", work);
            }
            if let Some(commentary) = &resolved.commentary {
                print_commentary(commentary);
            }
        }
        Slide::Failure {
            index,
            style,
            error_message,
        } => {
            println!("\n⚠️  {}. {} failed: {}", index + 1, style.name, error_message);
        }
    }
}

/// Overview followed by every completed slide; returns how many were shown
fn print_results(session: &mut StudioSession) -> usize {
    print_slide(session);
    let mut shown = 0;
    for i in 0..session.completed().len() {
        if session.navigate(NavEvent::JumpTo(i)) {
            print_slide(session);
            shown += 1;
        }
    }
    shown
}

fn spawn_stdin_navigation() -> mpsc::UnboundedReceiver<NavEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_nav(&line) {
                Some(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                None => println!("   (n = next, p = previous, o = overview, 1..N = jump)"),
            }
        }
    });
    rx
}

fn spawn_status_printer(orchestrator: &BatchOrchestrator) {
    let mut status = orchestrator.subscribe_status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let line = status.borrow_and_update().clone();
            println!("⏳ {}", line);
        }
    });
}

async fn run_transform(config: &Config, tables: &Tables, photo_path: &Path, style_id: &str) -> anyhow::Result<()> {
    let style = tables
        .catalog
        .find(style_id)
        .cloned()
        .with_context(|| format!("unknown style id '{}'", style_id))?;
    let photo = Photo::from_path(photo_path)
        .await
        .with_context(|| format!("reading photo {}", photo_path.display()))?;

    if let Some(entry) = tables.resolver.education().for_style(&style) {
        println!("📖 {}\n   {}", entry.title, entry.body);
    }

    let orchestrator = build_orchestrator(config)?;
    spawn_status_printer(&orchestrator);
    let outcome = orchestrator.run_single(&photo, &style).await?;

    let mut session = StudioSession::begin(
        vec![style],
        tables.resolver.clone(),
        ResultCarousel::new(config.carousel.swipe_threshold),
    )?;
    if let Some(gallery) = build_gallery(config)? {
        session = session.with_gallery(gallery);
    }
    session.record(outcome).await;
    session.navigate(NavEvent::JumpTo(0));
    print_slide(&session);
    Ok(())
}

async fn run_batch(config: &Config, tables: &Tables, photo_path: &Path, styles: Vec<StyleDescriptor>, interactive: bool) -> anyhow::Result<()> {
    let photo = Photo::from_path(photo_path)
        .await
        .with_context(|| format!("reading photo {}", photo_path.display()))?;

    let mut session = StudioSession::begin(
        styles,
        tables.resolver.clone(),
        ResultCarousel::new(config.carousel.swipe_threshold),
    )?;
    if let Some(gallery) = build_gallery(config)? {
        session = session.with_gallery(gallery);
    }

    let orchestrator = build_orchestrator(config)?;
    spawn_status_printer(&orchestrator);
    let orchestrator = Arc::new(orchestrator);

    println!("🔄 Transforming {} in {} styles...", photo_path.display(), session.styles().len());
    let report = if interactive {
        let nav = spawn_stdin_navigation();
        session
            .run_interactive(orchestrator, photo, nav, print_slide)
            .await?
    } else {
        session.run_batch(orchestrator, photo).await?
    };

    print_results(&mut session);

    println!("\n📊 Batch {}: {} succeeded", report.batch_id, report.summary());
    if report.failure_count() > 0 {
        println!("   {} failed", report.failure_count());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = observability::init_logging();

    let cli = Cli::parse();
    let config = Config::load_or_default(&config_path(cli.config))?;
    if cli.metrics {
        observability::init()?;
    }
    let tables = load_tables(&config)?;

    match cli.command {
        Commands::Styles { category } => {
            let styles = match category {
                Some(category) => tables.catalog.by_category(category.parse()?),
                None => tables.catalog.all().to_vec(),
            };
            for style in styles {
                println!(
                    "{} {:<40} {:<10} {}",
                    style.icon.as_deref().unwrap_or(" "),
                    style.id,
                    style.category,
                    style.name
                );
            }
        }
        Commands::Resolve {
            category,
            style,
            artist,
            work,
        } => {
            let category: Category = category.parse()?;
            let query = AttributionQuery::new(category, artist.as_deref(), work.as_deref(), Some(style.as_str()));
            let resolution = tables.resolver.resolve_query(&query);
            match &resolution {
                Some(resolution) => println!("✅ {} (via {})", resolution.key, resolution.strategy),
                None => println!("❌ no match"),
            }
            let descriptor = tables
                .catalog
                .find(&style)
                .cloned()
                .unwrap_or_else(|| StyleDescriptor::new(style.clone(), style.clone(), category));
            print_commentary(&Commentary::compose(
                tables.resolver.education(),
                &descriptor,
                resolution.as_ref(),
            ));
        }
        Commands::Transform { photo, style } => {
            run_transform(&config, &tables, &photo, &style).await?;
        }
        Commands::Batch {
            photo,
            category,
            styles,
            interactive,
        } => {
            let styles = pick_styles(&tables.catalog, category, styles)?;
            run_batch(&config, &tables, &photo, styles, interactive).await?;
        }
    }

    if cli.metrics {
        if let Some(rendered) = observability::render() {
            println!("\n{}", rendered);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nav_commands() {
        assert_eq!(parse_nav("n"), Some(NavEvent::StepForward));
        assert_eq!(parse_nav(" p "), Some(NavEvent::StepBackward));
        assert_eq!(parse_nav("o"), Some(NavEvent::ShowOverview));
        assert_eq!(parse_nav("2"), Some(NavEvent::JumpTo(1)));
        assert_eq!(parse_nav("0"), None);
        assert_eq!(parse_nav("swipe -80"), Some(NavEvent::Swipe(-80.0)));
        assert_eq!(parse_nav("hello"), None);
    }

    #[tokio::test]
    async fn test_print_results_walks_every_outcome() {
        use style_studio::types::TransformOutcome;

        let styles = vec![
            StyleDescriptor::new("baroque", "Baroque", Category::Movements),
            StyleDescriptor::new("klimt", "Gustav Klimt", Category::Masters),
        ];
        let resolver = Arc::new(AttributionResolver::builtin().unwrap());
        let mut session = StudioSession::begin(styles.clone(), resolver, ResultCarousel::default()).unwrap();
        session
            .record(TransformOutcome::succeeded(styles[0].clone(), "a.png", None, None, 1))
            .await;
        session.record(TransformOutcome::failed(styles[1].clone(), "timeout", 1)).await;

        assert_eq!(print_results(&mut session), 2);
        assert_eq!(session.carousel().view_index(), 1);
    }

    #[test]
    fn test_cli_parses_batch() {
        let cli = Cli::try_parse_from([
            "style_studio",
            "batch",
            "--photo",
            "me.jpg",
            "--styles",
            "klimt,baroque",
        ])
        .unwrap();
        match cli.command {
            Commands::Batch { styles, .. } => assert_eq!(styles.as_deref(), Some("klimt,baroque")),
            _ => panic!("expected batch"),
        }
    }
}
