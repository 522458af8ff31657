use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use photo_renamer::cli::{
    run_export, run_history, run_import, run_init, run_list, run_log, run_most_tagged, run_revert,
    run_tag, run_tags, ListOptions, PhotoInfo, TagOptions, TagsOptions,
};
use photo_renamer::config::LOG_ENV;
use photo_renamer::logging::init_logging;
use photo_renamer::CommitOutcome;

#[derive(Parser)]
#[command(name = "photo-renamer")]
#[command(about = "Tag photos by renaming them, and revert them to any earlier name")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the store for a library and register its images
    Init {
        /// Path to library root
        path: PathBuf,
    },
    /// List images and their tags
    List {
        /// Path to library root
        #[arg(default_value = ".")]
        library: PathBuf,
        /// Only images carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show the images with the most tags
    MostTagged {
        /// Path to library root
        #[arg(default_value = ".")]
        library: PathBuf,
    },
    /// Show, add or delete tags in the vocabulary
    Tags {
        /// Path to library root
        library: PathBuf,
        /// Tags to add
        #[arg(short, long)]
        add: Vec<String>,
        /// Tags to delete from every image
        #[arg(short, long)]
        delete: Vec<String>,
    },
    /// Add or remove tags on an image
    Tag {
        /// Path to library root
        library: PathBuf,
        /// Image to tag (relative to library)
        file: PathBuf,
        /// Tags to add
        #[arg(short, long)]
        add: Vec<String>,
        /// Tags to remove
        #[arg(short, long)]
        remove: Vec<String>,
    },
    /// Show the names an image has held
    History {
        /// Path to library root
        library: PathBuf,
        /// Image (relative to library)
        file: PathBuf,
    },
    /// Rename an image back to a previous name
    Revert {
        /// Path to library root
        library: PathBuf,
        /// Image (relative to library)
        file: PathBuf,
        /// Previous name, or its number in `history`
        target: String,
    },
    /// Show the rename log
    Log {
        /// Path to library root
        #[arg(default_value = ".")]
        library: PathBuf,
        /// Only the newest N entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Export tags and name histories to a JSON file
    Export {
        /// Path to library root
        library: PathBuf,
        /// Output file
        output: PathBuf,
    },
    /// Replace tags and name histories from a JSON export
    Import {
        /// Path to library root
        library: PathBuf,
        /// Export file to read
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    // Guard must be held for logs to flush
    let _guard = init_logging().ok();
    let verbose = std::env::var(LOG_ENV).is_ok();
    let start = Instant::now();

    let cli = Cli::parse();

    let result = run_command(cli);

    if verbose {
        let elapsed = start.elapsed();
        eprintln!("Completed in {:.2?}", elapsed);
    }

    result
}

fn print_photos(photos: &[PhotoInfo]) {
    for photo in photos {
        if photo.tags.is_empty() {
            println!("{}", photo.path);
        } else {
            println!("{} ({})", photo.path, photo.tags.join(", "));
        }
    }
    println!("{} images", photos.len());
}

fn print_outcome(outcome: &CommitOutcome) {
    match outcome {
        CommitOutcome::Unchanged { path } => println!("{}: unchanged", path.display()),
        CommitOutcome::Renamed { from, to } => {
            println!("Renamed {} -> {}", from.display(), to.display())
        }
        CommitOutcome::RenameFailed { from, to, reason } => eprintln!(
            "Could not rename {} -> {}: {}",
            from.display(),
            to.display(),
            reason
        ),
    }
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            println!("Initializing library at: {}", path.display());
            let stats = run_init(&path)?;
            println!(
                "Initialized: {} images in {} directories ({} new)",
                stats.images, stats.directories, stats.registered
            );
        }
        Commands::List { library, tag } => {
            let photos = run_list(&library, ListOptions { tag })?;
            print_photos(&photos);
        }
        Commands::MostTagged { library } => {
            let photos = run_most_tagged(&library)?;
            print_photos(&photos);
        }
        Commands::Tags {
            library,
            add,
            delete,
        } => {
            let report = run_tags(&library, TagsOptions { add, delete })?;
            for outcome in &report.renames {
                print_outcome(outcome);
            }
            if report.tags.is_empty() {
                println!("No tags");
            } else {
                println!("Tags: {}", report.tags.join(", "));
            }
        }
        Commands::Tag {
            library,
            file,
            add,
            remove,
        } => {
            let report = run_tag(&library, &file, TagOptions { add, remove })?;
            let path = match &report.outcome {
                Some(outcome) => {
                    print_outcome(outcome);
                    outcome.path().to_path_buf()
                }
                None => file,
            };
            if report.tags.is_empty() {
                println!("{}: no tags", path.display());
            } else {
                println!("{}: {}", path.display(), report.tags.join(", "));
            }
        }
        Commands::History { library, file } => {
            let names = run_history(&library, &file)?;
            if names.is_empty() {
                println!("{}: no previous names", file.display());
            }
            for (i, name) in names.iter().enumerate() {
                println!("{:>3}  {}", i, name);
            }
        }
        Commands::Revert {
            library,
            file,
            target,
        } => {
            let outcome = run_revert(&library, &file, &target)?;
            print_outcome(&outcome);
        }
        Commands::Log { library, limit } => {
            let entries = run_log(&library, limit)?;
            for entry in &entries {
                println!(
                    "[{}] {} -> {}",
                    entry.formatted_timestamp(),
                    entry.dir.join(&entry.old_name).display(),
                    entry.dir.join(&entry.new_name).display()
                );
            }
            println!("{} changes", entries.len());
        }
        Commands::Export { library, output } => {
            let stats = run_export(&library, &output)?;
            println!(
                "Exported {} tags and {} photos to {}",
                stats.tags,
                stats.photos,
                output.display()
            );
        }
        Commands::Import { library, input } => {
            let stats = run_import(&library, &input)?;
            println!("Imported {} tags and {} photos", stats.tags, stats.photos);
        }
    }

    Ok(())
}
