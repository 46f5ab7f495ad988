//! moviedb CLI - Load IMDb CSV dumps into SQLite and report on them
//!
//! ```bash
//! moviedb load                                  # Load the default 001-IMDb/ files
//! moviedb load --movies m.csv --genres g.csv    # Load specific files
//! moviedb load --json > summary.json            # Machine-readable summary
//! moviedb check movies m.csv                    # Validate a file without loading it
//! moviedb schema                                # Print the table DDL
//! ```

use clap::{Parser, Subcommand};
use moviedb::{
    check_headers, logs::set_verbose, run, LoadOptions, ReadOutcome, RecordReader, RunOptions,
    RunSummary, TableKind, TableOutcome, DEFAULT_BATCH_SIZE, SCHEMA,
};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "moviedb")]
#[command(about = "Bulk load IMDb movie CSV files into SQLite", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load both CSV files into a temporary database and print reports
    Load {
        /// CSV file for the movies table
        #[arg(long, default_value = "001-IMDb/IMDB-movies.csv")]
        movies: PathBuf,

        /// CSV file for the movies_genres table
        #[arg(long, default_value = "001-IMDb/IMDB-movies_genres.csv")]
        genres: PathBuf,

        /// Rows per insert statement
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Enforce the movies_genres.movie_id foreign key
        #[arg(long)]
        foreign_keys: bool,

        /// Print the run summary as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Log every batch
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate a CSV file's header and count unreadable rows
    Check {
        /// Target table (movies or movies_genres)
        #[arg(value_parser = parse_table)]
        table: TableKind,

        /// Input CSV file
        input: PathBuf,
    },

    /// Print the database schema
    Schema,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Load {
            movies,
            genres,
            batch_size,
            foreign_keys,
            json,
            verbose,
        } => {
            set_verbose(verbose);
            let options = RunOptions {
                movies_csv: movies,
                genres_csv: genres,
                load: LoadOptions {
                    batch_size,
                    ..LoadOptions::default()
                },
                enforce_foreign_keys: foreign_keys,
            };
            cmd_load(&options, json)
        }

        Commands::Check { table, input } => cmd_check(table, &input),

        Commands::Schema => {
            println!("{}", SCHEMA.trim());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_table(s: &str) -> Result<TableKind, String> {
    s.parse().map_err(|e: moviedb::LoadError| e.to_string())
}

fn cmd_load(options: &RunOptions, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = run(options)?;

    print_summary(&summary);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if !summary.succeeded() {
        return Err("run did not complete, see summary above".into());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    eprintln!("\n📊 Summary:");
    for outcome in &summary.tables {
        match outcome {
            TableOutcome::Loaded { report } => {
                eprintln!(
                    "   ✅ {}: {} inserted, {} skipped",
                    report.table, report.rows_inserted, report.rows_skipped
                );
            }
            TableOutcome::Failed { table, error } => {
                eprintln!("   ❌ {}: {}", table, error);
            }
            TableOutcome::NotAttempted { table } => {
                eprintln!("   ⏭️  {}: not attempted", table);
            }
        }
    }

    if let Some(ref ratings) = summary.genre_ratings {
        eprintln!("\n🏆 Average rank by genre:");
        for r in ratings {
            eprintln!("   {:<14} {:>6.2}  ({} movies)", r.genre, r.average_rank, r.movies);
        }
    }

    if let Some(ref counts) = summary.genre_counts {
        eprintln!("\n🎬 Movies per genre:");
        for c in counts {
            eprintln!("   {:<14} {:>8}", c.genre, c.movies);
        }
    }

    if let Some(ref error) = summary.report_error {
        eprintln!("\n   ❌ Reports: {}", error);
    }
}

fn cmd_check(table: TableKind, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Checking {} as {}", input.display(), table);

    let file = File::open(input)?;
    let reader = RecordReader::new(BufReader::new(file), table.name())?;

    check_headers(table, reader.headers())?;
    eprintln!("   ✓ Headers: {}", reader.headers().join(", "));

    let mut readable = 0usize;
    let mut skipped = 0usize;
    for outcome in reader {
        match outcome? {
            ReadOutcome::Row(_) => readable += 1,
            ReadOutcome::Skipped(skip) => {
                skipped += 1;
                if skipped <= 10 {
                    eprintln!("   ⚠️ {}", skip);
                }
            }
        }
    }

    eprintln!("\n✅ {} rows readable, {} would be skipped", readable, skipped);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reports_schema_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("genres.csv");
        std::fs::write(&path, "genre,movie_id\nDrama,1\n").unwrap();

        let err = cmd_check(TableKind::MoviesGenres, &path).unwrap_err();
        let mismatch = err.downcast_ref::<moviedb::LoadError>();
        assert!(matches!(
            mismatch,
            Some(moviedb::LoadError::SchemaMismatch { table: "movies_genres", .. })
        ));
    }

    #[test]
    fn test_check_accepts_matching_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("genres.csv");
        std::fs::write(&path, "movie_id,genre\n1,Drama\n2\n").unwrap();
        assert!(cmd_check(TableKind::MoviesGenres, &path).is_ok());
    }
}
