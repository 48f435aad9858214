use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::{debug, info};

use bibletext::addressing::verify_ordinals;
use bibletext::models::{NewVerse, Translation, Verse};
use bibletext::{
    establish_connection, registry, run_migrations, DbConnection, ReferenceParser, Resolver,
    SwordDrill, SwordDrillable,
};

#[derive(Parser)]
#[command(name = "bibletext", version)]
#[command(author = "Dustin Speckhals <dustin1114@gmail.com>")]
#[command(about = "Look up Bible verses and passages by reference")]
struct Cli {
    /// SQLite database holding the translations
    #[arg(long, env = "DATABASE_URL", default_value = "bibletext.db")]
    database_url: String,

    /// Translation code used for lookups
    #[arg(short, long, env = "BIBLETEXT_TRANSLATION", default_value = "KJV")]
    translation: String,

    /// Print verses as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a translation from a JSON array of {book, chapter, verse, words}
    Load {
        code: String,
        file: PathBuf,
        /// Display name of the translation, defaults to its code
        #[arg(long)]
        name: Option<String>,
    },

    /// Look up a single verse, eg: "John 3:16"
    Verse { reference: String },

    /// Look up the verses from START to END, eg: "Romans 1:1" "Romans 2:3"
    Passage { start: String, end: Option<String> },

    /// List the stored translations
    Translations,

    /// Check the verse ordinals of one or every stored translation
    Check { code: Option<String> },
}

type CliResult = Result<(), Box<dyn Error>>;

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult {
    let mut conn = establish_connection(&cli.database_url)?;
    run_migrations(&mut conn)?;
    let registered = registry::register_stored::<SwordDrill>(&mut conn)?;
    debug!("{} translation(s) registered", registered);

    match cli.command {
        Command::Load { code, file, name } => load(code, file, name, &mut conn),
        Command::Verse { reference } => {
            let resolver = resolver(&mut conn)?;
            let verse =
                resolver.resolve_verse::<SwordDrill>(&cli.translation, &reference, &mut conn)?;
            print_verse(&verse, cli.json, &mut conn)
        }
        Command::Passage { start, end } => {
            let resolver = resolver(&mut conn)?;
            let verses = resolver.resolve_passage::<SwordDrill>(
                &cli.translation,
                &start,
                end.as_deref(),
                &mut conn,
            )?;
            print_passage(&verses, cli.json)
        }
        Command::Translations => {
            let mut stdout = io::stdout().lock();
            for t in SwordDrill::translations(&mut conn)? {
                let count = SwordDrill::count(&t.code, &mut conn)?;
                writeln!(stdout, "{}\t{}\t{} verses", t.code, t.name, count)?;
            }
            Ok(())
        }
        Command::Check { code } => check(code, &mut conn),
    }
}

fn resolver(conn: &mut DbConnection) -> Result<Resolver, Box<dyn Error>> {
    Ok(Resolver::new(ReferenceParser::from_store::<SwordDrill>(
        conn,
    )?))
}

fn load(code: String, file: PathBuf, name: Option<String>, conn: &mut DbConnection) -> CliResult {
    let verses: Vec<NewVerse> = serde_json::from_reader(BufReader::new(File::open(&file)?))?;
    info!("Read {} verses from {}", verses.len(), file.display());

    let translation = Translation {
        name: name.unwrap_or_else(|| code.clone()),
        code,
    };
    let count = SwordDrill::load(&translation, verses, conn)?;
    registry::register(&translation.code);

    println!("Loaded {} verses into the {}", count, translation.code);
    Ok(())
}

fn check(code: Option<String>, conn: &mut DbConnection) -> CliResult {
    let codes = match code {
        Some(code) => vec![code],
        None => registry::registered(),
    };

    for code in codes {
        let count = verify_ordinals::<SwordDrill>(&code, conn)?;
        println!("{}: {} verses, ordinals 1 to {}", code, count, count);
    }
    Ok(())
}

fn print_verse(verse: &Verse, json: bool, conn: &mut DbConnection) -> CliResult {
    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(verse)?)?;
        return Ok(());
    }

    writeln!(stdout, "{} ({})", verse, verse.translation)?;
    writeln!(stdout, "{}", verse.words)?;

    if let Some(prev) = verse.prev_verse::<SwordDrill>(conn) {
        writeln!(stdout, "Previous: {} [{}]", prev, prev.address().path())?;
    }
    if let Some(next) = verse.next_verse::<SwordDrill>(conn)? {
        writeln!(stdout, "Next: {} [{}]", next, next.address().path())?;
    }
    if let Some(book) = verse.prev_book() {
        writeln!(stdout, "Previous book: {}", book.name)?;
    }
    if let Some(book) = verse.next_book() {
        writeln!(stdout, "Next book: {}", book.name)?;
    }
    Ok(())
}

fn print_passage(verses: &[Verse], json: bool) -> CliResult {
    let mut stdout = io::stdout().lock();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(verses)?)?;
        return Ok(());
    }

    if let (Some(first), Some(last)) = (verses.first(), verses.last()) {
        writeln!(stdout, "{} - {} ({})", first, last, first.translation)?;
    }
    for v in verses {
        writeln!(stdout, "{}:{} {}", v.chapter, v.verse, v.words)?;
    }
    Ok(())
}
