use clap::{ArgAction, Parser};
use log::{LevelFilter, info};
use safe_prime::{
    DEFAULT_CERTAINTY, SafePrime, SafePrimeError, SafePrimeGenerator, SafePrimeRequest,
    bit_length_from_signed, generate_parallel,
};

/// Sichere Primzahlen: Generiert p = 2q + 1, wobei p und q beide prim sind
#[derive(Parser, Debug)]
#[command(name = "gensafeprime")]
#[command(about = "Generiert eine sichere Primzahl p = 2q + 1 mit exakter Bitlänge")]
#[command(version = "1.0")]
struct Args {
    /// Bitlänge der Primzahl p (mindestens 3)
    #[arg(value_name = "BITLENGTH", allow_negative_numbers = true)]
    bit_length: i64,

    /// Anzahl der Miller-Rabin Runden für Primzahltest (Standard: 40)
    #[arg(short = 'r', long = "rounds", default_value_t = DEFAULT_CERTAINTY)]
    miller_rabin_rounds: u32,

    /// Maximale Anzahl getesteter Kandidaten (Standard: max(4096, 32 * Bitlänge²))
    #[arg(long = "max-iterations")]
    max_iterations: Option<u64>,

    /// Anzahl paralleler Such-Threads (höchstens 1024)
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: usize,

    /// Fester Seed für reproduzierbare Ausgabe (nur für Tests, nicht kryptographisch sicher)
    #[arg(long)]
    seed: Option<u64>,

    /// Ausgabe in Hexadezimal (Großbuchstaben) statt Dezimal
    #[arg(long)]
    hex: bool,

    /// Zusätzlich q = (p - 1) / 2 ausgeben
    #[arg(long = "show-q")]
    show_q: bool,

    /// Ausführlichere Log-Ausgabe (-v, -vv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Übersetzt die Kommandozeilenargumente in eine geprüfte Anfrage
fn build_request(args: &Args) -> Result<SafePrimeRequest, SafePrimeError> {
    let bit_length = bit_length_from_signed(args.bit_length)?;

    let mut request = SafePrimeRequest::new(bit_length).with_certainty(args.miller_rabin_rounds);
    if let Some(max_iterations) = args.max_iterations {
        request = request.with_max_iterations(max_iterations);
    }
    request.validate()?;

    if args.seed.is_some() && args.threads > 1 {
        return Err(SafePrimeError::InvalidParameter(
            "--seed kann nur mit einem Thread verwendet werden".to_string(),
        ));
    }

    Ok(request)
}

fn run(args: &Args, request: &SafePrimeRequest) -> Result<SafePrime, SafePrimeError> {
    match args.seed {
        Some(seed) => SafePrimeGenerator::from_seed(seed).generate(request),
        None if args.threads > 1 => generate_parallel(request, args.threads),
        None => SafePrimeGenerator::new().generate(request),
    }
}

/// Erste Zeile: p, optional zweite Zeile: q
fn format_output(safe: &SafePrime, hex: bool, show_q: bool) -> Vec<String> {
    let render = |n: &safe_prime::BigUint| {
        if hex {
            format!("{:X}", n)
        } else {
            n.to_string()
        }
    };

    let mut lines = vec![render(safe.safe_prime())];
    if show_q {
        lines.push(render(safe.prime()));
    }
    lines
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(log_level(args.verbose))
        .parse_default_env()
        .init();

    let safe = match build_request(&args).and_then(|request| run(&args, &request)) {
        Ok(safe) => safe,
        Err(err) => {
            eprintln!("Fehler: {}", err);
            std::process::exit(1);
        }
    };

    info!(
        "{}-Bit sichere Primzahl nach {} Kandidaten gefunden",
        safe.bits(),
        safe.iterations()
    );

    for line in format_output(&safe, args.hex, args.show_q) {
        println!("{}", line);
    }
}
