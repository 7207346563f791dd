use clap::{ArgAction, Parser, Subcommand};

mod benaloh;
mod enc;
mod prime;

/// ciphercore command-line tool: block cipher modes, primality tests, Benaloh.
#[derive(Parser)]
#[command(name = "ciphercore")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Raise the log level (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt or decrypt a file with a block cipher mode.
    Enc {
        /// Block cipher (aes, shacal1).
        #[arg(short, long, default_value = "aes")]
        cipher: String,
        /// Mode of operation (ecb, cbc, pcbc, cfb, ofb, ctr).
        #[arg(short, long, default_value = "cbc")]
        mode: String,
        /// Padding (zeros, pkcs7, ansix923, iso10126).
        #[arg(short, long, default_value = "pkcs7")]
        padding: String,
        /// Blocks per batch; defaults to the number of CPUs.
        #[arg(short, long)]
        threads: Option<usize>,
        /// Key as hex.
        #[arg(short, long)]
        key: String,
        /// IV as hex; generated and printed when encrypting without one.
        #[arg(long)]
        iv: Option<String>,
        /// Decrypt mode.
        #[arg(short, long)]
        decrypt: bool,
        /// Fail on malformed padding instead of keeping the final block.
        #[arg(long)]
        strict_padding: bool,
        /// Input file.
        #[arg(short, long)]
        input: String,
        /// Output file.
        #[arg(short, long)]
        output: String,
    },
    /// Probabilistic primality check of a decimal integer.
    Prime {
        /// Test (fermat, solovay-strassen, miller-rabin).
        #[arg(short, long, default_value = "miller-rabin")]
        test: String,
        /// Required probability of a correct "prime" answer, in (0, 1).
        #[arg(short, long, default_value = "0.999")]
        probability: f64,
        /// Value to test.
        value: String,
    },
    /// Generate a Benaloh key pair and round-trip a message through it.
    Benaloh {
        /// Primality test used for key generation.
        #[arg(short, long, default_value = "miller-rabin")]
        test: String,
        /// Required primality probability for p and q.
        #[arg(short, long, default_value = "0.999")]
        probability: f64,
        /// Bit size of each prime.
        #[arg(short, long, default_value = "64")]
        bits: usize,
        /// Message space size r.
        #[arg(short, long, default_value = "65537")]
        r: String,
        /// Message to encrypt, below r.
        #[arg(short, long, default_value = "42")]
        message: String,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Enc {
            cipher,
            mode,
            padding,
            threads,
            key,
            iv,
            decrypt,
            strict_padding,
            input,
            output,
        } => enc::run(&enc::EncArgs {
            cipher,
            mode,
            padding,
            threads: *threads,
            key,
            iv: iv.as_deref(),
            decrypt: *decrypt,
            strict_padding: *strict_padding,
            input,
            output,
        }),
        Commands::Prime {
            test,
            probability,
            value,
        } => prime::run(test, *probability, value),
        Commands::Benaloh {
            test,
            probability,
            bits,
            r,
            message,
        } => benaloh::run(test, *probability, *bits, r, message),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
