use clap::Parser;
use realpx::cli::{Cli, Commands};
use realpx::output::{Printer, Verbosity};
use realpx::{PxError, Settings};

fn run(cli: Cli) -> Result<(), PxError> {
    let printer = Printer::with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose));

    // Completions and init don't need settings
    let command = match cli.command {
        Commands::Completions(args) => return realpx::cli::completions::run(args),
        Commands::Init(args) => return realpx::cli::init::run(args, &printer).map(|_| ()),
        command => command,
    };

    let cwd = std::env::current_dir()?;
    let (settings, source) = Settings::discover(cli.config.as_deref(), &cwd)?;
    if let Some(path) = source {
        printer.verbose("Settings", &realpx::output::display_path(&path));
    }

    match command {
        Commands::Restore(args) => realpx::cli::restore::run(args, &settings, &printer).map(|_| ()),
        Commands::Detect(args) => realpx::cli::detect::run(args, &settings, &printer).map(|_| ()),
        Commands::Palette(args) => realpx::cli::palette::run(args, &printer).map(|_| ()),
        Commands::Completions(_) | Commands::Init(_) => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
