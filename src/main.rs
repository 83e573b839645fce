use clap::Parser;

/// ints is a small array-oriented programming language; every value is an
/// array of machine integers.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the source file to interpret.
    file: String,

    /// Arguments forwarded to the program's `main` function.
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = ints::run_file(&args.file, &args.args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
