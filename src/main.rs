use clap::Parser;
use jsbind::conformance;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "jsbind",
    version,
    about = "Destructuring-binding and iterator-protocol conformance runner"
)]
struct Cli {
    /// Run only cases whose name contains this substring
    #[arg(short, long)]
    filter: Option<String>,

    /// List case names without running them
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let cases: Vec<_> = conformance::cases()
        .into_iter()
        .filter(|c| cli.filter.as_deref().is_none_or(|f| c.name.contains(f)))
        .collect();

    if cli.list {
        for case in &cases {
            println!("{}", case.name);
        }
        return ExitCode::SUCCESS;
    }

    let mut failed = 0u32;
    for case in &cases {
        match (case.run)() {
            Ok(()) => println!("ok   {}", case.name),
            Err(msg) => {
                failed += 1;
                println!("FAIL {} - {msg}", case.name);
            }
        }
    }
    println!("{} cases, {failed} failed", cases.len());

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
