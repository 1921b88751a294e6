// CLI modules
mod args;
mod ops;

use clap::Parser;

use args::Args;
use ops::OpContext;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Resolve remote URL: explicit flag > SILO_REMOTE > hardcoded 8080
    let remote = match ops::resolve_remote(args.remote) {
        Ok(remote) => remote,
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    };

    let ctx = match OpContext::new(remote, args.store_id) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: failed to create store client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
